//! `pulse serve` - run the HTTP server

use pulse_config::PulseConfig;

pub async fn run(config: PulseConfig) -> anyhow::Result<()> {
    api::serve(config).await
}
