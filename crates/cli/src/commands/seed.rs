//! `pulse seed` - post synthetic events to a running instance
//!
//! A fixed sample set exercises every dashboard panel, plus optional
//! randomized traffic spread over the trailing 24 hours.

use chrono::{Duration, Utc};
use colored::Colorize;
use pulse_types::event::event_types;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

const EVENT_TYPES: &[&str] = &[
    event_types::LOGIN,
    event_types::LOGOUT,
    event_types::PURCHASE,
    event_types::PAGE_VIEW,
    event_types::SIGNUP,
    event_types::CLICK,
    event_types::FORM_SUBMIT,
    event_types::ERROR,
];

fn sample_events() -> Vec<Value> {
    let now = Utc::now();
    vec![
        json!({
            "userId": "user_001",
            "type": "login",
            "value": 0,
            "timestamp": (now - Duration::hours(2)).to_rfc3339(),
            "metadata": { "device": "desktop", "browser": "chrome" },
        }),
        json!({
            "userId": "user_002",
            "type": "purchase",
            "value": 99.9,
            "timestamp": (now - Duration::hours(1)).to_rfc3339(),
            "metadata": { "product": "Widget Pro", "campaign": "summer-sale" },
        }),
        json!({
            "userId": "user_003",
            "type": "page_view",
            "value": 0,
            "timestamp": (now - Duration::minutes(30)).to_rfc3339(),
            "metadata": { "page": "/products", "referrer": "google" },
        }),
        json!({
            "userId": "user_001",
            "type": "purchase",
            "value": 149.99,
            "timestamp": (now - Duration::minutes(15)).to_rfc3339(),
            "metadata": { "product": "Premium Plan", "campaign": "upgrade" },
        }),
        json!({
            "userId": "user_004",
            "type": "signup",
            "value": 0,
            "timestamp": (now - Duration::minutes(5)).to_rfc3339(),
            "metadata": { "source": "organic", "plan": "free" },
        }),
    ]
}

fn random_event(rng: &mut impl Rng) -> Value {
    let now = Utc::now();
    let event_type = *EVENT_TYPES.choose(rng).expect("non-empty");
    let value = if event_type == event_types::PURCHASE {
        (rng.gen_range(500..20000) as f64) / 100.0
    } else {
        0.0
    };

    json!({
        "userId": format!("user_{:03}", rng.gen_range(1..=25)),
        "type": event_type,
        "value": value,
        "timestamp": (now - Duration::minutes(rng.gen_range(0..24 * 60))).to_rfc3339(),
        "metadata": { "seeded": true },
    })
}

pub async fn run(api_url: &str, count: usize) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let endpoint = format!("{api_url}/events");

    let mut events = sample_events();
    {
        let mut rng = rand::thread_rng();
        events.extend((0..count).map(|_| random_event(&mut rng)));
    }

    println!("Seeding {} events into {endpoint}", events.len());

    let mut created = 0usize;
    for event in &events {
        let event_type = event["type"].as_str().unwrap_or("?");
        let user_id = event["userId"].as_str().unwrap_or("?");

        match client.post(&endpoint).json(event).send().await {
            Ok(response) if response.status().is_success() => {
                created += 1;
                println!("{} {event_type} event for {user_id}", "✓".green());
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                println!("{} {event_type} rejected ({status}): {body}", "✗".red());
            }
            Err(err) => {
                println!("{} {event_type} failed: {err}", "✗".red());
            }
        }
    }

    println!("{created}/{} events created", events.len());
    Ok(())
}
