//! Lists the responses of one survey.
//!
//! This example shows how to:
//! - Configure a client with credentials and a page size
//! - Walk every page of a paged endpoint
//! - Read answers and URL variables from a response
//!
//! Run with:
//! `GIZMO_API_TOKEN=... GIZMO_API_SECRET=... cargo run --example list_responses -- <survey id>`

use gizmo_client::query::Endpoint;
use gizmo_client::{Backoff, Client, Error, PageRequest};
use std::time::Duration;

fn env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::ConfigurationError(format!("{} is not set", name)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gizmo_client=debug,list_responses=info".into()),
        )
        .init();

    let survey_id: i64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .ok_or_else(|| Error::ConfigurationError("usage: list_responses <survey id>".to_string()))?;

    let client = Client::builder()
        .credentials(env("GIZMO_API_TOKEN")?, env("GIZMO_API_SECRET")?)
        .batch_size(100)
        .backoff(Backoff::Exponential {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: true,
        })
        .build()?;

    let survey = client.get_survey(survey_id).await?;
    println!("=== {} ({}) ===", survey.title, survey.status);

    // The raw listing keeps page accounting next to the records
    let endpoint = Endpoint::get(format!("survey/{}/surveyresponse", survey_id));
    let listing = client
        .fetch_pages::<gizmo_client::models::SurveyResponse>(&endpoint, PageRequest::All)
        .await?;

    println!(
        "{} responses over {} pages in {:?} ({} attempts)",
        listing.len(),
        listing.pages_fetched,
        listing.latency,
        listing.attempts
    );
    println!();

    for response in listing.iter() {
        println!("Response {} [{}]", response.id, response.status);
        if let Some(source) = response.url_variable("source") {
            println!("  source: {}", source);
        }
        for (question_id, value) in response.all_questions() {
            println!("  Q{}: {}", question_id, value);
        }
    }

    Ok(())
}
