// src/osint/sources/breachdirectory.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::core::Target;
use crate::error::LeakerResult;
use crate::osint::{flatten_fields, Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_HOST: &str = "breachdirectory.p.rapidapi.com";
const API_URL: &str = "https://breachdirectory.p.rapidapi.com/";
const FIELDS: &[&str] = &["email", "password", "sha1", "hash", "sources"];

/// BreachDirectory, served through RapidAPI
#[derive(Default)]
pub struct BreachDirectory {
    credentials: Credentials,
}

impl BreachDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let response: Value = serde_json::from_str(body)?;

    let Some(entries) = response.get("result").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| flatten_fields(entry, FIELDS))
        .filter(|parts| !parts.is_empty())
        .map(|parts| parts.join(", "))
        .collect())
}

#[async_trait]
impl LeakSource for BreachDirectory {
    fn name(&self) -> &'static str {
        "breachdirectory"
    }

    fn add_credentials(&mut self, credentials: Vec<String>) {
        self.credentials = Credentials::from_raw(credentials);
    }

    fn rate_limit(&self) -> u32 {
        1
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(api_key) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        // "auto" lets the API pick the lookup type from the term itself
        let request = session
            .get(API_URL)
            .query(&[("func", "auto"), ("term", target.value())])
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", API_HOST);

        debug!("Sending a request in BreachDirectory source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;

        results.emit_all(parse_response(&response.body)?).await
    }
}
