// src/osint/sources/snusbase.rs
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::core::{Target, TargetKind};
use crate::error::LeakerResult;
use crate::osint::{flatten_fields, Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://api.snusbase.com/data/search";
const FIELDS: &[&str] = &["email", "username", "password", "hash", "lastip", "name", "salt"];

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    terms: [&'a str; 1],
    types: &'static [&'static str],
}

/// Snusbase data search API
#[derive(Default)]
pub struct Snusbase {
    credentials: Credentials,
}

impl Snusbase {
    pub fn new() -> Self {
        Self::default()
    }

    fn search_types(kind: TargetKind) -> &'static [&'static str] {
        match kind {
            TargetKind::Email => &["email"],
            TargetKind::Username => &["username"],
            TargetKind::Domain => &["_domain"],
            TargetKind::Keyword => &["password"],
            // phone numbers show up inside email and username columns
            TargetKind::Phone => &["email", "username"],
        }
    }
}

/// `results` maps database name to its matching rows
fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let response: Value = serde_json::from_str(body)?;

    let Some(databases) = response.get("results").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut values = Vec::new();
    for (database, rows) in databases {
        let Some(rows) = rows.as_array() else {
            continue;
        };

        for row in rows.iter().filter_map(Value::as_object) {
            let fields = flatten_fields(row, FIELDS);
            if fields.is_empty() {
                continue;
            }

            let mut parts = vec![format!("database:{}", database)];
            parts.extend(fields);
            values.push(parts.join(", "));
        }
    }

    Ok(values)
}

#[async_trait]
impl LeakSource for Snusbase {
    fn name(&self) -> &'static str {
        "snusbase"
    }

    fn add_credentials(&mut self, credentials: Vec<String>) {
        self.credentials = Credentials::from_raw(credentials);
    }

    fn rate_limit(&self) -> u32 {
        2
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(api_key) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        let request = session
            .post(API_URL)
            .header("Auth", api_key)
            .json(&SearchRequest {
                terms: [target.value()],
                types: Self::search_types(target.kind()),
            });

        debug!("Sending a request in Snusbase source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;

        results.emit_all(parse_response(&response.body)?).await
    }
}
