// src/osint/sources/dehashed.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Target, TargetKind};
use crate::error::LeakerResult;
use crate::osint::{Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://api.dehashed.com/v2/search";

#[derive(Debug, Serialize)]
struct SearchRequest {
    query: String,
    page: u32,
    size: u32,
    de_dupe: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

/// A column arrives either as a plain string or as a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Column {
    One(String),
    Many(Vec<String>),
}

impl Column {
    fn first(&self) -> Option<&str> {
        match self {
            Column::One(value) => Some(value.as_str()),
            Column::Many(values) => values.first().map(String::as_str),
        }
    }
}

/// Only the first value of each column is reported
#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    email: Option<Column>,
    #[serde(default)]
    username: Option<Column>,
    #[serde(default)]
    password: Option<Column>,
    #[serde(default)]
    hashed_password: Option<Column>,
    #[serde(default)]
    name: Option<Column>,
    #[serde(default)]
    phone: Option<Column>,
    #[serde(default)]
    ip_address: Option<Column>,
    #[serde(default)]
    database_name: Option<Column>,
}

impl Entry {
    fn format(&self) -> Option<String> {
        let columns = [
            ("email", &self.email),
            ("username", &self.username),
            ("password", &self.password),
            ("hash", &self.hashed_password),
            ("name", &self.name),
            ("phone", &self.phone),
            ("ip", &self.ip_address),
            ("database", &self.database_name),
        ];

        let parts: Vec<String> = columns
            .iter()
            .filter_map(|&(label, column)| {
                column
                    .as_ref()
                    .and_then(Column::first)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}:{}", label, v))
            })
            .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// DeHashed v2 search API
#[derive(Default)]
pub struct DeHashed {
    credentials: Credentials,
}

impl DeHashed {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_query(target: &Target) -> String {
        match target.kind() {
            TargetKind::Email => format!("email:{}", target.value()),
            TargetKind::Username => format!("username:{}", target.value()),
            TargetKind::Domain => format!("email:*@{}", target.value()),
            TargetKind::Keyword => target.value().to_string(),
            TargetKind::Phone => format!("phone:{}", target.value()),
        }
    }
}

fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response.entries.iter().filter_map(Entry::format).collect())
}

#[async_trait]
impl LeakSource for DeHashed {
    fn name(&self) -> &'static str {
        "dehashed"
    }

    fn add_credentials(&mut self, credentials: Vec<String>) {
        self.credentials = Credentials::from_raw(credentials);
    }

    fn rate_limit(&self) -> u32 {
        10
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(api_key) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        let request = session
            .post(API_URL)
            .header("Dehashed-Api-Key", api_key)
            .header("Accept", "application/json")
            .json(&SearchRequest {
                query: Self::build_query(target),
                page: 1,
                size: 100,
                de_dupe: true,
            });

        debug!("Sending a request in DeHashed source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;

        results.emit_all(parse_response(&response.body)?).await
    }
}
