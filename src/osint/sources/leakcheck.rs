// src/osint/sources/leakcheck.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::{Target, TargetKind};
use crate::error::{LeakerError, LeakerResult};
use crate::osint::{Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://leakcheck.io/api/v2/query/";

/// LeakCheck Pro API v2
#[derive(Default)]
pub struct LeakCheck {
    credentials: Credentials,
}

impl LeakCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn query_url(target: &Target) -> LeakerResult<Url> {
        let mut url = Url::parse(API_URL)?;
        url.path_segments_mut()
            .map_err(|_| LeakerError::InvalidInput(API_URL.to_string()))?
            .pop_if_empty()
            .push(target.value());

        let kind = match target.kind() {
            TargetKind::Email => "email",
            TargetKind::Username => "username",
            TargetKind::Domain => "domain",
            TargetKind::Keyword => "keyword",
            TargetKind::Phone => "phone",
        };
        url.query_pairs_mut().append_pair("type", kind);

        Ok(url)
    }
}

/// Each result lists its own populated fields under `fields`
fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let invalid = || LeakerError::source_error("leakcheck", format!("failed to parse LeakCheck response: {}", body));

    let response: Value = serde_json::from_str(body)?;

    if !response.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Err(invalid());
    }
    let found = response.get("found").and_then(Value::as_u64).ok_or_else(invalid)?;
    if found == 0 {
        return Ok(Vec::new());
    }

    let entries = response.get("result").and_then(Value::as_array).ok_or_else(invalid)?;
    let mut values = Vec::new();

    for entry in entries.iter().filter_map(Value::as_object) {
        let Some(fields) = entry.get("fields").and_then(Value::as_array) else {
            continue;
        };

        let parts: Vec<String> = fields
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|field| {
                entry
                    .get(field)
                    .and_then(Value::as_str)
                    .map(|v| format!("{}:{}", field, v))
            })
            .collect();

        if parts.is_empty() {
            debug!("LeakCheck entry without readable fields skipped");
            continue;
        }
        values.push(parts.join(", "));
    }

    Ok(values)
}

#[async_trait]
impl LeakSource for LeakCheck {
    fn name(&self) -> &'static str {
        "leakcheck"
    }

    fn add_credentials(&mut self, credentials: Vec<String>) {
        self.credentials = Credentials::from_raw(credentials);
    }

    // "By default, the LeakCheck Pro API is limited to 3 requests per second on any plan."
    fn rate_limit(&self) -> u32 {
        3
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(api_key) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        let request = session
            .get(Self::query_url(target)?)
            .header("X-API-Key", api_key)
            .header("Accept", "application/json");

        debug!("Sending a request in LeakCheck source for {}", target);
        let response = session.execute(self.name(), request).await?;

        results.emit_all(parse_response(&response.body)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata() {
        let source = LeakCheck::new();
        assert_eq!(source.name(), "leakcheck");
        assert!(source.needs_key());
        assert!(!source.is_default());
        assert_eq!(source.rate_limit(), 3);
    }

    #[test]
    fn test_query_url_encodes_target() {
        let url = LeakCheck::query_url(&Target::new("a b@test.com", TargetKind::Email)).unwrap();
        assert_eq!(url.as_str(), "https://leakcheck.io/api/v2/query/a%20b@test.com?type=email");
    }

    #[test]
    fn test_parse_results() {
        let body = r#"{
            "success": true,
            "found": 2,
            "result": [
                {"fields": ["email", "password"], "email": "a@test.com", "password": "x", "source": {"name": "db"}},
                {"fields": ["username"], "username": "alice"},
                {"email": "no-fields@test.com"}
            ]
        }"#;

        assert_eq!(
            parse_response(body).unwrap(),
            vec!["email:a@test.com, password:x", "username:alice"]
        );
    }

    #[test]
    fn test_parse_nothing_found() {
        assert!(parse_response(r#"{"success": true, "found": 0}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_unsuccessful_response_is_error() {
        let err = parse_response(r#"{"success": false, "error": "Invalid X-API-Key"}"#).unwrap_err();
        assert!(err.to_string().contains("failed to parse LeakCheck response"));
    }

    #[tokio::test]
    async fn test_no_key_yields_nothing() {
        use crate::utils::SessionConfig;
        use tokio::sync::mpsc;

        let (tx, mut rx) = mpsc::channel(1);
        let session = Session::new(&SessionConfig::default()).unwrap();
        let sender = FindingSender::new("leakcheck", tx);

        LeakCheck::new()
            .search(&Target::new("a@test.com", TargetKind::Email), &session, &sender)
            .await
            .unwrap();
        drop(sender);

        assert!(rx.recv().await.is_none());
    }
}
