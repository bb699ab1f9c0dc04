// src/osint/sources/osintleak.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::core::{Target, TargetKind};
use crate::error::LeakerResult;
use crate::osint::{flatten_fields, Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://osintleak.com/search_api/";
const FIELDS: &[&str] = &["email", "username", "password", "phone", "name", "ip", "url"];

/// OSINTLeak search API covering stealer logs and database leaks
#[derive(Default)]
pub struct OsintLeak {
    credentials: Credentials,
}

impl OsintLeak {
    pub fn new() -> Self {
        Self::default()
    }

    fn search_type(kind: TargetKind) -> &'static str {
        match kind {
            TargetKind::Email => "email",
            TargetKind::Username => "username",
            // no dedicated domain search; email is the closest match
            TargetKind::Domain => "email",
            TargetKind::Keyword => "password",
            TargetKind::Phone => "phone",
        }
    }
}

fn parse_response(body: &str) -> LeakerResult<Vec<String>> {
    let response: Value = serde_json::from_str(body)?;

    let entries = match response
        .get("data")
        .or_else(|| response.get("results"))
        .and_then(Value::as_array)
    {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
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
impl LeakSource for OsintLeak {
    fn name(&self) -> &'static str {
        "osintleak"
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
            .get(API_URL)
            .query(&[
                ("api_key", api_key.as_str()),
                ("query", target.value()),
                ("type", Self::search_type(target.kind())),
                ("stealerlogs", "true"),
                ("dbleaks", "true"),
                ("dbleaks2", "true"),
                ("page", "1"),
                ("page_size", "100"),
            ])
            .header("Accept", "application/json");

        debug!("Sending a request in OSINTLeak source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;

        results.emit_all(parse_response(&response.body)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata() {
        let source = OsintLeak::new();
        assert_eq!(source.name(), "osintleak");
        assert!(source.needs_key());
        assert!(!source.is_default());
        assert_eq!(source.rate_limit(), 2);
    }

    #[test]
    fn test_domain_searches_as_email() {
        assert_eq!(OsintLeak::search_type(TargetKind::Domain), "email");
        assert_eq!(OsintLeak::search_type(TargetKind::Keyword), "password");
    }

    #[test]
    fn test_parse_data_array() {
        let body = r#"{
            "data": [
                {"email": "test@example.com", "password": "leaked123", "username": "testuser"},
                {"email": "test@example.com", "phone": "+1234567890"},
                {"unrelated": "value"}
            ]
        }"#;

        assert_eq!(
            parse_response(body).unwrap(),
            vec![
                "email:test@example.com, username:testuser, password:leaked123",
                "email:test@example.com, phone:+1234567890"
            ]
        );
    }

    #[test]
    fn test_parse_results_fallback_key() {
        let body = r#"{"results": [{"url": "https://login.example.com"}]}"#;
        assert_eq!(parse_response(body).unwrap(), vec!["url:https://login.example.com"]);
    }

    #[test]
    fn test_parse_unexpected_shape_is_empty() {
        assert!(parse_response(r#"{"message": "no results"}"#).unwrap().is_empty());
    }
}
