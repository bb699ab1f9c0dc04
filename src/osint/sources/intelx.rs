// src/osint/sources/intelx.rs
use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::RequestBuilder;
use tracing::{debug, warn};

use crate::core::Target;
use crate::error::{LeakerError, LeakerResult};
use crate::osint::{Credentials, FindingSender, LeakSource};
use crate::utils::Session;

const SOURCE_NAME: &str = "intelx";
const POLL_ATTEMPTS: usize = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const TERMINATE_TIMEOUT: Duration = Duration::from_secs(5);

/// A `HOST:API_KEY` pair, e.g. `2.intelx.io:<uuid>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntelxKey {
    pub host: String,
    pub api_key: String,
}

impl IntelxKey {
    fn parse(raw: &str) -> Option<Self> {
        let (host, api_key) = raw.trim().split_once(':')?;
        if host.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self {
            host: host.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("https://{}/{}", self.host, path)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    term: &'a str,
    maxresults: u32,
    // 4 = date descending
    sort: u32,
    // 0 = all media types
    media: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    id: String,
    // 0 = success, 1 = invalid term, 2 = max concurrent searches
    status: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ResultRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    mediah: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    bucket: String,
}

/// Polling status of a running search
#[derive(Debug, Deserialize)]
struct ResultResponse {
    #[serde(default)]
    records: Vec<ResultRecord>,
    // 0 = more results, 1 = done, 2 = not found, 3 = keep trying
    status: i64,
}

impl ResultResponse {
    fn is_finished(&self) -> bool {
        self.status == 1 || self.status == 2
    }
}

/// Intelligence X phonebook/search API.
///
/// Searches are asynchronous upstream: start one, poll for records, then
/// terminate it to release the slot.
#[derive(Default)]
pub struct IntelX {
    credentials: Credentials<IntelxKey>,
}

impl IntelX {
    pub fn new() -> Self {
        Self::default()
    }

    async fn start_search(&self, key: &IntelxKey, target: &Target, session: &Session) -> LeakerResult<String> {
        let request = session
            .post(key.api_url("intelligent/search"))
            .header("x-key", &key.api_key)
            .header("Accept", "application/json")
            .json(&SearchRequest {
                term: target.value(),
                maxresults: 100,
                sort: 4,
                media: 0,
            });

        debug!("Sending search request in IntelX source for {}", target);
        let response = session.execute(self.name(), request).await?.ensure_ok(self.name())?;
        let search: SearchResponse = response.json()?;

        if search.status != 0 {
            return Err(LeakerError::source_error(
                self.name(),
                format!("IntelX search failed with status {}", search.status),
            ));
        }

        debug!("IntelX search started with ID {}", search.id);
        Ok(search.id)
    }

    async fn poll(&self, key: &IntelxKey, search_id: &str, session: &Session) -> LeakerResult<ResultResponse> {
        let request = session
            .get(key.api_url("intelligent/search/result"))
            .query(&[("id", search_id), ("limit", "100"), ("previewlines", "8")])
            .header("x-key", &key.api_key)
            .header("Accept", "application/json");

        session.execute(self.name(), request).await?.json()
    }

    async fn collect(
        &self,
        key: &IntelxKey,
        search_id: &str,
        session: &Session,
        results: &FindingSender,
    ) -> LeakerResult<()> {
        for _ in 0..POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let page = self.poll(key, search_id, session).await?;
            for record in &page.records {
                let value = format_record(record);
                if !value.is_empty() {
                    results.emit(value).await?;
                }
            }

            if page.is_finished() {
                break;
            }
        }
        Ok(())
    }
}

/// A started upstream search that still holds one of the account's search slots.
///
/// Dropping it unfinished, e.g. when the search task is abandoned on
/// cancellation, fires the terminate call in the background.
struct RunningSearch {
    session: Session,
    key: IntelxKey,
    id: String,
    terminated: bool,
}

impl RunningSearch {
    fn new(session: Session, key: IntelxKey, id: String) -> Self {
        Self {
            session,
            key,
            id,
            terminated: false,
        }
    }

    fn terminate_request(&self) -> RequestBuilder {
        self.session
            .get(self.key.api_url("intelligent/search/terminate"))
            .query(&[("id", self.id.as_str())])
            .header("x-key", &self.key.api_key)
            .timeout(TERMINATE_TIMEOUT)
    }

    async fn terminate(mut self) {
        self.terminated = true;
        if let Err(e) = self.session.execute(SOURCE_NAME, self.terminate_request()).await {
            debug!("Could not terminate IntelX search {}: {}", self.id, e);
        }
    }
}

impl Drop for RunningSearch {
    fn drop(&mut self) {
        if self.terminated {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        debug!("Terminating abandoned IntelX search {}", self.id);
        let request = self.terminate_request();
        let id = std::mem::take(&mut self.id);
        runtime.spawn(async move {
            if let Err(e) = request.send().await {
                debug!("Could not terminate IntelX search {}: {}", id, e);
            }
        });
    }
}

fn format_record(record: &ResultRecord) -> String {
    [
        ("name", &record.name),
        ("type", &record.mediah),
        ("bucket", &record.bucket),
        ("date", &record.date),
    ]
    .iter()
    .filter(|(_, v)| !v.is_empty())
    .map(|(k, v)| format!("{}:{}", k, v))
    .collect::<Vec<_>>()
    .join(", ")
}

#[async_trait]
impl LeakSource for IntelX {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// Keys must be `HOST:API_KEY`; malformed entries are dropped with a warning.
    fn add_credentials(&mut self, credentials: Vec<String>) {
        let keys = credentials
            .iter()
            .filter_map(|raw| {
                let key = IntelxKey::parse(raw);
                if key.is_none() {
                    warn!(
                        "IntelX: invalid key format {:?}, expected HOST:API_KEY (e.g. 2.intelx.io:your-uuid-key)",
                        raw
                    );
                }
                key
            })
            .collect();

        self.credentials.replace(keys);
    }

    fn rate_limit(&self) -> u32 {
        1
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let Some(key) = self.credentials.pick(self.name()) else {
            return Ok(());
        };

        let search_id = self.start_search(key, target, session).await?;
        let search = RunningSearch::new(session.clone(), key.clone(), search_id);
        let outcome = self.collect(key, &search.id, session, results).await;
        search.terminate().await;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata() {
        let source = IntelX::new();
        assert_eq!(source.name(), "intelx");
        assert!(source.needs_key());
        assert!(!source.is_default());
        assert_eq!(source.rate_limit(), 1);
    }

    #[test]
    fn test_add_credentials_parses_host_and_key() {
        let mut source = IntelX::new();
        source.add_credentials(vec![
            "2.intelx.io:uuid-key-1".to_string(),
            "free.intelx.io:uuid-key-2".to_string(),
        ]);
        assert_eq!(source.credentials.len(), 2);

        let key = source.credentials.pick("intelx").unwrap();
        assert!(key.host.ends_with("intelx.io"));
        assert!(key.api_key.starts_with("uuid-key-"));
    }

    #[test]
    fn test_add_credentials_rejects_invalid_format() {
        let mut source = IntelX::new();
        source.add_credentials(vec!["invalid-no-colon".to_string(), ":missing-host".to_string()]);
        assert!(source.credentials.is_empty());
    }

    #[test]
    fn test_format_record() {
        let record = ResultRecord {
            name: "test@example.com".to_string(),
            mediah: "Paste".to_string(),
            bucket: "pastes".to_string(),
            date: "2024-01-01".to_string(),
        };
        assert_eq!(
            format_record(&record),
            "name:test@example.com, type:Paste, bucket:pastes, date:2024-01-01"
        );
        assert_eq!(format_record(&ResultRecord::default()), "");
    }

    #[tokio::test]
    async fn test_abandoned_search_is_terminated() {
        use crate::utils::SessionConfig;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let key = IntelxKey {
            host: listener.local_addr().unwrap().to_string(),
            api_key: "uuid-key".to_string(),
        };
        let session = Session::new(&SessionConfig::default()).unwrap();

        drop(RunningSearch::new(session, key, "search-id".to_string()));

        let accepted = tokio::time::timeout(Duration::from_secs(5), listener.accept()).await;
        assert!(matches!(accepted, Ok(Ok(_))));
    }

    #[test]
    fn test_result_status() {
        let page: ResultResponse = serde_json::from_str(r#"{"records": [], "status": 3}"#).unwrap();
        assert!(!page.is_finished());
        let page: ResultResponse = serde_json::from_str(r#"{"status": 2}"#).unwrap();
        assert!(page.is_finished());
    }
}
