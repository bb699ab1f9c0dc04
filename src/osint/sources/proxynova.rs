// src/osint/sources/proxynova.rs
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::core::Target;
use crate::error::{LeakerError, LeakerResult};
use crate::osint::{FindingSender, LeakSource};
use crate::utils::Session;

const API_URL: &str = "https://api.proxynova.com/comb";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct CombPage {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    lines: Vec<String>,
}

/// ProxyNova COMB search. Free, keyless, and ignores the target kind.
///
/// Only the first page is served to anonymous clients, so results are not
/// paginated and relevance filtering happens downstream.
#[derive(Default)]
pub struct ProxyNova;

impl ProxyNova {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_page(&self, target: &Target, start: u32, session: &Session) -> LeakerResult<CombPage> {
        let request = session.get(API_URL).query(&[
            ("query", target.value().to_string()),
            ("start", start.to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ]);

        debug!("Sending a request in ProxyNova source for {} (start={})", target, start);
        let response = session.execute(self.name(), request).await?;

        parse_page(&response.body)
    }
}

fn parse_page(body: &str) -> LeakerResult<CombPage> {
    serde_json::from_str(body)
        .map_err(|_| LeakerError::source_error("proxynova", format!("failed to parse ProxyNova response: {}", body)))
}

#[async_trait]
impl LeakSource for ProxyNova {
    fn name(&self) -> &'static str {
        "proxynova"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn needs_key(&self) -> bool {
        false
    }

    fn add_credentials(&mut self, _credentials: Vec<String>) {}

    // "You are limited to about 100 requests per minute."
    fn rate_limit(&self) -> u32 {
        90
    }

    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()> {
        let page = self.fetch_page(target, 0, session).await?;
        debug!("ProxyNova reports {} total lines for {}", page.count, target);

        results.emit_all(page.lines).await
    }
}
