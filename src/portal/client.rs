// src/portal/client.rs
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, COOKIE};

use crate::pipeline::StatementSource;
use crate::portal::models::{DocumentKind, StatementList, StatementRef, TaxpayerGrid, TaxpayerMatch};
use crate::storage::Fetcher;
use crate::utils::error::PortalError;

pub const DEFAULT_BASE_URL: &str = "https://eprijava.tax.gov.me/TaxisPortal";

// The portal is slow to render statement HTML; give it generous headroom,
// but never hang a run on one request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// Page size the portal itself uses for the statements grid.
const STATEMENT_PAGE_SIZE: usize = 20;

/// Client for the tax portal. Every request carries the session cookie;
/// obtaining or renewing the session is the operator's problem, not ours.
#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    session_cookie: String,
}

impl PortalClient {
    pub fn new(base_url: &str, session_token: &str) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie: format!("taxisSession={}", session_token),
        })
    }

    /// All portal endpoints are POSTs with an empty body and the session
    /// cookie attached.
    async fn post(&self, url: &str) -> Result<String, PortalError> {
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header(COOKIE, self.session_cookie.as_str())
            .header(CONTENT_LENGTH, "0")
            .header(ACCEPT, "application/json")
            .send()
            .await?; // Propagates reqwest::Error as PortalError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(PortalError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, PortalError> {
        match serde_json::from_str(body) {
            Ok(value) => Ok(value),
            // An expired session makes the portal answer with its HTML
            // login page instead of JSON.
            Err(_) if body.trim_start().starts_with('<') => Err(PortalError::SessionExpired),
            Err(e) => Err(PortalError::Parse(e.to_string())),
        }
    }
}

#[async_trait]
impl StatementSource for PortalClient {
    /// Looks the entity up in the taxpayer grid. Zero rows is a legitimate
    /// answer, not an error.
    async fn find_taxpayers(&self, tax_id: &str) -> Result<Vec<TaxpayerMatch>, PortalError> {
        let url = format!(
            "{}/FinancialStatement/Grid?pib={}&naziv=&orderBy=naziv&skip=0&take={}",
            self.base_url, tax_id, STATEMENT_PAGE_SIZE
        );
        let body = self.post(&url).await?;
        let grid: TaxpayerGrid = Self::parse_json(&body)?;
        Ok(grid.tax_payer_rows)
    }

    /// Lists every statement the entity has filed, paging until the portal
    /// returns an empty page.
    async fn list_statements(&self, tax_id: &str) -> Result<Vec<StatementRef>, PortalError> {
        collect_pages(|skip| {
            let url = format!(
                "{}/FinancialStatement/TaxPayerStatementsList?PIB={}&skip={}&take={}",
                self.base_url, tax_id, skip, STATEMENT_PAGE_SIZE
            );
            async move {
                let body = self.post(&url).await?;
                let page: StatementList = Self::parse_json(&body)?;
                Ok(page.data)
            }
        })
        .await
    }
}

/// Accumulates statement pages in portal order, requesting `skip` offsets in
/// STATEMENT_PAGE_SIZE steps. Stops on an empty page; a short page already
/// proves there is nothing further, so it stops there too without another
/// request.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<StatementRef>, PortalError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<StatementRef>, PortalError>>,
{
    let mut statements = Vec::new();
    let mut skip = 0;

    loop {
        let page = fetch_page(skip).await?;
        if page.is_empty() {
            break;
        }
        let page_len = page.len();
        statements.extend(page);
        if page_len < STATEMENT_PAGE_SIZE {
            break;
        }
        skip += STATEMENT_PAGE_SIZE;
    }

    Ok(statements)
}

#[async_trait]
impl Fetcher for PortalClient {
    async fn fetch(&self, tax_id: &str, kind: &DocumentKind) -> Result<String, PortalError> {
        let url = match kind {
            DocumentKind::EntityDetails => format!(
                "{}/FinancialStatement/TaxPayerDetails?PIB={}",
                self.base_url, tax_id
            ),
            DocumentKind::Statement(statement) => format!(
                "{}/FinancialStatement/Details?rbr={}",
                self.base_url, statement.number
            ),
        };
        self.post(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(range: std::ops::Range<usize>) -> Vec<StatementRef> {
        range
            .map(|i| StatementRef { number: format!("9{:04}", i), year: 2020 })
            .collect()
    }

    #[tokio::test]
    async fn collect_pages_accumulates_until_the_empty_page() {
        let mut requested_skips = Vec::new();
        let statements = collect_pages(|skip| {
            requested_skips.push(skip);
            let page = match skip {
                0 => page_of(0..STATEMENT_PAGE_SIZE),
                20 => page_of(20..2 * STATEMENT_PAGE_SIZE),
                _ => Vec::new(),
            };
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(requested_skips, vec![0, 20, 40]);
        assert_eq!(statements.len(), 2 * STATEMENT_PAGE_SIZE);
        // Portal order is preserved across page boundaries.
        assert_eq!(statements[0].number, "90000");
        assert_eq!(statements[20].number, "90020");
        assert_eq!(statements.last().unwrap().number, "90039");
    }

    #[tokio::test]
    async fn collect_pages_stops_after_a_short_page_without_another_request() {
        let mut requested_skips = Vec::new();
        let statements = collect_pages(|skip| {
            requested_skips.push(skip);
            let page = match skip {
                0 => page_of(0..STATEMENT_PAGE_SIZE),
                20 => page_of(20..25),
                _ => panic!("requested a page past the short one"),
            };
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(requested_skips, vec![0, 20]);
        assert_eq!(statements.len(), 25);
    }

    #[tokio::test]
    async fn collect_pages_returns_empty_for_an_entity_with_no_statements() {
        let mut requested_skips = Vec::new();
        let statements = collect_pages(|skip| {
            requested_skips.push(skip);
            async move { Ok(Vec::new()) }
        })
        .await
        .unwrap();

        assert_eq!(requested_skips, vec![0]);
        assert!(statements.is_empty());
    }

    #[tokio::test]
    async fn collect_pages_propagates_a_failed_page_request() {
        let result = collect_pages(|_skip| async move { Err(PortalError::SessionExpired) }).await;
        assert!(matches!(result, Err(PortalError::SessionExpired)));
    }
}
