//! Federal Register document-search client.
//!
//! Pulls executive-order metadata for one administration and date range. The
//! paginated strategy follows `next_page_url` until the API stops returning one.

use crate::error::{EoError, EoResult};
use crate::model::{FetchConfig, FetchStrategy};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::macros::format_description;
use time::Date;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://www.federalregister.gov/api/v1/documents.json";

const FIELDS: &[&str] = &[
    "citation",
    "document_number",
    "end_page",
    "html_url",
    "pdf_url",
    "type",
    "subtype",
    "publication_date",
    "signing_date",
    "start_page",
    "title",
    "disposition_notes",
    "executive_order_number",
    "not_received_for_publication",
    "full_text_xml_url",
    "body_html_url",
    "json_url",
];

/// One page as returned by the documents endpoint.
#[derive(Debug, Deserialize)]
struct DocumentPage {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    next_page_url: Option<String>,
}

/// Snapshot written by the `fetch` command; the loader reads it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub count: usize,
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub snapshot: OrderSnapshot,
    pub pages: usize,
    /// Total the API claims, which can differ from what was retrieved.
    pub reported_count: Option<u64>,
}

fn us_date(d: Date) -> String {
    d.format(format_description!("[month]/[day]/[year]"))
        .unwrap_or_else(|_| d.to_string())
}

/// Build the first-page query URL for the configured administration and range.
pub fn build_query_url(cfg: &FetchConfig) -> EoResult<Url> {
    let mut url = Url::parse(&cfg.api_url)
        .map_err(|e| EoError::Config(format!("invalid API URL {}: {e}", cfg.api_url)))?;
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("conditions[correction]", "0");
        q.append_pair("conditions[president]", &cfg.president_slug);
        q.append_pair("conditions[presidential_document_type]", "executive_order");
        if let Some(from) = cfg.signed_from {
            q.append_pair("conditions[signing_date][gte]", &us_date(from));
        }
        if let Some(to) = cfg.signed_to {
            q.append_pair("conditions[signing_date][lte]", &us_date(to));
        }
        q.append_pair("conditions[type][]", "PRESDOCU");
        for field in FIELDS {
            q.append_pair("fields[]", field);
        }
        q.append_pair("include_pre_1994_docs", "true");
        q.append_pair("maximum_per_page", &cfg.per_page.to_string());
        q.append_pair("order", "executive_order");
        q.append_pair("per_page", &cfg.per_page.to_string());
    }
    Ok(url)
}

pub struct FederalRegisterClient {
    client: reqwest::Client,
}

impl FederalRegisterClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get_page(&self, url: &str) -> EoResult<DocumentPage> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EoError::network(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EoError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text().await.map_err(|e| EoError::network(url, e))?;
        serde_json::from_str(&body).map_err(|source| EoError::Json {
            origin: url.to_string(),
            source,
        })
    }

    /// Retrieve executive orders using the configured strategy.
    pub async fn fetch(&self, cfg: &FetchConfig) -> EoResult<FetchOutcome> {
        cfg.validate()?;
        let first = build_query_url(cfg)?;
        let mut next = Some(first.to_string());
        let mut visited: HashSet<String> = HashSet::new();
        let mut results = Vec::new();
        let mut pages = 0usize;
        let mut reported_count = None;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                debug!(%url, "pagination cursor repeated; stopping");
                break;
            }
            debug!(%url, page = pages + 1, "fetching Federal Register page");
            let page = self.get_page(&url).await?;
            pages += 1;
            if reported_count.is_none() {
                reported_count = page.count;
            }
            match page.results {
                Some(items) => results.extend(items),
                // The API omits `results` entirely when nothing matches.
                None if page.count == Some(0) => {}
                None => return Err(EoError::shape(url, "response has no \"results\" array")),
            }
            if cfg.strategy == FetchStrategy::Paginated {
                next = page.next_page_url.filter(|u| !u.is_empty());
            }
        }

        info!(orders = results.len(), pages, "fetched executive orders");
        Ok(FetchOutcome {
            snapshot: OrderSnapshot {
                count: results.len(),
                results,
            },
            pages,
            reported_count,
        })
    }
}
