//! Dataset loading and normalization.
//!
//! Two resources feed the chart: the current-term snapshot written by `fetch`
//! (`{ "results": [...] }`) and the historical dataset (a bare array or the same
//! wrapped shape). Both are normalized into [`ExecutiveOrderRecord`]s.

use crate::error::{EoError, EoResult};
use crate::model::{parse_date, ExecutiveOrderRecord, Party, PresidentInfo, RunConfig};
use serde::Deserialize;
use std::collections::HashSet;
use time::Date;
use tracing::{debug, info, warn};

/// Record as it appears in either input file. Field names follow the Federal
/// Register API; the aliases accept already-normalized files.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOrder {
    title: Option<String>,
    #[serde(alias = "order_number")]
    executive_order_number: Option<serde_json::Value>,
    signing_date: Option<String>,
    publication_date: Option<String>,
    #[serde(alias = "document_url")]
    html_url: Option<String>,
    president: Option<String>,
    party: Option<String>,
    #[serde(alias = "term_start_date")]
    start_date: Option<String>,
}

/// Values applied to current-term records, which carry no president fields.
#[derive(Debug, Clone)]
pub struct CurrentTermDefaults {
    pub president: String,
    pub party: Party,
    pub term_start: Date,
}

impl CurrentTermDefaults {
    pub fn from_config(cfg: &RunConfig) -> EoResult<Self> {
        let term_start = cfg
            .term_start
            .ok_or_else(|| EoError::Config("term start date is required".into()))?;
        Ok(Self {
            president: cfg.current_president.clone(),
            party: cfg.current_party.clone(),
            term_start,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub current: usize,
    pub historical: usize,
    /// Records kept but excluded from every count because a date did not parse.
    pub undated: usize,
    pub duplicates: usize,
}

/// Everything the aggregator needs: the records plus the full president set.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ExecutiveOrderRecord>,
    pub presidents: Vec<PresidentInfo>,
    pub report: LoadReport,
    pub current_president: String,
}

impl Dataset {
    pub fn president(&self, name: &str) -> Option<&PresidentInfo> {
        self.presidents.iter().find(|p| p.name == name)
    }
}

/// Extract the record array from `[...]` or `{ "results": [...] }`.
fn extract_results(origin: &str, value: serde_json::Value) -> EoResult<Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            Some(serde_json::Value::Null) | None => Err(EoError::shape(
                origin,
                "object has no \"results\" array",
            )),
            Some(other) => Err(EoError::shape(
                origin,
                format!("\"results\" is {}, expected an array", json_kind(&other)),
            )),
        },
        other => Err(EoError::shape(
            origin,
            format!("top level is {}, expected an array or object", json_kind(&other)),
        )),
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn parse_raw_orders(origin: &str, body: &str) -> EoResult<Vec<RawOrder>> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|source| EoError::Json {
        origin: origin.to_string(),
        source,
    })?;
    extract_results(origin, value)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<RawOrder>(item).map_err(|source| EoError::Json {
                origin: format!("{origin} (record {i})"),
                source,
            })
        })
        .collect()
}

fn order_number_text(v: Option<serde_json::Value>) -> String {
    match v {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn lenient_date(origin: &str, field: &str, raw: Option<&str>) -> Option<Date> {
    let raw = raw?;
    match parse_date(raw) {
        Ok(d) => Some(d),
        Err(_) => {
            warn!(origin, field, value = raw, "unparsable date; record excluded from counts");
            None
        }
    }
}

fn normalize_current(raw: RawOrder, defaults: &CurrentTermDefaults) -> ExecutiveOrderRecord {
    ExecutiveOrderRecord {
        title: raw.title.unwrap_or_default(),
        order_number: order_number_text(raw.executive_order_number),
        signing_date: lenient_date("current", "signing_date", raw.signing_date.as_deref()),
        publication_date: raw.publication_date,
        document_url: raw.html_url,
        president: defaults.president.clone(),
        party: defaults.party.clone(),
        term_start_date: Some(defaults.term_start),
    }
}

fn normalize_historical(raw: RawOrder) -> EoResult<ExecutiveOrderRecord> {
    let president = raw
        .president
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| EoError::shape("historical", "record without a \"president\" field"))?;
    Ok(ExecutiveOrderRecord {
        title: raw.title.unwrap_or_default(),
        order_number: order_number_text(raw.executive_order_number),
        signing_date: lenient_date("historical", "signing_date", raw.signing_date.as_deref()),
        publication_date: raw.publication_date,
        document_url: raw.html_url,
        president,
        party: raw
            .party
            .as_deref()
            .map(Party::from_label)
            .unwrap_or_else(|| Party::Other(String::new())),
        term_start_date: lenient_date("historical", "start_date", raw.start_date.as_deref()),
    })
}

/// Build a dataset from the raw text of both resources.
pub fn build_dataset(
    current_body: &str,
    historical_body: &str,
    defaults: &CurrentTermDefaults,
) -> EoResult<Dataset> {
    let current_raw = parse_raw_orders("current", current_body)?;
    let historical_raw = parse_raw_orders("historical", historical_body)?;

    let mut report = LoadReport {
        current: current_raw.len(),
        historical: historical_raw.len(),
        ..Default::default()
    };

    let mut normalized = Vec::with_capacity(current_raw.len() + historical_raw.len());
    normalized.extend(current_raw.into_iter().map(|r| normalize_current(r, defaults)));
    for raw in historical_raw {
        normalized.push(normalize_historical(raw)?);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut records = Vec::with_capacity(normalized.len());
    let mut presidents: Vec<PresidentInfo> = Vec::new();

    for rec in normalized {
        if !rec.order_number.is_empty()
            && !seen.insert((rec.president.clone(), rec.order_number.clone()))
        {
            debug!(
                president = %rec.president,
                order = %rec.order_number,
                "duplicate executive order number dropped"
            );
            report.duplicates += 1;
            continue;
        }
        if rec.day_offset().is_none() {
            report.undated += 1;
        }
        if !presidents.iter().any(|p| p.name == rec.president) {
            presidents.push(PresidentInfo {
                name: rec.president.clone(),
                party: rec.party.clone(),
                term_start_date: rec.term_start_date,
            });
        } else if let Some(p) = presidents
            .iter_mut()
            .find(|p| p.name == rec.president && p.term_start_date.is_none())
        {
            // First record carried no usable start date; take the first one that does.
            p.term_start_date = rec.term_start_date;
        }
        records.push(rec);
    }

    // The current president is always shown, even before the first order is signed.
    if !presidents.iter().any(|p| p.name == defaults.president) {
        presidents.push(PresidentInfo {
            name: defaults.president.clone(),
            party: defaults.party.clone(),
            term_start_date: Some(defaults.term_start),
        });
    }

    info!(
        current = report.current,
        historical = report.historical,
        presidents = presidents.len(),
        undated = report.undated,
        duplicates = report.duplicates,
        "dataset loaded"
    );

    Ok(Dataset {
        records,
        presidents,
        report,
        current_president: defaults.president.clone(),
    })
}

/// Read a resource from a filesystem path or an `http(s)://` URL.
pub async fn read_source(client: &reqwest::Client, location: &str) -> EoResult<String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let resp = client
            .get(location)
            .send()
            .await
            .map_err(|e| EoError::network(location, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EoError::Http {
                status: status.as_u16(),
                url: location.to_string(),
            });
        }
        resp.text().await.map_err(|e| EoError::network(location, e))
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|source| EoError::Io {
                path: location.to_string(),
                source,
            })
    }
}

/// Load both resources named by the configuration.
pub async fn load_dataset(client: &reqwest::Client, cfg: &RunConfig) -> EoResult<Dataset> {
    let defaults = CurrentTermDefaults::from_config(cfg)?;
    let (current, historical) = futures::try_join!(
        read_source(client, &cfg.current_source),
        read_source(client, &cfg.historical_source),
    )?;
    build_dataset(&current, &historical, &defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_server::{spawn, Canned};
    use std::collections::HashMap;
    use time::macros::date;

    fn defaults() -> CurrentTermDefaults {
        CurrentTermDefaults {
            president: "Donald Trump 2nd".into(),
            party: Party::Republican,
            term_start: date!(2025 - 01 - 20),
        }
    }

    const CURRENT: &str = r#"{
        "count": 2,
        "results": [
            {"title": "Initial Rescissions", "executive_order_number": 14148,
             "signing_date": "2025-01-20", "publication_date": "2025-01-28",
             "html_url": "https://www.federalregister.gov/d/2025-01901"},
            {"title": "Second", "executive_order_number": "14149",
             "signing_date": "2025-01-21", "publication_date": "2025-01-29"}
        ]
    }"#;

    #[test]
    fn accepts_array_and_wrapped_historical_shapes() {
        let array = r#"[{"title": "a", "executive_order_number": 1, "signing_date": "2017-01-20",
                         "president": "P", "party": "Republican", "start_date": "2017-01-20"}]"#;
        let wrapped = format!(r#"{{"results": {array}}}"#);

        let a = build_dataset(CURRENT, array, &defaults()).unwrap();
        let b = build_dataset(CURRENT, &wrapped, &defaults()).unwrap();
        assert_eq!(a.records, b.records);
        assert_eq!(a.report.historical, 1);
        assert_eq!(a.report.current, 2);
    }

    #[test]
    fn current_records_get_term_defaults() {
        let ds = build_dataset(CURRENT, "[]", &defaults()).unwrap();
        let first = &ds.records[0];
        assert_eq!(first.president, "Donald Trump 2nd");
        assert_eq!(first.party, Party::Republican);
        assert_eq!(first.term_start_date, Some(date!(2025 - 01 - 20)));
        assert_eq!(first.order_number, "14148");
        assert_eq!(ds.records[1].order_number, "14149");
        assert_eq!(
            first.document_url.as_deref(),
            Some("https://www.federalregister.gov/d/2025-01901")
        );
    }

    #[test]
    fn unparsable_dates_are_counted_as_undated() {
        let hist = r#"[
            {"title": "ok", "executive_order_number": 1, "signing_date": "2009-01-21",
             "president": "Barack Obama", "party": "Democratic", "start_date": "2009-01-20"},
            {"title": "bad", "executive_order_number": 2, "signing_date": "21/01/2009",
             "president": "Barack Obama", "party": "Democratic", "start_date": "2009-01-20"}
        ]"#;
        let ds = build_dataset("[]", hist, &defaults()).unwrap();
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.report.undated, 1);
        assert_eq!(ds.records[1].signing_date, None);
    }

    #[test]
    fn duplicate_order_numbers_within_a_term_are_dropped() {
        let current = r#"{"results": [
            {"title": "a", "executive_order_number": 14148, "signing_date": "2025-01-20"},
            {"title": "a again", "executive_order_number": "14148", "signing_date": "2025-01-20"}
        ]}"#;
        let ds = build_dataset(current, "[]", &defaults()).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.report.duplicates, 1);
    }

    #[test]
    fn current_president_is_known_without_records() {
        let ds = build_dataset(r#"{"results": []}"#, "[]", &defaults()).unwrap();
        assert_eq!(ds.presidents.len(), 1);
        assert_eq!(ds.presidents[0].name, "Donald Trump 2nd");
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(matches!(
            build_dataset(r#"{"count": 3}"#, "[]", &defaults()),
            Err(EoError::Shape { .. })
        ));
        assert!(matches!(
            build_dataset("42", "[]", &defaults()),
            Err(EoError::Shape { .. })
        ));
        assert!(matches!(
            build_dataset("{not json", "[]", &defaults()),
            Err(EoError::Json { .. })
        ));
        let no_president = r#"[{"title": "x", "signing_date": "2001-01-20"}]"#;
        assert!(matches!(
            build_dataset("[]", no_president, &defaults()),
            Err(EoError::Shape { .. })
        ));
    }

    #[tokio::test]
    async fn reads_sources_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current.json");
        std::fs::write(&path, CURRENT).unwrap();
        let client = reqwest::Client::new();
        let body = read_source(&client, path.to_str().unwrap()).await.unwrap();
        assert!(body.contains("Initial Rescissions"));

        let missing = dir.path().join("missing.json");
        let err = read_source(&client, missing.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, EoError::Io { .. }));
    }

    #[tokio::test]
    async fn reads_sources_over_http() {
        let mut routes = HashMap::new();
        routes.insert(
            "/current.json".to_string(),
            Canned {
                status: 200,
                body: CURRENT.to_string(),
            },
        );
        let (base, seen) = spawn(routes).await;
        let client = reqwest::Client::new();

        let body = read_source(&client, &format!("{base}/current.json"))
            .await
            .unwrap();
        assert_eq!(body, CURRENT);

        let err = read_source(&client, &format!("{base}/missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, EoError::Http { status: 404, .. }));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(method, _, _)| method == "GET"));
    }
}
