//! Page preparation and final summary assembly.
//!
//! Shared by the animated scheduler and the non-interactive text/JSON modes so
//! every output reports the same numbers.

use crate::aggregate::{aggregate, final_days, orders_within};
use crate::engine::narrative::{compose_prompt, NarrativeClient, PromptFacts, DEFAULT_PROMPT_TEMPLATE};
use crate::engine::{build_client, timeline::Timeline};
use crate::loader::{load_dataset, Dataset};
use crate::model::{Narrative, PageSummary, RunConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tracing::info;

/// Everything the page needs, resolved once before the first frame.
pub(crate) struct PageInputs {
    pub cfg: RunConfig,
    pub dataset: Arc<Dataset>,
    pub final_days: u32,
    pub narrative: Option<NarrativeClient>,
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Resolve the final day of the sweep from the configuration.
pub(crate) fn resolve_final_days(cfg: &RunConfig) -> Result<u32> {
    if let Some(days) = cfg.final_days_override {
        return Ok(days);
    }
    let start = cfg.term_start.context("term start date is required")?;
    Ok(final_days(start, cfg.as_of.unwrap_or_else(today)))
}

impl PageInputs {
    /// Validate configuration, load both datasets and set up the narrative client.
    pub(crate) async fn prepare(cfg: RunConfig) -> Result<Self> {
        cfg.validate().context("invalid configuration")?;
        let client = build_client(&cfg.user_agent, cfg.http_timeout)?;
        let dataset = load_dataset(&client, &cfg)
            .await
            .context("failed to load executive order datasets")?;
        let final_days = resolve_final_days(&cfg)?;
        info!(final_days, president = %cfg.current_president, "page prepared");
        let narrative = cfg
            .narrative_url
            .as_ref()
            .map(|url| NarrativeClient::new(client.clone(), url.clone()));
        Ok(Self {
            cfg,
            dataset: Arc::new(dataset),
            final_days,
            narrative,
        })
    }

    pub(crate) fn timeline(&self) -> Timeline {
        Timeline::new(self.final_days, self.cfg.duration)
    }

    pub(crate) fn prompt(&self) -> String {
        let counts = aggregate(&self.dataset, i64::from(self.final_days));
        let template = self
            .cfg
            .prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT_TEMPLATE);
        compose_prompt(
            template,
            &PromptFacts {
                days: self.final_days,
                president: &self.cfg.current_president,
                counts: &counts,
            },
        )
    }

    /// Fetch the narrative, or `Disabled` when no endpoint is configured.
    pub(crate) async fn fetch_narrative(&self) -> Narrative {
        match &self.narrative {
            Some(client) => client.narrative(&self.prompt()).await,
            None => Narrative::Disabled,
        }
    }
}

/// Assemble the final page state.
pub(crate) fn build_summary(
    dataset: &Dataset,
    final_days: u32,
    narrative: Narrative,
    cancelled: bool,
) -> PageSummary {
    let threshold = i64::from(final_days);
    PageSummary {
        generated_at_utc: OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        current_president: dataset.current_president.clone(),
        final_days,
        counts: aggregate(dataset, threshold),
        current_orders: orders_within(dataset, &dataset.current_president, threshold),
        narrative,
        undated_records: dataset.report.undated,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{build_dataset, CurrentTermDefaults};
    use crate::model::Party;
    use std::time::Duration;
    use time::macros::date;

    fn config() -> RunConfig {
        RunConfig {
            current_source: "current.json".into(),
            historical_source: "past.json".into(),
            current_president: "Donald Trump 2nd".into(),
            current_party: Party::Republican,
            term_start: Some(date!(2025 - 01 - 20)),
            as_of: Some(date!(2025 - 02 - 19)),
            final_days_override: None,
            duration: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(50),
            type_interval: Duration::from_millis(10),
            skip_intro: false,
            narrative_url: None,
            prompt_template: None,
            http_timeout: Duration::from_secs(5),
            user_agent: "eo-pace-test".into(),
            export_json: None,
        }
    }

    #[test]
    fn final_days_from_as_of_or_override() {
        let mut cfg = config();
        assert_eq!(resolve_final_days(&cfg).unwrap(), 30);
        cfg.final_days_override = Some(12);
        assert_eq!(resolve_final_days(&cfg).unwrap(), 12);
    }

    #[test]
    fn summary_lists_current_orders_in_window() {
        let defaults = CurrentTermDefaults {
            president: "Donald Trump 2nd".into(),
            party: Party::Republican,
            term_start: date!(2025 - 01 - 20),
        };
        let current = r#"{"results": [
            {"title": "a", "executive_order_number": 14148, "signing_date": "2025-01-20"},
            {"title": "b", "executive_order_number": 14200, "signing_date": "2025-03-01"}
        ]}"#;
        let ds = build_dataset(current, "[]", &defaults).unwrap();
        let summary = build_summary(&ds, 30, Narrative::Disabled, false);
        assert_eq!(summary.final_days, 30);
        assert_eq!(summary.counts[0].count, 1);
        assert_eq!(summary.current_orders.len(), 1);
        assert_eq!(summary.current_orders[0].title, "a");
        assert!(!summary.cancelled);
    }
}
