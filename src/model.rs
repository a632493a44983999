use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;
use time::macros::format_description;
use time::Date;

use crate::error::{EoError, EoResult};

/// Parse a `YYYY-MM-DD` calendar date. Timestamps such as `2025-01-20T00:00:00`
/// are accepted and truncated to their date part.
pub fn parse_date(value: &str) -> EoResult<Date> {
    let trimmed = value.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(head, format_description!("[year]-[month]-[day]")).map_err(|_| EoError::Date {
        value: value.to_string(),
    })
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]")).unwrap_or_else(|_| date.to_string())
}

/// Serde adapter for `Option<Date>` stored as `YYYY-MM-DD`.
pub mod opt_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_some(&format_date(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.and_then(|v| parse_date(&v).ok()))
    }
}

/// Party affiliation; decides the bar colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Party {
    Republican,
    Democratic,
    Other(String),
}

impl Party {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Republican" => Party::Republican,
            "Democratic" | "Democrat" => Party::Democratic,
            other => Party::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Party::Republican => "Republican",
            Party::Democratic => "Democratic",
            Party::Other(s) => s.as_str(),
        }
    }

    /// Hex colour used by the chart.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Party::Republican => (0x2F, 0x41, 0x56),
            Party::Democratic => (0x56, 0x7C, 0x9D),
            Party::Other(_) => (0xCB, 0xD9, 0xE6),
        }
    }
}

impl Serialize for Party {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Party {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Party::from_label(&raw))
    }
}

/// One executive order, normalized from either dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveOrderRecord {
    pub title: String,
    pub order_number: String,
    #[serde(default, with = "opt_date")]
    pub signing_date: Option<Date>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    pub president: String,
    pub party: Party,
    #[serde(default, with = "opt_date")]
    pub term_start_date: Option<Date>,
}

impl ExecutiveOrderRecord {
    /// Whole days between the term start and the signing date.
    ///
    /// `None` when either date is missing, which keeps the record out of every window.
    pub fn day_offset(&self) -> Option<i64> {
        let signed = self.signing_date?;
        let start = self.term_start_date?;
        Some((signed - start).whole_days())
    }

    /// Numeric executive order number when it parses.
    pub fn order_number_value(&self) -> Option<u64> {
        self.order_number.trim().parse().ok()
    }
}

/// Per-president count for one threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresidentCount {
    pub president: String,
    pub count: usize,
    #[serde(default, with = "opt_date")]
    pub term_start_date: Option<Date>,
}

/// A president known to the dataset, with the data needed for zero-filling and sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresidentInfo {
    pub name: String,
    pub party: Party,
    #[serde(default, with = "opt_date")]
    pub term_start_date: Option<Date>,
}

/// Which Federal Register retrieval strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStrategy {
    SinglePage,
    Paginated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub api_url: String,
    pub president_slug: String,
    #[serde(default, with = "opt_date")]
    pub signed_from: Option<Date>,
    #[serde(default, with = "opt_date")]
    pub signed_to: Option<Date>,
    pub per_page: u32,
    pub strategy: FetchStrategy,
    #[serde(with = "humantime_serde")]
    pub http_timeout: Duration,
    pub user_agent: String,
}

/// Immutable run configuration, built once from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub current_source: String,
    pub historical_source: String,
    pub current_president: String,
    pub current_party: Party,
    #[serde(default, with = "opt_date")]
    pub term_start: Option<Date>,
    #[serde(default, with = "opt_date")]
    pub as_of: Option<Date>,
    pub final_days_override: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub type_interval: Duration,
    pub skip_intro: bool,
    pub narrative_url: Option<String>,
    #[serde(default)]
    pub prompt_template: Option<String>,
    #[serde(with = "humantime_serde")]
    pub http_timeout: Duration,
    pub user_agent: String,
    #[serde(default)]
    pub export_json: Option<PathBuf>,
}

impl RunConfig {
    pub fn validate(&self) -> EoResult<()> {
        if self.frame_interval.is_zero() {
            return Err(EoError::Config("frame interval must be > 0".into()));
        }
        if self.type_interval.is_zero() {
            return Err(EoError::Config("type interval must be > 0".into()));
        }
        if self.current_president.trim().is_empty() {
            return Err(EoError::Config(
                "current president label must not be empty".into(),
            ));
        }
        if self.term_start.is_none() {
            return Err(EoError::Config("term start date is required".into()));
        }
        Ok(())
    }
}

impl FetchConfig {
    pub fn validate(&self) -> EoResult<()> {
        if !(1..=1000).contains(&self.per_page) {
            return Err(EoError::Config(format!(
                "per_page must be in 1..=1000, got {}",
                self.per_page
            )));
        }
        if self.president_slug.trim().is_empty() {
            return Err(EoError::Config("president slug must not be empty".into()));
        }
        if let (Some(from), Some(to)) = (self.signed_from, self.signed_to) {
            if from > to {
                return Err(EoError::Config(format!(
                    "signing range is inverted: {} > {}",
                    format_date(from),
                    format_date(to)
                )));
            }
        }
        Ok(())
    }
}

/// The two narrative blocks shown around the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Introduction,
    Reaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Narrative {
    Ready {
        introduction: String,
        reaction: String,
    },
    Unavailable {
        reason: String,
    },
    Disabled,
}

impl Narrative {
    /// Text to show for a section, with surrounding whitespace trimmed for display.
    /// Unavailable narratives get a typed placeholder instead of invented content.
    pub fn section_text(&self, section: Section) -> String {
        match (self, section) {
            (Narrative::Ready { introduction, .. }, Section::Introduction) => {
                introduction.trim().to_string()
            }
            (Narrative::Ready { reaction, .. }, Section::Reaction) => reaction.trim().to_string(),
            (Narrative::Unavailable { reason }, Section::Introduction) => {
                format!("Narrative unavailable: {reason}")
            }
            (Narrative::Unavailable { .. }, Section::Reaction) => String::new(),
            (Narrative::Disabled, _) => String::new(),
        }
    }
}

/// States of the page scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagePhase {
    Idle,
    LoadingDots,
    Typing(Section),
    Animating,
    Rendered,
}

/// Final page contents, shared by the text, JSON and TUI outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub generated_at_utc: String,
    pub current_president: String,
    pub final_days: u32,
    pub counts: Vec<PresidentCount>,
    pub current_orders: Vec<ExecutiveOrderRecord>,
    pub narrative: Narrative,
    pub undated_records: usize,
    #[serde(default)]
    pub cancelled: bool,
}

/// Events emitted by the scheduler and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum PageEvent {
    PhaseChanged {
        phase: PagePhase,
    },
    LoadingDots {
        dots: usize,
    },
    Typed {
        section: Section,
        text: String,
        revealed: usize,
    },
    Frame {
        days: u32,
        counts: Vec<PresidentCount>,
    },
    Info(String),
    Completed {
        // Boxed to keep the event small.
        summary: Box<PageSummary>,
    },
}
