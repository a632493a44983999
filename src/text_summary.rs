//! Text summary builder for CLI output.
//!
//! Formats the final page (counts, current-term orders, narrative) as plain lines.

use crate::bars::bar_rows;
use crate::model::{format_date, Narrative, PageSummary, Section};

const BAR_WIDTH: u16 = 40;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_text_summary(summary: &PageSummary) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} Days into {}'s Term",
        summary.final_days, summary.current_president
    ));

    match &summary.narrative {
        Narrative::Disabled => {}
        n => {
            lines.push(String::new());
            lines.extend(
                n.section_text(Section::Introduction)
                    .lines()
                    .map(str::to_string),
            );
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "EOs per President (First {} Days)",
        summary.final_days
    ));
    let name_width = summary
        .counts
        .iter()
        .map(|c| c.president.chars().count())
        .max()
        .unwrap_or(0);
    for row in bar_rows(&summary.counts, BAR_WIDTH) {
        lines.push(format!(
            "  {:<name_width$}  {:>4}  {}",
            row.president,
            row.count,
            "█".repeat(usize::from(row.width)),
        ));
    }
    if summary.undated_records > 0 {
        lines.push(format!(
            "  ({} record(s) with unparsable dates excluded)",
            summary.undated_records
        ));
    }

    lines.push(String::new());
    lines.push(format!("{} orders:", summary.current_president));
    if summary.current_orders.is_empty() {
        lines.push("  none in this window".into());
    }
    for o in &summary.current_orders {
        let signed = o
            .signing_date
            .map(format_date)
            .unwrap_or_else(|| "-".into());
        let url = o.document_url.as_deref().unwrap_or("-");
        lines.push(format!(
            "  EO {:<6} {}  {}  {}",
            o.order_number, signed, o.title, url
        ));
    }

    let reaction = summary.narrative.section_text(Section::Reaction);
    if !reaction.is_empty() {
        lines.push(String::new());
        lines.extend(reaction.lines().map(str::to_string));
    }

    if summary.cancelled {
        lines.push(String::new());
        lines.push("(cancelled before the animation finished)".into());
    }

    TextSummary { lines }
}
