use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::state::UiState;
use crate::aggregate::{latest_order, orders_within};
use crate::bars::bar_rows;
use crate::loader::Dataset;
use crate::model::{format_date, Party};

pub fn party_color(party: &Party) -> Color {
    let (r, g, b) = party.rgb();
    Color::Rgb(r, g, b)
}

fn party_of(dataset: &Dataset, president: &str) -> Party {
    dataset
        .president(president)
        .map(|p| p.party.clone())
        .unwrap_or_else(|| Party::Other(String::new()))
}

/// Lighten an RGB colour the way d3's `color.brighter(k)` does.
pub fn brighter(color: Color, k: f64) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let factor = (1.0 / 0.7f64).powf(k);
            let scale = |c: u8| (f64::from(c) * factor).round().min(255.0) as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other => other,
    }
}

/// One line per president: name, bar coloured by party, count.
pub fn bar_lines(state: &UiState, dataset: &Dataset, width: u16) -> Vec<Line<'static>> {
    let name_width = state
        .counts
        .iter()
        .map(|c| c.president.chars().count())
        .max()
        .unwrap_or(0);
    // marker + name + gap + count column
    let reserved = (name_width + 2 + 2 + 6) as u16;
    let bar_width = width.saturating_sub(reserved);

    bar_rows(&state.counts, bar_width)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = i == state.selected;
            let color = party_color(&party_of(dataset, &row.president));
            let name_style = if selected {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            let bar_style = if selected {
                Style::default()
                    .fg(brighter(color, 0.5))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            Line::from(vec![
                Span::raw(if selected { "> " } else { "  " }),
                Span::styled(format!("{:<name_width$}", row.president), name_style),
                Span::raw("  "),
                Span::styled("█".repeat(usize::from(row.width)), bar_style),
                Span::styled(
                    format!(" {}", row.count),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect()
}

pub fn draw_race_chart(area: Rect, f: &mut Frame, state: &UiState, dataset: &Dataset) {
    let title = format!("EOs per President (First {} Days)", state.shown_days());
    let block = Block::default().borders(Borders::ALL).title(title);

    let lines = if state.counts.is_empty() {
        vec![waiting_line()]
    } else {
        bar_lines(state, dataset, area.width.saturating_sub(2))
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn waiting_line() -> Line<'static> {
    Line::from(Span::styled(
        "Waiting for the day counter…",
        Style::default().fg(Color::Gray),
    ))
}

/// Selected president with their latest order inside the current window.
pub fn detail_lines(state: &UiState, dataset: &Dataset) -> Vec<Line<'static>> {
    let Some(name) = state.selected_president() else {
        return vec![Line::from("No president selected")];
    };
    let party = party_of(dataset, name);
    let count = state.counts.get(state.selected).map(|c| c.count).unwrap_or(0);

    let mut lines = vec![
        Line::from(Span::styled(
            name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(party_color(&party))),
            Span::raw(party.label().to_string()),
        ]),
        Line::from(format!("{} order(s) by day {}", count, state.shown_days())),
        Line::from(""),
    ];
    match latest_order(dataset, name, i64::from(state.shown_days())) {
        Some(o) => {
            lines.push(Line::from(Span::styled(
                "Latest:",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(o.title));
            lines.push(Line::from(format!(
                "Published {}",
                o.publication_date.as_deref().unwrap_or("-")
            )));
            lines.push(Line::from(format!("EO {}", o.order_number)));
        }
        None => lines.push(Line::from("No orders yet")),
    }
    lines
}

pub fn draw_detail(area: Rect, f: &mut Frame, state: &UiState, dataset: &Dataset) {
    let p = Paragraph::new(detail_lines(state, dataset))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Selected"));
    f.render_widget(p, area);
}

/// Current-term orders inside the window, newest EO first. Refilled every frame.
pub fn order_lines(state: &UiState, dataset: &Dataset) -> Vec<Line<'static>> {
    let Some(days) = state.days else {
        return vec![waiting_line()];
    };
    let orders = orders_within(dataset, &state.current_president, i64::from(days));
    if orders.is_empty() {
        return vec![Line::from("None in this window.")];
    }
    orders
        .into_iter()
        .map(|o| {
            Line::from(vec![
                Span::styled(
                    format!("EO {:<6} ", o.order_number),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!(
                        "{} ",
                        o.signing_date.map(format_date).unwrap_or_else(|| "-".into())
                    ),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(o.title),
                Span::styled(
                    o.document_url.map(|u| format!("  {u}")).unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect()
}

pub fn draw_orders(area: Rect, f: &mut Frame, state: &UiState, dataset: &Dataset) {
    let title = format!("{} orders", state.current_president);
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Paragraph::new(order_lines(state, dataset)).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{build_dataset, CurrentTermDefaults};
    use crate::model::PageEvent;
    use time::macros::date;

    fn dataset() -> Dataset {
        let defaults = CurrentTermDefaults {
            president: "Donald Trump 2nd".into(),
            party: Party::Republican,
            term_start: date!(2025 - 01 - 20),
        };
        let hist = r#"[
            {"title": "x", "executive_order_number": 9, "signing_date": "2021-01-22",
             "president": "Joe Biden", "party": "Democratic", "start_date": "2021-01-20"}
        ]"#;
        build_dataset("[]", hist, &defaults).unwrap()
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn bars_use_party_colours_and_mark_selection() {
        let ds = dataset();
        let mut state = UiState::new("Donald Trump 2nd", 5);
        state.apply_event(PageEvent::Frame {
            days: 5,
            counts: crate::aggregate::aggregate(&ds, 5),
        });
        state.select_next();

        let lines = bar_lines(&state, &ds, 60);
        assert_eq!(lines.len(), 2);
        assert!(text(&lines[0]).starts_with("  Donald Trump 2nd"));
        assert!(text(&lines[1]).starts_with("> Joe Biden"));
        assert!(text(&lines[1]).ends_with(" 1"));
        // Selected bar is drawn lighter than its party colour.
        assert_eq!(
            lines[1].spans[3].style.fg,
            Some(brighter(Color::Rgb(0x56, 0x7C, 0x9D), 0.5))
        );
        assert_ne!(
            lines[1].spans[3].style.fg,
            Some(Color::Rgb(0x56, 0x7C, 0x9D))
        );
        assert_eq!(
            lines[0].spans[3].style.fg,
            Some(Color::Rgb(0x2F, 0x41, 0x56))
        );
        // Zero count draws no bar.
        assert_eq!(lines[0].spans[3].content, "");
    }

    #[test]
    fn brighter_matches_d3_factor_and_saturates() {
        // (1 / 0.7)^0.5 ~= 1.195
        assert_eq!(
            brighter(Color::Rgb(100, 0, 250), 0.5),
            Color::Rgb(120, 0, 255)
        );
        assert_eq!(brighter(Color::Gray, 0.5), Color::Gray);
    }

    fn current_term_dataset() -> Dataset {
        let defaults = CurrentTermDefaults {
            president: "Donald Trump 2nd".into(),
            party: Party::Republican,
            term_start: date!(2025 - 01 - 20),
        };
        let current = r#"{"results": [
            {"title": "First", "executive_order_number": 14148, "signing_date": "2025-01-20",
             "publication_date": "2025-01-28", "html_url": "https://example.gov/14148"},
            {"title": "Later", "executive_order_number": 14200, "signing_date": "2025-01-30",
             "publication_date": "2025-02-04"}
        ]}"#;
        build_dataset(current, "[]", &defaults).unwrap()
    }

    #[test]
    fn orders_table_grows_with_each_frame() {
        let ds = current_term_dataset();
        let mut state = UiState::new("Donald Trump 2nd", 30);
        assert_eq!(text(&order_lines(&state, &ds)[0]), "Waiting for the day counter…");

        state.apply_event(PageEvent::Frame {
            days: 3,
            counts: crate::aggregate::aggregate(&ds, 3),
        });
        let early = order_lines(&state, &ds);
        assert_eq!(early.len(), 1);
        assert!(text(&early[0]).contains("First"));
        assert!(text(&early[0]).ends_with("https://example.gov/14148"));

        state.apply_event(PageEvent::Frame {
            days: 12,
            counts: crate::aggregate::aggregate(&ds, 12),
        });
        let later = order_lines(&state, &ds);
        assert_eq!(later.len(), 2);
        // Newest EO first.
        assert!(text(&later[0]).starts_with("EO 14200"));
        assert!(text(&later[1]).starts_with("EO 14148"));
    }

    #[test]
    fn detail_shows_publication_date_of_latest_order() {
        let ds = current_term_dataset();
        let mut state = UiState::new("Donald Trump 2nd", 30);
        state.apply_event(PageEvent::Frame {
            days: 12,
            counts: crate::aggregate::aggregate(&ds, 12),
        });
        let lines: Vec<String> = detail_lines(&state, &ds).iter().map(text).collect();
        assert!(lines.contains(&"Later".to_string()));
        assert!(lines.contains(&"Published 2025-02-04".to_string()));
        assert!(lines.contains(&"EO 14200".to_string()));
        assert!(!lines.iter().any(|l| l.contains("2025-01-30")));
    }
}
