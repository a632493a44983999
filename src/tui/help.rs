use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::charts::party_color;
use crate::model::Party;

fn key_line(key: &str, pad: usize, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what.to_string()),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit (stops the animation first)"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("j/k", Style::default().fg(Color::Magenta)),
            Span::raw("  Select a president"),
        ]),
        key_line("s", 11, "Save summary JSON"),
        key_line("y", 11, "Copy text summary to clipboard"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Chart:"),
        Line::from("  Bars count executive orders signed within the first N days of each term."),
        Line::from("  The day counter sweeps from 0 to the current day of the current term."),
        Line::from(vec![
            Span::raw("  Colours: "),
            Span::styled("█ Republican", Style::default().fg(party_color(&Party::Republican))),
            Span::raw("  "),
            Span::styled("█ Democratic", Style::default().fg(party_color(&Party::Democratic))),
            Span::raw("  "),
            Span::styled("█ Other", Style::default().fg(party_color(&Party::Other(String::new())))),
        ]),
        Line::from(""),
        Line::from("Data comes from the Federal Register; `eo-pace fetch` refreshes it."),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
