mod charts;
mod export;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::loader::Dataset;
use crate::model::{PageEvent, PagePhase};
use crate::orchestrator::{run_controller, PageInputs, UiCommand};
use crate::typewriter::visible_lines;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Terminal,
};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::info;

use charts::{draw_detail, draw_orders, draw_race_chart};
use export::{copy_summary, save_and_show_path};
use help::draw_help;
use state::UiState;

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    let inputs = PageInputs::prepare(cfg).await?;

    // Unbounded channels keep the scheduler from ever waiting on the renderer.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<PageEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let dataset = inputs.dataset.clone();
    let state = UiState::new(inputs.cfg.current_president.clone(), inputs.final_days);
    let ui_handle = std::thread::spawn(move || run_threaded(dataset, state, event_rx, cmd_tx));

    let summary = run_controller(&inputs, event_tx, cmd_rx).await;
    info!(cancelled = summary.cancelled, "page finished");

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    if let Some(p) = inputs.cfg.export_json.as_deref() {
        crate::storage::export_json(p, &summary)?;
    }
    Ok(())
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    dataset: Arc<Dataset>,
    mut state: UiState,
    mut event_rx: UnboundedReceiver<PageEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // Fast enough to show every animation frame.
    let tick_rate = Duration::from_millis(30);
    terminal.draw(|f| draw(f.area(), f, &state, &dataset)).ok();
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state, &dataset)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char('s')) => save_and_show_path(&mut state),
                    (_, KeyCode::Char('y')) => copy_summary(&mut state),
                    (_, KeyCode::Tab) => state.tab = (state.tab + 1) % 2,
                    (_, KeyCode::Char('?')) => state.tab = 1,
                    (_, KeyCode::Up) | (_, KeyCode::Char('k')) => state.select_prev(),
                    (_, KeyCode::Down) | (_, KeyCode::Char('j')) => state.select_next(),
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, dataset: &Dataset) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Chart"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "eo-pace: {}",
            state.header()
        )))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_page(chunks[1], f, state, dataset),
        _ => draw_help(chunks[1], f),
    }
}

fn narrative_lines(text: &str, revealed: usize) -> Vec<Line<'static>> {
    visible_lines(text, revealed)
        .into_iter()
        .map(Line::from)
        .collect()
}

fn draw_page(area: Rect, f: &mut ratatui::Frame, state: &UiState, dataset: &Dataset) {
    let chart_height = (state.counts.len() as u16).max(1) + 2;
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6),         // Introduction
                Constraint::Min(chart_height), // Race chart
                Constraint::Length(9),         // Selected president + current orders
                Constraint::Length(4),         // Reaction
                Constraint::Length(3),         // Status
            ]
            .as_ref(),
        )
        .split(area);

    let intro = if state.is_loading() {
        vec![Line::from(Span::styled(
            format!("Loading{}", ".".repeat(state.dots)),
            Style::default().fg(Color::Gray),
        ))]
    } else {
        narrative_lines(&state.intro.text, state.intro.revealed)
    };
    f.render_widget(
        Paragraph::new(intro)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        main[0],
    );

    draw_race_chart(main[1], f, state, dataset);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(main[2]);
    draw_detail(lower[0], f, state, dataset);
    draw_orders(lower[1], f, state, dataset);

    f.render_widget(
        Paragraph::new(narrative_lines(
            &state.reaction.text,
            state.reaction.revealed,
        ))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL)),
        main[3],
    );

    let phase = match state.phase {
        PagePhase::Idle | PagePhase::LoadingDots => "loading",
        PagePhase::Typing(_) => "typing",
        PagePhase::Animating => "animating",
        PagePhase::Rendered => "done",
    };
    let status = Line::from(vec![
        Span::styled(format!("[{phase}] "), Style::default().fg(Color::Cyan)),
        Span::raw(state.info.clone()),
        Span::styled(
            "   q quit  ↑/↓ select  s save  y copy  tab help",
            Style::default().fg(Color::Gray),
        ),
    ]);
    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status")),
        main[4],
    );
}
