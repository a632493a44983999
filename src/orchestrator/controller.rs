//! Page scheduler.
//!
//! Drives the page through `Idle → LoadingDots → Typing(Introduction) → Animating →
//! Typing(Reaction) → Rendered` from a single task and emits events for the
//! presentation layers. Every stage listens for `UiCommand::Quit`.

use super::summary::{build_summary, PageInputs};
use crate::aggregate::aggregate;
use crate::engine::timeline::TimelineTick;
use crate::model::{Narrative, PageEvent, PagePhase, PageSummary, Section};
use crate::typewriter::Typewriter;
use std::future::Future;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

const DOT_PERIOD: Duration = Duration::from_millis(400);

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Quit,
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Cancelled,
}

struct Scheduler<'a> {
    inputs: &'a PageInputs,
    event_tx: UnboundedSender<PageEvent>,
    cmd_rx: UnboundedReceiver<UiCommand>,
    ticker: Interval,
}

impl Scheduler<'_> {
    fn emit(&self, ev: PageEvent) -> Flow {
        if self.event_tx.send(ev).is_err() {
            // Nobody is rendering anymore.
            Flow::Cancelled
        } else {
            Flow::Continue
        }
    }

    fn enter(&self, phase: PagePhase) -> Flow {
        debug!(?phase, "page phase");
        self.emit(PageEvent::PhaseChanged { phase })
    }

    /// Wait for the narrative while animating loading dots.
    async fn loading<F>(&mut self, fut: F) -> Option<Narrative>
    where
        F: Future<Output = Narrative>,
    {
        if self.enter(PagePhase::LoadingDots) == Flow::Cancelled {
            return None;
        }
        tokio::pin!(fut);
        let started = Instant::now();
        let mut last_dots = None;
        loop {
            tokio::select! {
                narrative = &mut fut => return Some(narrative),
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(UiCommand::Quit) | None => return None,
                },
                now = self.ticker.tick() => {
                    let phase = now.saturating_duration_since(started).as_millis() / DOT_PERIOD.as_millis();
                    let dots = (phase % 4) as usize;
                    if last_dots != Some(dots) {
                        last_dots = Some(dots);
                        if self.emit(PageEvent::LoadingDots { dots }) == Flow::Cancelled {
                            return None;
                        }
                    }
                }
            }
        }
    }

    async fn typing(&mut self, section: Section, text: String) -> Flow {
        if self.enter(PagePhase::Typing(section)) == Flow::Cancelled {
            return Flow::Cancelled;
        }
        let mut tw = Typewriter::new(&text, self.inputs.cfg.type_interval);
        let started = Instant::now();
        while !tw.is_done() {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(UiCommand::Quit) | None => return Flow::Cancelled,
                },
                now = self.ticker.tick() => {
                    if tw.advance_to(now.saturating_duration_since(started)) {
                        let ev = PageEvent::Typed {
                            section,
                            text: text.clone(),
                            revealed: tw.revealed(),
                        };
                        if self.emit(ev) == Flow::Cancelled {
                            return Flow::Cancelled;
                        }
                    }
                }
            }
        }
        Flow::Continue
    }

    /// Show a section at once, without the typing effect.
    fn reveal(&self, section: Section, text: String) -> Flow {
        let mut tw = Typewriter::new(&text, self.inputs.cfg.type_interval);
        tw.finish();
        self.emit(PageEvent::Typed {
            section,
            text,
            revealed: tw.revealed(),
        })
    }

    async fn animate(&mut self) -> Flow {
        if self.enter(PagePhase::Animating) == Flow::Cancelled {
            return Flow::Cancelled;
        }
        let mut run = self.inputs.timeline().start(Instant::now());
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(UiCommand::Quit) | None => {
                        debug!("animation cancelled");
                        return Flow::Cancelled;
                    }
                },
                now = self.ticker.tick() => match run.tick(now) {
                    TimelineTick::Frame { days, last, .. } => {
                        let counts = aggregate(&self.inputs.dataset, i64::from(days));
                        // A frame that cannot be delivered aborts the sweep.
                        if self.emit(PageEvent::Frame { days, counts }) == Flow::Cancelled {
                            return Flow::Cancelled;
                        }
                        if last {
                            return Flow::Continue;
                        }
                    }
                    TimelineTick::Unchanged => {}
                    TimelineTick::Finished => return Flow::Continue,
                },
            }
        }
    }

    async fn run(&mut self) -> (Narrative, bool) {
        if self.enter(PagePhase::Idle) == Flow::Cancelled {
            return (Narrative::Disabled, true);
        }
        let inputs = self.inputs;
        let Some(narrative) = self.loading(inputs.fetch_narrative()).await else {
            return (Narrative::Disabled, true);
        };
        if let Narrative::Unavailable { reason } = &narrative {
            let note = PageEvent::Info(format!("narrative unavailable: {reason}"));
            if self.emit(note) == Flow::Cancelled {
                return (narrative, true);
            }
        }
        let intro = narrative.section_text(Section::Introduction);
        let reaction = narrative.section_text(Section::Reaction);

        if inputs.cfg.skip_intro {
            if self.animate().await == Flow::Cancelled {
                return (narrative, true);
            }
            let shown = self.reveal(Section::Introduction, intro) == Flow::Continue
                && self.reveal(Section::Reaction, reaction) == Flow::Continue;
            return (narrative, !shown);
        }

        if self.typing(Section::Introduction, intro).await == Flow::Cancelled {
            return (narrative, true);
        }
        if self.animate().await == Flow::Cancelled {
            return (narrative, true);
        }
        if self.typing(Section::Reaction, reaction).await == Flow::Cancelled {
            return (narrative, true);
        }
        (narrative, false)
    }
}

/// Run the page once and return its final state. Always ends in `Rendered`.
pub(crate) async fn run_controller(
    inputs: &PageInputs,
    event_tx: UnboundedSender<PageEvent>,
    cmd_rx: UnboundedReceiver<UiCommand>,
) -> PageSummary {
    let mut ticker = tokio::time::interval(inputs.cfg.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut scheduler = Scheduler {
        inputs,
        event_tx,
        cmd_rx,
        ticker,
    };
    let (narrative, cancelled) = scheduler.run().await;
    if cancelled {
        warn!("page cancelled before completion");
    }

    let summary = build_summary(&inputs.dataset, inputs.final_days, narrative, cancelled);
    let _ = scheduler.enter(PagePhase::Rendered);
    let _ = scheduler.emit(PageEvent::Completed {
        summary: Box::new(summary.clone()),
    });
    summary
}
