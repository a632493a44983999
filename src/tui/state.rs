use crate::model::{PageEvent, PagePhase, PageSummary, PresidentCount, Section};

/// A section of narrative text and how much of it is on screen.
#[derive(Debug, Default, Clone)]
pub struct TypedText {
    pub text: String,
    pub revealed: usize,
}

pub struct UiState {
    pub tab: usize,
    pub phase: PagePhase,
    pub info: String,
    pub current_president: String,
    pub final_days: u32,

    pub dots: usize,
    pub intro: TypedText,
    pub reaction: TypedText,

    /// Day shown by the counter; `None` until the first frame arrives.
    pub days: Option<u32>,
    pub counts: Vec<PresidentCount>,
    pub selected: usize,

    pub summary: Option<PageSummary>,
}

impl UiState {
    pub fn new(current_president: impl Into<String>, final_days: u32) -> Self {
        Self {
            tab: 0,
            phase: PagePhase::Idle,
            info: String::new(),
            current_president: current_president.into(),
            final_days,
            dots: 0,
            intro: TypedText::default(),
            reaction: TypedText::default(),
            days: None,
            counts: Vec::new(),
            selected: 0,
            summary: None,
        }
    }

    pub fn apply_event(&mut self, ev: PageEvent) {
        match ev {
            PageEvent::PhaseChanged { phase } => {
                self.phase = phase;
            }
            PageEvent::LoadingDots { dots } => self.dots = dots,
            PageEvent::Typed {
                section,
                text,
                revealed,
            } => {
                let slot = match section {
                    Section::Introduction => &mut self.intro,
                    Section::Reaction => &mut self.reaction,
                };
                slot.text = text;
                slot.revealed = revealed;
            }
            PageEvent::Frame { days, counts } => {
                self.days = Some(days);
                self.counts = counts;
                self.clamp_selection();
            }
            PageEvent::Info(msg) => self.info = msg,
            PageEvent::Completed { summary } => {
                self.days = Some(summary.final_days);
                self.counts = summary.counts.clone();
                self.clamp_selection();
                if summary.cancelled {
                    self.info = "Stopped early.".into();
                } else if self.info.is_empty() {
                    self.info = "Done. s saves the summary, y copies it.".into();
                }
                self.summary = Some(*summary);
            }
        }
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.counts.len() {
            self.selected = self.counts.len().saturating_sub(1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.counts.len() {
            self.selected += 1;
        }
    }

    pub fn selected_president(&self) -> Option<&str> {
        self.counts.get(self.selected).map(|c| c.president.as_str())
    }

    /// Day used for chart titles: the live counter, or 0 before the sweep.
    pub fn shown_days(&self) -> u32 {
        self.days.unwrap_or(0)
    }

    /// Page header; the day follows the counter like the chart title.
    pub fn header(&self) -> String {
        format!(
            "{} Days into {}'s Term",
            self.shown_days(),
            self.current_president
        )
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, PagePhase::Idle | PagePhase::LoadingDots)
    }
}
