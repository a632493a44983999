use std::time::Duration;

/// Reveals a string one character per `per_char` interval.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    per_char: Duration,
    revealed: usize,
}

impl Typewriter {
    pub fn new(text: &str, per_char: Duration) -> Self {
        Self {
            chars: text.chars().collect(),
            per_char,
            revealed: 0,
        }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Move the cursor to where it should be after `elapsed`. Never moves backwards.
    /// Returns true when the visible text changed.
    pub fn advance_to(&mut self, elapsed: Duration) -> bool {
        let target = if self.per_char.is_zero() {
            self.chars.len()
        } else {
            let steps = elapsed.as_nanos() / self.per_char.as_nanos();
            usize::try_from(steps)
                .unwrap_or(usize::MAX)
                .min(self.chars.len())
        };
        if target > self.revealed {
            self.revealed = target;
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self) {
        self.revealed = self.chars.len();
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.chars.len()
    }
}

/// Split revealed text into display lines at literal newlines.
pub fn visible_lines(text: &str, revealed: usize) -> Vec<String> {
    let shown: String = text.chars().take(revealed).collect();
    shown.split('\n').map(str::to_string).collect()
}
