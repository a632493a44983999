use crate::model::PageSummary;
use anyhow::Result;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Save the finished page and report the path in the status line.
pub fn save_and_show_path(state: &mut UiState) {
    let Some(summary) = state.summary.as_ref() else {
        state.info = "Nothing to save until the chart finishes.".into();
        return;
    };
    match crate::storage::save_summary(summary) {
        Ok(path) => {
            state.info = format!("Saved: {}", path.display());
        }
        Err(e) => {
            state.info = format!("Save failed: {e:#}");
        }
    }
}

/// Plain-text rendering of the finished page, as printed by `--text`.
pub fn summary_text(summary: &PageSummary) -> String {
    crate::text_summary::build_text_summary(summary)
        .lines
        .join("\n")
}

pub fn copy_summary(state: &mut UiState) {
    let Some(summary) = state.summary.as_ref() else {
        state.info = "Nothing to copy until the chart finishes.".into();
        return;
    };
    state.info = match copy_to_clipboard(&summary_text(summary)) {
        Ok(()) => "✓ Copied summary to clipboard".into(),
        Err(e) => format!("Clipboard copy failed: {e:#}"),
    };
}

/// Initialize the clipboard manager thread if not already initialized.
/// This creates a background thread that processes clipboard operations sequentially,
/// keeping each clipboard instance alive for a sufficient duration.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        // Linux clipboard managers read lazily from the owning process.
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard thread without blocking the UI.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
