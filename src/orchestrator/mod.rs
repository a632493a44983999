//! Page orchestration.
//!
//! This module resolves the page inputs (datasets, final day, narrative client),
//! drives the animated page through its phases, and assembles the final summary
//! that every presentation layer reports.

mod controller;
mod summary;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use summary::{build_summary, PageInputs};
