//! Terminal adapters: prompts, progress spinner, report summary.

pub mod progress;
pub mod summary;
pub mod tui;

pub use summary::print_summary;
pub use tui::{FixedInputPort, TuiInputPort};
