//! Mode view-models: per-screen interaction state and key handling.
//!
//! The mode set is closed, so dispatch is a single match in the app
//! controller rather than open-ended polymorphism.

pub mod browse;
pub mod details;
pub mod manage;

pub use browse::{BrowseAction, BrowseMode};
pub use details::DetailsMode;
pub use manage::{ManageMode, ManageOutcome, PaneFocus};

/// Top-level view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Details,
    Help,
    ColumnManagement,
}
