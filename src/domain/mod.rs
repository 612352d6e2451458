//! Core domain types for SkipFeed

mod platform;
mod search_event;

pub use platform::Platform;
pub use search_event::SearchEvent;
