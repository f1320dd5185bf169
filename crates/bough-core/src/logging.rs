//! Logging facilities for bough.
//!
//! bough uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("bough::redirector=trace")
//!     .init();
//! ```
//!
//! The constants in [`targets`] name the subsystems so filters can be written
//! against them, and [`span_names`] names the spans opened around the more
//! expensive tree walks.

/// Span names used throughout bough.
pub mod span_names {
    /// A full dispatch of one event through the pipeline.
    pub const DISPATCH: &str = "bough::dispatch";
    /// A validate pass over a subtree.
    pub const VALIDATE: &str = "bough::validate";
    /// Materialization of a subtree.
    pub const ADD_NOTIFY: &str = "bough::add_notify";
    /// Dematerialization of a subtree.
    pub const REMOVE_NOTIFY: &str = "bough::remove_notify";
    /// Draining and dispatching posted events.
    pub const FLUSH: &str = "bough::flush";
}

/// Target names for log filtering.
pub mod targets {
    /// Tree structure: add, remove, destroy, listener counters.
    pub const TREE: &str = "bough::tree";
    /// The event dispatch pipeline.
    pub const DISPATCH: &str = "bough::dispatch";
    /// Lightweight event redirection.
    pub const REDIRECTOR: &str = "bough::redirector";
    /// Layout and validation.
    pub const LAYOUT: &str = "bough::layout";
    /// Platform peers and the toolkit.
    pub const PEER: &str = "bough::peer";
    /// Focus requests and focus ownership.
    pub const FOCUS: &str = "bough::focus";
    /// Widget behaviours.
    pub const WIDGETS: &str = "bough::widgets";
}

/// A guard that keeps a performance span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span for `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::debug_span!(target: "bough::perf", "perf", operation);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perf_span_enters_and_drops() {
        let span = PerfSpan::new(span_names::VALIDATE);
        drop(span);
    }

    #[test]
    fn targets_share_prefix() {
        for target in [
            targets::TREE,
            targets::DISPATCH,
            targets::REDIRECTOR,
            targets::LAYOUT,
            targets::PEER,
            targets::FOCUS,
            targets::WIDGETS,
        ] {
            assert!(target.starts_with("bough::"));
        }
    }
}
