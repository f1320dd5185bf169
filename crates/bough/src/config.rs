//! Tree configuration.

/// Default delay, in milliseconds, handed to peers with repaint requests.
pub const DEFAULT_REPAINT_DELAY_MS: u64 = 0;

/// Configuration for a [`Tree`](crate::Tree).
///
/// # Example
///
/// ```
/// use bough::TreeConfig;
///
/// let config = TreeConfig {
///     coalesce_events: false,
///     ..TreeConfig::default()
/// };
/// assert!(!config.coalesce_events);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Merge consecutive compatible events when posted events are flushed.
    pub coalesce_events: bool,
    /// Re-check every container's listener counters after each adjustment.
    ///
    /// This walks the subtree, so it is only on by default in debug builds.
    pub verify_listener_counts: bool,
    /// Delay passed to peers when a repaint is scheduled.
    pub repaint_delay_ms: u64,
    /// Whether nodes without a behaviour opinion receive legacy mouse events.
    pub legacy_mouse_events: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            coalesce_events: true,
            verify_listener_counts: cfg!(debug_assertions),
            repaint_delay_ms: DEFAULT_REPAINT_DELAY_MS,
            legacy_mouse_events: true,
        }
    }
}

impl TreeConfig {
    /// Configuration tuned for tests: no coalescing, counters always verified.
    pub fn strict() -> Self {
        Self {
            coalesce_events: false,
            verify_listener_counts: true,
            ..Default::default()
        }
    }
}
