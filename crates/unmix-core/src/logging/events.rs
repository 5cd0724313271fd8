//! Stable event names.
//!
//! Every structured event carries one of these in its `event` field so that
//! JSONL consumers can filter without matching on message text.

/// Standard event names used in logging.
pub mod event_names {
    // Solver lifecycle
    pub const EM_STARTED: &str = "em.started";
    pub const EM_ITERATION: &str = "em.iteration";
    pub const EM_GUARD_FLOOR: &str = "em.guard_floor";
    pub const EM_FINISHED: &str = "em.finished";

    // Config resolution
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";

    // Input/output
    pub const INPUT_PARSED: &str = "input.parsed";
    pub const OUTPUT_WRITTEN: &str = "output.written";

    /// All names, for schema checks.
    pub const ALL: &[&str] = &[
        EM_STARTED,
        EM_ITERATION,
        EM_GUARD_FLOOR,
        EM_FINISHED,
        CONFIG_LOADED,
        CONFIG_DEFAULT_USED,
        INPUT_PARSED,
        OUTPUT_WRITTEN,
    ];
}
