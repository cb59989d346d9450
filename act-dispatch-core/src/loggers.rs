//! Logging helpers that understand batch actions
//!
//! A batch is a single action wrapping many. The helpers here expand it so
//! each contained action is logged on its own:
//!
//! - [`action_transformer`]: turn an action into what should be logged
//! - [`BatchLogger`]: level methods emitting one `tracing` event per action
//! - [`ActionLoggerMiddleware`]: store middleware with glob filtering on
//!   action types and an optional in-memory [`ActionLog`]
//!
//! # Example
//!
//! ```
//! use act_dispatch_core::loggers::{ActionLogConfig, ActionLoggerMiddleware};
//! use act_dispatch_core::{Action, Store};
//! use serde_json::json;
//!
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::default());
//! let store = Store::with_middleware(0i64, |state: i64, _: &Action| state + 1, middleware);
//!
//! store.disbatch(vec![Action::new("A", json!(1)), Action::new("B", json!(2))]);
//!
//! let types = store.with_middleware_ref(|m| {
//!     m.log()
//!         .map(|log| log.entries().map(|e| e.action_type.clone()).collect::<Vec<_>>())
//!         .unwrap_or_default()
//! });
//! assert_eq!(types, vec!["A", "B"]);
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use regex::Regex;
use tracing::Level;

use crate::action::Action;
use crate::store::Middleware;

/// What a logger should print for one dispatched action
#[derive(Debug, Clone, PartialEq)]
pub enum Logged {
    Single(Action),
    /// The contents of a batch, in order
    Batch(Vec<Action>),
}

impl Logged {
    pub fn is_batch(&self) -> bool {
        matches!(self, Logged::Batch(_))
    }

    /// The actions to log, one per entry
    pub fn into_actions(self) -> Vec<Action> {
        match self {
            Logged::Single(action) => vec![action],
            Logged::Batch(actions) => actions,
        }
    }
}

/// Expand a batch into its contained actions; anything else is left as is.
///
/// A batch whose payload cannot be read back as actions is logged as a
/// single action.
pub fn action_transformer(action: &Action) -> Logged {
    match action.batched() {
        Some(actions) => Logged::Batch(actions),
        None => Logged::Single(action.clone()),
    }
}

/// Logger with one method per level, expanding batches
///
/// `label` is attached to every event so several loggers can be told apart.
#[derive(Debug, Clone, Default)]
pub struct BatchLogger {
    label: Option<String>,
}

impl BatchLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    pub fn trace(&self, action: &Action) {
        self.log(Level::TRACE, action);
    }

    pub fn debug(&self, action: &Action) {
        self.log(Level::DEBUG, action);
    }

    pub fn info(&self, action: &Action) {
        self.log(Level::INFO, action);
    }

    pub fn warn(&self, action: &Action) {
        self.log(Level::WARN, action);
    }

    pub fn error(&self, action: &Action) {
        self.log(Level::ERROR, action);
    }

    /// Emit one event per logged action at `level`
    pub fn log(&self, level: Level, action: &Action) {
        let label = self.label.as_deref().unwrap_or("action");
        let logged = action_transformer(action);
        let in_batch = logged.is_batch();

        for action in logged.into_actions() {
            let kind = action.kind.as_str();
            let payload = action.payload.to_string();
            // tracing needs the level at compile time
            match level {
                Level::TRACE => {
                    tracing::trace!(label, action_type = kind, %payload, in_batch, error = action.error)
                }
                Level::DEBUG => {
                    tracing::debug!(label, action_type = kind, %payload, in_batch, error = action.error)
                }
                Level::INFO => {
                    tracing::info!(label, action_type = kind, %payload, in_batch, error = action.error)
                }
                Level::WARN => {
                    tracing::warn!(label, action_type = kind, %payload, in_batch, error = action.error)
                }
                _ => {
                    tracing::error!(label, action_type = kind, %payload, in_batch, error = action.error)
                }
            }
        }
    }
}

// ============================================================================
// Type filtering
// ============================================================================

/// A compiled glob over action types
///
/// `*` matches any run of characters, `?` exactly one, everything else is
/// literal. Action types such as `[3] Add todo` contain regex metacharacters,
/// so literals are escaped.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Option<Regex>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut literal = String::new();
        for c in pattern.chars() {
            match c {
                '*' | '?' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push_str(if c == '*' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = match Regex::new(&expr) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!(pattern, error = %err, "glob falls back to exact match");
                None
            }
        };
        Self {
            source: pattern.to_string(),
            regex,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => self.source == text,
        }
    }
}

/// Match `text` against a glob `pattern` (`*` and `?` wildcards)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    GlobPattern::new(pattern).matches(text)
}

fn parse_patterns(list: &str) -> Vec<GlobPattern> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(GlobPattern::new)
        .collect()
}

/// Include/exclude filter on action types
///
/// With include patterns set, an action type must match one of them.
/// Exclude patterns are applied afterwards. Batch actions are filtered per
/// contained action.
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    pub include_patterns: Vec<GlobPattern>,
    pub exclude_patterns: Vec<GlobPattern>,
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists
    ///
    /// ```
    /// use act_dispatch_core::loggers::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("TODO_*,RESET"), Some("TODO_TICK"));
    /// assert!(config.should_log("TODO_ADD"));
    /// assert!(config.should_log("RESET"));
    /// assert!(!config.should_log("TODO_TICK"));
    /// assert!(!config.should_log("[1] increment"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(parse_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(parse_patterns).unwrap_or_default(),
        }
    }

    pub fn with_patterns(include: &[&str], exclude: &[&str]) -> Self {
        Self {
            include_patterns: include.iter().map(|p| GlobPattern::new(p)).collect(),
            exclude_patterns: exclude.iter().map(|p| GlobPattern::new(p)).collect(),
        }
    }

    pub fn should_log(&self, action_type: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self.include_patterns.iter().any(|p| p.matches(action_type))
        {
            return false;
        }
        !self.exclude_patterns.iter().any(|p| p.matches(action_type))
    }
}

// ============================================================================
// In-Memory Action Log
// ============================================================================

#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub action_type: String,
    /// Compact JSON of the payload
    pub payload: String,
    pub error: bool,
    /// Sequence of the batch this action arrived in, if any
    pub batch: Option<u64>,
    pub timestamp: Instant,
    pub sequence: u64,
}

impl ActionLogEntry {
    pub fn elapsed(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }

    /// Elapsed time for display, e.g. "2.3s" or "150ms"
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    /// Maximum number of entries kept
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }
}

/// Ring buffer of recently dispatched actions
///
/// Batches are stored as their contained actions, all sharing the batch's
/// sequence in [`ActionLogEntry::batch`].
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Record `action`, returning how many entries were added
    pub fn log(&mut self, action: &Action) -> usize {
        let logged = action_transformer(action);
        let batch = if logged.is_batch() {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            Some(sequence)
        } else {
            None
        };

        let mut added = 0;
        for action in logged.into_actions() {
            if !self.config.filter.should_log(action.kind.as_str()) {
                continue;
            }
            self.push(ActionLogEntry {
                action_type: action.kind.to_string(),
                payload: action.payload.to_string(),
                error: action.error,
                batch,
                timestamp: Instant::now(),
                sequence: self.next_sequence,
            });
            self.next_sequence += 1;
            added += 1;
        }
        added
    }

    fn push(&mut self, entry: ActionLogEntry) {
        if self.config.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// The most recent `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &ActionLogConfig {
        &self.config
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware logging every dispatched action through `tracing`
///
/// Optionally keeps an [`ActionLog`] for later inspection. Batches are
/// expanded so each contained action is filtered and logged on its own.
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<ActionLog>,
    active: bool,
}

impl Default for ActionLoggerMiddleware {
    fn default() -> Self {
        Self::new(ActionLoggerConfig::default())
    }
}

impl ActionLoggerMiddleware {
    /// Tracing only
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            active: true,
        }
    }

    /// Tracing plus an in-memory log
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            active: true,
        }
    }

    /// When inactive every hook is a no-op
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    pub fn log_mut(&mut self) -> Option<&mut ActionLog> {
        self.log.as_mut()
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }
}

impl Middleware for ActionLoggerMiddleware {
    fn before(&mut self, action: &Action) {
        if !self.active {
            return;
        }

        let logged = action_transformer(action);
        let in_batch = logged.is_batch();
        for action in logged.into_actions() {
            if self.config.should_log(action.kind.as_str()) {
                tracing::debug!(action_type = %action.kind, in_batch, error = action.error, "action");
            }
        }

        if let Some(log) = self.log.as_mut() {
            log.log(action);
        }
    }

    fn after(&mut self, _action: &Action) {}
}
