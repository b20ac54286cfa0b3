//! Diagnostic text for an external trace collaborator.
//!
//! The codec describes what it encodes and decodes as short human-readable
//! lines. Those lines go to a registered [`TraceSink`], filtered by a
//! [`TraceConfig`]. Nothing depends on the sink being present; with no sink
//! the lines are dropped.
//!
//! Every line is also emitted through the `log` facade, so a host with a
//! logger installed sees the same text whether or not it registers a sink.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use teddy_codec::{MessageCodec, TraceConfig};
//!
//! let codec = MessageCodec::new()
//!     .with_trace_config(TraceConfig::from_spec("decode,error"))
//!     .with_trace_sink(Arc::new(|line: &str| eprintln!("{line}")));
//! ```

use std::fmt;
use std::sync::Arc;

/// Receives diagnostic text from the codec.
///
/// Called synchronously from whichever thread is using the codec. The codec
/// does not serialize calls, so implementations shared between threads must
/// cope with concurrent `on_trace`.
pub trait TraceSink: Send + Sync {
    /// One line of diagnostic text.
    fn on_trace(&self, text: &str);
}

impl<F> TraceSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_trace(&self, text: &str) {
        self(text)
    }
}

/// Categories of diagnostic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraceCategory {
    /// A message was encoded.
    Encode,
    /// A message was classified or decoded.
    Decode,
    /// An encode or decode failed.
    Error,
}

impl TraceCategory {
    /// Every category.
    pub const ALL: [TraceCategory; 3] =
        [TraceCategory::Encode, TraceCategory::Decode, TraceCategory::Error];

    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "encode" | "enc" => Some(TraceCategory::Encode),
            "decode" | "dec" => Some(TraceCategory::Decode),
            "error" | "err" => Some(TraceCategory::Error),
            _ => None,
        }
    }
}

impl fmt::Display for TraceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceCategory::Encode => write!(f, "ENC"),
            TraceCategory::Decode => write!(f, "DEC"),
            TraceCategory::Error => write!(f, "ERR"),
        }
    }
}

/// Which categories reach the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceConfig {
    pub encode: bool,
    pub decode: bool,
    pub error: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl TraceConfig {
    /// Every category enabled.
    pub fn all() -> Self {
        TraceConfig {
            encode: true,
            decode: true,
            error: true,
        }
    }

    /// Nothing reaches the sink.
    pub fn none() -> Self {
        TraceConfig {
            encode: false,
            decode: false,
            error: false,
        }
    }

    /// Create a config from a comma-separated list of `encode`, `decode`
    /// and `error`.
    ///
    /// `all` or `*` enables everything; `none` or an empty string disables
    /// everything. Unrecognised entries are ignored.
    ///
    /// ```rust,ignore
    /// let config = TraceConfig::from_spec("decode,error");
    /// assert!(!config.is_enabled(TraceCategory::Encode));
    /// ```
    pub fn from_spec(spec: &str) -> Self {
        let mut config = Self::none();

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if part == "*" || part.eq_ignore_ascii_case("all") {
                config = Self::all();
            } else if part.eq_ignore_ascii_case("none") {
                config = Self::none();
            } else if let Some(category) = TraceCategory::parse(part) {
                config.enable(category);
            } else {
                log::debug!("ignoring unknown trace category {:?}", part);
            }
        }

        config
    }

    /// Turn a category on.
    pub fn enable(&mut self, category: TraceCategory) {
        *self.flag(category) = true;
    }

    /// Turn a category off.
    pub fn disable(&mut self, category: TraceCategory) {
        *self.flag(category) = false;
    }

    /// Check if a category reaches the sink.
    pub fn is_enabled(&self, category: TraceCategory) -> bool {
        match category {
            TraceCategory::Encode => self.encode,
            TraceCategory::Decode => self.decode,
            TraceCategory::Error => self.error,
        }
    }

    /// Check if any category reaches the sink.
    pub fn any_enabled(&self) -> bool {
        TraceCategory::ALL.iter().any(|c| self.is_enabled(*c))
    }

    fn flag(&mut self, category: TraceCategory) -> &mut bool {
        match category {
            TraceCategory::Encode => &mut self.encode,
            TraceCategory::Decode => &mut self.decode,
            TraceCategory::Error => &mut self.error,
        }
    }
}

/// Routes diagnostic text to the `log` facade and an optional sink.
#[derive(Clone, Default)]
pub struct Tracer {
    config: TraceConfig,
    sink: Option<Arc<dyn TraceSink>>,
}

impl Tracer {
    /// Create a tracer with no sink.
    pub fn new(config: TraceConfig) -> Self {
        Tracer { config, sink: None }
    }

    /// Get the tracer configuration.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: TraceConfig) {
        self.config = config;
    }

    /// Whether a sink is registered.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Register a sink, replacing any previous one.
    pub fn set_sink(&mut self, sink: Arc<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    /// Drop the registered sink.
    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    /// Check if text in `category` would reach a sink.
    pub fn would_emit(&self, category: TraceCategory) -> bool {
        self.sink.is_some() && self.config.is_enabled(category)
    }

    /// Emit a line in `category`.
    pub fn log(&self, category: TraceCategory, text: &str) {
        match category {
            TraceCategory::Error => log::debug!("[{}] {}", category, text),
            _ => log::trace!("[{}] {}", category, text),
        }

        if !self.config.is_enabled(category) {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.on_trace(text);
        }
    }

    /// Emit a line regardless of category filtering.
    pub fn announce(&self, text: &str) {
        log::trace!("{}", text);
        if let Some(sink) = &self.sink {
            sink.on_trace(text);
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collecting() -> (Arc<Mutex<Vec<String>>>, Arc<dyn TraceSink>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let sink: Arc<dyn TraceSink> = Arc::new(move |text: &str| {
            captured.lock().unwrap().push(text.to_string());
        });
        (lines, sink)
    }

    #[test]
    fn test_config_from_spec_empty() {
        let config = TraceConfig::from_spec("");
        assert!(!config.any_enabled());
    }

    #[test]
    fn test_config_from_spec_categories() {
        let config = TraceConfig::from_spec("decode, error");
        assert!(!config.is_enabled(TraceCategory::Encode));
        assert!(config.is_enabled(TraceCategory::Decode));
        assert!(config.is_enabled(TraceCategory::Error));
    }

    #[test]
    fn test_config_from_spec_all_and_none() {
        assert_eq!(TraceConfig::from_spec("*"), TraceConfig::all());
        assert_eq!(TraceConfig::from_spec("ALL"), TraceConfig::all());
        assert_eq!(TraceConfig::from_spec("none"), TraceConfig::none());
        assert!(TraceConfig::from_spec("all,none,encode").encode);
    }

    #[test]
    fn test_config_from_spec_ignores_unknown() {
        let config = TraceConfig::from_spec("bogus,encode,,");
        assert!(config.is_enabled(TraceCategory::Encode));
        assert!(!config.is_enabled(TraceCategory::Decode));
    }

    #[test]
    fn test_default_enables_everything() {
        let config = TraceConfig::default();
        for category in TraceCategory::ALL {
            assert!(config.is_enabled(category));
        }
    }

    #[test]
    fn test_tracer_without_sink() {
        let tracer = Tracer::default();
        assert!(!tracer.would_emit(TraceCategory::Decode));
        // Must not panic.
        tracer.log(TraceCategory::Decode, "dropped");
        tracer.announce("dropped");
    }

    #[test]
    fn test_tracer_filters_by_category() {
        let (lines, sink) = collecting();
        let mut tracer = Tracer::new(TraceConfig::from_spec("error"));
        tracer.set_sink(sink);

        tracer.log(TraceCategory::Encode, "enc");
        tracer.log(TraceCategory::Error, "err");
        tracer.announce("ready");

        assert_eq!(*lines.lock().unwrap(), vec!["err", "ready"]);
    }

    #[test]
    fn test_tracer_clear_sink() {
        let (lines, sink) = collecting();
        let mut tracer = Tracer::default();
        tracer.set_sink(sink);
        tracer.log(TraceCategory::Decode, "one");
        tracer.clear_sink();
        tracer.log(TraceCategory::Decode, "two");

        assert_eq!(*lines.lock().unwrap(), vec!["one"]);
        assert!(!tracer.has_sink());
    }
}
