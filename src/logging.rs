//! Subscriber setup for the factory's tracing output
//!
//! Every event the factory emits uses the `bean_factory` target, so it can
//! be filtered independently of the application's own logs.
//!
//! # Features
//!
//! - `logging` - emit events (default)
//! - `logging-json` - JSON subscriber, for log aggregation
//! - `logging-pretty` - multi-line coloured subscriber, for development
//!
//! # Example
//!
//! ```rust,ignore
//! use bean_factory::logging;
//!
//! // JSON if logging-json is enabled, pretty otherwise
//! logging::init();
//!
//! // Only factory events, at trace level, with call sites
//! logging::builder()
//!     .trace()
//!     .factory_only()
//!     .with_file()
//!     .with_line_number()
//!     .pretty()
//!     .init();
//! ```

#[cfg(feature = "logging")]
use tracing::Level;

/// Target used by every event the factory emits
pub const TARGET: &str = "bean_factory";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line, coloured
    Pretty,
    /// One line per event
    Compact,
}

/// Subscriber configuration
#[cfg(feature = "logging")]
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
    with_thread_names: bool,
}

#[cfg(feature = "logging")]
impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
            with_thread_names: false,
        }
    }
}

#[cfg(feature = "logging")]
impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum level to record
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Record cache hits, reference resolution and injected properties
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    /// Record registrations and bean creation
    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Overwritten descriptions, skipped properties and reference cycles
    pub fn warn(self) -> Self {
        self.with_level(Level::WARN)
    }

    pub fn error(self) -> Self {
        self.with_level(Level::ERROR)
    }

    /// Keep only events whose target is `target`
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Keep only the factory's own events
    pub fn factory_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Filter directive for the configured level and target
    fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber globally.
    ///
    /// Panics if a global subscriber is already installed; use
    /// [`try_init`](Self::try_init) when that can happen.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        if let Err(err) = self.try_init() {
            panic!("failed to install bean_factory subscriber: {err}");
        }
    }

    /// Install the subscriber globally, reporting a subscriber that is
    /// already in place as an error.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn try_init(self) -> Result<(), tracing_subscriber::util::TryInitError> {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::SubscriberInitExt};

        let filter = EnvFilter::new(self.directive());
        let registry = tracing_subscriber::registry().with(filter);
        let (file, line, thread_ids, thread_names) = (
            self.with_file,
            self.with_line_number,
            self.with_thread_ids,
            self.with_thread_names,
        );

        macro_rules! layer {
            ($base:expr) => {
                $base
                    .with_file(file)
                    .with_line_number(line)
                    .with_thread_ids(thread_ids)
                    .with_thread_names(thread_names)
                    .with_target(true)
            };
        }

        match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(layer!(fmt::layer().json())).try_init(),
            // Without the json feature a JSON request gets the plain layer.
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => registry.with(layer!(fmt::layer())).try_init(),
            LogFormat::Pretty => registry.with(layer!(fmt::layer().pretty())).try_init(),
            LogFormat::Compact => registry.with(layer!(fmt::layer().compact())).try_init(),
        }
    }

    /// No subscriber feature enabled: nothing to install.
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Start configuring a subscriber
#[cfg(feature = "logging")]
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install the default subscriber: JSON with `logging-json`, pretty with
/// only `logging-pretty`. A no-op without either feature.
pub fn init() {
    #[cfg(feature = "logging-json")]
    init_json();
    #[cfg(all(feature = "logging-pretty", not(feature = "logging-json")))]
    init_pretty();
}

/// JSON output at debug level.
///
/// ```json
/// {"timestamp":"2026-01-01T00:00:00.000Z","level":"DEBUG","target":"bean_factory","fields":{"message":"Creating bean instance","bean":"petStore","class":"PetStoreService","scope":"singleton"}}
/// ```
pub fn init_json() {
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    builder().json().debug().init();
}

/// Human-readable output at debug level.
///
/// ```text
///   2026-01-01T00:00:00.000Z DEBUG bean_factory: Creating bean instance, bean: petStore, class: PetStoreService
/// ```
pub fn init_pretty() {
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    builder().pretty().debug().init();
}

/// Debug output filtered to the factory's own events
pub fn init_factory_only() {
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    builder().factory_only().debug().init();
}
