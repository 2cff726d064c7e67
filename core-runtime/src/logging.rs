//! # Logging & Tracing Infrastructure
//!
//! Structured logging on the `tracing` crate, supporting:
//! - JSON, compact and pretty-print output formats
//! - Module-level filtering
//! - Redaction helpers for tokens and emails
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::time::LogLevel;
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Pretty)
//!     .with_level(LogLevel::Debug);
//!
//! init_logging(config).expect("Failed to initialize logging");
//! tracing::info!("Application started");
//! ```
//!
//! ## Tokens in logs
//!
//! Raw tokens are never logged. Use [`mask_token`] when a token has to be
//! recognisable in a log line, and [`redact_if_sensitive`] for values whose
//! sensitivity depends on the field name.

use crate::error::{Error, Result};

use bridge_traits::time::LogLevel;
use std::io;
use tracing_subscriber::{filter::EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose level follows `LoggingConfig::level` in the default filter.
const WORKSPACE_TARGETS: &[&str] = &[
    "session_gate_workspace",
    "core_runtime",
    "core_auth",
    "core_service",
    "bridge_desktop",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level
    pub level: LogLevel,
    /// Custom filter string (e.g., "core_auth=debug,reqwest=warn")
    pub filter: Option<String>,
    /// Log span enter/exit events
    pub enable_spans: bool,
    /// Display target module in logs
    pub display_target: bool,
    /// Display thread info
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            enable_spans: false,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set custom filter string. Overrides `level` entirely.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Initialize the logging system
///
/// Call once during application startup.
///
/// # Errors
///
/// Returns [`Error::Config`] if:
/// - A global subscriber is already installed
/// - The filter string is invalid
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_span_events(span_events)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(config.enable_spans)
                    .with_span_list(config.enable_spans)
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_span_events(span_events)
                    .with_writer(io::stdout),
            )
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// Builds the `EnvFilter` for a configuration.
///
/// Workspace crates log at `config.level`, HTTP internals at `warn`.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = match &config.filter {
        Some(custom_filter) => custom_filter.clone(),
        None => {
            let level = config.level.as_str();
            let mut directives: Vec<String> = WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level))
                .collect();
            directives.extend(["h2=warn", "hyper=warn", "reqwest=warn", "rustls=warn"].map(String::from));
            directives.join(",")
        }
    };

    EnvFilter::try_new(filter_string)
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

/// Redacts a value based on its field name.
///
/// Token-like fields are replaced entirely, email-looking values keep only
/// their first character.
///
/// ```
/// use core_runtime::logging::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("token", "abc.def.ghi"), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("user_id", "u1"), "u1");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    const SENSITIVE_FIELDS: &[&str] = &[
        "token",
        "password",
        "secret",
        "api_key",
        "authorization",
        "bearer",
    ];

    let field_lower = field_name.to_lowercase();
    if SENSITIVE_FIELDS.iter().any(|&f| field_lower.contains(f)) {
        return "[REDACTED]".to_string();
    }

    match value.find('@') {
        Some(at_pos) if value[at_pos..].contains('.') => {
            format!("{}***@[REDACTED]", &value[..1.min(at_pos)])
        }
        _ => value.to_string(),
    }
}

/// Shortens a token to a recognisable prefix for log lines.
///
/// ```
/// use core_runtime::logging::mask_token;
///
/// assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload.sig"), "eyJhbGci…(32)");
/// assert_eq!(mask_token("abc"), "***(3)");
/// ```
pub fn mask_token(token: &str) -> String {
    const VISIBLE: usize = 8;
    let len = token.chars().count();
    if len <= VISIBLE {
        return format!("***({})", len);
    }
    let prefix: String = token.chars().take(VISIBLE).collect();
    format!("{}…({})", prefix, len)
}
