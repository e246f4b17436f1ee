//! HTTP server configuration section: connector, thread pool, buffer pool,
//! request log, and compression settings.
//!
//! The server wiring that consumes these values lives outside this crate;
//! this module owns their shape, defaults, and validation only.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::units::{Duration, Size};
use crate::validation::{constraints, Context, Validate};

/// Configuration for the service's HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Request log settings.
    #[serde(default)]
    pub request_log: RequestLogConfig,

    /// Response compression settings.
    #[serde(default)]
    pub gzip: GzipConfig,

    /// Application connector port. Carried as `u32` so out-of-range values
    /// survive decode and fail validation instead.
    #[serde(default = "default_port")]
    pub port: u32,

    /// Admin connector port.
    #[serde(default = "default_admin_port")]
    pub admin_port: u32,

    /// Upper bound of the request worker pool.
    #[serde(default = "default_max_threads")]
    pub max_threads: u32,

    /// Lower bound of the request worker pool.
    #[serde(default = "default_min_threads")]
    pub min_threads: u32,

    /// Connection acceptor threads.
    #[serde(default = "default_acceptor_threads")]
    pub acceptor_threads: u32,

    /// Connection selector threads.
    #[serde(default = "default_selector_threads")]
    pub selector_threads: u32,

    /// Accept queue depth; `None` uses the platform default.
    #[serde(default)]
    pub accept_queue_size: Option<u32>,

    /// Whether to set `SO_REUSEADDR` on the listening socket.
    #[serde(default = "default_true")]
    pub reuse_address: bool,

    /// Optional `SO_LINGER` time.
    #[serde(default)]
    pub so_linger_time: Option<Duration>,

    /// Whether responses carry a `Server` header.
    #[serde(default)]
    pub use_server_header: bool,

    /// Whether responses carry a `Date` header.
    #[serde(default = "default_true")]
    pub use_date_header: bool,

    /// Whether to honor `X-Forwarded-*` headers.
    #[serde(default = "default_true")]
    pub use_forwarded_headers: bool,

    /// Whether connector buffers are allocated off-heap.
    #[serde(default = "default_true")]
    pub use_direct_buffers: bool,

    /// Host to bind; `None` binds all interfaces.
    #[serde(default)]
    pub bind_host: Option<String>,

    /// Admin interface username. Required whenever a password is set.
    #[serde(default)]
    pub admin_username: Option<String>,

    /// Admin interface password.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Response header cache size.
    #[serde(default = "default_header_cache_size")]
    pub header_cache_size: Size,

    /// Response output aggregation buffer size.
    #[serde(default = "default_output_buffer_size")]
    pub output_buffer_size: Size,

    /// Maximum accepted request header size.
    #[serde(default = "default_header_size")]
    pub max_request_header_size: Size,

    /// Maximum generated response header size.
    #[serde(default = "default_header_size")]
    pub max_response_header_size: Size,

    /// Connector read buffer size.
    #[serde(default = "default_header_size")]
    pub input_buffer_size: Size,

    /// Idle connection timeout.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: Duration,

    /// Smallest pooled buffer.
    #[serde(default = "default_min_buffer_pool_size")]
    pub min_buffer_pool_size: Size,

    /// Step between pooled buffer sizes.
    #[serde(default = "default_buffer_pool_increment")]
    pub buffer_pool_increment: Size,

    /// Largest pooled buffer.
    #[serde(default = "default_max_buffer_pool_size")]
    pub max_buffer_pool_size: Size,

    /// Cap on queued requests; `None` is unbounded.
    #[serde(default)]
    pub max_queued_requests: Option<u32>,
}

fn default_port() -> u32 {
    8080
}

fn default_admin_port() -> u32 {
    8081
}

fn default_max_threads() -> u32 {
    1024
}

fn default_min_threads() -> u32 {
    8
}

fn available_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
}

fn default_acceptor_threads() -> u32 {
    (available_cpus() / 2).max(1)
}

fn default_selector_threads() -> u32 {
    available_cpus()
}

fn default_true() -> bool {
    true
}

fn default_header_cache_size() -> Size {
    Size::bytes(512)
}

fn default_output_buffer_size() -> Size {
    Size::kibibytes(32)
}

fn default_header_size() -> Size {
    Size::kibibytes(8)
}

fn default_idle_timeout() -> Duration {
    Duration::seconds(30)
}

fn default_min_buffer_pool_size() -> Size {
    Size::bytes(64)
}

fn default_buffer_pool_increment() -> Size {
    Size::kibibytes(1)
}

fn default_max_buffer_pool_size() -> Size {
    Size::kibibytes(64)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_log: RequestLogConfig::default(),
            gzip: GzipConfig::default(),
            port: default_port(),
            admin_port: default_admin_port(),
            max_threads: default_max_threads(),
            min_threads: default_min_threads(),
            acceptor_threads: default_acceptor_threads(),
            selector_threads: default_selector_threads(),
            accept_queue_size: None,
            reuse_address: true,
            so_linger_time: None,
            use_server_header: false,
            use_date_header: true,
            use_forwarded_headers: true,
            use_direct_buffers: true,
            bind_host: None,
            admin_username: None,
            admin_password: None,
            header_cache_size: default_header_cache_size(),
            output_buffer_size: default_output_buffer_size(),
            max_request_header_size: default_header_size(),
            max_response_header_size: default_header_size(),
            input_buffer_size: default_header_size(),
            idle_timeout: default_idle_timeout(),
            min_buffer_pool_size: default_min_buffer_pool_size(),
            buffer_pool_increment: default_buffer_pool_increment(),
            max_buffer_pool_size: default_max_buffer_pool_size(),
            max_queued_requests: None,
        }
    }
}

impl Validate for ServerConfig {
    fn constraints(&self, ctx: &mut Context<'_>) {
        ctx.require(
            "port",
            constraints::in_port_range(self.port),
            format!("{} is not a valid port number (1..=65535)", self.port),
        );
        ctx.require(
            "admin_port",
            constraints::in_port_range(self.admin_port),
            format!("{} is not a valid port number (1..=65535)", self.admin_port),
        );
        ctx.require(
            "max_threads",
            constraints::at_least(self.max_threads, 2),
            "must be at least 2",
        );
        ctx.require(
            "min_threads",
            constraints::at_least(self.min_threads, 1),
            "must be at least 1",
        );
        ctx.require(
            "acceptor_threads",
            constraints::at_least(self.acceptor_threads, 1),
            "must be at least 1",
        );
        ctx.require(
            "selector_threads",
            constraints::at_least(self.selector_threads, 1),
            "must be at least 1",
        );
        if let Some(depth) = self.accept_queue_size {
            ctx.require(
                "accept_queue_size",
                constraints::at_least(depth, 1),
                "must be at least 1 when set",
            );
        }
        ctx.require(
            "header_cache_size",
            constraints::at_least(self.header_cache_size, Size::bytes(128)),
            "must be at least 128B",
        );
        ctx.require(
            "output_buffer_size",
            constraints::at_least(self.output_buffer_size, Size::kibibytes(8)),
            "must be at least 8KiB",
        );
        ctx.require(
            "max_request_header_size",
            constraints::at_least(self.max_request_header_size, Size::kibibytes(1)),
            "must be at least 1KiB",
        );
        ctx.require(
            "max_response_header_size",
            constraints::at_least(self.max_response_header_size, Size::kibibytes(1)),
            "must be at least 1KiB",
        );
        ctx.require(
            "input_buffer_size",
            constraints::at_least(self.input_buffer_size, Size::kibibytes(1)),
            "must be at least 1KiB",
        );
        ctx.require(
            "idle_timeout",
            constraints::at_least(self.idle_timeout, Duration::milliseconds(1)),
            "must be at least 1ms",
        );
        ctx.require(
            "min_buffer_pool_size",
            constraints::at_least(self.min_buffer_pool_size, Size::bytes(1)),
            "must be at least 1B",
        );
        ctx.require(
            "buffer_pool_increment",
            constraints::at_least(self.buffer_pool_increment, Size::bytes(1)),
            "must be at least 1B",
        );
        ctx.require(
            "max_buffer_pool_size",
            constraints::at_least(self.max_buffer_pool_size, Size::kibibytes(1)),
            "must be at least 1KiB",
        );
    }

    fn rules(&self, ctx: &mut Context<'_>) {
        ctx.rule(
            "thread_pool_sized_correctly",
            self.min_threads <= self.max_threads,
            "must have a smaller min_threads than max_threads",
        );
        ctx.rule(
            "admin_username_defined",
            self.admin_password.is_none() || self.admin_username.is_some(),
            "must have admin_username if admin_password is defined",
        );
        ctx.rule(
            "buffer_pool_sized_correctly",
            self.min_buffer_pool_size <= self.max_buffer_pool_size,
            "must have a smaller min_buffer_pool_size than max_buffer_pool_size",
        );
    }

    fn children(&self) -> Vec<(&'static str, &dyn Validate)> {
        vec![
            ("request_log", &self.request_log),
            ("gzip", &self.gzip),
        ]
    }
}

/// Request log configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestLogConfig {
    /// Time zone used for request timestamps.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Where request log entries are written.
    #[serde(default = "default_appenders")]
    pub appenders: Vec<AppenderConfig>,
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_appenders() -> Vec<AppenderConfig> {
    vec![AppenderConfig::Console {
        threshold: default_threshold(),
    }]
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            appenders: default_appenders(),
        }
    }
}

impl Validate for RequestLogConfig {
    fn constraints(&self, ctx: &mut Context<'_>) {
        ctx.require(
            "time_zone",
            !self.time_zone.trim().is_empty(),
            "must not be empty",
        );
        for (index, appender) in self.appenders.iter().enumerate() {
            appender.check(&format!("appenders[{index}]"), ctx);
        }
    }
}

/// A single request log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AppenderConfig {
    /// Write entries to the console.
    Console {
        /// Minimum level to emit (trace, debug, info, warn, error).
        #[serde(default = "default_threshold")]
        threshold: String,
    },
    /// Write entries to a file.
    File {
        /// Path of the active log file.
        current_log_filename: PathBuf,
        /// Whether rotated files are kept.
        #[serde(default)]
        archive: bool,
        /// Minimum level to emit.
        #[serde(default = "default_threshold")]
        threshold: String,
    },
}

fn default_threshold() -> String {
    "info".to_string()
}

impl AppenderConfig {
    fn check(&self, prefix: &str, ctx: &mut Context<'_>) {
        match self {
            Self::Console { threshold } => {
                ctx.require(
                    &format!("{prefix}.threshold"),
                    crate::logging::is_valid_level(threshold),
                    format!("{threshold:?} is not a valid level"),
                );
            }
            Self::File {
                current_log_filename,
                threshold,
                ..
            } => {
                ctx.require(
                    &format!("{prefix}.current_log_filename"),
                    !current_log_filename.as_os_str().is_empty(),
                    "must not be empty",
                );
                ctx.require(
                    &format!("{prefix}.threshold"),
                    crate::logging::is_valid_level(threshold),
                    format!("{threshold:?} is not a valid level"),
                );
            }
        }
    }
}

/// Response compression configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GzipConfig {
    /// Whether compression is applied at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Responses smaller than this are not compressed.
    #[serde(default = "default_minimum_entity_size")]
    pub minimum_entity_size: Size,

    /// Compression working buffer size.
    #[serde(default = "default_gzip_buffer_size")]
    pub buffer_size: Size,

    /// User agents excluded from compression.
    #[serde(default)]
    pub excluded_user_agents: Vec<String>,

    /// MIME types eligible for compression; empty means a sensible default
    /// set chosen by the server layer.
    #[serde(default)]
    pub compressed_mime_types: Vec<String>,
}

fn default_minimum_entity_size() -> Size {
    Size::bytes(256)
}

fn default_gzip_buffer_size() -> Size {
    Size::kibibytes(8)
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_entity_size: default_minimum_entity_size(),
            buffer_size: default_gzip_buffer_size(),
            excluded_user_agents: Vec::new(),
            compressed_mime_types: Vec::new(),
        }
    }
}

impl Validate for GzipConfig {
    fn constraints(&self, ctx: &mut Context<'_>) {
        ctx.require(
            "buffer_size",
            constraints::at_least(self.buffer_size, Size::kibibytes(1)),
            "must be at least 1KiB",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, ViolationKind};

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&ServerConfig::default()).is_empty());
    }

    #[test]
    fn test_port_boundaries() {
        for (port, valid) in [(0, false), (1, true), (65535, true), (65536, false)] {
            let config = ServerConfig {
                port,
                ..ServerConfig::default()
            };
            let violations = validate(&config);
            assert_eq!(violations.is_empty(), valid, "port {port}");
            if !valid {
                assert_eq!(violations.0[0].path, "port");
                assert_eq!(violations.0[0].kind, ViolationKind::Constraint);
            }
        }
    }

    #[test]
    fn test_thread_pool_rule_fires_independently_of_field_constraints() {
        // min_threads passes its own minimum but exceeds max_threads.
        let config = ServerConfig {
            min_threads: 16,
            max_threads: 4,
            ..ServerConfig::default()
        };
        let violations = validate(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.0[0].path, "thread_pool_sized_correctly");
        assert_eq!(violations.0[0].kind, ViolationKind::CrossField);
    }

    #[test]
    fn test_thread_pool_rule_fires_even_when_fields_invalid() {
        let config = ServerConfig {
            min_threads: 3,
            max_threads: 1,
            ..ServerConfig::default()
        };
        let violations = validate(&config);
        // max_threads < 2 is a constraint violation; the rule still runs.
        assert!(violations
            .iter()
            .any(|v| v.path == "max_threads" && v.kind == ViolationKind::Constraint));
        assert!(violations
            .iter()
            .any(|v| v.path == "thread_pool_sized_correctly"
                && v.kind == ViolationKind::CrossField));
    }

    #[test]
    fn test_admin_password_requires_username() {
        let config = ServerConfig {
            admin_password: Some("hunter2".to_string()),
            ..ServerConfig::default()
        };
        let violations = validate(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.0[0].path, "admin_username_defined");
        assert_eq!(violations.0[0].kind, ViolationKind::CrossField);

        let with_username = ServerConfig {
            admin_username: Some("admin".to_string()),
            admin_password: Some("hunter2".to_string()),
            ..ServerConfig::default()
        };
        assert!(validate(&with_username).is_empty());
    }

    #[test]
    fn test_buffer_pool_rule() {
        let config = ServerConfig {
            min_buffer_pool_size: Size::kibibytes(128),
            max_buffer_pool_size: Size::kibibytes(64),
            ..ServerConfig::default()
        };
        let violations = validate(&config);
        assert!(violations
            .iter()
            .any(|v| v.path == "buffer_pool_sized_correctly"));
    }

    #[test]
    fn test_nested_violations_carry_dotted_paths() {
        let config = ServerConfig {
            request_log: RequestLogConfig {
                time_zone: String::new(),
                ..RequestLogConfig::default()
            },
            ..ServerConfig::default()
        };
        let violations = validate(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.0[0].path, "request_log.time_zone");
    }

    #[test]
    fn test_appender_threshold_is_checked() {
        let config = RequestLogConfig {
            appenders: vec![AppenderConfig::Console {
                threshold: "loud".to_string(),
            }],
            ..RequestLogConfig::default()
        };
        let violations = validate(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.0[0].path, "appenders[0].threshold");
    }

    #[test]
    fn test_small_idle_timeout_fails() {
        let config = ServerConfig {
            idle_timeout: Duration::nanoseconds(5),
            ..ServerConfig::default()
        };
        let violations = validate(&config);
        assert!(violations.iter().any(|v| v.path == "idle_timeout"));
    }
}
