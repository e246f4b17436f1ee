//! Girder - Service Configuration Pipeline
//!
//! Girder is the typed configuration loading and validation pipeline a
//! service runs before any command executes: it resolves a configuration
//! source (file path, standard input, or nothing), decodes it into a
//! strongly-typed configuration with environment-variable overrides layered
//! on top, validates it (aggregating every violation rather than failing on
//! the first), initializes logging from the validated configuration, and
//! only then dispatches to the command body.
//!
//! # Architecture
//!
//! - **Unit types** (`units`): duration and byte-size values with compact
//!   literal parsing and unit-normalized comparison
//! - **Validation** (`validation`): violation model plus a two-phase
//!   tree-walking validator (field constraints, then cross-field rules)
//! - **Configuration** (`config`): the `Configuration` trait, source
//!   resolution, the figment-based decoding factory, and the server
//!   configuration tree
//! - **Logging** (`logging`): logging configuration and the bootstrap
//!   trigger the pipeline invokes before dispatch
//! - **CLI** (`cli`): command traits, the application registry, and the
//!   pipeline orchestration
//!
//! # Example
//!
//! ```ignore
//! use girder::cli::Application;
//!
//! fn main() {
//!     let app = Application::new("hello-world").configured_command(ServeCommand);
//!     if let Err(err) = app.run(std::env::args()) {
//!         girder::cli::report_error(&err, false);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod units;
pub mod validation;

// Re-export commonly used types for convenience
pub use cli::{Application, Bootstrap, Command, ConfiguredCommand};
pub use config::{
    Configuration, ConfigurationFactory, DefaultSourceProvider, GzipConfig, RequestLogConfig,
    ServerConfig, ServiceConfig, SourceProvider,
};
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use units::{Duration, Size, SizeUnit, TimeUnit, UnitParseError};
pub use validation::{validate, Validate, Violation, ViolationKind, ViolationSet};
