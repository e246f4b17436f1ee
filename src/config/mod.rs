//! Configuration model: the [`Configuration`] trait commands are generic
//! over, the ready-made [`ServiceConfig`] root type, source resolution, and
//! the decoding factory.

mod factory;
mod server;
mod source;

pub use factory::ConfigurationFactory;
pub use server::{AppenderConfig, GzipConfig, RequestLogConfig, ServerConfig};
pub use source::{DefaultSourceProvider, SourceProvider, STDIN_LOCATION};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;
use crate::validation::{Context, Validate};

/// The root configuration type a command consumes.
///
/// Commands name their configuration type explicitly (via
/// [`ConfiguredCommand::Config`](crate::cli::ConfiguredCommand::Config)), so
/// the pipeline resolves the concrete type at compile time. Every
/// implementor must be constructible from defaults alone and expose the
/// logging section the bootstrap trigger consumes.
pub trait Configuration: Default + Serialize + DeserializeOwned + Validate {
    /// The logging section used to initialize the logging subsystem.
    fn logging(&self) -> &LoggingConfig;
}

/// A ready-made root configuration: an HTTP server section plus logging.
///
/// Services with no extra settings can use this directly; richer services
/// define their own root type embedding [`ServerConfig`] and
/// [`LoggingConfig`] and implement [`Configuration`] the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Validate for ServiceConfig {
    fn constraints(&self, _ctx: &mut Context<'_>) {}

    fn children(&self) -> Vec<(&'static str, &dyn Validate)> {
        vec![("server", &self.server), ("logging", &self.logging)]
    }
}

impl Configuration for ServiceConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}
