//! Decoding a byte stream (or nothing) into a typed configuration.
//!
//! Layering, lowest to highest precedence:
//! 1. Compiled defaults (`Serialized::defaults`)
//! 2. The YAML source document, when a location was given
//! 3. Environment variable overrides (`<PREFIX>_SERVER__PORT=...`)
//!
//! Every figment error is flattened into the same [`Violation`] shape the
//! validator produces, so callers see one unified failure list.

use std::io::Read;
use std::marker::PhantomData;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use tracing::debug;

use crate::config::Configuration;
use crate::errors::ConfigError;
use crate::validation::{Violation, ViolationKind, ViolationSet};

/// Location label used when building from defaults and overrides only.
const DEFAULT_LOCATION: &str = "default configuration";

/// Builds instances of one configuration type from defaults, an optional
/// YAML source, and an environment override namespace.
pub struct ConfigurationFactory<C> {
    env_prefix: String,
    _config: PhantomData<C>,
}

impl<C: Configuration> ConfigurationFactory<C> {
    /// Create a factory whose override namespace is `env_prefix`
    /// (e.g. prefix `DW` maps `DW_SERVER__PORT` onto `server.port`).
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
            _config: PhantomData,
        }
    }

    /// Build a configuration from field defaults plus environment
    /// overrides. Used when no source location was given.
    pub fn build_default(&self) -> Result<C, ConfigError> {
        debug!(prefix = %self.env_prefix, "building configuration from defaults");
        self.extract(DEFAULT_LOCATION, self.base())
    }

    /// Build a configuration from `reader`, layered over field defaults and
    /// under environment overrides. The reader is consumed and dropped here
    /// on every path, which closes the underlying stream.
    pub fn build(&self, location: &str, mut reader: impl Read) -> Result<C, ConfigError> {
        let mut document = String::new();
        reader
            .read_to_string(&mut document)
            .map_err(|err| ConfigError::SourceUnreadable {
                location: location.to_string(),
                source: err,
            })?;
        drop(reader);

        debug!(%location, bytes = document.len(), "building configuration from source");
        self.extract(location, self.base().merge(Yaml::string(&document)))
    }

    fn base(&self) -> Figment {
        Figment::new().merge(Serialized::defaults(C::default()))
    }

    fn extract(&self, location: &str, figment: Figment) -> Result<C, ConfigError> {
        figment
            .merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"))
            .extract()
            .map_err(|err| ConfigError::Malformed {
                location: location.to_string(),
                violations: decode_violations(err),
            })
    }
}

/// Flatten a figment error chain into decode violations, one per problem,
/// each addressed by its dotted path within the tree.
fn decode_violations(err: figment::Error) -> ViolationSet {
    let violations = err
        .into_iter()
        .map(|e| Violation {
            path: e.path.join("."),
            message: e.kind.to_string(),
            kind: ViolationKind::Decode,
        })
        .collect();
    ViolationSet(violations)
}
