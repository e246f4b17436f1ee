//! Command traits and the configured-command pipeline.
//!
//! A [`ConfiguredCommand`] names its configuration type explicitly through
//! an associated type, so the pipeline knows the concrete type to build at
//! compile time. The runner sequences the pipeline: resolve the source (if
//! a location was given), decode, validate, initialize logging, dispatch.
//! Any failure aborts before the command body runs.

use anyhow::Result;
use clap::{Arg, ArgMatches};
use tracing::debug;

use crate::cli::Bootstrap;
use crate::config::{Configuration, ConfigurationFactory};
use crate::errors::ConfigError;
use crate::logging;
use crate::validation::validate;

/// Name of the optional positional configuration-file argument every
/// configured command carries.
pub const FILE_ARG: &str = "file";

/// A command the application can dispatch to.
///
/// Implement this directly only for commands that take no configuration;
/// commands that consume a configuration implement [`ConfiguredCommand`]
/// instead and are wrapped by the pipeline runner.
pub trait Command {
    /// The subcommand name.
    fn name(&self) -> &str;

    /// One-line description shown in help output.
    fn description(&self) -> &str;

    /// Contribute arguments to the subcommand definition.
    fn configure(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Execute the command.
    fn run(&self, bootstrap: &Bootstrap, matches: &ArgMatches) -> Result<()>;
}

/// A command that consumes a validated configuration.
///
/// The framework adds one optional positional `file` argument (the
/// configuration source location; `-` reads standard input) ahead of any
/// arguments [`configure`](Self::configure) contributes.
pub trait ConfiguredCommand {
    /// The configuration type this command was declared against.
    type Config: Configuration;

    /// The subcommand name.
    fn name(&self) -> &str;

    /// One-line description shown in help output.
    fn description(&self) -> &str;

    /// Contribute additional arguments beyond the configuration-file one.
    fn configure(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Execute the command with its validated configuration.
    fn run(&self, config: Self::Config, matches: &ArgMatches) -> Result<()>;
}

/// Adapts a [`ConfiguredCommand`] to [`Command`] by running the
/// configuration pipeline ahead of the command body.
pub(crate) struct ConfiguredRunner<C> {
    inner: C,
}

impl<C> ConfiguredRunner<C> {
    pub(crate) fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: ConfiguredCommand> Command for ConfiguredRunner<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn configure(&self, cmd: clap::Command) -> clap::Command {
        let cmd = cmd.arg(
            Arg::new(FILE_ARG)
                .value_name("FILE")
                .required(false)
                .help("service configuration file ('-' reads standard input)"),
        );
        self.inner.configure(cmd)
    }

    fn run(&self, bootstrap: &Bootstrap, matches: &ArgMatches) -> Result<()> {
        let factory = ConfigurationFactory::<C::Config>::new(bootstrap.env_prefix());
        let location = matches.get_one::<String>(FILE_ARG);

        let config = match location {
            Some(location) => {
                debug!(%location, "opening configuration source");
                let reader = bootstrap.source_provider().open(location)?;
                factory.build(location, reader)?
            }
            None => factory.build_default()?,
        };

        let violations = validate(&config);
        if !violations.is_empty() {
            return Err(ConfigError::Invalid {
                location: location.map_or_else(
                    || "default configuration".to_string(),
                    String::clone,
                ),
                violations,
            }
            .into());
        }

        // Keep the guard alive for the whole command body so file output
        // flushes on exit.
        let _guard = logging::init(config.logging(), bootstrap.service_name())?;

        debug!(command = self.inner.name(), "dispatching");
        self.inner.run(config, matches)
    }
}
