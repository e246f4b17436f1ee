//! Application assembly: command registry, argument parsing, and error
//! reporting.

mod command;

pub use command::{Command, ConfiguredCommand, FILE_ARG};

use anyhow::{anyhow, Result};

use crate::config::{DefaultSourceProvider, SourceProvider};
use crate::errors::ConfigError;

use command::ConfiguredRunner;

/// Shared invocation context handed to every command: the service identity,
/// the environment override namespace, and the source provider.
pub struct Bootstrap {
    service_name: String,
    env_prefix: String,
    source_provider: Box<dyn SourceProvider>,
}

impl Bootstrap {
    /// The service identity string, used to initialize logging.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The environment override namespace prefix.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// The configured source provider.
    pub fn source_provider(&self) -> &dyn SourceProvider {
        self.source_provider.as_ref()
    }
}

/// A service application: a named set of commands sharing one
/// configuration pipeline.
///
/// ```no_run
/// use girder::cli::{Application, ConfiguredCommand};
/// use girder::config::ServiceConfig;
///
/// struct ServeCommand;
///
/// impl ConfiguredCommand for ServeCommand {
///     type Config = ServiceConfig;
///
///     fn name(&self) -> &str {
///         "serve"
///     }
///
///     fn description(&self) -> &str {
///         "runs the HTTP server"
///     }
///
///     fn run(&self, config: ServiceConfig, _matches: &clap::ArgMatches) -> anyhow::Result<()> {
///         println!("would listen on port {}", config.server.port);
///         Ok(())
///     }
/// }
///
/// let app = Application::new("hello-world").configured_command(ServeCommand);
/// if let Err(err) = app.run(std::env::args()) {
///     girder::cli::report_error(&err, false);
///     std::process::exit(1);
/// }
/// ```
pub struct Application {
    bootstrap: Bootstrap,
    commands: Vec<Box<dyn Command>>,
}

impl Application {
    /// Create an application. The environment override prefix defaults to
    /// the upper-cased service name with non-alphanumerics mapped to `_`.
    pub fn new(service_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        let env_prefix = service_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        Self {
            bootstrap: Bootstrap {
                service_name,
                env_prefix,
                source_provider: Box::new(DefaultSourceProvider),
            },
            commands: Vec::new(),
        }
    }

    /// Override the environment override namespace prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bootstrap.env_prefix = prefix.into();
        self
    }

    /// Replace the source provider (tests and embedded harnesses).
    pub fn source_provider(mut self, provider: impl SourceProvider + 'static) -> Self {
        self.bootstrap.source_provider = Box::new(provider);
        self
    }

    /// Register a plain command.
    pub fn command(mut self, cmd: impl Command + 'static) -> Self {
        self.commands.push(Box::new(cmd));
        self
    }

    /// Register a configured command; the framework wraps it in the
    /// configuration pipeline.
    pub fn configured_command<C: ConfiguredCommand + 'static>(mut self, cmd: C) -> Self {
        self.commands.push(Box::new(ConfiguredRunner::new(cmd)));
        self
    }

    /// Parse `argv` and dispatch to the matching command.
    pub fn run<I, S>(&self, argv: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let mut root = clap::Command::new(self.bootstrap.service_name.clone())
            .subcommand_required(true)
            .arg_required_else_help(true);
        for cmd in &self.commands {
            root = root.subcommand(
                cmd.configure(
                    clap::Command::new(cmd.name().to_string())
                        .about(cmd.description().to_string()),
                ),
            );
        }

        let matches = root.try_get_matches_from(argv)?;
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| anyhow!("no subcommand given"))?;
        let cmd = self
            .commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| anyhow!("unknown command: {name}"))?;

        cmd.run(&self.bootstrap, sub_matches)
    }
}

/// Report a pipeline failure to stderr, listing every violation found.
///
/// In JSON mode, decode and validation failures render the violation list
/// as a JSON array for machine consumption.
pub fn report_error(err: &anyhow::Error, json_mode: bool) {
    if let Some(config_err) = err.downcast_ref::<ConfigError>() {
        if json_mode {
            if let Some(violations) = config_err.violations() {
                match serde_json::to_string_pretty(violations) {
                    Ok(rendered) => eprintln!("{rendered}"),
                    Err(_) => eprintln!("{config_err}"),
                }
                return;
            }
        }
        eprintln!("{config_err}");
        return;
    }
    eprintln!("{err:#}");
}
