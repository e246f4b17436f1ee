//! Resolution of a configuration location into a readable byte stream.

use std::fs::File;
use std::io::{self, Read};

use crate::errors::ConfigError;

/// Marker location that resolves to standard input.
pub const STDIN_LOCATION: &str = "-";

/// Turns a location identifier into a readable byte stream.
///
/// Exactly one stream is opened per command invocation. The stream is a
/// scoped resource: the decoder consumes the boxed reader and drops it on
/// every path, so closure is guaranteed by RAII.
pub trait SourceProvider {
    /// Open the source at `location`.
    fn open(&self, location: &str) -> Result<Box<dyn Read>, ConfigError>;
}

/// Default provider: `-` resolves to standard input, everything else is a
/// filesystem path.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSourceProvider;

impl SourceProvider for DefaultSourceProvider {
    fn open(&self, location: &str) -> Result<Box<dyn Read>, ConfigError> {
        if location == STDIN_LOCATION {
            return Ok(Box::new(io::stdin()));
        }

        match File::open(location) {
            Ok(file) => Ok(Box::new(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ConfigError::SourceNotFound {
                    location: location.to_string(),
                })
            }
            Err(err) => Err(ConfigError::SourceUnreadable {
                location: location.to_string(),
                source: err,
            }),
        }
    }
}
