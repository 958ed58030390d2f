use log::info;
use pageprobe_core::{
    init_logging, ConfigError, DiagnosticSink, EventWiringShim, InitArguments, ExtensionConfig,
    StdoutSink,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Prepares the shim the host will call into, printing to standard output.
///
/// # Errors
/// - [`BootstrapError::Config`] when env or `arguments` carry invalid settings.
/// - [`BootstrapError::Logging`] when the logging backend cannot start.
pub fn bootstrap(arguments: &InitArguments) -> Result<EventWiringShim, BootstrapError> {
    bootstrap_with_sink(arguments, Arc::new(StdoutSink))
}

/// Same as [`bootstrap`] with a caller-provided sink.
pub fn bootstrap_with_sink(
    arguments: &InitArguments,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<EventWiringShim, BootstrapError> {
    let config = ExtensionConfig::resolve(arguments).map_err(BootstrapError::Config)?;
    init_logging(config.log_level, &config.log_target).map_err(BootstrapError::Logging)?;

    info!(
        "event=extension_load module=webext status=ok arguments={} level={} target={}",
        arguments.len(),
        config.log_level,
        config.log_target
    );
    Ok(EventWiringShim::new(sink))
}

/// Extension initialization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    Config(ConfigError),
    Logging(String),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid extension configuration: {err}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}
