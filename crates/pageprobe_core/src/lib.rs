//! Core of the pageprobe web-process extension.
//! Host contract, event wiring, and the ambient logging/config layers live here;
//! native bindings stay in `pageprobe_webext`.

pub mod args;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod replay;
pub mod shim;
pub mod sink;

pub use args::InitArguments;
pub use config::{ConfigError, ExtensionConfig};
pub use error::ShimError;
pub use host::event::HostEvent;
pub use host::sim::{HostFault, SimDocument, SimExtension, SimHost, SimPage};
pub use host::{
    CallbackResult, DocumentHandle, DocumentLoadedListener, ExtensionHandle, ListenerId,
    PageCreatedListener, PageHandle,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use replay::{replay, ReplayReport, Scenario, ScenarioError, ScenarioLoad, ScenarioPage};
pub use shim::{EventWiringShim, MISSING_VALUE};
pub use sink::{DiagnosticSink, MemorySink, StdoutSink};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
