//! Loadable web-process extension.
//!
//! # Responsibility
//! - Resolve config and start logging before any host callback runs.
//! - Hand the host a wired [`EventWiringShim`].
//!
//! # Invariants
//! - Nothing here panics across the plugin boundary.
//! - Initialization failures leave the extension un-wired; the host keeps running.

mod bootstrap;
#[cfg(feature = "webkit")]
pub mod webkit;

pub use bootstrap::{bootstrap, bootstrap_with_sink, BootstrapError};
pub use pageprobe_core::{EventWiringShim, InitArguments};
