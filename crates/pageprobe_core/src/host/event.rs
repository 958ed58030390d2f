//! Fixed host event names.

use std::fmt::{Display, Formatter};

/// Host event name fired on the extension handle for every new page.
pub const EVENT_PAGE_CREATED: &str = "page-created";
/// Host event name fired on a page handle after a document finished loading.
pub const EVENT_DOCUMENT_LOADED: &str = "document-loaded";

/// Lifecycle event the shim subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostEvent {
    PageCreated,
    DocumentLoaded,
}

impl HostEvent {
    /// Stable event name used by the host's `connect` primitive.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageCreated => EVENT_PAGE_CREATED,
            Self::DocumentLoaded => EVENT_DOCUMENT_LOADED,
        }
    }
}

impl Display for HostEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
