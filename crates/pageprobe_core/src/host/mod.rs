//! Typed host contract.
//!
//! # Responsibility
//! - Model the host's opaque extension/page/document objects as handle traits.
//! - Replace string-keyed `connect` with one typed registration per event.
//!
//! # Invariants
//! - The host owns every listener list; registration only returns an id.
//! - Accessors return owned snapshots, never references into host state.
//! - A listener error is a fault handed back to the host, not recovered here.

pub mod event;
pub mod sim;

use crate::error::ShimError;
use std::fmt::{Display, Formatter};

/// Result type every host listener returns.
pub type CallbackResult = Result<(), ShimError>;

/// Listener for the extension's `page-created` event.
pub type PageCreatedListener<E, P> = Box<dyn Fn(&E, &P) -> CallbackResult + 'static>;

/// Listener for a page's `document-loaded` event.
pub type DocumentLoadedListener<P> = Box<dyn Fn(&P) -> CallbackResult + 'static>;

/// Identifier of one listener registration, unique per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for ListenerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loaded DOM document of a page.
pub trait DocumentHandle {
    /// Document title; `None` when the host reports no title.
    fn title(&self) -> Option<String>;
}

/// One browser tab or frame.
///
/// `Display` renders the host-side identity used in diagnostic lines.
pub trait PageHandle: Display + Sized + 'static {
    type Document: DocumentHandle;

    /// Host-assigned page id.
    fn id(&self) -> u64;

    /// Current page URI; `None` before the first navigation.
    fn uri(&self) -> Option<String>;

    /// Currently loaded document, if any.
    fn dom_document(&self) -> Option<Self::Document>;

    /// Registers a `document-loaded` listener on this page.
    fn connect_document_loaded(&self, listener: DocumentLoadedListener<Self>) -> ListenerId;
}

/// Loaded extension instance within the host process.
///
/// `Display` renders the host-side identity used in diagnostic lines.
pub trait ExtensionHandle: Display + Sized + 'static {
    type Page: PageHandle;

    /// Registers a `page-created` listener on this extension.
    fn connect_page_created(
        &self,
        listener: PageCreatedListener<Self, Self::Page>,
    ) -> ListenerId;
}
