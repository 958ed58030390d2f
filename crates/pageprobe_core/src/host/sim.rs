//! In-memory host used by tests and scenario replay.
//!
//! # Responsibility
//! - Own extension/page/document state and the listener lists for both events.
//! - Deliver events synchronously, in registration order, on the calling thread.
//!
//! # Invariants
//! - `document-loaded` only fires on pages produced by `create_page`, which
//!   always fires `page-created` first.
//! - Listener lists are snapshotted before dispatch, so listeners may register
//!   further listeners while an event is delivered.
//! - Listener errors are recorded as faults; dispatch continues with the next
//!   listener.

use crate::error::ShimError;
use crate::host::event::HostEvent;
use crate::host::{
    CallbackResult, DocumentHandle, DocumentLoadedListener, ExtensionHandle, ListenerId,
    PageCreatedListener, PageHandle,
};
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

type SharedPageCreatedListener = Rc<dyn Fn(&SimExtension, &SimPage) -> CallbackResult>;
type SharedDocumentLoadedListener = Rc<dyn Fn(&SimPage) -> CallbackResult>;

/// Listener error captured by the simulated host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFault {
    pub event: HostEvent,
    pub listener: ListenerId,
    pub page_id: u64,
    pub error: ShimError,
}

#[derive(Default)]
struct HostState {
    next_listener_id: Cell<u64>,
    next_page_id: Cell<u64>,
    faults: RefCell<Vec<HostFault>>,
}

impl HostState {
    fn mint_listener_id(&self) -> ListenerId {
        let next = self.next_listener_id.get() + 1;
        self.next_listener_id.set(next);
        ListenerId::new(next)
    }

    fn mint_page_id(&self) -> u64 {
        let next = self.next_page_id.get() + 1;
        self.next_page_id.set(next);
        next
    }

    fn record_fault(&self, fault: HostFault) {
        warn!(
            "event=listener_fault module=sim name={} page_id={} listener_id={} error={}",
            fault.event, fault.page_id, fault.listener, fault.error
        );
        self.faults.borrow_mut().push(fault);
    }
}

/// Simulated host process with a single loaded extension.
pub struct SimHost {
    state: Rc<HostState>,
    extension: SimExtension,
    pages: Vec<SimPage>,
}

impl SimHost {
    pub fn new() -> Self {
        let state = Rc::new(HostState::default());
        let extension = SimExtension {
            inner: Rc::new(ExtensionInner {
                id: Uuid::new_v4(),
                state: Rc::clone(&state),
                listeners: RefCell::new(Vec::new()),
            }),
        };
        Self {
            state,
            extension,
            pages: Vec::new(),
        }
    }

    pub fn extension(&self) -> &SimExtension {
        &self.extension
    }

    /// Opens a new page and fires `page-created` on the extension.
    pub fn create_page(&mut self, uri: Option<&str>) -> SimPage {
        let page = SimPage {
            inner: Rc::new(PageInner {
                id: self.state.mint_page_id(),
                state: Rc::clone(&self.state),
                uri: RefCell::new(uri.map(str::to_string)),
                document: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        };
        self.pages.push(page.clone());
        debug!(
            "event=page_created module=sim page_id={} has_uri={}",
            page.id(),
            uri.is_some()
        );
        self.extension.dispatch_page_created(&page);
        page
    }

    pub fn pages(&self) -> &[SimPage] {
        &self.pages
    }

    /// Faults recorded so far, in dispatch order.
    pub fn faults(&self) -> Vec<HostFault> {
        self.state.faults.borrow().clone()
    }

    /// Listener registrations across the extension and every page.
    pub fn listener_count(&self) -> usize {
        self.extension.listener_count()
            + self
                .pages
                .iter()
                .map(SimPage::listener_count)
                .sum::<usize>()
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

struct ExtensionInner {
    id: Uuid,
    state: Rc<HostState>,
    listeners: RefCell<Vec<(ListenerId, SharedPageCreatedListener)>>,
}

/// Extension handle of a [`SimHost`]. Clones refer to the same instance.
#[derive(Clone)]
pub struct SimExtension {
    inner: Rc<ExtensionInner>,
}

impl SimExtension {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn dispatch_page_created(&self, page: &SimPage) {
        let snapshot = self.inner.listeners.borrow().clone();
        for (listener_id, listener) in snapshot {
            if let Err(error) = listener(self, page) {
                self.inner.state.record_fault(HostFault {
                    event: HostEvent::PageCreated,
                    listener: listener_id,
                    page_id: page.id(),
                    error,
                });
            }
        }
    }
}

impl Display for SimExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimExtension({})", self.inner.id)
    }
}

impl ExtensionHandle for SimExtension {
    type Page = SimPage;

    fn connect_page_created(&self, listener: PageCreatedListener<Self, SimPage>) -> ListenerId {
        let listener_id = self.inner.state.mint_listener_id();
        self.inner
            .listeners
            .borrow_mut()
            .push((listener_id, Rc::from(listener)));
        listener_id
    }
}

struct PageInner {
    id: u64,
    state: Rc<HostState>,
    uri: RefCell<Option<String>>,
    document: RefCell<Option<SimDocument>>,
    listeners: RefCell<Vec<(ListenerId, SharedDocumentLoadedListener)>>,
}

/// Page handle of a [`SimHost`]. Clones refer to the same page.
#[derive(Clone)]
pub struct SimPage {
    inner: Rc<PageInner>,
}

impl SimPage {
    /// Navigates to `uri` (kept unchanged when `None`), installs a document
    /// with `title` and fires `document-loaded`.
    pub fn load_document(&self, uri: Option<&str>, title: Option<&str>) {
        self.navigate(uri, Some(SimDocument::new(title)));
    }

    /// Navigates without a DOM document and fires `document-loaded`.
    pub fn load_without_document(&self, uri: Option<&str>) {
        self.navigate(uri, None);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn navigate(&self, uri: Option<&str>, document: Option<SimDocument>) {
        if let Some(uri) = uri {
            *self.inner.uri.borrow_mut() = Some(uri.to_string());
        }
        *self.inner.document.borrow_mut() = document;
        debug!(
            "event=document_loaded module=sim page_id={} has_document={}",
            self.inner.id,
            self.inner.document.borrow().is_some()
        );

        let snapshot = self.inner.listeners.borrow().clone();
        for (listener_id, listener) in snapshot {
            if let Err(error) = listener(self) {
                self.inner.state.record_fault(HostFault {
                    event: HostEvent::DocumentLoaded,
                    listener: listener_id,
                    page_id: self.inner.id,
                    error,
                });
            }
        }
    }
}

impl Display for SimPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimPage(id={})", self.inner.id)
    }
}

impl PageHandle for SimPage {
    type Document = SimDocument;

    fn id(&self) -> u64 {
        self.inner.id
    }

    fn uri(&self) -> Option<String> {
        self.inner.uri.borrow().clone()
    }

    fn dom_document(&self) -> Option<SimDocument> {
        self.inner.document.borrow().clone()
    }

    fn connect_document_loaded(&self, listener: DocumentLoadedListener<Self>) -> ListenerId {
        let listener_id = self.inner.state.mint_listener_id();
        self.inner
            .listeners
            .borrow_mut()
            .push((listener_id, Rc::from(listener)));
        listener_id
    }
}

/// Document snapshot installed by a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDocument {
    title: Option<String>,
}

impl SimDocument {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
        }
    }
}

impl DocumentHandle for SimDocument {
    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}
