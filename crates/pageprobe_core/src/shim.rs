//! Event wiring shim.
//!
//! # Responsibility
//! - Subscribe to `page-created` at initialization and to `document-loaded`
//!   for every created page.
//! - Emit the fixed diagnostic lines for each callback.
//!
//! # Invariants
//! - `initialize` emits 2 lines, `on_page_created` 3, `on_document_loaded` 2.
//! - Each `initialize` / `on_page_created` call registers exactly one listener.
//! - No handle outlives the callback that borrowed it.

use crate::args::InitArguments;
use crate::error::ShimError;
use crate::host::event::HostEvent;
use crate::host::{DocumentHandle, ExtensionHandle, ListenerId, PageHandle};
use crate::sink::{DiagnosticSink, StdoutSink};
use log::debug;
use std::sync::Arc;

/// Rendering for absent URI or title values.
pub const MISSING_VALUE: &str = "<none>";

/// Callback set wired into the host. Cloning shares the sink.
#[derive(Clone)]
pub struct EventWiringShim {
    sink: Arc<dyn DiagnosticSink>,
}

impl EventWiringShim {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Shim that prints to standard output.
    pub fn stdout() -> Self {
        Self::new(Arc::new(StdoutSink))
    }

    /// Entry point called by the host once per process.
    ///
    /// Returns the id of the `page-created` listener it registered.
    pub fn initialize<E: ExtensionHandle>(
        &self,
        extension: &E,
        arguments: &InitArguments,
    ) -> ListenerId {
        self.emit(&format!("initialize: extension = {extension}"));
        self.emit(&format!("initialize: arguments = {arguments}"));

        let shim = self.clone();
        let listener_id =
            extension.connect_page_created(Box::new(move |extension: &E, page: &E::Page| {
                shim.on_page_created(extension, page);
                Ok(())
            }));
        debug!(
            "event=listener_registered module=shim name={} listener_id={}",
            HostEvent::PageCreated,
            listener_id
        );
        listener_id
    }

    /// Handles one `page-created` event.
    ///
    /// Returns the id of the `document-loaded` listener it registered on `page`.
    pub fn on_page_created<E: ExtensionHandle>(&self, extension: &E, page: &E::Page) -> ListenerId {
        self.emit(&format!("page-created: extension = {extension}"));
        self.emit(&format!("page-created: page = {page}"));
        self.emit(&format!("page-created: uri = {}", render(page.uri())));

        let shim = self.clone();
        let listener_id = page.connect_document_loaded(Box::new(move |page: &E::Page| {
            shim.on_document_loaded(page)
        }));
        debug!(
            "event=listener_registered module=shim name={} page_id={} listener_id={}",
            HostEvent::DocumentLoaded,
            page.id(),
            listener_id
        );
        listener_id
    }

    /// Handles one `document-loaded` event.
    ///
    /// # Errors
    /// - Returns [`ShimError::MissingDocument`] after the URI line when the page
    ///   exposes no DOM document.
    pub fn on_document_loaded<P: PageHandle>(&self, page: &P) -> Result<(), ShimError> {
        self.emit(&format!("document-loaded: uri = {}", render(page.uri())));
        let document = page
            .dom_document()
            .ok_or_else(|| ShimError::MissingDocument {
                page: page.to_string(),
            })?;
        self.emit(&format!("document-loaded: title = {}", render(document.title())));
        Ok(())
    }

    fn emit(&self, line: &str) {
        debug!(
            "event=diagnostic_line module=shim kind={} len={}",
            line_kind(line),
            line.len()
        );
        self.sink.emit(line);
    }
}

/// Callback label of a diagnostic line, without the URI or title it carries.
fn line_kind(line: &str) -> &str {
    line.split_once(": ").map_or("unknown", |(kind, _)| kind)
}

fn render(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING_VALUE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{line_kind, EventWiringShim, MISSING_VALUE};
    use crate::args::InitArguments;
    use crate::error::ShimError;
    use crate::host::sim::SimHost;
    use crate::sink::MemorySink;
    use std::sync::Arc;

    fn shim_with_sink() -> (EventWiringShim, MemorySink) {
        let sink = MemorySink::new();
        (EventWiringShim::new(Arc::new(sink.clone())), sink)
    }

    #[test]
    fn initialize_emits_identity_and_arguments() {
        let (shim, sink) = shim_with_sink();
        let host = SimHost::new();
        let args: InitArguments = ["one", "two"].into_iter().collect();

        shim.initialize(host.extension(), &args);

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!("initialize: extension = {}", host.extension())
        );
        assert_eq!(lines[1], r#"initialize: arguments = ["one", "two"]"#);
        assert_eq!(host.extension().listener_count(), 1);
    }

    #[test]
    fn page_without_uri_renders_placeholder() {
        let (shim, sink) = shim_with_sink();
        let mut host = SimHost::new();
        shim.initialize(host.extension(), &InitArguments::default());
        sink.take();

        host.create_page(None);

        let lines = sink.lines();
        assert_eq!(lines[2], format!("page-created: uri = {MISSING_VALUE}"));
    }

    #[test]
    fn line_kind_keeps_only_callback_label() {
        assert_eq!(
            line_kind("document-loaded: title = Private Inbox"),
            "document-loaded"
        );
        assert_eq!(
            line_kind("page-created: uri = https://example.com/a: b"),
            "page-created"
        );
        assert_eq!(line_kind("no separator"), "unknown");
    }

    #[test]
    fn missing_document_is_returned_after_uri_line() {
        let (shim, sink) = shim_with_sink();
        let mut host = SimHost::new();
        let page = host.create_page(Some("https://example.com/a"));
        page.load_without_document(None);

        let err = shim
            .on_document_loaded(&page)
            .expect_err("missing document must fault");

        assert!(matches!(err, ShimError::MissingDocument { .. }));
        assert_eq!(sink.lines(), vec!["document-loaded: uri = https://example.com/a"]);
    }
}
