//! WebKitGTK web-process binding.
//!
//! # Responsibility
//! - Export the entry point WebKit looks up when it loads the extension.
//! - Expose `WebExtension` / `WebPage` / `DOMDocument` as host handles.
//! - Route native signal emissions into the shim's listeners.
//!
//! # Invariants
//! - Listener panics never unwind into a GLib signal emission.
//! - User-data conversion never fails; unknown shapes fall back to their
//!   printed form.

use crate::bootstrap::bootstrap;
use glib::prelude::*;
use glib::translate::from_glib_none;
use glib::Variant;
use log::error;
use pageprobe_core::{
    CallbackResult, DocumentHandle, DocumentLoadedListener, ExtensionHandle, HostEvent,
    InitArguments, ListenerId, PageCreatedListener, PageHandle,
};
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use webkit2gtk_webextension::traits::{DOMDocumentExt, WebExtensionExt, WebPageExt};
use webkit2gtk_webextension::{DOMDocument, WebExtension, WebPage};

/// Entry point called by WebKit once the web process loads the extension.
///
/// # Safety
/// `extension` must be the live `WebKitWebExtension` handed over by WebKit;
/// `user_data` must be null or a valid `GVariant` for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn webkit_web_extension_initialize_with_user_data(
    extension: *mut webkit2gtk_webextension::ffi::WebKitWebExtension,
    user_data: *mut glib::ffi::GVariant,
) {
    if extension.is_null() {
        eprintln!("pageprobe: host passed a null extension pointer");
        return;
    }
    let extension = WebKitExtension(from_glib_none(extension));
    let user_data: Option<Variant> = from_glib_none(user_data);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let arguments = arguments_from_variant(user_data.as_ref());
        match bootstrap(&arguments) {
            Ok(shim) => {
                shim.initialize(&extension, &arguments);
            }
            // Logging is not up yet; the host's stderr is the only channel.
            Err(err) => eprintln!("pageprobe: extension not initialized: {err}"),
        }
    }));
    if outcome.is_err() {
        eprintln!("pageprobe: panic during extension initialization");
    }
}

/// The web process's extension object.
#[derive(Clone)]
pub struct WebKitExtension(WebExtension);

impl Display for WebKitExtension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebKitWebExtension at {:p}", self.0.as_ptr())
    }
}

impl ExtensionHandle for WebKitExtension {
    type Page = WebKitPage;

    fn connect_page_created(&self, listener: PageCreatedListener<Self, WebKitPage>) -> ListenerId {
        let handler = self
            .0
            .connect_page_created(move |extension: &WebExtension, page: &WebPage| {
                let extension = WebKitExtension(extension.clone());
                let page = WebKitPage(page.clone());
                let outcome = catch_unwind(AssertUnwindSafe(|| listener(&extension, &page)));
                report(HostEvent::PageCreated, &page, outcome);
            });
        // SAFETY: the raw id is only stored as an opaque value, never passed back to GLib.
        ListenerId::new(u64::from(unsafe { handler.as_raw() }))
    }
}

/// One web page inside the web process.
#[derive(Clone)]
pub struct WebKitPage(WebPage);

impl Display for WebKitPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebKitWebPage(id={}) at {:p}", self.id(), self.0.as_ptr())
    }
}

impl PageHandle for WebKitPage {
    type Document = WebKitDocument;

    fn id(&self) -> u64 {
        self.0.id()
    }

    fn uri(&self) -> Option<String> {
        self.0.uri().map(|uri| uri.to_string())
    }

    fn dom_document(&self) -> Option<WebKitDocument> {
        self.0.dom_document().map(WebKitDocument)
    }

    fn connect_document_loaded(&self, listener: DocumentLoadedListener<Self>) -> ListenerId {
        let handler = self.0.connect_document_loaded(move |page: &WebPage| {
            let page = WebKitPage(page.clone());
            let outcome = catch_unwind(AssertUnwindSafe(|| listener(&page)));
            report(HostEvent::DocumentLoaded, &page, outcome);
        });
        // SAFETY: see `connect_page_created`.
        ListenerId::new(u64::from(unsafe { handler.as_raw() }))
    }
}

/// A page's DOM document.
pub struct WebKitDocument(DOMDocument);

impl DocumentHandle for WebKitDocument {
    fn title(&self) -> Option<String> {
        self.0.title().map(|title| title.to_string())
    }
}

fn report(event: HostEvent, page: &WebKitPage, outcome: std::thread::Result<CallbackResult>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(
            "event=listener_fault module=webext name={} page_id={} error={}",
            event,
            page.id(),
            err
        ),
        Err(_) => error!(
            "event=listener_panic module=webext name={} page_id={}",
            event,
            page.id()
        ),
    }
}

/// Converts the host's user-data variant into ordered arguments.
///
/// - null -> no arguments
/// - `as` -> one argument per element
/// - `s` -> a single argument
/// - anything else -> its printed form as a single argument
pub fn arguments_from_variant(variant: Option<&Variant>) -> InitArguments {
    let Some(variant) = variant else {
        return InitArguments::default();
    };

    if variant.is::<Vec<String>>() {
        if let Some(values) = variant.get::<Vec<String>>() {
            return InitArguments::new(values);
        }
    }
    if variant.is::<String>() {
        if let Some(value) = variant.str() {
            return std::iter::once(value).collect();
        }
    }
    std::iter::once(variant.print(false).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::arguments_from_variant;
    use glib::ToVariant;

    #[test]
    fn null_user_data_yields_no_arguments() {
        assert!(arguments_from_variant(None).is_empty());
    }

    #[test]
    fn string_array_yields_one_argument_per_element() {
        let variant = vec!["log-level=warn".to_string(), "extra".to_string()].to_variant();
        let arguments = arguments_from_variant(Some(&variant));
        assert_eq!(
            arguments.iter().collect::<Vec<_>>(),
            vec!["log-level=warn", "extra"]
        );
        assert_eq!(arguments.value_of("log-level"), Some("warn"));
    }

    #[test]
    fn single_string_yields_single_argument() {
        let variant = "only".to_variant();
        let arguments = arguments_from_variant(Some(&variant));
        assert_eq!(arguments.iter().collect::<Vec<_>>(), vec!["only"]);
    }

    #[test]
    fn other_types_fall_back_to_printed_form() {
        let variant = 7u32.to_variant();
        let arguments = arguments_from_variant(Some(&variant));
        assert_eq!(arguments.iter().collect::<Vec<_>>(), vec!["7"]);

        let tuple = ("a".to_string(), "b".to_string()).to_variant();
        let arguments = arguments_from_variant(Some(&tuple));
        assert_eq!(arguments.iter().collect::<Vec<_>>(), vec!["('a', 'b')"]);
    }
}
