#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use folio_core::event::IntersectionEvent;
use folio_core::section::{SectionId, SectionRegistry};
use folio_runtime::{
    Listeners, Page, PageBuilder, PageConfig, PreferenceStore, REVEAL_CLASS, ScrollHost,
    ScrollMetrics, ScrollRequest, ShortcutAction, StorageBackend, StorageError, StorageResult,
    Subscription, Theme, Threshold, VisibilityObserver,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent, ScrollToOptions, Storage, Window,
};

use crate::input;

type ChangeCallback = Rc<RefCell<Option<js_sys::Function>>>;

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn unavailable(value: JsValue) -> StorageError {
    StorageError::Unavailable(js_message(&value))
}

// ─────────────────────────────────────────────────────────────────────────────
// localStorage
// ─────────────────────────────────────────────────────────────────────────────

struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    fn open(window: &Window) -> StorageResult<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable("localStorage is missing".into())),
            Err(e) => Err(unavailable(e)),
        }
    }
}

impl StorageBackend for LocalStorage {
    fn name(&self) -> &str {
        "localStorage"
    }

    fn load_all(&self) -> StorageResult<HashMap<String, String>> {
        let len = self.storage.length().map_err(unavailable)?;
        let mut entries = HashMap::with_capacity(len as usize);
        for index in 0..len {
            let Some(key) = self.storage.key(index).map_err(unavailable)? else {
                continue;
            };
            if let Some(value) = self.storage.get_item(&key).map_err(unavailable)? {
                entries.insert(key, value);
            }
        }
        Ok(entries)
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set_item(key, value).map_err(unavailable)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage.remove_item(key).map_err(unavailable)
    }
}

fn open_preferences(window: &Window) -> PreferenceStore {
    match LocalStorage::open(window) {
        Ok(storage) => PreferenceStore::open(Box::new(storage)),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to in-memory preferences");
            PreferenceStore::in_memory()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IntersectionObserver
// ─────────────────────────────────────────────────────────────────────────────

/// Browser IntersectionObserver adapted to [`VisibilityObserver`].
///
/// A section counts as intersecting only when its ratio meets the threshold;
/// the browser's own `isIntersecting` is true for any overlap.
struct DomObserver {
    threshold: Threshold,
    listeners: Rc<Listeners<IntersectionEvent>>,
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl DomObserver {
    fn new(
        document: &Document,
        registry: &SectionRegistry,
        threshold: Threshold,
    ) -> Result<Self, JsValue> {
        let listeners: Rc<Listeners<IntersectionEvent>> = Rc::new(Listeners::new());
        let sink = Rc::clone(&listeners);
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let ratio = entry.intersection_ratio();
                    sink.emit(&IntersectionEvent {
                        section: SectionId::new(entry.target().id()),
                        is_intersecting: entry.is_intersecting() && threshold.is_met(ratio),
                        ratio,
                    });
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold.value()));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;

        for section in registry.iter() {
            match document.get_element_by_id(section.id.as_str()) {
                Some(element) => observer.observe(&element),
                None => tracing::debug!(section = %section.id, "section element not found"),
            }
        }

        Ok(Self {
            threshold,
            listeners,
            observer,
            _callback: callback,
        })
    }
}

impl VisibilityObserver for DomObserver {
    fn threshold(&self) -> Threshold {
        self.threshold
    }

    fn subscribe(&self, on_intersect: Box<dyn FnMut(&IntersectionEvent)>) -> Subscription {
        self.listeners.subscribe(on_intersect)
    }

    fn disconnect(&self) {
        self.observer.disconnect();
        self.listeners.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scrolling
// ─────────────────────────────────────────────────────────────────────────────

struct DomScrollHost {
    window: Window,
    document: Document,
}

impl ScrollHost for DomScrollHost {
    fn section_top(&self, id: &SectionId) -> Option<f64> {
        let element = self.document.get_element_by_id(id.as_str())?;
        let scroll_y = self.window.scroll_y().ok()?;
        Some(element.get_bounding_client_rect().top() + scroll_y)
    }

    fn request_scroll(&mut self, request: ScrollRequest) {
        let options = ScrollToOptions::new();
        options.set_top(request.top);
        options.set_behavior(match request.behavior {
            folio_runtime::ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            folio_runtime::ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

fn scroll_metrics(window: &Window, document: &Document) -> Option<ScrollMetrics> {
    let scroll_top = window.scroll_y().ok()?;
    let viewport_height = window.inner_height().ok()?.as_f64()?;
    let document_height = f64::from(document.document_element()?.scroll_height());
    Some(ScrollMetrics::new(scroll_top, document_height, viewport_height))
}

fn apply_theme(document: &Document, theme: Theme) {
    let Some(root) = document.document_element() else {
        return;
    };
    if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
        tracing::warn!(error = %js_message(&e), "failed to set data-theme");
    }
}

fn notify(on_change: &ChangeCallback) {
    let Some(callback) = on_change.borrow().clone() else {
        return;
    };
    if let Err(e) = callback.call0(&JsValue::NULL) {
        tracing::warn!(error = %js_message(&e), "change callback threw");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JS surface
// ─────────────────────────────────────────────────────────────────────────────

/// Page navigation bound to the live document.
///
/// Construct once the section elements are in the DOM. Call
/// [`destroy`](Self::destroy) (or let JS free the object) on teardown.
#[wasm_bindgen]
pub struct FolioNav {
    window: Window,
    document: Document,
    page: Rc<RefCell<Page<DomScrollHost>>>,
    tracking: DomObserver,
    reveal: DomObserver,
    subscriptions: Vec<Subscription>,
    on_change: ChangeCallback,
    on_keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    on_scroll: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl FolioNav {
    /// Mount over the given section ids (document order). An empty list
    /// selects the default portfolio sections.
    #[wasm_bindgen(constructor)]
    pub fn new(section_ids: Vec<String>) -> Result<FolioNav, JsValue> {
        let registry = if section_ids.is_empty() {
            SectionRegistry::portfolio()
        } else {
            SectionRegistry::from_ids(section_ids)
                .map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let registry = Rc::new(registry);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let config = PageConfig::default();
        let tracking = DomObserver::new(&document, &registry, config.tracking_threshold)?;
        let reveal = DomObserver::new(&document, &registry, config.reveal_threshold)?;

        let system_prefers_dark = window
            .match_media("(prefers-color-scheme: dark)")
            .ok()
            .flatten()
            .is_some_and(|query| query.matches());

        let host = DomScrollHost {
            window: window.clone(),
            document: document.clone(),
        };
        let page = PageBuilder::new(Rc::clone(&registry))
            .config(config)
            .preferences(open_preferences(&window))
            .system_prefers_dark(system_prefers_dark)
            .mount(&tracking, &reveal, host)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        apply_theme(&document, page.theme());
        let page = Rc::new(RefCell::new(page));
        let on_change: ChangeCallback = Rc::new(RefCell::new(None));

        let mut subscriptions = Vec::with_capacity(2);
        {
            let on_change = Rc::clone(&on_change);
            subscriptions.push(tracking.subscribe(Box::new(move |event: &IntersectionEvent| {
                if event.is_intersecting {
                    notify(&on_change);
                }
            })));
        }
        {
            let document = document.clone();
            subscriptions.push(reveal.subscribe(Box::new(move |event: &IntersectionEvent| {
                if !event.is_intersecting {
                    return;
                }
                let Some(element) = document.get_element_by_id(event.section.as_str()) else {
                    return;
                };
                if let Err(e) = element.class_list().add_1(REVEAL_CLASS) {
                    tracing::warn!(error = %js_message(&e), "failed to add reveal class");
                }
            })));
        }

        let on_keydown = {
            let page = Rc::clone(&page);
            let on_change = Rc::clone(&on_change);
            let document = document.clone();
            Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                let mods = input::dom_modifiers(
                    event.alt_key(),
                    event.ctrl_key(),
                    event.shift_key(),
                    event.meta_key(),
                );
                let Some(key) =
                    input::normalize_keydown(&event.key(), &event.code(), mods, event.repeat())
                else {
                    return;
                };
                let action = page.borrow_mut().handle_key(&key);
                let Some(action) = action else {
                    return;
                };
                if action != ShortcutAction::CloseMenu {
                    event.prevent_default();
                }
                if action == ShortcutAction::ToggleTheme {
                    apply_theme(&document, page.borrow().theme());
                }
                notify(&on_change);
            })
        };
        window.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;

        let on_scroll = {
            let page = Rc::clone(&page);
            let on_change = Rc::clone(&on_change);
            let window = window.clone();
            let document = document.clone();
            Closure::<dyn FnMut()>::new(move || {
                let Some(metrics) = scroll_metrics(&window, &document) else {
                    return;
                };
                page.borrow_mut().on_scroll(metrics);
                notify(&on_change);
            })
        };
        window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;

        tracing::info!(sections = registry.len(), "folio navigation attached");

        Ok(Self {
            window,
            document,
            page,
            tracking,
            reveal,
            subscriptions,
            on_change,
            on_keydown: Some(on_keydown),
            on_scroll: Some(on_scroll),
        })
    }

    /// Register a callback invoked after any state change.
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        *self.on_change.borrow_mut() = callback;
    }

    /// Id of the section currently in view.
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> String {
        self.page.borrow().current_section().as_str().to_owned()
    }

    /// Whether `id` is the section currently in view.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self, id: &str) -> bool {
        self.page.borrow().current_section() == id
    }

    #[wasm_bindgen(js_name = isMenuOpen)]
    pub fn is_menu_open(&self) -> bool {
        self.page.borrow().is_menu_open()
    }

    #[wasm_bindgen(js_name = toggleMenu)]
    pub fn toggle_menu(&self) -> bool {
        let open = self.page.borrow_mut().toggle_menu();
        notify(&self.on_change);
        open
    }

    #[wasm_bindgen(js_name = closeMenu)]
    pub fn close_menu(&self) {
        self.page.borrow_mut().close_menu();
        notify(&self.on_change);
    }

    /// Smooth-scroll to a section and close the menu. Returns whether a
    /// scroll was started.
    #[wasm_bindgen(js_name = navigateTo)]
    pub fn navigate_to(&self, id: &str) -> bool {
        let scrolled = self.page.borrow_mut().navigate_to(id).scrolled();
        notify(&self.on_change);
        scrolled
    }

    #[wasm_bindgen(js_name = scrollToTop)]
    pub fn scroll_to_top(&self) {
        self.page.borrow_mut().scroll_to_top();
    }

    /// `"light"` or `"dark"`.
    pub fn theme(&self) -> String {
        self.page.borrow().theme().as_str().to_owned()
    }

    /// Flip and persist the theme; returns the new value.
    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> String {
        let theme = self.page.borrow_mut().toggle_theme();
        apply_theme(&self.document, theme);
        notify(&self.on_change);
        theme.as_str().to_owned()
    }

    /// Reading progress in percent.
    pub fn progress(&self) -> f64 {
        self.page.borrow().progress().percent()
    }

    #[wasm_bindgen(js_name = showScrollTop)]
    pub fn show_scroll_top(&self) -> bool {
        self.page.borrow().progress().show_scroll_top()
    }

    #[wasm_bindgen(js_name = isRevealed)]
    pub fn is_revealed(&self, id: &str) -> bool {
        self.page.borrow().is_revealed(id)
    }

    /// Detach listeners and observers. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(cb) = self.on_keydown.take()
            && let Err(e) = self
                .window
                .remove_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %js_message(&e), "failed to remove keydown listener");
        }
        if let Some(cb) = self.on_scroll.take()
            && let Err(e) = self
                .window
                .remove_event_listener_with_callback("scroll", cb.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %js_message(&e), "failed to remove scroll listener");
        }

        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.page.borrow_mut().unmount();
        self.tracking.disconnect();
        self.reveal.disconnect();
        *self.on_change.borrow_mut() = None;
    }
}

impl Drop for FolioNav {
    fn drop(&mut self) {
        self.destroy();
    }
}
