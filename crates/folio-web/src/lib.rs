#![forbid(unsafe_code)]

//! `folio-web` drives folio page navigation from a web host.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes layout,
//!   viewport, scroll and key events; the host drains scroll requests.
//! - **Deterministic**: visibility is computed from reported geometry, so a
//!   recorded event sequence always replays to the same state.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! On `wasm32` the [`FolioNav`] binding wires the same page state to real
//! browser APIs (IntersectionObserver, `window.scrollTo`, `localStorage`).

pub mod input;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FolioNav;

/// Native builds compile the binding as a stub so `cargo check --workspace`
/// stays green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FolioNav;

#[cfg(not(target_arch = "wasm32"))]
impl FolioNav {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use folio_core::event::KeyEvent;
use folio_core::geometry::Rect;
use folio_core::section::{SectionId, SectionRegistry};
use folio_runtime::{
    ConfigError, GeometricObserver, Page, PageBuilder, PageConfig, PreferenceStore, ScrollHost,
    ScrollMetrics, ScrollRequest, ShortcutAction,
};

/// Web host error type.
#[derive(Debug, Clone, PartialEq)]
pub enum WebHostError {
    /// The page configuration was rejected at mount.
    Config(ConfigError),
    /// The page has been unmounted; no further events are accepted.
    Unmounted,
}

impl core::fmt::Display for WebHostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "mount failed: {e}"),
            Self::Unmounted => write!(f, "page is unmounted"),
        }
    }
}

impl std::error::Error for WebHostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Unmounted => None,
        }
    }
}

impl From<ConfigError> for WebHostError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Canonical events pushed by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A section was laid out at `region` (document coordinates).
    Layout {
        /// Section element id.
        section: SectionId,
        /// Document-space bounding box.
        region: Rect,
    },
    /// A section element was removed from the document.
    Unlayout {
        /// Section element id.
        section: SectionId,
    },
    /// The visible viewport moved or resized (document coordinates).
    Viewport(Rect),
    /// Scroll position for the progress indicators.
    Scroll(ScrollMetrics),
    /// A keydown.
    Key(KeyEvent),
}

/// What one [`WebHost::step`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Host events consumed.
    pub processed: usize,
    /// Intersection events emitted by the observers.
    pub intersections: usize,
    /// Shortcuts that fired, in order.
    pub actions: Vec<ShortcutAction>,
}

/// Scroll host that answers from the last reported layout and queues
/// requests for the embedding environment to perform.
#[derive(Debug, Clone, Default)]
pub struct WebScrollHost {
    tops: HashMap<SectionId, f64>,
    pending: VecDeque<ScrollRequest>,
}

impl WebScrollHost {
    fn set_section_top(&mut self, id: SectionId, top: f64) {
        self.tops.insert(id, top);
    }

    fn clear_section(&mut self, id: &str) {
        self.tops.remove(id);
    }

    /// Requests not yet taken by the host.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl ScrollHost for WebScrollHost {
    fn section_top(&self, id: &SectionId) -> Option<f64> {
        self.tops.get(id).copied()
    }

    fn request_scroll(&mut self, request: ScrollRequest) {
        self.pending.push_back(request);
    }
}

/// Deterministic page driver for web hosts.
///
/// Owns the mounted [`Page`] and two geometric observers (tracking and
/// reveal) fed from host layout and viewport reports.
pub struct WebHost {
    tracking: GeometricObserver,
    reveal: GeometricObserver,
    page: Page<WebScrollHost>,
    queue: VecDeque<HostEvent>,
    unmounted: bool,
}

impl WebHost {
    /// Mount a page with in-memory preferences and a light system theme.
    pub fn new(registry: SectionRegistry, config: PageConfig) -> Result<Self, WebHostError> {
        Self::with_preferences(registry, config, PreferenceStore::in_memory(), false)
    }

    /// Mount a page with explicit preferences and system theme signal.
    pub fn with_preferences(
        registry: SectionRegistry,
        config: PageConfig,
        preferences: PreferenceStore,
        system_prefers_dark: bool,
    ) -> Result<Self, WebHostError> {
        config.validate()?;
        let registry = Rc::new(registry);
        let tracking = GeometricObserver::new(Rc::clone(&registry), config.tracking_threshold);
        let reveal = GeometricObserver::new(Rc::clone(&registry), config.reveal_threshold);

        let page = PageBuilder::new(registry)
            .config(config)
            .preferences(preferences)
            .system_prefers_dark(system_prefers_dark)
            .mount(&tracking, &reveal, WebScrollHost::default())?;

        Ok(Self {
            tracking,
            reveal,
            page,
            queue: VecDeque::new(),
            unmounted: false,
        })
    }

    /// The mounted page.
    #[must_use]
    pub fn page(&self) -> &Page<WebScrollHost> {
        &self.page
    }

    /// Mutable access for UI actions (menu button, nav links).
    pub fn page_mut(&mut self) -> &mut Page<WebScrollHost> {
        &mut self.page
    }

    /// The tracking observer.
    #[must_use]
    pub fn tracking(&self) -> &GeometricObserver {
        &self.tracking
    }

    /// Push an event into the queue.
    pub fn push_event(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Process every queued event in order.
    pub fn step(&mut self) -> Result<StepReport, WebHostError> {
        if self.unmounted {
            self.queue.clear();
            return Err(WebHostError::Unmounted);
        }

        let mut report = StepReport::default();
        while let Some(event) = self.queue.pop_front() {
            report.processed += 1;
            match event {
                HostEvent::Layout { section, region } => {
                    report.intersections += self.apply_layout(section, region);
                }
                HostEvent::Unlayout { section } => {
                    self.tracking.clear_region(section.as_str());
                    self.reveal.clear_region(section.as_str());
                    self.page.host_mut().clear_section(section.as_str());
                }
                HostEvent::Viewport(viewport) => {
                    report.intersections += self.tracking.update_viewport(viewport);
                    report.intersections += self.reveal.update_viewport(viewport);
                }
                HostEvent::Scroll(metrics) => self.page.on_scroll(metrics),
                HostEvent::Key(key) => {
                    if let Some(action) = self.page.handle_key(&key) {
                        report.actions.push(action);
                    }
                }
            }
        }
        Ok(report)
    }

    fn apply_layout(&mut self, section: SectionId, region: Rect) -> usize {
        if !self.tracking.set_region(section.as_str(), region) {
            return 0;
        }
        self.reveal.set_region(section.as_str(), region);
        self.page.host_mut().set_section_top(section, region.top());
        self.tracking.refresh() + self.reveal.refresh()
    }

    /// Handle a key immediately, bypassing the queue.
    ///
    /// Hosts call this from their keydown listener to decide whether to
    /// suppress the browser default.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Result<Option<ShortcutAction>, WebHostError> {
        if self.unmounted {
            return Err(WebHostError::Unmounted);
        }
        Ok(self.page.handle_key(key))
    }

    /// Drain scroll requests for the host to perform.
    pub fn take_scroll_requests(&mut self) -> Vec<ScrollRequest> {
        self.page.host_mut().pending.drain(..).collect()
    }

    /// Release observer subscriptions. Later steps fail with
    /// [`WebHostError::Unmounted`].
    pub fn unmount(&mut self) -> usize {
        self.unmounted = true;
        self.page.unmount()
    }
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebHost")
            .field("page", &self.page)
            .field("queued", &self.queue.len())
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::event::{KeyCode, Modifiers};
    use folio_runtime::{ScrollBehavior, Theme};
    use pretty_assertions::assert_eq;

    const HEIGHT: f64 = 600.0;

    fn host() -> WebHost {
        host_with(PageConfig::default())
    }

    fn host_with(config: PageConfig) -> WebHost {
        let mut host = WebHost::new(SectionRegistry::portfolio(), config).unwrap();
        for (i, id) in ["hero", "about", "skills", "projects", "contact"].iter().enumerate() {
            host.push_event(HostEvent::Layout {
                section: SectionId::new(*id),
                region: Rect::new(0.0, i as f64 * HEIGHT, 1024.0, HEIGHT),
            });
        }
        host.push_event(HostEvent::Viewport(Rect::new(0.0, 0.0, 1024.0, HEIGHT)));
        host.step().unwrap();
        host
    }

    fn viewport(top: f64) -> HostEvent {
        HostEvent::Viewport(Rect::new(0.0, top, 1024.0, HEIGHT))
    }

    fn alt(c: char) -> HostEvent {
        HostEvent::Key(KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::ALT))
    }

    #[test]
    fn starts_on_first_section() {
        let host = host();
        assert_eq!(host.page().current_section(), "hero");
        assert!(host.tracking().is_visible("hero"));
        assert_eq!(host.pending_events(), 0);
    }

    #[test]
    fn viewport_moves_drive_tracking() {
        let mut host = host();
        host.push_event(viewport(2.0 * HEIGHT));
        let report = host.step().unwrap();
        assert_eq!(report.processed, 1);
        assert!(report.intersections >= 2);
        assert_eq!(host.page().current_section(), "skills");
        assert!(host.page().is_revealed("skills"));
    }

    #[test]
    fn config_thresholds_drive_observers() {
        let config = PageConfig::default().with_tracking_threshold(0.9).unwrap();
        let mut host = host_with(config);

        // hero and about at 50% each
        host.push_event(viewport(HEIGHT / 2.0));
        host.step().unwrap();
        assert_eq!(host.page().current_section(), "hero");
        assert!(!host.tracking().is_visible("about"));
        assert!(host.page().is_revealed("about"));

        host.push_event(viewport(HEIGHT));
        host.step().unwrap();
        assert_eq!(host.page().current_section(), "about");
    }

    #[test]
    fn non_finite_viewport_is_ignored() {
        let mut host = host();
        host.push_event(viewport(HEIGHT));
        host.push_event(viewport(f64::NAN));
        let report = host.step().unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(host.page().current_section(), "about");
        assert!(!host.tracking().is_visible("contact"));
        assert!(!host.page().is_revealed("contact"));
    }

    #[test]
    fn navigation_requests_scroll_for_host() {
        let mut host = host();
        host.page_mut().toggle_menu();
        assert!(host.page_mut().navigate_to("projects").scrolled());
        assert!(!host.page().is_menu_open());

        let requests = host.take_scroll_requests();
        assert_eq!(
            requests,
            vec![ScrollRequest {
                top: 3.0 * HEIGHT,
                behavior: ScrollBehavior::Smooth,
            }]
        );
        assert!(host.take_scroll_requests().is_empty());

        host.push_event(viewport(requests[0].top));
        host.step().unwrap();
        assert_eq!(host.page().current_section(), "projects");
    }

    #[test]
    fn unlayout_makes_section_unresolvable() {
        let mut host = host();
        host.push_event(HostEvent::Unlayout {
            section: SectionId::new("contact"),
        });
        host.step().unwrap();
        assert!(!host.page_mut().navigate_to("contact").scrolled());
        assert!(host.take_scroll_requests().is_empty());
    }

    #[test]
    fn unknown_layout_is_ignored() {
        let mut host = host();
        host.push_event(HostEvent::Layout {
            section: SectionId::new("footer"),
            region: Rect::new(0.0, 0.0, 1024.0, HEIGHT),
        });
        let report = host.step().unwrap();
        assert_eq!(report.intersections, 0);
        assert!(host.tracking().region("footer").is_none());
    }

    #[test]
    fn queued_keys_report_actions() {
        let mut host = host();
        host.push_event(alt('2'));
        host.push_event(alt('d'));
        host.push_event(HostEvent::Key(KeyEvent::new(KeyCode::Char('x'))));
        let report = host.step().unwrap();
        assert_eq!(
            report.actions,
            vec![
                ShortcutAction::Navigate(SectionId::new("about")),
                ShortcutAction::ToggleTheme,
            ]
        );
        assert_eq!(host.page().theme(), Theme::Dark);
        assert_eq!(host.take_scroll_requests().len(), 1);
    }

    #[test]
    fn scroll_metrics_feed_progress() {
        let mut host = host();
        host.push_event(HostEvent::Scroll(ScrollMetrics::new(1200.0, 3000.0, HEIGHT)));
        host.step().unwrap();
        assert_eq!(host.page().progress().rounded_percent(), 50);
        assert!(host.page().progress().show_scroll_top());
    }

    #[test]
    fn unmounted_host_rejects_events() {
        let mut host = host();
        assert_eq!(host.unmount(), 2);
        host.push_event(viewport(4.0 * HEIGHT));
        assert_eq!(host.step(), Err(WebHostError::Unmounted));
        assert_eq!(host.pending_events(), 0);
        assert_eq!(host.page().current_section(), "hero");

        let escape = KeyEvent::new(KeyCode::Escape);
        assert_eq!(host.handle_key(&escape), Err(WebHostError::Unmounted));
    }

    #[test]
    fn invalid_config_fails_mount() {
        let config = PageConfig::default().with_theme_key("");
        let err = WebHost::new(SectionRegistry::portfolio(), config).unwrap_err();
        assert_eq!(err, WebHostError::Config(ConfigError::EmptyThemeKey));
        assert_eq!(err.to_string(), "mount failed: invalid config: theme key is empty");
    }
}
