#![forbid(unsafe_code)]

//! The mounted page context.
//!
//! [`Page`] owns the navigation state for one page lifetime and is passed
//! explicitly to whatever renders the UI. Mounting wires the active-section
//! controller and the reveal tracker to their observers; unmounting (or
//! dropping the page) releases those subscriptions exactly once.
//!
//! Ownership of each piece of state:
//!
//! | State | Writer |
//! |-------|--------|
//! | active section | [`ActiveSectionController`] (inside the observer callback) |
//! | mobile menu | menu button, navigation, Escape, all via `Page` |
//! | theme | `Page::toggle_theme` |
//!
//! Everything else reads.

use std::rc::Rc;

use folio_core::event::KeyEvent;
use folio_core::section::{SectionId, SectionRegistry};

use crate::active_section::{ActiveSectionController, ActiveSectionReader};
use crate::config::{ConfigError, ObserverRole, PageConfig};
use crate::menu::MobileMenu;
use crate::navigation::{Navigation, Navigator, ScrollHost};
use crate::observer::{Threshold, VisibilityObserver};
use crate::preferences::PreferenceStore;
use crate::reveal::RevealTracker;
use crate::scroll_progress::{ScrollMetrics, ScrollProgress};
use crate::shortcuts::{self, ShortcutAction};
use crate::subscription::Subscription;
use crate::theme::{Theme, ThemeController};

/// Builder for [`Page`].
pub struct PageBuilder {
    registry: Rc<SectionRegistry>,
    config: PageConfig,
    preferences: Option<PreferenceStore>,
    system_prefers_dark: bool,
}

impl PageBuilder {
    /// Start building a page over `registry`.
    #[must_use]
    pub fn new(registry: Rc<SectionRegistry>) -> Self {
        Self {
            registry,
            config: PageConfig::default(),
            preferences: None,
            system_prefers_dark: false,
        }
    }

    /// Use a specific configuration.
    #[must_use]
    pub fn config(mut self, config: PageConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a preference store for the theme. Defaults to in-memory.
    #[must_use]
    pub fn preferences(mut self, store: PreferenceStore) -> Self {
        self.preferences = Some(store);
        self
    }

    /// The host's system-level dark-mode signal.
    #[must_use]
    pub fn system_prefers_dark(mut self, prefers_dark: bool) -> Self {
        self.system_prefers_dark = prefers_dark;
        self
    }

    /// Mount the page: create state, subscribe to observers, load the theme.
    ///
    /// `tracking` must report at `config.tracking_threshold` and `reveal` at
    /// `config.reveal_threshold`. Nothing is subscribed when either check
    /// fails.
    pub fn mount<H: ScrollHost>(
        self,
        tracking: &dyn VisibilityObserver,
        reveal: &dyn VisibilityObserver,
        host: H,
    ) -> Result<Page<H>, ConfigError> {
        self.config.validate()?;
        check_threshold(ObserverRole::Tracking, self.config.tracking_threshold, tracking)?;
        check_threshold(ObserverRole::Reveal, self.config.reveal_threshold, reveal)?;

        let controller = ActiveSectionController::new(Rc::clone(&self.registry));
        let active = controller.reader();
        let revealed = RevealTracker::new(Rc::clone(&self.registry));

        let subscriptions = vec![controller.attach(tracking), revealed.attach(reveal)];

        let themes = ThemeController::load(
            self.preferences.unwrap_or_else(PreferenceStore::in_memory),
            self.config.theme_key.clone(),
            self.system_prefers_dark,
        );

        let navigator = Navigator::new(Rc::clone(&self.registry), host)
            .with_behavior(self.config.scroll_behavior);

        tracing::info!(
            sections = self.registry.len(),
            first = %self.registry.first().id,
            theme = themes.theme().as_str(),
            "page mounted"
        );

        Ok(Page {
            progress: ScrollProgress::new(self.config.scroll_top_offset),
            registry: self.registry,
            config: self.config,
            active,
            reveal: revealed,
            subscriptions,
            menu: MobileMenu::new(),
            navigator,
            themes,
        })
    }
}

fn check_threshold(
    role: ObserverRole,
    expected: Threshold,
    observer: &dyn VisibilityObserver,
) -> Result<(), ConfigError> {
    let actual = observer.threshold();
    if actual == expected {
        return Ok(());
    }
    tracing::warn!(
        observer = role.as_str(),
        expected = expected.value(),
        actual = actual.value(),
        "observer threshold does not match config"
    );
    Err(ConfigError::ThresholdMismatch {
        role,
        expected: expected.value(),
        actual: actual.value(),
    })
}

/// Navigation state for one mounted page.
pub struct Page<H: ScrollHost> {
    registry: Rc<SectionRegistry>,
    config: PageConfig,
    active: ActiveSectionReader,
    reveal: RevealTracker,
    subscriptions: Vec<Subscription>,
    menu: MobileMenu,
    navigator: Navigator<H>,
    themes: ThemeController,
    progress: ScrollProgress,
}

impl<H: ScrollHost> Page<H> {
    /// The section registry.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// The configuration the page was mounted with.
    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    // ── active section ─────────────────────────────────────────────────

    /// The section currently considered in view.
    #[must_use]
    pub fn current_section(&self) -> SectionId {
        self.active.current()
    }

    /// A cloneable read-only handle for UI components.
    #[must_use]
    pub fn active_reader(&self) -> ActiveSectionReader {
        self.active.clone()
    }

    // ── mobile menu ────────────────────────────────────────────────────

    /// Whether the mobile menu overlay is shown.
    #[must_use]
    pub fn is_menu_open(&self) -> bool {
        self.menu.is_open()
    }

    /// Menu button: flip the overlay.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu.toggle_open()
    }

    /// Close the overlay.
    pub fn close_menu(&mut self) {
        self.menu.close();
    }

    // ── navigation ─────────────────────────────────────────────────────

    /// Scroll to a section and close the mobile menu.
    ///
    /// The active section is not touched here; it follows from the
    /// observer events the scroll produces.
    pub fn navigate_to(&mut self, id: &str) -> Navigation {
        self.navigator.navigate_to(id, &mut self.menu)
    }

    /// Scroll back to the top of the page.
    pub fn scroll_to_top(&mut self) {
        self.navigator.scroll_to_top();
    }

    /// The scroll host.
    #[must_use]
    pub fn host(&self) -> &H {
        self.navigator.host()
    }

    /// Mutable access to the scroll host.
    pub fn host_mut(&mut self) -> &mut H {
        self.navigator.host_mut()
    }

    // ── keyboard ───────────────────────────────────────────────────────

    /// Handle a key press.
    ///
    /// Returns the action taken, if any; hosts use this to suppress the
    /// browser's default handling.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<ShortcutAction> {
        let action = shortcuts::resolve(key, &self.registry)?;
        match &action {
            ShortcutAction::CloseMenu => {
                if !self.menu.handle_key(key) {
                    return None;
                }
            }
            ShortcutAction::Navigate(id) => {
                self.navigate_to(id.as_str());
            }
            ShortcutAction::ToggleTheme => {
                self.toggle_theme();
            }
            ShortcutAction::ScrollToTop => self.scroll_to_top(),
        }
        Some(action)
    }

    // ── scroll indicators ──────────────────────────────────────────────

    /// Feed a scroll position to the progress indicators.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.progress.update(metrics);
    }

    /// Reading progress and scroll-to-top visibility.
    #[must_use]
    pub fn progress(&self) -> &ScrollProgress {
        &self.progress
    }

    /// Whether a section's entrance animation has been triggered.
    #[must_use]
    pub fn is_revealed(&self, id: &str) -> bool {
        self.reveal.is_revealed(id)
    }

    // ── theme ──────────────────────────────────────────────────────────

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.themes.theme()
    }

    /// Flip and persist the theme.
    ///
    /// A storage failure is logged; the new theme still applies for this
    /// session.
    pub fn toggle_theme(&mut self) -> Theme {
        match self.themes.toggle() {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist theme preference");
                self.themes.theme()
            }
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    /// Whether observer subscriptions are still held.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Release every observer subscription.
    ///
    /// Returns how many live subscriptions were released. Calling it again
    /// releases nothing.
    pub fn unmount(&mut self) -> usize {
        let released = self
            .subscriptions
            .drain(..)
            .map(Subscription::unsubscribe)
            .filter(|&removed| removed)
            .count();
        if released > 0 {
            tracing::info!(released, "page unmounted");
        }
        released
    }
}

impl<H: ScrollHost> std::fmt::Debug for Page<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("current", &self.active.current())
            .field("menu_open", &self.menu.is_open())
            .field("theme", &self.themes.theme())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
