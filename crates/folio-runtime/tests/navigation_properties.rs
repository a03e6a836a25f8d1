#![forbid(unsafe_code)]

//! Behavioral properties of the mounted page.
//!
//! # Invariants
//!
//! 1. **Initial state**: the active section is the registry's first section
//! 2. **Last writer wins**: the most recent intersecting event decides
//! 3. **Negative events ignored**: leaving events never change the active section
//! 4. **Registry membership**: unknown ids never change the active section
//! 5. **Navigation closes the menu**, whether or not the target resolves
//! 6. **Silent absence**: unknown targets do nothing else
//! 7. **Escape idempotence**

use std::rc::Rc;

use folio_core::event::{KeyCode, KeyEvent, Modifiers};
use folio_core::section::SectionRegistry;
use folio_runtime::{
    Navigation, Page, PageBuilder, RecordingScrollHost, ScriptedObserver, ShortcutAction, Theme,
    Threshold,
};
use proptest::prelude::*;

const IDS: [&str; 5] = ["hero", "about", "skills", "projects", "contact"];

fn host() -> RecordingScrollHost {
    IDS.iter()
        .enumerate()
        .fold(RecordingScrollHost::new(), |host, (i, id)| {
            host.with_section(*id, i as f64 * 800.0)
        })
}

/// Tracking and reveal observers at the default thresholds.
struct Observers {
    tracking: ScriptedObserver,
    reveal: ScriptedObserver,
}

impl Observers {
    fn new() -> Self {
        Self {
            tracking: ScriptedObserver::new(),
            reveal: ScriptedObserver::with_threshold(Threshold::REVEAL),
        }
    }

    fn emit(&self, id: &str, is_intersecting: bool) {
        self.tracking.emit(id, is_intersecting);
    }

    fn subscriber_count(&self) -> usize {
        self.tracking.subscriber_count() + self.reveal.subscriber_count()
    }
}

fn mount(observers: &Observers) -> Page<RecordingScrollHost> {
    PageBuilder::new(Rc::new(SectionRegistry::portfolio()))
        .mount(&observers.tracking, &observers.reveal, host())
        .expect("default config is valid")
}

fn escape() -> KeyEvent {
    KeyEvent::new(KeyCode::Escape)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_no_events_means_hero() {
    let observers = Observers::new();
    let page = mount(&observers);
    assert_eq!(page.current_section(), "hero");
}

#[test]
fn scenario_b_last_intersecting_event_wins() {
    let observers = Observers::new();
    let page = mount(&observers);
    observers.emit("about", true);
    observers.emit("skills", true);
    observers.emit("about", false);
    assert_eq!(page.current_section(), "skills");
}

#[test]
fn scenario_c_toggle_then_escape() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    assert!(!page.is_menu_open());
    page.toggle_menu();
    assert!(page.is_menu_open());
    assert_eq!(page.handle_key(&escape()), Some(ShortcutAction::CloseMenu));
    assert!(!page.is_menu_open());
}

#[test]
fn scenario_d_navigate_then_intersection() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    page.toggle_menu();

    let outcome = page.navigate_to("projects");
    assert!(outcome.scrolled());
    assert!(!page.is_menu_open());
    assert_eq!(page.host().last_request().map(|r| r.top), Some(2400.0));

    observers.emit("projects", true);
    assert_eq!(page.current_section(), "projects");
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn lone_leaving_event_changes_nothing() {
    let observers = Observers::new();
    let page = mount(&observers);
    observers.emit("about", false);
    assert_eq!(page.current_section(), "hero");
}

#[test]
fn unknown_intersecting_id_changes_nothing() {
    let observers = Observers::new();
    let page = mount(&observers);
    observers.emit("skills", true);
    observers.emit("footer", true);
    assert_eq!(page.current_section(), "skills");
}

#[test]
fn navigate_to_nonexistent_is_silent() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    observers.emit("about", true);
    page.toggle_menu();

    assert_eq!(page.navigate_to("nonexistent"), Navigation::Unresolved);
    assert_eq!(page.current_section(), "about");
    assert!(!page.is_menu_open());
    assert!(page.host().requests().is_empty());
}

#[test]
fn navigate_does_not_touch_active_section() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    page.navigate_to("contact");
    assert_eq!(page.current_section(), "hero");
}

#[test]
fn escape_idempotence() {
    let observers = Observers::new();
    let mut page = mount(&observers);

    assert_eq!(page.handle_key(&escape()), None);
    assert!(!page.is_menu_open());

    page.toggle_menu();
    assert!(page.handle_key(&escape()).is_some());
    assert!(!page.is_menu_open());
    assert_eq!(page.handle_key(&escape()), None);
    assert!(!page.is_menu_open());
}

#[test]
fn reader_handles_follow_page() {
    let observers = Observers::new();
    let page = mount(&observers);
    let reader = page.active_reader();
    observers.emit("contact", true);
    assert!(reader.is_active("contact"));
}

// ============================================================================
// Shortcuts
// ============================================================================

#[test]
fn alt_digit_navigates_and_closes_menu() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    page.toggle_menu();
    let key = KeyEvent::new(KeyCode::Char('3')).with_modifiers(Modifiers::ALT);
    assert!(matches!(page.handle_key(&key), Some(ShortcutAction::Navigate(id)) if id == "skills"));
    assert_eq!(page.host().last_request().map(|r| r.top), Some(1600.0));
    assert!(!page.is_menu_open());
}

#[test]
fn alt_d_toggles_theme_and_alt_t_scrolls_up() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    assert_eq!(page.theme(), Theme::Light);

    let d = KeyEvent::new(KeyCode::Char('d')).with_modifiers(Modifiers::ALT);
    page.handle_key(&d);
    assert_eq!(page.theme(), Theme::Dark);

    let t = KeyEvent::new(KeyCode::Char('t')).with_modifiers(Modifiers::ALT);
    assert_eq!(page.handle_key(&t), Some(ShortcutAction::ScrollToTop));
    assert_eq!(page.host().last_request().map(|r| r.top), Some(0.0));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn unmount_releases_once_and_stops_events() {
    let observers = Observers::new();
    let mut page = mount(&observers);
    assert_eq!(observers.subscriber_count(), 2);
    assert!(page.is_mounted());

    assert_eq!(page.unmount(), 2);
    assert_eq!(page.unmount(), 0);
    assert!(!page.is_mounted());
    assert_eq!(observers.subscriber_count(), 0);

    observers.emit("contact", true);
    assert_eq!(page.current_section(), "hero");
}

#[test]
fn dropping_page_releases_subscriptions() {
    let observers = Observers::new();
    {
        let _page = mount(&observers);
        assert_eq!(observers.tracking.subscriber_count(), 1);
        assert_eq!(observers.reveal.subscriber_count(), 1);
    }
    assert_eq!(observers.subscriber_count(), 0);
}

#[test]
fn separate_reveal_observer() {
    let tracking = ScriptedObserver::new();
    let reveal = ScriptedObserver::with_threshold(Threshold::REVEAL);
    let page = PageBuilder::new(Rc::new(SectionRegistry::portfolio()))
        .mount(&tracking, &reveal, host())
        .unwrap();

    reveal.emit("skills", true);
    assert!(page.is_revealed("skills"));
    assert_eq!(page.current_section(), "hero");

    tracking.emit("about", true);
    assert_eq!(page.current_section(), "about");
    assert!(!page.is_revealed("about"));
}

// ============================================================================
// Property-based
// ============================================================================

fn arb_event() -> impl Strategy<Value = (String, bool)> {
    (
        prop_oneof![
            4 => (0usize..IDS.len()).prop_map(|i| IDS[i].to_string()),
            1 => "[a-z]{1,6}".prop_map(|s| format!("x-{s}")),
        ],
        any::<bool>(),
    )
}

proptest! {
    #[test]
    fn active_is_last_registered_intersecting(events in prop::collection::vec(arb_event(), 0..40)) {
        let observers = Observers::new();
        let page = mount(&observers);
        for (id, visible) in &events {
            observers.emit(id, *visible);
        }

        let expected = events
            .iter()
            .rev()
            .find(|(id, visible)| *visible && IDS.contains(&id.as_str()))
            .map(|(id, _)| id.as_str())
            .unwrap_or("hero");
        let current = page.current_section();
        prop_assert_eq!(current.as_str(), expected);
    }

    #[test]
    fn navigation_always_closes_menu(id in "[a-z]{0,10}", open in any::<bool>()) {
        let observers = Observers::new();
        let mut page = mount(&observers);
        if open {
            page.toggle_menu();
        }
        let before = page.current_section();
        page.navigate_to(&id);
        prop_assert!(!page.is_menu_open());
        prop_assert_eq!(page.current_section(), before);
    }
}
