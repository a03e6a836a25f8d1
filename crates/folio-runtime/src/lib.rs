#![forbid(unsafe_code)]

//! folio runtime
//!
//! Scroll-driven active-section tracking and in-page navigation for
//! single-page sites.
//!
//! # Key Components
//!
//! - [`VisibilityObserver`] - Source of section intersection events
//! - [`GeometricObserver`] - Observer computed from host-reported geometry
//! - [`ActiveSectionController`] - Last-writer-wins active section tracking
//! - [`Navigator`] - Smooth-scroll navigation through a [`ScrollHost`]
//! - [`MobileMenu`] - Collapsed navigation overlay state
//! - [`ThemeController`] - Persisted light/dark preference
//! - [`Page`] - The mounted context tying everything together
//!
//! # Data flow
//!
//! ```text
//! SectionRegistry → VisibilityObserver → ActiveSectionController → UI (read)
//! UI → Navigator → ScrollHost (scroll) ─┐
//!          └→ MobileMenu (close)        └→ new intersection events
//! ```
//!
//! All state is single-threaded (`Rc`/`RefCell`) and lives on the host's
//! event loop.

pub mod active_section;
pub mod config;
pub mod menu;
pub mod navigation;
pub mod observer;
pub mod page;
pub mod preferences;
pub mod reveal;
pub mod scroll_progress;
pub mod shortcuts;
pub mod subscription;
pub mod theme;

pub use active_section::{ActiveSectionController, ActiveSectionReader};
pub use config::{ConfigError, ObserverRole, PageConfig};
pub use menu::MobileMenu;
pub use navigation::{
    Navigation, Navigator, RecordingScrollHost, ScrollBehavior, ScrollHost, ScrollRequest,
};
pub use observer::{GeometricObserver, ScriptedObserver, Threshold, ThresholdError, VisibilityObserver};
pub use page::{Page, PageBuilder};
pub use reveal::{REVEAL_CLASS, RevealTracker};
pub use scroll_progress::{ScrollMetrics, ScrollProgress};
pub use shortcuts::ShortcutAction;
pub use subscription::{Listeners, SubId, Subscription};
pub use theme::{THEME_KEY, Theme, ThemeController};

// Preference persistence
#[cfg(feature = "persistence")]
pub use preferences::FileStorage;
pub use preferences::{MemoryStorage, PreferenceStore, StorageBackend, StorageError, StorageResult};
