#![forbid(unsafe_code)]

//! Core: section registry, page geometry, and input events.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod section;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};

pub use event::{IntersectionEvent, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use geometry::Rect;
pub use section::{RegistryError, Section, SectionId, SectionRegistry};
