#![forbid(unsafe_code)]

//! Visibility observers.
//!
//! A [`VisibilityObserver`] reports when registered sections cross a
//! visibility [`Threshold`]. Consumers subscribe a callback and receive an
//! [`IntersectionEvent`] per crossing until their [`Subscription`] is
//! released.
//!
//! Two implementations live here:
//!
//! - [`GeometricObserver`] computes visibility itself from section regions
//!   and viewport rectangles pushed by the host (scroll-offset polling).
//! - [`ScriptedObserver`] synthesizes events on demand for deterministic
//!   tests.
//!
//! Hosts with a native intersection API (the browser's
//! `IntersectionObserver`) implement the trait directly.
//!
//! Events for different sections carry no ordering guarantee beyond what a
//! particular implementation documents; consumers must accept any
//! interleaving.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use folio_core::event::IntersectionEvent;
use folio_core::geometry::Rect;
use folio_core::section::{SectionId, SectionRegistry};

use crate::subscription::{Listeners, Subscription};

/// Fraction of a section's area that must be on screen to count as visible.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Threshold used for active-section tracking.
    pub const SECTION_TRACKING: Self = Self(0.3);

    /// Looser threshold used to trigger reveal animations.
    pub const REVEAL: Self = Self(0.1);

    /// Create a threshold, rejecting values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ThresholdError(value))
        }
    }

    /// The raw fraction.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether an observed visible ratio counts as intersecting.
    ///
    /// Some part of the section must be on screen, so a zero threshold
    /// still requires a non-zero ratio.
    #[must_use]
    pub fn is_met(self, ratio: f64) -> bool {
        ratio > 0.0 && ratio >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::SECTION_TRACKING
    }
}

/// A threshold outside `[0, 1]` (or NaN).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdError(pub f64);

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visibility threshold {} is outside [0, 1]", self.0)
    }
}

impl std::error::Error for ThresholdError {}

/// Source of section visibility events.
pub trait VisibilityObserver {
    /// Threshold this observer reports against.
    fn threshold(&self) -> Threshold;

    /// Register a callback for intersection events.
    ///
    /// The callback runs for every event until the returned handle is
    /// released or the observer is disconnected.
    fn subscribe(&self, on_intersect: Box<dyn FnMut(&IntersectionEvent)>) -> Subscription;

    /// Stop observing and release every subscription.
    fn disconnect(&self);
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometric observer
// ─────────────────────────────────────────────────────────────────────────────

/// Observer driven by host-reported geometry.
///
/// The host reports where each section is laid out ([`set_region`]) and
/// where the viewport currently is ([`update_viewport`]). For every section
/// with a known region the visible ratio is compared to the threshold and an
/// event is emitted whenever the result flips. Events within one update are
/// emitted in registry order.
///
/// Sections with no region never report. Clearing a region forgets its
/// state without emitting anything.
///
/// [`set_region`]: Self::set_region
/// [`update_viewport`]: Self::update_viewport
pub struct GeometricObserver {
    registry: Rc<SectionRegistry>,
    threshold: Threshold,
    regions: HashMap<SectionId, Rect>,
    visible: HashMap<SectionId, bool>,
    viewport: Option<Rect>,
    listeners: Listeners<IntersectionEvent>,
}

impl GeometricObserver {
    /// Create an observer for `registry` with the given threshold.
    #[must_use]
    pub fn new(registry: Rc<SectionRegistry>, threshold: Threshold) -> Self {
        Self {
            registry,
            threshold,
            regions: HashMap::new(),
            visible: HashMap::new(),
            viewport: None,
            listeners: Listeners::new(),
        }
    }

    /// Record where a section is laid out.
    ///
    /// Returns `false` (and records nothing) for ids outside the registry
    /// or regions with a non-finite origin.
    /// Call [`refresh`](Self::refresh) to re-evaluate against the current
    /// viewport.
    pub fn set_region(&mut self, id: &str, region: Rect) -> bool {
        let Some(section) = self.registry.get(id) else {
            tracing::trace!(section = id, "ignoring region for unregistered section");
            return false;
        };
        if !region.is_finite() {
            tracing::warn!(section = id, "ignoring non-finite region");
            return false;
        }
        self.regions.insert(section.id.clone(), region);
        true
    }

    /// Forget a section's region (e.g. it was unmounted).
    pub fn clear_region(&mut self, id: &str) -> bool {
        self.visible.remove(id);
        self.regions.remove(id).is_some()
    }

    /// Region currently recorded for a section.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<Rect> {
        self.regions.get(id).copied()
    }

    /// Whether the observer currently considers a section visible.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    /// Last viewport passed to [`update_viewport`](Self::update_viewport).
    #[must_use]
    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// Move the viewport and emit events for every threshold crossing.
    ///
    /// Returns the number of events emitted. A viewport with a non-finite
    /// origin is dropped and the last known viewport stays in effect.
    pub fn update_viewport(&mut self, viewport: Rect) -> usize {
        if !viewport.is_finite() {
            tracing::warn!(x = viewport.x, y = viewport.y, "ignoring non-finite viewport");
            return 0;
        }
        self.viewport = Some(viewport);
        self.evaluate(viewport)
    }

    /// Re-evaluate visibility against the last known viewport.
    pub fn refresh(&mut self) -> usize {
        match self.viewport {
            Some(viewport) => self.evaluate(viewport),
            None => 0,
        }
    }

    fn evaluate(&mut self, viewport: Rect) -> usize {
        let mut pending = Vec::new();
        for section in self.registry.iter() {
            let Some(region) = self.regions.get(&section.id) else {
                continue;
            };
            let ratio = region.visible_ratio(&viewport);
            let now = self.threshold.is_met(ratio);
            let before = self.visible.insert(section.id.clone(), now).unwrap_or(false);
            if now != before {
                pending.push(IntersectionEvent {
                    section: section.id.clone(),
                    is_intersecting: now,
                    ratio,
                });
            }
        }

        for event in &pending {
            tracing::trace!(
                section = %event.section,
                intersecting = event.is_intersecting,
                ratio = event.ratio,
                "visibility crossed threshold"
            );
            self.listeners.emit(event);
        }
        pending.len()
    }
}

impl VisibilityObserver for GeometricObserver {
    fn threshold(&self) -> Threshold {
        self.threshold
    }

    fn subscribe(&self, on_intersect: Box<dyn FnMut(&IntersectionEvent)>) -> Subscription {
        self.listeners.subscribe(on_intersect)
    }

    fn disconnect(&self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for GeometricObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometricObserver")
            .field("threshold", &self.threshold)
            .field("regions", &self.regions.len())
            .field("viewport", &self.viewport)
            .field("listeners", &self.listeners)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted observer
// ─────────────────────────────────────────────────────────────────────────────

/// Observer that emits exactly the events it is told to.
///
/// It performs no geometry and no registry filtering, so tests can feed
/// arbitrary (including unknown) ids to consumers.
#[derive(Debug, Default)]
pub struct ScriptedObserver {
    threshold: Threshold,
    listeners: Listeners<IntersectionEvent>,
}

impl ScriptedObserver {
    /// Create a scripted observer at the section-tracking threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scripted observer reporting a specific threshold.
    #[must_use]
    pub fn with_threshold(threshold: Threshold) -> Self {
        Self {
            threshold,
            listeners: Listeners::new(),
        }
    }

    /// Deliver `(id, visible)` to every subscriber.
    pub fn emit(&self, id: &str, visible: bool) -> usize {
        let ratio = if visible { 1.0 } else { 0.0 };
        self.emit_event(&IntersectionEvent {
            section: SectionId::new(id),
            is_intersecting: visible,
            ratio,
        })
    }

    /// Deliver a prepared event to every subscriber.
    pub fn emit_event(&self, event: &IntersectionEvent) -> usize {
        self.listeners.emit(event)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl VisibilityObserver for ScriptedObserver {
    fn threshold(&self) -> Threshold {
        self.threshold
    }

    fn subscribe(&self, on_intersect: Box<dyn FnMut(&IntersectionEvent)>) -> Subscription {
        self.listeners.subscribe(on_intersect)
    }

    fn disconnect(&self) {
        self.listeners.clear();
    }
}
