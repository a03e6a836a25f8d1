#![forbid(unsafe_code)]

//! Reading progress and the scroll-to-top button.

/// Scroll offset past which the scroll-to-top button appears.
pub const DEFAULT_SCROLL_TOP_OFFSET: f64 = 300.0;

/// Scroll position as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset.
    pub scroll_top: f64,
    /// Full document height.
    pub document_height: f64,
    /// Viewport height.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Create metrics.
    #[must_use]
    pub const fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

/// Derived scroll indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollProgress {
    percent: f64,
    show_scroll_top: bool,
    reveal_offset: f64,
}

impl Default for ScrollProgress {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_TOP_OFFSET)
    }
}

impl ScrollProgress {
    /// Create an indicator that shows the scroll-to-top button past
    /// `reveal_offset` pixels.
    #[must_use]
    pub const fn new(reveal_offset: f64) -> Self {
        Self {
            percent: 0.0,
            show_scroll_top: false,
            reveal_offset,
        }
    }

    /// Recompute from fresh metrics.
    ///
    /// The percentage is clamped to `[0, 100]` and is `0` when the document
    /// fits in the viewport.
    pub fn update(&mut self, metrics: ScrollMetrics) {
        let max = metrics.max_scroll();
        self.percent = if max > 0.0 && metrics.scroll_top.is_finite() {
            (metrics.scroll_top / max * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.show_scroll_top = metrics.scroll_top > self.reveal_offset;
    }

    /// Reading progress in percent.
    #[must_use]
    pub const fn percent(&self) -> f64 {
        self.percent
    }

    /// Progress rounded for display.
    #[must_use]
    pub fn rounded_percent(&self) -> u8 {
        self.percent.round() as u8
    }

    /// Whether the scroll-to-top button should be shown.
    #[must_use]
    pub const fn show_scroll_top(&self) -> bool {
        self.show_scroll_top
    }
}
