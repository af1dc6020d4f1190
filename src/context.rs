use std::cell::Cell;

use textspot_core::{FrameContext, ScrollOffsets, ViewportSize};

const SCROLL_SETTLE_PX: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScrollSource {
    /// Reads `window.scrollY` and eases it locally.
    Window,
    /// Offsets are pushed by a smooth-scroll library through `set_scroll`.
    External,
}

/// Scroll and viewport state for every text element on the page.
pub(crate) struct PageContext {
    source: Cell<ScrollSource>,
    scroll: Cell<ScrollOffsets>,
    viewport: Cell<ViewportSize>,
    scroll_ease: f32,
}

impl PageContext {
    pub(crate) fn new(scroll_ease: f32) -> Self {
        let context = Self {
            source: Cell::new(ScrollSource::Window),
            scroll: Cell::new(ScrollOffsets::at_rest(window_scroll_y())),
            viewport: Cell::new(ViewportSize::default()),
            scroll_ease,
        };
        context.refresh_viewport();
        context
    }

    pub(crate) fn refresh_viewport(&self) -> ViewportSize {
        let size = web_sys::window()
            .map(|window| {
                let width = window
                    .inner_width()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .unwrap_or(0.0);
                let height = window
                    .inner_height()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .unwrap_or(0.0);
                ViewportSize::new(width as f32, height as f32)
            })
            .unwrap_or_default();
        self.viewport.set(size);
        size
    }

    /// Switches to externally supplied offsets for the rest of the page's life.
    pub(crate) fn set_scroll(&self, raw: f32, eased: f32) {
        if !raw.is_finite() || !eased.is_finite() {
            return;
        }
        self.source.set(ScrollSource::External);
        self.scroll.set(ScrollOffsets { raw, eased });
    }

    /// Advances the built-in eased scroll by one frame.
    pub(crate) fn tick(&self) {
        if self.source.get() != ScrollSource::Window {
            return;
        }
        let raw = window_scroll_y();
        let mut scroll = self.scroll.get();
        scroll.raw = raw;
        scroll.eased += (raw - scroll.eased) * self.scroll_ease;
        if (raw - scroll.eased).abs() < SCROLL_SETTLE_PX {
            scroll.eased = raw;
        }
        self.scroll.set(scroll);
    }
}

impl FrameContext for PageContext {
    fn scroll(&self) -> ScrollOffsets {
        self.scroll.get()
    }

    fn viewport(&self) -> ViewportSize {
        self.viewport.get()
    }
}

fn window_scroll_y() -> f32 {
    web_sys::window()
        .and_then(|window| window.scroll_y().ok())
        .unwrap_or(0.0) as f32
}
