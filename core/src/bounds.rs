/// A client rectangle as reported by `getBoundingClientRect`, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DomRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DomRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.left + self.width * 0.5
    }
}

/// Element rectangle plus its top edge in document space.
///
/// `scroll_adjusted_top` bakes in the raw scroll offset at capture time and is
/// only refreshed on resize; per-frame scroll is applied by the mapper.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub rect: DomRect,
    pub scroll_adjusted_top: f32,
}

impl Bounds {
    pub fn capture(rect: DomRect, raw_scroll: f32) -> Self {
        Self {
            rect,
            scroll_adjusted_top: rect.top + raw_scroll,
        }
    }

    pub fn has_area(&self) -> bool {
        self.rect.width > 0.0
            && self.rect.height > 0.0
            && self.rect.width.is_finite()
            && self.rect.height.is_finite()
    }

    /// `width / height`, or `None` while the element has no layout box.
    pub fn aspect(&self) -> Option<f32> {
        self.has_area().then(|| self.rect.width / self.rect.height)
    }
}
