//! Conversion from DOM client coordinates to the scene's screen-centred space.
//!
//! Scene space has its origin at the viewport centre, x to the right and y up,
//! with one unit per CSS pixel.

use crate::bounds::Bounds;
use crate::layout::AnchorMode;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffsets {
    /// Instantaneous document scroll in pixels.
    pub raw: f32,
    /// Smoothed scroll that trails `raw`.
    pub eased: f32,
}

impl ScrollOffsets {
    pub fn at_rest(offset: f32) -> Self {
        Self {
            raw: offset,
            eased: offset,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

pub fn screen_x(dom_x: f32, viewport_width: f32) -> f32 {
    dom_x - viewport_width * 0.5
}

pub fn screen_y(
    dom_top: f32,
    raw_scroll: f32,
    eased_scroll: f32,
    viewport_height: f32,
    element_height: f32,
) -> f32 {
    -(dom_top + raw_scroll) + eased_scroll + viewport_height * 0.5 - element_height * 0.5
}

/// Positions meshes for one anchor policy plus a fixed baseline correction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSpaceMapper {
    pub anchor: AnchorMode,
    pub baseline_offset_px: f32,
}

impl ScrollSpaceMapper {
    pub fn new(anchor: AnchorMode, baseline_offset_px: f32) -> Self {
        Self {
            anchor,
            baseline_offset_px,
        }
    }

    /// Mesh position for the current frame.
    ///
    /// The raw scroll was folded into `bounds.scroll_adjusted_top` when the
    /// bounds were captured, so only the eased offset is applied here.
    pub fn mesh_position(
        &self,
        bounds: &Bounds,
        eased_scroll: f32,
        viewport: ViewportSize,
    ) -> [f32; 2] {
        let dom_x = match self.anchor {
            AnchorMode::Left => bounds.rect.left,
            AnchorMode::Center => bounds.rect.center_x(),
        };
        let x = screen_x(dom_x, viewport.width);
        let y = screen_y(
            bounds.scroll_adjusted_top,
            0.0,
            eased_scroll,
            viewport.height,
            bounds.rect.height,
        ) + self.baseline_offset_px;
        [x, y]
    }

    /// Whether the mesh, placed for `eased_scroll`, overlaps the viewport.
    /// The DOM box stands in for the mesh extent.
    pub fn overlaps_viewport(
        &self,
        bounds: &Bounds,
        eased_scroll: f32,
        viewport: ViewportSize,
    ) -> bool {
        let [x, y] = self.mesh_position(bounds, eased_scroll, viewport);
        let anchor = self.anchor.mesh_anchor();
        let (width, height) = (bounds.rect.width.max(0.0), bounds.rect.height.max(0.0));
        let left = x - anchor.x * width;
        let top = y + anchor.y * height;
        let half_w = viewport.width * 0.5;
        let half_h = viewport.height * 0.5;
        left < half_w && left + width > -half_w && top > -half_h && top - height < half_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::DomRect;

    #[test]
    fn screen_x_centres_on_viewport() {
        assert_eq!(screen_x(100.0, 1000.0), -400.0);
        assert_eq!(screen_x(500.0, 1000.0), 0.0);
    }

    #[test]
    fn screen_y_is_pure() {
        let first = screen_y(120.0, 40.0, 35.0, 800.0, 60.0);
        let second = screen_y(120.0, 40.0, 35.0, 800.0, 60.0);
        assert_eq!(first, second);
        assert_eq!(first, -(120.0 + 40.0) + 35.0 + 400.0 - 30.0);
    }

    #[test]
    fn element_at_viewport_centre_maps_to_origin() {
        let bounds = Bounds::capture(DomRect::new(450.0, 370.0, 100.0, 60.0), 0.0);
        let mapper = ScrollSpaceMapper::new(AnchorMode::Center, 0.0);
        let position = mapper.mesh_position(&bounds, 0.0, ViewportSize::new(1000.0, 800.0));
        assert_eq!(position, [0.0, 0.0]);
    }

    #[test]
    fn anchors_pick_matching_dom_reference() {
        let bounds = Bounds::capture(DomRect::new(100.0, 0.0, 200.0, 20.0), 0.0);
        let viewport = ViewportSize::new(1000.0, 800.0);
        let left = ScrollSpaceMapper::new(AnchorMode::Left, 0.0).mesh_position(&bounds, 0.0, viewport);
        let center =
            ScrollSpaceMapper::new(AnchorMode::Center, 0.0).mesh_position(&bounds, 0.0, viewport);
        assert_eq!(left[0], -400.0);
        assert_eq!(center[0], -300.0);
        assert_eq!(left[1], center[1]);
    }

    #[test]
    fn eased_scroll_and_offset_shift_vertically() {
        let bounds = Bounds::capture(DomRect::new(0.0, 100.0, 100.0, 20.0), 50.0);
        let viewport = ViewportSize::new(1000.0, 800.0);
        let mapper = ScrollSpaceMapper::new(AnchorMode::Left, 4.0);
        let resting = mapper.mesh_position(&bounds, 50.0, viewport);
        let lagging = mapper.mesh_position(&bounds, 30.0, viewport);
        assert_eq!(resting[1], -150.0 + 50.0 + 400.0 - 10.0 + 4.0);
        assert_eq!(resting[1] - lagging[1], 20.0);
    }

    #[test]
    fn overlap_follows_eased_scroll() {
        let bounds = Bounds::capture(DomRect::new(0.0, 300.0, 200.0, 100.0), 0.0);
        let viewport = ViewportSize::new(1000.0, 800.0);
        let mapper = ScrollSpaceMapper::new(AnchorMode::Left, 0.0);
        assert!(mapper.overlaps_viewport(&bounds, 0.0, viewport));
        assert!(mapper.overlaps_viewport(&bounds, 390.0, viewport));
        assert!(!mapper.overlaps_viewport(&bounds, 410.0, viewport));
        assert!(!mapper.overlaps_viewport(&bounds, -1000.0, viewport));
    }
}
