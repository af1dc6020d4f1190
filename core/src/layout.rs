use serde::Deserialize;

use crate::bounds::Bounds;
use crate::style::{StyleSnapshot, TextAlign, WhiteSpace};

/// Which point of the mesh, and which matching DOM point, positions the text.
///
/// The mesh anchor and the DOM reference always come from the same variant so
/// the two can never be mixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// Mesh anchored at its left edge and vertical middle; DOM left edge.
    #[default]
    Left,
    /// Mesh anchored at its centre; DOM horizontal centre.
    Center,
}

impl AnchorMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(AnchorMode::Left),
            "center" | "centre" => Some(AnchorMode::Center),
            _ => None,
        }
    }

    pub fn mesh_anchor(self) -> MeshAnchor {
        match self {
            AnchorMode::Left => MeshAnchor { x: 0.0, y: 0.5 },
            AnchorMode::Center => MeshAnchor { x: 0.5, y: 0.5 },
        }
    }
}

/// Anchor as fractions of the mesh box, x from the left and y from the top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshAnchor {
    pub x: f32,
    pub y: f32,
}

impl MeshAnchor {
    /// Position for a quad whose content sits `padding` px inside every edge,
    /// so that the content box, not the quad, lands on the anchor at
    /// `position`. Both are in y-up screen space.
    pub fn padded_position(self, position: [f32; 2], padding: f32) -> [f32; 2] {
        [
            position[0] + padding * (2.0 * self.x - 1.0),
            position[1] + padding * (1.0 - 2.0 * self.y),
        ]
    }
}

/// Everything the glyph engine needs to lay out one element's text.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshLayout {
    pub font_path: String,
    pub font_size: f32,
    /// Letter spacing in ems.
    pub letter_spacing: f32,
    /// Line height in ems.
    pub line_height: f32,
    /// Wrap width in pixels.
    pub max_width: f32,
    pub white_space: WhiteSpace,
    pub text_align: TextAlign,
    pub anchor: MeshAnchor,
}

impl MeshLayout {
    pub fn new(snapshot: &StyleSnapshot, bounds: &Bounds, font_path: &str, anchor: AnchorMode) -> Self {
        Self {
            font_path: font_path.to_string(),
            font_size: snapshot.font_size_px,
            letter_spacing: snapshot.letter_spacing_ratio(),
            line_height: snapshot.line_height_ratio(),
            max_width: bounds.rect.width.max(0.0),
            white_space: snapshot.white_space,
            text_align: snapshot.text_align,
            anchor: anchor.mesh_anchor(),
        }
    }

    pub fn line_height_px(&self) -> f32 {
        self.line_height * self.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Content box of a padded quad placed the way the highlight shader does:
    /// `(left, top, width, height)` with y up.
    fn content_box(anchor: MeshAnchor, position: [f32; 2], size: [f32; 2], padding: f32) -> [f32; 4] {
        let left = position[0] - anchor.x * size[0];
        let top = position[1] + anchor.y * size[1];
        [
            left + padding,
            top - padding,
            size[0] - padding * 2.0,
            size[1] - padding * 2.0,
        ]
    }

    #[test]
    fn padded_left_anchor_keeps_text_on_dom_edge() {
        let anchor = AnchorMode::Left.mesh_anchor();
        let dom_left = -500.0;
        let placed = anchor.padded_position([dom_left, 120.0], 2.0);
        let [left, top, _, height] = content_box(anchor, placed, [204.0, 44.0], 2.0);
        assert_eq!(left, dom_left);
        assert_eq!(top - height * 0.5, 120.0);
    }

    #[test]
    fn padded_center_anchor_is_unchanged() {
        let anchor = AnchorMode::Center.mesh_anchor();
        let placed = anchor.padded_position([40.0, -60.0], 3.0);
        assert_eq!(placed, [40.0, -60.0]);
        let [left, top, width, height] = content_box(anchor, placed, [106.0, 26.0], 3.0);
        assert_eq!(left + width * 0.5, 40.0);
        assert_eq!(top - height * 0.5, -60.0);
    }

    #[test]
    fn zero_padding_is_identity() {
        let anchor = MeshAnchor { x: 0.0, y: 0.0 };
        assert_eq!(anchor.padded_position([7.0, 9.0], 0.0), [7.0, 9.0]);
    }
}
