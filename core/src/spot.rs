use crate::bounds::Bounds;
use crate::material::SPOT_CENTER_DEFAULT;
use crate::pointer::PointerPosition;

pub const DEFAULT_SPOT_EASE: f32 = 0.1;

/// Spot target in the element's UV space with v measured upward.
///
/// Returns `None` for zero-size bounds so no NaN reaches the shader. The
/// target may leave `[0, 1]` when the pointer is outside the element.
pub fn spot_target(pointer: PointerPosition, bounds: &Bounds, eased_scroll: f32) -> Option<[f32; 2]> {
    if !bounds.has_area() {
        return None;
    }
    let u = (pointer.x - bounds.rect.left) / bounds.rect.width;
    let v = (pointer.y - eased_scroll - bounds.scroll_adjusted_top) / bounds.rect.height;
    let target = [u, 1.0 - v];
    target.iter().all(|value| value.is_finite()).then_some(target)
}

/// Per-element eased spot centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotCenter {
    value: [f32; 2],
}

impl Default for SpotCenter {
    fn default() -> Self {
        Self {
            value: SPOT_CENTER_DEFAULT,
        }
    }
}

impl SpotCenter {
    pub fn get(&self) -> [f32; 2] {
        self.value
    }

    /// Moves `factor` of the remaining distance toward `target`. With
    /// `factor` in `(0, 1]` the centre never passes the target.
    pub fn ease_toward(&mut self, target: [f32; 2], factor: f32) -> [f32; 2] {
        self.value[0] += (target[0] - self.value[0]) * factor;
        self.value[1] += (target[1] - self.value[1]) * factor;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::DomRect;

    #[test]
    fn target_flips_v() {
        let bounds = Bounds::capture(DomRect::new(100.0, 200.0, 200.0, 100.0), 0.0);
        let pointer = PointerPosition { x: 150.0, y: 225.0 };
        assert_eq!(spot_target(pointer, &bounds, 0.0), Some([0.25, 0.75]));
    }

    #[test]
    fn zero_size_yields_no_target() {
        let bounds = Bounds::capture(DomRect::new(100.0, 200.0, 0.0, 100.0), 0.0);
        let pointer = PointerPosition { x: 150.0, y: 225.0 };
        assert_eq!(spot_target(pointer, &bounds, 0.0), None);
    }

    #[test]
    fn single_step_moves_a_tenth() {
        let mut spot = SpotCenter::default();
        let next = spot.ease_toward([1.5, 0.5], 0.1);
        assert!((next[0] - 0.6).abs() < 1e-6);
        assert_eq!(next[1], 0.5);
    }
}
