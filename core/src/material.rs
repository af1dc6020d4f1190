use bytemuck::{Pod, Zeroable};

use crate::style::Rgba;

pub const SPOT_RADIUS: f32 = 0.02;
pub const SPOT_SOFTNESS: f32 = 0.12;
pub const BASE_ALPHA: f32 = 0.15;
pub const SPOT_CENTER_DEFAULT: [f32; 2] = [0.5, 0.5];

pub fn base_color() -> Rgba {
    Rgba::from_u8(239, 239, 239)
}

pub fn default_spot_color() -> Rgba {
    Rgba::from_u8(0xff, 0x66, 0x00)
}

pub fn default_glow_color() -> Rgba {
    Rgba::from_u8(0xff, 0xb0, 0x80)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformMutability {
    Immutable,
    PerResize,
    PerFrame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSpec {
    pub name: &'static str,
    pub mutability: UniformMutability,
}

/// Every uniform the highlight shader reads, with when it may change.
pub const UNIFORMS: [UniformSpec; 8] = [
    UniformSpec {
        name: "baseColor",
        mutability: UniformMutability::Immutable,
    },
    UniformSpec {
        name: "spotColor",
        mutability: UniformMutability::Immutable,
    },
    UniformSpec {
        name: "glowColor",
        mutability: UniformMutability::Immutable,
    },
    UniformSpec {
        name: "spotCenter",
        mutability: UniformMutability::PerFrame,
    },
    UniformSpec {
        name: "spotRadius",
        mutability: UniformMutability::Immutable,
    },
    UniformSpec {
        name: "spotSoftness",
        mutability: UniformMutability::Immutable,
    },
    UniformSpec {
        name: "baseAlpha",
        mutability: UniformMutability::Immutable,
    },
    UniformSpec {
        name: "aspect",
        mutability: UniformMutability::PerResize,
    },
];

/// GPU layout of the highlight uniforms. Matches `Highlight` in
/// `text_highlight.wgsl` (80 bytes, 16-byte aligned).
#[repr(C, align(16))]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct HighlightUniforms {
    pub base_color: [f32; 4],
    pub spot_color: [f32; 4],
    pub glow_color: [f32; 4],
    pub spot_center: [f32; 2],
    pub spot_radius: f32,
    pub spot_softness: f32,
    pub base_alpha: f32,
    pub aspect: f32,
    pub _pad: [f32; 2],
}

impl HighlightUniforms {
    pub fn is_finite(&self) -> bool {
        self.base_color
            .iter()
            .chain(&self.spot_color)
            .chain(&self.glow_color)
            .chain(&self.spot_center)
            .chain([
                &self.spot_radius,
                &self.spot_softness,
                &self.base_alpha,
                &self.aspect,
            ])
            .all(|value| value.is_finite())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialOverrides {
    pub spot_color: Option<Rgba>,
    pub glow_color: Option<Rgba>,
}

/// Uniform state of the pointer-tracked highlight shader for one element.
///
/// Colours are fixed at construction. `spot_center` changes every frame and
/// `aspect` on resize; both setters drop non-finite input so the uniform
/// block never carries NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightMaterial {
    uniforms: HighlightUniforms,
}

impl HighlightMaterial {
    pub fn new(overrides: MaterialOverrides, aspect: Option<f32>) -> Self {
        let spot_color = overrides.spot_color.unwrap_or_else(default_spot_color);
        let glow_color = overrides.glow_color.unwrap_or_else(default_glow_color);
        Self {
            uniforms: HighlightUniforms {
                base_color: base_color().to_array(),
                spot_color: spot_color.to_array(),
                glow_color: glow_color.to_array(),
                spot_center: SPOT_CENTER_DEFAULT,
                spot_radius: SPOT_RADIUS,
                spot_softness: SPOT_SOFTNESS,
                base_alpha: BASE_ALPHA,
                aspect: aspect.filter(|value| value.is_finite()).unwrap_or(1.0),
                _pad: [0.0; 2],
            },
        }
    }

    pub fn uniforms(&self) -> &HighlightUniforms {
        &self.uniforms
    }

    pub fn spot_center(&self) -> [f32; 2] {
        self.uniforms.spot_center
    }

    pub fn aspect(&self) -> f32 {
        self.uniforms.aspect
    }

    pub fn set_spot_center(&mut self, center: [f32; 2]) -> bool {
        if !center.iter().all(|value| value.is_finite()) {
            return false;
        }
        self.uniforms.spot_center = center;
        true
    }

    pub fn set_aspect(&mut self, aspect: f32) -> bool {
        if !aspect.is_finite() || aspect <= 0.0 {
            return false;
        }
        self.uniforms.aspect = aspect;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_uniform_table() {
        let material = HighlightMaterial::new(MaterialOverrides::default(), Some(2.0));
        let uniforms = material.uniforms();
        assert_eq!(uniforms.spot_center, [0.5, 0.5]);
        assert_eq!(uniforms.spot_radius, 0.02);
        assert_eq!(uniforms.spot_softness, 0.12);
        assert_eq!(uniforms.base_alpha, 0.15);
        assert_eq!(uniforms.aspect, 2.0);
        assert_eq!(uniforms.spot_color, default_spot_color().to_array());
        assert_eq!(uniforms.glow_color, default_glow_color().to_array());
        assert_eq!(std::mem::size_of::<HighlightUniforms>(), 80);
    }

    #[test]
    fn overrides_replace_accent_pair() {
        let overrides = MaterialOverrides {
            spot_color: Some(Rgba::rgb(0.0, 0.0, 1.0)),
            glow_color: None,
        };
        let material = HighlightMaterial::new(overrides, None);
        assert_eq!(material.uniforms().spot_color, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(material.uniforms().glow_color, default_glow_color().to_array());
        assert_eq!(material.aspect(), 1.0);
    }

    #[test]
    fn setters_reject_non_finite() {
        let mut material = HighlightMaterial::new(MaterialOverrides::default(), Some(3.0));
        assert!(!material.set_aspect(f32::INFINITY));
        assert!(!material.set_aspect(0.0));
        assert!(!material.set_spot_center([f32::NAN, 0.0]));
        assert_eq!(material.aspect(), 3.0);
        assert!(material.uniforms().is_finite());
    }

    #[test]
    fn only_spot_center_and_aspect_are_mutable() {
        let mutable: Vec<_> = UNIFORMS
            .iter()
            .filter(|spec| spec.mutability != UniformMutability::Immutable)
            .map(|spec| spec.name)
            .collect();
        assert_eq!(mutable, ["spotCenter", "aspect"]);
    }
}
