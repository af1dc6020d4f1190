use serde::Deserialize;

use crate::error::ConfigError;
use crate::font::FontStrategy;
use crate::layout::AnchorMode;
use crate::material::MaterialOverrides;
use crate::spot::DEFAULT_SPOT_EASE;
use crate::style::Rgba;

pub const DEFAULT_SELECTOR: &str = "[data-webgl-text]";
pub const DEFAULT_SCROLL_EASE: f32 = 0.1;
/// `id` of the `<script type="application/json">` block read when the host
/// passes no settings.
pub const CONFIG_SCRIPT_ID: &str = "textspot-config";

pub const ATTR_SPOT_COLOR: &str = "spot-color";
pub const ATTR_GLOW_COLOR: &str = "glow-color";
pub const ATTR_ANCHOR: &str = "anchor";
pub const ATTR_BASELINE_OFFSET: &str = "baseline-offset";

/// Deployment-wide settings shared by every text element on the page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextSpotSettings {
    pub selector: String,
    pub anchor: AnchorMode,
    pub fonts: FontStrategy,
    /// Fixed vertical correction between DOM and rasterized baselines.
    pub baseline_offset_px: f32,
    /// Fraction of the remaining distance the spot moves each frame.
    pub spot_ease: f32,
    /// Smoothing of the built-in window scroll provider.
    pub scroll_ease: f32,
    pub debug: bool,
}

impl Default for TextSpotSettings {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            anchor: AnchorMode::default(),
            fonts: FontStrategy::default(),
            baseline_offset_px: 0.0,
            spot_ease: DEFAULT_SPOT_EASE,
            scroll_ease: DEFAULT_SCROLL_EASE,
            debug: false,
        }
    }
}

impl TextSpotSettings {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_smoothing("spot_ease", self.spot_ease)?;
        validate_smoothing("scroll_ease", self.scroll_ease)?;
        if !self.baseline_offset_px.is_finite() {
            return Err(ConfigError::InvalidOffset(self.baseline_offset_px));
        }
        if self.fonts.paths().iter().any(|path| path.trim().is_empty()) {
            return Err(ConfigError::EmptyFontPath);
        }
        Ok(())
    }
}

fn validate_smoothing(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::SmoothingOutOfRange { field, value })
    }
}

/// Per-element configuration, fixed once the element is constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementConfig {
    pub material: MaterialOverrides,
    pub anchor: AnchorMode,
    pub baseline_offset_px: f32,
    pub spot_ease: f32,
}

impl ElementConfig {
    /// Resolves per-element overrides. `attribute` looks up a `data-*`
    /// attribute by its unprefixed name. Malformed values keep the
    /// deployment default.
    pub fn resolve(settings: &TextSpotSettings, attribute: impl Fn(&str) -> Option<String>) -> Self {
        let color = |name: &str| {
            let raw = attribute(name)?;
            let parsed = Rgba::parse(&raw);
            if parsed.is_none() {
                log::warn!("ignoring data-{name}=\"{raw}\": not a colour");
            }
            parsed
        };
        let anchor = match attribute(ATTR_ANCHOR) {
            Some(raw) => AnchorMode::parse(&raw).unwrap_or_else(|| {
                log::warn!("ignoring data-{ATTR_ANCHOR}=\"{raw}\": expected left or center");
                settings.anchor
            }),
            None => settings.anchor,
        };
        let baseline_offset_px = match attribute(ATTR_BASELINE_OFFSET) {
            Some(raw) => match crate::style::parse_px(&raw) {
                Some(offset) => offset,
                None => {
                    log::warn!("ignoring data-{ATTR_BASELINE_OFFSET}=\"{raw}\": not a length");
                    settings.baseline_offset_px
                }
            },
            None => settings.baseline_offset_px,
        };
        Self {
            material: MaterialOverrides {
                spot_color: color(ATTR_SPOT_COLOR),
                glow_color: color(ATTR_GLOW_COLOR),
            },
            anchor,
            baseline_offset_px,
            spot_ease: settings.spot_ease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontTable;

    #[test]
    fn empty_json_uses_defaults() {
        let settings = TextSpotSettings::from_json("{}").unwrap();
        assert_eq!(settings, TextSpotSettings::default());
    }

    #[test]
    fn parses_fixed_font_and_anchor() {
        let settings = TextSpotSettings::from_json(
            r#"{"anchor":"center","fonts":{"fixed":"/fonts/Body.ttf"},"baseline_offset_px":-6,"spot_ease":0.25}"#,
        )
        .unwrap();
        assert_eq!(settings.anchor, AnchorMode::Center);
        assert_eq!(settings.fonts, FontStrategy::Fixed("/fonts/Body.ttf".into()));
        assert_eq!(settings.baseline_offset_px, -6.0);
        assert_eq!(settings.spot_ease, 0.25);
    }

    #[test]
    fn parses_weight_table() {
        let settings = TextSpotSettings::from_json(
            r#"{"fonts":{"table":{"weights":{"700":"/b.ttf"},"fallback":"/r.ttf"}}}"#,
        )
        .unwrap();
        let FontStrategy::Table(FontTable { weights, fallback }) = settings.fonts else {
            panic!("expected table strategy");
        };
        assert_eq!(weights.get("700").map(String::as_str), Some("/b.ttf"));
        assert_eq!(fallback, "/r.ttf");
    }

    #[test]
    fn rejects_bad_smoothing() {
        let err = TextSpotSettings::from_json(r#"{"spot_ease":0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SmoothingOutOfRange {
                field: "spot_ease",
                ..
            }
        ));
        assert!(TextSpotSettings::from_json(r#"{"scroll_ease":1.5}"#).is_err());
        assert!(TextSpotSettings::from_json(r#"{"fonts":{"fixed":" "}}"#).is_err());
        assert!(TextSpotSettings::from_json("not json").is_err());
    }

    #[test]
    fn data_attributes_override_settings() {
        let settings = TextSpotSettings::default();
        let config = ElementConfig::resolve(&settings, |name| match name {
            ATTR_SPOT_COLOR => Some("#00ff00".into()),
            ATTR_GLOW_COLOR => Some("not-a-colour".into()),
            ATTR_ANCHOR => Some("center".into()),
            ATTR_BASELINE_OFFSET => Some("3px".into()),
            _ => None,
        });
        assert_eq!(config.material.spot_color, Some(Rgba::rgb(0.0, 1.0, 0.0)));
        assert_eq!(config.material.glow_color, None);
        assert_eq!(config.anchor, AnchorMode::Center);
        assert_eq!(config.baseline_offset_px, 3.0);
        assert_eq!(config.spot_ease, settings.spot_ease);
    }
}
