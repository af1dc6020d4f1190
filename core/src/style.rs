use std::fmt;

pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;
/// Multiplier applied to the font size when the computed line height is `normal`.
pub const NORMAL_LINE_HEIGHT_EM: f32 = 1.2;

/// Raw computed-style values exactly as the browser reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    pub font_weight: String,
    pub font_size: String,
    pub letter_spacing: String,
    pub line_height: String,
    pub white_space: String,
    pub text_align: String,
    pub color: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
    BreakSpaces,
}

impl WhiteSpace {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "nowrap" => WhiteSpace::NoWrap,
            "pre" => WhiteSpace::Pre,
            "pre-wrap" => WhiteSpace::PreWrap,
            "pre-line" => WhiteSpace::PreLine,
            "break-spaces" => WhiteSpace::BreakSpaces,
            _ => WhiteSpace::Normal,
        }
    }

    /// Whether lines may break at the wrap width.
    pub fn wraps(self) -> bool {
        !matches!(self, WhiteSpace::NoWrap | WhiteSpace::Pre)
    }

    /// Applies this mode's whitespace collapsing to `text`.
    pub fn collapse(self, text: &str) -> String {
        match self {
            WhiteSpace::Normal | WhiteSpace::NoWrap => {
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            }
            WhiteSpace::PreLine => text
                .lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
            WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::BreakSpaces => text.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "center" | "-webkit-center" => TextAlign::Center,
            "right" | "end" | "-webkit-right" => TextAlign::Right,
            "justify" => TextAlign::Justify,
            _ => TextAlign::Left,
        }
    }
}

/// Linear 0..1 colour channels straight from CSS, not gamma corrected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses the colour forms browsers emit from `getComputedStyle` plus the
    /// hex and keyword forms authors write into data attributes.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value.is_empty() {
            return None;
        }
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            return parse_rgb_function(body.strip_suffix(')')?);
        }
        match value.as_str() {
            "transparent" => Some(Rgba::TRANSPARENT),
            "black" => Some(Rgba::BLACK),
            "white" => Some(Rgba::rgb(1.0, 1.0, 1.0)),
            "red" => Some(Rgba::rgb(1.0, 0.0, 0.0)),
            "orange" => Some(Rgba::from_u8(255, 165, 0)),
            _ => None,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            (self.r * 255.0).round(),
            (self.g * 255.0).round(),
            (self.b * 255.0).round(),
            self.a
        )
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok().map(|v| v * 17);
    let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::from_u8(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => {
            let mut color = Rgba::from_u8(nibble(0)?, nibble(1)?, nibble(2)?);
            color.a = nibble(3)? as f32 / 255.0;
            Some(color)
        }
        6 => Some(Rgba::from_u8(byte(0)?, byte(2)?, byte(4)?)),
        8 => {
            let mut color = Rgba::from_u8(byte(0)?, byte(2)?, byte(4)?);
            color.a = byte(6)? as f32 / 255.0;
            Some(color)
        }
        _ => None,
    }
}

// Accepts both `rgb(1, 2, 3)` / `rgba(1, 2, 3, 0.5)` and `rgb(1 2 3 / 50%)`.
fn parse_rgb_function(body: &str) -> Option<Rgba> {
    let normalized = body.replace('/', " ").replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |raw: &str| -> Option<f32> {
        let value = match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => raw.parse::<f32>().ok()? / 255.0,
        };
        Some(value.clamp(0.0, 1.0))
    };
    let alpha = match parts.get(3) {
        Some(raw) => match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => raw.parse::<f32>().ok()?,
        },
        None => 1.0,
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha.clamp(0.0, 1.0),
    })
}

/// Parses a CSS pixel length such as `20px` or `1.5px`. Bare numbers are
/// accepted as pixels; keywords (`normal`) and other units return `None`.
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    let parsed = number.parse::<f32>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Computed style of one text element, captured at a point in time.
///
/// A snapshot is replaced wholesale on resize; nothing mutates it in place.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSnapshot {
    pub font_weight: String,
    pub font_size_px: f32,
    pub letter_spacing_px: f32,
    pub line_height_px: f32,
    pub white_space: WhiteSpace,
    pub text_align: TextAlign,
    pub color: Rgba,
}

impl StyleSnapshot {
    pub fn from_computed(style: &ComputedStyle) -> Self {
        let font_size_px = parse_px(&style.font_size)
            .filter(|size| *size > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE_PX);
        let letter_spacing_px = parse_px(&style.letter_spacing).unwrap_or(0.0);
        let line_height_px = parse_px(&style.line_height)
            .filter(|height| *height > 0.0)
            .unwrap_or(font_size_px * NORMAL_LINE_HEIGHT_EM);
        let color = Rgba::parse(&style.color).unwrap_or(Rgba::BLACK);
        Self {
            font_weight: style.font_weight.trim().to_string(),
            font_size_px,
            letter_spacing_px,
            line_height_px,
            white_space: WhiteSpace::parse(&style.white_space),
            text_align: TextAlign::parse(&style.text_align),
            color,
        }
    }

    /// Letter spacing in ems of this snapshot's font size.
    pub fn letter_spacing_ratio(&self) -> f32 {
        self.letter_spacing_px / self.font_size_px
    }

    /// Line height in ems of this snapshot's font size.
    pub fn line_height_ratio(&self) -> f32 {
        self.line_height_px / self.font_size_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(font_size: &str, letter_spacing: &str, line_height: &str) -> ComputedStyle {
        ComputedStyle {
            font_weight: "400".into(),
            font_size: font_size.into(),
            letter_spacing: letter_spacing.into(),
            line_height: line_height.into(),
            white_space: "normal".into(),
            text_align: "start".into(),
            color: "rgb(10, 20, 30)".into(),
        }
    }

    #[test]
    fn ratios_use_snapshot_font_size() {
        let snapshot = StyleSnapshot::from_computed(&computed("20px", "2px", "30px"));
        assert_eq!(snapshot.letter_spacing_ratio(), 0.1);
        assert_eq!(snapshot.line_height_ratio(), 1.5);
    }

    #[test]
    fn normal_keywords_fall_back() {
        let snapshot = StyleSnapshot::from_computed(&computed("10px", "normal", "normal"));
        assert_eq!(snapshot.letter_spacing_px, 0.0);
        assert!((snapshot.line_height_px - 12.0).abs() < 1e-5);
    }

    #[test]
    fn missing_font_size_uses_default() {
        let snapshot = StyleSnapshot::from_computed(&computed("", "", ""));
        assert_eq!(snapshot.font_size_px, DEFAULT_FONT_SIZE_PX);
        assert!(snapshot.letter_spacing_ratio().is_finite());
        assert!(snapshot.line_height_ratio().is_finite());
    }

    #[test]
    fn parses_computed_and_authored_colors() {
        assert_eq!(Rgba::parse("rgb(10, 20, 30)"), Some(Rgba::from_u8(10, 20, 30)));
        let translucent = Rgba::parse("rgba(255, 0, 0, 0.5)").unwrap();
        assert_eq!(translucent.a, 0.5);
        let modern = Rgba::parse("rgb(255 0 0 / 25%)").unwrap();
        assert_eq!(modern.a, 0.25);
        assert_eq!(Rgba::parse("#ff6600"), Some(Rgba::from_u8(255, 102, 0)));
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::rgb(1.0, 1.0, 1.0)));
        assert_eq!(Rgba::parse("transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(Rgba::parse("#ggg"), None);
        assert_eq!(Rgba::parse("hsl(0, 0%, 0%)"), None);
    }

    #[test]
    fn keyword_parsing_defaults() {
        assert_eq!(WhiteSpace::parse("pre-wrap"), WhiteSpace::PreWrap);
        assert_eq!(WhiteSpace::parse("bogus"), WhiteSpace::Normal);
        assert!(!WhiteSpace::NoWrap.wraps());
        assert_eq!(TextAlign::parse("end"), TextAlign::Right);
        assert_eq!(TextAlign::parse("start"), TextAlign::Left);
    }

    #[test]
    fn whitespace_collapse_follows_mode() {
        let text = "  Hello \t  world\n  again ";
        assert_eq!(WhiteSpace::Normal.collapse(text), "Hello world again");
        assert_eq!(WhiteSpace::PreLine.collapse(text), "Hello world\nagain");
        assert_eq!(WhiteSpace::Pre.collapse(text), text);
    }
}
