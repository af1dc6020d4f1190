use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

pub const DEFAULT_FONT_PATH: &str = "/fonts/Humane-Regular.ttf";

const HUMANE_WEIGHTS: [(&str, &str); 9] = [
    ("900", "/fonts/Humane-Black.ttf"),
    ("800", "/fonts/Humane-ExtraBold.ttf"),
    ("700", "/fonts/Humane-Bold.ttf"),
    ("600", "/fonts/Humane-SemiBold.ttf"),
    ("500", "/fonts/Humane-Medium.ttf"),
    ("400", "/fonts/Humane-Regular.ttf"),
    ("300", "/fonts/Humane-Light.ttf"),
    ("200", "/fonts/Humane-ExtraLight.ttf"),
    ("100", "/fonts/Humane-Thin.ttf"),
];

/// Weight-keyed lookup with a fallback for anything the table lacks.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FontTable {
    pub weights: BTreeMap<String, String>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    DEFAULT_FONT_PATH.to_string()
}

impl Default for FontTable {
    fn default() -> Self {
        Self {
            weights: HUMANE_WEIGHTS
                .iter()
                .map(|(weight, path)| (weight.to_string(), path.to_string()))
                .collect(),
            fallback: default_fallback(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStrategy {
    Table(FontTable),
    Fixed(String),
}

impl Default for FontStrategy {
    fn default() -> Self {
        FontStrategy::Table(FontTable::default())
    }
}

impl FontStrategy {
    /// The path used when a resolved font cannot be loaded.
    pub fn fallback(&self) -> &str {
        match self {
            FontStrategy::Table(table) => &table.fallback,
            FontStrategy::Fixed(path) => path,
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        match self {
            FontStrategy::Table(table) => table
                .weights
                .values()
                .map(String::as_str)
                .chain(std::iter::once(table.fallback.as_str()))
                .collect(),
            FontStrategy::Fixed(path) => vec![path.as_str()],
        }
    }
}

/// Maps a computed `font-weight` to a font asset path.
#[derive(Clone, Debug, Default)]
pub struct FontResolver {
    strategy: FontStrategy,
}

impl FontResolver {
    pub fn new(strategy: FontStrategy) -> Self {
        Self { strategy }
    }

    pub fn resolve(&self, font_weight: &str) -> &str {
        match &self.strategy {
            FontStrategy::Table(table) => table
                .weights
                .get(normalize_weight(font_weight))
                .unwrap_or(&table.fallback),
            FontStrategy::Fixed(path) => path,
        }
    }
}

enum FontLoad<F> {
    Pending,
    Loaded(F),
    Failed,
}

/// Load state of every requested font path.
///
/// A path that fails, by fetch error or because it holds no usable face,
/// resolves to the fallback path's face. The fallback is fetched at most
/// once.
pub struct FontLoads<F> {
    fallback: String,
    entries: HashMap<String, FontLoad<F>>,
}

impl<F: Clone> FontLoads<F> {
    pub fn new(fallback: &str) -> Self {
        Self {
            fallback: fallback.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Marks `path` as in flight. `false` when it was already requested.
    pub fn begin(&mut self, path: &str) -> bool {
        if self.entries.contains_key(path) {
            return false;
        }
        self.entries.insert(path.to_string(), FontLoad::Pending);
        true
    }

    pub fn loaded(&mut self, path: &str, face: F) {
        self.entries.insert(path.to_string(), FontLoad::Loaded(face));
    }

    /// Marks `path` as failed. Returns the fallback path when it still has
    /// to be requested.
    pub fn failed(&mut self, path: &str) -> Option<String> {
        self.entries.insert(path.to_string(), FontLoad::Failed);
        (path != self.fallback && !self.entries.contains_key(&self.fallback))
            .then(|| self.fallback.clone())
    }

    /// The face for `path`, `None` while it (or its fallback) is in flight.
    pub fn face(&self, path: &str) -> Option<F> {
        match self.entries.get(path)? {
            FontLoad::Loaded(face) => Some(face.clone()),
            FontLoad::Pending => None,
            FontLoad::Failed if path != self.fallback => match self.entries.get(&self.fallback)? {
                FontLoad::Loaded(face) => Some(face.clone()),
                _ => None,
            },
            FontLoad::Failed => None,
        }
    }

    /// `true` once neither `path` nor the fallback can produce a face.
    pub fn is_unavailable(&self, path: &str) -> bool {
        let failed = |key: &str| matches!(self.entries.get(key), Some(FontLoad::Failed));
        failed(path) && failed(&self.fallback)
    }
}

// Browsers report numeric weights, but keyword values still appear in
// hand-written fixtures and older engines.
fn normalize_weight(font_weight: &str) -> &str {
    match font_weight.trim() {
        "normal" => "400",
        "bold" => "700",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_weight_maps_to_its_path() {
        let resolver = FontResolver::default();
        for (weight, path) in HUMANE_WEIGHTS {
            assert_eq!(resolver.resolve(weight), path);
        }
    }

    #[test]
    fn unknown_weights_use_fallback() {
        let resolver = FontResolver::default();
        assert_eq!(resolver.resolve(""), DEFAULT_FONT_PATH);
        assert_eq!(resolver.resolve("950"), DEFAULT_FONT_PATH);
        assert_eq!(resolver.resolve("bold"), "/fonts/Humane-Bold.ttf");
    }

    #[test]
    fn fixed_strategy_ignores_weight() {
        let resolver = FontResolver::new(FontStrategy::Fixed("/fonts/Mono.ttf".into()));
        assert_eq!(resolver.resolve("100"), "/fonts/Mono.ttf");
        assert_eq!(resolver.resolve("900"), "/fonts/Mono.ttf");
    }

    #[test]
    fn failed_path_falls_back_once() {
        let mut loads = FontLoads::new(DEFAULT_FONT_PATH);
        assert!(loads.begin("/fonts/Broken.ttf"));
        assert!(!loads.begin("/fonts/Broken.ttf"));

        let next = loads.failed("/fonts/Broken.ttf");
        assert_eq!(next.as_deref(), Some(DEFAULT_FONT_PATH));
        assert!(loads.begin(DEFAULT_FONT_PATH));
        assert_eq!(loads.face("/fonts/Broken.ttf"), None);
        assert!(!loads.is_unavailable("/fonts/Broken.ttf"));

        loads.loaded(DEFAULT_FONT_PATH, "Humane");
        assert_eq!(loads.face("/fonts/Broken.ttf"), Some("Humane"));
        assert_eq!(loads.failed("/fonts/AlsoBroken.ttf"), None);
        assert_eq!(loads.face("/fonts/AlsoBroken.ttf"), Some("Humane"));
    }

    #[test]
    fn failing_fallback_settles_as_unavailable() {
        let mut loads: FontLoads<&str> = FontLoads::new(DEFAULT_FONT_PATH);
        loads.begin("/fonts/Broken.ttf");
        assert!(loads.failed("/fonts/Broken.ttf").is_some());
        loads.begin(DEFAULT_FONT_PATH);
        assert_eq!(loads.failed(DEFAULT_FONT_PATH), None);
        assert!(loads.is_unavailable("/fonts/Broken.ttf"));
        assert!(loads.is_unavailable(DEFAULT_FONT_PATH));
    }
}
