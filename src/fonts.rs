use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glyphon::cosmic_text::fontdb::{Source, Stretch, Style, Weight};
use glyphon::{Attrs, Family, FontSystem};
use js_sys::Uint8Array;
use textspot_core::FontLoads;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::Response;

/// Face selected from a loaded font file.
#[derive(Clone, Debug)]
pub(crate) struct LoadedFace {
    family: String,
    weight: Weight,
    style: Style,
    stretch: Stretch,
}

impl LoadedFace {
    pub(crate) fn attrs(&self) -> Attrs<'_> {
        Attrs::new()
            .family(Family::Name(&self.family))
            .weight(self.weight)
            .style(self.style)
            .stretch(self.stretch)
    }
}

struct FontCache {
    loads: FontLoads<LoadedFace>,
    downloaded: Vec<(String, Vec<u8>)>,
}

/// Fetches font files once per path and hands their bytes to the glyph
/// engine on the next frame.
///
/// A path that fails to load resolves to the fallback path's face instead.
#[derive(Clone)]
pub(crate) struct FontLoader {
    cache: Rc<RefCell<FontCache>>,
}

impl FontLoader {
    pub(crate) fn new(fallback: &str) -> Self {
        Self {
            cache: Rc::new(RefCell::new(FontCache {
                loads: FontLoads::new(fallback),
                downloaded: Vec::new(),
            })),
        }
    }

    /// Starts fetching `path` unless it is already known.
    pub(crate) fn request(&self, path: &str) {
        if !self.cache.borrow_mut().loads.begin(path) {
            return;
        }
        let loader = self.clone();
        let path = path.to_string();
        spawn_local(async move {
            match fetch_bytes(&path).await {
                Ok(bytes) => {
                    log::debug!("font fetched: {path} ({} bytes)", bytes.len());
                    loader.cache.borrow_mut().downloaded.push((path, bytes));
                }
                Err(err) => {
                    log::warn!("font fetch failed for {path}: {err:?}");
                    loader.fail(&path);
                }
            }
        });
    }

    /// Loads downloaded bytes into `font_system`. Returns `true` when any
    /// file was processed.
    pub(crate) fn install(&self, font_system: &mut FontSystem) -> bool {
        let downloaded = std::mem::take(&mut self.cache.borrow_mut().downloaded);
        if downloaded.is_empty() {
            return false;
        }
        for (path, bytes) in downloaded {
            let ids = font_system
                .db_mut()
                .load_font_source(Source::Binary(Arc::new(bytes)));
            let face = ids
                .first()
                .and_then(|id| font_system.db().face(*id))
                .and_then(|info| {
                    let (family, _) = info.families.first()?;
                    Some(LoadedFace {
                        family: family.clone(),
                        weight: info.weight,
                        style: info.style,
                        stretch: info.stretch,
                    })
                });
            match face {
                Some(face) => {
                    log::debug!("font ready: {path} as {:?}", face.family);
                    self.cache.borrow_mut().loads.loaded(&path, face);
                }
                None => {
                    log::warn!("font {path} contained no usable face");
                    self.fail(&path);
                }
            }
        }
        true
    }

    /// The face for `path`, `None` while it (or its fallback) is in flight.
    pub(crate) fn face(&self, path: &str) -> Option<LoadedFace> {
        self.cache.borrow().loads.face(path)
    }

    /// `true` once `path` has settled and no usable face came out of it or
    /// its fallback.
    pub(crate) fn is_unavailable(&self, path: &str) -> bool {
        self.cache.borrow().loads.is_unavailable(path)
    }

    fn fail(&self, path: &str) {
        let fallback = self.cache.borrow_mut().loads.failed(path);
        if let Some(fallback) = fallback {
            log::debug!("falling back to {fallback} for {path}");
            self.request(&fallback);
        }
    }
}

async fn fetch_bytes(path: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(path))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP {} for {path}",
            response.status()
        )));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}
