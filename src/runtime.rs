use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use textspot_core::{FrameContext, TextSpotSettings, WebGlTextElement, CONFIG_SCRIPT_ID};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::context::PageContext;
use crate::dom::{query_text_elements, DomText};
use crate::fonts::FontLoader;
use crate::logging;
use crate::pointer_runtime;
use crate::renderer::GpuScene;
use crate::visibility::VisibilityWatcher;

type TextElement = WebGlTextElement<DomText, GpuScene>;

struct MountedText {
    element: TextElement,
    visible: Rc<Cell<bool>>,
}

struct SpotRuntime {
    scene: Rc<RefCell<GpuScene>>,
    context: Rc<PageContext>,
    elements: RefCell<Vec<MountedText>>,
    visibility: Option<VisibilityWatcher>,
    frame: RefCell<Option<AnimationFrame>>,
    resize_listener: RefCell<Option<EventListener>>,
    running: Cell<bool>,
}

impl SpotRuntime {
    fn resize(&self) {
        let viewport = self.context.refresh_viewport();
        self.scene
            .borrow_mut()
            .resize(viewport.width, viewport.height);
        for mounted in self.elements.borrow_mut().iter_mut() {
            mounted.element.on_resize();
        }
    }

    fn update(&self) {
        self.context.tick();
        for mounted in self.elements.borrow_mut().iter_mut() {
            mounted.element.set_visible(mounted.visible.get());
            mounted.element.update();
        }
        self.scene.borrow_mut().render();
    }

    fn start(self: &Rc<Self>) {
        if self.running.replace(true) {
            return;
        }
        if let Some(window) = web_sys::window() {
            let runtime = Rc::clone(self);
            let listener = EventListener::new(&window, "resize", move |_event| {
                runtime.resize();
            });
            *self.resize_listener.borrow_mut() = Some(listener);
        }
        self.schedule_frame();
    }

    fn schedule_frame(self: &Rc<Self>) {
        let runtime = Rc::clone(self);
        let handle = request_animation_frame(move |_timestamp| {
            runtime.frame.borrow_mut().take();
            if !runtime.running.get() {
                return;
            }
            runtime.update();
            runtime.schedule_frame();
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn stop(&self) {
        self.running.set(false);
        self.frame.borrow_mut().take();
        self.resize_listener.borrow_mut().take();
    }

    fn destroy(&self) {
        self.stop();
        let mounted: Vec<MountedText> = self.elements.borrow_mut().drain(..).collect();
        for mut text in mounted {
            if let Some(visibility) = self.visibility.as_ref() {
                visibility.unobserve(text.element.element().element());
            }
            text.element.teardown();
        }
        pointer_runtime::release_if_unused();
    }
}

/// Mirrors every matching text element on the page into a shared WebGL
/// canvas and lights it with a pointer-following spot.
#[wasm_bindgen]
pub struct TextSpot {
    runtime: Rc<SpotRuntime>,
}

#[wasm_bindgen]
impl TextSpot {
    /// Builds the scene on `canvas` and mounts every element matching the
    /// configured selector. `config_json` overrides the page's
    /// `#textspot-config` script block.
    pub async fn mount(
        canvas: HtmlCanvasElement,
        config_json: Option<String>,
    ) -> Result<TextSpot, JsValue> {
        let settings = load_settings(config_json)?;
        logging::init(settings.debug);

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let context = Rc::new(PageContext::new(settings.scroll_ease));
        let viewport = context.viewport();
        let fonts = FontLoader::new(settings.fonts.fallback());
        let scene = GpuScene::new(canvas, fonts, viewport.width, viewport.height).await?;
        let scene = Rc::new(RefCell::new(scene));

        let visibility = match VisibilityWatcher::new() {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                log::warn!("IntersectionObserver unavailable, every element stays live: {err:?}");
                None
            }
        };

        let frame_context: Rc<dyn FrameContext> = context.clone();
        let mut elements = Vec::new();
        for text in query_text_elements(&document, &settings.selector) {
            let visible = match visibility.as_ref() {
                Some(watcher) => watcher.observe(text.element()),
                None => Rc::new(Cell::new(true)),
            };
            let element = WebGlTextElement::new(
                text,
                Rc::clone(&scene),
                Rc::clone(&frame_context),
                pointer_runtime::subscribe(),
                &settings,
            );
            elements.push(MountedText { element, visible });
        }
        log::info!(
            "mounted {} text element(s) for {:?}",
            elements.len(),
            settings.selector
        );

        Ok(TextSpot {
            runtime: Rc::new(SpotRuntime {
                scene,
                context,
                elements: RefCell::new(elements),
                visibility,
                frame: RefCell::new(None),
                resize_listener: RefCell::new(None),
                running: Cell::new(false),
            }),
        })
    }

    /// Re-reads viewport, styles and bounds. Call after layout changes.
    pub fn resize(&self) {
        self.runtime.resize();
    }

    /// Advances one frame: scroll, element positions, spot easing, draw.
    pub fn update(&self) {
        self.runtime.update();
    }

    /// Supplies scroll offsets from an external smooth-scroll library. Once
    /// called, the built-in window scroll tracking stays off.
    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&self, raw: f32, eased: f32) {
        self.runtime.context.set_scroll(raw, eased);
    }

    /// Drives `update` from `requestAnimationFrame` and `resize` from the
    /// window resize event.
    pub fn start(&self) {
        self.runtime.start();
    }

    pub fn stop(&self) {
        self.runtime.stop();
    }

    /// Removes every mesh and restores the DOM text. Later calls do nothing.
    pub fn destroy(&self) {
        self.runtime.destroy();
    }

    #[wasm_bindgen(getter, js_name = elementCount)]
    pub fn element_count(&self) -> u32 {
        self.runtime.elements.borrow().len() as u32
    }
}

impl Drop for TextSpot {
    fn drop(&mut self) {
        self.runtime.destroy();
    }
}

fn load_settings(config_json: Option<String>) -> Result<TextSpotSettings, JsValue> {
    let raw = config_json.or_else(|| {
        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CONFIG_SCRIPT_ID))
            .and_then(|script| script.text_content())
    });
    match raw {
        Some(raw) if !raw.trim().is_empty() => TextSpotSettings::from_json(&raw)
            .map_err(|err| JsValue::from_str(&format!("textspot config: {err}"))),
        _ => Ok(TextSpotSettings::default()),
    }
}
