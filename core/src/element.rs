use std::cell::RefCell;
use std::rc::Rc;

use crate::bounds::{Bounds, DomRect};
use crate::config::{ElementConfig, TextSpotSettings};
use crate::font::FontResolver;
use crate::layout::MeshLayout;
use crate::mapper::{ScrollOffsets, ScrollSpaceMapper, ViewportSize};
use crate::material::{HighlightMaterial, HighlightUniforms};
use crate::pointer::PointerReader;
use crate::spot::{spot_target, SpotCenter};
use crate::style::{ComputedStyle, StyleSnapshot};

/// The DOM element a text mesh mirrors.
pub trait TextSource {
    fn computed_style(&self) -> ComputedStyle;
    fn bounding_rect(&self) -> DomRect;
    /// Value of `data-{name}`, if present.
    fn data_attribute(&self, name: &str) -> Option<String>;
    /// Rendered text (`innerText`), not markup.
    fn inner_text(&self) -> String;
    /// Sets the inline `color`; `None` removes the inline value.
    fn set_text_color(&self, value: Option<&str>);
}

/// Scroll and viewport state supplied by the host page.
pub trait FrameContext {
    fn scroll(&self) -> ScrollOffsets;
    fn viewport(&self) -> ViewportSize;
}

/// Size of the rasterized text block, available once the glyph engine has
/// finished shaping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshGeometry {
    pub width: f32,
    pub height: f32,
}

/// A text mesh owned by the glyph engine. Setters only record state; layout
/// and rasterization happen later, off the calling frame.
pub trait TextMesh {
    fn set_text(&mut self, text: &str);
    fn apply_layout(&mut self, layout: &MeshLayout);
    fn set_position(&mut self, position: [f32; 2]);
    fn set_uniforms(&mut self, uniforms: &HighlightUniforms);
    /// `None` until the glyph engine signals that geometry is ready.
    fn geometry(&self) -> Option<MeshGeometry>;
}

/// The caller-owned scene graph.
pub trait TextScene {
    type Mesh: TextMesh;

    fn create_mesh(&mut self) -> Self::Mesh;
    fn add(&mut self, mesh: &Self::Mesh);
    fn remove(&mut self, mesh: &Self::Mesh);
}

/// A DOM text element mirrored by a shader-lit text mesh.
///
/// Construction snapshots the element's style, builds one mesh, adds it to
/// the scene and hides the DOM glyphs. `on_resize` and `update` are the
/// host's resize and per-frame hooks. `teardown` (or drop) removes the mesh
/// and restores the element.
pub struct WebGlTextElement<E: TextSource, S: TextScene> {
    element: E,
    scene: Rc<RefCell<S>>,
    context: Rc<dyn FrameContext>,
    pointer: Option<PointerReader>,
    fonts: FontResolver,
    config: ElementConfig,
    mapper: ScrollSpaceMapper,
    snapshot: StyleSnapshot,
    bounds: Bounds,
    layout: MeshLayout,
    material: HighlightMaterial,
    mesh: S::Mesh,
    spot: SpotCenter,
    visible: bool,
    mesh_on_screen: bool,
    attached: bool,
    geometry_logged: bool,
    debug: bool,
}

impl<E: TextSource, S: TextScene> WebGlTextElement<E, S> {
    pub fn new(
        element: E,
        scene: Rc<RefCell<S>>,
        context: Rc<dyn FrameContext>,
        pointer: PointerReader,
        settings: &TextSpotSettings,
    ) -> Self {
        let config = ElementConfig::resolve(settings, |name| element.data_attribute(name));
        let fonts = FontResolver::new(settings.fonts.clone());
        let snapshot = StyleSnapshot::from_computed(&element.computed_style());
        let bounds = Bounds::capture(element.bounding_rect(), context.scroll().raw);
        let font_path = fonts.resolve(&snapshot.font_weight).to_string();
        let layout = MeshLayout::new(&snapshot, &bounds, &font_path, config.anchor);
        let material = HighlightMaterial::new(config.material, bounds.aspect());

        let mut mesh = scene.borrow_mut().create_mesh();
        mesh.set_text(&element.inner_text());
        mesh.apply_layout(&layout);
        mesh.set_uniforms(material.uniforms());
        scene.borrow_mut().add(&mesh);

        element.set_text_color(Some("transparent"));

        if settings.debug {
            log::debug!(
                "text element attached: font={font_path} size={}px bounds={:?} color={}",
                snapshot.font_size_px,
                bounds.rect,
                snapshot.color
            );
        }

        Self {
            element,
            scene,
            context,
            pointer: Some(pointer),
            fonts,
            mapper: ScrollSpaceMapper::new(config.anchor, config.baseline_offset_px),
            config,
            snapshot,
            bounds,
            layout,
            material,
            mesh,
            spot: SpotCenter::default(),
            visible: true,
            mesh_on_screen: false,
            attached: true,
            geometry_logged: false,
            debug: settings.debug,
        }
    }

    /// Re-reads style and bounds and pushes the derived layout to the mesh.
    /// Calling it again without a DOM change produces the same parameters.
    pub fn on_resize(&mut self) {
        if !self.attached {
            return;
        }
        self.snapshot = StyleSnapshot::from_computed(&self.element.computed_style());
        self.bounds = Bounds::capture(self.element.bounding_rect(), self.context.scroll().raw);
        let font_path = self.fonts.resolve(&self.snapshot.font_weight);
        self.layout = MeshLayout::new(&self.snapshot, &self.bounds, font_path, self.config.anchor);
        self.mesh.apply_layout(&self.layout);
        match self.bounds.aspect() {
            Some(aspect) => {
                if self.material.set_aspect(aspect) {
                    self.mesh.set_uniforms(self.material.uniforms());
                }
            }
            None => {
                if self.debug {
                    log::debug!("text element has no layout box; keeping aspect {}", self.material.aspect());
                }
            }
        }
    }

    /// Per-frame hook: repositions the mesh and eases the highlight spot.
    ///
    /// An element flagged hidden is skipped once its mesh has left the
    /// viewport too. The mesh follows the eased scroll, so it trails the DOM
    /// box out of view and keeps moving until it is off screen.
    pub fn update(&mut self) {
        if !self.attached {
            return;
        }
        let scroll = self.context.scroll();
        let viewport = self.context.viewport();
        let on_screen = self
            .mapper
            .overlaps_viewport(&self.bounds, scroll.eased, viewport);
        if !self.visible && !on_screen && !self.mesh_on_screen {
            return;
        }
        let position = self.mapper.mesh_position(&self.bounds, scroll.eased, viewport);
        if position.iter().all(|value| value.is_finite()) {
            self.mesh.set_position(position);
            self.mesh_on_screen = on_screen;
        }

        let pointer = self.pointer.as_ref().and_then(PointerReader::latest);
        if let Some(target) = pointer.and_then(|pointer| spot_target(pointer, &self.bounds, scroll.eased)) {
            let center = self.spot.ease_toward(target, self.config.spot_ease);
            if self.material.set_spot_center(center) {
                self.mesh.set_uniforms(self.material.uniforms());
            }
        }

        if self.debug && !self.geometry_logged {
            if let Some(geometry) = self.mesh.geometry() {
                log::debug!(
                    "text geometry ready: {}x{} for {}x{} box",
                    geometry.width,
                    geometry.height,
                    self.bounds.rect.width,
                    self.bounds.rect.height
                );
                self.geometry_logged = true;
            }
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Removes the mesh from the scene, restores the element's text colour
    /// and releases the pointer subscription. Later calls do nothing.
    pub fn teardown(&mut self) {
        if !self.attached {
            return;
        }
        self.scene.borrow_mut().remove(&self.mesh);
        self.element.set_text_color(None);
        self.pointer = None;
        self.attached = false;
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn mesh(&self) -> &S::Mesh {
        &self.mesh
    }

    pub fn snapshot(&self) -> &StyleSnapshot {
        &self.snapshot
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn layout(&self) -> &MeshLayout {
        &self.layout
    }

    pub fn material(&self) -> &HighlightMaterial {
        &self.material
    }

    pub fn spot_center(&self) -> [f32; 2] {
        self.spot.get()
    }
}

impl<E: TextSource, S: TextScene> Drop for WebGlTextElement<E, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
