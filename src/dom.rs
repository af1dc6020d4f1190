use textspot_core::{ComputedStyle, DomRect, TextSource};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// A live DOM text element.
#[derive(Clone)]
pub(crate) struct DomText {
    element: HtmlElement,
}

impl DomText {
    pub(crate) fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    pub(crate) fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl TextSource for DomText {
    fn computed_style(&self) -> ComputedStyle {
        let Some(style) = web_sys::window()
            .and_then(|window| window.get_computed_style(&self.element).ok().flatten())
        else {
            return ComputedStyle::default();
        };
        let read = |name: &str| style.get_property_value(name).unwrap_or_default();
        ComputedStyle {
            font_weight: read("font-weight"),
            font_size: read("font-size"),
            letter_spacing: read("letter-spacing"),
            line_height: read("line-height"),
            white_space: read("white-space"),
            text_align: read("text-align"),
            color: read("color"),
        }
    }

    fn bounding_rect(&self) -> DomRect {
        let rect = self.element.get_bounding_client_rect();
        DomRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn data_attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(&format!("data-{name}"))
    }

    fn inner_text(&self) -> String {
        self.element.inner_text()
    }

    fn set_text_color(&self, value: Option<&str>) {
        let style = self.element.style();
        let result = match value {
            Some(value) => style.set_property("color", value),
            None => style.remove_property("color").map(|_| ()),
        };
        if let Err(err) = result {
            log::warn!("could not set inline color to {value:?}: {err:?}");
        }
    }
}

pub(crate) fn query_text_elements(document: &Document, selector: &str) -> Vec<DomText> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        log::warn!("invalid selector {selector:?}");
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|idx| nodes.item(idx))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .map(DomText::new)
        .collect()
}
