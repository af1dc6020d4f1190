use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry};

type Targets = Rc<RefCell<Vec<(Element, Rc<Cell<bool>>)>>>;

/// Tracks which text elements intersect the viewport.
///
/// Each observed element gets a flag that the observer callback flips; the
/// frame loop copies the flags into the elements before updating them.
pub(crate) struct VisibilityWatcher {
    observer: IntersectionObserver,
    targets: Targets,
    _callback: Closure<dyn FnMut(Array)>,
}

impl VisibilityWatcher {
    pub(crate) fn new() -> Result<Self, JsValue> {
        let targets: Targets = Rc::new(RefCell::new(Vec::new()));
        let targets_for_callback = Rc::clone(&targets);
        let callback = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let targets = targets_for_callback.borrow();
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                if let Some((_, flag)) = targets
                    .iter()
                    .find(|(element, _)| element.is_same_node(Some(&target)))
                {
                    flag.set(entry.is_intersecting());
                }
            }
        });
        let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
        Ok(Self {
            observer,
            targets,
            _callback: callback,
        })
    }

    /// Starts observing `element`. The flag reads `true` until the first
    /// observation says otherwise.
    pub(crate) fn observe(&self, element: &Element) -> Rc<Cell<bool>> {
        let flag = Rc::new(Cell::new(true));
        self.targets
            .borrow_mut()
            .push((element.clone(), Rc::clone(&flag)));
        self.observer.observe(element);
        flag
    }

    pub(crate) fn unobserve(&self, element: &Element) {
        self.observer.unobserve(element);
        self.targets
            .borrow_mut()
            .retain(|(observed, _)| !observed.is_same_node(Some(element)));
    }
}

impl Drop for VisibilityWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
