use std::cell::RefCell;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use textspot_core::{PointerReader, PointerTracker};
use wasm_bindgen::JsCast;
use web_sys::{Event, PointerEvent};

struct PointerHub {
    tracker: PointerTracker,
    listener: Option<EventListener>,
}

thread_local! {
    static POINTER_HUB: RefCell<PointerHub> = RefCell::new(PointerHub {
        tracker: PointerTracker::new(),
        listener: None,
    });
}

/// Hands out a reader of the page-wide pointer position, installing the
/// single `pointermove` listener on first use.
pub(crate) fn subscribe() -> PointerReader {
    POINTER_HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        if hub.listener.is_none() {
            hub.listener = install_listener();
        }
        hub.tracker.reader()
    })
}

/// Drops the listener once no element holds a reader any more.
pub(crate) fn release_if_unused() {
    POINTER_HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        if hub.tracker.reader_count() == 0 && hub.listener.take().is_some() {
            log::debug!("pointer listener removed");
        }
    });
}

fn install_listener() -> Option<EventListener> {
    let window = web_sys::window()?;
    let listener = EventListener::new_with_options(
        &window,
        "pointermove",
        EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: true,
        },
        move |event: &Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let (x, y) = (event.client_x() as f32, event.client_y() as f32);
            POINTER_HUB.with(|hub| {
                if let Ok(hub) = hub.try_borrow() {
                    hub.tracker.record(x, y);
                }
            });
        },
    );
    log::debug!("pointer listener installed");
    Some(listener)
}
