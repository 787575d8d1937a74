use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Coalesces repaint requests into one `requestAnimationFrame` callback.
///
/// The map only changes in response to input, so a frame is drawn when something
/// marked the scene dirty and never otherwise.
#[derive(Clone)]
pub struct RenderScheduler {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    scheduled: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn request_frame(&self) {
        if self.scheduled.replace(true) {
            return;
        }
        let callback = self.callback.borrow();
        let (Some(window), Some(cb)) = (self.window.as_ref(), callback.as_ref()) else {
            self.scheduled.set(false);
            return;
        };
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(_) => self.scheduled.set(false),
        }
    }
}

impl RenderScheduler {
    pub fn new(render_fn: impl Fn() + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            scheduled: Cell::new(false),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        let inner_cb = Rc::downgrade(&inner);
        let cb = Closure::<dyn FnMut()>::new(move || {
            let Some(inner) = inner_cb.upgrade() else {
                return;
            };
            inner.scheduled.set(false);
            inner.raf_id.set(None);
            render_fn();
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    /// Request a repaint on the next frame. Repeated calls before that frame are free.
    pub fn mark_dirty(&self) {
        self.inner.request_frame();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(raf_id) = self.raf_id.take()
            && let Some(window) = self.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
    }
}
