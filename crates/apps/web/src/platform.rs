//! Browser implementations of the globe's runtime seams.

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::rc::Rc;

    use gloo_net::http::Request;
    use globe::{AssetLoader, GlobeError};
    use runtime::{
        FrameCallback, FrameClock, FrameLoop, HostSize, LoopId, ObserverId, ResizeCallback,
        ResizeObserver,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    /// One `requestAnimationFrame` chain.
    struct RafChain {
        cancelled: Cell<bool>,
        running: Cell<bool>,
        request: Cell<Option<i32>>,
        closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    }

    impl RafChain {
        fn schedule(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = self.closure.borrow();
            let Some(closure) = closure.as_ref() else {
                return;
            };
            match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(id) => self.request.set(Some(id)),
                Err(e) => tracing::warn!("requestAnimationFrame failed: {e:?}"),
            }
        }
    }

    /// Frame loop driven by `requestAnimationFrame`.
    #[derive(Clone, Default)]
    pub struct RafFrameLoop {
        next_id: Rc<Cell<u64>>,
        chains: Rc<RefCell<BTreeMap<LoopId, Rc<RafChain>>>>,
    }

    impl RafFrameLoop {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl FrameLoop for RafFrameLoop {
        fn start(&self, mut callback: FrameCallback) -> LoopId {
            let id = LoopId(self.next_id.get());
            self.next_id.set(id.0 + 1);

            let chain = Rc::new(RafChain {
                cancelled: Cell::new(false),
                running: Cell::new(false),
                request: Cell::new(None),
                closure: RefCell::new(None),
            });
            let mut clock = FrameClock::new();
            let this = chain.clone();
            let tick = Closure::wrap(Box::new(move |timestamp_ms: f64| {
                this.request.set(None);
                if this.cancelled.get() {
                    let _ = this.closure.borrow_mut().take();
                    return;
                }
                this.running.set(true);
                callback(clock.advance(timestamp_ms));
                this.running.set(false);
                if this.cancelled.get() {
                    let _ = this.closure.borrow_mut().take();
                    return;
                }
                this.schedule();
            }) as Box<dyn FnMut(f64)>);
            *chain.closure.borrow_mut() = Some(tick);
            chain.schedule();

            self.chains.borrow_mut().insert(id, chain);
            id
        }

        fn cancel(&self, id: LoopId) {
            let Some(chain) = self.chains.borrow_mut().remove(&id) else {
                return;
            };
            chain.cancelled.set(true);
            if let (Some(request), Some(window)) = (chain.request.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(request);
            }
            // A running chain drops its own closure on return.
            if !chain.running.get() {
                let _ = chain.closure.borrow_mut().take();
            }
        }
    }

    struct Observation {
        observer: web_sys::ResizeObserver,
        _closure: Closure<dyn FnMut(js_sys::Array)>,
    }

    /// `ResizeObserver` on the host element.
    #[derive(Clone)]
    pub struct DomResizeObserver {
        target: web_sys::Element,
        next_id: Rc<Cell<u64>>,
        observations: Rc<RefCell<BTreeMap<ObserverId, Observation>>>,
    }

    impl DomResizeObserver {
        pub fn new(target: web_sys::Element) -> Self {
            Self {
                target,
                next_id: Rc::new(Cell::new(0)),
                observations: Rc::new(RefCell::new(BTreeMap::new())),
            }
        }
    }

    impl ResizeObserver for DomResizeObserver {
        fn observe(&self, mut callback: ResizeCallback) -> ObserverId {
            let id = ObserverId(self.next_id.get());
            self.next_id.set(id.0 + 1);

            let closure = Closure::wrap(Box::new(move |entries: js_sys::Array| {
                let Some(entry) = entries
                    .get(0)
                    .dyn_into::<web_sys::ResizeObserverEntry>()
                    .ok()
                else {
                    return;
                };
                let rect = entry.content_rect();
                callback(HostSize::new(rect.width(), rect.height()));
            }) as Box<dyn FnMut(js_sys::Array)>);

            match web_sys::ResizeObserver::new(closure.as_ref().unchecked_ref()) {
                Ok(observer) => {
                    observer.observe(&self.target);
                    self.observations.borrow_mut().insert(
                        id,
                        Observation {
                            observer,
                            _closure: closure,
                        },
                    );
                }
                Err(e) => tracing::warn!("ResizeObserver unavailable: {e:?}"),
            }
            id
        }

        fn disconnect(&self, id: ObserverId) {
            if let Some(observation) = self.observations.borrow_mut().remove(&id) {
                observation.observer.disconnect();
            }
        }
    }

    /// Loads texture sources over HTTP, relative to the page.
    #[derive(Clone, Debug, Default)]
    pub struct FetchAssets;

    impl AssetLoader for FetchAssets {
        fn load(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, GlobeError>> {
            let source = source.to_owned();
            async move {
                let response = Request::get(&source)
                    .send()
                    .await
                    .map_err(|e| GlobeError::asset(&source, e.to_string()))?;
                if !response.ok() {
                    return Err(GlobeError::asset(
                        &source,
                        format!("HTTP {}", response.status()),
                    ));
                }
                response
                    .binary()
                    .await
                    .map_err(|e| GlobeError::asset(&source, e.to_string()))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use std::future::{Future, ready};

    use globe::{AssetLoader, GlobeError};
    use runtime::{FrameCallback, FrameLoop, LoopId, ObserverId, ResizeCallback, ResizeObserver};

    /// Never fires outside the browser.
    #[derive(Clone, Default)]
    pub struct RafFrameLoop;

    impl RafFrameLoop {
        pub fn new() -> Self {
            Self
        }
    }

    impl FrameLoop for RafFrameLoop {
        fn start(&self, _callback: FrameCallback) -> LoopId {
            LoopId(0)
        }

        fn cancel(&self, _id: LoopId) {}
    }

    #[derive(Clone, Default)]
    pub struct DomResizeObserver;

    impl DomResizeObserver {
        pub fn new(_target: web_sys::Element) -> Self {
            Self
        }
    }

    impl ResizeObserver for DomResizeObserver {
        fn observe(&self, _callback: ResizeCallback) -> ObserverId {
            ObserverId(0)
        }

        fn disconnect(&self, _id: ObserverId) {}
    }

    #[derive(Clone, Debug, Default)]
    pub struct FetchAssets;

    impl AssetLoader for FetchAssets {
        fn load(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, GlobeError>> {
            ready(Err(GlobeError::asset(
                source,
                "fetch is only available on wasm32 targets",
            )))
        }
    }
}

pub use imp::{DomResizeObserver, FetchAssets, RafFrameLoop};
