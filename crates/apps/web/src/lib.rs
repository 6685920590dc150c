//! Browser entry point for the route globe.
//!
//! ```js
//! const view = await GlobeView.create("route-globe", JSON.stringify({ api_base: "" }));
//! await view.set_route("YYZ", "LHR"); // "built"
//! view.unmount();
//! ```

mod console;
mod platform;
mod shading;
mod wgpu;

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use airports::HttpResolver;
use globe::{CycleOutcome, GlobeComponent, GlobeConfig, GlobeError, Platform};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use platform::{DomResizeObserver, FetchAssets, RafFrameLoop};
pub use wgpu::WebGpuBackend;

type BrowserGlobe = GlobeComponent<HttpResolver, FetchAssets, WebGpuBackend>;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[wasm_bindgen(start)]
pub fn start() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    console::init();
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn outcome_value(result: Result<CycleOutcome, GlobeError>) -> Result<JsValue, JsValue> {
    result
        .map(|outcome| JsValue::from_str(outcome.as_str()))
        .map_err(to_js)
}

/// A mounted route globe.
#[wasm_bindgen]
pub struct GlobeView {
    component: BrowserGlobe,
}

#[wasm_bindgen]
impl GlobeView {
    /// Prepares a globe for the element with id `host_id`.
    ///
    /// `config_json` is a `GlobeConfig` document; missing fields take their
    /// defaults. Nothing is drawn until the first `set_route`.
    pub async fn create(host_id: String, config_json: Option<String>) -> Result<GlobeView, JsValue> {
        let config = match config_json {
            Some(json) => GlobeConfig::from_json(&json).map_err(to_js)?,
            None => GlobeConfig::default(),
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("document missing"))?;
        let host = document
            .get_element_by_id(&host_id)
            .ok_or_else(|| JsValue::from_str(&format!("host element #{host_id} missing")))?;
        let host_html = host
            .clone()
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("#{host_id} is not an HTML element")))?;

        let backend = WebGpuBackend::create(host_html).await.map_err(to_js)?;
        let platform = Platform {
            resolver: HttpResolver::new(config.api_base.clone()),
            assets: FetchAssets,
            backend,
            frame_loop: Rc::new(RafFrameLoop::new()),
            resize: Rc::new(DomResizeObserver::new(host)),
        };
        let component = GlobeComponent::new(platform, config).map_err(to_js)?;
        tracing::info!(host = %host_id, "globe view created");
        Ok(GlobeView { component })
    }

    /// Shows the route between two IATA codes, replacing whatever was shown.
    ///
    /// Resolves to `"built"`, `"suppressed"`, `"stale"` or `"unmounted"`;
    /// rejects with the error message when the cycle fails.
    pub fn set_route(&self, origin: &str, destination: &str) -> js_sys::Promise {
        let cycle = self.component.set_route(origin, destination);
        wasm_bindgen_futures::future_to_promise(async move { outcome_value(cycle.await) })
    }

    /// Tears the globe down. Later `set_route` calls resolve to `"unmounted"`.
    pub fn unmount(&self) {
        self.component.unmount();
    }

    /// Current lifecycle state: `idle`, `resolving`, `building`, `rendering`
    /// or `disposing`.
    pub fn state(&self) -> String {
        self.component.state().as_str().to_string()
    }

    pub fn pointer_down(&self, x: f64, y: f64) {
        self.component.pointer_down(x, y);
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.component.pointer_move(x, y);
    }

    pub fn pointer_up(&self) {
        self.component.pointer_up();
    }

    pub fn wheel(&self, delta_y: f64) {
        self.component.wheel(delta_y);
    }
}
