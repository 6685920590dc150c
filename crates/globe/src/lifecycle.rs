//! The route globe component.
//!
//! Each call to [`GlobeComponent::set_route`] starts a new cycle:
//!
//! ```text
//! Idle -> Resolving -> Building -> Rendering -> Disposing -> Idle
//! ```
//!
//! The previous cycle is superseded synchronously: the generation advances
//! and the live [`SceneHandle`] is disposed before the new future is even
//! polled. The only suspension point is the joint airport lookup (plus the
//! surface source, if the texture strategy needs one). A cycle whose token
//! is no longer current after that await returns [`CycleOutcome::Stale`]
//! without allocating anything.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use airports::{AirportCoordinate, AirportResolver, IataCode};
use futures_util::future::join3;
use gpu::GraphicsBackend;
use runtime::{CycleToken, EventBus, FrameLoop, Generation, ResizeObserver};
use scene::{GlobeStyle, LatLon, OrbitControls, PerspectiveCamera};
use surface::{SurfaceTextures, synthesize};

use crate::assets::AssetLoader;
use crate::config::GlobeConfig;
use crate::error::GlobeError;
use crate::handle::{Host, SceneHandle};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Resolving,
    Building,
    Rendering,
    Disposing,
}

impl LifecycleState {
    /// Lowercase name, also the event kind emitted on entering the state.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Resolving => "resolving",
            LifecycleState::Building => "building",
            LifecycleState::Rendering => "rendering",
            LifecycleState::Disposing => "disposing",
        }
    }
}

/// How a cycle ended when it did not fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A scene is attached and rendering.
    Built,
    /// Origin or destination was empty.
    Suppressed,
    /// A newer cycle or an unmount superseded this one.
    Stale,
    /// The component was unmounted before this cycle started.
    Unmounted,
}

impl CycleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CycleOutcome::Built => "built",
            CycleOutcome::Suppressed => "suppressed",
            CycleOutcome::Stale => "stale",
            CycleOutcome::Unmounted => "unmounted",
        }
    }
}

/// Everything the component needs from its environment.
pub struct Platform<R, A, B> {
    pub resolver: R,
    pub assets: A,
    pub backend: B,
    pub frame_loop: Rc<dyn FrameLoop>,
    pub resize: Rc<dyn ResizeObserver>,
}

struct Shared<R, A, B: GraphicsBackend> {
    resolver: R,
    assets: A,
    host: Host<B>,
    config: GlobeConfig,
    style: GlobeStyle,
    land_rgb: [u8; 3],
    generation: Generation,
    events: EventBus,
    state: Cell<LifecycleState>,
    unmounted: Cell<bool>,
    live: RefCell<Option<Rc<RefCell<SceneHandle<B>>>>>,
    // Surface images only depend on the config, so they are made once.
    surface: RefCell<Option<Rc<SurfaceTextures>>>,
}

/// Cheap to clone; clones share one component.
pub struct GlobeComponent<R, A, B: GraphicsBackend> {
    shared: Rc<Shared<R, A, B>>,
}

impl<R, A, B: GraphicsBackend> Clone for GlobeComponent<R, A, B> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<R, A, B> GlobeComponent<R, A, B>
where
    R: AirportResolver + 'static,
    A: AssetLoader + 'static,
    B: GraphicsBackend + 'static,
{
    pub fn new(platform: Platform<R, A, B>, config: GlobeConfig) -> Result<Self, GlobeError> {
        config.validate()?;
        let style = config.style()?;
        let land_rgb = config.land_color()?.to_array();
        let Platform {
            resolver,
            assets,
            backend,
            frame_loop,
            resize,
        } = platform;
        Ok(Self {
            shared: Rc::new(Shared {
                resolver,
                assets,
                host: Host {
                    backend: Rc::new(RefCell::new(backend)),
                    frame_loop,
                    resize,
                },
                config,
                style,
                land_rgb,
                generation: Generation::new(),
                events: EventBus::new(),
                state: Cell::new(LifecycleState::Idle),
                unmounted: Cell::new(false),
                live: RefCell::new(None),
                surface: RefCell::new(None),
            }),
        })
    }

    /// Supersedes the current cycle and returns the future for the new one.
    ///
    /// The previous scene is gone by the time this returns. Dropping the
    /// future without polling it leaves the component idle.
    pub fn set_route(
        &self,
        origin: &str,
        destination: &str,
    ) -> impl Future<Output = Result<CycleOutcome, GlobeError>> + 'static {
        let shared = self.shared.clone();
        let token = shared.generation.advance();
        shared.teardown(token.value());
        let origin = origin.trim().to_owned();
        let destination = destination.trim().to_owned();
        async move { shared.run_cycle(token, origin, destination).await }
    }

    /// Disposes the live scene and ignores every later [`set_route`].
    ///
    /// [`set_route`]: GlobeComponent::set_route
    pub fn unmount(&self) {
        let shared = &self.shared;
        if shared.unmounted.replace(true) {
            return;
        }
        shared.generation.invalidate();
        let cycle = shared.generation.current();
        shared.teardown(cycle);
        shared.events.emit(cycle, "unmounted", "component unmounted");
    }
}

impl<R, A, B: GraphicsBackend> GlobeComponent<R, A, B> {
    pub fn state(&self) -> LifecycleState {
        self.shared.state.get()
    }

    pub fn is_unmounted(&self) -> bool {
        self.shared.unmounted.get()
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.shared.config
    }

    /// Lifecycle event log, shared with the component.
    pub fn events(&self) -> EventBus {
        self.shared.events.clone()
    }

    /// Cycle of the scene currently attached, if any.
    pub fn live_cycle(&self) -> Option<u64> {
        self.with_handle(|h| h.cycle())
    }

    pub fn camera(&self) -> Option<PerspectiveCamera> {
        self.with_handle(|h| *h.camera())
    }

    pub fn pointer_down(&self, x: f64, y: f64) {
        self.with_controls(|c| c.on_pointer_down([x, y]));
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.with_controls(|c| c.on_pointer_move([x, y]));
    }

    pub fn pointer_up(&self) {
        self.with_controls(|c| c.on_pointer_up());
    }

    pub fn wheel(&self, delta_y: f64) {
        self.with_controls(|c| c.on_wheel(delta_y));
    }

    fn with_handle<T>(&self, f: impl FnOnce(&mut SceneHandle<B>) -> T) -> Option<T> {
        let live = self.shared.live.borrow();
        let handle = live.as_ref()?;
        let mut handle = handle.try_borrow_mut().ok()?;
        Some(f(&mut *handle))
    }

    fn with_controls(&self, f: impl FnOnce(&mut OrbitControls)) {
        self.with_handle(|h| f(h.controls_mut()));
    }
}

impl<R, A, B> Shared<R, A, B>
where
    R: AirportResolver,
    A: AssetLoader,
    B: GraphicsBackend + 'static,
{
    fn transition(&self, cycle: u64, next: LifecycleState) {
        let prev = self.state.replace(next);
        if prev != next {
            self.events
                .emit(cycle, next.as_str(), format!("{prev:?} -> {next:?}"));
        }
    }

    /// Disposes the live handle, if any, and returns to `Idle`.
    fn teardown(&self, cycle: u64) {
        let live = self.live.borrow_mut().take();
        if let Some(handle) = live {
            self.transition(cycle, LifecycleState::Disposing);
            // If a callback holds the handle right now, the last `Rc` drop
            // disposes it instead.
            if let Ok(mut handle) = handle.try_borrow_mut() {
                handle.dispose();
            }
        }
        self.transition(cycle, LifecycleState::Idle);
    }

    async fn run_cycle(
        &self,
        token: CycleToken,
        origin: String,
        destination: String,
    ) -> Result<CycleOutcome, GlobeError> {
        let cycle = token.value();
        if self.unmounted.get() {
            return Ok(CycleOutcome::Unmounted);
        }
        if !token.is_current() {
            return Ok(CycleOutcome::Stale);
        }
        if origin.is_empty() || destination.is_empty() {
            self.events
                .emit(cycle, "suppressed", "origin or destination is empty");
            return Ok(CycleOutcome::Suppressed);
        }

        let result = self.resolve_and_build(&token, &origin, &destination).await;
        if let Err(e) = &result {
            if token.is_current() {
                self.transition(cycle, LifecycleState::Idle);
            }
            self.events.emit(cycle, "failed", e.to_string());
            tracing::error!(cycle, %origin, %destination, error = %e, "globe cycle failed");
        }
        result
    }

    async fn resolve_and_build(
        &self,
        token: &CycleToken,
        origin: &str,
        destination: &str,
    ) -> Result<CycleOutcome, GlobeError> {
        let cycle = token.value();
        let from = IataCode::parse(origin)?;
        let to = IataCode::parse(destination)?;

        self.transition(cycle, LifecycleState::Resolving);
        let (from, to, surface) = join3(
            self.resolver.resolve(&from),
            self.resolver.resolve(&to),
            self.load_surface(),
        )
        .await;

        if !token.is_current() {
            self.events
                .emit(cycle, "stale", format!("{origin} -> {destination} superseded"));
            return Ok(CycleOutcome::Stale);
        }
        let (from, to) = (from?, to?);
        let surface = surface?;

        self.transition(cycle, LifecycleState::Building);
        let handle = SceneHandle::build(
            cycle,
            &self.host,
            &self.config,
            &self.style,
            lat_lon(&from),
            lat_lon(&to),
            &surface,
        )?;
        let handle = Rc::new(RefCell::new(handle));
        SceneHandle::attach(&handle);
        *self.live.borrow_mut() = Some(handle);
        self.transition(cycle, LifecycleState::Rendering);
        tracing::info!(cycle, origin = %from.iata, destination = %to.iata, "route globe ready");
        Ok(CycleOutcome::Built)
    }

    /// Synthesizes the surface textures, fetching the strategy's source
    /// first if it has one. The result is reused by later cycles.
    async fn load_surface(&self) -> Result<Rc<SurfaceTextures>, GlobeError> {
        if let Some(cached) = self.surface.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let strategy = &self.config.texture;
        let bytes = match strategy.source() {
            Some(source) => Some(self.assets.load(source).await?),
            None => None,
        };
        let textures = Rc::new(synthesize(strategy, bytes.as_deref(), self.land_rgb)?);
        *self.surface.borrow_mut() = Some(textures.clone());
        Ok(textures)
    }
}

fn lat_lon(coordinate: &AirportCoordinate) -> LatLon {
    LatLon::new(coordinate.latitude, coordinate.longitude)
}
