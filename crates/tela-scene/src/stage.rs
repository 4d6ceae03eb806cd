//! The stage: layers, scheduling, input fan-out.
//!
//! A stage owns the screen surface, a set of z-ordered [`Layer`]s, one
//! [`Animator`], and the frame scheduler. The embedder drives it: feed
//! pointer and keyboard events in, call [`Stage::tick`] in a loop, sleep for
//! the returned delay. Rendering is dirty-flagged per layer; while images are
//! still preloading every layer draws a progress bar instead of its content.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tela_config::TelaConfig;
use tela_geometry::{Point, Size};
use tela_surface::{Color, ImageHandle, Surface};
use tracing::{debug, info};

use crate::animation::{Animator, SharedAnimator, SharedTarget, TweenHandle, TweenSpec};
use crate::behaviors::{Clickable, DragController, Droppable, Linkable, Moveable, SharedElement};
use crate::clock::{Clock, SystemClock};
use crate::easing::Easing;
use crate::element::{Drawable, ElementId, ShapeElement, SharedDrawable};
use crate::error::SceneError;
use crate::events::{Dispatch, ElementEvent, EventKey};
use crate::input_state::{InputState, SharedInputState};
use crate::invoker::{Invoker, TaskId, TaskOutcome, PRIORITY_ANIMATION, PRIORITY_DEFAULT, PRIORITY_RENDER};
use crate::keyboard::{Key, KeyEvent, KeyInput, KeyboardRouter, PreventList};
use crate::layer::{ClearMode, Layer};
use crate::mouse::{MouseEvent, MouseRouter};
use crate::preloader::ImagePreloader;

/// Stage construction options. [`StageOptions::from_config`] fills them from
/// a [`TelaConfig`].
#[derive(Clone)]
pub struct StageOptions {
    /// Diagnostic name, shows up in log events.
    pub name: String,
    pub fps: u32,
    /// Register the frame tasks as soon as the stage is built.
    pub auto_start: bool,
    /// Clear mode applied to every created layer.
    pub clear: ClearMode,
    /// Give created layers an offscreen back buffer (requires a buffer
    /// factory, see [`Stage::set_buffer_factory`]).
    pub back_buffer: bool,
    pub default_duration_ms: f64,
    pub default_easing: Easing,
    pub prevent: PreventList,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            fps: 30,
            auto_start: true,
            clear: ClearMode::Transparent,
            back_buffer: false,
            default_duration_ms: 500.0,
            default_easing: Easing::linear(),
            prevent: PreventList::None,
        }
    }
}

impl StageOptions {
    pub fn from_config(config: &TelaConfig) -> Result<Self, SceneError> {
        let clear = if !config.stage.clear {
            ClearMode::None
        } else {
            match &config.stage.clear_color {
                Some(name) => ClearMode::Color(Color::parse(name)?),
                None => ClearMode::Transparent,
            }
        };
        let prevent = if config.input.prevent_all {
            PreventList::All
        } else if config.input.prevent_keys.is_empty() {
            PreventList::None
        } else {
            // Unknown key names in config are skipped, not fatal.
            PreventList::Keys(
                config
                    .input
                    .prevent_keys
                    .iter()
                    .filter_map(|k| Key::parse(k))
                    .collect(),
            )
        };
        Ok(Self {
            fps: config.stage.fps,
            auto_start: config.stage.auto_start,
            clear,
            back_buffer: config.stage.back_buffer,
            default_duration_ms: config.animation.duration_ms,
            default_easing: Easing::parse(&config.animation.easing)?,
            prevent,
            ..Default::default()
        })
    }
}

/// Per-layer overrides for [`Stage::create_layer_with`]. Unset fields fall
/// back to the stage options.
#[derive(Clone, Default)]
pub struct LayerOptions {
    /// Position in the dense z ranking; created on top when unset.
    pub z: Option<i32>,
    pub clear: Option<ClearMode>,
    pub back_buffer: Option<bool>,
}

type ListenerFn = Box<dyn FnMut(&ElementEvent)>;
type Listeners = HashMap<(ElementId, EventKey), Vec<ListenerFn>>;
type ReadyFn = Rc<dyn Fn()>;
type BufferFactory = Box<dyn Fn(Size) -> Box<dyn Surface>>;

/// Deliver one event to its listeners. The listener list is taken out for
/// the duration of the calls, so a listener may subscribe more listeners
/// without hitting a live borrow; additions land after the originals.
fn fire(listeners: &Rc<RefCell<Listeners>>, target: ElementId, event: &ElementEvent) {
    let key = (target, event.key());
    let Some(mut fns) = listeners.borrow_mut().remove(&key) else {
        return;
    };
    for f in fns.iter_mut() {
        f(event);
    }
    let mut map = listeners.borrow_mut();
    let slot = map.entry(key).or_default();
    fns.append(slot);
    *slot = fns;
}

/// The layer set plus everything the render task needs, shared between the
/// stage and the scheduler closure.
struct SceneGraph {
    layers: Vec<Layer>,
    screen: Box<dyn Surface>,
    preloader: ImagePreloader,
    ready_fired: bool,
    on_ready: Vec<ReadyFn>,
}

impl SceneGraph {
    fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name() == name)
    }

    fn layer_mut(&mut self, name: &str) -> Result<&mut Layer, SceneError> {
        match self.layer_index(name) {
            Some(i) => Ok(&mut self.layers[i]),
            None => Err(SceneError::UnknownLayer(name.to_string())),
        }
    }

    fn request_layer_update(&mut self, name: &str) {
        if let Ok(layer) = self.layer_mut(name) {
            layer.request_update();
        }
    }

    /// A z value guaranteed above every layer, for overlays.
    fn cover_z(&self) -> i32 {
        self.layers.iter().map(Layer::z).max().unwrap_or(0) + 100
    }

    /// Reposition a layer in the dense 1..=N ranking; the layers in between
    /// shift by one to make room.
    fn set_layer_z(&mut self, name: &str, z: i32) -> Result<(), SceneError> {
        let count = self.layers.len() as i32;
        let target = z.clamp(1, count.max(1));
        let index = self
            .layer_index(name)
            .ok_or_else(|| SceneError::UnknownLayer(name.to_string()))?;
        let current = self.layers[index].z();
        if current == target {
            return Ok(());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if i == index {
                continue;
            }
            let lz = layer.z();
            if current < target && lz > current && lz <= target {
                layer.set_z(lz - 1);
            } else if current > target && lz >= target && lz < current {
                layer.set_z(lz + 1);
            }
        }
        self.layers[index].set_z(target);
        debug!(layer = name, z = target, "layer reordered");
        for layer in &mut self.layers {
            layer.request_update();
        }
        Ok(())
    }

    /// One frame pass, bottom layer first. Returns ready callbacks to fire
    /// once the graph borrow is released.
    fn render_frame(&mut self, elapsed: f64) -> Vec<ReadyFn> {
        let ready = self.preloader.is_ready();
        let mut fire = Vec::new();
        if ready && !self.ready_fired {
            self.ready_fired = true;
            info!(summary = %self.preloader.summary(), "scene ready");
            // First real frame replaces the progress bar everywhere.
            for layer in &mut self.layers {
                layer.request_update();
            }
            fire = std::mem::take(&mut self.on_ready);
        }
        let progress = self.preloader.progress();

        let mut order: Vec<usize> = (0..self.layers.len()).collect();
        order.sort_by_key(|&i| self.layers[i].z());
        for &i in &order {
            self.layers[i].run_plain_funcs(elapsed);
        }
        for &i in &order {
            // While loading, every unfrozen layer redraws so the bar moves.
            let redraw = if ready {
                self.layers[i].check_auto_draw()
            } else {
                !self.layers[i].is_frozen()
            };
            if redraw {
                self.layers[i].draw_frame(self.screen.as_mut(), ready, progress, elapsed);
            }
        }
        fire
    }
}

/// A renderable, interactive scene.
pub struct Stage {
    options: StageOptions,
    invoker: Invoker,
    animator: SharedAnimator,
    graph: Rc<RefCell<SceneGraph>>,
    input: SharedInputState,
    mouse: MouseRouter,
    keyboard: KeyboardRouter,
    clickable: Clickable,
    drag: DragController,
    drops: Droppable,
    links: Linkable,
    moveable: Moveable,
    listeners: Rc<RefCell<Listeners>>,
    /// id → (owning layer name, element).
    elements: HashMap<ElementId, (String, SharedElement)>,
    next_element: ElementId,
    buffer_factory: Option<BufferFactory>,
    render_task: Option<TaskId>,
    animation_task: Option<TaskId>,
}

impl Stage {
    pub fn new(screen: Box<dyn Surface>, options: StageOptions) -> Self {
        Self::with_clock(screen, options, Box::new(SystemClock::new()))
    }

    /// Build with an injected clock, for deterministic tests.
    pub fn with_clock(
        screen: Box<dyn Surface>,
        options: StageOptions,
        clock: Box<dyn Clock>,
    ) -> Self {
        info!(stage = %options.name, fps = options.fps, "stage created");
        let input = InputState::shared();
        // The root layer shares the stage's name. It never gets a back
        // buffer; the factory cannot be installed before construction.
        let mut root = Layer::new(options.name.clone(), 1, None);
        root.set_clear_mode(options.clear);
        let mut stage = Self {
            invoker: Invoker::with_fps(clock, options.fps),
            animator: Rc::new(RefCell::new(Animator::new())),
            graph: Rc::new(RefCell::new(SceneGraph {
                layers: vec![root],
                screen,
                preloader: ImagePreloader::new(),
                ready_fired: false,
                on_ready: Vec::new(),
            })),
            mouse: MouseRouter::new(input.clone()),
            keyboard: KeyboardRouter::new(input.clone(), options.prevent.clone()),
            input,
            clickable: Clickable::default(),
            drag: DragController::default(),
            drops: Droppable::default(),
            links: Linkable::default(),
            moveable: Moveable::default(),
            listeners: Rc::new(RefCell::new(HashMap::new())),
            elements: HashMap::new(),
            next_element: 1,
            buffer_factory: None,
            render_task: None,
            animation_task: None,
            options,
        };
        if stage.options.auto_start {
            stage.start();
        }
        stage
    }

    pub fn options(&self) -> &StageOptions {
        &self.options
    }

    pub fn size(&self) -> Size {
        self.graph.borrow().screen.size()
    }

    /// Install the factory that allocates per-layer back buffers. Only layers
    /// created afterwards get one (and only when the options ask for it).
    pub fn set_buffer_factory(&mut self, factory: impl Fn(Size) -> Box<dyn Surface> + 'static) {
        self.buffer_factory = Some(Box::new(factory));
    }

    // --- scheduling -----------------------------------------------------

    /// Register the animation and render tasks. Idempotent; called from the
    /// constructor when `auto_start` is set.
    pub fn start(&mut self) {
        if self.animation_task.is_none() {
            let animator = self.animator.clone();
            self.animation_task = Some(self.invoker.add_task(PRIORITY_ANIMATION, move |elapsed| {
                // Callbacks run after the animator borrow is dropped, so a
                // finish handler may start new tweens.
                let callbacks = animator.borrow_mut().tick(elapsed);
                for cb in callbacks {
                    cb();
                }
                TaskOutcome::Continue
            }));
        }
        if self.render_task.is_none() {
            let graph = self.graph.clone();
            self.render_task = Some(self.invoker.add_task(PRIORITY_RENDER, move |elapsed| {
                let ready_callbacks = graph.borrow_mut().render_frame(elapsed);
                for cb in ready_callbacks {
                    cb();
                }
                TaskOutcome::Continue
            }));
        }
    }

    /// Like [`Stage::start`], but also install a render function on the
    /// root layer (runs each redraw, before elements).
    pub fn start_with(&mut self, callback: impl FnMut(f64) + 'static) {
        let root = self.options.name.clone();
        let _ = self.layer(&root, |l| l.add_render_func(PRIORITY_DEFAULT, callback));
        self.start();
    }

    /// Pause the scheduler; the next tick resumes with a fresh elapsed
    /// baseline.
    pub fn stop(&mut self) {
        self.invoker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.invoker.is_running()
    }

    /// Run one frame. Returns the suggested milliseconds to sleep before the
    /// next call.
    pub fn tick(&mut self) -> f64 {
        self.invoker.tick()
    }

    /// One-shot timer on the stage scheduler.
    pub fn after(&mut self, delay_ms: f64, callback: impl FnOnce(f64) + 'static) -> TaskId {
        self.invoker.after(delay_ms, PRIORITY_DEFAULT, callback)
    }

    pub fn invoker_mut(&mut self) -> &mut Invoker {
        &mut self.invoker
    }

    // --- layers ---------------------------------------------------------

    /// Create a layer on top of the existing ones, with the stage defaults.
    pub fn create_layer(&mut self, name: &str) -> Result<(), SceneError> {
        self.create_layer_with(name, LayerOptions::default())
    }

    /// Create a layer with per-layer overrides.
    pub fn create_layer_with(
        &mut self,
        name: &str,
        layer_options: LayerOptions,
    ) -> Result<(), SceneError> {
        {
            let mut graph = self.graph.borrow_mut();
            if graph.layer_index(name).is_some() {
                return Err(SceneError::LayerExists(name.to_string()));
            }
            let z = graph.layers.len() as i32 + 1;
            let back_buffer = layer_options.back_buffer.unwrap_or(self.options.back_buffer);
            let buffer = match (&self.buffer_factory, back_buffer) {
                (Some(factory), true) => Some(factory(graph.screen.size())),
                _ => None,
            };
            let mut layer = Layer::new(name, z, buffer);
            layer.set_clear_mode(layer_options.clear.unwrap_or(self.options.clear));
            graph.layers.push(layer);
            debug!(layer = name, z, "layer created");
        }
        if let Some(z) = layer_options.z {
            self.graph.borrow_mut().set_layer_z(name, z)?;
        }
        Ok(())
    }

    /// Inspect or mutate a layer by name.
    pub fn layer<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Layer) -> R,
    ) -> Result<R, SceneError> {
        let mut graph = self.graph.borrow_mut();
        Ok(f(graph.layer_mut(name)?))
    }

    pub fn set_layer_z(&mut self, name: &str, z: i32) -> Result<(), SceneError> {
        self.graph.borrow_mut().set_layer_z(name, z)
    }

    /// A z value above every current layer, for modal overlays.
    pub fn cover_z(&self) -> i32 {
        self.graph.borrow().cover_z()
    }

    // --- elements -------------------------------------------------------

    /// Add an element to a layer. The element is subscribed for pointer
    /// events immediately.
    pub fn add_element(
        &mut self,
        layer: &str,
        element: ShapeElement,
    ) -> Result<ElementId, SceneError> {
        let shared: SharedElement = Rc::new(RefCell::new(element));
        let id = self.next_element;
        let z_cell = {
            let mut graph = self.graph.borrow_mut();
            let l = graph.layer_mut(layer)?;
            l.add_element(id, shared.clone());
            l.z_cell()
        };
        self.next_element += 1;
        let drawable: SharedDrawable = shared.clone();
        self.mouse.subscribe(id, &drawable, z_cell);
        self.elements.insert(id, (layer.to_string(), shared));
        Ok(id)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Result<(), SceneError> {
        let (layer, _) = self
            .elements
            .remove(&id)
            .ok_or(SceneError::UnknownElement(id))?;
        self.mouse.unsubscribe(id);
        self.clickable.disable(id);
        self.drag.disable(id);
        self.links.unlink_all(id);
        self.moveable.stop(id);
        self.listeners.borrow_mut().retain(|(e, _), _| *e != id);
        self.graph.borrow_mut().layer_mut(&layer)?.remove_element(id);
        Ok(())
    }

    pub fn element(&self, id: ElementId) -> Result<SharedElement, SceneError> {
        self.elements
            .get(&id)
            .map(|(_, e)| e.clone())
            .ok_or(SceneError::UnknownElement(id))
    }

    fn entry(&self, id: ElementId) -> Result<(String, SharedElement), SceneError> {
        self.elements
            .get(&id)
            .cloned()
            .ok_or(SceneError::UnknownElement(id))
    }

    // --- behaviors ------------------------------------------------------

    pub fn make_clickable(&mut self, id: ElementId) -> Result<(), SceneError> {
        let (_, element) = self.entry(id)?;
        self.clickable.enable(id, element);
        Ok(())
    }

    pub fn make_draggable(&mut self, id: ElementId) -> Result<(), SceneError> {
        let (_, element) = self.entry(id)?;
        self.drag.enable(id, element);
        Ok(())
    }

    /// Let `drag_id` be dropped onto `zone_id`.
    pub fn make_droppable(&mut self, drag_id: ElementId, zone_id: ElementId) -> Result<(), SceneError> {
        self.entry(drag_id)?;
        let (_, zone) = self.entry(zone_id)?;
        self.drops.register(drag_id, zone_id, zone);
        Ok(())
    }

    /// Make `follower` mirror `leader`'s drag moves.
    pub fn link(&mut self, leader: ElementId, follower: ElementId) -> Result<(), SceneError> {
        self.entry(leader)?;
        let (_, element) = self.entry(follower)?;
        self.links.link(leader, element);
        Ok(())
    }

    // --- listeners ------------------------------------------------------

    /// Subscribe to one event kind of one element.
    pub fn on(&mut self, id: ElementId, key: EventKey, f: impl FnMut(&ElementEvent) + 'static) {
        self.listeners
            .borrow_mut()
            .entry((id, key))
            .or_default()
            .push(Box::new(f));
    }

    /// Run once when preloading completes (immediately if it already has).
    pub fn on_ready(&mut self, f: impl Fn() + 'static) {
        let fired = self.graph.borrow().ready_fired;
        if fired {
            f();
        } else {
            self.graph.borrow_mut().on_ready.push(Rc::new(f));
        }
    }

    // --- animation ------------------------------------------------------

    /// A spec pre-filled with the stage's default duration and easing.
    pub fn tween_defaults(&self) -> TweenSpec {
        TweenSpec::new()
            .duration_ms(self.options.default_duration_ms)
            .easing(self.options.default_easing.clone())
    }

    pub fn animator(&self) -> SharedAnimator {
        self.animator.clone()
    }

    /// Tween an element's properties; the owning layer is redrawn as the
    /// tween progresses.
    pub fn animate(&mut self, id: ElementId, mut spec: TweenSpec) -> Result<TweenHandle, SceneError> {
        let (layer, element) = self.entry(id)?;
        let graph = self.graph.clone();
        let layer_name = layer.clone();
        let user = spec.on_process.take();
        spec.on_process = Some(Rc::new(move || {
            if let Some(user) = &user {
                user();
            }
            graph.borrow_mut().request_layer_update(&layer_name);
        }));
        let target: SharedTarget = element;
        let handle = Animator::animate(&self.animator, &target, spec)?;
        // Zero-duration tweens apply synchronously and never process.
        self.graph.borrow_mut().request_layer_update(&layer);
        Ok(handle)
    }

    /// Move an element toward `target` at `speed` canvas units per second.
    /// `Moving` events carry the per-tick delta and `MoveEnd` fires on
    /// arrival; returns whether a tween is actually running (a zero-distance
    /// move completes on the spot).
    pub fn move_element(
        &mut self,
        id: ElementId,
        target: Point,
        speed: f64,
    ) -> Result<bool, SceneError> {
        let (layer, element) = self.entry(id)?;
        let graph = self.graph.clone();
        let listeners = self.listeners.clone();
        let end_listeners = self.listeners.clone();
        let elem = element.clone();
        let last = Cell::new(element.borrow().shape().origin());
        let spec = TweenSpec::new()
            .on_process(move || {
                let now = elem.borrow().shape().origin();
                let delta = last.get().diff(now);
                last.set(now);
                fire(&listeners, id, &ElementEvent::Moving(delta));
                graph.borrow_mut().request_layer_update(&layer);
            })
            .on_finish(move || {
                fire(&end_listeners, id, &ElementEvent::MoveEnd);
            });
        let animated = self.moveable.move_to(
            id,
            &element,
            &self.animator,
            target,
            speed,
            self.options.default_easing.clone(),
            spec,
        );
        if !animated {
            // Snapped into place without a tween.
            if let Some((layer, _)) = self.elements.get(&id) {
                let layer = layer.clone();
                self.graph.borrow_mut().request_layer_update(&layer);
            }
        }
        Ok(animated)
    }

    pub fn stop_move(&mut self, id: ElementId) -> bool {
        self.moveable.stop(id)
    }

    // --- input ----------------------------------------------------------

    /// Feed one raw pointer event through the router and every behavior,
    /// then fire listeners. Returns the full dispatch list (router synthesis
    /// plus behavior follow-ups) for callers that want to observe it.
    pub fn pointer_event(&mut self, event: MouseEvent) -> Vec<Dispatch> {
        let mut dispatches = self.mouse.route(&event);
        let pointer = self.mouse.position();
        let in_canvas = self.mouse.in_canvas();

        let status = self.clickable.apply(&dispatches);
        let drag = self.drag.apply(&dispatches, pointer);
        self.links.apply(&drag);
        let drops = self.drops.apply(&drag, pointer, in_canvas);
        dispatches.extend(status);
        dispatches.extend(drag);
        dispatches.extend(drops);

        // Anything that changed on-screen state dirties the owning layer.
        for d in &dispatches {
            if matches!(
                d.event,
                ElementEvent::StatusChanged | ElementEvent::MoveDrag(_)
            ) {
                if let Some((layer, _)) = self.elements.get(&d.target) {
                    let layer = layer.clone();
                    self.graph.borrow_mut().request_layer_update(&layer);
                }
            }
        }
        for d in &dispatches {
            fire(&self.listeners, d.target, &d.event);
        }
        dispatches
    }

    /// Feed one raw keyboard event. Returns the routed event and whether the
    /// embedder should prevent the default action.
    pub fn key_event(&mut self, input: KeyInput) -> (KeyEvent, bool) {
        self.keyboard.route(input)
    }

    pub fn set_prevent(&mut self, prevent: PreventList) {
        self.keyboard.set_prevent(prevent);
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.input.borrow().is_key_down(key)
    }

    pub fn any_key_down(&self) -> bool {
        self.input.borrow().any_key_down()
    }

    pub fn mouse_position(&self) -> Point {
        self.mouse.position()
    }

    // --- preloading -----------------------------------------------------

    pub fn register_image(&mut self, key: &str) {
        self.graph.borrow_mut().preloader.register(key);
    }

    pub fn image_loaded(&mut self, key: &str, handle: ImageHandle) -> Result<(), SceneError> {
        self.graph.borrow_mut().preloader.mark_loaded(key, handle)
    }

    pub fn image_failed(&mut self, key: &str) -> Result<(), SceneError> {
        self.graph.borrow_mut().preloader.mark_failed(key)
    }

    pub fn image_aborted(&mut self, key: &str) -> Result<(), SceneError> {
        self.graph.borrow_mut().preloader.mark_aborted(key)
    }

    pub fn image(&self, key: &str) -> Result<ImageHandle, SceneError> {
        self.graph.borrow().preloader.image(key)
    }

    pub fn is_ready(&self) -> bool {
        self.graph.borrow().preloader.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::input_state::MouseButton;
    use tela_geometry::Rect;
    use tela_surface::RecordingSurface;

    fn stage() -> (Stage, ManualClock) {
        let clock = ManualClock::new();
        let screen = RecordingSurface::new(Size::new(200.0, 200.0));
        let stage = Stage::with_clock(
            Box::new(screen),
            StageOptions::default(),
            Box::new(clock.clone()),
        );
        (stage, clock)
    }

    fn rect_at(p: Point) -> ShapeElement {
        ShapeElement::new(Box::new(Rect::with_size(p, Size::new(10.0, 10.0))))
            .with_fill(Color::rgb(255, 0, 0))
    }

    #[test]
    fn test_options_from_config() {
        let mut config = TelaConfig::default();
        config.stage.clear_color = Some("#102030".to_string());
        config.input.prevent_keys = vec!["space".to_string(), "nosuchkey".to_string()];
        config.animation.easing = "sine-out".to_string();
        let options = StageOptions::from_config(&config).unwrap();
        assert_eq!(options.clear, ClearMode::Color(Color::rgb(0x10, 0x20, 0x30)));
        assert!(matches!(&options.prevent, PreventList::Keys(k) if k.len() == 1));

        config.animation.easing = "wobble".to_string();
        assert!(matches!(
            StageOptions::from_config(&config),
            Err(SceneError::UnknownTimingFunction(_))
        ));

        config.animation.easing = "linear".to_string();
        config.stage.clear = false;
        let options = StageOptions::from_config(&config).unwrap();
        assert_eq!(options.clear, ClearMode::None);
    }

    #[test]
    fn test_auto_start_registers_frame_tasks() {
        let (mut stage, _clock) = stage();
        assert_eq!(stage.invoker_mut().task_count(), 2);
        // Delay floor follows the configured fps.
        let delay = stage.tick();
        assert!(delay >= 1000.0 / 30.0 - 1e-9);
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let (mut stage, _clock) = stage();
        stage.create_layer("bg").unwrap();
        assert!(matches!(
            stage.create_layer("bg"),
            Err(SceneError::LayerExists(_))
        ));
        assert!(matches!(
            stage.set_layer_z("nope", 1),
            Err(SceneError::UnknownLayer(_))
        ));
    }

    #[test]
    fn test_set_layer_z_keeps_ranking_dense() {
        let (mut stage, _clock) = stage();
        for name in ["a", "b", "c", "d"] {
            stage.create_layer(name).unwrap();
        }
        // Root main=1, then a=2 b=3 c=4 d=5; move a to the top.
        stage.set_layer_z("a", 5).unwrap();
        let z = |stage: &Stage, name: &str| stage.layer(name, |l| l.z()).unwrap();
        assert_eq!(
            (
                z(&stage, "main"),
                z(&stage, "a"),
                z(&stage, "b"),
                z(&stage, "c"),
                z(&stage, "d")
            ),
            (1, 5, 2, 3, 4)
        );
        // And back down: everything stays a permutation of 1..=5.
        stage.set_layer_z("a", 2).unwrap();
        let mut all = [
            z(&stage, "main"),
            z(&stage, "a"),
            z(&stage, "b"),
            z(&stage, "c"),
            z(&stage, "d"),
        ];
        all.sort();
        assert_eq!(all, [1, 2, 3, 4, 5]);
        assert_eq!(z(&stage, "a"), 2);
        // Out-of-range requests clamp.
        stage.set_layer_z("a", 99).unwrap();
        assert_eq!(z(&stage, "a"), 5);
    }

    #[test]
    fn test_create_layer_with_explicit_z() {
        let (mut stage, _clock) = stage();
        stage.create_layer("top").unwrap();
        stage
            .create_layer_with(
                "under",
                LayerOptions {
                    z: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        let z = |name: &str| stage.layer(name, |l| l.z()).unwrap();
        // The new layer takes z 1; main and top each shift up a slot.
        assert_eq!((z("under"), z("main"), z("top")), (1, 2, 3));
    }

    #[test]
    fn test_cover_z_tops_every_layer() {
        let (mut stage, _clock) = stage();
        assert_eq!(stage.cover_z(), 101); // root layer at z 1
        stage.create_layer("a").unwrap();
        stage.create_layer("b").unwrap();
        assert_eq!(stage.cover_z(), 103);
    }

    #[test]
    fn test_animate_marks_layer_dirty() {
        let (mut stage, clock) = stage();
        let id = stage.add_element("main", rect_at(Point::ZERO)).unwrap();
        stage.tick(); // consume the initial dirty flag
        assert!(!stage.layer("main", |l| l.needs_redraw()).unwrap());

        stage
            .animate(id, TweenSpec::new().prop("x", 100.0).duration_ms(100.0))
            .unwrap();
        assert!(stage.layer("main", |l| l.needs_redraw()).unwrap());
        clock.advance(50.0);
        stage.tick();
        let x = stage.element(id).unwrap().borrow().shape().origin().x;
        assert!((x - 50.0).abs() < 1e-9);
        // The render pass consumed the flag, the animation re-marked it.
        clock.advance(50.0);
        stage.tick();
        let x = stage.element(id).unwrap().borrow().shape().origin().x;
        assert!((x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_animate_unknown_element() {
        let (mut stage, _clock) = stage();
        assert!(matches!(
            stage.animate(77, TweenSpec::new().prop("x", 1.0)),
            Err(SceneError::UnknownElement(77))
        ));
    }

    #[test]
    fn test_click_pipeline_reaches_listener() {
        let (mut stage, _clock) = stage();
        let id = stage.add_element("main", rect_at(Point::ZERO)).unwrap();
        stage.make_clickable(id).unwrap();
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        stage.on(id, EventKey::Click, move |_| c.set(c.get() + 1));

        stage.pointer_event(MouseEvent::down(Point::new(5.0, 5.0), MouseButton::Left));
        assert!(stage.element(id).unwrap().borrow().active);
        stage.pointer_event(MouseEvent::up(Point::new(5.0, 5.0), MouseButton::Left));
        assert_eq!(clicks.get(), 1);
        assert!(!stage.element(id).unwrap().borrow().active);
    }

    #[test]
    fn test_drag_and_drop_pipeline() {
        let (mut stage, _clock) = stage();
        let piece = stage.add_element("main", rect_at(Point::ZERO)).unwrap();
        let zone = stage
            .add_element("main", rect_at(Point::new(100.0, 100.0)))
            .unwrap();
        stage.make_draggable(piece).unwrap();
        stage.make_droppable(piece, zone).unwrap();
        let dropped = Rc::new(RefCell::new(None));
        let d = dropped.clone();
        stage.on(piece, EventKey::Dropped, move |e| {
            if let ElementEvent::Dropped(zone) = e {
                *d.borrow_mut() = Some(*zone);
            }
        });

        stage.tick();
        assert!(!stage.layer("main", |l| l.needs_redraw()).unwrap());
        stage.pointer_event(MouseEvent::down(Point::new(5.0, 5.0), MouseButton::Left));
        stage.pointer_event(MouseEvent::moved(Point::new(105.0, 105.0)));
        // Dragging moved the shape and dirtied the layer.
        assert_eq!(
            stage.element(piece).unwrap().borrow().shape().origin(),
            Point::new(100.0, 100.0)
        );
        assert!(stage.layer("main", |l| l.needs_redraw()).unwrap());
        stage.pointer_event(MouseEvent::up(Point::new(105.0, 105.0), MouseButton::Left));
        assert_eq!(*dropped.borrow(), Some(Some(zone)));
    }

    #[test]
    fn test_move_element_events() {
        let (mut stage, clock) = stage();
        let id = stage.add_element("main", rect_at(Point::ZERO)).unwrap();
        let moved = Rc::new(Cell::new(0.0));
        let ended = Rc::new(Cell::new(false));
        let m = moved.clone();
        let e = ended.clone();
        stage.on(id, EventKey::Moving, move |event| {
            if let ElementEvent::Moving(delta) = event {
                m.set(m.get() + delta.x);
            }
        });
        stage.on(id, EventKey::MoveEnd, move |_| e.set(true));

        // 100 units at 200 units/s: half a second.
        assert!(stage.move_element(id, Point::new(100.0, 0.0), 200.0).unwrap());
        clock.advance(250.0);
        stage.tick();
        clock.advance(250.0);
        stage.tick();
        stage.tick(); // deferred finish pass
        assert!((moved.get() - 100.0).abs() < 1e-9);
        assert!(ended.get());
        assert_eq!(
            stage.element(id).unwrap().borrow().shape().origin(),
            Point::new(100.0, 0.0)
        );
    }

    #[test]
    fn test_move_element_zero_distance_snaps() {
        let (mut stage, _clock) = stage();
        let id = stage.add_element("main", rect_at(Point::new(5.0, 5.0))).unwrap();
        let ended = Rc::new(Cell::new(false));
        let e = ended.clone();
        stage.on(id, EventKey::MoveEnd, move |_| e.set(true));
        assert!(!stage.move_element(id, Point::new(5.0, 5.0), 100.0).unwrap());
        assert!(ended.get());
    }

    #[test]
    fn test_remove_element_detaches_everything() {
        let (mut stage, _clock) = stage();
        let id = stage.add_element("main", rect_at(Point::ZERO)).unwrap();
        stage.make_clickable(id).unwrap();
        stage.on(id, EventKey::Click, |_| {});
        stage.remove_element(id).unwrap();
        assert!(matches!(
            stage.element(id),
            Err(SceneError::UnknownElement(_))
        ));
        assert_eq!(stage.layer("main", |l| l.element_count()).unwrap(), 0);
        let d = stage.pointer_event(MouseEvent::moved(Point::new(5.0, 5.0)));
        assert!(d.is_empty());
        assert!(matches!(
            stage.remove_element(id),
            Err(SceneError::UnknownElement(_))
        ));
    }

    #[test]
    fn test_preloader_gates_readiness() {
        let (mut stage, _clock) = stage();
        stage.register_image("hero");
        assert!(!stage.is_ready());
        let ready = Rc::new(Cell::new(false));
        let r = ready.clone();
        stage.on_ready(move || r.set(true));
        stage.tick();
        assert!(!ready.get());
        stage
            .image_loaded(
                "hero",
                ImageHandle {
                    id: 1,
                    width: 32.0,
                    height: 32.0,
                },
            )
            .unwrap();
        stage.tick();
        assert!(ready.get());
        // Late subscribers fire immediately.
        let late = Rc::new(Cell::new(false));
        let l = late.clone();
        stage.on_ready(move || l.set(true));
        assert!(late.get());
    }

    #[test]
    fn test_key_event_updates_shared_state() {
        let (mut stage, _clock) = stage();
        stage.set_prevent(PreventList::All);
        let (event, prevent) = stage.key_event(KeyInput {
            key: Key::Space,
            action: crate::keyboard::KeyAction::Down,
        });
        assert_eq!(event, KeyEvent::Pressed(Key::Space));
        assert!(prevent);
        assert!(stage.is_key_down(Key::Space));
    }
}
