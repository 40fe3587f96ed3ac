//! Browser bridge
//!
//! `DropGame` wraps an engine for a JavaScript page. The page passes a host
//! object whose methods receive every presenter call:
//!
//! ```js
//! const game = new DropGame(configJson, {
//!   display(entity, part) {},
//!   hide(entity, part) {},
//!   reposition(entity, part, x, y) {},
//!   setFrame(entity, part, { sheet, frame, x, y, width, height, sheetWidth, sheetHeight }) {},
//!   playSound({ cue, file, volume, pitch, restart }) {},
//!   applyVisualState(entity, part, state, on) {},
//!   dropResolved({ name, onTarget, winner, voluntary, score }) {},
//! });
//! game.start();
//! ```
//!
//! Missing host methods are skipped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::audio::SoundRequest;
use crate::config::Config;
use crate::presenter::{DropResolved, Part, Presenter, Visual, VisualState};
use crate::sim::Engine;
use crate::sprite::SpriteSheetInfo;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}

/// Presenter that forwards to methods on a JS object
pub struct JsPresenter {
    host: JsValue,
}

impl JsPresenter {
    pub fn new(host: JsValue) -> Self {
        Self { host }
    }

    fn call(&self, method: &str, args: &[JsValue]) {
        let Ok(func) = Reflect::get(&self.host, &JsValue::from_str(method)) else {
            return;
        };
        let Some(func) = func.dyn_ref::<Function>() else {
            return;
        };
        let args: Array = args.iter().collect();
        if let Err(e) = func.apply(&self.host, &args) {
            log::warn!("host.{method} threw: {:?}", e);
        }
    }

    fn visual_args(visual: Visual) -> [JsValue; 2] {
        [visual.entity.into(), part_name(visual.part).into()]
    }
}

fn part_name(part: Part) -> &'static str {
    match part {
        Part::Body => "body",
        Part::Chute => "chute",
        Part::Emote => "emote",
    }
}

/// Build a plain JS object from key/value pairs
fn object(fields: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in fields {
        let _ = Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj.into()
}

impl Presenter for JsPresenter {
    fn display(&mut self, visual: Visual) {
        self.call("display", &Self::visual_args(visual));
    }

    fn hide(&mut self, visual: Visual) {
        self.call("hide", &Self::visual_args(visual));
    }

    fn reposition(&mut self, visual: Visual, pos: Vec2) {
        let [entity, part] = Self::visual_args(visual);
        self.call("reposition", &[entity, part, pos.x.into(), pos.y.into()]);
    }

    fn set_frame(&mut self, visual: Visual, sheet: &SpriteSheetInfo, frame: u32, offset: Vec2) {
        let [entity, part] = Self::visual_args(visual);
        let size = sheet.frame_size();
        let sheet_size = sheet.sheet_size();
        let frame = object(&[
            ("sheet", sheet.tag().into()),
            ("frame", frame.into()),
            ("x", offset.x.into()),
            ("y", offset.y.into()),
            ("width", size.x.into()),
            ("height", size.y.into()),
            ("sheetWidth", sheet_size.x.into()),
            ("sheetHeight", sheet_size.y.into()),
        ]);
        self.call("setFrame", &[entity, part, frame]);
    }

    fn play_sound(&mut self, sound: &SoundRequest) {
        let request = object(&[
            ("cue", format!("{:?}", sound.cue).into()),
            ("file", sound.file.as_str().into()),
            ("volume", sound.volume.into()),
            ("pitch", sound.pitch.into()),
            ("restart", sound.restart.into()),
        ]);
        self.call("playSound", &[request]);
    }

    fn apply_visual_state(&mut self, visual: Visual, state: VisualState, on: bool) {
        let [entity, part] = Self::visual_args(visual);
        self.call("applyVisualState", &[entity, part, state.as_str().into(), on.into()]);
    }

    fn drop_resolved(&mut self, result: &DropResolved) {
        let result = object(&[
            ("name", result.name.as_str().into()),
            ("onTarget", result.on_target.into()),
            ("winner", result.winner.into()),
            ("voluntary", result.voluntary.into()),
            ("score", result.score.into()),
        ]);
        self.call("dropResolved", &[result]);
    }
}

type SharedEngine = Rc<RefCell<Engine<JsPresenter>>>;

/// Game handle exported to JavaScript
#[wasm_bindgen]
pub struct DropGame {
    engine: SharedEngine,
    running: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl DropGame {
    /// `config_json` may be empty for the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, host: JsValue) -> Result<DropGame, JsValue> {
        let config = if config_json.trim().is_empty() {
            Config::default()
        } else {
            Config::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let engine = Engine::new(config, seed(), JsPresenter::new(host))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(DropGame {
            engine: Rc::new(RefCell::new(engine)),
            running: Rc::new(Cell::new(false)),
        })
    }

    /// Drive the engine from requestAnimationFrame until `stop`
    pub fn start(&self) {
        if self.running.replace(true) {
            return;
        }
        log::info!("Parachute drop running");
        request_animation_frame(self.engine.clone(), self.running.clone());
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Advance one frame manually (for hosts running their own loop)
    pub fn frame(&self, now_ms: f64) {
        self.with_engine(|engine| engine.frame(now_ms));
    }

    pub fn spawn(&self, name: &str, emote: Option<u32>) -> bool {
        self.with_engine(|engine| engine.spawn(name, emote))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = requestCut)]
    pub fn request_cut(&self, name: &str) -> bool {
        self.with_engine(|engine| engine.request_cut(name))
            .unwrap_or(false)
    }

    pub fn abdicate(&self, name: &str) -> bool {
        self.with_engine(|engine| engine.abdicate(name))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) {
        self.with_engine(|engine| engine.set_muted(muted));
    }

    #[wasm_bindgen(js_name = setMasterVolume)]
    pub fn set_master_volume(&self, vol: f32) {
        self.with_engine(|engine| engine.set_master_volume(vol));
    }

    #[wasm_bindgen(getter)]
    pub fn suspended(&self) -> bool {
        self.engine
            .try_borrow()
            .map(|engine| engine.is_suspended())
            .unwrap_or(false)
    }

    #[wasm_bindgen(getter)]
    pub fn fps(&self) -> u32 {
        self.engine
            .try_borrow()
            .map(|engine| engine.fps())
            .unwrap_or(0)
    }

    /// Session leaderboard as a JSON array
    pub fn leaderboard(&self) -> Result<String, JsValue> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| JsValue::from_str("engine busy"))?;
        serde_json::to_string(engine.scores().entries())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl DropGame {
    /// Commands issued from inside a presenter callback would re-enter the
    /// engine; those are dropped with a warning.
    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine<JsPresenter>) -> R) -> Option<R> {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => Some(f(&mut engine)),
            Err(_) => {
                log::warn!("Engine is busy; command ignored");
                None
            }
        }
    }
}

/// Seed from wall clock mixed with the sub-ms performance timer
fn seed() -> u64 {
    let now = js_sys::Date::now() as u64;
    let fine = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| (p.now() * 1000.0) as u64)
        .unwrap_or(0);
    now ^ fine.rotate_left(32)
}

fn request_animation_frame(engine: SharedEngine, running: Rc<Cell<bool>>) {
    let Some(window) = web_sys::window() else {
        log::error!("No window; animation loop not started");
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(engine, running, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(engine: SharedEngine, running: Rc<Cell<bool>>, time: f64) {
    if !running.get() {
        return;
    }
    match engine.try_borrow_mut() {
        Ok(mut e) => e.frame(time),
        Err(_) => log::warn!("Engine is busy; frame skipped"),
    }
    request_animation_frame(engine, running);
}
