//! Humpback Voyage entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//! The page owns drawing: each frame the state snapshot is handed to
//! `window.humpbackPresent` and the HUD text is written into the DOM.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use humpback_voyage::audio::{AudioManager, SoundEffect};
    use humpback_voyage::consts::*;
    use humpback_voyage::platform::{KeyState, dev_scenario_for_key, dismisses_intro};
    use humpback_voyage::sim::{
        Anchor, GameState, Scenario, TickInput, Viewport, WhaleRole, autopilot, tick,
    };
    use humpback_voyage::{Settings, Tuning};

    #[wasm_bindgen(inline_js = "
        export function present_frame(json, flourishes) {
            if (typeof window.humpbackPresent === 'function') {
                window.humpbackPresent(json, flourishes);
            }
        }

        export function read_tuning() {
            const t = window.HUMPBACK_TUNING;
            return t ? JSON.stringify(t) : undefined;
        }
    ")]
    extern "C" {
        fn present_frame(json: &str, flourishes: bool);
        fn read_tuning() -> Option<String>;
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        audio: AudioManager,
        keys: KeyState,
        canvas: HtmlCanvasElement,
        accumulator: f32,
        last_time: f64,
        /// One-shot input collected between frames
        pending: TickInput,
        /// Idle/demo mode - the whales play themselves
        idle_mode: bool,
        last_scenario: Option<Scenario>,
    }

    impl Game {
        fn viewport(&self) -> Viewport {
            Viewport::new(
                self.canvas.client_width().max(1) as f32,
                self.canvas.client_height().max(1) as f32,
            )
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, now_ms: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let viewport = self.viewport();
                let input = if self.idle_mode {
                    let mut input = autopilot(&self.state, now_ms, viewport);
                    input.dev_scenario = self.pending.dev_scenario;
                    input
                } else {
                    TickInput {
                        now_ms,
                        viewport,
                        controls: self.keys.controls(),
                        ..std::mem::take(&mut self.pending)
                    }
                };
                tick(&mut self.state, &input);
                self.pending = TickInput::default();
                self.accumulator -= SIM_DT;
                substeps += 1;

                self.play_events();
            }
        }

        fn play_events(&self) {
            for event in &self.state.events {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect);
                }
            }
        }

        fn present(&self) {
            match self.state.snapshot_json() {
                Ok(json) => present_frame(&json, self.settings.flourishes()),
                Err(e) => log::warn!("Snapshot failed: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            if self.last_scenario != Some(self.state.scenario) {
                if let Some(el) = document.get_element_by_id("scenario-title") {
                    el.set_text_content(Some(self.state.scenario.title()));
                }
                if let Some(body) = document.body() {
                    let _ = body.set_attribute("data-scenario", &format!("{:?}", self.state.scenario));
                }
                self.last_scenario = Some(self.state.scenario);
            }

            let [primary, secondary] = self.state.hud_lines();
            set_text(document, "hud-primary", &primary);
            set_text(document, "hud-secondary", &secondary);

            set_hidden(document, "intro-card", !self.state.intro_pending);
            set_hidden(document, "mission-complete", !self.state.mission_complete);

            let slots = [
                ("bubble-primary", Anchor::Whale(WhaleRole::Primary)),
                ("bubble-secondary", Anchor::Whale(WhaleRole::Secondary)),
                ("bubble-calf", Anchor::Calf),
                ("banner", Anchor::Banner),
            ];
            for (id, anchor) in slots {
                let text = self
                    .state
                    .dialogue
                    .active()
                    .filter(|cue| cue.anchor == anchor)
                    .last()
                    .map(|cue| cue.text);
                set_text(document, id, text.unwrap_or(""));
                set_hidden(document, id, text.is_none());
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn performance_now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Humpback Voyage starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let tuning = read_tuning()
            .map(|json| Tuning::from_json_or_default(&json))
            .unwrap_or_default();
        let viewport = Viewport::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );

        let game = Rc::new(RefCell::new(Game {
            state: GameState::with_tuning(seed, viewport, performance_now(), tuning),
            audio: AudioManager::new(&settings),
            settings,
            keys: KeyState::new(),
            canvas: canvas.clone(),
            accumulator: 0.0,
            last_time: 0.0,
            pending: TickInput::default(),
            idle_mode: false,
            last_scenario: None,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        setup_pointer(&canvas, game.clone());
        setup_intro_button(&document, game.clone());
        setup_visibility(&document, game.clone());

        request_animation_frame(game);

        log::info!("Humpback Voyage running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                let key = event.key();

                if dismisses_intro(&key) && g.state.intro_pending {
                    g.pending.dismiss_intro = true;
                }
                if g.settings.dev_shortcuts {
                    if let Some(scenario) = dev_scenario_for_key(&key) {
                        g.pending.dev_scenario = Some(scenario);
                    }
                }
                if key.eq_ignore_ascii_case("i") {
                    g.idle_mode = !g.idle_mode;
                    log::info!("Idle mode: {}", g.idle_mode);
                }
                if key.eq_ignore_ascii_case("m") {
                    g.settings.muted = !g.settings.muted;
                    let settings = g.settings.clone();
                    g.audio.apply_settings(&settings);
                    settings.save();
                }
                if g.keys.press(&key) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().keys.release(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur - held keys never see their keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().keys.clear();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Pointer/touch guidance: the nearest whale swims to the tapped spot
    fn setup_pointer(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let mut g = game.borrow_mut();
            g.audio.resume();
            let rect = g.canvas.get_bounding_client_rect();
            let pos = glam::Vec2::new(
                (event.client_x() as f64 - rect.left()) as f32,
                (event.client_y() as f64 - rect.top()) as f32,
            );
            let nearest = WhaleRole::ALL
                .into_iter()
                .min_by(|a, b| {
                    let da = g.state.whale(*a).pos.distance(pos);
                    let db = g.state.whale(*b).pos.distance(pos);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(WhaleRole::Primary);
            g.pending.targets[nearest.index()] = Some(pos);
        });
        let _ = canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_intro_button(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("intro-start") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.pending.dismiss_intro = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_visibility(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            let mut g = game.borrow_mut();
            if g.settings.mute_on_blur {
                g.audio.set_suspended(hidden);
            }
            if hidden {
                g.keys.clear();
            }
            // Don't replay the time spent hidden
            g.last_time = 0.0;
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.present();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless demo: the autopilot plays the whole voyage and logs the milestones
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use humpback_voyage::consts::TICK_MS;
    use humpback_voyage::sim::{GameEvent, GameState, Viewport, autopilot, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2024);
    log::info!("Humpback Voyage (native) starting with seed {}", seed);
    log::info!("Native mode runs the autopilot headless - serve the wasm build for the game");

    let viewport = Viewport::default();
    let mut state = GameState::new(seed, viewport, 0.0);
    let mut now = 0.0;
    let mut ticks_since_birth = 0;

    for _ in 0..60_000 {
        now += TICK_MS as f64;
        let input = autopilot(&state, now, viewport);
        tick(&mut state, &input);

        for event in &state.events {
            match event {
                GameEvent::ScenarioEntered(scenario) => {
                    println!("[{:>7.1}s] Entered {}", now / 1000.0, scenario.title());
                }
                GameEvent::MissionComplete(scenario) => {
                    println!("[{:>7.1}s] Mission complete in {}", now / 1000.0, scenario.title());
                }
                GameEvent::CalfBorn => println!("[{:>7.1}s] A calf is born!", now / 1000.0),
                _ => {}
            }
        }

        if state.calf.is_some() {
            ticks_since_birth += 1;
            if ticks_since_birth > 600 {
                break;
            }
        }
    }

    for line in state.hud_lines() {
        println!("{}", line);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
