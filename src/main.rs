//! Rocket Drift headless runner
//!
//! Drives the simulation with a scripted pilot at a fixed timestep, routing
//! events to logging audio and HUD ports. Useful for soak-testing tuning
//! files without a renderer.
//!
//! Usage: `rocket-drift [settings.json] [scores.json]`

use rocket_drift::audio::{AudioManager, LogAudio};
use rocket_drift::consts::{MAX_SUBSTEPS, SIM_DT};
use rocket_drift::highscore::{JsonFileStore, MemoryStore, ScoreStore};
use rocket_drift::settings::Settings;
use rocket_drift::sim::{
    Arena, ButtonState, DeviceSnapshot, GameEvent, GamepadState, PointerState, SimplePhysics,
};
use rocket_drift::ui::{Hud, LogUi};
use rocket_drift::unit_from_angle;

/// Seconds of wall-clock time simulated per run
const RUN_SECONDS: f32 = 30.0;
/// Frame interval of the simulated display (slightly off the sim rate)
const FRAME_DT: f32 = 1.0 / 50.0;

/// Scripted input: sweeps the pointer around the rocket and pulses thrust,
/// switching to the gamepad stick for part of every cycle
struct Pilot {
    time: f32,
    was_held: bool,
}

impl Pilot {
    fn new() -> Self {
        Self {
            time: 0.0,
            was_held: false,
        }
    }

    fn next(&mut self, dt: f32, rocket: glam::Vec2) -> DeviceSnapshot {
        self.time += dt;
        let held = (self.time * 1.5).fract() < 0.4;
        let button = match (self.was_held, held) {
            (false, true) => ButtonState::press(),
            (true, true) => ButtonState::hold(),
            (true, false) => ButtonState::release(),
            (false, false) => ButtonState::idle(),
        };
        self.was_held = held;

        let aim = unit_from_angle(self.time * 0.7);
        if (self.time / 4.0).fract() < 0.5 {
            DeviceSnapshot {
                gamepad: None,
                pointer: Some(PointerState {
                    world_pos: rocket + aim * 3.0,
                    primary: button,
                }),
            }
        } else {
            DeviceSnapshot {
                gamepad: Some(GamepadState {
                    stick: aim,
                    south: button,
                }),
                pointer: None,
            }
        }
    }
}

struct Game<S: ScoreStore> {
    arena: Arena<SimplePhysics, S>,
    audio: AudioManager<LogAudio>,
    hud: Hud,
    ui: LogUi,
    pilot: Pilot,
    accumulator: f32,
    runs_left: u32,
}

impl<S: ScoreStore> Game<S> {
    fn new(seed: u64, settings: Settings, store: S) -> Self {
        let physics = SimplePhysics::new(settings.arena.half_extents);
        let audio = AudioManager::new(LogAudio, &settings.audio);
        Self {
            arena: Arena::new(seed, settings, physics, store),
            audio,
            hud: Hud::new(),
            ui: LogUi,
            pilot: Pilot::new(),
            accumulator: 0.0,
            runs_left: 1,
        }
    }

    /// Run simulation ticks for one display frame
    fn update(&mut self, frame_dt: f32) {
        let frame_dt = frame_dt.min(0.1);
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let devices = self.pilot.next(SIM_DT, self.arena.player_position());
            self.arena.tick(&devices, SIM_DT, SIM_DT as f64);
            self.accumulator -= SIM_DT;
            substeps += 1;

            let events = self.arena.take_events();
            self.audio.handle_events(&events);
            if events.contains(&GameEvent::PlayerRemoved) && self.runs_left > 0 {
                self.runs_left -= 1;
                self.arena.restart();
            }
        }

        self.hud.sync(self.arena.hud_view(), &mut self.ui);
    }
}

fn run<S: ScoreStore>(settings: Settings, store: S) {
    let seed = rand::random::<u64>();
    log::info!("Seed: {seed}");

    let mut game = Game::new(seed, settings, store);
    let frames = (RUN_SECONDS / FRAME_DT) as usize;
    for _ in 0..frames {
        game.update(FRAME_DT);
    }

    let view = game.arena.hud_view();
    log::info!(
        "Finished after {:.1}s real time: score {}, best {}, {} restart(s), {} obstacles left",
        game.arena.real_time(),
        view.score,
        view.best,
        game.arena.restarts(),
        game.arena.obstacles().len()
    );
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rocket Drift (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    match args.next() {
        Some(path) => match JsonFileStore::open(&path) {
            Ok(store) => run(settings, store),
            Err(err) => {
                log::warn!("Could not open score file {path}: {err}; scores will not persist");
                run(settings, MemoryStore::new());
            }
        },
        None => run(settings, MemoryStore::new()),
    }
}
