//! The play scene: spawning, per-frame driving and restart
//!
//! The arena owns the physics world, the rocket, the obstacles and the
//! deferred-action queue. Nothing here is shared between entities; all
//! interaction goes through contacts reported by the physics step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::EffectPool;
use super::events::GameEvent;
use super::input::{DeviceSnapshot, InputSample};
use super::obstacle::{Obstacle, ObstacleId};
use super::outline::{BASE_ROCK_RADIUS, VariantCatalog};
use super::physics::{BodyDesc, Contact, Physics, SurfaceTag};
use super::player::{GameOverReport, PlayerController};
use super::timer::DeferredQueue;
use crate::highscore::{self, ScoreStore};
use crate::settings::Settings;
use crate::ui::HudView;

/// Actions resumed on a later frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Undo an obstacle's wall boost
    EndBoost(ObstacleId),
    /// Take the rocket wreck out of the scene
    RemovePlayer,
}

pub struct Arena<P: Physics, S: ScoreStore> {
    settings: Settings,
    rng: Pcg32,
    physics: P,
    store: S,
    catalog: VariantCatalog,
    obstacles: Vec<Obstacle>,
    player: Option<PlayerController>,
    timers: DeferredQueue<Deferred>,
    effects: EffectPool,
    events: Vec<GameEvent>,
    /// Real seconds since the arena was created
    real_time: f64,
    last_game_over: Option<GameOverReport>,
    next_id: u32,
    restarts: u32,
}

impl<P: Physics, S: ScoreStore> Arena<P, S> {
    /// Build the variant catalog from `seed` and load the first scene
    pub fn new(seed: u64, settings: Settings, physics: P, store: S) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let catalog = VariantCatalog::procedural(&mut rng, settings.obstacle.variants_per_category);

        let mut arena = Self {
            settings,
            rng,
            physics,
            store,
            catalog,
            obstacles: Vec::new(),
            player: None,
            timers: DeferredQueue::new(),
            effects: EffectPool::new(),
            events: Vec::new(),
            real_time: 0.0,
            last_game_over: None,
            next_id: 1,
            restarts: 0,
        };
        arena.load_scene();
        arena
    }

    fn load_scene(&mut self) {
        self.physics.set_boundaries_enabled(true);

        let player_body = self.physics.create_body(BodyDesc::new(
            Vec2::ZERO,
            self.settings.player.radius,
            SurfaceTag::Player,
        ));
        self.player = Some(PlayerController::new(
            Some(player_body),
            self.settings.player.clone(),
            &self.store,
        ));

        for _ in 0..self.settings.arena.obstacle_count {
            let pos = self.random_spawn_point();
            self.spawn_obstacle(pos);
        }

        log::info!(
            "Scene loaded: {} obstacles, best score {}",
            self.obstacles.len(),
            highscore::best_score(&self.store)
        );
    }

    /// Random point inside the walls, away from the rocket
    fn random_spawn_point(&mut self) -> Vec2 {
        let half = self.settings.arena.half_extents - Vec2::splat(BASE_ROCK_RADIUS * 2.0);
        let half = half.max(Vec2::splat(0.1));
        let safe = self.settings.arena.spawn_safe_radius;
        let player_pos = self.player_position();

        let mut pos = half;
        for _ in 0..16 {
            pos = Vec2::new(
                self.rng.random_range(-half.x..=half.x),
                self.rng.random_range(-half.y..=half.y),
            );
            if pos.distance(player_pos) >= safe {
                return pos;
            }
        }
        // Crowded arena: push the last pick out to the safe ring
        player_pos + (pos - player_pos).normalize_or(Vec2::X) * safe
    }

    fn allocate_id(&mut self) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a body at `pos` and a fully configured obstacle on it
    pub fn spawn_obstacle(&mut self, pos: Vec2) -> ObstacleId {
        let id = self.allocate_id();
        let body = self
            .physics
            .create_body(BodyDesc::new(pos, BASE_ROCK_RADIUS, SurfaceTag::Obstacle));
        let mut obstacle = Obstacle::new(id, Some(body), true);
        obstacle.activate(
            &mut self.rng,
            &self.catalog,
            &self.settings.obstacle,
            &mut self.physics,
        );
        self.obstacles.push(obstacle);
        id
    }

    /// Spawn an obstacle with missing collaborators; it configures what it
    /// can and otherwise stays inert
    pub fn spawn_inert_obstacle(&mut self, pos: Vec2, with_body: bool, with_sprite: bool) -> ObstacleId {
        let id = self.allocate_id();
        let body = with_body.then(|| {
            self.physics
                .create_body(BodyDesc::new(pos, BASE_ROCK_RADIUS, SurfaceTag::Obstacle))
        });
        let mut obstacle = Obstacle::new(id, body, with_sprite);
        obstacle.activate(
            &mut self.rng,
            &self.catalog,
            &self.settings.obstacle,
            &mut self.physics,
        );
        self.obstacles.push(obstacle);
        id
    }

    /// Remove an obstacle, cancelling its pending boost expiry
    pub fn despawn_obstacle(&mut self, id: ObstacleId) -> bool {
        let Some(index) = self.obstacles.iter().position(|o| o.id() == id) else {
            return false;
        };
        let mut obstacle = self.obstacles.remove(index);
        obstacle.cancel_boost(&mut self.timers);
        if let Some(body) = obstacle.body() {
            self.physics.remove_body(body);
        }
        true
    }

    /// Advance one frame.
    ///
    /// `dt` drives the simulation; `real_dt` drives boost expiry, the wreck
    /// removal delay and effect lifetimes.
    pub fn tick(&mut self, devices: &DeviceSnapshot, dt: f32, real_dt: f64) {
        self.events.clear();

        let sample = InputSample::resolve(
            devices,
            self.player_position(),
            self.settings.player.deadzone,
        );
        if let Some(player) = &mut self.player {
            player.update(dt, &sample, &mut self.physics, &mut self.events);
        }

        let contacts = self.physics.step(dt);

        // Timers started by this frame's contacts count from its end
        let real_dt = real_dt.max(0.0);
        self.real_time += real_dt;
        for contact in &contacts {
            self.dispatch_contact(contact);
        }

        self.run_deferred();
        self.effects.tick(real_dt as f32);
        self.cull_escaped();
    }

    fn dispatch_contact(&mut self, contact: &Contact) {
        if let Some(player) = self
            .player
            .as_mut()
            .filter(|p| p.body() == Some(contact.body))
        {
            if let Some(report) = player.on_collision(
                contact,
                &mut self.physics,
                &mut self.store,
                &mut self.effects,
                &mut self.events,
            ) {
                let due = self.real_time + player.removal_delay() as f64;
                self.timers.schedule(due, Deferred::RemovePlayer);
                self.last_game_over = Some(report);
            }
            return;
        }

        if let Some(obstacle) = self
            .obstacles
            .iter_mut()
            .find(|o| o.body() == Some(contact.body))
        {
            obstacle.on_collision(
                contact,
                self.real_time,
                &self.settings.obstacle,
                &mut self.physics,
                &mut self.timers,
                &mut self.effects,
                &mut self.events,
            );
        }
    }

    fn run_deferred(&mut self) {
        while let Some(action) = self.timers.pop_due(self.real_time) {
            match action {
                Deferred::EndBoost(id) => {
                    // Unknown ids belong to obstacles already gone
                    if let Some(obstacle) = self.obstacles.iter_mut().find(|o| o.id() == id) {
                        obstacle.end_boost(
                            &self.settings.obstacle,
                            &mut self.physics,
                            &mut self.events,
                        );
                    }
                }
                Deferred::RemovePlayer => {
                    if let Some(body) = self.player.take().and_then(|p| p.body()) {
                        self.physics.remove_body(body);
                    }
                    self.events.push(GameEvent::PlayerRemoved);
                }
            }
        }
    }

    /// Despawn obstacles that drifted past the walls
    fn cull_escaped(&mut self) {
        let limit = self.settings.arena.half_extents + Vec2::splat(self.settings.arena.cull_margin);
        let escaped: Vec<ObstacleId> = self
            .obstacles
            .iter()
            .filter_map(|o| {
                let pos = o.position(&self.physics)?;
                (pos.x.abs() > limit.x || pos.y.abs() > limit.y).then_some(o.id())
            })
            .collect();
        for id in escaped {
            log::debug!("Obstacle {id:?} left the arena");
            self.despawn_obstacle(id);
        }
    }

    /// Reload the scene: fresh rocket and obstacles, walls back on
    pub fn restart(&mut self) {
        let ids: Vec<ObstacleId> = self.obstacles.iter().map(Obstacle::id).collect();
        for id in ids {
            self.despawn_obstacle(id);
        }
        if let Some(body) = self.player.take().and_then(|p| p.body()) {
            self.physics.remove_body(body);
        }
        self.timers.clear();
        self.effects.clear();
        self.events.clear();
        self.last_game_over = None;
        self.restarts += 1;

        log::info!("Restarting scene (restart #{})", self.restarts);
        self.load_scene();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    pub fn player(&self) -> Option<&PlayerController> {
        self.player.as_ref()
    }

    pub fn player_position(&self) -> Vec2 {
        self.player
            .as_ref()
            .map_or(Vec2::ZERO, |p| p.position(&self.physics))
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id() == id)
    }

    pub fn effects(&self) -> &EffectPool {
        &self.effects
    }

    /// Events raised during the last tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand the last tick's events to the caller
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_actions(&self) -> usize {
        self.timers.len()
    }

    pub fn real_time(&self) -> f64 {
        self.real_time
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn last_game_over(&self) -> Option<GameOverReport> {
        self.last_game_over
    }

    /// What the HUD should currently show
    pub fn hud_view(&self) -> HudView {
        match (&self.player, self.last_game_over) {
            (Some(player), _) if player.is_alive() => HudView {
                score: player.score(),
                best: player.best_score(),
                restart_visible: false,
            },
            (_, Some(report)) => HudView {
                score: report.score,
                best: report.best,
                restart_visible: true,
            },
            _ => HudView {
                score: 0,
                best: highscore::best_score(&self.store),
                restart_visible: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HIGH_SCORE_KEY;
    use crate::highscore::MemoryStore;
    use crate::sim::input::{ButtonState, GamepadState, PointerState};
    use crate::sim::physics::SimplePhysics;

    const DT: f32 = 1.0 / 60.0;

    fn arena_with(count: usize) -> Arena<SimplePhysics, MemoryStore> {
        let mut settings = Settings::default();
        settings.arena.obstacle_count = count;
        let physics = SimplePhysics::new(settings.arena.half_extents);
        Arena::new(7, settings, physics, MemoryStore::new())
    }

    /// Tick with no input, collecting every event raised
    fn idle(arena: &mut Arena<SimplePhysics, MemoryStore>, frames: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
            events.extend_from_slice(arena.events());
        }
        events
    }

    #[test]
    fn test_scene_spawns_configured_obstacles() {
        let arena = arena_with(12);
        assert_eq!(arena.obstacles().len(), 12);
        assert!(arena.player().is_some_and(|p| p.is_alive()));
        let safe = arena.settings().arena.spawn_safe_radius;
        for obstacle in arena.obstacles() {
            assert!(obstacle.category().is_some());
            assert!(obstacle.variant().is_some());
            let pos = obstacle.position(arena.physics()).unwrap();
            assert!(pos.length() >= safe);
        }
    }

    #[test]
    fn test_wall_boost_expires_on_real_time() {
        let mut arena = arena_with(0);
        let half = arena.settings().arena.half_extents;
        let id = arena.spawn_obstacle(Vec2::new(half.x - 1.5, 0.0));
        let body = arena.obstacle(id).unwrap().body().unwrap();
        arena.physics_mut().set_linear_velocity(body, Vec2::new(2.0, 0.0));

        let mut boosted_at = None;
        for frame in 0..120 {
            arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
            if arena.events().contains(&GameEvent::ObstacleBoosted(id)) {
                boosted_at = Some(frame);
                break;
            }
        }
        assert!(boosted_at.is_some());
        assert!(arena.obstacle(id).unwrap().is_boosting());
        let speed = arena.physics().linear_velocity(body).length();
        assert!((speed - 4.0).abs() < 1e-3);
        assert_eq!(arena.effects().len(), 1);

        let events = idle(&mut arena, 61);
        assert!(events.contains(&GameEvent::BoostEnded(id)));
        assert!(!arena.obstacle(id).unwrap().is_boosting());
        let speed = arena.physics().linear_velocity(body).length();
        assert!((speed - 2.0).abs() < 1e-3);
        assert!(arena.effects().is_empty());
    }

    #[test]
    fn test_despawn_cancels_pending_boost() {
        let mut arena = arena_with(0);
        let half = arena.settings().arena.half_extents;
        let id = arena.spawn_obstacle(Vec2::new(half.x - 1.5, 0.0));
        let body = arena.obstacle(id).unwrap().body().unwrap();
        arena.physics_mut().set_linear_velocity(body, Vec2::new(2.0, 0.0));

        for _ in 0..120 {
            arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
            if arena.obstacle(id).unwrap().is_boosting() {
                break;
            }
        }
        assert_eq!(arena.pending_actions(), 1);

        assert!(arena.despawn_obstacle(id));
        assert_eq!(arena.pending_actions(), 0);
        assert!(!arena.physics().contains(body));

        let events = idle(&mut arena, 120);
        assert!(events.iter().all(|e| !matches!(e, GameEvent::BoostEnded(_))));
    }

    #[test]
    fn test_contact_kills_player_once() {
        let mut arena = arena_with(0);
        arena.store.set_int(HIGH_SCORE_KEY, 0);
        idle(&mut arena, 60);

        let rock = arena.spawn_obstacle(Vec2::new(0.3, 0.0));
        arena.tick(&DeviceSnapshot::default(), DT, DT as f64);

        let player = arena.player().unwrap();
        assert!(!player.is_alive());
        assert!(!arena.physics().boundaries_enabled());
        let game_overs = arena
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        let report = arena.last_game_over().unwrap();
        assert!(report.new_best);
        assert_eq!(highscore::best_score(arena.store()), report.score);
        assert!(arena.hud_view().restart_visible);

        // Another hit on the wreck changes nothing
        let body = arena.player().unwrap().body().unwrap();
        arena.physics_mut().set_body_enabled(body, true);
        let rock_body = arena.obstacle(rock).map(|o| o.body().unwrap());
        if let Some(rock_body) = rock_body {
            let pos = arena.physics().position(body);
            arena.physics_mut().set_position(rock_body, pos);
        }
        arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
        assert!(
            arena
                .events()
                .iter()
                .all(|e| !matches!(e, GameEvent::GameOver { .. } | GameEvent::PlaySound(_)))
        );
        assert_eq!(arena.store().flush_count(), 1);
    }

    #[test]
    fn test_wreck_removed_after_delay() {
        let mut arena = arena_with(0);
        arena.spawn_obstacle(Vec2::new(0.3, 0.0));
        arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
        assert!(arena.player().is_some_and(|p| !p.is_alive()));

        let delay = arena.settings().player.removal_delay;
        let frames = (delay / DT).ceil() as usize + 1;
        let mut removed = false;
        for _ in 0..frames {
            arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
            removed |= arena.events().contains(&GameEvent::PlayerRemoved);
        }
        assert!(removed);
        assert!(arena.player().is_none());
        assert_eq!(arena.physics().body_count(), arena.obstacles().len());
        assert!(arena.hud_view().restart_visible);
    }

    #[test]
    fn test_escaped_obstacles_are_culled() {
        let mut arena = arena_with(0);
        let id = arena.spawn_obstacle(Vec2::new(2.0, 2.0));
        arena.physics_mut().set_boundaries_enabled(false);
        let body = arena.obstacle(id).unwrap().body().unwrap();
        let far = arena.settings().arena.half_extents + Vec2::splat(10.0);
        arena.physics_mut().set_position(body, far);

        arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
        assert!(arena.obstacle(id).is_none());
        assert!(!arena.physics().contains(body));
    }

    #[test]
    fn test_restart_reloads_scene() {
        let mut arena = arena_with(5);
        let id = arena.spawn_obstacle(Vec2::ZERO);
        arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
        assert!(arena.player().is_some_and(|p| !p.is_alive()));
        assert!(arena.obstacle(id).is_some());

        arena.restart();
        assert_eq!(arena.restarts(), 1);
        assert!(arena.player().is_some_and(|p| p.is_alive()));
        assert!(arena.physics().boundaries_enabled());
        assert_eq!(arena.obstacles().len(), 5);
        assert_eq!(arena.pending_actions(), 0);
        assert!(!arena.hud_view().restart_visible);
        // Player plus fresh obstacles
        assert_eq!(arena.physics().body_count(), 6);
    }

    #[test]
    fn test_restarts_reuse_physics_slots() {
        let mut arena = arena_with(12);
        let slots = arena.physics().slot_count();
        assert_eq!(slots, 13);
        for _ in 0..200 {
            arena.restart();
        }
        assert_eq!(arena.physics().body_count(), 13);
        assert_eq!(arena.physics().slot_count(), slots);
    }

    #[test]
    fn test_boost_lasts_full_duration_in_frames() {
        let mut arena = arena_with(0);
        let half = arena.settings().arena.half_extents;
        let id = arena.spawn_obstacle(Vec2::new(half.x - 1.5, 0.0));
        let body = arena.obstacle(id).unwrap().body().unwrap();
        arena.physics_mut().set_linear_velocity(body, Vec2::new(2.0, 0.0));

        for _ in 0..120 {
            arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
            if arena.obstacle(id).unwrap().is_boosting() {
                break;
            }
        }
        assert!(arena.obstacle(id).unwrap().is_boosting());

        // One second at 60 Hz: 60 boosted steps, ending on the 60th frame
        let mut frames = 0;
        while arena.obstacle(id).unwrap().is_boosting() && frames < 120 {
            arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
            frames += 1;
        }
        assert_eq!(frames, 60);
    }

    #[test]
    fn test_negative_real_dt_does_not_extend_effects() {
        let mut arena = arena_with(0);
        arena.spawn_obstacle(Vec2::new(0.3, 0.0));
        arena.tick(&DeviceSnapshot::default(), DT, DT as f64);
        assert_eq!(arena.effects().len(), 1);
        let remaining = arena.effects().iter().next().unwrap().remaining;

        arena.tick(&DeviceSnapshot::default(), DT, -5.0);
        let after = arena.effects().iter().next().unwrap().remaining;
        assert_eq!(after, remaining);
        assert!(arena.real_time() > 0.0);
    }

    #[test]
    fn test_stick_heading_wins_over_pointer() {
        let mut arena = arena_with(0);
        let devices = DeviceSnapshot {
            gamepad: Some(GamepadState {
                stick: Vec2::new(-0.8, 0.0),
                south: ButtonState::press(),
            }),
            pointer: Some(PointerState {
                world_pos: Vec2::new(0.0, 4.0),
                primary: ButtonState::idle(),
            }),
        };
        arena.tick(&devices, DT, DT as f64);
        let player = arena.player().unwrap();
        assert_eq!(player.heading(), Vec2::NEG_X);
        assert!(arena.physics().linear_velocity(player.body().unwrap()).x < 0.0);
        assert!(arena.events().contains(&GameEvent::Flame(true)));
    }

    #[test]
    fn test_inert_obstacles_do_not_break_the_loop() {
        let mut arena = arena_with(0);
        let bodiless = arena.spawn_inert_obstacle(Vec2::new(4.0, 3.0), false, true);
        let spriteless = arena.spawn_inert_obstacle(Vec2::new(-4.0, -3.0), true, false);

        idle(&mut arena, 30);
        let bodiless = arena.obstacle(bodiless).unwrap();
        assert!(bodiless.category().is_none());
        assert!(bodiless.position(arena.physics()).is_none());
        let spriteless = arena.obstacle(spriteless).unwrap();
        assert!(spriteless.category().is_some());
        assert_eq!(spriteless.scale(), 1.0);
    }

    #[test]
    fn test_score_accrues_with_simulation_time() {
        let mut arena = arena_with(0);
        for _ in 0..4 {
            arena.tick(&DeviceSnapshot::default(), 0.25, 0.25);
        }
        assert_eq!(arena.hud_view().score, 10);
        assert!(!arena.hud_view().restart_visible);
    }
}
