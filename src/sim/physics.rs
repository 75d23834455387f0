//! Physics port and a small reference world
//!
//! The gameplay code only talks to [`Physics`]. [`SimplePhysics`] is enough to
//! run the game headless: point bodies with bounding-circle colliders, Euler
//! integration, four axis-aligned walls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Slot index plus generation; a handle to a removed body never reaches the
/// body that later reuses its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// What a body touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceTag {
    /// Arena boundary
    Wall,
    Obstacle,
    Player,
}

/// Collision reported by [`Physics::step`], one per body involved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body: BodyHandle,
    pub surface: SurfaceTag,
    /// First contact point (world space)
    pub point: Vec2,
}

/// Initial body parameters
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub position: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub tag: SurfaceTag,
}

impl BodyDesc {
    pub fn new(position: Vec2, radius: f32, tag: SurfaceTag) -> Self {
        Self {
            position,
            radius,
            mass: 1.0,
            tag,
        }
    }
}

/// Per-body queries and commands the gameplay code needs
pub trait Physics {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn remove_body(&mut self, body: BodyHandle);

    fn position(&self, body: BodyHandle) -> Vec2;
    fn rotation(&self, body: BodyHandle) -> f32;
    fn set_rotation(&mut self, body: BodyHandle, radians: f32);

    fn linear_velocity(&self, body: BodyHandle) -> Vec2;
    fn set_linear_velocity(&mut self, body: BodyHandle, vel: Vec2);
    fn angular_velocity(&self, body: BodyHandle) -> f32;
    fn set_angular_velocity(&mut self, body: BodyHandle, omega: f32);

    /// Instant velocity change of `impulse / mass`
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2);
    /// Instant angular velocity change of `impulse / inertia`
    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: f32);
    /// Force integrated over the next step
    fn add_force(&mut self, body: BodyHandle, force: Vec2);

    /// Replace the body's collider with closed paths in local space, scaled
    fn set_collider(&mut self, body: BodyHandle, paths: &[Vec<Vec2>], scale: f32);
    /// Include or exclude the body from simulation and contacts
    fn set_body_enabled(&mut self, body: BodyHandle, enabled: bool);
    fn set_boundaries_enabled(&mut self, enabled: bool);
    fn boundaries_enabled(&self) -> bool;

    /// Advance the world and report contacts that began this step
    fn step(&mut self, dt: f32) -> Vec<Contact>;
}

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[derive(Debug, Clone)]
struct SimBody {
    pos: Vec2,
    vel: Vec2,
    rotation: f32,
    omega: f32,
    force: Vec2,
    radius: f32,
    mass: f32,
    tag: SurfaceTag,
    enabled: bool,
}

impl SimBody {
    fn inertia(&self) -> f32 {
        // Solid disc
        0.5 * self.mass * self.radius * self.radius
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    body: Option<SimBody>,
}

/// Minimal rigid-body world for headless runs and tests
#[derive(Debug, Clone)]
pub struct SimplePhysics {
    half_extents: Vec2,
    walls: bool,
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the table grows
    free: Vec<u32>,
}

impl SimplePhysics {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            half_extents,
            walls: true,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    /// Allocated slots, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.get(body).is_some()
    }

    pub fn is_body_enabled(&self, body: BodyHandle) -> bool {
        self.get(body).is_some_and(|b| b.enabled)
    }

    /// Collider radius after scaling
    pub fn radius(&self, body: BodyHandle) -> f32 {
        self.get(body).map_or(0.0, |b| b.radius)
    }

    /// Force waiting to be integrated on the next step
    pub fn pending_force(&self, body: BodyHandle) -> Vec2 {
        self.get(body).map_or(Vec2::ZERO, |b| b.force)
    }

    pub fn set_position(&mut self, body: BodyHandle, pos: Vec2) {
        if let Some(b) = self.get_mut(body) {
            b.pos = pos;
        }
    }

    fn get(&self, body: BodyHandle) -> Option<&SimBody> {
        self.slots
            .get(body.index as usize)
            .filter(|s| s.generation == body.generation)
            .and_then(|s| s.body.as_ref())
    }

    fn get_mut(&mut self, body: BodyHandle) -> Option<&mut SimBody> {
        self.slots
            .get_mut(body.index as usize)
            .filter(|s| s.generation == body.generation)
            .and_then(|s| s.body.as_mut())
    }

    fn handle_at(&self, index: usize) -> BodyHandle {
        BodyHandle::new(index as u32, self.slots[index].generation)
    }

    /// Push bodies back inside and bounce them off the walls
    fn resolve_walls(&mut self, contacts: &mut Vec<Contact>) {
        let half = self.half_extents;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let generation = slot.generation;
            let Some(body) = slot.body.as_mut().filter(|b| b.enabled) else {
                continue;
            };
            let r = body.radius;
            let mut hit: Option<(Vec2, Vec2)> = None;

            if body.pos.x + r > half.x {
                body.pos.x = half.x - r;
                hit = Some((Vec2::NEG_X, Vec2::new(half.x, body.pos.y)));
            } else if body.pos.x - r < -half.x {
                body.pos.x = -half.x + r;
                hit = Some((Vec2::X, Vec2::new(-half.x, body.pos.y)));
            }
            if let Some((normal, _)) = hit {
                if body.vel.dot(normal) < 0.0 {
                    body.vel = reflect_velocity(body.vel, normal);
                }
            }

            let mut hit_y: Option<(Vec2, Vec2)> = None;
            if body.pos.y + r > half.y {
                body.pos.y = half.y - r;
                hit_y = Some((Vec2::NEG_Y, Vec2::new(body.pos.x, half.y)));
            } else if body.pos.y - r < -half.y {
                body.pos.y = -half.y + r;
                hit_y = Some((Vec2::Y, Vec2::new(body.pos.x, -half.y)));
            }
            if let Some((normal, _)) = hit_y {
                if body.vel.dot(normal) < 0.0 {
                    body.vel = reflect_velocity(body.vel, normal);
                }
            }

            // One wall contact per body per step; the first wall touched wins
            if let Some((_, point)) = hit.or(hit_y) {
                contacts.push(Contact {
                    body: BodyHandle::new(i as u32, generation),
                    surface: SurfaceTag::Wall,
                    point,
                });
            }
        }
    }

    /// Equal-mass circle contacts between enabled bodies
    fn resolve_pairs(&mut self, contacts: &mut Vec<Contact>) {
        let n = self.slots.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (Some(a), Some(b)) = (&self.slots[i].body, &self.slots[j].body) else {
                    continue;
                };
                if !a.enabled || !b.enabled {
                    continue;
                }
                let delta = b.pos - a.pos;
                let min_dist = a.radius + b.radius;
                let dist_sq = delta.length_squared();
                if dist_sq >= min_dist * min_dist {
                    continue;
                }

                let dist = dist_sq.sqrt();
                let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
                let point = a.pos + normal * a.radius;
                let (tag_a, tag_b) = (a.tag, b.tag);
                let overlap = min_dist - dist;
                let closing = (a.vel - b.vel).dot(normal);

                if let Some(a) = self.slots[i].body.as_mut() {
                    a.pos -= normal * overlap * 0.5;
                    if closing > 0.0 {
                        a.vel -= normal * closing;
                    }
                }
                if let Some(b) = self.slots[j].body.as_mut() {
                    b.pos += normal * overlap * 0.5;
                    if closing > 0.0 {
                        b.vel += normal * closing;
                    }
                }

                contacts.push(Contact {
                    body: self.handle_at(i),
                    surface: tag_b,
                    point,
                });
                contacts.push(Contact {
                    body: self.handle_at(j),
                    surface: tag_a,
                    point,
                });
            }
        }
    }
}

impl Physics for SimplePhysics {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let body = SimBody {
            pos: desc.position,
            vel: Vec2::ZERO,
            rotation: 0.0,
            omega: 0.0,
            force: Vec2::ZERO,
            radius: desc.radius,
            mass: desc.mass.max(f32::EPSILON),
            tag: desc.tag,
            enabled: true,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle::new(index, slot.generation);
        }
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        self.handle_at(self.slots.len() - 1)
    }

    fn remove_body(&mut self, body: BodyHandle) {
        if self.get(body).is_none() {
            return;
        }
        let slot = &mut self.slots[body.index as usize];
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(body.index);
    }

    fn position(&self, body: BodyHandle) -> Vec2 {
        self.get(body).map_or(Vec2::ZERO, |b| b.pos)
    }

    fn rotation(&self, body: BodyHandle) -> f32 {
        self.get(body).map_or(0.0, |b| b.rotation)
    }

    fn set_rotation(&mut self, body: BodyHandle, radians: f32) {
        if let Some(b) = self.get_mut(body) {
            b.rotation = radians;
        }
    }

    fn linear_velocity(&self, body: BodyHandle) -> Vec2 {
        self.get(body).map_or(Vec2::ZERO, |b| b.vel)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, vel: Vec2) {
        if let Some(b) = self.get_mut(body) {
            b.vel = vel;
        }
    }

    fn angular_velocity(&self, body: BodyHandle) -> f32 {
        self.get(body).map_or(0.0, |b| b.omega)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, omega: f32) {
        if let Some(b) = self.get_mut(body) {
            b.omega = omega;
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(b) = self.get_mut(body) {
            b.vel += impulse / b.mass;
        }
    }

    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: f32) {
        if let Some(b) = self.get_mut(body) {
            let inertia = b.inertia().max(f32::EPSILON);
            b.omega += impulse / inertia;
        }
    }

    fn add_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(b) = self.get_mut(body) {
            b.force += force;
        }
    }

    fn set_collider(&mut self, body: BodyHandle, paths: &[Vec<Vec2>], scale: f32) {
        let local = paths
            .iter()
            .flatten()
            .map(|p| p.length())
            .fold(0.0, f32::max);
        if let Some(b) = self.get_mut(body) {
            if local > 0.0 {
                b.radius = local * scale;
            }
        }
    }

    fn set_body_enabled(&mut self, body: BodyHandle, enabled: bool) {
        if let Some(b) = self.get_mut(body) {
            b.enabled = enabled;
        }
    }

    fn set_boundaries_enabled(&mut self, enabled: bool) {
        self.walls = enabled;
    }

    fn boundaries_enabled(&self) -> bool {
        self.walls
    }

    fn step(&mut self, dt: f32) -> Vec<Contact> {
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if !body.enabled {
                body.force = Vec2::ZERO;
                continue;
            }
            body.vel += body.force / body.mass * dt;
            body.force = Vec2::ZERO;
            body.pos += body.vel * dt;
            body.rotation += body.omega * dt;
        }

        let mut contacts = Vec::new();
        if self.walls {
            self.resolve_walls(&mut contacts);
        }
        self.resolve_pairs(&mut contacts);
        contacts
    }
}
