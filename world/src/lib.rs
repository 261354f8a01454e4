#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative live-entity state for Moon Patrol.
//!
//! The [`Registry`] owns every simulated entity. Spawn and destroy requests
//! are buffered and applied at the start of the next [`Registry::tick`], so
//! each entity observes a stable live set while its own hooks run. A tick
//! dispatches, in registration order, the status update, the position update
//! of movable entities and the draw hook, then resolves collisions between
//! every pair of collidable entities.

mod collision;
mod context;

use std::collections::HashSet;

use glam::Vec2;
use moon_patrol_core::{Canvas, EntityId, EntityKind, Hitbox, SimulationError};
use moon_patrol_system_timing::TimerOwner;

pub use collision::{overlapping_pairs, CollisionPeer};
pub use context::{Frame, FrameContext};

use context::{IdAllocator, Requests};

/// Spatial state shared by every entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Top-left corner in arena pixels; `(0, 0)` is the top-left of the arena.
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Uniform drawing scale.
    pub scale: f32,
    /// Distance travelled per frame.
    pub speed: f32,
}

impl Body {
    /// Creates an unrotated body at native scale.
    #[must_use]
    pub const fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: 1.0,
            speed,
        }
    }

    /// Replaces the drawing scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Simulated object managed by the [`Registry`].
///
/// Capabilities are exposed through the `as_*` accessors. The registry probes
/// them once when the entity joins the live set; a kind must answer the same
/// way for its whole lifetime.
pub trait Entity: std::fmt::Debug {
    /// Kind tag used by collision reactions and diagnostics.
    fn kind(&self) -> EntityKind;

    /// Spatial state of the entity.
    fn body(&self) -> &Body;

    /// Mutable spatial state of the entity.
    fn body_mut(&mut self) -> &mut Body;

    /// Advances internal state; runs first every frame.
    fn update_status(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Emits draw calls for the entity.
    fn draw(&self, canvas: &mut dyn Canvas);

    /// Movable capability, when the kind has one.
    fn as_movable_mut(&mut self) -> Option<&mut dyn Movable> {
        None
    }

    /// Collidable capability, when the kind has one.
    fn as_collidable(&self) -> Option<&dyn Collidable> {
        None
    }

    /// Mutable collidable capability, when the kind has one.
    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        None
    }
}

/// Capability of entities that advance their own position each frame.
///
/// Movable entities are never shifted by [`Registry::move_world`].
pub trait Movable {
    /// Advances the position; runs after the status update and before drawing.
    fn update_position(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError>;
}

/// Capability of entities that take part in collision detection.
pub trait Collidable {
    /// Hitbox relative to the entity's position; fixed at construction.
    fn hitbox(&self) -> Hitbox;

    /// Reacts to an overlap with `other` detected this frame.
    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError>;
}

#[derive(Debug)]
struct Slot {
    id: EntityId,
    kind: EntityKind,
    movable: bool,
    collidable: bool,
    entity: Box<dyn Entity>,
}

impl Slot {
    fn new(id: EntityId, mut entity: Box<dyn Entity>) -> Self {
        let movable = entity.as_movable_mut().is_some();
        let collidable = entity.as_collidable().is_some();
        Self {
            id,
            kind: entity.kind(),
            movable,
            collidable,
            entity,
        }
    }
}

/// Outcome of a single [`Registry::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Number of live entities dispatched this tick.
    pub live: usize,
    /// Number of overlapping collidable pairs.
    pub collisions: usize,
    /// Whether a hook raised the game-over flag.
    pub game_over_raised: bool,
}

/// Owner of the live entity set.
#[derive(Debug)]
pub struct Registry {
    cap: usize,
    slots: Vec<Slot>,
    live: HashSet<EntityId>,
    ids: IdAllocator,
    pending: Requests,
}

impl Registry {
    /// Creates an empty registry that fails once more than `cap` entities are live.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            slots: Vec::new(),
            live: HashSet::new(),
            ids: IdAllocator::default(),
            pending: Requests::default(),
        }
    }

    /// Buffers `entity` for insertion at the start of the next tick.
    pub fn add(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = self.ids.allocate();
        log::trace!("queued {} {id}", entity.kind());
        self.pending.spawns.push((id, entity));
        id
    }

    /// Buffers removal of `id` for the start of the next tick.
    ///
    /// Ids that are neither live nor pending are ignored.
    pub fn remove(&mut self, id: EntityId) {
        if !self.live.contains(&id) && !self.pending.is_spawning(id) {
            log::debug!("ignoring removal of {id}: not live");
            return;
        }
        self.pending.destroys.push(id);
    }

    /// Buffers removal of every live and pending entity not listed in `keep`.
    pub fn destroy_all_except(&mut self, keep: &[EntityId]) {
        let doomed: Vec<EntityId> = self
            .slots
            .iter()
            .map(|slot| slot.id)
            .chain(self.pending.spawns.iter().map(|(id, _)| *id))
            .filter(|id| !keep.contains(id))
            .collect();
        log::trace!("queued teardown of {} entities", doomed.len());
        self.pending.destroys.extend(doomed);
    }

    /// Shifts every live entity without the movable capability.
    pub fn move_world(&mut self, shift: Vec2) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.movable) {
            slot.entity.body_mut().position += shift;
        }
    }

    /// Applies buffered requests, then dispatches every hook for one frame.
    ///
    /// Fails with [`SimulationError::TooManyEntities`] when applying the
    /// buffers leaves more than the cap live; no hook runs in that case.
    pub fn tick(
        &mut self,
        frame: &mut Frame<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<TickReport, SimulationError> {
        self.apply_pending(frame);
        if self.slots.len() > self.cap {
            log::error!(
                "live entity count {} exceeds the cap of {}",
                self.slots.len(),
                self.cap
            );
            return Err(SimulationError::TooManyEntities {
                count: self.slots.len(),
                cap: self.cap,
            });
        }

        let mut requests = Requests::default();
        let mut candidates = Vec::new();
        let Self {
            slots, live, ids, ..
        } = self;

        for (index, slot) in slots.iter_mut().enumerate() {
            let mut ctx = FrameContext::new(slot.id, frame, ids, &mut requests, live);
            slot.entity.update_status(&mut ctx)?;
            if slot.movable {
                if let Some(movable) = slot.entity.as_movable_mut() {
                    movable.update_position(&mut ctx)?;
                }
            }
            slot.entity.draw(canvas);
            if slot.collidable {
                candidates.push(index);
            }
        }

        let collisions = collision::resolve(
            slots,
            &candidates,
            collision::Services {
                frame,
                ids,
                requests: &mut requests,
                live,
            },
        )?;

        let report = TickReport {
            live: slots.len(),
            collisions,
            game_over_raised: requests.game_over,
        };
        self.pending.append(requests);
        Ok(report)
    }

    fn apply_pending(&mut self, frame: &mut Frame<'_>) {
        let spawns = std::mem::take(&mut self.pending.spawns);
        let destroys = std::mem::take(&mut self.pending.destroys);
        if !spawns.is_empty() || !destroys.is_empty() {
            log::trace!(
                "applying {} spawns and {} destroys",
                spawns.len(),
                destroys.len()
            );
        }

        for (id, entity) in spawns {
            let _ = self.live.insert(id);
            self.slots.push(Slot::new(id, entity));
        }

        let doomed: HashSet<EntityId> = destroys.into_iter().collect();
        if doomed.is_empty() {
            return;
        }
        self.slots.retain(|slot| !doomed.contains(&slot.id));
        for id in doomed {
            if self.live.remove(&id) {
                let _ = frame.timers.forget_owner(TimerOwner::Entity(id));
            } else {
                log::debug!("ignoring removal of {id}: already gone");
            }
        }
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of spawn and destroy requests waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.spawns.len() + self.pending.destroys.len()
    }

    /// Reports whether `id` is part of the live set.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    /// Live entity registered under `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.entity.as_ref())
    }

    /// Configured cap on live entities.
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }
}

/// Read-only views over the live set.
pub mod query {
    use glam::Vec2;
    use moon_patrol_core::{EntityId, EntityKind, Rect};

    use crate::Registry;

    /// Immutable representation of a live entity.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EntitySnapshot {
        /// Identifier of the entity.
        pub id: EntityId,
        /// Kind tag of the entity.
        pub kind: EntityKind,
        /// Position of the entity.
        pub position: Vec2,
        /// Placed hitbox for collidable entities.
        pub hitbox: Option<Rect>,
    }

    /// Captures every live entity in registration order.
    #[must_use]
    pub fn snapshots(registry: &Registry) -> Vec<EntitySnapshot> {
        registry
            .slots
            .iter()
            .map(|slot| {
                let position = slot.entity.body().position;
                EntitySnapshot {
                    id: slot.id,
                    kind: slot.kind,
                    position,
                    hitbox: slot
                        .entity
                        .as_collidable()
                        .map(|collidable| collidable.hitbox().placed_at(position)),
                }
            })
            .collect()
    }

    /// Identifiers of the live entities in registration order.
    #[must_use]
    pub fn ids(registry: &Registry) -> Vec<EntityId> {
        registry.slots.iter().map(|slot| slot.id).collect()
    }

    /// Number of live entities of `kind`.
    #[must_use]
    pub fn count_of(registry: &Registry, kind: EntityKind) -> usize {
        registry
            .slots
            .iter()
            .filter(|slot| slot.kind == kind)
            .count()
    }
}
