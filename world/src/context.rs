//! Per-entity view of the frame handed to every hook.

use std::collections::HashSet;

use moon_patrol_core::{Announcement, EntityId, InputCode};
use moon_patrol_system_timing::{TimerOwner, Timers};
use rand::RngCore;

use crate::Entity;

/// Shared services supplied by the caller of [`crate::Registry::tick`].
pub struct Frame<'a> {
    /// Timer service of the running game.
    pub timers: &'a mut Timers,
    /// Deterministic random source.
    pub rng: &'a mut dyn RngCore,
    /// Input codes pressed during this frame.
    pub input: &'a [InputCode],
    /// Announcement currently published by the orchestrator.
    pub announcement: Option<&'a Announcement>,
}

impl std::fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("timers", &self.timers)
            .field("input", &self.input)
            .field("announcement", &self.announcement)
            .finish_non_exhaustive()
    }
}

/// Monotonic identifier source; identifiers are never reused.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next += 1;
        id
    }
}

/// Spawn and destroy requests buffered until the next tick.
#[derive(Debug, Default)]
pub(crate) struct Requests {
    pub(crate) spawns: Vec<(EntityId, Box<dyn Entity>)>,
    pub(crate) destroys: Vec<EntityId>,
    pub(crate) game_over: bool,
}

impl Requests {
    pub(crate) fn is_spawning(&self, id: EntityId) -> bool {
        self.spawns.iter().any(|(pending, _)| *pending == id)
    }

    pub(crate) fn append(&mut self, other: Requests) {
        self.spawns.extend(other.spawns);
        self.destroys.extend(other.destroys);
    }
}

/// Services available to one entity while its hooks run.
///
/// Every mutation of the live set requested through the context is buffered
/// and applied at the start of the next tick.
pub struct FrameContext<'r, 'f> {
    id: EntityId,
    frame: &'r mut Frame<'f>,
    ids: &'r mut IdAllocator,
    requests: &'r mut Requests,
    live: &'r HashSet<EntityId>,
}

impl<'r, 'f> FrameContext<'r, 'f> {
    pub(crate) fn new(
        id: EntityId,
        frame: &'r mut Frame<'f>,
        ids: &'r mut IdAllocator,
        requests: &'r mut Requests,
        live: &'r HashSet<EntityId>,
    ) -> Self {
        Self {
            id,
            frame,
            ids,
            requests,
            live,
        }
    }

    /// Identifier of the entity whose hook is running.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Timer owner of the entity whose hook is running.
    #[must_use]
    pub fn owner(&self) -> TimerOwner {
        TimerOwner::Entity(self.id)
    }

    /// Timer service of the running game.
    pub fn timers(&mut self) -> &mut Timers {
        &mut *self.frame.timers
    }

    /// Deterministic random source.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.frame.rng
    }

    /// Input codes pressed during this frame.
    #[must_use]
    pub fn input(&self) -> &[InputCode] {
        self.frame.input
    }

    /// Reports whether `code` is pressed during this frame.
    #[must_use]
    pub fn is_pressed(&self, code: InputCode) -> bool {
        self.frame.input.contains(&code)
    }

    /// Announcement currently published by the orchestrator.
    #[must_use]
    pub fn announcement(&self) -> Option<&Announcement> {
        self.frame.announcement
    }

    /// Reports whether `id` is live or was spawned earlier in this frame.
    #[must_use]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.live.contains(&id) || self.requests.is_spawning(id)
    }

    /// Requests that `entity` joins the live set at the start of the next tick.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = self.ids.allocate();
        self.requests.spawns.push((id, entity));
        id
    }

    /// Requests removal of `id` at the start of the next tick.
    pub fn destroy(&mut self, id: EntityId) {
        self.requests.destroys.push(id);
    }

    /// Requests removal of the entity whose hook is running.
    pub fn destroy_self(&mut self) {
        let id = self.id;
        self.destroy(id);
    }

    /// Signals the orchestrator that the player has been defeated.
    pub fn raise_game_over(&mut self) {
        self.requests.game_over = true;
    }
}
