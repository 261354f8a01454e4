//! Exhaustive pairwise collision detection over the collidables of a frame.

use std::collections::HashSet;

use glam::Vec2;
use moon_patrol_core::{EntityId, EntityKind, Rect, SimulationError};

use crate::{
    context::{Frame, FrameContext, IdAllocator, Requests},
    Slot,
};

/// Description of the other participant handed to a collision reaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionPeer {
    /// Identifier of the other entity.
    pub id: EntityId,
    /// Kind tag of the other entity.
    pub kind: EntityKind,
    /// Position of the other entity when the pair was tested.
    pub position: Vec2,
    /// Hitbox of the other entity when the pair was tested.
    pub rect: Rect,
}

/// Lists every unordered pair `(i, j)` with `i < j` whose rectangles overlap.
#[must_use]
pub fn overlapping_pairs(rects: &[Rect]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (first, rect) in rects.iter().enumerate() {
        for (offset, other) in rects[first + 1..].iter().enumerate() {
            if rect.intersects(other) {
                pairs.push((first, first + 1 + offset));
            }
        }
    }
    pairs
}

fn peer_of(slot: &Slot) -> Option<CollisionPeer> {
    let collidable = slot.entity.as_collidable()?;
    let position = slot.entity.body().position;
    Some(CollisionPeer {
        id: slot.id,
        kind: slot.kind,
        position,
        rect: collidable.hitbox().placed_at(position),
    })
}

/// Borrowed services needed to build a [`FrameContext`] for each reaction.
pub(crate) struct Services<'r, 'f> {
    pub(crate) frame: &'r mut Frame<'f>,
    pub(crate) ids: &'r mut IdAllocator,
    pub(crate) requests: &'r mut Requests,
    pub(crate) live: &'r HashSet<EntityId>,
}

/// Notifies both participants of every overlapping pair among `candidates`.
///
/// `candidates` indexes into `slots` in registration order. Hitboxes are
/// placed at the positions reached after every status and position update of
/// the frame. Returns the number of overlapping pairs.
pub(crate) fn resolve(
    slots: &mut [Slot],
    candidates: &[usize],
    mut services: Services<'_, '_>,
) -> Result<usize, SimulationError> {
    let mut peers = Vec::with_capacity(candidates.len());
    let mut indices = Vec::with_capacity(candidates.len());
    for &index in candidates {
        if let Some(peer) = peer_of(&slots[index]) {
            peers.push(peer);
            indices.push(index);
        }
    }

    let rects: Vec<Rect> = peers.iter().map(|peer| peer.rect).collect();
    let pairs = overlapping_pairs(&rects);
    for &(first, second) in &pairs {
        react(&mut slots[indices[first]], &peers[second], &mut services)?;
        react(&mut slots[indices[second]], &peers[first], &mut services)?;
    }
    Ok(pairs.len())
}

fn react(
    slot: &mut Slot,
    other: &CollisionPeer,
    services: &mut Services<'_, '_>,
) -> Result<(), SimulationError> {
    let Some(collidable) = slot.entity.as_collidable_mut() else {
        return Ok(());
    };
    let mut context = FrameContext::new(
        slot.id,
        &mut *services.frame,
        &mut *services.ids,
        &mut *services.requests,
        services.live,
    );
    collidable.on_collision(other, &mut context)
}
