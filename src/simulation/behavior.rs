use super::{Car, Point, RouteGrid};
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of re-resolving a car's anchor for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorEvent {
    /// No anchor under the car; previous route state kept.
    Unresolved,
    /// Same anchor as last tick; checkpoint is sticky.
    Unchanged,
    /// Car moved onto a new anchor and picked a fresh checkpoint (or none).
    Changed { checkpoint: Option<Point> },
}

impl AnchorEvent {
    pub fn is_changed(&self) -> bool {
        matches!(self, AnchorEvent::Changed { .. })
    }
}

/// Picks one exit uniformly at random, `None` for a dead end.
pub fn choose_checkpoint<R: Rng + ?Sized>(rng: &mut R, exits: &[Point]) -> Option<Point> {
    exits.choose(rng).copied()
}

/// Resolves the nearest anchor and, on an anchor change, selects a new
/// checkpoint from its exits. This is the only place checkpoints change.
pub fn update_route(car: &mut Car, grid: &RouteGrid) -> AnchorEvent {
    let Some(anchor) = grid.nearest_anchor(&car.position) else {
        return AnchorEvent::Unresolved;
    };
    if car.anchor == Some(anchor.id) {
        return AnchorEvent::Unchanged;
    }

    car.anchor = Some(anchor.id);
    car.checkpoint = choose_checkpoint(&mut car.rng, &anchor.exits);
    log::trace!(
        "car {} reached anchor {} ({} exits), checkpoint {:?}",
        car.id.0,
        anchor.index(),
        anchor.exits.len(),
        car.checkpoint
    );

    AnchorEvent::Changed { checkpoint: car.checkpoint }
}
