//! Interaction gate: which message boundaries hold playback.

use std::collections::BTreeMap;

use tracing::warn;

use super::message::InteractionPoint;

/// Lookup of interaction points by the message index they follow.
#[derive(Debug, Clone, Default)]
pub struct InteractionGate {
    points: BTreeMap<usize, InteractionPoint>,
}

impl InteractionGate {
    /// Builds a gate from `points`, keeping the first point registered at any
    /// index. Points past the end of the queue are kept but can never fire.
    #[must_use]
    pub fn new(points: Vec<InteractionPoint>, message_count: usize) -> Self {
        let mut gate: BTreeMap<usize, InteractionPoint> = BTreeMap::new();
        for point in points {
            if point.after_message_index >= message_count {
                warn!(
                    interaction_id = %point.id,
                    after_message_index = point.after_message_index,
                    message_count,
                    "interaction point is beyond the message queue and will never trigger"
                );
            }
            if let Some(existing) = gate.get(&point.after_message_index) {
                warn!(
                    interaction_id = %point.id,
                    kept = %existing.id,
                    after_message_index = point.after_message_index,
                    "duplicate interaction point ignored"
                );
                continue;
            }
            gate.insert(point.after_message_index, point);
        }
        Self { points: gate }
    }

    /// Returns the point that blocks after message `index`, if any.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&InteractionPoint> {
        self.points.get(&index)
    }

    /// Looks a point up by its id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&InteractionPoint> {
        self.points.values().find(|point| point.id == id)
    }

    /// Number of registered points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
