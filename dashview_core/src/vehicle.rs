//! Ego vehicle state merger.
//!
//! Two producers feed the same ego entity at ~100 Hz each: the chassis
//! stream owns the dynamic driving fields and the static dimensions, the
//! localization stream owns position and heading. Each merge touches only
//! its own field subset, so the entity converges to the union of the most
//! recent message from each stream.

use crate::messages::{ChassisStatus, LocalizationEstimate, TurnSignal};
use crate::world::{Dimensions, DriveState, Shape, SimulationWorld};

/// Source of the ego vehicle's static dimensions.
///
/// Implementations must be pure: the same dimensions on every call. The
/// chassis merger re-resolves them per merge, which is then idempotent.
pub trait DimensionProvider: Send + Sync {
    fn dimensions(&self) -> Dimensions;
}

/// Fixed dimensions known at service construction.
#[derive(Debug, Clone, Copy)]
pub struct StaticDimensions(pub Dimensions);

impl DimensionProvider for StaticDimensions {
    fn dimensions(&self) -> Dimensions {
        self.0
    }
}

/// Display label for a turn-signal state.
fn signal_label(signal: TurnSignal) -> &'static str {
    match signal {
        TurnSignal::Left => "LEFT",
        TurnSignal::Right => "RIGHT",
        TurnSignal::Emergency => "EMERGENCY",
        TurnSignal::None => "NONE",
    }
}

/// Folds a chassis message into the ego entity.
///
/// Copies the four scalar fields verbatim (zero values included), refreshes
/// the static box dimensions, and maps the signal through the label table.
/// Position and heading are left untouched; they belong to localization.
pub fn merge_chassis(world: &mut SimulationWorld, chassis: &ChassisStatus, dims: Dimensions) {
    world.ego.drive = Some(DriveState {
        speed_mps: chassis.speed_mps,
        throttle_percentage: chassis.throttle_percentage,
        brake_percentage: chassis.brake_percentage,
        steering_percentage: chassis.steering_percentage,
        current_signal: signal_label(chassis.signal).to_string(),
    });
    world.ego.shape = Some(Shape::Box(dims));
    world.ego.timestamp_sec = chassis.timestamp_sec;
}

/// Folds a localization message into the ego entity.
///
/// Relocates the already-computed position and heading scalars; no
/// trigonometry happens here. The drive fields and dimensions are left
/// untouched; they belong to the chassis stream.
pub fn merge_localization(world: &mut SimulationWorld, localization: &LocalizationEstimate) {
    world.ego.position = localization.position;
    world.ego.heading = localization.heading;
    world.ego.timestamp_sec = localization.timestamp_sec;
}
