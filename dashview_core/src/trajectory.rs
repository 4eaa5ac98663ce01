//! Trajectory downsampler - dense planned paths to renderable waypoints.
//!
//! Planners emit tens to hundreds of near-collinear points per cycle;
//! shipping them all to a browser is wasted bandwidth and draw calls.
//! Each planning message therefore replaces the world's trajectory with a
//! small strided selection, each waypoint carrying an orientation and a
//! vehicle-silhouette footprint for client-side rendering.

use nalgebra::{Rotation2, Vector2};
use tracing::trace;

use crate::messages::{PathPoint, PlanningTrajectory};
use crate::world::{Dimensions, Entity, EntityKind, Point2, Shape, SimulationWorld};

/// Picks the input indices that survive downsampling.
///
/// Every `stride`-th index is taken while it falls before the final
/// input point, then the second-to-last index is pinned onto the end so
/// the tail of the path is always represented (skipped when the stride
/// already landed on it). Paths of at most `stride + 1` points collapse
/// to just the pinned index; paths of fewer than two points vanish.
fn select_indices(n: usize, stride: usize) -> Vec<usize> {
    let stride = stride.max(1);
    if n <= 1 {
        return Vec::new();
    }
    if n <= stride + 1 {
        return vec![n - 2];
    }

    let mut picked = Vec::with_capacity((n - 1) / stride + 2);
    let mut i = 0;
    while i < n - 1 {
        picked.push(i);
        i += stride;
    }
    if picked.last() != Some(&(n - 2)) {
        picked.push(n - 2);
    }
    picked
}

/// Bearing of the segment from `a` to `b`, radians.
fn bearing(a: PathPoint, b: PathPoint) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Four-corner vehicle silhouette centered on `position`, rotated to
/// `heading` and sized from the ego vehicle's static dimensions.
fn footprint(position: Point2, heading: f64, dims: Dimensions) -> Vec<Point2> {
    let rotation = Rotation2::new(heading);
    let half_length = dims.length / 2.0;
    let half_width = dims.width / 2.0;

    [
        (half_length, half_width),
        (-half_length, half_width),
        (-half_length, -half_width),
        (half_length, -half_width),
    ]
    .iter()
    .map(|&(dx, dy)| {
        let corner = rotation * Vector2::new(dx, dy);
        Point2::new(position.x + corner.x, position.y + corner.y)
    })
    .collect()
}

/// Replaces the world's trajectory with a downsampled rendering of the
/// planned path.
///
/// Every waypoint but the last is oriented toward the next selected
/// point; the last extrapolates forward along the bearing from its
/// predecessor (or toward the raw final input point when it is the only
/// selection).
pub fn downsample_trajectory(
    world: &mut SimulationWorld,
    trajectory: &PlanningTrajectory,
    stride: usize,
    ego_dims: Dimensions,
) {
    let points = &trajectory.points;
    let selected = select_indices(points.len(), stride);
    trace!(
        input = points.len(),
        output = selected.len(),
        "downsampled planning trajectory"
    );

    let mut waypoints = Vec::with_capacity(selected.len());
    for (rank, &index) in selected.iter().enumerate() {
        let heading = if rank + 1 < selected.len() {
            bearing(points[index], points[selected[rank + 1]])
        } else if rank > 0 {
            bearing(points[selected[rank - 1]], points[index])
        } else {
            // Lone survivor of a short path: orient toward the raw
            // final input point, which always exists here.
            bearing(points[index], points[points.len() - 1])
        };

        let position = Point2::new(points[index].x, points[index].y);
        waypoints.push(Entity {
            kind: EntityKind::Waypoint,
            position,
            heading,
            shape: Some(Shape::Polygon(footprint(position, heading, ego_dims))),
            timestamp_sec: trajectory.timestamp_sec,
            ..Entity::default()
        });
    }

    world.trajectory = waypoints;
}
