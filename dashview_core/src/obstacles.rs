//! Obstacle ingestor - perception batches into the world's object list.
//!
//! Perception is a full-frame sensor: every batch describes the complete
//! set of currently-perceived objects, so ingestion replaces the world's
//! obstacle list wholesale. Tracking continuity across frames is the
//! producer's job, carried by stable obstacle ids.

use tracing::trace;

use crate::messages::{ObstacleType, PerceptionBatch, PerceptionObstacle};
use crate::world::{Dimensions, Entity, EntityKind, Shape, SimulationWorld};

/// Maps a perception classification onto a renderable entity kind.
fn entity_kind(obstacle_type: ObstacleType) -> EntityKind {
    match obstacle_type {
        ObstacleType::Unknown => EntityKind::Unknown,
        ObstacleType::UnknownMovable => EntityKind::UnknownMovable,
        ObstacleType::UnknownUnmovable => EntityKind::UnknownUnmovable,
        ObstacleType::Pedestrian => EntityKind::Pedestrian,
        ObstacleType::Bicycle => EntityKind::Bicycle,
        ObstacleType::Vehicle => EntityKind::Vehicle,
    }
}

/// Converts one perceived obstacle into a snapshot entity.
///
/// A source polygon wins over the box fields: when boundary points are
/// present they are copied verbatim and position/heading stay at zero;
/// otherwise the oriented-box fields are taken and no polygon exists.
fn ingest_one(obstacle: &PerceptionObstacle) -> Entity {
    let mut entity = Entity {
        id: obstacle.id.to_string(),
        kind: entity_kind(obstacle.obstacle_type),
        timestamp_sec: obstacle.timestamp_sec,
        ..Entity::default()
    };

    if !obstacle.polygon.is_empty() {
        entity.shape = Some(Shape::Polygon(obstacle.polygon.clone()));
    } else {
        entity.position = obstacle.position;
        entity.heading = obstacle.theta;
        entity.shape = Some(Shape::Box(Dimensions::new(
            obstacle.length,
            obstacle.width,
            obstacle.height,
        )));
    }

    entity
}

/// Replaces the world's obstacle list with the given perception batch,
/// preserving batch order.
pub fn ingest_obstacles(world: &mut SimulationWorld, batch: &PerceptionBatch) {
    world.obstacles = batch.obstacles.iter().map(ingest_one).collect();
    trace!(count = world.obstacles.len(), "ingested perception batch");
}
