//! The arena: cargo boxes, spawn areas, and the spatial index agents sense
//! through.

use crate::simulation::agent::Agent;
use crate::simulation::genome::Category;
use crate::simulation::geometric_utils::ray_circle_entry;
use crate::simulation::steering::{RayHit, SensorQuery};
use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind as KdTreeError, KdTree};
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Type alias for the 2D KD-tree used for neighbor queries on the water
/// plane.
pub type Tree2D = KdTree<f32, usize, Vec<f32>>;

/// Result of a spatial radius query: (`distance_squared`, index) pairs.
pub type SpatialQueryResult = Vec<(f32, usize)>;

/// A floating cargo box, worth points to whoever reaches it first.
#[derive(Debug, Clone)]
pub struct CargoBox {
    /// Where the box floats.
    pub pos: Array1<f32>,
    /// Set once an agent has collected it.
    pub claimed: bool,
}

impl CargoBox {
    /// Creates an unclaimed box at a position.
    pub fn new(pos: Array1<f32>) -> Self {
        Self {
            pos,
            claimed: false,
        }
    }

    /// Takes the box off the water.
    pub fn claim(&mut self) {
        self.claimed = true;
    }
}

/// An axis-aligned patch of water that things spawn into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    /// Center of the patch.
    pub center: [f32; 3],
    /// Half-size of the patch along each axis.
    pub extents: [f32; 3],
    /// How many things to scatter.
    pub count: usize,
}

impl SpawnArea {
    /// Draws `count` uniform positions inside the patch.
    ///
    /// Positions keep the center's vertical component; only the horizontal
    /// plane is randomized.
    pub fn scatter(&self, rng: &mut impl Rng) -> Vec<Array1<f32>> {
        (0..self.count)
            .map(|_| {
                let x = jitter(rng, self.center[0], self.extents[0]);
                let z = jitter(rng, self.center[2], self.extents[2]);
                Array1::from_vec(vec![x, self.center[1], z])
            })
            .collect()
    }
}

fn jitter(rng: &mut impl Rng, center: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.random_range(center - extent..center + extent)
    } else {
        center
    }
}

/// KD-trees over the occupants of the arena, rebuilt every tick.
///
/// Claimed boxes and non-active agents are left out, so queries only ever
/// return things that are actually on the water.
pub struct ArenaIndex {
    boxes: Tree2D,
    agents: Tree2D,
}

impl ArenaIndex {
    /// Builds the index from the current occupants.
    ///
    /// # Arguments
    ///
    /// * `boxes` - All cargo boxes, claimed ones are skipped
    /// * `agents` - All agents, only active ones are indexed
    ///
    /// # Returns
    ///
    /// The index, or an error if tree building fails.
    pub fn build(boxes: &[CargoBox], agents: &[Agent]) -> Result<Self, KdTreeError> {
        let mut box_tree = KdTree::with_capacity(2, boxes.len().max(1));
        for (i, cargo) in boxes.iter().enumerate() {
            if !cargo.claimed {
                box_tree.add(plane_coords(&cargo.pos), i)?;
            }
        }
        let mut agent_tree = KdTree::with_capacity(2, agents.len().max(1));
        for (i, agent) in agents.iter().enumerate() {
            if agent.is_active() {
                agent_tree.add(plane_coords(&agent.pos), i)?;
            }
        }
        Ok(Self {
            boxes: box_tree,
            agents: agent_tree,
        })
    }

    /// Query unclaimed boxes within a radius.
    pub fn query_boxes(&self, pos: &Array1<f32>, radius: f32) -> SpatialQueryResult {
        self.boxes
            .within(&plane_coords(pos), radius.powi(2), &squared_euclidean)
            .unwrap_or_default()
            .into_iter()
            .map(|(dist, &idx)| (dist, idx))
            .collect()
    }

    /// Query active agents within a radius.
    pub fn query_agents(&self, pos: &Array1<f32>, radius: f32) -> SpatialQueryResult {
        self.agents
            .within(&plane_coords(pos), radius.powi(2), &squared_euclidean)
            .unwrap_or_default()
            .into_iter()
            .map(|(dist, &idx)| (dist, idx))
            .collect()
    }
}

fn plane_coords(pos: &Array1<f32>) -> Vec<f32> {
    vec![pos[0], pos[2]]
}

/// One agent's sensory window onto the arena.
///
/// Borrows the tick-start snapshot of the occupants plus the index over them,
/// and excludes the viewing agent from its own sightings.
pub struct ArenaView<'a> {
    boxes: &'a [CargoBox],
    agents: &'a [Agent],
    index: &'a ArenaIndex,
    body_radius: f32,
    viewer: usize,
}

impl<'a> ArenaView<'a> {
    /// Creates the view for agent `viewer`.
    pub fn new(
        boxes: &'a [CargoBox],
        agents: &'a [Agent],
        index: &'a ArenaIndex,
        body_radius: f32,
        viewer: usize,
    ) -> Self {
        Self {
            boxes,
            agents,
            index,
            body_radius,
            viewer,
        }
    }
}

impl SensorQuery for ArenaView<'_> {
    /// Casts a flat ray and reports the nearest occupant it enters.
    ///
    /// Occupants are circles of `body_radius` on the water plane; the
    /// reported distance is to the near face, not the center. The KD-tree
    /// prefilter covers the whole ray length plus one body radius, which is
    /// as far away as the center of a touched occupant can sit.
    fn raycast(
        &self,
        origin: &Array1<f32>,
        direction: &Array1<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        let reach = max_distance + self.body_radius;
        let mut nearest: Option<RayHit> = None;

        for (_, i) in self.index.query_boxes(origin, reach) {
            if let Some(distance) = ray_circle_entry(
                origin,
                direction,
                &self.boxes[i].pos,
                self.body_radius,
                max_distance,
            ) {
                if nearest.as_ref().map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(RayHit {
                        distance,
                        category: Category::CargoBox,
                    });
                }
            }
        }

        for (_, i) in self.index.query_agents(origin, reach) {
            if i == self.viewer {
                continue;
            }
            if let Some(distance) = ray_circle_entry(
                origin,
                direction,
                &self.agents[i].pos,
                self.body_radius,
                max_distance,
            ) {
                if nearest.as_ref().map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(RayHit {
                        distance,
                        category: self.agents[i].species.category(),
                    });
                }
            }
        }

        nearest
    }
}
