//! # Navigation Agent
//!
//! A kinematic stand-in for an engine navmesh agent: straight-line motion
//! toward a destination at constant speed, halting inside the stopping
//! distance. The decision engine only depends on this surface (destination,
//! remaining distance, reset), so a real navigation backend can replace it
//! without touching the decisions.

use crate::map::grid::WorldPos;
use serde::{Deserialize, Serialize};

/// Kinematic navigation state for one villager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavAgent {
    /// Current position on the ground plane.
    pub position: WorldPos,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Halt once within this distance of the destination.
    pub stopping_distance: f32,
    destination: Option<WorldPos>,
}

impl NavAgent {
    /// Creates an agent standing still at a position.
    pub fn new(position: WorldPos, speed: f32) -> Self {
        Self {
            position,
            speed,
            stopping_distance: 0.5,
            destination: None,
        }
    }

    /// Starts moving toward a destination.
    pub fn set_destination(&mut self, destination: WorldPos, stopping_distance: f32) {
        self.destination = Some(destination);
        self.stopping_distance = stopping_distance;
    }

    /// Current destination, if moving.
    pub fn destination(&self) -> Option<WorldPos> {
        self.destination
    }

    /// Abandons the current destination.
    pub fn reset_path(&mut self) {
        self.destination = None;
    }

    /// Distance left to the destination, or infinity when idle.
    pub fn remaining_distance(&self) -> f32 {
        match self.destination {
            Some(dest) => self.position.distance(dest),
            None => f32::INFINITY,
        }
    }

    /// Whether the agent has reached (or never had) a destination.
    pub fn arrived(&self) -> bool {
        match self.destination {
            Some(_) => self.remaining_distance() <= self.stopping_distance,
            None => true,
        }
    }

    /// Advances motion by a time step, halting inside the stopping
    /// distance.
    pub fn advance(&mut self, dt: f32) {
        let Some(dest) = self.destination else {
            return;
        };
        let remaining = self.position.distance(dest);
        if remaining <= self.stopping_distance {
            return;
        }

        let step = self.speed * dt;
        if step >= remaining - self.stopping_distance {
            // Land exactly on the stopping ring, never overshoot.
            let t = (remaining - self.stopping_distance) / remaining;
            self.position = self.position.lerp(dest, t);
        } else {
            let t = step / remaining;
            self.position = self.position.lerp(dest, t);
        }
    }
}
