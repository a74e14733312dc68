mod components;
mod steering;
mod visuals;

use bevy::prelude::*;
use crate::game::pathfinding::update_pursuit_field;
use crate::game::simulation::physics::update_headings;
use crate::game::simulation::{ClockId, SimScheduleExt, SimSet};

// Re-export public types
pub use components::{Player, Pursuer};
pub use steering::{desired_velocity, steer_pursuers, PursuitParams};

use visuals::{spawn_collider_visuals, sync_visuals};

/// Plugin that steers pursuers toward the player.
pub struct UnitPlugin;

impl Plugin for UnitPlugin {
    fn build(&self, app: &mut App) {
        // Steering reads this step's field and grid, and feeds next step's integration
        app.add_ticked_sim_systems(
            SimSet::Gameplay,
            ClockId::RUNNING,
            steer_pursuers.after(update_pursuit_field).before(update_headings),
        );
    }
}

/// Sprites for colliders. Needs the render plugins.
pub struct UnitVisualsPlugin;

impl Plugin for UnitVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (spawn_collider_visuals, sync_visuals).chain());
    }
}
