mod systems;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use systems::update_pursuit_field;

use bevy::prelude::*;
use crate::game::simulation::{ClockId, SimScheduleExt, SimSet};

/// Keeps the pursuit field centred on the player.
///
/// The field itself lives in `structures`; this plugin only schedules its
/// rebuild at the start of the gameplay phase.
pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.add_ticked_sim_systems(SimSet::Gameplay, ClockId::RUNNING, update_pursuit_field);
    }
}
