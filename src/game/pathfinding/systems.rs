use bevy::prelude::*;
use horde_macros::profile;

use crate::game::simulation::{Collider, PursuitField, Scenery, SimConfig, SimGlobalTransform, SimTick};
use crate::game::structures::FlowField;
use crate::game::unit::{Player, Pursuer};

/// Recenter the pursuit field on the player and rebuild it.
///
/// Scenery blocks the cells its shape covers; every pursuer adds crowding to
/// its own cell so later arrivals route around packs.
#[profile(2)]
pub fn update_pursuit_field(
    mut field: ResMut<PursuitField>,
    player: Query<&SimGlobalTransform, With<Player>>,
    scenery: Query<(&SimGlobalTransform, &Collider), With<Scenery>>,
    pursuers: Query<&SimGlobalTransform, With<Pursuer>>,
    sim_config: Res<SimConfig>,
    tick: Res<SimTick>,
) {
    let Ok(player_transform) = player.single() else {
        return;
    };

    let field = &mut field.0;
    if field.cell_size() != sim_config.flow_cell_size || field.side_width() != sim_config.flow_side_width {
        info!(
            "[PURSUIT_FIELD] Resizing to {} cells of {}",
            sim_config.flow_side_width, sim_config.flow_cell_size
        );
        *field = FlowField::new(sim_config.flow_cell_size, sim_config.flow_side_width);
    }

    field.reset(player_transform.position());

    let mut blocked = 0;
    for (transform, collider) in scenery.iter() {
        blocked += field.block_shape(transform.position(), &collider.shape);
    }

    let mut crowded = 0;
    if sim_config.crowd_weight > 0 {
        for transform in pursuers.iter() {
            field.add_crowding(transform.position(), sim_config.crowd_weight);
            crowded += 1;
        }
    }

    field.regenerate();

    if tick.0 % 100 == 0 {
        debug!(
            "[PURSUIT_FIELD] origin {:?} | blocked cells: {} | crowding sources: {}",
            field.origin(),
            blocked,
            crowded
        );
    }
}
