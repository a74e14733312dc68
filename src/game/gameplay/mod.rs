/// Gameplay reactions to the simulation: damage, deaths, projectiles,
/// powerups and the pursuer spawner. Everything runs in `SimSet::Gameplay`
/// after steering and headings.

mod components;
mod events;
mod health;
mod powerups;
mod projectiles;
mod spawner;

#[cfg(test)]
mod tests;

use bevy::prelude::*;
use crate::game::simulation::physics::update_headings;
use crate::game::simulation::{ClockId, SimScheduleExt, SimSet};

pub use components::{
    Dead, DespawnTimed, Experience, Health, PowerCollector, Powerup, Projectile, Regeneration, Shooter,
};
pub use events::{DeathEvent, LevelUpEvent};
pub use health::spawn_powerup;
pub use projectiles::spawn_projectile;
pub use spawner::{pursuer_bundle, PursuerSpawner};

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DeathEvent>();
        app.add_message::<LevelUpEvent>();
        app.init_resource::<PursuerSpawner>();

        app.add_ticked_sim_systems(
            SimSet::Gameplay,
            ClockId::RUNNING,
            (
                health::tick_invulnerability,
                health::apply_contact_damage,
                projectiles::projectile_hits,
                health::check_deaths,
                health::handle_deaths,
                powerups::collect_powerups,
                powerups::attract_powerups,
                health::tick_despawn_timers,
                projectiles::fire_shooters,
            )
                .chain()
                .after(update_headings),
        );

        app.add_ticked_sim_systems(
            SimSet::Gameplay,
            ClockId::INTERVAL,
            health::regenerate_health.after(health::handle_deaths),
        );

        app.add_ticked_sim_systems(SimSet::Gameplay, ClockId::MENU, health::blink_invulnerable);

        app.add_ticked_sim_systems(
            SimSet::Gameplay,
            ClockId::SPAWN,
            spawner::spawn_pursuers.after(projectiles::fire_shooters),
        );
    }
}
