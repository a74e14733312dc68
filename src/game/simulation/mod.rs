/// Simulation layer - the fixed-step core of the game.
///
/// This module is organized into:
/// - **components**: transforms, bodies, colliders and their touch sets
/// - **resources**: config, tick counter, collision grid, pursuit field
/// - **events**: collision enter/stay/exit messages
/// - **clocks**: pausable tick sources gating systems
/// - **physics**: velocity integration and headings
/// - **transform**: hierarchy propagation
/// - **collision**: grid rebuild, parallel narrow phase, event emission
/// - **debug**: gizmo overlays (render phase only)

use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::ScheduleSystem;
use bevy::prelude::*;

use crate::game::GameState;

// Module declarations
pub mod components;
pub mod resources;
pub mod events;
pub mod clocks;
pub mod collision;
pub mod physics;
pub mod transform;
pub mod systems_config;
pub mod debug;

// Re-export commonly used items
pub use components::*;
pub use resources::*;
pub use events::*;
pub use clocks::{clock_fired, ClockId, TickSources};
pub use collision::CollisionBody;

/// Phases of one simulation step, run in this order inside `FixedUpdate`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SimSet {
    /// Integrate bodies, propagate transforms, rebuild the collision grid.
    PrePhysics,
    /// Narrow phase and positional correction.
    OnPhysics,
    /// Contact event emission.
    PostPhysics,
    /// Gameplay reactions: pathfinding, steering, health, timers.
    Gameplay,
}

/// Registration helpers for systems that belong to a simulation phase.
pub trait SimScheduleExt {
    /// Run `systems` in `phase` every step the phase runs.
    fn add_sim_systems<M>(&mut self, phase: SimSet, systems: impl IntoScheduleConfigs<ScheduleSystem, M>) -> &mut Self;

    /// Run `systems` in `phase` only on steps where `clock` fired.
    fn add_ticked_sim_systems<M>(
        &mut self,
        phase: SimSet,
        clock: ClockId,
        systems: impl IntoScheduleConfigs<ScheduleSystem, M>,
    ) -> &mut Self;
}

impl SimScheduleExt for App {
    fn add_sim_systems<M>(&mut self, phase: SimSet, systems: impl IntoScheduleConfigs<ScheduleSystem, M>) -> &mut Self {
        self.add_systems(FixedUpdate, systems.in_set(phase))
    }

    fn add_ticked_sim_systems<M>(
        &mut self,
        phase: SimSet,
        clock: ClockId,
        systems: impl IntoScheduleConfigs<ScheduleSystem, M>,
    ) -> &mut Self {
        self.add_systems(FixedUpdate, systems.in_set(phase).run_if(clock_fired(clock)))
    }
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        app.init_resource::<SimConfig>();
        app.init_resource::<SimTick>();
        app.init_resource::<TickSources>();
        app.init_resource::<CollisionGrid>();
        app.init_resource::<PursuitField>();
        app.init_resource::<DebugConfig>();

        app.add_message::<CollisionEvent>();

        app.configure_sets(FixedUpdate, (
            SimSet::PrePhysics,
            SimSet::OnPhysics,
            SimSet::PostPhysics,
            SimSet::Gameplay,
        ).chain());

        // Physics stops while paused; menu clocks keep running.
        for phase in [SimSet::PrePhysics, SimSet::OnPhysics, SimSet::PostPhysics] {
            app.configure_sets(FixedUpdate, phase.run_if(clock_fired(ClockId::RUNNING)));
        }

        app.add_systems(Startup, systems_config::init_sim_config_from_initial);

        app.add_systems(OnEnter(GameState::Running), clocks::resume_running_clock);
        app.add_systems(OnExit(GameState::Running), clocks::pause_running_clock);

        app.add_systems(FixedUpdate, (
            clocks::advance_clocks,
            clocks::increment_sim_tick.run_if(clock_fired(ClockId::RUNNING)),
        ).chain().before(SimSet::PrePhysics));

        app.add_sim_systems(SimSet::PrePhysics, (
            physics::integrate_bodies,
            transform::propagate_transforms,
            collision::rebuild_collision_grid,
        ).chain());
        app.add_sim_systems(SimSet::OnPhysics, collision::resolve_collisions);
        app.add_sim_systems(SimSet::PostPhysics, collision::emit_collision_events);
        app.add_ticked_sim_systems(SimSet::Gameplay, ClockId::RUNNING, physics::update_headings);
    }
}

/// Debug overlays. Needs the gizmo and input plugins, so it is kept apart from
/// the headless simulation.
pub struct SimDebugPlugin;

impl Plugin for SimDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            systems_config::update_sim_from_runtime_config,
            debug::toggle_debug,
            debug::draw_colliders,
            debug::draw_flow_field,
            debug::draw_spatial_hash,
        ).chain());
    }
}
