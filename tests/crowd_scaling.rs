/// Crowd scaling checks.
///
/// Spawns a horde around a stationary player and runs full simulation steps
/// (integration, grid rebuild, parallel narrow phase, events, pursuit field,
/// steering). Timings are printed for comparison between runs; assertions
/// only cover correctness, never wall-clock time.
///
/// The large run is ignored by default:
/// `cargo test --release --test crowd_scaling -- --ignored --nocapture`
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use horde::game::gameplay::pursuer_bundle;
use horde::game::simulation::{layers, Collider, CollisionGrid, PhysicsBody, SimConfig, SimGlobalTransform, SimTransform};
use horde::game::unit::{Player, Pursuer};
use horde::game::HordeCorePlugin;
use std::time::Instant;

fn run_crowd(count: usize, steps: usize) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.add_plugins(HordeCorePlugin);
    app.update();
    app.world_mut().resource_mut::<SimConfig>().spawn_batch = 0;

    app.world_mut().spawn((
        Player,
        SimTransform::default(),
        PhysicsBody::default().with_bounce(0.0),
        Collider::circle(16.0).with_layers(layers::PLAYER, layers::ALL),
    ));

    let config = app.world().resource::<SimConfig>().clone();
    let mut rng = fastrand::Rng::with_seed(count as u64);
    let side = (count as f32).sqrt() * config.pursuer_radius * 3.0;
    for _ in 0..count {
        let pos = Vec2::new(rng.f32() - 0.5, rng.f32() - 0.5) * side;
        app.world_mut().spawn(pursuer_bundle(pos, &config));
    }

    let start = Instant::now();
    for _ in 0..steps {
        app.world_mut().run_schedule(FixedUpdate);
    }
    let elapsed = start.elapsed();

    let grid = app.world().resource::<CollisionGrid>();
    println!(
        "{} pursuers: {:.3} ms/step | {} bodies in {} cells | {} pooled buckets",
        count,
        elapsed.as_secs_f64() * 1000.0 / steps as f64,
        grid.0.len(),
        grid.0.occupied_len(),
        grid.0.pool().pooled_buckets()
    );
    assert_eq!(grid.0.len(), count + 1);

    let mut positions = app.world_mut().query_filtered::<&SimGlobalTransform, With<Pursuer>>();
    for transform in positions.iter(app.world()) {
        assert!(transform.position().is_finite(), "pursuer position diverged");
    }
}

#[test]
fn test_crowd_of_two_thousand() {
    run_crowd(2_000, 30);
}

#[test]
#[ignore]
fn test_crowd_of_twenty_thousand() {
    run_crowd(20_000, 60);
}
