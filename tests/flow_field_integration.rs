use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use horde::game::HordeCorePlugin;
use horde::game::simulation::{
    layers, Collider, PhysicsBody, PursuitField, Scenery, SimConfig, SimGlobalTransform, SimTransform,
};
use horde::game::geometry::ColliderShape;
use horde::game::unit::{Player, Pursuer};

fn core_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.add_plugins(HordeCorePlugin);
    app.update();
    app.world_mut().resource_mut::<SimConfig>().spawn_batch = 0;
    app
}

fn step(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn spawn_player(app: &mut App, position: Vec2) -> Entity {
    app.world_mut().spawn((
        Player,
        SimTransform::from_position(position),
        PhysicsBody::default().with_bounce(0.0),
        Collider::circle(10.0).with_layers(layers::PLAYER, layers::ALL),
    )).id()
}

#[test]
fn test_field_is_centred_on_player() {
    let mut app = core_app();
    let player = spawn_player(&mut app, Vec2::new(500.0, 300.0));

    step(&mut app);
    assert_eq!(app.world().resource::<PursuitField>().0.origin(), Vec2::new(500.0, 300.0));

    app.world_mut().get_mut::<SimTransform>(player).unwrap().position = Vec2::new(-80.0, 20.0);
    step(&mut app);
    assert_eq!(app.world().resource::<PursuitField>().0.origin(), Vec2::new(-80.0, 20.0));
}

#[test]
fn test_scenery_blocks_its_cells() {
    let mut app = core_app();
    spawn_player(&mut app, Vec2::ZERO);
    app.world_mut().spawn((
        Scenery,
        SimTransform::from_position(Vec2::new(100.0, 0.0)),
        Collider::circle(20.0).with_layers(layers::SCENERY, layers::ALL),
    ));
    app.world_mut().spawn((
        Scenery,
        SimTransform::from_position(Vec2::new(0.0, -150.0)),
        Collider::new(ColliderShape::rect(120.0, 20.0)).with_layers(layers::SCENERY, layers::ALL),
    ));

    step(&mut app);

    let field = &app.world().resource::<PursuitField>().0;
    assert!(field.is_blocked(IVec2::new(2, 0)), "pillar cell");
    assert!(!field.is_blocked(IVec2::new(1, 0)));
    for x in -1..=1 {
        assert!(field.is_blocked(IVec2::new(x, -3)), "wall cell ({}, -3)", x);
    }
    assert!(!field.is_blocked(IVec2::new(0, 0)), "centre stays open");
}

#[test]
fn test_pursuers_crowd_their_cells() {
    let mut app = core_app();
    spawn_player(&mut app, Vec2::ZERO);
    for _ in 0..3 {
        app.world_mut().spawn((
            Pursuer,
            SimTransform::from_position(Vec2::new(-200.0, 0.0)),
            PhysicsBody::default().with_bounce(0.0),
        ));
    }

    step(&mut app);

    let field = &app.world().resource::<PursuitField>().0;
    let weight = app.world().resource::<SimConfig>().crowd_weight;
    assert_eq!(field.cost(IVec2::new(-4, 0)), Some(3 * weight));
    assert_eq!(field.cost(IVec2::new(4, 0)), Some(0));
}

#[test]
fn test_pursuer_routes_around_pillar_to_player() {
    let mut app = core_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    app.world_mut().spawn((
        Scenery,
        SimTransform::from_position(Vec2::new(150.0, 0.0)),
        Collider::circle(20.0).with_layers(layers::SCENERY, layers::ALL),
    ));
    let pursuer = app.world_mut().spawn((
        Pursuer,
        SimTransform::from_position(Vec2::new(300.0, 0.0)),
        PhysicsBody::default().with_drag(2.0),
        Collider::circle(10.0).with_layers(layers::PURSUER, layers::ALL),
    )).id();

    let start = app.world().get::<SimTransform>(pursuer).unwrap().position;
    let mut max_detour = 0.0f32;
    for _ in 0..600 {
        step(&mut app);
        let p = app.world().get::<SimGlobalTransform>(pursuer).unwrap().position();
        max_detour = max_detour.max(p.y.abs());
    }

    let end = app.world().get::<SimGlobalTransform>(pursuer).unwrap().position();
    let player_pos = app.world().get::<SimGlobalTransform>(player).unwrap().position();
    println!("Pursuer {:?} -> {:?}, max detour {:.1}", start, end, max_detour);
    assert!(end.distance(player_pos) < 60.0, "pursuer should reach the player, ended at {:?}", end);
    assert!(max_detour > 20.0, "pursuer should leave the straight line to avoid the pillar");
}
