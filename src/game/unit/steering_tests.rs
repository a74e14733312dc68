use super::*;
use crate::game::simulation::Collider;

fn params() -> PursuitParams {
    PursuitParams {
        speed: 10.0,
        neighbor_radius: 60.0,
        separation_radius: 40.0,
        separation_weight: 1.5,
        alignment_weight: 0.0,
    }
}

fn pursuer_body(id: u64, position: Vec2, velocity: Vec2) -> CollisionBody {
    let collider = Collider::circle(5.0).with_layers(layers::PURSUER, layers::ALL);
    let mut body = CollisionBody::new(Entity::from_bits(id), position, &collider);
    body.velocity = velocity;
    body
}

fn open_field() -> FlowField {
    let mut field = FlowField::new(50.0, 2);
    field.reset(Vec2::ZERO);
    field.regenerate();
    field
}

#[test]
fn test_outside_field_heads_straight_for_target() {
    let field = open_field();
    let grid = SpatialMap::new(64.0);
    let position = Vec2::new(1000.0, 0.0);

    let desired = desired_velocity(Entity::from_bits(1), position, Vec2::ZERO, &field, &grid, &params());

    assert!((desired - Vec2::new(-10.0, 0.0)).length() < 1e-4, "got {:?}", desired);
}

#[test]
fn test_follows_flow_around_obstacle() {
    let mut field = FlowField::new(50.0, 2);
    field.reset(Vec2::ZERO);
    field.block_cell(IVec2::new(1, 0));
    field.regenerate();
    let grid = SpatialMap::new(64.0);
    let position = Vec2::new(100.0, 0.0);

    let desired = desired_velocity(Entity::from_bits(1), position, Vec2::ZERO, &field, &grid, &params());

    let flow = field.direction_at(position).unwrap();
    assert!(flow.y != 0.0, "flow must detour around the blocked cell, got {:?}", flow);
    assert!((desired.normalize() - flow).length() < 1e-4);
}

#[test]
fn test_centre_cell_falls_back_to_direct_heading() {
    let field = open_field();
    let grid = SpatialMap::new(64.0);
    let position = Vec2::new(10.0, 10.0);

    let desired = desired_velocity(Entity::from_bits(1), position, Vec2::ZERO, &field, &grid, &params());

    assert!(desired.x < 0.0 && desired.y < 0.0, "got {:?}", desired);
    assert!((desired.length() - 10.0).abs() < 1e-4);
}

#[test]
fn test_separation_pushes_away_from_close_pursuer() {
    let field = open_field();
    let mut grid = SpatialMap::new(64.0);
    let me = Vec2::new(1000.0, 0.0);
    let crowd = Vec2::new(1000.0, 10.0);
    grid.insert(me, pursuer_body(1, me, Vec2::ZERO));
    grid.insert(crowd, pursuer_body(2, crowd, Vec2::ZERO));

    let desired = desired_velocity(Entity::from_bits(1), me, Vec2::ZERO, &field, &grid, &params());

    assert!(desired.y < 0.0, "should veer away from the neighbour above, got {:?}", desired);
    assert!(desired.x < 0.0, "should still head for the target, got {:?}", desired);
}

#[test]
fn test_non_pursuers_do_not_repel() {
    let field = open_field();
    let mut grid = SpatialMap::new(64.0);
    let me = Vec2::new(1000.0, 0.0);
    let wall = Vec2::new(1000.0, 10.0);
    grid.insert(me, pursuer_body(1, me, Vec2::ZERO));
    let scenery = Collider::circle(5.0).with_layers(layers::SCENERY, layers::ALL);
    grid.insert(wall, CollisionBody::new(Entity::from_bits(2), wall, &scenery));

    let desired = desired_velocity(Entity::from_bits(1), me, Vec2::ZERO, &field, &grid, &params());

    assert!(desired.y.abs() < 1e-4, "got {:?}", desired);
}

#[test]
fn test_alignment_bends_toward_neighbour_velocity() {
    let field = open_field();
    let mut grid = SpatialMap::new(64.0);
    let me = Vec2::new(1000.0, 0.0);
    let friend = Vec2::new(1050.0, 0.0);
    grid.insert(me, pursuer_body(1, me, Vec2::ZERO));
    grid.insert(friend, pursuer_body(2, friend, Vec2::new(0.0, 20.0)));
    let params = PursuitParams { separation_weight: 0.0, alignment_weight: 1.0, ..params() };

    let desired = desired_velocity(Entity::from_bits(1), me, Vec2::ZERO, &field, &grid, &params);

    assert!(desired.y > 0.0, "got {:?}", desired);
}
