use super::*;
use bevy::prelude::Vec2;

#[test]
fn test_damage_respects_invulnerability() {
    let mut health = Health::new(5.0).with_invulnerability(0.5);

    assert!(health.damage(1.0));
    assert_eq!(health.value, 4.0);
    assert!(!health.damage(1.0), "second hit inside the window must be ignored");

    health.invulnerable_for = 0.0;
    assert!(health.damage(1.0));
    assert_eq!(health.value, 3.0);
}

#[test]
fn test_damage_clamps_at_zero_and_stops() {
    let mut health = Health::new(2.0);
    assert!(health.damage(5.0));
    assert_eq!(health.value, 0.0);
    assert!(health.is_dead());
    assert!(!health.damage(1.0));
}

#[test]
fn test_heal_caps_at_max() {
    let mut health = Health::new(3.0);
    health.value = 1.0;
    health.heal(10.0);
    assert_eq!(health.value, 3.0);
}

#[test]
fn test_experience_levels_and_grows_threshold() {
    let mut xp = Experience::new(5.0);

    assert_eq!(xp.gain(4.0, 2.0), 0);
    assert_eq!(xp.gain(1.0, 2.0), 1);
    assert_eq!(xp.level, 2);
    assert_eq!(xp.points, 0.0);
    assert_eq!(xp.next_level, 10.0);
}

#[test]
fn test_experience_can_gain_several_levels_at_once() {
    let mut xp = Experience::new(1.0);
    assert_eq!(xp.gain(3.5, 2.0), 2);
    assert_eq!(xp.level, 3);
    assert!((xp.points - 0.5).abs() < 1e-6);
}

#[test]
fn test_spawner_ring_points_lie_on_ring() {
    let mut spawner = PursuerSpawner::seeded(42);
    let center = Vec2::new(30.0, -20.0);
    for _ in 0..100 {
        let p = spawner.ring_point(center, 500.0);
        assert!((p.distance(center) - 500.0).abs() < 1e-2);
    }
}

#[test]
fn test_spawner_is_reproducible() {
    let mut a = PursuerSpawner::seeded(9);
    let mut b = PursuerSpawner::seeded(9);
    for _ in 0..10 {
        assert_eq!(a.ring_point(Vec2::ZERO, 10.0), b.ring_point(Vec2::ZERO, 10.0));
    }
}
