use super::*;

fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!((actual - expected).abs() < 1e-4, "{what}: expected {expected}, got {actual}");
}

#[test]
fn test_overlapping_circles_push_apart_along_center_line() {
    let a = ColliderShape::circle(10.0);
    let b = ColliderShape::circle(10.0);

    let pen = penetration(&a, Vec2::ZERO, &b, Vec2::new(15.0, 0.0)).expect("circles overlap by 5");

    assert_close(pen.depth, 5.0, "depth");
    assert_eq!(pen.normal, Vec2::new(-1.0, 0.0), "normal should point from B toward A");
    assert_close(pen.vector.x, -5.0, "vector.x");
}

#[test]
fn test_touching_circles_do_not_collide() {
    let a = ColliderShape::circle(10.0);
    let b = ColliderShape::circle(5.0);

    assert!(penetration(&a, Vec2::ZERO, &b, Vec2::new(15.0, 0.0)).is_none());
    assert!(penetration(&a, Vec2::ZERO, &b, Vec2::new(0.0, -30.0)).is_none());
}

#[test]
fn test_coincident_circles_use_fallback_normal() {
    let a = ColliderShape::circle(4.0);
    let b = ColliderShape::circle(6.0);

    let pen = penetration(&a, Vec2::new(3.0, 3.0), &b, Vec2::new(3.0, 3.0)).expect("full overlap");

    assert_eq!(pen.normal, FALLBACK_NORMAL);
    assert_close(pen.depth, 10.0, "depth");
    assert!(pen.vector.is_finite(), "no NaN from zero distance");
}

#[test]
fn test_circle_box_uses_closest_point() {
    let circle = ColliderShape::circle(5.0);
    let rect = ColliderShape::Box { half_extents: Vec2::new(10.0, 10.0) };

    // Circle right of the box, 3 units past its edge.
    let pen = penetration(&circle, Vec2::new(13.0, 0.0), &rect, Vec2::ZERO).expect("overlap of 2");
    assert_eq!(pen.normal, Vec2::X);
    assert_close(pen.depth, 2.0, "depth");

    // Near a corner the normal follows the diagonal.
    let pen = penetration(&circle, Vec2::new(13.0, 13.0), &rect, Vec2::ZERO).expect("corner overlap");
    assert_close(pen.normal.x, pen.normal.y, "diagonal normal");
    assert_close(pen.depth, 5.0 - (18.0f32).sqrt(), "corner depth");
}

#[test]
fn test_box_circle_is_circle_box_flipped() {
    let circle = ColliderShape::circle(5.0);
    let rect = ColliderShape::rect(20.0, 8.0);
    let circle_pos = Vec2::new(2.0, 7.0);
    let rect_pos = Vec2::new(-1.0, 0.0);

    let ab = penetration(&circle, circle_pos, &rect, rect_pos).expect("overlap");
    let ba = penetration(&rect, rect_pos, &circle, circle_pos).expect("overlap");

    assert_eq!(ab.normal, -ba.normal);
    assert_close(ab.depth, ba.depth, "depth");
}

#[test]
fn test_circle_centered_inside_box_escapes_through_nearest_direction() {
    let circle = ColliderShape::circle(2.0);
    let rect = ColliderShape::Box { half_extents: Vec2::new(10.0, 10.0) };

    let pen = penetration(&circle, Vec2::new(0.0, 6.0), &rect, Vec2::ZERO).expect("center inside");

    assert_eq!(pen.normal, Vec2::Y);
    // 4 units to the top face plus the radius.
    assert_close(pen.depth, 6.0, "depth");

    let pen = penetration(&circle, Vec2::ZERO, &rect, Vec2::ZERO).expect("same center");
    assert_eq!(pen.normal, FALLBACK_NORMAL);
    assert!(pen.depth.is_finite());
}

#[test]
fn test_boxes_resolve_along_shallow_axis() {
    let a = ColliderShape::Box { half_extents: Vec2::new(5.0, 5.0) };
    let b = ColliderShape::Box { half_extents: Vec2::new(5.0, 5.0) };

    // Overlap 1 on X, 8 on Y.
    let pen = penetration(&a, Vec2::new(-9.0, 2.0), &b, Vec2::ZERO).expect("overlap");
    assert_eq!(pen.normal, Vec2::new(-1.0, 0.0));
    assert_close(pen.depth, 1.0, "depth");

    // Overlap 7 on X, 3 on Y.
    let pen = penetration(&a, Vec2::new(3.0, 7.0), &b, Vec2::ZERO).expect("overlap");
    assert_eq!(pen.normal, Vec2::Y);
    assert_close(pen.depth, 3.0, "depth");
}

#[test]
fn test_separated_boxes_do_not_collide() {
    let a = ColliderShape::rect(10.0, 10.0);
    let b = ColliderShape::rect(4.0, 4.0);

    assert!(penetration(&a, Vec2::ZERO, &b, Vec2::new(7.0, 0.0)).is_none(), "edges touch exactly");
    assert!(penetration(&a, Vec2::ZERO, &b, Vec2::new(6.0, 7.5)).is_none());
}

#[test]
fn test_penetration_is_antisymmetric_for_random_pairs() {
    let mut rng = fastrand::Rng::with_seed(7);
    let shapes = |rng: &mut fastrand::Rng| {
        if rng.bool() {
            ColliderShape::circle(1.0 + rng.f32() * 10.0)
        } else {
            ColliderShape::rect(2.0 + rng.f32() * 20.0, 2.0 + rng.f32() * 20.0)
        }
    };

    for _ in 0..500 {
        let a = shapes(&mut rng);
        let b = shapes(&mut rng);
        let pa = Vec2::new(rng.f32() * 40.0 - 20.0, rng.f32() * 40.0 - 20.0);
        let pb = Vec2::new(rng.f32() * 40.0 - 20.0, rng.f32() * 40.0 - 20.0);

        let ab = penetration(&a, pa, &b, pb);
        let ba = penetration(&b, pb, &a, pa);
        assert_eq!(ab.is_some(), ba.is_some(), "detection must be symmetric for {a:?}@{pa} vs {b:?}@{pb}");

        if let (Some(ab), Some(ba)) = (ab, ba) {
            assert!(ab.depth > 0.0);
            assert_close(ab.depth, ba.depth, "depth");
            assert_close(ab.normal.x, -ba.normal.x, "normal.x");
            assert_close(ab.normal.y, -ba.normal.y, "normal.y");
            assert_close(ab.normal.length(), 1.0, "unit normal");
        }
    }
}

#[test]
fn test_far_apart_shapes_never_collide() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..200 {
        let ra = 1.0 + rng.f32() * 10.0;
        let rb = 1.0 + rng.f32() * 10.0;
        let angle = rng.f32() * std::f32::consts::TAU;
        let gap = ra + rb + 0.01 + rng.f32() * 50.0;
        let pb = Vec2::from_angle(angle) * gap;

        let a = ColliderShape::circle(ra);
        let b = ColliderShape::circle(rb);
        assert!(penetration(&a, Vec2::ZERO, &b, pb).is_none());
    }
}
