use super::*;

fn entity(n: u64) -> Entity {
    Entity::from_bits(n)
}

#[test]
fn test_keys_floor_negative_coordinates() {
    let map: SpatialMap<Entity> = SpatialMap::new(30.0);

    assert_eq!(map.key_of(Vec2::new(0.0, 0.0)), IVec2::new(0, 0));
    assert_eq!(map.key_of(Vec2::new(29.9, 59.9)), IVec2::new(0, 1));
    assert_eq!(map.key_of(Vec2::new(-0.1, -30.0)), IVec2::new(-1, -1));
    assert_eq!(map.key_of(Vec2::new(-30.1, 15.0)), IVec2::new(-2, 0));
}

#[test]
fn test_query_finds_items_in_neighbouring_cells() {
    let mut map = SpatialMap::new(10.0);
    let a = entity(1);
    let b = entity(2);
    let c = entity(3);

    map.insert(Vec2::new(5.0, 5.0), a);
    map.insert(Vec2::new(14.0, -3.0), b); // cell (1, -1): diagonal neighbour
    map.insert(Vec2::new(25.0, 5.0), c); // cell (2, 0): two cells away

    let mut out = Vec::new();
    map.query_cell_and_neighbors(Vec2::new(5.0, 5.0), &mut out);

    assert!(out.contains(&a), "query must return items in the home cell");
    assert!(out.contains(&b), "query must return items in adjacent cells");
    assert!(!out.contains(&c), "items two cells away must not be returned");
}

#[test]
fn test_query_clears_output_buffer() {
    let mut map = SpatialMap::new(10.0);
    map.insert(Vec2::ZERO, entity(1));

    let mut out = vec![entity(99), entity(98)];
    map.query_cell_and_neighbors(Vec2::new(100.0, 100.0), &mut out);

    assert!(out.is_empty(), "stale contents must be cleared, got {:?}", out);
}

#[test]
fn test_every_inserted_item_is_found_from_its_own_position() {
    let mut rng = fastrand::Rng::with_seed(3);
    let mut map = SpatialMap::new(32.0);
    let mut placed = Vec::new();

    for i in 0..300 {
        let pos = Vec2::new(rng.f32() * 1000.0 - 500.0, rng.f32() * 1000.0 - 500.0);
        map.insert(pos, entity(i + 1));
        placed.push((entity(i + 1), pos));
    }
    assert_eq!(map.len(), 300);

    let mut out = Vec::new();
    for (e, pos) in placed {
        map.query_cell_and_neighbors(pos, &mut out);
        assert!(out.contains(&e), "{:?} at {:?} missing from its own neighbourhood", e, pos);
    }
}

#[test]
fn test_clear_returns_buckets_to_pool() {
    let mut map = SpatialMap::new(10.0);
    for i in 0..5 {
        map.insert(Vec2::new(i as f32 * 10.0, 0.0), entity(i + 1));
    }
    assert_eq!(map.occupied_len(), 5);
    assert_eq!(map.pool().fresh_allocations(), 5);

    map.clear();

    assert!(map.is_empty());
    assert_eq!(map.occupied_len(), 0);
    assert_eq!(map.pool().pooled_buckets(), 5, "all buckets should be pooled");
}

#[test]
fn test_stable_population_rebuilds_without_allocating() {
    let mut map = SpatialMap::new(10.0);
    let layout: Vec<Vec2> = (0..40)
        .map(|i| Vec2::new((i % 8) as f32 * 7.0, (i / 8) as f32 * 7.0))
        .collect();

    for (i, pos) in layout.iter().enumerate() {
        map.insert(*pos, entity(i as u64 + 1));
    }
    let warmup = map.pool().fresh_allocations();

    for _ in 0..10 {
        map.clear();
        for (i, pos) in layout.iter().enumerate() {
            map.insert(*pos, entity(i as u64 + 1));
        }
    }

    assert_eq!(
        map.pool().fresh_allocations(),
        warmup,
        "rebuilding the same layout should reuse pooled buckets"
    );
    assert_eq!(map.pool().pooled_buckets(), 0);
}

#[test]
fn test_pool_prefers_bucket_large_enough_for_hint() {
    let mut pool: BucketPool<u32> = BucketPool::default();
    pool.release(Vec::with_capacity(4));
    pool.release(Vec::with_capacity(64));

    let bucket = pool.acquire(40);
    assert!(bucket.capacity() >= 40, "got capacity {}", bucket.capacity());

    let small = pool.acquire(40);
    assert_eq!(small.capacity(), 4, "falls back to the smaller pooled bucket");
    assert_eq!(pool.fresh_allocations(), 0);

    let fresh = pool.acquire(0);
    assert!(fresh.capacity() >= pool::MIN_BUCKET_CAPACITY);
    assert_eq!(pool.fresh_allocations(), 1);
}

#[test]
fn test_forward_neighbors_cover_each_adjacent_pair_once() {
    // For any two distinct cells that touch (including diagonally), exactly one
    // of them lists the other as a forward neighbour.
    for dx in -1..=1 {
        for dy in -1..=1 {
            let offset = IVec2::new(dx, dy);
            if offset == IVec2::ZERO {
                continue;
            }
            let forward = FORWARD_NEIGHBORS.contains(&offset);
            let backward = FORWARD_NEIGHBORS.contains(&-offset);
            assert!(forward ^ backward, "offset {:?} must be covered from exactly one side", offset);
        }
    }

    for offset in FORWARD_NEIGHBORS {
        assert!(
            (offset.y, offset.x) > (0, 0),
            "forward neighbour {:?} must order after the home cell",
            offset
        );
    }
}

#[test]
fn test_cell_size_change_empties_map() {
    let mut map = SpatialMap::new(10.0);
    map.insert(Vec2::new(15.0, 0.0), entity(1));
    assert_eq!(map.cell_len(IVec2::new(1, 0)), 1);

    map.set_cell_size(20.0);

    assert!(map.is_empty());
    assert_eq!(map.key_of(Vec2::new(15.0, 0.0)), IVec2::new(0, 0));
}
