use grid_traffic::simulation::{
    Car, CarId, CarState, MapGrid, Point, RouteGrid, SteeringEngine, Vec2, WorldBounds,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn exits(grid: &RouteGrid, col: usize, row: usize) -> Vec<Point> {
    grid.anchor_at(col, row).map(|a| a.exits.clone()).unwrap_or_default()
}

#[test]
fn junction_between_opposing_arrows_is_blocked_all_round() {
    // Junction at (1, 0): east is `<` flowing back, west is `>` flowing
    // in, south is blank, north is off the map.
    let world = WorldBounds::new(300.0, 200.0);
    let grid = RouteGrid::from_map(&MapGrid::parse(">x<\n  ^ "), 100.0, &world);

    assert_eq!(grid.anchors().len(), 6);
    assert_eq!(grid.width_in_anchors(), 3);
    assert_eq!(grid.height_in_anchors(), 2);

    assert!(exits(&grid, 1, 0).is_empty());
    assert_eq!(exits(&grid, 0, 0), vec![Point::new(100.0, 0.0)]);
    assert_eq!(exits(&grid, 2, 0), vec![Point::new(100.0, 0.0)]);
    assert_eq!(exits(&grid, 2, 1), vec![Point::new(200.0, 0.0)]);
    assert!(exits(&grid, 0, 1).is_empty());
    assert!(exits(&grid, 1, 1).is_empty());
}

#[test]
fn four_way_junction_lists_exits_east_south_west_north() {
    let map = " ^ \n<x>\n v ";
    let grid = RouteGrid::from_map(&MapGrid::parse(map), 100.0, &WorldBounds::new(300.0, 300.0));
    assert_eq!(
        exits(&grid, 1, 1),
        vec![
            Point::new(200.0, 100.0),
            Point::new(100.0, 200.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 0.0),
        ]
    );
}

#[test]
fn grid_construction_is_deterministic() {
    let map = MapGrid::parse(">>x<<\n  v  \n  x>>\n  ^  ");
    let world = WorldBounds::new(500.0, 400.0);
    let a = RouteGrid::from_map(&map, 100.0, &world);
    let b = RouteGrid::from_map(&map, 100.0, &world);
    for (x, y) in a.anchors().iter().zip(b.anchors()) {
        assert_eq!(x.position, y.position);
        assert_eq!(x.exits, y.exits);
    }
}

#[test]
fn car_follows_a_loop_and_visits_every_corner() {
    // Loop anchors sit one cell in from the edges of a 4x4 lattice.
    let world = WorldBounds::new(400.0, 400.0);
    let grid = RouteGrid::from_map(&MapGrid::parse("    \n >v \n ^< "), 100.0, &world);
    let engine = SteeringEngine::default();
    let mut car = Car::new(CarId(0), Point::new(100.0, 100.0), Vec2::zeros(), StdRng::seed_from_u64(4));

    let mut visited = std::collections::HashSet::new();
    for _ in 0..2000 {
        engine.step_car(&mut car, &grid, &world);
        if let Some(anchor) = car.anchor {
            visited.insert(anchor.index);
        }
        assert_eq!(car.state(), CarState::Seeking, "left the loop at {:?}", car.position);
    }
    for index in [5, 6, 9, 10] {
        assert!(visited.contains(&index), "anchor {index} never reached: {visited:?}");
    }
}

#[test]
fn car_coasts_across_empty_cells_until_it_finds_a_road() {
    let world = WorldBounds::new(600.0, 100.0);
    let grid = RouteGrid::from_map(&MapGrid::parse("   v  "), 100.0, &world);
    let engine = SteeringEngine::default();
    let mut car = Car::new(CarId(0), Point::new(10.0, 0.0), Vec2::new(3.0, 0.0), StdRng::seed_from_u64(0));

    let mut ticks = 0;
    loop {
        engine.step_car(&mut car, &grid, &world);
        ticks += 1;
        if car.state() != CarState::Coasting {
            break;
        }
        assert_eq!(car.velocity, Vec2::new(3.0, 0.0));
        assert!(ticks < 200, "never reached the road");
    }

    assert_eq!(car.state(), CarState::Seeking);
    assert!(car.position.x > 250.0);
    assert_eq!(car.checkpoint, Some(Point::new(300.0, 100.0)));
}
