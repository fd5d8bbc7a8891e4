use glam::Vec2;
use sim_core::{
    config::{Config, InitialLayout},
    forces,
    graph::{Graph, Node},
    simulation::Simulation,
};

fn nodes(n: usize) -> Vec<Node> {
    (0..n).map(|i| Node::new(format!("n{i}"), (i % 3) as i64)).collect()
}

fn place(graph: &mut Graph, positions: &[Vec2]) {
    for (node, &p) in graph.nodes.iter_mut().zip(positions) {
        node.pos = p;
    }
}

fn no_gravity() -> Config {
    Config {
        gravity: false,
        ..Config::default()
    }
}

#[test]
fn triangle_settles_into_equilateral_equilibrium() {
    let cfg = no_gravity();
    let c = cfg.center();
    let mut graph = Graph::new(nodes(3), [(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
    place(
        &mut graph,
        &[c, c + Vec2::new(30.0, 5.0), c + Vec2::new(10.0, 40.0)],
    );
    let radii: Vec<f32> = graph.nodes.iter().map(|n| n.radius).collect();
    assert!(radii.iter().all(|&r| r == radii[0]));

    let mut sim = Simulation::new(graph, cfg);
    for _ in 0..3000 {
        sim.tick(0.016).unwrap();
    }

    let p = sim.graph().positions();
    let d01 = p[0].distance(p[1]);
    let d12 = p[1].distance(p[2]);
    let d02 = p[0].distance(p[2]);
    let spread = d01.max(d12).max(d02) - d01.min(d12).min(d02);
    assert!(spread < 0.05, "sides {d01} {d12} {d02}");
    // Longer than the spring rest length (2 + 2) because of repulsion.
    assert!(d01 > 4.0);
}

#[test]
fn triangle_result_does_not_depend_on_barnes_hut() {
    let run = |barnes_hut: bool| {
        let cfg = Config {
            barnes_hut,
            ..no_gravity()
        };
        let c = cfg.center();
        let mut graph = Graph::new(nodes(3), [(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        place(
            &mut graph,
            &[c, c + Vec2::new(-25.0, 3.0), c + Vec2::new(4.0, -33.0)],
        );
        let mut sim = Simulation::new(graph, cfg);
        for _ in 0..2000 {
            sim.tick(0.016).unwrap();
        }
        let p = sim.graph().positions();
        p[0].distance(p[1])
    };
    assert!((run(true) - run(false)).abs() < 1e-3);
}

#[test]
fn isolated_node_feels_no_attraction_and_stays_put() {
    let cfg = no_gravity();
    let c = cfg.center();
    let mut graph = Graph::new(nodes(3), [(1, 2, 1.0)]).unwrap();
    place(
        &mut graph,
        &[c, c + Vec2::new(300.0, 0.0), c + Vec2::new(320.0, 0.0)],
    );
    let start = graph.nodes[0].pos;
    let mut sim = Simulation::new(graph, cfg.clone());

    for _ in 0..200 {
        let mut springs = sim.graph().clone();
        for n in &mut springs.nodes {
            n.acc = Vec2::ZERO;
        }
        forces::attraction_phase(&mut springs, &cfg, sim.temperature());
        assert_eq!(springs.nodes[0].acc, Vec2::ZERO);

        sim.tick(0.016).unwrap();
    }

    // Degree zero means zero mass, so repulsion on it vanishes too.
    assert_eq!(sim.graph().nodes[0].pos, start);
    assert_eq!(sim.graph().nodes[0].vel, Vec2::ZERO);
}

#[test]
fn first_tick_matches_hand_computed_pair_dynamics() {
    let cfg = no_gravity();
    let c = cfg.center();
    let mut graph = Graph::new(nodes(2), [(0, 1, 1.0)]).unwrap();
    place(&mut graph, &[c, c + Vec2::new(20.0, 0.0)]);
    let mut sim = Simulation::new(graph, cfg.clone());

    let t = cfg.initial_temperature;
    let dt = 0.016;
    let repulsion = cfg.repulsion_strength * t * 1.0 * 1.0 / (20.0 * 20.0);
    let spring = cfg.attraction_strength * (20.0 - 4.0) / 2.0 * 1.0 * t;
    let acc = spring - repulsion;
    let vel = (acc * (1.0 - cfg.velocity_decay)).min(cfg.max_speed_per_temperature * t);

    sim.tick(dt).unwrap();
    let n0 = &sim.graph().nodes[0];
    let n1 = &sim.graph().nodes[1];
    assert!((n0.vel.x - vel).abs() < 1e-2, "{} vs {vel}", n0.vel.x);
    assert!((n0.pos.x - (c.x + vel * dt)).abs() < 1e-3);
    assert!((n1.pos.x - (c.x + 20.0 - vel * dt)).abs() < 1e-3);
    assert_eq!(n0.pos.y, c.y);
}

#[test]
fn reset_restores_initial_layout_and_temperature() {
    let cfg = Config {
        initial_layout: InitialLayout::Random { seed: 123 },
        ..Config::default()
    };
    let mut graph = Graph::new(
        nodes(25),
        (0..24).map(|i| (i, i + 1, 1.0 + (i % 4) as f32)),
    )
    .unwrap();
    graph.apply_layout(cfg.initial_layout, cfg.viewport());
    let initial = graph.positions();

    let mut sim = Simulation::new(graph, cfg.clone());
    for _ in 0..300 {
        sim.tick(0.016).unwrap();
    }
    assert_ne!(sim.graph().positions(), initial);
    assert!(sim.temperature() < cfg.initial_temperature);

    sim.reset_positions();
    sim.reset_temperature();
    assert_eq!(sim.graph().positions(), initial);
    assert!(sim.graph().nodes.iter().all(|n| n.vel == Vec2::ZERO));
    assert_eq!(sim.temperature(), cfg.initial_temperature);
}

#[test]
fn selected_node_is_only_moved_externally() {
    let cfg = Config::default();
    let mut graph = Graph::new(nodes(8), (0..7).map(|i| (i, i + 1, 1.0))).unwrap();
    graph.apply_layout(cfg.initial_layout, cfg.viewport());
    let mut sim = Simulation::new(graph, cfg.clone());

    sim.set_selected(3, true).unwrap();
    let pinned = cfg.center() + Vec2::new(80.0, -60.0);
    sim.set_node_position(3, pinned).unwrap();

    let others_before = sim.graph().positions();
    for i in 0..400 {
        sim.tick(0.016).unwrap();
        assert_eq!(sim.graph().nodes[3].pos, pinned, "moved on tick {i}");
    }
    let others_after = sim.graph().positions();
    assert_ne!(others_before[4], others_after[4]);

    let dragged = pinned + Vec2::new(5.0, 5.0);
    sim.set_node_position(3, dragged).unwrap();
    sim.tick(0.016).unwrap();
    assert_eq!(sim.graph().nodes[3].pos, dragged);
}

#[test]
fn temperature_cools_toward_zero_without_going_negative() {
    let cfg = Config {
        target_temperature: 0.0,
        temperature_decay: 2.0,
        ..no_gravity()
    };
    let mut graph = Graph::new(nodes(2), [(0, 1, 1.0)]).unwrap();
    graph.apply_layout(cfg.initial_layout, cfg.viewport());
    let mut sim = Simulation::new(graph, cfg);

    let mut prev = sim.temperature();
    for _ in 0..500 {
        sim.tick(0.02).unwrap();
        let t = sim.temperature();
        assert!(t >= 0.0);
        assert!(t < prev || t == 0.0);
        prev = t;
    }
    assert!(prev < 1e-3);
}

#[test]
fn larger_graph_stays_finite_and_inside_world() {
    let cfg = Config {
        substeps: 2,
        ..Config::default()
    };
    let n = 60;
    let edges = (0..n)
        .map(|i| (i, (i + 1) % n, 1.0))
        .chain((0..n).step_by(7).map(|i| (i, (i * 3 + 5) % n, 2.0)))
        .filter(|(a, b, _)| a != b);
    let mut graph = Graph::new(nodes(n), edges).unwrap();
    graph.apply_layout(cfg.initial_layout, cfg.viewport());
    let mut sim = Simulation::new(graph, cfg.clone());

    for _ in 0..600 {
        sim.tick(0.016).unwrap();
    }

    let bounds = cfg.world_bounds();
    for node in &sim.graph().nodes {
        assert!(node.pos.is_finite() && node.vel.is_finite());
        assert!(bounds.contains(node.pos));
    }
}

#[test]
fn oversized_spiral_is_clamped_and_keeps_ticking() {
    let cfg = Config {
        initial_layout: InitialLayout::Phyllotaxis { spacing: 200.0 },
        ..Config::default()
    };
    cfg.validate().unwrap();
    let bounds = cfg.world_bounds();

    let mut graph = Graph::new(nodes(500), (0..499).map(|i| (i, i + 1, 1.0))).unwrap();
    graph.apply_layout(cfg.initial_layout, cfg.viewport());
    assert!(graph.nodes.iter().any(|n| !bounds.contains(n.pos)));

    let mut sim = Simulation::new(graph, cfg);
    assert!(sim.graph().nodes.iter().all(|n| bounds.contains(n.pos)));
    for _ in 0..20 {
        sim.tick(0.016).unwrap();
    }
    assert_eq!(sim.ticks(), 20);

    sim.reset_positions();
    assert!(sim.graph().nodes.iter().all(|n| bounds.contains(n.pos)));
    sim.tick(0.016).unwrap();
}
