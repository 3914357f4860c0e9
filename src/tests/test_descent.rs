use approx::assert_relative_eq;
use smartcore::linalg::basic::arrays::Array;

use crate::builder::GraphDiscoveryBuilder;
use crate::descent::{projected_gradient, DescentSettings};
use crate::graph::{Convergence, SolverMode, WeightInit};
use crate::incidence::{DenseIncidence, IncidenceKind, SparseIncidence};
use crate::jaccard::jaccard_distance_matrix;
use crate::objective::Objective;
use crate::pairs::{Orientation, PairIndex};
use crate::tests::{clustered_sets, three_entity_sets};

#[test]
fn test_three_entities_converge_to_positive_weights() {
    let sets = vec![vec![1, 2], vec![2, 3], vec![1, 2, 3]];
    let z = jaccard_distance_matrix(&sets).unwrap();
    assert_relative_eq!(*z.get((0, 1)), 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(*z.get((0, 2)), 1.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(*z.get((1, 2)), 1.0 / 3.0, epsilon = 1e-12);

    for seed in 0..8 {
        let graph = GraphDiscoveryBuilder::new()
            .with_mu(1.0)
            .with_lambda(0.4)
            .with_seed(seed)
            .build(&sets)
            .unwrap();

        let report = &graph.report;
        assert_eq!(report.status, Convergence::Converged, "seed {seed}");
        assert!(report.iterations < 2000);
        assert!(report.weights.iter().all(|&w| w > 0.0), "seed {seed}: {:?}", report.weights);
        assert!(report.objective.is_finite());
    }
}

#[test]
fn test_closer_pairs_get_more_weight() {
    let sets = vec![vec![1, 2], vec![2, 3], vec![1, 2, 3]];
    let graph = GraphDiscoveryBuilder::new()
        .with_init(WeightInit::Ones)
        .build(&sets)
        .unwrap();

    // (0,2) and (1,2) are at distance 1/3, (0,1) at 2/3
    assert!(graph.weight(0, 2) > graph.weight(0, 1));
    assert!(graph.weight(1, 2) > graph.weight(0, 1));
    assert_relative_eq!(graph.weight(0, 2), graph.weight(1, 2), epsilon = 1e-9);
}

#[test]
fn test_accepted_objectives_never_increase() {
    let z = jaccard_distance_matrix(&clustered_sets()).unwrap();
    let pairs = PairIndex::new(8);
    let targets = pairs.upper_triangle(&z);
    let s: SparseIncidence = pairs.incidence(Orientation::Undirected);
    let objective = Objective::new(&s, &targets, 1.0, 0.4);

    let report = projected_gradient(&objective, &DescentSettings::default());
    assert_eq!(report.history.len(), report.iterations + 1);
    for step in report.history.windows(2) {
        assert!(step[1] <= step[0], "objective went up: {} -> {}", step[0], step[1]);
    }
    assert_relative_eq!(*report.history.last().unwrap(), report.objective);
    assert!(report.weights.iter().all(|&w| w >= 0.0));
    assert!(objective.degrees(&report.weights).iter().all(|&d| d > 0.0));
}

#[test]
fn test_iteration_cap_is_reported() {
    let z = jaccard_distance_matrix(&clustered_sets()).unwrap();
    let pairs = PairIndex::new(8);
    let targets = pairs.upper_triangle(&z);
    let s: DenseIncidence = pairs.incidence(Orientation::Undirected);
    let objective = Objective::new(&s, &targets, 1.0, 0.4);

    let settings = DescentSettings {
        max_iter: 3,
        init: WeightInit::Ones,
        ..DescentSettings::default()
    };
    let report = projected_gradient(&objective, &settings);
    assert_eq!(report.status, Convergence::IterationCap);
    assert_eq!(report.iterations, 3);
    assert!(report.objective < report.history[0]);
}

#[test]
fn test_stop_rule_scales_by_previous_objective() {
    let z = jaccard_distance_matrix(&clustered_sets()).unwrap();
    let pairs = PairIndex::new(8);
    let targets = pairs.upper_triangle(&z);
    let s: DenseIncidence = pairs.incidence(Orientation::Undirected);
    let objective = Objective::new(&s, &targets, 1.0, 0.4);

    // first step improves by ~10.4% of the previous objective, ~11.7% of the new one
    let settings = DescentSettings {
        init: WeightInit::Ones,
        tolerance: Some(0.11),
        ..DescentSettings::default()
    };
    let report = projected_gradient(&objective, &settings);
    assert_eq!(report.status, Convergence::Converged);
    assert_eq!(report.iterations, 1);
    let (prev, last) = (report.history[0], report.history[1]);
    assert!(prev - last <= 0.11 * prev.abs());
    assert!(prev - last > 0.11 * last.abs());
}

#[test]
fn test_directed_default_tolerance_counts_unordered_pairs() {
    let sets = clustered_sets();
    let n = sets.len();
    let npairs = n * (n - 1) / 2;
    let run = |tolerance: Option<f64>| {
        let mut builder = GraphDiscoveryBuilder::new()
            .with_mode(SolverMode::Directed)
            .with_init(WeightInit::Ones);
        if let Some(tol) = tolerance {
            builder = builder.with_tolerance(tol);
        }
        builder.build(&sets).unwrap()
    };

    let default = run(None);
    let explicit = run(Some(0.1 / npairs as f64));
    assert_eq!(default.report.weights.len(), 2 * npairs);
    assert_eq!(default.report.status, Convergence::Converged);
    assert_eq!(default.report.iterations, explicit.report.iterations);
    assert_eq!(default.report.weights, explicit.report.weights);
}

#[test]
fn test_sparse_and_dense_runs_agree() {
    let sets = clustered_sets();
    let run = |kind| {
        GraphDiscoveryBuilder::new()
            .with_incidence(kind)
            .with_seed(11)
            .build(&sets)
            .unwrap()
    };
    let sparse = run(IncidenceKind::Sparse);
    let dense = run(IncidenceKind::Dense);

    assert_eq!(sparse.report.iterations, dense.report.iterations);
    assert_eq!(sparse.report.status, dense.report.status);
    for (a, b) in sparse.report.weights.iter().zip(&dense.report.weights) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn test_same_seed_same_graph() {
    let sets = clustered_sets();
    let a = GraphDiscoveryBuilder::new().with_seed(5).build(&sets).unwrap();
    let b = GraphDiscoveryBuilder::new().with_seed(5).build(&sets).unwrap();
    assert_eq!(a.report.weights, b.report.weights);
}

#[test]
fn test_symmetric_reconstruction() {
    let graph = GraphDiscoveryBuilder::new().build(&clustered_sets()).unwrap();
    let n = graph.nnodes();
    for i in 0..n {
        assert_eq!(graph.weight(i, i), 0.0);
        for j in 0..n {
            assert_eq!(graph.weight(i, j), graph.weight(j, i));
            assert!(graph.weight(i, j) >= 0.0);
        }
    }
}

#[test]
fn test_directed_solver_learns_asymmetric_weights() {
    // entity 0 shares nothing; entity 1's items are a superset of entity 2's
    let sets = vec![vec![10, 11], vec![1, 2, 3], vec![1, 2]];
    let graph = GraphDiscoveryBuilder::new()
        .with_mode(SolverMode::Directed)
        .with_init(WeightInit::Ones)
        .build(&sets)
        .unwrap();

    assert!(graph.is_directed());
    assert_eq!(graph.report.weights.len(), 6);
    assert_eq!(graph.report.status, Convergence::Converged);
    assert!(
        (graph.weight(0, 1) - graph.weight(1, 0)).abs() > 0.1,
        "M[0,1]={} M[1,0]={}",
        graph.weight(0, 1),
        graph.weight(1, 0)
    );
    // node 1 sends most of its weight to its near neighbour
    assert!(graph.weight(1, 2) > graph.weight(1, 0));
}

#[test]
fn test_directed_weights_land_at_source_rows() {
    let graph = GraphDiscoveryBuilder::new()
        .with_mode(SolverMode::Directed)
        .with_init(WeightInit::Ones)
        .build(&three_entity_sets())
        .unwrap();

    let pairs = PairIndex::new(3);
    for (c, &w) in graph.report.weights.iter().enumerate() {
        let (src, dst) = pairs.directed_pair(c);
        assert_eq!(graph.weight(src, dst), w);
    }
    // every node keeps some outgoing weight
    for i in 0..3 {
        let out: f64 = (0..3).map(|j| graph.weight(i, j)).sum();
        assert!(out > 0.0);
    }
}
