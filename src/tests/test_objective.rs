use approx::assert_relative_eq;

use crate::incidence::{DenseIncidence, SparseIncidence};
use crate::jaccard::jaccard_distance_matrix;
use crate::objective::{objective, Objective};
use crate::pairs::{Orientation, PairIndex};
use crate::tests::three_entity_sets;

fn three_node_targets(pairs: &PairIndex) -> Vec<f64> {
    let z = jaccard_distance_matrix(&three_entity_sets()).unwrap();
    pairs.upper_triangle(&z)
}

#[test]
fn test_value_at_unit_weights() {
    let pairs = PairIndex::new(3);
    let s: SparseIncidence = pairs.incidence(Orientation::Undirected);
    let z = three_node_targets(&pairs);

    // d = [2, 2, 2], w·z = 2.25, w·w = 3
    let expected = 0.5 * (2.25 - 3.0 * 2f64.ln() + 0.4 * 0.5 * 3.0);
    assert_relative_eq!(objective(&[1.0, 1.0, 1.0], &z, &s, 1.0, 0.4), expected, epsilon = 1e-12);
}

#[test]
fn test_isolated_node_is_infeasible() {
    let pairs = PairIndex::new(3);
    let s: SparseIncidence = pairs.incidence(Orientation::Undirected);
    let z = three_node_targets(&pairs);

    // node 0 loses both its edges
    assert_eq!(objective(&[0.0, 0.0, 1.0], &z, &s, 1.0, 0.4), f64::INFINITY);
    assert_eq!(objective(&[0.0; 3], &z, &s, 1.0, 0.4), f64::INFINITY);
}

#[test]
fn test_losses_add_weighted_degrees() {
    let pairs = PairIndex::new(3);
    let s: DenseIncidence = pairs.incidence(Orientation::Undirected);
    let z = three_node_targets(&pairs);
    let losses = [0.2, 0.0, 1.0];
    let w = [0.5, 1.0, 1.5];

    let plain = Objective::new(&s, &z, 1.0, 0.4);
    let weighted = Objective::new(&s, &z, 1.0, 0.4).with_losses(&losses);
    // d = [1.5, 2.0, 2.5]
    let extra = 0.2 * 1.5 + 1.0 * 2.5;
    assert_relative_eq!(weighted.value(&w), plain.value(&w) + extra, epsilon = 1e-12);
}

#[test]
fn test_gradient_matches_finite_differences() {
    let pairs = PairIndex::new(4);
    let s: SparseIncidence = pairs.incidence(Orientation::Undirected);
    let z: Vec<f64> = vec![0.3, 0.9, 0.5, 0.7, 0.2, 1.0];
    let losses = [0.1, 0.0, 0.4, 0.2];
    let f = Objective::new(&s, &z, 1.7, 0.4).with_losses(&losses);

    let w = vec![0.5, 1.2, 0.8, 0.3, 1.1, 0.6];
    let grad = f.gradient(&w, &f.degrees(&w));

    let h = 1e-6;
    for k in 0..w.len() {
        let mut plus = w.clone();
        let mut minus = w.clone();
        plus[k] += h;
        minus[k] -= h;
        let numeric = (f.value(&plus) - f.value(&minus)) / (2.0 * h);
        assert_relative_eq!(grad[k], numeric, epsilon = 1e-6);
    }
}

#[test]
fn test_directed_gradient_matches_finite_differences() {
    let pairs = PairIndex::new(3);
    let s: DenseIncidence = pairs.incidence(Orientation::Directed);
    let z = vec![0.2, 0.8, 0.5, 0.6, 0.1, 0.9];
    let f = Objective::new(&s, &z, 1.0, 0.4);

    let w = vec![0.7, 0.4, 1.3, 0.9, 0.5, 1.1];
    let grad = f.gradient(&w, &f.degrees(&w));

    let h = 1e-6;
    for k in 0..w.len() {
        let mut plus = w.clone();
        let mut minus = w.clone();
        plus[k] += h;
        minus[k] -= h;
        let numeric = (f.value(&plus) - f.value(&minus)) / (2.0 * h);
        assert_relative_eq!(grad[k], numeric, epsilon = 1e-6);
    }
}

#[test]
fn test_step_bound_is_positive_and_shrinks_with_mu() {
    let pairs = PairIndex::new(5);
    let s: SparseIncidence = pairs.incidence(Orientation::Undirected);
    let z = vec![0.5; pairs.npairs()];

    let loose = Objective::new(&s, &z, 1.0, 0.4).step_bound();
    let tight = Objective::new(&s, &z, 4.0, 0.4).step_bound();
    assert!(loose.is_finite() && loose > 0.0);
    assert!(tight < loose);
}
