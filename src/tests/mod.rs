mod test_descent;
mod test_interactions;
mod test_objective;

use crate::graph::DiscoveryParams;
use crate::incidence::IncidenceKind;

/// Three entities: 1 and 2 share an item, 2 and 3 share two.
pub fn three_entity_sets() -> Vec<Vec<u32>> {
    vec![vec![1, 2], vec![2, 3, 4], vec![3, 4, 5]]
}

/// Two loose clusters of overlapping item sets.
pub fn clustered_sets() -> Vec<Vec<u32>> {
    vec![
        vec![1, 2, 3],
        vec![1, 2, 4],
        vec![2, 3, 4],
        vec![1, 3, 4],
        vec![10, 11, 12],
        vec![10, 11, 13],
        vec![11, 12, 13],
        vec![2, 10],
    ]
}

pub fn dense_params() -> DiscoveryParams {
    DiscoveryParams {
        incidence: IncidenceKind::Dense,
        ..DiscoveryParams::default()
    }
}
