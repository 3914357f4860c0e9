use crate::error::Error;
use crate::interactions::{group_by_entity, group_contiguous, item_sets, Interaction};

fn records() -> Vec<Interaction<u32, &'static str>> {
    vec![
        Interaction::new(7, "a", 5.0),
        Interaction::new(7, "b", 2.0),
        Interaction::new(3, "a", 4.0),
        Interaction::new(3, "c", 3.0),
        Interaction::new(9, "d", 1.0),
    ]
}

#[test]
fn test_grouping_keeps_first_appearance_order() {
    let groups = group_by_entity(records(), 3.0);
    let ids: Vec<u32> = groups.iter().map(|g| g.entity).collect();
    assert_eq!(ids, vec![7, 3, 9]);

    assert_eq!(groups[0].items, vec!["a", "b"]);
    assert_eq!(groups[0].rated, vec!["a"]);
    assert_eq!(groups[1].rated, vec!["a", "c"]);
    assert!(groups[2].rated.is_empty());
}

#[test]
fn test_grouping_ignores_interleaving() {
    let mut shuffled = records();
    shuffled.swap(1, 3);
    shuffled.swap(0, 4);

    let mut a: Vec<(u32, Vec<&str>)> = group_by_entity(records(), 3.0)
        .into_iter()
        .map(|g| {
            let mut r = g.rated;
            r.sort();
            (g.entity, r)
        })
        .collect();
    let mut b: Vec<(u32, Vec<&str>)> = group_by_entity(shuffled, 3.0)
        .into_iter()
        .map(|g| {
            let mut r = g.rated;
            r.sort();
            (g.entity, r)
        })
        .collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_threshold_is_inclusive() {
    let groups = group_by_entity(records(), 4.0);
    assert_eq!(groups[0].rated, vec!["a"]);
    assert_eq!(groups[1].rated, vec!["a"]);

    let everything = group_by_entity(records(), f64::NEG_INFINITY);
    assert_eq!(everything[0].rated, everything[0].items);
}

#[test]
fn test_item_sets_selection() {
    let groups = group_by_entity(records(), 3.0);
    assert_eq!(item_sets(&groups, true), vec![vec!["a"], vec!["a", "c"], vec![]]);
    assert_eq!(item_sets(&groups, false)[0], vec!["a", "b"]);
}

#[test]
fn test_contiguous_stream_groups() {
    let groups = group_contiguous(records(), 3.0).unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[1].entity, 3);
    assert_eq!(groups[1].items, vec!["a", "c"]);
}

#[test]
fn test_fragmented_stream_is_rejected() {
    let mut stream = records();
    stream.push(Interaction::new(7, "z", 5.0));

    let err = group_contiguous(stream, 3.0).unwrap_err();
    assert_eq!(err, Error::FragmentedEntity { entity: "7".to_string(), position: 5 });
}

#[test]
fn test_empty_stream() {
    let none: Vec<Interaction<u32, u32>> = Vec::new();
    assert!(group_by_entity(none.clone(), 3.0).is_empty());
    assert!(group_contiguous(none, 3.0).unwrap().is_empty());
}
