//! Property tests for the path algebra, context normalisation and the node
//! directory.

use proptest::prelude::*;
use sst_rs::directory::{Diagnostic, NodeDirectory};
use sst_rs::model::{ArrowId, Link, NodeRef, Path, SizeClass};
use sst_rs::registry::{ContextRegistry, SEQUENCE_MARKER};
use sst_rs::solver::coarsen;

/// Arrows come in pairs (2k-1, 2k); the origin arrow is its own inverse.
fn paired_inverse(a: ArrowId) -> ArrowId {
    match a.0 {
        0 => a,
        n if n % 2 == 1 => ArrowId(n + 1),
        n => ArrowId(n - 1),
    }
}

fn n(i: u32) -> NodeRef {
    NodeRef::new(SizeClass::OneGram, i)
}

fn chain() -> impl Strategy<Value = Path> {
    (0u32..40, proptest::collection::vec((1i32..20, 0u32..40), 0..8)).prop_map(|(root, hops)| {
        let mut path = Path::rooted(n(root));
        for (arrow, dst) in hops {
            path.push(Link::new(ArrowId(arrow), n(dst)));
        }
        path
    })
}

fn labels() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            proptest::string::string_regex("[a-z ,]{0,12}").unwrap(),
            Just(SEQUENCE_MARKER.to_string()),
        ],
        0..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn adjoint_is_an_involution(path in chain()) {
        let twice = path.adjoint(paired_inverse).adjoint(paired_inverse);
        prop_assert_eq!(twice, path);
    }

    #[test]
    fn adjoint_reverses_nodes(path in chain()) {
        let forward: Vec<NodeRef> = path.nodes().collect();
        let mut backward: Vec<NodeRef> = path.adjoint(paired_inverse).nodes().collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn dag_iff_nodes_distinct(path in chain()) {
        let distinct: std::collections::HashSet<NodeRef> = path.nodes().collect();
        prop_assert_eq!(path.is_dag(), distinct.len() == path.len());
    }

    #[test]
    fn splice_keeps_both_ends(left in chain(), right in chain()) {
        let Some(meet) = left.end() else { return Ok(()); };
        let mut right = right;
        right.push(Link::new(ArrowId(1), meet));
        let joined = left.splice(&right.adjoint(paired_inverse));
        prop_assert_eq!(joined.start(), left.start());
        prop_assert_eq!(joined.end(), right.start());
        prop_assert_eq!(joined.hops(), left.hops() + right.hops());
    }

    #[test]
    fn context_normalisation_is_idempotent(raw in labels()) {
        let once = ContextRegistry::normalize(&raw);
        let twice = ContextRegistry::normalize(&once);
        prop_assert_eq!(&twice, &once);
        prop_assert!(once.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(once.iter().all(|l| !l.is_empty() && l != SEQUENCE_MARKER && !l.contains(',')));
    }

    #[test]
    fn equal_label_sets_share_a_context(raw in labels()) {
        let mut registry = ContextRegistry::new();
        let mut shuffled = raw.clone();
        shuffled.reverse();
        prop_assert_eq!(registry.resolve(&raw), registry.resolve(&shuffled));
    }

    #[test]
    fn insert_is_idempotent(texts in proptest::collection::vec("[a-c]{1,3}( [a-c]{1,3}){0,4}", 1..20)) {
        let mut dir = NodeDirectory::new();
        let mut quiet = |_: Diagnostic| {};
        let first: Vec<NodeRef> = texts.iter().map(|t| dir.insert(t, "ch", false, &mut quiet)).collect();
        let again: Vec<NodeRef> = texts.iter().map(|t| dir.insert(t, "ch", false, &mut quiet)).collect();
        prop_assert_eq!(&first, &again);
        for (text, nref) in texts.iter().zip(&first) {
            prop_assert_eq!(nref.class, SizeClass::of(text));
            prop_assert_eq!(dir.find_exact(text), Some(*nref));
        }
    }

    #[test]
    fn coarsening_partitions_every_node(paths in proptest::collection::vec(chain(), 1..6)) {
        let classes = coarsen(&paths, 8);
        let mut seen = std::collections::HashSet::new();
        for node in classes.iter().flatten() {
            prop_assert!(seen.insert(*node), "node {} in two classes", node);
        }
        for node in paths.iter().flat_map(|p| p.nodes()) {
            prop_assert!(seen.contains(&node));
        }
    }
}
