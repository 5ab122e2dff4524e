//! End-to-end orbit assembly over a small kitchen graph.

use pretty_assertions::assert_eq;
use sst_rs::config::{ArrowName, ArrowPairDecl, EngineConfig};
use sst_rs::model::RelationClass;
use sst_rs::storage::MemoryBackend;
use sst_rs::{Graph, NodeRef, SpacetimeType, NO_CONTEXT};

/// tea -has-> leaves -in-> plant, tea -then-> drink -then-> refresh
async fn setup_tea() -> (Graph<MemoryBackend>, Vec<NodeRef>) {
    let config = EngineConfig {
        arrows: vec![
            ArrowPairDecl::new(
                RelationClass::LeadsTo,
                ArrowName::new("then", "leads to next"),
                ArrowName::new("from", "comes after"),
            ),
            ArrowPairDecl::new(
                RelationClass::Contains,
                ArrowName::new("has", "contains"),
                ArrowName::new("in", "is part of"),
            ),
        ],
        ..EngineConfig::default()
    };
    let graph = Graph::open_memory_with(config).await.unwrap();

    let mut n = Vec::new();
    for name in ["tea", "leaves", "plant", "drink", "refresh"] {
        n.push(graph.insert(name, "kitchen").await.unwrap());
    }
    graph.connect(n[0], "has", n[1], &["botany"], 1.0).await.unwrap();
    graph.connect(n[1], "in", n[2], NO_CONTEXT, 1.0).await.unwrap();
    graph.connect(n[0], "then", n[3], NO_CONTEXT, 1.0).await.unwrap();
    graph.connect(n[3], "then", n[4], NO_CONTEXT, 1.0).await.unwrap();
    (graph, n)
}

#[tokio::test]
async fn test_orbit_buckets_by_first_hop() {
    let (graph, n) = setup_tea().await;
    let orbit = graph.orbit(n[0], "").await.unwrap();
    assert_eq!(orbit.center, Some(n[0]));

    let leads: Vec<(&str, usize)> = orbit
        .bucket(SpacetimeType::LeadsTo)
        .iter()
        .map(|s| (s.text.as_str(), s.radius))
        .collect();
    assert_eq!(leads, vec![("drink", 1), ("refresh", 2)]);
    assert_eq!(orbit.bucket(SpacetimeType::LeadsTo)[0].arrow, "leads to next");

    let contains = orbit.bucket(SpacetimeType::Contains);
    assert_eq!(contains.len(), 1);
    assert_eq!(contains[0].text, "leaves");
    assert_eq!(contains[0].context, vec!["botany"]);

    assert_eq!(orbit.len(), 3);
}

#[tokio::test]
async fn test_orbit_skips_backtracking_hop() {
    let (graph, n) = setup_tea().await;
    let orbit = graph.orbit(n[0], "").await.unwrap();
    assert!(orbit.iter().all(|(_, s)| s.dst != n[2]));
}

#[tokio::test]
async fn test_orbit_excludes_arrow_by_either_name() {
    let (graph, n) = setup_tea().await;

    let orbit = graph.orbit(n[0], "then").await.unwrap();
    assert!(orbit.bucket(SpacetimeType::LeadsTo).is_empty());
    assert_eq!(orbit.bucket(SpacetimeType::Contains).len(), 1);

    let orbit = graph.orbit(n[0], "contains").await.unwrap();
    assert!(orbit.bucket(SpacetimeType::Contains).is_empty());
    assert_eq!(orbit.bucket(SpacetimeType::LeadsTo).len(), 2);
}

#[tokio::test]
async fn test_isolated_node_has_empty_orbit() {
    let (graph, _) = setup_tea().await;
    let lone = graph.insert("lonely", "kitchen").await.unwrap();
    let orbit = graph.orbit(lone, "").await.unwrap();
    assert!(orbit.is_empty());
}
