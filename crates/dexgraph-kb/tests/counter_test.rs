//! Counter selection end to end

mod common;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{counter_graph, ctx, ids, kanto_graph, service};
use dexgraph_kb::services::GraphAccess;
use dexgraph_kb::test_utils::creature;
use dexgraph_kb::{CounterFinder, CounterTarget, CreatureId};

fn finder(graph: &dexgraph_kb::test_utils::InMemoryGraph) -> CounterFinder {
    CounterFinder::new(GraphAccess::new(Arc::new(graph.clone()), Duration::from_secs(5)))
}

#[tokio::test]
async fn test_pool_for_a_single_creature() {
    let graph = counter_graph();

    let pool = finder(&graph)
        .candidates(&ctx(), &CounterTarget::Single(CreatureId(4)))
        .await
        .unwrap();

    // Water and Rock beat Fire. Lotad is dropped because Fire already beats Grass.
    // Omanyte qualifies twice but is listed once.
    let mut found = ids(&pool);
    found.sort();
    assert_eq!(found, vec![7, 8, 9, 74, 138]);
}

#[tokio::test]
async fn test_pool_for_a_team_excludes_its_members() {
    let graph = counter_graph();

    let pool = finder(&graph)
        .candidates(&ctx(), &CounterTarget::Many(vec![CreatureId(7), CreatureId(4)]))
        .await
        .unwrap();

    // Electric now qualifies against Water; Squirtle is in the query set
    let mut found = ids(&pool);
    found.sort();
    assert_eq!(found, vec![8, 9, 25, 74, 138]);
}

#[tokio::test]
async fn test_counters_survive_a_cyclic_chart() {
    let graph = kanto_graph();
    let pokedex = service(&graph);

    // Water -> Fire -> Grass -> Water: the chain back into Water passes
    // through the counter's own type, so Squirtle still counters Charmander
    assert!(pokedex.is_effective(&ctx(), CreatureId(7), CreatureId(4)).await);
    assert!(!pokedex.is_effective(&ctx(), CreatureId(4), CreatureId(7)).await);

    let counter = pokedex
        .find_counter(&ctx(), &CounterTarget::Single(CreatureId(4)))
        .await
        .unwrap()
        .expect("a Water creature counters Charmander");
    assert!(counter.types.contains(&"Water".to_string()));

    let finder = finder(&graph);
    let expected: [(i64, Vec<i64>); 3] = [
        (4, vec![7, 8, 9]),
        (7, vec![1, 2, 3, 25]),
        (1, vec![4, 5, 6]),
    ];
    for (query, pool) in expected {
        let mut found = ids(
            &finder
                .candidates(&ctx(), &CounterTarget::Single(CreatureId(query)))
                .await
                .unwrap(),
        );
        found.sort();
        assert_eq!(found, pool, "counters for {}", query);
    }
}

#[tokio::test]
async fn test_transitively_beaten_candidates_are_excluded() {
    let graph = counter_graph();
    graph
        .add_creature(creature(195, "Quagsire", "Water Fish Pokémon", &["Water", "Ground"]))
        .add_effective("Grass", "Ground");

    // Fire -> Grass -> Ground, so Geodude and Quagsire are already beaten
    let pool = finder(&graph)
        .candidates(&ctx(), &CounterTarget::Single(CreatureId(4)))
        .await
        .unwrap();
    let mut found = ids(&pool);
    found.sort();
    assert_eq!(found, vec![7, 8, 9, 138]);
}

#[tokio::test]
async fn test_no_counter_for_typeless_or_unknown_creatures() {
    let graph = counter_graph();
    let pokedex = service(&graph);

    for id in [132, 9999] {
        let counter = pokedex
            .find_counter(&ctx(), &CounterTarget::Single(CreatureId(id)))
            .await
            .unwrap();
        assert_eq!(counter, None, "creature {}", id);
    }
    assert_eq!(graph.open_sessions(), 0);
}

#[tokio::test]
async fn test_seeded_selection_is_reproducible() {
    let graph = counter_graph();
    let pokedex = service(&graph);
    let target = CounterTarget::Single(CreatureId(4));

    let mut picks = Vec::new();
    for _ in 0..2 {
        let mut rng = StdRng::seed_from_u64(99);
        let mut run = Vec::new();
        for _ in 0..10 {
            let counter = pokedex.find_counter_with(&ctx(), &target, &mut rng).await.unwrap();
            run.push(counter.map(|c| c.id));
        }
        picks.push(run);
    }
    assert_eq!(picks[0], picks[1]);
}

#[tokio::test]
async fn test_selection_is_uniform_over_the_pool() {
    let graph = counter_graph();
    let pokedex = service(&graph);
    let target = CounterTarget::Single(CreatureId(4));
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let trials = 2500;
    let mut counts: HashMap<i64, u32> = HashMap::new();
    for _ in 0..trials {
        let counter = pokedex
            .find_counter_with(&ctx(), &target, &mut rng)
            .await
            .unwrap()
            .expect("pool is not empty");
        *counts.entry(counter.id.get()).or_default() += 1;
    }

    let mut chosen: Vec<i64> = counts.keys().copied().collect();
    chosen.sort();
    assert_eq!(chosen, vec![7, 8, 9, 74, 138]);

    let expected = trials as f64 / 5.0;
    let chi_square: f64 = counts
        .values()
        .map(|&observed| (observed as f64 - expected).powi(2) / expected)
        .sum();
    // df = 4, p = 0.001
    assert!(chi_square < 18.47, "chi-square {} for {:?}", chi_square, counts);
}

#[tokio::test]
async fn test_counter_lookup_fails_soft_on_outage() {
    let graph = counter_graph();
    graph.fail_statements(true);

    let counter = service(&graph)
        .find_counter(&ctx(), &CounterTarget::Single(CreatureId(4)))
        .await
        .unwrap();
    assert_eq!(counter, None);
    assert_eq!(graph.open_sessions(), 0);
}
