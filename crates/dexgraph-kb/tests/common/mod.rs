//! Seeded graphs shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dexgraph_kb::test_utils::{creature, InMemoryGraph};
use dexgraph_kb::{Creature, PokedexService, TraceContext};

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dexgraph_kb=debug")
        .with_test_writer()
        .try_init();
}

fn described(mut creature: Creature, description: &str) -> Creature {
    creature.description = description.to_string();
    creature
}

/// Three starter lines plus Pikachu, with a cyclic type chart.
pub fn kanto_graph() -> InMemoryGraph {
    let graph = InMemoryGraph::new();
    graph
        .add_creature(described(
            creature(1, "Bulbasaur", "Seed Pokémon", &["Grass", "Poison"]),
            "A strange seed was planted on its back at birth.",
        ))
        .add_creature(creature(2, "Ivysaur", "Seed Pokémon", &["Grass", "Poison"]))
        .add_creature(creature(3, "Venusaur", "Seed Pokémon", &["Grass", "Poison"]))
        .add_creature(described(
            creature(4, "Charmander", "Lizard Pokémon", &["Fire"]),
            "The flame on its tail shows the strength of its life force.",
        ))
        .add_creature(described(
            creature(5, "Charmeleon", "Flame Pokémon", &["Fire"]),
            "It lashes about with its tail of fire.",
        ))
        .add_creature(creature(6, "Charizard", "Flame Pokémon", &["Fire", "Flying"]))
        .add_creature(creature(7, "Squirtle", "Tiny Turtle Pokémon", &["Water"]))
        .add_creature(creature(8, "Wartortle", "Turtle Pokémon", &["Water"]))
        .add_creature(creature(9, "Blastoise", "Shellfish Pokémon", &["Water"]))
        .add_creature(creature(25, "Pikachu", "Mouse Pokémon", &["Electric"]));
    graph
        .add_evolution(1, 2)
        .add_evolution(2, 3)
        .add_evolution(4, 5)
        .add_evolution(5, 6)
        .add_evolution(7, 8)
        .add_evolution(8, 9);
    graph
        .add_effective("Water", "Fire")
        .add_effective("Fire", "Grass")
        .add_effective("Grass", "Water")
        .add_effective("Electric", "Water")
        .add_effective("Electric", "Flying");
    graph
}

/// An acyclic chart where Fire has several counters.
///
/// Water and Rock beat Fire, Fire beats Grass, Electric beats Water and Ground
/// beats Electric.
pub fn counter_graph() -> InMemoryGraph {
    let graph = InMemoryGraph::new();
    graph
        .add_creature(creature(4, "Charmander", "Lizard Pokémon", &["Fire"]))
        .add_creature(creature(7, "Squirtle", "Tiny Turtle Pokémon", &["Water"]))
        .add_creature(creature(8, "Wartortle", "Turtle Pokémon", &["Water"]))
        .add_creature(creature(9, "Blastoise", "Shellfish Pokémon", &["Water"]))
        .add_creature(creature(25, "Pikachu", "Mouse Pokémon", &["Electric"]))
        .add_creature(creature(74, "Geodude", "Rock Pokémon", &["Rock", "Ground"]))
        .add_creature(creature(138, "Omanyte", "Spiral Pokémon", &["Rock", "Water"]))
        .add_creature(creature(270, "Lotad", "Water Weed Pokémon", &["Water", "Grass"]))
        .add_creature(creature(43, "Oddish", "Weed Pokémon", &["Grass", "Poison"]))
        .add_creature(creature(132, "Ditto", "Transform Pokémon", &[]));
    graph
        .add_effective("Water", "Fire")
        .add_effective("Rock", "Fire")
        .add_effective("Fire", "Grass")
        .add_effective("Electric", "Water")
        .add_effective("Ground", "Electric");
    graph
}

pub fn service(graph: &InMemoryGraph) -> PokedexService {
    service_with_timeout(graph, Duration::from_secs(5))
}

pub fn service_with_timeout(graph: &InMemoryGraph, timeout: Duration) -> PokedexService {
    PokedexService::new(Arc::new(graph.clone()), timeout)
}

pub fn ctx() -> TraceContext {
    TraceContext::new_root()
}

pub fn ids(creatures: &[Creature]) -> Vec<i64> {
    creatures.iter().map(|c| c.id.get()).collect()
}
