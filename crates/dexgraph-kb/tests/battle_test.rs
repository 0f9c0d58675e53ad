//! Battle resolution and type effectiveness end to end

mod common;

use pretty_assertions::assert_eq;

use common::{ctx, init_test_tracing, kanto_graph, service};
use dexgraph_kb::data::creature_ids;
use dexgraph_kb::test_utils::{creature, InMemoryGraph};
use dexgraph_kb::{CoreError, CreatureId, SlotOutcome, Winner};

/// Slot 1 is Fire against Grass, slot 2 Normal against Normal and slot 3
/// Water against Water.
fn arena() -> InMemoryGraph {
    let graph = InMemoryGraph::new();
    graph
        .add_creature(creature(1, "Vulpix", "Fox Pokémon", &["Fire"]))
        .add_creature(creature(2, "Oddish", "Weed Pokémon", &["Grass", "Poison"]))
        .add_creature(creature(4, "Rattata", "Mouse Pokémon", &["Normal"]))
        .add_creature(creature(5, "Meowth", "Scratch Cat Pokémon", &["Normal"]))
        .add_creature(creature(7, "Psyduck", "Duck Pokémon", &["Water"]))
        .add_creature(creature(8, "Poliwag", "Tadpole Pokémon", &["Water"]))
        .add_creature(creature(147, "Dratini", "Dragon Pokémon", &["Dragon"]));
    graph
        .add_effective("Fire", "Grass")
        .add_effective("Water", "Fire")
        .add_effective("Grass", "Water")
        .add_effective("Dragon", "Dragon");
    graph
}

#[test_log::test(tokio::test)]
async fn test_one_sided_advantage_in_first_slot() {
    let graph = arena();
    let pokedex = service(&graph);

    let outcomes = pokedex
        .resolve_battle(&ctx(), &creature_ids(&[1, 4, 7]), &creature_ids(&[2, 5, 8]))
        .await
        .unwrap();

    assert_eq!(
        outcomes,
        vec![SlotOutcome::TeamA, SlotOutcome::Neutral, SlotOutcome::Neutral]
    );
    let values: Vec<i8> = outcomes.iter().map(|o| o.value()).collect();
    assert_eq!(values, vec![1, 0, 0]);
    assert_eq!(Winner::from_outcomes(&outcomes), Winner::A);
}

#[tokio::test]
async fn test_outcomes_follow_slot_order() {
    let graph = arena();
    let pokedex = service(&graph);

    let outcomes = pokedex
        .resolve_battle(&ctx(), &creature_ids(&[2, 7, 4]), &creature_ids(&[1, 1, 5]))
        .await
        .unwrap();

    // Grass loses to Fire, Water beats Fire, Normal mirrors Normal
    assert_eq!(
        outcomes,
        vec![SlotOutcome::TeamB, SlotOutcome::TeamA, SlotOutcome::Neutral]
    );
}

#[tokio::test]
async fn test_each_check_uses_its_own_released_session() {
    init_test_tracing();
    let graph = arena();
    let pokedex = service(&graph);

    pokedex
        .resolve_battle(&ctx(), &creature_ids(&[1, 4, 7]), &creature_ids(&[2, 5, 8]))
        .await
        .unwrap();

    assert_eq!(graph.sessions_opened(), 6);
    assert_eq!(graph.open_sessions(), 0);
}

#[tokio::test]
async fn test_uneven_teams_fail_before_any_query() {
    let graph = arena();
    let pokedex = service(&graph);

    let err = pokedex
        .resolve_battle(&ctx(), &creature_ids(&[1, 4, 7]), &creature_ids(&[2, 5]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::InvalidTeamComposition { team_a: 3, team_b: 2 }
    ));
    assert_eq!(graph.sessions_opened(), 0);
    assert_eq!(graph.statements_run(), 0);
}

#[tokio::test]
async fn test_empty_teams_resolve_to_no_slots() {
    let graph = arena();
    let outcomes = service(&graph)
        .resolve_battle(&ctx(), &[], &[])
        .await
        .unwrap();
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn test_graph_outage_makes_every_slot_neutral() {
    let graph = arena();
    graph.fail_statements(true);
    let pokedex = service(&graph);

    let outcomes = pokedex
        .resolve_battle(&ctx(), &creature_ids(&[1, 4, 7]), &creature_ids(&[2, 5, 8]))
        .await
        .unwrap();

    assert_eq!(outcomes, vec![SlotOutcome::Neutral; 3]);
    assert_eq!(graph.open_sessions(), 0);
}

#[tokio::test]
async fn test_self_effectiveness_needs_a_self_edge() {
    let graph = arena();
    let pokedex = service(&graph);

    assert!(pokedex.is_effective(&ctx(), CreatureId(147), CreatureId(147)).await);
    assert!(!pokedex.is_effective(&ctx(), CreatureId(1), CreatureId(1)).await);
}

#[tokio::test]
async fn test_effectiveness_uses_direct_edges_only() {
    let graph = kanto_graph();
    let pokedex = service(&graph);

    // Water beats Fire
    assert!(pokedex.is_effective(&ctx(), CreatureId(7), CreatureId(4)).await);
    assert!(!pokedex.is_effective(&ctx(), CreatureId(4), CreatureId(7)).await);
    // Water -> Fire -> Grass is a chain, not an edge
    assert!(!pokedex.is_effective(&ctx(), CreatureId(7), CreatureId(1)).await);
    // Electric reaches Charizard through its Flying type
    assert!(pokedex.is_effective(&ctx(), CreatureId(25), CreatureId(6)).await);
}

#[tokio::test]
async fn test_unknown_creatures_are_not_effective() {
    let graph = kanto_graph();
    let pokedex = service(&graph);

    assert!(!pokedex.is_effective(&ctx(), CreatureId(7), CreatureId(9999)).await);
    assert!(!pokedex.is_effective(&ctx(), CreatureId(9999), CreatureId(4)).await);
    // A missing side stops after the type lookup
    assert_eq!(graph.statements_run(), 2);
}
