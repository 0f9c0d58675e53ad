//! Read-only graph statements issued by the core
//!
//! Each variant compiles to fixed Cypher text plus a parameter map. User input
//! only ever travels in the parameter map; the text of a statement depends on
//! nothing but which clauses are present.

use std::collections::HashMap;

use crate::data::{CreatureId, DataPacket};
use crate::services::query::builder::{Page, SearchPredicate};

/// How a returned column should be read from a driver row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    TextList,
}

/// Columns of every statement that returns creatures.
pub const CREATURE_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Integer),
    ("name", ColumnKind::Text),
    ("description", ColumnKind::Text),
    ("hires", ColumnKind::Text),
    ("thumbnail", ColumnKind::Text),
    ("sprite", ColumnKind::Text),
    ("species", ColumnKind::Text),
    ("types", ColumnKind::TextList),
];

const EVOLUTION_COLUMNS: &[(&str, ColumnKind)] = &[
    ("source", ColumnKind::Integer),
    ("target", ColumnKind::Integer),
];

const TYPE_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Integer),
    ("type", ColumnKind::Text),
];

const EFFECTIVE_COLUMNS: &[(&str, ColumnKind)] = &[
    ("attacking", ColumnKind::Text),
    ("defending", ColumnKind::Text),
];

const CREATURE_PROJECTION: &str = "OPTIONAL MATCH (p)-[:Has]->(t:Type)
RETURN p.id AS id, p.name AS name, p.description AS description,
       p.hires AS hires, p.thumbnail AS thumbnail, p.sprite AS sprite,
       s.name AS species, collect(t.name) AS types";

/// A read-only statement against the creature graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphStatement {
    /// Listing (no predicate) or search over all creatures.
    Creatures {
        predicate: Option<SearchPredicate>,
        page: Page,
    },
    /// Creatures with the given ids, in the engine's natural order.
    CreaturesById { ids: Vec<CreatureId> },
    /// One hop of `Evolution_Next` out of the given creatures.
    EvolvesInto { ids: Vec<CreatureId> },
    /// `(id, type)` pairs for the given creatures.
    TypesOf { ids: Vec<CreatureId> },
    /// `Effective` edges from any of `attacking` to any of `defending`.
    EffectiveBetween {
        attacking: Vec<String>,
        defending: Vec<String>,
    },
    /// Every `Effective` edge in the graph.
    EffectiveChart,
    /// Creatures owning at least one of the given types.
    CreaturesWithTypes { types: Vec<String> },
}

impl GraphStatement {
    /// Short name used in logs and spans.
    pub fn name(&self) -> &'static str {
        match self {
            GraphStatement::Creatures { predicate: None, .. } => "list_creatures",
            GraphStatement::Creatures { predicate: Some(_), .. } => "search_creatures",
            GraphStatement::CreaturesById { .. } => "creatures_by_id",
            GraphStatement::EvolvesInto { .. } => "evolves_into",
            GraphStatement::TypesOf { .. } => "types_of",
            GraphStatement::EffectiveBetween { .. } => "effective_between",
            GraphStatement::EffectiveChart => "effective_chart",
            GraphStatement::CreaturesWithTypes { .. } => "creatures_with_types",
        }
    }

    pub fn columns(&self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            GraphStatement::Creatures { .. }
            | GraphStatement::CreaturesById { .. }
            | GraphStatement::CreaturesWithTypes { .. } => CREATURE_COLUMNS,
            GraphStatement::EvolvesInto { .. } => EVOLUTION_COLUMNS,
            GraphStatement::TypesOf { .. } => TYPE_COLUMNS,
            GraphStatement::EffectiveBetween { .. } | GraphStatement::EffectiveChart => {
                EFFECTIVE_COLUMNS
            }
        }
    }

    pub fn cypher(&self) -> String {
        match self {
            GraphStatement::Creatures { predicate, page } => {
                let mut text = String::from("MATCH (p:Pokemon)-[:Is]->(s:Specie)\n");
                if let Some(predicate) = predicate {
                    text.push_str(&format!("WHERE {}\n", where_clause(predicate)));
                }
                text.push_str("WITH p, s\n");
                if page.offset > 0 {
                    text.push_str("SKIP $skip\n");
                }
                if page.limit.is_some() {
                    text.push_str("LIMIT $limit\n");
                }
                text.push_str(CREATURE_PROJECTION);
                text
            }
            GraphStatement::CreaturesById { .. } => format!(
                "MATCH (p:Pokemon)-[:Is]->(s:Specie)\nWHERE p.id IN $ids\n{}",
                CREATURE_PROJECTION
            ),
            GraphStatement::EvolvesInto { .. } => {
                "MATCH (p:Pokemon)-[:Evolution_Next]->(n:Pokemon)
WHERE p.id IN $ids
RETURN p.id AS source, n.id AS target"
                    .to_string()
            }
            GraphStatement::TypesOf { .. } => "MATCH (p:Pokemon)-[:Has]->(t:Type)
WHERE p.id IN $ids
RETURN p.id AS id, t.name AS type"
                .to_string(),
            GraphStatement::EffectiveBetween { .. } => "MATCH (a:Type)-[:Effective]->(d:Type)
WHERE a.name IN $attacking AND d.name IN $defending
RETURN a.name AS attacking, d.name AS defending"
                .to_string(),
            GraphStatement::EffectiveChart => "MATCH (a:Type)-[:Effective]->(d:Type)
RETURN a.name AS attacking, d.name AS defending"
                .to_string(),
            GraphStatement::CreaturesWithTypes { .. } => format!(
                "MATCH (p:Pokemon)-[:Is]->(s:Specie)
WHERE ANY(owned IN [(p)-[:Has]->(ht:Type) | ht.name] WHERE owned IN $types)
{}",
                CREATURE_PROJECTION
            ),
        }
    }

    pub fn params(&self) -> HashMap<String, DataPacket> {
        let mut params = HashMap::new();
        match self {
            GraphStatement::Creatures { predicate, page } => {
                if let Some(predicate) = predicate {
                    if let Some(name) = &predicate.name {
                        params.insert("name".to_string(), DataPacket::from(name.as_str()));
                    }
                    if let Some(description) = &predicate.description {
                        params.insert(
                            "description".to_string(),
                            DataPacket::from(description.as_str()),
                        );
                    }
                    if let Some(species) = &predicate.species {
                        params.insert("species".to_string(), DataPacket::from(species.as_str()));
                    }
                    if !predicate.types.is_empty() {
                        params.insert("types".to_string(), DataPacket::from(predicate.types.clone()));
                    }
                }
                if page.offset > 0 {
                    params.insert("skip".to_string(), DataPacket::Integer(page.offset as i64));
                }
                if let Some(limit) = page.limit {
                    params.insert("limit".to_string(), DataPacket::Integer(limit as i64));
                }
            }
            GraphStatement::CreaturesById { ids }
            | GraphStatement::EvolvesInto { ids }
            | GraphStatement::TypesOf { ids } => {
                params.insert("ids".to_string(), id_list(ids));
            }
            GraphStatement::EffectiveBetween { attacking, defending } => {
                params.insert("attacking".to_string(), DataPacket::from(attacking.clone()));
                params.insert("defending".to_string(), DataPacket::from(defending.clone()));
            }
            GraphStatement::EffectiveChart => {}
            GraphStatement::CreaturesWithTypes { types } => {
                params.insert("types".to_string(), DataPacket::from(types.clone()));
            }
        }
        params
    }
}

fn where_clause(predicate: &SearchPredicate) -> String {
    let mut clauses = Vec::new();
    if predicate.name.is_some() {
        clauses.push("p.name CONTAINS $name");
    }
    if predicate.description.is_some() {
        clauses.push("p.description CONTAINS $description");
    }
    if predicate.species.is_some() {
        clauses.push("s.name CONTAINS $species");
    }
    if !predicate.types.is_empty() {
        clauses.push("ANY(owned IN [(p)-[:Has]->(ft:Type) | ft.name] WHERE owned IN $types)");
    }
    if clauses.is_empty() {
        "false".to_string()
    } else {
        clauses.join(" OR ")
    }
}

fn id_list(ids: &[CreatureId]) -> DataPacket {
    DataPacket::Array(ids.iter().map(|id| DataPacket::Integer(id.get())).collect())
}
