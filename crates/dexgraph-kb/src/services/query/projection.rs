//! Projection of raw graph rows into view objects

use crate::data::{Creature, CreatureId, DataPacket, GraphRow, StateStoreError};

pub fn creature_from_row(row: &GraphRow) -> Result<Creature, StateStoreError> {
    let id = required_i64(row, "id")?;
    let name = row
        .get("name")
        .and_then(DataPacket::as_str)
        .ok_or_else(|| StateStoreError::MappingError(format!("creature {} has no name", id)))?
        .to_string();

    Ok(Creature {
        id: CreatureId(id),
        name,
        species: text(row, "species"),
        description: text(row, "description"),
        hires: text(row, "hires"),
        thumbnail: text(row, "thumbnail"),
        sprite: text(row, "sprite"),
        types: row
            .get("types")
            .and_then(DataPacket::as_string_list)
            .unwrap_or_default(),
    })
}

/// Projects every row; a single malformed row fails the whole result.
pub fn creatures_from_rows(rows: &[GraphRow]) -> Result<Vec<Creature>, StateStoreError> {
    rows.iter().map(creature_from_row).collect()
}

pub fn required_i64(row: &GraphRow, column: &str) -> Result<i64, StateStoreError> {
    row.get(column)
        .and_then(DataPacket::as_i64)
        .ok_or_else(|| StateStoreError::MappingError(format!("missing integer column '{}'", column)))
}

pub fn required_str<'a>(row: &'a GraphRow, column: &str) -> Result<&'a str, StateStoreError> {
    row.get(column)
        .and_then(DataPacket::as_str)
        .ok_or_else(|| StateStoreError::MappingError(format!("missing text column '{}'", column)))
}

fn text(row: &GraphRow, column: &str) -> String {
    row.get(column)
        .and_then(DataPacket::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(entries: Vec<(&str, DataPacket)>) -> GraphRow {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_projects_full_row() {
        let creature = creature_from_row(&row(vec![
            ("id", DataPacket::Integer(4)),
            ("name", DataPacket::from("Charmander")),
            ("species", DataPacket::from("Lizard Pokémon")),
            ("description", DataPacket::from("The flame on its tail shows its life force.")),
            ("types", DataPacket::from(vec!["Fire".to_string()])),
        ]))
        .unwrap();

        assert_eq!(creature.id, CreatureId(4));
        assert_eq!(creature.species, "Lizard Pokémon");
        assert_eq!(creature.types, vec!["Fire".to_string()]);
        assert_eq!(creature.sprite, "");
    }

    #[test]
    fn test_null_optional_fields_become_empty() {
        let creature = creature_from_row(&row(vec![
            ("id", DataPacket::Integer(4)),
            ("name", DataPacket::from("Charmander")),
            ("description", DataPacket::Null),
            ("types", DataPacket::Null),
        ]))
        .unwrap();
        assert_eq!(creature.description, "");
        assert!(creature.types.is_empty());
    }

    #[test]
    fn test_missing_id_is_a_mapping_error() {
        let result = creature_from_row(&row(vec![("name", DataPacket::from("Missingno"))]));
        assert!(matches!(result, Err(StateStoreError::MappingError(_))));
    }

    #[test]
    fn test_one_bad_row_fails_all() {
        let rows = vec![
            row(vec![("id", DataPacket::Integer(1)), ("name", DataPacket::from("Bulbasaur"))]),
            row(vec![("id", DataPacket::Integer(2))]),
        ];
        assert!(creatures_from_rows(&rows).is_err());
    }
}
