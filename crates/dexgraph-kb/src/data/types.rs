//! Value types exchanged with the graph engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single column value, either bound as a statement parameter or read back
/// from a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataPacket {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<DataPacket>),
}

/// One result row, keyed by the statement's `RETURN ... AS` aliases.
pub type GraphRow = HashMap<String, DataPacket>;

impl DataPacket {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataPacket::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataPacket::Integer(i) => Some(*i),
            // Drivers sometimes widen integers to floats; accept exact ones
            DataPacket::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<DataPacket>> {
        match self {
            DataPacket::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Reads a list of strings, skipping non-string members.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        self.as_array().map(|arr| {
            arr.iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }
}

impl From<&str> for DataPacket {
    fn from(s: &str) -> Self {
        DataPacket::String(s.to_string())
    }
}

impl From<String> for DataPacket {
    fn from(s: String) -> Self {
        DataPacket::String(s)
    }
}

impl From<i64> for DataPacket {
    fn from(i: i64) -> Self {
        DataPacket::Integer(i)
    }
}

impl From<bool> for DataPacket {
    fn from(b: bool) -> Self {
        DataPacket::Bool(b)
    }
}

impl<T: Into<DataPacket>> From<Vec<T>> for DataPacket {
    fn from(items: Vec<T>) -> Self {
        DataPacket::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list_skips_non_strings() {
        let packet = DataPacket::Array(vec![
            DataPacket::from("Grass"),
            DataPacket::Null,
            DataPacket::from("Poison"),
        ]);
        assert_eq!(
            packet.as_string_list(),
            Some(vec!["Grass".to_string(), "Poison".to_string()])
        );
    }

    #[test]
    fn test_as_i64_accepts_whole_numbers_only() {
        assert_eq!(DataPacket::Integer(4).as_i64(), Some(4));
        assert_eq!(DataPacket::Number(4.0).as_i64(), Some(4));
        assert_eq!(DataPacket::Number(4.5).as_i64(), None);
        assert_eq!(DataPacket::from("4").as_i64(), None);
    }

    #[test]
    fn test_vec_into_array() {
        let packet = DataPacket::from(vec![1_i64, 2]);
        assert_eq!(
            packet,
            DataPacket::Array(vec![DataPacket::Integer(1), DataPacket::Integer(2)])
        );
    }
}
