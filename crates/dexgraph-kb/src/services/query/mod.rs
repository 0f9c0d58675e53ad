//! Statement construction and row projection

pub mod builder;
pub mod projection;
pub mod statement;

pub use builder::{CreatureFilter, Page, QueryBuilder, SearchPredicate, SearchQuery, UNBOUNDED};
pub use statement::{ColumnKind, GraphStatement};
