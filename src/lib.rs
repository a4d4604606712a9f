//! docquery: predicate compilation for document stores
//!
//! This crate lowers typed predicate expression trees into the filter, sort
//! and projection documents a document store's find operation understands,
//! and drives a collection with them through a small query builder.

pub mod core;
pub mod ql;
pub mod query;

// Main types
pub use crate::core::document::Document;
pub use crate::core::errors::{CollectionError, QueryError, Result};
pub use crate::core::path::{Path, PathKind};
pub use crate::core::store::{Collection, FindHandle};
pub use crate::core::value::Value;
pub use crate::ql::ast::{Expression, Order, OrderSpecifier, Predicate};
pub use crate::ql::ops::Operator;
pub use crate::ql::serializer::FilterSerializer;
pub use crate::query::{CompiledQuery, Query, QueryConfig, QueryMetadata, QueryModifiers};
