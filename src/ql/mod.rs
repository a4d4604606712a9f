//! Query expression language
//!
//! This module provides the expression tree predicates are built from, a
//! fluent construction API, and the compilers that lower trees into filter,
//! sort and projection documents.

pub mod ast;
pub mod ops;
pub mod dsl;
pub mod resolver;
pub mod serializer;
pub mod sort;

pub use ast::{Expression, FactoryExpression, Operation, Order, OrderSpecifier, Param, Predicate};
pub use ops::Operator;
pub use serializer::FilterSerializer;
