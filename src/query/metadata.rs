//! Query metadata
//!
//! Everything a builder call records about a query: the where conjuncts,
//! the distinct flag, limit and offset, sort keys, projection, joins and
//! parameter bindings. Compilation reads it without consuming it.

use crate::core::errors::{QueryError, Result};
use crate::core::path::Path;
use crate::core::value::Value;
use crate::ql::ast::{Expression, OrderSpecifier, Param, Predicate};

/// Limit and offset, set together by `restrict`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryModifiers {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryModifiers {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        QueryModifiers { limit, offset }
    }

    pub fn limit(limit: u64) -> Self {
        QueryModifiers { limit: Some(limit), offset: None }
    }

    pub fn offset(offset: u64) -> Self {
        QueryModifiers { limit: None, offset: Some(offset) }
    }

    pub fn is_restricting(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }
}

/// Types of joins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Default,
    Inner,
    Join,
    LeftJoin,
    RightJoin,
    FullJoin,
}

/// A cross-entity reference recorded on the query
#[derive(Debug, Clone, PartialEq)]
pub struct JoinExpression {
    pub kind: JoinType,
    /// The joined expression, usually a reference path
    pub target: Expression,
    pub alias: Option<Path>,
    /// Extra conditions on the joined entity
    pub condition: Option<Predicate>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryMetadata {
    conjuncts: Vec<Predicate>,
    distinct: bool,
    modifiers: QueryModifiers,
    order_by: Vec<OrderSpecifier>,
    projection: Option<Expression>,
    joins: Vec<JoinExpression>,
    params: Vec<(Param, Value)>,
}

impl QueryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a conjunct to the where clause
    pub fn add_where(&mut self, predicate: Predicate) {
        self.conjuncts.push(predicate);
    }

    pub fn conjuncts(&self) -> &[Predicate] {
        &self.conjuncts
    }

    /// The where clause: every conjunct ANDed, in insertion order
    pub fn where_predicate(&self) -> Option<Predicate> {
        Predicate::all_of(self.conjuncts.iter().cloned())
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.modifiers.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.modifiers.offset = Some(offset);
    }

    /// Replace limit and offset together
    pub fn set_modifiers(&mut self, modifiers: QueryModifiers) {
        self.modifiers = modifiers;
    }

    pub fn modifiers(&self) -> QueryModifiers {
        self.modifiers
    }

    pub fn add_order_by(&mut self, order: OrderSpecifier) {
        self.order_by.push(order);
    }

    pub fn order_by(&self) -> &[OrderSpecifier] {
        &self.order_by
    }

    pub fn set_projection(&mut self, projection: Option<Expression>) {
        self.projection = projection;
    }

    pub fn projection(&self) -> Option<&Expression> {
        self.projection.as_ref()
    }

    pub fn add_join(&mut self, join: JoinExpression) {
        self.joins.push(join);
    }

    /// Attach a condition to the most recent join
    pub fn add_join_condition(&mut self, condition: Predicate) -> Result<()> {
        let join = self
            .joins
            .last_mut()
            .ok_or_else(|| QueryError::InvalidArgument("no join to attach a condition to".into()))?;
        join.condition = match join.condition.take() {
            Some(existing) => Some(existing.and(condition)),
            None => Some(condition),
        };
        Ok(())
    }

    pub fn joins(&self) -> &[JoinExpression] {
        &self.joins
    }

    /// Bind a parameter, replacing any previous binding
    pub fn set_param(&mut self, param: Param, value: Value) {
        match self.params.iter_mut().find(|(p, _)| *p == param) {
            Some(binding) => binding.1 = value,
            None => self.params.push((param, value)),
        }
    }

    pub fn param(&self, param: &Param) -> Option<&Value> {
        self.params.iter().find(|(p, _)| p == param).map(|(_, v)| v)
    }

    pub fn params(&self) -> &[(Param, Value)] {
        &self.params
    }
}
