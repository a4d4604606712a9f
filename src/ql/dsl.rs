//! Fluent construction of predicates and orderings
//!
//! ```ignore
//! let user = Path::variable("user");
//! let adults = user.property("age").goe(18)
//!     .and(user.property("name").starts_with("Jan"));
//! ```

use crate::core::path::Path;
use crate::core::value::Value;
use crate::ql::ast::{Expression, Operation, Order, OrderSpecifier, Predicate};
use crate::ql::ops::Operator;

impl Path {
    fn binary<V: Into<Value>>(&self, operator: Operator, value: V) -> Predicate {
        Predicate::operation(operator, vec![self.into(), Expression::Constant(value.into())])
    }

    fn unary(&self, operator: Operator) -> Predicate {
        Predicate::operation(operator, vec![self.into()])
    }

    pub fn eq<V: Into<Value>>(&self, value: V) -> Predicate {
        self.binary(Operator::Eq, value)
    }

    pub fn ne<V: Into<Value>>(&self, value: V) -> Predicate {
        self.binary(Operator::Ne, value)
    }

    pub fn lt<V: Into<Value>>(&self, value: V) -> Predicate {
        self.binary(Operator::Lt, value)
    }

    pub fn gt<V: Into<Value>>(&self, value: V) -> Predicate {
        self.binary(Operator::Gt, value)
    }

    pub fn loe<V: Into<Value>>(&self, value: V) -> Predicate {
        self.binary(Operator::Loe, value)
    }

    pub fn goe<V: Into<Value>>(&self, value: V) -> Predicate {
        self.binary(Operator::Goe, value)
    }

    /// Inclusive range
    pub fn between<A: Into<Value>, B: Into<Value>>(&self, lower: A, upper: B) -> Predicate {
        Predicate::operation(
            Operator::Between,
            vec![
                self.into(),
                Expression::Constant(lower.into()),
                Expression::Constant(upper.into()),
            ],
        )
    }

    pub fn is_in<V: Into<Value>>(&self, values: Vec<V>) -> Predicate {
        self.binary(Operator::In, Value::from(values))
    }

    pub fn not_in<V: Into<Value>>(&self, values: Vec<V>) -> Predicate {
        self.binary(Operator::NotIn, Value::from(values))
    }

    /// Membership in the values held by another field
    pub fn in_path(&self, other: &Path) -> Predicate {
        Predicate::operation(Operator::In, vec![self.into(), other.into()])
    }

    pub fn is_null(&self) -> Predicate {
        self.unary(Operator::IsNull)
    }

    pub fn is_not_null(&self) -> Predicate {
        self.unary(Operator::IsNotNull)
    }

    pub fn starts_with(&self, prefix: &str) -> Predicate {
        self.binary(Operator::StartsWith, prefix)
    }

    pub fn starts_with_ignore_case(&self, prefix: &str) -> Predicate {
        self.binary(Operator::StartsWithIc, prefix)
    }

    pub fn ends_with(&self, suffix: &str) -> Predicate {
        self.binary(Operator::EndsWith, suffix)
    }

    pub fn ends_with_ignore_case(&self, suffix: &str) -> Predicate {
        self.binary(Operator::EndsWithIc, suffix)
    }

    pub fn equals_ignore_case(&self, value: &str) -> Predicate {
        self.binary(Operator::EqIgnoreCase, value)
    }

    pub fn contains(&self, needle: &str) -> Predicate {
        self.binary(Operator::StringContains, needle)
    }

    pub fn contains_ignore_case(&self, needle: &str) -> Predicate {
        self.binary(Operator::StringContainsIc, needle)
    }

    /// Match a caller-supplied regular expression, used verbatim
    pub fn matches(&self, pattern: &str) -> Predicate {
        self.binary(Operator::Matches, pattern)
    }

    pub fn matches_ignore_case(&self, pattern: &str) -> Predicate {
        self.binary(Operator::MatchesIc, pattern)
    }

    /// SQL LIKE pattern (`%` any run, `_` any single character)
    pub fn like(&self, pattern: &str) -> Predicate {
        self.binary(Operator::Like, pattern)
    }

    /// The string field is empty
    pub fn is_empty_string(&self) -> Predicate {
        self.unary(Operator::StringIsEmpty)
    }

    /// The collection field is missing or has no elements
    pub fn is_empty(&self) -> Predicate {
        self.unary(Operator::ColIsEmpty)
    }

    pub fn is_not_empty(&self) -> Predicate {
        self.is_empty().not()
    }

    /// Size of the collection field
    pub fn size(&self) -> SizeExpression {
        SizeExpression(Operation::new(Operator::ColSize, vec![self.into()]))
    }

    pub fn contains_key<V: Into<Value>>(&self, key: V) -> Predicate {
        self.binary(Operator::ContainsKey, key)
    }

    pub fn asc(&self) -> OrderSpecifier {
        OrderSpecifier::new(self.clone(), Order::Asc)
    }

    pub fn desc(&self) -> OrderSpecifier {
        OrderSpecifier::new(self.clone(), Order::Desc)
    }
}

/// Size of a collection, comparable to an integer
#[derive(Debug, Clone, PartialEq)]
pub struct SizeExpression(Operation);

impl SizeExpression {
    pub fn eq(&self, size: i64) -> Predicate {
        Predicate::operation(
            Operator::Eq,
            vec![self.0.clone().into(), Expression::Constant(Value::Integer(size))],
        )
    }
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::operation(Operator::And, vec![self.into(), other.into()])
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::operation(Operator::Or, vec![self.into(), other.into()])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Predicate {
        Predicate::operation(Operator::Not, vec![self.into()])
    }
}
