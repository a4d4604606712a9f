//! Abstract Syntax Tree for query expressions
//!
//! This module defines the immutable expression tree that predicates,
//! orderings and projections are built from.

use std::fmt;

use crate::core::path::Path;
use crate::core::value::Value;
use crate::ql::ops::Operator;

/// Types of expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value
    Constant(Value),
    /// A field reference
    Path(Path),
    /// An operator applied to arguments
    Operation(Operation),
    /// A nested query
    SubQuery(SubQuery),
    /// A bound parameter placeholder
    Param(Param),
    /// A raw template
    Template(Template),
    /// A constructor over several expressions, used for projections
    Factory(FactoryExpression),
}

impl Expression {
    /// Short name of the node kind
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Constant(_) => "constant",
            Expression::Path(_) => "path",
            Expression::Operation(_) => "operation",
            Expression::SubQuery(_) => "sub-query",
            Expression::Param(_) => "parameter",
            Expression::Template(_) => "template",
            Expression::Factory(_) => "factory",
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Expression::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Expression::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expression::Constant(value) => Some(value),
            _ => None,
        }
    }
}

/// An operator applied to an ordered argument list
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    operator: Operator,
    args: Vec<Expression>,
}

impl Operation {
    pub fn new(operator: Operator, args: Vec<Expression>) -> Self {
        Operation { operator, args }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    /// Get an argument by position
    pub fn arg(&self, index: usize) -> Option<&Expression> {
        self.args.get(index)
    }
}

/// A nested query, described only by its rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SubQuery {
    pub description: String,
}

/// A named parameter whose value is bound on the query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
}

impl Param {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Param { name: name.into() }
    }
}

/// A raw template with arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub template: String,
    pub args: Vec<Expression>,
}

/// A projection constructor listing the expressions it is built from
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryExpression {
    pub args: Vec<Expression>,
}

impl FactoryExpression {
    /// Tuple of the given expressions
    pub fn tuple<I, E>(args: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        FactoryExpression {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// A boolean-valued expression
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(Expression);

impl Predicate {
    /// Wrap an expression as a predicate
    ///
    /// The expression is not checked here; the compiler rejects shapes it
    /// cannot lower.
    pub fn new(expression: impl Into<Expression>) -> Self {
        Predicate(expression.into())
    }

    pub(crate) fn operation(operator: Operator, args: Vec<Expression>) -> Self {
        Predicate(Expression::Operation(Operation::new(operator, args)))
    }

    pub fn expression(&self) -> &Expression {
        &self.0
    }

    pub fn into_expression(self) -> Expression {
        self.0
    }

    /// Fold predicates into a left-nested conjunction
    pub fn all_of<I: IntoIterator<Item = Predicate>>(predicates: I) -> Option<Predicate> {
        predicates.into_iter().reduce(|acc, next| {
            Predicate::operation(Operator::And, vec![acc.into_expression(), next.into_expression()])
        })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A sort key: target path and direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpecifier {
    pub target: Path,
    pub order: Order,
}

impl OrderSpecifier {
    pub fn new(target: Path, order: Order) -> Self {
        OrderSpecifier { target, order }
    }

    pub fn is_ascending(&self) -> bool {
        self.order == Order::Asc
    }
}

impl From<Path> for Expression {
    fn from(path: Path) -> Self {
        Expression::Path(path)
    }
}

impl From<&Path> for Expression {
    fn from(path: &Path) -> Self {
        Expression::Path(path.clone())
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Constant(value)
    }
}

impl From<Operation> for Expression {
    fn from(op: Operation) -> Self {
        Expression::Operation(op)
    }
}

impl From<Predicate> for Expression {
    fn from(predicate: Predicate) -> Self {
        predicate.0
    }
}

impl From<FactoryExpression> for Expression {
    fn from(factory: FactoryExpression) -> Self {
        Expression::Factory(factory)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Path(path) => write!(f, "{}", path),
            Expression::Operation(op) => write!(f, "{}", op),
            Expression::SubQuery(sub) => write!(f, "({})", sub.description),
            Expression::Param(param) => write!(f, "${}", param.name),
            Expression::Template(template) => write!(f, "{}", template.template),
            Expression::Factory(factory) => {
                write!(f, "tuple(")?;
                for (i, arg) in factory.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
