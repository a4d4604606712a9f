//! Predicate compiler
//!
//! Lowers an expression tree into a filter document in the store's filter
//! language. Compilation is a pure function of the tree: the serializer holds
//! no state and may be shared freely between threads.

use log::trace;
use serde_json::Value as JsonValue;

use crate::core::document::{filters, Document};
use crate::core::errors::{QueryError, Result};
use crate::core::value::Value;
use crate::ql::ast::{Expression, Operation, Predicate};
use crate::ql::ops::Operator;
use crate::ql::resolver::resolve;

/// Serializes predicates into filter documents
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterSerializer;

impl FilterSerializer {
    pub fn new() -> Self {
        FilterSerializer
    }

    /// Compile a predicate into a filter document
    pub fn handle(&self, predicate: &Predicate) -> Result<Document> {
        self.compile(predicate.expression())
    }

    /// Compile a boolean-valued expression into a filter document
    pub fn compile(&self, expr: &Expression) -> Result<Document> {
        match expr {
            Expression::Operation(op) if op.operator().is_predicate() => self.visit_operation(op),
            Expression::Operation(op) => Err(illegal(op)),
            Expression::Constant(_) | Expression::Path(_) => {
                trace!("rejecting {} node in predicate position: {}", expr.kind(), expr);
                Err(QueryError::unsupported(format!("{} is not a predicate", expr)))
            }
            Expression::SubQuery(_)
            | Expression::Param(_)
            | Expression::Template(_)
            | Expression::Factory(_) => {
                trace!("rejecting {} node: {}", expr.kind(), expr);
                Err(QueryError::UnsupportedNode(expr.kind()))
            }
        }
    }

    fn visit_operation(&self, op: &Operation) -> Result<Document> {
        let operator = op.operator();
        if op.args().len() != operator.arity() {
            return Err(illegal(op));
        }

        match operator {
            // user.firstName.eq("test"), user.addresses.size().eq(2)
            Operator::Eq => self.handle_eq(op),

            Operator::Ne => Ok(filters::ne(&self.key(op, 0)?, self.value(op, 1)?)),

            Operator::StringIsEmpty => Ok(filters::eq(&self.key(op, 0)?, JsonValue::from(""))),

            Operator::And => {
                let left = self.compile(arg(op, 0)?)?;
                let right = self.compile(arg(op, 1)?)?;
                Ok(filters::and(left, right))
            }

            Operator::Or => {
                let left = self.compile(arg(op, 0)?)?;
                let right = self.compile(arg(op, 1)?)?;
                Ok(filters::or(left, right))
            }

            Operator::Not => match arg(op, 0)?.as_operation() {
                // $not cannot wrap $in, so NOT(IN) becomes $nin
                Some(inner) if inner.operator() == Operator::In => {
                    self.visit_operation(&Operation::new(Operator::NotIn, inner.args().to_vec()))
                }
                _ => Ok(filters::not(self.compile(arg(op, 0)?)?)),
            },

            Operator::StartsWith => self.regex(op, |v| format!("^{}", v), false),
            Operator::StartsWithIc => self.regex(op, |v| format!("^{}", v), true),
            Operator::EndsWith => self.regex(op, |v| format!("{}$", v), false),
            Operator::EndsWithIc => self.regex(op, |v| format!("{}$", v), true),
            Operator::EqIgnoreCase => self.regex(op, |v| format!("^{}$", v), true),
            Operator::StringContains => self.regex(op, |v| format!(".*{}.*", v), false),
            Operator::StringContainsIc => self.regex(op, |v| format!(".*{}.*", v), true),

            // caller-supplied patterns are passed through unescaped
            Operator::Matches => Ok(filters::regex(&self.key(op, 0)?, self.literal(op, 1)?, false)),
            Operator::MatchesIc => Ok(filters::regex(&self.key(op, 0)?, self.literal(op, 1)?, true)),

            Operator::Like => {
                let pattern = like_to_regex(&self.literal(op, 1)?);
                Ok(filters::regex(&self.key(op, 0)?, pattern, false))
            }

            Operator::Between => {
                let field = self.key(op, 0)?;
                Ok(filters::and(
                    filters::gte(&field, self.value(op, 1)?),
                    filters::lte(&field, self.value(op, 2)?),
                ))
            }

            Operator::In => {
                let (field, values) = self.membership(op)?;
                Ok(filters::in_(&field, values))
            }

            Operator::NotIn => {
                let (field, values) = self.membership(op)?;
                Ok(filters::nin(&field, values))
            }

            Operator::ColIsEmpty => {
                let field = self.key(op, 0)?;
                Ok(filters::or(filters::exists(&field, false), filters::size(&field, 0)))
            }

            Operator::Lt => Ok(filters::lt(&self.key(op, 0)?, self.value(op, 1)?)),
            Operator::Gt => Ok(filters::gt(&self.key(op, 0)?, self.value(op, 1)?)),
            Operator::Loe => Ok(filters::lte(&self.key(op, 0)?, self.value(op, 1)?)),
            Operator::Goe => Ok(filters::gte(&self.key(op, 0)?, self.value(op, 1)?)),

            Operator::IsNull => Ok(filters::exists(&self.key(op, 0)?, false)),
            Operator::IsNotNull => Ok(filters::exists(&self.key(op, 0)?, true)),

            Operator::ContainsKey => {
                let field = format!("{}.{}", self.key(op, 0)?, self.literal(op, 1)?);
                Ok(filters::exists(&field, true))
            }

            Operator::StringLength
            | Operator::Lower
            | Operator::Upper
            | Operator::Concat
            | Operator::ColSize
            | Operator::ArraySize => Err(illegal(op)),
        }
    }

    fn handle_eq(&self, op: &Operation) -> Result<Document> {
        match arg(op, 0)? {
            Expression::Operation(lhs) => self.handle_eq_size(op, lhs),
            Expression::Path(_) => Ok(filters::eq(&self.key(op, 0)?, self.value(op, 1)?)),
            _ => Err(illegal(op)),
        }
    }

    fn handle_eq_size(&self, op: &Operation, lhs: &Operation) -> Result<Document> {
        if !matches!(lhs.operator(), Operator::ColSize | Operator::ArraySize) {
            return Err(illegal(op));
        }
        let size = arg(op, 1)?
            .as_constant()
            .and_then(Value::as_integer)
            .ok_or_else(|| illegal(op))?;
        Ok(filters::size(&self.key(lhs, 0)?, size))
    }

    /// Field and values of an IN / NOT_IN; exactly one side is a constant collection
    fn membership(&self, op: &Operation) -> Result<(String, Vec<JsonValue>)> {
        let (const_index, expr_index) = match arg(op, 1)? {
            Expression::Constant(_) => (1, 0),
            _ => (0, 1),
        };
        match arg(op, const_index)?.as_constant().and_then(Value::as_list) {
            Some(values) => {
                let field = self.key(op, expr_index)?;
                let values = values
                    .iter()
                    .map(|value| wire_value(op, value))
                    .collect::<Result<Vec<_>>>()?;
                Ok((field, values))
            }
            // path-to-path membership has no filter form
            None => Err(illegal(op)),
        }
    }

    fn regex<F>(&self, op: &Operation, anchor: F, case_insensitive: bool) -> Result<Document>
    where
        F: FnOnce(&str) -> String,
    {
        let escaped = regex::escape(&self.literal(op, 1)?);
        Ok(filters::regex(&self.key(op, 0)?, anchor(&escaped), case_insensitive))
    }

    /// Field name of the path argument at `index`
    fn key(&self, op: &Operation, index: usize) -> Result<String> {
        match arg(op, index)? {
            Expression::Path(path) => Ok(resolve(path)),
            _ => Err(illegal(op)),
        }
    }

    /// Wire value of the argument at `index`
    fn value(&self, op: &Operation, index: usize) -> Result<JsonValue> {
        match arg(op, index)? {
            Expression::Constant(value) => wire_value(op, value),
            Expression::Path(path) => Ok(JsonValue::String(resolve(path))),
            Expression::Operation(_) => Err(illegal(op)),
            other => Err(QueryError::UnsupportedNode(other.kind())),
        }
    }

    /// Text of the constant argument at `index`
    fn literal(&self, op: &Operation, index: usize) -> Result<String> {
        match arg(op, index)? {
            Expression::Constant(value) => value.to_literal().ok_or_else(|| {
                trace!("{} constant has no literal form", value.type_name());
                illegal(op)
            }),
            Expression::Path(_) | Expression::Operation(_) => Err(illegal(op)),
            other => Err(QueryError::UnsupportedNode(other.kind())),
        }
    }
}

fn arg(op: &Operation, index: usize) -> Result<&Expression> {
    op.arg(index).ok_or_else(|| illegal(op))
}

/// Wire form of a constant; NaN and infinities have none
fn wire_value(op: &Operation, value: &Value) -> Result<JsonValue> {
    value.to_json().ok_or_else(|| {
        trace!("{} constant {} has no wire form", value.type_name(), value);
        illegal(op)
    })
}

fn illegal(op: &Operation) -> QueryError {
    let rendered = op.to_string();
    trace!("no filter form for {}", rendered);
    QueryError::unsupported(format!("Illegal operation {}", rendered))
}

/// Translate a SQL LIKE pattern into an anchored regular expression
///
/// `%` matches any run of characters and `_` any single character; every
/// other character is matched literally.
pub fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    if !pattern.starts_with('%') {
        out.push('^');
    }
    let mut literal = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
    }
    if !pattern.ends_with('%') {
        out.push('$');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::path::Path;
    use crate::ql::ast::{FactoryExpression, Param, SubQuery, Template};
    use proptest::prelude::*;
    use regex::Regex;
    use serde_json::json;

    fn user() -> Path {
        Path::variable("user")
    }

    fn compile(predicate: &Predicate) -> JsonValue {
        JsonValue::Object(FilterSerializer::new().handle(predicate).unwrap())
    }

    fn compile_err(predicate: &Predicate) -> QueryError {
        FilterSerializer::new().handle(predicate).unwrap_err()
    }

    fn pattern_of(filter: &JsonValue, field: &str) -> String {
        filter[field]["$regex"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_simple_comparisons() {
        let name = user().property("firstName");
        let age = user().property("age");

        assert_eq!(compile(&name.eq("Random string")), json!({"firstName": "Random string"}));
        assert_eq!(compile(&name.ne("x")), json!({"firstName": {"$ne": "x"}}));
        assert_eq!(compile(&age.gt(99)), json!({"age": {"$gt": 99}}));
        assert_eq!(compile(&age.lt(5)), json!({"age": {"$lt": 5}}));
        assert_eq!(compile(&age.loe(5)), json!({"age": {"$lte": 5}}));
        assert_eq!(compile(&age.goe(5)), json!({"age": {"$gte": 5}}));
    }

    #[test]
    fn test_nested_field_names() {
        let city = user().property("address").property("city");
        assert_eq!(compile(&city.eq("Oslo")), json!({"address.city": "Oslo"}));

        let tag = user().property("tags").any();
        assert_eq!(compile(&tag.eq("rust")), json!({"tags": "rust"}));
    }

    #[test]
    fn test_existence_and_empty() {
        let name = user().property("nickname");
        let tags = user().property("tags");

        assert_eq!(compile(&name.is_null()), json!({"nickname": {"$exists": false}}));
        assert_eq!(compile(&name.is_not_null()), json!({"nickname": {"$exists": true}}));
        assert_eq!(compile(&name.is_empty_string()), json!({"nickname": ""}));
        assert_eq!(
            compile(&tags.is_empty()),
            json!({"$or": [{"tags": {"$exists": false}}, {"tags": {"$size": 0}}]})
        );
        assert_eq!(
            compile(&tags.is_not_empty()),
            json!({"$nor": [{"$or": [{"tags": {"$exists": false}}, {"tags": {"$size": 0}}]}]})
        );
    }

    #[test]
    fn test_size_equality() {
        let addresses = user().property("addresses");
        assert_eq!(compile(&addresses.size().eq(2)), json!({"addresses": {"$size": 2}}));
    }

    #[test]
    fn test_eq_over_non_size_operation_fails() {
        let name = user().property("name");
        let lower = Operation::new(Operator::Lower, vec![name.into()]);
        let pred = Predicate::new(Operation::new(
            Operator::Eq,
            vec![lower.into(), Value::from("x").into()],
        ));
        assert!(matches!(compile_err(&pred), QueryError::UnsupportedOperator(_)));
    }

    #[test]
    fn test_between() {
        let age = user().property("age");
        assert_eq!(
            compile(&age.between(18, 65)),
            json!({"$and": [{"age": {"$gte": 18}}, {"age": {"$lte": 65}}]})
        );
    }

    #[test]
    fn test_in_and_not_in() {
        let id = user().property("id");
        assert_eq!(compile(&id.is_in(vec![1, 2, 3])), json!({"id": {"$in": [1, 2, 3]}}));
        assert_eq!(compile(&id.not_in(vec!["a"])), json!({"id": {"$nin": ["a"]}}));
    }

    #[test]
    fn test_in_with_constant_first() {
        let id = user().property("id");
        let pred = Predicate::new(Operation::new(
            Operator::In,
            vec![Value::from(vec![4, 5]).into(), id.into()],
        ));
        assert_eq!(compile(&pred), json!({"id": {"$in": [4, 5]}}));
    }

    #[test]
    fn test_in_without_constant_collection_fails() {
        let first = user().property("firstName");
        let last = user().property("lastName");
        assert!(matches!(
            compile_err(&first.in_path(&last)),
            QueryError::UnsupportedOperator(_)
        ));

        let not_in = Predicate::new(Operation::new(
            Operator::NotIn,
            vec![first.into(), last.into()],
        ));
        assert!(matches!(compile_err(&not_in), QueryError::UnsupportedOperator(_)));

        // a scalar constant is not a collection either
        let scalar = Predicate::new(Operation::new(
            Operator::In,
            vec![user().property("id").into(), Value::from(3).into()],
        ));
        assert!(matches!(compile_err(&scalar), QueryError::UnsupportedOperator(_)));
    }

    #[test]
    fn test_not_in_rewrite() {
        let id = user().property("id");
        let negated = id.is_in(vec![1, 2, 3]).not();
        assert_eq!(compile(&negated), compile(&id.not_in(vec![1, 2, 3])));
        assert_eq!(compile(&negated), json!({"id": {"$nin": [1, 2, 3]}}));
    }

    #[test]
    fn test_not_wraps_field() {
        let age = user().property("age");
        assert_eq!(compile(&age.gt(30).not()), json!({"age": {"$not": {"$gt": 30}}}));
    }

    #[test]
    fn test_string_regexes() {
        let name = user().property("name");

        assert_eq!(compile(&name.starts_with("Jan")), json!({"name": {"$regex": "^Jan"}}));
        assert_eq!(
            compile(&name.starts_with_ignore_case("jan")),
            json!({"name": {"$regex": "^jan", "$options": "i"}})
        );
        assert_eq!(compile(&name.ends_with("sen")), json!({"name": {"$regex": "sen$"}}));
        assert_eq!(
            compile(&name.ends_with_ignore_case("SEN")),
            json!({"name": {"$regex": "SEN$", "$options": "i"}})
        );
        assert_eq!(
            compile(&name.equals_ignore_case("ann")),
            json!({"name": {"$regex": "^ann$", "$options": "i"}})
        );
        assert_eq!(compile(&name.contains("an")), json!({"name": {"$regex": ".*an.*"}}));
        assert_eq!(
            compile(&name.contains_ignore_case("AN")),
            json!({"name": {"$regex": ".*AN.*", "$options": "i"}})
        );
    }

    #[test]
    fn test_regex_literals_are_escaped() {
        let name = user().property("name");
        let filter = compile(&name.starts_with("a.b*"));
        let re = Regex::new(&pattern_of(&filter, "name")).unwrap();

        assert!(re.is_match("a.b*suffix"));
        assert!(!re.is_match("axbbb"));
        assert!(!re.is_match("a.bbb"));
        assert!(!re.is_match("za.b*"));

        let filter = compile(&name.contains("(x)"));
        let re = Regex::new(&pattern_of(&filter, "name")).unwrap();
        assert!(re.is_match("a(x)b"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_matches_is_verbatim() {
        let name = user().property("name");
        assert_eq!(compile(&name.matches("^J.*n$")), json!({"name": {"$regex": "^J.*n$"}}));
        assert_eq!(
            compile(&name.matches_ignore_case("j+")),
            json!({"name": {"$regex": "j+", "$options": "i"}})
        );
    }

    #[test]
    fn test_like() {
        let name = user().property("name");
        assert_eq!(compile(&name.like("Ja%")), json!({"name": {"$regex": "^Ja.*"}}));

        let re = Regex::new(&like_to_regex("a.c_")).unwrap();
        assert!(re.is_match("a.cd"));
        assert!(!re.is_match("abcd"));
        assert!(!re.is_match("a.cde"));
    }

    #[test]
    fn test_like_to_regex() {
        assert_eq!(like_to_regex("%abc%"), ".*abc.*");
        assert_eq!(like_to_regex("abc"), "^abc$");
        assert_eq!(like_to_regex("a_c%"), "^a.c.*");
        assert_eq!(like_to_regex("1+1"), "^1\\+1$");
    }

    #[test]
    fn test_contains_key() {
        let attributes = user().property("attributes");
        assert_eq!(
            compile(&attributes.contains_key("color")),
            json!({"attributes.color": {"$exists": true}})
        );
    }

    #[test]
    fn test_enum_constants_use_name() {
        let role = user().property("role");
        let pred = role.eq(Value::enumeration("Role", "ADMIN", 3));
        assert_eq!(compile(&pred), json!({"role": "ADMIN"}));

        let pred = role.is_in(vec![
            Value::enumeration("Role", "ADMIN", 3),
            Value::enumeration("Role", "GUEST", 0),
        ]);
        assert_eq!(compile(&pred), json!({"role": {"$in": ["ADMIN", "GUEST"]}}));
    }

    #[test]
    fn test_complicated_query() {
        let first = user().property("firstName");
        let age = user().property("age");

        let pred = first.eq("Random string").and(first.ne("Random string").or(age.gt(99)));
        assert_eq!(
            compile(&pred),
            json!({"$and": [
                {"firstName": "Random string"},
                {"$or": [{"firstName": {"$ne": "Random string"}}, {"age": {"$gt": 99}}]}
            ]})
        );
    }

    #[test]
    fn test_unsupported_nodes() {
        let nodes = vec![
            Expression::SubQuery(SubQuery { description: "select 1".into() }),
            Expression::Param(Param::new("min")),
            Expression::Template(Template { template: "{0} > 1".into(), args: vec![] }),
            Expression::Factory(FactoryExpression::tuple(vec![user().property("a")])),
        ];
        for node in nodes {
            let err = compile_err(&Predicate::new(node));
            assert!(matches!(err, QueryError::UnsupportedNode(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_param_in_value_position() {
        let age = user().property("age");
        let pred = Predicate::new(Operation::new(
            Operator::Gt,
            vec![age.into(), Expression::Param(Param::new("min"))],
        ));
        assert!(matches!(compile_err(&pred), QueryError::UnsupportedNode("parameter")));
    }

    #[test]
    fn test_unsupported_operators() {
        let name = user().property("name");
        let lower = Predicate::new(Operation::new(Operator::Lower, vec![name.clone().into()]));
        assert!(matches!(compile_err(&lower), QueryError::UnsupportedOperator(_)));

        // bare path or constant is not a predicate
        assert!(matches!(compile_err(&Predicate::new(name.clone())), QueryError::UnsupportedOperator(_)));
        assert!(matches!(
            compile_err(&Predicate::new(Value::Boolean(true))),
            QueryError::UnsupportedOperator(_)
        ));

        // wrong arity
        let short = Predicate::new(Operation::new(Operator::Eq, vec![name.into()]));
        assert!(matches!(compile_err(&short), QueryError::UnsupportedOperator(_)));
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let score = user().property("score");

        for pred in [
            score.gt(f64::NAN),
            score.lt(f64::INFINITY),
            score.eq(f64::NEG_INFINITY),
            score.between(0.0, f64::INFINITY),
            score.is_in(vec![1.0, f64::NAN]),
        ] {
            assert!(
                matches!(compile_err(&pred), QueryError::UnsupportedOperator(_)),
                "{} compiled",
                pred
            );
        }

        assert_eq!(compile(&score.gt(0.5)), json!({"score": {"$gt": 0.5}}));
    }

    #[test]
    fn test_non_scalar_literals_rejected() {
        let name = user().property("name");
        let attributes = user().property("attributes");

        for pred in [
            name.starts_with_ignore_case("x"),
            name.like("x"),
            attributes.contains_key("x"),
        ] {
            let op = pred.expression().as_operation().unwrap();
            for constant in [Value::Null, Value::from(vec![1, 2])] {
                let swapped = Predicate::new(Operation::new(
                    op.operator(),
                    vec![op.args()[0].clone(), constant.into()],
                ));
                assert!(matches!(compile_err(&swapped), QueryError::UnsupportedOperator(_)));
            }
        }

        assert_eq!(
            compile(&attributes.contains_key(3)),
            json!({"attributes.3": {"$exists": true}})
        );
    }

    #[test]
    fn test_value_operation_as_predicate_rejected() {
        let size = Predicate::new(Operation::new(
            Operator::ColSize,
            vec![user().property("tags").into()],
        ));
        let err = compile_err(&size);
        assert!(matches!(err, QueryError::UnsupportedOperator(_)));
        assert!(err.to_string().contains("COL_SIZE(user.tags)"), "{}", err);
    }

    // ---- properties ----

    const FIELDS: [&str; 4] = ["a", "b", "c.d", "tags"];

    fn field_path(name: &str) -> Path {
        name.split('.').fold(Path::variable("doc"), |p, seg| p.property(seg))
    }

    fn arb_leaf() -> impl Strategy<Value = Predicate> {
        let field = prop::sample::select(FIELDS.to_vec()).prop_map(field_path);
        prop_oneof![
            (field.clone(), any::<i64>()).prop_map(|(p, v)| p.eq(v)),
            (field.clone(), any::<i64>()).prop_map(|(p, v)| p.gt(v)),
            (field.clone(), "[a-z.*]{0,6}").prop_map(|(p, s)| p.starts_with(&s)),
            (field.clone(), prop::collection::vec(any::<i32>(), 0..4)).prop_map(|(p, v)| p.is_in(v)),
            field.clone().prop_map(|p| p.is_null()),
            field.prop_map(|p| p.is_empty()),
        ]
    }

    fn arb_predicate() -> impl Strategy<Value = Predicate> {
        arb_leaf().prop_recursive(5, 64, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
                inner.prop_map(Predicate::not),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_compile_is_deterministic(pred in arb_predicate()) {
            let serializer = FilterSerializer::new();
            let first = serde_json::to_string(&serializer.handle(&pred).unwrap()).unwrap();
            let second = serde_json::to_string(&serializer.handle(&pred.clone()).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_and_or_are_structural(left in arb_predicate(), right in arb_predicate()) {
            let serializer = FilterSerializer::new();
            let l = serializer.handle(&left).unwrap();
            let r = serializer.handle(&right).unwrap();

            let and = serializer.handle(&left.clone().and(right.clone())).unwrap();
            prop_assert_eq!(and, filters::and(l.clone(), r.clone()));

            let or = serializer.handle(&left.or(right)).unwrap();
            prop_assert_eq!(or, filters::or(l, r));
        }
    }
}
