//! Wire documents
//!
//! Filter, sort and projection documents are ordered JSON maps. Key order
//! is preserved, so a sort document lists its keys in precedence order.

use serde_json::{Map, Value as JsonValue};

/// An ordered wire document
pub type Document = Map<String, JsonValue>;

/// Build a document holding a single key
pub fn single(key: impl Into<String>, value: JsonValue) -> Document {
    let mut doc = Document::new();
    doc.insert(key.into(), value);
    doc
}

/// Filter fragment constructors, in the store's filter language
pub mod filters {
    use super::{single, Document};
    use serde_json::Value as JsonValue;

    fn field_op(field: &str, op: &str, value: JsonValue) -> Document {
        single(field, JsonValue::Object(single(op, value)))
    }

    /// `{field: value}`
    pub fn eq(field: &str, value: JsonValue) -> Document {
        single(field, value)
    }

    pub fn ne(field: &str, value: JsonValue) -> Document {
        field_op(field, "$ne", value)
    }

    pub fn lt(field: &str, value: JsonValue) -> Document {
        field_op(field, "$lt", value)
    }

    pub fn gt(field: &str, value: JsonValue) -> Document {
        field_op(field, "$gt", value)
    }

    pub fn lte(field: &str, value: JsonValue) -> Document {
        field_op(field, "$lte", value)
    }

    pub fn gte(field: &str, value: JsonValue) -> Document {
        field_op(field, "$gte", value)
    }

    pub fn in_(field: &str, values: Vec<JsonValue>) -> Document {
        field_op(field, "$in", JsonValue::Array(values))
    }

    pub fn nin(field: &str, values: Vec<JsonValue>) -> Document {
        field_op(field, "$nin", JsonValue::Array(values))
    }

    pub fn exists(field: &str, exists: bool) -> Document {
        field_op(field, "$exists", JsonValue::Bool(exists))
    }

    pub fn size(field: &str, size: i64) -> Document {
        field_op(field, "$size", JsonValue::from(size))
    }

    /// `{field: {$regex: pattern}}`, with `$options: "i"` when case-insensitive
    pub fn regex(field: &str, pattern: impl Into<String>, case_insensitive: bool) -> Document {
        let mut operators = single("$regex", JsonValue::String(pattern.into()));
        if case_insensitive {
            operators.insert("$options".to_string(), JsonValue::String("i".to_string()));
        }
        single(field, JsonValue::Object(operators))
    }

    pub fn and(left: Document, right: Document) -> Document {
        single("$and", JsonValue::Array(vec![left.into(), right.into()]))
    }

    pub fn or(left: Document, right: Document) -> Document {
        single("$or", JsonValue::Array(vec![left.into(), right.into()]))
    }

    /// Negate a filter.
    ///
    /// The store accepts `$not` only inside a field, so a single-field
    /// fragment is negated in place and anything else goes through `$nor`.
    pub fn not(filter: Document) -> Document {
        if filter.len() == 1 {
            if let Some((field, value)) = filter.iter().next() {
                if !field.starts_with('$') {
                    let negated = match value {
                        JsonValue::Object(ops) if is_operator_doc(ops) => value.clone(),
                        other => JsonValue::Object(single("$eq", other.clone())),
                    };
                    return single(field.as_str(), JsonValue::Object(single("$not", negated)));
                }
            }
        }
        single("$nor", JsonValue::Array(vec![filter.into()]))
    }

    fn is_operator_doc(doc: &Document) -> bool {
        !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
    }
}
