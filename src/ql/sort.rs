//! Sort and projection documents

use serde_json::Value as JsonValue;

use crate::core::document::Document;
use crate::ql::ast::{Expression, OrderSpecifier};
use crate::ql::resolver::resolve;

/// Build a sort document, keys in caller order
///
/// A repeated path keeps its first position and takes the last direction.
pub fn to_sort(order_bys: &[OrderSpecifier]) -> Document {
    let mut sort = Document::new();
    for order_by in order_bys {
        let direction = if order_by.is_ascending() { 1 } else { -1 };
        sort.insert(resolve(&order_by.target), JsonValue::from(direction));
    }
    sort
}

/// Build a projection document from a factory expression
///
/// Path arguments are included with `1`; anything else is skipped. A missing
/// or non-factory projection selects whole documents.
pub fn to_projection(projection: Option<&Expression>) -> Option<Document> {
    match projection {
        Some(Expression::Factory(factory)) => {
            let mut fields = Document::new();
            for path in factory.args.iter().filter_map(Expression::as_path) {
                fields.insert(resolve(path), JsonValue::from(1));
            }
            Some(fields)
        }
        _ => None,
    }
}
