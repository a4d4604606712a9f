pub mod path;
pub mod value;
pub mod document;
pub mod store;
pub mod errors;


pub use path::{Path, PathKind};
pub use value::Value;
pub use document::Document;
pub use store::{Collection, FindHandle};
pub use errors::{CollectionError, QueryError, Result};
