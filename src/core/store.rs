use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

use crate::core::document::Document;
use crate::core::errors::CollectionError;

/// A queryable collection of documents
///
/// This is the seam to the database driver: queries hand it compiled
/// documents and never touch the network themselves.
pub trait Collection: Send + Sync {
    /// Handle returned by `find`
    type Find: FindHandle;

    /// Start a find operation with the given filter
    fn find(&self, filter: Document) -> Self::Find;
}

impl<T: Collection + ?Sized> Collection for Arc<T> {
    type Find = T::Find;

    fn find(&self, filter: Document) -> Self::Find {
        (**self).find(filter)
    }
}

impl<T: Collection + ?Sized> Collection for &T {
    type Find = T::Find;

    fn find(&self, filter: Document) -> Self::Find {
        (**self).find(filter)
    }
}

/// A pending find operation
///
/// Each stage consumes the handle, so a handle is issued at most once.
pub trait FindHandle: Send + Sized + 'static {
    /// Restrict returned fields; `None` returns whole documents
    fn project(self, projection: Option<Document>) -> Self;

    /// Order results by the given sort document
    fn sort(self, sort: Document) -> Self;

    /// Skip the first `n` matches
    fn skip(self, n: u64) -> Self;

    /// Return at most `n` matches
    fn limit(self, n: u64) -> Self;

    /// Cursor batch size hint
    fn batch_size(self, n: u32) -> Self;

    /// Resolve the first match, if any
    fn first(self) -> BoxFuture<'static, Result<Option<Document>, CollectionError>>;

    /// Lazily stream every match; dropping the stream releases the cursor
    fn into_stream(self) -> BoxStream<'static, Result<Document, CollectionError>>;
}
