//! Query facade
//!
//! A `Query` accumulates metadata through builder calls, compiles it into
//! filter, sort and projection documents on every fetch, and drives a
//! `Collection` with them. A query is a single-owner mutable builder: it is
//! not meant to be shared between call chains while it is being built.

pub mod config;
pub mod metadata;

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::document::Document;
use crate::core::errors::{QueryError, Result};
use crate::core::path::Path;
use crate::core::store::{Collection, FindHandle};
use crate::core::value::Value;
use crate::ql::ast::{Expression, FactoryExpression, OrderSpecifier, Param, Predicate};
use crate::ql::serializer::FilterSerializer;
use crate::ql::sort::{to_projection, to_sort};

pub use config::QueryConfig;
pub use metadata::{JoinExpression, JoinType, QueryMetadata, QueryModifiers};

/// Maps a raw document to a result
pub type Mapper<K> = Arc<dyn Fn(Document) -> Result<K> + Send + Sync>;

/// The documents a query compiles to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub filter: Document,
    pub sort: Document,
    pub projection: Option<Document>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl CompiledQuery {
    /// Render for inspection
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "filter={} sort={}",
            JsonValue::Object(self.filter.clone()),
            JsonValue::Object(self.sort.clone())
        )?;
        match &self.projection {
            Some(projection) => write!(f, " projection={}", JsonValue::Object(projection.clone())),
            None => write!(f, " projection=all"),
        }
    }
}

/// A query over a document collection
pub struct Query<C: Collection, K = Document> {
    collection: C,
    metadata: QueryMetadata,
    serializer: FilterSerializer,
    config: QueryConfig,
    mapper: Mapper<K>,
}

impl<C: Collection> Query<C, Document> {
    /// Query returning raw documents
    pub fn new(collection: C) -> Self {
        Query::with_mapper(collection, Ok)
    }
}

impl<C: Collection, K> Query<C, K> {
    /// Query mapping every document through `mapper`
    pub fn with_mapper<F>(collection: C, mapper: F) -> Self
    where
        F: Fn(Document) -> Result<K> + Send + Sync + 'static,
    {
        Query {
            collection,
            metadata: QueryMetadata::new(),
            serializer: FilterSerializer::default(),
            config: QueryConfig::default(),
            mapper: Arc::new(mapper),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metadata(&self) -> &QueryMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Add where conjuncts
    ///
    /// Fails if any item is `None`; nothing is recorded in that case.
    pub fn filter<I, P>(&mut self, predicates: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<Predicate>>,
    {
        let predicates = predicates
            .into_iter()
            .map(Into::into)
            .collect::<Option<Vec<Predicate>>>()
            .ok_or_else(|| QueryError::InvalidArgument("predicate must not be null".into()))?;

        for predicate in predicates {
            self.metadata.add_where(predicate);
        }
        Ok(self)
    }

    pub fn order_by<I>(&mut self, orders: I) -> &mut Self
    where
        I: IntoIterator<Item = OrderSpecifier>,
    {
        for order in orders {
            self.metadata.add_order_by(order);
        }
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.metadata.set_limit(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.metadata.set_offset(offset);
        self
    }

    /// Set limit and offset together, replacing both
    pub fn restrict(&mut self, modifiers: QueryModifiers) -> &mut Self {
        self.metadata.set_modifiers(modifiers);
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.metadata.set_distinct(true);
        self
    }

    /// Bind a parameter value
    pub fn set<V: Into<Value>>(&mut self, param: Param, value: V) -> &mut Self {
        self.metadata.set_param(param, value.into());
        self
    }

    /// Select the given expressions; an empty list selects whole documents
    pub fn project<I, E>(&mut self, exprs: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        let factory = FactoryExpression::tuple(exprs);
        let projection = if factory.args.is_empty() { None } else { Some(factory.into()) };
        self.metadata.set_projection(projection);
        self
    }

    pub fn join(&mut self, kind: JoinType, target: impl Into<Expression>, alias: Option<Path>) -> &mut Self {
        self.metadata.add_join(JoinExpression {
            kind,
            target: target.into(),
            alias,
            condition: None,
        });
        self
    }

    /// Condition the most recent join
    pub fn on(&mut self, condition: Predicate) -> Result<&mut Self> {
        self.metadata.add_join_condition(condition)?;
        Ok(self)
    }

    /// Compile the current metadata into wire documents
    pub fn compile(&self) -> Result<CompiledQuery> {
        let filter = match self.create_filter() {
            Some(predicate) => self.serializer.handle(&predicate)?,
            None => Document::new(),
        };
        let modifiers = self.metadata.modifiers();
        let compiled = CompiledQuery {
            filter,
            sort: to_sort(self.metadata.order_by()),
            projection: to_projection(self.metadata.projection()),
            offset: modifiers.offset,
            limit: modifiers.limit,
        };

        if self.config.log_compiled {
            debug!("Compiled query: {}", compiled);
        }
        Ok(compiled)
    }

    fn create_filter(&self) -> Option<Predicate> {
        let where_predicate = self.metadata.where_predicate();
        if self.metadata.joins().is_empty() {
            return where_predicate;
        }
        Predicate::all_of(where_predicate.into_iter().chain(self.create_join_filter()))
    }

    fn create_join_filter(&self) -> Option<Predicate> {
        warn!(
            "Ignoring {} join(s): reference resolution is not supported by find",
            self.metadata.joins().len()
        );
        None
    }

    fn set_projection_paths(&mut self, paths: &[Path]) {
        self.project(paths.iter().cloned());
    }

    fn open(&self, compiled: CompiledQuery, single: bool) -> C::Find {
        let CompiledQuery { filter, sort, projection, offset, limit } = compiled;

        let mut handle = self.collection.find(filter).project(projection).sort(sort);
        if let Some(n) = offset {
            handle = handle.skip(n);
        }
        if !single {
            if let Some(n) = limit {
                handle = handle.limit(n);
            }
        }
        if let Some(n) = self.config.batch_size {
            handle = handle.batch_size(n);
        }
        handle
    }

    /// Fetch every match
    pub async fn fetch(&self) -> Result<Vec<K>> {
        let compiled = self.compile()?;
        debug!("Fetching with {}", compiled);

        let documents: Vec<Document> = self
            .open(compiled, false)
            .into_stream()
            .try_collect()
            .await
            .map_err(QueryError::Execution)?;

        debug!("Fetched {} document(s)", documents.len());
        documents.into_iter().map(|document| (self.mapper)(document)).collect()
    }

    /// Fetch every match, selecting only `paths`
    pub async fn fetch_projected(&mut self, paths: &[Path]) -> Result<Vec<K>> {
        self.set_projection_paths(paths);
        self.fetch().await
    }

    /// Fetch the first match
    pub async fn fetch_one(&self) -> Result<Option<K>> {
        let compiled = self.compile()?;
        debug!("Fetching first with {}", compiled);

        let document = self
            .open(compiled, true)
            .first()
            .await
            .map_err(QueryError::Execution)?;

        document.map(|document| (self.mapper)(document)).transpose()
    }

    /// Fetch the first match, selecting only `paths`
    pub async fn fetch_one_projected(&mut self, paths: &[Path]) -> Result<Option<K>> {
        self.set_projection_paths(paths);
        self.fetch_one().await
    }

    /// Lazily stream matches, selecting only `paths`
    ///
    /// The stream is single-pass; dropping it releases the cursor.
    pub fn iterate(&mut self, paths: &[Path]) -> Result<BoxStream<'static, Result<K>>>
    where
        K: Send + 'static,
    {
        self.set_projection_paths(paths);
        let compiled = self.compile()?;
        debug!("Iterating with {}", compiled);

        let mapper = Arc::clone(&self.mapper);
        let stream = self
            .open(compiled, false)
            .into_stream()
            .map(move |item| item.map_err(QueryError::Execution).and_then(|document| mapper(document)));
        Ok(stream.boxed())
    }
}

impl<C: Collection, K> fmt::Debug for Query<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Query")
            .field("metadata", &self.metadata)
            .field("config", &self.config)
            .finish()
    }
}
