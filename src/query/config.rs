/// Configuration for query execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryConfig {
    /// Log compiled documents at debug level on every compile
    pub log_compiled: bool,
    /// Cursor batch size forwarded to the collection
    pub batch_size: Option<u32>,
}

impl QueryConfig {
    pub fn with_log_compiled(mut self, log_compiled: bool) -> Self {
        self.log_compiled = log_compiled;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}
