//! In-memory template store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use graft_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::TemplateSource,
    error::GraftResult,
};

const STORE: &str = "template store";

/// Thread-safe in-memory template store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    inner: Arc<RwLock<HashMap<TemplateSource, String>>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, source: impl AsRef<str>, content: impl Into<String>) -> GraftResult<Self> {
        self.insert(TemplateSource::new(source)?, content)?;
        Ok(self)
    }

    pub fn insert(&self, source: TemplateSource, content: impl Into<String>) -> GraftResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError { store: STORE })?;
        inner.insert(source, content.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn fetch(&self, source: &TemplateSource) -> GraftResult<String> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError { store: STORE })?;

        inner.get(source).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                source_id: source.to_string(),
            }
            .into()
        })
    }
}
