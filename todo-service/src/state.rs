//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    storage::TodoStore,
    todo::{TodoHandler, TodoResource},
};

/// Application state shared across handlers
///
/// Cloning is cheap: the configuration is behind an `Arc` and the store
/// shares its connections or records.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: TodoStore,
    todos: TodoHandler<TodoStore>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default(), TodoStore::default())
    }
}

impl AppState {
    /// State over an already opened store
    pub fn new(config: Config, store: TodoStore) -> Self {
        let todos = TodoResource::new(store.clone())
            .into_handler()
            .with_page_limits(config.pagination.limits());

        Self {
            config: Arc::new(config),
            store,
            todos,
        }
    }

    /// Open the configured storage backend and build the state over it
    pub async fn connect(config: Config) -> Result<Self> {
        let store = TodoStore::open(&config.storage).await?;
        Ok(Self::new(config, store))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The storage backend
    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Handler serving the todo routes
    pub fn todos(&self) -> &TodoHandler<TodoStore> {
        &self.todos
    }
}
