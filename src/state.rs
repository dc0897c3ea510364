use crate::config::Config;
use std::{path::Path, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }
}
