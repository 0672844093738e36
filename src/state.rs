use crate::storage::Store;
use crate::trainer::Trainer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub trainer: Arc<dyn Trainer>,
}

impl AppState {
    pub fn new(store: Store, trainer: Arc<dyn Trainer>) -> Self {
        Self {
            store: Arc::new(store),
            trainer,
        }
    }
}
