use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::AppError;

/// Rejects a mutation while an identical one is still running.
#[derive(Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    pub fn begin(&self, key: impl Into<String>) -> Result<InFlightGuard, AppError> {
        let key = key.into();
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            tracing::debug!(%key, "duplicate submission rejected");
            return Err(AppError::conflict("Operação já em andamento"));
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
