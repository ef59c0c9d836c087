use std::sync::Arc;

use crate::domain::engine::ShiftEngine;

/// Shared application state for the optimizer service axum router.
pub struct OptimizerAppState {
    pub engine: Arc<ShiftEngine>,
}
