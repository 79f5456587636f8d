use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_COLLISION_RETRIES: u32 = 8;

/// Tuning knobs for [`LinkStoreService`](crate::service::LinkStoreService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreSettings {
    /// Upper bound for every single repository call.
    #[builder(default = DEFAULT_OPERATION_TIMEOUT)]
    pub operation_timeout: Duration,
    /// How many fallback codes `create` tries after the primary one collides.
    #[builder(default = DEFAULT_MAX_COLLISION_RETRIES)]
    pub max_collision_retries: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
