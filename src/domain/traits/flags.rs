use crate::domain::entities::RoleSet;

/// Feature flag decision source
///
/// Called inline on the dispatch path. Implementations fold their own failures
/// into `false`; the router never distinguishes "off" from "unavailable".
pub trait FeatureFlags: Send + Sync {
    fn evaluate(&self, flag_key: &str, user_id: &str, roles: &RoleSet) -> bool;
}
