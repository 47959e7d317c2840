use async_trait::async_trait;

use super::check::{evaluate, AccessDecision};
use super::model::{CampusId, RoleAssignment};

/// Source of a principal's current role assignments.
///
/// `Ok(None)` means the principal is unknown. An `Err` means the store itself
/// could not answer and must not be treated as a denial.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn resolve_assignments(
        &self,
        principal: &str,
    ) -> anyhow::Result<Option<Vec<RoleAssignment>>>;
}

/// Resolve `principal` through `store` and evaluate the check.
///
/// Unknown principals are denied; store failures are returned as errors.
pub async fn authorize<S>(
    store: &S,
    principal: &str,
    permission: &str,
    target_campus: Option<CampusId>,
) -> anyhow::Result<AccessDecision>
where
    S: IdentityStore + ?Sized,
{
    let decision = match store.resolve_assignments(principal).await? {
        Some(assignments) => evaluate(&assignments, permission, target_campus),
        None => AccessDecision::Denied,
    };
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::model::Role;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, Vec<RoleAssignment>>);

    #[async_trait]
    impl IdentityStore for MapStore {
        async fn resolve_assignments(
            &self,
            principal: &str,
        ) -> anyhow::Result<Option<Vec<RoleAssignment>>> {
            Ok(self.0.get(principal).cloned())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl IdentityStore for BrokenStore {
        async fn resolve_assignments(
            &self,
            _principal: &str,
        ) -> anyhow::Result<Option<Vec<RoleAssignment>>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_authorize_known_and_unknown_principals() {
        let viewer = Role::new("viewer", "Viewer", 10).with_permissions(["news.view"]);
        let store = MapStore(HashMap::from([(
            "viewer@example.org".to_string(),
            vec![RoleAssignment::global(viewer)],
        )]));

        let decision = authorize(&store, "viewer@example.org", "news.view", None)
            .await
            .unwrap();
        assert!(decision.is_allowed());

        let decision = authorize(&store, "stranger@example.org", "news.view", None)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::Denied);
    }

    #[tokio::test]
    async fn test_authorize_propagates_store_failure() {
        let result = authorize(&BrokenStore, "anyone", "news.view", None).await;
        assert!(result.is_err());
    }
}
