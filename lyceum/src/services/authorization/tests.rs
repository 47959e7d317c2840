use super::config::ConfigManager;
use super::fallback::FallbackService;
use super::service::AuthorizationService;
use super::types::{AuthorizationError, PolicyConfig};
use lyceum_core::authorization::{AccessDecision, CampusId, IdentityStore};
use tempfile::tempdir;
use uuid::Uuid;

const NORTH: &str = "6f1c1e9a-2d7b-4f43-9a3e-0c5a1b2d3e4f";
const SOUTH: &str = "a3b2c1d0-1111-4222-8333-944455566677";

const POLICY: &str = r#"
permissions:
  news.view:
    label: View news
  news.edit:
    label: Edit news
  users.view:
    label: View users
roles:
  super_admin:
    label: Super administrator
    hierarchy_level: 100
  editor:
    label: Editor
    hierarchy_level: 50
    permissions: [news.view, news.edit]
  retired:
    label: Retired role
    hierarchy_level: 20
    active: false
    permissions: [users.view]
users:
  root@example.org:
    name: Root
    assignments:
      - role: super_admin
  alice@example.org:
    name: Alice
    assignments:
      - role: editor
        campus: 6f1c1e9a-2d7b-4f43-9a3e-0c5a1b2d3e4f
      - role: retired
  bob@example.org:
    name: Bob
    active: false
    assignments:
      - role: editor
  carol@example.org:
    name: Carol
    assignments:
      - role: ghost
      - role: editor
"#;

fn campus(id: &str) -> CampusId {
    id.parse().unwrap()
}

async fn create_test_service() -> (AuthorizationService, tempfile::TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let policy_path = temp_dir.path().join("policy.yaml");
    tokio::fs::write(&policy_path, POLICY).await.unwrap();

    let service = AuthorizationService::new(policy_path.to_str().unwrap())
        .await
        .unwrap();
    (service, temp_dir)
}

#[tokio::test]
async fn test_campus_scoped_assignment() {
    let (service, _temp_dir) = create_test_service().await;

    let decision = service
        .check_permission("alice@example.org", "news.edit", Some(campus(NORTH)))
        .await;
    assert!(matches!(decision, AccessDecision::Granted { ref role, campus: Some(_) } if role == "editor"));

    assert!(
        !service
            .check_permission("alice@example.org", "news.edit", Some(campus(SOUTH)))
            .await
            .is_allowed()
    );
    assert!(
        !service
            .check_permission("alice@example.org", "news.edit", None)
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_super_admin_ignores_campus_and_catalog() {
    let (service, _temp_dir) = create_test_service().await;

    for target in [None, Some(campus(SOUTH))] {
        let decision = service
            .check_permission("root@example.org", "anything.at_all", target)
            .await;
        assert_eq!(
            decision,
            AccessDecision::SuperAdmin {
                role: "super_admin".to_string()
            }
        );
    }
}

#[tokio::test]
async fn test_inactive_roles_and_users_grant_nothing() {
    let (service, _temp_dir) = create_test_service().await;

    assert!(
        !service
            .check_permission("alice@example.org", "users.view", None)
            .await
            .is_allowed()
    );
    assert!(
        !service
            .check_permission("bob@example.org", "news.view", None)
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_unknown_roles_and_users_are_denied() {
    let (service, _temp_dir) = create_test_service().await;

    // ghost is skipped, the editor assignment still counts
    assert!(
        service
            .check_permission("carol@example.org", "news.view", None)
            .await
            .is_allowed()
    );
    assert!(
        !service
            .check_permission("nobody@example.org", "news.view", None)
            .await
            .is_allowed()
    );
    assert!(service
        .resolve_assignments("nobody@example.org")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_assign_and_revoke_persist() {
    let (service, temp_dir) = create_test_service().await;
    let south = campus(SOUTH);

    let assignments = service
        .assign_user_role("alice@example.org", "editor", Some(south), Some("root@example.org"))
        .await
        .unwrap();
    assert_eq!(assignments.len(), 3);
    assert_eq!(
        assignments[2].assigned_by.as_deref(),
        Some("root@example.org")
    );

    // Assigning the same pair again changes nothing
    let again = service
        .assign_user_role("alice@example.org", "editor", Some(south), None)
        .await
        .unwrap();
    assert_eq!(again.len(), 3);

    assert!(
        service
            .check_permission("alice@example.org", "news.edit", Some(south))
            .await
            .is_allowed()
    );

    // A fresh service sees the saved assignment
    let path = temp_dir.path().join("policy.yaml");
    let reloaded = AuthorizationService::new(path.to_str().unwrap())
        .await
        .unwrap();
    assert!(
        reloaded
            .check_permission("alice@example.org", "news.edit", Some(south))
            .await
            .is_allowed()
    );

    service
        .revoke_user_role("alice@example.org", "editor", Some(south))
        .await
        .unwrap();
    assert!(
        !service
            .check_permission("alice@example.org", "news.edit", Some(south))
            .await
            .is_allowed()
    );
    // The north assignment is untouched
    assert!(
        service
            .check_permission("alice@example.org", "news.edit", Some(campus(NORTH)))
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_assignment_errors() {
    let (service, _temp_dir) = create_test_service().await;

    assert_eq!(
        service
            .assign_user_role("alice@example.org", "ghost", None, None)
            .await
            .unwrap_err(),
        AuthorizationError::RoleNotFound("ghost".to_string())
    );
    assert_eq!(
        service
            .assign_user_role("nobody@example.org", "editor", None, None)
            .await
            .unwrap_err(),
        AuthorizationError::UserNotFound("nobody@example.org".to_string())
    );
    // Revoking needs the exact campus
    assert!(matches!(
        service
            .revoke_user_role("alice@example.org", "editor", None)
            .await
            .unwrap_err(),
        AuthorizationError::AssignmentNotFound { .. }
    ));
}

#[tokio::test]
async fn test_failed_save_leaves_policy_unchanged() {
    let temp_dir = tempdir().unwrap();
    // A plain file where the policy directory should be
    let blocker = temp_dir.path().join("rbac");
    tokio::fs::write(&blocker, "").await.unwrap();
    let path = blocker.join("policy.yaml");

    let config: PolicyConfig = serde_norway::from_str(POLICY).unwrap();
    let service =
        AuthorizationService::new_from_config(config, Some(path.to_str().unwrap().to_string()));

    let err = service
        .assign_user_role("alice@example.org", "editor", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Persistence(_)));
    assert_eq!(
        service
            .check_permission("alice@example.org", "news.edit", None)
            .await,
        AccessDecision::Denied
    );
    assert_eq!(
        service
            .get_user_assignments("alice@example.org")
            .await
            .unwrap()
            .len(),
        2
    );

    let err = service
        .revoke_user_role("alice@example.org", "editor", Some(campus(NORTH)))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Persistence(_)));
    assert!(
        service
            .check_permission("alice@example.org", "news.edit", Some(campus(NORTH)))
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_concurrent_grants_are_all_saved() {
    let (service, temp_dir) = create_test_service().await;

    let (first, second) = tokio::join!(
        service.assign_user_role("alice@example.org", "editor", Some(campus(SOUTH)), None),
        service.assign_user_role("carol@example.org", "editor", Some(campus(NORTH)), None),
    );
    first.unwrap();
    second.unwrap();

    let path = temp_dir.path().join("policy.yaml");
    let reloaded = AuthorizationService::new(path.to_str().unwrap())
        .await
        .unwrap();
    assert!(
        reloaded
            .check_permission("alice@example.org", "news.edit", Some(campus(SOUTH)))
            .await
            .is_allowed()
    );
    assert_eq!(
        reloaded
            .get_user_assignments("carol@example.org")
            .await
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn test_effective_permissions() {
    let (service, _temp_dir) = create_test_service().await;

    let alice = service
        .get_user_permissions("alice@example.org")
        .await
        .unwrap();
    assert!(!alice.super_admin);
    assert_eq!(alice.highest_level, 50);
    assert!(alice.global.is_empty());
    assert_eq!(alice.campuses[&campus(NORTH)].len(), 2);

    let root = service.get_user_permissions("root@example.org").await.unwrap();
    assert!(root.super_admin);
    assert_eq!(root.global.len(), 3);
}

#[tokio::test]
async fn test_listing_and_matrix() {
    let (service, _temp_dir) = create_test_service().await;

    assert_eq!(service.list_permissions(Some("news")).await.len(), 2);
    assert_eq!(service.list_permissions(None).await.len(), 3);

    let roles = service.list_roles(None).await;
    assert_eq!(roles[0].code, "super_admin");
    assert_eq!(service.list_roles(Some(false)).await.len(), 1);

    let matrix = service.permission_matrix().await;
    assert_eq!(matrix.roles.len(), 3);
    let edit = matrix
        .permissions
        .iter()
        .find(|row| row.code == "news.edit")
        .unwrap();
    assert!(edit.roles["editor"]);
    assert!(!edit.roles["super_admin"]);
}

#[tokio::test]
async fn test_reload_keeps_policy_when_file_is_broken() {
    let (service, temp_dir) = create_test_service().await;
    let path = temp_dir.path().join("policy.yaml");

    tokio::fs::write(&path, "roles: [this is not a map").await.unwrap();
    assert!(service.reload().await.is_err());
    assert!(
        service
            .check_permission("root@example.org", "news.view", None)
            .await
            .is_allowed()
    );

    let updated = POLICY.replace("name: Bob\n    active: false", "name: Bob");
    tokio::fs::write(&path, updated).await.unwrap();
    service.reload().await.unwrap();
    assert!(
        service
            .check_permission("bob@example.org", "news.view", None)
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_policy_validation_rejects_undeclared_permission() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("policy.yaml");
    let broken = POLICY.replace("[news.view, news.edit]", "[news.view, news.delete]");
    tokio::fs::write(&path, broken).await.unwrap();

    let err = ConfigManager::load_config(path.to_str().unwrap())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("news.delete"));
}

#[tokio::test]
async fn test_missing_policy_file_uses_catalog() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("missing.yaml");

    let service = AuthorizationService::new(path.to_str().unwrap())
        .await
        .unwrap();
    assert!(service.role_count().await >= 7);
    assert!(service.get_user("anyone@example.org").await.is_none());
}

#[tokio::test]
async fn test_fallback_service_with_bootstrap_admin() {
    let service =
        FallbackService::create_fallback_service(Some("admin@example.org".to_string())).await;

    assert!(service.config_path().is_none());
    assert!(
        service
            .check_permission("admin@example.org", "users.roles", None)
            .await
            .is_allowed()
    );

    // In-memory changes work without a policy file
    service
        .assign_user_role(
            "admin@example.org",
            "editor",
            Some(CampusId::new(Uuid::new_v4())),
            None,
        )
        .await
        .unwrap();
    assert!(service.reload().await.is_err());
}

#[tokio::test]
async fn test_fallback_service_without_users_denies() {
    let service = FallbackService::create_fallback_service(None).await;
    assert!(
        !service
            .check_permission("admin@example.org", "users.view", None)
            .await
            .is_allowed()
    );
}
