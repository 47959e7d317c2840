//! Permission codes known to the backend and the roles seeded on first start.
//!
//! Using these constants instead of string literals keeps route guards and
//! seed data in sync.

use super::model::{Permission, Role, SUPER_ADMIN_LEVEL};

// Users
pub const USERS_VIEW: &str = "users.view";
pub const USERS_CREATE: &str = "users.create";
pub const USERS_EDIT: &str = "users.edit";
pub const USERS_DELETE: &str = "users.delete";
/// Grant and revoke role assignments.
pub const USERS_ROLES: &str = "users.roles";

// Editorial content
pub const EDITORIAL_VIEW: &str = "editorial.view";
pub const EDITORIAL_EDIT: &str = "editorial.edit";
pub const EDITORIAL_DELETE: &str = "editorial.delete";

// News
pub const NEWS_VIEW: &str = "news.view";
pub const NEWS_CREATE: &str = "news.create";
pub const NEWS_EDIT: &str = "news.edit";
pub const NEWS_DELETE: &str = "news.delete";
pub const NEWS_PUBLISH: &str = "news.publish";

// Events
pub const EVENTS_VIEW: &str = "events.view";
pub const EVENTS_CREATE: &str = "events.create";
pub const EVENTS_EDIT: &str = "events.edit";
pub const EVENTS_DELETE: &str = "events.delete";
pub const EVENTS_PUBLISH: &str = "events.publish";

// Academic programs
pub const PROGRAMS_VIEW: &str = "programs.view";
pub const PROGRAMS_CREATE: &str = "programs.create";
pub const PROGRAMS_EDIT: &str = "programs.edit";
pub const PROGRAMS_DELETE: &str = "programs.delete";

// Applications
pub const APPLICATIONS_VIEW: &str = "applications.view";
pub const APPLICATIONS_EVALUATE: &str = "applications.evaluate";
pub const APPLICATIONS_MANAGE: &str = "applications.manage";

// Media
pub const MEDIA_VIEW: &str = "media.view";
pub const MEDIA_UPLOAD: &str = "media.upload";
pub const MEDIA_DELETE: &str = "media.delete";

// Campuses
pub const CAMPUSES_VIEW: &str = "campuses.view";
pub const CAMPUSES_EDIT: &str = "campuses.edit";

// Partners
pub const PARTNERS_VIEW: &str = "partners.view";
pub const PARTNERS_CREATE: &str = "partners.create";
pub const PARTNERS_EDIT: &str = "partners.edit";
pub const PARTNERS_DELETE: &str = "partners.delete";

// Newsletter
pub const NEWSLETTER_VIEW: &str = "newsletter.view";
pub const NEWSLETTER_SEND: &str = "newsletter.send";
pub const NEWSLETTER_MANAGE: &str = "newsletter.manage";

// Statistics
pub const STATS_VIEW: &str = "stats.view";
pub const STATS_EXPORT: &str = "stats.export";

// Settings
pub const SETTINGS_VIEW: &str = "settings.view";
pub const SETTINGS_EDIT: &str = "settings.edit";

// Administration
pub const ADMIN_AUDIT: &str = "admin.audit";
pub const ADMIN_SETTINGS: &str = "admin.settings";

pub const SUPER_ADMIN: &str = "super_admin";
pub const ADMIN: &str = "admin";
pub const EDITOR: &str = "editor";
pub const EVALUATOR: &str = "evaluator";
pub const CAMPUS_MANAGER: &str = "campus_manager";
pub const VIEWER: &str = "viewer";
pub const NEWSLETTER_MANAGER: &str = "newsletter_manager";

/// Roles that cannot be removed from the policy through the API.
pub const SYSTEM_ROLES: [&str; 2] = [SUPER_ADMIN, ADMIN];

const PERMISSIONS: &[(&str, &str)] = &[
    (USERS_VIEW, "View users"),
    (USERS_CREATE, "Create users"),
    (USERS_EDIT, "Edit users"),
    (USERS_DELETE, "Delete users"),
    (USERS_ROLES, "Manage user roles"),
    (EDITORIAL_VIEW, "View editorial content"),
    (EDITORIAL_EDIT, "Edit editorial content"),
    (EDITORIAL_DELETE, "Delete editorial content"),
    (NEWS_VIEW, "View news"),
    (NEWS_CREATE, "Create news"),
    (NEWS_EDIT, "Edit news"),
    (NEWS_DELETE, "Delete news"),
    (NEWS_PUBLISH, "Publish news"),
    (EVENTS_VIEW, "View events"),
    (EVENTS_CREATE, "Create events"),
    (EVENTS_EDIT, "Edit events"),
    (EVENTS_DELETE, "Delete events"),
    (EVENTS_PUBLISH, "Publish events"),
    (PROGRAMS_VIEW, "View programs"),
    (PROGRAMS_CREATE, "Create programs"),
    (PROGRAMS_EDIT, "Edit programs"),
    (PROGRAMS_DELETE, "Delete programs"),
    (APPLICATIONS_VIEW, "View applications"),
    (APPLICATIONS_EVALUATE, "Evaluate applications"),
    (APPLICATIONS_MANAGE, "Manage applications"),
    (MEDIA_VIEW, "View media"),
    (MEDIA_UPLOAD, "Upload media"),
    (MEDIA_DELETE, "Delete media"),
    (CAMPUSES_VIEW, "View campuses"),
    (CAMPUSES_EDIT, "Edit campuses"),
    (PARTNERS_VIEW, "View partners"),
    (PARTNERS_CREATE, "Create partners"),
    (PARTNERS_EDIT, "Edit partners"),
    (PARTNERS_DELETE, "Delete partners"),
    (NEWSLETTER_VIEW, "View newsletters"),
    (NEWSLETTER_SEND, "Send newsletters"),
    (NEWSLETTER_MANAGE, "Manage subscribers"),
    (STATS_VIEW, "View statistics"),
    (STATS_EXPORT, "Export statistics"),
    (SETTINGS_VIEW, "View settings"),
    (SETTINGS_EDIT, "Edit settings"),
    (ADMIN_AUDIT, "Read the audit log"),
    (ADMIN_SETTINGS, "Purge the audit log"),
];

/// Every permission shipped with the backend, in display order.
pub fn default_permissions() -> Vec<Permission> {
    PERMISSIONS
        .iter()
        .map(|(code, label)| Permission::new(*code, *label))
        .collect()
}

/// Roles seeded when no policy file exists yet.
pub fn default_roles() -> Vec<Role> {
    vec![
        Role::new(SUPER_ADMIN, "Super administrator", SUPER_ADMIN_LEVEL)
            .with_description("Full access to every feature"),
        Role::new(ADMIN, "Administrator", 90)
            .with_description("General site administration")
            .with_permissions([
                USERS_VIEW, USERS_CREATE, USERS_EDIT,
                EDITORIAL_VIEW, EDITORIAL_EDIT,
                NEWS_VIEW, NEWS_CREATE, NEWS_EDIT, NEWS_DELETE, NEWS_PUBLISH,
                EVENTS_VIEW, EVENTS_CREATE, EVENTS_EDIT, EVENTS_DELETE, EVENTS_PUBLISH,
                PROGRAMS_VIEW, PROGRAMS_CREATE, PROGRAMS_EDIT,
                APPLICATIONS_VIEW, APPLICATIONS_MANAGE,
                MEDIA_VIEW, MEDIA_UPLOAD, MEDIA_DELETE,
                CAMPUSES_VIEW, CAMPUSES_EDIT,
                PARTNERS_VIEW, PARTNERS_CREATE, PARTNERS_EDIT, PARTNERS_DELETE,
                NEWSLETTER_VIEW, NEWSLETTER_SEND, NEWSLETTER_MANAGE,
                STATS_VIEW, STATS_EXPORT,
                SETTINGS_VIEW,
            ]),
        Role::new(CAMPUS_MANAGER, "Campus manager", 60)
            .with_description("Manages a single campus")
            .with_permissions([
                CAMPUSES_VIEW, CAMPUSES_EDIT,
                EVENTS_VIEW, EVENTS_CREATE, EVENTS_EDIT,
                NEWS_VIEW, NEWS_CREATE, NEWS_EDIT,
                MEDIA_VIEW, MEDIA_UPLOAD,
                STATS_VIEW,
            ]),
        Role::new(EDITOR, "Editor", 50)
            .with_description("Editorial content management")
            .with_permissions([
                EDITORIAL_VIEW, EDITORIAL_EDIT,
                NEWS_VIEW, NEWS_CREATE, NEWS_EDIT, NEWS_PUBLISH,
                EVENTS_VIEW, EVENTS_CREATE, EVENTS_EDIT, EVENTS_PUBLISH,
                MEDIA_VIEW, MEDIA_UPLOAD,
                PARTNERS_VIEW,
            ]),
        Role::new(EVALUATOR, "Evaluator", 40)
            .with_description("Evaluates applications")
            .with_permissions([APPLICATIONS_VIEW, APPLICATIONS_EVALUATE, PROGRAMS_VIEW]),
        Role::new(NEWSLETTER_MANAGER, "Newsletter manager", 30)
            .with_description("Newsletters and subscribers")
            .with_permissions([NEWSLETTER_VIEW, NEWSLETTER_SEND, NEWSLETTER_MANAGE, STATS_VIEW]),
        Role::new(VIEWER, "Viewer", 10)
            .with_description("Read-only access")
            .with_permissions([
                EDITORIAL_VIEW, NEWS_VIEW, EVENTS_VIEW, PROGRAMS_VIEW,
                CAMPUSES_VIEW, PARTNERS_VIEW, STATS_VIEW,
            ]),
    ]
}
