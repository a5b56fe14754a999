use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "admin_role", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
}

impl AdminRole {
    pub fn can_manage_messages(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    pub fn can_manage_admins(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Admin sidebar entries this role may see, in display order.
    pub fn menu(&self) -> Vec<MenuItem> {
        MenuItem::ALL
            .into_iter()
            .filter(|item| item.visible_to(*self))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItem {
    Dashboard,
    Projects,
    Blog,
    Messages,
    Admins,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Dashboard,
        MenuItem::Projects,
        MenuItem::Blog,
        MenuItem::Messages,
        MenuItem::Admins,
    ];

    pub fn visible_to(&self, role: AdminRole) -> bool {
        match self {
            Self::Dashboard | Self::Projects | Self::Blog => true,
            Self::Messages => role.can_manage_messages(),
            Self::Admins => role.can_manage_admins(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Projects => "Projects",
            Self::Blog => "Blog",
            Self::Messages => "Messages",
            Self::Admins => "Admins",
        }
    }

    pub fn href(&self) -> &'static str {
        match self {
            Self::Dashboard => "/admin",
            Self::Projects => "/admin/projects",
            Self::Blog => "/admin/blog",
            Self::Messages => "/admin/messages",
            Self::Admins => "/admin/admins",
        }
    }
}

/// An admin account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: AdminRole,
    pub failed_attempts: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_visibility_follows_role() {
        assert_eq!(
            AdminRole::Editor.menu(),
            [MenuItem::Dashboard, MenuItem::Projects, MenuItem::Blog]
        );
        assert_eq!(
            AdminRole::Admin.menu(),
            [MenuItem::Dashboard, MenuItem::Projects, MenuItem::Blog, MenuItem::Messages]
        );
        assert_eq!(AdminRole::SuperAdmin.menu(), MenuItem::ALL);
    }

    #[test]
    fn roles_use_snake_case() {
        assert_eq!(serde_json::to_string(&AdminRole::SuperAdmin).unwrap(), "\"super_admin\"");
    }
}
