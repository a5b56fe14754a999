use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Admin, AdminRole, MenuItem};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub admin_id: Uuid,
    pub role: AdminRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub label: String,
    pub href: String,
}

impl From<MenuItem> for MenuEntry {
    fn from(item: MenuItem) -> Self {
        Self {
            item,
            label: item.label().to_string(),
            href: item.href().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub admin: Admin,
    pub menu: Vec<MenuEntry>,
}
