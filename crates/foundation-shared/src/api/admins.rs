use serde::{Deserialize, Serialize};

use crate::AdminRole;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: AdminRole,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateAdminRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
}
