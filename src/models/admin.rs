use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Admin account. The struct serializes the password hash because it is the
/// collection's document shape; API responses only ever expose
/// [`AdminPublic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "adminId")]
    pub admin_id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: AdminRole,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "lastLogin", with = "crate::util::rfc3339::option", default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::util::rfc3339")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

/// Client-safe projection of an admin account.
#[derive(Debug, Serialize)]
pub struct AdminPublic {
    #[serde(rename = "adminId")]
    pub admin_id: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
}

impl From<&Admin> for AdminPublic {
    fn from(admin: &Admin) -> Self {
        Self {
            admin_id: admin.admin_id.clone(),
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_projection_has_no_password() {
        let admin = Admin {
            admin_id: "admin001".into(),
            email: "admin@example.com".into(),
            password: "$argon2id$fake".into(),
            name: "Admin User".into(),
            role: AdminRole::SuperAdmin,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(AdminPublic::from(&admin)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "super_admin");
        assert_eq!(json["adminId"], "admin001");
    }

    #[test]
    fn login_request_requires_valid_email() {
        let bad: LoginRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "password": "secret1"
        }))
        .unwrap();
        assert!(bad.validate().is_err());

        let ok: LoginRequest = serde_json::from_value(serde_json::json!({
            "email": "admin@example.com",
            "password": "secret1"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
    }
}
