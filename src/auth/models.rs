use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserDetail;

/// User roles for role-based access control
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Student,
    Employee,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Employee => "EMPLOYEE",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Some(UserRole::Student),
            "EMPLOYEE" => Some(UserRole::Employee),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Page a user lands on after signing in
    pub fn home_path(&self) -> &'static str {
        match self {
            UserRole::Admin => "/fitness/admin",
            UserRole::Student | UserRole::Employee => "/fitness/dashboard",
        }
    }
}

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub username: String,
    pub role: UserRole,
    pub exp: usize,       // Expiration time
    pub iat: usize,       // Issued at
    pub jti: String,      // JWT ID (for revocation)
}

/// Credentials for both the JSON login and the login form.
/// `username` also accepts the email of the linked student or employee.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: usize,
    pub user: UserDetail,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// User session information
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub jti: String,
    pub exp: usize,
}

impl UserSession {
    pub fn from_claims(claims: &Claims) -> Result<Self, uuid::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            username: claims.username.clone(),
            role: claims.role,
            jti: claims.jti.clone(),
            exp: claims.exp,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_is_case_insensitive() {
        assert_eq!(UserRole::from_str("student"), Some(UserRole::Student));
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("coach"), None);
        assert_eq!(
            serde_json::to_value(UserRole::Employee).unwrap(),
            serde_json::json!("EMPLOYEE")
        );
    }

    #[test]
    fn test_role_home_path() {
        assert_eq!(UserRole::Admin.home_path(), "/fitness/admin");
        assert_eq!(UserRole::Student.home_path(), "/fitness/dashboard");
        assert_eq!(UserRole::Employee.home_path(), "/fitness/dashboard");
    }
}
