use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, UserRole, UserSession};

/// Name of the cookie that carries the session token for the HTML pages
pub const SESSION_COOKIE: &str = "session";

/// JWT token service for creating and validating session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("session_expires_in", &self.session_expires_in)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given secret and session lifetime
    pub fn new(secret: &str, session_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_expires_in: Duration::hours(session_ttl_hours),
        }
    }

    /// Create a session token for a user
    pub fn create_session_token(
        &self,
        user_id: Uuid,
        username: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.session_expires_in;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Extract user session from token
    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.validate_token(token)?;
        UserSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }

    /// Session lifetime in seconds
    pub fn session_expires_in_seconds(&self) -> usize {
        self.session_expires_in.num_seconds() as usize
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidAuthHeaderFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_creation_and_validation() {
        let jwt_service = JwtService::new("test_secret", 12);
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_session_token(user_id, "laura.h", UserRole::Student)
            .unwrap();

        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "laura.h");
        assert_eq!(claims.role, UserRole::Student);
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("one_secret", 1);
        let verifier = JwtService::new("another_secret", 1);

        let token = issuer
            .create_session_token(Uuid::new_v4(), "admin", UserRole::Admin)
            .unwrap();

        assert!(matches!(
            verifier.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let jwt_service = JwtService::new("test_secret", -2);
        let token = jwt_service
            .create_session_token(Uuid::new_v4(), "admin", UserRole::Admin)
            .unwrap();

        assert!(matches!(
            jwt_service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            extract_bearer_token("Bearer test_token").unwrap(),
            "test_token"
        );

        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }

    #[test]
    fn test_user_session_extraction() {
        let jwt_service = JwtService::new("test_secret", 12);
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_session_token(user_id, "juan.p", UserRole::Employee)
            .unwrap();

        let session = jwt_service.extract_user_session(&token).unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.username, "juan.p");
        assert_eq!(session.role, UserRole::Employee);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_each_token_has_unique_id() {
        let jwt_service = JwtService::new("test_secret", 12);
        let user_id = Uuid::new_v4();

        let first = jwt_service
            .create_session_token(user_id, "admin", UserRole::Admin)
            .unwrap();
        let second = jwt_service
            .create_session_token(user_id, "admin", UserRole::Admin)
            .unwrap();

        let first = jwt_service.validate_token(&first).unwrap();
        let second = jwt_service.validate_token(&second).unwrap();
        assert_ne!(first.jti, second.jti);
    }
}
