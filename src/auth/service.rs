use sqlx::PgPool;

use crate::auth::password::verify_password;
use crate::auth::{AuthError, JwtService, LoginRequest, UserSession};
use crate::models::User;

const USER_COLUMNS: &str = "u.id, u.username, u.password_hash, u.role, u.is_active, u.is_staff, \
                            u.created_at, u.student_id, u.employee_id";

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str, session_ttl_hours: i64) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret, session_ttl_hours),
            db,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Check credentials and open a session. Returns the user and its token.
    pub async fn login(&self, request: &LoginRequest) -> Result<(User, String), AuthError> {
        let user = self.authenticate(&request.username, &request.password).await?;
        let token = self
            .jwt_service
            .create_session_token(user.id, &user.username, user.role())?;

        tracing::info!("User {} signed in", user.username);
        Ok((user, token))
    }

    /// Resolve the login identifier and verify the password
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = if login.contains('@') {
            self.find_by_email(login).await?
        } else {
            self.find_by_username(login).await?
        }
        .ok_or(AuthError::InvalidCredentials)?;

        let candidate = password.to_string();
        let stored_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
            .await
            .map_err(|err| AuthError::Internal(err.into()))??;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        Ok(user)
    }

    /// Revoke a session until its natural expiry
    pub async fn logout(&self, session: &UserSession) -> Result<(), AuthError> {
        self.blacklist_token(&session.jti, session.exp as i64).await?;
        tracing::info!("User {} signed out", session.username);
        Ok(())
    }

    /// Check if token is blacklisted
    pub async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("SELECT 1 FROM token_blacklist WHERE jti = $1 AND expires_at > NOW()")
            .bind(jti)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(result.is_some())
    }

    /// Validate user session from token. Role and active flag come from the
    /// stored user, so changes apply to sessions already handed out.
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let mut session = self.jwt_service.extract_user_session(token)?;

        if self.is_token_blacklisted(&session.jti).await? {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .find_by_id(session.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        session.role = user.role();
        session.username = user.username;
        Ok(session)
    }

    async fn find_by_id(&self, user_id: uuid::Uuid) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {} FROM users u WHERE u.id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {} FROM users u WHERE u.username = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let query = format!(
            "SELECT {} FROM users u
             LEFT JOIN students s ON s.id = u.student_id
             LEFT JOIN employees e ON e.id = u.employee_id
             WHERE LOWER(s.email) = LOWER($1) OR LOWER(e.email) = LOWER($1)
             ORDER BY u.created_at
             LIMIT 1",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    async fn blacklist_token(&self, jti: &str, exp: i64) -> Result<(), AuthError> {
        let expires_at = chrono::DateTime::from_timestamp(exp, 0)
            .ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING"
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(())
    }
}
