//! Authentication service.
//!
//! Password accounts with argon2 hashes. Sessions are handled by the caller;
//! this service only decides whether credentials are good.

mod error;

pub use error::AuthError;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use iqra_core::{Email, Role, UserId};

use crate::config::PasswordHashingConfig;
use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (argon2 accepts more, but nobody types this).
const MAX_PASSWORD_LENGTH: usize = 128;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    pub country: Option<String>,
}

/// Authentication service.
///
/// Handles account creation, password login and password changes.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    argon2: &'a Argon2<'static>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository, argon2: &'a Argon2<'static>) -> Self {
        Self { users, argon2 }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Public signup. Only student and teacher accounts may be created here.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RoleNotAllowed` for admin signups,
    /// `AuthError::UserAlreadyExists` if the email is taken, and validation
    /// errors for bad input.
    pub async fn signup(&self, signup: Signup) -> Result<User, AuthError> {
        if !signup.role.is_self_service() {
            return Err(AuthError::RoleNotAllowed(signup.role));
        }
        self.create_account(signup).await
    }

    /// Create an account of any role. Used by operator tooling.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken, and
    /// validation errors for bad input.
    pub async fn create_account(&self, signup: Signup) -> Result<User, AuthError> {
        let email = Email::parse(&signup.email)?;
        let name = signup.name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidField("name is required".to_owned()));
        }
        validate_password(&signup.password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(self.argon2, &signup.password)?;

        let user = self
            .users
            .create(NewUser {
                name: name.to_owned(),
                email,
                password_hash,
                role: signup.role,
                phone: non_empty(signup.phone),
                country: non_empty(signup.country),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Login with email and password.
    ///
    /// When `role` is given, the account must hold exactly that role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email, a
    /// deactivated account, a wrong password, or a role mismatch.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(self.reject_unknown(password));
        };

        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            return Err(self.reject_unknown(password));
        };

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }
        if role.is_some_and(|wanted| wanted != user.role) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Spend one hash's worth of work on an unknown account so the response
    /// time does not reveal which emails are registered.
    fn reject_unknown(&self, password: &str) -> AuthError {
        let _ = hash_password(self.argon2, password);
        AuthError::InvalidCredentials
    }

    /// Change a password after re-verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if `current` is wrong and
    /// `AuthError::WeakPassword` if `new` is not acceptable.
    pub async fn change_password(
        &self,
        user_id: UserId,
        email: &Email,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.id != user_id {
            return Err(AuthError::UserNotFound);
        }

        verify_password(current, &password_hash)?;
        validate_password(new)?;

        let new_hash = hash_password(self.argon2, new)?;
        self.users
            .update_password_hash(user_id, &new_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Build the argon2 hasher for the configured work factor.
///
/// # Errors
///
/// Returns `argon2::Error` if the parameters are out of range.
pub fn build_hasher(config: &PasswordHashingConfig) -> Result<Argon2<'static>, argon2::Error> {
    let params = Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        None,
    )?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password with a fresh random salt.
fn hash_password(argon2: &Argon2<'_>, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string.
///
/// The parameters embedded in the hash are used, so hashes made under an
/// older work factor still verify.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn cheap_hasher() -> Argon2<'static> {
        build_hasher(&PasswordHashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn signup(email: &str, role: Role) -> Signup {
        Signup {
            name: "Maryam".to_owned(),
            email: email.to_owned(),
            password: "recite-daily".to_owned(),
            role,
            phone: None,
            country: Some("  ".to_owned()),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly8").is_ok());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let argon2 = cheap_hasher();
        let first = hash_password(&argon2, "recite-daily").unwrap();
        let second = hash_password(&argon2, "recite-daily").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("recite-daily", &first).is_ok());
        assert!(matches!(
            verify_password("recite-nightly", &first),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_password() {
        let store = MemoryStore::default();
        let argon2 = cheap_hasher();
        let auth = AuthService::new(&store, &argon2);

        let user = auth
            .signup(signup(" Maryam@Example.com ", Role::Student))
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "maryam@example.com");
        assert_eq!(user.country, None);

        let (_, hash) = store
            .get_with_password_hash(&user.email)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(hash, "recite-daily");
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_signup_rejects_admin_and_duplicates() {
        let store = MemoryStore::default();
        let argon2 = cheap_hasher();
        let auth = AuthService::new(&store, &argon2);

        assert!(matches!(
            auth.signup(signup("boss@example.com", Role::Admin)).await,
            Err(AuthError::RoleNotAllowed(Role::Admin))
        ));

        auth.signup(signup("maryam@example.com", Role::Teacher))
            .await
            .unwrap();
        assert!(matches!(
            auth.signup(signup("MARYAM@example.com", Role::Student)).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_login_checks_password_role_and_activity() {
        let store = MemoryStore::default();
        let argon2 = cheap_hasher();
        let auth = AuthService::new(&store, &argon2);
        let user = auth
            .signup(signup("maryam@example.com", Role::Teacher))
            .await
            .unwrap();

        assert!(
            auth.login("MARYAM@example.com", "recite-daily", Some(Role::Teacher))
                .await
                .is_ok()
        );
        assert!(auth.login("maryam@example.com", "recite-daily", None).await.is_ok());
        assert!(matches!(
            auth.login("maryam@example.com", "wrong-password", None).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("maryam@example.com", "recite-daily", Some(Role::Student))
                .await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "recite-daily", None).await,
            Err(AuthError::InvalidCredentials)
        ));

        UserRepository::deactivate(&store, user.id).await.unwrap();
        assert!(matches!(
            auth.login("maryam@example.com", "recite-daily", None).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_or_malformed_email_is_invalid_credentials() {
        let store = MemoryStore::default();
        let argon2 = cheap_hasher();
        let auth = AuthService::new(&store, &argon2);
        auth.signup(signup("maryam@example.com", Role::Student))
            .await
            .unwrap();

        for email in ["stranger@example.com", "not-an-email", ""] {
            assert!(matches!(
                auth.login(email, "recite-daily", None).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
        assert!(matches!(
            auth.reject_unknown("anything at all"),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let store = MemoryStore::default();
        let argon2 = cheap_hasher();
        let auth = AuthService::new(&store, &argon2);
        let user = auth
            .signup(signup("maryam@example.com", Role::Student))
            .await
            .unwrap();

        assert!(matches!(
            auth.change_password(user.id, &user.email, "not-it-at-all", "new-password")
                .await,
            Err(AuthError::InvalidCredentials)
        ));

        auth.change_password(user.id, &user.email, "recite-daily", "new-password")
            .await
            .unwrap();
        assert!(auth.login("maryam@example.com", "new-password", None).await.is_ok());
        assert!(auth.login("maryam@example.com", "recite-daily", None).await.is_err());
    }
}
