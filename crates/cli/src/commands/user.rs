//! Account management.
//!
//! Public signup cannot create admins, so the first admin account is made
//! here.

use iqra_core::{Email, Role};
use iqra_server::db::{PgUserRepository, UserRepository};
use iqra_server::services::auth::build_hasher;
use iqra_server::services::{AuthService, Signup};

use super::{CliError, connect};

/// Create an account of any role. Returns the new user id.
pub async fn create(email: &str, name: &str, role: Role, password: &str) -> Result<i32, CliError> {
    let (config, pool) = connect().await?;
    let users = PgUserRepository::new(pool);
    let argon2 = build_hasher(&config.password_hashing)?;

    let user = AuthService::new(&users, &argon2)
        .create_account(Signup {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            role,
            phone: None,
            country: None,
        })
        .await?;

    tracing::info!(
        "User created: ID {}, Email {}, Role {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id.as_i32())
}

/// Deactivate the account registered under `email`.
pub async fn deactivate(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let (_, pool) = connect().await?;
    let users = PgUserRepository::new(pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::UserNotFound(email.to_string()))?;
    users.deactivate(user.id).await?;

    tracing::info!("User deactivated: ID {}, Email {}", user.id, user.email);
    Ok(())
}
