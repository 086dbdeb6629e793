//! User repository for CARLOT.
//!
//! This is the credential store: it owns user persistence and answers
//! authentication queries. Plaintext passwords enter through `create` and
//! `authenticate` only and are hashed or verified immediately; the database
//! never sees anything but the Argon2 hash.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::auth::validation::{validate_email, validate_username};
use crate::{CarlotError, Result};

/// Repository for user persistence and authentication.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, role, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CarlotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Find a user by email address.
    ///
    /// Matching is case-insensitive: the email column is declared
    /// COLLATE NOCASE, so `Alice@Example.com` finds `alice@example.com`.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, role, created_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CarlotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Check if an email address is already registered (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CarlotError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    /// Verify a user's credentials.
    ///
    /// Returns the user only when the email exists and the password matches
    /// the stored hash. Both failure modes collapse into the single
    /// `AuthenticationFailed` variant, and the unknown-email path still pays
    /// for one Argon2 verification so response timing does not reveal
    /// whether the email was known.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        match self.find_by_email(email).await? {
            Some(user) => match verify_password(password, &user.password) {
                Ok(()) => Ok(user),
                Err(_) => Err(CarlotError::AuthenticationFailed),
            },
            None => {
                verify_dummy(password);
                Err(CarlotError::AuthenticationFailed)
            }
        }
    }

    /// Create a new user.
    ///
    /// Field formats are validated, the password is hashed (Argon2id,
    /// salted) and the row inserted. A violation of the email uniqueness
    /// constraint maps to `DuplicateEmail`: the storage-level constraint is
    /// the arbiter when two registrations race, so the caller's pre-check
    /// is advisory only.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        validate_username(&new_user.username)
            .map_err(|e| CarlotError::Validation(e.to_string()))?;
        validate_email(&new_user.email).map_err(|e| CarlotError::Validation(e.to_string()))?;

        let password_hash =
            hash_password(&new_user.password).map_err(|e| CarlotError::Validation(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(new_user.role.as_str())
        .execute(self.pool)
        .await
        .map_err(map_insert_error)?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CarlotError::NotFound("user".to_string()))
    }

    /// Update a user's non-credential fields (username, email, role).
    ///
    /// The immutable id is the sole match condition. The password column is
    /// deliberately absent from the statement: credentials never change
    /// through the generic save path.
    pub async fn update(&self, user: &User) -> Result<()> {
        let result = sqlx::query("UPDATE users SET username = ?, email = ?, role = ? WHERE id = ?")
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(user.id)
            .execute(self.pool)
            .await
            .map_err(map_insert_error)?;

        if result.rows_affected() == 0 {
            return Err(CarlotError::NotFound("user".to_string()));
        }
        Ok(())
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| CarlotError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

/// Translate a write failure into the error taxonomy.
///
/// Uniqueness violations on the email column become `DuplicateEmail`;
/// everything else stays a generic database error.
fn map_insert_error(e: sqlx::Error) -> CarlotError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            if db_err.message().contains("users.email") {
                return CarlotError::DuplicateEmail;
            }
            if db_err.message().contains("users.username") {
                return CarlotError::Validation("username is already taken".to_string());
            }
        }
    }
    CarlotError::Database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Role};

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample_user() -> NewUser {
        NewUser::new("alice", "alice@example.com", "password-123")
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&sample_user()).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&sample_user()).await.unwrap();

        // The stored value is an Argon2 hash, not the plaintext
        assert!(user.password.starts_with("$argon2id$"));
        assert_ne!(user.password, "password-123");
        assert!(verify_password("password-123", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let too_short_name = NewUser::new("ab", "ab@example.com", "password-123");
        assert!(matches!(
            repo.create(&too_short_name).await,
            Err(CarlotError::Validation(_))
        ));

        let bad_email = NewUser::new("charlie", "not-an-email", "password-123");
        assert!(matches!(
            repo.create(&bad_email).await,
            Err(CarlotError::Validation(_))
        ));

        let short_password = NewUser::new("charlie", "charlie@example.com", "short");
        assert!(matches!(
            repo.create(&short_password).await,
            Err(CarlotError::Validation(_))
        ));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let duplicate = NewUser::new("other_name", "alice@example.com", "password-456");
        let result = repo.create(&duplicate).await;

        assert!(matches!(result, Err(CarlotError::DuplicateEmail)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_concurrent() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        // Two registrations race for the same email; the uniqueness
        // constraint decides, so exactly one wins
        let first = NewUser::new("alice", "alice@example.com", "password-123");
        let second = NewUser::new("other_name", "alice@example.com", "password-456");

        let (a, b) = tokio::join!(repo.create(&first), repo.create(&second));

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);

        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(CarlotError::DuplicateEmail)));

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_different_case() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let duplicate = NewUser::new("other_name", "ALICE@Example.COM", "password-456");
        let result = repo.create(&duplicate).await;

        assert!(matches!(result, Err(CarlotError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let duplicate = NewUser::new("alice", "other@example.com", "password-456");
        let result = repo.create(&duplicate).await;

        assert!(matches!(result, Err(CarlotError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let found = repo.find_by_email("alice@example.com").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().username, "alice");

        let missing = repo.find_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_by_email_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let found = repo.find_by_email("Alice@EXAMPLE.com").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_email_exists() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert!(!repo.email_exists("alice@example.com").await.unwrap());
        repo.create(&sample_user()).await.unwrap();
        assert!(repo.email_exists("alice@example.com").await.unwrap());
        assert!(repo.email_exists("ALICE@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let user = repo
            .authenticate("alice@example.com", "password-123")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let result = repo.authenticate("alice@example.com", "wrong-password").await;
        assert!(matches!(result, Err(CarlotError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        let result = repo.authenticate("nobody@example.com", "password-123").await;
        assert!(matches!(result, Err(CarlotError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&sample_user()).await.unwrap();

        // Unknown email and wrong password must produce the same error,
        // including the same message text. This is deliberate policy.
        let unknown = repo
            .authenticate("nobody@example.com", "password-123")
            .await
            .unwrap_err();
        let wrong = repo
            .authenticate("alice@example.com", "wrong-password")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let new_user = NewUser::new("bob", "bob@example.com", "bobs-password").with_role(Role::Admin);
        repo.create(&new_user).await.unwrap();

        let user = repo.find_by_email("bob@example.com").await.unwrap().unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.role, Role::Admin);
        assert_ne!(user.password, "bobs-password");
    }

    #[tokio::test]
    async fn test_update_non_credential_fields() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let mut user = repo.create(&sample_user()).await.unwrap();
        let original_hash = user.password.clone();

        user.username = "alice_renamed".to_string();
        user.email = "alice2@example.com".to_string();
        user.role = Role::Admin;
        repo.update(&user).await.unwrap();

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.username, "alice_renamed");
        assert_eq!(reloaded.email, "alice2@example.com");
        assert_eq!(reloaded.role, Role::Admin);
        // The hash is untouched by the generic save path
        assert_eq!(reloaded.password, original_hash);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = User {
            id: 999,
            username: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
            password: "hash".to_string(),
            role: Role::User,
            created_at: "2024-01-01".to_string(),
        };

        let result = repo.update(&user).await;
        assert!(matches!(result, Err(CarlotError::NotFound(_))));
    }
}
