//! Profile repository.

use sqlx::PgPool;

use mercato_core::{ProfileId, UserId};

use super::RepositoryError;
use crate::models::catalog::ImageView;
use crate::models::profile::ProfileView;

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's profile with its avatar, `None` when no profile exists yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user: UserId) -> Result<Option<ProfileView>, RepositoryError> {
        let row: Option<(String, String, String, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT p.full_name, p.email, p.phone, i.src, i.alt
                 FROM profile p
                 LEFT JOIN profile_image i ON i.profile_id = p.id
                 WHERE p.user_id = $1",
            )
            .bind(user.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(full_name, email, phone, src, alt)| ProfileView {
            full_name,
            email,
            phone,
            avatar: alt.map(|alt| ImageView { src, alt }),
        }))
    }

    /// Create or update a user's profile details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user: UserId,
        full_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO profile (user_id, full_name, email, phone)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id)
             DO UPDATE SET full_name = EXCLUDED.full_name,
                           email = EXCLUDED.email,
                           phone = EXCLUDED.phone",
        )
        .bind(user.as_i32())
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// The user's profile id, lazily creating an empty profile so an avatar
    /// can be attached before any details were ever saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(&self, user: UserId) -> Result<ProfileId, RepositoryError> {
        // The no-op update makes RETURNING fire on the existing row too.
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO profile (user_id)
             VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id",
        )
        .bind(user.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(ProfileId::new(id))
    }

    /// Set or replace the profile's avatar image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_avatar(
        &self,
        profile: ProfileId,
        src: &str,
        alt: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO profile_image (profile_id, src, alt)
             VALUES ($1, $2, $3)
             ON CONFLICT (profile_id)
             DO UPDATE SET src = EXCLUDED.src, alt = EXCLUDED.alt",
        )
        .bind(profile.as_i32())
        .bind(src)
        .bind(alt)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
