//! User Preference Lookup — the role preference derived from résumé parsing.
//!
//! The résumé pipeline writes `(user_id, preference)` through `set_preference`
//! after parsing; the orchestrator only ever reads the latest value and does
//! not care how it was derived.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The user has never completed onboarding, so no role preference was
    /// ever derived. Terminal and user-correctable, not retried.
    #[error("no stored preference for user")]
    NotSet,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_preference(&self, user_id: Uuid) -> Result<String, PreferenceError>;

    /// Upsert, so re-parsing a résumé always overwrites the stored value.
    async fn set_preference(&self, user_id: Uuid, preference: &str)
        -> Result<(), PreferenceError>;
}

pub struct PgPreferenceStore {
    db: PgPool,
}

impl PgPreferenceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get_preference(&self, user_id: Uuid) -> Result<String, PreferenceError> {
        let row: Option<Option<String>> =
            sqlx::query_scalar("SELECT preference FROM user_skills WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        // A row with a NULL preference means skills were uploaded but the
        // résumé was never parsed; same remedy as no row at all.
        row.flatten().ok_or(PreferenceError::NotSet)
    }

    async fn set_preference(
        &self,
        user_id: Uuid,
        preference: &str,
    ) -> Result<(), PreferenceError> {
        sqlx::query(
            "INSERT INTO user_skills (user_id, preference) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET preference = EXCLUDED.preference",
        )
        .bind(user_id)
        .bind(preference)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
