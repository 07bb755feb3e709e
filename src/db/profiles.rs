use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::Profile;

pub async fn find(pool: &PgPool, owner: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>("SELECT id, display_name FROM profiles WHERE id = $1")
        .bind(owner)
        .fetch_optional(pool)
        .await
}

pub async fn upsert_display_name(pool: &PgPool, owner: Uuid, display_name: &str) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (id, display_name) VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET display_name = EXCLUDED.display_name \
         RETURNING id, display_name",
    )
    .bind(owner)
    .bind(display_name)
    .fetch_one(pool)
    .await
}
