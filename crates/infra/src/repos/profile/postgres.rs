use super::IProfileRepo;
use sqlx::{types::Uuid, FromRow, PgPool};
use taskflow_domain::{Profile, ID};

pub struct PostgresProfileRepo {
    pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRaw {
    user_uid: Uuid,
    email: Option<String>,
    name: Option<String>,
}

impl From<ProfileRaw> for Profile {
    fn from(raw: ProfileRaw) -> Self {
        Profile {
            user_id: raw.user_uid.into(),
            email: raw.email,
            name: raw.name,
        }
    }
}

#[async_trait::async_trait]
impl IProfileRepo for PostgresProfileRepo {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles(user_uid, email, name)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(profile.user_id.inner_ref())
        .bind(&profile.email)
        .bind(&profile.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, ProfileRaw>(
            r#"
            SELECT p.user_uid, p.email, p.name FROM profiles AS p
            WHERE p.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile.map(|p| p.into()))
    }
}
