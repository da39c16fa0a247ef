use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::user_info::{NewUserInfo, UserInfo};

/// 用户信息存储库抽象
#[async_trait]
pub trait UserInfoRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<UserInfo>, sqlx::Error>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, sqlx::Error>;
    async fn exists_by_name(&self, name: &str) -> Result<bool, sqlx::Error>;
    /// 调用方必须先检查 id 存在，id 不存在时返回错误
    async fn name_by_id(&self, id: i32) -> Result<String, sqlx::Error>;
    async fn insert(&self, user_info: NewUserInfo) -> Result<i32, sqlx::Error>;
    async fn update_by_id(&self, id: i32, user_info: NewUserInfo) -> Result<(), sqlx::Error>;
    async fn delete_by_id(&self, id: i32) -> Result<(), sqlx::Error>;
}

/// PostgreSQL 用户信息存储库实现
pub struct PgUserInfoRepository {
    pool: PgPool,
}

impl PgUserInfoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserInfoRepository for PgUserInfoRepository {
    async fn list_all(&self) -> Result<Vec<UserInfo>, sqlx::Error> {
        sqlx::query_as::<_, UserInfo>(
            r#"
            SELECT id, name, address
            FROM user_info
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM user_info WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM user_info WHERE name = $1)
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn name_by_id(&self, id: i32) -> Result<String, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name FROM user_info WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert(&self, user_info: NewUserInfo) -> Result<i32, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO user_info (name, address)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user_info.name)
        .bind(&user_info.address)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Inserted user info {} with id {}", user_info.name, id);
        Ok(id)
    }

    async fn update_by_id(&self, id: i32, user_info: NewUserInfo) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE user_info
            SET name = $1, address = $2
            WHERE id = $3
            "#,
        )
        .bind(&user_info.name)
        .bind(&user_info.address)
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::info!("Updated user info {}", id);
        Ok(())
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM user_info WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::info!("Deleted user info {}", id);
        Ok(())
    }
}
