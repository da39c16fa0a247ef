use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户信息实体，Id 由数据库在插入时分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub address: String,
}

/// 尚未持久化的用户信息，没有 Id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserInfo {
    pub name: String,
    pub address: String,
}
