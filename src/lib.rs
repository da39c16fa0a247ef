use std::sync::Arc;

use managers::UserInfoManager;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod managers;
pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<UserInfoManager>,
}
