// 业务管理器模块
// 读穿缓存、唯一性校验和写互斥都在这里编排

pub mod user_info;

pub use user_info::{AddOrUpdateUserInfoRequest, UserInfoManager};
