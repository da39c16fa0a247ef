pub mod handler;

pub use handler::{add_user_info, delete_user_info, get_user_info, update_user_info};
