// board-collab-service/src/utils/mod.rs
pub mod identity;
pub mod ordering;
pub mod state_storage;

pub use identity::{get_user_id_from_request, Identity, UserContext, USER_ID_HEADER};
