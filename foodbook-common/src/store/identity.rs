//! User identity token

use crate::db::{LocalStorage, USER_ID_KEY};
use crate::uuid_utils::new_user_id;
use crate::Result;

/// Get the persisted user token, creating and persisting one on first use
pub async fn get_or_init_user_id(storage: &LocalStorage) -> Result<String> {
    match storage.get_item(USER_ID_KEY).await? {
        Some(user_id) if !user_id.trim().is_empty() => Ok(user_id),
        _ => {
            let user_id = new_user_id();
            storage.set_item(USER_ID_KEY, &user_id).await?;
            tracing::debug!(user_id = %user_id, "Generated new user id");
            Ok(user_id)
        }
    }
}
