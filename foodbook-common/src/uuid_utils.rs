//! Identifier utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Fresh recipe id, random and independent of the clock
pub fn new_recipe_id() -> String {
    generate().to_string()
}

/// Fresh user token, `user_<epoch millis>`.
pub fn new_user_id() -> String {
    format!("user_{}", crate::time::now_millis())
}
