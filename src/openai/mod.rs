mod core;

pub use self::core::{Message, Provider, Role, complete, user_token};
