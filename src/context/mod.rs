//! Rolling conversation windows and their persistence.

mod store;
mod window;

pub use store::{clear_context, load_context, save_context};
pub use window::{COMMAND_MARKER, inject_replied_message, truncate_to_window};
