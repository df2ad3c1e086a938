//! The rolling-window policy over a chat's message history.

use crate::openai::{Message, Role};
use crate::telegram::ChatMessage;

/// Marker prefixed to bot replies that are command output rather than
/// conversation. Marked replies never enter the context window.
pub const COMMAND_MARKER: &str = "COMMAND:";

/// Evict oldest-first until the window holds at most `max(1, 2N)`
/// messages. Runs after every append, so the bound holds both at rest
/// and on the wire.
pub fn truncate_to_window(context: &mut Vec<Message>, window: u32) {
    let limit = std::cmp::max(1, window as usize * 2);
    while context.len() > limit {
        context.remove(0);
    }
}

/// Append the replied-to message so the completion sees what the user
/// is responding to. Command echoes are filtered out by their marker;
/// the role follows the original sender's bot flag.
pub fn inject_replied_message(context: &mut Vec<Message>, replied: &ChatMessage) {
    let Some(text) = replied.text.as_deref() else {
        return;
    };
    if text.starts_with(COMMAND_MARKER) {
        return;
    }
    let role = if replied.from.is_bot {
        Role::Assistant
    } else {
        Role::User
    };
    context.push(Message::new(role, text));
}
