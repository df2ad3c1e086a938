mod core;
mod markdown;

pub use self::core::{
    CallbackQuery, Chat, ChatMessage, Inbound, InlineQuery, Update, User,
    answer_callback_query_response, answer_inline_query_response, edit_inline_message_text,
    empty_inline_menu_response, send_message_response,
};
pub use markdown::sanitize;
