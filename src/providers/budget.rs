use crate::client::ChatMessage;

/// Per-message overhead for role markers and separators.
const MESSAGE_OVERHEAD_TOKENS: u32 = 4;

/// Headroom kept free below the context limit.
pub const COMPLETION_SAFETY_MARGIN_TOKENS: u32 = 256;

/// Floor for the completion budget whenever the context allows it.
pub const MIN_COMPLETION_TOKENS: u32 = 32;

/// Rough token estimate: the larger of ~3 characters per token and one token
/// per whitespace-separated word.
pub fn estimate_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    let by_chars = text.chars().count().div_ceil(3);
    let by_words = text.split_whitespace().count();
    by_chars.max(by_words).min(u32::MAX as usize) as u32
}

pub fn estimate_conversation_tokens(conversation: &[ChatMessage]) -> u32 {
    conversation
        .iter()
        .map(|message| estimate_tokens(&message.content).saturating_add(MESSAGE_OVERHEAD_TOKENS))
        .fold(0u32, u32::saturating_add)
}

/// Completion budget left once `conversation` is placed in a context window
/// of `context_limit` tokens. Never zero.
pub fn completion_budget(context_limit: u32, conversation: &[ChatMessage]) -> u32 {
    let remaining = context_limit.saturating_sub(estimate_conversation_tokens(conversation));
    if remaining == 0 {
        return 1;
    }

    remaining
        .saturating_sub(COMPLETION_SAFETY_MARGIN_TOKENS)
        .max(MIN_COMPLETION_TOKENS)
        .min(remaining)
}
