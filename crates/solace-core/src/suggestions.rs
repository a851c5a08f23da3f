//! Splits a raw assistant reply into the message to display and up to three
//! quick-reply suggestions.
//!
//! The assistant is asked to end each reply with pipe-separated options
//! (`...?|Yeah, exactly|Not really|Let me think|`). Pipes can also appear in
//! ordinary prose, so only short trailing segments are treated as
//! suggestions, scanning greedily from the right.

/// Suggestions must be shorter than this many characters.
pub const MAX_SUGGESTION_CHARS: usize = 60;

/// At most this many suggestions are taken.
pub const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub message: String,
    pub suggestions: Vec<String>,
}

pub fn parse_reply(raw: &str) -> ParsedReply {
    let unchanged = || ParsedReply {
        message: raw.to_string(),
        suggestions: Vec::new(),
    };

    if !raw.contains('|') {
        return unchanged();
    }

    let mut parts: Vec<&str> = raw.split('|').collect();
    let mut suggestions: Vec<String> = Vec::new();

    while parts.len() > 1 && suggestions.len() < MAX_SUGGESTIONS {
        let last = parts[parts.len() - 1].trim();
        if last.is_empty() {
            parts.pop();
            continue;
        }
        if last.chars().count() < MAX_SUGGESTION_CHARS {
            suggestions.insert(0, last.to_string());
            parts.pop();
        } else {
            break;
        }
    }

    if suggestions.is_empty() {
        return unchanged();
    }

    ParsedReply {
        message: parts.join("|").trim().to_string(),
        suggestions,
    }
}
