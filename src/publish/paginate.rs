//! Message pagination.
//!
//! Webhook messages are limited to [`MAX_MESSAGE_LEN`] characters. Long
//! articles are split at paragraph breaks where possible, then at spaces,
//! and as a last resort at a fixed position. Every cut closes the open code
//! fence and the following chunk reopens it, so each chunk renders on its own.

use tracing::warn;

/// Maximum characters per delivered message.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Markdown code fence delimiter.
pub const FENCE: &str = "```";

/// Prefix reopening the fence at the start of a continuation chunk.
const REOPEN: &str = "```\n";

/// Where a chunk was cut, as a character index into the remaining content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cut {
    /// At the first newline of a `\n\n` pair; both newlines are consumed.
    Paragraph(usize),
    /// At a space; the space is consumed.
    Word(usize),
    /// At the window boundary; nothing is consumed.
    Hard(usize),
}

impl Cut {
    fn position(self) -> usize {
        match self {
            Cut::Paragraph(at) | Cut::Word(at) | Cut::Hard(at) => at,
        }
    }

    /// Characters dropped after the cut position.
    fn skip(self) -> usize {
        match self {
            Cut::Paragraph(_) => 2,
            Cut::Word(_) => 1,
            Cut::Hard(_) => 0,
        }
    }
}

/// Split content into ordered chunks of at most [`MAX_MESSAGE_LEN`] characters.
///
/// Content is never dropped apart from the separator consumed at each cut,
/// and empty input yields no chunks.
pub fn paginate(content: &str) -> Vec<String> {
    let window = MAX_MESSAGE_LEN - FENCE.len();
    let mut parts = Vec::new();
    let mut remaining: Vec<char> = content.chars().collect();

    while !remaining.is_empty() {
        if remaining.len() <= MAX_MESSAGE_LEN {
            parts.push(remaining.iter().collect());
            break;
        }

        let floor = if parts.is_empty() { 0 } else { REOPEN.len() };
        let cut = find_cut(&remaining, floor, window);
        let at = cut.position();

        let mut part: String = remaining[..at].iter().collect();
        part.push_str(FENCE);
        parts.push(part);

        let rest = &remaining[at + cut.skip()..];
        if rest.is_empty() {
            break;
        }
        let mut next: Vec<char> = REOPEN.chars().collect();
        next.extend_from_slice(rest);
        remaining = next;
    }

    parts
}

/// Pick the cut for content longer than the limit.
///
/// Only breaks lying entirely before `window` and strictly after `floor`
/// qualify, so a continuation chunk always carries text past its fence.
fn find_cut(content: &[char], floor: usize, window: usize) -> Cut {
    let searchable = &content[..window];

    let paragraph = searchable
        .windows(2)
        .rposition(|pair| pair == ['\n', '\n'])
        .filter(|&at| at > floor);
    if let Some(at) = paragraph {
        return Cut::Paragraph(at);
    }
    warn!("Paragraph break was not found! Trying to break at a word.");

    let word = searchable
        .iter()
        .rposition(|&c| c == ' ')
        .filter(|&at| at > floor);
    if let Some(at) = word {
        return Cut::Word(at);
    }
    warn!("Word break not found, breaking arbitrarily.");

    Cut::Hard(window)
}
