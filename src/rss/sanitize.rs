//! HTML sanitization for feed text.
//!
//! Feed titles and bodies arrive as HTML fragments. Markup is stripped to
//! plain text, `<script>`/`<style>` contents are dropped and entities are
//! decoded. Whitespace is left untouched: paragraph breaks matter to the
//! paginator.

use std::iter::Peekable;
use std::str::CharIndices;

/// Elements whose content is discarded along with the tags.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Longest entity name we try to decode.
const MAX_ENTITY_LEN: usize = 10;

/// Strip markup from an HTML fragment, leaving plain text.
///
/// Never fails; malformed markup degrades to literal text.
pub fn sanitize(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut chars = html.char_indices().peekable();
    let mut skip_until: Option<&'static str> = None;
    // A `<` with no `>` after it cannot open a tag.
    let last_close = html.rfind('>');

    while let Some((at, ch)) = chars.next() {
        match ch {
            '<' if last_close.is_some_and(|close| close > at)
                && starts_tag(chars.peek().map(|(_, c)| c)) =>
            {
                let (closing, name) = tag_name(&read_tag(&mut chars));
                match skip_until {
                    Some(raw) if closing && name == raw => skip_until = None,
                    Some(_) => {}
                    None if !closing => {
                        skip_until = RAW_TEXT_TAGS.iter().copied().find(|raw| *raw == name);
                    }
                    None => {}
                }
            }
            _ if skip_until.is_some() => {}
            '&' => result.push_str(&read_entity(&mut chars)),
            _ => result.push(ch),
        }
    }

    result
}

/// Replace literal `<br/>` and `<br />` markup with newlines.
pub fn normalize_breaks(text: &str) -> String {
    text.replace("<br />", "\n").replace("<br/>", "\n")
}

fn starts_tag(next: Option<&char>) -> bool {
    matches!(next, Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Consume a tag body up to and including the closing `>`.
fn read_tag(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut tag = String::new();
    for (_, ch) in chars.by_ref() {
        if ch == '>' {
            break;
        }
        tag.push(ch);
    }
    tag
}

/// Split a tag body into (is_closing, lowercase element name).
fn tag_name(tag: &str) -> (bool, String) {
    let tag = tag.trim_start();
    let (closing, rest) = match tag.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, tag),
    };
    let name = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    (closing, name)
}

/// Consume an entity following `&`, returning its decoded text.
///
/// Anything that does not form a known entity is returned literally.
fn read_entity(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut entity = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if entity.len() >= MAX_ENTITY_LEN || !(c.is_ascii_alphanumeric() || c == '#') {
            break;
        }
        entity.push(c);
        chars.next();
    }

    if !matches!(chars.peek(), Some((_, ';'))) {
        return format!("&{entity}");
    }
    chars.next();

    match decode_entity(&entity) {
        Some(c) => c.to_string(),
        None => format!("&{entity};"),
    }
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        _ => parse_numeric_entity(entity).and_then(char::from_u32),
    }
}

/// Parse a numeric HTML entity (e.g., "#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok()
    } else {
        None
    }
}
