//! Whitespace-boundary chunking for bounded-size completion requests.
//!
//! Long prompt content is split into ordered segments of at most
//! `max_units` whitespace-delimited tokens so each segment stays under the
//! completion service's context ceiling. Tokens are never split; joining
//! the segments with single spaces reproduces the whitespace-normalized
//! input.

/// Default segment size in tokens, sized to stay under the completion
/// service's context ceiling with room for instructions.
pub const DEFAULT_CHUNK_UNITS: usize = 2700;

/// Split `text` into segments of at most `max_units` tokens.
///
/// Pure function of its input. Always returns at least one segment: empty
/// or all-whitespace input yields a single empty segment so downstream
/// request loops have something to process.
pub fn chunk(text: &str, max_units: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in text.split_whitespace() {
        if current.len() >= max_units && !current.is_empty() {
            segments.push(current.join(" "));
            current.clear();
        }
        current.push(token);
    }

    if !current.is_empty() {
        segments.push(current.join(" "));
    }

    if segments.is_empty() {
        segments.push(String::new());
    }

    segments
}
