use std::collections::HashSet;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe formatting tags (like <b>, <p>, <sup>) survive,
/// while <script>, <iframe> and event-handler attributes are stripped.
/// Question prompts and directions arrive from the backend as rich text,
/// so they pass through here before being shown.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Reduces rich text to a single line of plain text.
/// The contents of <script> and <style> are dropped entirely.
pub fn plain_text(input: &str) -> String {
    let stripped = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();

    unescape_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncates to `max` characters, appending an ellipsis when cut.
pub fn truncate(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max).collect();
    out.push('…');
    out
}

fn unescape_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
