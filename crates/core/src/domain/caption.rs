// Caption assembly

const TAG_MARKER: char = '#';

/// Build the published caption: raw text, a blank line, then the tag block
///
/// Tags are rendered as `#tag` after stripping any embedded marker
/// characters; blank tags are dropped. No tags means no trailing block.
/// A blank raw caption yields the tag block alone, without the leading
/// blank line the joining rule would otherwise produce.
pub fn compose_caption(raw: Option<&str>, tags: &[String]) -> String {
    let raw = raw.unwrap_or("");
    let tag_block = tags
        .iter()
        .map(|tag| tag.replace(TAG_MARKER, ""))
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("{TAG_MARKER}{tag}"))
        .collect::<Vec<_>>()
        .join(" ");

    match (raw.trim().is_empty(), tag_block.is_empty()) {
        (_, true) => raw.to_string(),
        (true, false) => tag_block,
        (false, false) => format!("{raw}\n\n{tag_block}"),
    }
}
