use once_cell::sync::Lazy;
use regex::Regex;

use crate::editor::TargetCapabilities;

/// Markdown links whose destination is an imgur page or direct image URL.
/// Group 1 is the label, group 2 the URL.
static IMAGE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\((https?://(?:i\.)?imgur\.com/[^)]+)\)").expect("link pattern")
});

/// An image link found on a line, with the document offsets of its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub url: String,
    pub text_start: usize,
    pub text_end: usize,
}

impl LinkSpan {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.text_start && offset <= self.text_end
    }
}

/// Scans `line_text` for image links and returns the first one whose label
/// span contains `offset`. Only the label characters count as the hit
/// region; offsets inside the URL or on the markup punctuation miss, which
/// keeps hovers over faintly rendered syntax from triggering previews.
/// `line_start` is the document offset of the first character of the line.
pub fn find_link_at(line_text: &str, line_start: usize, offset: usize) -> Option<LinkSpan> {
    if line_text.is_empty() || offset < line_start || offset > line_start + line_text.len() {
        return None;
    }

    for captures in IMAGE_LINK.captures_iter(line_text) {
        let label = captures.get(1)?;
        let url = captures.get(2)?;
        let span = LinkSpan {
            url: url.as_str().to_string(),
            text_start: line_start + label.start(),
            text_end: line_start + label.end(),
        };
        if span.contains(offset) {
            return Some(span);
        }
    }

    None
}

/// Whether a pointer target is eligible to trigger link detection at all.
/// Markup glyphs rendered as their own elements are excluded so that
/// hovering a bracket or parenthesis does not open a preview.
pub fn is_hoverable_target(capabilities: &TargetCapabilities) -> bool {
    capabilities.underlined_link || (capabilities.rendered_link && !capabilities.formatting_marker)
}
