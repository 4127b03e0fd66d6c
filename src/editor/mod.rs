use crate::ui::{Point, Rect};

pub mod hover;
pub mod link_parser;

/// Text and starting document offset of a single editor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub text: String,
    pub start: usize,
}

/// How the editor rendered the element currently under the pointer. The
/// host fills this from its own decoration classes; the engine only reads
/// the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetCapabilities {
    /// The element is a collapsed-syntax link decoration (the editor shows
    /// the label underlined with the markup hidden).
    pub underlined_link: bool,
    /// The element is part of a link rendered with its markup visible.
    pub rendered_link: bool,
    /// The element is one of the markup glyphs themselves (brackets or
    /// parentheses drawn as separate elements).
    pub formatting_marker: bool,
}

/// The element under the pointer when an enter event fires, together with
/// its on-screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTarget {
    pub capabilities: TargetCapabilities,
    pub rect: Rect,
}

/// Queries answered by the host editor. Both lookups are best-effort: a
/// point outside the text or an offset outside the document yield `None`.
pub trait EditorQuery {
    fn offset_at_point(&self, point: Point) -> Option<usize>;
    fn line_at(&self, offset: usize) -> Option<LineSpan>;
}
