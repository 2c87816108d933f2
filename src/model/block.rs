//! Classified block types.

use serde::{Deserialize, Serialize};

/// A classified, role-tagged grouping of fragments.
///
/// A block's role is decided exactly once by the classifiers and never
/// revisited afterwards; the emitter consumes blocks through a forward-only
/// cursor, so re-evaluation after emission is structurally impossible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Structural role of the block.
    pub role: BlockRole,

    /// Text content (empty for figure references).
    pub text: String,

    /// Source page number (1-indexed).
    pub page: u32,

    /// Font size of the source fragment, kept for metadata inference.
    #[serde(default)]
    pub font_size: f32,
}

impl Block {
    /// Create a block with the given role.
    pub fn new(role: BlockRole, text: impl Into<String>, page: u32) -> Self {
        Self {
            role,
            text: text.into(),
            page,
            font_size: 0.0,
        }
    }

    /// Set the source font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>, page: u32) -> Self {
        Self::new(BlockRole::Paragraph, text, page)
    }

    /// Create a heading block at the given level (clamped to 1..=6).
    pub fn heading(text: impl Into<String>, level: u8, page: u32) -> Self {
        Self::new(BlockRole::Heading(level.clamp(1, 6)), text, page)
    }

    /// Check if this block participates in a display-math group.
    pub fn is_math(&self) -> bool {
        matches!(self.role, BlockRole::MathDisplay)
    }

    /// Check if this block is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self.role, BlockRole::ListItem { .. })
    }

    /// Get the heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.role {
            BlockRole::Heading(level) => Some(level),
            _ => None,
        }
    }
}

/// Structural role assigned to a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockRole {
    /// Section heading at level 1..=6.
    Heading(u8),

    /// Plain prose paragraph.
    Paragraph,

    /// Prose paragraph carrying inline math sub-expressions.
    InlineMathParagraph,

    /// One line of a display-math group.
    MathDisplay,

    /// List item with kind and nesting depth (0 = top level).
    ListItem {
        /// Ordered or unordered.
        kind: ListKind,
        /// Nesting depth, clamped to change by at most one per item.
        depth: u8,
    },

    /// Block quotation.
    Quote,

    /// Reference to an emitted image asset, by manifest index.
    FigureReference {
        /// Index into the session's asset manifest, or `None` for a
        /// placeholder left by a decode failure.
        asset: Option<usize>,
    },
}

/// Kind of list a list item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Bulleted list (`itemize`).
    Unordered,
    /// Enumerated list (`enumerate`).
    Ordered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_clamp() {
        let block = Block::heading("Deep", 9, 1);
        assert_eq!(block.heading_level(), Some(6));
    }

    #[test]
    fn test_role_predicates() {
        let math = Block::new(BlockRole::MathDisplay, "E = mc^2", 1);
        assert!(math.is_math());
        assert!(!math.is_list_item());

        let item = Block::new(
            BlockRole::ListItem {
                kind: ListKind::Unordered,
                depth: 0,
            },
            "first",
            1,
        );
        assert!(item.is_list_item());
    }
}
