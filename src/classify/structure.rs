//! Block-role classification from font and layout heuristics.

use crate::model::{BlockRole, ListKind};
use regex::Regex;
use std::collections::HashMap;

/// Tolerance when comparing font sizes for equality.
const SIZE_EPSILON: f32 = 0.25;

/// Assigns structural roles (heading, list item, quote, paragraph) to
/// candidate lines from font-size deltas, casing, length, and position.
///
/// Holds the document-lifetime heading size-rank table, so one instance
/// serves exactly one conversion.
pub struct StructureClassifier {
    heading_ratio: f32,
    bullet_pattern: Regex,
    enumerator_pattern: Regex,
    /// Distinct heading sizes with their assigned levels,
    /// first-seen-largest-wins for the document's lifetime.
    size_levels: Vec<(f32, u8)>,
    /// Indentation and depth of the previous list item, if the previous
    /// classified line was one.
    prev_list: Option<(u32, u8)>,
}

impl StructureClassifier {
    /// Create a classifier with the given heading font-size ratio.
    pub fn new(heading_ratio: f32) -> Self {
        Self {
            heading_ratio,
            bullet_pattern: Regex::new(r"^[•◦▪‣·*\-–]\s+").unwrap(),
            enumerator_pattern: Regex::new(r"^(\d{1,3}|[a-zA-Z])[.)]\s+").unwrap(),
            size_levels: Vec::new(),
            prev_list: None,
        }
    }

    /// Classify one candidate line.
    ///
    /// `modal_size` is the modal body font size of the line's page. Roles
    /// are decided once here and never revisited; anything not positively
    /// recognized degrades to `Paragraph`.
    pub fn classify(&mut self, text: &str, font_size: f32, indent: u32, modal_size: f32) -> BlockRole {
        let trimmed = text.trim();

        if let Some(kind) = self.list_kind(trimmed) {
            let depth = self.list_depth(indent);
            self.prev_list = Some((indent, depth));
            return BlockRole::ListItem { kind, depth };
        }
        // Any non-list line terminates the running list context.
        self.prev_list = None;

        if self.is_heading(trimmed, font_size, modal_size) {
            let level = self.level_for_size(font_size);
            return BlockRole::Heading(level);
        }

        if is_quote(trimmed) {
            return BlockRole::Quote;
        }

        BlockRole::Paragraph
    }

    /// Heading requires more than two characters of text, plus either a
    /// significant font-size multiple of the body size or shouty casing
    /// across at least two words. Isolated variable-like letters are never
    /// promoted to section titles.
    fn is_heading(&self, text: &str, font_size: f32, modal_size: f32) -> bool {
        if text.chars().count() <= 2 {
            return false;
        }
        if modal_size > 0.0 && font_size >= modal_size * self.heading_ratio {
            return true;
        }
        let words = text.split_whitespace().count();
        words >= 2
            && text
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(|c| c.is_uppercase())
            && text.chars().any(|c| c.is_alphabetic())
    }

    /// Monotonic level for a heading size: the largest distinct size seen so
    /// far maps to level 1, the next to level 2, capped at 6. Existing
    /// assignments are never demoted when a larger size appears later.
    fn level_for_size(&mut self, size: f32) -> u8 {
        if let Some(&(_, level)) = self
            .size_levels
            .iter()
            .find(|(s, _)| (s - size).abs() < SIZE_EPSILON)
        {
            return level;
        }
        let larger = self
            .size_levels
            .iter()
            .filter(|(s, _)| *s > size + SIZE_EPSILON)
            .count();
        let level = (larger + 1).min(6) as u8;
        self.size_levels.push((size, level));
        level
    }

    fn list_kind(&self, text: &str) -> Option<ListKind> {
        if self.bullet_pattern.is_match(text) {
            return Some(ListKind::Unordered);
        }
        if self.enumerator_pattern.is_match(text) {
            return Some(ListKind::Ordered);
        }
        None
    }

    /// Nesting depth from the indentation delta relative to the previous
    /// list item, clamped to one level of change per line.
    fn list_depth(&self, indent: u32) -> u8 {
        match self.prev_list {
            None => 0,
            Some((prev_indent, prev_depth)) => {
                if indent > prev_indent {
                    prev_depth.saturating_add(1).min(5)
                } else if indent < prev_indent {
                    prev_depth.saturating_sub(1)
                } else {
                    prev_depth
                }
            }
        }
    }

    /// Strip the list marker from an already-classified list item line.
    pub fn strip_list_marker<'t>(&self, text: &'t str) -> &'t str {
        let trimmed = text.trim();
        if let Some(m) = self.bullet_pattern.find(trimmed) {
            return &trimmed[m.end()..];
        }
        if let Some(m) = self.enumerator_pattern.find(trimmed) {
            return &trimmed[m.end()..];
        }
        trimmed
    }
}

/// Modal font size over a page's fragments, bucketed to half-point
/// resolution. Returns 0.0 for an empty page.
pub fn modal_font_size(sizes: impl Iterator<Item = f32>) -> f32 {
    let mut counts: HashMap<u32, u32> = HashMap::new();
    for size in sizes {
        let bucket = (size * 2.0).round() as u32;
        *counts.entry(bucket).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(bucket, count)| (count, bucket))
        .map(|(bucket, _)| bucket as f32 / 2.0)
        .unwrap_or(0.0)
}

/// A line fully wrapped in matching quotation glyphs, long enough to be a
/// quotation rather than a quoted term.
fn is_quote(text: &str) -> bool {
    let pairs = [('"', '"'), ('“', '”'), ('«', '»')];
    let mut chars = text.chars();
    let (first, last) = match (chars.next(), chars.next_back()) {
        (Some(f), Some(l)) => (f, l),
        _ => return false,
    };
    pairs.iter().any(|&(open, close)| first == open && last == close)
        && text.split_whitespace().count() >= 4
}
