//! Title, author, date, and abstract inference from the leading blocks.

use crate::model::{Block, BlockRole, DocumentMetadata, Inferred};
use chrono::NaiveDate;
use regex::Regex;

/// Confidence assigned to the filename-derived fallback title.
const FALLBACK_CONFIDENCE: f32 = 0.1;

/// Infers title, authors, date, and abstract from the first K blocks of a
/// document. All four fields are independent best-effort extractions.
pub struct MetadataExtractor {
    window: usize,
    author_patterns: Vec<Regex>,
    date_patterns: Vec<Regex>,
    email_pattern: Regex,
    name_pattern: Regex,
}

impl MetadataExtractor {
    /// Create an extractor looking at the first `window` blocks.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            // Ordered: first matching pattern wins.
            author_patterns: vec![
                // "By Author Name" / "Written by A and B"; the prefix is
                // case-insensitive but the name shape stays strict.
                Regex::new(r"^(?i:(?:written\s+)?by)[:,]?\s+([A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+)+(?:(?:,|\s+and)\s+[A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+)+)*)").unwrap(),
                // "Author:" prefix
                Regex::new(r"^(?i:authors?)[:,]\s*(.+)$").unwrap(),
                // Honorific-prefixed names
                Regex::new(r"^((?:Dr|Prof|Professor)\.?\s+[A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+)+)").unwrap(),
                // "First Last and First Last"
                Regex::new(r"^([A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+)+\s+and\s+[A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+)+)$").unwrap(),
            ],
            date_patterns: vec![
                // ISO
                Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap(),
                // Month D, YYYY
                Regex::new(r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})\b").unwrap(),
                // D Month YYYY
                Regex::new(r"\b(\d{1,2})\s+(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})\b").unwrap(),
                // Month YYYY
                Regex::new(r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})\b").unwrap(),
                // "Published: 2021" / "Copyright 2021"
                Regex::new(r"(?i)\b(?:published|copyright|©)[:\s]\s*(\d{4})\b").unwrap(),
            ],
            email_pattern: Regex::new(r"\b[\w.+-]+@[\w-]+\.[A-Za-z]{2,}\b").unwrap(),
            name_pattern: Regex::new(r"([A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+)+)\s*$")
                .unwrap(),
        }
    }

    /// Run all four extractions over the leading blocks.
    ///
    /// `default_title` is the caller-supplied fallback identifier, typically
    /// derived from the source filename; it is used (with low confidence)
    /// when no plausible candidate exists, so the title is never empty.
    pub fn extract(&self, blocks: &[Block], default_title: &str) -> DocumentMetadata {
        let head = &blocks[..blocks.len().min(self.window)];

        let (title, title_idx) = self.extract_title(head, default_title);
        let authors = self.extract_authors(head, title_idx);
        let date = self.extract_date(head);
        let abstract_text = self.extract_abstract(blocks);

        DocumentMetadata {
            title,
            authors,
            date,
            abstract_text,
        }
    }

    /// Largest-font plausible candidate wins; position agreement raises
    /// confidence. Returns the candidate's index so the author scan can
    /// start just below it.
    fn extract_title(&self, head: &[Block], default_title: &str) -> (Inferred<String>, Option<usize>) {
        let mut best: Option<(usize, f32)> = None;
        for (idx, block) in head.iter().enumerate() {
            if !plausible_title(&block.text) {
                continue;
            }
            match best {
                Some((_, size)) if block.font_size <= size => {}
                _ => best = Some((idx, block.font_size)),
            }
        }

        match best {
            Some((idx, _)) => {
                let text = head[idx].text.trim().to_string();
                // Font and position signals agreeing means high confidence.
                let confidence = if idx <= 2 && head[idx].page == head[0].page {
                    0.9
                } else {
                    0.6
                };
                log::debug!("title candidate {:?} (confidence {})", text, confidence);
                (Inferred::new(text, confidence), Some(idx))
            }
            None => (
                Inferred::new(default_title.to_string(), FALLBACK_CONFIDENCE),
                None,
            ),
        }
    }

    /// First matching author pattern on the blocks following the title wins.
    fn extract_authors(&self, head: &[Block], title_idx: Option<usize>) -> Inferred<Vec<String>> {
        let start = title_idx.map(|i| i + 1).unwrap_or(0);
        for block in head.iter().skip(start) {
            let line = block.text.trim();
            if line.is_empty() {
                continue;
            }
            for (prio, pattern) in self.author_patterns.iter().enumerate() {
                if let Some(caps) = pattern.captures(line) {
                    let names = split_author_list(&caps[1]);
                    if names.is_empty() {
                        continue;
                    }
                    let confidence = if prio == 0 { 0.85 } else { 0.6 };
                    return Inferred::new(names, confidence);
                }
            }
            // A name adjacent to an email token is a strong author signal.
            if let Some(m) = self.email_pattern.find(line) {
                let prefix = line[..m.start()].trim_end_matches(['<', '(', ' ']);
                if let Some(caps) = self.name_pattern.captures(prefix) {
                    return Inferred::new(vec![caps[1].trim().to_string()], 0.7);
                }
            }
        }
        Inferred::none()
    }

    /// First matching date-shape pattern wins; the match is normalized to a
    /// single canonical output format.
    fn extract_date(&self, head: &[Block]) -> Inferred<String> {
        for block in head {
            let line = block.text.trim();
            for (prio, pattern) in self.date_patterns.iter().enumerate() {
                if let Some(caps) = pattern.captures(line) {
                    if let Some(normalized) = normalize_date(prio, &caps) {
                        let confidence = if prio <= 2 { 0.8 } else { 0.5 };
                        return Inferred::new(normalized, confidence);
                    }
                }
            }
        }
        Inferred::none()
    }

    /// A block equal to or starting with "abstract" marks the start; the
    /// body runs until the next heading.
    fn extract_abstract(&self, blocks: &[Block]) -> Inferred<String> {
        let marker = blocks.iter().position(|b| {
            let lower = b.text.trim().to_lowercase();
            lower == "abstract" || lower.starts_with("abstract")
        });
        let Some(start) = marker else {
            return Inferred::none();
        };

        let mut body: Vec<&str> = Vec::new();
        // Inline form: "Abstract. We present..." keeps its own remainder.
        let first = blocks[start].text.trim();
        let remainder = first.get("abstract".len()..).unwrap_or("");
        let remainder = remainder.trim_start_matches([':', '.', '-', '—']).trim();
        if !remainder.is_empty() {
            body.push(remainder);
        }

        for block in &blocks[start + 1..] {
            if matches!(block.role, BlockRole::Heading(_)) {
                break;
            }
            let text = block.text.trim();
            if !text.is_empty() {
                body.push(text);
            }
        }

        if body.is_empty() {
            return Inferred::none();
        }
        Inferred::new(body.join(" "), 0.8)
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(12)
    }
}

/// Length bounds and casing checks for a title candidate.
fn plausible_title(text: &str) -> bool {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if !(4..=120).contains(&len) {
        return false;
    }
    // All-lowercase lines are body text, not titles.
    if trimmed
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_lowercase())
    {
        return false;
    }
    // Page furniture is never a title.
    let lower = trimmed.to_lowercase();
    if lower.starts_with("page ") || trimmed.chars().all(|c| c.is_numeric() || c.is_whitespace()) {
        return false;
    }
    true
}

/// Split a matched author run on the fixed conjunction/comma rule.
fn split_author_list(run: &str) -> Vec<String> {
    run.split(&[',', ';'][..])
        .flat_map(|part| part.split(" and "))
        .map(|name| name.trim().trim_end_matches('.').to_string())
        .filter(|name| name.contains(' ') || name.starts_with("Dr"))
        .collect()
}

/// Normalize a matched date to ISO `YYYY-MM-DD`, or `Month YYYY` when no
/// day is known, or the bare year.
fn normalize_date(pattern_index: usize, caps: &regex::Captures<'_>) -> Option<String> {
    let (year, month, day): (i32, u32, u32) = match pattern_index {
        0 => (
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        ),
        1 => (
            caps[3].parse().ok()?,
            month_number(&caps[1])?,
            caps[2].parse().ok()?,
        ),
        2 => (
            caps[3].parse().ok()?,
            month_number(&caps[2])?,
            caps[1].parse().ok()?,
        ),
        3 => {
            let year: i32 = caps[2].parse().ok()?;
            if !(1900..=2099).contains(&year) {
                return None;
            }
            return Some(format!("{} {}", &caps[1], year));
        }
        _ => {
            let year: i32 = caps[1].parse().ok()?;
            if !(1900..=2099).contains(&year) {
                return None;
            }
            return Some(year.to_string());
        }
    };
    if !(1900..=2099).contains(&year) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn month_number(name: &str) -> Option<u32> {
    let months = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}
