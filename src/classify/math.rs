//! Mathematical expression detection and conversion.
//!
//! Classification is deliberately conservative: a line is an expression only
//! when it carries a positive, unambiguous signal (an operator glyph, a Greek
//! letter, exponent/subscript notation, a function call, an isolated numeric
//! fraction). Common-language marker words veto the weak signals, so ordinary
//! prose such as "Find the value of x" stays prose.

use regex::{Captures, Regex};

/// Classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Natural-language prose.
    Prose,
    /// A math-bearing line to be emitted as display math.
    Expression,
}

/// A positively recognized math sub-span inside a prose line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSpan {
    /// Byte offset of the span start.
    pub start: usize,
    /// Byte offset one past the span end.
    pub end: usize,
}

type Rewrite = Box<dyn Fn(&Captures) -> String + Send + Sync>;

/// One entry of the ordered rewrite table.
struct RewriteRule {
    pattern: Regex,
    rewrite: Rewrite,
    /// Require no word character adjacent to the match (numeric fractions).
    isolated: bool,
}

impl RewriteRule {
    fn new(pattern: &str, rewrite: Rewrite) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            rewrite,
            isolated: false,
        }
    }

    fn isolated(pattern: &str, rewrite: Rewrite) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            rewrite,
            isolated: true,
        }
    }
}

/// A candidate rewrite found in the working copy.
struct Candidate {
    start: usize,
    end: usize,
    rule: usize,
    replacement: String,
}

/// Classifies lines as prose or expression and converts recognized
/// sub-patterns to LaTeX math commands.
///
/// Pure over its inputs; compiled pattern tables are built once per instance.
pub struct MathClassifier {
    marker_words: Vec<String>,
    strong_signals: Vec<Regex>,
    weak_signals: Vec<Regex>,
    inline_signals: Vec<Regex>,
    rules: Vec<RewriteRule>,
}

impl MathClassifier {
    /// Create a classifier with the default marker-word list.
    pub fn new() -> Self {
        Self::with_marker_words(default_marker_words())
    }

    /// Create a classifier with a caller-supplied marker-word list.
    pub fn with_marker_words(marker_words: Vec<String>) -> Self {
        Self {
            marker_words,
            strong_signals: vec![
                // Comparison / arithmetic / calculus operator glyphs
                Regex::new(r"[=<>≤≥≠≈±∓×÷∑∏∫∂∇√∞]").unwrap(),
                // Greek letters
                Regex::new(r"[\u{0370}-\u{03FF}\u{00B5}]").unwrap(),
                // Function name immediately followed by a parenthesis
                Regex::new(r"\b(sin|cos|tan|cot|sec|csc|log|ln|exp|min|max)\(").unwrap(),
                // Unicode superscripts / subscripts
                Regex::new(r"[⁰¹²³⁴⁵⁶⁷⁸⁹⁺⁻₀₁₂₃₄₅₆₇₈₉₊₋]").unwrap(),
                // Explicit caret / underscore notation. The underscore form
                // only counts for digit or sign subscripts, so snake_case
                // identifiers in prose never read as subscript notation.
                Regex::new(r"[A-Za-z0-9)]\^[A-Za-z0-9+\-]").unwrap(),
                Regex::new(r"[A-Za-z]_[0-9+\-]").unwrap(),
            ],
            weak_signals: vec![
                // Numeric fraction
                Regex::new(r"\d+/\d+").unwrap(),
                // Digit-letter juxtaposition consistent with exponents
                Regex::new(r"\b[A-Za-z]\d+\b").unwrap(),
            ],
            inline_signals: vec![
                Regex::new(r"[\u{0370}-\u{03FF}\u{00B5}]").unwrap(),
                Regex::new(r"[A-Za-z0-9)][⁰¹²³⁴⁵⁶⁷⁸⁹⁺⁻]+").unwrap(),
                Regex::new(r"[A-Za-z][₀₁₂₃₄₅₆₇₈₉₊₋]+").unwrap(),
                Regex::new(r"[A-Za-z0-9)]\^[A-Za-z0-9+\-]+").unwrap(),
                Regex::new(r"\b(sin|cos|tan|cot|sec|csc|log|ln|exp|min|max)\([^)]*\)").unwrap(),
            ],
            rules: build_rewrite_rules(),
        }
    }

    /// Decide whether a line is prose or a mathematical expression.
    pub fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Prose;
        }

        if self.strong_signals.iter().any(|re| re.is_match(trimmed)) {
            return LineKind::Expression;
        }

        // Weak signals need the absence of marker words; prose wins ties.
        if self.has_marker_word(trimmed) {
            return LineKind::Prose;
        }
        if self
            .weak_signals
            .iter()
            .any(|re| find_isolated(re, trimmed).is_some())
        {
            return LineKind::Expression;
        }

        LineKind::Prose
    }

    /// Convert recognized sub-patterns in a line to LaTeX math commands.
    ///
    /// Rewrites apply on a working copy, non-overlapping, preferring the
    /// earliest-starting and then longest match. Unrecognized symbols pass
    /// through escaped for math-reserved characters, never dropped.
    pub fn convert(&self, line: &str) -> String {
        let mut candidates: Vec<Candidate> = Vec::new();

        for (rule_idx, rule) in self.rules.iter().enumerate() {
            for caps in rule.pattern.captures_iter(line) {
                let m = caps.get(0).unwrap();
                if rule.isolated && !is_isolated(line, m.start(), m.end()) {
                    continue;
                }
                candidates.push(Candidate {
                    start: m.start(),
                    end: m.end(),
                    rule: rule_idx,
                    replacement: (rule.rewrite)(&caps),
                });
            }
        }

        // Earliest start wins, then longest match, then table order.
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a.rule.cmp(&b.rule))
        });

        let mut out = String::with_capacity(line.len());
        let mut cursor = 0usize;
        for cand in candidates {
            if cand.start < cursor {
                continue; // overlaps an already-applied rewrite
            }
            out.push_str(&escape_math_text(&line[cursor..cand.start]));
            out.push_str(&cand.replacement);
            // A command name must not run into a following letter.
            if cand.replacement.chars().last().is_some_and(|c| c.is_ascii_alphabetic())
                && cand.replacement.starts_with('\\')
                && line[cand.end..].chars().next().is_some_and(|c| c.is_alphanumeric())
            {
                out.push(' ');
            }
            cursor = cand.end;
        }
        out.push_str(&escape_math_text(&line[cursor..]));
        out
    }

    /// Locate positively-recognized math sub-spans inside a prose line, for
    /// inline `$...$` wrapping. Overlapping spans are merged.
    pub fn find_inline(&self, line: &str) -> Vec<InlineSpan> {
        let mut spans: Vec<InlineSpan> = Vec::new();
        for re in &self.inline_signals {
            for m in re.find_iter(line) {
                spans.push(InlineSpan {
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        spans.sort_by_key(|s| (s.start, s.end));

        let mut merged: Vec<InlineSpan> = Vec::new();
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        merged
    }

    fn has_marker_word(&self, line: &str) -> bool {
        line.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|word| {
                let lower = word.to_lowercase();
                self.marker_words.iter().any(|m| *m == lower)
            })
    }
}

impl Default for MathClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Marker words that veto weak math signals. Conjunctions, articles, and
/// imperative verbs common in exercise prose.
pub fn default_marker_words() -> Vec<String> {
    [
        "the", "a", "an", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "is",
        "are", "was", "were", "be", "this", "that", "these", "those", "find", "take", "determine",
        "consider", "suppose", "show", "solve", "value", "answer",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn build_rewrite_rules() -> Vec<RewriteRule> {
    vec![
        // √(expr) and √x
        RewriteRule::new(
            r"√\(([^)]+)\)",
            Box::new(|c: &Captures| format!("\\sqrt{{{}}}", &c[1])),
        ),
        RewriteRule::new(
            r"√([A-Za-z0-9]+)",
            Box::new(|c: &Captures| format!("\\sqrt{{{}}}", &c[1])),
        ),
        // Function names immediately followed by a parenthesis
        RewriteRule::new(
            r"\b(sin|cos|tan|cot|sec|csc|log|ln|exp|min|max)\(",
            Box::new(|c: &Captures| format!("\\{}(", &c[1])),
        ),
        // Explicit caret exponent: x^2, E^-1, )^2
        RewriteRule::new(
            r"([A-Za-z0-9)])\^([A-Za-z0-9+\-]+)",
            Box::new(|c: &Captures| format!("{}^{{{}}}", &c[1], &c[2])),
        ),
        // Unicode superscript runs: x², (VGS-Vth)²
        RewriteRule::new(
            r"([A-Za-z0-9)])([⁰¹²³⁴⁵⁶⁷⁸⁹⁺⁻]+)",
            Box::new(|c: &Captures| format!("{}^{{{}}}", &c[1], map_superscript(&c[2]))),
        ),
        // Explicit underscore subscript: x_i, H_2O
        RewriteRule::new(
            r"([A-Za-z])_([A-Za-z0-9+\-]+)",
            Box::new(|c: &Captures| format!("{}_{{{}}}", &c[1], &c[2])),
        ),
        // Unicode subscript runs: H₂O
        RewriteRule::new(
            r"([A-Za-z])([₀₁₂₃₄₅₆₇₈₉₊₋]+)",
            Box::new(|c: &Captures| format!("{}_{{{}}}", &c[1], map_subscript(&c[2]))),
        ),
        // Numeric fractions with no surrounding word characters: 1/2
        RewriteRule::isolated(
            r"(\d+)/(\d+)",
            Box::new(|c: &Captures| format!("\\frac{{{}}}{{{}}}", &c[1], &c[2])),
        ),
        // Operator glyphs
        RewriteRule::new(
            r"[±∓×÷≤≥≠≈∞∑∏∫∂∇∆→←]",
            Box::new(|c: &Captures| map_operator(&c[0]).to_string()),
        ),
        // Greek letters (including micro sign)
        RewriteRule::new(
            r"[\u{0370}-\u{03FF}\u{00B5}]",
            Box::new(|c: &Captures| {
                map_greek(c[0].chars().next().unwrap())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| c[0].to_string())
            }),
        ),
    ]
}

/// Check that the bytes adjacent to `[start, end)` are not word characters.
fn is_isolated(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    let after = line[end..].chars().next();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    !before.is_some_and(is_word) && !after.is_some_and(is_word)
}

/// First isolated match of a weak-signal pattern, if any.
fn find_isolated<'t>(re: &Regex, line: &'t str) -> Option<regex::Match<'t>> {
    re.find_iter(line)
        .find(|m| is_isolated(line, m.start(), m.end()))
}

fn map_superscript(run: &str) -> String {
    run.chars()
        .map(|c| match c {
            '⁰' => '0',
            '¹' => '1',
            '²' => '2',
            '³' => '3',
            '⁴' => '4',
            '⁵' => '5',
            '⁶' => '6',
            '⁷' => '7',
            '⁸' => '8',
            '⁹' => '9',
            '⁺' => '+',
            '⁻' => '-',
            other => other,
        })
        .collect()
}

fn map_subscript(run: &str) -> String {
    run.chars()
        .map(|c| match c {
            '₀' => '0',
            '₁' => '1',
            '₂' => '2',
            '₃' => '3',
            '₄' => '4',
            '₅' => '5',
            '₆' => '6',
            '₇' => '7',
            '₈' => '8',
            '₉' => '9',
            '₊' => '+',
            '₋' => '-',
            other => other,
        })
        .collect()
}

fn map_operator(glyph: &str) -> &'static str {
    match glyph {
        "±" => "\\pm",
        "∓" => "\\mp",
        "×" => "\\times",
        "÷" => "\\div",
        "≤" => "\\leq",
        "≥" => "\\geq",
        "≠" => "\\neq",
        "≈" => "\\approx",
        "∞" => "\\infty",
        "∑" => "\\sum",
        "∏" => "\\prod",
        "∫" => "\\int",
        "∂" => "\\partial",
        "∇" => "\\nabla",
        "∆" => "\\Delta",
        "→" => "\\rightarrow",
        "←" => "\\leftarrow",
        _ => "",
    }
}

fn map_greek(c: char) -> Option<&'static str> {
    Some(match c {
        'α' => "\\alpha",
        'β' => "\\beta",
        'γ' => "\\gamma",
        'δ' => "\\delta",
        'ε' => "\\epsilon",
        'ζ' => "\\zeta",
        'η' => "\\eta",
        'θ' => "\\theta",
        'ι' => "\\iota",
        'κ' => "\\kappa",
        'λ' => "\\lambda",
        'μ' | 'µ' => "\\mu",
        'ν' => "\\nu",
        'ξ' => "\\xi",
        'π' => "\\pi",
        'ρ' => "\\rho",
        'σ' => "\\sigma",
        'τ' => "\\tau",
        'υ' => "\\upsilon",
        'φ' => "\\phi",
        'χ' => "\\chi",
        'ψ' => "\\psi",
        'ω' => "\\omega",
        'Γ' => "\\Gamma",
        'Δ' => "\\Delta",
        'Θ' => "\\Theta",
        'Λ' => "\\Lambda",
        'Ξ' => "\\Xi",
        'Π' => "\\Pi",
        'Σ' => "\\Sigma",
        'Υ' => "\\Upsilon",
        'Φ' => "\\Phi",
        'Ψ' => "\\Psi",
        'Ω' => "\\Omega",
        _ => return None,
    })
}

/// Escape LaTeX-reserved characters in a math-mode text segment.
///
/// `^`, `_`, and braces stay intact because rewrites emit them; only the
/// characters that would terminate or corrupt math mode are escaped.
fn escape_math_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '#' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prose_with_marker_words() {
        let math = MathClassifier::new();
        assert_eq!(math.classify("Find the value of x"), LineKind::Prose);
        assert_eq!(math.classify("Take two apples and add 3"), LineKind::Prose);
        assert_eq!(
            math.classify("Determine whether the answer is 42"),
            LineKind::Prose
        );
    }

    #[test]
    fn test_capitalized_words_are_not_expressions() {
        // The failure mode this classifier was rebuilt to close: ordinary
        // capitalized words must never look like variable-times-suffix.
        let math = MathClassifier::new();
        assert_eq!(math.classify("Hello World"), LineKind::Prose);
        assert_eq!(math.classify("Results"), LineKind::Prose);
    }

    #[test]
    fn test_equation_is_expression() {
        let math = MathClassifier::new();
        assert_eq!(math.classify("E = mc^2"), LineKind::Expression);
        assert_eq!(math.classify("a² + b² = c²"), LineKind::Expression);
        assert_eq!(math.classify("sin(x)"), LineKind::Expression);
        assert_eq!(math.classify("α + β"), LineKind::Expression);
    }

    #[test]
    fn test_snake_case_identifiers_stay_prose() {
        let math = MathClassifier::new();
        assert_eq!(
            math.classify("the file_name field is set"),
            LineKind::Prose
        );
        assert_eq!(math.classify("update max_retry_count now"), LineKind::Prose);
        // Digit subscripts still classify.
        assert_eq!(math.classify("a_1 + b_2"), LineKind::Expression);
    }

    #[test]
    fn test_weak_signal_without_markers() {
        let math = MathClassifier::new();
        // Isolated numeric fraction, no marker words
        assert_eq!(math.classify("1/2 + 1/4"), LineKind::Expression);
        // Same fraction drowned in prose markers
        assert_eq!(
            math.classify("Take 1/2 of the mixture and stir"),
            LineKind::Prose
        );
    }

    #[test]
    fn test_convert_caret_exponent() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("E = mc^2"), "E = mc^{2}");
        assert_eq!(math.convert("x^10 + y"), "x^{10} + y");
    }

    #[test]
    fn test_convert_unicode_scripts() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("x² + y³"), "x^{2} + y^{3}");
        assert_eq!(math.convert("H₂O"), "H_{2}O");
    }

    #[test]
    fn test_convert_greek_and_operators() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("α ≤ β"), "\\alpha \\leq \\beta");
        assert_eq!(math.convert("x ± y"), "x \\pm y");
    }

    #[test]
    fn test_convert_fraction_isolated_only() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("1/2"), "\\frac{1}{2}");
        // Embedded in a word character run: untouched
        assert_eq!(math.convert("v1/2x"), "v1/2x");
    }

    #[test]
    fn test_convert_functions() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("sin(x) + cos(y)"), "\\sin(x) + \\cos(y)");
        assert_eq!(math.convert("log(n)"), "\\log(n)");
    }

    #[test]
    fn test_convert_sqrt() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("√(x+1)"), "\\sqrt{x+1}");
        assert_eq!(math.convert("√25"), "\\sqrt{25}");
    }

    #[test]
    fn test_convert_escapes_reserved_pass_through() {
        let math = MathClassifier::new();
        // Unrecognized reserved characters survive, escaped, never dropped.
        assert_eq!(math.convert("x = 5% & y"), "x = 5\\% \\& y");
    }

    #[test]
    fn test_convert_earliest_longest_wins() {
        let math = MathClassifier::new();
        // The superscript run must win over the single-char Greek rule
        // overlapping it.
        assert_eq!(math.convert("x²³"), "x^{23}");
    }

    #[test]
    fn test_find_inline_merges_overlaps() {
        let math = MathClassifier::new();
        let spans = math.find_inline("the angle α exceeds x^2 here");
        assert_eq!(spans.len(), 2);
        let line = "the angle α exceeds x^2 here";
        assert_eq!(&line[spans[0].start..spans[0].end], "α");
        assert_eq!(&line[spans[1].start..spans[1].end], "x^2");
    }

    #[test]
    fn test_command_separated_from_following_letter() {
        let math = MathClassifier::new();
        assert_eq!(math.convert("mcΔT"), "mc\\Delta T");
        assert_eq!(math.convert("x±y"), "x\\pm y");
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let math = MathClassifier::new();
        let line = "∑ x² / α ≥ 1/2";
        assert_eq!(math.convert(line), math.convert(line));
    }
}
