//! Single-pass LaTeX document emitter.

use crate::classify::MathClassifier;
use crate::emit::escape::escape_latex;
use crate::emit::options::EmitOptions;
use crate::emit::result::ConversionStats;
use crate::model::{Block, BlockRole, DocumentMetadata, ImageAsset, ListKind};

/// Emits a complete LaTeX document from classified blocks in one forward
/// pass.
///
/// The emitter keeps a small state machine (open math group, open list
/// stack) and a monotonic figure counter. Blocks are consumed through a
/// forward-only cursor; no block is visited twice and no emitted text is
/// rewritten after the cursor moves past it.
pub struct LatexEmitter {
    options: EmitOptions,
    math: MathClassifier,
    figure_counter: u32,
}

/// Open structural context between blocks.
enum EmitState {
    /// No open environment.
    Idle,
    /// Accumulated display-math lines, already converted.
    MathGroup(Vec<String>),
    /// Open list environments, innermost last.
    List(Vec<ListKind>),
}

impl LatexEmitter {
    /// Create an emitter for the given options.
    pub fn new(options: EmitOptions) -> Self {
        let math = MathClassifier::with_marker_words(options.marker_words.clone());
        Self {
            options,
            math,
            figure_counter: 0,
        }
    }

    /// Emit the full document for the given classified blocks.
    ///
    /// Re-emitting the same block stream produces byte-identical output; the
    /// figure counter is per-document, so it restarts here and then only
    /// grows until the document ends.
    pub fn emit_document(
        &mut self,
        blocks: &[Block],
        metadata: &DocumentMetadata,
        assets: &[ImageAsset],
        stats: &mut ConversionStats,
    ) -> String {
        self.figure_counter = 0;
        let mut out = String::new();
        self.emit_preamble(&mut out, metadata, !assets.is_empty());

        if let Some(abstract_text) = metadata.abstract_text.as_ref() {
            out.push_str("\\begin{abstract}\n");
            out.push_str(&escape_latex(abstract_text));
            out.push_str("\n\\end{abstract}\n\n");
        }

        let mut state = EmitState::Idle;
        let mut current_page = blocks.first().map(|b| b.page).unwrap_or(0);

        for block in blocks {
            if self.options.page_breaks && block.page != current_page {
                state = self.close_state(&mut out, state, stats);
                out.push_str("\\newpage\n\n");
            }
            current_page = block.page;

            state = self.emit_block(&mut out, block, state, assets, stats);
        }
        self.close_state(&mut out, state, stats);

        out.push_str("\\end{document}\n");
        out
    }

    fn emit_preamble(&self, out: &mut String, metadata: &DocumentMetadata, has_images: bool) {
        out.push_str(&format!(
            "\\documentclass{{{}}}\n",
            self.options.template.class_name()
        ));
        out.push_str("\\usepackage[utf8]{inputenc}\n");
        out.push_str("\\usepackage[T1]{fontenc}\n");
        out.push_str("\\usepackage{geometry}\n");
        out.push_str("\\usepackage{amsmath}\n");
        out.push_str("\\usepackage{amsfonts}\n");
        if has_images && self.options.include_images {
            out.push_str("\\usepackage{graphicx}\n");
            out.push_str("\\usepackage{float}\n");
        }
        out.push('\n');

        if let Some(title) = metadata.title.as_ref() {
            out.push_str(&format!("\\title{{{}}}\n", escape_latex(title)));
        }
        if let Some(authors) = metadata.authors.as_ref() {
            let joined = authors
                .iter()
                .map(|a| escape_latex(a))
                .collect::<Vec<_>>()
                .join(" \\and ");
            out.push_str(&format!("\\author{{{}}}\n", joined));
        }
        if let Some(date) = metadata.date.as_ref() {
            out.push_str(&format!("\\date{{{}}}\n", escape_latex(date)));
        }

        out.push_str("\n\\begin{document}\n");
        if metadata.title.as_ref().is_some() {
            out.push_str("\\maketitle\n");
        }
        out.push('\n');
    }

    /// Emit one block, threading the open-environment state through.
    fn emit_block(
        &mut self,
        out: &mut String,
        block: &Block,
        state: EmitState,
        assets: &[ImageAsset],
        stats: &mut ConversionStats,
    ) -> EmitState {
        match &block.role {
            BlockRole::MathDisplay => {
                let converted = self.math.convert(&block.text);
                match state {
                    EmitState::MathGroup(mut lines) => {
                        lines.push(converted);
                        EmitState::MathGroup(lines)
                    }
                    other => {
                        let idle = self.close_state(out, other, stats);
                        debug_assert!(matches!(idle, EmitState::Idle));
                        EmitState::MathGroup(vec![converted])
                    }
                }
            }

            BlockRole::ListItem { kind, depth } => {
                let mut stack = match state {
                    EmitState::List(stack) => stack,
                    other => {
                        self.close_state(out, other, stats);
                        Vec::new()
                    }
                };
                let target = *depth as usize + 1;
                while stack.len() > target {
                    close_list(out, stack.pop().unwrap());
                }
                if stack.len() == target && stack.last() != Some(kind) {
                    close_list(out, stack.pop().unwrap());
                }
                while stack.len() < target {
                    open_list(out, *kind, stack.len());
                    stack.push(*kind);
                }
                indent_for(out, stack.len());
                out.push_str("\\item ");
                out.push_str(&self.emit_prose(&block.text, stats));
                out.push('\n');
                stats.list_items += 1;
                EmitState::List(stack)
            }

            BlockRole::Heading(level) => {
                self.close_state(out, state, stats);
                let command = heading_command(*level);
                out.push_str(&format!("\\{}{{{}}}\n\n", command, escape_latex(&block.text)));
                stats.headings += 1;
                EmitState::Idle
            }

            BlockRole::Paragraph => {
                self.close_state(out, state, stats);
                out.push_str(&escape_latex(&block.text));
                out.push_str("\n\n");
                stats.paragraphs += 1;
                EmitState::Idle
            }

            BlockRole::InlineMathParagraph => {
                self.close_state(out, state, stats);
                out.push_str(&self.emit_prose(&block.text, stats));
                out.push_str("\n\n");
                stats.paragraphs += 1;
                EmitState::Idle
            }

            BlockRole::Quote => {
                self.close_state(out, state, stats);
                out.push_str("\\begin{quote}\n");
                out.push_str(&escape_latex(&block.text));
                out.push_str("\n\\end{quote}\n\n");
                stats.paragraphs += 1;
                EmitState::Idle
            }

            BlockRole::FigureReference { asset } => {
                self.close_state(out, state, stats);
                self.emit_figure(out, asset.and_then(|i| assets.get(i)), stats);
                EmitState::Idle
            }
        }
    }

    /// Prose with inline math spans wrapped in `$...$`. Gap text is escaped
    /// exactly once; span text goes through the rewrite rules instead.
    fn emit_prose(&self, text: &str, stats: &mut ConversionStats) -> String {
        let spans = self.math.find_inline(text);
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in spans {
            if span.end - span.start > self.options.inline_threshold {
                continue;
            }
            out.push_str(&escape_latex(&text[cursor..span.start]));
            out.push('$');
            out.push_str(&self.math.convert(&text[span.start..span.end]));
            out.push('$');
            cursor = span.end;
            stats.inline_math_spans += 1;
        }
        out.push_str(&escape_latex(&text[cursor..]));
        out
    }

    /// Figure environment for an emitted asset, or a comment placeholder
    /// when decoding failed and no asset exists.
    fn emit_figure(
        &mut self,
        out: &mut String,
        asset: Option<&ImageAsset>,
        stats: &mut ConversionStats,
    ) {
        match asset {
            Some(asset) => {
                self.figure_counter += 1;
                out.push_str("\\begin{figure}[H]\n");
                out.push_str("  \\centering\n");
                out.push_str(&format!(
                    "  \\includegraphics[width=0.8\\textwidth]{{{}}}\n",
                    asset.suggested_filename()
                ));
                out.push_str(&format!("  \\caption{{Figure {}}}\n", self.figure_counter));
                out.push_str(&format!(
                    "  \\label{{fig:p{}-{}}}\n",
                    asset.page,
                    &asset.fingerprint[..8]
                ));
                out.push_str("\\end{figure}\n\n");
                stats.figures += 1;
            }
            None => {
                out.push_str("% figure omitted: image data could not be decoded\n\n");
            }
        }
    }

    /// Close whatever environment is open, returning to `Idle`.
    fn close_state(
        &mut self,
        out: &mut String,
        state: EmitState,
        stats: &mut ConversionStats,
    ) -> EmitState {
        match state {
            EmitState::Idle => {}
            EmitState::MathGroup(lines) => {
                out.push_str("\\[\n");
                out.push_str(&lines.join(" \\\\\n"));
                out.push_str("\n\\]\n\n");
                stats.math_groups += 1;
            }
            EmitState::List(mut stack) => {
                while let Some(kind) = stack.pop() {
                    close_list(out, kind);
                }
                out.push('\n');
            }
        }
        EmitState::Idle
    }
}

fn heading_command(level: u8) -> &'static str {
    match level {
        1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        4 => "paragraph",
        _ => "subparagraph",
    }
}

fn list_env(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Unordered => "itemize",
        ListKind::Ordered => "enumerate",
    }
}

fn open_list(out: &mut String, kind: ListKind, depth: usize) {
    indent_for(out, depth);
    out.push_str(&format!("\\begin{{{}}}\n", list_env(kind)));
}

fn close_list(out: &mut String, kind: ListKind) {
    out.push_str(&format!("\\end{{{}}}\n", list_env(kind)));
}

fn indent_for(out: &mut String, depth: usize) {
    for _ in 0..depth.saturating_sub(1) {
        out.push_str("  ");
    }
}
