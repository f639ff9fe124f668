//! Document model used by the section generators.
//!
//! A [`Document`] is a tree of [`Part`] tokens. Generators append text and
//! layout tokens without tracking indentation or blank lines themselves; the
//! tree is flattened depth-first and rendered in one left-to-right pass.
//!
//! Layout rules:
//!
//! - [`Part::Text`] receives the current indentation only when it starts a
//!   line; otherwise it is appended to the line in progress. Empty text emits
//!   nothing.
//! - [`Part::NewLine`] ends the current line, or emits a blank line when the
//!   cursor is already at a line boundary. Inside [`Part::InlineMode`] it emits
//!   nothing until the matching [`Part::RestoreLineMode`].
//! - [`Part::Gap`] requests at least `n` blank lines before the next text.
//!   Adjacent gaps collapse to the largest request and blank lines already
//!   emitted count towards it. Gaps at the start or end of the document emit
//!   nothing.
//! - [`Part::DecIndent`] in the middle of a line ends that line first.
//!
//! A rendered non-empty document ends with exactly one newline.

use crate::error::{GeneratorError, GeneratorResult};

/// A single rendering token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Literal text. Never contains a newline when built through [`Document`].
    Text(String),
    /// Increase the indentation by one level.
    IncIndent,
    /// Decrease the indentation by one level.
    DecIndent,
    /// Suppress line breaks until the matching [`Part::RestoreLineMode`].
    InlineMode,
    /// Restore the line mode that was active before the last [`Part::InlineMode`].
    RestoreLineMode,
    /// End the current line.
    NewLine,
    /// Require at least this many blank lines before the next text.
    Gap(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Part(Part),
    Nested(Document),
}

/// A tree of rendering tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a raw token.
    pub fn push(&mut self, part: Part) -> &mut Self {
        self.nodes.push(Node::Part(part));
        self
    }

    /// Appends text, splitting embedded newlines into [`Part::NewLine`] tokens.
    pub fn text(&mut self, text: impl AsRef<str>) -> &mut Self {
        let mut lines = text.as_ref().split('\n');
        if let Some(first) = lines.next() {
            self.push_text(first);
        }
        for line in lines {
            self.push(Part::NewLine);
            self.push_text(line);
        }
        self
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.nodes.push(Node::Part(Part::Text(text.to_string())));
        }
    }

    /// Appends text followed by a line break.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.text(text).new_line()
    }

    /// Appends each item as its own line.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line);
        }
        self
    }

    /// Appends a line break.
    pub fn new_line(&mut self) -> &mut Self {
        self.push(Part::NewLine)
    }

    /// Indents everything that follows by one level.
    pub fn indent(&mut self) -> &mut Self {
        self.push(Part::IncIndent)
    }

    /// Removes one level of indentation.
    pub fn dedent(&mut self) -> &mut Self {
        self.push(Part::DecIndent)
    }

    /// Requests at least `n` blank lines before the next text.
    pub fn gap(&mut self, n: usize) -> &mut Self {
        self.push(Part::Gap(n))
    }

    /// Suppresses line breaks until [`Document::restore_line_mode`].
    pub fn inline(&mut self) -> &mut Self {
        self.push(Part::InlineMode)
    }

    /// Ends the innermost inline section.
    pub fn restore_line_mode(&mut self) -> &mut Self {
        self.push(Part::RestoreLineMode)
    }

    /// Nests another document at this position.
    pub fn append(&mut self, other: Document) -> &mut Self {
        if !other.is_empty() {
            self.nodes.push(Node::Nested(other));
        }
        self
    }

    /// Appends `header` as a line followed by `body` one level deeper.
    pub fn block(&mut self, header: impl AsRef<str>, body: Document) -> &mut Self {
        self.line(header).indent().append(body).dedent()
    }

    /// Iterates over the flattened token stream.
    pub fn parts(&self) -> Parts<'_> {
        Parts {
            stack: vec![self.nodes.iter()],
        }
    }

    /// Renders the document using `indent` as one indentation level.
    pub fn render(&self, indent: &str) -> GeneratorResult<String> {
        let mut state = RenderState::new(indent);
        for part in self.parts() {
            state.apply(part)?;
        }
        Ok(state.finish())
    }
}

impl From<Part> for Document {
    fn from(part: Part) -> Self {
        Self {
            nodes: vec![Node::Part(part)],
        }
    }
}

impl Extend<Part> for Document {
    fn extend<I: IntoIterator<Item = Part>>(&mut self, iter: I) {
        self.nodes.extend(iter.into_iter().map(Node::Part));
    }
}

/// Depth-first iterator over the tokens of a [`Document`].
#[derive(Debug)]
pub struct Parts<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Node::Part(part)) => return Some(part),
                Some(Node::Nested(doc)) => self.stack.push(doc.nodes.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

const LINE_BREAK: &str = "\n";
const INLINE: &str = "";

/// Renderer state threaded through a single pass.
#[derive(Debug)]
struct RenderState<'a> {
    indent_unit: &'a str,
    depth: usize,
    line_modes: Vec<&'static str>,
    at_line_start: bool,
    blank_lines: usize,
    pending_gap: usize,
    started: bool,
    out: String,
}

impl<'a> RenderState<'a> {
    fn new(indent_unit: &'a str) -> Self {
        Self {
            indent_unit,
            depth: 0,
            line_modes: vec![LINE_BREAK],
            at_line_start: true,
            blank_lines: 0,
            pending_gap: 0,
            started: false,
            out: String::new(),
        }
    }

    fn apply(&mut self, part: &Part) -> GeneratorResult<()> {
        match part {
            Part::Text(text) => self.write_text(text),
            Part::NewLine => self.write_line_break(),
            Part::IncIndent => self.depth += 1,
            Part::DecIndent => {
                if self.depth == 0 {
                    return Err(GeneratorError::render("dedent below column zero"));
                }
                self.end_line();
                self.depth -= 1;
            }
            Part::InlineMode => self.line_modes.push(INLINE),
            Part::RestoreLineMode => {
                if self.line_modes.len() == 1 {
                    return Err(GeneratorError::render(
                        "line mode restored without a matching inline mode",
                    ));
                }
                self.line_modes.pop();
            }
            Part::Gap(n) => {
                self.end_line();
                self.pending_gap = self.pending_gap.max(*n);
            }
        }
        Ok(())
    }

    fn write_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            if self.started && self.pending_gap > self.blank_lines {
                for _ in self.blank_lines..self.pending_gap {
                    self.out.push('\n');
                }
            }
            self.pending_gap = 0;
            for _ in 0..self.depth {
                self.out.push_str(self.indent_unit);
            }
            self.at_line_start = false;
            self.blank_lines = 0;
        }
        self.out.push_str(text);
        self.started = true;
    }

    fn write_line_break(&mut self) {
        let separator = self.line_modes.last().copied().unwrap_or(LINE_BREAK);
        if separator.is_empty() {
            return;
        }
        if !self.at_line_start {
            self.out.push_str(separator);
            self.at_line_start = true;
            self.blank_lines = 0;
        } else if self.started {
            self.out.push_str(separator);
            self.blank_lines += 1;
        }
    }

    /// Hard line break regardless of line mode; used before dedents and gaps.
    fn end_line(&mut self) {
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
            self.blank_lines = 0;
        }
    }

    fn finish(mut self) -> String {
        self.end_line();
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(doc: &Document) -> String {
        doc.render("    ").unwrap()
    }

    #[test]
    fn test_block_indentation() {
        let mut body = Document::new();
        body.line("x: int").line("y: int");
        let mut doc = Document::new();
        doc.block("class Point:", body).line("done");
        assert_eq!(render(&doc), "class Point:\n    x: int\n    y: int\ndone\n");
    }

    #[test]
    fn test_inline_text_is_not_reindented() {
        let mut doc = Document::new();
        doc.indent().text("a").text("b").new_line().text("c").new_line();
        assert_eq!(render(&doc), "    ab\n    c\n");
    }

    #[test]
    fn test_adjacent_gaps_collapse() {
        let mut single = Document::new();
        single.line("a").gap(1).line("b");
        let mut double = Document::new();
        double.line("a").gap(1).gap(1).line("b");
        assert_eq!(render(&single), "a\n\nb\n");
        assert_eq!(render(&single), render(&double));

        let mut strongest = Document::new();
        strongest.line("a").gap(1).gap(2).gap(1).line("b");
        assert_eq!(render(&strongest), "a\n\n\nb\n");
    }

    #[test]
    fn test_gap_counts_existing_blank_lines() {
        let mut doc = Document::new();
        doc.line("a").new_line().gap(1).line("b");
        assert_eq!(render(&doc), "a\n\nb\n");
    }

    #[test]
    fn test_gap_at_edges_is_dropped() {
        let mut doc = Document::new();
        doc.gap(2).line("a").gap(2);
        assert_eq!(render(&doc), "a\n");
    }

    #[test]
    fn test_dedent_mid_line_breaks_once() {
        let mut doc = Document::new();
        doc.indent().text("return x").dedent().line("y");
        assert_eq!(render(&doc), "    return x\ny\n");
    }

    #[test]
    fn test_inline_mode_suppresses_newlines() {
        let mut doc = Document::new();
        doc.text("f(")
            .inline()
            .line("a,")
            .line(" b")
            .restore_line_mode()
            .line(")");
        assert_eq!(render(&doc), "f(a, b)\n");
    }

    #[test]
    fn test_empty_text_emits_no_indent() {
        let mut doc = Document::new();
        doc.indent().text("").new_line().line("x");
        assert_eq!(render(&doc), "    x\n");
    }

    #[test]
    fn test_multiline_text_is_split() {
        let mut doc = Document::new();
        doc.indent().line("\"\"\"\nDoc\n\"\"\"");
        assert_eq!(render(&doc), "    \"\"\"\n    Doc\n    \"\"\"\n");
    }

    #[test]
    fn test_nested_documents_flatten_in_order() {
        let mut inner = Document::new();
        inner.line("b");
        let mut middle = Document::new();
        middle.line("a").append(inner).line("c");
        let mut doc = Document::new();
        doc.append(middle).line("d");
        let texts: Vec<_> = doc
            .parts()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_invariant_violations() {
        let doc = Document::from(Part::DecIndent);
        assert!(matches!(doc.render("  "), Err(GeneratorError::Render(_))));

        let doc = Document::from(Part::RestoreLineMode);
        assert!(matches!(doc.render("  "), Err(GeneratorError::Render(_))));
    }

    #[test]
    fn test_trailing_newlines_normalized() {
        let mut doc = Document::new();
        doc.line("a").new_line().new_line();
        assert_eq!(render(&doc), "a\n");
        assert_eq!(render(&Document::new()), "");
    }

    fn arb_part() -> impl Strategy<Value = Part> {
        prop_oneof![
            "[a-z]{0,4}".prop_map(Part::Text),
            Just(Part::NewLine),
            Just(Part::IncIndent),
            (0usize..3).prop_map(Part::Gap),
        ]
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic(parts in prop::collection::vec(arb_part(), 0..40)) {
            let mut doc = Document::new();
            doc.extend(parts);
            let first = doc.render("  ").unwrap();
            let second = doc.render("  ").unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.is_empty() || (first.ends_with('\n') && !first.ends_with("\n\n")));
        }
    }
}
