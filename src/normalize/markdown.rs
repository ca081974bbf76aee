// Markdown rendering over a scraper DOM

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

use super::STRIPPED_TAGS;

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

impl ListKind {
    /// Columns taken by the marker, which is also the continuation indent
    fn width(self) -> usize {
        match self {
            ListKind::Unordered => 2,
            ListKind::Ordered(_) => 3,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct MarkdownWriter {
    out: String,
    lists: Vec<ListKind>,
    pre_depth: usize,
    /// Output length right after the last list marker; equal to `out.len()`
    /// while nothing has been written into the item yet.
    item_start: Option<usize>,
}

impl MarkdownWriter {
    pub(super) fn render_children(&mut self, el: ElementRef<'_>) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.render_element(child_el);
                    }
                }
                _ => {}
            }
        }
    }

    pub(super) fn finish(self) -> String {
        let trimmed: Vec<&str> = self.out.lines().map(str::trim_end).collect();
        let joined = trimmed.join("\n");
        BLANK_RUNS.replace_all(&joined, "\n\n").trim().to_string()
    }

    fn render_element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        if STRIPPED_TAGS.contains(&name) {
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let text = self.render_inline(el);
                self.block_break();
                if !text.is_empty() {
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                    self.out.push_str(&text);
                }
                self.block_break();
            }
            "p" | "div" | "section" | "article" | "main" | "header" | "aside" | "figure"
            | "dl" | "dt" | "dd" => {
                self.block_break();
                self.render_children(el);
                self.block_break();
            }
            "br" => {
                self.trim_trailing_spaces();
                self.out.push('\n');
            }
            "hr" => {
                self.block_break();
                self.out.push_str("---");
                self.block_break();
            }
            "strong" | "b" => self.wrap_inline(el, "**"),
            "em" | "i" => self.wrap_inline(el, "*"),
            "code" if self.pre_depth == 0 => self.wrap_inline(el, "`"),
            "pre" => {
                self.block_break();
                self.out.push_str("```\n");
                self.pre_depth += 1;
                self.render_children(el);
                self.pre_depth -= 1;
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("```");
                self.block_break();
            }
            "a" => {
                let text = self.render_inline(el);
                match el.value().attr("href") {
                    Some(href) if !href.is_empty() && !text.is_empty() => {
                        self.out.push_str(&format!("[{}]({})", text, href));
                    }
                    _ => self.out.push_str(&text),
                }
            }
            "img" => {
                if let Some(src) = el.value().attr("src") {
                    let alt = el.value().attr("alt").unwrap_or("");
                    self.out.push_str(&format!("![{}]({})", alt, src));
                }
            }
            "ul" | "ol" => {
                if self.lists.is_empty() {
                    self.block_break();
                } else {
                    self.line_break();
                }
                self.lists.push(if name == "ol" {
                    ListKind::Ordered(0)
                } else {
                    ListKind::Unordered
                });
                self.render_children(el);
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_break();
                } else {
                    self.line_break();
                }
            }
            "li" => {
                self.line_break();
                let outer = self.lists.len().saturating_sub(1);
                let indent = self.list_indent(outer);
                self.out.push_str(&" ".repeat(indent));
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        *n += 1;
                        format!("{}. ", n)
                    }
                    _ => "- ".to_string(),
                };
                self.out.push_str(&marker);
                self.item_start = Some(self.out.len());
                self.render_children(el);
                self.item_start = None;
                self.line_break();
            }
            "blockquote" => {
                let mut inner = MarkdownWriter::default();
                inner.render_children(el);
                let quoted = inner.finish();
                self.block_break();
                for line in quoted.lines() {
                    self.out.push_str("> ");
                    self.out.push_str(line);
                    self.out.push('\n');
                }
                self.block_break();
            }
            "table" => self.render_table(el),
            _ => self.render_children(el),
        }
    }

    fn render_table(&mut self, table: ElementRef<'_>) {
        self.block_break();
        let rows = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr");

        for (i, row) in rows.enumerate() {
            let cells: Vec<String> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| matches!(el.value().name(), "td" | "th"))
                .map(|cell| self.render_inline(cell).replace('|', "\\|"))
                .collect();
            if cells.is_empty() {
                continue;
            }
            self.out.push_str(&format!("| {} |\n", cells.join(" | ")));
            if i == 0 {
                let sep = vec!["---"; cells.len()].join(" | ");
                self.out.push_str(&format!("| {} |\n", sep));
            }
        }
        self.block_break();
    }

    /// Render an element's children on a single line
    fn render_inline(&self, el: ElementRef<'_>) -> String {
        let mut inner = MarkdownWriter {
            pre_depth: self.pre_depth,
            ..MarkdownWriter::default()
        };
        inner.render_children(el);
        inner
            .out
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn wrap_inline(&mut self, el: ElementRef<'_>, marker: &str) {
        let text = self.render_inline(el);
        if !text.is_empty() {
            self.out.push_str(marker);
            self.out.push_str(&text);
            self.out.push_str(marker);
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.out.push_str(text);
            return;
        }

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let at_line_start = self.out.is_empty() || self.out.ends_with('\n');
        let ends_with_space = self.out.ends_with(' ');

        if collapsed.is_empty() {
            if !text.is_empty() && !at_line_start && !ends_with_space {
                self.out.push(' ');
            }
            return;
        }

        if text.starts_with(char::is_whitespace) && !at_line_start && !ends_with_space {
            self.out.push(' ');
        }
        self.out.push_str(&collapsed);
        if text.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.out.trim_end_matches(' ').len();
        self.out.truncate(len);
    }

    fn at_item_start(&self) -> bool {
        self.item_start == Some(self.out.len())
    }

    /// Indent of the content of items nested `depth` lists deep
    fn list_indent(&self, depth: usize) -> usize {
        self.lists.iter().take(depth).map(|kind| kind.width()).sum()
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        // The first block of a list item stays on the marker line
        if self.at_item_start() {
            return;
        }
        self.trim_trailing_spaces();
        if self.out.is_empty() {
            return;
        }
        if !self.lists.is_empty() {
            // Later blocks continue the item on an indented line
            if !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            let indent = self.list_indent(self.lists.len());
            self.out.push_str(&" ".repeat(indent));
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}
