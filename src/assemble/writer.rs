// XML context writer
//
// Arbitrary text (files, web pages, artifacts, mission) always goes into a
// CDATA block. A literal `]]>` inside such text would end the block early, so
// it is split across two adjacent CDATA sections. Characters XML 1.0 cannot
// carry at all (most C0 controls, U+FFFE, U+FFFF) become U+FFFD.

use std::borrow::Cow;
use std::io::{self, Write};

use quick_xml::escape::escape;

use super::Mode;

pub const ROOT_TAG: &str = "grace_context";

const INDENT: &str = "  ";

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Replace every character XML 1.0 forbids with U+FFFD.
pub fn sanitize_xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

/// Neutralize every `]]>` so the text can sit inside `<![CDATA[ ... ]]>`.
pub fn escape_cdata(text: &str) -> String {
    sanitize_xml_chars(text).replace("]]>", "]]]]><![CDATA[>")
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    escape(&*sanitize_xml_chars(value)).into_owned()
}

pub struct ContextWriter<W: Write> {
    out: W,
}

impl<W: Write> ContextWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn open_root(&mut self, mode: Mode) -> io::Result<()> {
        writeln!(self.out, "<{} mode=\"{}\">", ROOT_TAG, mode)
    }

    /// Write trusted text as-is (instruction templates).
    pub fn raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub fn open(&mut self, depth: usize, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        writeln!(
            self.out,
            "\n{}<{}{}>",
            INDENT.repeat(depth),
            tag,
            format_attrs(attrs)
        )
    }

    pub fn close(&mut self, depth: usize, tag: &str) -> io::Result<()> {
        writeln!(self.out, "{}</{}>", INDENT.repeat(depth), tag)
    }

    /// `<tag attrs><![CDATA[\ncontent\n]]></tag>` with `content` escaped.
    pub fn cdata_block(
        &mut self,
        depth: usize,
        tag: &str,
        attrs: &[(&str, &str)],
        content: &str,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "{}<{}{}><![CDATA[\n{}\n]]></{}>",
            INDENT.repeat(depth),
            tag,
            format_attrs(attrs),
            escape_cdata(content),
            tag
        )
    }

    /// Close the root element, flush, and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        writeln!(self.out, "</{}>", ROOT_TAG)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

fn format_attrs(attrs: &[(&str, &str)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, escape_attr(value)))
        .collect()
}
