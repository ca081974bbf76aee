// Content normalizer - HTML to Markdown
//
// Pure function of its input: parse with scraper, drop elements that carry
// no reader-facing text, then render the remaining <body> as Markdown.

mod markdown;

use scraper::{ElementRef, Html};

use markdown::MarkdownWriter;

/// Elements removed before conversion, together with everything inside them.
pub const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "footer", "iframe", "noscript"];

/// Convert an HTML document (or fragment) into readable Markdown.
///
/// Only the `<body>` is rendered; when the parser produced none the whole
/// document is used instead.
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or(root);

    let mut writer = MarkdownWriter::default();
    writer.render_children(body);
    writer.finish()
}

/// Cheap sniff for bodies served without a useful content type.
pub fn looks_like_html(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(512)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_noise_elements() {
        let html = r#"<html><head><style>.x { color: red } STYLE_MARKER</style></head>
            <body>
              <nav>NAV_MARKER home | about</nav>
              <h1>Title</h1>
              <script>var SCRIPT_MARKER = 1;</script>
              <p>Body text.</p>
              <iframe src="ad.html">IFRAME_MARKER</iframe>
              <footer>FOOTER_MARKER copyright</footer>
            </body></html>"#;

        let md = html_to_markdown(html);
        for marker in [
            "STYLE_MARKER",
            "NAV_MARKER",
            "SCRIPT_MARKER",
            "IFRAME_MARKER",
            "FOOTER_MARKER",
        ] {
            assert!(!md.contains(marker), "{} leaked into: {}", marker, md);
        }
        assert!(md.contains("# Title"));
        assert!(md.contains("Body text."));
    }

    #[test]
    fn nested_noise_inside_content_is_removed() {
        let html = "<body><div><p>keep</p><div><script>SCRIPT_MARKER()</script></div></div></body>";
        let md = html_to_markdown(html);
        assert_eq!(md, "keep");
    }

    #[test]
    fn renders_headings_lists_and_emphasis() {
        let html = "<body>\
            <h2>Model</h2>\
            <p>The <strong>force</strong> is <em>proportional</em> to <code>m * a</code>.</p>\
            <ul><li>first</li><li>second</li></ul>\
            <ol><li>one</li><li>two</li></ol>\
            </body>";

        let md = html_to_markdown(html);
        assert!(md.contains("## Model"));
        assert!(md.contains("The **force** is *proportional* to `m * a`."));
        assert!(md.contains("- first\n- second"));
        assert!(md.contains("1. one\n2. two"));
    }

    #[test]
    fn list_items_wrapped_in_paragraphs_keep_their_markers() {
        let md = html_to_markdown("<body><ul><li><p>one</p></li><li><p>two</p></li></ul></body>");
        assert_eq!(md, "- one\n- two");

        let html = "<body><ol>\n  <li>\n    <p>one</p>\n    <p>more</p>\n  </li>\n  \
            <li><div>two</div></li>\n</ol><p>after</p></body>";
        assert_eq!(html_to_markdown(html), "1. one\n   more\n2. two\n\nafter");
    }

    #[test]
    fn nested_lists_are_indented_under_their_item() {
        let html = "<body><ul><li>a<ul><li>b</li></ul></li><li>c</li></ul></body>";
        assert_eq!(html_to_markdown(html), "- a\n  - b\n- c");
    }

    #[test]
    fn renders_links_and_preformatted_blocks() {
        let html = "<body><p>See <a href=\"https://example.com/paper\">the paper</a>.</p>\
            <pre>fn main() {\n    run();\n}</pre></body>";

        let md = html_to_markdown(html);
        assert!(md.contains("[the paper](https://example.com/paper)"));
        assert!(md.contains("```\nfn main() {\n    run();\n}\n```"));
    }

    #[test]
    fn renders_simple_tables() {
        let html = "<body><table>\
            <tr><th>Symbol</th><th>Meaning</th></tr>\
            <tr><td>g</td><td>gravity</td></tr>\
            </table></body>";

        let md = html_to_markdown(html);
        assert!(md.contains("| Symbol | Meaning |"));
        assert!(md.contains("| --- | --- |"));
        assert!(md.contains("| g | gravity |"));
    }

    #[test]
    fn fragment_without_body_is_still_converted() {
        let md = html_to_markdown("<p>just a fragment</p>");
        assert_eq!(md, "just a fragment");
    }

    #[test]
    fn collapses_whitespace_and_blank_runs() {
        let html = "<body><p>a   lot\n\n of    space</p><div></div><div></div><p>next</p></body>";
        let md = html_to_markdown(html);
        assert_eq!(md, "a lot of space\n\nnext");
    }

    #[test]
    fn output_is_deterministic() {
        let html = "<body><h3>x</h3><p>y</p></body>";
        assert_eq!(html_to_markdown(html), html_to_markdown(html));
    }

    #[test]
    fn sniffs_markup() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html("<html lang=\"en\">"));
        assert!(!looks_like_html("plain notes about < and >"));
    }
}
