//! HTML tag rendering and per-kind output accumulation.
//!
//! Link and script tags are keyed by their URI without query string, so a
//! bundle re-rendered with a new cache-busting suffix replaces its old tag
//! instead of adding a second one. Inline snippets are plain appends.

use rustc_hash::FxHashMap;

use crate::utils::html::escape_attr;
use crate::utils::path::strip_query;

use super::OutputKind;

/// A single tag attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// Bare token, e.g. `defer`.
    Flag(String),
    /// `name="value"`, value escaped on render.
    Pair(String, String),
}

/// Ordered tag attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.0.push(Attribute::Flag(name.into()));
        self
    }

    pub fn pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(Attribute::Pair(name.into(), value.into()));
        self
    }

    /// Render as ` a b="c"`, each token preceded by a space.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for attr in &self.0 {
            out.push(' ');
            match attr {
                Attribute::Flag(name) => out.push_str(name),
                Attribute::Pair(name, value) => {
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
        }
        out
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Fragments keyed by normalized URI, iterated in first-insertion order.
#[derive(Debug, Default)]
struct KeyedFragments {
    fragments: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl KeyedFragments {
    /// Insert or replace in place; a replaced key keeps its original slot.
    fn upsert(&mut self, key: &str, fragment: String) {
        match self.index.get(key) {
            Some(&slot) => self.fragments[slot] = fragment,
            None => {
                self.index.insert(key.to_owned(), self.fragments.len());
                self.fragments.push(fragment);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputBuilder {
    css: KeyedFragments,
    js: KeyedFragments,
    inline_css: Vec<String>,
    inline_js: Vec<String>,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_link(&mut self, uri: &str, attrs: &Attributes) {
        let tag = format!(
            r#"<link rel="stylesheet" href="{}" type="text/css"{}/>"#,
            escape_attr(uri),
            attrs.render()
        );
        self.css.upsert(strip_query(uri), tag);
    }

    pub fn render_script(&mut self, uri: &str, attrs: &Attributes) {
        let tag = format!(
            r#"<script src="{}"{}></script>"#,
            escape_attr(uri),
            attrs.render()
        );
        self.js.upsert(strip_query(uri), tag);
    }

    pub fn render_inline_style(&mut self, content: &str) {
        self.inline_css.push(format!("<style>{content}</style>"));
    }

    pub fn render_inline_script(&mut self, content: &str) {
        self.inline_js.push(format!("<script>{content}</script>"));
    }

    /// Stored fragments of one kind, in order.
    pub fn fragments(&self, kind: OutputKind) -> &[String] {
        match kind {
            OutputKind::Css => &self.css.fragments,
            OutputKind::Js => &self.js.fragments,
            OutputKind::InlineCss => &self.inline_css,
            OutputKind::InlineJs => &self.inline_js,
        }
    }

    /// All fragments of one kind joined by newlines.
    pub fn output(&self, kind: OutputKind) -> String {
        self.fragments(kind).join("\n")
    }

    /// Like [`output`](Self::output), by template-facing name; unknown → `""`.
    pub fn output_by_name(&self, name: &str) -> String {
        OutputKind::from_name(name)
            .map(|kind| self.output(kind))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_render() {
        let attrs = Attributes::new()
            .flag("defer")
            .pair("data-x", r#"a"b&c"#)
            .pair("crossorigin", "anonymous");
        assert_eq!(
            attrs.render(),
            r#" defer data-x="a&quot;b&amp;c" crossorigin="anonymous""#
        );
        assert_eq!(Attributes::new().render(), "");
    }

    #[test]
    fn test_render_link_overwrites_by_normalized_uri() {
        let mut out = OutputBuilder::new();
        out.render_link("a.css?x=1", &Attributes::new());
        out.render_link("a.css?y=2", &Attributes::new().pair("media", "print"));

        assert_eq!(out.fragments(OutputKind::Css).len(), 1);
        assert_eq!(
            out.output(OutputKind::Css),
            r#"<link rel="stylesheet" href="a.css?y=2" type="text/css" media="print"/>"#
        );
    }

    #[test]
    fn test_overwrite_keeps_first_position() {
        let mut out = OutputBuilder::new();
        out.render_script("/a.js?1", &Attributes::new());
        out.render_script("/b.js", &Attributes::new());
        out.render_script("/a.js?2", &Attributes::new().flag("defer"));

        assert_eq!(
            out.output(OutputKind::Js),
            "<script src=\"/a.js?2\" defer></script>\n<script src=\"/b.js\"></script>"
        );
    }

    #[test]
    fn test_inline_appends() {
        let mut out = OutputBuilder::new();
        out.render_inline_script("console.log(1)");
        out.render_inline_script("console.log(1)");
        out.render_inline_style("body{margin:0}");

        assert_eq!(
            out.output(OutputKind::InlineJs),
            "<script>console.log(1)</script>\n<script>console.log(1)</script>"
        );
        assert_eq!(out.output_by_name("inlineCss"), "<style>body{margin:0}</style>");
    }

    #[test]
    fn test_output_unknown_or_empty() {
        let out = OutputBuilder::new();
        assert_eq!(out.output(OutputKind::Css), "");
        assert_eq!(out.output_by_name("images"), "");
    }

    #[test]
    fn test_uri_is_escaped() {
        let mut out = OutputBuilder::new();
        out.render_script("https://cdn.example.com/x.js?a=1&b=2", &Attributes::new());
        assert_eq!(
            out.output(OutputKind::Js),
            r#"<script src="https://cdn.example.com/x.js?a=1&amp;b=2"></script>"#
        );
    }
}
