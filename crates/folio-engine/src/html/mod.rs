//! Owned, lightweight HTML tree shared by the serializer, the parser and the
//! hydration host.
//!
//! The serializer builds [`HtmlNode`]s and writes them out with
//! [`write_nodes`]. The parser goes the other way through [`parse_fragment`],
//! which runs html5ever and copies its reference-counted DOM into this owned
//! form so the rest of the crate never touches `Rc<Node>` handles.

mod fragment;
pub mod style;

pub use fragment::parse_fragment;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(Element),
    Text(String),
    Comment(String),
    /// Pre-rendered markup written out verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<HtmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = HtmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, replacing an existing value in place so attribute
    /// order stays stable.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(HtmlNode::as_element)
    }

    /// First descendant element (depth first, excluding `self`) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        self.find(&|element: &Element| element.tag == tag)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &self.tag, &mut out);
        }
        out
    }
}

impl HtmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        HtmlNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// True for text nodes that hold nothing but HTML whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, HtmlNode::Text(text) if is_blank(text))
    }
}

impl From<Element> for HtmlNode {
    fn from(element: Element) -> Self {
        HtmlNode::Element(element)
    }
}

/// ASCII whitespace, the only whitespace HTML collapses. U+00A0 is content.
pub fn is_html_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

pub fn is_blank(text: &str) -> bool {
    text.chars().all(is_html_space)
}

/// Text content of a node list, with `Raw` markup reparsed so that its text
/// counts too.
pub fn text_content(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push_str(text),
            HtmlNode::Element(element) => collect_text(&element.children, out),
            HtmlNode::Raw(html) => collect_text(&parse_fragment(html), out),
            HtmlNode::Comment(_) => {}
        }
    }
}

pub fn write_nodes(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, "", &mut out);
    }
    out
}

fn write_node(node: &HtmlNode, parent_tag: &str, out: &mut String) {
    match node {
        HtmlNode::Element(element) => write_element(element, out),
        HtmlNode::Text(text) if RAW_TEXT_ELEMENTS.contains(&parent_tag) => out.push_str(text),
        HtmlNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        HtmlNode::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        HtmlNode::Raw(html) => out.push_str(html),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
    if is_void(&element.tag) {
        return;
    }
    for child in &element.children {
        write_node(child, &element.tag, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_escapes_text_and_attributes() {
        let element = Element::new("a")
            .with_attr("href", "/search?q=\"x\"&y=1")
            .with_child(HtmlNode::text("a < b & c"));
        assert_eq!(
            element.outer_html(),
            r#"<a href="/search?q=&quot;x&quot;&amp;y=1">a &lt; b &amp; c</a>"#
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let element = Element::new("img").with_attr("src", "/a.png");
        assert_eq!(element.outer_html(), r#"<img src="/a.png">"#);
    }

    #[test]
    fn test_script_text_is_not_escaped() {
        let element = Element::new("script").with_child(HtmlNode::text("if (a < b) {}"));
        assert_eq!(element.outer_html(), "<script>if (a < b) {}</script>");
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut element = Element::new("div")
            .with_attr("id", "x")
            .with_attr("class", "a");
        element.set_attr("id", "y");
        assert_eq!(
            element.attrs,
            vec![
                ("id".to_string(), "y".to_string()),
                ("class".to_string(), "a".to_string())
            ]
        );
    }

    #[test]
    fn test_find_is_depth_first() {
        let tree = Element::new("div")
            .with_child(Element::new("p").with_child(Element::new("iframe").with_attr("id", "a")))
            .with_child(Element::new("iframe").with_attr("id", "b"));
        assert_eq!(tree.find_tag("iframe").and_then(|f| f.attr("id")), Some("a"));
    }

    #[test]
    fn test_text_content_includes_raw_markup_text() {
        let nodes = vec![
            HtmlNode::text("one "),
            HtmlNode::Raw("<span>two</span>".to_string()),
            HtmlNode::Comment("hidden".to_string()),
        ];
        assert_eq!(text_content(&nodes), "one two");
    }
}
