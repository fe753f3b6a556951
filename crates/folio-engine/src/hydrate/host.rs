use super::{EmbedHost, FallbackCard, Placeholder, WidgetMarkup};
use crate::extensions::social_embed;
use crate::html::{Element, HtmlNode, parse_fragment, write_nodes};
use std::fmt;

/// Attribute recording which state a placeholder is showing.
pub const STATE_ATTR: &str = "data-embed-state";
const LOADING_CLASS: &str = "social-embed-loading my-6 animate-pulse rounded p-4";
const LOADING_LABEL: &str = "Loading post…";

/// Child indices from the top of an [`HtmlHost`] down to an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementPath(pub Vec<usize>);

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// [`EmbedHost`] over an owned HTML tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlHost {
    nodes: Vec<HtmlNode>,
    scripts: Vec<String>,
}

impl HtmlHost {
    pub fn new(html: &str) -> Self {
        Self::from_nodes(parse_fragment(html))
    }

    pub fn from_nodes(nodes: Vec<HtmlNode>) -> Self {
        Self {
            nodes,
            scripts: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[HtmlNode] {
        &self.nodes
    }

    /// Sources of the script elements injected so far.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn to_html(&self) -> String {
        write_nodes(&self.nodes)
    }

    pub fn element(&self, path: &ElementPath) -> Option<&Element> {
        let (first, rest) = path.0.split_first()?;
        let mut element = self.nodes.get(*first)?.as_element()?;
        for index in rest {
            element = element.children.get(*index)?.as_element()?;
        }
        Some(element)
    }

    fn element_mut(&mut self, path: &ElementPath) -> Option<&mut Element> {
        let (first, rest) = path.0.split_first()?;
        let mut element = self.nodes.get_mut(*first)?.as_element_mut()?;
        for index in rest {
            element = element.children.get_mut(*index)?.as_element_mut()?;
        }
        Some(element)
    }

    /// Remove an element from the page, leaving the paths of every other
    /// element unchanged.
    pub fn detach(&mut self, path: &ElementPath) {
        let Some((last, parent)) = path.0.split_last() else {
            return;
        };
        let siblings = if parent.is_empty() {
            Some(&mut self.nodes)
        } else {
            self.element_mut(&ElementPath(parent.to_vec()))
                .map(|element| &mut element.children)
        };
        if let Some(slot) = siblings.and_then(|siblings| siblings.get_mut(*last)) {
            *slot = HtmlNode::Text(String::new());
        }
    }

    fn show(&mut self, path: &ElementPath, state: &str, content: HtmlNode) {
        if let Some(element) = self.element_mut(path) {
            element.set_attr(STATE_ATTR, state);
            element.children = vec![content];
        }
    }
}

fn collect_placeholders(
    nodes: &[HtmlNode],
    base: &mut Vec<usize>,
    out: &mut Vec<Placeholder<ElementPath>>,
) {
    for (index, node) in nodes.iter().enumerate() {
        let HtmlNode::Element(element) = node else {
            continue;
        };
        base.push(index);
        if social_embed::is_marked(element) {
            out.push(Placeholder {
                key: ElementPath(base.clone()),
                external_id: social_embed::placeholder_id(element).map(str::to_string),
                flagged: element.attr(social_embed::PROCESSED_ATTR) == Some("true"),
            });
        } else {
            collect_placeholders(&element.children, base, out);
        }
        base.pop();
    }
}

impl EmbedHost for HtmlHost {
    type Key = ElementPath;

    fn placeholders(&self) -> Vec<Placeholder<ElementPath>> {
        let mut out = Vec::new();
        collect_placeholders(&self.nodes, &mut Vec::new(), &mut out);
        out
    }

    fn flag_processed(&mut self, key: &ElementPath) {
        if let Some(element) = self.element_mut(key) {
            element.set_attr(social_embed::PROCESSED_ATTR, "true");
        }
    }

    fn is_attached(&self, key: &ElementPath) -> bool {
        self.element(key).is_some_and(social_embed::is_marked)
    }

    fn show_loading(&mut self, key: &ElementPath) {
        let indicator = Element::new("div")
            .with_attr("class", LOADING_CLASS)
            .with_attr("role", "status")
            .with_attr("aria-live", "polite")
            .with_child(HtmlNode::text(LOADING_LABEL));
        self.show(key, "loading", indicator.into());
    }

    fn show_invalid(&mut self, key: &ElementPath) {
        self.show(key, "invalid", social_embed::render_invalid().into());
    }

    fn show_widget(&mut self, key: &ElementPath, widget: &WidgetMarkup) {
        self.show(key, "ready", HtmlNode::Raw(widget.0.clone()));
    }

    fn show_fallback(&mut self, key: &ElementPath, card: &FallbackCard) {
        self.show(key, "fallback", card.to_element().into());
    }

    fn inject_script(&mut self, src: &str) {
        if self.scripts.iter().any(|existing| existing == src) {
            return;
        }
        self.scripts.push(src.to_string());
        self.nodes.push(
            Element::new("script")
                .with_attr("async", "")
                .with_attr("src", src)
                .with_attr("charset", "utf-8")
                .into(),
        );
    }
}

/// Render every placeholder in `html` as its fallback card (or the invalid
/// marker when it has no id), for pages served without scripts.
pub fn hydrate_static(html: &str) -> String {
    hydrate_static_with(html, social_embed::CANONICAL_BASE)
}

/// As [`hydrate_static`], linking fallback cards under `canonical_base`.
/// No widget script is injected.
pub fn hydrate_static_with(html: &str, canonical_base: &str) -> String {
    let mut host = HtmlHost::new(html);
    for placeholder in host.placeholders() {
        if placeholder.flagged {
            continue;
        }
        host.flag_processed(&placeholder.key);
        match placeholder.external_id {
            Some(id) => {
                let card = FallbackCard::new(&id, canonical_base);
                host.show_fallback(&placeholder.key, &card);
            }
            None => host.show_invalid(&placeholder.key),
        }
    }
    host.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_placeholders_in_document_order() {
        let host = HtmlHost::new(
            r#"<div data-social-embed="" data-embed-id="a"></div><ul><li><div data-embed-kind="social" data-embed-id="b"></div></li></ul><div data-tweet-id="c"></div>"#,
        );
        let ids: Vec<Option<String>> = host
            .placeholders()
            .into_iter()
            .map(|placeholder| placeholder.external_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("c".to_string())
            ]
        );
    }

    #[test]
    fn test_flag_is_read_back() {
        let mut host = HtmlHost::new(r#"<div data-social-embed="" data-embed-id="a"></div>"#);
        let key = host.placeholders()[0].key.clone();
        assert!(!host.placeholders()[0].flagged);
        host.flag_processed(&key);
        assert!(host.placeholders()[0].flagged);
        assert!(host.to_html().contains(r#"data-embed-processed="true""#));
    }

    #[test]
    fn test_inject_script_once() {
        let mut host = HtmlHost::new("<p>x</p>");
        host.inject_script("https://platform.example/w.js");
        host.inject_script("https://platform.example/w.js");
        assert_eq!(host.scripts().len(), 1);
        assert!(host.to_html().ends_with(
            r#"<script async="" src="https://platform.example/w.js" charset="utf-8"></script>"#
        ));
    }

    #[test]
    fn test_detach_keeps_other_paths() {
        let mut host = HtmlHost::new(
            r#"<div data-social-embed="" data-embed-id="a"></div><div data-social-embed="" data-embed-id="b"></div>"#,
        );
        let keys: Vec<ElementPath> = host.placeholders().into_iter().map(|p| p.key).collect();
        host.detach(&keys[0]);
        assert!(!host.is_attached(&keys[0]));
        assert!(host.is_attached(&keys[1]));
    }

    #[test]
    fn test_hydrate_static() {
        let html = hydrate_static(
            r#"<div data-social-embed="" data-embed-kind="social" data-embed-id="5"></div><div data-social-embed="" data-embed-kind="social"></div>"#,
        );
        assert!(html.contains(r#"href="https://x.com/i/status/5""#));
        assert!(html.contains(r#"data-embed-state="invalid""#));
        assert_eq!(html.matches(r#"data-embed-processed="true""#).count(), 2);
    }

    #[test]
    fn test_hydrate_static_with_base_injects_no_script() {
        let html = hydrate_static_with(
            r#"<div data-social-embed="" data-embed-id="5"></div>"#,
            "https://posts.example/status",
        );
        assert!(html.contains(r#"href="https://posts.example/status/5""#));
        assert!(!html.contains("<script"));
    }
}
