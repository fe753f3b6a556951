use crate::extensions::social_embed;
use crate::html::{Element, HtmlNode};

pub const FALLBACK_ATTR: &str = "data-embed-fallback";
pub const FALLBACK_CLASS: &str = "social-embed-fallback my-6 rounded border p-4";
pub const FALLBACK_LINK_CLASS: &str = "underline underline-offset-2";
pub const FALLBACK_LABEL: &str = "View post on X";

/// Static card shown when a widget cannot be mounted. Its markup depends on
/// nothing but the post id and the link base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCard {
    pub external_id: String,
    pub url: String,
}

impl FallbackCard {
    pub fn new(external_id: &str, canonical_base: &str) -> Self {
        Self {
            external_id: external_id.to_string(),
            url: social_embed::canonical_url_with(canonical_base, external_id),
        }
    }

    pub fn to_element(&self) -> Element {
        Element::new("div")
            .with_attr(FALLBACK_ATTR, "")
            .with_attr("class", FALLBACK_CLASS)
            .with_child(
                Element::new("a")
                    .with_attr("href", self.url.as_str())
                    .with_attr("target", "_blank")
                    .with_attr("rel", "noopener noreferrer")
                    .with_attr("class", FALLBACK_LINK_CLASS)
                    .with_child(HtmlNode::text(FALLBACK_LABEL)),
            )
    }

    pub fn to_html(&self) -> String {
        self.to_element().outer_html()
    }
}
