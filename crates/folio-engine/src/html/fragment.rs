use super::{Element, HtmlNode};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse an HTML fragment into owned nodes.
///
/// The input is run through the full html5ever tree builder, so malformed
/// markup is repaired the same way a browser would repair it. Elements the
/// tree builder moves into `<head>` (a leading `<style>` or `<meta>`) are kept
/// and come first, which matches their position in the source. Template
/// contents become the template element's children.
pub fn parse_fragment(html: &str) -> Vec<HtmlNode> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());

    let mut out = Vec::new();
    for child in dom.document.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data
            && &*name.local == "html"
        {
            for section in child.children.borrow().iter() {
                if let NodeData::Element { name, .. } = &section.data
                    && matches!(&*name.local, "head" | "body")
                {
                    out.extend(section.children.borrow().iter().filter_map(convert));
                }
            }
        }
    }
    out
}

fn convert(handle: &Handle) -> Option<HtmlNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(HtmlNode::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(HtmlNode::Comment(contents.to_string())),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let name = match &attr.name.prefix {
                        Some(prefix) => format!("{prefix}:{}", attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    (name, attr.value.to_string())
                })
                .collect();
            let mut children: Vec<HtmlNode> =
                handle.children.borrow().iter().filter_map(convert).collect();
            if let Some(contents) = template_contents.borrow().as_ref() {
                children.extend(contents.children.borrow().iter().filter_map(convert));
            }
            Some(HtmlNode::Element(Element {
                tag: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
            None
        }
    }
}
