//! HTML serialization of render trees.
//!
//! Components are written as tags named after the component, with props as
//! attributes sorted by name. Non-string props are JSON-encoded.

use crate::renderer::RenderNode;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Serializes a list of nodes to HTML.
pub fn to_html(nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

impl RenderNode {
    /// Serializes this node to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(self, &mut out);
        out
    }
}

fn write_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Text { value } => out.push_str(&encode_text(value)),
        RenderNode::Element {
            tag,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in attributes {
                write_attribute(out, key, value);
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            for child in children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        RenderNode::Component {
            name,
            props,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            let mut props: Vec<_> = props.iter().collect();
            props.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in props {
                match value {
                    Value::Null => {}
                    Value::String(s) => write_attribute(out, key, s),
                    other => write_attribute(out, key, &other.to_string()),
                }
            }
            out.push('>');
            for child in children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Props;
    use serde_json::json;

    #[test]
    fn writes_elements_and_escapes_text() {
        let node = RenderNode::element(
            "p",
            vec![("class".to_string(), "a\"b".to_string())],
            vec![RenderNode::text("1 < 2 & 3")],
        );
        assert_eq!(node.to_html(), r#"<p class="a&quot;b">1 &lt; 2 &amp; 3</p>"#);
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let nodes = vec![
            RenderNode::element("img", vec![("src".to_string(), "a.png".to_string())], Vec::new()),
            RenderNode::element("br", Vec::new(), Vec::new()),
        ];
        assert_eq!(to_html(&nodes), r#"<img src="a.png"><br>"#);
    }

    #[test]
    fn components_serialize_props() {
        let mut props = Props::new();
        props.insert("level".to_string(), json!(2));
        props.insert("name".to_string(), json!("core/heading"));
        props.insert("skip".to_string(), Value::Null);
        let node = RenderNode::component("Heading", props, vec![RenderNode::text("T")]);
        assert_eq!(
            node.to_html(),
            r#"<Heading level="2" name="core/heading">T</Heading>"#
        );
    }

    #[test]
    fn keeps_non_ascii_text() {
        let node = RenderNode::text("\u{e6}\u{b4}\u{bb}");
        assert_eq!(node.to_html(), "\u{e6}\u{b4}\u{bb}");
    }
}
