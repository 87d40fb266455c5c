//! Render tree produced by the block renderer.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Component props keyed by prop name.
pub type Props = Map<String, Value>;

/// A node of the render tree handed to the host framework.
///
/// Plain markup is kept as elements and text; matched blocks become
/// component invocations carrying serializable props.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderNode {
    /// A plain HTML element.
    Element {
        /// Lowercase tag name.
        tag: String,
        /// Attributes in source order.
        #[serde(serialize_with = "serialize_attributes")]
        attributes: Vec<(String, String)>,
        /// Rendered children.
        children: Vec<RenderNode>,
    },

    /// A run of text.
    Text {
        /// Decoded text content.
        value: String,
    },

    /// A named component invocation.
    Component {
        /// Component name (e.g., "Heading", "Image").
        name: String,
        /// Component props.
        props: Props,
        /// Rendered children for the component's default slot.
        children: Vec<RenderNode>,
    },
}

impl RenderNode {
    /// Creates an element node.
    pub fn element(
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<RenderNode>,
    ) -> Self {
        RenderNode::Element {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        RenderNode::Text {
            value: value.into(),
        }
    }

    /// Creates a component node.
    pub fn component(name: impl Into<String>, props: Props, children: Vec<RenderNode>) -> Self {
        RenderNode::Component {
            name: name.into(),
            props,
            children,
        }
    }

    /// Returns the children of elements and components.
    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element { children, .. } | RenderNode::Component { children, .. } => {
                children
            }
            RenderNode::Text { .. } => &[],
        }
    }

    /// Returns the component name if this is a component.
    pub fn component_name(&self) -> Option<&str> {
        match self {
            RenderNode::Component { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns a prop of a component.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        match self {
            RenderNode::Component { props, .. } => props.get(key),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Text { value } => out.push_str(value),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

fn serialize_attributes<S: Serializer>(
    attributes: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(attributes.len()))?;
    for (key, value) in attributes {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_tagged_nodes() {
        let node = RenderNode::element(
            "div",
            vec![
                ("id".to_string(), "a".to_string()),
                ("class".to_string(), "b".to_string()),
            ],
            vec![RenderNode::text("hi")],
        );
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "element",
                "tag": "div",
                "attributes": { "id": "a", "class": "b" },
                "children": [{ "type": "text", "value": "hi" }]
            })
        );
    }

    #[test]
    fn serializes_components() {
        let mut props = Props::new();
        props.insert("level".to_string(), json!(2));
        let node = RenderNode::component("Heading", props, Vec::new());
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({ "type": "component", "name": "Heading", "props": { "level": 2 }, "children": [] })
        );
        assert_eq!(node.component_name(), Some("Heading"));
        assert_eq!(node.prop("level"), Some(&json!(2)));
    }

    #[test]
    fn text_content_walks_children() {
        let node = RenderNode::component(
            "Verse",
            Props::new(),
            vec![
                RenderNode::text("a"),
                RenderNode::element("br", Vec::new(), Vec::new()),
                RenderNode::element("em", Vec::new(), vec![RenderNode::text("b")]),
            ],
        );
        assert_eq!(node.text_content(), "ab");
    }
}
