//! Arena-backed DOM for parsed block markup.
//!
//! Nodes are stored in a flat `Vec` owned by [`Document`] and refer to each
//! other by [`NodeId`]. Parent links are plain indices, so the tree has a
//! single owner and can be shared across threads by reference.

use scraper::{ElementRef, Html};
use std::fmt;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element's tag name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
}

impl Element {
    /// Returns the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element with tag and attributes.
    Element(Element),
    /// A run of (decoded) text.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A parsed HTML fragment.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an HTML fragment as-is, without sanitizing.
    ///
    /// Comments, doctypes and processing instructions are dropped.
    pub fn parse_fragment(html: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        let mut doc = Self::new();
        doc.append_children(None, fragment.root_element());
        doc
    }

    fn append_children(&mut self, parent: Option<NodeId>, source: ElementRef<'_>) {
        for child in source.children() {
            match child.value() {
                scraper::Node::Text(text) => {
                    let value: &str = text;
                    self.push(parent, NodeData::Text(value.to_string()));
                }
                scraper::Node::Element(el) => {
                    let element = Element {
                        name: el.name().to_ascii_lowercase(),
                        attrs: el
                            .attrs()
                            .map(|(key, value)| (key.to_string(), value.to_string()))
                            .collect(),
                    };
                    let id = self.push(parent, NodeData::Element(element));
                    if let Some(child_ref) = ElementRef::wrap(child) {
                        self.append_children(Some(id), child_ref);
                    }
                }
                _ => {}
            }
        }
    }

    /// Appends a node under `parent` (or as a root) and returns its id.
    pub fn push(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            data,
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Returns a handle to the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node id out of bounds");
        NodeRef { doc: self, id }
    }

    /// Returns a handle to the node with the given id, if it exists.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { doc: self, id })
    }

    /// Iterates the top-level nodes in order.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.roots.iter().map(move |&id| NodeRef { doc: self, id })
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Concatenated text of every node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for root in self.roots() {
            root.collect_text(&mut out);
        }
        out
    }
}

/// Borrowed handle to a node inside a [`Document`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn raw(&self) -> &'a Node {
        &self.doc.nodes[self.id.0]
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// The node payload.
    pub fn data(&self) -> &'a NodeData {
        &self.raw().data
    }

    /// Returns the element payload, if this is an element.
    pub fn as_element(&self) -> Option<&'a Element> {
        match self.data() {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// Returns the text, if this is a text node.
    pub fn as_text(&self) -> Option<&'a str> {
        match self.data() {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Returns true for element nodes.
    pub fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    /// Lowercase tag name for elements.
    pub fn tag_name(&self) -> Option<&'a str> {
        self.as_element().map(|el| el.name.as_str())
    }

    /// Returns an attribute value of an element.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.as_element().and_then(|el| el.attr(name))
    }

    /// Iterates an element's attributes (empty for text).
    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.as_element()
            .into_iter()
            .flat_map(|el| el.attrs.iter())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterates the whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }

    /// Returns true if the `class` attribute contains `class_name`.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|c| c == class_name)
    }

    /// The parent node.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.raw().parent.map(|id| NodeRef { doc: self.doc, id })
    }

    /// Iterates the child nodes in order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.raw()
            .children
            .iter()
            .map(move |&id| NodeRef { doc, id })
    }

    /// Iterates the element children, skipping text.
    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(NodeRef::is_element)
    }

    /// The first child node.
    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.children().next()
    }

    /// The first element child.
    pub fn first_element_child(&self) -> Option<NodeRef<'a>> {
        self.element_children().next()
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.data() {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            NodeData::Element(el) => f
                .debug_struct("Element")
                .field("id", &self.id.0)
                .field("name", &el.name)
                .field("attrs", &el.attrs)
                .finish(),
            NodeData::Text(text) => f
                .debug_struct("Text")
                .field("id", &self.id.0)
                .field("value", text)
                .finish(),
        }
    }
}
