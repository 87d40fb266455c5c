//! Block matching and substitution.
//!
//! [`BlocksRenderer`] walks a parsed [`Document`] depth-first. Each element is
//! tested against the rules in order; the first rule whose predicate holds
//! replaces the element with its own output. Children of a matched element
//! are rendered first through the same walk, so nested blocks still match.
//! Unmatched elements are rebuilt with the same tag and attributes.

mod component;
mod types;

pub use component::{ComponentRule, Selector};
pub use types::{Props, RenderNode};

use headwp_core::{
    BlockMetadata, Document, HeadlessError, NodeData, NodeRef, PredicateError, Sanitizer,
    SiteSettings, StyleMap, parse_style,
};
use serde::{Deserialize, Serialize};

/// A predicate paired with the output that replaces matching nodes.
pub trait Rule: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns true when this rule should replace `node`.
    fn matches(
        &self,
        node: NodeRef<'_>,
        site: Option<&SiteSettings>,
    ) -> Result<bool, PredicateError>;

    /// Returns true for descendants to drop while rendering a matched node's children.
    fn exclude(&self, _node: NodeRef<'_>) -> bool {
        false
    }

    /// Produces the replacement for a matched node.
    fn render(&self, ctx: BlockContext<'_>) -> RenderNode;
}

/// Everything a rule receives for a matched node.
#[derive(Debug)]
pub struct BlockContext<'a> {
    /// The matched node.
    pub node: NodeRef<'a>,
    /// Already rendered children.
    pub children: Vec<RenderNode>,
    /// Parsed `style` attribute, when present.
    pub style: Option<StyleMap>,
    /// Forwarded block metadata, when enabled and well-formed.
    pub block: Option<BlockMetadata>,
    /// Site of the current request.
    pub site: Option<&'a SiteSettings>,
}

impl BlockContext<'_> {
    /// Block metadata of the node, read directly when it was not forwarded.
    pub fn metadata(&self) -> BlockMetadata {
        match &self.block {
            Some(block) => block.clone(),
            None => BlockMetadata::from_node(self.node),
        }
    }

    /// Rebuilds the node as a plain element around the rendered children.
    pub fn into_element(self) -> RenderNode {
        let (tag, attributes) = match self.node.as_element() {
            Some(el) => (el.name.clone(), el.attrs.clone()),
            None => (String::new(), Vec::new()),
        };
        RenderNode::element(tag, attributes, self.children)
    }
}

/// What to do when a rule predicate fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PredicateFailure {
    /// Log a warning and render the node as if nothing matched.
    #[default]
    Fallback,
    /// Abort the render with [`HeadlessError::Predicate`].
    Propagate,
}

/// Rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Parse `data-wp-block` metadata and hand it to matched rules.
    #[serde(default)]
    pub forward_block_attributes: bool,
    /// Predicate failure policy.
    #[serde(default)]
    pub predicate_failure: PredicateFailure,
}

/// Ordered rules plus options; renders documents into [`RenderNode`] trees.
#[derive(Default)]
pub struct BlocksRenderer {
    rules: Vec<Box<dyn Rule>>,
    options: RenderOptions,
}

impl BlocksRenderer {
    /// Creates a renderer evaluating `rules` in order.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            options: RenderOptions::default(),
        }
    }

    /// Replaces the render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// The render options.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Renders every top-level node of `doc`.
    pub fn render(
        &self,
        doc: &Document,
        site: Option<&SiteSettings>,
    ) -> Result<Vec<RenderNode>, HeadlessError> {
        let mut walk = Walk {
            rules: &self.rules,
            options: self.options,
            site,
            excludes: Vec::new(),
        };
        walk.render_nodes(doc.roots())
    }

    /// Sanitizes and parses `html`, then renders it.
    pub fn render_html(
        &self,
        html: &str,
        sanitizer: &Sanitizer,
        site: Option<&SiteSettings>,
    ) -> Result<Vec<RenderNode>, HeadlessError> {
        let doc = sanitizer.parse(html)?;
        self.render(&doc, site)
    }
}

impl std::fmt::Debug for BlocksRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlocksRenderer")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .finish()
    }
}

struct Walk<'r, 's> {
    rules: &'r [Box<dyn Rule>],
    options: RenderOptions,
    site: Option<&'s SiteSettings>,
    /// Rules of matched ancestors; their exclusions cover the whole subtree.
    excludes: Vec<&'r dyn Rule>,
}

impl<'r> Walk<'r, '_> {
    fn render_nodes<'d>(
        &mut self,
        nodes: impl Iterator<Item = NodeRef<'d>>,
    ) -> Result<Vec<RenderNode>, HeadlessError> {
        let mut out = Vec::new();
        for node in nodes {
            if self.excludes.iter().any(|rule| rule.exclude(node)) {
                log::debug!("Excluding node {:?}", node);
                continue;
            }
            out.push(self.render_node(node)?);
        }
        Ok(out)
    }

    fn render_node(&mut self, node: NodeRef<'_>) -> Result<RenderNode, HeadlessError> {
        let el = match node.data() {
            NodeData::Text(text) => return Ok(RenderNode::text(text.clone())),
            NodeData::Element(el) => el,
        };

        let Some(rule) = self.find_rule(node)? else {
            let children = self.render_nodes(node.children())?;
            return Ok(RenderNode::element(
                el.name.clone(),
                el.attrs.clone(),
                children,
            ));
        };

        self.excludes.push(rule);
        let children = self.render_nodes(node.children());
        self.excludes.pop();

        let block = if self.options.forward_block_attributes {
            BlockMetadata::forwarded(node)
        } else {
            None
        };

        Ok(rule.render(BlockContext {
            node,
            children: children?,
            style: node.attr("style").map(parse_style),
            block,
            site: self.site,
        }))
    }

    fn find_rule(&self, node: NodeRef<'_>) -> Result<Option<&'r dyn Rule>, HeadlessError> {
        for rule in self.rules {
            match rule.matches(node, self.site) {
                Ok(true) => return Ok(Some(rule.as_ref())),
                Ok(false) => {}
                Err(err) => match self.options.predicate_failure {
                    PredicateFailure::Fallback => {
                        log::warn!(
                            "Predicate of rule '{}' failed on <{}>, rendering as-is: {}",
                            rule.name(),
                            node.tag_name().unwrap_or_default(),
                            err
                        );
                        return Ok(None);
                    }
                    PredicateFailure::Propagate => {
                        return Err(HeadlessError::Predicate {
                            rule: rule.name().to_string(),
                            source: err,
                        });
                    }
                },
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headwp_core::{AllowList, parse_html};

    struct Named {
        name: &'static str,
        tag: &'static str,
    }

    impl Rule for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn matches(
            &self,
            node: NodeRef<'_>,
            _site: Option<&SiteSettings>,
        ) -> Result<bool, PredicateError> {
            Ok(node.tag_name() == Some(self.tag))
        }

        fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
            RenderNode::component(self.name, Props::new(), ctx.children)
        }
    }

    struct Failing;

    impl Rule for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn matches(
            &self,
            _node: NodeRef<'_>,
            _site: Option<&SiteSettings>,
        ) -> Result<bool, PredicateError> {
            Err(PredicateError::new("boom"))
        }

        fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
            ctx.into_element()
        }
    }

    /// Fails only on nodes carrying `class="bad"`.
    struct FailsOnBad;

    impl Rule for FailsOnBad {
        fn name(&self) -> &str {
            "fails-on-bad"
        }

        fn matches(
            &self,
            node: NodeRef<'_>,
            _site: Option<&SiteSettings>,
        ) -> Result<bool, PredicateError> {
            if node.attr("class") == Some("bad") {
                Err(PredicateError::new("bad node"))
            } else {
                Ok(false)
            }
        }

        fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
            ctx.into_element()
        }
    }

    fn doc(html: &str) -> Document {
        parse_html(html, None).unwrap()
    }

    #[test]
    fn passes_through_without_rules() {
        let doc = doc("<div><p>hello world</p></div>");
        let out = BlocksRenderer::default().render(&doc, None).unwrap();
        assert_eq!(
            out,
            vec![RenderNode::element(
                "div",
                Vec::new(),
                vec![RenderNode::element(
                    "p",
                    Vec::new(),
                    vec![RenderNode::text("hello world")]
                )]
            )]
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let doc = doc("<p>x</p>");
        let a = BlocksRenderer::default()
            .with_rule(Named { name: "A", tag: "p" })
            .with_rule(Named { name: "B", tag: "p" });
        let b = BlocksRenderer::default()
            .with_rule(Named { name: "B", tag: "p" })
            .with_rule(Named { name: "A", tag: "p" });

        assert_eq!(a.render(&doc, None).unwrap()[0].component_name(), Some("A"));
        assert_eq!(b.render(&doc, None).unwrap()[0].component_name(), Some("B"));
    }

    #[test]
    fn nested_blocks_match_inside_matched_nodes() {
        let doc = doc("<div><p>x</p></div>");
        let renderer = BlocksRenderer::default()
            .with_rule(Named { name: "Outer", tag: "div" })
            .with_rule(Named { name: "Inner", tag: "p" });
        let out = renderer.render(&doc, None).unwrap();
        assert_eq!(out[0].component_name(), Some("Outer"));
        assert_eq!(out[0].children()[0].component_name(), Some("Inner"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let doc = doc(r#"<div class="a" style="color:red"><p>x</p><span>y</span></div>"#);
        let renderer = BlocksRenderer::default().with_rule(Named { name: "P", tag: "p" });
        assert_eq!(
            renderer.render(&doc, None).unwrap(),
            renderer.render(&doc, None).unwrap()
        );
    }

    #[test]
    fn failing_predicate_falls_back_by_default() {
        let doc = doc("<p>x</p>");
        let renderer = BlocksRenderer::default()
            .with_rule(Failing)
            .with_rule(Named { name: "P", tag: "p" });
        let out = renderer.render(&doc, None).unwrap();
        assert_eq!(
            out,
            vec![RenderNode::element(
                "p",
                Vec::new(),
                vec![RenderNode::text("x")]
            )]
        );
    }

    #[test]
    fn failing_predicate_only_affects_its_node() {
        let doc = doc(r#"<div><p class="bad"><em>x</em></p><p>y</p></div>"#);
        let renderer = BlocksRenderer::default()
            .with_rule(FailsOnBad)
            .with_rule(Named { name: "P", tag: "p" })
            .with_rule(Named { name: "Em", tag: "em" });
        let out = renderer.render(&doc, None).unwrap();

        let div = &out[0];
        assert!(div.component_name().is_none());
        let bad = &div.children()[0];
        assert_eq!(
            bad,
            &RenderNode::element(
                "p",
                vec![("class".to_string(), "bad".to_string())],
                vec![RenderNode::component(
                    "Em",
                    Props::new(),
                    vec![RenderNode::text("x")]
                )]
            )
        );
        assert_eq!(div.children()[1].component_name(), Some("P"));
        assert_eq!(div.children()[1].text_content(), "y");
    }

    #[test]
    fn failing_predicate_can_propagate() {
        let doc = doc("<p>x</p>");
        let renderer = BlocksRenderer::default()
            .with_rule(Failing)
            .with_options(RenderOptions {
                predicate_failure: PredicateFailure::Propagate,
                ..RenderOptions::default()
            });
        let err = renderer.render(&doc, None).unwrap_err();
        assert_eq!(err.to_string(), "Predicate error in rule 'failing': boom");
    }

    #[test]
    fn render_html_sanitizes_first() {
        let sanitizer = Sanitizer::new(AllowList::default());
        let out = BlocksRenderer::default()
            .render_html("<p onclick=\"x()\"><script>1</script>ok</p>", &sanitizer, None)
            .unwrap();
        assert_eq!(
            out,
            vec![RenderNode::element(
                "p",
                Vec::new(),
                vec![RenderNode::text("ok")]
            )]
        );
    }

    #[test]
    fn parses_render_options() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"forwardBlockAttributes":true,"predicateFailure":"propagate"}"#)
                .unwrap();
        assert!(options.forward_block_attributes);
        assert_eq!(options.predicate_failure, PredicateFailure::Propagate);
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
    }
}
