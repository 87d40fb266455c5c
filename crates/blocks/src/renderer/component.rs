//! Declarative rules built from tag, class and block-name criteria.

use super::{BlockContext, Props, RenderNode, Rule};
use headwp_core::{
    AnchorQuery, BlockQuery, NodeRef, PredicateError, SiteSettings, is_anchor_tag, is_block,
    is_block_by_name,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

type Test =
    Box<dyn Fn(NodeRef<'_>, Option<&SiteSettings>) -> Result<bool, PredicateError> + Send + Sync>;
type ExcludeTest = Box<dyn Fn(NodeRef<'_>) -> bool + Send + Sync>;
type Render = Box<dyn Fn(BlockContext<'_>) -> RenderNode + Send + Sync>;

/// Tag name and class requirements for an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Required tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// Classes that must all be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_list: Vec<String>,
}

impl Selector {
    /// Selects elements by tag name.
    pub fn tag(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            class_list: Vec::new(),
        }
    }

    /// Adds a required class.
    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_list.push(class_name.into());
        self
    }

    /// Returns true when neither a tag nor classes are required.
    pub fn is_empty(&self) -> bool {
        self.tag_name.is_none() && self.class_list.is_empty()
    }

    /// Returns true if `node` is an element satisfying the selector.
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        let class_list: Vec<&str> = self.class_list.iter().map(String::as_str).collect();
        is_block(
            node,
            BlockQuery {
                tag_name: self.tag_name.as_deref(),
                class_list: &class_list,
            },
        )
    }
}

/// A rule replacing elements with a named component.
///
/// Every criterion that is set must hold. Without a custom renderer the
/// component receives `tagName`, `className`, `htmlAttributes`, `style`
/// and (when forwarded) `block` props.
pub struct ComponentRule {
    component: String,
    selector: Selector,
    block_name: Option<String>,
    internal_link: Option<bool>,
    test: Option<Test>,
    exclude: Option<Selector>,
    exclude_test: Option<ExcludeTest>,
    render: Option<Render>,
}

impl ComponentRule {
    /// Creates a rule emitting `component`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            selector: Selector::default(),
            block_name: None,
            internal_link: None,
            test: None,
            exclude: None,
            exclude_test: None,
            render: None,
        }
    }

    /// Requires a tag name.
    pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.selector.tag_name = Some(tag_name.into());
        self
    }

    /// Requires every class in `class_list`.
    pub fn class_list<I, S>(mut self, class_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selector
            .class_list
            .extend(class_list.into_iter().map(Into::into));
        self
    }

    /// Requires a `data-wp-block-name`.
    pub fn block_name(mut self, block_name: impl Into<String>) -> Self {
        self.block_name = Some(block_name.into());
        self
    }

    /// Requires an `<a href>` that is (or is not) internal to the site.
    pub fn internal_link(mut self, internal: bool) -> Self {
        self.internal_link = Some(internal);
        self
    }

    /// Adds a custom predicate.
    pub fn test(
        mut self,
        test: impl Fn(NodeRef<'_>, Option<&SiteSettings>) -> Result<bool, PredicateError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.test = Some(Box::new(test));
        self
    }

    /// Drops descendants matching `selector` from the component's children.
    pub fn exclude(mut self, selector: Selector) -> Self {
        self.exclude = Some(selector);
        self
    }

    /// Drops descendants satisfying `exclude` from the component's children.
    pub fn exclude_with(
        mut self,
        exclude: impl Fn(NodeRef<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.exclude_test = Some(Box::new(exclude));
        self
    }

    /// Replaces the default component output.
    pub fn render_with(
        mut self,
        render: impl Fn(BlockContext<'_>) -> RenderNode + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    /// The emitted component name.
    pub fn component(&self) -> &str {
        &self.component
    }

    fn default_props(ctx: &BlockContext<'_>) -> Props {
        let mut props = Props::new();
        if let Some(tag) = ctx.node.tag_name() {
            props.insert("tagName".to_string(), Value::from(tag));
        }
        if let Some(class_name) = ctx.node.attr("class") {
            props.insert("className".to_string(), Value::from(class_name));
        }
        let attributes = ctx
            .node
            .attrs()
            .map(|(key, value)| (key.to_string(), Value::from(value)))
            .collect();
        props.insert("htmlAttributes".to_string(), Value::Object(attributes));
        if let Some(style) = &ctx.style {
            props.insert("style".to_string(), Value::from(style));
        }
        if let Some(block) = &ctx.block {
            match serde_json::to_value(block) {
                Ok(value) => {
                    props.insert("block".to_string(), value);
                }
                Err(err) => log::warn!("Could not serialize block metadata: {}", err),
            }
        }
        props
    }
}

impl Rule for ComponentRule {
    fn name(&self) -> &str {
        &self.component
    }

    fn matches(
        &self,
        node: NodeRef<'_>,
        site: Option<&SiteSettings>,
    ) -> Result<bool, PredicateError> {
        if !node.is_element() {
            return Ok(false);
        }
        if !self.selector.is_empty() && !self.selector.matches(node) {
            return Ok(false);
        }
        if let Some(block_name) = &self.block_name
            && !is_block_by_name(node, block_name)
        {
            return Ok(false);
        }
        if let Some(internal) = self.internal_link
            && !is_anchor_tag(
                node,
                AnchorQuery {
                    is_internal_link: Some(internal),
                },
                site,
            )
        {
            return Ok(false);
        }
        match &self.test {
            Some(test) => test(node, site),
            None => Ok(true),
        }
    }

    fn exclude(&self, node: NodeRef<'_>) -> bool {
        self.exclude.as_ref().is_some_and(|sel| sel.matches(node))
            || self.exclude_test.as_ref().is_some_and(|test| test(node))
    }

    fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
        if let Some(render) = &self.render {
            return render(ctx);
        }
        let props = Self::default_props(&ctx);
        RenderNode::component(self.component.clone(), props, ctx.children)
    }
}

impl std::fmt::Debug for ComponentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRule")
            .field("component", &self.component)
            .field("selector", &self.selector)
            .field("block_name", &self.block_name)
            .field("internal_link", &self.internal_link)
            .field("test", &self.test.is_some())
            .field("exclude", &self.exclude)
            .finish()
    }
}
