use super::{BlockProps, to_props};
use crate::renderer::{BlockContext, RenderNode, Rule};
use headwp_core::{NodeRef, PredicateError, SiteSettings, is_block_by_name};
use serde::Serialize;

/// Props of the `Heading` component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingProps {
    /// Shared block props.
    #[serde(flatten)]
    pub block: BlockProps,
    /// Heading level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// Adapter for `core/heading` blocks.
#[derive(Debug, Clone)]
pub struct HeadingBlock {
    component: String,
}

impl HeadingBlock {
    /// Emits `component` instead of `Heading`.
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Extracts the props of a matched heading.
    pub fn props(ctx: &BlockContext<'_>) -> HeadingProps {
        let metadata = ctx.metadata();
        let level = metadata
            .get_number("level")
            .filter(|level| level.fract() == 0.0 && (1.0..=6.0).contains(level))
            .map(|level| level as u32)
            .or_else(|| {
                ctx.node
                    .tag_name()
                    .and_then(|tag| tag.strip_prefix('h'))
                    .and_then(|digits| digits.parse().ok())
                    .filter(|level| (1..=6).contains(level))
            });
        HeadingProps {
            block: BlockProps::new(ctx, &metadata),
            level,
        }
    }
}

impl Default for HeadingBlock {
    fn default() -> Self {
        Self::with_component("Heading")
    }
}

impl Rule for HeadingBlock {
    fn name(&self) -> &str {
        &self.component
    }

    fn matches(
        &self,
        node: NodeRef<'_>,
        _site: Option<&SiteSettings>,
    ) -> Result<bool, PredicateError> {
        Ok(is_block_by_name(node, "core/heading"))
    }

    fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
        let props = to_props(&Self::props(&ctx));
        RenderNode::component(self.component.clone(), props, ctx.children)
    }
}
