use super::{BlockProps, to_props};
use crate::renderer::{BlockContext, RenderNode, Rule};
use headwp_core::{BlockQuery, NodeRef, PredicateError, SiteSettings, is_block};
use serde::Serialize;

/// Props of the `Verse` component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseProps {
    /// Shared block props; `className` is always present.
    #[serde(flatten)]
    pub block: BlockProps,
    /// The node's `id` attribute, or empty.
    pub html_anchor: String,
}

/// Adapter for `pre.wp-block-verse`.
#[derive(Debug, Clone)]
pub struct VerseBlock {
    component: String,
}

impl VerseBlock {
    /// Emits `component` instead of `Verse`.
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Extracts the props of a matched verse.
    pub fn props(ctx: &BlockContext<'_>) -> VerseProps {
        let metadata = ctx.metadata();
        let mut block = BlockProps::new(ctx, &metadata);
        block.class_name.get_or_insert_with(String::new);
        VerseProps {
            block,
            html_anchor: ctx.node.attr("id").unwrap_or_default().to_string(),
        }
    }
}

impl Default for VerseBlock {
    fn default() -> Self {
        Self::with_component("Verse")
    }
}

impl Rule for VerseBlock {
    fn name(&self) -> &str {
        &self.component
    }

    fn matches(
        &self,
        node: NodeRef<'_>,
        _site: Option<&SiteSettings>,
    ) -> Result<bool, PredicateError> {
        Ok(is_block(
            node,
            BlockQuery {
                tag_name: Some("pre"),
                class_list: &["wp-block-verse"],
            },
        ))
    }

    fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
        let props = to_props(&Self::props(&ctx));
        RenderNode::component(self.component.clone(), props, ctx.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::BlocksRenderer;
    use headwp_core::parse_html;
    use serde_json::json;

    #[test]
    fn renders_verse_with_anchor() {
        let doc = parse_html(
            r#"<pre class="wp-block-verse" id="poem">Roses<br>are red</pre>"#,
            None,
        )
        .unwrap();
        let node = BlocksRenderer::default()
            .with_rule(VerseBlock::default())
            .render(&doc, None)
            .unwrap()
            .remove(0);
        assert_eq!(node.component_name(), Some("Verse"));
        assert_eq!(node.prop("className"), Some(&json!("wp-block-verse")));
        assert_eq!(node.prop("htmlAnchor"), Some(&json!("poem")));
        assert_eq!(node.children().len(), 3);
    }

    #[test]
    fn class_name_defaults_to_empty() {
        let doc = parse_html("<pre>x</pre>", None).unwrap();
        let pre = doc.roots().next().unwrap();
        let ctx = BlockContext {
            node: pre,
            children: Vec::new(),
            style: None,
            block: None,
            site: None,
        };
        let props = VerseBlock::props(&ctx);
        assert_eq!(props.block.class_name.as_deref(), Some(""));
        assert_eq!(props.html_anchor, "");
    }
}
