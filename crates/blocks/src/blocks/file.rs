use super::{BlockProps, to_props};
use crate::renderer::{BlockContext, RenderNode, Rule};
use headwp_core::{BlockQuery, NodeRef, PredicateError, SiteSettings, is_block};
use serde::Serialize;
use serde_json::Value;

/// Props of the `File` component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProps {
    /// Shared block props.
    #[serde(flatten)]
    pub block: BlockProps,
    /// Attachment id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// File URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Whether to render a download button.
    pub show_download_button: bool,
    /// The node's `id` attribute, or empty.
    pub html_anchor: String,
}

/// Adapter for `div.wp-block-file`.
#[derive(Debug, Clone)]
pub struct FileBlock {
    component: String,
}

impl FileBlock {
    /// Emits `component` instead of `File`.
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Extracts the props of a matched file block.
    pub fn props(ctx: &BlockContext<'_>) -> FileProps {
        let metadata = ctx.metadata();
        FileProps {
            id: metadata.get("id").cloned(),
            href: metadata.get_str("href").map(str::to_string),
            show_download_button: metadata.get_truthy("showDownloadButton"),
            html_anchor: ctx.node.attr("id").unwrap_or_default().to_string(),
            block: BlockProps::new(ctx, &metadata),
        }
    }
}

impl Default for FileBlock {
    fn default() -> Self {
        Self::with_component("File")
    }
}

impl Rule for FileBlock {
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
                tag_name: Some("div"),
                class_list: &["wp-block-file"],
            },
        ))
    }

    fn render(&self, ctx: BlockContext<'_>) -> RenderNode {
        let props = to_props(&Self::props(&ctx));
        RenderNode::component(self.component.clone(), props, ctx.children)
    }
}
