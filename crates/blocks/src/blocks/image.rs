use super::{BlockProps, json_number, to_props};
use crate::renderer::{BlockContext, RenderNode, Rule};
use headwp_core::block::coerce_number;
use headwp_core::{NodeRef, PredicateError, SiteSettings, is_block_by_name};
use serde::Serialize;
use serde_json::{Number, Value};

/// Props of the `Image` component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Shared block props.
    #[serde(flatten)]
    pub block: BlockProps,
    /// Image source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Alternative text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Width from metadata, else from the `<img>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    /// Height from metadata, else from the `<img>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
    /// Registered image size (`large`, `full`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_slug: Option<String>,
    /// Link target kind (`none`, `media`, `attachment`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_destination: Option<String>,
}

/// Adapter for `core/image` blocks.
#[derive(Debug, Clone)]
pub struct ImageBlock {
    component: String,
}

/// The embedded image: the first element child, or the first element child
/// of a leading `<figure>`. A wrapper such as a link is searched for its `<img>`.
fn find_image<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let first = node.first_element_child()?;
    let candidate = match first.tag_name() {
        Some("figure") => first.first_element_child()?,
        _ => first,
    };
    if candidate.tag_name() == Some("img") {
        return Some(candidate);
    }
    first_descendant(candidate, "img").or(Some(candidate))
}

fn first_descendant<'a>(node: NodeRef<'a>, tag: &str) -> Option<NodeRef<'a>> {
    node.element_children().find_map(|child| {
        if child.tag_name() == Some(tag) {
            Some(child)
        } else {
            first_descendant(child, tag)
        }
    })
}

impl ImageBlock {
    /// Emits `component` instead of `Image`.
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Extracts the props of a matched image.
    pub fn props(ctx: &BlockContext<'_>) -> ImageProps {
        let metadata = ctx.metadata();
        let img = find_image(ctx.node);
        let img_attr = |name: &str| img.and_then(|img| img.attr(name));
        let dimension = |name: &str| {
            metadata
                .get(name)
                .cloned()
                .or_else(|| img_attr(name).map(Value::from))
                .as_ref()
                .and_then(coerce_number)
                .and_then(json_number)
        };

        ImageProps {
            src: img_attr("src").map(str::to_string),
            alt: img_attr("alt").map(str::to_string),
            width: dimension("width"),
            height: dimension("height"),
            size_slug: metadata.get_str("sizeSlug").map(str::to_string),
            link_destination: metadata.get_str("linkDestination").map(str::to_string),
            block: BlockProps::new(ctx, &metadata),
        }
    }
}

impl Default for ImageBlock {
    fn default() -> Self {
        Self::with_component("Image")
    }
}

impl Rule for ImageBlock {
    fn name(&self) -> &str {
        &self.component
    }

    fn matches(
        &self,
        node: NodeRef<'_>,
        _site: Option<&SiteSettings>,
    ) -> Result<bool, PredicateError> {
        Ok(is_block_by_name(node, "core/image"))
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

    fn render(html: &str) -> RenderNode {
        let doc = parse_html(html, None).unwrap();
        BlocksRenderer::default()
            .with_rule(ImageBlock::default())
            .render(&doc, None)
            .unwrap()
            .remove(0)
    }

    #[test]
    fn reads_image_inside_figure() {
        let node = render(
            r#"<div data-wp-block-name="core/image" data-wp-block='{"width":"640","sizeSlug":"large","linkDestination":"none"}'>
  <figure class="wp-block-image"><img src="https://example.com/a.png" alt="A" width="300" height="200"></figure>
</div>"#,
        );
        assert_eq!(node.component_name(), Some("Image"));
        assert_eq!(node.prop("src"), Some(&json!("https://example.com/a.png")));
        assert_eq!(node.prop("alt"), Some(&json!("A")));
        assert_eq!(node.prop("width"), Some(&json!(640)));
        assert_eq!(node.prop("height"), Some(&json!(200)));
        assert_eq!(node.prop("sizeSlug"), Some(&json!("large")));
        assert_eq!(node.prop("linkDestination"), Some(&json!("none")));
    }

    #[test]
    fn reads_direct_image_child() {
        let node = render(
            r#"<figure data-wp-block-name="core/image" class="wp-block-image"><img src="b.png"></figure>"#,
        );
        assert_eq!(node.prop("src"), Some(&json!("b.png")));
        assert_eq!(node.prop("alt"), None);
        assert_eq!(node.prop("width"), None);
        assert_eq!(node.prop("className"), Some(&json!("wp-block-image")));
    }

    #[test]
    fn finds_linked_image() {
        let node = render(
            r#"<figure data-wp-block-name="core/image"><a href="/full.png"><img src="thumb.png" alt="t"></a></figure>"#,
        );
        assert_eq!(node.prop("src"), Some(&json!("thumb.png")));
    }

    #[test]
    fn tolerates_missing_image() {
        let node = render(r#"<figure data-wp-block-name="core/image"></figure>"#);
        assert_eq!(node.component_name(), Some("Image"));
        assert_eq!(node.prop("src"), None);
    }
}
