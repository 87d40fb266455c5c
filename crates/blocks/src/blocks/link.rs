use super::{BlockProps, to_props};
use crate::renderer::{BlockContext, RenderNode, Rule};
use headwp_core::{AnchorQuery, NodeRef, PredicateError, SiteSettings, is_anchor_tag, to_site_path};
use serde::Serialize;

/// Props of the `Link` component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProps {
    /// Shared block props.
    #[serde(flatten)]
    pub block: BlockProps,
    /// Site-relative path of the link.
    pub href: String,
    /// `rel` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    /// `target` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Adapter for anchors pointing inside the request site.
#[derive(Debug, Clone)]
pub struct LinkBlock {
    component: String,
}

impl LinkBlock {
    /// Emits `component` instead of `Link`.
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Extracts the props of a matched link.
    pub fn props(ctx: &BlockContext<'_>) -> LinkProps {
        let attr = |name: &str| ctx.node.attr(name).map(str::to_string);
        LinkProps {
            block: BlockProps::new(ctx, &ctx.metadata()),
            href: to_site_path(ctx.node.attr("href").unwrap_or_default(), ctx.site),
            rel: attr("rel"),
            target: attr("target"),
        }
    }
}

impl Default for LinkBlock {
    fn default() -> Self {
        Self::with_component("Link")
    }
}

impl Rule for LinkBlock {
    fn name(&self) -> &str {
        &self.component
    }

    fn matches(
        &self,
        node: NodeRef<'_>,
        site: Option<&SiteSettings>,
    ) -> Result<bool, PredicateError> {
        Ok(is_anchor_tag(
            node,
            AnchorQuery {
                is_internal_link: Some(true),
            },
            site,
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

    fn site() -> SiteSettings {
        SiteSettings {
            source_url: Some("https://sourceurl.com/site1".to_string()),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn rewrites_internal_links() {
        let doc = parse_html(
            r#"<a href="https://sourceurl.com/site1/post-name?x=1#top" rel="next" class="more">link</a><a href="https://sourceurl.com/site2/post-name">not internal link</a>"#,
            None,
        )
        .unwrap();
        let site = site();
        let out = BlocksRenderer::default()
            .with_rule(LinkBlock::default())
            .render(&doc, Some(&site))
            .unwrap();

        assert_eq!(out[0].component_name(), Some("Link"));
        assert_eq!(out[0].prop("href"), Some(&json!("/post-name?x=1#top")));
        assert_eq!(out[0].prop("rel"), Some(&json!("next")));
        assert_eq!(out[0].prop("className"), Some(&json!("more")));
        assert_eq!(out[0].prop("target"), None);
        assert_eq!(out[0].prop("attributes"), Some(&json!({})));
        assert_eq!(out[0].prop("name"), None);
        assert!(out[1].component_name().is_none());
    }

    #[test]
    fn root_relative_links_are_internal() {
        let doc = parse_html(r#"<a href="/about">About</a>"#, None).unwrap();
        let out = BlocksRenderer::default()
            .with_rule(LinkBlock::default())
            .render(&doc, None)
            .unwrap();
        assert_eq!(out[0].prop("href"), Some(&json!("/about")));
    }

    #[test]
    fn link_blocks_carry_block_props() {
        let doc = parse_html(
            r#"<a href="/about" data-wp-block-name="core/button" data-wp-block='{"width":50}' style="color:red">About</a>"#,
            None,
        )
        .unwrap();
        let out = BlocksRenderer::default()
            .with_rule(LinkBlock::default())
            .render(&doc, None)
            .unwrap();
        assert_eq!(out[0].prop("name"), Some(&json!("core/button")));
        assert_eq!(out[0].prop("attributes"), Some(&json!({ "width": 50 })));
        assert_eq!(out[0].prop("style"), Some(&json!({ "color": "red" })));
    }

    #[test]
    fn anchors_without_href_stay_plain() {
        let doc = parse_html(r#"<a name="x">x</a>"#, None).unwrap();
        let out = BlocksRenderer::default()
            .with_rule(LinkBlock::default())
            .render(&doc, Some(&site()))
            .unwrap();
        assert!(out[0].component_name().is_none());
    }
}
