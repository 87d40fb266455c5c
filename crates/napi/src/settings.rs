//! Resolved headless settings exposed to Node callers.

use crate::convert_error;
use crate::renderer::HeadlessRenderer;
use crate::types::{PreparedRoute, RenderResult};
use headwp_core::{HeadlessConfig, HeadlessError, PathParam, RouteParams, Settings, prepare_query};
use napi_derive::napi;
use serde::Serialize;
use serde_json::Value as JsonValue;

fn to_json<T: Serialize + ?Sized>(value: &T) -> napi::Result<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| convert_error(HeadlessError::Internal(format!("cannot serialize: {e}"))))
}

/// Immutable settings resolved once from a headless config object.
#[napi]
pub struct HeadlessSettings {
    pub(crate) settings: Settings,
}

#[napi]
impl HeadlessSettings {
    #[napi(constructor)]
    /// Resolves a headless config object.
    pub fn new(config: Option<JsonValue>) -> napi::Result<Self> {
        let config = match config {
            Some(value) => serde_json::from_value::<HeadlessConfig>(value)
                .map_err(|e| convert_error(e.into()))?,
            None => HeadlessConfig::default(),
        };
        Ok(Self {
            settings: Settings::new(config),
        })
    }

    /// Loads and resolves a `.json`, `.yaml` or `.yml` config file.
    #[napi(factory, js_name = "fromFile")]
    pub fn from_file(path: String) -> napi::Result<Self> {
        let config = HeadlessConfig::from_path(&path).map_err(convert_error)?;
        Ok(Self {
            settings: Settings::new(config),
        })
    }

    /// The global WordPress URL.
    #[napi(getter, js_name = "wpUrl")]
    pub fn wp_url(&self) -> String {
        self.settings.wp_url().to_string()
    }

    /// The global frontend URL.
    #[napi(getter, js_name = "hostUrl")]
    pub fn host_url(&self) -> String {
        self.settings.host_url().to_string()
    }

    /// Finds the site serving a host or URL, optionally for a locale.
    #[napi(js_name = "siteByHost")]
    pub fn site_by_host(
        &self,
        host_or_url: String,
        locale: Option<String>,
    ) -> napi::Result<Option<JsonValue>> {
        self.settings
            .site_by_host(&host_or_url, locale.as_deref())
            .map(to_json)
            .transpose()
    }

    /// Finds the site with the given WordPress URL.
    #[napi(js_name = "siteBySourceUrl")]
    pub fn site_by_source_url(&self, source_url: String) -> napi::Result<Option<JsonValue>> {
        self.settings
            .site_by_source_url(&source_url)
            .map(to_json)
            .transpose()
    }

    /// Post types of a site, or the global list.
    #[napi(js_name = "customPostTypes")]
    pub fn custom_post_types(&self, source_url: Option<String>) -> napi::Result<JsonValue> {
        to_json(self.settings.custom_post_types(source_url.as_deref()))
    }

    /// Taxonomies of a site, or the global list.
    #[napi(js_name = "customTaxonomies")]
    pub fn custom_taxonomies(&self, source_url: Option<String>) -> napi::Result<JsonValue> {
        to_json(self.settings.custom_taxonomies(source_url.as_deref()))
    }

    /// Resolves a route (`site` host plus string or segment path).
    #[napi(js_name = "prepareQuery")]
    pub fn prepare_query(
        &self,
        site: Option<String>,
        path: Option<JsonValue>,
    ) -> napi::Result<PreparedRoute> {
        let path = path
            .filter(|value| !value.is_null())
            .map(serde_json::from_value::<PathParam>)
            .transpose()
            .map_err(|e| convert_error(e.into()))?;
        let route = RouteParams { site, path };
        let query = prepare_query(&self.settings, &route).map_err(convert_error)?;
        Ok(PreparedRoute {
            path: query.path,
            site: to_json(query.site)?,
        })
    }

    /// Renders a fragment for the site serving `host` (global settings when absent).
    #[napi(js_name = "renderBlocks")]
    pub fn render_blocks(
        &self,
        renderer: &HeadlessRenderer,
        html: String,
        host: Option<String>,
        include_html: Option<bool>,
    ) -> napi::Result<RenderResult> {
        let site = match host.as_deref() {
            Some(host) => self
                .settings
                .site_by_host(host, None)
                .ok_or_else(|| convert_error(HeadlessError::site_not_found(host)))?,
            None => self.settings.global(),
        };
        renderer
            .config
            .render(&html, Some(site), include_html.unwrap_or(false))
            .map_err(convert_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> HeadlessSettings {
        HeadlessSettings::new(Some(json!({
            "sourceUrl": "https://wp.example.com",
            "sites": [
                { "hostUrl": "https://js1.example.com", "sourceUrl": "https://wp.example.com/js1" }
            ]
        })))
        .unwrap()
    }

    #[test]
    fn test_site_lookups() {
        let settings = settings();
        let site = settings
            .site_by_host("https://js1.example.com/posts".to_string(), None)
            .unwrap()
            .unwrap();
        assert_eq!(site["host"], json!("js1.example.com"));
        assert_eq!(site["sourceUrl"], json!("https://wp.example.com/js1"));
        assert!(
            settings
                .site_by_source_url("https://nope.example.com".to_string())
                .unwrap()
                .is_none()
        );
        assert_eq!(settings.wp_url(), "https://wp.example.com");
    }

    #[test]
    fn test_post_types_fall_back_to_global() {
        let settings = settings();
        let post_types = settings.custom_post_types(None).unwrap();
        assert_eq!(post_types[0]["slug"], json!("page"));
        assert_eq!(post_types[1]["archive"], json!("/blog"));
        let taxonomies = settings
            .custom_taxonomies(Some("https://wp.example.com/js1".to_string()))
            .unwrap();
        assert_eq!(taxonomies[1]["restParam"], json!("tags"));
    }

    #[test]
    fn test_prepare_query() {
        let settings = settings();
        let route = settings
            .prepare_query(Some("js1.example.com".to_string()), Some(json!(["a", "b"])))
            .unwrap();
        assert_eq!(route.path, "/a/b");
        assert_eq!(route.site["sourceUrl"], json!("https://wp.example.com/js1"));

        let err = settings
            .prepare_query(Some("js2.example.com".to_string()), None)
            .err()
            .unwrap();
        assert!(err.reason.contains("make sure to add js2.example.com"));
    }

    #[test]
    fn test_render_blocks_for_site() {
        let settings = settings();
        let renderer = HeadlessRenderer::new(None).unwrap();
        let result = settings
            .render_blocks(
                &renderer,
                r#"<a href="https://wp.example.com/js1/hello/">Hello</a>"#.to_string(),
                Some("js1.example.com".to_string()),
                Some(true),
            )
            .unwrap();
        assert_eq!(
            result.html.as_deref(),
            Some(r#"<Link attributes="{}" href="/hello/">Hello</Link>"#)
        );
    }
}
