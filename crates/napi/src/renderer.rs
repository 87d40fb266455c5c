//! The reusable renderer and its configuration.

use crate::batch::{BatchInput, BatchOptions, BatchProcessingResult, BatchResult, BatchStats};
use crate::types::{RenderCallOptions, RenderResult, RendererConfig};
use crate::{build_sanitizer, convert_error, parse_predicate_failure, site_for_source};
use headwp_blocks::registry::defaults::default_block_registry;
use headwp_blocks::{BlocksRenderer, RegistryConfig, RenderOptions, to_html};
use headwp_core::{HeadlessError, Sanitizer, SiteSettings};
use napi_derive::napi;
use rayon::prelude::*;
use std::time::Instant;

pub(crate) struct InternalRendererConfig {
    pub(crate) sanitizer: Sanitizer,
    pub(crate) renderer: BlocksRenderer,
}

impl InternalRendererConfig {
    pub(crate) fn new(config: Option<RendererConfig>) -> Result<Self, HeadlessError> {
        let cfg = config.unwrap_or_default();
        let sanitizer = build_sanitizer(cfg.allow_list, cfg.disallowed_tags.as_deref())?;
        let registry = match cfg.registry {
            Some(value) => serde_json::from_value::<RegistryConfig>(value)?,
            None => default_block_registry(),
        };
        let options = RenderOptions {
            forward_block_attributes: cfg.forward_block_attributes.unwrap_or(false),
            predicate_failure: parse_predicate_failure(cfg.predicate_failure.as_deref())?,
        };

        Ok(Self {
            sanitizer,
            renderer: registry.renderer(options)?,
        })
    }

    pub(crate) fn render(
        &self,
        html: &str,
        site: Option<&SiteSettings>,
        include_html: bool,
    ) -> Result<RenderResult, HeadlessError> {
        let nodes = self.renderer.render_html(html, &self.sanitizer, site)?;
        let html = include_html.then(|| to_html(&nodes));
        let nodes = serde_json::to_value(&nodes)
            .map_err(|e| HeadlessError::Internal(format!("cannot serialize render tree: {e}")))?;
        Ok(RenderResult { nodes, html })
    }
}

/// Stateful renderer exposed to Node callers.
///
/// Sanitizer and rules are built once and reused for every render.
#[napi]
pub struct HeadlessRenderer {
    pub(crate) config: InternalRendererConfig,
}

#[napi]
impl HeadlessRenderer {
    #[napi(constructor)]
    /// Creates a renderer from an allow-list, a registry and render options.
    pub fn new(config: Option<RendererConfig>) -> napi::Result<Self> {
        let config = InternalRendererConfig::new(config).map_err(convert_error)?;
        Ok(Self { config })
    }

    /// Sanitizes and renders one HTML fragment.
    #[napi]
    pub fn render(
        &self,
        html: String,
        options: Option<RenderCallOptions>,
    ) -> napi::Result<RenderResult> {
        let opts = options.unwrap_or_default();
        let site = site_for_source(opts.source_url);
        self.config
            .render(&html, site.as_ref(), opts.include_html.unwrap_or(false))
            .map_err(convert_error)
    }

    /// Renders many fragments on a rayon pool, keeping input order.
    ///
    /// With `continueOnError: false` fragments render one by one and the
    /// batch ends at the first failure.
    #[napi(js_name = "renderBatch")]
    pub fn render_batch(
        &self,
        inputs: Vec<BatchInput>,
        options: Option<BatchOptions>,
    ) -> napi::Result<BatchProcessingResult> {
        Ok(self.config.render_batch(inputs, options.unwrap_or_default()))
    }
}

impl InternalRendererConfig {
    fn render_input(&self, input: BatchInput, include_html: bool) -> BatchResult {
        let site = site_for_source(input.source_url);
        match self.render(&input.html, site.as_ref(), include_html) {
            Ok(result) => BatchResult {
                id: input.id,
                result: Some(result),
                error: None,
            },
            Err(err) => {
                log::debug!("Batch fragment '{}' failed: {}", input.id, err);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub(crate) fn render_batch(
        &self,
        inputs: Vec<BatchInput>,
        opts: BatchOptions,
    ) -> BatchProcessingResult {
        let started = Instant::now();
        let include_html = opts.include_html.unwrap_or(false);
        let total = inputs.len() as u32;

        let results: Vec<BatchResult> = if opts.continue_on_error.unwrap_or(true) {
            let render_all = || {
                inputs
                    .into_par_iter()
                    .map(|input| self.render_input(input, include_html))
                    .collect::<Vec<_>>()
            };
            let pool = opts.max_threads.and_then(|threads| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads as usize)
                    .build()
                    .ok()
            });
            match pool {
                Some(pool) => pool.install(render_all),
                None => render_all(),
            }
        } else {
            let mut results = Vec::with_capacity(inputs.len());
            for input in inputs {
                let result = self.render_input(input, include_html);
                let failed = result.error.is_some();
                results.push(result);
                if failed {
                    break;
                }
            }
            results
        };

        let failed = results.iter().filter(|r| r.error.is_some()).count() as u32;
        BatchProcessingResult {
            stats: BatchStats {
                total,
                succeeded: results.len() as u32 - failed,
                failed,
                processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            },
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(id: &str, html: &str) -> BatchInput {
        BatchInput {
            id: id.to_string(),
            html: html.to_string(),
            source_url: None,
        }
    }

    #[test]
    fn test_renders_with_default_registry() {
        let config = InternalRendererConfig::new(None).unwrap();
        let result = config
            .render(r#"<h2 data-wp-block-name="core/heading">Hi</h2>"#, None, true)
            .unwrap();
        assert_eq!(result.nodes[0]["type"], json!("component"));
        assert_eq!(result.nodes[0]["name"], json!("Heading"));
        assert_eq!(result.nodes[0]["props"]["level"], json!(2));
        assert!(result.html.unwrap().starts_with("<Heading "));
    }

    #[test]
    fn test_custom_registry_and_options() {
        let config = InternalRendererConfig::new(Some(RendererConfig {
            allow_list: Some(json!({ "div": ["class"] })),
            registry: Some(json!({
                "builtinBlocks": false,
                "rules": [{ "component": "Box", "classList": ["box"] }]
            })),
            forward_block_attributes: Some(true),
            ..RendererConfig::default()
        }))
        .unwrap();
        let result = config
            .render(r#"<div class="box" id="x"><span>t</span></div>"#, None, true)
            .unwrap();
        assert_eq!(
            result.html.as_deref(),
            Some(r#"<Box className="box" htmlAttributes="{&quot;class&quot;:&quot;box&quot;}" tagName="div">t</Box>"#)
        );
    }

    #[test]
    fn test_invalid_registry_is_a_config_error() {
        let err = InternalRendererConfig::new(Some(RendererConfig {
            registry: Some(json!({ "rules": [{ "component": "X" }] })),
            ..RendererConfig::default()
        }))
        .err()
        .unwrap();
        assert!(matches!(err, HeadlessError::Config { .. }));
    }

    #[test]
    fn test_batch_renders_in_parallel() {
        let config = InternalRendererConfig::new(None).unwrap();
        let inputs = (0..8)
            .map(|i| input(&format!("post-{i}"), &format!("<p>{i}</p>")))
            .collect();
        let batch = config.render_batch(
            inputs,
            BatchOptions {
                max_threads: Some(2),
                include_html: Some(true),
                ..BatchOptions::default()
            },
        );
        assert_eq!(batch.stats.total, 8);
        assert_eq!(batch.stats.succeeded, 8);
        assert_eq!(batch.results[3].id, "post-3");
        assert_eq!(
            batch.results[3].result.as_ref().and_then(|r| r.html.as_deref()),
            Some("<p>3</p>")
        );
    }

    #[test]
    fn test_sequential_batch_keeps_order() {
        let config = InternalRendererConfig::new(None).unwrap();
        let batch = config.render_batch(
            vec![input("a", "<p>a</p>"), input("b", "<i>b</i>")],
            BatchOptions {
                continue_on_error: Some(false),
                ..BatchOptions::default()
            },
        );
        let ids: Vec<_> = batch.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(batch.stats.failed, 0);
        assert!(batch.results[1].result.as_ref().unwrap().html.is_none());
    }
}
