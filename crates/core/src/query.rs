use crate::HeadlessError;
use crate::config::{Settings, SiteSettings};
use serde::{Deserialize, Serialize};

/// A route path as received from the router: one string or catch-all segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathParam {
    /// A single path string.
    Single(String),
    /// Catch-all segments.
    Segments(Vec<String>),
}

/// Route parameters of an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    /// Host of the routed sub-site, if any.
    #[serde(default)]
    pub site: Option<String>,
    /// Route path.
    #[serde(default)]
    pub path: Option<PathParam>,
}

/// A route resolved against the settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery<'a> {
    /// Normalized route path (empty when the route has none).
    pub path: String,
    /// Settings of the routed site, or the global settings.
    pub site: &'a SiteSettings,
}

/// Joins catch-all segments into `/a/b`; single strings pass through.
pub fn convert_to_path(path: &PathParam) -> String {
    match path {
        PathParam::Single(path) => path.clone(),
        PathParam::Segments(segments) => {
            let mut out = String::new();
            for segment in segments {
                out.push('/');
                out.push_str(segment);
            }
            out
        }
    }
}

/// Resolves `route` against `settings`.
///
/// A routed site that is not configured fails with
/// [`HeadlessError::SiteNotFound`].
pub fn prepare_query<'a>(
    settings: &'a Settings,
    route: &RouteParams,
) -> Result<PreparedQuery<'a>, HeadlessError> {
    let site = match route.site.as_deref() {
        Some(host) => settings
            .site_by_host(host, None)
            .ok_or_else(|| HeadlessError::site_not_found(host))?,
        None => settings.global(),
    };

    Ok(PreparedQuery {
        path: route.path.as_ref().map(convert_to_path).unwrap_or_default(),
        site,
    })
}
