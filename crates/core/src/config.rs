//! Headless configuration, multi-site resolution and the process-wide settings slot.
//!
//! [`HeadlessConfig`] is the raw, user-authored configuration (JSON/YAML or
//! built in code). [`Settings`] is the resolved, immutable view: default post
//! types and taxonomies merged in, every site record resolved against the
//! global values once at construction.

use crate::HeadlessError;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// A WordPress post type exposed through the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostType {
    /// Post type slug (`post`, `page`, `book`).
    pub slug: String,
    /// REST endpoint (`/wp-json/wp/v2/posts`).
    pub endpoint: String,
    /// Route prefix of single entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single: Option<String>,
    /// Route of the archive page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
}

/// A WordPress taxonomy exposed through the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    /// Taxonomy slug (`category`, `post_tag`).
    pub slug: String,
    /// REST endpoint (`/wp-json/wp/v2/categories`).
    pub endpoint: String,
    /// Rewrite slug used in routes (`tag` for `post_tag`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<String>,
    /// Query parameter used when filtering posts by this taxonomy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_param: Option<String>,
    /// Post types the taxonomy applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<Vec<String>>,
}

/// What to do when WordPress reports a route as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectStrategy {
    /// Never look up redirects.
    #[default]
    None,
    /// Look up redirects only for routes that 404.
    #[serde(rename = "404")]
    NotFound,
    /// Look up redirects for every route.
    Always,
}

/// Debug switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfig {
    /// Verbose framework logging.
    #[serde(default)]
    pub dev_mode: bool,
    /// Log outgoing REST requests.
    #[serde(default)]
    pub requests: bool,
    /// Log redirect lookups.
    #[serde(default)]
    pub redirects: bool,
}

type Resolver<T> = Arc<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// User customization of a default list.
///
/// A list is prepended to the defaults. A resolver receives the defaults
/// and returns the final list.
#[derive(Clone)]
pub enum Customization<T> {
    /// Entries prepended to the defaults.
    List(Vec<T>),
    /// Function computing the final list from the defaults.
    Resolver(Resolver<T>),
}

impl<T> Customization<T> {
    /// Wraps a resolver function.
    pub fn resolver(f: impl Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static) -> Self {
        Self::Resolver(Arc::new(f))
    }

    fn apply(customization: Option<&Self>, defaults: Vec<T>) -> Vec<T>
    where
        T: Clone,
    {
        match customization {
            Some(Self::Resolver(resolve)) => resolve(defaults),
            Some(Self::List(custom)) => custom.iter().cloned().chain(defaults).collect(),
            None => defaults,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Customization<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(list) => f.debug_tuple("List").field(list).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Customization<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::List)
    }
}

/// One site of a multi-site deployment, as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Frontend host (`example.com`); inferred from `host_url` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Frontend URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    /// WordPress URL backing this site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Locale served by this site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Post types replacing the global list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_post_types: Option<Vec<PostType>>,
    /// Taxonomies replacing the global list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_taxonomies: Option<Vec<Taxonomy>>,
    /// Site redirect strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_strategy: Option<RedirectStrategy>,
    /// Whether the companion WordPress plugin is installed.
    #[serde(
        default,
        rename = "useWordPressPlugin",
        skip_serializing_if = "Option::is_none"
    )]
    pub use_wordpress_plugin: Option<bool>,
    /// Integration settings, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Value>,
    /// Preview settings, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Value>,
    /// Cache settings, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<Value>,
}

/// The authored headless configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlessConfig {
    /// WordPress URL.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Frontend URL.
    #[serde(default)]
    pub host_url: Option<String>,
    /// Post type customization.
    #[serde(default)]
    pub custom_post_types: Option<Customization<PostType>>,
    /// Taxonomy customization.
    #[serde(default)]
    pub custom_taxonomies: Option<Customization<Taxonomy>>,
    /// Redirect strategy, `none` when absent.
    #[serde(default)]
    pub redirect_strategy: Option<RedirectStrategy>,
    /// Whether the companion WordPress plugin is installed.
    #[serde(default, rename = "useWordPressPlugin")]
    pub use_wordpress_plugin: Option<bool>,
    /// Debug switches.
    #[serde(default)]
    pub debug: Option<DebugConfig>,
    /// Integration settings, passed through untouched.
    #[serde(default)]
    pub integrations: Option<Value>,
    /// Preview settings, passed through untouched.
    #[serde(default)]
    pub preview: Option<Value>,
    /// Cache settings, passed through untouched.
    #[serde(default)]
    pub cache: Option<Value>,
    /// Multi-site records.
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

impl HeadlessConfig {
    /// Parses a JSON configuration.
    pub fn from_json_str(input: &str) -> Result<Self, HeadlessError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parses a YAML configuration.
    pub fn from_yaml_str(input: &str) -> Result<Self, HeadlessError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Loads a `.json`, `.yaml` or `.yml` configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HeadlessError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            other => Err(HeadlessError::config(format!(
                "unsupported config extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Computes the final post type list from the defaults.
    pub fn with_post_types(
        mut self,
        resolve: impl Fn(Vec<PostType>) -> Vec<PostType> + Send + Sync + 'static,
    ) -> Self {
        self.custom_post_types = Some(Customization::resolver(resolve));
        self
    }

    /// Computes the final taxonomy list from the defaults.
    pub fn with_taxonomies(
        mut self,
        resolve: impl Fn(Vec<Taxonomy>) -> Vec<Taxonomy> + Send + Sync + 'static,
    ) -> Self {
        self.custom_taxonomies = Some(Customization::resolver(resolve));
        self
    }
}

/// Built-in post types (`page`, `post`).
pub fn default_post_types() -> Vec<PostType> {
    vec![
        PostType {
            slug: "page".to_string(),
            endpoint: "/wp-json/wp/v2/pages".to_string(),
            single: Some("/".to_string()),
            archive: None,
        },
        PostType {
            slug: "post".to_string(),
            endpoint: "/wp-json/wp/v2/posts".to_string(),
            single: Some("/".to_string()),
            archive: Some("/blog".to_string()),
        },
    ]
}

/// Built-in taxonomies (`category`, `post_tag`).
pub fn default_taxonomies() -> Vec<Taxonomy> {
    vec![
        Taxonomy {
            slug: "category".to_string(),
            endpoint: "/wp-json/wp/v2/categories".to_string(),
            rewrite: None,
            rest_param: Some("categories".to_string()),
            post_type: None,
        },
        Taxonomy {
            slug: "post_tag".to_string(),
            endpoint: "/wp-json/wp/v2/tags".to_string(),
            rewrite: Some("tag".to_string()),
            rest_param: Some("tags".to_string()),
            post_type: None,
        },
    ]
}

/// Fully resolved configuration for the global scope or one site.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// WordPress URL.
    pub source_url: Option<String>,
    /// Frontend URL, empty when unset.
    pub host_url: String,
    /// Frontend host (sites only).
    pub host: Option<String>,
    /// Locale served (sites only).
    pub locale: Option<String>,
    /// Available post types.
    pub custom_post_types: Vec<PostType>,
    /// Available taxonomies.
    pub custom_taxonomies: Vec<Taxonomy>,
    /// Redirect strategy.
    pub redirect_strategy: RedirectStrategy,
    /// Whether the companion WordPress plugin is installed.
    #[serde(rename = "useWordPressPlugin")]
    pub use_wordpress_plugin: bool,
    /// Integration settings.
    pub integrations: Option<Value>,
    /// Preview settings.
    pub preview: Option<Value>,
    /// Cache settings.
    pub cache: Option<Value>,
    /// Debug switches (inherited from the global config).
    pub debug: DebugConfig,
}

impl SiteSettings {
    /// Finds a post type by slug.
    pub fn post_type(&self, slug: &str) -> Option<&PostType> {
        self.custom_post_types.iter().find(|pt| pt.slug == slug)
    }

    /// Finds a taxonomy by slug.
    pub fn taxonomy(&self, slug: &str) -> Option<&Taxonomy> {
        self.custom_taxonomies.iter().find(|tax| tax.slug == slug)
    }
}

/// Resolved, immutable headless settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(flatten)]
    global: SiteSettings,
    sites: Vec<SiteSettings>,
}

impl Settings {
    /// Resolves an authored configuration.
    pub fn new(config: HeadlessConfig) -> Self {
        let global = SiteSettings {
            source_url: config.source_url,
            host_url: config.host_url.unwrap_or_default(),
            host: None,
            locale: None,
            custom_post_types: Customization::apply(
                config.custom_post_types.as_ref(),
                default_post_types(),
            ),
            custom_taxonomies: Customization::apply(
                config.custom_taxonomies.as_ref(),
                default_taxonomies(),
            ),
            redirect_strategy: config.redirect_strategy.unwrap_or_default(),
            use_wordpress_plugin: config.use_wordpress_plugin.unwrap_or(false),
            integrations: config.integrations,
            preview: config.preview,
            cache: config.cache,
            debug: config.debug.unwrap_or_default(),
        };

        let sites = config
            .sites
            .into_iter()
            .map(|site| resolve_site(site, &global))
            .collect();

        Self { global, sites }
    }

    /// The global settings.
    pub fn global(&self) -> &SiteSettings {
        &self.global
    }

    /// Every resolved site, in configuration order.
    pub fn sites(&self) -> &[SiteSettings] {
        &self.sites
    }

    /// Finds the first site serving `host_or_url`, optionally for `locale`.
    ///
    /// `http(s)://` URLs are reduced to their `host[:port]` before matching.
    pub fn site_by_host(&self, host_or_url: &str, locale: Option<&str>) -> Option<&SiteSettings> {
        let host = normalize_host(host_or_url);
        let locale = locale.filter(|l| !l.is_empty());
        self.sites.iter().find(|site| {
            site.host.as_deref() == Some(host.as_str())
                && locale.is_none_or(|l| site.locale.as_deref() == Some(l))
        })
    }

    /// Finds the site whose source URL equals `source_url`.
    pub fn site_by_source_url(&self, source_url: &str) -> Option<&SiteSettings> {
        self.sites
            .iter()
            .find(|site| site.source_url.as_deref() == Some(source_url))
    }

    fn scope(&self, source_url: Option<&str>) -> &SiteSettings {
        source_url
            .and_then(|url| self.site_by_source_url(url))
            .unwrap_or(&self.global)
    }

    /// Post types of the site with `source_url`, or the global list.
    pub fn custom_post_types(&self, source_url: Option<&str>) -> &[PostType] {
        &self.scope(source_url).custom_post_types
    }

    /// Post type slugs of the site with `source_url`, or the global list.
    pub fn custom_post_type_slugs(&self, source_url: Option<&str>) -> Vec<&str> {
        self.custom_post_types(source_url)
            .iter()
            .map(|pt| pt.slug.as_str())
            .collect()
    }

    /// Finds a post type by slug.
    pub fn custom_post_type(&self, slug: &str, source_url: Option<&str>) -> Option<&PostType> {
        self.scope(source_url).post_type(slug)
    }

    /// Taxonomies of the site with `source_url`, or the global list.
    pub fn custom_taxonomies(&self, source_url: Option<&str>) -> &[Taxonomy] {
        &self.scope(source_url).custom_taxonomies
    }

    /// Taxonomy slugs of the site with `source_url`, or the global list.
    pub fn custom_taxonomy_slugs(&self, source_url: Option<&str>) -> Vec<&str> {
        self.custom_taxonomies(source_url)
            .iter()
            .map(|tax| tax.slug.as_str())
            .collect()
    }

    /// Finds a taxonomy by slug.
    pub fn custom_taxonomy(&self, slug: &str, source_url: Option<&str>) -> Option<&Taxonomy> {
        self.scope(source_url).taxonomy(slug)
    }

    /// The global WordPress URL, empty when unset.
    pub fn wp_url(&self) -> &str {
        self.global.source_url.as_deref().unwrap_or_default()
    }

    /// The global frontend URL, empty when unset.
    pub fn host_url(&self) -> &str {
        &self.global.host_url
    }
}

impl From<HeadlessConfig> for Settings {
    fn from(config: HeadlessConfig) -> Self {
        Self::new(config)
    }
}

fn resolve_site(site: SiteConfig, global: &SiteSettings) -> SiteSettings {
    let host = site
        .host
        .or_else(|| site.host_url.as_deref().and_then(host_of));

    SiteSettings {
        source_url: site.source_url.or_else(|| global.source_url.clone()),
        host_url: site.host_url.unwrap_or_default(),
        host,
        locale: site.locale,
        custom_post_types: site
            .custom_post_types
            .unwrap_or_else(|| global.custom_post_types.clone()),
        custom_taxonomies: site
            .custom_taxonomies
            .unwrap_or_else(|| global.custom_taxonomies.clone()),
        redirect_strategy: site.redirect_strategy.unwrap_or(global.redirect_strategy),
        use_wordpress_plugin: site.use_wordpress_plugin.unwrap_or(false)
            || global.use_wordpress_plugin,
        integrations: site.integrations.or_else(|| global.integrations.clone()),
        preview: site.preview.or_else(|| global.preview.clone()),
        cache: site.cache.or_else(|| global.cache.clone()),
        debug: global.debug,
    }
}

/// `host[:port]` of a URL.
fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn normalize_host(host_or_url: &str) -> String {
    if host_or_url.starts_with("https://") || host_or_url.starts_with("http://") {
        if let Some(host) = host_of(host_or_url) {
            return host;
        }
    }
    host_or_url.to_string()
}

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Installs the process-wide settings.
///
/// Succeeds once per process; later calls fail with
/// [`HeadlessError::AlreadyInitialized`].
pub fn set_config(settings: Settings) -> Result<&'static Settings, HeadlessError> {
    SETTINGS
        .try_insert(settings)
        .map_err(|_| HeadlessError::AlreadyInitialized)
}

/// Returns the process-wide settings, if installed.
pub fn get_config() -> Option<&'static Settings> {
    SETTINGS.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multisite() -> Settings {
        HeadlessConfig::from_json_str(
            r#"{
                "sourceUrl": "https://wp.example.com",
                "hostUrl": "https://example.com",
                "redirectStrategy": "404",
                "customPostTypes": [
                    { "slug": "book", "endpoint": "/wp-json/wp/v2/book", "single": "/book" }
                ],
                "sites": [
                    { "host": "example.com", "locale": "en", "sourceUrl": "https://wp.example.com/en" },
                    { "hostUrl": "http://localhost:3001", "locale": "es", "sourceUrl": "https://wp.example.com/es",
                      "customTaxonomies": [{ "slug": "genre", "endpoint": "/wp-json/wp/v2/genre" }],
                      "redirectStrategy": "always" },
                    { "host": "example.com", "locale": "pt", "sourceUrl": "https://wp.example.com/pt" }
                ]
            }"#,
        )
        .map(Settings::new)
        .unwrap()
    }

    #[test]
    fn merges_list_customizations_before_defaults() {
        let settings = multisite();
        assert_eq!(
            settings.custom_post_type_slugs(None),
            vec!["book", "page", "post"]
        );
        assert_eq!(
            settings.custom_taxonomy_slugs(None),
            vec!["category", "post_tag"]
        );
        assert_eq!(settings.global().redirect_strategy, RedirectStrategy::NotFound);
        assert_eq!(settings.wp_url(), "https://wp.example.com");
        assert_eq!(settings.host_url(), "https://example.com");
    }

    #[test]
    fn resolver_customization_wins() {
        let config = HeadlessConfig {
            custom_post_types: Some(Customization::List(vec![PostType {
                slug: "ignored".to_string(),
                endpoint: "/x".to_string(),
                single: None,
                archive: None,
            }])),
            ..HeadlessConfig::default()
        }
        .with_post_types(|defaults| defaults.into_iter().filter(|pt| pt.slug == "post").collect());

        let settings = Settings::new(config);
        assert_eq!(settings.custom_post_type_slugs(None), vec!["post"]);
    }

    #[test]
    fn defaults_apply_without_config() {
        let settings = Settings::new(HeadlessConfig::default());
        assert_eq!(settings.custom_post_types(None), default_post_types().as_slice());
        assert_eq!(settings.global().redirect_strategy, RedirectStrategy::None);
        assert!(!settings.global().use_wordpress_plugin);
        assert_eq!(settings.wp_url(), "");
        assert!(settings.sites().is_empty());
    }

    #[test]
    fn site_by_host_normalizes_urls() {
        let settings = multisite();
        let site = settings.site_by_host("https://example.com/foo", None).unwrap();
        assert_eq!(site.source_url.as_deref(), Some("https://wp.example.com/en"));

        let bare = settings.site_by_host("example.com", None).unwrap();
        assert_eq!(bare, site);
    }

    #[test]
    fn site_by_host_filters_by_locale() {
        let settings = multisite();
        let pt = settings.site_by_host("example.com", Some("pt")).unwrap();
        assert_eq!(pt.source_url.as_deref(), Some("https://wp.example.com/pt"));
        assert!(settings.site_by_host("example.com", Some("fr")).is_none());
        assert_eq!(
            settings.site_by_host("example.com", Some("")).unwrap().locale.as_deref(),
            Some("en")
        );
    }

    #[test]
    fn infers_host_from_host_url() {
        let settings = multisite();
        let es = settings.site_by_host("http://localhost:3001/blog", None).unwrap();
        assert_eq!(es.host.as_deref(), Some("localhost:3001"));
        assert_eq!(es.redirect_strategy, RedirectStrategy::Always);
    }

    #[test]
    fn unknown_host_is_absent() {
        assert!(multisite().site_by_host("nope.com", None).is_none());
    }

    #[test]
    fn site_overrides_merge_over_globals() {
        let settings = multisite();
        let en = settings.site_by_source_url("https://wp.example.com/en").unwrap();
        assert_eq!(en.redirect_strategy, RedirectStrategy::NotFound);
        assert_eq!(en.custom_post_types, settings.global().custom_post_types);

        let es = settings.site_by_source_url("https://wp.example.com/es").unwrap();
        assert_eq!(
            settings.custom_taxonomy_slugs(Some("https://wp.example.com/es")),
            vec!["genre"]
        );
        assert_eq!(es.host_url, "http://localhost:3001");
        assert!(settings.site_by_source_url("https://wp.example.com/fr").is_none());
    }

    #[test]
    fn accessors_fall_back_to_global_scope() {
        let settings = multisite();
        assert_eq!(
            settings.custom_taxonomy_slugs(Some("https://unknown.example.com")),
            vec!["category", "post_tag"]
        );
        assert_eq!(
            settings
                .custom_taxonomy("post_tag", None)
                .and_then(|t| t.rewrite.as_deref()),
            Some("tag")
        );
        assert!(settings.custom_post_type("book", None).is_some());
        assert!(
            settings
                .custom_post_type("book", Some("https://wp.example.com/es"))
                .is_some()
        );
    }

    #[test]
    fn parses_yaml_config() {
        let config = HeadlessConfig::from_yaml_str(
            "sourceUrl: https://wp.example.com\nuseWordPressPlugin: true\nsites:\n  - host: a.com\n",
        )
        .unwrap();
        let settings = Settings::new(config);
        assert!(settings.global().use_wordpress_plugin);
        assert!(settings.site_by_host("a.com", None).unwrap().use_wordpress_plugin);
    }

    #[test]
    fn rejects_invalid_redirect_strategy() {
        let err = HeadlessConfig::from_json_str(r#"{"redirectStrategy": "sometimes"}"#).unwrap_err();
        assert!(matches!(err, HeadlessError::Config { .. }));
    }

    #[test]
    fn global_slot_initializes_once() {
        let installed = set_config(multisite()).unwrap();
        assert_eq!(installed.wp_url(), "https://wp.example.com");
        assert!(get_config().is_some());
        assert!(matches!(
            set_config(Settings::default()),
            Err(HeadlessError::AlreadyInitialized)
        ));
    }
}
