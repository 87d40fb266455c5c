use thiserror::Error;

/// Errors surfaced by headwp.
///
/// Node-level problems (malformed inline styles, malformed block metadata)
/// never reach this type; they degrade to absent values during rendering.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// The HTML rewriter failed while sanitizing input.
    #[error("Sanitize error: {0}")]
    Sanitize(String),
    /// IO error while loading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration could not be deserialized or is invalid.
    #[error("Config error: {message}")]
    Config {
        /// Error message
        message: String,
    },
    /// A routed sub-site has no matching site record.
    #[error("Sub site not found, make sure to add {site} to your headless config")]
    SiteNotFound {
        /// The host or URL that was routed
        site: String,
    },
    /// The process-wide settings were already installed.
    #[error("Headless settings have already been initialized")]
    AlreadyInitialized,
    /// A rule predicate failed while the renderer was set to propagate failures.
    #[error("Predicate error in rule '{rule}': {source}")]
    Predicate {
        /// Name of the rule whose predicate failed
        rule: String,
        /// Underlying predicate failure
        #[source]
        source: PredicateError,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HeadlessError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a site-not-found error
    pub fn site_not_found(site: impl Into<String>) -> Self {
        Self::SiteNotFound { site: site.into() }
    }
}

impl From<serde_json::Error> for HeadlessError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(format!("invalid JSON config: {err}"))
    }
}

impl From<serde_yaml::Error> for HeadlessError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("invalid YAML config: {err}"))
    }
}

/// Failure raised by a rule predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PredicateError {
    /// Human-readable reason
    pub message: String,
}

impl PredicateError {
    /// Create a predicate error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_not_found_names_the_site() {
        let err = HeadlessError::site_not_found("js1.example.com");
        assert_eq!(
            err.to_string(),
            "Sub site not found, make sure to add js1.example.com to your headless config"
        );
    }

    #[test]
    fn predicate_error_keeps_rule_name() {
        let err = HeadlessError::Predicate {
            rule: "InternalLink".to_string(),
            source: PredicateError::new("href is not a URL"),
        };
        assert_eq!(
            err.to_string(),
            "Predicate error in rule 'InternalLink': href is not a URL"
        );
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err: HeadlessError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, HeadlessError::Config { .. }));
    }
}
