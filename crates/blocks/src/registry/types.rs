//! Registry type definitions for declarative component rules.

use crate::blocks::default_blocks;
use crate::renderer::{BlocksRenderer, ComponentRule, RenderOptions, Rule, Selector};
use headwp_core::HeadlessError;
use serde::{Deserialize, Serialize};

fn default_builtin_blocks() -> bool {
    true
}

/// Configuration for the rule registry passed from JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Prepend the built-in block adapters to `rules`.
    #[serde(default = "default_builtin_blocks")]
    pub builtin_blocks: bool,
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            builtin_blocks: true,
            rules: Vec::new(),
        }
    }
}

/// A single declarative rule.
///
/// Every criterion that is set must hold for an element to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Component emitted for matching elements.
    pub component: String,
    /// Required tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// Classes that must all be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_list: Vec<String>,
    /// Required `data-wp-block-name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    /// Require an `<a href>` that is (or is not) internal to the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_link: Option<bool>,
    /// Descendants dropped from the component's children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Selector>,
}

impl RuleDefinition {
    /// Returns true if at least one match criterion is set.
    pub fn has_criteria(&self) -> bool {
        self.tag_name.is_some()
            || !self.class_list.is_empty()
            || self.block_name.is_some()
            || self.internal_link.is_some()
    }

    /// Builds the rule.
    pub fn to_rule(&self) -> Result<ComponentRule, HeadlessError> {
        if self.component.trim().is_empty() {
            return Err(HeadlessError::config("registry rule has an empty component name"));
        }
        if !self.has_criteria() {
            return Err(HeadlessError::config(format!(
                "registry rule for '{}' needs tagName, classList, blockName or internalLink",
                self.component
            )));
        }

        let mut rule =
            ComponentRule::new(&self.component).class_list(self.class_list.iter().cloned());
        if let Some(tag_name) = &self.tag_name {
            rule = rule.tag_name(tag_name);
        }
        if let Some(block_name) = &self.block_name {
            rule = rule.block_name(block_name);
        }
        if let Some(internal) = self.internal_link {
            rule = rule.internal_link(internal);
        }
        if let Some(exclude) = &self.exclude
            && !exclude.is_empty()
        {
            rule = rule.exclude(exclude.clone());
        }
        Ok(rule)
    }
}

impl RegistryConfig {
    /// Parses a registry from JSON.
    pub fn from_json_str(input: &str) -> Result<Self, HeadlessError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Builds the rules in evaluation order.
    pub fn build_rules(&self) -> Result<Vec<Box<dyn Rule>>, HeadlessError> {
        let mut rules = if self.builtin_blocks {
            default_blocks()
        } else {
            Vec::new()
        };
        for definition in &self.rules {
            rules.push(Box::new(definition.to_rule()?));
        }
        Ok(rules)
    }

    /// Builds a renderer over the registry's rules.
    pub fn renderer(&self, options: RenderOptions) -> Result<BlocksRenderer, HeadlessError> {
        Ok(BlocksRenderer::new(self.build_rules()?).with_options(options))
    }

    /// Get the definition emitting a component.
    pub fn get_rule(&self, component: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.component == component)
    }
}
