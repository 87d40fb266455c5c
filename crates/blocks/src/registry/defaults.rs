//! Default registry configurations.

use super::types::{RegistryConfig, RuleDefinition};
use crate::renderer::Selector;

/// Component names of the built-in adapters, in evaluation order.
pub const BUILTIN_COMPONENTS: &[&str] = &["Heading", "Image", "File", "Verse", "Link"];

/// Creates the default registry: built-in adapters only.
///
/// # Example
///
/// ```
/// use headwp_blocks::registry::defaults::default_block_registry;
///
/// let registry = default_block_registry();
/// assert!(registry.builtin_blocks);
/// assert_eq!(registry.build_rules().unwrap().len(), 5);
/// ```
pub fn default_block_registry() -> RegistryConfig {
    RegistryConfig::default()
}

/// Creates a registry mapping common layout blocks to components.
///
/// Table captions are dropped from the `Table` children.
pub fn layout_registry() -> RegistryConfig {
    RegistryConfig {
        builtin_blocks: true,
        rules: vec![
            class_rule("Group", "div", "wp-block-group"),
            class_rule("Columns", "div", "wp-block-columns"),
            class_rule("Column", "div", "wp-block-column"),
            class_rule("Buttons", "div", "wp-block-buttons"),
            RuleDefinition {
                exclude: Some(Selector::tag("figcaption")),
                ..class_rule("Table", "figure", "wp-block-table")
            },
        ],
    }
}

fn class_rule(component: &str, tag_name: &str, class_name: &str) -> RuleDefinition {
    RuleDefinition {
        component: component.to_string(),
        tag_name: Some(tag_name.to_string()),
        class_list: vec![class_name.to_string()],
        block_name: None,
        internal_link: None,
        exclude: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_builtins() {
        let rules = default_block_registry().build_rules().unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, BUILTIN_COMPONENTS);
    }

    #[test]
    fn test_layout_registry_appends_after_builtins() {
        let registry = layout_registry();
        let rules = registry.build_rules().unwrap();
        assert_eq!(rules.len(), BUILTIN_COMPONENTS.len() + 5);
        assert_eq!(rules[BUILTIN_COMPONENTS.len()].name(), "Group");
        assert_eq!(
            registry.get_rule("Table").and_then(|r| r.exclude.clone()),
            Some(Selector::tag("figcaption"))
        );
    }
}
