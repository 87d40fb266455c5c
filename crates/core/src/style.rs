//! Inline `style` attribute parsing.

use serde::Serialize;

/// Parsed inline style declarations, in source order, with React-style keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    /// Returns the value for a camelCase property name.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a property, replacing an existing declaration.
    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    /// Iterates declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no declarations were parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes back to a CSS declaration list (`display: flex;`).
    pub fn to_css(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{}: {};", kebab_case_property(key), value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for StyleMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl From<&StyleMap> for serde_json::Value {
    fn from(style: &StyleMap) -> Self {
        let map = style
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Parses a `style` attribute value.
///
/// Declarations without a `:` or with an empty property or value are skipped.
pub fn parse_style(input: &str) -> StyleMap {
    let mut style = StyleMap::default();
    for declaration in split_declarations(input) {
        let Some((property, value)) = declaration.split_once(':') else {
            log::debug!("Skipping malformed style declaration: {}", declaration);
            continue;
        };
        let property = property.trim();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        style.insert(camel_case_property(property), value);
    }
    style
}

/// Splits on `;` outside of parentheses and quotes (`url(a;b)` stays whole).
fn split_declarations(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

/// `background-color` -> `backgroundColor`, `-webkit-transition` -> `WebkitTransition`,
/// `-ms-transform` -> `msTransform`. Custom properties are kept verbatim.
pub fn camel_case_property(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }

    let lower = property.to_ascii_lowercase();
    let trimmed = match lower.strip_prefix("-ms-") {
        Some(rest) => format!("ms-{rest}"),
        None => lower
            .strip_prefix('-')
            .map(str::to_string)
            .unwrap_or_else(|| lower.clone()),
    };
    let capitalize_first = lower.starts_with('-') && !lower.starts_with("-ms-");

    let mut out = String::with_capacity(trimmed.len());
    let mut upper_next = capitalize_first;
    for ch in trimmed.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn kebab_case_property(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }

    let mut out = String::with_capacity(property.len() + 4);
    if property.starts_with("ms") && property[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
        out.push('-');
    }
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
