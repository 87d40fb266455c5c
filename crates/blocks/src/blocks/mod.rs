//! Built-in adapters for known block types.
//!
//! Each adapter is a [`Rule`] that recognizes one block and emits a named
//! component with typed props. Block metadata is always read from the node
//! here, whether or not the renderer forwards it.

mod file;
mod heading;
mod image;
mod link;
mod verse;

pub use file::{FileBlock, FileProps};
pub use heading::{HeadingBlock, HeadingProps};
pub use image::{ImageBlock, ImageProps};
pub use link::{LinkBlock, LinkProps};
pub use verse::{VerseBlock, VerseProps};

use crate::renderer::{BlockContext, Props, Rule};
use headwp_core::{BlockMetadata, StyleMap};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Props shared by every block adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockProps {
    /// Block name (`core/heading`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The node's `class` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Raw block attributes.
    pub attributes: Map<String, Value>,
    /// Parsed inline style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMap>,
}

impl BlockProps {
    /// Builds the shared props from a matched node and its metadata.
    pub fn new(ctx: &BlockContext<'_>, metadata: &BlockMetadata) -> Self {
        Self {
            name: metadata.name.clone(),
            class_name: metadata.class_name.clone(),
            attributes: metadata.attributes.clone(),
            style: ctx.style.clone(),
        }
    }
}

/// The five built-in adapters, in evaluation order.
pub fn default_blocks() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(HeadingBlock::default()),
        Box::new(ImageBlock::default()),
        Box::new(FileBlock::default()),
        Box::new(VerseBlock::default()),
        Box::new(LinkBlock::default()),
    ]
}

/// Serializes typed props into the props object of a component node.
pub(crate) fn to_props<T: Serialize>(props: &T) -> Props {
    match serde_json::to_value(props) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::warn!("Block props serialized to a non-object: {}", other);
            Props::new()
        }
        Err(err) => {
            log::warn!("Could not serialize block props: {}", err);
            Props::new()
        }
    }
}

/// Integral values become JSON integers; non-finite values are dropped.
pub(crate) fn json_number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}
