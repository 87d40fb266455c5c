#![deny(missing_docs)]
//! headwp blocks: block matching, substitution and render trees.

/// Built-in block adapters.
pub mod blocks;
/// HTML serialization of render trees.
pub mod codegen;
/// Declarative rule registry.
pub mod registry;
/// Block matching and substitution engine.
pub mod renderer;

pub use blocks::{
    BlockProps, FileBlock, HeadingBlock, ImageBlock, LinkBlock, VerseBlock, default_blocks,
};
pub use codegen::to_html;
pub use registry::{RegistryConfig, RuleDefinition};
pub use renderer::{
    BlockContext, BlocksRenderer, ComponentRule, PredicateFailure, Props, RenderNode,
    RenderOptions, Rule, Selector,
};
