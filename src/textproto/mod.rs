//! Lenient textproto reader: line parser, record tree and key normalization.

/// Dynamically shaped record tree.
pub mod node;
/// snake_case → camelCase key transform.
pub mod normalize;
/// Line-oriented record parser.
pub mod parse;
