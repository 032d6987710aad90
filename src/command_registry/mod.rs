//! Command Registry Module
//!
//! 提供子命令与参数的注册、前缀补全建议

pub mod errors;
pub mod flags;
pub mod registry;
pub mod trie;

#[cfg(test)]
mod tests;

pub use errors::{CliError, RegistryError};
pub use flags::{Flag, FlagKind, FlagRegistry, FlagScope};
pub use registry::{Command, CommandAction, CommandRegistry, Registry};
pub use trie::PrefixTrie;
