//! Strata command front end
//!
//! 模块声明顺序：被依赖的模块需要先声明
pub mod build_info;
pub mod logging;
pub mod command_registry;
pub mod diagnostic;
pub mod identity;
pub mod config;
pub mod output;
pub mod app;
pub mod help;
pub mod commands;
pub mod startup;

pub use app::{App, Invocation};
pub use command_registry::{CliError, Command, Flag, Registry, RegistryError};
pub use startup::{Bootstrap, BootstrapError};
