pub mod plugin;
pub mod registry;

pub use plugin::{CommandOutcome, Plugin, PluginInstance};
pub use registry::PluginRegistry;
