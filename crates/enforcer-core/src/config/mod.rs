//! Configuration for escalation runs
//!
//! Values come from two layers:
//! - File: `enforcer.toml` in the config directory (or `--config`)
//! - Parameters: positional values passed by the management agent, which win

pub mod parser;
pub mod paths;
pub mod schema;
pub mod settings;
pub mod store;

pub use parser::{parse_enforcer_toml, parse_enforcer_toml_str};
pub use schema::{
    ApiConfigEntry, AttributeConfigEntry, EnforcerConfig, EscalationConfigEntry, PromptConfigEntry,
    PromptMode, TriggerConfigEntry, UpdaterConfigEntry,
};
pub use settings::{
    ApiSettings, EscalationSettings, ParameterOverrides, RunSettings, parse_base_url,
    resolve_limit,
};
pub use store::ConfigStore;
