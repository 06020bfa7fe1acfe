//! Configuration schema definitions.
//!
//! This module defines the structure of `dynamics/config.yaml`.
//! All types derive `Deserialize` for loading from the config file.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Alias name to configured target.
///
/// A `None` value means the alias was declared with no target (`name:` in YAML).
pub type AliasTable = BTreeMap<String, Option<String>>;

/// Root of the configuration document.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AliasConfig {
    /// Filesystem path aliases.
    #[serde(deserialize_with = "null_as_default")]
    pub paths: PathsConfig,

    /// Alias name to dotted `module.attribute` target.
    #[serde(deserialize_with = "null_as_default")]
    pub imports: AliasTable,

    /// Alias name to dotted module path.
    #[serde(deserialize_with = "null_as_default")]
    pub modules: AliasTable,

    /// Lifecycle task lists.
    #[serde(deserialize_with = "null_as_default")]
    pub background_tasks: BackgroundTasksConfig,
}

/// The `paths` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Alias name to path relative to the project root.
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: AliasTable,
}

/// The `background_tasks` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BackgroundTasksConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub on_startup: StartupTasksConfig,

    /// Import aliases run in order at shutdown, each isolated from the others.
    #[serde(deserialize_with = "null_as_default")]
    pub on_shutdown: Vec<String>,

    /// How long shutdown waits for background startup tasks before
    /// abandoning them (milliseconds, 0 = don't wait).
    pub shutdown_grace_ms: u64,
}

/// The `background_tasks.on_startup` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StartupTasksConfig {
    /// Import aliases run synchronously, in order, before startup completes.
    #[serde(rename = "non-thread", deserialize_with = "null_as_default")]
    pub non_thread: Vec<String>,

    /// Import aliases each launched on a detached background thread.
    #[serde(deserialize_with = "null_as_default")]
    pub threading: Vec<String>,
}

impl AliasConfig {
    /// Every task name referenced by the lifecycle lists, in declaration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        let tasks = &self.background_tasks;
        tasks
            .on_startup
            .non_thread
            .iter()
            .chain(tasks.on_startup.threading.iter())
            .chain(tasks.on_shutdown.iter())
            .map(String::as_str)
    }
}

/// Treat an explicit YAML `null` the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
