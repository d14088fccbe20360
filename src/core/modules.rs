//! Toggleable metric modules and the configuration surface that enables them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::HudError;

/// Identifier of one toggleable metric module.
///
/// Frame rate is deliberately absent: it always runs and is never part of the
/// enabled-module set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    Cpu,
    Ram,
    Net,
    Temp,
    Thermal,
    Ping,
}

impl ModuleId {
    /// Every toggleable module, in reconciliation order.
    pub const ALL: [ModuleId; 6] = [
        ModuleId::Cpu,
        ModuleId::Ram,
        ModuleId::Net,
        ModuleId::Temp,
        ModuleId::Thermal,
        ModuleId::Ping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Cpu => "cpu",
            ModuleId::Ram => "ram",
            ModuleId::Net => "net",
            ModuleId::Temp => "temp",
            ModuleId::Thermal => "thermal",
            ModuleId::Ping => "ping",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = HudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(ModuleId::Cpu),
            "ram" => Ok(ModuleId::Ram),
            "net" => Ok(ModuleId::Net),
            "temp" => Ok(ModuleId::Temp),
            "thermal" => Ok(ModuleId::Thermal),
            "ping" => Ok(ModuleId::Ping),
            other => Err(HudError::UnknownModule(other.to_string())),
        }
    }
}

/// Set of currently enabled modules.
pub type ModuleSet = BTreeSet<ModuleId>;

/// Configuration handle the embedding application writes and the engine observes.
///
/// Wraps a `watch` channel so subscribers always see the current set immediately
/// on subscription, then every later change.
pub struct ModuleToggles {
    tx: watch::Sender<ModuleSet>,
}

impl ModuleToggles {
    pub fn new(initial: ModuleSet) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// All six modules enabled.
    pub fn all() -> Self {
        Self::new(ModuleId::ALL.into_iter().collect())
    }

    /// Replace the enabled set wholesale.
    pub fn set(&self, modules: ModuleSet) {
        let _ = self.tx.send(modules);
    }

    pub fn enable(&self, id: ModuleId) {
        self.tx.send_modify(|set| {
            set.insert(id);
        });
    }

    pub fn disable(&self, id: ModuleId) {
        self.tx.send_modify(|set| {
            set.remove(&id);
        });
    }

    pub fn current(&self) -> ModuleSet {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModuleSet> {
        self.tx.subscribe()
    }
}

impl Default for ModuleToggles {
    fn default() -> Self {
        Self::new(ModuleSet::new())
    }
}
