//! # Feature Flags View State

use serde::{Deserialize, Serialize};

/// One feature flag as the admin page sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    /// Stable flag name (the mutation key)
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Whether the flag is currently enabled
    pub is_enabled: bool,
    /// Whether disabling this flag requires a stated reason
    #[serde(default)]
    pub requires_reason_to_disable: bool,
    /// Last change time (ms since epoch), server-derived
    #[serde(default)]
    pub updated_at: Option<u64>,
    /// Who last changed it, server-derived
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Feature flags state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagsState {
    /// All flags, in server order
    pub flags: Vec<FeatureFlag>,
}

impl FlagsState {
    /// Look up a flag by name
    pub fn flag(&self, name: &str) -> Option<&FeatureFlag> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    /// Pure transition: the same state with one flag's enablement changed.
    ///
    /// Unknown names return the state unchanged.
    pub fn with_flag_enabled(&self, name: &str, enabled: bool) -> Self {
        let flags = self
            .flags
            .iter()
            .map(|flag| {
                if flag.name == name {
                    FeatureFlag {
                        is_enabled: enabled,
                        ..flag.clone()
                    }
                } else {
                    flag.clone()
                }
            })
            .collect();
        Self { flags }
    }
}
