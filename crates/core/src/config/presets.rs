//! Built-in deployment presets.
//!
//! Each preset is a complete set of routing and lifecycle defaults for one
//! known single-page tool. Selected with `PRECACHE_PRESET`.

use serde::{Deserialize, Serialize};

use super::{AppConfig, DynamicPolicy};

/// Known deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Expense tracker: network-first for Firebase, Gemini and CDN hosts.
    ExpenseTracker,
    /// Health tracker: live data passes through, stale caches are kept.
    HealthTracker,
}

impl Preset {
    /// Parse a preset name as given in `PRECACHE_PRESET`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "expense-tracker" => Some(Preset::ExpenseTracker),
            "health-tracker" => Some(Preset::HealthTracker),
            _ => None,
        }
    }

    /// Configuration defaults for this preset.
    pub fn config(self) -> AppConfig {
        match self {
            Preset::ExpenseTracker => AppConfig {
                cache_name: "expense-tracker-v1".into(),
                assets: vec![
                    "./expenses.html".into(),
                    "./manifest.json".into(),
                    "https://fonts.googleapis.com/css2?family=Inconsolata:wght@300;400;500;600;700&display=swap".into(),
                ],
                dynamic_hosts: vec![
                    "googleapis.com".into(),
                    "firebaseio.com".into(),
                    "firestore.googleapis.com".into(),
                    "generativelanguage.googleapis.com".into(),
                    "gstatic.com".into(),
                    "cdn.jsdelivr.net".into(),
                ],
                dynamic_policy: DynamicPolicy::NetworkFirst,
                prune_stale: true,
                ..Default::default()
            },
            Preset::HealthTracker => AppConfig {
                cache_name: "health-tracker-v1".into(),
                assets: vec!["./health.html".into(), "./manifest.json".into()],
                dynamic_hosts: vec!["firebase".into(), "google".into()],
                dynamic_policy: DynamicPolicy::PassThrough,
                prune_stale: false,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Preset::from_name("expense-tracker"), Some(Preset::ExpenseTracker));
        assert_eq!(Preset::from_name(" Health-Tracker "), Some(Preset::HealthTracker));
        assert_eq!(Preset::from_name("letter-hunt"), None);
    }

    #[test]
    fn test_expense_tracker_preset() {
        let config = Preset::ExpenseTracker.config();
        assert_eq!(config.cache_name, "expense-tracker-v1");
        assert_eq!(config.assets.len(), 3);
        assert_eq!(config.dynamic_hosts.len(), 6);
        assert_eq!(config.dynamic_policy, DynamicPolicy::NetworkFirst);
        assert!(config.prune_stale);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_health_tracker_preset() {
        let config = Preset::HealthTracker.config();
        assert_eq!(config.cache_name, "health-tracker-v1");
        assert_eq!(config.assets, vec!["./health.html".to_string(), "./manifest.json".to_string()]);
        assert_eq!(config.dynamic_policy, DynamicPolicy::PassThrough);
        assert!(!config.prune_stale);
        assert!(config.skip_waiting);
        assert!(config.claim_clients);
        assert!(config.validate().is_ok());
    }
}
