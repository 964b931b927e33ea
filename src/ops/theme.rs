use std::fmt;
use std::str::FromStr;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::io::store::{KeyValueStore, THEME_KEY};

/// Light or dark presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn flipped(self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Effective theme = explicit preference if one is stored, else the system's.
///
/// Toggling back to whatever the system prefers forgets the explicit
/// preference, so later system changes are followed again.
pub struct ThemeManager {
    store: Box<dyn KeyValueStore>,
    explicit: Option<ThemeMode>,
    system: ThemeMode,
}

impl ThemeManager {
    pub fn load(store: Box<dyn KeyValueStore>, system: ThemeMode) -> Self {
        let explicit = match store.get(THEME_KEY) {
            Ok(Some(raw)) => match raw.parse::<ThemeMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    warn!("event=theme_load status=invalid error=\"{}\"", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("event=theme_load status=error error=\"{}\"", e);
                None
            }
        };
        ThemeManager {
            store,
            explicit,
            system,
        }
    }

    pub fn effective(&self) -> ThemeMode {
        self.explicit.unwrap_or(self.system)
    }

    pub fn explicit(&self) -> Option<ThemeMode> {
        self.explicit
    }

    pub fn system(&self) -> ThemeMode {
        self.system
    }

    /// Flip the effective theme. Returns the new effective theme.
    pub fn toggle(&mut self) -> ThemeMode {
        let next = self.effective().flipped();
        let result = if next == self.system {
            self.explicit = None;
            self.store.remove(THEME_KEY)
        } else {
            self.explicit = Some(next);
            self.store.set(THEME_KEY, next.as_str())
        };
        if let Err(e) = result {
            error!("event=theme_save status=error error=\"{}\"", e);
        }
        info!(
            "event=theme_toggle theme={} follows_system={}",
            next,
            self.explicit.is_none()
        );
        next
    }

    /// Record a new system preference. Returns the new effective theme when
    /// it changed (only possible while following the system).
    pub fn system_changed(&mut self, system: ThemeMode) -> Option<ThemeMode> {
        let before = self.effective();
        self.system = system;
        let after = self.effective();
        (before != after).then_some(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;

    #[test]
    fn follows_system_without_preference() {
        let mgr = ThemeManager::load(Box::new(MemoryStore::new()), ThemeMode::Dark);
        assert_eq!(mgr.effective(), ThemeMode::Dark);
        assert_eq!(mgr.explicit(), None);
    }

    #[test]
    fn stored_preference_wins() {
        let store = MemoryStore::with_value(THEME_KEY, "light");
        let mgr = ThemeManager::load(Box::new(store), ThemeMode::Dark);
        assert_eq!(mgr.effective(), ThemeMode::Light);
    }

    #[test]
    fn invalid_stored_value_is_ignored() {
        let store = MemoryStore::with_value(THEME_KEY, "sepia");
        let mgr = ThemeManager::load(Box::new(store), ThemeMode::Light);
        assert_eq!(mgr.effective(), ThemeMode::Light);
        assert_eq!(mgr.explicit(), None);
    }

    #[test]
    fn toggle_away_from_system_persists_choice() {
        let store = MemoryStore::new();
        let mut mgr = ThemeManager::load(Box::new(store.clone()), ThemeMode::Dark);
        assert_eq!(mgr.toggle(), ThemeMode::Light);
        assert_eq!(mgr.explicit(), Some(ThemeMode::Light));
        assert_eq!(store.value(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn toggle_back_to_system_clears_choice() {
        let store = MemoryStore::with_value(THEME_KEY, "light");
        let mut mgr = ThemeManager::load(Box::new(store.clone()), ThemeMode::Dark);
        assert_eq!(mgr.toggle(), ThemeMode::Dark);
        assert_eq!(mgr.explicit(), None);
        assert_eq!(store.value(THEME_KEY), None);
    }

    #[test]
    fn system_change_applies_only_when_following() {
        let mut mgr = ThemeManager::load(Box::new(MemoryStore::new()), ThemeMode::Dark);
        assert_eq!(mgr.system_changed(ThemeMode::Light), Some(ThemeMode::Light));
        assert_eq!(mgr.system_changed(ThemeMode::Light), None);

        // Explicit dark while system is light
        mgr.toggle();
        assert_eq!(mgr.explicit(), Some(ThemeMode::Dark));
        assert_eq!(mgr.system_changed(ThemeMode::Dark), None);
        assert_eq!(mgr.effective(), ThemeMode::Dark);
        assert_eq!(mgr.system_changed(ThemeMode::Light), None);
        assert_eq!(mgr.effective(), ThemeMode::Dark);
    }
}
