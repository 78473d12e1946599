use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

mod controller;

pub use controller::{ThemeController, THEME_STORE_KEY};

pub type ThemeResult<T> = std::result::Result<T, ThemeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("invalid theme preference {value:?}; expected light, dark or system")]
    InvalidPreference { value: String },
}

/// The user's theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Light,
    Dark,
    #[default]
    System,
}

impl Preference {
    pub const ALL: [Preference; 3] = [Preference::Light, Preference::Dark, Preference::System];

    pub const fn as_str(self) -> &'static str {
        match self {
            Preference::Light => "light",
            Preference::Dark => "dark",
            Preference::System => "system",
        }
    }

    /// Next step of the toggle cycle: light, dark, system, light.
    pub const fn next(self) -> Self {
        match self {
            Preference::Light => Preference::Dark,
            Preference::Dark => Preference::System,
            Preference::System => Preference::Light,
        }
    }

    /// Theme actually applied for this preference under the given environment signal.
    pub const fn resolve(self, prefers_dark: bool) -> ResolvedTheme {
        match self {
            Preference::Light => ResolvedTheme::Light,
            Preference::Dark => ResolvedTheme::Dark,
            Preference::System => ResolvedTheme::from_prefers_dark(prefers_dark),
        }
    }

    pub const fn follows_system(self) -> bool {
        matches!(self, Preference::System)
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = ThemeError;

    fn from_str(raw: &str) -> ThemeResult<Self> {
        Preference::ALL
            .into_iter()
            .find(|preference| preference.as_str() == raw)
            .ok_or_else(|| ThemeError::InvalidPreference {
                value: raw.to_string(),
            })
    }
}

/// Concrete theme applied to the UI. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ResolvedTheme::Dark
        } else {
            ResolvedTheme::Light
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, ResolvedTheme::Dark)
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a controller, as printed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeSnapshot {
    pub preference: Preference,
    pub resolved: ResolvedTheme,
    pub prefers_dark: bool,
}

impl fmt::Display for ThemeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preference={} resolved={}", self.preference, self.resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_preferences_ignore_environment_signal() {
        for prefers_dark in [false, true] {
            assert_eq!(Preference::Light.resolve(prefers_dark), ResolvedTheme::Light);
            assert_eq!(Preference::Dark.resolve(prefers_dark), ResolvedTheme::Dark);
        }
    }

    #[test]
    fn system_preference_follows_environment_signal() {
        assert_eq!(Preference::System.resolve(false), ResolvedTheme::Light);
        assert_eq!(Preference::System.resolve(true), ResolvedTheme::Dark);
    }

    #[test]
    fn next_cycles_through_all_three_preferences() {
        assert_eq!(Preference::Light.next(), Preference::Dark);
        assert_eq!(Preference::Dark.next(), Preference::System);
        assert_eq!(Preference::System.next(), Preference::Light);
        assert_eq!(Preference::Light.next().next().next(), Preference::Light);
    }

    #[test]
    fn parse_accepts_only_exact_lowercase_tags() {
        assert_eq!("light".parse::<Preference>(), Ok(Preference::Light));
        assert_eq!("dark".parse::<Preference>(), Ok(Preference::Dark));
        assert_eq!("system".parse::<Preference>(), Ok(Preference::System));

        for raw in ["blue", "", "Dark", " light"] {
            let err = raw.parse::<Preference>().unwrap_err();
            assert_eq!(
                err,
                ThemeError::InvalidPreference {
                    value: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn default_preference_is_system() {
        assert_eq!(Preference::default(), Preference::System);
        assert!(Preference::default().follows_system());
    }

    #[test]
    fn snapshot_serializes_with_lowercase_tags() {
        let snapshot = ThemeSnapshot {
            preference: Preference::System,
            resolved: ResolvedTheme::Dark,
            prefers_dark: true,
        };

        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "preference": "system",
                "resolved": "dark",
                "prefers_dark": true
            })
        );
        assert_eq!(snapshot.to_string(), "preference=system resolved=dark");
    }

    #[test]
    fn display_matches_stored_tag() {
        for preference in Preference::ALL {
            assert_eq!(preference.to_string(), preference.as_str());
        }
        assert_eq!(ResolvedTheme::Light.to_string(), "light");
    }
}
