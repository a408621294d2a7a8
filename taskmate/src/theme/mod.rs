//! Light/dark display preference.
//!
//! Under [`ThemePolicy::Toggle`] the preference is read from and written to
//! the store under [`THEME_KEY`]. Under [`ThemePolicy::Fixed`] the theme is
//! pinned and the store is never touched.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use taskmate_proto::theme::{THEME_KEY, Theme};

use crate::storage::{KeyValueStore, StorageError};

/// Errors that can occur while reading or persisting the theme.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The backing store failed.
    #[error("theme storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// How the theme is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemePolicy {
    /// User-toggleable, persisted preference.
    #[default]
    Toggle,
    /// Always this theme; toggling is a no-op.
    Fixed(Theme),
}

impl fmt::Display for ThemePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle => f.write_str("toggle"),
            Self::Fixed(theme) => write!(f, "{theme}"),
        }
    }
}

impl FromStr for ThemePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("toggle") {
            return Ok(Self::Toggle);
        }
        s.parse::<Theme>()
            .map(Self::Fixed)
            .map_err(|_| format!("unknown theme policy {s:?} (expected toggle, light or dark)"))
    }
}

/// Stored values that count as "no preference".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Tracks the active theme and persists changes according to its policy.
pub struct ThemeManager<S: KeyValueStore> {
    store: S,
    policy: ThemePolicy,
    current: Theme,
}

impl<S: KeyValueStore> ThemeManager<S> {
    /// Resolves the initial theme.
    ///
    /// With [`ThemePolicy::Toggle`] a stored `"dark"` means dark. If nothing
    /// or a blank value (`null`, `false`, `0`, `""`) is stored the system
    /// preference is used and nothing is written. Any other stored value,
    /// including `"DARK"`, reads as light. With
    /// [`ThemePolicy::Fixed`] the store is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Storage`] if reading the preference fails.
    pub async fn init(
        store: S,
        policy: ThemePolicy,
        system_prefers_dark: bool,
    ) -> Result<Self, ThemeError> {
        let system = if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        };
        let current = match policy {
            ThemePolicy::Fixed(theme) => theme,
            ThemePolicy::Toggle => match store.get(THEME_KEY).await? {
                None => system,
                Some(value) if is_blank(&value) => system,
                Some(Value::String(s)) if s == Theme::Dark.as_str() => Theme::Dark,
                Some(other) => {
                    if other != Value::from(Theme::Light.as_str()) {
                        tracing::warn!(value = %other, "unrecognized stored theme; using light");
                    }
                    Theme::Light
                }
            },
        };
        tracing::debug!(%policy, theme = %current, "theme initialized");
        Ok(Self {
            store,
            policy,
            current,
        })
    }

    /// The active theme.
    #[must_use]
    pub const fn current(&self) -> Theme {
        self.current
    }

    /// The policy this manager was created with.
    #[must_use]
    pub const fn policy(&self) -> ThemePolicy {
        self.policy
    }

    /// Switches to the other theme and persists it. Under a fixed policy the
    /// theme is unchanged and nothing is written.
    ///
    /// Returns the theme now active.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Storage`] if persisting fails. The in-memory
    /// theme is left unchanged in that case.
    pub async fn toggle(&mut self) -> Result<Theme, ThemeError> {
        if let ThemePolicy::Fixed(theme) = self.policy {
            tracing::debug!(%theme, "theme is fixed; toggle ignored");
            return Ok(theme);
        }
        let next = self.current.toggled();
        self.store
            .set(THEME_KEY, Value::from(next.as_str()))
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "saving theme failed"))?;
        self.current = next;
        tracing::info!(theme = %next, "theme toggled");
        Ok(next)
    }
}
