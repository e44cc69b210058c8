//! Light/dark theme preference.
//!
//! Resolution order: explicit stored choice > system preference > light.
//! Every applied change persists the choice (unless it came from the system or
//! another tab), updates the document attribute and publishes the new theme to
//! subscribers. A timed transition holds a single-slot lock; explicit changes
//! requested while it is held are dropped, not queued. System and cross-tab
//! changes bypass the lock.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use crate::error::ThemeError;

/// Key of the persisted entry.
pub const THEME_STORAGE_KEY: &str = "theme";
/// Attribute set on the document root.
pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn opposite(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ThemeError::InvalidTheme(other.to_string())),
        }
    }
}

/// Durable client-side key-value store.
pub trait ThemeStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-process storage, shared between stores to model several tabs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl ThemeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }
}

/// What the operating system reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemPreferences {
    pub prefers_dark: bool,
    pub reduced_motion: bool,
}

impl SystemPreferences {
    fn theme(self) -> Theme {
        if self.prefers_dark { Theme::Dark } else { Theme::Light }
    }

    /// A light system preference is indistinguishable from the default.
    fn source(self) -> ThemeSource {
        if self.prefers_dark { ThemeSource::System } else { ThemeSource::Default }
    }
}

/// Where the current theme came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeSource {
    Stored,
    System,
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeChange {
    Applied,
    /// Same theme as before; the choice is still persisted.
    Unchanged,
    /// A transition was in flight.
    Dropped,
}

pub struct ThemeStore {
    storage: Arc<dyn ThemeStorage>,
    system: SystemPreferences,
    source: ThemeSource,
    current: watch::Sender<Theme>,
    transition: Arc<AsyncMutex<()>>,
    transition_duration: Duration,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn ThemeStorage>, system: SystemPreferences) -> Self {
        let (theme, source) = resolve(storage.as_ref(), system);
        info!(target: "theme", theme = %theme, ?source, "Theme initialized");
        let (current, _) = watch::channel(theme);
        Self {
            storage,
            system,
            source,
            current,
            transition: Arc::new(AsyncMutex::new(())),
            transition_duration: DEFAULT_TRANSITION,
        }
    }

    pub fn with_transition(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    pub fn current(&self) -> Theme {
        *self.current.borrow()
    }

    pub fn source(&self) -> ThemeSource {
        self.source
    }

    /// Observers (toggle label, theme-dependent images) watch this channel.
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.current.subscribe()
    }

    /// The attribute/value pair applied to the document root.
    pub fn document_attribute(&self) -> (&'static str, &'static str) {
        (THEME_ATTRIBUTE, self.current().as_str())
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.try_lock().is_err()
    }

    /// Explicit user choice. Invalid values leave everything untouched.
    pub fn set_theme(&mut self, value: &str) -> Result<ThemeChange, ThemeError> {
        let theme = value.parse::<Theme>().map_err(|e| {
            warn!(target: "theme", value, "Rejected invalid theme");
            e
        })?;
        Ok(self.change(theme))
    }

    pub fn toggle(&mut self) -> ThemeChange {
        let next = self.current().opposite();
        self.change(next)
    }

    /// The system preference changed; only followed when the user never chose.
    /// Like storage events this skips the transition lock, so the store never
    /// lags behind what a fresh resolution would give.
    pub fn on_system_preference_change(&mut self, prefers_dark: bool) -> ThemeChange {
        self.system.prefers_dark = prefers_dark;
        if self.source == ThemeSource::Stored {
            debug!(target: "theme", prefers_dark, "System preference ignored; explicit choice stored");
            return ThemeChange::Unchanged;
        }
        let (theme, source) = (self.system.theme(), self.system.source());
        let change = self.sync(theme, source);
        if change == ThemeChange::Applied {
            info!(target: "theme", theme = %self.current(), "Theme follows system preference");
        }
        change
    }

    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.system.reduced_motion = reduced_motion;
    }

    /// Another tab wrote the storage entry. Last write wins and no transition
    /// runs; a cleared entry falls back to the system preference.
    pub fn on_storage_event(&mut self, key: &str, new_value: Option<&str>) -> Result<ThemeChange, ThemeError> {
        if key != THEME_STORAGE_KEY {
            return Ok(ThemeChange::Unchanged);
        }
        let (theme, source) = match new_value {
            Some(v) => {
                let theme = v.parse::<Theme>().map_err(|e| {
                    warn!(target: "theme", value = v, "Ignored invalid theme from storage event");
                    e
                })?;
                (theme, ThemeSource::Stored)
            }
            None => (self.system.theme(), self.system.source()),
        };
        let change = self.sync(theme, source);
        if change == ThemeChange::Applied {
            info!(target: "theme", theme = %theme, "Theme synced from storage event");
        }
        Ok(change)
    }

    /// Adopt a theme decided elsewhere: no persistence, no transition.
    fn sync(&mut self, theme: Theme, source: ThemeSource) -> ThemeChange {
        self.source = source;
        if theme == self.current() {
            return ThemeChange::Unchanged;
        }
        self.current.send_replace(theme);
        ThemeChange::Applied
    }

    /// Explicit change: persisted, animated, dropped while a transition runs.
    fn change(&mut self, theme: Theme) -> ThemeChange {
        let guard = match self.transition.clone().try_lock_owned() {
            Ok(g) => g,
            Err(_) => {
                debug!(target: "theme", theme = %theme, "Theme change dropped; transition in flight");
                return ThemeChange::Dropped;
            }
        };

        self.storage.set(THEME_STORAGE_KEY, theme.as_str());
        self.source = ThemeSource::Stored;

        if theme == self.current() {
            return ThemeChange::Unchanged;
        }
        self.current.send_replace(theme);
        info!(target: "theme", theme = %theme, "Theme applied");

        // Hold the lock for the animation unless motion is reduced.
        let animate = !self.system.reduced_motion && !self.transition_duration.is_zero();
        if animate {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let duration = self.transition_duration;
                handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    drop(guard);
                });
            }
        }
        ThemeChange::Applied
    }
}

fn resolve(storage: &dyn ThemeStorage, system: SystemPreferences) -> (Theme, ThemeSource) {
    if let Some(raw) = storage.get(THEME_STORAGE_KEY) {
        match raw.parse::<Theme>() {
            Ok(theme) => return (theme, ThemeSource::Stored),
            Err(_) => warn!(target: "theme", value = %raw, "Ignoring invalid stored theme"),
        }
    }
    (system.theme(), system.source())
}
