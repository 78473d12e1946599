pub mod config;
pub mod error;
pub mod logging;
pub mod signal;
pub mod storage;
pub mod subscription;
pub mod theme;

pub use error::{AppError, AppResult};
pub use signal::{detect_prefers_dark, ColorSchemeSource, ManualColorScheme};
pub use storage::{JsonFileStore, MemoryStore, PreferenceStore, StoreError, StoreResult};
pub use subscription::Subscription;
pub use theme::{
    Preference, ResolvedTheme, ThemeController, ThemeError, ThemeSnapshot, THEME_STORE_KEY,
};

/// Opens the preference store named by the app config, or the default file.
pub fn open_store(
    config: &config::AppConfig,
    dirs: &config::ConfigDirs,
) -> AppResult<JsonFileStore> {
    let store = JsonFileStore::with_path(config.preference_path(dirs)?);
    tracing::debug!(path = %store.path().display(), "using preference store");
    Ok(store)
}
