use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

use crate::db::open_database;
use crate::error::{AppError, AppResult};
use crate::models::settings::{LANG_KEY, THEME_KEY};
use crate::models::Settings;

pub fn get_all_settings(conn: &Connection) -> rusqlite::Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;

    let settings = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;

    Ok(settings)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at)
         VALUES (?, ?, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_setting(conn: &Connection, key: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM settings WHERE key = ?", [key])?;
    Ok(rows > 0)
}

/// Load preferences at startup; anything not stored yet takes its default.
pub fn load_settings(conn: &Connection) -> AppResult<Settings> {
    let settings_map = get_all_settings(conn)?;
    Ok(Settings::from_map(settings_map))
}

/// Read preferences for display purposes only.
///
/// A missing database is not created, and one that cannot be opened or
/// read yields the defaults.
pub fn load_settings_or_default(path: &Path) -> Settings {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings database, using defaults");
        return Settings::default();
    }

    match open_database(path)
        .map_err(AppError::from)
        .and_then(|conn| load_settings(&conn))
    {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read settings, using defaults");
            Settings::default()
        }
    }
}

/// Persist every preference in one transaction.
pub fn save_settings(conn: &mut Connection, settings: &Settings) -> AppResult<()> {
    let tx = conn.transaction()?;
    for (key, value) in settings.to_map() {
        set_setting(&tx, &key, &value)?;
    }
    tx.commit()?;
    tracing::debug!(lang = %settings.lang, theme = %settings.theme, "Settings saved");
    Ok(())
}

/// Forget stored preferences and return the defaults now in effect.
pub fn reset_settings(conn: &Connection) -> AppResult<Settings> {
    for key in [LANG_KEY, THEME_KEY] {
        if delete_setting(conn, key)? {
            tracing::debug!(key, "Setting cleared");
        }
    }
    load_settings(conn)
}
