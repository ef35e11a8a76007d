//! Integration tests for the on-disk preference store.

use fintracker::config::Config;
use fintracker::db::open_database;
use fintracker::db::queries::settings::{
    load_settings, load_settings_or_default, reset_settings, save_settings, set_setting,
};
use fintracker::models::{Language, Settings, Theme};

/// Preferences saved in one session are loaded in the next.
#[test]
fn test_settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("data").join("fintracker.db"),
    };

    {
        let mut conn = open_database(&config.database_path).unwrap();
        let mut settings = load_settings(&conn).unwrap();
        assert_eq!(settings, Settings::default());

        settings.lang = "it".parse::<Language>().unwrap();
        settings.theme = Theme::Dark;
        save_settings(&mut conn, &settings).unwrap();
    }

    let conn = open_database(&config.database_path).unwrap();
    let settings = load_settings(&conn).unwrap();
    assert_eq!(settings.lang, Language::It);
    assert_eq!(settings.theme, Theme::Dark);
}

/// A corrupted stored value does not stop the application from starting.
#[test]
fn test_corrupt_value_loads_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.db");

    let conn = open_database(&path).unwrap();
    set_setting(&conn, "theme", "neon").unwrap();
    set_setting(&conn, "lang", "it").unwrap();

    let settings = load_settings(&conn).unwrap();
    assert_eq!(settings.theme, Theme::Light);
    assert_eq!(settings.lang, Language::It);
}

/// Settling without a preference store uses the defaults and leaves the
/// filesystem untouched.
#[test]
fn test_missing_store_falls_back_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("fintracker.db");

    let settings = load_settings_or_default(&path);
    assert_eq!(settings, Settings::default());
    assert!(!path.exists());
    assert!(!dir.path().join("data").exists());
}

/// A file that is not a database falls back to the defaults instead of
/// failing.
#[test]
fn test_unreadable_store_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintracker.db");
    std::fs::write(&path, "not a database\n".repeat(1024)).unwrap();

    assert_eq!(load_settings_or_default(&path), Settings::default());
}

/// Stored preferences are picked up when the store is readable.
#[test]
fn test_fallback_loader_reads_saved_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintracker.db");
    {
        let mut conn = open_database(&path).unwrap();
        let settings = Settings {
            lang: Language::It,
            theme: Theme::Dark,
        };
        save_settings(&mut conn, &settings).unwrap();
    }

    let settings = load_settings_or_default(&path);
    assert_eq!(settings.lang, Language::It);
    assert_eq!(settings.theme, Theme::Dark);
}

/// Resetting forgets what was stored, across sessions too.
#[test]
fn test_reset_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintracker.db");
    {
        let conn = open_database(&path).unwrap();
        set_setting(&conn, "lang", "it").unwrap();
        assert_eq!(reset_settings(&conn).unwrap(), Settings::default());
    }

    let conn = open_database(&path).unwrap();
    assert_eq!(load_settings(&conn).unwrap(), Settings::default());
}
