use std::env;
use std::sync::Mutex;

use comanda_relay::config::Paths;
use comanda_relay::config::paths::{CONFIG_ENV, STATE_ENV};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
    unsafe {
        env::set_var(key, value);
    }
}

fn remove_env_var(key: &str) {
    unsafe {
        env::remove_var(key);
    }
}

#[test]
fn test_env_override_integration() {
    let _lock = ENV_LOCK.lock().unwrap();
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.toml");

    set_env_var(CONFIG_ENV, &config_path);
    assert_eq!(Paths::config_file(), config_path);
    assert_eq!(Paths::config_dir(), temp.path());
    remove_env_var(CONFIG_ENV);
}

#[test]
fn test_state_dir_override_is_created() {
    let _lock = ENV_LOCK.lock().unwrap();
    let temp = tempfile::tempdir().unwrap();
    let state_dir = temp.path().join("state");

    set_env_var(STATE_ENV, &state_dir);
    let created = Paths::ensure_state_dir().unwrap();
    assert_eq!(created, state_dir);
    assert!(state_dir.is_dir());
    remove_env_var(STATE_ENV);
}
