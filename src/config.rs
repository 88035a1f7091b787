// nrcctl - CLI for the nagrestconf REST API
// Copyright (C) 2024 The nrcctl authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::client::Credentials;
use crate::encoding::EncodingMode;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_FOLDER: &str = "local";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub folder: Option<String>,
    /// Keep field values percent-encoded instead of decoding them.
    pub encode: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error("REST API URL is required; pass --url or set it with `nrcctl configure --url <url>`")]
    MissingUrl,
}

#[derive(Debug)]
pub struct EffectiveConfig {
    pub url: String,
    pub credentials: Option<Credentials>,
    pub folder: String,
    pub mode: EncodingMode,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".nrcctl.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("NRCCTL_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("nrcctl").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    Ok(read_if_exists(&config_path(scope, cwd)?)?.unwrap_or_default())
}

pub fn save(scope: Scope, config: &Config, cwd: &Path) -> Result<PathBuf> {
    let path = config_path(scope, cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

/// Merges both config scopes and applies command line overrides on top.
pub fn resolve(cwd: &Path, overrides: Config) -> Result<EffectiveConfig> {
    let merged = merge(load(cwd)?, overrides);

    let url = merged
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::MissingUrl)?;

    let credentials = merged
        .username
        .filter(|u| !u.is_empty())
        .map(|username| Credentials {
            username,
            password: merged.password.unwrap_or_default(),
        });

    Ok(EffectiveConfig {
        url,
        credentials,
        folder: merged
            .folder
            .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
        mode: EncodingMode::from_keep_encoded(merged.encode.unwrap_or(false)),
    })
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

/// Fields set in `over` win.
fn merge(base: Config, over: Config) -> Config {
    Config {
        url: over.url.or(base.url),
        username: over.username.or(base.username),
        password: over.password.or(base.password),
        folder: over.folder.or(base.folder),
        encode: over.encode.or(base.encode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use std::{env, fs};
    use tempfile::tempdir;

    static ENV_LOCK: OnceLock<std::sync::Mutex<()>> = OnceLock::new();

    fn isolate(cwd: &Path) {
        unsafe {
            env::set_var("NRCCTL_CONFIG_DIR", cwd.join("config"));
            env::set_var("XDG_CONFIG_HOME", cwd.join("xdg"));
        }
        fs::create_dir_all(cwd.join("config")).unwrap();
        fs::create_dir_all(cwd.join("xdg")).unwrap();
    }

    #[test]
    fn merges_user_and_local_and_overrides() {
        let _guard = ENV_LOCK
            .get_or_init(|| std::sync::Mutex::new(()))
            .lock()
            .unwrap();
        let cwd = tempdir().unwrap();
        isolate(cwd.path());

        let user_cfg = Config {
            url: Some("https://nagios.example.test/rest".into()),
            username: Some("nagiosadmin".into()),
            password: Some("user-pass".into()),
            folder: Some("prod".into()),
            encode: None,
        };
        save(Scope::User, &user_cfg, cwd.path()).unwrap();

        let local_cfg = Config {
            password: Some("local-pass".into()),
            folder: Some("staging".into()),
            ..Config::default()
        };
        save(Scope::Local, &local_cfg, cwd.path()).unwrap();

        let effective = resolve(cwd.path(), Config::default()).unwrap();
        assert_eq!(effective.url, "https://nagios.example.test/rest");
        assert_eq!(effective.folder, "staging");
        assert_eq!(effective.mode, EncodingMode::Decode);
        let creds = effective.credentials.unwrap();
        assert_eq!(creds.username, "nagiosadmin");
        assert_eq!(creds.password, "local-pass");

        let overridden = resolve(
            cwd.path(),
            Config {
                url: Some("https://other.test/rest".into()),
                encode: Some(true),
                ..Config::default()
            },
        )
        .unwrap();
        assert_eq!(overridden.url, "https://other.test/rest");
        assert_eq!(overridden.mode, EncodingMode::Passthrough);
        assert_eq!(overridden.folder, "staging");
    }

    #[test]
    fn defaults_folder_and_skips_auth() {
        let _guard = ENV_LOCK
            .get_or_init(|| std::sync::Mutex::new(()))
            .lock()
            .unwrap();
        let cwd = tempdir().unwrap();
        isolate(cwd.path());

        let effective = resolve(
            cwd.path(),
            Config {
                url: Some("http://127.0.0.1/rest".into()),
                ..Config::default()
            },
        )
        .unwrap();
        assert_eq!(effective.folder, DEFAULT_FOLDER);
        assert!(effective.credentials.is_none());
    }

    #[test]
    fn errors_when_missing_url() {
        let _guard = ENV_LOCK
            .get_or_init(|| std::sync::Mutex::new(()))
            .lock()
            .unwrap();
        let cwd = tempdir().unwrap();
        isolate(cwd.path());
        let err = resolve(cwd.path(), Config::default()).unwrap_err();
        assert!(err.to_string().contains("REST API URL is required"));
    }
}
