/*!
config.rs - resolve server, handle and headers for a run.

Precedence (highest first):
  1. command-line flags   (--server, --handle, -H KEY=VALUE)
  2. environment          (INFILTR8_SERVER, INFILTR8_HANDLE)
  3. profile file         (--config profile.json | profile.yaml)
  4. defaults             (http://127.0.0.1:5000, handle prompted at startup)

Profile file shape (JSON or YAML):
{
  "server": "http://10.1.1.1:5000",
  "handle": "neo",
  "headers": { "X-Team": "red" }
}
*/

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::transport::parse_server;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const SERVER_ENV: &str = "INFILTR8_SERVER";
pub const HANDLE_ENV: &str = "INFILTR8_HANDLE";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub server: Option<String>,
    pub handle: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Values taken from the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub server: Option<String>,
    pub handle: Option<String>,
    pub headers: Vec<String>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: Url,
    /// `None` -> ask the player at startup
    pub handle: Option<String>,
    pub headers: Vec<(String, String)>,
}

/// Load a JSON or YAML (by extension) profile.
pub fn load_profile(path: &Path) -> Result<Profile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let lower = path.to_string_lossy().to_ascii_lowercase();

    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        serde_yaml::from_str(&raw).context("failed to parse YAML config file")
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON config file")
    }
}

/// Split `KEY=VALUE`, trimming both sides.
pub fn parse_header(kv: &str) -> Result<(String, String)> {
    let Some((k, v)) = kv.split_once('=') else {
        anyhow::bail!("invalid --header (expected KEY=VALUE): {kv}");
    };
    let key = k.trim();
    if key.is_empty() {
        anyhow::bail!("invalid --header (empty key): {kv}");
    }
    Ok((key.to_string(), v.trim().to_string()))
}

/// Merge flags, environment (looked up through `env`) and the optional profile.
pub fn resolve(cli: Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Settings> {
    let profile = match &cli.config {
        Some(path) => load_profile(path)?,
        None => Profile::default(),
    };
    let env_value = |key: &str| env(key).filter(|s| !s.trim().is_empty());

    let server_raw = cli
        .server
        .or_else(|| env_value(SERVER_ENV))
        .or(profile.server)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    let server = parse_server(&server_raw)?;

    let handle = cli
        .handle
        .or_else(|| env_value(HANDLE_ENV))
        .or(profile.handle)
        .filter(|h| !h.trim().is_empty());

    let mut headers = profile.headers;
    for kv in &cli.headers {
        let (k, v) = parse_header(kv)?;
        headers.insert(k, v);
    }

    debug!(%server, handle = ?handle, headers = headers.len(), "configuration resolved");
    Ok(Settings {
        server,
        handle,
        headers: headers.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("infiltr8-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults_when_nothing_given() {
        let s = resolve(Overrides::default(), no_env).unwrap();
        assert_eq!(s.server.as_str(), "http://127.0.0.1:5000/");
        assert!(s.handle.is_none());
        assert!(s.headers.is_empty());
    }

    #[test]
    fn flag_beats_env() {
        let cli = Overrides {
            server: Some("http://flag:1".into()),
            ..Default::default()
        };
        let s = resolve(cli, |k| match k {
            SERVER_ENV => Some("http://env:2".into()),
            HANDLE_ENV => Some("trinity".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(s.server.as_str(), "http://flag:1/");
        assert_eq!(s.handle.as_deref(), Some("trinity"));
    }

    #[test]
    fn blank_env_is_ignored() {
        let s = resolve(Overrides::default(), |_| Some("   ".into())).unwrap();
        assert_eq!(s.server.as_str(), "http://127.0.0.1:5000/");
        assert!(s.handle.is_none());
    }

    #[test]
    fn profile_json_fills_gaps_and_cli_headers_override() {
        let path = write_temp(
            "profile.json",
            r#"{"server":"http://profile:5000","handle":"neo","headers":{"X-Team":"blue","X-Mode":"ctf"}}"#,
        );
        let cli = Overrides {
            headers: vec!["X-Team=red".into()],
            config: Some(path),
            ..Default::default()
        };
        let s = resolve(cli, no_env).unwrap();
        assert_eq!(s.server.as_str(), "http://profile:5000/");
        assert_eq!(s.handle.as_deref(), Some("neo"));
        assert_eq!(
            s.headers,
            vec![
                ("X-Mode".to_string(), "ctf".to_string()),
                ("X-Team".to_string(), "red".to_string()),
            ]
        );
    }

    #[test]
    fn profile_yaml() {
        let path = write_temp("profile.yaml", "server: https://games.example/\nhandle: morpheus\n");
        let p = load_profile(&path).unwrap();
        assert_eq!(p.handle.as_deref(), Some("morpheus"));
        assert_eq!(p.server.as_deref(), Some("https://games.example/"));
    }

    #[test]
    fn unknown_profile_key_rejected() {
        let path = write_temp("bad.json", r#"{"sever":"typo"}"#);
        assert!(load_profile(&path).is_err());
    }

    #[test]
    fn header_parsing() {
        assert_eq!(
            parse_header(" X-Trace = 1 ").unwrap(),
            ("X-Trace".to_string(), "1".to_string())
        );
        assert!(parse_header("novalue").is_err());
        assert!(parse_header("=x").is_err());
    }

    #[test]
    fn invalid_server_is_an_error() {
        let cli = Overrides {
            server: Some("gopher://old".into()),
            ..Default::default()
        };
        assert!(resolve(cli, no_env).is_err());
    }
}
