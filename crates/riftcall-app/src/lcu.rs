// League client (LCU) HTTP transport.
//
// The client exposes a local HTTPS API on a random port with a per-launch
// password, both written to a lockfile in the install directory:
//
//   LeagueClient:12345:54321:s3cr3t:https
//   name        :pid  :port :token :protocol
//
// Requests use basic auth `riot:<token>` against the client's self-signed
// certificate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use riftcall_core::config::LcuConfig;
use riftcall_core::ports::{ReadyCheckAcceptor, SnapshotSource};
use riftcall_core::snapshot::{RawSession, ReadyCheckState};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

const LCU_USER: &str = "riot";

const CURRENT_SUMMONER: &str = "/lol-summoner/v1/current-summoner";
const CHAMP_SELECT_SESSION: &str = "/lol-champ-select/v1/session";
const READY_CHECK: &str = "/lol-matchmaking/v1/ready-check";
const READY_CHECK_ACCEPT: &str = "/lol-matchmaking/v1/ready-check/accept";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LcuError {
    #[error("League client lockfile not found (searched {} locations); is the client running?", .searched.len())]
    LockfileNotFound { searched: Vec<PathBuf> },

    #[error("malformed lockfile {path}: {reason}")]
    MalformedLockfile { path: PathBuf, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
}

// ---------------------------------------------------------------------------
// Lockfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lockfile {
    pub port: u16,
    pub token: String,
    pub protocol: String,
}

impl Lockfile {
    pub fn parse(path: &Path, content: &str) -> Result<Self, LcuError> {
        let malformed = |reason: &str| LcuError::MalformedLockfile {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = content.trim().split(':').collect();
        if parts.len() < 5 {
            return Err(malformed("expected name:pid:port:token:protocol"));
        }
        let port = parts[2]
            .parse::<u16>()
            .map_err(|_| malformed("port is not a number"))?;
        let token = parts[3].to_string();
        if token.is_empty() {
            return Err(malformed("empty token"));
        }

        Ok(Lockfile {
            port,
            token,
            protocol: parts[4].to_string(),
        })
    }

    pub fn base_url(&self) -> String {
        format!("{}://127.0.0.1:{}", self.protocol, self.port)
    }
}

/// Standard install locations, in search order.
pub fn default_install_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("C:\\Riot Games\\League of Legends"),
        PathBuf::from("C:\\Program Files\\Riot Games\\League of Legends"),
        PathBuf::from("C:\\Program Files (x86)\\Riot Games\\League of Legends"),
    ];
    let program_data =
        std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".to_string());
    dirs.push(
        PathBuf::from(program_data)
            .join("Riot Games")
            .join("League of Legends"),
    );
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        dirs.push(PathBuf::from(local).join("Riot Games").join("League of Legends"));
    }
    dirs.push(PathBuf::from("/Applications/League of Legends.app/Contents/LoL"));
    dirs
}

/// Find and parse the first readable lockfile in `dirs`.
pub fn find_lockfile(dirs: &[PathBuf]) -> Result<Lockfile, LcuError> {
    let mut searched = Vec::new();
    for dir in dirs {
        for name in LOCKFILE_NAMES {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    debug!("Found lockfile: {}", path.display());
                    return Lockfile::parse(&path, &content);
                }
                Err(_) => searched.push(path),
            }
        }
    }
    Err(LcuError::LockfileNotFound { searched })
}

// ---------------------------------------------------------------------------
// LcuClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSummoner {
    pub summoner_id: i64,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl CurrentSummoner {
    pub fn label(&self) -> String {
        match (&self.game_name, &self.tag_line, &self.display_name) {
            (Some(name), Some(tag), _) if !name.is_empty() && !tag.is_empty() => {
                format!("{name}#{tag}")
            }
            (Some(name), _, _) if !name.is_empty() => name.clone(),
            (_, _, Some(display)) if !display.is_empty() => display.clone(),
            _ => format!("summoner {}", self.summoner_id),
        }
    }
}

pub struct LcuClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl LcuClient {
    /// Locate the lockfile (configured directories first) and build a client.
    pub fn connect(config: &LcuConfig) -> Result<Self, LcuError> {
        let mut dirs = config.install_dirs.clone();
        dirs.extend(default_install_dirs());
        let lockfile = find_lockfile(&dirs)?;
        info!("Connected to League client on port {}", lockfile.port);
        Self::new(lockfile.base_url(), lockfile.token, config.request_timeout())
    }

    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, LcuError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(LcuError::ClientBuild)?;
        Ok(LcuClient {
            http,
            base_url,
            token,
        })
    }

    pub async fn current_summoner(&self) -> Result<CurrentSummoner, LcuError> {
        self.get_json(CURRENT_SUMMONER)
            .await?
            .ok_or_else(|| LcuError::Status {
                endpoint: CURRENT_SUMMONER.to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
                body: "no summoner logged in".to_string(),
            })
    }

    /// GET an endpoint. A 404 means "nothing there right now" and maps to
    /// `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>, LcuError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, endpoint))
            .basic_auth(LCU_USER, Some(&self.token))
            .send()
            .await
            .map_err(|source| LcuError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LcuError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| LcuError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
    }

    async fn post(&self, endpoint: &str) -> Result<StatusCode, LcuError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .basic_auth(LCU_USER, Some(&self.token))
            .send()
            .await
            .map_err(|source| LcuError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(response.status())
    }
}

#[async_trait]
impl SnapshotSource for LcuClient {
    async fn fetch_champ_select(&self) -> anyhow::Result<Option<RawSession>> {
        let value: Option<serde_json::Value> = self.get_json(CHAMP_SELECT_SESSION).await?;
        Ok(value.map(RawSession::from_value))
    }

    async fn fetch_ready_check(&self) -> anyhow::Result<Option<ReadyCheckState>> {
        let value: Option<serde_json::Value> = self.get_json(READY_CHECK).await?;
        Ok(value.map(|v| serde_json::from_value(v).unwrap_or_default()))
    }
}

#[async_trait]
impl ReadyCheckAcceptor for LcuClient {
    async fn accept_ready_check(&self) -> anyhow::Result<bool> {
        let status = self.post(READY_CHECK_ACCEPT).await?;
        if !status.is_success() {
            warn!("Ready check accept returned status {}", status);
        }
        Ok(status.is_success())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_lockfile() {
        let lock = Lockfile::parse(Path::new("lockfile"), "LeagueClient:4242:51234:abcDEF123:https\n")
            .unwrap();
        assert_eq!(lock.port, 51234);
        assert_eq!(lock.token, "abcDEF123");
        assert_eq!(lock.base_url(), "https://127.0.0.1:51234");
    }

    #[test]
    fn rejects_malformed_lockfiles() {
        for content in ["", "LeagueClient:1:2", "LeagueClient:1:port:tok:https", "a:1:2::https"] {
            assert!(
                matches!(
                    Lockfile::parse(Path::new("lockfile"), content),
                    Err(LcuError::MalformedLockfile { .. })
                ),
                "accepted {content:?}"
            );
        }
    }

    #[test]
    fn finds_lockfile_in_later_directory_and_name() {
        let tmp = std::env::temp_dir().join("riftcall_lcu_find");
        let _ = fs::remove_dir_all(&tmp);
        let empty = tmp.join("empty");
        let install = tmp.join("install");
        fs::create_dir_all(&empty).unwrap();
        fs::create_dir_all(&install).unwrap();
        fs::write(
            install.join("LeagueClientUx.lockfile"),
            "LeagueClientUx:1:60000:tok:https",
        )
        .unwrap();

        let lock = find_lockfile(&[empty.clone(), install]).unwrap();
        assert_eq!(lock.port, 60000);

        match find_lockfile(&[empty]) {
            Err(LcuError::LockfileNotFound { searched }) => {
                assert_eq!(searched.len(), LOCKFILE_NAMES.len())
            }
            other => panic!("expected LockfileNotFound, got {other:?}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn summoner_label_prefers_riot_id() {
        let summoner: CurrentSummoner = serde_json::from_str(
            r#"{"summonerId": 7, "gameName": "Faker", "tagLine": "KR1", "displayName": "Hide"}"#,
        )
        .unwrap();
        assert_eq!(summoner.label(), "Faker#KR1");

        let bare: CurrentSummoner = serde_json::from_str(r#"{"summonerId": 7}"#).unwrap();
        assert_eq!(bare.label(), "summoner 7");
    }
}
