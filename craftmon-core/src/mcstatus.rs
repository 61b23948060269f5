//! Game-server status endpoint decoding
//!
//! Wire format:
//! ```json
//! {"code":200,"data":{"players":{"online":4,"max":20}}}
//! ```
//!
//! A `code` of 200 means the server is reachable, 204 means it is known
//! to be offline; anything else is an unknown state. Player counts
//! default to zero whenever the endpoint omits them.

use serde::Deserialize;

use crate::fetch::FetchError;

#[derive(Debug, Deserialize)]
struct Response {
    code: u16,
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
    players: Option<Players>,
}

#[derive(Debug, Deserialize)]
struct Players {
    online: Option<u32>,
    max: Option<u32>,
}

/// Reachability of the game server as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Online,
    Offline,
    Unknown,
    Error,
}

impl ServerStatus {
    /// Fixed display name shown on the status screen.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Online => "Online",
            ServerStatus::Offline => "Offline",
            ServerStatus::Unknown => "Unknown",
            ServerStatus::Error => "Error",
        }
    }
}

/// Point-in-time game-server status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSnapshot {
    pub status: ServerStatus,
    pub online: u32,
    pub max: u32,
}

impl GameSnapshot {
    /// Snapshot used when the endpoint could not be queried at all.
    pub const fn unreachable() -> Self {
        Self {
            status: ServerStatus::Error,
            online: 0,
            max: 0,
        }
    }
}

/// Decode a status response body.
pub fn decode(body: &[u8]) -> Result<GameSnapshot, FetchError> {
    let (response, _) =
        serde_json_core::from_slice::<Response>(body).map_err(|_| FetchError::Malformed)?;

    let snapshot = match response.code {
        200 => {
            let players = response.data.and_then(|d| d.players);
            let (online, max) = players
                .map(|p| (p.online.unwrap_or(0), p.max.unwrap_or(0)))
                .unwrap_or((0, 0));
            GameSnapshot {
                status: ServerStatus::Online,
                online,
                max,
            }
        }
        204 => GameSnapshot {
            status: ServerStatus::Offline,
            online: 0,
            max: 0,
        },
        _ => GameSnapshot {
            status: ServerStatus::Unknown,
            online: 0,
            max: 0,
        },
    };

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_with_player_counts() {
        let body = br#"{"code":200,"data":{"players":{"online":4,"max":20}}}"#;
        assert_eq!(
            decode(body).unwrap(),
            GameSnapshot {
                status: ServerStatus::Online,
                online: 4,
                max: 20,
            }
        );
    }

    #[test]
    fn online_without_player_counts_defaults_to_zero() {
        let body = br#"{"code":200,"data":{}}"#;
        assert_eq!(
            decode(body).unwrap(),
            GameSnapshot {
                status: ServerStatus::Online,
                online: 0,
                max: 0,
            }
        );
    }

    #[test]
    fn no_content_means_offline() {
        assert_eq!(
            decode(br#"{"code":204}"#).unwrap(),
            GameSnapshot {
                status: ServerStatus::Offline,
                online: 0,
                max: 0,
            }
        );
    }

    #[test]
    fn other_codes_are_unknown() {
        assert_eq!(
            decode(br#"{"code":404}"#).unwrap().status,
            ServerStatus::Unknown
        );
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert_eq!(decode(b"not json"), Err(FetchError::Malformed));
    }

    #[test]
    fn unreachable_snapshot_reads_as_error() {
        let snapshot = GameSnapshot::unreachable();
        assert_eq!(snapshot.status, ServerStatus::Error);
        assert_eq!(snapshot.status.as_str(), "Error");
        assert_eq!((snapshot.online, snapshot.max), (0, 0));
    }
}
