//! Read-only snapshots, the two player commands, and the optional auth gate.

use alloc::{
    string::String,
    vec::Vec,
};
use core::fmt;

use base64::{
    Engine as _,
    engine::general_purpose::STANDARD,
};
use embassy_time::Instant;
use rand::RngCore;
use serde::Serialize;

use crate::game::{
    Game,
    GameState,
};

/// Copy of the externally visible counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub score: u32,
    pub lives: u32,
    pub enemies: usize,
    pub bullets: usize,
    pub state: GameState,
}

impl Snapshot {
    pub fn of<R>(game: &Game<R>) -> Self {
        Self {
            score: game.score(),
            lives: game.lives(),
            enemies: game.enemies().len(),
            bullets: game.bullets().active_count(),
            state: game.state(),
        }
    }
}

/// Wire form of [`Snapshot`].
#[derive(Serialize)]
pub struct StateReport {
    pub score: u32,
    pub lives: u32,
    pub enemies: usize,
    pub bullets: usize,
    #[serde(rename = "gameState")]
    pub game_state: u8,
}

impl From<Snapshot> for StateReport {
    fn from(s: Snapshot) -> Self {
        Self {
            score: s.score,
            lives: s.lives,
            enemies: s.enemies,
            bullets: s.bullets,
            game_state: s.state.code(),
        }
    }
}

pub fn snapshot<R>(game: &Game<R>) -> Snapshot {
    Snapshot::of(game)
}

/// Ignored unless the game is running and a slot is free.
pub fn fire<R: RngCore>(game: &mut Game<R>) -> bool {
    game.fire()
}

/// Always resets, whatever state the game is in.
pub fn restart<R: RngCore>(game: &mut Game<R>, now: Instant) {
    game.restart(now);
}

// ── Auth gate ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    MissingCredentials,
    MalformedCredentials,
    BadCredentials,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "no credentials supplied"),
            Self::MalformedCredentials => write!(f, "authorization header is not valid basic auth"),
            Self::BadCredentials => write!(f, "wrong username or password"),
        }
    }
}

impl core::error::Error for Rejection {}

/// Capability check run before any command that mutates the game.
pub trait AuthGate {
    /// `authorization` is the raw `Authorization` header, if any.
    fn check(&self, authorization: Option<&str>) -> Result<(), Rejection>;
}

/// Lets every command through.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenGate;

impl AuthGate for OpenGate {
    fn check(&self, _authorization: Option<&str>) -> Result<(), Rejection> {
        Ok(())
    }
}

/// HTTP basic auth against a single fixed account.
#[derive(Clone, Debug)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn decode(header: &str) -> Result<Vec<u8>, Rejection> {
        let encoded = header
            .strip_prefix("Basic ")
            .ok_or(Rejection::MalformedCredentials)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(|_| Rejection::MalformedCredentials)
    }
}

impl AuthGate for BasicAuth {
    fn check(&self, authorization: Option<&str>) -> Result<(), Rejection> {
        let header = authorization.ok_or(Rejection::MissingCredentials)?;
        let decoded = Self::decode(header)?;
        let decoded = core::str::from_utf8(&decoded).map_err(|_| Rejection::MalformedCredentials)?;
        let (user, pass) = decoded
            .split_once(':')
            .ok_or(Rejection::MalformedCredentials)?;

        if user == self.username && pass == self.password {
            Ok(())
        } else {
            Err(Rejection::BadCredentials)
        }
    }
}

/// Either gate, picked at startup from configuration.
#[derive(Clone, Debug)]
pub enum Gate {
    Open(OpenGate),
    Basic(BasicAuth),
}

impl Gate {
    /// Basic auth when both credentials are present, otherwise open.
    pub fn from_credentials(username: Option<&str>, password: Option<&str>) -> Self {
        match (username, password) {
            (Some(user), Some(pass)) if !user.is_empty() => Self::Basic(BasicAuth::new(user, pass)),
            _ => Self::Open(OpenGate),
        }
    }
}

impl AuthGate for Gate {
    fn check(&self, authorization: Option<&str>) -> Result<(), Rejection> {
        match self {
            Self::Open(gate) => gate.check(authorization),
            Self::Basic(gate) => gate.check(authorization),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "player:hunter2"
    const GOOD: &str = "Basic cGxheWVyOmh1bnRlcjI=";
    // "player:wrong"
    const WRONG: &str = "Basic cGxheWVyOndyb25n";

    #[test]
    fn basic_auth_accepts_matching_credentials() {
        let gate = BasicAuth::new("player", "hunter2");
        assert_eq!(gate.check(Some(GOOD)), Ok(()));
    }

    #[test]
    fn basic_auth_reasons() {
        let gate = BasicAuth::new("player", "hunter2");
        assert_eq!(gate.check(None), Err(Rejection::MissingCredentials));
        assert_eq!(gate.check(Some("Bearer abc")), Err(Rejection::MalformedCredentials));
        assert_eq!(gate.check(Some("Basic !!!")), Err(Rejection::MalformedCredentials));
        assert_eq!(gate.check(Some(WRONG)), Err(Rejection::BadCredentials));
    }

    #[test]
    fn gate_from_credentials() {
        assert!(matches!(Gate::from_credentials(None, None), Gate::Open(_)));
        assert!(matches!(Gate::from_credentials(Some(""), Some("x")), Gate::Open(_)));
        let gate = Gate::from_credentials(Some("player"), Some("hunter2"));
        assert!(matches!(gate, Gate::Basic(_)));
        assert_eq!(gate.check(None), Err(Rejection::MissingCredentials));
        assert_eq!(gate.check(Some(GOOD)), Ok(()));
    }

    #[test]
    fn state_report_uses_wire_names() {
        let report = StateReport::from(Snapshot {
            score: 300,
            lives: 2,
            enemies: 5,
            bullets: 1,
            state: GameState::Playing,
        });
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"score":300,"lives":2,"enemies":5,"bullets":1,"gameState":1}"#
        );
    }
}
