//! Transport-agnostic request handling for the control surface.
//!
//! Whatever carries the requests (an HTTP server, the badge buttons) hands a
//! [`Request`] to a [`Router`] and sends back the [`Response`] it gets.

use alloc::{
    format,
    string::{
        String,
        ToString,
    },
};
use core::fmt::Write as _;

use embassy_time::Instant;
use rand::RngCore;
use serde::Serialize;

use crate::{
    config::{
        AUTH_REALM,
        TRACK_LEN,
        WEB_REFRESH_INTERVAL,
        WEB_SAMPLE_COUNT,
    },
    entities::EnemyColor,
    game::{
        Game,
        GameState,
    },
    surface::{
        self,
        AuthGate,
        Snapshot,
        StateReport,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub authorization: Option<String>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            authorization: None,
        }
    }

    #[must_use]
    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Value for a `WWW-Authenticate` header, set on 401.
    pub challenge: Option<String>,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
            challenge: None,
        }
    }

    fn json(body: &impl Serialize) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::new(200, "application/json", body),
            Err(_) => Self::new(500, "text/plain", "Serialization failed".to_string()),
        }
    }

    fn unauthorized() -> Self {
        Self {
            challenge: Some(format!("Basic realm=\"{AUTH_REALM}\"")),
            ..Self::new(401, "text/plain", "Unauthorized".to_string())
        }
    }

    fn not_found() -> Self {
        Self::new(404, "text/plain", "Not found".to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Page,
    Shoot,
    Restart,
    State,
    NotFound,
}

impl Route {
    /// Match on the path alone; any query string is ignored.
    pub fn from_path(path: &str) -> Self {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        match path {
            "/" => Self::Page,
            "/shoot" => Self::Shoot,
            "/restart" => Self::Restart,
            "/state" => Self::State,
            _ => Self::NotFound,
        }
    }

    const fn needs_auth(self) -> bool {
        matches!(self, Self::Shoot | Self::Restart)
    }
}

/// Acknowledgement for the two commands.
#[derive(Serialize)]
struct Ack {
    success: bool,
    reload: bool,
}

pub struct Router<A> {
    gate: A,
}

impl<A: AuthGate> Router<A> {
    pub const fn new(gate: A) -> Self {
        Self { gate }
    }

    pub fn handle<R: RngCore>(&self, game: &mut Game<R>, request: &Request, now: Instant) -> Response {
        let route = Route::from_path(&request.path);

        if route.needs_auth()
            && let Err(rejection) = self.gate.check(request.authorization.as_deref())
        {
            warn!("Rejected {}: {}", route, loggable(&rejection));
            return Response::unauthorized();
        }

        match route {
            Route::Page => Response::new(200, "text/html", page(game)),
            Route::Shoot => {
                surface::fire(game);
                Response::json(&Ack {
                    success: true,
                    reload: false,
                })
            }
            Route::Restart => {
                surface::restart(game, now);
                Response::json(&Ack {
                    success: true,
                    reload: true,
                })
            }
            Route::State => Response::json(&StateReport::from(Snapshot::of(game))),
            Route::NotFound => Response::not_found(),
        }
    }
}

#[cfg(feature = "defmt")]
const fn loggable(rejection: &surface::Rejection) -> defmt::Display2Format<'_, surface::Rejection> {
    defmt::Display2Format(rejection)
}

#[cfg(not(feature = "defmt"))]
const fn loggable(rejection: &surface::Rejection) -> &surface::Rejection {
    rejection
}

// ── Page ────────────────────────────────────────────────────────────────────

/// What a preview cell shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Player,
    Bullet,
    Enemy(EnemyColor),
    Empty,
}

impl Cell {
    const fn class(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Bullet => "bullet",
            Self::Enemy(EnemyColor::Red) => "enemy-red",
            Self::Enemy(EnemyColor::Green) => "enemy-green",
            Self::Enemy(EnemyColor::Blue) => "enemy-blue",
            Self::Empty => "empty",
        }
    }
}

/// LED shown by preview cell `sample`, spread evenly over the whole track.
pub const fn sample_led(sample: usize) -> usize {
    sample * (TRACK_LEN - 1) / (WEB_SAMPLE_COUNT - 1)
}

/// Player first, then a projectile over an enemy.
pub fn cell_at<R>(game: &Game<R>, led: usize) -> Cell {
    let position = led as i32;
    if position == game.player() {
        return Cell::Player;
    }
    if game.bullets().active().any(|(_, p)| p == position) {
        return Cell::Bullet;
    }
    match game.enemies().iter().find(|e| e.position == position) {
        Some(enemy) => Cell::Enemy(enemy.color),
        None => Cell::Empty,
    }
}

const PAGE_HEAD: &str = "<!DOCTYPE html><html><head>\
<title>Strip Invaders</title>\
<meta name='viewport' content='width=device-width, initial-scale=1.0'>\
<style>\
body{font-family:sans-serif;max-width:900px;margin:0 auto;padding:20px;background:#000;color:#0f0}\
.strip{display:flex;justify-content:space-between;margin:20px 0;height:40px}\
.led{width:8px;height:30px;border-radius:2px;border:1px solid #333}\
.player{background:#0f0}.enemy-red{background:#f00}.enemy-green{background:#0f0}\
.enemy-blue{background:#00f}.bullet{background:#fff}.empty{background:#222}\
.info{display:flex;justify-content:space-between;font-size:18px}\
.legend{margin-top:30px;padding:15px;background:#222;border-radius:5px}\
.swatch{display:inline-block;width:8px;height:16px;margin-right:4px;vertical-align:middle}\
button{padding:20px 40px;font-size:20px;font-weight:bold;border:none;border-radius:5px}\
</style></head><body><h1>Strip Invaders</h1>";

const PAGE_LEGEND: &str = "<div class='legend'><h3>How to Play</h3>\
<p><span class='swatch player'></span> You, on the first LED</p>\
<p><span class='swatch enemy-red'></span><span class='swatch enemy-green'></span>\
<span class='swatch enemy-blue'></span> Enemy waves</p>\
<p><span class='swatch bullet'></span> Your bullets</p>\
<p>Each bullet takes out one enemy. Do not let them reach you.</p></div>";

const PAGE_SCRIPT: &str = "<script>\
let shooting=false;\
function shoot(){if(shooting)return;shooting=true;\
fetch('/shoot').finally(()=>{shooting=false;update();});}\
function restart(){fetch('/restart').then(()=>setTimeout(()=>location.reload(),500));}\
function update(){fetch('/state').then(r=>r.json()).then(d=>{\
for(const k of ['score','lives','enemies','bullets']){document.getElementById(k).textContent=d[k];}\
if(d.gameState==2){location.reload();}});}";

/// The full control page for the current game.
pub fn page<R>(game: &Game<R>) -> String {
    let snapshot = Snapshot::of(game);
    let mut html = String::with_capacity(4096);
    html.push_str(PAGE_HEAD);

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<div class='info'>\
<span>Score: <strong id='score'>{}</strong></span>\
<span>Lives: <strong id='lives'>{}</strong></span>\
<span>Enemies: <strong id='enemies'>{}</strong></span>\
<span>Bullets: <strong id='bullets'>{}</strong></span></div>",
        snapshot.score, snapshot.lives, snapshot.enemies, snapshot.bullets,
    );

    html.push_str("<div class='strip'>");
    for sample in 0..WEB_SAMPLE_COUNT {
        let _ = write!(html, "<div class='led {}'></div>", cell_at(game, sample_led(sample)).class());
    }
    html.push_str("</div>");

    match snapshot.state {
        GameState::Playing => html.push_str("<button onclick='shoot()'>SHOOT</button>"),
        GameState::GameOver => {
            let _ = write!(
                html,
                "<h2>GAME OVER</h2><p>Final score: {}</p><button onclick='restart()'>RESTART</button>",
                snapshot.score
            );
        }
        GameState::Ready => {}
    }

    html.push_str(PAGE_LEGEND);
    html.push_str(PAGE_SCRIPT);
    let _ = write!(
        html,
        "setInterval(update,{});</script></body></html>",
        WEB_REFRESH_INTERVAL.as_millis()
    );
    html
}
