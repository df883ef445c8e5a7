//! Compile-time layout of the strip and the runtime tuning knobs.

use embassy_time::Duration;

// ── Strip geometry ──────────────────────────────────────────────────────────

/// Number of addressable LEDs on the track.
pub const TRACK_LEN: usize = 168;

/// The player never moves; it sits on the first LED.
pub const PLAYER_POSITION: i32 = 0;

/// Onboard badge LEDs sitting ahead of the track on the same data line.
pub const ONBOARD_LEDS: usize = 10;

/// Global brightness applied by the strip driver (0..=255).
pub const LED_BRIGHTNESS: u8 = 150;

// ── Arena capacities ────────────────────────────────────────────────────────

pub const MAX_ENEMIES: usize = 20;
pub const MAX_BULLETS: usize = 5;

/// Marker position for enemy slots past the live count.
pub const EMPTY_SLOT: i32 = -999;

// ── Rules ───────────────────────────────────────────────────────────────────

pub const STARTING_LIVES: u32 = 3;
pub const SCORE_PER_KILL: u32 = 100;

/// Distance from the far end of the track where a wave starts.
pub const WAVE_OFFSET_FROM_END: usize = 15;

/// First LED of a freshly spawned wave.
pub const WAVE_START: i32 = (TRACK_LEN - WAVE_OFFSET_FROM_END) as i32;

// ── Control surface ─────────────────────────────────────────────────────────

/// Cells drawn in the web page's strip preview.
pub const WEB_SAMPLE_COUNT: usize = 84;

/// Polling period baked into the page script.
pub const WEB_REFRESH_INTERVAL: Duration = Duration::from_millis(2000);

/// How long startup waits for the command transport before going offline.
pub const NETWORK_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Depth of the request queue between input tasks and the host loop.
pub const REQUEST_QUEUE_DEPTH: usize = 4;

pub const AUTH_REALM: &str = "strip-invaders";

// ── Tuning ──────────────────────────────────────────────────────────────────

/// Simulation knobs that can be adjusted per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuning {
    /// Period of the enemy advance.
    pub enemy_step: Duration,
    /// Period of the projectile advance.
    pub bullet_step: Duration,
    /// Chance, in percent, that a tick tries to spawn a wave.
    pub spawn_chance_percent: u32,
    /// Waves only spawn while fewer enemies than this are alive.
    pub spawn_soft_cap: usize,
    pub wave_size: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enemy_step: Duration::from_millis(2000),
            bullet_step: Duration::from_millis(1),
            spawn_chance_percent: 3,
            spawn_soft_cap: 12,
            wave_size: 8,
        }
    }
}

impl Tuning {
    /// Same timings, but waves only appear on restart.
    #[must_use]
    pub const fn without_spawns(mut self) -> Self {
        self.spawn_chance_percent = 0;
        self
    }
}
