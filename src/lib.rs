//! # strip-invaders
//!
//! Space invaders played out on a single addressable LED strip.
//!
//! The player sits on the first LED. Waves of red, green and blue enemies
//! crawl in from the far end and the player shoots white bullets at them.
//! The crate is split into:
//! - **Entities**: fixed-capacity arenas for enemies and projectiles
//! - **Game**: the session and its timer-driven simulation
//! - **Render**: projection of the session onto a [`PixelStrip`]
//! - **Surface / Web**: snapshots, commands, auth gate and request routing
//! - **Host**: the cooperative loop tying it all together
//!
//! With the `badge` feature the crate also provides board support for the
//! ESP32-S3 badge (WS2812 strip over RMT, control pad) and the `invaders`
//! firmware binary.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let game = Game::new(rng, Tuning::default(), clock.now());
//! let mut host = HostLoop::new(game, Router::new(OpenGate), strip, transport, clock);
//! host.run().await
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod config;
pub mod entities;
pub mod game;
pub mod host;
pub mod render;
pub mod surface;
pub mod timer;
pub mod web;

#[cfg(feature = "badge")]
mod board;
#[cfg(feature = "badge")]
mod buttons;
#[cfg(feature = "badge")]
mod leds;

#[cfg(feature = "badge")]
pub use board::*;
#[cfg(feature = "badge")]
pub use buttons::ControlPad;
pub use config::Tuning;
pub use game::{
    Game,
    GameState,
};
pub use host::{
    ChannelTransport,
    HostLoop,
    RequestQueue,
    Transport,
};
#[cfg(feature = "badge")]
pub use leds::Leds;
pub use render::PixelStrip;
pub use surface::{
    AuthGate,
    BasicAuth,
    Gate,
    OpenGate,
    Snapshot,
};
pub use timer::{
    Clock,
    SystemClock,
};
pub use web::{
    Request,
    Response,
    Router,
};
