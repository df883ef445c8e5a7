//! Projects a [`Game`] onto the LED strip.

use palette::{
    Srgb,
    named,
};

use crate::{
    entities::{
        EnemyColor,
        on_track,
    },
    game::Game,
};

pub const OFF: Srgb<u8> = Srgb::new(0, 0, 0);
pub const PLAYER_COLOR: Srgb<u8> = named::LIME;
pub const BULLET_COLOR: Srgb<u8> = named::WHITE;

pub const fn enemy_color(color: EnemyColor) -> Srgb<u8> {
    match color {
        EnemyColor::Red => named::RED,
        EnemyColor::Green => named::LIME,
        EnemyColor::Blue => named::BLUE,
    }
}

/// Scale a color by a 0..=255 brightness, NeoPixel style.
pub const fn dim(color: Srgb<u8>, brightness: u8) -> Srgb<u8> {
    const fn channel(c: u8, brightness: u8) -> u8 {
        ((c as u16 * (brightness as u16 + 1)) >> 8) as u8
    }
    Srgb::new(
        channel(color.red, brightness),
        channel(color.green, brightness),
        channel(color.blue, brightness),
    )
}

/// Pixels in transmission order for a strip chained after `skip` other LEDs.
///
/// The skipped LEDs are kept dark and every track pixel is dimmed.
pub fn wire_order(
    frame: &[Srgb<u8>],
    skip: usize,
    brightness: u8,
) -> impl Iterator<Item = Srgb<u8>> + '_ {
    core::iter::repeat_n(OFF, skip).chain(frame.iter().map(move |c| dim(*c, brightness)))
}

/// A strip of addressable pixels with an in-memory frame.
#[allow(async_fn_in_trait)]
pub trait PixelStrip {
    /// Number of pixels.
    fn len(&self) -> usize;

    /// Turn every pixel in the pending frame off.
    fn clear(&mut self);

    /// Set one pixel in the pending frame.
    fn set(&mut self, index: usize, color: Srgb<u8>);

    /// Push the pending frame to the hardware.
    async fn show(&mut self);
}

/// Draw the current state of `game` and show it.
///
/// Enemies and projectiles off the track are skipped. Where two things share
/// a pixel the later draw wins: player, then enemies, then projectiles.
pub async fn render<R, S: PixelStrip>(game: &Game<R>, strip: &mut S) {
    let len = strip.len();
    let visible = |position: i32| on_track(position) && (position as usize) < len;

    strip.clear();

    if visible(game.player()) {
        strip.set(game.player() as usize, PLAYER_COLOR);
    }
    for enemy in game.enemies().iter().filter(|e| visible(e.position)) {
        strip.set(enemy.position as usize, enemy_color(enemy.color));
    }
    for (_, position) in game.bullets().active().filter(|&(_, p)| visible(p)) {
        strip.set(position as usize, BULLET_COLOR);
    }

    strip.show().await;
}

/// Render only if something changed since the last frame.
///
/// Returns whether a frame was pushed.
pub async fn render_if_dirty<R, S: PixelStrip>(game: &mut Game<R>, strip: &mut S) -> bool {
    if !game.is_dirty() {
        return false;
    }
    render(game, strip).await;
    game.mark_clean();
    true
}
