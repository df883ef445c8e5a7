//! WS2812 addressable LED strip driver using the RMT peripheral.
//!
//! The game track is an external strip chained after the badge's 10 onboard
//! LEDs on the same data line (GPIO18). The onboard LEDs are sent dark so
//! track pixel 0 is the first LED of the external strip.

extern crate alloc;

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::Level,
    rmt::{
        PulseCode,
        Tx,
    },
};
use palette::Srgb;

use crate::{
    StripResources,
    config::{
        LED_BRIGHTNESS,
        ONBOARD_LEDS,
        TRACK_LEN,
    },
    render::{
        OFF,
        PixelStrip,
        wire_order,
    },
};

/// WS2812 strip driver for `N` LEDs.
///
/// Maintains an in-memory framebuffer that is flushed to hardware
/// with [`update`](Leds::update). Brightness is applied at flush time so the
/// framebuffer always holds the colors the game asked for.
pub struct Leds<'a, const N: usize = TRACK_LEN> {
    channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
    framebuffer: [Srgb<u8>; N],
    brightness: u8,
}

impl<'a, const N: usize> Leds<'a, N> {
    pub const fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [OFF; N],
            brightness: LED_BRIGHTNESS,
        }
    }

    pub const fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    /// Flush the framebuffer to the physical LEDs.
    pub async fn update(&mut self) {
        let Some(channel) = self.channel.take() else {
            error!("RMT channel lost during previous transmission");
            return;
        };

        let pulses = wire_order(&self.framebuffer, ONBOARD_LEDS, self.brightness)
            .flat_map(|c| {
                // WS2812 expects GRB byte order
                [
                    Self::byte_to_pulses(c.green),
                    Self::byte_to_pulses(c.red),
                    Self::byte_to_pulses(c.blue),
                ]
                .into_iter()
                .flatten()
            })
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(e) => {
                error!("RMT transmit failed: {}", e);
                return;
            }
        };

        self.channel = Some(match transaction.wait() {
            Ok(ch) => ch,
            Err((err, ch)) => {
                error!("RMT transaction failed: {}", err);
                ch
            }
        });

        // WS2812 reset time
        Timer::after(Duration::from_micros(50)).await;
    }

    /// Set a single LED by index. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, color: Srgb<u8>) {
        if let Some(led) = self.framebuffer.get_mut(index) {
            *led = color;
        }
    }

    /// Turn all LEDs off.
    pub fn clear(&mut self) {
        self.framebuffer.fill(OFF);
    }

    /// Number of LEDs on the strip.
    pub const fn len(&self) -> usize {
        N
    }

    // ── Internal helpers ────────────────────────────────────────────────

    /// WS2812 bit timing at 40 MHz RMT clock.
    const fn bit_to_pulse(bit: bool) -> PulseCode {
        if bit {
            // '1': 0.8 µs high (32 ticks), 0.45 µs low (18 ticks)
            PulseCode::new(Level::High, 32, Level::Low, 18)
        } else {
            // '0': 0.4 µs high (16 ticks), 0.85 µs low (34 ticks)
            PulseCode::new(Level::High, 16, Level::Low, 34)
        }
    }

    fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
        let mut pulses = [PulseCode::default(); 8];
        for (i, pulse) in pulses.iter_mut().enumerate() {
            *pulse = Self::bit_to_pulse((byte >> (7 - i)) & 1 != 0);
        }
        pulses
    }
}

impl<const N: usize> PixelStrip for Leds<'_, N> {
    fn len(&self) -> usize {
        N
    }

    fn clear(&mut self) {
        Leds::clear(self);
    }

    fn set(&mut self, index: usize, color: Srgb<u8>) {
        Leds::set(self, index, color);
    }

    async fn show(&mut self) {
        self.update().await;
    }
}

impl<'a, const N: usize> From<StripResources<'a>> for Leds<'a, N> {
    fn from(res: StripResources<'a>) -> Self {
        Leds::new(res.into())
    }
}
