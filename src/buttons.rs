//! Badge control pad: the buttons that stand in for the web surface when no
//! network is attached.
//!
//! A press is turned into the same [`Request`] a browser would send, so the
//! game only ever sees one command path.

use embassy_futures::select::{
    Either3,
    select3,
};
use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    PadResources,
    web::Request,
};

/// Fire, restart and status buttons.
pub struct ControlPad {
    pub fire: Input<'static>,
    pub restart: Input<'static>,
    /// Wired active-high, like the badge's select button.
    pub status: Input<'static>,
}

const DEBOUNCE_MS: u64 = 20;

impl From<PadResources<'static>> for ControlPad {
    fn from(res: PadResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            fire: Input::new(res.fire, pull_up),
            restart: Input::new(res.restart, pull_up),
            status: Input::new(res.status, InputConfig::default().with_pull(Pull::Down)),
        }
    }
}

impl ControlPad {
    /// Wait for the next button press and translate it into a request.
    pub async fn next_request(&mut self) -> Request {
        let path = match select3(
            Self::debounce_press(&mut self.fire),
            Self::debounce_press(&mut self.restart),
            Self::debounce_press_high(&mut self.status),
        )
        .await
        {
            Either3::First(()) => "/shoot",
            Either3::Second(()) => "/restart",
            Either3::Third(()) => "/state",
        };
        debug!("Pad request {}", path);
        Request::get(path)
    }

    /// Resolves once any pad button has been pressed and released.
    ///
    /// Used as the attach handshake: the pad counts as connected when a player
    /// touches it.
    pub async fn wait_for_any_press(&mut self) {
        match select3(
            Self::debounce_press(&mut self.fire),
            Self::debounce_press(&mut self.restart),
            Self::debounce_press_high(&mut self.status),
        )
        .await
        {
            Either3::First(()) => Self::debounce_release(&mut self.fire).await,
            Either3::Second(()) => Self::debounce_release(&mut self.restart).await,
            Either3::Third(()) => Self::debounce_release_low(&mut self.status).await,
        }
    }

    /// Wait for a debounced button press (falling edge, active low).
    pub async fn debounce_press(button: &mut Input<'_>) {
        loop {
            button.wait_for_falling_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_low() {
                return;
            }
        }
    }

    /// Wait for a debounced button release (rising edge).
    pub async fn debounce_release(button: &mut Input<'_>) {
        loop {
            button.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_high() {
                return;
            }
        }
    }

    /// Active-high counterpart of [`debounce_press`](Self::debounce_press).
    pub async fn debounce_press_high(button: &mut Input<'_>) {
        loop {
            button.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_high() {
                return;
            }
        }
    }

    /// Active-high counterpart of [`debounce_release`](Self::debounce_release).
    pub async fn debounce_release_low(button: &mut Input<'_>) {
        loop {
            button.wait_for_falling_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_low() {
                return;
            }
        }
    }
}
