//! Strip Invaders firmware for the badge.
//!
//! Drives a 168-LED WS2812 strip on the badge's LED header. The control pad
//! fires and restarts; if nobody touches it during start-up the game runs
//! offline.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use rand::{
    SeedableRng,
    rngs::SmallRng,
};
#[allow(clippy::wildcard_imports)]
use strip_invaders::*;
use strip_invaders::{
    config::NETWORK_CONNECT_TIMEOUT,
    host::connect,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

static REQUESTS: RequestQueue<CriticalSectionRawMutex> =
    RequestQueue::<CriticalSectionRawMutex>::new();

/// Forwards pad presses into the request queue.
#[embassy_executor::task]
async fn pad_task(mut pad: ControlPad) {
    info!("Control pad task started");
    loop {
        let request = pad.next_request().await;
        REQUESTS.send(request).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = strip_invaders::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let strip: Leds<'static> = resources.strip.into();
    let mut pad: ControlPad = resources.pad.into();

    info!("Press any pad button to take control");
    let transport = match connect(
        async move {
            pad.wait_for_any_press().await;
            pad
        },
        NETWORK_CONNECT_TIMEOUT,
    )
    .await
    {
        Some(pad) => {
            spawner.must_spawn(pad_task(pad));
            Some(ChannelTransport::new(REQUESTS.receiver()))
        }
        None => None,
    };

    let game = Game::new(SmallRng::seed_from_u64(entropy()), Tuning::default(), Instant::now());
    let router = Router::new(Gate::from_credentials(
        option_env!("INVADERS_WEB_USER"),
        option_env!("INVADERS_WEB_PASSWORD"),
    ));

    let mut host = HostLoop::new(game, router, strip, transport, SystemClock);
    host.run().await
}
