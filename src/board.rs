//! Pin assignments and bring-up for the ESP32-S3 badge.

use esp_hal::{
    Blocking,
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    rmt::{
        Rmt,
        Tx,
        TxChannelConfig,
        TxChannelCreator as _,
    },
    rom,
    time::Rate,
};

// ── Pin / peripheral assignments ────────────────────────────────────────────

assign_resources! {
    pub Resources<'d> {
        strip: StripResources<'d> {
            power: GPIO17,
            io: GPIO18,
            rmt: RMT,
        },
        // A, Start and Select on the badge.
        pad: PadResources<'d> {
            fire: GPIO13,
            restart: GPIO12,
            status: GPIO45,
        },
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Steps through an intermediate frequency before reaching the target,
/// which the hardware requires.
fn set_cpu_clock(cpu_clock_speed: CpuClock) {
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .cpu_per_conf()
        .modify(|_, w| unsafe {
            let _ = w.pll_freq_sel().set_bit();
            w.cpuperiod_sel().bits(match cpu_clock_speed {
                CpuClock::_80MHz => 0,
                CpuClock::_160MHz => 1,
                CpuClock::_240MHz => 2,
                _ => panic!("Unsupported CPU clock speed"),
            })
        });

    rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
}

/// Initialise the badge and return the raw peripheral set.
///
/// Call once at the top of `main`, then break the peripherals up with
/// [`split_resources!`].
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    set_cpu_clock(CpuClock::_160MHz);
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

/// Seed for the game's PRNG, read from the hardware RNG.
pub fn entropy() -> u64 {
    let rng = esp_hal::rng::Rng::new();
    (u64::from(rng.random()) << 32) | u64::from(rng.random())
}

// ── Resource → peripheral conversions ───────────────────────────────────────

impl<'a> From<StripResources<'a>> for esp_hal::rmt::Channel<'a, Blocking, Tx> {
    fn from(res: StripResources<'a>) -> Self {
        let _ws_power = Output::new(res.power, Level::High, OutputConfig::default());
        let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).unwrap();
        let tx_config = TxChannelConfig::default().with_clk_divider(1);
        rmt.channel0.configure_tx(res.io, tx_config).unwrap()
    }
}
