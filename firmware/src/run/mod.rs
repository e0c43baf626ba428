use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::{self, Adc};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, OutputOpenDrain, Pull, Speed};
use embassy_stm32::rcc::{LsConfig, LseConfig, mux::ClockMux};
use embassy_stm32::time::Hertz;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};

use watcher_core::config::WatcherConfig;
use watcher_core::supervisor::Supervisor;
use watcher_core::uvlo::GateTransition;

use crate::hw::supply::SupplySampler;
use crate::press::{self, HardwarePressLine};

mod button_task;
mod watcher_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

hal::bind_interrupts!(struct Irqs {
    ADC1_COMP => adc::InterruptHandler<hal::peripherals::ADC1>;
});

/// Nominal scheduler tick. Every interval in [`WatcherConfig`] is counted in
/// these; the LSE-backed time base keeps them crystal-accurate rather than
/// the coarse low-power-oscillator ticks the design tolerates.
pub(super) const WATCHER_TICK: Duration = Duration::from_secs(1);

#[cfg(not(feature = "minimal"))]
const PROFILE: WatcherConfig = WatcherConfig::supervised();
#[cfg(feature = "minimal")]
const PROFILE: WatcherConfig = WatcherConfig::minimal();

pub(super) static BUTTON_EVENTS: press::ButtonQueue = Channel::new();

/// MSI range 0 system clock with the LSE feeding the RTC domain; the
/// executor idles in WFE between ticks so nearly all wall time is spent
/// asleep at the lowest clock the part offers.
fn low_power_rcc() -> hal::rcc::Config {
    hal::rcc::Config {
        msi: Some(hal::rcc::MSIRange::RANGE66K),
        hsi: false,
        hse: None,
        pll: None,
        sys: hal::rcc::Sysclk::MSI,
        ahb_pre: hal::rcc::AHBPrescaler::DIV1,
        apb1_pre: hal::rcc::APBPrescaler::DIV1,
        apb2_pre: hal::rcc::APBPrescaler::DIV1,
        ls: LsConfig {
            rtc: hal::rcc::RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz::hz(32768),
                mode: hal::rcc::LseMode::Oscillator(hal::rcc::LseDrive::Low),
            }),
        },
        voltage_scale: hal::rcc::VoltageScale::RANGE3,
        mux: ClockMux::default(),
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let mut config = hal::Config::default();
    config.rcc = low_power_rcc();

    // Unused pins stay in their analog reset state for lowest leakage.
    let hal::Peripherals {
        PA0,
        PA3,
        EXTI3,
        ADC1,
        ..
    } = hal::init(config);

    let line = HardwarePressLine::new(OutputOpenDrain::new(PA0, Level::High, Speed::Low));
    let button = ExtiInput::new(PA3, EXTI3, Pull::Up);

    let mut supervisor = Supervisor::new(PROFILE).expect("built-in profile validates");
    info!(
        "watcher boot; supply supervision: {}",
        supervisor.config().supervises_supply()
    );

    // Profiles without supply supervision never sample; leave the analog
    // front-end in its reset state for those builds.
    let mut sampler = supervisor
        .config()
        .supervises_supply()
        .then(|| SupplySampler::new(Adc::new(ADC1, Irqs)));

    if let Some(sampler) = sampler.as_mut() {
        wait_for_power_good(&mut supervisor, sampler).await;
        info!(
            "supply confirmed; {} tick grace period",
            supervisor.inhibit_remaining()
        );
    }

    spawner
        .spawn(button_task::run(button, BUTTON_EVENTS.sender()))
        .expect("failed to spawn button task");
    spawner
        .spawn(watcher_task::run(
            supervisor,
            line,
            sampler,
            BUTTON_EVENTS.receiver(),
        ))
        .expect("failed to spawn watcher task");

    core::future::pending::<()>().await;
}

/// Holds boot until the gate confirms the rail, sampling at the same
/// cadence the runtime check runs on.
///
/// Loops forever on a permanently low supply; the watcher must never press
/// the target's button while the shared rail is sagging.
async fn wait_for_power_good(supervisor: &mut Supervisor, sampler: &mut SupplySampler<'_>) {
    let between_samples = WATCHER_TICK * supervisor.config().supply_check_ticks;
    loop {
        let millivolts = sampler.read();
        if supervisor.on_supply_sample(millivolts) == Some(GateTransition::Recovered) {
            return;
        }
        Timer::after(between_samples).await;
    }
}
