use defmt::{debug, info, warn};
use embassy_futures::select::{Either, select};
use embassy_time::Ticker;

use watcher_core::press::PressLine;
use watcher_core::supervisor::{ButtonOutcome, PressRefusal, Supervisor};
use watcher_core::uvlo::GateTransition;

use crate::hw::supply::SupplySampler;
use crate::press::{self, ButtonReceiver, HardwarePressLine};

use super::WATCHER_TICK;

/// The watcher's control loop: the sole owner of the supervisor state, the
/// output line, and the ADC. Ticks and button edges are the only wake
/// sources; everything slow (sampling, pulsing) happens here, never in an
/// event source. Profiles without supply supervision carry no sampler and
/// never ask for one.
#[embassy_executor::task]
pub async fn run(
    mut supervisor: Supervisor,
    mut line: HardwarePressLine<'static>,
    mut sampler: Option<SupplySampler<'static>>,
    buttons: ButtonReceiver<'static>,
) -> ! {
    let mut ticker = Ticker::every(WATCHER_TICK);

    loop {
        match select(ticker.next(), buttons.receive()).await {
            Either::First(()) => {
                let actions = supervisor.on_tick();

                if actions.sample_supply {
                    let millivolts = sampler.as_mut().and_then(SupplySampler::read);
                    if millivolts.is_none() {
                        warn!("supply sample unusable; treating as under-voltage");
                    }
                    match supervisor.on_supply_sample(millivolts) {
                        Some(GateTransition::Dropped) => {
                            info!("supply dropped; pulsing blocked");
                        }
                        Some(GateTransition::Recovered) => {
                            info!(
                                "supply recovered; {} tick grace period",
                                supervisor.inhibit_remaining()
                            );
                        }
                        None => {}
                    }
                }

                if let Some(request) = actions.press {
                    // The supply sample above may have tripped the gate on
                    // this same tick; a press authorized before the drop
                    // must not fire.
                    if supervisor.pressing_allowed() {
                        info!("automatic press at tick {}", request.tick);
                        press::execute(&mut line, supervisor.config().pulse_width).await;
                    } else {
                        warn!(
                            "automatic press at tick {} suppressed: supply blocked",
                            request.tick
                        );
                    }
                }
            }
            Either::Second(event) => match supervisor.on_button_edge() {
                ButtonOutcome::Bounced => {
                    debug!("button edge at {} ms bounced", event.at.as_millis());
                }
                ButtonOutcome::Refused(PressRefusal::SupplyBlocked) => {
                    warn!("button press refused: supply blocked");
                }
                ButtonOutcome::Refused(PressRefusal::Inhibited) => {
                    warn!("button press refused: grace period running");
                }
                ButtonOutcome::Pressed(request) => {
                    info!("manual press at tick {}", request.tick);
                    press::execute(&mut line, supervisor.config().pulse_width).await;
                }
            },
        }

        // Redundant with the gating above: holds the line released for as
        // long as the gate is blocked, whatever blocked it.
        if supervisor.output_forced_released() {
            line.release();
        }
    }
}
