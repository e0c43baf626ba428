use embassy_stm32::exti::ExtiInput;
use embassy_time::Instant;

use crate::press::{ButtonEvent, ButtonSender};

/// Forwards falling edges on the button line to the supervisor task.
///
/// A full queue back-pressures here rather than dropping an edge; the
/// supervisor drains edges far faster than the refractory window admits
/// them.
#[embassy_executor::task]
pub async fn run(mut button: ExtiInput<'static>, events: ButtonSender<'static>) -> ! {
    loop {
        button.wait_for_falling_edge().await;
        events.send(ButtonEvent { at: Instant::now() }).await;
    }
}
