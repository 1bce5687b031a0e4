//! nRF52840-DK demo.
//!
//! Buttons 1-3 of the DK (active low, internal pull-up) feed the engine
//! from a 5 ms ticker task. Buttons 1+2 together form a combo that hides
//! their individual events. The main task drains the result channel and
//! logs every settled result over RTT.

#![no_std]
#![no_main]

use defmt::{debug, error, info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Pull};
use embassy_time::{Duration, Ticker, Timer};
use {defmt_rtt as _, panic_probe as _};

use button_bits::config::TICK_INTERVAL_MS;
use button_bits::{
    Button, ButtonId, ButtonParams, ButtonResult, ButtonState, ComboButton, Engine, HistoryBits,
    PinLevels, ResultChannel, RingBuffer,
};

const BTN_1: ButtonId = 0;
const BTN_2: ButtonId = 1;
const BTN_3: ButtonId = 2;
const BTN_1_2: ButtonId = 0x100;

/// Period of the consumer loop.
const DRAIN_INTERVAL_MS: u64 = 20;

static PARAMS: ButtonParams = ButtonParams::DEFAULT;
static COMBO_MEMBERS: [ButtonId; 2] = [BTN_1, BTN_2];
static RESULTS: RingBuffer = RingBuffer::new();

#[embassy_executor::task]
async fn button_task(mut pins: [(ButtonId, Input<'static>); 3]) {
    let mut buttons = [
        Button::new(BTN_1, 0, &PARAMS),
        Button::new(BTN_2, 0, &PARAMS),
        Button::new(BTN_3, 0, &PARAMS),
    ];
    let mut combos = [ComboButton::new(BTN_1_2, 0, &PARAMS, &COMBO_MEMBERS, true)];
    let mut on_result = |result: &ButtonResult| debug!("event: {}", result);

    let built = Engine::builder(&mut buttons, PinLevels::new(&mut pins))
        .combos(&mut combos)
        .channel(&RESULTS)
        .on_result(&mut on_result)
        .build();
    let mut engine = match built {
        Ok(engine) => engine,
        Err(err) => {
            error!("button engine init failed: {} (code {})", err, err.code());
            return;
        }
    };

    // Buttons already held at boot must not report a release.
    engine.reset_states();

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(TICK_INTERVAL_MS)));
    loop {
        engine.tick();
        ticker.next().await;
    }
}

fn describe(result: &ButtonResult) -> &'static str {
    match result.event {
        ButtonState::LongPress if result.repeat_count == 0 => "long press",
        ButtonState::LongPress => "long press repeat",
        ButtonState::Finish => match result.history {
            HistoryBits::SINGLE_CLICK => "single click",
            HistoryBits::DOUBLE_CLICK => "double click",
            HistoryBits::TRIPLE_CLICK => "triple click",
            HistoryBits::LONG_PRESS_HOLD_END => "long press released",
            HistoryBits::SINGLE_CLICK_THEN_LONG_PRESS => "click then long press",
            _ => "sequence",
        },
        _ => "event",
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("button-bits demo starting");

    let pins = [
        (BTN_1, Input::new(p.P0_11, Pull::Up)),
        (BTN_2, Input::new(p.P0_12, Pull::Up)),
        (BTN_3, Input::new(p.P0_24, Pull::Up)),
    ];
    unwrap!(spawner.spawn(button_task(pins)));

    let mut overwritten = 0;
    loop {
        while let Some(result) = RESULTS.read() {
            info!("button {:#x}: {} ({})", result.id, describe(&result), result);
        }
        let total = RESULTS.overwrite_count();
        if total != overwritten {
            debug!("{} results lost to overwrite", total - overwritten);
            overwritten = total;
        }
        Timer::after(Duration::from_millis(DRAIN_INTERVAL_MS)).await;
    }
}
