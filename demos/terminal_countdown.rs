//! Prints a flip clock to the terminal.
//!
//! ```text
//! cargo run --example terminal_countdown -- 2027-01-01
//! cargo run --example terminal_countdown -- '{"segments": {"days": false}, "target": "2026-12-31"}'
//! ```

use std::io::Write;

use calloop::{EventLoop, LoopSignal};
use flipclock::prelude::*;

struct TerminalSink {
    signal: LoopSignal,
}

fn card(card: &CardFrame) -> String {
    match card.bottom_flap {
        // Show the incoming digit once the upper flap has fallen.
        Some(flap) if flap.rotation.0 < 90.0 => format!("[{}]", flap.digit),
        Some(_) => format!("[{}]", card.top),
        None => format!(" {} ", card.bottom),
    }
}

impl FrameSink for TerminalSink {
    fn present(&mut self, frame: &ClockFrame) {
        let line: Vec<String> = frame
            .items
            .iter()
            .map(|item| match item {
                FrameItem::Group(group) => {
                    let digits: String = group.cards.iter().map(card).collect();
                    match &group.label {
                        Some(label) => format!("{digits} {label}"),
                        None => digits,
                    }
                }
                FrameItem::Separator { kind, .. } => match kind {
                    SeparatorKind::Colon => ":".to_string(),
                    SeparatorKind::Dot => ".".to_string(),
                    SeparatorKind::None => String::new(),
                },
            })
            .collect();

        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\r\x1b[2K{}", line.join("  "));
        let _ = stdout.flush();
    }

    fn completed(&mut self) {
        println!();
        log::info!("countdown finished");
        self.signal.stop();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let colons = SeparatorConfig {
        kind: SeparatorKind::Colon,
        ..SeparatorConfig::default()
    };
    let config = match std::env::args().nth(1) {
        Some(arg) if arg.trim_start().starts_with('{') => FlipClockConfig::from_json(&arg)?,
        Some(target) => FlipClockConfig::new().target_str(target).separator(colons),
        None => FlipClockConfig::new().separator(colons),
    };

    let mut event_loop: EventLoop<()> = EventLoop::try_new()?;
    let clock = FlipClock::with_global_registry(config, chrono::Utc::now());
    let _driver = ClockDriver::attach(
        clock,
        SystemTimeSource,
        TerminalSink {
            signal: event_loop.get_signal(),
        },
        &event_loop.handle(),
    )?;

    event_loop.run(None, &mut (), |_| {})?;
    Ok(())
}
