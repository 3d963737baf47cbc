use chrono::Utc;
use rftime::core::NodeConfig;
use rftime::link::sim::{ManualClock, SimulatedRadio, Transmission};
use rftime::link::LinkPoller;
use rftime::protocol::{TimePacket, TimeSync, WireFormat};
use rftime::status::TracingSink;
use rftime::time::{MemoryRtc, RtcStore, Timestamp};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> rftime::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Flush status every 5 failures so the demo shows some output
    let mut config = NodeConfig::default();
    config.flush_every = 5;
    config.poll_timeout = Duration::from_millis(200);
    config.bound.max_attempts = Some(100);

    let now = TimePacket::from_datetime(&Utc::now());
    let mut garbage = vec![0u8; 32];
    garbage[..5].copy_from_slice(b"HELLO");

    let mut script = vec![Transmission::Silence; 7];
    script.push(Transmission::frame(garbage));
    script.push(Transmission::frame(now.encode(WireFormat::Legacy)));
    // Every scripted frame, garbage included, is lost with even odds
    script.extend((0..10).map(|_| Transmission::delayed(20, now.encode(WireFormat::Current))));

    let radio = SimulatedRadio::new().with_script(script).with_loss(0.5, 42);
    let link = LinkPoller::new(radio, ManualClock::new(u32::MAX - 1_000, 1), &config.radio)?;
    let rtc = MemoryRtc::new(Timestamp::EPOCH);

    println!("Listening for time broadcasts:");
    println!("- Format: {:?}", config.format);
    println!("- Poll window: {:?}", config.poll_timeout);
    println!("- RTC before sync: {}", rtc.get());

    let mut sync = TimeSync::new(link, rtc, TracingSink, &config)?;
    let timestamp = sync.synchronize()?;

    let status = sync.status();
    println!("\nSynchronized to {}", timestamp);
    println!("- Attempts: {}", status.attempts());
    println!("- Timeouts: {}", status.timeouts());
    println!("- Rejected: {}", status.rejections());
    println!("- Frames lost in the air: {}", sync.link().radio().lost());
    println!("- RTC after sync: {}", sync.rtc().get());

    Ok(())
}
