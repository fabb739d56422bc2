//! # Example: wide_topic
//!
//! Fan-out to a topic with many subscribers.
//!
//! With `n` subscribers the engine computes a partition of `n / 2 + 1`. Once
//! that reaches `partition_threshold` the first partition is served by a
//! helper task while the dispatcher serves the rest, so one slow subscriber
//! holds up only its own half.
//!
//! ```text
//! publish(tick) ─► Dispatcher ─┬─► helper:  s0 .. s4   (partition = 9 / 2 + 1)
//!                              └─► inline:  s5 .. s8
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=trace cargo run --example wide_topic
//! ```

use std::time::{Duration, Instant};

use eventvisor::{EngineConfig, Event, EventEngine, Subscriber, Topic};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TICK: Topic = Topic::from_static("clock.tick");
const SUBSCRIBERS: usize = 9;
const TICKS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventvisor=debug,wide_topic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = EngineConfig::default();
    info!(
        split_at = cfg.split_at_subscribers(),
        subscribers = SUBSCRIBERS,
        "fan-out splits from this many subscribers"
    );
    let engine = EventEngine::<u32>::builder(cfg).build()?;
    engine.register_events([TICK]);

    let started = Instant::now();
    let mut readers = Vec::with_capacity(SUBSCRIBERS);
    for i in 0..SUBSCRIBERS {
        let (sub, mut rx) = Subscriber::channel(format!("s{i}"), 1);
        engine.subscribe(&TICK, sub)?;

        // Subscriber 0 is slow; it only delays the partition it belongs to.
        let pause = if i == 0 {
            Duration::from_millis(40)
        } else {
            Duration::from_millis(1)
        };
        readers.push(tokio::spawn(async move {
            let mut last = None;
            while let Some(n) = rx.recv().await {
                tokio::time::sleep(pause).await;
                last = Some(n);
            }
            (i, last, started.elapsed())
        }));
    }

    for n in 1..=TICKS {
        engine.publish(Event::new(TICK, n)).await?;
    }
    engine.shutdown().await?;

    for r in readers {
        let (i, last, elapsed) = r.await?;
        info!(subscriber = i, last = ?last, elapsed_ms = elapsed.as_millis() as u64, "done");
    }
    Ok(())
}
