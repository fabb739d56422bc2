//! End-to-end behaviour of the event engine: registration, delivery order,
//! backpressure and drain-to-completion shutdown.

use std::time::Duration;

use eventvisor::{EngineConfig, EngineError, EngineState, Event, EventEngine, Subscriber, Topic};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const ORDER_CREATED: Topic = Topic::from_static("order.created");
const WAIT: Duration = Duration::from_secs(5);

fn engine<P: Clone + Send + 'static>() -> EventEngine<P> {
    EventEngine::builder(EngineConfig::default())
        .build()
        .expect("default config is valid")
}

/// Collects everything a subscriber receives until its channel closes.
fn collect<P: Send + 'static>(mut rx: mpsc::Receiver<P>) -> JoinHandle<Vec<P>> {
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(p) = rx.recv().await {
            seen.push(p);
        }
        seen
    })
}

async fn finish<P>(h: JoinHandle<Vec<P>>) -> Vec<P> {
    tokio::time::timeout(WAIT, h)
        .await
        .expect("subscriber channel should close")
        .expect("reader task")
}

async fn shutdown<P: Clone + Send + 'static>(engine: &EventEngine<P>) {
    tokio::time::timeout(WAIT, engine.shutdown())
        .await
        .expect("shutdown should finish")
        .expect("dispatcher exits cleanly");
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registering_twice_keeps_one_subscriber_list() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);
    let (s, _rx) = Subscriber::channel("s1", 1);
    engine.subscribe(&ORDER_CREATED, s).unwrap();

    engine.register_events([ORDER_CREATED]);

    assert_eq!(engine.topics(), vec![ORDER_CREATED]);
    assert_eq!(engine.subscriber_count(&ORDER_CREATED), Some(1));
    shutdown(&engine).await;
}

#[tokio::test]
async fn unknown_topic_is_rejected_without_side_effects() {
    let engine = engine::<&'static str>();
    let unknown = Topic::from_static("no.such.topic");

    let (s, _rx) = Subscriber::channel("s1", 1);
    let err = engine.subscribe(&unknown, s).unwrap_err();
    assert_eq!(
        err,
        EngineError::UnknownTopic {
            topic: unknown.clone()
        }
    );

    let err = engine.publish(Event::new(unknown.clone(), "x")).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownTopic { .. }));
    let err = engine.try_publish(Event::new(unknown.clone(), "x")).unwrap_err();
    assert!(matches!(err, EngineError::UnknownTopic { .. }));
    assert!(engine.topics().is_empty());
    assert_eq!(engine.subscriber_count(&unknown), None);

    // The queue holds nothing from the rejected calls.
    engine.register_events([ORDER_CREATED]);
    let (s, rx) = Subscriber::channel("s1", 4);
    engine.subscribe(&ORDER_CREATED, s).unwrap();
    let reader = collect(rx);
    engine.publish(Event::new(ORDER_CREATED, "first")).await.unwrap();
    shutdown(&engine).await;
    assert_eq!(finish(reader).await, ["first"]);
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_subscribers_receive_every_payload_in_order() {
    let engine = engine::<&'static str>();
    engine.register_events([ORDER_CREATED]);

    let (s1, rx1) = Subscriber::channel("s1", 2);
    let (s2, rx2) = Subscriber::channel("s2", 2);
    engine.subscribe(&ORDER_CREATED, s1).unwrap();
    engine.subscribe(&ORDER_CREATED, s2).unwrap();
    let r1 = collect(rx1);
    let r2 = collect(rx2);

    for p in ["A", "B", "C"] {
        engine.publish(Event::new(ORDER_CREATED, p)).await.unwrap();
    }
    shutdown(&engine).await;

    assert_eq!(finish(r1).await, ["A", "B", "C"]);
    assert_eq!(finish(r2).await, ["A", "B", "C"]);
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[tokio::test]
async fn narrow_topic_preserves_publish_order_for_every_subscriber() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);

    // 5 subscribers: partition size 3, below the split threshold.
    let readers: Vec<_> = (0..5)
        .map(|i| {
            let (s, rx) = Subscriber::channel(format!("s{i}"), 1);
            engine.subscribe(&ORDER_CREATED, s).unwrap();
            collect(rx)
        })
        .collect();

    for n in 1..=30 {
        engine.publish(Event::new(ORDER_CREATED, n)).await.unwrap();
    }
    shutdown(&engine).await;

    let expected: Vec<u32> = (1..=30).collect();
    for r in readers {
        assert_eq!(finish(r).await, expected);
    }
}

#[tokio::test]
async fn wide_topic_delivers_every_payload_exactly_once() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);

    // 9 subscribers: partition size 5, split across a helper.
    let readers: Vec<_> = (0..9)
        .map(|i| {
            let (s, rx) = Subscriber::channel(format!("s{i}"), 1);
            engine.subscribe(&ORDER_CREATED, s).unwrap();
            collect(rx)
        })
        .collect();

    for n in 1..=25 {
        engine.publish(Event::new(ORDER_CREATED, n)).await.unwrap();
    }
    shutdown(&engine).await;

    let expected: Vec<u32> = (1..=25).collect();
    for r in readers {
        let mut got = finish(r).await;
        got.sort_unstable();
        assert_eq!(got, expected);
    }
}

#[tokio::test]
async fn publishing_without_subscribers_is_accepted() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);
    engine.publish(Event::new(ORDER_CREATED, 1)).await.unwrap();
    shutdown(&engine).await;
}

#[tokio::test]
async fn dangling_subscriber_does_not_block_the_rest() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);
    engine
        .subscribe(&ORDER_CREATED, Subscriber::dangling("unwired"))
        .unwrap();
    let (s, rx) = Subscriber::channel("wired", 4);
    engine.subscribe(&ORDER_CREATED, s).unwrap();
    let reader = collect(rx);

    engine.publish(Event::new(ORDER_CREATED, 7)).await.unwrap();
    shutdown(&engine).await;

    assert_eq!(finish(reader).await, [7]);
}

#[tokio::test]
async fn departed_listener_does_not_block_the_rest() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);
    let (gone, rx_gone) = Subscriber::channel("gone", 1);
    drop(rx_gone);
    engine.subscribe(&ORDER_CREATED, gone).unwrap();
    let (s, rx) = Subscriber::channel("alive", 4);
    engine.subscribe(&ORDER_CREATED, s).unwrap();
    let reader = collect(rx);

    for n in 0..3 {
        engine.publish(Event::new(ORDER_CREATED, n)).await.unwrap();
    }
    shutdown(&engine).await;

    assert_eq!(finish(reader).await, [0, 1, 2]);
}

// ---------------------------------------------------------------------------
// Backpressure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_pushes_back_on_producers() {
    let engine = EventEngine::<u32>::builder(EngineConfig {
        queue_capacity: 1,
        ..EngineConfig::default()
    })
    .build()
    .unwrap();
    engine.register_events([ORDER_CREATED]);
    let (s, rx) = Subscriber::channel("slow", 1);
    engine.subscribe(&ORDER_CREATED, s).unwrap();

    // Nobody reads yet: at most one payload buffered at the subscriber, one in
    // the dispatcher's hands and one in the queue.
    let mut accepted = 0u32;
    let mut saw_full = false;
    for n in 0..10 {
        match engine.try_publish(Event::new(ORDER_CREATED, n)) {
            Ok(()) => accepted += 1,
            Err(EngineError::QueueFull { .. }) => {
                saw_full = true;
                break;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(saw_full, "queue should fill up");
    assert!((1..=3).contains(&accepted), "accepted {accepted}");

    let blocked = tokio::time::timeout(
        Duration::from_millis(50),
        engine.publish(Event::new(ORDER_CREATED, 99)),
    )
    .await;
    assert!(blocked.is_err(), "publish should wait for room");

    let reader = collect(rx);
    shutdown(&engine).await;
    let got = finish(reader).await;
    assert_eq!(got, (0..accepted).collect::<Vec<_>>());
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_queued_before_shutdown_is_still_delivered() {
    let token = CancellationToken::new();
    let engine = EventEngine::<&'static str>::builder(EngineConfig::default())
        .with_shutdown(token.clone())
        .build()
        .unwrap();
    engine.register_events([ORDER_CREATED]);
    let (s1, mut rx1) = Subscriber::channel("s1", 1);
    let (s2, mut rx2) = Subscriber::channel("s2", 1);
    engine.subscribe(&ORDER_CREATED, s1).unwrap();
    engine.subscribe(&ORDER_CREATED, s2).unwrap();

    engine.publish(Event::new(ORDER_CREATED, "last")).await.unwrap();
    token.cancel();
    tokio::time::timeout(WAIT, engine.stopped()).await.unwrap();

    assert_eq!(rx1.recv().await, Some("last"));
    assert_eq!(rx1.recv().await, None);
    assert_eq!(rx2.recv().await, Some("last"));
    assert_eq!(rx2.recv().await, None);
}

#[tokio::test]
async fn full_queue_is_drained_on_shutdown() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);
    let (s, rx) = Subscriber::channel("s", 1);
    engine.subscribe(&ORDER_CREATED, s).unwrap();

    // Fill the queue while the subscriber is not reading.
    let mut accepted = Vec::new();
    for n in 0..20 {
        if engine.try_publish(Event::new(ORDER_CREATED, n)).is_ok() {
            accepted.push(n);
        }
    }
    assert!(!accepted.is_empty());

    let shutting_down = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.shutdown().await })
    };
    let got = finish(collect(rx)).await;
    shutting_down.await.unwrap().unwrap();

    assert_eq!(got, accepted);
}

#[tokio::test]
async fn wide_topic_helpers_finish_before_channels_close() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);

    let readers: Vec<_> = (0..12)
        .map(|i| {
            let (s, mut rx) = Subscriber::channel(format!("s{i}"), 1);
            engine.subscribe(&ORDER_CREATED, s).unwrap();
            tokio::spawn(async move {
                let mut n = 0usize;
                while rx.recv().await.is_some() {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    n += 1;
                }
                n
            })
        })
        .collect();

    for n in 0..10 {
        engine.publish(Event::new(ORDER_CREATED, n)).await.unwrap();
    }
    shutdown(&engine).await;

    for r in readers {
        assert_eq!(tokio::time::timeout(WAIT, r).await.unwrap().unwrap(), 10);
    }
}

#[tokio::test]
async fn calls_after_shutdown_are_rejected() {
    let engine = engine::<u32>();
    engine.register_events([ORDER_CREATED]);
    shutdown(&engine).await;
    assert_eq!(engine.state(), EngineState::Stopped);

    let err = engine.publish(Event::new(ORDER_CREATED, 1)).await.unwrap_err();
    assert!(matches!(err, EngineError::Closed { .. }));
    let err = engine.try_publish(Event::new(ORDER_CREATED, 1)).unwrap_err();
    assert!(matches!(err, EngineError::Closed { .. }));

    let (s, mut rx) = Subscriber::channel("late", 1);
    let err = engine.subscribe(&ORDER_CREATED, s).unwrap_err();
    assert!(matches!(err, EngineError::Closed { .. }));
    assert_eq!(rx.recv().await, None);

    // A second shutdown is a no-op.
    shutdown(&engine).await;
}

#[tokio::test]
async fn publisher_waiting_for_room_is_released_by_shutdown() {
    let engine = EventEngine::<u32>::builder(EngineConfig {
        queue_capacity: 1,
        ..EngineConfig::default()
    })
    .build()
    .unwrap();
    engine.register_events([ORDER_CREATED]);
    let (s, rx) = Subscriber::channel("stuck", 1);
    engine.subscribe(&ORDER_CREATED, s).unwrap();

    // Saturate subscriber buffer, dispatcher and queue.
    let mut accepted = 0u32;
    for n in 0..10 {
        if engine.try_publish(Event::new(ORDER_CREATED, n)).is_ok() {
            accepted += 1;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let waiting = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.publish(Event::new(ORDER_CREATED, 100)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiting.is_finished());

    engine.shutdown_token().cancel();
    let reader = collect(rx);
    let res = tokio::time::timeout(WAIT, waiting).await.unwrap().unwrap();
    let got = finish(reader).await;

    // Either the waiting publish made it in before the queue closed and was
    // delivered, or it was rejected. It is never accepted and then lost.
    match res {
        Ok(()) => assert_eq!(got.len() as u32, accepted + 1),
        Err(e) => {
            assert!(matches!(e, EngineError::Closed { .. }));
            assert_eq!(got.len() as u32, accepted);
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_config_fails_fast() {
    let res = EventEngine::<u32>::builder(EngineConfig {
        queue_capacity: 0,
        ..EngineConfig::default()
    })
    .build();
    assert!(matches!(res, Err(EngineError::Config { .. })));
}

#[test]
fn building_outside_a_runtime_fails() {
    let res = EventEngine::<u32>::builder(EngineConfig::default()).build();
    assert!(matches!(res, Err(EngineError::Config { .. })));
}
