use spinstress::{ContentionHarness, HarnessState, StressConfig};
use std::thread;
use std::time::Duration;

#[test]
fn start_then_shutdown_walks_the_lifecycle() {
    let mut harness = ContentionHarness::new(StressConfig::fast());
    assert_eq!(harness.state(), HarnessState::Uninitialized);
    assert!(harness.metrics().is_none());

    harness.start().expect("start should succeed");
    assert_eq!(harness.state(), HarnessState::Running);
    // Placement yields between one and three waiters depending on the host.
    assert!((1..=3).contains(&harness.waiter_count()));

    harness.shutdown();
    assert_eq!(harness.state(), HarnessState::Stopped);
    assert_eq!(harness.waiter_count(), 0);
}

#[test]
fn workers_exclude_each_other_and_all_make_progress() {
    // Leave the waiters room to win between holder cycles, but keep the
    // holder's slice long enough that it always gets back in.
    let config = StressConfig {
        holder_hold: Duration::from_millis(15),
        holder_pause: Duration::from_millis(5),
        waiter_hold: Duration::from_millis(3),
        waiter_pause: Duration::from_millis(10),
    };
    let mut harness = ContentionHarness::new(config);
    harness.start().expect("start should succeed");

    thread::sleep(Duration::from_millis(500));
    harness.shutdown();

    let snapshot = harness.metrics().expect("metrics exist after a run");
    assert_eq!(
        snapshot.max_concurrent_holders, 1,
        "two workers held the lock at once"
    );
    assert!(
        snapshot.all_workers_progressed(),
        "a worker never won the lock: {snapshot:?}"
    );
}

#[test]
fn shutdown_is_idempotent() {
    let mut harness = ContentionHarness::new(StressConfig::fast());

    // Never started: nothing to stop.
    harness.shutdown();
    assert_eq!(harness.state(), HarnessState::Uninitialized);

    harness.start().expect("start should succeed");
    harness.shutdown();
    assert_eq!(harness.state(), HarnessState::Stopped);

    // Second shutdown is a no-op.
    harness.shutdown();
    assert_eq!(harness.state(), HarnessState::Stopped);
}

#[test]
fn stopped_harness_can_run_again() {
    let mut harness = ContentionHarness::new(StressConfig::fast());

    harness.start().expect("first start");
    thread::sleep(Duration::from_millis(50));
    harness.shutdown();
    assert!(harness.metrics().expect("metrics after first run").total_acquisitions() > 0);

    harness.start().expect("second start");
    assert_eq!(harness.state(), HarnessState::Running);
    thread::sleep(Duration::from_millis(50));
    harness.shutdown();
    assert_eq!(harness.state(), HarnessState::Stopped);
    assert_eq!(
        harness.metrics().expect("metrics after restart").max_concurrent_holders,
        1
    );
}

#[test]
fn independent_harnesses_do_not_interfere() {
    let mut a = ContentionHarness::new(StressConfig::fast());
    let mut b = ContentionHarness::new(StressConfig::fast());

    a.start().expect("harness a");
    b.start().expect("harness b");
    thread::sleep(Duration::from_millis(100));

    b.shutdown();
    assert_eq!(b.state(), HarnessState::Stopped);
    assert_eq!(a.state(), HarnessState::Running);

    a.shutdown();
    assert_eq!(a.metrics().expect("a ran").max_concurrent_holders, 1);
    assert_eq!(b.metrics().expect("b ran").max_concurrent_holders, 1);
}

#[test]
fn drop_tears_the_workers_down() {
    let mut harness = ContentionHarness::new(StressConfig::fast());
    harness.start().expect("start should succeed");
    thread::sleep(Duration::from_millis(30));
    // Dropping without an explicit shutdown must still join every worker.
    drop(harness);
}
