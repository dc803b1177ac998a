use log::LevelFilter;
use spinstress::{ContentionHarness, StressConfig};
use std::time::Duration;

const RUN_WINDOW: Duration = Duration::from_secs(5);

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    println!("spinstress - spinlock contention harness\n");

    let mut harness = ContentionHarness::new(StressConfig::default());
    if let Err(err) = harness.start() {
        eprintln!("startup failed: {err}");
        std::process::exit(1);
    }
    println!(
        "Running 1 holder + {} waiter(s) for {:?}...",
        harness.waiter_count(),
        RUN_WINDOW
    );

    std::thread::sleep(RUN_WINDOW);
    harness.shutdown();

    if let Some(snapshot) = harness.metrics() {
        println!("\nAcquisitions during the run:");
        println!("  holder:   {}", snapshot.holder_acquisitions);
        for (ordinal, count) in snapshot.waiter_acquisitions.iter().enumerate() {
            println!("  waiter-{ordinal}: {count}");
        }
    }
    println!("Done.");
}
