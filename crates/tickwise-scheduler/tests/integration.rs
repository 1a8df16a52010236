//! Timing tests for the adaptive loop.
//!
//! These drive real threads and sleeps, so tolerances are generous enough for
//! loaded CI machines while still catching a loop that drifts or bursts.

use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tickwise_counter::UpdateCounter;
use tickwise_scheduler::{AdaptiveLoop, LoopResult};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("tracing already initialized: {err}");
        }
    });
}

fn counting_loop(period: Duration) -> LoopResult<(AdaptiveLoop, Arc<AtomicU64>)> {
    let counter = Arc::new(AtomicU64::new(0));
    let counted = Arc::clone(&counter);
    let update_loop = AdaptiveLoop::new(
        move |_: &AdaptiveLoop| {
            counted.fetch_add(1, Ordering::Relaxed);
        },
        period,
    )?;
    Ok((update_loop, counter))
}

fn assert_constant_rate(period: Duration, run_for: Duration) -> LoopResult<()> {
    init_tracing();
    let (update_loop, counter) = counting_loop(period)?;

    let start = Instant::now();
    let thread = update_loop.start()?;
    thread::sleep(run_for);
    update_loop.stop();
    let elapsed = start.elapsed();
    assert!(thread.join().is_ok(), "loop thread panicked");

    let expected = u64::try_from(elapsed.as_nanos() / period.as_nanos()).unwrap_or(u64::MAX);
    let actual = counter.load(Ordering::Relaxed);
    let tolerance = (expected / 4).max(2);

    assert!(
        actual.abs_diff(expected) <= tolerance,
        "expected about {expected} invocations in {elapsed:?}, got {actual}"
    );
    Ok(())
}

#[test]
fn test_low_frequency_rate() -> LoopResult<()> {
    assert_constant_rate(Duration::from_millis(100), Duration::from_secs(1))
}

#[test]
fn test_medium_frequency_rate() -> LoopResult<()> {
    assert_constant_rate(Duration::from_millis(1), Duration::from_secs(1))
}

#[test]
fn test_high_frequency_rate() -> LoopResult<()> {
    assert_constant_rate(Duration::from_micros(200), Duration::from_secs(1))
}

#[test]
fn test_rate_holds_with_slow_callback_spikes() -> LoopResult<()> {
    init_tracing();
    let calls = Arc::new(AtomicU64::new(0));
    let counted = Arc::clone(&calls);
    let update_loop = AdaptiveLoop::new(
        move |_: &AdaptiveLoop| {
            // Every tenth update takes three periods
            if counted.fetch_add(1, Ordering::Relaxed) % 10 == 9 {
                thread::sleep(Duration::from_millis(15));
            }
        },
        Duration::from_millis(5),
    )?;

    let start = Instant::now();
    let thread = update_loop.start()?;
    thread::sleep(Duration::from_secs(1));
    update_loop.stop();
    let elapsed = start.elapsed();
    assert!(thread.join().is_ok(), "loop thread panicked");

    let expected = u64::try_from(elapsed.as_millis() / 5).unwrap_or(u64::MAX);
    let actual = calls.load(Ordering::Relaxed);
    assert!(
        actual.abs_diff(expected) <= expected / 4,
        "expected about {expected} invocations despite spikes, got {actual}"
    );
    Ok(())
}

#[test]
fn test_dynamic_period() -> LoopResult<()> {
    init_tracing();
    let (update_loop, counter) = counting_loop(Duration::from_millis(1))?;

    let thread = update_loop.start()?;
    thread::sleep(Duration::from_millis(500));

    update_loop.set_period(Duration::from_millis(100))?;
    let mid_value = counter.load(Ordering::Relaxed);

    thread::sleep(Duration::from_millis(500));
    update_loop.stop();
    let final_value = counter.load(Ordering::Relaxed);
    assert!(thread.join().is_ok(), "loop thread panicked");

    // Fires immediately after the change, then at 100, 200, 300, 400ms
    let expected = mid_value + 5;
    assert!(
        final_value.abs_diff(expected) <= 3,
        "expected about {expected} invocations, got {final_value}"
    );
    Ok(())
}

#[test]
fn test_period_change_fires_immediately() -> LoopResult<()> {
    init_tracing();
    let (update_loop, counter) = counting_loop(Duration::from_secs(10))?;

    let thread = update_loop.start()?;
    thread::sleep(Duration::from_millis(50));
    assert_eq!(counter.load(Ordering::Relaxed), 1);

    // The loop is mid-way through a 10s sleep; the new period must not wait for it
    update_loop.set_period(Duration::from_secs(5))?;
    thread::sleep(Duration::from_millis(200));
    assert_eq!(counter.load(Ordering::Relaxed), 2);

    update_loop.stop();
    assert!(thread.join().is_ok(), "loop thread panicked");
    Ok(())
}

#[test]
fn test_update_counter_measures_loop_rate() -> LoopResult<()> {
    init_tracing();
    let rate = Arc::new(UpdateCounter::new(200_000_000).unwrap_or_default());
    let measured = Arc::clone(&rate);
    let update_loop = AdaptiveLoop::new(
        move |_: &AdaptiveLoop| measured.increment(),
        Duration::from_millis(5),
    )?;

    let thread = update_loop.start()?;
    thread::sleep(Duration::from_millis(700));
    update_loop.stop();
    assert!(thread.join().is_ok(), "loop thread panicked");

    // 200ms at 5ms per update
    let value = rate.value();
    assert!(
        value.is_some_and(|value| value.abs_diff(40) <= 8),
        "expected about 40 updates per 200ms, got {value:?}"
    );
    Ok(())
}
