use pacer::{InvalidConfiguration, ProgressRunner, RunnerDriver};
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

const DELAY: Duration = Duration::from_millis(500);

fn participant(name: &str) -> ProgressRunner {
    ProgressRunner::new(name, 100, 1, DELAY).expect("valid configuration")
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[test]
fn zero_bounds_are_rejected_at_construction() {
    let err = ProgressRunner::new("bad", 0, 1, DELAY).expect_err("zero max must fail");
    assert_eq!(err, InvalidConfiguration::MaxProgressZero);

    let err = ProgressRunner::new("bad", 100, 0, DELAY).expect_err("zero increment must fail");
    assert_eq!(err, InvalidConfiguration::IncrementZero);
}

#[tokio::test(start_paused = true)]
async fn first_increment_lands_after_one_full_interval() {
    let mut driver = RunnerDriver::new(participant("runner-1"));
    driver.start();
    settle().await;

    time::advance(DELAY - Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(
        driver.current_progress(),
        0,
        "no increment before a fully elapsed interval"
    );

    time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(driver.current_progress(), 1);

    driver.pause().await.expect("pause");
}

#[tokio::test(start_paused = true)]
async fn full_run_terminates_exactly_at_max() {
    let started = Instant::now();
    let mut driver = RunnerDriver::new(participant("runner-1"));
    driver.start();

    let finished = driver.wait().await.expect("wait");
    assert_eq!(finished, 100);
    assert_eq!(started.elapsed(), DELAY * 100);
    assert!(driver.is_finished());
    assert!(!driver.is_running());
}

#[tokio::test(start_paused = true)]
async fn cancellation_preserves_progress_for_resumption() {
    let mut runner = participant("runner-2");
    let gauge = runner.gauge();

    let token = CancellationToken::new();
    let worker = tokio::spawn({
        let token = token.clone();
        async move {
            runner.run(&token).await;
            runner
        }
    });
    settle().await;
    for _ in 0..5 {
        time::advance(DELAY).await;
        settle().await;
    }
    token.cancel();
    let mut runner = worker.await.expect("worker join");
    assert_eq!(runner.current_progress(), 5);
    assert_eq!(gauge.current_progress(), 5);

    // Re-running with a fresh token continues from the preserved value.
    let token = CancellationToken::new();
    let worker = tokio::spawn({
        let token = token.clone();
        async move {
            runner.run(&token).await;
            runner
        }
    });
    settle().await;
    for _ in 0..5 {
        time::advance(DELAY).await;
        settle().await;
    }
    token.cancel();
    let runner = worker.await.expect("worker join");
    assert_eq!(runner.current_progress(), 10);
}

#[tokio::test(start_paused = true)]
async fn driver_pause_and_resume_match_raw_cancellation() {
    let mut driver = RunnerDriver::new(participant("runner-3"));
    driver.start();
    settle().await;
    for _ in 0..5 {
        time::advance(DELAY).await;
        settle().await;
    }
    assert_eq!(driver.pause().await.expect("pause"), 5);

    driver.start();
    settle().await;
    for _ in 0..5 {
        time::advance(DELAY).await;
        settle().await;
    }
    assert_eq!(driver.pause().await.expect("pause"), 10);

    // Resuming once more and letting it run out lands exactly on the maximum.
    driver.start();
    assert_eq!(driver.wait().await.expect("wait"), 100);
}
