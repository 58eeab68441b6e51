//! Tests for the shared rate budget
//!
//! These run against the paused tokio clock, so the timing assertions are
//! exact rather than approximate.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Mutex;
    use tokio::time::Instant;

    use crate::rate_limit::RateBudget;

    #[tokio::test(start_paused = true)]
    async fn grants_within_budget_do_not_wait() {
        let budget = RateBudget::new(3, Duration::from_secs(1));
        let start = Instant::now();

        budget.acquire().await;
        budget.acquire().await;
        budget.acquire().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(budget.in_use().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_suspends_until_the_window_frees() {
        let budget = RateBudget::new(2, Duration::from_secs(1));
        let start = Instant::now();

        // Five grants at 2 per second: two immediately, two after one
        // second, one after two seconds.
        for _ in 0..5 {
            budget.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn one_per_second_spaces_grants_a_window_apart() {
        let budget = RateBudget::per_second(1);
        let start = Instant::now();

        budget.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        budget.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));

        budget.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_tasks_never_exceed_the_window_budget() {
        let permits = 3u32;
        let window = Duration::from_secs(1);
        let budget = Arc::new(RateBudget::new(permits, window));
        let grant_times = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let budget = Arc::clone(&budget);
            let grant_times = Arc::clone(&grant_times);
            handles.push(tokio::spawn(async move {
                budget.acquire().await;
                grant_times.lock().await.push(Instant::now());
            }));
        }

        for handle in handles {
            handle.await.expect("task must not panic");
        }

        // Sliding-window invariant: no window of the configured length
        // contains more grants than the budget allows.
        let times = grant_times.lock().await;
        assert_eq!(times.len(), 10);
        for &anchor in times.iter() {
            let in_window = times
                .iter()
                .filter(|&&t| t >= anchor && t.duration_since(anchor) < window)
                .count();
            assert!(
                in_window as u32 <= permits,
                "{} grants landed inside one window of {:?}",
                in_window,
                window
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_grants_fall_out_of_the_window() {
        let budget = RateBudget::new(2, Duration::from_secs(1));

        budget.acquire().await;
        budget.acquire().await;
        assert_eq!(budget.in_use().await, 2);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(budget.in_use().await, 0);

        // A fresh window grants immediately again.
        let start = Instant::now();
        budget.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
