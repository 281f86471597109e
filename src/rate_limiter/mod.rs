use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Spaces outgoing requests at least `delay` apart
pub struct RateLimiter {
    delay: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_request: None,
        }
    }

    pub async fn wait(&mut self) {
        if let Some(remaining) = self.remaining() {
            sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }

    fn remaining(&self) -> Option<Duration> {
        let elapsed = self.last_request?.elapsed();
        self.delay.checked_sub(elapsed).filter(|left| !left.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate_and_second_waits() {
        let mut limiter = RateLimiter::new(1000);
        let start = Instant::now();

        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
