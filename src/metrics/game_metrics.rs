use std::time::{Duration, Instant};

/// Play clock for the running session; time spent paused is not counted
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    paused_since: Option<Instant>,
    paused_total: Duration,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            paused_since: None,
            paused_total: Duration::ZERO,
        }
    }

    pub fn update(&mut self) {
        let paused = self.paused_total
            + self
                .paused_since
                .map_or(Duration::ZERO, |since| since.elapsed());
        self.elapsed_time = self.start_time.elapsed().saturating_sub(paused);
    }

    pub fn pause(&mut self) {
        self.update();
        self.paused_since.get_or_insert_with(Instant::now);
    }

    pub fn resume(&mut self) {
        if let Some(since) = self.paused_since.take() {
            self.paused_total += since.elapsed();
        }
        self.update();
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
