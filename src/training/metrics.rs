use std::collections::VecDeque;

/// Rolling window of per-epoch losses.
pub struct TrainingMetrics {
    losses: VecDeque<f32>,
    capacity: usize,
    total_epochs: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            losses: VecDeque::with_capacity(capacity),
            capacity,
            total_epochs: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_epoch(&mut self, loss: f32) {
        self.total_epochs += 1;
        self.losses.push_back(loss);
        if self.losses.len() > self.capacity {
            self.losses.pop_front();
        }
    }

    /// Average loss over the last N epochs.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let n = self.losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.losses.iter().rev().take(n).sum();
        sum / n as f32
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.losses.back().copied()
    }

    pub fn total_epochs(&self) -> usize {
        self.total_epochs
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = TrainingMetrics::new();
        assert_eq!(metrics.average_loss(10), 0.0);
        assert_eq!(metrics.last_loss(), None);
        assert_eq!(metrics.total_epochs(), 0);
    }

    #[test]
    fn test_average_over_window() {
        let mut metrics = TrainingMetrics::new();
        for loss in [4.0, 2.0, 1.0, 3.0] {
            metrics.record_epoch(loss);
        }
        assert!((metrics.average_loss(2) - 2.0).abs() < 1e-6);
        assert!((metrics.average_loss(100) - 2.5).abs() < 1e-6);
        assert_eq!(metrics.last_loss(), Some(3.0));
    }

    #[test]
    fn test_capacity_caps_window_not_total() {
        let mut metrics = TrainingMetrics::with_capacity(3);
        for i in 0..10 {
            metrics.record_epoch(i as f32);
        }
        assert_eq!(metrics.total_epochs(), 10);
        // Window holds 7, 8, 9.
        assert!((metrics.average_loss(10) - 8.0).abs() < 1e-6);
    }
}
