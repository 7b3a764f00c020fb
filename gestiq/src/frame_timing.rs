//! Frame timing instrumentation for the processing loop.
//!
//! Keeps rolling windows of how long each frame waited on the keypoint
//! provider and how long the engine took to process it.

use std::collections::VecDeque;

/// Rolling frame timing statistics over a window of samples.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time blocked waiting for the provider, per frame (ms).
    pub acquire_times: VecDeque<f64>,
    /// Track + classify + debounce + dispatch time, per frame (ms).
    pub process_times: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    pub total_frames: u64,
    /// Frames whose processing exceeded the budget.
    pub slow_frames: u64,
    /// Processing budget in milliseconds (33.3 for a 30 fps camera).
    pub budget_ms: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(300, 33.3)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            acquire_times: VecDeque::with_capacity(window_size),
            process_times: VecDeque::with_capacity(window_size),
            window_size,
            total_frames: 0,
            slow_frames: 0,
            budget_ms,
        }
    }

    /// Record one frame.
    pub fn record_frame(&mut self, acquire_ms: f64, process_ms: f64) {
        Self::push_sample(&mut self.acquire_times, acquire_ms, self.window_size);
        Self::push_sample(&mut self.process_times, process_ms, self.window_size);

        self.total_frames += 1;
        if process_ms > self.budget_ms {
            self.slow_frames += 1;
        }
    }

    fn push_sample(samples: &mut VecDeque<f64>, value: f64, window_size: usize) {
        samples.push_back(value);
        while samples.len() > window_size {
            samples.pop_front();
        }
    }

    fn sorted(samples: &VecDeque<f64>) -> Vec<f64> {
        let mut v: Vec<f64> = samples.iter().copied().collect();
        v.sort_by(|a, b| a.total_cmp(b));
        v
    }

    /// Nearest-rank percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn stats(&self) -> FrameTimingStats {
        let acquire = Self::sorted(&self.acquire_times);
        let process = Self::sorted(&self.process_times);

        let frame_p50 = Self::percentile(&acquire, 50.0) + Self::percentile(&process, 50.0);
        FrameTimingStats {
            acquire_p50: Self::percentile(&acquire, 50.0),
            process_p50: Self::percentile(&process, 50.0),
            process_p99: Self::percentile(&process, 99.0),
            fps: if frame_p50 > 0.0 { 1000.0 / frame_p50 } else { 0.0 },
            slow_pct: if self.total_frames > 0 {
                (self.slow_frames as f64 / self.total_frames as f64) * 100.0
            } else {
                0.0
            },
            total_frames: self.total_frames,
            slow_frames: self.slow_frames,
        }
    }

    /// Format stats as an s-expression.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:acquire-p50 {:.1} :process-p50 {:.2} :process-p99 {:.2} :fps {:.0} :slow-pct {:.1} :total-frames {} :slow-frames {})",
            s.acquire_p50, s.process_p50, s.process_p99, s.fps, s.slow_pct, s.total_frames, s.slow_frames,
        )
    }
}

/// Computed frame timing statistics.
#[derive(Debug, Clone)]
pub struct FrameTimingStats {
    pub acquire_p50: f64,
    pub process_p50: f64,
    pub process_p99: f64,
    /// Frames per second implied by the median frame time.
    pub fps: f64,
    pub slow_pct: f64,
    pub total_frames: u64,
    pub slow_frames: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let ft = FrameTiming::default();
        let stats = ft.stats();
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.fps, 0.0);
        assert_eq!(stats.slow_pct, 0.0);
    }

    #[test]
    fn test_record_frame() {
        let mut ft = FrameTiming::new(100, 33.3);
        ft.record_frame(30.0, 3.3);
        assert_eq!(ft.total_frames, 1);
        assert_eq!(ft.slow_frames, 0);
        let stats = ft.stats();
        assert!((stats.process_p50 - 3.3).abs() < 1e-9);
        assert!((stats.fps - 30.03).abs() < 0.01, "Expected ~30 fps, got {}", stats.fps);
    }

    #[test]
    fn test_slow_frame_detection() {
        let mut ft = FrameTiming::new(100, 10.0);
        ft.record_frame(0.0, 12.0);
        assert_eq!(ft.slow_frames, 1);
        ft.record_frame(0.0, 5.0);
        assert_eq!(ft.slow_frames, 1);
        assert_eq!(ft.total_frames, 2);
        assert!((ft.stats().slow_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_size_trim() {
        let mut ft = FrameTiming::new(5, 33.3);
        for i in 0..10 {
            ft.record_frame(i as f64, 1.0);
        }
        assert_eq!(ft.acquire_times.len(), 5);
        assert_eq!(ft.acquire_times.front(), Some(&5.0));
        assert_eq!(ft.total_frames, 10);
    }

    #[test]
    fn test_percentiles() {
        let mut ft = FrameTiming::new(100, 33.3);
        for i in (1..=100).rev() {
            ft.record_frame(0.0, i as f64);
        }
        let stats = ft.stats();
        assert_eq!(stats.process_p50, 51.0);
        assert_eq!(stats.process_p99, 99.0);
    }

    #[test]
    fn test_stats_sexp_format() {
        let mut ft = FrameTiming::default();
        ft.record_frame(32.0, 1.3);
        let sexp = ft.stats_sexp();
        assert!(sexp.starts_with("(:acquire-p50 32.0"));
        assert!(sexp.contains(":fps 30"));
        assert!(sexp.ends_with(')'));
    }
}
