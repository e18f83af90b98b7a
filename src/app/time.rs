//! Frame timing.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frame durations kept for the telemetry.
pub const SAMPLES: usize = 100;

/// Measures frame durations and optionally limits the frame rate.
pub struct FrameTimer {
    max_fps: u32,
    samples: VecDeque<Duration>,
    last_frame_timepoint: Instant,
    frames: u64,
}

impl FrameTimer {
    /// Creates a timer. A `max_fps` of zero does not limit the frame rate.
    pub fn new(max_fps: u32) -> Self {
        FrameTimer {
            max_fps,
            samples: VecDeque::with_capacity(SAMPLES),
            last_frame_timepoint: Instant::now(),
            frames: 0,
        }
    }

    /// Ends the current frame. Waits if the frame was faster than the frame
    /// rate limit, then returns the duration of the frame.
    pub fn advance(&mut self) -> Duration {
        // Perform waiting loop if maximum fps set, cooperatively gives up
        // a timeslice to the OS scheduler.
        if self.max_fps > 0 {
            let td = Duration::from_millis(u64::from(1000 / self.max_fps));
            while self.last_frame_timepoint.elapsed() <= td {
                if (self.last_frame_timepoint.elapsed() + Duration::from_millis(2)) < td {
                    std::thread::sleep(Duration::from_millis(1));
                } else {
                    std::thread::yield_now();
                }
            }
        }

        let elapsed = self.last_frame_timepoint.elapsed();
        self.last_frame_timepoint = Instant::now();
        self.record(elapsed);
        elapsed
    }

    /// Adds a frame duration to the samples.
    pub fn record(&mut self, duration: Duration) {
        if self.samples.len() == SAMPLES {
            self.samples.pop_front();
        }

        self.samples.push_back(duration);
        self.frames += 1;
    }

    /// Number of frames recorded since the timer was created.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().min().cloned().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().max().cloned().unwrap_or_default()
    }

    pub fn avg(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::default();
        }

        let sum: Duration = self.samples.iter().sum();
        sum / self.samples.len() as u32
    }

    /// Frames per second over the kept samples.
    pub fn fps(&self) -> u32 {
        let avg = millis(self.avg());
        if avg <= 0.0 {
            0
        } else {
            (1000.0 / avg) as u32
        }
    }

    /// A one line summary, `fps (min/avg/max ms)`.
    pub fn summary(&self) -> String {
        format!(
            "{} fps ({:.2}/{:.2}/{:.2} ms)",
            self.fps(),
            millis(self.min()),
            millis(self.avg()),
            millis(self.max())
        )
    }
}

#[inline]
fn millis(d: Duration) -> f64 {
    d.as_secs() as f64 * 1000.0 + f64::from(d.subsec_nanos()) / 1_000_000.0
}
