//! Fixed-step frame pacing at the current room speed.
//!
//! The game advances in whole frames; `room_speed` is frames per second. The
//! host feeds wall-clock time in with `begin_frame` (or `advance` in tests)
//! and runs one `Game::tick` per `should_step`.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

pub struct FramePacer {
    pub step_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub step_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
}

impl FramePacer {
    pub fn new(room_speed: u32) -> Self {
        let step_dt = step_for_speed(room_speed);
        Self {
            step_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            step_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [step_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / step_dt,
        }
    }

    /// Follow a room speed change. Time already accumulated is kept.
    pub fn set_room_speed(&mut self, room_speed: u32) {
        let step_dt = step_for_speed(room_speed);
        if step_dt != self.step_dt {
            log::debug!("Frame pacing now {room_speed} frames per second");
            self.step_dt = step_dt;
        }
    }

    /// Measure wall-clock time since the previous call and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(dt);
    }

    pub fn advance(&mut self, dt: f64) {
        self.real_dt = dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.step_dt {
            self.accumulator -= self.step_dt;
            self.total_time += self.step_dt;
            self.step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Wall-clock time left before the next step is due.
    pub fn time_until_step(&self) -> f64 {
        (self.step_dt - self.accumulator).max(0.0)
    }
}

/// A room speed of zero would never step; treat it as one frame per second.
fn step_for_speed(room_speed: u32) -> f64 {
    1.0 / f64::from(room_speed.max(1))
}
