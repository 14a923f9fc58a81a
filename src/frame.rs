use std::time::Instant;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

/// Counts frames and averages FPS over one-second windows
#[derive(Debug)]
pub struct FrameClock {
    frame_number: u64,
    start_time: Instant,
    last_frame_time: Instant,
    frames_in_window: u32,
    window_time: f32,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
            frames_in_window: 0,
            window_time: 0.0,
            fps: 0.0,
        }
    }

    /// Advance one frame
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.record(delta);

        let info = FrameInfo {
            number: self.frame_number,
            time: now.duration_since(self.start_time).as_secs_f32(),
            delta,
        };
        self.frame_number += 1;
        info
    }

    fn record(&mut self, delta: f32) {
        self.frames_in_window += 1;
        self.window_time += delta;
        if self.window_time >= FPS_UPDATE_INTERVAL {
            self.fps = self.frames_in_window as f32 / self.window_time;
            log::debug!("FPS: {:.1}", self.fps);
            self.frames_in_window = 0;
            self.window_time = 0.0;
        }
    }

    /// Average over the last full second, 0 until one has passed
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn time(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
