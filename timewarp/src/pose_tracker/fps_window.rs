use std::collections::VecDeque;

use timewarp_gpu::F32Ext;

/// Steps shorter than this don't produce a sample.
const MIN_DT: f32 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsSample {
    pub timestamp: f64,
    pub fps: f32,
}

/// Frame rate statistics over a sliding time window.
#[derive(Clone, Debug, Default)]
pub struct FpsWindow {
    samples: VecDeque<FpsSample>,
    mean: f32,
    std_dev: f32,
}

impl FpsWindow {
    /// Records a step of `dt` seconds ending at `now`, drops samples older
    /// than `window` seconds and recomputes the statistics.
    ///
    /// Returns `false` (leaving the window untouched) when `dt` is too small
    /// to tell a frame rate.
    pub fn push(&mut self, now: f64, dt: f32, window: f64) -> bool {
        if dt <= MIN_DT {
            return false;
        }

        self.samples.push_back(FpsSample {
            timestamp: now,
            fps: 1.0 / dt,
        });

        let oldest = now - window;

        while self
            .samples
            .front()
            .is_some_and(|sample| sample.timestamp < oldest)
        {
            self.samples.pop_front();
        }

        self.recompute();

        true
    }

    fn recompute(&mut self) {
        let len = self.samples.len();

        if len == 0 {
            self.mean = 0.0;
            self.std_dev = 0.0;
            return;
        }

        self.mean = self.samples.iter().map(|sample| sample.fps).sum::<f32>()
            / len as f32;

        self.std_dev = if len > 1 {
            let variance = self
                .samples
                .iter()
                .map(|sample| (sample.fps - self.mean).sqr())
                .sum::<f32>()
                / (len - 1) as f32;

            variance.sqrt()
        } else {
            0.0
        };
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn std_dev(&self) -> f32 {
        self.std_dev
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &FpsSample> + '_ {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        *self = Default::default();
    }
}
