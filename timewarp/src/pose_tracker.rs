mod fps_window;
mod snapshots;

use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use log::{debug, info};
use parking_lot::Mutex;

pub use self::fps_window::*;
pub use self::snapshots::*;
use crate::{
    AtomicF32, Config, DoubleBuffered, Pose, PoseSource, ViewId, MAX_VIEWS,
};

/// Frame rate and refresh rate as last observed by the producer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub fps: f32,
    pub fps_std_dev: f32,

    /// Zero when unknown.
    pub refresh_hz: f32,
}

/// Hands poses, pointer motion and frame statistics over from the producer
/// (simulation) thread to the consumer (render) thread.
///
/// Nothing here blocks the producer: snapshots are double-buffered and
/// scalars are atomics.
#[derive(Debug, Default)]
pub struct PoseTracker {
    views: [ViewSlots; MAX_VIEWS],
    fps_window: Mutex<FpsWindow>,
    fps: AtomicF32,
    fps_std_dev: AtomicF32,
    refresh_hz: AtomicF32,
}

#[derive(Debug, Default)]
struct ViewSlots {
    pose: DoubleBuffered<PoseSnapshot>,
    delta: DoubleBuffered<DeltaSnapshot>,
    rendered_view: DoubleBuffered<RenderedViewSnapshot>,
    pointer_x: AtomicF32,
    pointer_y: AtomicF32,

    /// Set when the pose got submitted explicitly during the current tick.
    externally_driven: AtomicBool,
}

impl PoseTracker {
    fn slots(&self, view: ViewId) -> Option<&ViewSlots> {
        self.views.get(view.get())
    }

    /// Publishes the latest pose of given view and keeps [`Self::on_tick()`]
    /// from overwriting it during the current tick.
    pub fn submit_pose(&self, view: ViewId, pose: Pose, now: f64) {
        let Some(slots) = self.slots(view) else {
            return;
        };

        slots.pose.publish(PoseSnapshot::new(pose, now));
        slots.externally_driven.store(true, Ordering::SeqCst);
    }

    pub fn latest_pose(&self, view: ViewId) -> PoseSnapshot {
        self.slots(view)
            .map(|slots| slots.pose.read())
            .unwrap_or_default()
    }

    /// Accumulates pointer motion; totals keep growing and are never reset
    /// per frame.
    pub fn add_pointer_delta(&self, view: ViewId, dx: f32, dy: f32) {
        let Some(slots) = self.slots(view) else {
            return;
        };

        slots.pointer_x.fetch_add(dx);
        slots.pointer_y.fetch_add(dy);
    }

    pub fn pointer_totals(&self, view: ViewId) -> Vec2 {
        self.slots(view)
            .map(|slots| {
                Vec2::new(slots.pointer_x.load(), slots.pointer_y.load())
            })
            .unwrap_or_default()
    }

    /// Advances the tracker by one simulation step of `dt` seconds.
    ///
    /// Updates the frame rate statistics, re-samples every view's pose from
    /// `source` (except views whose pose got submitted explicitly since the
    /// last tick) and refreshes the display refresh rate.
    pub fn on_tick(
        &self,
        now: f64,
        dt: f32,
        source: &dyn PoseSource,
        config: &Config,
    ) {
        {
            let mut fps_window = self.fps_window.lock();
            let window = (config.auto.fps_window_ms as f64) / 1000.0;

            if fps_window.push(now, dt, window) {
                self.fps.store(fps_window.mean());
                self.fps_std_dev.store(fps_window.std_dev());
            }
        }

        for view in ViewId::all() {
            let Some(slots) = self.slots(view) else {
                continue;
            };

            if slots.externally_driven.swap(false, Ordering::SeqCst) {
                continue;
            }

            if let Some(pose) = source.sample_pose(view) {
                slots.pose.publish(PoseSnapshot::new(pose, now));
            }
        }

        let refresh_hz = config
            .refresh_hz_override()
            .or_else(|| source.refresh_rate_hz().filter(|hz| *hz > 0.0))
            .unwrap_or(0.0);

        if self.refresh_hz.load() != refresh_hz {
            debug!("Display refresh rate changed: {refresh_hz} Hz");

            self.refresh_hz.store(refresh_hz);
        }
    }

    pub fn publish_delta(&self, view: ViewId, delta: DeltaSnapshot) {
        if let Some(slots) = self.slots(view) {
            slots.delta.publish(delta);
        }
    }

    pub fn latest_delta(&self, view: ViewId) -> DeltaSnapshot {
        self.slots(view)
            .map(|slots| slots.delta.read())
            .unwrap_or_default()
    }

    pub fn publish_rendered_view(
        &self,
        view: ViewId,
        snapshot: RenderedViewSnapshot,
    ) {
        if let Some(slots) = self.slots(view) {
            slots.rendered_view.publish(snapshot);
        }
    }

    pub fn latest_rendered_view(&self, view: ViewId) -> RenderedViewSnapshot {
        self.slots(view)
            .map(|slots| slots.rendered_view.read())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            fps: self.fps.load(),
            fps_std_dev: self.fps_std_dev.load(),
            refresh_hz: self.refresh_hz.load(),
        }
    }

    /// Forgets everything tracked so far.
    pub fn reset(&self) {
        info!("Resetting pose tracker");

        self.fps_window.lock().clear();
        self.fps.store(0.0);
        self.fps_std_dev.store(0.0);
        self.refresh_hz.store(0.0);

        for slots in &self.views {
            slots.pose.reset();
            slots.delta.reset();
            slots.rendered_view.reset();
            slots.pointer_x.store(0.0);
            slots.pointer_y.store(0.0);
            slots.externally_driven.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use glam::{vec2, vec3, Quat};

    use super::*;
    use crate::NoPoseSource;

    fn pose(x: f32) -> Pose {
        Pose::new(vec3(x, 0.0, 0.0), Quat::IDENTITY)
    }

    #[test]
    fn submit_pose() {
        let target = PoseTracker::default();

        assert!(!target.latest_pose(ViewId::new(0)).valid);

        target.submit_pose(ViewId::new(1), pose(1.0), 0.5);

        assert_eq!(
            PoseSnapshot::new(pose(1.0), 0.5),
            target.latest_pose(ViewId::new(1))
        );

        assert!(!target.latest_pose(ViewId::new(0)).valid);
    }

    #[test]
    fn untracked_views() {
        let target = PoseTracker::default();
        let view = ViewId::new(MAX_VIEWS);

        target.submit_pose(view, pose(1.0), 0.5);
        target.add_pointer_delta(view, 1.0, 1.0);
        target.publish_delta(view, DeltaSnapshot::default());

        assert_eq!(PoseSnapshot::default(), target.latest_pose(view));
        assert_eq!(Vec2::ZERO, target.pointer_totals(view));
        assert!(!target.latest_rendered_view(view).valid);
    }

    #[test]
    fn pointer_totals() {
        let target = PoseTracker::default();
        let view = ViewId::new(2);

        target.add_pointer_delta(view, 3.0, -1.0);
        target.add_pointer_delta(view, 2.0, -1.5);

        assert_eq!(vec2(5.0, -2.5), target.pointer_totals(view));
        assert_eq!(Vec2::ZERO, target.pointer_totals(ViewId::new(0)));
    }

    #[test]
    fn on_tick_samples_poses() {
        let target = PoseTracker::default();
        let config = Config::default();
        let sampled = Cell::new(0);

        let source = |view: ViewId| {
            sampled.set(sampled.get() + 1);

            (view == ViewId::PRIMARY).then(|| pose(7.0))
        };

        // ---
        // Case 1: Pose comes from the source

        target.on_tick(1.0, 0.016, &source, &config);

        assert_eq!(
            PoseSnapshot::new(pose(7.0), 1.0),
            target.latest_pose(ViewId::PRIMARY)
        );

        assert_eq!(MAX_VIEWS, sampled.get());

        // ---
        // Case 2: Explicitly submitted pose wins for one tick

        target.submit_pose(ViewId::PRIMARY, pose(3.0), 1.01);
        target.on_tick(1.016, 0.016, &source, &config);

        assert_eq!(pose(3.0), target.latest_pose(ViewId::PRIMARY).pose);

        target.on_tick(1.032, 0.016, &source, &config);

        assert_eq!(pose(7.0), target.latest_pose(ViewId::PRIMARY).pose);
    }

    #[test]
    fn on_tick_stats() {
        struct Display;

        impl PoseSource for Display {
            fn sample_pose(&self, _: ViewId) -> Option<Pose> {
                None
            }

            fn refresh_rate_hz(&self) -> Option<f32> {
                Some(60.0)
            }
        }

        let target = PoseTracker::default();
        let mut config = Config::default();

        // ---
        // Case 1: Unknown refresh rate

        target.on_tick(1.0, 0.02, &NoPoseSource, &config);

        assert_eq!(
            FrameStats {
                fps: 50.0,
                fps_std_dev: 0.0,
                refresh_hz: 0.0,
            },
            target.stats()
        );

        // ---
        // Case 2: Platform-reported refresh rate

        target.on_tick(1.02, 0.02, &Display, &config);

        assert_eq!(60.0, target.stats().refresh_hz);

        // ---
        // Case 3: Override takes precedence

        config.debug.refresh_hz_override = 144.0;
        target.on_tick(1.04, 0.02, &Display, &config);

        assert_eq!(144.0, target.stats().refresh_hz);

        // ---
        // Case 4: Zero-length steps keep the previous statistics

        target.on_tick(1.04, 0.0, &Display, &config);

        assert_eq!(50.0, target.stats().fps);
    }

    #[test]
    fn reset() {
        let target = PoseTracker::default();

        target.submit_pose(ViewId::PRIMARY, pose(1.0), 1.0);
        target.add_pointer_delta(ViewId::PRIMARY, 1.0, 1.0);
        target.on_tick(1.0, 0.02, &NoPoseSource, &Config::default());
        target.reset();

        assert!(!target.latest_pose(ViewId::PRIMARY).valid);
        assert_eq!(Vec2::ZERO, target.pointer_totals(ViewId::PRIMARY));
        assert_eq!(FrameStats::default(), target.stats());
    }
}
