//! Temporal reprojection ("timewarp") for real-time renderers.
//!
//! The simulation thread feeds poses, pointer motion and frame timing into
//! [`Timewarp`]; the render thread drives an [`Orchestrator`], which warps
//! freshly rendered views toward the latest pose and, when decimation is
//! enabled, re-presents cached frames in place of skipped world renders.

mod buffers;
mod config;
mod frame_cache;
mod orchestrator;
mod params;
mod pose_tracker;
mod present_scheduler;
mod utils;
mod view;
mod warp_engine;

#[cfg(test)]
mod test_utils;

use log::{debug, info};
use parking_lot::RwLock;
pub use timewarp_gpu as gpu;
pub use timewarp_gpu::Frame;

pub(crate) use self::buffers::*;
pub use self::config::*;
pub use self::frame_cache::*;
pub use self::orchestrator::*;
pub use self::params::*;
pub use self::pose_tracker::*;
pub use self::present_scheduler::*;
pub(crate) use self::utils::*;
pub use self::view::*;
pub use self::warp_engine::*;

/// Shared timewarp state; usually kept in an `Arc` and handed to both the
/// simulation and the render thread.
#[derive(derivative::Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Timewarp<P>
where
    P: Params,
{
    tracker: PoseTracker,
    cache: FrameCache<P>,
    scheduler: PresentScheduler,
    config: RwLock<Config>,
}

impl<P> Timewarp<P>
where
    P: Params,
{
    pub fn new(config: Config) -> Self {
        info!(
            "Starting timewarp; mode={}, timewarp_mode={}, decimation={}",
            config.warp.mode,
            config.warp.timewarp_mode,
            config.present.enabled,
        );

        Self {
            tracker: Default::default(),
            cache: Default::default(),
            scheduler: Default::default(),
            config: RwLock::new(config),
        }
    }

    pub fn tracker(&self) -> &PoseTracker {
        &self.tracker
    }

    pub fn cache(&self) -> &FrameCache<P> {
        &self.cache
    }

    pub fn scheduler(&self) -> &PresentScheduler {
        &self.scheduler
    }

    /// Returns a snapshot of the current configuration.
    pub fn config(&self) -> Config {
        *self.config.read()
    }

    /// Changes a single setting, e.g. `("present.target_fps", "45")`; see
    /// [`Config::KEYS`].
    pub fn set_config(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        self.config.write().set(key, value)?;

        debug!("Config changed: {key}={value}");

        Ok(())
    }

    pub fn update_config(&self, f: impl FnOnce(&mut Config)) {
        f(&mut self.config.write());
    }

    /// Advances the simulation side by one step of `dt` seconds and decides
    /// whether the upcoming frame renders the world.
    pub fn on_tick(
        &self,
        now: f64,
        dt: f32,
        source: &dyn PoseSource,
    ) -> PresentDecision {
        let config = self.config();

        self.tracker.on_tick(now, dt, source, &config);
        self.scheduler.tick(now, &config, &self.cache)
    }

    pub fn should_skip_world_rendering(&self) -> bool {
        self.scheduler.should_skip_world_rendering()
    }

    pub fn report_cache_miss(&self) {
        self.scheduler.report_cache_miss();
    }

    pub fn latest_pose(&self, view: ViewId) -> PoseSnapshot {
        self.tracker.latest_pose(view)
    }

    pub fn latest_delta(&self, view: ViewId) -> DeltaSnapshot {
        self.tracker.latest_delta(view)
    }

    /// Overrides the pose of given view until the next tick.
    pub fn submit_pose(&self, view: ViewId, pose: Pose, now: f64) {
        self.tracker.submit_pose(view, pose, now);
    }

    pub fn add_pointer_delta(&self, view: ViewId, dx: f32, dy: f32) {
        self.tracker.add_pointer_delta(view, dx, dy);
    }

    pub fn fps(&self) -> f32 {
        self.tracker.stats().fps
    }

    pub fn fps_std_dev(&self) -> f32 {
        self.tracker.stats().fps_std_dev
    }

    /// Returns the display's refresh rate; zero when unknown.
    pub fn refresh_hz(&self) -> f32 {
        self.tracker.stats().refresh_hz
    }

    /// Forgets all tracked state, cached frames and scheduling decisions;
    /// configuration is kept.
    pub fn stop(&self) {
        info!("Stopping timewarp");

        self.tracker.reset();
        self.cache.clear();
        self.scheduler.reset();
    }
}

impl<P> Default for Timewarp<P>
where
    P: Params,
{
    fn default() -> Self {
        Self::new(Default::default())
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3, Quat};

    use super::*;
    use crate::test_utils::{MockBackend, MockFormat, MockParams};

    fn pose(x: f32) -> Pose {
        Pose::new(vec3(x, 0.0, 0.0), Quat::IDENTITY)
    }

    #[test]
    fn set_config() {
        let target = Timewarp::<MockParams>::default();

        target.set_config("present.target_fps", "45").unwrap();

        assert_eq!(45.0, target.config().present.target_fps);

        assert_eq!(
            Err(ConfigError::UnknownKey("present.nope".into())),
            target.set_config("present.nope", "1")
        );

        assert_eq!(45.0, target.config().present.target_fps);
    }

    #[test]
    fn on_tick() {
        let mut config = Config::default();

        config.present.enabled = true;

        let target = Timewarp::<MockParams>::new(config);
        let source = |_: ViewId| Some(pose(1.0));

        assert_eq!(
            PresentDecision::Render,
            target.on_tick(1.0, 0.02, &source)
        );

        assert_eq!(pose(1.0), target.latest_pose(ViewId::PRIMARY).pose);
        assert_eq!(50.0, target.fps());
        assert_eq!(0.0, target.fps_std_dev());
        assert_eq!(0.0, target.refresh_hz());

        // Nothing cached, so world rendering continues
        assert!(!target.should_skip_world_rendering());
    }

    #[test]
    fn stop() {
        let mut config = Config::default();

        config.present.enabled = true;
        config.present.freeze = true;

        let target = Timewarp::<MockParams>::new(config);
        let mut backend = MockBackend::default();

        target.on_tick(1.0, 0.02, &NoPoseSource);
        target.submit_pose(ViewId::PRIMARY, pose(1.0), 1.0);

        target.cache().update(
            &mut backend,
            ViewId::PRIMARY,
            &RenderedFrame {
                color: 100,
                color_format: MockFormat::Rgba8,
                depth: None,
                extent: uvec2(32, 32),
                view: Default::default(),
            },
            Frame::new(1),
            1.0,
        );

        target.on_tick(1.01, 0.01, &NoPoseSource);

        assert!(target.should_skip_world_rendering());

        target.stop();

        assert!(!target.should_skip_world_rendering());
        assert!(!target.latest_pose(ViewId::PRIMARY).valid);
        assert!(!target.cache().has_cached_frame(ViewId::PRIMARY));
        assert_eq!(0.0, target.fps());

        // Configuration survives
        assert!(target.config().present.freeze);
    }
}
