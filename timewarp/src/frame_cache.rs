mod constants;
mod present_fallback;

use std::sync::atomic::{AtomicU32, Ordering};

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::UVec2;
use log::{debug, info};
use parking_lot::RwLock;
use timewarp_gpu::Frame;

pub use self::constants::*;
pub use self::present_fallback::*;
use crate::{AtomicF64, Backend, Params, RenderedView, ViewId, MAX_VIEWS};

/// Cached frames younger than this are always usable, whatever the
/// configured maximum age.
pub const MIN_CACHE_AGE_FLOOR_MS: f64 = 33.0;

/// Output of a full render, as handed over to [`FrameCache::update()`].
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct RenderedFrame<P>
where
    P: Params,
{
    pub color: P::Texture,
    pub color_format: P::Format,

    /// Missing when the renderer produced no depth buffer.
    pub depth: Option<P::Texture>,

    pub extent: UVec2,
    pub view: RenderedView,
}

/// Cached frame of a view, as returned by [`FrameCache::cached_frame()`].
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct CachedFrame<P>
where
    P: Params,
{
    pub color: P::Texture,
    pub depth: P::Texture,
    pub constants: CachedFrameConstants,
}

/// Most recent full render of every view, plus a fallback copy of the last
/// presented back buffer.
///
/// Textures live behind a reader/writer lock; the capture markers used by
/// the per-tick freshness check are atomics and bypass it.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Default(bound = ""))]
pub struct FrameCache<P>
where
    P: Params,
{
    entries: RwLock<FxHashMap<ViewId, CacheEntry<P>>>,
    fallbacks: RwLock<FxHashMap<ViewId, PresentFallback<P>>>,
    markers: [CaptureMarker; MAX_VIEWS],
}

#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
struct CacheEntry<P>
where
    P: Params,
{
    color: P::Texture,
    depth: P::Texture,
    extent: UVec2,
    format: P::Format,
    constants: CachedFrameConstants,
}

#[derive(Debug, Default)]
struct CaptureMarker {
    /// Zero until something gets captured.
    frame: AtomicU32,
    time: AtomicF64,
}

impl CaptureMarker {
    fn store(&self, frame: Frame, time: f64) {
        self.time.store(time);
        self.frame.store(frame.get(), Ordering::SeqCst);
    }

    fn clear(&self) {
        self.frame.store(0, Ordering::SeqCst);
        self.time.store(0.0);
    }
}

impl<P> FrameCache<P>
where
    P: Params,
{
    fn marker(&self, view: ViewId) -> Option<&CaptureMarker> {
        self.markers.get(view.get())
    }

    /// Stores a fresh full render of given view.
    ///
    /// Backing textures get (re)allocated whenever the extent or format
    /// changes, invalidating whatever was cached before. Returns `false` if
    /// nothing got cached.
    pub fn update(
        &self,
        backend: &mut dyn Backend<P>,
        view: ViewId,
        frame: &RenderedFrame<P>,
        capture_frame: Frame,
        now: f64,
    ) -> bool {
        let Some(marker) = self.marker(view) else {
            return false;
        };

        if frame.extent.x == 0 || frame.extent.y == 0 {
            return false;
        }

        let mut entries = self.entries.write();

        let needs_allocation = entries.get(&view).map_or(true, |entry| {
            entry.extent != frame.extent || entry.format != frame.color_format
        });

        if needs_allocation {
            info!(
                "Allocating frame cache for {:?}; extent={}, format={:?}",
                view, frame.extent, frame.color_format
            );

            marker.clear();

            let color = backend.create_color_texture(
                &format!("timewarp_cached_color_{}", view.get()),
                frame.extent,
                frame.color_format,
            );

            let depth = backend.create_depth_texture(
                &format!("timewarp_cached_depth_{}", view.get()),
                frame.extent,
            );

            entries.insert(
                view,
                CacheEntry {
                    color,
                    depth,
                    extent: frame.extent,
                    format: frame.color_format,
                    constants: Default::default(),
                },
            );
        }

        let Some(entry) = entries.get_mut(&view) else {
            return false;
        };

        backend.copy_texture(&frame.color, &entry.color);

        if let Some(depth) = &frame.depth {
            backend.extract_depth(
                depth,
                &entry.depth,
                frame.view.view_rect.or_extent(frame.extent),
            );
        }

        let capture_frame = if capture_frame.is_some() {
            capture_frame
        } else {
            capture_frame.next()
        };

        entry.constants = CachedFrameConstants::new(
            &frame.view,
            frame.extent,
            frame.depth.is_some(),
            capture_frame,
            now,
        );

        marker.store(capture_frame, now);

        debug!("Cached {:?} at frame {}", view, capture_frame.get());

        true
    }

    /// Returns the cached frame of given view, if it's valid.
    pub fn cached_frame(&self, view: ViewId) -> Option<CachedFrame<P>> {
        let entries = self.entries.read();
        let entry = entries.get(&view)?;

        if !entry.constants.valid {
            return None;
        }

        Some(CachedFrame {
            color: entry.color.clone(),
            depth: entry.depth.clone(),
            constants: entry.constants,
        })
    }

    pub fn has_cached_frame(&self, view: ViewId) -> bool {
        self.marker(view)
            .is_some_and(|marker| marker.frame.load(Ordering::SeqCst) != 0)
    }

    /// Returns whether given view has a cached frame that is at most
    /// `max(MIN_CACHE_AGE_FLOOR_MS, max_age_ms)` old (inclusive).
    pub fn has_usable_cached_frame(
        &self,
        view: ViewId,
        now: f64,
        max_age_ms: f32,
    ) -> bool {
        let Some(marker) = self.marker(view) else {
            return false;
        };

        if marker.frame.load(Ordering::SeqCst) == 0 {
            return false;
        }

        let age_ms = (now - marker.time.load()) * 1000.0;

        age_ms <= MIN_CACHE_AGE_FLOOR_MS.max(max_age_ms as f64)
    }

    /// Makes sure given view has a fallback texture matching the back
    /// buffer; a reallocated fallback starts out invalid.
    pub fn ensure_present_fallback(
        &self,
        backend: &mut dyn Backend<P>,
        view: ViewId,
        extent: UVec2,
        format: P::Format,
    ) {
        if !view.is_tracked() || extent.x == 0 || extent.y == 0 {
            return;
        }

        let mut fallbacks = self.fallbacks.write();

        if fallbacks
            .get(&view)
            .is_some_and(|fallback| fallback.matches(extent, format))
        {
            return;
        }

        debug!(
            "Allocating present fallback for {:?}; extent={}, format={:?}",
            view, extent, format
        );

        let texture = backend.create_color_texture(
            &format!("timewarp_present_fallback_{}", view.get()),
            extent,
            format,
        );

        fallbacks.insert(
            view,
            PresentFallback {
                texture,
                extent,
                format,
                valid: false,
            },
        );
    }

    /// Returns the fallback of given view, if it holds a presented frame.
    pub fn present_fallback(&self, view: ViewId) -> Option<PresentFallback<P>> {
        self.fallbacks
            .read()
            .get(&view)
            .filter(|fallback| fallback.valid)
            .cloned()
    }

    /// Returns the fallback of given view regardless of its contents, so
    /// that it can be written to.
    pub fn present_fallback_target(
        &self,
        view: ViewId,
    ) -> Option<PresentFallback<P>> {
        self.fallbacks.read().get(&view).cloned()
    }

    pub fn set_present_fallback_valid(&self, view: ViewId, valid: bool) {
        if let Some(fallback) = self.fallbacks.write().get_mut(&view) {
            fallback.valid = valid;
        }
    }

    /// Drops everything cached so far.
    pub fn clear(&self) {
        info!("Clearing frame cache");

        self.entries.write().clear();
        self.fallbacks.write().clear();

        for marker in &self.markers {
            marker.clear();
        }
    }
}
