#![allow(dead_code)]

use glam::{uvec2, Mat4, Quat, UVec2, Vec3};
use timewarp::{Backend, Params, Pose, RenderedFrame, RenderedView, ViewRect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestFormat;

#[derive(Clone, Copy, Debug)]
pub struct TestParams;

impl Params for TestParams {
    type Texture = u32;
    type Format = TestFormat;
}

/// Backend that only hands out texture ids and counts copies.
#[derive(Debug, Default)]
pub struct TestBackend {
    pub textures: u32,
    pub copies: usize,
}

impl Backend<TestParams> for TestBackend {
    fn create_color_texture(
        &mut self,
        _: &str,
        _: UVec2,
        _: TestFormat,
    ) -> u32 {
        self.textures += 1;
        self.textures
    }

    fn create_depth_texture(&mut self, _: &str, _: UVec2) -> u32 {
        self.textures += 1;
        self.textures
    }

    fn copy_texture(&mut self, _: &u32, _: &u32) {
        self.copies += 1;
    }

    fn extract_depth(&mut self, _: &u32, _: &u32, _: ViewRect) {}
}

pub const EXTENT: UVec2 = UVec2::new(64, 36);

pub fn yawed(deg: f32) -> Pose {
    Pose::new(Vec3::ZERO, Quat::from_rotation_y(deg.to_radians()))
}

pub fn rendered_view(pose: Pose) -> RenderedView {
    RenderedView {
        pose,
        projection: Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0),
        view_rect: ViewRect::from_extent(uvec2(64, 36)),
        ..Default::default()
    }
}

pub fn rendered_frame(pose: Pose) -> RenderedFrame<TestParams> {
    RenderedFrame {
        color: 1000,
        color_format: TestFormat,
        depth: Some(1001),
        extent: EXTENT,
        view: rendered_view(pose),
    }
}
