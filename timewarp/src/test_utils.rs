use glam::UVec2;

use crate::{Backend, Params, ViewRect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockFormat {
    Rgba8,
    Rgba16,
}

#[derive(Clone, Copy, Debug)]
pub struct MockParams;

impl Params for MockParams {
    type Texture = u32;
    type Format = MockFormat;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    CreateColor(UVec2, MockFormat),
    CreateDepth(UVec2),
    Copy(u32, u32),
    ExtractDepth(u32, u32),
}

/// Backend handing out sequential texture ids (starting at 1) and recording
/// every operation.
#[derive(Debug, Default)]
pub struct MockBackend {
    next_texture: u32,
    ops: Vec<Op>,
}

impl MockBackend {
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    fn alloc(&mut self) -> u32 {
        self.next_texture += 1;
        self.next_texture
    }
}

impl Backend<MockParams> for MockBackend {
    fn create_color_texture(
        &mut self,
        _: &str,
        extent: UVec2,
        format: MockFormat,
    ) -> u32 {
        self.ops.push(Op::CreateColor(extent, format));
        self.alloc()
    }

    fn create_depth_texture(&mut self, _: &str, extent: UVec2) -> u32 {
        self.ops.push(Op::CreateDepth(extent));
        self.alloc()
    }

    fn copy_texture(&mut self, src: &u32, dst: &u32) {
        self.ops.push(Op::Copy(*src, *dst));
    }

    fn extract_depth(&mut self, src: &u32, dst: &u32, _: ViewRect) {
        self.ops.push(Op::ExtractDepth(*src, *dst));
    }
}
