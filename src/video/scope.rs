//! Scoped GPU state for render passes.

use std::ops::{Deref, DerefMut};

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::assets::prelude::*;
use super::backends::Visitor;

/// Captures the bound surface, viewport, cull face, depth test and polygon
/// mode when a pass begins and restores them when the scope is dropped,
/// including early returns through `?`. Every pass is also wrapped in a debug
/// marker named `label`.
///
/// ```ignore
/// {
///     let mut pass = PassScope::begin(video, "shadow");
///     pass.target(Some(surface), Vector2::new(1024, 1024))?;
///     pass.set_cull_face(CullFace::Front)?;
///     pass.draw(mesh)?;
/// } // Previous framebuffer, viewport and render states are restored here.
/// ```
pub struct PassScope<'a> {
    visitor: &'a mut dyn Visitor,
    surface: Option<SurfaceHandle>,
    viewport: SurfaceViewport,
    cull_face: CullFace,
    depth_test: (bool, Comparison),
    polygon_mode: PolygonMode,
}

impl<'a> PassScope<'a> {
    pub fn begin(visitor: &'a mut dyn Visitor, label: &str) -> Self {
        let surface = visitor.surface();
        let viewport = visitor.viewport();
        let cull_face = visitor.cull_face();
        let depth_test = visitor.depth_test();
        let polygon_mode = visitor.polygon_mode();
        visitor.push_marker(label);

        PassScope {
            visitor,
            surface,
            viewport,
            cull_face,
            depth_test,
            polygon_mode,
        }
    }

    /// Binds `surface` and sets a viewport covering `dimensions`.
    pub fn target(&mut self, surface: Option<SurfaceHandle>, dimensions: Vector2<u32>) -> Result<()> {
        self.visitor.bind_surface(surface)?;
        self.visitor.set_viewport(SurfaceViewport::new(dimensions))
    }

    /// The cull face that was active when the pass began.
    #[inline]
    pub fn ambient_cull_face(&self) -> CullFace {
        self.cull_face
    }

    fn restore(&mut self) -> Result<()> {
        self.visitor.bind_surface(self.surface)?;
        self.visitor.set_viewport(self.viewport)?;
        self.visitor.set_cull_face(self.cull_face)?;
        self.visitor.set_depth_test(self.depth_test.0, self.depth_test.1)?;
        self.visitor.set_polygon_mode(self.polygon_mode)
    }
}

impl<'a> Deref for PassScope<'a> {
    type Target = dyn Visitor + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.visitor
    }
}

impl<'a> DerefMut for PassScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.visitor
    }
}

impl<'a> Drop for PassScope<'a> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            error!("Failed to restore state after pass: {}", err);
        }

        self.visitor.pop_marker();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::backends::record::{Call, RecordingVisitor};

    fn surface(video: &mut RecordingVisitor) -> SurfaceHandle {
        let depth = video
            .create_render_texture(RenderTextureParams {
                format: RenderTextureFormat::Depth24,
                dimensions: Vector2::new(256, 256),
                ..Default::default()
            })
            .unwrap();

        video.create_surface(SurfaceParams::depth_only(depth)).unwrap()
    }

    fn failing_pass(video: &mut dyn Visitor, surface: SurfaceHandle) -> Result<()> {
        let mut pass = PassScope::begin(video, "failing");
        pass.target(Some(surface), Vector2::new(256, 256))?;
        pass.set_cull_face(CullFace::Front)?;
        pass.set_depth_test(false, Comparison::Always)?;
        pass.set_polygon_mode(PolygonMode::Line)?;
        pass.draw(MeshHandle::default())?;
        unreachable!();
    }

    #[test]
    fn restores_on_early_return() {
        let mut video = RecordingVisitor::new(Vector2::new(800, 600));
        let surface = surface(&mut video);
        video.set_cull_face(CullFace::Back).unwrap();
        video.set_depth_test(true, Comparison::Less).unwrap();
        video.take_calls();

        // No shader is bound, the draw fails.
        assert!(failing_pass(&mut video, surface).is_err());

        assert_eq!(video.surface(), None);
        assert_eq!(video.viewport(), SurfaceViewport::new(Vector2::new(800, 600)));
        assert_eq!(video.cull_face(), CullFace::Back);
        assert_eq!(video.depth_test(), (true, Comparison::Less));
        assert_eq!(video.polygon_mode(), PolygonMode::Fill);

        let calls = video.take_calls();
        assert_eq!(calls.first(), Some(&Call::PushMarker("failing".into())));
        assert_eq!(
            &calls[calls.len() - 6..],
            &[
                Call::BindSurface(None),
                Call::SetViewport(SurfaceViewport::new(Vector2::new(800, 600))),
                Call::SetCullFace(CullFace::Back),
                Call::SetDepthTest(true, Comparison::Less),
                Call::SetPolygonMode(PolygonMode::Fill),
                Call::PopMarker,
            ][..]
        );
    }

    #[test]
    fn nested_scopes() {
        let mut video = RecordingVisitor::new(Vector2::new(800, 600));
        let inner = surface(&mut video);

        {
            let mut outer = PassScope::begin(&mut video, "outer");
            outer.set_cull_face(CullFace::Back).unwrap();

            {
                let mut pass = PassScope::begin(&mut *outer, "inner");
                assert_eq!(pass.ambient_cull_face(), CullFace::Back);
                pass.target(Some(inner), Vector2::new(256, 256)).unwrap();
                pass.set_cull_face(CullFace::Front).unwrap();
            }

            assert_eq!(outer.surface(), None);
            assert_eq!(outer.cull_face(), CullFace::Back);
        }

        assert_eq!(video.cull_face(), CullFace::Nothing);
        assert_eq!(video.markers(), vec!["outer".to_owned()]);
    }

    #[test]
    fn restores_render_states_of_enclosing_pass() {
        let mut video = RecordingVisitor::new(Vector2::new(800, 600));

        {
            let mut outer = PassScope::begin(&mut video, "outer");
            outer.set_depth_test(true, Comparison::LessOrEqual).unwrap();
            outer.set_polygon_mode(PolygonMode::Line).unwrap();

            {
                let mut pass = PassScope::begin(&mut *outer, "inner");
                pass.set_depth_test(false, Comparison::Always).unwrap();
                pass.set_polygon_mode(PolygonMode::Fill).unwrap();
            }

            assert_eq!(outer.depth_test(), (true, Comparison::LessOrEqual));
            assert_eq!(outer.polygon_mode(), PolygonMode::Line);
        }

        assert_eq!(video.depth_test(), (false, Comparison::Always));
        assert_eq!(video.polygon_mode(), PolygonMode::Fill);
    }
}
