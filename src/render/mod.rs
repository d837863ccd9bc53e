mod frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, DEFAULT_PALETTE, LinePrimitive, RectPrimitive, TextHAlign,
    TextPrimitive,
};

use crate::error::ChartResult;

/// Contract implemented by any drawing surface.
///
/// Surfaces receive a fully materialized, deterministic `RenderFrame`, so
/// painting stays isolated from series bookkeeping and hover logic. Diffing
/// against the previous frame is up to the surface.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
