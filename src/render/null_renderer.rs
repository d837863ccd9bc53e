use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Headless renderer used by tests and by hosts that only consume hover state.
///
/// Frames are still validated, and the last one is kept for inspection.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_frame: Option<RenderFrame>,
}

impl NullRenderer {
    #[must_use]
    pub fn last_circle_count(&self) -> usize {
        self.last_frame.as_ref().map_or(0, |frame| frame.circles.len())
    }

    #[must_use]
    pub fn last_line_count(&self) -> usize {
        self.last_frame.as_ref().map_or(0, |frame| frame.lines.len())
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
