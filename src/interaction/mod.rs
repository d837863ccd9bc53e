pub mod tooltip;

use serde::{Deserialize, Serialize};

pub use tooltip::{
    PlotBounds, Tooltip, TooltipConfig, TooltipLayout, TooltipSide, place_tooltip,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoverMode {
    #[default]
    Off,
    Hovering,
    /// Selection frozen at the anchor until released.
    Pinned,
}

/// Pointer lifecycle events, in chart-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Enter { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Leave,
    Click,
}

/// What the hover selection has to do after a pointer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEffect {
    /// Re-run the hover query at the anchor.
    Refresh,
    /// Drop the selection and every highlight.
    Clear,
    /// Selection unchanged.
    Keep,
}

/// Pointer-driven hover state machine: `Off -> Hovering <-> Pinned -> Off`.
///
/// `pointer` is the latest known cursor position; `anchor` is the position
/// the selection is computed at, frozen while pinned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverState {
    mode: HoverMode,
    pointer: Option<(f64, f64)>,
    anchor: Option<(f64, f64)>,
}

impl HoverState {
    #[must_use]
    pub fn mode(self) -> HoverMode {
        self.mode
    }

    #[must_use]
    pub fn pointer(self) -> Option<(f64, f64)> {
        self.pointer
    }

    #[must_use]
    pub fn anchor(self) -> Option<(f64, f64)> {
        self.anchor
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        self.mode != HoverMode::Off
    }

    pub fn on_pointer_enter(&mut self, x: f64, y: f64) -> HoverEffect {
        self.pointer = Some((x, y));
        match self.mode {
            HoverMode::Pinned => HoverEffect::Keep,
            HoverMode::Off | HoverMode::Hovering => {
                self.mode = HoverMode::Hovering;
                self.anchor = Some((x, y));
                HoverEffect::Refresh
            }
        }
    }

    /// A move without a prior enter starts hovering as well.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> HoverEffect {
        self.on_pointer_enter(x, y)
    }

    pub fn on_pointer_leave(&mut self) -> HoverEffect {
        self.pointer = None;
        match self.mode {
            HoverMode::Pinned => HoverEffect::Keep,
            HoverMode::Hovering => {
                self.mode = HoverMode::Off;
                self.anchor = None;
                HoverEffect::Clear
            }
            HoverMode::Off => HoverEffect::Keep,
        }
    }

    pub fn toggle_pin(&mut self) -> HoverEffect {
        match self.mode {
            HoverMode::Off => HoverEffect::Keep,
            HoverMode::Hovering => {
                self.mode = HoverMode::Pinned;
                HoverEffect::Keep
            }
            HoverMode::Pinned => match self.pointer {
                Some(pointer) => {
                    self.mode = HoverMode::Hovering;
                    self.anchor = Some(pointer);
                    HoverEffect::Refresh
                }
                None => {
                    self.mode = HoverMode::Off;
                    self.anchor = None;
                    HoverEffect::Clear
                }
            },
        }
    }

    /// Data or geometry changed under the anchor.
    #[must_use]
    pub fn on_chart_changed(self) -> HoverEffect {
        if self.is_active() {
            HoverEffect::Refresh
        } else {
            HoverEffect::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_hover_survives_leave_and_ignores_moves() {
        let mut state = HoverState::default();
        assert_eq!(state.on_pointer_enter(10.0, 5.0), HoverEffect::Refresh);
        assert_eq!(state.toggle_pin(), HoverEffect::Keep);
        assert_eq!(state.on_pointer_move(50.0, 5.0), HoverEffect::Keep);
        assert_eq!(state.anchor(), Some((10.0, 5.0)));
        assert_eq!(state.pointer(), Some((50.0, 5.0)));
        assert_eq!(state.on_pointer_leave(), HoverEffect::Keep);
        assert_eq!(state.mode(), HoverMode::Pinned);
        assert_eq!(state.toggle_pin(), HoverEffect::Clear);
        assert_eq!(state.mode(), HoverMode::Off);
    }

    #[test]
    fn unpin_refreshes_at_current_pointer() {
        let mut state = HoverState::default();
        state.on_pointer_enter(10.0, 5.0);
        state.toggle_pin();
        state.on_pointer_move(70.0, 8.0);
        assert_eq!(state.toggle_pin(), HoverEffect::Refresh);
        assert_eq!(state.anchor(), Some((70.0, 8.0)));
        assert_eq!(state.mode(), HoverMode::Hovering);
    }

    #[test]
    fn leave_without_hover_is_a_no_op() {
        let mut state = HoverState::default();
        assert_eq!(state.on_pointer_leave(), HoverEffect::Keep);
        assert_eq!(state.toggle_pin(), HoverEffect::Keep);
        assert_eq!(state.mode(), HoverMode::Off);
    }
}
