use approx::assert_relative_eq;
use timechart_rs::core::{SeriesId, Viewport};
use timechart_rs::generators::{GeneratorKind, TooltipFragment};
use timechart_rs::interaction::{
    PlotBounds, Tooltip, TooltipConfig, TooltipSide, place_tooltip,
};
use timechart_rs::render::{Color, RenderFrame};

fn bounds() -> PlotBounds {
    PlotBounds {
        left: 0.0,
        top: 0.0,
        right: 400.0,
        bottom: 200.0,
    }
}

fn row(label: &str, value: &str) -> TooltipFragment {
    TooltipFragment {
        series_id: SeriesId(0),
        kind: GeneratorKind::Line,
        label: label.to_owned(),
        value: value.to_owned(),
        color: Color::rgb(0.2, 0.2, 0.8),
        is_first: true,
        is_last: true,
    }
}

#[test]
fn panel_sits_right_of_the_point_when_it_fits() {
    let config = TooltipConfig::default();
    let layout = place_tooltip((50.0, 20.0), (100.0, 50.0), bounds(), &config);
    assert_eq!(layout.side, TooltipSide::Right);
    assert_relative_eq!(layout.left, 64.0);
    assert_relative_eq!(layout.top, 20.0);
}

#[test]
fn panel_flips_left_on_right_overflow() {
    let config = TooltipConfig::default();
    let layout = place_tooltip((350.0, 20.0), (100.0, 50.0), bounds(), &config);
    assert_eq!(layout.side, TooltipSide::Left);
    assert_relative_eq!(layout.left, 240.0);
}

#[test]
fn panel_is_inset_from_the_right_edge_when_neither_side_fits() {
    let config = TooltipConfig::default();
    let layout = place_tooltip((200.0, 20.0), (300.0, 50.0), bounds(), &config);
    assert_eq!(layout.side, TooltipSide::InsetRight);
    assert_relative_eq!(layout.left, 88.0);

    let oversized = place_tooltip((200.0, 20.0), (500.0, 50.0), bounds(), &config);
    assert_relative_eq!(oversized.left, 0.0);
}

#[test]
fn panel_top_stays_inside_the_bounds() {
    let config = TooltipConfig::default();
    let layout = place_tooltip((50.0, 180.0), (100.0, 50.0), bounds(), &config);
    assert_relative_eq!(layout.top, 150.0);
}

#[test]
fn panel_size_follows_content() {
    let mut tooltip = Tooltip::new(TooltipConfig::default()).expect("tooltip");
    tooltip.show("abc".to_owned(), vec![row("cpu", "2")], (10.0, 10.0), bounds(), false);

    let (width, height) = tooltip.panel_size();
    assert_relative_eq!(width, 6.0 * 7.0 + 16.0);
    assert_relative_eq!(height, 2.0 * 16.0 + 16.0);
}

#[test]
fn animated_move_glides_then_snaps() {
    let mut tooltip = Tooltip::new(TooltipConfig::default()).expect("tooltip");
    tooltip.show("t".to_owned(), vec![row("cpu", "1")], (10.0, 10.0), bounds(), false);
    let start = tooltip.layout().expect("layout").left;

    tooltip.show("t".to_owned(), vec![row("cpu", "1")], (200.0, 10.0), bounds(), true);
    assert_relative_eq!(tooltip.layout().expect("layout").left, start);

    assert!(tooltip.advance(0.5).expect("advance"));
    let midway = tooltip.layout().expect("layout").left;
    assert!(midway > start && midway < 214.0);

    assert!(!tooltip.advance(10.0).expect("advance"));
    assert_relative_eq!(tooltip.layout().expect("layout").left, 214.0);
    assert!(tooltip.advance(-1.0).is_err());
}

#[test]
fn unanimated_show_jumps_immediately() {
    let mut tooltip = Tooltip::new(TooltipConfig::default()).expect("tooltip");
    tooltip.show("t".to_owned(), vec![], (10.0, 10.0), bounds(), false);
    tooltip.show("t".to_owned(), vec![], (100.0, 10.0), bounds(), false);
    assert_relative_eq!(tooltip.layout().expect("layout").left, 114.0);
    assert!(!tooltip.advance(0.1).expect("advance"));
}

#[test]
fn hide_is_idempotent_and_draws_nothing() {
    let mut tooltip = Tooltip::new(TooltipConfig::default()).expect("tooltip");
    tooltip.show("t".to_owned(), vec![row("cpu", "1")], (10.0, 10.0), bounds(), false);
    tooltip.set_pinned(true);
    tooltip.hide();
    tooltip.hide();

    assert!(!tooltip.is_visible());
    assert!(!tooltip.is_pinned());
    assert!(tooltip.layout().is_none());

    let mut frame = RenderFrame::new(Viewport::new(400, 200));
    tooltip.draw(&mut frame);
    assert!(frame.is_empty());
}

#[test]
fn pinned_panel_draws_an_opaque_background() {
    let mut tooltip = Tooltip::new(TooltipConfig::default()).expect("tooltip");
    tooltip.show("header".to_owned(), vec![row("cpu", "1")], (10.0, 10.0), bounds(), false);

    let mut frame = RenderFrame::new(Viewport::new(400, 200));
    tooltip.draw(&mut frame);
    assert_eq!(frame.rects.len(), 1);
    assert!(frame.rects[0].fill.alpha < 1.0);
    assert_eq!(frame.texts.len(), 2);
    assert_eq!(frame.texts[1].text, "cpu: 1");

    tooltip.set_pinned(true);
    let mut pinned = RenderFrame::new(Viewport::new(400, 200));
    tooltip.draw(&mut pinned);
    assert_relative_eq!(pinned.rects[0].fill.alpha, 1.0);
}

#[test]
fn invalid_config_is_rejected() {
    let config = TooltipConfig {
        remaining_per_second: 1.5,
        ..TooltipConfig::default()
    };
    assert!(Tooltip::new(config).is_err());

    let config = TooltipConfig {
        char_width_px: 0.0,
        ..TooltipConfig::default()
    };
    assert!(config.validate().is_err());
}
