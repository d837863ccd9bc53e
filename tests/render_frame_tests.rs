use approx::assert_relative_eq;
use timechart_rs::api::{ChartUpdate, TimeChart, TimeChartConfig};
use timechart_rs::core::{DataPoint, Margins, TimeRange, Viewport};
use timechart_rs::render::{
    CirclePrimitive, Color, LinePrimitive, NullRenderer, RectPrimitive, RenderFrame, Renderer,
    TextHAlign, TextPrimitive,
};

fn chart() -> TimeChart<NullRenderer> {
    let config = TimeChartConfig::new(Viewport::new(440, 140))
        .with_margins(Margins::uniform(20.0))
        .with_initial_range(TimeRange::new(0.0, 10_000.0).expect("range"))
        .with_left_domain(0.0, 10.0);
    let mut chart = TimeChart::new(NullRenderer::default(), config).expect("chart");
    let points = (0..=4)
        .map(|i| {
            DataPoint::new()
                .with("time", f64::from(i) * 1000.0)
                .with("value", f64::from(i))
        })
        .collect();
    chart.update(ChartUpdate::new(points)).expect("update");
    chart
}

#[test]
fn translate_shifts_every_primitive() {
    let color = Color::rgb(0.0, 0.0, 0.0);
    let mut frame = RenderFrame::new(Viewport::new(100, 100))
        .with_line(LinePrimitive::new(0.0, 0.0, 10.0, 10.0, 1.0, color))
        .with_rect(RectPrimitive::new(5.0, 5.0, 2.0, 2.0, color))
        .with_circle(CirclePrimitive::new(1.0, 2.0, 3.0, color))
        .with_text(TextPrimitive::new("a", 4.0, 4.0, 12.0, color, TextHAlign::Left));
    frame.translate(10.0, 20.0);

    assert_eq!((frame.lines[0].x1, frame.lines[0].y2), (10.0, 30.0));
    assert_eq!((frame.rects[0].x, frame.rects[0].y), (15.0, 25.0));
    assert_eq!((frame.circles[0].cx, frame.circles[0].cy), (11.0, 22.0));
    assert_eq!((frame.texts[0].x, frame.texts[0].y), (14.0, 24.0));
}

#[test]
fn validation_rejects_broken_primitives() {
    let color = Color::rgb(0.0, 0.0, 0.0);
    let bad_line = RenderFrame::new(Viewport::new(100, 100))
        .with_line(LinePrimitive::new(f64::NAN, 0.0, 1.0, 1.0, 1.0, color));
    assert!(bad_line.validate().is_err());

    let bad_color = RenderFrame::new(Viewport::new(100, 100))
        .with_circle(CirclePrimitive::new(1.0, 1.0, 1.0, Color::rgba(2.0, 0.0, 0.0, 1.0)));
    assert!(bad_color.validate().is_err());

    let mut renderer = NullRenderer::default();
    assert!(renderer.render(&bad_line).is_err());
    assert_eq!(renderer.frames_rendered, 0);
}

#[test]
fn series_are_rendered_inside_the_margins() {
    let mut chart = chart();
    chart.render().expect("render");

    let renderer = chart.renderer();
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_line_count(), 4);
    let frame = renderer.last_frame.as_ref().expect("frame");
    let first = frame.lines[0];
    assert_relative_eq!(first.x1, 20.0, epsilon = 1e-9);
    assert_relative_eq!(first.y1, 120.0, epsilon = 1e-9);
    assert_relative_eq!(first.x2, 60.0, epsilon = 1e-9);
    assert_relative_eq!(first.y2, 110.0, epsilon = 1e-9);
}

#[test]
fn hover_adds_indicator_highlight_and_tooltip() {
    let mut chart = chart();
    chart.pointer_enter(100.0, 60.0);
    chart.render().expect("render");

    let frame = chart.renderer().last_frame.as_ref().expect("frame");
    assert_eq!(frame.lines.len(), 5);
    let indicator = frame.lines[4];
    assert_relative_eq!(indicator.x1, 100.0, epsilon = 1e-9);
    assert_relative_eq!(indicator.y1, 20.0, epsilon = 1e-9);
    assert_relative_eq!(indicator.y2, 120.0, epsilon = 1e-9);

    assert_eq!(frame.circles.len(), 1);
    assert_eq!(frame.rects.len(), 1);
    assert_eq!(frame.texts.len(), 2);
    assert_eq!(frame.texts[1].text, "value: 2");
}

#[test]
fn hiding_the_only_series_leaves_an_empty_frame() {
    let mut chart = chart();
    let id = chart.visible_series()[0];
    chart.set_series_visible(id, false).expect("known series");
    let frame = chart.build_render_frame().expect("frame");
    assert!(frame.is_empty());
}
