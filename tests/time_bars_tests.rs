use approx::assert_relative_eq;
use timechart_rs::core::{DataPoint, LinearScale, SeriesId, TimeRange, ValueFormat, Viewport};
use timechart_rs::generators::{
    Axis, GeneratorKind, HoverFind, HoverHighlight, SeriesGenerator, SeriesMeta, SeriesPayload,
    TimeBarsGenerator,
};
use timechart_rs::render::{Color, RenderFrame};

fn sample(time: f64, value: f64) -> DataPoint {
    DataPoint::new().with("time", time).with("value", value)
}

fn generator_with(data: Vec<DataPoint>) -> TimeBarsGenerator {
    let mut generator = TimeBarsGenerator::default();
    let x = LinearScale::new((0.0, 10_000.0), (0.0, 400.0)).expect("x scale");
    let y = LinearScale::new((0.0, 10.0), (100.0, 0.0)).expect("y scale");
    generator.set_scales(Some(x), Some(y)).expect("scales");
    generator
        .update(
            SeriesPayload::new(data),
            TimeRange::new(0.0, 10_000.0).expect("range"),
        )
        .expect("update");
    generator
}

#[test]
fn first_bar_starts_at_domain_start() {
    let generator = generator_with(vec![sample(2000.0, 5.0), sample(3000.0, 7.0)]);
    let bars = generator.bars();

    assert_eq!(generator.kind(), GeneratorKind::TimeBars);
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].start, 0.0);
    assert_eq!(bars[0].width(), 2000.0);
    assert_eq!(bars[1].start, 2000.0);
    assert_eq!(bars[1].width(), 1000.0);

    assert_relative_eq!(bars[0].x_left, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bars[0].x_right, 80.0, epsilon = 1e-9);
    assert_relative_eq!(bars[0].y_top, 50.0, epsilon = 1e-9);
    assert_relative_eq!(bars[0].y_bottom, 100.0, epsilon = 1e-9);
}

#[test]
fn hover_resolves_the_covering_bar() {
    let generator = generator_with(vec![sample(2000.0, 5.0), sample(3000.0, 7.0)]);
    let finder = generator.hover_finder().expect("bars support hover");

    let time_of = |time: f64| finder.hover_find(time).and_then(|point| point.time("time"));
    assert_eq!(time_of(1500.0), Some(2000.0));
    assert_eq!(time_of(2000.0), Some(2000.0));
    assert_eq!(time_of(2500.0), Some(3000.0));
    assert_eq!(time_of(3500.0), None);
}

#[test]
fn highlighted_bar_is_drawn_opaque() {
    let mut generator = generator_with(vec![sample(2000.0, 5.0), sample(3000.0, 7.0)]);
    let point = generator
        .hover_finder()
        .and_then(|finder| finder.hover_find(2500.0))
        .expect("covered");

    let highlighter = generator.hover_highlighter().expect("bars support highlight");
    highlighter.hover_on(&point);
    assert_eq!(highlighter.highlighted_count(), 1);
    assert_eq!(generator.highlighted_bar().map(|bar| bar.end), Some(3000.0));

    let meta = SeriesMeta {
        id: SeriesId(1),
        label: "jobs".to_owned(),
        color: Color::rgb(1.0, 0.5, 0.0),
        axis: Axis::Left,
        value_format: ValueFormat::default(),
    };
    let mut frame = RenderFrame::new(Viewport::new(400, 100));
    generator.draw(&mut frame, &meta).expect("draw");
    assert_eq!(frame.rects.len(), 2);
    assert_eq!(frame.rects[0].fill.alpha, 0.6);
    assert_eq!(frame.rects[1].fill.alpha, 1.0);
}

#[test]
fn bars_without_value_are_not_drawn() {
    let generator = generator_with(vec![
        sample(2000.0, 5.0),
        DataPoint::new().with("time", 3000.0).with("value", "pending"),
    ]);
    let meta = SeriesMeta {
        id: SeriesId(0),
        label: "jobs".to_owned(),
        color: Color::rgb(1.0, 0.5, 0.0),
        axis: Axis::Left,
        value_format: ValueFormat::default(),
    };
    let mut frame = RenderFrame::new(Viewport::new(400, 100));
    generator.draw(&mut frame, &meta).expect("draw");

    assert_eq!(generator.bars().len(), 2);
    assert_eq!(generator.bars()[1].value, None);
    assert_eq!(frame.rects.len(), 1);
}

#[test]
fn update_replaces_buffer_and_drops_highlight() {
    let mut generator = generator_with(vec![sample(2000.0, 5.0), sample(3000.0, 7.0)]);
    let point = generator
        .hover_finder()
        .and_then(|finder| finder.hover_find(1000.0))
        .expect("covered");
    if let Some(highlighter) = generator.hover_highlighter() {
        highlighter.hover_on(&point);
    }

    generator
        .update(
            SeriesPayload::new(vec![sample(4000.0, 1.0)]),
            TimeRange::new(0.0, 10_000.0).expect("range"),
        )
        .expect("update");
    assert_eq!(generator.buffer().len(), 1);
    assert!(generator.highlighted_bar().is_none());
}

#[test]
fn bar_boundaries_are_inclusive_on_both_ends() {
    let generator = generator_with(vec![sample(2000.0, 5.0), sample(3000.0, 7.0)]);
    let finder = generator.hover_finder().expect("bars support hover");
    let time_of = |time: f64| finder.hover_find(time).and_then(|point| point.time("time"));

    assert_eq!(time_of(0.0), Some(2000.0));
    assert_eq!(time_of(2000.0), Some(2000.0));
    assert_eq!(time_of(2000.5), Some(3000.0));
    assert_eq!(time_of(3000.0), Some(3000.0));
    assert_eq!(time_of(3000.5), None);
}
