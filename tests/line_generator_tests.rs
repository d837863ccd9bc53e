use std::rc::Rc;

use approx::assert_relative_eq;
use timechart_rs::core::{
    DataPoint, FieldValue, LinearScale, SeriesId, TimeRange, ValueFormat, Viewport,
};
use timechart_rs::error::ChartError;
use timechart_rs::generators::{
    Axis, HoverFind, HoverHighlight, LineEntry, LineGenerator, SeriesGenerator, SeriesMeta,
    SeriesPayload,
};
use timechart_rs::render::{Color, RenderFrame};

fn sample(time: f64, value: f64) -> DataPoint {
    DataPoint::new().with("time", time).with("value", value)
}

fn samples(times: &[f64]) -> Vec<DataPoint> {
    times
        .iter()
        .map(|time| sample(*time, time / 1000.0))
        .collect()
}

fn range() -> TimeRange {
    TimeRange::new(0.0, 10_000.0).expect("range")
}

fn scaled_generator() -> LineGenerator {
    let mut generator = LineGenerator::default();
    let x = LinearScale::new((0.0, 10_000.0), (0.0, 400.0)).expect("x scale");
    let y = LinearScale::new((0.0, 10.0), (100.0, 0.0)).expect("y scale");
    generator.set_scales(Some(x), Some(y)).expect("scales");
    generator
}

fn meta(label: &str, axis: Axis) -> SeriesMeta {
    SeriesMeta {
        id: SeriesId(0),
        label: label.to_owned(),
        color: Color::rgb(0.2, 0.4, 0.6),
        axis,
        value_format: ValueFormat::default(),
    }
}

#[test]
fn break_splits_the_line_into_two_paths() {
    let mut generator = scaled_generator();
    let payload = SeriesPayload::new(samples(&[1000.0, 2000.0, 3000.0, 4000.0, 5000.0]))
        .with_breaks(vec![3500.0]);
    generator.update(payload, range()).expect("update");

    assert_eq!(generator.paths().len(), 2);
    assert_eq!(generator.paths()[0].len(), 3);
    assert_eq!(generator.paths()[1].len(), 2);
    assert!(generator.lonely_points().is_empty());
    assert!(matches!(
        generator.buffer()[3],
        LineEntry::Break { time } if time == 3500.0
    ));
}

#[test]
fn sample_isolated_between_breaks_becomes_a_lonely_point() {
    let mut generator = scaled_generator();
    let payload = SeriesPayload::new(samples(&[1000.0, 2000.0, 3000.0, 4000.0, 5000.0]))
        .with_breaks(vec![2500.0, 3500.0]);
    generator.update(payload, range()).expect("update");

    assert_eq!(generator.paths().len(), 2);
    assert_eq!(generator.lonely_points().len(), 1);
    let (x, y) = generator.lonely_points()[0];
    assert_relative_eq!(x, 120.0, epsilon = 1e-9);
    assert_relative_eq!(y, 70.0, epsilon = 1e-9);
}

#[test]
fn non_numeric_value_splits_the_line() {
    let mut generator = scaled_generator();
    let mut data = samples(&[1000.0, 2000.0, 4000.0, 5000.0]);
    data.insert(
        2,
        DataPoint::new()
            .with("time", 3000.0)
            .with("value", FieldValue::Null),
    );
    generator
        .update(SeriesPayload::new(data), range())
        .expect("update");

    assert_eq!(generator.paths().len(), 2);
    assert!(generator.lonely_points().is_empty());
}

#[test]
fn older_samples_in_range_are_carried_over() {
    let mut generator = scaled_generator();
    generator
        .update(
            SeriesPayload::new(samples(&[1000.0, 2000.0, 3000.0])),
            range(),
        )
        .expect("first update");

    let shifted = TimeRange::new(1500.0, 11_500.0).expect("range");
    generator
        .update(SeriesPayload::new(samples(&[4000.0, 5000.0])), shifted)
        .expect("second update");

    let times: Vec<f64> = generator.buffer().iter().map(LineEntry::time).collect();
    assert_eq!(times, vec![2000.0, 3000.0, 4000.0, 5000.0]);
    assert_eq!(generator.paths().len(), 1);
}

#[test]
fn overlapping_update_replaces_old_samples() {
    let mut generator = scaled_generator();
    generator
        .update(
            SeriesPayload::new(samples(&[1000.0, 2000.0, 3000.0])),
            range(),
        )
        .expect("first update");
    generator
        .update(SeriesPayload::new(samples(&[2500.0, 3500.0])), range())
        .expect("second update");

    let times: Vec<f64> = generator.buffer().iter().map(LineEntry::time).collect();
    assert_eq!(times, vec![1000.0, 2000.0, 2500.0, 3500.0]);
}

#[test]
fn update_without_scales_fails() {
    let mut generator = LineGenerator::default();
    let result = generator.update(SeriesPayload::new(samples(&[1000.0])), range());
    assert!(matches!(result, Err(ChartError::MissingScale { .. })));

    let y = LinearScale::new((0.0, 1.0), (100.0, 0.0)).expect("y scale");
    let result = generator.set_scales(None, Some(y));
    assert!(matches!(result, Err(ChartError::MissingScale { axis: "x" })));
}

#[test]
fn hover_finds_sample_within_threshold_by_identity() {
    let mut generator = scaled_generator();
    generator
        .update(
            SeriesPayload::new(samples(&[1000.0, 2000.0, 3000.0])),
            range(),
        )
        .expect("update");

    let finder = generator.hover_finder().expect("line supports hover");
    let found = finder.hover_find(2050.0).expect("2 px away");
    assert_eq!(found.time("time"), Some(2000.0));
    assert!(finder.hover_find(2500.0).is_none());

    let in_buffer = generator
        .buffer()
        .iter()
        .any(|entry| matches!(entry, LineEntry::Sample(s) if Rc::ptr_eq(&s.point, &found)));
    assert!(in_buffer);

    let highlighter = generator.hover_highlighter().expect("line supports highlight");
    highlighter.hover_on(&found);
    assert_eq!(highlighter.highlighted_count(), 1);
    highlighter.hover_off();
    highlighter.hover_off();
    assert_eq!(highlighter.highlighted_count(), 0);
}

#[test]
fn equal_but_foreign_point_is_not_highlighted() {
    let mut generator = scaled_generator();
    generator
        .update(SeriesPayload::new(samples(&[1000.0, 2000.0])), range())
        .expect("update");

    let foreign = Rc::new(sample(2000.0, 2.0));
    let highlighter = generator.hover_highlighter().expect("highlight");
    highlighter.hover_on(&foreign);
    assert_eq!(highlighter.highlighted_count(), 0);
}

#[test]
fn hidden_line_draws_nothing_and_keeps_buffer() {
    let mut generator = scaled_generator();
    generator
        .update(
            SeriesPayload::new(samples(&[1000.0, 2000.0, 3000.0])),
            range(),
        )
        .expect("update");
    let meta = meta("cpu", Axis::Left);

    let mut frame = RenderFrame::new(Viewport::new(400, 100));
    generator.draw(&mut frame, &meta).expect("draw");
    assert_eq!(frame.lines.len(), 2);

    generator.hide();
    let mut hidden = RenderFrame::new(Viewport::new(400, 100));
    generator.draw(&mut hidden, &meta).expect("draw");
    assert!(hidden.is_empty());
    assert_eq!(generator.buffer().len(), 3);

    generator.show();
    assert!(generator.is_visible());
}

#[test]
fn resize_rescales_paths() {
    let mut generator = scaled_generator();
    generator
        .update(SeriesPayload::new(samples(&[1000.0, 2000.0])), range())
        .expect("update");
    generator.resize(800.0, 200.0).expect("resize");

    let path = &generator.paths()[0];
    assert_relative_eq!(path[0].0, 80.0, epsilon = 1e-9);
    assert_relative_eq!(path[1].1, 160.0, epsilon = 1e-9);
    assert!(generator.resize(0.0, 200.0).is_err());
}

#[test]
fn tooltip_rounds_value_and_annotates_right_axis() {
    let generator = scaled_generator();
    let point = sample(1000.0, 1.23456);

    assert!(generator.tooltip_contents(None, &meta("cpu", Axis::Left)).is_none());

    let fragment = generator
        .tooltip_contents(Some(&point), &meta("cpu", Axis::Left))
        .expect("fragment");
    assert_eq!(fragment.label, "cpu");
    assert_eq!(fragment.value, "1.235");

    let long_label = "a".repeat(40);
    let fragment = generator
        .tooltip_contents(Some(&point), &meta(&long_label, Axis::Right))
        .expect("fragment");
    assert!(fragment.label.ends_with("\u{2026} (RHS)"));
    assert_eq!(fragment.label.chars().count(), 30 + " (RHS)".len());
}

#[test]
fn value_extent_skips_non_numeric_samples() {
    let mut generator = scaled_generator();
    let data = vec![
        sample(1000.0, -2.0),
        DataPoint::new().with("time", 1500.0).with("value", "n/a"),
        sample(2000.0, 7.5),
    ];
    generator
        .update(SeriesPayload::new(data), range())
        .expect("update");
    assert_eq!(generator.value_extent(), Some((-2.0, 7.5)));
}

#[test]
fn unscaled_line_draws_nothing() {
    let mut generator = LineGenerator::default();
    let _ = generator.update(SeriesPayload::new(samples(&[1000.0, 2000.0])), range());

    let mut frame = RenderFrame::new(Viewport::new(400, 100));
    generator
        .draw(&mut frame, &meta("cpu", Axis::Left))
        .expect("nothing to draw is not an error");
    assert!(frame.is_empty());
}
