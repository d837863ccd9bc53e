use tracing::debug;

use crate::core::{Series, SeriesId};
use crate::generators::{
    Axis, EventMarkersGenerator, GeneratorKind, GeneratorOptions, LineGenerator, SeriesGenerator,
    SeriesMeta, TimeBarsGenerator,
};

use super::TimeChartConfig;

/// A series paired with its generator and presentation metadata.
pub struct SeriesEntry {
    series: Series,
    meta: SeriesMeta,
    generator: Box<dyn SeriesGenerator>,
}

impl SeriesEntry {
    #[must_use]
    pub fn new(series: Series, meta: SeriesMeta, generator: Box<dyn SeriesGenerator>) -> Self {
        Self {
            series,
            meta,
            generator,
        }
    }

    #[must_use]
    pub fn series(&self) -> &Series {
        &self.series
    }

    #[must_use]
    pub fn meta(&self) -> &SeriesMeta {
        &self.meta
    }

    #[must_use]
    pub fn kind(&self) -> GeneratorKind {
        self.generator.kind()
    }

    #[must_use]
    pub fn generator(&self) -> &dyn SeriesGenerator {
        self.generator.as_ref()
    }

    pub fn generator_mut(&mut self) -> &mut dyn SeriesGenerator {
        self.generator.as_mut()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.generator.is_visible()
    }
}

impl std::fmt::Debug for SeriesEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesEntry")
            .field("series", &self.series)
            .field("meta", &self.meta)
            .field("kind", &self.generator.kind())
            .field("visible", &self.generator.is_visible())
            .finish()
    }
}

/// Creates a generator of the requested kind.
#[must_use]
pub fn build_generator(kind: GeneratorKind, options: GeneratorOptions) -> Box<dyn SeriesGenerator> {
    match kind {
        GeneratorKind::Line => Box::new(LineGenerator::new(options)),
        GeneratorKind::TimeBars => Box::new(TimeBarsGenerator::new(options)),
        GeneratorKind::EventMarkers => Box::new(EventMarkersGenerator::new(options)),
    }
}

/// Series entries of one chart, in creation order.
#[derive(Debug, Default)]
pub struct SeriesRegistry {
    entries: Vec<SeriesEntry>,
}

impl SeriesRegistry {
    #[must_use]
    pub fn get(&self, id: SeriesId) -> Option<&SeriesEntry> {
        self.entries.iter().find(|entry| entry.series.id == id)
    }

    pub fn get_mut(&mut self, id: SeriesId) -> Option<&mut SeriesEntry> {
        self.entries.iter_mut().find(|entry| entry.series.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: SeriesId) -> bool {
        self.get(id).is_some()
    }

    pub fn insert(&mut self, entry: SeriesEntry) {
        debug!(
            series = %entry.series.id,
            kind = ?entry.kind(),
            label = %entry.meta.label,
            "series entry registered"
        );
        self.entries.push(entry);
    }

    /// Builds the entry for a newly detected series from the chart config.
    #[must_use]
    pub fn entry_for(series: &Series, config: &TimeChartConfig) -> SeriesEntry {
        let mut kind = None;
        let mut axis = None;
        let mut label = None;
        let mut color = None;
        let mut value_format = None;
        for rule in config.series_rules.iter().filter(|rule| rule.matches(&series.keys)) {
            kind = kind.or(rule.kind);
            axis = axis.or(rule.axis);
            label = label.or_else(|| rule.label.clone());
            color = color.or(rule.color);
            value_format = value_format.or(rule.value_format);
        }

        let meta = SeriesMeta {
            id: series.id,
            label: label.unwrap_or_else(|| match series.label() {
                detected if detected.is_empty() => config.value_field.clone(),
                detected => detected,
            }),
            color: color.unwrap_or_else(|| config.palette_color(series.id.0)),
            axis: axis.unwrap_or(Axis::Left),
            value_format: value_format.unwrap_or(config.default_value_format),
        };
        let generator = build_generator(
            kind.unwrap_or(config.default_kind),
            config.generator_options(),
        );
        SeriesEntry::new(series.clone(), meta, generator)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SeriesEntry> {
        self.entries.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [SeriesEntry] {
        &mut self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
