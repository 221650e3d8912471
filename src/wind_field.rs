//! Blends the seasonal base wind with every pressure system and answers point
//! queries against the result.
//!
//! Each cached blend remembers the inputs it was built from (season plus every
//! source's kind, center and strength). A query whose inputs differ rebuilds
//! before answering, so a caller can never observe a stale field.

use crate::{
    geo::{LatLng, LatLngBounds},
    pressure_system::{PressureKind, WindPerturbation},
    spatial::SpatialIndex,
    wind::{Season, WindDataset, WindPoint, WindVector},
};

#[derive(Debug, Clone, PartialEq)]
struct SourceKey {
    kind: PressureKind,
    center: LatLng,
    strength: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct BlendKey {
    season: Season,
    sources: Vec<SourceKey>,
}

impl BlendKey {
    fn new(season: Season, sources: &[&dyn WindPerturbation]) -> Self {
        Self {
            season,
            sources: sources
                .iter()
                .map(|source| SourceKey {
                    kind: source.kind(),
                    center: source.center(),
                    strength: source.strength(),
                })
                .collect(),
        }
    }
}

#[derive(Debug)]
struct Blend {
    key: BlendKey,
    index: SpatialIndex,
}

#[derive(Debug, Default)]
pub struct WindFieldAssembler {
    physics: Option<Blend>,
    display: Option<Blend>,
    rebuilds: u64,
}

impl WindFieldAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a blended field has been rebuilt.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Wind driving the simulation: base data plus `sources`.
    pub fn wind_at(
        &mut self,
        base: &WindDataset,
        sources: &[&dyn WindPerturbation],
        point: &LatLng,
    ) -> WindVector {
        self.current_wind(base, sources)
            .interpolate(point)
            .unwrap_or_default()
    }

    pub fn current_wind(
        &mut self,
        base: &WindDataset,
        sources: &[&dyn WindPerturbation],
    ) -> &SpatialIndex {
        let Self {
            physics, rebuilds, ..
        } = self;
        refresh(physics, rebuilds, base, sources)
    }

    /// Display-only field that also carries the hurricane's own circulation.
    pub fn wind_including(
        &mut self,
        base: &WindDataset,
        sources: &[&dyn WindPerturbation],
        hurricane: &dyn WindPerturbation,
    ) -> &SpatialIndex {
        let mut all: Vec<&dyn WindPerturbation> = sources.to_vec();
        all.push(hurricane);
        let Self {
            display, rebuilds, ..
        } = self;
        refresh(display, rebuilds, base, &all)
    }
}

fn refresh<'a>(
    slot: &'a mut Option<Blend>,
    rebuilds: &mut u64,
    base: &WindDataset,
    sources: &[&dyn WindPerturbation],
) -> &'a SpatialIndex {
    let key = BlendKey::new(base.season(), sources);
    if slot.as_ref().is_some_and(|blend| blend.key != key) {
        *slot = None;
    }
    let blend = slot.get_or_insert_with(|| {
        let points: Vec<WindPoint> = base
            .points()
            .iter()
            .map(|point| point.with_vector(blend_point(point, sources)))
            .collect();
        *rebuilds += 1;
        tracing::debug!(
            season = %key.season,
            sources = sources.len(),
            points = points.len(),
            "rebuilt wind field"
        );
        Blend {
            key,
            index: SpatialIndex::new(&points),
        }
    });
    &blend.index
}

/// Base vector modified by every source whose range covers the point. Where
/// ranges overlap, each source's result is weighted by the inverse of its
/// range fraction; a point sitting exactly on a center takes that source alone.
pub fn blend_point(point: &WindPoint, sources: &[&dyn WindPerturbation]) -> WindVector {
    let position = point.position();
    let mut u = 0.0;
    let mut v = 0.0;
    let mut weight_sum = 0.0;
    for source in sources {
        let Some(d) = source.range_fraction(&position) else {
            continue;
        };
        let influenced = source.apply_to_wind_point(point);
        if d == 0.0 {
            return influenced;
        }
        let weight = 1.0 / d;
        u += influenced.u * weight;
        v += influenced.v * weight;
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        point.vector()
    } else {
        WindVector::new(u / weight_sum, v / weight_sum)
    }
}

/// Blended samples inside the viewport, or all of them without one.
pub fn samples_within(index: &SpatialIndex, bounds: Option<&LatLngBounds>) -> Vec<WindPoint> {
    index
        .points()
        .filter(|point| bounds.map_or(true, |b| b.contains(&point.position())))
        .copied()
        .collect()
}
