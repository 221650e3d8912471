//! Nearest-neighbour index over wind sample points.
//!
//! Points are stored as unit vectors on the sphere and arranged as an implicit
//! 3-d tree: chord distance is monotonic in great-circle distance, so the k
//! nearest by chord are the k nearest on the globe.

use crate::{
    geo::LatLng,
    wind::{WindPoint, WindVector},
};

/// Neighbours averaged by [`SpatialIndex::interpolate`].
pub const INTERPOLATION_NEIGHBOURS: usize = 4;

#[derive(Debug, Clone)]
struct Entry {
    xyz: [f64; 3],
    point: WindPoint,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    entries: Vec<Entry>,
}

impl SpatialIndex {
    pub fn new(points: &[WindPoint]) -> Self {
        let mut entries: Vec<Entry> = points
            .iter()
            .map(|point| Entry {
                xyz: point.position().to_unit_xyz(),
                point: *point,
            })
            .collect();
        build(&mut entries, 0);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &WindPoint> {
        self.entries.iter().map(|entry| &entry.point)
    }

    /// Up to `k` points closest to `target`, nearest first, with their
    /// great-circle distances in metres.
    pub fn nearest(&self, target: &LatLng, k: usize) -> Vec<(f64, WindPoint)> {
        if k == 0 {
            return Vec::new();
        }
        let xyz = target.to_unit_xyz();
        let mut best: Vec<(f64, &Entry)> = Vec::with_capacity(k + 1);
        search(&self.entries, 0, &xyz, k, &mut best);
        best.into_iter()
            .map(|(_, entry)| (target.distance_to(&entry.point.position()), entry.point))
            .collect()
    }

    /// Exact hits return the stored vector; otherwise an inverse-distance
    /// weighted average of the nearest samples. `None` only when empty.
    pub fn interpolate(&self, target: &LatLng) -> Option<WindVector> {
        let neighbours = self.nearest(target, INTERPOLATION_NEIGHBOURS);
        if let Some((_, exact)) = neighbours.iter().find(|(distance, _)| *distance == 0.0) {
            return Some(exact.vector());
        }
        if neighbours.is_empty() {
            return None;
        }

        let mut u = 0.0;
        let mut v = 0.0;
        let mut weight_sum = 0.0;
        for (distance, point) in &neighbours {
            let weight = 1.0 / distance;
            u += point.u * weight;
            v += point.v * weight;
            weight_sum += weight;
        }
        Some(WindVector::new(u / weight_sum, v / weight_sum))
    }
}

fn build(entries: &mut [Entry], depth: usize) {
    if entries.len() <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = entries.len() / 2;
    entries.select_nth_unstable_by(mid, |a, b| a.xyz[axis].total_cmp(&b.xyz[axis]));
    let (left, right) = entries.split_at_mut(mid);
    build(left, depth + 1);
    build(&mut right[1..], depth + 1);
}

fn search<'a>(
    entries: &'a [Entry],
    depth: usize,
    target: &[f64; 3],
    k: usize,
    best: &mut Vec<(f64, &'a Entry)>,
) {
    if entries.is_empty() {
        return;
    }
    let axis = depth % 3;
    let mid = entries.len() / 2;
    let node = &entries[mid];
    offer(best, k, chord_squared(&node.xyz, target), node);

    let diff = target[axis] - node.xyz[axis];
    let (near, far) = if diff < 0.0 {
        (&entries[..mid], &entries[mid + 1..])
    } else {
        (&entries[mid + 1..], &entries[..mid])
    };
    search(near, depth + 1, target, k, best);
    let worst = best.last().map_or(f64::INFINITY, |(d, _)| *d);
    if best.len() < k || diff * diff < worst {
        search(far, depth + 1, target, k, best);
    }
}

fn offer<'a>(best: &mut Vec<(f64, &'a Entry)>, k: usize, distance: f64, entry: &'a Entry) {
    let slot = best.partition_point(|(d, _)| *d <= distance);
    if slot >= k {
        return;
    }
    best.insert(slot, (distance, entry));
    best.truncate(k);
}

fn chord_squared(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}
