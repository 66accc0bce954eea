//! Spatial operations: fixed-grid request index.
//!
//! This module provides:
//!
//! - **GridBounds**: the service area rectangle
//! - **CellKey**: a grid cell, in multiples of the section radius
//! - **SpatialIndex**: cell → request buckets plus the flat request registry
//!
//! Every coordinate resolves to exactly one canonical cell through
//! [`SpatialIndex::cell_key_for`], which is used for insertion and lookup alike.
//! Buckets are append-only during a scenario: requests are flagged in place,
//! never removed, so bucket slots stay stable while the matching search scans.

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::ecs::{RequestId, RideRequest, Tick};
use crate::error::{DispatchError, DispatchResult};
use crate::geo::Coordinate;

/// Largest grid (in cells) a scenario may allocate.
pub const MAX_GRID_CELLS: u64 = 4_000_000;

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub long_min: f64,
    pub long_max: f64,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            lat_min: DEFAULT_MIN,
            lat_max: DEFAULT_MAX,
            long_min: DEFAULT_MIN,
            long_max: DEFAULT_MAX,
        }
    }
}

impl GridBounds {
    pub fn new(lat_min: f64, lat_max: f64, long_min: f64, long_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            long_min,
            long_max,
        }
    }

    pub fn min_corner(&self) -> Coordinate {
        Coordinate::new(self.lat_min, self.long_min)
    }

    pub fn max_corner(&self) -> Coordinate {
        Coordinate::new(self.lat_max, self.long_max)
    }

    pub fn contains(&self, location: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&location.lat)
            && (self.long_min..=self.long_max).contains(&location.long)
    }

    /// Bounds widened outward to multiples of `section_radius`.
    pub fn normalized(&self, section_radius: f64) -> GridBounds {
        let down = |v: f64| (v / section_radius).floor() * section_radius;
        let up = |v: f64| (v / section_radius).ceil() * section_radius;
        GridBounds::new(
            down(self.lat_min),
            up(self.lat_max),
            down(self.long_min),
            up(self.long_max),
        )
    }

    pub fn validate(&self) -> DispatchResult<()> {
        let values = [self.lat_min, self.lat_max, self.long_min, self.long_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DispatchError::configuration("bounds must be finite"));
        }
        if self.lat_min > self.lat_max || self.long_min > self.long_max {
            return Err(DispatchError::configuration(format!(
                "bounds are inverted: lat [{}, {}], long [{}, {}]",
                self.lat_min, self.lat_max, self.long_min, self.long_max
            )));
        }
        Ok(())
    }
}

/// Grid cell in units of the section radius: the cell origin is
/// `(lat * radius, long * radius)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub lat: i64,
    pub long: i64,
}

impl CellKey {
    pub const fn new(lat: i64, long: i64) -> Self {
        Self { lat, long }
    }
}

/// Snap one axis to its canonical multiple and clamp it into the grid.
fn snap_axis(value: f64, radius: f64, min: i64, max: i64) -> i64 {
    let remainder = value.rem_euclid(radius);
    let lower = ((value - remainder) / radius).round() as i64;
    let snapped = if remainder > radius / 2.0 {
        lower.saturating_add(1)
    } else {
        lower
    };
    snapped.clamp(min, max)
}

#[derive(Debug, Clone, Resource)]
pub struct SpatialIndex {
    section_radius: f64,
    /// Normalized bounds, in cell units.
    min: CellKey,
    max: CellKey,
    buckets: HashMap<CellKey, Vec<RequestId>>,
    requests: Vec<RideRequest>,
}

impl SpatialIndex {
    /// Normalize `bounds` outward to multiples of `section_radius` and allocate
    /// an empty bucket for every cell of the resulting grid.
    pub fn new(bounds: GridBounds, section_radius: f64) -> DispatchResult<Self> {
        if !section_radius.is_finite() || section_radius <= 0.0 {
            return Err(DispatchError::configuration(format!(
                "section radius must be > 0, got {section_radius}"
            )));
        }
        bounds.validate()?;

        let min = CellKey::new(
            (bounds.lat_min / section_radius).floor() as i64,
            (bounds.long_min / section_radius).floor() as i64,
        );
        let max = CellKey::new(
            (bounds.lat_max / section_radius).ceil() as i64,
            (bounds.long_max / section_radius).ceil() as i64,
        );

        // Cell keys saturate at the i64 range, so the spans need a wider type.
        let rows = i128::from(max.lat) - i128::from(min.lat) + 1;
        let cols = i128::from(max.long) - i128::from(min.long) + 1;
        let cells = rows.saturating_mul(cols);
        if cells > i128::from(MAX_GRID_CELLS) {
            return Err(DispatchError::configuration(format!(
                "grid of {rows}x{cols} cells exceeds the {MAX_GRID_CELLS} cell limit"
            )));
        }

        let mut buckets = HashMap::with_capacity(cells as usize);
        for lat in min.lat..=max.lat {
            for long in min.long..=max.long {
                buckets.insert(CellKey::new(lat, long), Vec::new());
            }
        }

        Ok(Self {
            section_radius,
            min,
            max,
            buckets,
            requests: Vec::new(),
        })
    }

    pub fn section_radius(&self) -> f64 {
        self.section_radius
    }

    /// Bounds after outward normalization.
    pub fn bounds(&self) -> GridBounds {
        let min = self.cell_origin(self.min);
        let max = self.cell_origin(self.max);
        GridBounds::new(min.lat, max.lat, min.long, max.long)
    }

    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn cell_origin(&self, key: CellKey) -> Coordinate {
        Coordinate::new(
            key.lat as f64 * self.section_radius,
            key.long as f64 * self.section_radius,
        )
    }

    /// Canonical cell for a coordinate: per axis, round to the nearer multiple
    /// of the section radius (ties round down), then clamp into the grid.
    pub fn cell_key_for(&self, location: Coordinate) -> CellKey {
        CellKey::new(
            snap_axis(location.lat, self.section_radius, self.min.lat, self.max.lat),
            snap_axis(location.long, self.section_radius, self.min.long, self.max.long),
        )
    }

    /// Register a request and append it to its cell. Returns the assigned id.
    pub fn insert(&mut self, mut request: RideRequest) -> RequestId {
        let id = RequestId(self.requests.len());
        request.set_id(id);
        let key = self.cell_key_for(request.location);
        self.buckets.entry(key).or_default().push(id);
        self.requests.push(request);
        id
    }

    pub fn bucket(&self, key: CellKey) -> &[RequestId] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn requests_at(&self, location: Coordinate) -> &[RequestId] {
        self.bucket(self.cell_key_for(location))
    }

    /// Requests in `location`'s cell whose request time equals `time`.
    pub fn count_matching(&self, location: Coordinate, time: Tick) -> usize {
        self.requests_at(location)
            .iter()
            .filter_map(|id| self.requests.get(id.0))
            .filter(|request| request.request_time == time)
            .count()
    }

    pub fn request(&self, id: RequestId) -> Option<&RideRequest> {
        self.requests.get(id.0)
    }

    pub fn request_mut(&mut self, id: RequestId) -> Option<&mut RideRequest> {
        self.requests.get_mut(id.0)
    }

    /// Flat registry of every request, in insertion order.
    pub fn requests(&self) -> &[RideRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
