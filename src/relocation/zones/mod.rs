use ahash::HashSet;
use geo::{BoundingRect, Contains, Coord, Intersects, MultiPolygon, Point, Rect};
use tracing::info;

use crate::relocation::error::LoadError;
use crate::relocation::io::zones::load_zones;

pub mod aggregation;
pub mod mismatch;

/// A named polygonal region. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    id: String,
    geometry: MultiPolygon,
    bbox: Option<Rect>,
}

impl Zone {
    pub fn new(id: String, geometry: MultiPolygon) -> Self {
        let bbox = geometry.bounding_rect();
        Zone { id, geometry, bbox }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn geometry(&self) -> &MultiPolygon {
        &self.geometry
    }

    pub fn contains(&self, coord: Coord) -> bool {
        let point = Point::from(coord);
        match &self.bbox {
            Some(bbox) if bbox.intersects(&point) => self.geometry.contains(&point),
            _ => false,
        }
    }
}

/// Answers point-in-zone queries against a fixed list of zones.
///
/// Zones are tested in the order they were given (file order when loaded from disk) and the
/// first zone containing a point wins, so overlapping zones classify deterministically.
/// A bounding box check guards the polygon test.
#[derive(Debug, Default, Clone)]
pub struct ZoneIndex {
    zones: Vec<Zone>,
}

impl ZoneIndex {
    pub fn build(zones: Vec<Zone>) -> Result<Self, LoadError> {
        let mut seen = HashSet::default();
        for zone in &zones {
            if !seen.insert(zone.id.as_str()) {
                return Err(LoadError::DuplicateZoneId(zone.id.clone()));
            }
        }
        Ok(ZoneIndex { zones })
    }

    pub fn from_file(source: &str, id_property: &str) -> Result<Self, LoadError> {
        let index = ZoneIndex::build(load_zones(source, id_property)?)?;
        info!("Built zone index with {} zones", index.len());
        Ok(index)
    }

    /// Id of the first zone containing `coord`, or `None` if the coordinate lies outside all
    /// zones.
    pub fn classify(&self, coord: Coord) -> Option<&str> {
        self.zones
            .iter()
            .find(|zone| zone.contains(coord))
            .map(|zone| zone.id())
    }

    /// Like `classify`, for activities which may lack a coordinate. Those are never in a zone.
    pub fn classify_opt(&self, coord: Option<Coord>) -> Option<&str> {
        coord.and_then(|c| self.classify(c))
    }

    pub fn zone_ids(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|z| z.id())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
