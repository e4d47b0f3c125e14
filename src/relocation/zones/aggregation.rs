use ahash::HashMap;
use geo::Coord;
use tracing::{info, warn};

use crate::relocation::facilities::Facilities;
use crate::relocation::population::Population;
use crate::relocation::zones::ZoneIndex;

/// Candidate coordinates of one activity category, grouped by zone. Coordinates are kept in the
/// order they were added. Coordinates outside every zone are tallied separately, as are
/// entries without any coordinate.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ZoneCoordinatePool {
    zones: HashMap<String, Vec<Coord>>,
    no_zone: Vec<Coord>,
    no_coord: usize,
}

impl ZoneCoordinatePool {
    pub fn new() -> Self {
        ZoneCoordinatePool::default()
    }

    pub fn add(&mut self, zone: Option<&str>, coord: Coord) {
        match zone {
            Some(id) => self.zones.entry(id.to_string()).or_default().push(coord),
            None => self.no_zone.push(coord),
        }
    }

    /// Candidates in `zone`, or `None` if nothing was collected for it.
    pub fn get(&self, zone: &str) -> Option<&[Coord]> {
        self.zones
            .get(zone)
            .map(|coords| coords.as_slice())
            .filter(|coords| !coords.is_empty())
    }

    pub fn count(&self, zone: &str) -> usize {
        self.get(zone).map_or(0, |coords| coords.len())
    }

    pub fn contains_zone(&self, zone: &str) -> bool {
        self.count(zone) > 0
    }

    pub fn add_without_coord(&mut self) {
        self.no_coord += 1;
    }

    pub fn no_zone(&self) -> &[Coord] {
        &self.no_zone
    }

    /// Entries which could not be classified because they have no coordinate.
    pub fn no_coord(&self) -> usize {
        self.no_coord
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Number of coordinates assigned to a zone.
    pub fn total(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }
}

/// Collects the coordinates of all facilities offering `facility_type` into their zones.
/// Facilities outside every zone are reported and skipped.
pub fn facilities_to_zones(
    facilities: &Facilities,
    zones: &ZoneIndex,
    facility_type: &str,
) -> ZoneCoordinatePool {
    let mut pool = ZoneCoordinatePool::new();
    let mut skipped = 0;

    for facility in facilities.iter().filter(|f| f.offers(facility_type)) {
        match zones.classify(facility.coord) {
            Some(zone) => pool.add(Some(zone), facility.coord),
            None => {
                warn!(
                    "no zone found for facility {} (Coord {:?})",
                    facility.id, facility.coord
                );
                skipped += 1;
            }
        }
    }

    info!(
        "Assigned {} '{facility_type}' facilities to {} zones, {skipped} facilities outside all zones",
        pool.total(),
        pool.zone_count()
    );
    pool
}

/// Collects the coordinates of all activities whose type contains `activity_type`, from every
/// plan of every person. Activities outside every zone end up in the pool's no-zone tally,
/// activities without a coordinate in its no-coordinate count.
pub fn activities_to_zones(
    population: &Population,
    zones: &ZoneIndex,
    activity_type: &str,
) -> ZoneCoordinatePool {
    let mut pool = ZoneCoordinatePool::new();

    population
        .persons
        .iter()
        .flat_map(|person| person.plans().iter())
        .flat_map(|plan| plan.acts())
        .filter(|act| act.act_type.contains(activity_type))
        .for_each(|act| match act.coord {
            Some(coord) => pool.add(zones.classify(coord), coord),
            None => pool.add_without_coord(),
        });

    info!(
        "Assigned {} '{activity_type}' activities to {} zones, {} activities outside all zones, {} without coordinate",
        pool.total(),
        pool.zone_count(),
        pool.no_zone().len(),
        pool.no_coord()
    );
    pool
}
