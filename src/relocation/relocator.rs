use ahash::HashMap;
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::relocation::facilities::Facilities;
use crate::relocation::population::trip_structure_utils::{
    get_trips_with_marker, MainModeIdentifier, RoutingModeIdentifier,
};
use crate::relocation::population::{Activity, Leg, Person, Plan, Population};
use crate::relocation::zones::aggregation::{facilities_to_zones, ZoneCoordinatePool};
use crate::relocation::zones::ZoneIndex;

pub const DEFAULT_STAGE_ACTIVITY_MARKER: &str = "interaction";
const UNDEFINED_MODE: &str = "undefined";

/// Activities whose type contains `activity_type` are moved to facilities whose activity options
/// contain `facility_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTarget {
    pub activity_type: String,
    pub facility_type: String,
}

impl CategoryTarget {
    pub fn new(activity_type: &str, facility_type: &str) -> Self {
        CategoryTarget {
            activity_type: activity_type.to_string(),
            facility_type: facility_type.to_string(),
        }
    }

    pub fn matches(&self, act_type: &str) -> bool {
        act_type.contains(&self.activity_type)
    }
}

/// Shopping is checked before leisure. New shops are tagged "shop...", shopping activities
/// "shopping...".
pub fn default_targets() -> Vec<CategoryTarget> {
    vec![
        CategoryTarget::new("shopping", "shop"),
        CategoryTarget::new("leisure", "leisure"),
    ]
}

/// Facility coordinates per zone, one pool per distinct `facility_type` of the targets.
#[derive(Debug, Default, Clone)]
pub struct FacilityPools {
    pools: HashMap<String, ZoneCoordinatePool>,
}

impl FacilityPools {
    pub fn build(facilities: &Facilities, zones: &ZoneIndex, targets: &[CategoryTarget]) -> Self {
        let pools = targets
            .iter()
            .map(|target| target.facility_type.as_str())
            .unique()
            .map(|facility_type| {
                let pool = facilities_to_zones(facilities, zones, facility_type);
                (facility_type.to_string(), pool)
            })
            .collect();
        FacilityPools { pools }
    }

    pub fn get(&self, facility_type: &str) -> Option<&ZoneCoordinatePool> {
        self.pools.get(facility_type)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelocationStats {
    pub persons: usize,
    /// persons whose selected plan was kept, because they have none or it contains no trip
    pub unchanged_persons: usize,
    pub trips: usize,
    pub relocated: usize,
    /// matching destinations outside all zones
    pub no_zone: usize,
    /// matching destinations in a zone without candidate facilities
    pub empty_pool: usize,
    /// destinations matching no target
    pub unmatched: usize,
}

impl RelocationStats {
    pub fn log(&self) {
        info!(
            "Relocation finished for {} persons ({} unchanged) with {} trips: {} activities relocated, {} outside all zones, {} in zones without facilities, {} of other types",
            self.persons,
            self.unchanged_persons,
            self.trips,
            self.relocated,
            self.no_zone,
            self.empty_pool,
            self.unmatched
        );
    }
}

/// Rewrites the selected plan of each person, moving trip destinations of the target categories
/// to a random facility of the same zone.
pub struct Relocator<'a> {
    zones: &'a ZoneIndex,
    pools: &'a FacilityPools,
    targets: &'a [CategoryTarget],
    stage_activity_marker: String,
    mode_identifier: Box<dyn MainModeIdentifier + 'a>,
}

impl<'a> Relocator<'a> {
    pub fn new(zones: &'a ZoneIndex, pools: &'a FacilityPools, targets: &'a [CategoryTarget]) -> Self {
        Relocator {
            zones,
            pools,
            targets,
            stage_activity_marker: DEFAULT_STAGE_ACTIVITY_MARKER.to_string(),
            mode_identifier: Box::new(RoutingModeIdentifier),
        }
    }

    pub fn with_stage_activity_marker(mut self, marker: &str) -> Self {
        self.stage_activity_marker = marker.to_string();
        self
    }

    pub fn with_mode_identifier<M: MainModeIdentifier + 'a>(mut self, identifier: M) -> Self {
        self.mode_identifier = Box::new(identifier);
        self
    }

    /// Relocates the whole population. Persons keep their order; with the same rng seed the
    /// result is the same.
    pub fn relocate<R: Rng + ?Sized>(
        &self,
        mut population: Population,
        rng: &mut R,
    ) -> (Population, RelocationStats) {
        let mut stats = RelocationStats::default();
        for person in population.persons.iter_mut() {
            self.relocate_person(person, rng, &mut stats);
        }
        (population, stats)
    }

    pub fn relocate_person<R: Rng + ?Sized>(
        &self,
        person: &mut Person,
        rng: &mut R,
        stats: &mut RelocationStats,
    ) {
        stats.persons += 1;

        let Some(new_plan) = self.create_plan(person, rng, stats) else {
            stats.unchanged_persons += 1;
            return;
        };

        // the old selected plan is discarded
        if person.replace_selected_plan(new_plan).is_err() {
            warn!("Person {} lost its selected plan during relocation", person.id());
        }
    }

    fn create_plan<R: Rng + ?Sized>(
        &self,
        person: &Person,
        rng: &mut R,
        stats: &mut RelocationStats,
    ) -> Option<Plan> {
        let Some(plan) = person.selected_plan() else {
            warn!("Person {} has no selected plan. Skipping it.", person.id());
            return None;
        };

        let trips = get_trips_with_marker(&plan.elements, &self.stage_activity_marker);
        let first = trips.first()?;

        let mut new_plan = Plan::default();
        new_plan.add_act(first.origin.clone());

        for trip in &trips {
            let mode = self
                .mode_identifier
                .identify_main_mode(trip.legs)
                .unwrap_or_else(|| {
                    warn!(
                        "No main mode for a trip of person {}. Using '{UNDEFINED_MODE}'.",
                        person.id()
                    );
                    UNDEFINED_MODE.to_string()
                });
            new_plan.add_leg(Leg::new(&mode));

            let mut destination = trip.destination.clone();
            self.relocate_activity(&mut destination, rng, stats);
            new_plan.add_act(destination);
        }
        stats.trips += trips.len();

        Some(new_plan)
    }

    fn relocate_activity<R: Rng + ?Sized>(
        &self,
        activity: &mut Activity,
        rng: &mut R,
        stats: &mut RelocationStats,
    ) {
        let Some(target) = self.targets.iter().find(|t| t.matches(&activity.act_type)) else {
            stats.unmatched += 1;
            return;
        };

        // the zone of the original location decides where the activity may go
        let Some(zone) = self.zones.classify_opt(activity.coord) else {
            stats.no_zone += 1;
            return;
        };

        let candidates = self
            .pools
            .get(&target.facility_type)
            .and_then(|pool| pool.get(zone));

        match candidates {
            Some(coords) => {
                let coord = coords[rng.random_range(0..coords.len())];
                activity.relocate(coord);
                stats.relocated += 1;
            }
            None => stats.empty_pool += 1,
        }
    }
}
