use std::path::Path;

use tracing::info;

use crate::relocation::config::Config;
use crate::relocation::error::RelocationError;
use crate::relocation::facilities::Facilities;
use crate::relocation::population::Population;
use crate::relocation::random::create_rng;
use crate::relocation::relocator::{
    CategoryTarget, FacilityPools, RelocationStats, Relocator,
};
use crate::relocation::zones::aggregation::{activities_to_zones, ZoneCoordinatePool};
use crate::relocation::zones::mismatch::{report, MismatchReport};
use crate::relocation::zones::ZoneIndex;

/// What a run found and did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// one report per relocation category, in configured order
    pub mismatches: Vec<MismatchReport>,
    pub stats: RelocationStats,
}

/// Loads all inputs, reports zone mismatches, relocates the population and writes it out.
/// Any input or output failure aborts the run before anything is written.
pub fn run(config: &Config) -> Result<RunSummary, RelocationError> {
    let settings = config.relocation();
    let output = config.output();

    let zones = ZoneIndex::from_file(&config.zones(), &settings.zone_id_property)?;

    let facilities = Facilities::from_file(&config.facilities())?;
    info!("Loaded {} facilities", facilities.len());

    let population = Population::from_file(&config.population())?;
    info!("Loaded {} persons", population.persons.len());

    let targets = &settings.categories;
    let pools = FacilityPools::build(&facilities, &zones, targets);
    drop(facilities);

    let mismatches = report_mismatches(&population, &zones, &pools, targets);

    let mut rng = create_rng(settings.seed);
    let relocator = Relocator::new(&zones, &pools, targets)
        .with_stage_activity_marker(&settings.stage_activity_marker);
    let (population, stats) = relocator.relocate(population, &mut rng);
    stats.log();

    info!("Writing relocated population to {}", output.population);
    population.to_file(Path::new(&output.population))?;

    Ok(RunSummary { mismatches, stats })
}

/// Compares the facility pool of every target with the legacy activities of its category. The
/// legacy pools only live for the comparison.
pub fn report_mismatches(
    population: &Population,
    zones: &ZoneIndex,
    pools: &FacilityPools,
    targets: &[CategoryTarget],
) -> Vec<MismatchReport> {
    let empty = ZoneCoordinatePool::new();
    targets
        .iter()
        .map(|target| {
            let legacy = activities_to_zones(population, zones, &target.activity_type);
            let facilities = pools.get(&target.facility_type).unwrap_or(&empty);
            let mismatch = report(zones.zone_ids(), facilities, &legacy, &target.activity_type);
            mismatch.log();
            mismatch
        })
        .collect()
}
