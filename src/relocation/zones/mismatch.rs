use tracing::warn;

use crate::relocation::zones::aggregation::ZoneCoordinatePool;

/// Coverage of a single zone by new facilities and legacy activities of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCoverage {
    Both,
    LegacyOnly,
    FacilityOnly,
    Neither,
}

impl ZoneCoverage {
    pub fn of(zone: &str, facilities: &ZoneCoordinatePool, legacy: &ZoneCoordinatePool) -> Self {
        match (legacy.contains_zone(zone), facilities.contains_zone(zone)) {
            (true, true) => ZoneCoverage::Both,
            (true, false) => ZoneCoverage::LegacyOnly,
            (false, true) => ZoneCoverage::FacilityOnly,
            (false, false) => ZoneCoverage::Neither,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCount {
    pub zone: String,
    pub count: usize,
}

/// Zones of one category whose legacy activities and new facilities don't line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchReport {
    pub category: String,
    pub both: usize,
    pub neither: usize,
    /// legacy activity count per zone without any new facility
    pub legacy_only: Vec<ZoneCount>,
    /// new facility count per zone without any legacy activity
    pub facility_only: Vec<ZoneCount>,
}

impl MismatchReport {
    pub fn mismatch_count(&self) -> usize {
        self.legacy_only.len() + self.facility_only.len()
    }

    /// The report as log lines: the total first, then one section per mismatch kind. Zones with
    /// both legacy activities and new facilities are fine and produce no message.
    pub fn messages(&self) -> Vec<String> {
        let category = &self.category;
        let mut messages = vec![format!(
            "Total mismatch: {} {category}",
            self.mismatch_count()
        )];

        if !self.legacy_only.is_empty() {
            messages.push(format!(
                "Found old {category} activities from the agents but there are no facilities tagged"
            ));
            messages.extend(self.legacy_only.iter().map(|zc| {
                format!(
                    "{} old {category} activities and 0 new facilities found: {}",
                    zc.count, zc.zone
                )
            }));
        }

        if !self.facility_only.is_empty() {
            messages.push(format!(
                "Found facilities but no old {category} activities from the agents"
            ));
            messages.extend(self.facility_only.iter().map(|zc| {
                format!(
                    "0 old {category} activities and {} new facilities found: {}",
                    zc.count, zc.zone
                )
            }));
        }

        messages
    }

    pub fn log(&self) {
        for message in self.messages() {
            warn!("{message}");
        }
    }
}

/// Compares new facilities with legacy activities of `category` for every zone in `zone_ids`.
pub fn report<'a, I>(
    zone_ids: I,
    facilities: &ZoneCoordinatePool,
    legacy: &ZoneCoordinatePool,
    category: &str,
) -> MismatchReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = MismatchReport {
        category: category.to_string(),
        both: 0,
        neither: 0,
        legacy_only: Vec::new(),
        facility_only: Vec::new(),
    };

    for zone in zone_ids {
        match ZoneCoverage::of(zone, facilities, legacy) {
            ZoneCoverage::Both => report.both += 1,
            ZoneCoverage::Neither => report.neither += 1,
            ZoneCoverage::LegacyOnly => report.legacy_only.push(ZoneCount {
                zone: zone.to_string(),
                count: legacy.count(zone),
            }),
            ZoneCoverage::FacilityOnly => report.facility_only.push(ZoneCount {
                zone: zone.to_string(),
                count: facilities.count(zone),
            }),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use crate::relocation::zones::aggregation::ZoneCoordinatePool;
    use crate::relocation::zones::mismatch::{report, ZoneCount, ZoneCoverage};

    fn pool(entries: &[(&str, usize)]) -> ZoneCoordinatePool {
        let mut pool = ZoneCoordinatePool::new();
        for (zone, n) in entries {
            for i in 0..*n {
                pool.add(Some(*zone), coord! { x: i as f64, y: 0. });
            }
        }
        pool
    }

    #[test]
    fn legacy_only_zone() {
        // zone B has legacy leisure activities but no leisure facilities
        let facilities = pool(&[("A", 2)]);
        let legacy = pool(&[("A", 1), ("B", 3)]);

        let result = report(["A", "B"], &facilities, &legacy, "leisure");

        assert_eq!(1, result.both);
        assert_eq!(
            vec![ZoneCount {
                zone: "B".to_string(),
                count: 3
            }],
            result.legacy_only
        );
        assert!(result.facility_only.is_empty());
        assert_eq!(1, result.mismatch_count());
        assert_eq!(
            vec![
                "Total mismatch: 1 leisure".to_string(),
                "Found old leisure activities from the agents but there are no facilities tagged"
                    .to_string(),
                "3 old leisure activities and 0 new facilities found: B".to_string(),
            ],
            result.messages()
        );
    }

    #[test]
    fn facility_only_zone() {
        let facilities = pool(&[("A", 2)]);
        let legacy = pool(&[]);

        let result = report(["A"], &facilities, &legacy, "shopping");

        assert!(result.legacy_only.is_empty());
        assert_eq!(2, result.facility_only[0].count);
        assert_eq!(
            "0 old shopping activities and 2 new facilities found: A",
            result.messages()[2]
        );
    }

    #[test]
    fn summary_is_always_emitted() {
        let facilities = pool(&[("A", 1)]);
        let legacy = pool(&[("A", 1)]);

        let result = report(["A", "C"], &facilities, &legacy, "leisure");

        assert_eq!(0, result.mismatch_count());
        assert_eq!(1, result.both);
        assert_eq!(1, result.neither);
        assert_eq!(vec!["Total mismatch: 0 leisure".to_string()], result.messages());
    }

    #[test]
    fn every_zone_is_in_exactly_one_class() {
        let facilities = pool(&[("both", 1), ("fac", 4)]);
        let legacy = pool(&[("both", 2), ("leg", 5)]);
        let zones = ["both", "fac", "leg", "none"];

        let result = report(zones, &facilities, &legacy, "x");

        assert_eq!(
            zones.len(),
            result.both + result.neither + result.legacy_only.len() + result.facility_only.len()
        );
        assert_eq!(
            ZoneCoverage::FacilityOnly,
            ZoneCoverage::of("fac", &facilities, &legacy)
        );
        assert_eq!(
            ZoneCoverage::Neither,
            ZoneCoverage::of("none", &facilities, &legacy)
        );
        assert_eq!(2, result.mismatch_count());
    }

    #[test]
    fn zones_outside_the_index_are_ignored() {
        // the legacy pool knows a zone the index doesn't; only known zones are compared
        let facilities = pool(&[]);
        let mut legacy = pool(&[("unknown", 1)]);
        legacy.add(None, coord! { x: 0., y: 0. });

        let result = report(["A"], &facilities, &legacy, "leisure");
        assert_eq!(0, result.mismatch_count());
        assert_eq!(1, result.neither);
    }
}
