use crate::relocation::population::{Activity, PlanElement};
use tracing::error;

/// Modes which only feed another mode, e.g. walking to the car or to the stop.
const ACCESS_EGRESS_MODES: [&str; 3] = ["walk", "non_network_walk", "transit_walk"];

/// Derives the mode of a whole trip from its legs.
pub trait MainModeIdentifier {
    fn identify_main_mode(&self, trip_elements: &[PlanElement]) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingModeIdentifier;

impl MainModeIdentifier for RoutingModeIdentifier {
    fn identify_main_mode(&self, trip_elements: &[PlanElement]) -> Option<String> {
        identify_main_mode(trip_elements)
    }
}

pub fn identify_main_mode(trip_elements: &[PlanElement]) -> Option<String> {
    let legs: Vec<_> = trip_elements.iter().filter_map(|el| el.as_leg()).collect();

    // Try to get the routing mode from the first leg
    let mut mode = legs
        .first()
        .and_then(|leg| leg.routing_mode())
        .map(String::from);

    // If not found and only one leg, use the mode of that leg
    if mode.is_none() && legs.len() == 1 {
        mode = legs.first().map(|leg| leg.mode.clone());
    }

    // Otherwise the first leg that is not just access or egress
    if mode.is_none() {
        mode = legs
            .iter()
            .find(|leg| !ACCESS_EGRESS_MODES.contains(&leg.mode.as_str()))
            .or(legs.first())
            .map(|leg| leg.mode.clone());
    }

    if mode.is_none() {
        error!("Could not find routing mode for trip {:?}", trip_elements);
    }

    mode
}

/// A trip is a sequence of plan elements between two non-stage activities.
#[derive(Debug, PartialEq)]
pub struct Trip<'a> {
    pub origin: &'a Activity,
    pub legs: &'a [PlanElement],
    pub destination: &'a Activity,
}

/// Extracts trips from a plan, using is_stage_activity to identify stage activities.
pub fn get_trips<F>(plan_elements: &[PlanElement], mut is_stage_activity: F) -> Vec<Trip<'_>>
where
    F: FnMut(&Activity) -> bool,
{
    let mut trips = Vec::new();
    let mut origin: Option<(usize, &Activity)> = None;

    for (index, pe) in plan_elements.iter().enumerate() {
        let act = match pe.as_activity() {
            Some(a) => a,
            None => continue,
        };
        if is_stage_activity(act) {
            continue;
        }

        // It could be the case that two main activities follow each other directly. They don't
        // form a trip, the second one simply becomes the new origin.
        if let Some((origin_index, origin_act)) = origin {
            if index - origin_index > 1 {
                trips.push(Trip {
                    origin: origin_act,
                    legs: &plan_elements[origin_index + 1..index],
                    destination: act,
                });
            }
        }
        origin = Some((index, act));
    }
    trips
}

/// Extracts trips from a plan, treating activities whose type contains `marker` as stage
/// activities (e.g. "car interaction").
pub fn get_trips_with_marker<'a>(plan_elements: &'a [PlanElement], marker: &str) -> Vec<Trip<'a>> {
    get_trips(plan_elements, |a| a.is_stage_activity(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relocation::population::{Leg, ROUTING_MODE};

    fn make_activity(act_type: &str, link: &str) -> PlanElement {
        PlanElement::Activity(Activity::new(act_type, 0.0, 0.0, Some(link)))
    }

    fn make_leg(mode: &str) -> PlanElement {
        let mut leg = Leg::new(mode);
        leg.attributes.insert(ROUTING_MODE, "java.lang.String", mode);
        PlanElement::Leg(leg)
    }

    fn make_leg_without_routing_mode(mode: &str) -> PlanElement {
        PlanElement::Leg(Leg::new(mode))
    }

    #[test]
    fn test_identify_main_mode_routing_mode() {
        let trip = vec![make_leg("car")];
        assert_eq!(identify_main_mode(&trip), Some("car".to_string()));
    }

    #[test]
    fn test_identify_main_mode_single_leg_mode() {
        let trip = vec![make_leg_without_routing_mode("bike")];
        assert_eq!(identify_main_mode(&trip), Some("bike".to_string()));
    }

    #[test]
    fn test_identify_main_mode_skips_access_walk() {
        let trip = vec![
            make_leg_without_routing_mode("walk"),
            make_activity("pt interaction", "2"),
            make_leg_without_routing_mode("pt"),
            make_activity("pt interaction", "3"),
            make_leg_without_routing_mode("walk"),
        ];
        assert_eq!(identify_main_mode(&trip), Some("pt".to_string()));
    }

    #[test]
    fn test_identify_main_mode_walk_only() {
        let trip = vec![
            make_leg_without_routing_mode("walk"),
            make_activity("walk interaction", "2"),
            make_leg_without_routing_mode("walk"),
        ];
        assert_eq!(
            RoutingModeIdentifier.identify_main_mode(&trip),
            Some("walk".to_string())
        );
    }

    #[test]
    fn test_identify_main_mode_no_mode() {
        let trip: Vec<PlanElement> = vec![];
        assert_eq!(identify_main_mode(&trip), None);
    }

    #[test]
    fn test_get_trips_basic() {
        // home --leg1--> work --leg2--> shop
        let plan = vec![
            make_activity("home", "1"),
            make_leg("car"),
            make_activity("work", "2"),
            make_leg("walk"),
            make_activity("shop", "3"),
        ];
        let trips = get_trips_with_marker(&plan, "interaction");
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].origin.act_type, "home");
        assert_eq!(trips[0].destination.act_type, "work");
        assert_eq!(trips[0].legs.len(), 1);
        assert_eq!(trips[1].origin.act_type, "work");
        assert_eq!(trips[1].destination.act_type, "shop");
        assert_eq!(trips[1].legs.len(), 1);
    }

    #[test]
    fn test_get_trips_with_stage_activity() {
        // home --leg1--> car interaction (stage) --leg2--> work
        let plan = vec![
            make_activity("home", "1"),
            make_leg("car"),
            make_activity("car interaction", "2"),
            make_leg("car"),
            make_activity("work", "3"),
        ];
        let trips = get_trips_with_marker(&plan, "interaction");
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].origin.act_type, "home");
        assert_eq!(trips[0].destination.act_type, "work");
        assert_eq!(trips[0].legs.len(), 3); // both legs and the stage activity are included
    }

    #[test]
    fn test_get_trips_custom_marker() {
        let plan = vec![
            make_activity("home", "1"),
            make_leg("car"),
            make_activity("car stage", "2"),
            make_leg("car"),
            make_activity("work", "3"),
        ];
        assert_eq!(get_trips_with_marker(&plan, "interaction").len(), 2);
        assert_eq!(get_trips_with_marker(&plan, "stage").len(), 1);
    }

    #[test]
    fn test_get_trips_no_trips() {
        // Only activities, no legs
        let plan = vec![make_activity("home", "1"), make_activity("work", "2")];
        assert!(get_trips_with_marker(&plan, "interaction").is_empty());
    }

    #[test]
    fn test_get_trips_empty() {
        let plan: Vec<PlanElement> = vec![];
        assert!(get_trips_with_marker(&plan, "interaction").is_empty());
    }
}
