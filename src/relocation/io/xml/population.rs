use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

use crate::relocation::error::{LoadError, WriteError};
use crate::relocation::io::xml;
use crate::relocation::io::xml::attributes::{IOAttribute, IOAttributes};
use crate::relocation::population::{
    Activity, Attribute, Attributes, Leg, Person, Plan, PlanElement, Population, Route,
};

const POPULATION_DTD: &str =
    "<!DOCTYPE population SYSTEM \"http://www.matsim.org/files/dtd/population_v6.dtd\">";

pub(crate) fn load_from_xml(source: &str) -> Result<Population, LoadError> {
    let io_pop = IOPopulation::from_file(source)?;
    Ok(Population::from(io_pop))
}

pub(crate) fn write_to_xml(population: &Population, path: &Path) -> Result<(), WriteError> {
    let io_pop = IOPopulation::from(population);
    io_pop.to_file(path)
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IORoute {
    #[serde(rename = "@type")]
    pub r#type: String,
    #[serde(rename = "@start_link")]
    pub start_link: String,
    #[serde(rename = "@end_link")]
    pub end_link: String,
    #[serde(rename = "@trav_time", skip_serializing_if = "Option::is_none")]
    pub trav_time: Option<String>,
    #[serde(rename = "@distance", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(
        rename = "@vehicleRefId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle: Option<String>,

    // link sequence for network routes, json description for pt routes
    #[serde(rename = "$value", skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IOActivity {
    #[serde(rename = "@type")]
    pub r#type: String,
    #[serde(rename = "@link", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "@facility", skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[serde(rename = "@x", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(rename = "@y", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(rename = "@start_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "@end_time", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "@max_dur", skip_serializing_if = "Option::is_none")]
    pub max_dur: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IOAttributes>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IOLeg {
    #[serde(rename = "@mode")]
    pub mode: String,
    #[serde(rename = "@dep_time", skip_serializing_if = "Option::is_none")]
    pub dep_time: Option<String>,
    #[serde(rename = "@trav_time", skip_serializing_if = "Option::is_none")]
    pub trav_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IOAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<IORoute>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IOPlanElement {
    Activity(IOActivity),
    Leg(IOLeg),
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IOPlan {
    #[serde(rename = "@score", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(
        rename = "@selected",
        deserialize_with = "bool_from_yes_no",
        serialize_with = "bool_to_yes_no"
    )]
    pub selected: bool,
    // must come before the elements, the plan's attributes are written first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IOAttributes>,
    // https://users.rust-lang.org/t/serde-deserializing-a-vector-of-enums/51647/2
    #[serde(rename = "$value", default)]
    pub elements: Vec<IOPlanElement>,
}

fn bool_from_yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.to_lowercase().as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(serde::de::Error::custom(format!("invalid value: {}", s))),
    }
}

fn bool_to_yes_no<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let s = if *value { "yes" } else { "no" };
    serializer.serialize_str(s)
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IOPerson {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IOAttributes>,
    #[serde(rename = "plan", default)]
    pub plans: Vec<IOPlan>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename = "population")]
pub struct IOPopulation {
    #[serde(rename = "attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IOAttributes>,
    #[serde(rename = "person", default)]
    pub persons: Vec<IOPerson>,
}

impl IOPopulation {
    pub fn from_file(file_path: &str) -> Result<IOPopulation, LoadError> {
        let population: IOPopulation = xml::read_from_file(file_path)?;
        info!(
            "IOPopulation: Finished reading population. Population contains {} persons",
            population.persons.len()
        );
        Ok(population)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), WriteError> {
        xml::write_to_file(self, path, POPULATION_DTD)
    }
}

impl From<IOAttributes> for Attributes {
    fn from(io: IOAttributes) -> Self {
        Attributes::new(
            io.attributes
                .into_iter()
                .map(|a| Attribute {
                    name: a.name,
                    class: a.class,
                    value: a.value,
                })
                .collect(),
        )
    }
}

fn attributes_from_io(io: Option<IOAttributes>) -> Attributes {
    io.map(Attributes::from).unwrap_or_default()
}

fn attributes_to_io(attributes: &Attributes) -> Option<IOAttributes> {
    if attributes.is_empty() {
        return None;
    }
    Some(IOAttributes {
        attributes: attributes
            .iter()
            .map(|a| IOAttribute::new(&a.name, &a.class, &a.value))
            .collect(),
    })
}

impl From<IOPopulation> for Population {
    fn from(io: IOPopulation) -> Self {
        Population {
            attributes: attributes_from_io(io.attributes),
            persons: io.persons.into_iter().map(Person::from).collect(),
        }
    }
}

impl From<IOPerson> for Person {
    fn from(io: IOPerson) -> Self {
        Person::with_plans(
            io.id,
            io.plans.into_iter().map(Plan::from).collect(),
            attributes_from_io(io.attributes),
        )
    }
}

impl From<IOPlan> for Plan {
    fn from(io: IOPlan) -> Self {
        Plan {
            selected: io.selected,
            score: io.score,
            plan_type: io.r#type,
            attributes: attributes_from_io(io.attributes),
            elements: io
                .elements
                .into_iter()
                .map(|element| match element {
                    IOPlanElement::Activity(a) => PlanElement::Activity(Activity::from(a)),
                    IOPlanElement::Leg(l) => PlanElement::Leg(Leg::from(l)),
                })
                .collect(),
        }
    }
}

impl From<IOActivity> for Activity {
    fn from(io: IOActivity) -> Self {
        let coord = match (io.x, io.y) {
            (Some(x), Some(y)) => Some(geo::coord! { x: x, y: y }),
            _ => None,
        };
        Activity {
            act_type: io.r#type,
            coord,
            link_id: io.link,
            facility_id: io.facility,
            start_time: io.start_time,
            end_time: io.end_time,
            max_dur: io.max_dur,
            attributes: attributes_from_io(io.attributes),
        }
    }
}

impl From<IOLeg> for Leg {
    fn from(io: IOLeg) -> Self {
        Leg {
            mode: io.mode,
            dep_time: io.dep_time,
            trav_time: io.trav_time,
            route: io.route.map(|r| Route {
                route_type: r.r#type,
                start_link: r.start_link,
                end_link: r.end_link,
                trav_time: r.trav_time,
                distance: r.distance,
                vehicle: r.vehicle,
                description: r.route,
            }),
            attributes: attributes_from_io(io.attributes),
        }
    }
}

impl From<&Population> for IOPopulation {
    fn from(population: &Population) -> Self {
        IOPopulation {
            attributes: attributes_to_io(&population.attributes),
            persons: population.persons.iter().map(IOPerson::from).collect(),
        }
    }
}

impl From<&Person> for IOPerson {
    fn from(person: &Person) -> Self {
        IOPerson {
            id: person.id().to_string(),
            attributes: attributes_to_io(person.attributes()),
            plans: person.plans().iter().map(IOPlan::from).collect(),
        }
    }
}

impl From<&Plan> for IOPlan {
    fn from(plan: &Plan) -> Self {
        IOPlan {
            score: plan.score,
            r#type: plan.plan_type.clone(),
            selected: plan.selected,
            attributes: attributes_to_io(&plan.attributes),
            elements: plan
                .elements
                .iter()
                .map(|element| match element {
                    PlanElement::Activity(a) => IOPlanElement::Activity(IOActivity::from(a)),
                    PlanElement::Leg(l) => IOPlanElement::Leg(IOLeg::from(l)),
                })
                .collect(),
        }
    }
}

impl From<&Activity> for IOActivity {
    fn from(act: &Activity) -> Self {
        IOActivity {
            r#type: act.act_type.clone(),
            link: act.link_id.clone(),
            facility: act.facility_id.clone(),
            x: act.coord.map(|c| c.x),
            y: act.coord.map(|c| c.y),
            start_time: act.start_time.clone(),
            end_time: act.end_time.clone(),
            max_dur: act.max_dur.clone(),
            attributes: attributes_to_io(&act.attributes),
        }
    }
}

impl From<&Leg> for IOLeg {
    fn from(leg: &Leg) -> Self {
        IOLeg {
            mode: leg.mode.clone(),
            dep_time: leg.dep_time.clone(),
            trav_time: leg.trav_time.clone(),
            attributes: attributes_to_io(&leg.attributes),
            route: leg.route.as_ref().map(|r| IORoute {
                r#type: r.route_type.clone(),
                start_link: r.start_link.clone(),
                end_link: r.end_link.clone(),
                trav_time: r.trav_time.clone(),
                distance: r.distance,
                vehicle: r.vehicle.clone(),
                route: r.description.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use quick_xml::de::from_str;

    use crate::relocation::io::xml::population::{IOLeg, IOPlanElement, IOPopulation};
    use crate::relocation::population::{PlanElement, Population};

    /**
    This tests against the first person from the equil scenario plus a second, unselected plan.
     */
    #[test]
    fn read_population_from_string() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<!DOCTYPE population SYSTEM \"http://www.matsim.org/files/dtd/population_v6.dtd\">

    <population>
        <attributes>
            <attribute name=\"coordinateReferenceSystem\" class=\"java.lang.String\">Atlantis</attribute>
        </attributes>

        <person id=\"1\">
            <attributes>
                <attribute name=\"vehicles\" class=\"org.matsim.vehicles.PersonVehicles\">{\"car\":\"1\"}</attribute>
            </attributes>
            <plan selected=\"yes\">
                <activity type=\"h\" link=\"1\" x=\"-25000.0\" y=\"0.0\" end_time=\"06:00:00\" >
                </activity>
                <leg mode=\"car\">
                    <attributes>
                        <attribute name=\"routingMode\" class=\"java.lang.String\">car</attribute>
                    </attributes>
                    <route type=\"links\" start_link=\"1\" end_link=\"20\" trav_time=\"undefined\" distance=\"25000.0\" vehicleRefId=\"null\">1 6 15 20</route>
                </leg>
                <activity type=\"shopping\" link=\"20\" x=\"10000.0\" y=\"0.0\" max_dur=\"03:30:00\" >
                </activity>
                <leg mode=\"car\">
                    <attributes>
                        <attribute name=\"routingMode\" class=\"java.lang.String\">car</attribute>
                    </attributes>
                    <route type=\"links\" start_link=\"20\" end_link=\"1\" trav_time=\"undefined\" distance=\"65000.0\" vehicleRefId=\"null\">20 21 22 23 1</route>
                </leg>
                <activity type=\"h\" link=\"1\" x=\"-25000.0\" y=\"0.0\" >
                </activity>
            </plan>
            <plan score=\"12.5\" selected=\"no\">
                <activity type=\"h\" link=\"1\" x=\"-25000.0\" y=\"0.0\" />
            </plan>
        </person>

    </population>";

        let io_population: IOPopulation = from_str(xml).unwrap();

        //test overall structure of population
        assert_eq!(1, io_population.persons.len());
        let person = io_population.persons.first().unwrap();
        assert_eq!("1", person.id);
        assert_eq!(2, person.plans.len());

        let plan = person.plans.first().unwrap();
        assert!(plan.selected);
        assert_eq!(None, plan.score);
        assert_eq!(5, plan.elements.len());
        assert!(!person.plans[1].selected);
        assert_eq!(Some(12.5), person.plans[1].score);

        match plan.elements.get(1).unwrap() {
            IOPlanElement::Activity { .. } => {
                panic!("Plan Element at index 1 was expected to be a leg, but was Activity")
            }
            IOPlanElement::Leg(leg) => {
                assert_eq!("car", leg.mode);
                let route = leg.route.as_ref().unwrap();
                assert_eq!("links", route.r#type);
                assert_eq!("1", route.start_link);
                assert_eq!("20", route.end_link);
                assert_eq!(Some(25000.0), route.distance);
                assert_eq!("1 6 15 20", route.route.as_ref().unwrap())
            }
        }

        // conversion into the domain model keeps everything the relocation relies on
        let population = Population::from(io_population);
        assert_eq!(
            Some("Atlantis"),
            population.attributes.get("coordinateReferenceSystem")
        );
        let person = &population.persons[0];
        let selected = person.selected_plan().unwrap();
        let PlanElement::Activity(shopping) = &selected.elements[2] else {
            panic!("expected an activity at index 2");
        };
        assert_eq!("shopping", shopping.act_type);
        assert_eq!(Some(geo::coord! { x: 10000.0, y: 0.0 }), shopping.coord);
        assert_eq!(Some("20".to_string()), shopping.link_id);
        assert_eq!(Some("03:30:00".to_string()), shopping.max_dur);
        let PlanElement::Leg(leg) = &selected.elements[1] else {
            panic!("expected a leg at index 1");
        };
        assert_eq!(Some("car"), leg.routing_mode());
    }

    #[test]
    fn test_read_leg_with_pt() {
        let xml = "<leg mode=\"pt\" trav_time=\"00:10:01\">
				<attributes>
					<attribute name=\"routingMode\" class=\"java.lang.String\">pt</attribute>
				</attributes>
				<route type=\"default_pt\" start_link=\"33\" end_link=\"11\" trav_time=\"00:10:01\" distance=\"NaN\">{\"transitRouteId\":\"3to1\",\"boardingTime\":\"undefined\",\"transitLineId\":\"Blue Line\",\"accessFacilityId\":\"3\",\"egressFacilityId\":\"1\"}</route>
			</leg>";
        let leg = from_str::<IOLeg>(xml).unwrap();
        assert_eq!(leg.mode, "pt");
        assert_eq!(leg.dep_time, None);
        assert_eq!(leg.trav_time, Some(String::from("00:10:01")));
        let route = leg.route.as_ref().unwrap();
        assert_eq!(route.r#type, "default_pt");
        assert!(route.distance.unwrap().is_nan());
        assert_eq!(route.vehicle, None);
    }

    #[test]
    fn activity_without_coordinate() {
        let xml = "<population>
            <person id=\"p\">
                <plan selected=\"yes\">
                    <activity type=\"home\" facility=\"f1\" end_time=\"08:00:00\"/>
                </plan>
            </person>
        </population>";
        let population = Population::from(from_str::<IOPopulation>(xml).unwrap());
        let act = population.persons[0].selected_plan().unwrap().acts()[0];
        assert_eq!(None, act.coord);
        assert_eq!(None, act.link_id);
        assert_eq!(Some("f1".to_string()), act.facility_id);
    }

    #[test]
    fn plan_type_and_attributes_survive_writing() {
        let xml = "<population>
            <person id=\"p\">
                <plan selected=\"yes\">
                    <activity type=\"home\" x=\"0.0\" y=\"0.0\"/>
                </plan>
                <plan score=\"-1.5\" selected=\"no\" type=\"car-free\">
                    <attributes>
                        <attribute name=\"origin\" class=\"java.lang.String\">innovation</attribute>
                    </attributes>
                    <activity type=\"home\" x=\"0.0\" y=\"0.0\" end_time=\"08:00:00\"/>
                    <leg mode=\"bike\"/>
                    <activity type=\"work\" x=\"10.0\" y=\"0.0\"/>
                </plan>
            </person>
        </population>";
        let population = Population::from(from_str::<IOPopulation>(xml).unwrap());
        let plan = &population.persons[0].plans()[1];
        assert_eq!(Some("car-free".to_string()), plan.plan_type);
        assert_eq!(Some("innovation"), plan.attributes.get("origin"));
        assert_eq!(3, plan.elements.len());

        let dir = tempfile::tempdir().unwrap();
        for file in ["plans.xml", "plans.xml.gz"] {
            let path = dir.path().join("out").join(file);
            population.to_file(&path).unwrap();

            if file.ends_with(".xml") {
                let written = std::fs::read_to_string(&path).unwrap();
                assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
                assert!(written.contains("population_v6.dtd"));
                assert!(written.contains("type=\"car-free\""));
            }
            let read_back = Population::from_file(&path.to_string_lossy()).unwrap();
            assert_eq!(population, read_back);
        }
    }
}
