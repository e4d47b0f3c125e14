use std::path::Path;

use geo::Coord;

use crate::relocation::error::{LoadError, WriteError};
use crate::relocation::io::xml::population::{load_from_xml, write_to_xml};

pub mod trip_structure_utils;

pub const ROUTING_MODE: &str = "routingMode";

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Population {
    pub attributes: Attributes,
    /// Persons in the order they were read. Writing keeps this order.
    pub persons: Vec<Person>,
}

impl Population {
    pub fn new() -> Self {
        Population::default()
    }

    pub fn from_file(source: &str) -> Result<Self, LoadError> {
        load_from_xml(source)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), WriteError> {
        write_to_xml(self, path)
    }

    pub fn add_person(&mut self, person: Person) {
        self.persons.push(person);
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Attribute {
    pub name: String,
    pub class: String,
    pub value: String,
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    pub fn new(entries: Vec<Attribute>) -> Self {
        Attributes { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn insert(&mut self, name: &str, class: &str, value: &str) {
        self.entries.retain(|a| a.name != name);
        self.entries.push(Attribute {
            name: name.to_string(),
            class: class.to_string(),
            value: value.to_string(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Activity {
    pub act_type: String,
    pub coord: Option<Coord>,
    pub link_id: Option<String>,
    pub facility_id: Option<String>,
    // times are kept as read, so that activities which are not touched are written back unchanged
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_dur: Option<String>,
    pub attributes: Attributes,
}

impl Activity {
    pub fn new(act_type: &str, x: f64, y: f64, link_id: Option<&str>) -> Self {
        Activity {
            act_type: act_type.to_string(),
            coord: Some(geo::coord! { x: x, y: y }),
            link_id: link_id.map(String::from),
            facility_id: None,
            start_time: None,
            end_time: None,
            max_dur: None,
            attributes: Attributes::default(),
        }
    }

    pub fn is_stage_activity(&self, marker: &str) -> bool {
        self.act_type.contains(marker)
    }

    /// Moves the activity to `coord`. The link is dropped, so that downstream tools assign the
    /// activity to the network again.
    pub fn relocate(&mut self, coord: Coord) {
        self.coord = Some(coord);
        self.link_id = None;
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Route {
    pub route_type: String,
    pub start_link: String,
    pub end_link: String,
    pub trav_time: Option<String>,
    pub distance: Option<f64>,
    pub vehicle: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Leg {
    pub mode: String,
    pub dep_time: Option<String>,
    pub trav_time: Option<String>,
    pub route: Option<Route>,
    pub attributes: Attributes,
}

impl Leg {
    pub fn new(mode: &str) -> Self {
        Leg {
            mode: mode.to_string(),
            dep_time: None,
            trav_time: None,
            route: None,
            attributes: Attributes::default(),
        }
    }

    pub fn routing_mode(&self) -> Option<&str> {
        self.attributes.get(ROUTING_MODE)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum PlanElement {
    Activity(Activity),
    Leg(Leg),
}

impl PlanElement {
    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            PlanElement::Activity(act) => Some(act),
            PlanElement::Leg(_) => None,
        }
    }

    pub fn as_leg(&self) -> Option<&Leg> {
        match self {
            PlanElement::Leg(leg) => Some(leg),
            PlanElement::Activity(_) => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Plan {
    pub selected: bool,
    pub score: Option<f64>,
    pub plan_type: Option<String>,
    pub attributes: Attributes,
    pub elements: Vec<PlanElement>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            selected: true,
            score: None,
            plan_type: None,
            attributes: Attributes::default(),
            elements: Vec::new(),
        }
    }
}

impl Plan {
    pub fn add_leg(&mut self, leg: Leg) {
        self.elements.push(PlanElement::Leg(leg));
    }

    pub fn add_act(&mut self, activity: Activity) {
        self.elements.push(PlanElement::Activity(activity));
    }

    pub fn legs(&self) -> Vec<&Leg> {
        self.elements.iter().filter_map(|e| e.as_leg()).collect()
    }

    pub fn acts(&self) -> Vec<&Activity> {
        self.elements.iter().filter_map(|e| e.as_activity()).collect()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Person {
    id: String,
    plans: Vec<Plan>,
    attributes: Attributes,
}

impl Person {
    pub fn new(id: &str, plan: Plan) -> Self {
        Person {
            id: id.to_string(),
            plans: vec![plan],
            attributes: Attributes::default(),
        }
    }

    pub fn with_plans(id: String, plans: Vec<Plan>, attributes: Attributes) -> Self {
        Person {
            id,
            plans,
            attributes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn plans(&self) -> &Vec<Plan> {
        &self.plans
    }

    pub fn add_plan(&mut self, plan: Plan) {
        self.plans.push(plan);
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn selected_plan(&self) -> Option<&Plan> {
        self.plans.iter().find(|&plan| plan.selected)
    }

    /// Swaps the selected plan for `plan`, keeping its position among the person's plans. Returns
    /// the replaced plan, or hands `plan` back if the person has no selected plan.
    pub fn replace_selected_plan(&mut self, mut plan: Plan) -> Result<Plan, Plan> {
        match self.plans.iter().position(|p| p.selected) {
            Some(index) => {
                plan.selected = true;
                Ok(std::mem::replace(&mut self.plans[index], plan))
            }
            None => Err(plan),
        }
    }
}
