use geo::Coord;

use crate::relocation::error::LoadError;
use crate::relocation::io::xml::facilities::load_from_xml;

/// A fixed location offering one or more activity types.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: String,
    pub coord: Coord,
    pub activity_options: Vec<String>,
}

impl Facility {
    /// Whether any of the facility's activity options contains `facility_type`. A "leisure_gym"
    /// option matches "leisure".
    pub fn offers(&self, facility_type: &str) -> bool {
        self.activity_options
            .iter()
            .any(|option| option.contains(facility_type))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Facilities {
    facilities: Vec<Facility>,
}

impl Facilities {
    pub fn new() -> Self {
        Facilities::default()
    }

    pub fn from_file(source: &str) -> Result<Self, LoadError> {
        load_from_xml(source)
    }

    pub fn add(&mut self, facility: Facility) {
        self.facilities.push(facility);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.iter()
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl FromIterator<Facility> for Facilities {
    fn from_iter<T: IntoIterator<Item = Facility>>(iter: T) -> Self {
        Facilities {
            facilities: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::relocation::facilities::Facility;

    #[test]
    fn offers_matches_substrings() {
        let facility = Facility {
            id: "f".to_string(),
            coord: geo::coord! { x: 0., y: 0. },
            activity_options: vec!["leisure_gym".to_string(), "shop_daily".to_string()],
        };
        assert!(facility.offers("leisure"));
        assert!(facility.offers("shop"));
        assert!(!facility.offers("shopping"));
        assert!(!facility.offers("work"));
    }
}
