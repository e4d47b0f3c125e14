use serde::{Deserialize, Serialize};
use tracing::info;

use crate::relocation::error::LoadError;
use crate::relocation::facilities::{Facilities, Facility};
use crate::relocation::io::xml;
use crate::relocation::io::xml::attributes::IOAttributes;

pub(crate) fn load_from_xml(source: &str) -> Result<Facilities, LoadError> {
    let io_facilities = IOFacilities::from_file(source)?;
    Ok(Facilities::from(io_facilities))
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOActivityOption {
    #[serde(rename = "@type")]
    pub r#type: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOFacility {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@x")]
    pub x: f64,
    #[serde(rename = "@y")]
    pub y: f64,
    #[serde(rename = "@linkId", skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
    #[serde(rename = "activity", default)]
    pub activities: Vec<IOActivityOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IOAttributes>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename = "facilities")]
pub struct IOFacilities {
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "facility", default)]
    pub facilities: Vec<IOFacility>,
}

impl IOFacilities {
    pub fn from_file(file_path: &str) -> Result<IOFacilities, LoadError> {
        let facilities: IOFacilities = xml::read_from_file(file_path)?;
        info!(
            "IOFacilities: Finished reading facilities. It contains {} facilities.",
            facilities.facilities.len()
        );
        Ok(facilities)
    }
}

impl From<IOFacilities> for Facilities {
    fn from(io: IOFacilities) -> Self {
        let mut result = Facilities::new();
        for io_facility in io.facilities {
            result.add(Facility {
                id: io_facility.id,
                coord: geo::coord! { x: io_facility.x, y: io_facility.y },
                activity_options: io_facility
                    .activities
                    .into_iter()
                    .map(|option| option.r#type)
                    .collect(),
            });
        }
        result
    }
}
