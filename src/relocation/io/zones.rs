use std::io::Read;

use geo::{MultiPolygon, Polygon};
use geojson::{feature, Feature, GeoJson};
use serde_json::Value;
use tracing::info;

use crate::relocation::error::LoadError;
use crate::relocation::io::open_source;
use crate::relocation::zones::Zone;

/// Reads all features of a GeoJSON FeatureCollection as zones, in file order.
///
/// The zone id is the feature's `id` member or, if that is missing, the property named
/// `id_property`. Only Polygon and MultiPolygon geometries are accepted.
pub fn load_zones(source: &str, id_property: &str) -> Result<Vec<Zone>, LoadError> {
    let mut content = String::new();
    open_source(source)?
        .read_to_string(&mut content)
        .map_err(|e| LoadError::Read {
            path: source.to_string(),
            source: e,
        })?;
    let geojson = content.parse::<GeoJson>().map_err(|e| LoadError::GeoJson {
        path: source.to_string(),
        source: e,
    })?;
    let zones = zones_from_geojson(geojson, source, id_property)?;
    info!(
        "Finished reading zones from {source}. Found {} zones.",
        zones.len()
    );
    Ok(zones)
}

pub fn zones_from_geojson(
    geojson: GeoJson,
    source: &str,
    id_property: &str,
) -> Result<Vec<Zone>, LoadError> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LoadError::NotAFeatureCollection(source.to_string()));
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| zone_from_feature(feature, index, source, id_property))
        .collect()
}

fn zone_from_feature(
    feature: Feature,
    index: usize,
    source: &str,
    id_property: &str,
) -> Result<Zone, LoadError> {
    let id = zone_id(&feature, id_property).ok_or_else(|| LoadError::MissingZoneId {
        path: source.to_string(),
        index,
        property: id_property.to_string(),
    })?;

    let geometry = feature.geometry.ok_or_else(|| LoadError::MissingGeometry {
        path: source.to_string(),
        index,
    })?;
    let geometry = convert_geometry(geometry.value).ok_or_else(|| {
        LoadError::UnsupportedGeometry { zone: id.clone() }
    })?;

    Ok(Zone::new(id, geometry))
}

fn zone_id(feature: &Feature, id_property: &str) -> Option<String> {
    match &feature.id {
        Some(feature::Id::String(s)) => return Some(s.clone()),
        Some(feature::Id::Number(n)) => return Some(n.to_string()),
        None => {}
    }
    match feature.property(id_property)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert_geometry(value: geojson::Value) -> Option<MultiPolygon> {
    match value {
        geojson::Value::Polygon(_) => Polygon::try_from(value)
            .ok()
            .map(|p| MultiPolygon::new(vec![p])),
        geojson::Value::MultiPolygon(_) => MultiPolygon::try_from(value).ok(),
        _ => None,
    }
}
