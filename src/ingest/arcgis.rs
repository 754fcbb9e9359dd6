/// vizugy.hu geoportal client (ArcGIS MapServer feature query).
///
/// Layer 60 of the `VIR/Vizmercek_vizugyhu` map service lists gauge stations
/// with their latest level:
///   https://geoportal.vizugy.hu/arcgis/rest/services/VIR/Vizmercek_vizugyhu/MapServer/60/query
///
/// Response shape (`f=json`):
///   features[]
///     .attributes["vFeAllomas_webmerc.Nev"]              - station name
///     .attributes["vh.dbo.AllomasAdatVOP_FE.Vizallas"]   - level in cm
///
/// Two request styles are supported. The single-station query lets the
/// server filter by exact name; the multi-station query asks for every
/// station of one owner and filters by name here.

use crate::ingest::numeric::centimeters_from_json;
use crate::model::{FetchError, StationQuery, WaterLevelReading};
use serde::Deserialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Serde structures for the feature-query response
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QueryResponse {
    features: Option<Vec<Feature>>,
    error: Option<QueryError>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    attributes: Map<String, Value>,
}

/// ArcGIS reports query errors inside a 200 response.
#[derive(Deserialize)]
struct QueryError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

pub const GEOPORTAL_QUERY_URL: &str =
    "https://geoportal.vizugy.hu/arcgis/rest/services/VIR/Vizmercek_vizugyhu/MapServer/60/query";

pub const NAME_FIELD: &str = "vFeAllomas_webmerc.Nev";
pub const VALUE_FIELD: &str = "vh.dbo.AllomasAdatVOP_FE.Vizallas";
pub const OWNER_FIELD: &str = "vFeAllomas_webmerc.Tulajdonos";

/// Owner code used by the broad multi-station query.
pub const DEFAULT_OWNER_CODE: u32 = 4;

/// Builds a query the server filters down to the station named `place`.
pub fn build_single_station_query(endpoint: &str, place: &str) -> StationQuery {
    StationQuery::new(endpoint)
        .param("f", "json")
        .param("where", format!("{} = '{}'", NAME_FIELD, escape_sql_literal(place)))
        .param("returnGeometry", "false")
        .param("outFields", format!("{},{}", NAME_FIELD, VALUE_FIELD))
        .station(place)
}

/// Builds the broad owner-code query; `place` is matched client-side.
pub fn build_multi_station_query(endpoint: &str, owner_code: u32, place: &str) -> StationQuery {
    build_owner_query(endpoint, owner_code).station(place)
}

/// Owner-code query with no station filter, used for station listings.
pub fn build_owner_query(endpoint: &str, owner_code: u32) -> StationQuery {
    StationQuery::new(endpoint)
        .param("f", "json")
        .param("where", format!("{} = {}", OWNER_FIELD, owner_code))
        .param("returnGeometry", "false")
        .param("outFields", "*")
}

/// Doubles single quotes so a place name cannot end the SQL string early.
fn escape_sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_features(json: &str) -> Result<Vec<Feature>, FetchError> {
    let response: QueryResponse = serde_json::from_str(json)
        .map_err(|e| FetchError::parse(format!("JSON deserialization failed: {}", e)))?;

    if let Some(err) = response.error {
        return Err(FetchError::parse(format!(
            "feature query error {}: {}",
            err.code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
            err.message.unwrap_or_default()
        )));
    }

    response
        .features
        .ok_or_else(|| FetchError::parse("response has no 'features' array"))
}

fn feature_name(feature: &Feature) -> Option<&str> {
    feature.attributes.get(NAME_FIELD).and_then(Value::as_str)
}

fn feature_level(feature: &Feature) -> Result<i64, FetchError> {
    let value = feature
        .attributes
        .get(VALUE_FIELD)
        .ok_or_else(|| FetchError::parse(format!("feature has no '{}' attribute", VALUE_FIELD)))?;
    centimeters_from_json(value)
}

/// Reads the level from the first feature of a server-filtered response.
///
/// # Errors
/// `FetchError::Parse` for malformed JSON, a service error object, an empty
/// `features` array (no matching station) or a missing/non-numeric value.
pub fn parse_single_station(json: &str) -> Result<WaterLevelReading, FetchError> {
    let features = parse_features(json)?;
    let feature = features
        .first()
        .ok_or_else(|| FetchError::parse("no matching station in response"))?;
    feature_level(feature).map(WaterLevelReading)
}

/// Reads the level of the first feature whose name equals `place` exactly.
///
/// Upstream order decides between duplicate names.
pub fn parse_multi_station(json: &str, place: &str) -> Result<WaterLevelReading, FetchError> {
    let features = parse_features(json)?;
    let feature = features
        .iter()
        .find(|f| feature_name(f) == Some(place))
        .ok_or_else(|| FetchError::parse(format!("station '{}' not found in response", place)))?;
    feature_level(feature).map(WaterLevelReading)
}

/// Lists every `(name, level)` pair in upstream order.
///
/// Features without a name or with an unusable level are skipped.
pub fn list_stations(json: &str) -> Result<Vec<(String, WaterLevelReading)>, FetchError> {
    let features = parse_features(json)?;
    Ok(features
        .iter()
        .filter_map(|f| {
            let name = feature_name(f)?;
            let level = feature_level(f).ok()?;
            Some((name.to_string(), WaterLevelReading(level)))
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
