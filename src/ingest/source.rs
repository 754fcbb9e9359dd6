/// Configured upstream variant of a sensor.
///
/// Deserialized from the `source` key of a `[[sensor]]` table, e.g.
///
/// ```toml
/// [[sensor]]
/// name = "Balaton átlag"
/// source = "embedded_array"
/// station_id = "164961D7-97AB-11D4-BB62-00508BA24287"
/// ```
///
/// A `Source` together with a place name yields both the request and the
/// parser for it.

use crate::ingest::arcgis::{self, DEFAULT_OWNER_CODE, GEOPORTAL_QUERY_URL};
use crate::ingest::fetch::ResponseParser;
use crate::ingest::vizallas::{self, DEFAULT_STATION_ID, VIZUGY_BASE_URL};
use crate::model::StationQuery;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Source {
    /// vizugy.hu station page, addressed by an opaque station id.
    EmbeddedArray {
        #[serde(default = "default_station_id")]
        station_id: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
    /// Geoportal query filtered by name on the server.
    SingleStation {
        #[serde(default)]
        endpoint: Option<String>,
    },
    /// Geoportal query for a whole owner, filtered by name here.
    MultiStation {
        #[serde(default = "default_owner_code")]
        owner_code: u32,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

fn default_station_id() -> String {
    DEFAULT_STATION_ID.to_string()
}

fn default_owner_code() -> u32 {
    DEFAULT_OWNER_CODE
}

impl Default for Source {
    fn default() -> Self {
        Source::EmbeddedArray {
            station_id: default_station_id(),
            endpoint: None,
        }
    }
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::EmbeddedArray { .. } => "embedded_array",
            Source::SingleStation { .. } => "single_station",
            Source::MultiStation { .. } => "multi_station",
        }
    }

    /// Upstream URL, honoring an `endpoint` override.
    pub fn endpoint(&self) -> &str {
        match self {
            Source::EmbeddedArray { endpoint, .. } => {
                endpoint.as_deref().unwrap_or(VIZUGY_BASE_URL)
            }
            Source::SingleStation { endpoint } | Source::MultiStation { endpoint, .. } => {
                endpoint.as_deref().unwrap_or(GEOPORTAL_QUERY_URL)
            }
        }
    }

    pub fn query(&self, place: &str) -> StationQuery {
        match self {
            Source::EmbeddedArray { station_id, .. } => {
                vizallas::build_station_query(self.endpoint(), station_id)
            }
            Source::SingleStation { .. } => {
                arcgis::build_single_station_query(self.endpoint(), place)
            }
            Source::MultiStation { owner_code, .. } => {
                arcgis::build_multi_station_query(self.endpoint(), *owner_code, place)
            }
        }
    }

    pub fn parser(&self) -> ResponseParser {
        match self {
            Source::EmbeddedArray { .. } => ResponseParser::EmbeddedArray,
            Source::SingleStation { .. } => ResponseParser::SingleStation,
            Source::MultiStation { .. } => ResponseParser::MultiStation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_is_balaton_station_page() {
        let source = Source::default();
        assert_eq!(source.kind(), "embedded_array");
        assert_eq!(source.endpoint(), VIZUGY_BASE_URL);
        assert_eq!(source.parser(), ResponseParser::EmbeddedArray);

        let query = source.query("Balaton átlag");
        assert!(query.url().contains(DEFAULT_STATION_ID));
    }

    #[test]
    fn test_endpoint_override() {
        let source = Source::SingleStation {
            endpoint: Some("http://127.0.0.1:9000/query".to_string()),
        };
        let query = source.query("Siófok");
        assert_eq!(query.endpoint, "http://127.0.0.1:9000/query");
        assert_eq!(query.station_name.as_deref(), Some("Siófok"));
    }

    #[test]
    fn test_multi_station_query_keeps_place_for_client_side_filter() {
        let source = Source::MultiStation {
            owner_code: 7,
            endpoint: None,
        };
        let query = source.query("Keszthely");
        assert_eq!(query.endpoint, GEOPORTAL_QUERY_URL);
        assert_eq!(query.station_name.as_deref(), Some("Keszthely"));
        assert!(query.url().contains("Tulajdonos%20%3D%207"));
        assert_eq!(source.parser(), ResponseParser::MultiStation);
    }

    #[test]
    fn test_deserialize_tagged_sources() {
        #[derive(Deserialize)]
        struct Wrapper {
            sensor: Vec<Source>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[sensor]]
            source = "embedded_array"

            [[sensor]]
            source = "single_station"

            [[sensor]]
            source = "multi_station"
            owner_code = 2
            "#,
        )
        .expect("sources should deserialize");

        assert_eq!(parsed.sensor[0], Source::default());
        assert_eq!(parsed.sensor[1], Source::SingleStation { endpoint: None });
        assert_eq!(
            parsed.sensor[2],
            Source::MultiStation {
                owner_code: 2,
                endpoint: None
            }
        );
    }
}
