/// Upstream data sources.
///
/// Each source gets its own file: request construction plus response
/// parsing. `fetch` holds the one HTTP primitive they all share.
pub mod arcgis;
pub mod fetch;
pub mod numeric;
pub mod source;
pub mod vizallas;

#[cfg(test)]
pub(crate) mod fixtures;
