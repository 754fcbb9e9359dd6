/// Test fixtures: representative upstream payloads.
///
/// The station page fixture keeps only the script block the parser reads,
/// surrounded by enough markup to make sure the marker search skips it.
/// The geoportal fixtures mirror the `f=json` feature-query envelope:
///
///   features[]
///     .attributes["vFeAllomas_webmerc.Nev"]            - station name
///     .attributes["vh.dbo.AllomasAdatVOP_FE.Vizallas"] - level in cm (number or null)

/// vizugy.hu station page with a five-day `Vizallas` series ending at 87 cm.
#[cfg(test)]
pub(crate) fn fixture_vizallas_page() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="hu">
<head><title>Vízállás idősor</title></head>
<body>
<div id="grafikon"></div>
<script type="text/javascript">
    var Datum = new Array('2024.05.01', '2024.05.02', '2024.05.03', '2024.05.04', '2024.05.05');
    var Vizallas = new Array(91, 90, 89,
        88, 87);
    rajzol(Datum, Vizallas);
</script>
</body>
</html>"#
}

/// Station page that lost its chart script (e.g. maintenance page).
#[cfg(test)]
pub(crate) fn fixture_vizallas_page_without_array() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="hu">
<body><p>Az oldal karbantartás alatt.</p></body>
</html>"#
}

/// Server-filtered query for "Balaton átlag".
#[cfg(test)]
pub(crate) fn fixture_single_station_json() -> &'static str {
    r#"{"features":[{"attributes":{"vFeAllomas_webmerc.Nev":"Balaton átlag","vh.dbo.AllomasAdatVOP_FE.Vizallas":87}}]}"#
}

/// Server-filtered query for a name that matched nothing.
#[cfg(test)]
pub(crate) fn fixture_empty_features_json() -> &'static str {
    r#"{
      "displayFieldName": "Nev",
      "fieldAliases": { "vFeAllomas_webmerc.Nev": "Nev" },
      "fields": [],
      "features": []
    }"#
}

/// ArcGIS error envelope, returned with HTTP 200 for a bad `where` clause.
#[cfg(test)]
pub(crate) fn fixture_service_error_json() -> &'static str {
    r#"{
      "error": {
        "code": 400,
        "message": "Unable to complete operation.",
        "details": ["Unable to perform query operation."]
      }
    }"#
}

/// Owner-code 4 query. Contains a duplicate "Balaton átlag" (87 first, 99
/// second), a station with a null level and a feature without a name.
#[cfg(test)]
pub(crate) fn fixture_owner_stations_json() -> &'static str {
    r#"{
      "displayFieldName": "Nev",
      "features": [
        { "attributes": { "vFeAllomas_webmerc.Nev": "Siófok", "vFeAllomas_webmerc.Tulajdonos": 4, "vh.dbo.AllomasAdatVOP_FE.Vizallas": 85 } },
        { "attributes": { "vFeAllomas_webmerc.Nev": "Balaton átlag", "vFeAllomas_webmerc.Tulajdonos": 4, "vh.dbo.AllomasAdatVOP_FE.Vizallas": 87 } },
        { "attributes": { "vFeAllomas_webmerc.Nev": "Keszthely", "vFeAllomas_webmerc.Tulajdonos": 4, "vh.dbo.AllomasAdatVOP_FE.Vizallas": 92.0 } },
        { "attributes": { "vFeAllomas_webmerc.Nev": "Fonyód", "vFeAllomas_webmerc.Tulajdonos": 4, "vh.dbo.AllomasAdatVOP_FE.Vizallas": null } },
        { "attributes": { "vFeAllomas_webmerc.Tulajdonos": 4, "vh.dbo.AllomasAdatVOP_FE.Vizallas": 10 } },
        { "attributes": { "vFeAllomas_webmerc.Nev": "Balaton átlag", "vFeAllomas_webmerc.Tulajdonos": 4, "vh.dbo.AllomasAdatVOP_FE.Vizallas": 99 } }
      ]
    }"#
}
