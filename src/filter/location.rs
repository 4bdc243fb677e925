//! Location allow-list applied to every scraped listing.

/// Trim a free-text location. `None` becomes the empty string.
///
/// No case-folding happens here; comparisons lower-case at the call site.
pub fn normalize_location(location: Option<&str>) -> String {
    location.unwrap_or_default().trim().to_string()
}

/// Permissive location check: any positive signal admits the listing.
///
/// Matching is a case-insensitive substring test, so `"Remoteville"` counts as
/// remote and a city like `"Pune"` also matches `"Punekar Road"`.
pub fn is_location_ok(
    location: &str,
    cities: &[String],
    countries: &[String],
    remote_ok: bool,
    remote_global_ok: bool,
) -> bool {
    let loc = location.to_lowercase();

    if loc.contains("remote") {
        return remote_ok || remote_global_ok;
    }

    if cities
        .iter()
        .any(|city| loc.contains(&city.to_lowercase()))
    {
        return true;
    }

    countries
        .iter()
        .any(|country| loc.contains(&country.to_lowercase()))
}
