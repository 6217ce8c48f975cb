//! Address assembly from a reverse-geocoded place.

use mapnote_core::{Address, Coordinate};

use crate::provider::PlaceFeature;

/// County from the first context entry whose id starts with `district`.
pub fn county_from_context(feature: &PlaceFeature) -> Option<String> {
    feature
        .context
        .iter()
        .find(|c| c.id.starts_with("district"))
        .map(|c| c.text.clone())
        .filter(|text| !text.trim().is_empty())
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn street_line(feature: &PlaceFeature) -> Option<String> {
    if !feature.has_type("address") {
        return None;
    }
    let street = non_empty(&feature.text)?;
    match feature.address.as_deref().and_then(non_empty) {
        Some(number) => Some(format!("{} {}", number, street)),
        None => Some(street),
    }
}

/// Joins street, city, state and zip with `", "`, skipping missing parts.
///
/// Falls back to `place_name`, then to `"lat, lng"`.
pub fn format_full_address(
    parts: &Address,
    place_name: Option<&str>,
    input: Coordinate,
) -> String {
    let joined = [&parts.address, &parts.city, &parts.state, &parts.zip]
        .iter()
        .filter_map(|p| p.as_deref())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if !joined.is_empty() {
        return joined;
    }
    place_name
        .and_then(non_empty)
        .unwrap_or_else(|| input.lat_lng_label())
}

/// Builds address fields from the best reverse match.
///
/// The `address` field receives the full human-readable line; the other
/// fields hold the individual parts.
pub fn assemble_address(feature: &PlaceFeature, input: Coordinate) -> Address {
    let part = |layer: &str| {
        feature
            .context_entry(layer)
            .and_then(|c| non_empty(&c.text))
    };

    let mut parts = Address {
        address: street_line(feature),
        city: part("place").or_else(|| part("locality")),
        state: part("region"),
        zip: part("postcode"),
        county: county_from_context(feature),
    };

    // A bare place/region/postcode result describes itself rather than its context
    if parts.city.is_none() && feature.has_type("place") {
        parts.city = non_empty(&feature.text);
    }
    if parts.zip.is_none() && feature.has_type("postcode") {
        parts.zip = non_empty(&feature.text);
    }

    parts.address = Some(format_full_address(
        &parts,
        Some(feature.place_name.as_str()),
        input,
    ));
    parts
}
