use serde::{Deserialize, Serialize};

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Default search radius in miles for games and player search.
pub const DEFAULT_RADIUS_GAMES: f64 = 25.0;
/// Default search radius in miles for campaigns and vendors.
pub const DEFAULT_RADIUS_CAMPAIGNS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Great-circle distance between two points, in miles.
pub fn distance_miles(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // clamp keeps antipodal points from producing NaN through float error
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_MILES * c
}

/// What to do with candidates that have no stored coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingCoords {
    Exclude,
    Append,
}

/// Drops items farther than `radius` miles from `origin` and sorts the rest
/// ascending by distance. Items without coordinates are excluded or appended
/// unordered after the in-radius results, per `missing`.
pub fn filter_by_radius<T, F>(
    origin: &Coordinates,
    radius: f64,
    items: Vec<T>,
    missing: MissingCoords,
    coords_of: F,
) -> Vec<(T, Option<f64>)>
where
    F: Fn(&T) -> Option<Coordinates>,
{
    let mut in_range = Vec::new();
    let mut unplaced = Vec::new();

    for item in items {
        match coords_of(&item) {
            Some(coords) => {
                let d = distance_miles(origin, &coords);
                if d <= radius {
                    in_range.push((item, Some(d)));
                }
            }
            None => {
                if missing == MissingCoords::Append {
                    unplaced.push((item, None));
                }
            }
        }
    }

    in_range.sort_by(|a, b| {
        a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
    });
    in_range.extend(unplaced);
    in_range
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Resolves a zip/city query to coordinates via Nominatim. Geocoding is a
/// non-critical collaborator: any network or parse failure logs a warning and
/// returns `None` so callers can fall back to unfiltered results.
pub async fn geocode(http: &reqwest::Client, base_url: &str, query: &str) -> Option<Coordinates> {
    let url = format!("{}/search", base_url.trim_end_matches('/'));

    let result = http
        .get(&url)
        .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
        .send()
        .await;

    let places: Vec<NominatimPlace> = match result {
        Ok(response) => match response.json().await {
            Ok(places) => places,
            Err(e) => {
                log::warn!("Failed to parse geocoding response for '{}': {}", query, e);
                return None;
            }
        },
        Err(e) => {
            log::warn!("Geocoding request failed for '{}': {}", query, e);
            return None;
        }
    };

    let place = places.into_iter().next()?;
    match (place.lat.parse(), place.lon.parse()) {
        (Ok(latitude), Ok(longitude)) => Some(Coordinates { latitude, longitude }),
        _ => {
            log::warn!("Geocoder returned non-numeric coordinates for '{}'", query);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NYC: Coordinates = Coordinates {
        latitude: 40.7128,
        longitude: -74.0060,
    };
    const LA: Coordinates = Coordinates {
        latitude: 34.0522,
        longitude: -118.2437,
    };
    const BROOKLYN: Coordinates = Coordinates {
        latitude: 40.6782,
        longitude: -73.9442,
    };

    #[test]
    fn test_distance_zero_for_identical_points() {
        assert_eq!(distance_miles(&NYC, &NYC), 0.0);
    }

    #[test]
    fn test_distance_nyc_to_la() {
        let d = distance_miles(&NYC, &LA);
        assert!(
            (d - 2445.0).abs() < 10.0,
            "NYC-LA should be about 2445 miles, got {}",
            d
        );
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there = distance_miles(&NYC, &LA);
        let back = distance_miles(&LA, &NYC);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_points_do_not_nan() {
        let a = Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        };
        let b = Coordinates {
            latitude: 0.0,
            longitude: 180.0,
        };
        let d = distance_miles(&a, &b);
        assert!(d.is_finite(), "antipodal distance should be finite, got {}", d);
        assert!((d - EARTH_RADIUS_MILES * std::f64::consts::PI).abs() < 1.0);
    }

    #[test]
    fn test_filter_excludes_beyond_radius() {
        let items = vec![("brooklyn", Some(BROOKLYN)), ("la", Some(LA))];
        let results = filter_by_radius(&NYC, 25.0, items, MissingCoords::Exclude, |i| i.1);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0 .0, "brooklyn");
        assert!(results[0].1.unwrap() <= 25.0);
    }

    #[test]
    fn test_filter_sorts_ascending() {
        let near = Coordinates {
            latitude: 40.71,
            longitude: -74.00,
        };
        let items = vec![("brooklyn", Some(BROOKLYN)), ("near", Some(near))];
        let results = filter_by_radius(&NYC, 25.0, items, MissingCoords::Exclude, |i| i.1);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0 .0, "near", "closest result should sort first");
        assert!(results[0].1.unwrap() <= results[1].1.unwrap());
    }

    #[test]
    fn test_missing_coords_excluded() {
        let items = vec![("located", Some(BROOKLYN)), ("nowhere", None)];
        let results = filter_by_radius(&NYC, 25.0, items, MissingCoords::Exclude, |i| i.1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_missing_coords_appended_last() {
        let items = vec![("nowhere", None), ("located", Some(BROOKLYN))];
        let results = filter_by_radius(&NYC, 25.0, items, MissingCoords::Append, |i| i.1);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0 .0, "located");
        assert_eq!(results[1].0 .0, "nowhere");
        assert!(results[1].1.is_none());
    }
}
