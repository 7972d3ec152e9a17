use crate::models::delivery::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Smoothstep easing, monotonic on [0, 1]. Input is clamped, so eased
/// progress can never run backwards or overshoot the leg.
pub fn smoothstep(fraction: f64) -> f64 {
    let f = fraction.clamp(0.0, 1.0);
    f * f * (3.0 - 2.0 * f)
}

/// Linear interpolation along the straight-line segment from `start` to
/// `end`. `fraction` 0.0 is `start`, 1.0 is exactly `end`.
pub fn point_along(start: &GeoPoint, end: &GeoPoint, fraction: f64) -> GeoPoint {
    let f = fraction.clamp(0.0, 1.0);
    GeoPoint {
        lat: start.lat + (end.lat - start.lat) * f,
        lng: start.lng + (end.lng - start.lng) * f,
    }
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, point_along, smoothstep};
    use crate::models::delivery::GeoPoint;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn smoothstep_is_monotonic_and_bounded() {
        let mut previous = -1.0;
        for step in 0..=100 {
            let eased = smoothstep(step as f64 / 100.0);
            assert!(eased >= previous);
            assert!((0.0..=1.0).contains(&eased));
            previous = eased;
        }
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
    }

    #[test]
    fn smoothstep_clamps_out_of_range_input() {
        assert_eq!(smoothstep(-0.5), 0.0);
        assert_eq!(smoothstep(1.5), 1.0);
    }

    #[test]
    fn point_along_hits_endpoints_exactly() {
        let start = GeoPoint { lat: 0.0, lng: 0.0 };
        let end = GeoPoint { lat: 0.0, lng: 1.0 };

        assert_eq!(point_along(&start, &end, 0.0), start);
        assert_eq!(point_along(&start, &end, 1.0), end);

        let midpoint = point_along(&start, &end, 0.5);
        assert!((midpoint.lng - 0.5).abs() < 1e-12);
        assert!(midpoint.lat.abs() < 1e-12);
    }
}
