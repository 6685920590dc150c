use foundation::math::{clamp_latitude, normalize_longitude};
use serde::{Deserialize, Serialize};

use crate::code::IataCode;
use crate::error::ResolveError;

/// Airport record as served by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Validated position of an airport.
///
/// Latitude is within `[-90, 90]` and longitude within `[-180, 180]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportCoordinate {
    pub iata: IataCode,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    pub fn new(iata: &str, name: &str, lat: f64, lon: f64) -> Self {
        Self {
            iata: iata.to_string(),
            name: name.to_string(),
            lat,
            lon,
        }
    }

    /// Checks the code and brings the position into range.
    ///
    /// Longitudes wrap and latitudes clamp; only non-finite values fail.
    pub fn coordinate(&self) -> Result<AirportCoordinate, ResolveError> {
        let iata = IataCode::parse(&self.iata)
            .map_err(|_| ResolveError::Decode(format!("bad iata field {:?}", self.iata)))?;
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(ResolveError::Decode(format!(
                "non-finite position ({}, {}) for {iata}",
                self.lat, self.lon
            )));
        }
        Ok(AirportCoordinate {
            iata,
            latitude: clamp_latitude(self.lat),
            longitude: normalize_longitude(self.lon),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Airport;
    use crate::error::ResolveError;

    #[test]
    fn parses_endpoint_payload() {
        let a: Airport = serde_json::from_str(
            r#"{"iata":"YYZ","name":"Toronto Pearson International Airport","lat":43.6777,"lon":-79.6248}"#,
        )
        .unwrap();
        let c = a.coordinate().unwrap();
        assert_eq!(c.iata.as_str(), "YYZ");
        assert_eq!(c.latitude, 43.6777);
        assert_eq!(c.longitude, -79.6248);
    }

    #[test]
    fn wraps_longitude_and_clamps_latitude() {
        let c = Airport::new("ABC", "Wrapped", 10.0, 190.0).coordinate().unwrap();
        assert!((c.longitude - -170.0).abs() < 1e-12);
        assert_eq!(c.latitude, 10.0);

        let c = Airport::new("ABC", "Westward", -95.0, -540.0).coordinate().unwrap();
        assert_eq!(c.latitude, -90.0);
        assert!((c.longitude - -180.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_finite_positions() {
        let a = Airport::new("ABC", "Nowhere", 0.0, f64::NAN);
        assert!(matches!(a.coordinate(), Err(ResolveError::Decode(_))));
        let a = Airport::new("ABC", "Nowhere", f64::INFINITY, 0.0);
        assert!(matches!(a.coordinate(), Err(ResolveError::Decode(_))));
    }
}
