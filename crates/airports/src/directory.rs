use std::collections::BTreeMap;
use std::future::{Future, ready};

use crate::code::IataCode;
use crate::error::ResolveError;
use crate::record::{Airport, AirportCoordinate};
use crate::resolver::AirportResolver;

const SEED: &[(&str, &str, f64, f64)] = &[
    ("AKL", "Auckland Airport", -37.0082, 174.7850),
    ("ATL", "Hartsfield-Jackson Atlanta International Airport", 33.6407, -84.4277),
    ("CDG", "Paris Charles de Gaulle Airport", 49.0097, 2.5479),
    ("DXB", "Dubai International Airport", 25.2532, 55.3657),
    ("FRA", "Frankfurt Airport", 50.0379, 8.5622),
    ("GRU", "Sao Paulo/Guarulhos International Airport", -23.4356, -46.4731),
    ("HKG", "Hong Kong International Airport", 22.3080, 113.9185),
    ("HND", "Tokyo Haneda Airport", 35.5494, 139.7798),
    ("JFK", "John F. Kennedy International Airport", 40.6413, -73.7781),
    ("JNB", "O. R. Tambo International Airport", -26.1367, 28.2411),
    ("LAX", "Los Angeles International Airport", 33.9416, -118.4085),
    ("LHR", "London Heathrow Airport", 51.4700, -0.4543),
    ("MEX", "Mexico City International Airport", 19.4361, -99.0719),
    ("NRT", "Narita International Airport", 35.7720, 140.3929),
    ("ORD", "O'Hare International Airport", 41.9742, -87.9073),
    ("SFO", "San Francisco International Airport", 37.6213, -122.3790),
    ("SIN", "Singapore Changi Airport", 1.3644, 103.9915),
    ("SYD", "Sydney Kingsford Smith Airport", -33.9399, 151.1753),
    ("YUL", "Montreal-Trudeau International Airport", 45.4706, -73.7408),
    ("YVR", "Vancouver International Airport", 49.1967, -123.1815),
    ("YYC", "Calgary International Airport", 51.1215, -114.0076),
    ("YYZ", "Toronto Pearson International Airport", 43.6777, -79.6248),
];

/// In-memory airport table keyed by uppercase IATA code.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AirportDirectory {
    airports: BTreeMap<String, Airport>,
}

impl AirportDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small table of major airports.
    pub fn builtin() -> Self {
        let mut dir = Self::new();
        for (iata, name, lat, lon) in SEED {
            dir.insert(Airport::new(iata, name, *lat, *lon));
        }
        dir
    }

    /// Loads a JSON array of `{ iata, name, lat, lon }`.
    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        let records: Vec<Airport> =
            serde_json::from_str(json).map_err(|e| ResolveError::Decode(e.to_string()))?;
        let mut dir = Self::new();
        for record in records {
            record.coordinate()?;
            dir.insert(record);
        }
        Ok(dir)
    }

    pub fn insert(&mut self, mut airport: Airport) {
        airport.iata = airport.iata.trim().to_ascii_uppercase();
        self.airports.insert(airport.iata.clone(), airport);
    }

    pub fn get(&self, code: &IataCode) -> Option<&Airport> {
        self.airports.get(code.as_str())
    }

    /// Case-insensitive lookup of an unvalidated code.
    pub fn lookup(&self, raw: &str) -> Option<&Airport> {
        self.airports.get(&raw.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.airports.values()
    }

    fn resolve_now(&self, code: &IataCode) -> Result<AirportCoordinate, ResolveError> {
        self.get(code)
            .ok_or_else(|| ResolveError::NotFound {
                iata: code.to_string(),
            })?
            .coordinate()
    }
}

impl AirportResolver for AirportDirectory {
    fn resolve(
        &self,
        code: &IataCode,
    ) -> impl Future<Output = Result<AirportCoordinate, ResolveError>> {
        ready(self.resolve_now(code))
    }
}

#[cfg(test)]
mod tests {
    use super::AirportDirectory;
    use crate::code::IataCode;
    use crate::error::ResolveError;
    use crate::resolver::{AirportResolver, resolve_raw};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_seed_is_valid() {
        let dir = AirportDirectory::builtin();
        assert!(dir.len() >= 20);
        for airport in dir.iter() {
            airport.coordinate().unwrap();
        }
    }

    #[test]
    fn resolves_known_airports() {
        let dir = AirportDirectory::builtin();
        let yyz = block_on(dir.resolve(&IataCode::parse("YYZ").unwrap())).unwrap();
        assert_eq!((yyz.latitude, yyz.longitude), (43.6777, -79.6248));
        let lhr = block_on(resolve_raw(&dir, "lhr")).unwrap();
        assert_eq!((lhr.latitude, lhr.longitude), (51.47, -0.4543));
    }

    #[test]
    fn unknown_code_is_not_found() {
        let dir = AirportDirectory::builtin();
        let err = block_on(resolve_raw(&dir, "zzz")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                iata: "ZZZ".into()
            }
        );
        assert_eq!(err.to_string(), "Airport ZZZ not found");
    }

    #[test]
    fn invalid_code_fails_before_lookup() {
        let dir = AirportDirectory::builtin();
        let err = block_on(resolve_raw(&dir, "TORONTO")).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCode(_)));
    }

    #[test]
    fn loads_json_directory() {
        let dir = AirportDirectory::from_json(
            r#"[{"iata":"yow","name":"Ottawa Macdonald-Cartier International Airport","lat":45.3225,"lon":-75.6692}]"#,
        )
        .unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.lookup("YOW").unwrap().lat, 45.3225);
        assert!(AirportDirectory::from_json("{}").is_err());
        assert!(
            AirportDirectory::from_json(r#"[{"iata":"A1C","name":"x","lat":1.0,"lon":0.0}]"#)
                .is_err()
        );

        let wrapped =
            AirportDirectory::from_json(r#"[{"iata":"ABC","name":"x","lat":100.0,"lon":200.0}]"#)
                .unwrap();
        let c = block_on(resolve_raw(&wrapped, "abc")).unwrap();
        assert_eq!(c.latitude, 90.0);
        assert!((c.longitude - -160.0).abs() < 1e-12);
    }
}
