use std::future::Future;

use crate::code::IataCode;
use crate::error::ResolveError;
use crate::record::{Airport, AirportCoordinate};
use crate::resolver::AirportResolver;

/// Resolves airports through `GET {base_url}/api/airports/{iata}`.
///
/// An empty `base_url` means same-origin on the web.
#[derive(Debug, Clone, Default)]
pub struct HttpResolver {
    base_url: String,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
}

impl HttpResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            #[cfg(not(target_arch = "wasm32"))]
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, code: &IataCode) -> String {
        format!("{}/api/airports/{}", self.base_url, code)
    }
}

/// Maps an HTTP status and body to a coordinate.
///
/// Any non-2xx status is "not found" for the requested code, whatever the
/// server said.
pub fn interpret_response(
    code: &IataCode,
    status: u16,
    body: &[u8],
) -> Result<AirportCoordinate, ResolveError> {
    if !(200..300).contains(&status) {
        return Err(ResolveError::NotFound {
            iata: code.to_string(),
        });
    }
    let airport: Airport =
        serde_json::from_slice(body).map_err(|e| ResolveError::Decode(e.to_string()))?;
    airport.coordinate()
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::{HttpResolver, interpret_response};
    use crate::code::IataCode;
    use crate::error::ResolveError;
    use crate::record::AirportCoordinate;

    pub async fn fetch(
        resolver: &HttpResolver,
        code: &IataCode,
    ) -> Result<AirportCoordinate, ResolveError> {
        let url = resolver.endpoint(code);
        let response = resolver
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::Transport(format!("GET {url}: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Transport(format!("GET {url}: {e}")))?;
        interpret_response(code, status, &body)
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::{HttpResolver, interpret_response};
    use crate::code::IataCode;
    use crate::error::ResolveError;
    use crate::record::AirportCoordinate;
    use gloo_net::http::Request;

    pub async fn fetch(
        resolver: &HttpResolver,
        code: &IataCode,
    ) -> Result<AirportCoordinate, ResolveError> {
        let url = resolver.endpoint(code);
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::Transport(format!("GET {url}: {e}")))?;
        let status = response.status();
        let body = response
            .binary()
            .await
            .map_err(|e| ResolveError::Transport(format!("GET {url}: {e}")))?;
        interpret_response(code, status, &body)
    }
}

impl AirportResolver for HttpResolver {
    fn resolve(
        &self,
        code: &IataCode,
    ) -> impl Future<Output = Result<AirportCoordinate, ResolveError>> {
        let code = code.clone();
        async move {
            let result = imp::fetch(self, &code).await;
            if let Err(err) = &result {
                tracing::warn!(iata = %code, error = %err, "airport lookup failed");
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpResolver, interpret_response};
    use crate::code::IataCode;
    use crate::error::ResolveError;

    fn yyz() -> IataCode {
        IataCode::parse("YYZ").unwrap()
    }

    #[test]
    fn endpoint_joins_base_and_code() {
        let r = HttpResolver::new("http://127.0.0.1:9200/");
        assert_eq!(r.endpoint(&yyz()), "http://127.0.0.1:9200/api/airports/YYZ");
        assert_eq!(HttpResolver::new("").endpoint(&yyz()), "/api/airports/YYZ");
    }

    #[test]
    fn non_success_status_is_not_found() {
        for status in [404, 500, 302] {
            let err = interpret_response(&yyz(), status, br#"{"error":"Airport not found"}"#)
                .unwrap_err();
            assert_eq!(err.to_string(), "Airport YYZ not found");
        }
    }

    #[test]
    fn success_body_is_decoded() {
        let body = br#"{"iata":"YYZ","name":"Toronto Pearson International Airport","lat":43.6777,"lon":-79.6248}"#;
        let c = interpret_response(&yyz(), 200, body).unwrap();
        assert_eq!(c.latitude, 43.6777);
        assert!(matches!(
            interpret_response(&yyz(), 200, b"not json"),
            Err(ResolveError::Decode(_))
        ));
    }
}
