use std::future::Future;

use crate::code::IataCode;
use crate::error::ResolveError;
use crate::record::AirportCoordinate;

/// Looks up where an airport is.
///
/// Futures are not required to be `Send`; the globe runs on a
/// single-threaded event loop.
pub trait AirportResolver {
    fn resolve(
        &self,
        code: &IataCode,
    ) -> impl Future<Output = Result<AirportCoordinate, ResolveError>>;
}

/// Validates `raw` and resolves it.
pub async fn resolve_raw<R: AirportResolver>(
    resolver: &R,
    raw: &str,
) -> Result<AirportCoordinate, ResolveError> {
    let code = IataCode::parse(raw)?;
    resolver.resolve(&code).await
}
