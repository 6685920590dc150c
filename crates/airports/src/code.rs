use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Three-letter uppercase IATA airport code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IataCode(String);

impl IataCode {
    /// Trims and uppercases `raw`; anything other than three ASCII letters is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(ResolveError::InvalidCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IataCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IataCode {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IataCode {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IataCode> for String {
    fn from(code: IataCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::IataCode;
    use crate::error::ResolveError;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(IataCode::parse(" yyz ").unwrap().as_str(), "YYZ");
        assert_eq!("lHr".parse::<IataCode>().unwrap().to_string(), "LHR");
    }

    #[test]
    fn rejects_malformed_codes() {
        for raw in ["", "YY", "YYZZ", "Y1Z", "ÄBC", "Y Z"] {
            assert_eq!(
                IataCode::parse(raw),
                Err(ResolveError::InvalidCode(raw.to_string())),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn serde_validates() {
        let code: IataCode = serde_json::from_str(r#""sfo""#).unwrap();
        assert_eq!(code.as_str(), "SFO");
        assert!(serde_json::from_str::<IataCode>(r#""sf""#).is_err());
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""SFO""#);
    }
}
