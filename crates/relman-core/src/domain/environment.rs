//! Release target environments.

use serde::{Deserialize, Serialize};

/// Target environment for a release package.
///
/// Wire strings appear verbatim in REST path segments and request bodies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReleaseEnvironment {
    Prod,
    PreProd,
    PreProdBlack,
    #[serde(rename = "QTF")]
    Qtf,
    Uat,
}

impl ReleaseEnvironment {
    pub const ALL: [ReleaseEnvironment; 5] = [
        ReleaseEnvironment::Prod,
        ReleaseEnvironment::PreProd,
        ReleaseEnvironment::PreProdBlack,
        ReleaseEnvironment::Qtf,
        ReleaseEnvironment::Uat,
    ];

    /// Wire string, used in REST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseEnvironment::Prod => "Prod",
            ReleaseEnvironment::PreProd => "PreProd",
            ReleaseEnvironment::PreProdBlack => "PreProdBlack",
            ReleaseEnvironment::Qtf => "QTF",
            ReleaseEnvironment::Uat => "Uat",
        }
    }
}

impl std::fmt::Display for ReleaseEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReleaseEnvironment {
    type Err = String;

    /// Case-insensitive parse of the wire strings, for CLI and config input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReleaseEnvironment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown release environment: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_serde_round_trip() {
        for env in ReleaseEnvironment::ALL {
            let json = serde_json::to_string(&env).expect("serialize");
            let parsed: ReleaseEnvironment = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(env, parsed);
        }
    }

    #[test]
    fn test_environment_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ReleaseEnvironment::Qtf).expect("serialize"),
            "\"QTF\""
        );
        assert_eq!(
            serde_json::to_string(&ReleaseEnvironment::PreProdBlack).expect("serialize"),
            "\"PreProdBlack\""
        );
    }

    #[test]
    fn test_environment_from_str_case_insensitive() {
        assert_eq!(
            "prod".parse::<ReleaseEnvironment>().expect("parse"),
            ReleaseEnvironment::Prod
        );
        assert_eq!(
            "qtf".parse::<ReleaseEnvironment>().expect("parse"),
            ReleaseEnvironment::Qtf
        );
        assert!("Dev".parse::<ReleaseEnvironment>().is_err());
    }
}
