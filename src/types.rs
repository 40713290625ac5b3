//! Coin and chain selectors shared by every request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cryptocurrency network targeted by a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    /// Bitcoin.
    Btc,
    /// Litecoin.
    Ltc,
    /// Dogecoin.
    Doge,
    /// BlockCypher's own test coin.
    Bcy,
}

impl Coin {
    /// Path segment used in request URLs (e.g. `"btc"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Btc => "btc",
            Self::Ltc => "ltc",
            Self::Doge => "doge",
            Self::Bcy => "bcy",
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Coin {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "btc" => Ok(Self::Btc),
            "ltc" => Ok(Self::Ltc),
            "doge" => Ok(Self::Doge),
            "bcy" => Ok(Self::Bcy),
            other => Err(UnknownVariant::new("coin", other)),
        }
    }
}

/// Network variant of a coin.
///
/// Not every coin has every chain (e.g. `bcy` only has `test`, `btc` uses `test3`).
/// Combinations are not checked locally; the API rejects unsupported ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Main,
    Test,
    Test3,
}

impl Chain {
    /// Path segment used in request URLs (e.g. `"main"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Test => "test",
            Self::Test3 => "test3",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Self::Main),
            "test" => Ok(Self::Test),
            "test3" => Ok(Self::Test3),
            other => Err(UnknownVariant::new("chain", other)),
        }
    }
}

/// Returned when a string does not name a known [`Coin`] or [`Chain`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_parse_and_display() {
        for coin in [Coin::Btc, Coin::Ltc, Coin::Doge, Coin::Bcy] {
            assert_eq!(coin.as_str().parse::<Coin>(), Ok(coin));
            assert_eq!(coin.to_string(), coin.as_str());
        }

        let err = "eth".parse::<Coin>().unwrap_err();
        assert_eq!(err.kind, "coin");
        assert_eq!(err.to_string(), "unknown coin: \"eth\"");
    }

    #[test]
    fn test_chain_parse_and_display() {
        for chain in [Chain::Main, Chain::Test, Chain::Test3] {
            assert_eq!(chain.as_str().parse::<Chain>(), Ok(chain));
        }
        assert!("Main".parse::<Chain>().is_err());
    }

    #[test]
    fn test_serde_uses_path_segments() {
        assert_eq!(serde_json::to_string(&Coin::Doge).unwrap(), "\"doge\"");
        let chain: Chain = serde_json::from_str("\"test3\"").unwrap();
        assert_eq!(chain, Chain::Test3);
    }
}
