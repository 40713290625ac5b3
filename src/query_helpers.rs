//! Ergonomic builders for the URL parameters and block references accepted by
//! the endpoint methods.

use std::collections::BTreeMap;
use std::fmt;

/// How to reference a specific block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockRef {
    /// Block height.
    Height(u64),
    /// Block hash, hex encoded.
    Hash(String),
}

impl From<u64> for BlockRef {
    fn from(value: u64) -> Self {
        Self::Height(value)
    }
}

impl From<String> for BlockRef {
    fn from(value: String) -> Self {
        Self::Hash(value)
    }
}

impl From<&str> for BlockRef {
    fn from(value: &str) -> Self {
        Self::Hash(value.to_string())
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height(height) => write!(f, "{height}"),
            Self::Hash(hash) => f.write_str(hash),
        }
    }
}

/// Extra URL parameters for a request.
///
/// Keys are kept sorted so the generated query string is stable. Values are sent
/// as-is; the API decides what it accepts. The `token` parameter is always set by
/// the client and cannot be overridden from here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary parameter, replacing any previous value for `key`.
    pub fn insert(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Maximum number of items (transactions, addresses) to return.
    pub fn limit(self, limit: u32) -> Self {
        self.insert("limit", limit)
    }

    /// Only return transactions below this block height.
    pub fn before(self, height: u64) -> Self {
        self.insert("before", height)
    }

    /// Only return transactions above this block height.
    pub fn after(self, height: u64) -> Self {
        self.insert("after", height)
    }

    /// Only return transactions with at least this many confirmations.
    pub fn confirmations(self, confirmations: u32) -> Self {
        self.insert("confirmations", confirmations)
    }

    /// Only return unspent outputs.
    pub fn unspent_only(self, value: bool) -> Self {
        self.insert("unspentOnly", value)
    }

    /// Include raw scripts of inputs and outputs.
    pub fn include_script(self, value: bool) -> Self {
        self.insert("includeScript", value)
    }

    /// Include confidence data for unconfirmed transactions.
    pub fn include_confidence(self, value: bool) -> Self {
        self.insert("includeConfidence", value)
    }

    /// Include the hex-encoded raw transaction.
    pub fn include_hex(self, value: bool) -> Self {
        self.insert("includeHex", value)
    }

    /// Omit the address list when querying a wallet.
    pub fn omit_wallet_addresses(self, value: bool) -> Self {
        self.insert("omitWalletAddresses", value)
    }

    /// Index of the first transaction to return within a block.
    pub fn txstart(self, index: u32) -> Self {
        self.insert("txstart", index)
    }

    /// Index of the first input to return within a transaction.
    pub fn instart(self, index: u32) -> Self {
        self.insert("instart", index)
    }

    /// Index of the first output to return within a transaction.
    pub fn outstart(self, index: u32) -> Self {
        self.insert("outstart", index)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (key, value)| params.insert(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_ref_display() {
        assert_eq!(BlockRef::from(294322u64).to_string(), "294322");
        let hash = "0000000000000000189bba3564a63772107b5673c940c16f12662b3e8546b412";
        assert_eq!(BlockRef::from(hash).to_string(), hash);
    }

    #[test]
    fn test_setters_use_api_names() {
        let params = QueryParams::new()
            .limit(50)
            .unspent_only(true)
            .include_hex(false)
            .before(300000);

        assert_eq!(params.get("limit"), Some("50"));
        assert_eq!(params.get("unspentOnly"), Some("true"));
        assert_eq!(params.get("includeHex"), Some("false"));
        assert_eq!(params.get("before"), Some("300000"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_insert_replaces_and_iterates_sorted() {
        let params: QueryParams = [("txstart", 1), ("limit", 5), ("txstart", 20)]
            .into_iter()
            .collect();

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("limit", "5"), ("txstart", "20")]);
    }
}
