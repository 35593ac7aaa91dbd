//! Warehouse row retrieval.

use abiframe_core::{LogRow, RawRow, TransactionRow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::account::{Account, Address};
use crate::error::RegistryError;

/// Supplies an account's transactions and logs.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Successful transactions sent from or to the account within its
    /// query range. Reverted calls are left out.
    async fn transactions(&self, account: &Account) -> Result<Vec<TransactionRow>, RegistryError>;

    /// Logs emitted by the account within its query range.
    async fn logs(&self, account: &Account) -> Result<Vec<LogRow>, RegistryError>;
}

/// Finds when a contract was deployed.
#[async_trait]
pub trait CreationSource: Send + Sync {
    /// Block time of the address's entry in the contracts dataset.
    async fn deployed_at(&self, address: &Address) -> Result<Option<DateTime<Utc>>, RegistryError>;

    /// Block time of a `create` trace targeting the address. Catches
    /// contracts deployed by other contracts.
    async fn created_by_trace(
        &self,
        address: &Address,
    ) -> Result<Option<DateTime<Utc>>, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct ContractEntry {
    address: String,
    block_timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TraceEntry {
    #[serde(default)]
    to_address: Option<String>,
    #[serde(default)]
    trace_type: String,
    block_timestamp: DateTime<Utc>,
}

/// Reads exported rows from JSON arrays on disk and filters them per account.
#[derive(Debug, Clone)]
pub struct JsonFileRowSource {
    transactions: Option<PathBuf>,
    logs: Option<PathBuf>,
    contracts: Option<PathBuf>,
    traces: Option<PathBuf>,
}

impl JsonFileRowSource {
    pub fn new() -> Self {
        Self {
            transactions: None,
            logs: None,
            contracts: None,
            traces: None,
        }
    }

    pub fn with_transactions(mut self, path: impl Into<PathBuf>) -> Self {
        self.transactions = Some(path.into());
        self
    }

    pub fn with_logs(mut self, path: impl Into<PathBuf>) -> Self {
        self.logs = Some(path.into());
        self
    }

    /// Contracts dataset export: `{ address, block_timestamp }` rows.
    pub fn with_contracts(mut self, path: impl Into<PathBuf>) -> Self {
        self.contracts = Some(path.into());
        self
    }

    /// Traces export: `{ to_address, trace_type, block_timestamp }` rows.
    pub fn with_traces(mut self, path: impl Into<PathBuf>) -> Self {
        self.traces = Some(path.into());
        self
    }
}

impl Default for JsonFileRowSource {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_rows<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>, RegistryError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl RowSource for JsonFileRowSource {
    async fn transactions(&self, account: &Account) -> Result<Vec<TransactionRow>, RegistryError> {
        let rows: Vec<TransactionRow> = read_rows(self.transactions.as_deref()).await?;
        let total = rows.len();
        let kept: Vec<_> = rows
            .into_iter()
            .filter(|r| !r.is_reverted())
            .filter(|r| {
                account.address.matches(&r.from_address)
                    || r.to_address.as_deref().is_some_and(|to| account.address.matches(to))
            })
            .filter(|r| account.query_range.contains(&r.block_timestamp()))
            .collect();
        debug!(address = %account.address, total, kept = kept.len(), "loaded transactions");
        Ok(kept)
    }

    async fn logs(&self, account: &Account) -> Result<Vec<LogRow>, RegistryError> {
        let rows: Vec<LogRow> = read_rows(self.logs.as_deref()).await?;
        let total = rows.len();
        let kept: Vec<_> = rows
            .into_iter()
            .filter(|r| account.address.matches(&r.address))
            .filter(|r| account.query_range.contains(&r.block_timestamp()))
            .collect();
        debug!(address = %account.address, total, kept = kept.len(), "loaded logs");
        Ok(kept)
    }
}

#[async_trait]
impl CreationSource for JsonFileRowSource {
    async fn deployed_at(&self, address: &Address) -> Result<Option<DateTime<Utc>>, RegistryError> {
        let rows: Vec<ContractEntry> = read_rows(self.contracts.as_deref()).await?;
        Ok(rows
            .into_iter()
            .filter(|r| address.matches(&r.address))
            .map(|r| r.block_timestamp)
            .min())
    }

    async fn created_by_trace(
        &self,
        address: &Address,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        let rows: Vec<TraceEntry> = read_rows(self.traces.as_deref()).await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.trace_type == "create")
            .filter(|r| r.to_address.as_deref().is_some_and(|to| address.matches(to)))
            .map(|r| r.block_timestamp)
            .min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::QueryRange;

    const CONTRACT: &str = "0x1f52b87c3503e537853e160adbf7e330ea0be7c4";

    fn write_rows(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("abiframe-{name}-{}.json", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    fn tx_json() -> &'static str {
        r#"[
          {"transaction_hash":"0x01","block_timestamp":"2019-01-28T10:00:00Z",
           "from_address":"0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51",
           "to_address":"0x1F52B87C3503E537853E160ADBF7E330EA0BE7C4","value":"0"},
          {"transaction_hash":"0x02","block_timestamp":"2019-01-29T23:59:59Z",
           "from_address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4",
           "to_address":null,"value":"0"},
          {"transaction_hash":"0x03","block_timestamp":"2019-01-30T00:00:00Z",
           "from_address":"0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51",
           "to_address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","value":"0"},
          {"transaction_hash":"0x04","block_timestamp":"2019-01-29T12:00:00Z",
           "from_address":"0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51",
           "to_address":"0x0000000000000000000000000000000000000001","value":"0"},
          {"transaction_hash":"0x05","block_timestamp":"2019-01-29T13:00:00Z",
           "from_address":"0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51",
           "to_address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","value":"0",
           "receipt_status":0},
          {"transaction_hash":"0x06","block_timestamp":"2019-01-29T14:00:00Z",
           "from_address":"0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51",
           "to_address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","value":"0",
           "receipt_status":1}
        ]"#
    }

    fn hashes<R>(rows: &[R], f: impl Fn(&R) -> &str) -> Vec<String> {
        rows.iter().map(|r| f(r).to_string()).collect()
    }

    #[tokio::test]
    async fn filters_transactions_by_address_either_side() {
        let source = JsonFileRowSource::new().with_transactions(write_rows("tx-all", tx_json()));
        let account = Account::new(CONTRACT).unwrap();
        let rows = source.transactions(&account).await.unwrap();
        assert_eq!(
            hashes(&rows, |r| r.transaction_hash.as_str()),
            ["0x01", "0x02", "0x03", "0x06"]
        );
    }

    #[tokio::test]
    async fn drops_reverted_transactions() {
        let source = JsonFileRowSource::new().with_transactions(write_rows("tx-status", tx_json()));
        let rows = source.transactions(&Account::new(CONTRACT).unwrap()).await.unwrap();
        assert!(rows.iter().all(|r| r.transaction_hash != "0x05"));
        assert!(rows.iter().all(|r| !r.is_reverted()));
    }

    #[tokio::test]
    async fn applies_query_range() {
        let source = JsonFileRowSource::new().with_transactions(write_rows("tx-range", tx_json()));
        let account = Account::new(CONTRACT)
            .unwrap()
            .with_range(QueryRange::parse(Some("2019-01-29"), Some("2019-01-29")).unwrap());
        let rows = source.transactions(&account).await.unwrap();
        assert_eq!(hashes(&rows, |r| r.transaction_hash.as_str()), ["0x02", "0x06"]);
    }

    #[tokio::test]
    async fn filters_logs_by_emitter() {
        let path = write_rows(
            "logs",
            r#"[
              {"transaction_hash":"0x0a","block_timestamp":"2019-01-28T10:00:00Z",
               "address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","topics":[],"transaction_data":"0x"},
              {"transaction_hash":"0x0b","block_timestamp":"2019-01-28T10:00:00Z",
               "address":"0x0000000000000000000000000000000000000001","topics":[],"transaction_data":"0x"}
            ]"#,
        );
        let source = JsonFileRowSource::new().with_logs(path);
        let rows = source.logs(&Account::new(CONTRACT).unwrap()).await.unwrap();
        assert_eq!(hashes(&rows, |r| r.transaction_hash.as_str()), ["0x0a"]);
    }

    #[tokio::test]
    async fn unconfigured_source_is_empty() {
        let source = JsonFileRowSource::new();
        let account = Account::new(CONTRACT).unwrap();
        assert!(source.logs(&account).await.unwrap().is_empty());
        assert!(source.deployed_at(&account.address).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn creation_lookups_read_contracts_and_create_traces() {
        let contracts = write_rows(
            "contracts",
            r#"[
              {"address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","block_timestamp":"2018-11-02T08:15:00Z"},
              {"address":"0x0000000000000000000000000000000000000001","block_timestamp":"2016-01-01T00:00:00Z"}
            ]"#,
        );
        let traces = write_rows(
            "traces",
            r#"[
              {"to_address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","trace_type":"call","block_timestamp":"2017-01-01T00:00:00Z"},
              {"to_address":"0x1f52b87c3503e537853e160adbf7e330ea0be7c4","trace_type":"create","block_timestamp":"2018-11-02T08:15:00Z"}
            ]"#,
        );
        let source = JsonFileRowSource::new()
            .with_contracts(contracts)
            .with_traces(traces);
        let address = Address::parse(CONTRACT).unwrap();
        let expected = "2018-11-02T08:15:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(source.deployed_at(&address).await.unwrap(), Some(expected));
        assert_eq!(source.created_by_trace(&address).await.unwrap(), Some(expected));

        let other = Address::parse("0x0000000000000000000000000000000000000002").unwrap();
        assert!(source.deployed_at(&other).await.unwrap().is_none());
        assert!(source.created_by_trace(&other).await.unwrap().is_none());
    }
}
