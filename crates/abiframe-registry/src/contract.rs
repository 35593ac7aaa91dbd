//! A contract account: its schema plus its decoded transactions and logs.

use abiframe_core::{ContractSchema, DecodedLog, DecodedTable, DecodedTransaction};
use abiframe_evm::RowAssembler;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::abi_source::AbiSource;
use crate::account::Account;
use crate::cache::SchemaCache;
use crate::error::RegistryError;
use crate::rows::{CreationSource, RowSource};

/// Creation date reported when no source knows the contract.
pub fn unknown_creation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// The collaborators a [`Contract`] pulls from. Cheap to clone.
#[derive(Clone)]
pub struct Sources {
    pub abi: Arc<dyn AbiSource>,
    pub rows: Arc<dyn RowSource>,
    pub creation: Option<Arc<dyn CreationSource>>,
    pub schemas: SchemaCache,
}

impl Sources {
    pub fn new(abi: Arc<dyn AbiSource>, rows: Arc<dyn RowSource>) -> Self {
        Self {
            abi,
            rows,
            creation: None,
            schemas: SchemaCache::new(),
        }
    }

    pub fn with_creation(mut self, creation: Arc<dyn CreationSource>) -> Self {
        self.creation = Some(creation);
        self
    }
}

pub struct Contract {
    pub account: Account,
    sources: Sources,
    creation_date: OnceCell<NaiveDate>,
}

impl Contract {
    pub fn new(account: Account, sources: Sources) -> Self {
        Self {
            account,
            sources,
            creation_date: OnceCell::new(),
        }
    }

    /// Deployment date, looked up once: the contracts dataset first, then
    /// `create` traces, else 1970-01-01 with a warning.
    pub async fn creation_date(&self) -> Result<NaiveDate, RegistryError> {
        self.creation_date
            .get_or_try_init(|| self.lookup_creation_date())
            .await
            .copied()
    }

    async fn lookup_creation_date(&self) -> Result<NaiveDate, RegistryError> {
        let address = &self.account.address;
        if let Some(source) = &self.sources.creation {
            if let Some(at) = source.deployed_at(address).await? {
                return Ok(at.date_naive());
            }
            debug!(%address, "not in the contracts dataset; searching create traces");
            if let Some(at) = source.created_by_trace(address).await? {
                return Ok(at.date_naive());
            }
        }
        let fallback = unknown_creation_date();
        warn!(%address, %fallback, "contract creation date not found");
        Ok(fallback)
    }

    /// The contract's schema, fetched on first use.
    pub async fn schema(&self) -> Result<Arc<ContractSchema>, RegistryError> {
        self.sources
            .schemas
            .get_or_fetch(&self.account.address, self.sources.abi.as_ref())
            .await
    }

    pub async fn decoded_transactions(
        &self,
    ) -> Result<DecodedTable<DecodedTransaction>, RegistryError> {
        let schema = self.schema().await?;
        let rows = self.sources.rows.transactions(&self.account).await?;
        let table = RowAssembler::new(&schema).decode_transactions(&rows);
        info!(
            address = %self.account.address,
            rows = table.len(),
            warnings = table.warnings.len(),
            "decoded contract transactions"
        );
        Ok(table)
    }

    pub async fn decoded_logs(&self) -> Result<DecodedTable<DecodedLog>, RegistryError> {
        let schema = self.schema().await?;
        let rows = self.sources.rows.logs(&self.account).await?;
        let table = RowAssembler::new(&schema).decode_logs(&rows);
        info!(
            address = %self.account.address,
            rows = table.len(),
            warnings = table.warnings.len(),
            "decoded contract logs"
        );
        Ok(table)
    }
}
