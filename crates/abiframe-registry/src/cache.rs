//! In-memory schema cache keyed by contract address.
//!
//! Thread-safe via `Arc<RwLock<..>>`; clones share the same entries.

use abiframe_core::ContractSchema;
use abiframe_evm::build_schema;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::abi_source::AbiSource;
use crate::account::Address;
use crate::error::RegistryError;

#[derive(Clone, Default)]
pub struct SchemaCache {
    inner: Arc<RwLock<HashMap<Address, Arc<ContractSchema>>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<Arc<ContractSchema>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(address)
            .cloned()
    }

    /// Insert a schema. An existing entry for the address is kept and returned.
    pub fn insert(&self, address: Address, schema: ContractSchema) -> Arc<ContractSchema> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner
            .entry(address)
            .or_insert_with(|| Arc::new(schema))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached schema for `address`, fetching and building it on a miss.
    ///
    /// The fetch runs without holding the lock; concurrent misses may both
    /// fetch and the first insert wins. An address with no published ABI
    /// is cached as an empty schema so its rows pass through undecoded.
    pub async fn get_or_fetch(
        &self,
        address: &Address,
        source: &dyn AbiSource,
    ) -> Result<Arc<ContractSchema>, RegistryError> {
        if let Some(hit) = self.get(address) {
            return Ok(hit);
        }

        let schema = match source.fetch_abi(address).await {
            Ok(json) => build_schema(&json)?,
            Err(e) if e.is_not_found() => {
                warn!(%address, error = %e, "no ABI available; rows will not be decoded");
                ContractSchema::default()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(
            %address,
            functions = schema.functions.len(),
            events = schema.events.len(),
            "cached contract schema"
        );
        Ok(self.insert(address.clone(), schema))
    }
}
