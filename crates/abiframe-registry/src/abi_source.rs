//! Where contract ABIs come from.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::account::Address;
use crate::error::RemoteError;

/// Fetches the ABI JSON document published for a contract.
///
/// Implementations include `FileAbiSource` and, with the `remote` feature,
/// `EtherscanSource`.
#[async_trait]
pub trait AbiSource: Send + Sync {
    /// Returns the raw ABI JSON (a JSON array of entries).
    async fn fetch_abi(&self, address: &Address) -> Result<String, RemoteError>;
}

/// Reads `<address>.json` files from a directory.
#[derive(Debug, Clone)]
pub struct FileAbiSource {
    dir: PathBuf,
}

impl FileAbiSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, address: &Address) -> PathBuf {
        self.dir.join(format!("{address}.json"))
    }
}

#[async_trait]
impl AbiSource for FileAbiSource {
    async fn fetch_abi(&self, address: &Address) -> Result<String, RemoteError> {
        let path = self.path_for(address);
        debug!(path = %path.display(), "reading ABI file");
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RemoteError::NotFound {
                address: address.to_string(),
            }),
            Err(e) => Err(RemoteError::InvalidResponse {
                service: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
