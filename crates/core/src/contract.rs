//! Contracts repository: the persisted record of deployed contracts.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{PoisonError, RwLock},
};

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

/// How addresses are rendered as strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AddressFormat {
    /// Bare lowercase hex, as sicash expects.
    #[default]
    Plain,
    /// `0x`-prefixed lowercase hex, as ethereum expects.
    Prefixed,
}

/// Raw address of a deployed contract.
///
/// There is no `Display`: rendering always names an [`AddressFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deref, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Bytes);

impl Address {
    /// Render the address under the given format.
    pub fn format(&self, format: AddressFormat) -> String {
        let hex = hex::encode(&self.0);
        match format {
            AddressFormat::Plain => hex,
            AddressFormat::Prefixed => format!("0x{}", hex),
        }
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    /// Parses hex with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(Bytes::from(hex::decode(raw)?)))
    }
}

/// A contract recorded in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    /// Name the contract is deployed under.
    pub name: String,
    /// Address the contract lives at.
    pub address: Address,
    /// Hash of the creation transaction.
    pub tx_hash: String,
    /// Address that paid for the deployment, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Unix timestamp of the deployment.
    pub deployed_at: u64,
    /// Whether the creation transaction is known to be mined.
    #[serde(default)]
    pub confirmed: bool,
}

/// Name to contract mapping backed by a JSON file.
///
/// Reads go through an in-memory copy; [`ContractsRepository::commit`] writes
/// it back.
#[derive(Debug)]
pub struct ContractsRepository {
    path: PathBuf,
    contracts: RwLock<BTreeMap<String, DeployedContract>>,
}

impl ContractsRepository {
    /// Open the repository at `path`.
    ///
    /// A missing file yields an empty repository that is created on the first
    /// commit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let contracts = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content).context("Failed to parse contracts repository")?
        } else {
            tracing::debug!(path = %path.display(), "Contracts repository not found, starting empty");
            BTreeMap::new()
        };

        Ok(Self {
            path,
            contracts: RwLock::new(contracts),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a contract by name.
    pub fn get(&self, name: &str) -> Option<DeployedContract> {
        self.read().get(name).cloned()
    }

    /// Whether a contract is recorded under `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Record a contract, replacing any previous entry with the same name.
    pub fn set(&self, contract: DeployedContract) {
        self.contracts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(contract.name.clone(), contract);
    }

    /// All recorded contracts, sorted by name.
    pub fn contracts(&self) -> Vec<DeployedContract> {
        self.read().values().cloned().collect()
    }

    /// Persist the repository to its backing file.
    pub fn commit(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.read())
            .context("Failed to serialize contracts repository")?;

        // Write to a sibling file first so a crash never leaves a truncated repository.
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "Contracts repository saved");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, DeployedContract>> {
        self.contracts.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn token() -> DeployedContract {
        DeployedContract {
            name: "Token".to_string(),
            address: "0xabc0000000000000000000000000000000000001".parse().unwrap(),
            tx_hash: "0x1234".to_string(),
            sender: None,
            deployed_at: 1737316800,
            confirmed: true,
        }
    }

    #[test]
    fn test_address_format() {
        let address: Address = "ABC0000000000000000000000000000000000001".parse().unwrap();

        assert_eq!(
            address.format(AddressFormat::Plain),
            "abc0000000000000000000000000000000000001"
        );
        assert_eq!(
            address.format(AddressFormat::Prefixed),
            "0xabc0000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_address_invalid_hex() {
        assert!("0xnothex".parse::<Address>().is_err());
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let repo = ContractsRepository::open(temp_dir.path().join("solar.development.json"))
            .expect("Failed to open repository");

        assert!(repo.contracts().is_empty());
        assert!(repo.get("Token").is_none());
    }

    #[test]
    fn test_commit_and_reopen() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join("solar.development.json");

        let repo = ContractsRepository::open(&path).unwrap();
        repo.set(token());
        assert!(repo.exists("Token"));
        repo.commit().expect("Failed to commit");

        let reopened = ContractsRepository::open(&path).unwrap();
        assert_eq!(reopened.get("Token"), Some(token()));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_open_corrupted_file() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join("solar.development.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(ContractsRepository::open(&path).is_err());
    }

    #[test]
    fn test_contracts_sorted_by_name() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let repo = ContractsRepository::open(temp_dir.path().join("repo.json")).unwrap();

        repo.set(DeployedContract {
            name: "Wallet".to_string(),
            ..token()
        });
        repo.set(token());

        let names: Vec<_> = repo.contracts().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Token", "Wallet"]);
    }
}
