//! Constructors for the stateful collaborators the context materializes.

use std::{path::Path, sync::Arc};

use anyhow::Result;
use url::Url;

use crate::{
    contract::ContractsRepository,
    deployer::{Deployer, EthDeployer, SicashDeployer},
    reporter::{EventHandler, log_event},
};

/// Factory for everything [`crate::SolarContext`] builds lazily.
///
/// Each method is called at most once per context.
pub trait Collaborators: Send + Sync + 'static {
    /// Open the contracts repository stored at `path`.
    fn open_repository(&self, path: &Path) -> Result<ContractsRepository>;

    /// Build a deployer for a sicash node.
    fn new_sicash_deployer(
        &self,
        url: Url,
        repo: Arc<ContractsRepository>,
        sender: &str,
    ) -> Result<Arc<dyn Deployer>>;

    /// Build a deployer for an ethereum node.
    fn new_eth_deployer(&self, url: Url, repo: Arc<ContractsRepository>)
    -> Result<Arc<dyn Deployer>>;

    /// Consumer for reported events.
    fn event_handler(&self) -> EventHandler {
        Box::new(log_event)
    }
}

/// Production collaborators: a JSON file repository and JSON-RPC deployers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RpcCollaborators;

impl Collaborators for RpcCollaborators {
    fn open_repository(&self, path: &Path) -> Result<ContractsRepository> {
        ContractsRepository::open(path)
    }

    fn new_sicash_deployer(
        &self,
        url: Url,
        repo: Arc<ContractsRepository>,
        sender: &str,
    ) -> Result<Arc<dyn Deployer>> {
        Ok(Arc::new(SicashDeployer::new(url, repo, sender)?))
    }

    fn new_eth_deployer(
        &self,
        url: Url,
        repo: Arc<ContractsRepository>,
    ) -> Result<Arc<dyn Deployer>> {
        Ok(Arc::new(EthDeployer::new(url, repo)?))
    }
}
