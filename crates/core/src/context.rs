//! Process-wide state shared by every solar task.

use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;
use url::Url;

use crate::{
    Collaborators, CompilerOptions, Config, Platform, RpcCollaborators, SolarError,
    contract::{Address, AddressFormat, ContractsRepository},
    deployer::Deployer,
    expand::expand,
    reporter::Reporter,
    rpc::RpcClient,
};

/// Shared context of a solar invocation.
///
/// Built once at startup and passed by reference to the tasks. The deployer,
/// the contracts repository and the event reporter are created on first
/// access, at most once, even when first accessed concurrently; later callers
/// get the same instance.
pub struct SolarContext {
    config: Config,
    collaborators: Box<dyn Collaborators>,
    address_format: OnceLock<AddressFormat>,

    // The first outcome is kept, failures included: construction never reruns.
    deployer: OnceCell<Result<Arc<dyn Deployer>, SolarError>>,
    repo: OnceCell<Result<Arc<ContractsRepository>, SolarError>>,
    reporter: OnceCell<Arc<Reporter>>,
}

impl SolarContext {
    /// Create a context backed by the production collaborators.
    pub fn new(config: Config) -> Self {
        Self::with_collaborators(config, RpcCollaborators)
    }

    /// Create a context backed by custom collaborators.
    pub fn with_collaborators(config: Config, collaborators: impl Collaborators) -> Self {
        Self {
            config,
            collaborators: Box::new(collaborators),
            address_format: OnceLock::new(),
            deployer: OnceCell::new(),
            repo: OnceCell::new(),
            reporter: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The backend selected by the configured endpoints.
    pub fn platform(&self) -> Result<Platform, SolarError> {
        Platform::resolve(&self.config.endpoints)
    }

    pub fn compiler_options(&self) -> Result<CompilerOptions, SolarError> {
        self.config.compiler_options()
    }

    /// Fix how addresses are rendered for the rest of the process.
    ///
    /// Addresses get a `0x` prefix when the ethereum backend is selected.
    /// Without any endpoint the plain format is kept. Only the first call has
    /// an effect.
    pub fn configure_address_format(&self) -> AddressFormat {
        let format = *self.address_format.get_or_init(|| {
            self.platform()
                .map(|platform| platform.address_format())
                .unwrap_or_default()
        });

        tracing::debug!(?format, "Address output format configured");
        format
    }

    /// The address format in force.
    pub fn address_format(&self) -> AddressFormat {
        self.address_format.get().copied().unwrap_or_default()
    }

    /// Render an address under the configured format.
    pub fn format_address(&self, address: &Address) -> String {
        address.format(self.address_format())
    }

    /// The contracts repository, opened on first use.
    ///
    /// Opens the configured override path, or `solar.<env>.json`. A failed
    /// open is not retried; every caller gets the same error.
    pub async fn contracts_repository(&self) -> Result<Arc<ContractsRepository>, SolarError> {
        self.repo
            .get_or_init(|| self.open_repository())
            .await
            .clone()
    }

    async fn open_repository(&self) -> Result<Arc<ContractsRepository>, SolarError> {
        let path = self.config.repository_path();

        let repo = self
            .collaborators
            .open_repository(&path)
            .map_err(|cause| SolarError::RepositoryOpen {
                path: path.clone(),
                cause: Arc::new(cause),
            })?;

        tracing::debug!(path = %path.display(), "Contracts repository opened");
        Ok(Arc::new(repo))
    }

    /// The event reporter, started on first use.
    pub async fn reporter(&self) -> Arc<Reporter> {
        self.reporter
            .get_or_init(|| async { Arc::new(Reporter::start(self.collaborators.event_handler())) })
            .await
            .clone()
    }

    /// The deployer for the selected backend, built on first use.
    ///
    /// Like the repository, a failed construction is returned again to every
    /// later caller.
    pub async fn deployer(&self) -> Result<Arc<dyn Deployer>, SolarError> {
        self.deployer
            .get_or_init(|| self.build_deployer())
            .await
            .clone()
    }

    /// A JSON-RPC client for the selected endpoint.
    pub fn rpc_client(&self) -> Result<RpcClient, SolarError> {
        let (platform, url) = self.endpoint()?;

        let client = RpcClient::new(url).map_err(|e| SolarError::RpcClient(Arc::new(e)))?;
        tracing::debug!(%platform, "RPC client ready");
        Ok(client)
    }

    /// The selected backend and its parsed endpoint.
    fn endpoint(&self) -> Result<(Platform, Url), SolarError> {
        let (platform, raw_url) = Platform::select(&self.config.endpoints)?;

        let url = Url::parse(raw_url).map_err(|source| SolarError::InvalidEndpoint {
            url: raw_url.to_string(),
            source,
        })?;
        Ok((platform, url))
    }

    async fn build_deployer(&self) -> Result<Arc<dyn Deployer>, SolarError> {
        let (platform, url) = self.endpoint()?;
        let host = url.host_str().unwrap_or_default().to_string();

        let repo = self.contracts_repository().await?;

        let deployer = match platform {
            Platform::Sicash => {
                self.collaborators
                    .new_sicash_deployer(url, repo, &self.config.sender)
            }
            Platform::Ethereum => self.collaborators.new_eth_deployer(url, repo),
        }
        .map_err(|e| SolarError::DeployerConstruction(Arc::new(e)))?;

        tracing::info!(%platform, host = %host, "Deployer ready");
        Ok(deployer)
    }

    /// Expand `$Name` and `${Name}` placeholders into contract addresses.
    ///
    /// Addresses are rendered under the configured format.
    pub async fn expand_template(&self, template: &str) -> Result<String, SolarError> {
        let repo = self.contracts_repository().await?;
        let format = self.address_format();

        expand(template, |name| {
            repo.get(name).map(|contract| contract.address.format(format))
        })
    }

    /// Stop the reporter, if it was started, after draining queued events.
    pub async fn shutdown(&self) {
        if let Some(reporter) = self.reporter.get() {
            let processed = reporter.shutdown().await;
            tracing::debug!(processed, "Context shut down");
        }
    }
}
