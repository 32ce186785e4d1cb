//! Error taxonomy of the orchestration core.

use std::{path::PathBuf, sync::Arc};

/// Errors surfaced by [`crate::SolarContext`] and the expansion engine.
///
/// Everything except [`SolarError::UnknownPlaceholder`] is fatal for the process:
/// the binary reports it and exits. An unknown placeholder only aborts the
/// expansion that hit it.
///
/// Causes are shared so that a failed lazy construction can be handed to
/// every later caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SolarError {
    /// Neither backend endpoint is configured.
    #[error(
        "Please specify RPC url by setting SICASH_RPC or ETH_RPC or using flag --sicash_rpc or --eth_rpc"
    )]
    UnspecifiedEndpoint,

    /// The selected endpoint is not an absolute URL.
    #[error("Invalid RPC url: {url:?}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The contracts repository file could not be opened.
    #[error("error opening contracts repo file {}: {cause:#}", path.display())]
    RepositoryOpen {
        path: PathBuf,
        cause: Arc<anyhow::Error>,
    },

    /// The backend refused to build a deployer.
    #[error("NewDeployer error: {0:#}")]
    DeployerConstruction(Arc<anyhow::Error>),

    /// The RPC client for the selected endpoint could not be built.
    #[error("RPC client: {0:#}")]
    RpcClient(Arc<anyhow::Error>),

    /// A template referenced a contract name missing from the repository.
    #[error("Invalid address expansion: {0}")]
    UnknownPlaceholder(String),

    /// Compiler options could not be resolved.
    #[error("solc options: {0}")]
    CompilerOptions(#[source] Arc<std::io::Error>),

    /// The event reporter has been shut down.
    #[error("event reporter is closed")]
    ReporterClosed,
}
