//! solar-core - Orchestration core of the solar contract deployment tool.
//!
//! This crate resolves which backend to deploy to, lazily builds the
//! collaborators a deployment needs (deployer, contracts repository, event
//! reporter), and expands contract-name placeholders in deployment parameters.

mod collaborators;
mod config;
mod context;
mod error;
mod platform;

pub mod contract;
pub mod deployer;
pub mod expand;
pub mod reporter;
pub mod rpc;

pub use collaborators::{Collaborators, RpcCollaborators};
pub use config::{CompilerOptions, Config, DEFAULT_ENVIRONMENT, Endpoints};
pub use context::SolarContext;
pub use contract::{Address, AddressFormat, ContractsRepository, DeployedContract};
pub use deployer::{DeployRequest, Deployer};
pub use error::SolarError;
pub use platform::Platform;
pub use reporter::{Event, EventHandler, Reporter};
pub use rpc::RpcClient;
