//! Resolved settings of a solar invocation.

use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::SolarError;

/// Environment used when none is given.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// The two backend endpoints. Only one is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// RPC endpoint of the sicash node (backend A).
    pub sicash_rpc: Option<String>,
    /// RPC endpoint of the ethereum node (backend B).
    pub eth_rpc: Option<String>,
}

impl Endpoints {
    /// The sicash endpoint, if set to a non-empty value.
    pub fn sicash(&self) -> Option<&str> {
        non_empty(self.sicash_rpc.as_deref())
    }

    /// The ethereum endpoint, if set to a non-empty value.
    pub fn eth(&self) -> Option<&str> {
        non_empty(self.eth_rpc.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Immutable configuration snapshot, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoints.
    pub endpoints: Endpoints,
    /// Environment name, used to derive the repository file name.
    pub environment: String,
    /// Explicit repository path, overriding `solar.<environment>.json`.
    pub repo: Option<PathBuf>,
    /// Sender address used by the sicash backend.
    pub sender: String,
    /// Whether solc should run its bytecode optimizer.
    pub optimize: bool,
    /// Comma separated list of paths solc may import from.
    pub allow_paths: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            repo: None,
            sender: String::new(),
            optimize: true,
            allow_paths: String::new(),
        }
    }
}

impl Config {
    /// Path of the contracts repository file.
    ///
    /// The explicit override wins; otherwise `solar.<environment>.json`.
    pub fn repository_path(&self) -> PathBuf {
        match &self.repo {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => PathBuf::from(format!("solar.{}.json", self.environment)),
        }
    }

    /// Resolve the options passed to the solidity compiler.
    ///
    /// An empty `allow_paths` falls back to the current working directory.
    pub fn compiler_options(&self) -> Result<CompilerOptions, SolarError> {
        let allow_paths = if self.allow_paths.is_empty() {
            let cwd = std::env::current_dir().map_err(|e| SolarError::CompilerOptions(Arc::new(e)))?;
            vec![cwd.to_string_lossy().into_owned()]
        } else {
            self.allow_paths.split(',').map(String::from).collect()
        };

        Ok(CompilerOptions {
            no_optimize: !self.optimize,
            allow_paths,
        })
    }
}

/// Options forwarded to solc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    pub no_optimize: bool,
    pub allow_paths: Vec<String>,
}
