//! Backend selection.

use serde::{Deserialize, Serialize};

use crate::{
    SolarError,
    config::Endpoints,
    contract::{Address, AddressFormat},
};

/// The blockchain backend a deployment targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Platform {
    /// The sicash UTXO chain. Takes priority when both endpoints are set.
    Sicash,
    /// An ethereum JSON-RPC node.
    Ethereum,
}

impl Platform {
    /// Pick the backend from the configured endpoints.
    pub fn resolve(endpoints: &Endpoints) -> Result<Self, SolarError> {
        Self::select(endpoints).map(|(platform, _)| platform)
    }

    /// Pick the backend together with the endpoint that selected it.
    ///
    /// Shared by [`Platform::resolve`] and the deployer factory so both agree
    /// on the tie-break.
    pub fn select(endpoints: &Endpoints) -> Result<(Self, &str), SolarError> {
        if let Some(url) = endpoints.sicash() {
            return Ok((Platform::Sicash, url));
        }

        endpoints
            .eth()
            .map(|url| (Platform::Ethereum, url))
            .ok_or(SolarError::UnspecifiedEndpoint)
    }

    /// Whether addresses on this platform are rendered with a `0x` prefix.
    pub fn address_format(&self) -> AddressFormat {
        match self {
            Platform::Sicash => AddressFormat::Plain,
            Platform::Ethereum => AddressFormat::Prefixed,
        }
    }

    /// Render an address the way this platform's tooling expects it.
    pub fn render(&self, address: &Address) -> String {
        address.format(self.address_format())
    }
}
