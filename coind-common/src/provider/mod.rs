//! Tools to synthesize coin blocks from deposits and to look them up afterward.

mod faux_provider;
mod interface;
mod registry;
mod synthetic_chain_provider;

pub use faux_provider::FauxProvider;
#[cfg(any(test, feature = "test_tools"))]
pub use interface::MockProvider;
pub use interface::{Provider, ProviderError};
pub use registry::{ProviderRegistry, RegistryError};
pub use synthetic_chain_provider::{SkyProvider, SyntheticChainProvider, WavesProvider};
