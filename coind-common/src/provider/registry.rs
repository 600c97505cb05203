use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::provider::Provider;

/// [ProviderRegistry] related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No provider is registered for the coin type.
    #[error("no provider for {0} exists")]
    UnknownCoinType(String),
}

/// Coin type to [Provider] mapping.
///
/// Filled before serving then shared read only, registration needs exclusive access.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder flavor of [register][Self::register].
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    /// Register the provider under its coin type, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        let coin_type = provider.coin_type().to_string();
        debug!(coin_type = %coin_type, name = provider.name(), "Registering provider");

        if let Some(replaced) = self.providers.insert(coin_type.clone(), provider) {
            warn!(
                coin_type = %coin_type,
                replaced = replaced.name(),
                "A provider was already registered for this coin type, it has been replaced"
            );
        }
    }

    /// Provider registered for the coin type
    pub fn lookup(&self, coin_type: &str) -> Result<Arc<dyn Provider>, RegistryError> {
        self.providers
            .get(coin_type)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCoinType(coin_type.to_string()))
    }

    /// Registered coin types, sorted
    pub fn coin_types(&self) -> Vec<String> {
        let mut coin_types: Vec<String> = self.providers.keys().cloned().collect();
        coin_types.sort();
        coin_types
    }

    /// Unregister every provider
    pub fn clear(&mut self) {
        self.providers.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::{FauxProvider, MockProvider};

    use super::*;

    fn mock_provider(name: &str, coin_type: &str) -> Arc<dyn Provider> {
        let mut provider = MockProvider::new();
        provider.expect_name().return_const(name.to_string());
        provider
            .expect_coin_type()
            .return_const(coin_type.to_string());

        Arc::new(provider)
    }

    #[test]
    fn lookup_of_an_unregistered_coin_type_fails() {
        let registry = ProviderRegistry::new().with_provider(Arc::new(FauxProvider));

        let error = registry
            .lookup("ETH")
            .err()
            .expect("lookup should fail for an unregistered coin type");

        assert_eq!(RegistryError::UnknownCoinType("ETH".to_string()), error);
        assert_eq!("no provider for ETH exists", error.to_string());
    }

    #[test]
    fn lookup_returns_the_registered_provider() {
        let registry = ProviderRegistry::new()
            .with_provider(mock_provider("skycoin", "SKY"))
            .with_provider(mock_provider("waves", "WAVES"));

        assert_eq!("waves", registry.lookup("WAVES").unwrap().name());
        assert_eq!(vec!["SKY", "WAVES"], registry.coin_types());
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = ProviderRegistry::new();
        registry.register(mock_provider("first", "SKY"));
        registry.register(mock_provider("second", "SKY"));

        assert_eq!("second", registry.lookup("SKY").unwrap().name());
        assert_eq!(1, registry.coin_types().len());
    }

    #[test]
    fn clear_unregisters_every_provider() {
        let mut registry = ProviderRegistry::new()
            .with_provider(mock_provider("skycoin", "SKY"))
            .with_provider(Arc::new(FauxProvider));

        registry.clear();

        assert!(registry.coin_types().is_empty());
        assert!(registry.lookup("SKY").is_err());
    }
}
