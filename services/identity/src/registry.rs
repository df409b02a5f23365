//! Provider registry: configured providers plus the adapters that talk to them.

use std::collections::HashMap;
use std::sync::Arc;

use passway_domain::provider::{Provider, ProviderType};

use crate::domain::provider::ProviderAdapter;
use crate::infra::oauth::HttpOAuthAdapter;

/// Immutable after startup; shared through `AppState` behind an `Arc`.
///
/// Listing preserves configuration order so the login page renders buttons
/// the way operators arranged them.
pub struct ProviderRegistry {
    providers: Vec<Provider>,
    by_slug: HashMap<String, usize>,
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Build the registry and one HTTP adapter per OAuth2 provider.
    ///
    /// Fails on duplicate slugs and on OAuth2 providers without settings,
    /// both of which are configuration mistakes that should abort startup.
    pub fn from_config(providers: Vec<Provider>, http: reqwest::Client) -> anyhow::Result<Self> {
        let mut by_slug = HashMap::with_capacity(providers.len());
        let mut adapters: HashMap<String, Arc<dyn ProviderAdapter>> = HashMap::new();

        for (idx, provider) in providers.iter().enumerate() {
            if by_slug.insert(provider.slug.clone(), idx).is_some() {
                anyhow::bail!("duplicate provider slug `{}`", provider.slug);
            }
            if provider.kind == ProviderType::Oauth2 {
                let settings = provider.oauth2.clone().ok_or_else(|| {
                    anyhow::anyhow!("provider `{}` is oauth2 but has no oauth2 settings", provider.slug)
                })?;
                adapters.insert(
                    provider.slug.clone(),
                    Arc::new(HttpOAuthAdapter::new(settings, http.clone())),
                );
            }
        }

        Ok(Self {
            providers,
            by_slug,
            adapters,
        })
    }

    pub fn lookup(&self, slug: &str) -> Option<&Provider> {
        self.by_slug.get(slug).map(|&idx| &self.providers[idx])
    }

    /// Active providers in configuration order.
    pub fn list_active(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter().filter(|p| p.is_active())
    }

    pub fn adapter(&self, slug: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(slug).cloned()
    }

    /// Install a custom adapter for a configured provider, replacing any
    /// default one. This is how non-OAuth2 providers get exchange support.
    pub fn register_adapter(&mut self, slug: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(slug.into(), adapter);
    }
}
