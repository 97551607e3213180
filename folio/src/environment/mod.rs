use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use folio_api_rest::RestServerConfig;
use folio_config::Config;
use folio_core_contact_impl::ContactFeatureConfig;
use folio_core_health_impl::HealthFeatureConfig;
use folio_di::provider;
use folio_extern_impl::{contact::ContactApiServiceConfig, http::HttpClient};
use folio_form::ContactFormConfig;
use types::Email;
use url::Url;

pub mod types;

provider! {
    /// The default provider, capable of providing everything `serve` needs
    pub Provider {
        email: Email,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Core
            ContactFeatureConfig,
            HealthFeatureConfig,
        }
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        Self {
            _cache: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Core
        contact_feature_config: ContactFeatureConfig,
        health_feature_config: HealthFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let rest_server_config = RestServerConfig {
            host: config.http.host,
            port: config.http.port,
            allowed_origins: config
                .http
                .allowed_origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin)
                        .with_context(|| format!("Invalid allowed origin: {origin:?}"))
                })
                .collect::<anyhow::Result<_>>()?,
        };

        // Core
        let contact_feature_config = ContactFeatureConfig {
            recipient: config.contact.recipient()?.into(),
            send_timeout: config.contact.send_timeout.into(),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
            ping_timeout: config.health.ping_timeout.into(),
        };

        Ok(Self {
            _cache: Default::default(),

            // API
            rest_server_config,

            // Core
            contact_feature_config,
            health_feature_config,
        })
    }
}

provider! {
    /// Provider for the contact form client used by `submit`
    pub ClientProvider {
        http_client: HttpClient,
        contact_api_service_config: ContactApiServiceConfig,
        contact_form_config: ContactFormConfig,
    }
}

impl ClientProvider {
    pub fn new(base_url: &Url, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            _cache: Default::default(),
            http_client: HttpClient::new(Some(timeout))?,
            contact_api_service_config: ContactApiServiceConfig::new(base_url)?,
            contact_form_config: ContactFormConfig::default(),
        })
    }
}
