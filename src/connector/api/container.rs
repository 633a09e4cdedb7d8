use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::{
    CredentialProvider, GenerativeLanguageService, InteractionLoop, ListModelsUseCase,
    ResponseCache, SessionOptions,
};
use crate::connector::adapter::{
    ChainedCredentialProvider, GeminiClient, MockGenerativeService, StaticCredentialProvider,
    TomlCredentialProvider,
};
use crate::domain::DomainError;

/// Key used when running against the mock service without any credential.
const MOCK_API_KEY: &str = "mock-api-key";

pub struct ContainerConfig {
    /// Key given on the command line or via `GEMINI_API_KEY`; wins over the file.
    pub api_key: Option<String>,
    pub credentials_path: PathBuf,
    pub base_url: String,
    pub temperature: f32,
    /// Use the offline mock service instead of the remote API.
    pub mock_model: bool,
    /// Memoize replies by (credential, prompt).
    pub cache_responses: bool,
}

pub struct Container {
    service: Arc<dyn GenerativeLanguageService>,
    api_key: Option<String>,
    credential_source: String,
    cache: Option<Arc<ResponseCache>>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let service: Arc<dyn GenerativeLanguageService> = if config.mock_model {
            debug!("Using mock generative service");
            Arc::new(MockGenerativeService::new())
        } else {
            debug!("Using Gemini API at {}", config.base_url);
            Arc::new(GeminiClient::new(config.base_url.clone())?)
        };

        let provider = ChainedCredentialProvider::new(vec![
            Box::new(StaticCredentialProvider::new(config.api_key.clone())),
            Box::new(TomlCredentialProvider::new(config.credentials_path.clone())),
        ]);
        let credential_source = provider.source();

        let api_key = match provider.api_key()? {
            Some(key) => Some(key),
            None if config.mock_model => Some(MOCK_API_KEY.to_string()),
            None => {
                warn!(
                    "No API key found (looked in: {}). Sends will fail until one is configured.",
                    credential_source
                );
                None
            }
        };

        let cache = config
            .cache_responses
            .then(|| Arc::new(ResponseCache::new()));

        Ok(Self {
            service,
            api_key,
            credential_source,
            cache,
            config,
        })
    }

    pub fn interaction_loop(&self) -> InteractionLoop {
        let options = SessionOptions::default().with_temperature(self.config.temperature);
        let interaction = InteractionLoop::new(self.service.clone(), self.api_key.clone())
            .with_options(options);

        match self.cache.clone() {
            Some(cache) => interaction.with_cache(cache),
            None => interaction,
        }
    }

    pub fn list_models_use_case(&self) -> ListModelsUseCase {
        ListModelsUseCase::new(self.service.clone())
    }

    /// The resolved key, or a configuration error naming where we looked.
    pub fn api_key(&self) -> Result<&str, DomainError> {
        self.api_key.as_deref().ok_or_else(|| {
            DomainError::configuration(format!(
                "API key not found (looked in: {})",
                self.credential_source
            ))
        })
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn temperature(&self) -> f32 {
        self.config.temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path) -> ContainerConfig {
        ContainerConfig {
            api_key: None,
            credentials_path: dir.join("credentials.toml"),
            base_url: "http://127.0.0.1:9".to_string(),
            temperature: 0.1,
            mock_model: false,
            cache_responses: false,
        }
    }

    #[test]
    fn test_missing_key_is_not_fatal() {
        let dir = tempdir().unwrap();
        let container = Container::new(config(dir.path())).unwrap();

        let err = container.api_key().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("credentials.toml"));
        assert_eq!(container.service_name(), "gemini");
    }

    #[test]
    fn test_flag_key_wins_over_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("credentials.toml"),
            "[gemini_ai]\napi_key = \"from-file\"\n",
        )
        .unwrap();

        let mut cfg = config(dir.path());
        assert_eq!(
            Container::new(config(dir.path())).unwrap().api_key().unwrap(),
            "from-file"
        );

        cfg.api_key = Some("from-flag".to_string());
        assert_eq!(Container::new(cfg).unwrap().api_key().unwrap(), "from-flag");
    }

    #[test]
    fn test_bad_base_url_fails_at_startup() {
        let dir = tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.base_url = "not a url".to_string();

        let err = Container::new(cfg).err().unwrap();
        assert!(err.to_string().contains("invalid base URL"));
    }

    #[test]
    fn test_malformed_credentials_file_is_not_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("credentials.toml"),
            "[gemini_ai]\nAPI_KEY = AIzaUnquoted\n",
        )
        .unwrap();

        let container = Container::new(config(dir.path())).unwrap();
        assert!(container.api_key().unwrap_err().is_configuration());
    }

    #[test]
    fn test_mock_model_runs_without_credentials() {
        let dir = tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.mock_model = true;

        let container = Container::new(cfg).unwrap();
        assert_eq!(container.service_name(), "mock");
        assert!(container.api_key().is_ok());
    }
}
