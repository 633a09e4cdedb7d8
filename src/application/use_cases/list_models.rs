use std::sync::Arc;

use crate::application::{find_generating_model, list_all_models, GenerativeLanguageService};
use crate::domain::{ApiKey, DomainError, ModelDescriptor, ModelHandle};

/// Lists every model the credential can see, and which one a chat would use.
pub struct ListModelsUseCase {
    service: Arc<dyn GenerativeLanguageService>,
}

impl ListModelsUseCase {
    pub fn new(service: Arc<dyn GenerativeLanguageService>) -> Self {
        Self { service }
    }

    pub async fn execute(&self, api_key: &str) -> Result<Vec<ModelDescriptor>, DomainError> {
        let api_key = ApiKey::parse(api_key)?;
        list_all_models(self.service.as_ref(), &api_key).await
    }

    pub async fn selected(&self, api_key: &str) -> Result<ModelHandle, DomainError> {
        let api_key = ApiKey::parse(api_key)?;
        find_generating_model(self.service.as_ref(), &api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockGenerativeService;

    #[tokio::test]
    async fn test_execute_collects_all_pages() {
        let service = Arc::new(MockGenerativeService::with_pages(vec![
            vec![ModelDescriptor::new("models/a", vec!["embedContent".to_string()])],
            vec![ModelDescriptor::new("models/b", vec!["generateContent".to_string()])],
        ]));
        let use_case = ListModelsUseCase::new(service);

        let models = use_case.execute("key").await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["models/a", "models/b"]);
        assert_eq!(use_case.selected("key").await.unwrap().as_str(), "models/b");
    }

    #[tokio::test]
    async fn test_selected_without_candidates() {
        let service = Arc::new(MockGenerativeService::with_models(vec![ModelDescriptor::new(
            "models/embedding-001",
            vec!["embedContent".to_string()],
        )]));
        let use_case = ListModelsUseCase::new(service);

        let err = use_case.selected("key").await.unwrap_err();
        assert!(err.is_no_model_available());
    }
}
