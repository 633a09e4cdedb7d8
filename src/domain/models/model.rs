use serde::{Deserialize, Serialize};

/// Generation method a model must advertise to be usable for chat.
pub const GENERATE_CONTENT_METHOD: &str = "generateContent";

/// Identifies the remote model endpoint a client talks to,
/// e.g. `models/gemini-1.5-flash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelHandle(String);

impl ModelHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resource path used in REST calls; bare ids get the `models/` prefix.
    pub fn resource_name(&self) -> String {
        if self.0.starts_with("models/") || self.0.starts_with("tunedModels/") {
            self.0.clone()
        } else {
            format!("models/{}", self.0)
        }
    }
}

impl std::fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A model as advertised by the listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    name: String,
    display_name: Option<String>,
    supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, supported_generation_methods: Vec<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            supported_generation_methods,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn supported_generation_methods(&self) -> &[String] {
        &self.supported_generation_methods
    }

    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT_METHOD)
    }

    pub fn handle(&self) -> ModelHandle {
        ModelHandle::new(self.name.clone())
    }
}

/// One page of a model listing.
#[derive(Debug, Clone, Default)]
pub struct ModelPage {
    pub models: Vec<ModelDescriptor>,
    pub next_page_token: Option<String>,
}

impl ModelPage {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self {
            models,
            next_page_token: None,
        }
    }

    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }
}

/// Picks the first model, in listing order, that can generate content.
pub fn first_generating_model(models: &[ModelDescriptor]) -> Option<&ModelDescriptor> {
    models.iter().find(|m| m.supports_generate_content())
}
