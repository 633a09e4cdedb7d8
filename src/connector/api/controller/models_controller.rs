use anyhow::Result;

use crate::{ModelDescriptor, ModelHandle};

use super::super::Container;

pub struct ModelsController<'a> {
    container: &'a Container,
}

impl<'a> ModelsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        let api_key = self.container.api_key()?;
        let use_case = self.container.list_models_use_case();

        let models = use_case.execute(api_key).await?;
        let selected = use_case.selected(api_key).await.ok();

        Ok(self.format_models(&models, selected.as_ref()))
    }

    fn format_models(&self, models: &[ModelDescriptor], selected: Option<&ModelHandle>) -> String {
        if models.is_empty() {
            return "No models available.".to_string();
        }

        let mut output = format!(
            "Available models ({}, via {}):\n\n",
            models.len(),
            self.container.service_name()
        );

        for model in models {
            let marker = if selected.is_some_and(|s| s.as_str() == model.name()) {
                "*"
            } else {
                " "
            };
            output.push_str(&format!("{} {}", marker, model.name()));
            if let Some(display) = model.display_name() {
                output.push_str(&format!(" ({})", display));
            }
            output.push('\n');
            output.push_str(&format!(
                "    Methods: {}\n",
                model.supported_generation_methods().join(", ")
            ));
        }

        match selected {
            Some(handle) => output.push_str(&format!("\n* = model used for chat ({})", handle)),
            None => output.push_str("\nNo listed model supports generateContent."),
        }

        output
    }
}
