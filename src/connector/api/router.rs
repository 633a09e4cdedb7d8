use anyhow::Result;
use tokio::io::BufReader;

use crate::Commands;

use super::container::Container;
use super::controller::{ChatController, ModelsController};

pub struct Router<'a> {
    chat_controller: ChatController<'a>,
    models_controller: ModelsController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            chat_controller: ChatController::new(container),
            models_controller: ModelsController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Chat => {
                let input = BufReader::new(tokio::io::stdin());
                self.chat_controller.chat(input, tokio::io::stdout()).await
            }
            Commands::Models => self.models_controller.list().await,
            Commands::Serve { .. } => unreachable!("Serve command is handled separately in main"),
        }
    }
}
