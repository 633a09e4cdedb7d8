use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::{ChatContext, InteractionOutcome};

use super::super::Container;

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Terminal rendition of the chat UI: one line of input is one send event.
pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Run the loop until end of input or a quit command.
    pub async fn chat<R, W>(&self, input: R, mut output: W) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let interaction = self.container.interaction_loop();
        let mut ctx = ChatContext::new();
        let mut lines = input.lines();

        output
            .write_all(b"Chatbot conversation: (type /quit to leave)\n")
            .await?;

        loop {
            output.write_all(b"You: ").await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                output.write_all(b"\n").await?;
                break;
            };
            let line = line.trim_end_matches('\r');
            if QUIT_COMMANDS.contains(&line.trim()) {
                break;
            }

            let rendered = match interaction.handle_send(&mut ctx, line).await {
                InteractionOutcome::Replied(_) => ctx
                    .state()
                    .transcript()
                    .last()
                    .map(|turn| turn.display_line()),
                InteractionOutcome::Failed(message) => Some(message),
                InteractionOutcome::Ignored => None,
            };

            if let Some(text) = rendered {
                output.write_all(text.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
        }

        output.flush().await?;
        Ok(format!(
            "Conversation ended after {} exchanges.",
            ctx.state().transcript().len() / 2
        ))
    }
}
