use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the chat UI over HTTP
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8501")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the UI on all network interfaces
        #[arg(long)]
        public: bool,
    },

    /// Chat in the terminal; one line is one message
    Chat,

    /// List available models and mark the one a chat would use
    Models,
}
