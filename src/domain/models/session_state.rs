use super::Turn;

/// Where a UI session is in its send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Sending,
}

/// UI-facing state of one chat session: what is on screen.
///
/// `input_key` only ever grows; renderers derive the input widget identity from
/// it so a fresh, empty input appears after every successful send.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    transcript: Vec<Turn>,
    input_key: u64,
    error_banner: Option<String>,
    phase: Phase,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn input_key(&self) -> u64 {
        self.input_key
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn begin_send(&mut self) {
        self.phase = Phase::Sending;
    }

    pub fn record_exchange(&mut self, prompt: impl Into<String>, reply: &str) {
        self.transcript.push(Turn::user(prompt));
        self.transcript.push(Turn::model(reply.trim()));
        self.input_key += 1;
        self.error_banner = None;
        self.phase = Phase::Idle;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.error_banner = Some(message.into());
        self.phase = Phase::Idle;
    }

    /// A submission rendered for an older input widget.
    pub fn is_stale(&self, input_key: u64) -> bool {
        input_key != self.input_key
    }

    pub fn display_lines(&self) -> Vec<String> {
        self.transcript.iter().map(Turn::display_line).collect()
    }
}
