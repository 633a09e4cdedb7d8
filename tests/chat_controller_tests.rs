use mkchat::connector::api::controller::{ChatController, ModelsController};
use mkchat::{Container, ContainerConfig};
use tempfile::tempdir;

fn mock_container(dir: &std::path::Path) -> Container {
    Container::new(ContainerConfig {
        api_key: None,
        credentials_path: dir.join("credentials.toml"),
        base_url: "http://127.0.0.1:9".to_string(),
        temperature: 0.1,
        mock_model: true,
        cache_responses: false,
    })
    .unwrap()
}

#[tokio::test]
async fn terminal_chat_prints_replies_and_summary() {
    let dir = tempdir().unwrap();
    let container = mock_container(dir.path());
    let controller = ChatController::new(&container);

    let input: &[u8] = b"Hello\n\n/quit\nnever read\n";
    let mut output = Vec::new();
    let summary = controller.chat(input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("Chatbot conversation:"));
    assert!(text.contains("MK Chatbot: {\"text\":\"You said: Hello\"}"));
    assert!(!text.contains("never read"));
    assert_eq!(summary, "Conversation ended after 1 exchanges.");
}

#[tokio::test]
async fn terminal_chat_reports_failures_and_stops_at_eof() {
    let dir = tempdir().unwrap();
    let container = mock_container(dir.path());
    let controller = ChatController::new(&container);

    let input: &[u8] = b"   \n";
    let mut output = Vec::new();
    let summary = controller.chat(input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Error: Prompt cannot be empty."));
    assert_eq!(summary, "Conversation ended after 0 exchanges.");
}

#[tokio::test]
async fn models_listing_marks_the_selected_model() {
    let dir = tempdir().unwrap();
    let container = mock_container(dir.path());

    let listing = ModelsController::new(&container).list().await.unwrap();

    assert!(listing.contains("models/mock-embedding-001"));
    let selected = listing
        .lines()
        .find(|line| line.contains("models/mock-chat-001"))
        .unwrap();
    assert!(selected.contains('*'));
}
