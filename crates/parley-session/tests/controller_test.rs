mod common;

use std::sync::Arc;

use common::{Fault, FlakyStore, Script, ScriptedClient};
use parley_llm::ChatClient;
use parley_persist::{ChatStore, InMemoryChatStore};
use parley_session::{
    AuthUser, Notification, NotificationKind, SessionController, SECURITY_ERROR_MESSAGE,
    SYSTEM_ERROR_MESSAGE,
};
use parley_types::{Chat, Role, PLACEHOLDER_TITLE};
use tokio::sync::mpsc::UnboundedReceiver;

const USER: &str = "user-1";

async fn signed_in(
    store: Arc<dyn ChatStore>,
    client: Arc<dyn ChatClient>,
) -> (SessionController, UnboundedReceiver<Notification>) {
    let (mut controller, notifications) = SessionController::new(store, client, "test-model");
    controller
        .handle_auth_change(Some(AuthUser::new(USER)))
        .await;
    (controller, notifications)
}

fn drain(notifications: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut all = Vec::new();
    while let Ok(n) = notifications.try_recv() {
        all.push(n);
    }
    all
}

#[tokio::test]
async fn scenario_a_first_send_creates_chat_and_derives_short_title() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&["Hi", " there"]);
    let (mut controller, _notifications) = signed_in(remote.clone(), client.clone()).await;

    controller.send_message("Hello").await;

    assert_eq!(controller.chats().len(), 1);
    let chat = controller.active_chat().unwrap();
    assert_eq!(chat.title, "Hello");
    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].role, Role::User);
    assert_eq!(chat.messages[0].content, "Hello");
    assert_eq!(chat.messages[1].role, Role::Model);
    assert_eq!(chat.messages[1].content, "Hi there");
    assert!(!controller.response_pending());

    // Durable copy carries the finalized turn and the derived title.
    let stored = remote.get(USER, &chat.id).unwrap();
    assert_eq!(stored.title, "Hello");
    assert_eq!(stored.messages.len(), 2);
    assert_eq!(stored.messages[1].content, "Hi there");

    // The request carried only the history known before the response.
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].turns.len(), 1);
    assert_eq!(requests[0].turns[0].text, "Hello");
    assert!(requests[0].system_instruction.is_some());
}

#[tokio::test]
async fn scenario_b_long_first_message_truncates_title() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&["ok"]);
    let (mut controller, _notifications) = signed_in(remote.clone(), client).await;

    let long_message = "x".repeat(60);
    controller.send_message(long_message.clone()).await;

    let expected = format!("{}…", &long_message[..40]);
    assert_eq!(controller.active_chat().unwrap().title, expected);

    let chat_id = controller.active_chat().unwrap().id.clone();
    assert_eq!(remote.get(USER, &chat_id).unwrap().title, expected);
}

#[tokio::test]
async fn title_is_derived_at_most_once() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::new(vec![
        Script::Chunks(vec!["first response"]),
        Script::Chunks(vec!["second response"]),
    ]);
    let (mut controller, _notifications) = signed_in(remote, client).await;

    controller.send_message("first question").await;
    let title_after_first = controller.active_chat().unwrap().title.clone();

    controller.send_message("a much later and different question").await;

    assert_eq!(controller.active_chat().unwrap().title, title_after_first);
    assert_eq!(title_after_first, "first question");
}

#[tokio::test]
async fn scenario_c_permission_failure_replaces_bubble_and_notifies() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::new(vec![Script::FailToOpen(Fault::Permission)]);
    let (mut controller, mut notifications) = signed_in(remote.clone(), client).await;

    controller.send_message("Hello").await;

    let chat = controller.active_chat().unwrap();
    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].content, "Hello");
    assert_eq!(chat.messages[1].content, SECURITY_ERROR_MESSAGE);
    assert!(controller.permission_error());

    let all = drain(&mut notifications);
    assert!(all
        .iter()
        .any(|n| n.kind == NotificationKind::Permission));

    // Error content is persisted so it survives reload.
    let stored = remote.get(USER, &chat.id).unwrap();
    assert_eq!(stored.messages[1].content, SECURITY_ERROR_MESSAGE);
}

#[tokio::test]
async fn generic_mid_stream_failure_replaces_partial_content() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::new(vec![Script::FailAfter(vec!["Hel"], Fault::Generic)]);
    let (mut controller, mut notifications) = signed_in(remote, client).await;

    controller.send_message("Hello").await;

    let chat = controller.active_chat().unwrap();
    assert_eq!(chat.messages[1].content, SYSTEM_ERROR_MESSAGE);
    assert!(!controller.permission_error());

    let all = drain(&mut notifications);
    assert!(all.iter().any(|n| n.kind == NotificationKind::Transient));
    assert!(all.iter().all(|n| n.kind != NotificationKind::Permission));
}

#[tokio::test]
async fn scenario_d_switching_chats_keeps_response_attributed() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::new(vec![
        Script::Chunks(vec!["answer for A"]),
        Script::Chunks(vec!["answer for B"]),
    ]);
    let (mut controller, _notifications) = signed_in(remote, client).await;

    controller.new_chat().await;
    let chat_a = controller.active_chat().unwrap().id.clone();
    controller.send_message("question A").await;

    controller.new_chat().await;
    let chat_b = controller.active_chat().unwrap().id.clone();
    controller.send_message("question B").await;

    controller.select_chat(&chat_a);
    let a = controller.active_chat().unwrap();
    assert_eq!(a.messages[1].content, "answer for A");

    controller.select_chat(&chat_b);
    let b = controller.active_chat().unwrap();
    assert_eq!(b.messages[1].content, "answer for B");
}

#[tokio::test]
async fn send_is_refused_while_signed_out() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&["never"]);
    let (mut controller, _notifications) = SessionController::new(remote, client, "test-model");

    controller.send_message("Hello").await;

    assert!(controller.chats().is_empty());
}

#[tokio::test]
async fn sign_in_loads_remote_chats_newest_first() {
    let remote = Arc::new(InMemoryChatStore::new());
    let mut older = Chat::new();
    older.created_at = 100;
    older.title = "Older".to_string();
    let mut newer = Chat::new();
    newer.created_at = 200;
    newer.title = "Newer".to_string();
    remote.upsert_chat(USER, &older).await.unwrap();
    remote.upsert_chat(USER, &newer).await.unwrap();

    let client = ScriptedClient::single(&[]);
    let (controller, _notifications) = signed_in(remote, client).await;

    assert_eq!(controller.chats().len(), 2);
    assert_eq!(controller.chats()[0].title, "Newer");
    assert_eq!(controller.active_chat().unwrap().title, "Newer");
}

#[tokio::test]
async fn sign_out_clears_local_state() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&["hi"]);
    let (mut controller, _notifications) = signed_in(remote, client).await;

    controller.send_message("Hello").await;
    assert_eq!(controller.chats().len(), 1);

    controller.handle_auth_change(None).await;

    assert!(controller.chats().is_empty());
    assert_eq!(controller.active_chat_id(), None);
    assert!(controller.current_user().is_none());
}

#[tokio::test]
async fn permission_load_failure_sets_sticky_flag_and_retry_clears_it() {
    let remote = FlakyStore::failing_load(Fault::Permission);
    let mut seeded = Chat::new();
    seeded.title = "Survivor".to_string();
    remote.inner().upsert_chat(USER, &seeded).await.unwrap();

    let client = ScriptedClient::single(&[]);
    let (mut controller, mut notifications) = signed_in(remote, client).await;

    // Collection keeps its pre-load value and the sticky flag is set.
    assert!(controller.chats().is_empty());
    assert!(controller.permission_error());
    let all = drain(&mut notifications);
    assert!(all.iter().any(|n| n.kind == NotificationKind::Permission));

    // Manual retry succeeds and clears the flag.
    controller.reload().await;
    assert!(!controller.permission_error());
    assert_eq!(controller.chats().len(), 1);
    assert_eq!(controller.chats()[0].title, "Survivor");
}

#[tokio::test]
async fn generic_load_failure_notifies_transiently_without_flag() {
    let remote = FlakyStore::failing_load(Fault::Generic);
    let client = ScriptedClient::single(&[]);
    let (controller, mut notifications) = signed_in(remote, client).await;

    assert!(controller.chats().is_empty());
    assert!(!controller.permission_error());
    let all = drain(&mut notifications);
    assert!(all.iter().any(|n| n.kind == NotificationKind::Transient));
}

#[tokio::test]
async fn new_chat_persists_placeholder_immediately() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&[]);
    let (mut controller, _notifications) = signed_in(remote.clone(), client).await;

    controller.new_chat().await;

    let chat_id = controller.active_chat().unwrap().id.clone();
    let stored = remote.get(USER, &chat_id).unwrap();
    assert_eq!(stored.title, PLACEHOLDER_TITLE);
    assert!(stored.messages.is_empty());
}

#[tokio::test]
async fn delete_flow_confirms_and_removes_remotely() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::new(vec![
        Script::Chunks(vec!["one"]),
        Script::Chunks(vec!["two"]),
    ]);
    let (mut controller, _notifications) = signed_in(remote.clone(), client).await;

    controller.send_message("first chat").await;
    let first = controller.active_chat().unwrap().id.clone();
    controller.new_chat().await;
    controller.send_message("second chat").await;
    let second = controller.active_chat().unwrap().id.clone();

    controller.request_delete(&second);
    assert_eq!(controller.pending_delete(), Some(second.as_str()));
    controller.confirm_delete().await;

    assert_eq!(controller.chats().len(), 1);
    assert_eq!(controller.active_chat().unwrap().id, first);
    assert!(remote.get(USER, &second).is_none());
    assert!(remote.get(USER, &first).is_some());
    assert_eq!(controller.pending_delete(), None);
}

#[tokio::test]
async fn cancel_delete_leaves_everything_in_place() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&["hi"]);
    let (mut controller, _notifications) = signed_in(remote, client).await;

    controller.send_message("keep me").await;
    let chat_id = controller.active_chat().unwrap().id.clone();

    controller.request_delete(&chat_id);
    controller.cancel_delete();
    controller.confirm_delete().await;

    assert_eq!(controller.chats().len(), 1);
}

#[tokio::test]
async fn export_transcript_includes_sessions_and_roles() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::single(&["Hi there"]);
    let (mut controller, _notifications) = signed_in(remote, client).await;

    controller.send_message("Hello").await;
    let transcript = controller.export_transcript();

    assert!(transcript.contains("--- SESSION: Hello ---"));
    assert!(transcript.contains("USER: Hello"));
    assert!(transcript.contains("MODEL: Hi there"));
}

#[tokio::test]
async fn sends_into_existing_chat_append_history_in_order() {
    let remote = Arc::new(InMemoryChatStore::new());
    let client = ScriptedClient::new(vec![
        Script::Chunks(vec!["first"]),
        Script::Chunks(vec!["second"]),
    ]);
    let (mut controller, _notifications) = signed_in(remote, client.clone()).await;

    controller.send_message("one").await;
    controller.send_message("two").await;

    let chat = controller.active_chat().unwrap();
    let contents: Vec<&str> = chat.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "first", "two", "second"]);

    // Second request carried the full prior history, oldest to newest.
    let requests = client.requests();
    assert_eq!(requests[1].turns.len(), 3);
    assert_eq!(requests[1].turns[0].text, "one");
    assert_eq!(requests[1].turns[1].text, "first");
    assert_eq!(requests[1].turns[2].text, "two");
}
