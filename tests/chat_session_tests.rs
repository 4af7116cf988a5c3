use rag_desk::{
    Error,
    cli::chat_loop,
    session::{ChatSession, Role},
};
use pretty_assertions::assert_eq;

mod common;
use common::{AskCall, MockKnowledgeApi, answer};

#[tokio::test]
async fn test_send_records_both_turns() {
    let api = MockKnowledgeApi::new().with_answers(vec![answer("Paris")]);
    let mut session = ChatSession::new(api.clone());

    let reply = session.send("Capital of France?").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.text, "Paris");
    assert!(!reply.is_error);

    let turns = session.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].text, "Capital of France?");
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let api = MockKnowledgeApi::new();
    let mut session = ChatSession::new(api.clone());

    assert!(session.send("   ").await.is_none());
    assert!(session.turns().is_empty());
    assert!(api.get_calls().is_empty());
}

#[tokio::test]
async fn test_failure_is_recorded_as_error_turn() {
    let api = MockKnowledgeApi::new().with_answers(vec![Err(Error::backend(500, "index offline"))]);
    let mut session = ChatSession::new(api);

    let reply = session.send("anything").await.unwrap();
    assert!(reply.is_error);
    assert_eq!(reply.text, "index offline");
    assert_eq!(session.turns().len(), 2);
}

#[tokio::test]
async fn test_session_document_is_forwarded() {
    let api = MockKnowledgeApi::new().with_answers(vec![answer("a")]);
    let mut session = ChatSession::new(api.clone()).with_document("doc-5");

    session.send("q").await;

    assert_eq!(
        api.get_calls(),
        vec![AskCall {
            question: "q".to_string(),
            document_id: Some("doc-5".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_clear_empties_transcript() {
    let api = MockKnowledgeApi::new().with_answers(vec![answer("a")]);
    let mut session = ChatSession::new(api);
    session.send("q").await;

    session.clear();
    assert!(session.turns().is_empty());
}

#[tokio::test]
async fn test_chat_loop_prints_answers_and_errors() {
    let api = MockKnowledgeApi::new().with_answers(vec![
        answer("first answer"),
        Err(Error::timeout("Query timed out. Please try again.")),
    ]);
    let mut session = ChatSession::new(api.clone());
    let input: &[u8] = b"first question\n\nsecond question\nexit\nnever asked\n";
    let mut output: Vec<u8> = Vec::new();

    chat_loop(&mut session, input, &mut output).await.unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert_eq!(
        printed,
        "> first answer\n> > ❌ Query timed out. Please try again.\n> "
    );
    assert_eq!(api.get_calls().len(), 2);
}

#[tokio::test]
async fn test_chat_loop_stops_at_eof() {
    let api = MockKnowledgeApi::new().with_answers(vec![answer("only")]);
    let mut session = ChatSession::new(api);
    let input: &[u8] = b"question";
    let mut output: Vec<u8> = Vec::new();

    chat_loop(&mut session, input, &mut output).await.unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "> only\n> ");
    assert_eq!(session.turns().len(), 2);
}
