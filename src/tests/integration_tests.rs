//! End-to-end sessions through the stdio server loop with a stubbed backend

use crate::mcp::{Dispatcher, MCPServer};
use crate::tests::mocks::MockBackend;
use crate::utils::MockWriter;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

async fn run_session(backend: &MockBackend, lines: &[Value]) -> Result<Vec<Value>> {
    let writer = MockWriter::new();
    let mut server = MCPServer::with_writer(
        Dispatcher::new(Arc::new(backend.clone()), "o1-preview"),
        Box::new(writer.clone()),
    );

    let input: String = lines.iter().map(|line| format!("{line}\n")).collect();
    server.run(input.as_bytes(), CancellationToken::new()).await?;

    let mut responses = Vec::new();
    for message in writer.get_messages().await {
        responses.push(serde_json::from_str(&message)?);
    }
    Ok(responses)
}

#[tokio::test]
async fn test_full_session() -> Result<()> {
    let backend = MockBackend::replying("Hi there");
    let responses = run_session(
        &backend,
        &[
            json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "inspector", "version": "0.1"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "chat_completion", "arguments": {"prompt": "Hello"}
            }}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "chat_completion", "arguments": {}
            }}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
                "name": "summarize", "arguments": {"prompt": "x"}
            }}),
        ],
    )
    .await?;

    // The notification gets no reply
    assert_eq!(responses.len(), 5);
    let ids: Vec<&Value> = responses.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(0), &json!(1), &json!(2), &json!(3), &json!(4)]);

    assert_eq!(responses[1]["result"]["tools"][0]["name"], "chat_completion");
    assert_eq!(
        responses[2]["result"],
        json!({"content": [{"type": "text", "text": "Hi there"}]})
    );
    assert_eq!(responses[3]["error"]["code"], -32602);
    assert_eq!(responses[4]["error"]["code"], -32601);

    assert_eq!(
        backend.calls(),
        vec![("Hello".to_string(), "o1-preview".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_each_request_is_independent() -> Result<()> {
    let backend = MockBackend::failing("service unavailable");
    let responses = run_session(
        &backend,
        &[
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call", "params": {
                "name": "chat_completion", "arguments": {"prompt": "one", "model": "gpt-4o"}
            }}),
            json!({"jsonrpc": "2.0", "id": "b", "method": "tools/call", "params": {
                "name": "chat_completion", "arguments": {"prompt": "two"}
            }}),
        ],
    )
    .await?;

    assert_eq!(responses.len(), 2);
    for response in &responses {
        assert_eq!(response["result"]["isError"], true);
        assert!(response.get("error").is_none());
    }
    assert_eq!(
        backend.calls(),
        vec![
            ("one".to_string(), "gpt-4o".to_string()),
            ("two".to_string(), "o1-preview".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_every_request_with_an_id_gets_one_reply() -> Result<()> {
    let backend = MockBackend::replying("Hi there");
    let responses = run_session(
        &backend,
        &[
            json!({"jsonrpc": "2.0", "id": null, "method": "tools/call", "params": {
                "name": "chat_completion", "arguments": {"prompt": "Hello"}
            }}),
            json!({"jsonrpc": "2.0", "id": u64::MAX, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ],
    )
    .await?;

    assert_eq!(responses.len(), 2);
    assert!(responses[0]["id"].is_null());
    assert_eq!(responses[0]["error"]["code"], -32600);
    assert_eq!(responses[1]["id"], json!(u64::MAX));
    assert_eq!(responses[1]["result"]["tools"][0]["name"], "chat_completion");
    assert!(backend.calls().is_empty());
    Ok(())
}
