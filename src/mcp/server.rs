use super::dispatcher::Dispatcher;
use super::handler::MessageHandler;
use crate::utils::{MessageWriter, StdoutWriter};
use anyhow::Result;
use tokio::io::{stdin, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

pub struct MCPServer {
    handler: MessageHandler,
}

impl MCPServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_writer(dispatcher, Box::new(StdoutWriter::new(tokio::io::stdout())))
    }

    pub fn with_writer(dispatcher: Dispatcher, message_writer: Box<dyn MessageWriter>) -> Self {
        Self {
            handler: MessageHandler::new(dispatcher, message_writer),
        }
    }

    pub async fn run_stdio(&mut self, cancel: CancellationToken) -> Result<()> {
        info!("Azure OpenAI MCP server running on stdio");
        self.run(BufReader::new(stdin()), cancel).await
    }

    /// Serves line-delimited messages from `reader` until EOF or cancellation.
    /// Cancellation stops the loop immediately, dropping a request whose
    /// backend call is still outstanding.
    pub async fn run<R>(&mut self, reader: R, cancel: CancellationToken) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Shutdown requested");
                    break;
                }
                next = lines.next_line() => next,
            };

            let line = match next {
                Ok(Some(line)) => line,
                Ok(None) => break, // EOF
                Err(e) => {
                    error!("Failed to read from input stream: {}", e);
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            trace!("Received message: {}", trimmed);

            // An interrupt abandons the in-flight request; no reply is sent for it
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Shutdown requested while a request was in flight");
                    break;
                }
                outcome = self.handler.handle_message(trimmed) => outcome,
            };
            match outcome {
                Ok(()) => trace!("Message processed successfully"),
                Err(e) => error!("Error handling message: {}", e),
            }
        }

        debug!("MCP server shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ApiError, CompletionBackend};
    use crate::tests::mocks::MockBackend;
    use crate::utils::MockWriter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn server(backend: &MockBackend, writer: &MockWriter) -> MCPServer {
        MCPServer::with_writer(
            Dispatcher::new(Arc::new(backend.clone()), "o1-preview"),
            Box::new(writer.clone()),
        )
    }

    #[tokio::test]
    async fn test_stops_at_eof() {
        let backend = MockBackend::replying("Hi there");
        let writer = MockWriter::new();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );

        server(&backend, &writer)
            .run(input.as_bytes(), CancellationToken::new())
            .await
            .unwrap();

        let messages = writer.get_messages().await;
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains(r#""id":1"#));
        assert!(messages[1].contains(r#""tools""#));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_reading() {
        let backend = MockBackend::replying("Hi there");
        let writer = MockWriter::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let input = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string() + "\n";
        server(&backend, &writer)
            .run(input.as_bytes(), cancel)
            .await
            .unwrap();

        assert!(writer.get_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_input() {
        let backend = MockBackend::replying("Hi there");
        let writer = MockWriter::new();
        let cancel = CancellationToken::new();

        // Keep the write half open so the reader never sees EOF
        let (_client, server_side) = tokio::io::duplex(64);
        let mut server = server(&backend, &writer);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            server.run(BufReader::new(server_side), cancel),
        )
        .await
        .expect("server did not stop after cancellation")
        .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_abandons_stalled_backend_call() {
        let backend = StalledBackend::default();
        let writer = MockWriter::new();
        let cancel = CancellationToken::new();
        let mut server = MCPServer::with_writer(
            Dispatcher::new(Arc::new(backend.clone()), "o1-preview"),
            Box::new(writer.clone()),
        );

        let input = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"chat_completion","arguments":{"prompt":"Hello"}}}"#
            .to_string()
            + "\n";

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        tokio::time::timeout(Duration::from_secs(5), server.run(input.as_bytes(), cancel))
            .await
            .expect("server kept waiting on the backend after cancellation")
            .unwrap();

        assert!(backend.started.load(Ordering::SeqCst));
        assert!(writer.get_messages().await.is_empty());
    }

    #[derive(Clone, Default)]
    struct StalledBackend {
        started: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CompletionBackend for StalledBackend {
        async fn complete(&self, _prompt: &str, _model: &str) -> Result<String, ApiError> {
            self.started.store(true, Ordering::SeqCst);
            std::future::pending().await
        }
    }
}
