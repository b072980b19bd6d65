use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use tokio::sync::Mutex as TokioMutex;

/// Writes framed protocol messages to the output stream.
/// Tests swap in `MockWriter` to capture what the server emits.
#[async_trait]
pub trait MessageWriter: Send + Sync {
    /// Write one message followed by a newline and flush it.
    async fn write_message(&mut self, message: &str) -> Result<()>;
}

/// Newline-framed writer over any async byte sink.
pub struct StreamWriter<W> {
    inner: W,
}

/// The writer the server uses outside of tests.
pub type StdoutWriter = StreamWriter<Stdout>;

impl<W> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<W> MessageWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send + Sync,
{
    async fn write_message(&mut self, message: &str) -> Result<()> {
        self.inner.write_all(message.as_bytes()).await?;
        self.inner.write_all(b"\n").await?;
        self.inner.flush().await?;
        Ok(())
    }
}

/// A mock writer that records messages instead of framing them.
/// Clones share the same buffer, so a test can keep one and hand the other
/// to the server.
#[cfg(test)]
#[derive(Clone)]
pub struct MockWriter {
    /// Stores all messages written to this writer
    pub messages: Arc<TokioMutex<Vec<String>>>,
}

#[cfg(test)]
impl MockWriter {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(TokioMutex::new(Vec::new())),
        }
    }

    /// Get a clone of all messages that have been written
    pub async fn get_messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl MessageWriter for MockWriter {
    async fn write_message(&mut self, message: &str) -> Result<()> {
        self.messages.lock().await.push(message.to_string());
        Ok(())
    }
}
