use crate::error::Result;
use async_trait::async_trait;

pub mod console;
pub mod file;

/// Receives the serialized live region after every change.
#[async_trait]
pub trait RenderSink: Send {
    async fn write(&mut self, html: &str) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
