use super::RenderSink;
use crate::error::{Error, Result};
use async_trait::async_trait;
use indicatif::MultiProgress;
use std::sync::Arc;

pub struct ConsoleOutput {
    multi: Option<Arc<MultiProgress>>,
}

impl ConsoleOutput {
    pub fn new(multi: Option<Arc<MultiProgress>>) -> Self {
        Self { multi }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl RenderSink for ConsoleOutput {
    async fn write(&mut self, html: &str) -> Result<()> {
        match &self.multi {
            // Keeps the spinner line intact.
            Some(multi) => multi
                .println(html)
                .map_err(|e| Error::Internal(e.to_string())),
            None => {
                println!("{}", html);
                Ok(())
            }
        }
    }
}
