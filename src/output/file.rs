use super::RenderSink;
use crate::error::Result;
use crate::poller::REFRESH_MS;
use async_trait::async_trait;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::path::PathBuf;

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f6f8; color: #1f2328; }
.container { max-width: 960px; margin: 24px auto; }
.card { background: #fff; border: 1px solid #d0d7de; border-radius: 8px; padding: 16px 20px; }
.card-title { margin: 0 0 12px; font-size: 20px; }
.metrics-row { display: flex; gap: 12px; padding: 4px 0; }
.metrics-row .label { min-width: 140px; color: #57606a; }
.badge.ok { color: #1a7f37; }
.badge.bad { color: #cf222e; }
.btn { margin-top: 8px; padding: 4px 12px; border: 1px solid #d0d7de; border-radius: 6px; background: #f6f8fa; cursor: pointer; }
.acc-item { border-top: 1px solid #eaeef2; }
.acc-summary { display: flex; gap: 12px; padding: 8px 0; cursor: pointer; }
.acc-meta, .hint, .window-url { color: #57606a; font-size: 13px; }
.hint.error { color: #cf222e; }
.window-list { list-style: none; padding-left: 12px; }
.subhead { margin-top: 8px; font-weight: 600; }
.skeleton .sk-line { height: 12px; margin: 8px 0; background: #eaeef2; border-radius: 4px; }
.skeleton .sk-line.short { width: 40%; }
.footer { margin-top: 8px; color: #8c959f; font-size: 12px; }
.hidden { display: none; }
"#;

/// Writes the region as a standalone page, replacing the file on every
/// update.
pub struct FileOutput {
    path: PathBuf,
    title: String,
}

impl FileOutput {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            title: "WPBot Status".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// `region_html` is already-rendered region markup and is embedded as is.
    pub fn page(&self, region_html: &str) -> Markup {
        let updated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    meta http-equiv="refresh" content=(REFRESH_MS / 1000);
                    title { (self.title) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    main class="container" {
                        section class="card card--metrics" {
                            h1 class="card-title" { "Status" }
                            (PreEscaped(region_html))
                            div class="footer" { "Updated " (updated) }
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl RenderSink for FileOutput {
    async fn write(&mut self, html: &str) -> Result<()> {
        // Write-then-rename so a browser never reads a half-written page.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, self.page(html).into_string()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        log::debug!("Wrote {}", self.path.display());
        Ok(())
    }
}
