use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::view::{Region, Tab, View};

/// Where the manager puts its output.
#[async_trait]
pub trait Surface: Send + Sync {
    fn show_tab(&self, tab: Tab);

    fn render(&self, region: Region, view: View);

    /// Toggle the full-page loading overlay.
    fn set_loading(&self, loading: bool);

    fn reset_add_form(&self);

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Plain-text output on stdout; confirmations are read from stdin.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    assume_yes: bool,
}

impl TerminalSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Surface for TerminalSurface {
    fn show_tab(&self, tab: Tab) {
        tracing::debug!(tab = tab.as_str(), "tab shown");
    }

    fn render(&self, _region: Region, view: View) {
        if matches!(view, View::Loading) {
            return;
        }
        println!("{view}");
    }

    fn set_loading(&self, loading: bool) {
        tracing::trace!(loading, "loading overlay");
    }

    fn reset_add_form(&self) {}

    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stdout = tokio::io::stdout();
        if stdout
            .write_all(format!("{prompt} [y/N] ").as_bytes())
            .await
            .is_err()
        {
            return false;
        }
        let _ = stdout.flush().await;

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(_) => matches!(line.trim(), "y" | "Y" | "yes" | "Yes"),
            Err(_) => false,
        }
    }
}

/// Emits each rendered view as an HTML fragment tagged with its region.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    assume_yes: bool,
}

impl HtmlSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn region_id(region: Region) -> &'static str {
        match region {
            Region::ScanResult => "scanResult",
            Region::RecordList => "qrList",
            Region::Stats => "statsContent",
            Region::Scanner => "scannerArea",
        }
    }
}

#[async_trait]
impl Surface for HtmlSurface {
    fn show_tab(&self, tab: Tab) {
        println!(r#"<!-- tab: {} -->"#, tab.as_str());
    }

    fn render(&self, region: Region, view: View) {
        println!(
            r#"<div id="{}">{}</div>"#,
            Self::region_id(region),
            view.to_html()
        );
    }

    fn set_loading(&self, _loading: bool) {}

    fn reset_add_form(&self) {}

    async fn confirm(&self, _prompt: &str) -> bool {
        self.assume_yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_interactive_confirmation_follows_assume_yes() {
        assert!(HtmlSurface::new(true).confirm("Delete?").await);
        assert!(!HtmlSurface::new(false).confirm("Delete?").await);
        assert!(TerminalSurface::new(true).confirm("Delete?").await);
    }

    #[test]
    fn html_regions_map_to_page_ids() {
        assert_eq!(HtmlSurface::region_id(Region::RecordList), "qrList");
        assert_eq!(HtmlSurface::region_id(Region::ScanResult), "scanResult");
    }
}
