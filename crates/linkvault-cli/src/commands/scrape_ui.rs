use indicatif::{ProgressBar, ProgressStyle};
use link_catalog_core::DispatchProgress;
use link_catalog_models::{ScrapeItemReport, ScrapeRequest};
use std::io::IsTerminal;

/// Progress bar over dispatched items; falls back to structured log lines
/// when not attached to a terminal
pub struct ScrapeUI {
    bar: ProgressBar,
    interactive: bool,
}

impl ScrapeUI {
    pub fn new(show: bool) -> Self {
        let interactive = show && is_interactive();
        let bar = if interactive {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }

        if !interactive {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bar disabled, using structured logging"
            );
        }

        Self { bar, interactive }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.bar.finish_and_clear();
        }
    }
}

impl DispatchProgress for ScrapeUI {
    fn item_started(&self, request: &ScrapeRequest, index: usize, total: usize) {
        if self.interactive {
            self.bar.set_length(total as u64);
            self.bar.set_message(request.label());
        } else {
            tracing::info!(
                operation = "scrape",
                current = index + 1,
                total = total,
                item = %request.label(),
                "Requesting scrape"
            );
        }
    }

    fn item_finished(&self, report: &ScrapeItemReport) {
        self.bar.inc(1);
        if !self.interactive {
            tracing::debug!(item = %report.request.label(), state = ?report.state, "Scrape item finished");
        }
    }

    fn reconciling(&self, pending: usize) {
        if pending == 0 {
            return;
        }
        if self.interactive {
            self.bar.set_message(format!("waiting for {} item(s) to appear...", pending));
        } else {
            tracing::info!(operation = "reconcile", pending = pending, "Waiting for scraped rows");
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
