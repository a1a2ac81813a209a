// ============================================================================
// report.rs — Console narration (progress to stdout, problems to stderr)
// ============================================================================

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        println!("{}", msg.as_ref());
    }

    /// Printed only with `-v`
    pub fn detail(&self, msg: impl AsRef<str>) {
        if self.verbose {
            println!("{}", msg.as_ref().dimmed());
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        println!("{} {}", "✓".green(), msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        eprintln!("{}", msg.as_ref().yellow());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!("{} {}", "[ERROR]".red().bold(), msg.as_ref());
    }

    /// Bar for a fixed number of steps; hidden unless verbose.
    pub fn progress(&self, len: u64, msg: &'static str) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(msg);
        bar
    }
}
