//! Console rendering for verification runs
//!
//! The plain-text layout is a contract: scripts grep for `OK`, `FAILED!`,
//! `MISSING` and the final banner, so only colour may vary.

use console::Style;
use serde_json::json;
use sov_events::GuardEntryOutcome;
use sov_guard::{format_gib, Summary, VerificationReport};
use sov_hash::HashAlgorithm;
use std::io::{self, Write};
use std::path::Path;

/// Output renderer for the verify CLI
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    ok: Style,
    bad: Style,
    warn: Style,
    bold: Style,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        let styled = |style: Style| style.force_styling(colors_enabled);
        Self {
            json_output,
            ok: styled(Style::new().green()),
            bad: styled(Style::new().red().bold()),
            warn: styled(Style::new().yellow()),
            bold: styled(Style::new().bold()),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json_output
    }

    /// Directory header printed before any entry is checked
    pub fn render_header(&self, model_dir: &Path, total_bytes: u64) {
        println!();
        println!("  Model directory : {}", model_dir.display());
        println!("  Total size      : {} GB", format_gib(total_bytes));
        println!();
    }

    /// Open a `Checking : <path>...` line, completed by [`Self::render_outcome`]
    pub fn render_checking(&self, path: &str) -> io::Result<()> {
        print!("  Checking : {path}...");
        io::stdout().flush()
    }

    /// Finish an entry; `line_open` says whether a `Checking` line is pending
    pub fn render_outcome(&self, path: &str, outcome: &GuardEntryOutcome, line_open: bool) {
        match outcome {
            GuardEntryOutcome::Passed { size } => {
                if !line_open {
                    print!("  Checking : {path}...");
                }
                println!(" {} ({} GB)", self.ok.apply_to("OK"), format_gib(*size));
            }
            GuardEntryOutcome::Failed { expected, actual } => {
                if !line_open {
                    print!("  Checking : {path}...");
                }
                println!(" {}", self.bad.apply_to("FAILED!"));
                println!("    Expected : {expected}");
                println!("    Got      : {actual}");
            }
            GuardEntryOutcome::Missing => {
                if line_open {
                    println!();
                }
                println!("  {}  : {path}", self.warn.apply_to("MISSING"));
            }
            GuardEntryOutcome::Skipped { reason } => {
                if line_open {
                    println!(" {} ({reason})", self.bad.apply_to("SKIPPED"));
                } else {
                    println!("  {}  : {path} ({reason})", self.warn.apply_to("SKIPPED"));
                }
            }
        }
    }

    /// Counts line printed after the last entry
    pub fn render_summary(&self, summary: &Summary) {
        println!();
        println!(
            "  Passed: {}  Failed: {}  Missing: {}",
            summary.passed, summary.failed, summary.missing
        );
    }

    pub fn render_banner(&self, success: bool) {
        if success {
            println!("  {}", self.ok.apply_to("All files verified. Safe to serve."));
        } else {
            println!(
                "  {}",
                self.bad
                    .apply_to("Verification FAILED. Do NOT serve this model.")
            );
            println!("     Re-download and try again.");
        }
    }

    /// Remediation text when the directory has no manifest
    pub fn render_manifest_hint(&self, model_dir: &Path, algorithm: HashAlgorithm, file_name: &str) {
        let hasher = match algorithm {
            HashAlgorithm::Sha256 => "shasum -a 256",
            HashAlgorithm::Blake3 => "b3sum",
        };
        println!("  No {file_name} found in {}", model_dir.display());
        println!("  Generate one first:");
        println!("  cd {}", model_dir.display());
        println!(
            "  find . -type f \\( -name '*.safetensors' -o -name '*.json' \\) -exec {hasher} {{}} \\; | sort > {file_name}"
        );
        println!(
            "  or: {}",
            self.bold
                .apply_to(format!("verify --generate {}", model_dir.display()))
        );
    }

    pub fn render_not_found(&self, model_dir: &Path) {
        println!("Not found: {}", model_dir.display());
    }

    pub fn render_generated(&self, manifest_path: &Path, entries: usize) {
        println!(
            "  Wrote {entries} entries to {}",
            self.bold.apply_to(manifest_path.display())
        );
    }

    pub fn render_warning(&self, message: &str, context: Option<&str>) {
        match context {
            Some(context) => eprintln!("  {} {message} ({context})", self.warn.apply_to("Warning:")),
            None => eprintln!("  {} {message}", self.warn.apply_to("Warning:")),
        }
    }

    pub fn render_report_json(&self, report: &VerificationReport) -> Result<(), serde_json::Error> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }

    pub fn render_error_json(&self, message: &str, code: Option<&str>) -> Result<(), serde_json::Error> {
        let value = json!({
            "success": false,
            "error": { "message": message, "code": code },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}
