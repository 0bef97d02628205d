//! Structured logging integration for events
//!
//! Every event the verifier emits is also recorded through `tracing`, so a
//! `--debug` log file holds the full run with structured fields. Nothing
//! here logs above `info`: the console already shows each event, and the
//! default stderr filter is `warn`.

use sov_events::{AppEvent, GeneralEvent, GuardEntryOutcome, GuardEvent};
use tracing::{debug, info};

/// Log an `AppEvent` with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let source = event.event_source();
    let source = source.as_str();

    match event {
        AppEvent::Guard(guard_event) => match guard_event {
            GuardEvent::VerificationStarted {
                operation_id,
                model_dir,
                total_bytes,
                algorithm,
            } => {
                info!(
                    target: "sovereign::events::guard",
                    source,
                    operation_id = %operation_id,
                    model_dir = %model_dir.display(),
                    total_bytes,
                    algorithm = %algorithm,
                    "Verification started"
                );
            }
            GuardEvent::ManifestLoaded {
                operation_id,
                manifest,
                entries,
                malformed_lines,
            } => {
                info!(
                    target: "sovereign::events::guard",
                    source,
                    operation_id = %operation_id,
                    manifest = %manifest.display(),
                    entries,
                    malformed_lines,
                    "Manifest loaded"
                );
            }
            GuardEvent::EntryHashing { operation_id, path } => {
                debug!(
                    target: "sovereign::events::guard",
                    source,
                    operation_id = %operation_id,
                    path = %path,
                    "Hashing entry"
                );
            }
            GuardEvent::EntryVerified {
                operation_id,
                path,
                outcome,
            } => match outcome {
                GuardEntryOutcome::Passed { size } => {
                    info!(
                        target: "sovereign::events::guard",
                        source,
                        operation_id = %operation_id,
                        path = %path,
                        size,
                        "Entry passed"
                    );
                }
                GuardEntryOutcome::Failed { expected, actual } => {
                    info!(
                        target: "sovereign::events::guard",
                        source,
                        operation_id = %operation_id,
                        path = %path,
                        expected = %expected,
                        actual = %actual,
                        "Entry digest mismatch"
                    );
                }
                GuardEntryOutcome::Missing => {
                    info!(
                        target: "sovereign::events::guard",
                        source,
                        operation_id = %operation_id,
                        path = %path,
                        "Entry missing"
                    );
                }
                GuardEntryOutcome::Skipped { reason } => {
                    info!(
                        target: "sovereign::events::guard",
                        source,
                        operation_id = %operation_id,
                        path = %path,
                        reason = %reason,
                        "Entry skipped"
                    );
                }
            },
            GuardEvent::VerificationCompleted {
                operation_id,
                summary,
                duration_ms,
            } => {
                info!(
                    target: "sovereign::events::guard",
                    source,
                    operation_id = %operation_id,
                    passed = summary.passed,
                    failed = summary.failed,
                    missing = summary.missing,
                    skipped = summary.skipped,
                    success = summary.success,
                    duration_ms,
                    "Verification completed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                debug!(
                    target: "sovereign::events::general",
                    source,
                    context = ?context,
                    "{message}"
                );
            }
            GeneralEvent::DebugLog { message } => {
                debug!(target: "sovereign::events::general", source, "{message}");
            }
        },
    }
}
