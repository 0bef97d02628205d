//! Integration tests for model verification

#[cfg(test)]
mod tests {
    use sov_errors::{Error, ManifestError, StorageError};
    use sov_events::{AppEvent, EventReceiver, GuardEntryOutcome, GuardEvent};
    use sov_guard::*;
    use sov_hash::{Hash, HashAlgorithm};
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn verifier() -> (Verifier, EventReceiver) {
        let (tx, rx) = sov_events::channel();
        (Verifier::new(VerifierConfig::default(), tx), rx)
    }

    fn model_dir(manifest: &str) -> TempDir {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("CHECKSUMS.sha256"), manifest).unwrap();
        temp
    }

    fn drain(mut rx: EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_matching_file_passes() {
        let temp = model_dir(&format!("{ABC_SHA256}  weights.bin\n"));
        std::fs::write(temp.path().join("weights.bin"), b"abc").unwrap();

        let (verifier, rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();

        assert!(report.success);
        assert_eq!(
            report.summary,
            Summary {
                passed: 1,
                failed: 0,
                missing: 0,
                skipped: 0
            }
        );
        assert_eq!(report.entries[0].outcome, Outcome::Passed { size: 3 });
        assert_eq!(report.entries[0].path, "weights.bin");
        assert_eq!(report.model_dir, temp.path());

        let events = drain(rx);
        assert!(matches!(
            events.first(),
            Some(AppEvent::Guard(GuardEvent::VerificationStarted { total_bytes, .. }))
                if *total_bytes > 3
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Guard(GuardEvent::EntryHashing { path, .. }) if path == "weights.bin"
        )));
        assert!(matches!(
            events.last(),
            Some(AppEvent::Guard(GuardEvent::VerificationCompleted { summary, .. }))
                if summary.success && summary.passed == 1
        ));
    }

    #[tokio::test]
    async fn test_absent_file_is_missing() {
        let temp = model_dir(&format!("{ABC_SHA256}  weights.bin\n"));

        let (verifier, rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.summary.missing, 1);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.entries[0].outcome, Outcome::Missing);

        // Missing entries are never hashed
        assert!(!drain(rx)
            .iter()
            .any(|e| matches!(e, AppEvent::Guard(GuardEvent::EntryHashing { .. }))));
    }

    #[tokio::test]
    async fn test_parent_traversal_is_skipped() {
        let outer = tempdir().unwrap();
        let model = outer.path().join("model");
        std::fs::create_dir(&model).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"abc").unwrap();
        std::fs::write(
            model.join("CHECKSUMS.sha256"),
            format!("{ABC_SHA256}  ../secret.txt\n{ABC_SHA256}  ../nothing-here.txt\n"),
        )
        .unwrap();

        let (verifier, _rx) = verifier();
        let report = verifier.verify(&model).await.unwrap();

        assert!(!report.success);
        for entry in &report.entries {
            assert_eq!(
                entry.outcome,
                Outcome::Skipped {
                    reason: SkipReason::PathEscape
                }
            );
        }
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(report.summary.passed, 0);
    }

    #[tokio::test]
    async fn test_mismatch_reports_both_digests() {
        let temp = model_dir(&format!("{ABC_SHA256}  weights.bin\n"));
        std::fs::write(temp.path().join("weights.bin"), b"abd").unwrap();

        let (verifier, rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();

        let actual = Hash::from_data(HashAlgorithm::Sha256, b"abd").to_hex();
        assert_eq!(
            report.entries[0].outcome,
            Outcome::Failed {
                expected: ABC_SHA256.to_string(),
                actual: actual.clone(),
            }
        );
        assert_eq!(report.summary.failed, 1);
        assert!(!report.success);

        assert!(drain(rx).iter().any(|e| matches!(
            e,
            AppEvent::Guard(GuardEvent::EntryVerified {
                outcome: GuardEntryOutcome::Failed { expected, actual: got },
                ..
            }) if expected == ABC_SHA256 && *got == actual
        )));
    }

    #[tokio::test]
    async fn test_uppercase_digest_passes() {
        let temp = model_dir(&format!("{}  weights.bin\n", ABC_SHA256.to_uppercase()));
        std::fs::write(temp.path().join("weights.bin"), b"abc").unwrap();

        let (verifier, _rx) = verifier();
        assert!(verifier.verify(temp.path()).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let temp = model_dir(&format!(
            "{ABC_SHA256}  weights.bin\n{ABC_SHA256}  gone.bin\n{ABC_SHA256}  ../up.bin\n"
        ));
        std::fs::write(temp.path().join("weights.bin"), b"abc").unwrap();

        let (verifier, _rx) = verifier();
        let first = verifier.verify(temp.path()).await.unwrap();
        let second = verifier.verify(temp.path()).await.unwrap();

        assert_eq!(first.entries, second.entries);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.success, second.success);
        assert_ne!(first.operation_id, second.operation_id);
    }

    #[tokio::test]
    async fn test_directory_entry_is_not_a_file() {
        let temp = model_dir(&format!("{ABC_SHA256}  shards\n"));
        std::fs::create_dir(temp.path().join("shards")).unwrap();

        let (verifier, _rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();
        assert_eq!(
            report.entries[0].outcome,
            Outcome::Skipped {
                reason: SkipReason::NotAFile
            }
        );
        assert!(!report.success);
    }

    #[tokio::test]
    async fn test_malformed_lines_are_counted_and_warned() {
        let temp = model_dir(&format!(
            "{ABC_SHA256}  weights.bin\n\nno-delimiter-here\n{ABC_SHA256}  \n"
        ));
        std::fs::write(temp.path().join("weights.bin"), b"abc").unwrap();

        let (verifier, rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();

        assert!(report.success);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.malformed_lines, vec![3, 4]);
        assert!(drain(rx).iter().any(|e| matches!(
            e,
            AppEvent::General(sov_events::GeneralEvent::Warning { message, .. })
                if message.contains("2 malformed")
        )));
    }

    #[tokio::test]
    async fn test_missing_manifest_is_an_error() {
        let temp = tempdir().unwrap();
        let (verifier, rx) = verifier();

        let err = verifier.verify(temp.path()).await.unwrap_err();
        assert!(matches!(err, Error::Manifest(ManifestError::NotFound { .. })));

        // Directory header still goes out before the manifest lookup
        assert!(matches!(
            drain(rx).first(),
            Some(AppEvent::Guard(GuardEvent::VerificationStarted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let temp = tempdir().unwrap();
        let (verifier, _rx) = verifier();

        let err = verifier
            .verify(&temp.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::DirectoryNotFound { .. })
        ));

        let file = temp.path().join("file.bin");
        std::fs::write(&file, b"x").unwrap();
        let err = verifier.verify(&file).await.unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn test_blake3_uses_its_manifest() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("weights.bin"), b"abc").unwrap();
        let digest = Hash::from_data(HashAlgorithm::Blake3, b"abc").to_hex();
        std::fs::write(
            temp.path().join("CHECKSUMS.b3"),
            format!("{digest}  weights.bin\n"),
        )
        .unwrap();

        let (tx, _rx) = sov_events::channel();
        let verifier = Verifier::new(
            VerifierConfig {
                algorithm: HashAlgorithm::Blake3,
                chunk_size: 4096,
            },
            tx,
        );
        let report = verifier.verify(temp.path()).await.unwrap();
        assert!(report.success);
        assert_eq!(report.algorithm, HashAlgorithm::Blake3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_caught() {
        let outside = tempdir().unwrap();
        std::fs::write(outside.path().join("weights.bin"), b"abc").unwrap();

        let temp = model_dir(&format!("{ABC_SHA256}  weights.bin\n"));
        std::os::unix::fs::symlink(
            outside.path().join("weights.bin"),
            temp.path().join("weights.bin"),
        )
        .unwrap();

        let (verifier, _rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();
        assert_eq!(
            report.entries[0].outcome,
            Outcome::Skipped {
                reason: SkipReason::PathEscape
            }
        );
        assert!(!report.success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_model_dir_is_resolved() {
        let outer = tempdir().unwrap();
        let real = outer.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("weights.bin"), b"abc").unwrap();
        std::fs::write(
            real.join("CHECKSUMS.sha256"),
            format!("{ABC_SHA256}  weights.bin\n"),
        )
        .unwrap();
        let link = outer.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let (verifier, _rx) = verifier();
        let report = verifier.verify(&link).await.unwrap();
        assert!(report.success);
        assert_eq!(report.model_dir, Path::new(&link));
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let temp = model_dir(&format!("{ABC_SHA256}  weights.bin\n"));
        let (verifier, _rx) = verifier();
        let report = verifier.verify(temp.path()).await.unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["outcome"]["status"], "missing");
        assert_eq!(json["summary"]["missing"], 1);
        assert_eq!(json["algorithm"], "sha256");
        assert_eq!(json["success"], false);
    }
}
