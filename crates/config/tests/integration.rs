//! Integration tests for config

#[cfg(test)]
mod tests {
    use sov_config::*;
    use sov_hash::HashAlgorithm;
    use sov_types::{ColorChoice, OutputFormat};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.color, ColorChoice::Auto);
        assert_eq!(config.verify.algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.verify.chunk_size, 1024 * 1024);
        assert_eq!(config.verify.generate_extensions, ["safetensors", "json"]);
        assert_eq!(config.chat.base_url, "http://127.0.0.1:8000/v1");
        assert_eq!(config.chat.api_key, "changeme");
        assert_eq!(config.chat.model, "llama-3.2-3b");
        assert!((config.chat.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.chat.max_tokens, 1024);
        assert!(config.chat.system_prompt.contains("sovereign infrastructure"));
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[verify]
algorithm = "blake3"
chunk_size = 65536

[chat]
model = "gpt-oss-20b"
max_tokens = 2048
transcript_dir = "/tmp/transcripts"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.verify.algorithm, HashAlgorithm::Blake3);
        assert_eq!(config.verify.chunk_size, 65536);
        assert_eq!(config.chat.model, "gpt-oss-20b");
        assert_eq!(config.chat.max_tokens, 2048);
        // Unset keys keep their defaults
        assert_eq!(config.chat.base_url, "http://127.0.0.1:8000/v1");
        assert_eq!(config.transcript_dir(), Path::new("/tmp/transcripts"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(Path::new("/definitely/not/here.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            sov_errors::Error::Config(sov_errors::ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[verify]\nchunk_size = \"big\"").unwrap_err();
        assert!(matches!(
            err,
            sov_errors::Error::Config(sov_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SOV_OUTPUT", "json"),
            ("SOV_VERIFY_ALGORITHM", "blake3"),
            ("SOV_VERIFY_CHUNK_SIZE", "8192"),
            ("VLLM_BASE_URL", "http://10.0.0.2:9000/v1"),
            ("VLLM_API_KEY", "secret"),
            ("VLLM_MODEL", "gpt-oss-20b"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .merge_env_from(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.verify.algorithm, HashAlgorithm::Blake3);
        assert_eq!(config.verify.chunk_size, 8192);
        assert_eq!(config.chat.base_url, "http://10.0.0.2:9000/v1");
        assert_eq!(config.chat.api_key, "secret");
        assert_eq!(config.chat.model, "gpt-oss-20b");
    }

    #[test]
    fn test_merge_env_rejects_bad_values() {
        let mut config = Config::default();
        let err = config
            .merge_env_from(|key| (key == "SOV_VERIFY_CHUNK_SIZE").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            sov_errors::Error::Config(sov_errors::ConfigError::InvalidValue { ref field, .. })
                if field == "SOV_VERIFY_CHUNK_SIZE"
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("SOV_COLOR");
        std::env::set_var("SOV_COLOR", "always");

        let mut config = Config::default();
        config.merge_env().unwrap();
        assert_eq!(config.general.color, ColorChoice::Always);

        std::env::remove_var("SOV_COLOR");
    }
}
