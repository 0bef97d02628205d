//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sov_hash::*;
    use tempfile::tempdir;
    use tokio::fs;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn chunked_digest_matches_one_shot(
            data in proptest::collection::vec(any::<u8>(), 0..20_000),
            chunk_size in 1usize..9_000,
        ) {
            for algorithm in HashAlgorithm::ALL {
                let reader = std::io::Cursor::new(data.clone());
                let (streamed, total) = block_on(hash_reader(reader, algorithm, chunk_size)).unwrap();
                prop_assert_eq!(total, data.len() as u64);
                prop_assert_eq!(streamed, Hash::from_data(algorithm, &data));
            }
        }
    }

    #[tokio::test]
    async fn test_file_larger_than_chunk() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("shard-00001.safetensors");

        let data: Vec<u8> = (0..(3 * MIN_CHUNK_SIZE + 17)).map(|i| (i % 251) as u8).collect();
        fs::write(&file_path, &data).await.unwrap();

        let (hash, size) = hash_file(&file_path, HashAlgorithm::Sha256, MIN_CHUNK_SIZE)
            .await
            .unwrap();
        assert_eq!(size, data.len() as u64);
        assert_eq!(hash, Hash::from_data(HashAlgorithm::Sha256, &data));
    }

    #[test]
    fn test_custom_hasher_through_trait_object() {
        let mut hasher = HashAlgorithm::Sha256.hasher();
        hasher.update(b"a");
        hasher.update(b"");
        hasher.update(b"bc");
        assert_eq!(
            hasher.finalize(),
            Hash::from_data(HashAlgorithm::Sha256, b"abc")
        );
    }
}
