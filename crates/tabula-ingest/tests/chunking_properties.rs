//! Chunked loading produces the same store as eager loading.

use proptest::prelude::*;
use std::fmt::Write as _;

use tabula_ingest::{FileDataSource, Hooks, LoadOptions, LoadingStrategy};

fn load(path: &std::path::Path, strategy: LoadingStrategy, chunk_size: usize) -> tabula_core::RowStore {
    let options = LoadOptions {
        loading_strategy: strategy,
        chunk_size,
        infer_types: true,
        row_filter: Some("keep = 1".to_string()),
        ..LoadOptions::default()
    };
    let mut source = FileDataSource::new(path, options, Hooks::new()).unwrap();
    source.load().unwrap();
    source.into_store()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn chunked_equals_eager(
        keep in prop::collection::vec(any::<bool>(), 0..300),
        chunk_size in 1usize..64,
    ) {
        let mut body = String::from("n,keep\n");
        for (i, k) in keep.iter().enumerate() {
            writeln!(body, "{i},{}", u8::from(*k)).unwrap();
        }
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::fs::write(file.path(), body).unwrap();

        let eager = load(file.path(), LoadingStrategy::Eager, chunk_size);
        let chunked = load(file.path(), LoadingStrategy::Chunked, chunk_size);

        prop_assert_eq!(eager.len(), keep.iter().filter(|k| **k).count());
        prop_assert_eq!(eager.records(), chunked.records());
    }
}
