mod filter_tests;
mod ingest_tests;
mod types_tests;
