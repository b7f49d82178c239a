// file: src/fetch/mod.rs
// description: reference manager API access
// reference: internal module structure

pub mod mendeley;

pub use mendeley::{MendeleyClient, documents_to_records, extract_code, save_metadata};
