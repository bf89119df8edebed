use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocxEntry {
    pub filename: String,
    pub topic: String,
    pub version: Option<String>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub consolidated: bool,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocxInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub docx_count: usize,
    pub superseded_count: usize,
    pub docs: Vec<DocxEntry>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub inventory_manifest_path: Option<String>,
    pub output_dir: String,
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractCounts {
    pub document_count: usize,
    pub documents_unchanged: usize,
    pub tables_seen: usize,
    pub tables_skipped: usize,
    pub group_count: usize,
    pub variant_count: usize,
    pub row_count: usize,
    pub warning_count: usize,
    pub csv_files_written: usize,
    pub json_files_written: usize,
    pub db_rows_inserted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub formats: Vec<String>,
    pub variant_filter: Vec<String>,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub source_hashes: Vec<DocxEntry>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
