use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::InventoryArgs;
use crate::model::{DocxEntry, DocxInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub const INVENTORY_FILENAME: &str = "docx_inventory.json";

pub fn run(args: InventoryArgs) -> Result<()> {
    let source_dir = args.source_dir.as_deref().unwrap_or(&args.cache_root);
    let manifest = build_manifest(source_dir)?;

    if args.dry_run {
        info!(
            docx_count = manifest.docx_count,
            superseded = manifest.superseded_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.cache_root.join("manifests").join(INVENTORY_FILENAME));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(
        docx_count = manifest.docx_count,
        superseded = manifest.superseded_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_manifest(source_dir: &Path) -> Result<DocxInventoryManifest> {
    let pattern = publication_pattern()?;

    let mut docx_paths = discover_docx(source_dir)?;
    docx_paths.sort();

    if docx_paths.is_empty() {
        bail!("no .docx files found in {}", source_dir.display());
    }

    let mut warnings = Vec::new();
    let mut by_topic: BTreeMap<String, Vec<(Option<PublicationName>, PathBuf, String)>> =
        BTreeMap::new();

    for path in docx_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let name = PublicationName::parse(&filename, &pattern);
        if name.is_none() {
            warn!(filename = %filename, "filename does not follow the publication pattern");
            warnings.push(format!("unrecognized publication name: {filename}"));
        }
        let topic = topic_for(&filename, name.as_ref());

        by_topic.entry(topic).or_default().push((name, path, filename));
    }

    let mut docs = Vec::with_capacity(by_topic.len());
    let mut superseded_count = 0;

    for (topic, mut candidates) in by_topic {
        candidates.sort_by(|a, b| {
            let key_a = a.0.as_ref().map(PublicationName::recency_key);
            let key_b = b.0.as_ref().map(PublicationName::recency_key);
            key_a.cmp(&key_b).then(a.2.cmp(&b.2))
        });

        let Some((name, path, filename)) = candidates.pop() else {
            continue;
        };
        for (_, _, dropped) in &candidates {
            debug!(topic = %topic, filename = %dropped, "superseded by a newer publication");
        }
        superseded_count += candidates.len();

        docs.push(docx_entry(&path, filename, topic, name.as_ref())?);
    }

    Ok(DocxInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: source_dir.display().to_string(),
        docx_count: docs.len(),
        superseded_count,
        docs,
        warnings,
    })
}

/// Describes one document outside of an inventory run, e.g. a `--document` path.
pub fn describe_docx(path: &Path) -> Result<DocxEntry> {
    let pattern = publication_pattern()?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

    let name = PublicationName::parse(&filename, &pattern);
    let topic = topic_for(&filename, name.as_ref());
    docx_entry(path, filename, topic, name.as_ref())
}

fn topic_for(filename: &str, name: Option<&PublicationName>) -> String {
    match name {
        Some(name) => name.topic.clone(),
        None => filename
            .strip_suffix(".docx")
            .or_else(|| filename.strip_suffix(".DOCX"))
            .unwrap_or(filename)
            .to_string(),
    }
}

fn docx_entry(
    path: &Path,
    filename: String,
    topic: String,
    name: Option<&PublicationName>,
) -> Result<DocxEntry> {
    Ok(DocxEntry {
        sha256: sha256_file(path)?,
        filename,
        topic,
        version: name.map(|name| name.version.to_string()),
        valid_from: name.map(|name| name.valid_from.clone()),
        valid_until: name.map(|name| name.valid_until.clone()),
        consolidated: name.is_some_and(|name| name.consolidated),
    })
}

fn discover_docx(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut docx = Vec::new();

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read {}", source_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", source_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        // Word lock files share the extension.
        let is_lock_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("~$"));

        let is_docx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("docx"))
            .unwrap_or(false);

        if is_docx && !is_lock_file {
            docx.push(path);
        }
    }

    Ok(docx)
}

fn publication_pattern() -> Result<Regex> {
    Regex::new(
        r"^(?P<topic>.+?)-informatorischeLesefassung(?P<prefix>[GS])?(?P<major>\d+)\.(?P<minor>\d+)(?P<suffix>[a-z]?)(?P<remark>.*)_(?P<until>\d{8})_(?P<from>\d{8})\.docx$",
    )
    .context("failed to compile publication filename regex")
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DocumentVersion {
    pub major: u32,
    pub minor: u32,
    pub suffix: String,
    pub prefix: String,
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}.{}{}", self.prefix, self.major, self.minor, self.suffix)
    }
}

/// `<topic>-informatorischeLesefassung<version>[remark]_<validUntil>_<validFrom>.docx`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationName {
    pub topic: String,
    pub version: DocumentVersion,
    pub valid_until: String,
    pub valid_from: String,
    pub consolidated: bool,
}

impl PublicationName {
    pub fn parse(filename: &str, pattern: &Regex) -> Option<Self> {
        let captures = pattern.captures(filename)?;
        let text = |name: &str| captures.name(name).map(|m| m.as_str()).unwrap_or_default();

        let remark = text("remark");
        Some(Self {
            topic: text("topic").to_string(),
            version: DocumentVersion {
                major: text("major").parse().ok()?,
                minor: text("minor").parse().ok()?,
                suffix: text("suffix").to_string(),
                prefix: text("prefix").to_string(),
            },
            valid_until: text("until").to_string(),
            valid_from: text("from").to_string(),
            consolidated: remark.contains("KonsolidierteLesefassung")
                || remark.contains("Fehlerkorrekturen"),
        })
    }

    /// Dates are `yyyymmdd`, so string order is date order.
    pub fn recency_key(&self) -> (&str, &str, &DocumentVersion, bool) {
        (
            self.valid_from.as_str(),
            self.valid_until.as_str(),
            &self.version,
            self.consolidated,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{PublicationName, build_manifest, publication_pattern};

    #[test]
    fn publication_name_parses_version_and_validity() {
        let pattern = publication_pattern().expect("pattern");
        let name = PublicationName::parse(
            "UTILMDAHBGas-informatorischeLesefassungG1.0aKonsolidierteLesefassungmitFehlerkorrekturenStand29.06.2023_99991231_20231001.docx",
            &pattern,
        )
        .expect("name");

        assert_eq!(name.topic, "UTILMDAHBGas");
        assert_eq!(name.version.to_string(), "G1.0a");
        assert_eq!(name.valid_until, "99991231");
        assert_eq!(name.valid_from, "20231001");
        assert!(name.consolidated);

        let plain = PublicationName::parse(
            "MSCONSAHB-informatorischeLesefassung3.1c_99991231_20231001.docx",
            &pattern,
        )
        .expect("plain");
        assert_eq!(plain.version.major, 3);
        assert_eq!(plain.version.suffix, "c");
        assert!(!plain.consolidated);

        assert!(PublicationName::parse("notes.docx", &pattern).is_none());
    }

    #[test]
    fn newer_publication_wins_per_topic() {
        let pattern = publication_pattern().expect("pattern");
        let older = PublicationName::parse(
            "IFTSTAAHB-informatorischeLesefassung2.0e_20240402_20231001.docx",
            &pattern,
        )
        .expect("older");
        let newer = PublicationName::parse(
            "IFTSTAAHB-informatorischeLesefassung2.0f_99991231_20240403.docx",
            &pattern,
        )
        .expect("newer");
        let corrected = PublicationName::parse(
            "IFTSTAAHB-informatorischeLesefassung2.0fKonsolidierteLesefassungmitFehlerkorrekturenStand01.03.2024_99991231_20240403.docx",
            &pattern,
        )
        .expect("corrected");

        assert!(older.recency_key() < newer.recency_key());
        assert!(newer.recency_key() < corrected.recency_key());
    }

    #[test]
    fn manifest_keeps_one_document_per_topic() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "COMDISAHB-informatorischeLesefassung1.0c_99991231_20221001.docx",
            "COMDISAHB-informatorischeLesefassung1.0d_99991231_20231001.docx",
            "PARTINAHB-informatorischeLesefassung1.0c_99991231_20231001.docx",
            "Entwurf.docx",
            "~$lock.docx",
            "readme.txt",
        ] {
            fs::write(dir.path().join(name), name.as_bytes()).expect("write");
        }

        let manifest = build_manifest(dir.path()).expect("manifest");

        assert_eq!(manifest.docx_count, 3);
        assert_eq!(manifest.superseded_count, 1);
        assert_eq!(manifest.warnings.len(), 1);

        let comdis = manifest
            .docs
            .iter()
            .find(|doc| doc.topic == "COMDISAHB")
            .expect("comdis");
        assert_eq!(comdis.version.as_deref(), Some("1.0d"));
        assert_eq!(comdis.sha256.len(), 64);
        assert!(manifest.docs.iter().any(|doc| doc.topic == "Entwurf" && doc.version.is_none()));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(build_manifest(dir.path()).is_err());
    }
}
