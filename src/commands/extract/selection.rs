use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::ahb::VariantGroup;
use crate::model::DocxEntry;

/// A document picked for extraction, with its inventory record.
#[derive(Debug, Clone)]
pub(super) struct SourceDocument {
    pub path: PathBuf,
    pub entry: DocxEntry,
}

impl SourceDocument {
    pub fn slug(&self) -> String {
        crate::util::file_component(&self.entry.topic)
    }
}

/// Variant ids requested with `--variant`. Empty selects everything.
#[derive(Debug, Clone, Default)]
pub(super) struct VariantFilter {
    ids: BTreeSet<String>,
}

impl VariantFilter {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|id| id.as_ref().trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn selects(&self, variant_id: &str) -> bool {
        self.ids.is_empty() || self.ids.contains(variant_id)
    }

    pub fn selected<'a>(&self, group: &'a VariantGroup) -> Vec<&'a str> {
        group
            .variant_ids()
            .iter()
            .map(String::as_str)
            .filter(|id| self.selects(id))
            .collect()
    }

    pub fn keeps_group(&self, group: &VariantGroup) -> bool {
        group.variant_ids().iter().any(|id| self.selects(id))
    }

    /// Stable text form, stored next to exported documents.
    pub fn key(&self) -> String {
        self.ids.iter().cloned().collect::<Vec<_>>().join(",")
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}
