use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{SourceDocument, VariantFilter};
use crate::ahb::{SEGMENT_ID_COLUMN, VariantGroup};
use crate::util::{ensure_directory, file_component};

/// Writes `csv/<variant>.csv` per variant and `csv/groups/<doc>_<n>.csv` per
/// group. Variant ids seen twice in one run get a `_<n>` suffix.
pub(super) struct CsvExporter {
    root: PathBuf,
    used_names: HashMap<String, usize>,
    files_written: usize,
}

impl CsvExporter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        let root = output_dir.join("csv");
        ensure_directory(&root.join("groups"))?;
        Ok(Self {
            root,
            used_names: HashMap::new(),
            files_written: 0,
        })
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }

    pub fn write_group(
        &mut self,
        source: &SourceDocument,
        group_index: usize,
        group: &VariantGroup,
        filter: &VariantFilter,
    ) -> Result<()> {
        let grid_path = self
            .root
            .join("groups")
            .join(format!("{}_{}.csv", source.slug(), group_index));
        write_group_grid(&grid_path, group)?;
        self.files_written += 1;

        let filled = group.table.filled_hierarchy();
        for variant_id in filter.selected(group) {
            let Some(projection) = filled.project(variant_id) else {
                continue;
            };

            let name = self.claim_name(variant_id);
            let path = self.root.join(format!("{name}.csv"));
            let mut writer = csv::Writer::from_path(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            writer.write_record(projection.column_headers())?;
            for row in &projection.rows {
                writer.write_record(row.cells())?;
            }
            writer
                .flush()
                .with_context(|| format!("failed to write {}", path.display()))?;

            debug!(path = %path.display(), rows = projection.rows.len(), "wrote variant csv");
            self.files_written += 1;
        }

        info!(
            document = %source.entry.filename,
            group = group_index,
            variants = group.variant_ids().len(),
            "exported group csv"
        );
        Ok(())
    }

    fn claim_name(&mut self, variant_id: &str) -> String {
        let base = file_component(variant_id);
        let seen = self.used_names.entry(base.clone()).or_insert(0);
        *seen += 1;
        if *seen == 1 {
            base
        } else {
            format!("{base}_{seen}")
        }
    }
}

fn write_group_grid(path: &Path, group: &VariantGroup) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut headers = group.table.column_headers();
    headers.push(SEGMENT_ID_COLUMN.to_string());
    writer.write_record(&headers)?;

    for row in group.table.rows() {
        let mut cells = row.cells();
        cells.push(row.segment_id.as_deref().unwrap_or_default());
        writer.write_record(&cells)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
