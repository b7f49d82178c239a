// file: src/prisma/diagram.rs
// description: PRISMA flow diagram CSV in the layout expected by the PRISMA2020 Shiny app
// reference: https://estech.shinyapps.io/prisma_flowdiagram/

use crate::error::{PipelineError, Result};
use crate::prisma::counts::PrismaCounts;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramRow {
    pub data: &'static str,
    pub node: &'static str,
    #[serde(rename = "box")]
    pub box_id: &'static str,
    pub description: &'static str,
    pub boxtext: &'static str,
    pub tooltips: &'static str,
    pub url: &'static str,
    pub n: usize,
}

pub struct PrismaDiagram;

impl PrismaDiagram {
    /// The seven boxes of the identification-to-inclusion flow.
    pub fn rows(counts: &PrismaCounts, source_name: &'static str) -> Vec<DiagramRow> {
        let row = |data, node, box_id, description, boxtext, tooltips, n| DiagramRow {
            data,
            node,
            box_id,
            description,
            boxtext,
            tooltips,
            url: "NA",
            n,
        };

        vec![
            row(
                "records_identified",
                "node7",
                "box2",
                source_name,
                "Records identified",
                "Metadata records retrieved from the reference manager",
                counts.identified,
            ),
            row(
                "duplicates",
                "node8",
                "box3",
                "Duplicate records removed",
                "Duplicate records",
                "Removed based on duplicate identifiers",
                counts.duplicates_removed,
            ),
            row(
                "records_screened",
                "node9",
                "box4",
                "Records screened for relevance",
                "Records screened",
                "Screening based on title, abstract, and year",
                counts.screened,
            ),
            row(
                "records_excluded",
                "node10",
                "box5",
                "Records excluded during screening",
                "Records excluded",
                "Excluded due to missing abstract, title, or invalid year",
                counts.excluded_screening,
            ),
            row(
                "reports_assessed",
                "node13",
                "box8",
                "Reports assessed for eligibility",
                "Reports assessed",
                "Eligibility based on scope and availability",
                counts.eligibility,
            ),
            row(
                "reports_excluded",
                "node14",
                "box9",
                "Reports excluded during eligibility",
                "Reports excluded",
                "Out of scope or inaccessible",
                counts.excluded_eligibility,
            ),
            row(
                "studies_included",
                "node15",
                "box10",
                "Studies included in synthesis",
                "Studies included",
                "Included in final analysis and visualisation",
                counts.included,
            ),
        ]
    }

    pub fn write_csv(counts: &PrismaCounts, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
        }

        let mut writer = csv::Writer::from_path(output_path)?;
        for row in Self::rows(counts, "Records identified from: Mendeley") {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| PipelineError::file_operation(output_path, e))?;
        Ok(())
    }

    /// Reads the counts JSON and writes the diagram CSV next to it.
    pub fn generate_csv(counts_path: &Path, output_path: &Path) -> Result<PrismaCounts> {
        if !counts_path.exists() {
            return Err(PipelineError::Validation(format!(
                "Missing {}. Run the `count` command first.",
                counts_path.display()
            )));
        }

        let counts = PrismaCounts::load(counts_path)?;
        Self::write_csv(&counts, output_path)?;
        info!("PRISMA CSV saved to: {}", output_path.display());
        Ok(counts)
    }
}
