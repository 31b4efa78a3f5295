use super::builder::EvidenceNode;
use serde::Serialize;
use std::io::Write;

/// Flat audit row; `path` joins ancestor ids with `/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceRow {
    pub depth: usize,
    pub path: String,
    pub level: &'static str,
    pub id: String,
    pub label: String,
    pub raw_weight: f64,
    pub weight: f64,
    pub mean_pct: Option<f64>,
    pub n_children: usize,
}

pub fn flatten(tree: &EvidenceNode) -> Vec<EvidenceRow> {
    let mut rows = Vec::new();
    let mut trail: Vec<&str> = Vec::new();

    for (depth, node) in tree.walk() {
        trail.truncate(depth);
        trail.push(node.id.as_str());
        rows.push(EvidenceRow {
            depth,
            path: trail.join("/"),
            level: node.level.label(),
            id: node.id.to_string(),
            label: node.label.clone(),
            raw_weight: node.raw_weight,
            weight: node.weight,
            mean_pct: node.mean_pct,
            n_children: node.n_children,
        });
    }

    rows
}

/// Writes the flattened tree as CSV with a header row. Missing means are empty cells.
pub fn write_csv<W: Write>(tree: &EvidenceNode, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for row in flatten(tree) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
