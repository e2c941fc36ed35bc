use std::io;

use ndarray::ArrayView2;
use tabled::builder::Builder;

use crate::error::Result;
use crate::trace::ErrorTrace;

fn label(labels: &[&str], index: usize, prefix: &str) -> String {
    labels
        .get(index)
        .map(|l| l.to_string())
        .unwrap_or_else(|| format!("{} {}", prefix, index + 1))
}

/// Render `matrix` as a text table with four decimals per cell, one labelled
/// row per matrix row. Missing labels fall back to `row N` / `col N`.
pub fn render_table(matrix: ArrayView2<f64>, row_labels: &[&str], col_labels: &[&str]) -> String {
    let mut builder = Builder::default();

    let mut header = vec![String::new()];
    header.extend((0..matrix.ncols()).map(|j| label(col_labels, j, "col")));
    builder.push_record(header);

    for (i, row) in matrix.rows().into_iter().enumerate() {
        let mut record = vec![label(row_labels, i, "row")];
        record.extend(row.iter().map(|value| format!("{:.4}", value)));
        builder.push_record(record);
    }

    builder.build().to_string()
}

/// Write traces side by side as CSV: a `step` column followed by one column per
/// trace. Shorter traces leave their trailing cells empty.
pub fn write_traces_csv<W: io::Write>(writer: W, traces: &[(&str, &ErrorTrace)]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["step".to_string()];
    header.extend(traces.iter().map(|(name, _)| name.to_string()));
    writer.write_record(&header)?;

    let steps = traces.iter().map(|(_, t)| t.len()).max().unwrap_or(0);
    for step in 1..=steps {
        let mut record = vec![step.to_string()];
        record.extend(traces.iter().map(|(_, t)| {
            t.get(step)
                .map(|error| error.to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
