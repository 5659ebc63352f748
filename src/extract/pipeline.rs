use crossbeam_channel::Sender;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::export::{self, ExtractedTable, GLOBAL_ID_COLUMN, NAME_COLUMN};
use crate::extract::resolver::{self, NOT_AVAILABLE};
use crate::model::{Element, ExtractionJob, ProgressEvent};
use crate::parser::loader::{self, IfcModel};

/// Container and organizational entity types. They never carry the kind of
/// quantity or identity properties being extracted, so they are skipped
/// without counting as failures.
const SKIP_ENTITY_TYPES: &[&str] = &[
    "IFCPROJECT",
    "IFCSITE",
    "IFCBUILDING",
    "IFCBUILDINGSTOREY",
    "IFCSPACE",
    "IFCANNOTATION",
    "IFCGRID",
    "IFCSTRUCTURALITEM",
];

/// One qualifying element before column selection. `values` is parallel to
/// the job's property requests.
struct Row {
    global_id: String,
    name: String,
    values: Vec<String>,
}

enum Outcome {
    Complete { filepath: PathBuf, rows: usize },
    Cancelled,
}

/// Run one extraction job to completion on the calling thread.
///
/// Progress, warnings and the terminal result go out through `events`;
/// `cancel` is checked between element iterations and before the write.
/// A `Finished` event is emitted on every exit path, including panics
/// caught at this boundary.
pub fn run(job: &ExtractionJob, events: &Sender<ProgressEvent>, cancel: &Arc<AtomicBool>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| execute(job, events, cancel)));

    match result {
        Ok(Ok(Outcome::Complete { filepath, rows })) => send(
            events,
            ProgressEvent::Complete {
                filepath: filepath.display().to_string(),
                message: format!("exported {rows} rows"),
            },
        ),
        Ok(Ok(Outcome::Cancelled)) => send(events, ProgressEvent::log("run cancelled by user")),
        Ok(Err(err)) => send(events, ProgressEvent::error(err.to_string())),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            send(
                events,
                ProgressEvent::error(format!("unexpected fault: {message}")),
            );
            send(
                events,
                ProgressEvent::log(format!("worker panicked while extracting: {message}")),
            );
        }
    }

    // The shell relies on this event to recover its interactive state, so
    // it goes out whatever happened above.
    send(
        events,
        ProgressEvent::Finished {
            message: "run finished".to_string(),
        },
    );
}

fn execute(
    job: &ExtractionJob,
    events: &Sender<ProgressEvent>,
    cancel: &AtomicBool,
) -> Result<Outcome, PipelineError> {
    send(
        events,
        ProgressEvent::log(format!("processing file: {}", job.ifc_path.display())),
    );

    send(events, ProgressEvent::status("scanning IFC entities"));
    let model = loader::open_model(&job.ifc_path)?;
    if cancel.load(Ordering::Relaxed) {
        return Ok(Outcome::Cancelled);
    }

    let elements = model.products();
    send(
        events,
        ProgressEvent::log(format!("found {} product entities", elements.len())),
    );
    if elements.is_empty() {
        return Err(PipelineError::EmptyModel);
    }

    send(events, ProgressEvent::status("extracting properties"));
    let Some(rows) = extract_rows(&model, &elements, job, events, cancel) else {
        return Ok(Outcome::Cancelled);
    };
    send(
        events,
        ProgressEvent::log(format!(
            "extraction finished, {} qualifying elements",
            rows.len()
        )),
    );
    if rows.is_empty() {
        return Err(PipelineError::NoData);
    }

    send(
        events,
        ProgressEvent::status(format!("writing {} output", job.format.label())),
    );
    let table = build_table(&rows, job);

    if cancel.load(Ordering::Relaxed) {
        return Ok(Outcome::Cancelled);
    }

    let filename = export::make_output_filename(&job.base_filename, job.format.extension());
    let filepath = job.output_dir.join(filename);
    export::write_table(&table, &filepath, job.format)?;

    Ok(Outcome::Complete {
        filepath,
        rows: table.row_count(),
    })
}

/// Scan the elements in enumeration order. Returns `None` when cancelled;
/// per-element faults are logged and recovered.
fn extract_rows(
    model: &IfcModel,
    elements: &[Element],
    job: &ExtractionJob,
    events: &Sender<ProgressEvent>,
    cancel: &AtomicBool,
) -> Option<Vec<Row>> {
    let mut rows = Vec::new();

    for element in elements {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        if SKIP_ENTITY_TYPES.contains(&element.entity_type.as_str()) {
            continue;
        }

        // One bad entity must not end the scan.
        let resolved = panic::catch_unwind(AssertUnwindSafe(|| {
            resolve_element(model, element, &job.properties)
        }));

        match resolved {
            Ok(Some(values)) => rows.push(Row {
                global_id: element
                    .global_id
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                name: element
                    .name
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                values,
            }),
            Ok(None) => {}
            Err(_) => send(
                events,
                ProgressEvent::log(format!(
                    "warning: extraction failed for element {}",
                    element.display_id()
                )),
            ),
        }
    }

    Some(rows)
}

/// Resolve every requested property for one element. `None` when nothing
/// resolved to a real value, in which case no row is emitted.
fn resolve_element(model: &IfcModel, element: &Element, requests: &[String]) -> Option<Vec<String>> {
    let psets = model.property_sets(element.id);
    let values: Vec<String> = requests
        .iter()
        .map(|request| resolver::resolve(&psets, request))
        .collect();
    values.iter().any(|v| v != NOT_AVAILABLE).then_some(values)
}

/// Assemble the final column-ordered table: identity columns first
/// (GlobalId leftmost), then the requested properties in configured order,
/// dropping requests that resolved in no row.
fn build_table(rows: &[Row], job: &ExtractionJob) -> ExtractedTable {
    let kept: Vec<usize> = (0..job.properties.len())
        .filter(|&i| rows.iter().any(|row| row.values[i] != NOT_AVAILABLE))
        .collect();

    let mut columns: Vec<String> = kept.iter().map(|&i| job.properties[i].clone()).collect();
    if job.include_name {
        columns.insert(0, NAME_COLUMN.to_string());
    }
    if job.include_global_id {
        columns.insert(0, GLOBAL_ID_COLUMN.to_string());
    }

    let mut table = ExtractedTable::new(columns);
    for row in rows {
        let mut cells: Vec<String> = kept.iter().map(|&i| row.values[i].clone()).collect();
        if job.include_name {
            cells.insert(0, row.name.clone());
        }
        if job.include_global_id {
            cells.insert(0, row.global_id.clone());
        }
        table.push_row(cells);
    }
    table
}

fn send(events: &Sender<ProgressEvent>, event: ProgressEvent) {
    // A gone receiver means the shell stopped listening; nothing left to
    // report to.
    let _ = events.send(event);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutputFormat;
    use pretty_assertions::assert_eq;

    fn job(properties: Vec<&str>, include_global_id: bool, include_name: bool) -> ExtractionJob {
        ExtractionJob {
            ifc_path: PathBuf::from("model.ifc"),
            properties: properties.into_iter().map(str::to_string).collect(),
            include_global_id,
            include_name,
            output_dir: PathBuf::from("."),
            base_filename: "export".to_string(),
            format: OutputFormat::Csv,
        }
    }

    fn row(global_id: &str, name: &str, values: Vec<&str>) -> Row {
        Row {
            global_id: global_id.to_string(),
            name: name.to_string(),
            values: values.into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn identity_columns_lead_with_global_id_leftmost() {
        let job = job(vec!["Pset.Mark"], true, true);
        let table = build_table(&[row("g1", "Beam-1", vec!["A1"])], &job);
        assert_eq!(table.columns, vec!["GlobalId", "Name", "Pset.Mark"]);
        assert_eq!(table.rows, vec![vec!["g1", "Beam-1", "A1"]]);
    }

    #[test]
    fn unresolved_request_columns_are_dropped() {
        let job = job(vec!["Pset.Mark", "Pset.Missing", "Weight"], true, false);
        let rows = [
            row("g1", "a", vec!["A1", "N/A", "N/A"]),
            row("g2", "b", vec!["N/A", "N/A", "12.5"]),
        ];
        let table = build_table(&rows, &job);
        assert_eq!(table.columns, vec!["GlobalId", "Pset.Mark", "Weight"]);
        assert_eq!(
            table.rows,
            vec![vec!["g1", "A1", "N/A"], vec!["g2", "N/A", "12.5"]]
        );
    }

    #[test]
    fn identity_columns_can_be_disabled() {
        let job = job(vec!["Mark"], false, false);
        let table = build_table(&[row("g1", "a", vec!["A1"])], &job);
        assert_eq!(table.columns, vec!["Mark"]);
        assert_eq!(table.rows, vec![vec!["A1"]]);
    }

    #[test]
    fn request_order_is_preserved() {
        let job = job(vec!["B", "A", "C"], false, false);
        let table = build_table(&[row("g", "n", vec!["1", "2", "3"])], &job);
        assert_eq!(table.columns, vec!["B", "A", "C"]);
    }

    #[test]
    fn organizational_types_are_in_the_skip_set() {
        for tag in ["IFCPROJECT", "IFCBUILDINGSTOREY", "IFCSPACE", "IFCGRID"] {
            assert!(SKIP_ENTITY_TYPES.contains(&tag));
        }
        assert!(!SKIP_ENTITY_TYPES.contains(&"IFCWALL"));
    }
}
