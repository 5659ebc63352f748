//! End-to-end extraction runs over fixture models on disk.

use crossbeam_channel::unbounded;
use ifc_prop_getter::extract::pipeline;
use ifc_prop_getter::model::{ExtractionJob, OutputFormat, ProgressEvent};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Three products: a storey (organizational, always skipped), a wall with
/// `Pset_Mark.Mark = A1` and a beam with no property sets at all.
const THREE_ELEMENT_MODEL: &str = r"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('3pRJu0GUX7ZwTC60ANK1dq',$,'Project',$,$,$,$,$,$);
#10=IFCBUILDINGSTOREY('0BTBFw6f90Nfh9rP1dlXrb',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.);
#20=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall-01',$,$,$,$,'W-1');
#21=IFCBEAM('1kTvXnbbzCWw8lcMd1dR4o',$,'Beam-01',$,$,$,$,'B-1');
#30=IFCPROPERTYSINGLEVALUE('Mark',$,IFCLABEL('A1'),$);
#31=IFCPROPERTYSET('2ZpWuRqfr57Ot9zfXdvbyV',$,'Pset_Mark',$,(#30));
#40=IFCRELDEFINESBYPROPERTIES('0lV1Pbp2X35uml9Pa36zSz',$,$,$,(#20),#31);
ENDSEC;
END-ISO-10303-21;
";

/// Same wall and pset, but the pset is also attached to the storey.
const STOREY_WITH_PROPERTIES_MODEL: &str = r"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#10=IFCBUILDINGSTOREY('0BTBFw6f90Nfh9rP1dlXrb',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.);
#20=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall-01',$,$,$,$,'W-1');
#30=IFCPROPERTYSINGLEVALUE('Mark',$,IFCLABEL('A1'),$);
#31=IFCPROPERTYSET('2ZpWuRqfr57Ot9zfXdvbyV',$,'Pset_Mark',$,(#30));
#40=IFCRELDEFINESBYPROPERTIES('0lV1Pbp2X35uml9Pa36zSz',$,$,$,(#10,#20),#31);
ENDSEC;
END-ISO-10303-21;
";

/// Opens fine but holds no product-category entities.
const NO_PRODUCTS_MODEL: &str = r"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('3pRJu0GUX7ZwTC60ANK1dq',$,'Project',$,$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
";

struct Fixture {
    dir: TempDir,
    model_path: PathBuf,
}

fn fixture(model: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.ifc");
    std::fs::write(&model_path, model).unwrap();
    Fixture { dir, model_path }
}

fn job(fixture: &Fixture, properties: &[&str]) -> ExtractionJob {
    ExtractionJob {
        ifc_path: fixture.model_path.clone(),
        properties: properties.iter().map(|p| (*p).to_string()).collect(),
        include_global_id: true,
        include_name: false,
        output_dir: fixture.dir.path().to_path_buf(),
        base_filename: "export".to_string(),
        format: OutputFormat::Csv,
    }
}

fn run_job(job: &ExtractionJob) -> Vec<ProgressEvent> {
    run_job_with_cancel(job, &Arc::new(AtomicBool::new(false)))
}

fn run_job_with_cancel(job: &ExtractionJob, cancel: &Arc<AtomicBool>) -> Vec<ProgressEvent> {
    let (events, progress) = unbounded();
    pipeline::run(job, &events, cancel);
    drop(events);
    progress.try_iter().collect()
}

fn completed_filepath(events: &[ProgressEvent]) -> Option<PathBuf> {
    events.iter().find_map(|e| match e {
        ProgressEvent::Complete { filepath, .. } => Some(PathBuf::from(filepath)),
        _ => None,
    })
}

fn count_errors(events: &[ProgressEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Error { .. }))
        .count()
}

fn count_finished(events: &[ProgressEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Finished { .. }))
        .count()
}

/// Output files written next to the fixture model, if any.
fn output_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext != "ifc"))
        .collect()
}

fn csv_lines(path: &Path) -> Vec<String> {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF", "missing UTF-8 BOM");
    String::from_utf8(bytes[3..].to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn three_element_model_yields_one_row() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let events = run_job(&job(&fixture, &["Pset_Mark.Mark"]));

    assert_eq!(count_errors(&events), 0);
    assert_eq!(count_finished(&events), 1);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Finished { .. })
    ));

    let path = completed_filepath(&events).expect("no complete event");
    let lines = csv_lines(&path);
    assert_eq!(lines[0], "GlobalId,Pset_Mark.Mark");
    assert_eq!(lines[1], "2O2Fr$t4X7Zf8NOew3FLOH,A1");
    assert_eq!(lines.len(), 2);
}

#[test]
fn unqualified_request_resolves_across_sets() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let events = run_job(&job(&fixture, &["Mark"]));

    let path = completed_filepath(&events).expect("no complete event");
    let lines = csv_lines(&path);
    assert_eq!(lines[1], "2O2Fr$t4X7Zf8NOew3FLOH,A1");
}

#[test]
fn organizational_elements_never_emit_rows() {
    let fixture = fixture(STOREY_WITH_PROPERTIES_MODEL);
    let events = run_job(&job(&fixture, &["Pset_Mark.Mark"]));

    // The storey carries the same pset as the wall but stays excluded.
    let path = completed_filepath(&events).expect("no complete event");
    let lines = csv_lines(&path);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("2O2Fr$t4X7Zf8NOew3FLOH"));
}

#[test]
fn never_resolved_requests_are_pruned_from_columns() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let mut job = job(&fixture, &["Missing.Prop", "Pset_Mark.Mark"]);
    job.include_name = true;

    let events = run_job(&job);
    let path = completed_filepath(&events).expect("no complete event");
    let lines = csv_lines(&path);
    assert_eq!(lines[0], "GlobalId,Name,Pset_Mark.Mark");
    assert_eq!(lines[1], "2O2Fr$t4X7Zf8NOew3FLOH,Wall-01,A1");
}

#[test]
fn no_resolving_request_aborts_before_any_write() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let events = run_job(&job(&fixture, &["Nothing.Here"]));

    assert_eq!(count_errors(&events), 1);
    assert_eq!(count_finished(&events), 1);
    assert!(completed_filepath(&events).is_none());
    assert_eq!(output_files(fixture.dir.path()), Vec::<PathBuf>::new());
}

#[test]
fn empty_model_is_a_job_level_error() {
    let fixture = fixture(NO_PRODUCTS_MODEL);
    let events = run_job(&job(&fixture, &["Pset_Mark.Mark"]));

    assert_eq!(count_errors(&events), 1);
    assert_eq!(count_finished(&events), 1);
    assert!(completed_filepath(&events).is_none());
    assert_eq!(output_files(fixture.dir.path()), Vec::<PathBuf>::new());
}

#[test]
fn unreadable_file_reports_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExtractionJob {
        ifc_path: dir.path().join("missing.ifc"),
        properties: vec!["Mark".to_string()],
        include_global_id: true,
        include_name: false,
        output_dir: dir.path().to_path_buf(),
        base_filename: "export".to_string(),
        format: OutputFormat::Csv,
    };
    let events = run_job(&job);

    assert_eq!(count_errors(&events), 1);
    assert_eq!(count_finished(&events), 1);
    assert!(completed_filepath(&events).is_none());
}

#[test]
fn cancellation_discards_all_work() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let cancel = Arc::new(AtomicBool::new(false));
    cancel.store(true, Ordering::Relaxed);

    let events = run_job_with_cancel(&job(&fixture, &["Pset_Mark.Mark"]), &cancel);

    assert_eq!(count_errors(&events), 0);
    assert!(completed_filepath(&events).is_none());
    assert_eq!(count_finished(&events), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::Log { message } if message.contains("cancelled")
    )));
    assert_eq!(output_files(fixture.dir.path()), Vec::<PathBuf>::new());
}

#[test]
fn excel_output_is_a_dated_workbook() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let mut job = job(&fixture, &["Pset_Mark.Mark"]);
    job.format = OutputFormat::Excel;
    job.base_filename = "My:Data*1".to_string();

    let events = run_job(&job);
    let path = completed_filepath(&events).expect("no complete event");

    let name = path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("My_Data_1_"));
    assert!(name.ends_with(".xlsx"));
    assert_eq!(name.len(), "My_Data_1_MM-DD.xlsx".len());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn status_events_announce_each_stage() {
    let fixture = fixture(THREE_ELEMENT_MODEL);
    let events = run_job(&job(&fixture, &["Pset_Mark.Mark"]));

    let statuses: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Status { message } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            "scanning IFC entities",
            "extracting properties",
            "writing CSV output"
        ]
    );
}
