use clap::{Parser, ValueEnum};
use color_eyre::Result;
use crossbeam_channel::RecvTimeoutError;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ifc_prop_getter::export::DEFAULT_BASE_NAME;
use ifc_prop_getter::extract::pipeline;
use ifc_prop_getter::model::{ExtractionJob, OutputFormat, ProgressEvent};

/// Assembly properties extracted when no request is given.
const DEFAULT_PROPERTIES: &[&str] = &[
    "Assembly/Cast unit Mark",
    "Assembly/Cast unit position code",
    "Assembly/Cast unit top elevation",
];

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "ifc-prop-getter")]
#[command(about = "Extract property values from IFC models into Excel or CSV")]
#[command(version)]
struct Args {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Property to extract, as `Pset.Name` or bare `Name` (repeatable;
    /// the order fixes the column order)
    #[arg(short = 'p', long = "property", value_name = "REQUEST")]
    properties: Vec<String>,

    /// Leave out the GlobalId identity column
    #[arg(long)]
    no_global_id: bool,

    /// Leave out the Name identity column
    #[arg(long)]
    no_name: bool,

    /// Directory the output file is written into
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Base name of the output file (a date suffix is appended)
    #[arg(long, value_name = "NAME", default_value = DEFAULT_BASE_NAME)]
    basename: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Excel)]
    format: FormatArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Excel,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Excel => OutputFormat::Excel,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let properties = if args.properties.is_empty() {
        DEFAULT_PROPERTIES.iter().map(|p| (*p).to_string()).collect()
    } else {
        args.properties
    };

    let job = ExtractionJob {
        ifc_path: args.file,
        properties,
        include_global_id: !args.no_global_id,
        include_name: !args.no_name,
        output_dir: args.output_dir,
        base_filename: args.basename,
        format: args.format.into(),
    };

    let (events, progress) = crossbeam_channel::unbounded();
    let cancel = Arc::new(AtomicBool::new(false));

    let worker = thread::spawn({
        let cancel = Arc::clone(&cancel);
        move || pipeline::run(&job, &events, &cancel)
    });

    let mut failed = false;
    loop {
        match progress.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                if matches!(event, ProgressEvent::Error { .. }) {
                    failed = true;
                }
                let finished = matches!(event, ProgressEvent::Finished { .. });
                print_event(&event);
                if finished {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = worker.join();

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_event(event: &ProgressEvent) {
    let stamp = chrono::Local::now().format("%H:%M:%S");
    match event {
        ProgressEvent::Log { message } => println!("[{stamp}] {message}"),
        ProgressEvent::Status { message } => println!("[{stamp}] == {message}"),
        ProgressEvent::Complete { filepath, message } => {
            println!("[{stamp}] {message}: {filepath}");
        }
        ProgressEvent::Error { message } => eprintln!("[{stamp}] error: {message}"),
        ProgressEvent::Finished { .. } => {}
    }
}
