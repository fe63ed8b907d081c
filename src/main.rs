use anyhow::Result;
use clap::Parser;
use refscan::cli;
use refscan::document::Workspace;
use refscan::model::{PersistentId, SearchTarget};
use refscan::progress::{CancelFlag, SearchObserver};
use refscan::session::{self, SearchMode, SearchRequest};

struct StderrProgress;

impl SearchObserver for StderrProgress {
    fn on_progress(&mut self, label: &str, fraction: f32) {
        eprintln!("refscan: [{:>3.0}%] {label}", fraction * 100.0);
    }
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Text {
            root,
            path,
            ext,
            query,
        } => {
            let mut workspace = Workspace::new(root);
            let request = SearchRequest {
                target: None,
                query: Some(query),
                root: path,
                extension: ext,
                mode: SearchMode::FileScan,
                type_filter: None,
            };
            run(&mut workspace, &request)
        }
        cli::Command::Asset {
            root,
            path,
            ext,
            guid,
            file_id,
            name,
            load,
        } => {
            let mut workspace = Workspace::new(root);
            let label = name.unwrap_or_else(|| format!("{guid}/{file_id}"));
            let target = SearchTarget::repository(label, PersistentId::new(guid, file_id));
            let mode = if load {
                SearchMode::FileScanThenLiveLoad
            } else {
                SearchMode::FileScan
            };
            let request = SearchRequest {
                target: Some(target),
                query: None,
                root: path,
                extension: ext,
                mode,
                type_filter: None,
            };
            run(&mut workspace, &request)
        }
        cli::Command::Live {
            root,
            open,
            guid,
            file_id,
            type_filter,
        } => {
            let mut workspace = Workspace::new(root);
            for rel in &open {
                workspace.open(rel)?;
            }
            let target = workspace.find_target(&guid, file_id).unwrap_or_else(|| {
                SearchTarget::repository(
                    format!("{guid}/{file_id}"),
                    PersistentId::new(guid.clone(), file_id),
                )
            });
            let request = SearchRequest {
                target: Some(target),
                query: None,
                root: String::new(),
                extension: String::new(),
                mode: SearchMode::LiveScan,
                type_filter,
            };
            run(&mut workspace, &request)
        }
    }
}

fn run(workspace: &mut Workspace, request: &SearchRequest) -> Result<()> {
    let cancel = CancelFlag::new();
    let mut observer = StderrProgress;
    let result = session::start_search(workspace, request, &mut observer, &cancel)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
