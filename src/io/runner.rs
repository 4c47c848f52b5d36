use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::model::config::Workflow;
use crate::model::value::JsonValue;
use crate::ops::stages::{StageInfo, match_stage, progress_percent};

use super::config_io::{ConfigIoError, write_json_file};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("could not start Pioneer: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigIoError),
    #[error("missing {0} pipe")]
    MissingPipe(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Progress of a launched run, delivered in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        workflow: Workflow,
        log_path: PathBuf,
        config_path: PathBuf,
        persisted_path: Option<PathBuf>,
    },
    Log {
        workflow: Workflow,
        stream: Stream,
        line: String,
    },
    Progress {
        workflow: Workflow,
        stage_key: &'static str,
        stage_label: &'static str,
        progress: f32,
    },
    Complete {
        workflow: Workflow,
        success: bool,
        exit_code: Option<i32>,
        message: Option<String>,
    },
}

/// What to run and where to put its files
pub struct RunRequest<'a> {
    pub pioneer: &'a Path,
    pub workflow: Workflow,
    pub config: &'a JsonValue,
    /// Also save the parameters here so the next session starts from them
    pub persist_to: Option<&'a Path>,
    /// Directory for the run's log file
    pub log_dir: &'a Path,
}

/// A run in progress. Events arrive on an internal channel; the UI drains it
/// with [`RunHandle::poll`] each tick.
pub struct RunHandle {
    pub workflow: Workflow,
    pub log_path: PathBuf,
    rx: mpsc::Receiver<RunEvent>,
}

impl RunHandle {
    /// Events received since the last poll, without blocking
    pub fn poll(&self) -> Vec<RunEvent> {
        self.rx.try_iter().collect()
    }

    /// Blocking iterator over every remaining event; ends after `Complete`
    pub fn events(&self) -> mpsc::Iter<'_, RunEvent> {
        self.rx.iter()
    }
}

/// Write the parameters, spawn `pioneer <subcommand> <config>`, and follow its
/// output on a background thread.
pub fn start_run(request: RunRequest<'_>) -> Result<RunHandle, RunError> {
    let workflow = request.workflow;
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join(workflow.config_filename());
    write_json_file(&config_path, request.config)?;

    if let Some(persist) = request.persist_to {
        write_json_file(persist, request.config)?;
    }

    fs::create_dir_all(request.log_dir)?;
    let log_path = request.log_dir.join(format!(
        "pioneer_{}_{}.log",
        workflow.subcommand(),
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let mut child = Command::new(request.pioneer)
        .arg(workflow.subcommand())
        .arg(&config_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    info!(%workflow, pid = child.id(), log = %log_path.display(), "started Pioneer");

    let stdout = child.stdout.take().ok_or(RunError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(RunError::MissingPipe("stderr"))?;

    let (tx, rx) = mpsc::channel();
    let _ = tx.send(RunEvent::Started {
        workflow,
        log_path: log_path.clone(),
        config_path,
        persisted_path: request.persist_to.map(Path::to_path_buf),
    });

    thread::spawn(move || {
        // The config file lives in the temp dir; keep it until Pioneer exits
        let _temp_dir = temp_dir;
        follow_run(workflow, child, stdout, stderr, log_file, tx);
    });

    Ok(RunHandle {
        workflow,
        log_path,
        rx,
    })
}

fn follow_run<O, E>(
    workflow: Workflow,
    mut child: Child,
    stdout: O,
    stderr: E,
    mut log_file: File,
    tx: mpsc::Sender<RunEvent>,
) where
    O: Read + Send + 'static,
    E: Read + Send + 'static,
{
    let (line_tx, line_rx) = mpsc::channel::<(Stream, String)>();
    spawn_reader(stdout, line_tx.clone(), Stream::Stdout);
    spawn_reader(stderr, line_tx, Stream::Stderr);

    let stages = workflow.stages();
    let mut stage_index = 0usize;
    send_stage(&tx, workflow, stages, stage_index);

    for (stream, line) in line_rx {
        let _ = writeln!(log_file, "{}: {}", stream.as_str(), line);
        debug!(%workflow, stream = stream.as_str(), "{}", line);
        if let Some(next) = match_stage(&line, stage_index, stages) {
            stage_index = next;
            send_stage(&tx, workflow, stages, stage_index);
        }
        let _ = tx.send(RunEvent::Log {
            workflow,
            stream,
            line,
        });
    }

    let complete = match child.wait() {
        Ok(status) if status.success() => {
            if stage_index + 1 < stages.len() {
                send_stage(&tx, workflow, stages, stages.len() - 1);
            }
            info!(%workflow, "Pioneer finished");
            RunEvent::Complete {
                workflow,
                success: true,
                exit_code: status.code(),
                message: None,
            }
        }
        Ok(status) => {
            let message = format!("Pioneer exited with status {:?}", status.code().or(Some(-1)));
            warn!(%workflow, "{}", message);
            RunEvent::Complete {
                workflow,
                success: false,
                exit_code: status.code(),
                message: Some(message),
            }
        }
        Err(e) => {
            warn!(%workflow, error = %e, "could not wait for Pioneer");
            RunEvent::Complete {
                workflow,
                success: false,
                exit_code: None,
                message: Some(e.to_string()),
            }
        }
    };
    let _ = tx.send(complete);
}

fn spawn_reader<R: Read + Send + 'static>(
    reader: R,
    tx: mpsc::Sender<(Stream, String)>,
    stream: Stream,
) {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines().map_while(Result::ok) {
            if tx.send((stream, line)).is_err() {
                break;
            }
        }
    });
}

fn send_stage(tx: &mpsc::Sender<RunEvent>, workflow: Workflow, stages: &[StageInfo], index: usize) {
    let stage = &stages[index];
    let _ = tx.send(RunEvent::Progress {
        workflow,
        stage_key: stage.key,
        stage_label: stage.label,
        progress: progress_percent(index, stages.len()),
    });
}
