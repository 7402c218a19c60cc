use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use crate::constants::DATABASE_DELIMITER;
use crate::domain::ResultRow;
use crate::error::Result;
use crate::profiles::ProfileStore;

pub mod bests;
pub mod sorter;
pub mod sources;

use sources::{Extraction, LenexFile, OlympicsFile, ResultSource, SkipCounts};

/// Inputs and knobs for one database build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory searched recursively for hierarchical `*.xml` meet files.
    pub lenex_directory: Option<PathBuf>,
    /// Directory holding Olympics `*.xlsx` exports.
    pub olympic_directory: Option<PathBuf>,
    pub profile_directory: PathBuf,
    pub database_file: PathBuf,
    /// Restrict extraction to one round.
    pub stage: Option<String>,
    /// Emit rows with unresolved biometrics as N/A instead of dropping them.
    pub with_na: bool,
    /// Worker bound; defaults to available cores minus one.
    pub workers: Option<usize>,
}

/// What one build did, for observability. Skips are counted, not raised.
#[derive(Debug, Clone, Copy)]
pub struct PipelineReport {
    pub files: usize,
    pub rows: usize,
    pub skips: SkipCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Lenex,
    Olympics,
}

#[derive(Debug, Clone)]
struct SourceTask {
    path: PathBuf,
    kind: SourceKind,
}

/// Runs the whole pipeline: build the profile snapshot, fan input files out
/// to bounded workers, gather every batch, sort, write the database file.
///
/// Files parse independently against the immutable profile snapshot; the
/// gather is a barrier, so output order never depends on completion order.
/// A fatal parse error from any file aborts the run.
pub async fn build_database(options: BuildOptions) -> Result<PipelineReport> {
    let profiles = Arc::new(ProfileStore::load_dir(&options.profile_directory)?);

    let mut tasks = Vec::new();
    if let Some(directory) = &options.lenex_directory {
        for path in discover(directory, "xml", true)? {
            tasks.push(SourceTask {
                path,
                kind: SourceKind::Lenex,
            });
        }
    }
    if let Some(directory) = &options.olympic_directory {
        for path in discover(directory, "xlsx", false)? {
            tasks.push(SourceTask {
                path,
                kind: SourceKind::Olympics,
            });
        }
    }

    let files = tasks.len();
    let workers = options.workers.unwrap_or_else(default_workers);
    info!(files, workers, "starting extraction");

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut set: JoinSet<Result<Extraction>> = JoinSet::new();
    for task in tasks {
        let semaphore = Arc::clone(&semaphore);
        let profiles = Arc::clone(&profiles);
        let stage = options.stage.clone();
        let with_na = options.with_na;
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            tokio::task::spawn_blocking(move || {
                extract_file(task, profiles, stage.as_deref(), with_na)
            })
            .await
            .expect("extraction worker panicked")
        });
    }

    // Gather barrier: every file finishes before sorting begins.
    let mut extraction = Extraction::default();
    while let Some(joined) = set.join_next().await {
        let batch = joined.expect("extraction task failed")?;
        extraction.absorb(batch);
    }

    sorter::sort_rows(&mut extraction.rows);
    write_database(&options.database_file, &extraction.rows)?;

    info!(
        rows = extraction.rows.len(),
        skipped = extraction.skips.total(),
        file = %options.database_file.display(),
        "database written"
    );
    Ok(PipelineReport {
        files,
        rows: extraction.rows.len(),
        skips: extraction.skips,
    })
}

fn extract_file(
    task: SourceTask,
    profiles: Arc<ProfileStore>,
    stage: Option<&str>,
    with_na: bool,
) -> Result<Extraction> {
    info!(file = %task.path.display(), "processing file");
    match task.kind {
        SourceKind::Lenex => {
            let file = LenexFile::open(&task.path, profiles, with_na)?;
            Ok(file.extract(stage))
        }
        SourceKind::Olympics => {
            let file = OlympicsFile::open(&task.path, profiles, with_na)?;
            Ok(file.extract(stage))
        }
    }
}

/// Writes the database file with the pipe delimiter; meet names may
/// contain commas.
pub fn write_database(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DATABASE_DELIMITER)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Files with the given extension under `directory`, sorted for
/// deterministic task order.
fn discover(directory: &Path, extension: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect_files(directory, extension, recursive, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect_files(
    directory: &Path,
    extension: &str,
    recursive: bool,
    found: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, extension, recursive, found)?;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            found.push(path);
        }
    }
    Ok(())
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}
