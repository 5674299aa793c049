//! Extraction runner: file discovery and per-file orchestration.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{Engine, ExtractionResult, Snippet};
use crate::frontend::{Frontend, JavaFrontend};
use crate::rules::{RuleError, RuleSet, Settings};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "build", "out", "node_modules", "vendor"];

/// Collect the source files under `root` the front end handles, sorted by
/// path. Hidden and build directories and `excluded_paths` matches are
/// skipped. A file given as `root` is returned as is.
pub fn collect_files(
    root: &Path,
    frontend: &dyn Frontend,
    settings: &Settings,
) -> anyhow::Result<Vec<PathBuf>> {
    if !root.exists() {
        anyhow::bail!("path does not exist: {}", root.display());
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !frontend.handles(path) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if settings.is_path_excluded(relative) || settings.is_path_excluded(path) {
            debug!(path = %path.display(), "excluded");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Runs the engine over a set of files.
pub struct Runner {
    engine: Engine,
    frontend: Box<dyn Frontend>,
    show_progress: bool,
}

impl Runner {
    /// Create a runner with the strict Java front end.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            frontend: Box::new(JavaFrontend::new()),
            show_progress: false,
        }
    }

    /// Runner for a loaded rule set, using its settings for the engine and
    /// the front end.
    pub fn from_rule_set(set: &RuleSet) -> Result<Self, RuleError> {
        let engine = Engine::from_rule_set(set)?;
        let frontend = JavaFrontend::new().tolerant(set.settings.tolerate_syntax_errors);
        Ok(Self::new(engine).frontend(Box::new(frontend)))
    }

    /// Use a different front end.
    pub fn frontend(mut self, frontend: Box<dyn Frontend>) -> Self {
        self.frontend = frontend;
        self
    }

    /// Set whether to draw a progress bar on stderr.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn source_frontend(&self) -> &dyn Frontend {
        self.frontend.as_ref()
    }

    /// Read, parse and extract one file.
    pub fn extract_file(&self, path: &Path) -> anyhow::Result<Vec<Snippet>> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let unit = self.frontend.parse(path, &source)?;
        Ok(self.engine.extract(&unit))
    }

    /// Extract from every file. Files are processed in parallel; results are
    /// merged in the order of `files`. A file that cannot be read or parsed
    /// is logged and skipped.
    pub fn run(&self, files: &[PathBuf]) -> anyhow::Result<ExtractionResult> {
        let progress = if self.show_progress {
            create_progress_bar(files.len())
        } else {
            ProgressBar::hidden()
        };

        let outcomes: Vec<anyhow::Result<Vec<Snippet>>> = files
            .par_iter()
            .map(|path| {
                let outcome = self.extract_file(path);
                progress.inc(1);
                outcome
            })
            .collect();
        progress.finish_and_clear();

        let mut result = ExtractionResult::new();
        for (path, outcome) in files.iter().zip(outcomes) {
            match outcome {
                Ok(snippets) => {
                    debug!(path = %path.display(), snippets = snippets.len(), "extracted");
                    result.add_file(snippets);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                    result.add_skipped(path.display().to_string(), e.to_string());
                }
            }
        }

        info!(
            files = result.scanned,
            skipped = result.skipped.len(),
            snippets = result.snippets.len(),
            "extraction finished"
        );
        Ok(result)
    }
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map_err(|e| warn!("failed to set progress bar style: {}", e))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn throw_rules() -> RuleSet {
        RuleSet::new(vec![Rule::new(
            "RULE-024",
            "THROW_DECLARATION",
            "Exception messages",
            "Messages must explain the failure",
            "",
        )])
    }

    #[test]
    fn test_collect_files_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b/B.java", "class B {}");
        write(temp.path(), "a/A.java", "class A {}");
        write(temp.path(), "a/notes.txt", "");
        write(temp.path(), ".hidden/H.java", "class H {}");
        write(temp.path(), "target/T.java", "class T {}");
        write(temp.path(), "gen/G.java", "class G {}");

        let settings = Settings {
            excluded_paths: vec!["gen/**".to_string()],
            ..Default::default()
        };
        let files = collect_files(temp.path(), &JavaFrontend::new(), &settings).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a/A.java", "b/B.java"]);
    }

    #[test]
    fn test_collect_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(collect_files(&missing, &JavaFrontend::new(), &Settings::default()).is_err());
    }

    #[test]
    fn test_runner_skips_broken_files() {
        let temp = TempDir::new().unwrap();
        let good = write(
            temp.path(),
            "Good.java",
            "class Good {\n  void f() {\n    throw new IllegalStateException(\"x\");\n  }\n}",
        );
        let broken = write(temp.path(), "Broken.java", "class Broken { void f( }");
        let missing = temp.path().join("Missing.java");

        let runner = Runner::from_rule_set(&throw_rules()).unwrap();
        let result = runner.run(&[broken, good, missing]).unwrap();

        assert_eq!(result.scanned, 1);
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.snippets.len(), 1);
        assert_eq!(result.snippets[0].subject_name, "x");
        assert_eq!(result.snippets[0].line, 3);
    }

    #[test]
    fn test_tolerant_front_end_keeps_broken_files() {
        let temp = TempDir::new().unwrap();
        let broken = write(
            temp.path(),
            "Broken.java",
            "class Broken {\n  void f() {\n    throw new IllegalStateException(\"y\");\n  }\n  void g( }\n}",
        );
        let mut rules = throw_rules();
        rules.settings.tolerate_syntax_errors = true;
        let result = Runner::from_rule_set(&rules).unwrap().run(&[broken]).unwrap();
        assert_eq!(result.scanned, 1);
        assert!(result.skipped.is_empty());
    }
}
