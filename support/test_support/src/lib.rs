//! Fixture-case model shared by the integration harness and the benchmarks.
//!
//! A case is a directory under `tests/programs/` holding `program.py`, a
//! `case.yaml` describing the expected outcome, and (for successful runs) the
//! expected stdout file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseClass {
    /// Program runs to completion; stdout must match `stdout_file`.
    RuntimeSuccess,
    /// Lexing or parsing fails; the diagnostic must contain `stderr_contains`.
    FrontendError,
    /// Program lexes and parses but fails while executing.
    RuntimeError,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpectedOutcome {
    pub exit_code: i32,
    pub stdout_file: Option<String>,
    pub stderr_contains: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaseSpec {
    pub class: CaseClass,
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub dir: PathBuf,
    pub program_path: PathBuf,
    pub spec: CaseSpec,
}

impl Case {
    fn load(dir: PathBuf) -> Result<Option<Case>> {
        let spec_path = dir.join("case.yaml");
        if !spec_path.exists() {
            return Ok(None);
        }

        let name = dir
            .file_name()
            .and_then(|value| value.to_str())
            .map(str::to_string)
            .with_context(|| format!("Invalid case directory name {}", dir.display()))?;

        let program_path = dir.join("program.py");
        ensure!(
            program_path.exists(),
            "Case {name} has a case.yaml but no program.py"
        );

        let raw = fs::read_to_string(&spec_path)
            .with_context(|| format!("Reading {}", spec_path.display()))?;
        let spec = serde_yaml::from_str(&raw)
            .with_context(|| format!("Parsing {}", spec_path.display()))?;

        Ok(Some(Case {
            name,
            dir,
            program_path,
            spec,
        }))
    }

    pub fn read_text(&self, relative_path: &str) -> Result<String> {
        fs::read_to_string(self.dir.join(relative_path))
            .with_context(|| format!("Reading {} fixture file {}", self.name, relative_path))
    }
}

pub fn load_cases(programs_dir: &Path) -> Result<Vec<Case>> {
    let entries = fs::read_dir(programs_dir)
        .with_context(|| format!("Reading {}", programs_dir.display()))?;

    let mut cases = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(case) = Case::load(path)? {
            cases.push(case);
        }
    }

    ensure!(
        !cases.is_empty(),
        "No test cases found in {}",
        programs_dir.display()
    );
    cases.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(cases)
}

/// Trims trailing whitespace per line and the trailing newline so fixture
/// files can be edited without invisible-character churn.
pub fn normalize_output(output: &str) -> String {
    output
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}
