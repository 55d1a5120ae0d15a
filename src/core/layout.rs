//! Checks the `lecture_N/` directory convention of a workshop checkout.
//!
//! Each lecture is expected to carry its notebooks, slides and data next to the
//! environment files (`Makefile`, `pyproject.toml`, `Dockerfile`). The Makefile must
//! expose the `build`, `interactive` and `notebook` targets. Nothing here runs those
//! targets.

use crate::utils::error::Result;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, Copy)]
pub struct RequiredEntry {
    pub name: &'static str,
    pub kind: EntryKind,
}

pub const REQUIRED_ENTRIES: &[RequiredEntry] = &[
    RequiredEntry {
        name: "notebooks",
        kind: EntryKind::Dir,
    },
    RequiredEntry {
        name: "slides",
        kind: EntryKind::Dir,
    },
    RequiredEntry {
        name: "data",
        kind: EntryKind::Dir,
    },
    RequiredEntry {
        name: "Makefile",
        kind: EntryKind::File,
    },
    RequiredEntry {
        name: "pyproject.toml",
        kind: EntryKind::File,
    },
    RequiredEntry {
        name: "Dockerfile",
        kind: EntryKind::File,
    },
];

pub const MAKE_TARGETS: &[&str] = &["build", "interactive", "notebook"];

#[derive(Debug, Clone, Serialize)]
pub struct LectureStatus {
    pub number: u32,
    pub path: PathBuf,
    pub missing: Vec<String>,
    pub missing_targets: Vec<String>,
    pub notebook_count: usize,
    pub slide_sources: Vec<String>,
    pub warnings: Vec<String>,
}

impl LectureStatus {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.missing_targets.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub root: PathBuf,
    pub lectures: Vec<LectureStatus>,
    pub missing_lectures: Vec<u32>,
}

impl LayoutReport {
    /// 空的報告永遠不算完整
    pub fn is_complete(&self, strict: bool) -> bool {
        !self.lectures.is_empty()
            && self.missing_lectures.is_empty()
            && self
                .lectures
                .iter()
                .all(|l| l.is_complete() && (!strict || l.warnings.is_empty()))
    }

    /// Records every expected lecture number that the scan did not find.
    pub fn expect_lectures(&mut self, numbers: &[u32]) {
        self.missing_lectures = numbers
            .iter()
            .copied()
            .filter(|n| !self.lectures.iter().any(|l| l.number == *n))
            .collect();
    }
}

fn lecture_number(name: &str) -> Option<u32> {
    name.strip_prefix("lecture_")
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
}

fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// 每個 Makefile 目標對應一條 `^target:` 規則
fn target_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        MAKE_TARGETS
            .iter()
            .map(|target| {
                let pattern = format!(r"(?m)^{}\s*:", regex::escape(target));
                let re = Regex::new(&pattern).expect("valid make target pattern");
                (*target, re)
            })
            .collect()
    })
}

fn missing_make_targets(makefile: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(makefile)?;
    Ok(target_patterns()
        .iter()
        .filter(|(_, re)| !re.is_match(&content))
        .map(|(target, _)| target.to_string())
        .collect())
}

pub fn check_lecture(path: &Path, number: u32) -> Result<LectureStatus> {
    let missing: Vec<String> = REQUIRED_ENTRIES
        .iter()
        .filter(|entry| {
            let target = path.join(entry.name);
            match entry.kind {
                EntryKind::Dir => !target.is_dir(),
                EntryKind::File => !target.is_file(),
            }
        })
        .map(|entry| match entry.kind {
            EntryKind::Dir => format!("{}/", entry.name),
            EntryKind::File => entry.name.to_string(),
        })
        .collect();

    let makefile = path.join("Makefile");
    let missing_targets = if makefile.is_file() {
        missing_make_targets(&makefile)?
    } else {
        Vec::new()
    };

    let notebook_count = files_with_extension(&path.join("notebooks"), "ipynb")?.len();
    let slide_sources = files_with_extension(&path.join("slides"), "tex")?;

    let mut warnings = Vec::new();
    let expected_slides = format!("lecture_{}.tex", number);
    if slide_sources.is_empty() {
        warnings.push("no slide sources".to_string());
    } else if !slide_sources.contains(&expected_slides) {
        warnings.push(format!("expected slides/{}", expected_slides));
    }

    Ok(LectureStatus {
        number,
        path: path.to_path_buf(),
        missing,
        missing_targets,
        notebook_count,
        slide_sources,
        warnings,
    })
}

pub fn scan_workshop<P: AsRef<Path>>(root: P) -> Result<LayoutReport> {
    let root = root.as_ref();
    let mut lectures = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(number) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(lecture_number)
        else {
            continue;
        };

        let status = check_lecture(&path, number)?;
        tracing::debug!(
            "lecture_{}: {} missing, {} notebooks",
            number,
            status.missing.len(),
            status.notebook_count
        );
        lectures.push(status);
    }

    lectures.sort_by_key(|l| l.number);
    Ok(LayoutReport {
        root: root.to_path_buf(),
        lectures,
        missing_lectures: Vec::new(),
    })
}
