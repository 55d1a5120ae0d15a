use crate::domain::model::Resume;
use crate::utils::error::{Result, ScreenerError};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const ID_COLUMN: &str = "ID";
const TEXT_COLUMN: &str = "Resume_str";
const HTML_COLUMN: &str = "Resume_html";

/// 以 ID 為鍵的履歷集合，依 ID 排序迭代
#[derive(Debug, Clone, Default)]
pub struct ResumeBook {
    resumes: BTreeMap<String, Resume>,
}

impl ResumeBook {
    pub fn len(&self) -> usize {
        self.resumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resumes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Resume> {
        self.resumes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resume> {
        self.resumes.values()
    }

    /// Picks `ids` in the given order (or everything when empty), then applies `limit`.
    pub fn select(&self, ids: &[String], limit: Option<usize>) -> Result<Vec<Resume>> {
        let mut selected = if ids.is_empty() {
            self.resumes.values().cloned().collect::<Vec<_>>()
        } else {
            ids.iter()
                .map(|id| {
                    self.resumes
                        .get(id)
                        .cloned()
                        .ok_or_else(|| ScreenerError::ProcessingError {
                            message: format!("resume '{}' not found in dataset", id),
                        })
                })
                .collect::<Result<Vec<_>>>()?
        };

        if let Some(limit) = limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }
}

pub fn parse_resumes<R: Read>(reader: R) -> Result<ResumeBook> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ScreenerError::MissingColumn {
                column: name.to_string(),
            })
    };
    let id_idx = column(ID_COLUMN)?;
    let text_idx = column(TEXT_COLUMN)?;
    let html_idx = column(HTML_COLUMN)?;

    let mut resumes = BTreeMap::new();
    for record in csv_reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let resume = Resume {
            id: field(id_idx),
            text: field(text_idx),
            html: field(html_idx),
        };
        // 重複 ID 以後出現者為準
        if resumes.insert(resume.id.clone(), resume).is_some() {
            tracing::debug!("Duplicate resume ID replaced earlier row");
        }
    }

    tracing::debug!("Parsed {} resumes", resumes.len());
    Ok(ResumeBook { resumes })
}

pub fn load_resumes<P: AsRef<Path>>(path: P) -> Result<ResumeBook> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_resumes(file)
}

pub fn load_job_requirements<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "ID,Resume_str,Resume_html,Category\n\
20,\"Data engineer, 5 years\",<p>de</p>,ENGINEERING\n\
10,Junior analyst,<p>ja</p>,FINANCE\n\
30,Intern,<p>in</p>,ENGINEERING\n";

    #[test]
    fn test_parse_resumes_keyed_by_id() {
        let book = parse_resumes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(book.len(), 3);
        let resume = book.get("20").unwrap();
        assert_eq!(resume.text, "Data engineer, 5 years");
        assert_eq!(resume.html, "<p>de</p>");

        let ids: Vec<&str> = book.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "20", "30"]);
    }

    #[test]
    fn test_duplicate_id_keeps_last_row() {
        let csv = "ID,Resume_str,Resume_html\n1,first,<p/>\n1,second,<p/>\n";
        let book = parse_resumes(csv.as_bytes()).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("1").unwrap().text, "second");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "ID,Resume_str\n1,text\n";
        let err = parse_resumes(csv.as_bytes()).unwrap_err();
        match err {
            ScreenerError::MissingColumn { column } => assert_eq!(column, "Resume_html"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_select_by_ids_and_limit() {
        let book = parse_resumes(SAMPLE.as_bytes()).unwrap();

        let picked = book
            .select(&["30".to_string(), "10".to_string()], None)
            .unwrap();
        assert_eq!(picked[0].id, "30");
        assert_eq!(picked[1].id, "10");

        let limited = book.select(&[], Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, "10");

        assert!(book.select(&["99".to_string()], None).is_err());
    }

    #[test]
    fn test_load_from_files() {
        let mut csv_file = NamedTempFile::new().unwrap();
        csv_file.write_all(SAMPLE.as_bytes()).unwrap();
        let book = load_resumes(csv_file.path()).unwrap();
        assert_eq!(book.len(), 3);

        let mut md = NamedTempFile::new().unwrap();
        md.write_all(b"# Senior Rust Engineer\n- 5+ years").unwrap();
        let requirements = load_job_requirements(md.path()).unwrap();
        assert!(requirements.starts_with("# Senior Rust Engineer"));
    }
}
