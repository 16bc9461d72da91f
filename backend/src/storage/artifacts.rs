use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid file name")]
    InvalidFileName,
    #[error("File not found")]
    NotFound,
}

/// Local directories holding generated reports and temporary chart images.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    reports_dir: PathBuf,
    charts_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(reports_dir: impl Into<PathBuf>, charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            charts_dir: charts_dir.into(),
        }
    }

    /// Creates both directories if missing. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.reports_dir)?;
        std::fs::create_dir_all(&self.charts_dir)?;
        Ok(())
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn charts_dir(&self) -> &Path {
        &self.charts_dir
    }

    pub fn sanitize_patient_name(name: &str) -> String {
        let sanitized: String = name
            .trim()
            .chars()
            .filter_map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    Some(c)
                } else if c.is_whitespace() {
                    Some('_')
                } else {
                    None
                }
            })
            .collect();

        if sanitized.is_empty() {
            "UnknownPatient".to_string()
        } else {
            sanitized
        }
    }

    pub fn generate_report_name<Tz: TimeZone>(patient_name: &str, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{}_Medical_Report_{}_{}.pdf",
            Self::sanitize_patient_name(patient_name),
            at.format("%Y%m%d%H%M%S"),
            &suffix[..8]
        )
    }

    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.reports_dir.join(file_name)
    }

    pub fn new_chart_path(&self, kind: &str) -> PathBuf {
        self.charts_dir
            .join(format!("{}_{}.png", kind, Uuid::new_v4().simple()))
    }

    pub fn validate_file_name(file_name: &str) -> Result<(), StorageError> {
        let valid = !file_name.is_empty()
            && file_name.ends_with(".pdf")
            && !file_name.starts_with('.')
            && file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(())
        } else {
            Err(StorageError::InvalidFileName)
        }
    }

    /// Resolves a client-supplied report name to an existing file inside the
    /// reports directory.
    pub fn resolve_report(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        Self::validate_file_name(file_name)?;
        let path = self.report_path(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StorageError::NotFound)
        }
    }
}
