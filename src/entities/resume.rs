//! Uploaded resume files and the admin report export

use crate::core::error::ValidationError;
use crate::core::{Entity, FieldValue, Record};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::OnceLock;
use uuid::Uuid;

/// Default upload limit (5 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Header row of the report export
pub const CSV_HEADER: &str = "File Name,Uploaded By,Upload Date,File Size";

const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/png",
    "image/jpg",
    "image/jpeg",
];

/// Broad document family, used for the report's type column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Doc,
    Image,
    Other,
}

impl FileKind {
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type {
            "application/pdf" => FileKind::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                FileKind::Doc
            }
            ct if ct.starts_with("image/") => FileKind::Image,
            _ => FileKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_name: String,
    pub uploaded_by: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub storage_key: String,
    pub download_url: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: String,
}

impl ResumeFile {
    /// Route that serves the stored file to its owner and to admins
    pub fn download_path(id: Uuid) -> String {
        format!("/api/resumes/{}/file", id)
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_content_type(&self.content_type)
    }

    /// One CSV row matching [`CSV_HEADER`]
    pub fn csv_row(&self) -> String {
        [
            csv_field(&self.file_name),
            csv_field(&self.uploaded_by),
            self.uploaded_at.format("%Y-%m-%d").to_string(),
            csv_field(&human_size(self.size_bytes)),
        ]
        .join(",")
    }
}

impl Record for ResumeFile {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "owner_id" => Some(self.owner_id.into()),
            "file_name" => Some(self.file_name.as_str().into()),
            "uploaded_by" => Some(self.uploaded_by.as_str().into()),
            "content_type" => Some(self.content_type.as_str().into()),
            "size_bytes" => Some(FieldValue::Integer(
                i64::try_from(self.size_bytes).unwrap_or(i64::MAX),
            )),
            "storage_key" => Some(self.storage_key.as_str().into()),
            "uploaded_at" => Some(self.uploaded_at.into()),
            "status" => Some(self.status.as_str().into()),
            _ => None,
        }
    }
}

impl Entity for ResumeFile {
    fn resource_name() -> &'static str {
        "resumes"
    }

    fn resource_name_singular() -> &'static str {
        "resume"
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["file_name", "uploaded_by"]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["file_name", "uploaded_at", "size_bytes"]
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}

/// An incoming upload, before it is stored
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub owner_id: Uuid,
    pub uploaded_by: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl ResumeUpload {
    /// Check format and size against the upload rules
    pub fn validate(&self, max_bytes: u64) -> Result<FileKind, ValidationError> {
        let content_type = media_type(&self.content_type);
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ValidationError::field(
                "content_type",
                "Format not supported. Please upload only PDF, Word, PNG, JPG or JPEG documents",
            ));
        }
        if self.size_bytes == 0 {
            return Err(ValidationError::field("file", "File is empty"));
        }
        if self.size_bytes > max_bytes {
            return Err(ValidationError::field(
                "file",
                format!("File size must be at most {}", human_size(max_bytes)),
            ));
        }
        if sanitize_file_name(&self.file_name).is_empty() {
            return Err(ValidationError::field("file_name", "A file name is required"));
        }
        Ok(FileKind::from_content_type(&content_type))
    }

    /// Blob key the file is stored under
    pub fn storage_key(&self, at: DateTime<Utc>) -> String {
        format!(
            "resumes/{}_{}_{}",
            self.owner_id,
            at.timestamp_millis(),
            sanitize_file_name(&self.file_name)
        )
    }

    /// Media type without parameters, as stored with the blob
    pub fn media_type(&self) -> String {
        media_type(&self.content_type)
    }

    /// Metadata record for a stored upload
    pub fn into_resume(self, storage_key: String, at: DateTime<Utc>) -> ResumeFile {
        let id = Uuid::new_v4();
        let content_type = self.media_type();
        ResumeFile {
            id,
            owner_id: self.owner_id,
            file_name: sanitize_file_name(&self.file_name),
            uploaded_by: self.uploaded_by,
            content_type,
            size_bytes: self.size_bytes,
            storage_key,
            download_url: ResumeFile::download_path(id),
            uploaded_at: at,
            status: "uploaded".to_string(),
        }
    }
}

/// `application/pdf; charset=binary` -> `application/pdf`
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Strip directories and control characters from a client-supplied name
pub fn sanitize_file_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[\x00-\x1f\x7f]").unwrap());

    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    unsafe_chars.replace_all(base, "").trim().to_string()
}

/// Size with binary units, at most two decimals (`2.3 MB`, `856 KB`)
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{:.2}", value);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[unit])
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the report export, header first, one line per file
pub fn export_csv(files: &[ResumeFile]) -> String {
    let mut out = String::from(CSV_HEADER);
    for file in files {
        let _ = write!(out, "\n{}", file.csv_row());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn upload(file_name: &str, content_type: &str, size_bytes: u64) -> ResumeUpload {
        ResumeUpload {
            owner_id: Uuid::nil(),
            uploaded_by: "Ali Raza".to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
        }
    }

    #[test]
    fn test_allowed_formats() {
        assert_eq!(upload("cv.pdf", "application/pdf", 1024).validate(MAX_UPLOAD_BYTES), Ok(FileKind::Pdf));
        assert_eq!(upload("cv.png", "image/PNG", 1024).validate(MAX_UPLOAD_BYTES), Ok(FileKind::Image));
        assert_eq!(
            upload(
                "cv.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                1024
            )
            .validate(MAX_UPLOAD_BYTES),
            Ok(FileKind::Doc)
        );
        assert_eq!(
            upload("cv.pdf", "application/pdf; charset=binary", 1024).validate(MAX_UPLOAD_BYTES),
            Ok(FileKind::Pdf)
        );
        assert!(upload("cv.txt", "text/plain", 1024).validate(MAX_UPLOAD_BYTES).is_err());
        assert!(upload("cv.txt", "text/plain; application/pdf", 1024).validate(MAX_UPLOAD_BYTES).is_err());
        assert!(upload("cv.gif", "image/gif", 1024).validate(MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(upload("cv.pdf", "application/pdf", MAX_UPLOAD_BYTES).validate(MAX_UPLOAD_BYTES).is_ok());
        assert!(upload("cv.pdf", "application/pdf", MAX_UPLOAD_BYTES + 1).validate(MAX_UPLOAD_BYTES).is_err());
        assert!(upload("cv.pdf", "application/pdf", 0).validate(MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn test_storage_key_and_sanitizing() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let up = upload("../../etc/My CV.pdf", "application/pdf", 10);
        assert_eq!(
            up.storage_key(at),
            format!("resumes/{}_{}_My CV.pdf", Uuid::nil(), at.timestamp_millis())
        );
        assert_eq!(sanitize_file_name("C:\\Users\\ali\\cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_file_name("bad\u{0007}name.pdf"), "badname.pdf");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 Bytes");
        assert_eq!(human_size(500), "500 Bytes");
        assert_eq!(human_size(856 * 1024), "856 KB");
        assert_eq!(human_size(2_411_724), "2.3 MB");
        assert_eq!(human_size(1536), "1.5 KB");
    }

    #[test]
    fn test_export_csv_quotes_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let file = upload("resume, final.pdf", "application/pdf", 856 * 1024)
            .into_resume("resumes/key".to_string(), at);
        let csv = export_csv(&[file]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("\"resume, final.pdf\",Ali Raza,2024-03-15,856 KB"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_into_resume_starts_uploaded() {
        let file = upload("cv.pdf", "Application/PDF; charset=binary", 10)
            .into_resume("k".to_string(), Utc::now());
        assert_eq!(file.status, "uploaded");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.download_url, format!("/api/resumes/{}/file", file.id));
        assert_eq!(file.kind(), FileKind::Pdf);
        assert_eq!(file.field_value("size_bytes"), Some(FieldValue::Integer(10)));
    }
}
