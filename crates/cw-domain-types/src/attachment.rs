// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Attachment value objects
//!
//! A `MessageAttachment` describes one file reference attached to a chat
//! message: either an uploaded binary or a file selected from an external
//! workspace provider. Attachments are created once (when an upload
//! finishes or a workspace file is picked) and are immutable thereafter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the attached file lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Binary uploaded through the product's own storage
    Uploaded,
    /// File referenced from the Google workspace provider
    Google,
}

/// Errors raised by attachment construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("attachment fileId cannot be empty")]
    EmptyFileId,

    #[error("attachment fileName cannot be empty")]
    EmptyFileName,
}

/// A file reference attached to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAttachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Opaque, provider-scoped identifier
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Size in bytes
    #[serde(rename = "fileSize")]
    pub file_size: u64,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Normalized category string, see [`display_file_type`]
    #[serde(rename = "fileType")]
    pub file_type: String,
    /// Retrieval link; may be empty for pending uploads
    #[serde(default)]
    pub url: String,
    /// Text-extraction result, immutable once set
    #[serde(rename = "extractedText", skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(rename = "extractedAt", skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl MessageAttachment {
    /// Create a new attachment, rejecting empty identifiers
    pub fn new(
        kind: AttachmentKind,
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        file_size: u64,
        mime_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, AttachmentError> {
        let file_id = file_id.into();
        if file_id.is_empty() {
            return Err(AttachmentError::EmptyFileId);
        }
        let file_name = file_name.into();
        if file_name.is_empty() {
            return Err(AttachmentError::EmptyFileName);
        }
        let mime_type = mime_type.into();
        let file_type = display_file_type(&mime_type, &file_name);

        Ok(Self {
            kind,
            file_id,
            file_name,
            file_size,
            mime_type,
            file_type,
            url: url.into(),
            extracted_text: None,
            extracted_at: None,
        })
    }
}

/// Format a byte count for display using a binary (1024) base.
///
/// Values are rendered with at most one decimal place; a trailing `.0`
/// is dropped, so 1024 renders as "1 KB" and 1536 as "1.5 KB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        let rounded = (value * 10.0).round() / 10.0;
        if (rounded - rounded.trunc()).abs() < f64::EPSILON {
            format!("{} {}", rounded.trunc() as u64, UNITS[unit])
        } else {
            format!("{:.1} {}", rounded, UNITS[unit])
        }
    }
}

/// Normalize a MIME type (with the file name as a fallback hint) into the
/// category string shown next to an attachment.
pub fn display_file_type(mime_type: &str, file_name: &str) -> String {
    match mime_type {
        "application/pdf" => return "PDF".to_string(),
        "application/vnd.google-apps.document" => return "Google Doc".to_string(),
        "application/vnd.google-apps.spreadsheet" => return "Google Sheet".to_string(),
        "application/vnd.google-apps.presentation" => return "Google Slides".to_string(),
        "application/json" => return "JSON".to_string(),
        "text/csv" => return "CSV".to_string(),
        _ => {}
    }

    if mime_type.starts_with("image/") {
        return "Image".to_string();
    }
    if mime_type.starts_with("audio/") {
        return "Audio".to_string();
    }
    if mime_type.starts_with("video/") {
        return "Video".to_string();
    }
    if mime_type.starts_with("text/") {
        return "Text".to_string();
    }
    if mime_type.contains("spreadsheet") || mime_type.contains("excel") {
        return "Spreadsheet".to_string();
    }
    if mime_type.contains("word") || mime_type.contains("document") {
        return "Document".to_string();
    }

    // Fall back to the file extension
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_uppercase(),
        _ => "File".to_string(),
    }
}
