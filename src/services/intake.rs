//! File intake
//!
//! Dropped files (bracketed paste) and the path prompt both end up in
//! `FileIntake::select_file`, which validates the candidate and swaps the
//! current upload and its preview together.

use crate::error::IntakeError;
use crate::model::{FileCandidate, PreviewHandle, PreviewRegistry, UploadedFile};
use crate::model::upload::mime_for_path;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest upload the extraction service accepts
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Owner of the current upload and its preview handle
#[derive(Debug, Default)]
pub struct FileIntake {
    current: Option<UploadedFile>,
    preview: Option<PreviewHandle>,
    previews: PreviewRegistry,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&UploadedFile> {
        self.current.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    #[cfg(test)]
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    /// Pick up a finished preview thumbnail; true when it changed
    pub fn poll_preview(&mut self) -> bool {
        self.preview.as_mut().is_some_and(|p| p.poll())
    }

    /// Validate `candidate` and make it the current upload
    ///
    /// On error nothing changes. On success the previous preview is released
    /// before the new one is created.
    pub fn select_file(&mut self, candidate: FileCandidate) -> Result<&UploadedFile, IntakeError> {
        validate(&candidate)?;

        let file = UploadedFile::from(candidate);
        self.preview = None;
        let preview = self.previews.create(&file);

        tracing::info!(
            file = %file.name,
            mime = %file.mime,
            bytes = file.size(),
            preview = preview.id(),
            live_previews = self.previews.live_count(),
            "source image selected"
        );
        self.preview = Some(preview);

        Ok(self.current.insert(file))
    }
}

fn validate(candidate: &FileCandidate) -> Result<(), IntakeError> {
    if !candidate.is_image() {
        tracing::info!(file = %candidate.name, mime = %candidate.mime, "rejected non-image file");
        return Err(IntakeError::NotAnImage {
            mime: candidate.mime.clone(),
        });
    }
    check_size(&candidate.name, candidate.len() as u64)
}

fn check_size(name: &str, size: u64) -> Result<(), IntakeError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(IntakeError::TooLarge {
            name: name.to_string(),
            size_mb: size as f64 / (1024.0 * 1024.0),
            limit_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
        });
    }
    Ok(())
}

/// Build a candidate from a path on disk
///
/// Non-image and oversized files are rejected from metadata alone, before
/// their contents are read.
pub fn read_candidate(path: &Path) -> Result<FileCandidate, IntakeError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_for_path(path);

    if !mime.starts_with("image/") {
        return Err(IntakeError::NotAnImage {
            mime: mime.to_string(),
        });
    }

    let unreadable = |e: std::io::Error| IntakeError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let metadata = fs::metadata(path).map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(IntakeError::Unreadable {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }
    check_size(&name, metadata.len())?;

    let bytes = fs::read(path).map_err(unreadable)?;
    Ok(FileCandidate::new(name, mime, bytes))
}

/// Split pasted text from a terminal drag-and-drop into paths
///
/// Terminals paste dropped files as whitespace-separated paths, quoted or
/// backslash-escaped when they contain spaces, or as `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.trim().chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' => quote = Some(c),
                '\\' if !cfg!(windows) => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        paths.push(to_path(std::mem::take(&mut current)));
                    }
                }
                c => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        paths.push(to_path(current));
    }

    paths
}

fn to_path(raw: String) -> PathBuf {
    match raw.strip_prefix("file://") {
        Some(rest) => match urlencoding::decode(rest) {
            Ok(decoded) => PathBuf::from(decoded.into_owned()),
            Err(_) => PathBuf::from(rest),
        },
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::preview::png_bytes;
    use tempfile::tempdir;

    fn image(name: &str) -> FileCandidate {
        FileCandidate::new(name, "image/png", png_bytes(4, 4))
    }

    #[test]
    fn test_non_image_is_rejected_and_state_kept() {
        let mut intake = FileIntake::new();
        intake.select_file(image("cake.png")).unwrap();
        let preview_id = intake.preview().map(|p| p.id());

        let err = intake
            .select_file(FileCandidate::new("menu.pdf", "application/pdf", vec![1u8, 2]))
            .unwrap_err();

        assert_eq!(err.to_string(), "Please upload an image file");
        assert_eq!(intake.current().map(|f| f.name.as_str()), Some("cake.png"));
        assert_eq!(intake.preview().map(|p| p.id()), preview_id);
        assert_eq!(intake.live_previews(), 1);
    }

    #[test]
    fn test_rejection_with_nothing_selected_creates_no_preview() {
        let mut intake = FileIntake::new();
        let result = intake.select_file(FileCandidate::new("a.txt", "text/plain", vec![0u8]));

        assert!(result.is_err());
        assert!(intake.current().is_none());
        assert!(intake.preview().is_none());
        assert_eq!(intake.live_previews(), 0);
    }

    #[test]
    fn test_only_last_preview_stays_live() {
        let mut intake = FileIntake::new();
        for i in 0..5 {
            intake.select_file(image(&format!("cake{}.png", i))).unwrap();
            assert_eq!(intake.live_previews(), 1);
        }

        let preview = intake.preview().unwrap();
        assert_eq!(preview.file_name, "cake4.png");
        assert_eq!(intake.current().unwrap().name, "cake4.png");
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let mut intake = FileIntake::new();
        let big = vec![0u8; MAX_UPLOAD_BYTES as usize + 1];
        let err = intake
            .select_file(FileCandidate::new("huge.png", "image/png", big))
            .unwrap_err();

        assert!(matches!(err, IntakeError::TooLarge { limit_mb: 16, .. }));
        assert!(intake.current().is_none());
    }

    #[test]
    fn test_read_candidate_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        fs::write(&path, png_bytes(2, 2)).unwrap();

        let candidate = read_candidate(&path).unwrap();
        assert_eq!(candidate.name, "receipt.png");
        assert_eq!(candidate.mime, "image/png");
        assert!(candidate.len() > 0);
    }

    #[test]
    fn test_read_candidate_rejects_pdf_without_reading() {
        let err = read_candidate(Path::new("/does/not/exist/menu.pdf")).unwrap_err();
        assert!(matches!(err, IntakeError::NotAnImage { .. }));
    }

    #[test]
    fn test_read_candidate_missing_image() {
        let err = read_candidate(Path::new("/does/not/exist/cake.jpg")).unwrap_err();
        assert!(matches!(err, IntakeError::Unreadable { .. }));
    }

    #[test]
    fn test_parse_dropped_paths() {
        assert_eq!(
            parse_dropped_paths("/tmp/cake.jpg\n"),
            vec![PathBuf::from("/tmp/cake.jpg")]
        );
        assert_eq!(
            parse_dropped_paths("'/tmp/my cake.jpg' \"/tmp/bun.png\""),
            vec![PathBuf::from("/tmp/my cake.jpg"), PathBuf::from("/tmp/bun.png")]
        );
        assert_eq!(
            parse_dropped_paths("file:///tmp/rye%20bread.png"),
            vec![PathBuf::from("/tmp/rye bread.png")]
        );
        assert!(parse_dropped_paths("   ").is_empty());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_parse_dropped_paths_escaped_spaces() {
        assert_eq!(
            parse_dropped_paths("/tmp/my\\ cake.jpg"),
            vec![PathBuf::from("/tmp/my cake.jpg")]
        );
    }
}
