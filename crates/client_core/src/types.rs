use std::path::Path;

use anyhow::{Context, Result};

/// File extensions the audio service accepts. Uploads of anything else are
/// rejected server-side, so callers should restrict selection to these.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["wav"];

/// A locally chosen audio file, fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl AudioFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("'{}' has no usable file name", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read audio file '{}'", path.display()))?;
        Ok(Self { filename, bytes })
    }

    pub fn has_accepted_extension(&self) -> bool {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
            .unwrap_or(false)
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_wav_regardless_of_case() {
        assert!(AudioFile::new("song.wav", Vec::new()).has_accepted_extension());
        assert!(AudioFile::new("SONG.WAV", Vec::new()).has_accepted_extension());
        assert!(!AudioFile::new("song.mp3", Vec::new()).has_accepted_extension());
        assert!(!AudioFile::new("song", Vec::new()).has_accepted_extension());
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let file = AudioFile::new("blob.unknownext", vec![1, 2, 3]);
        assert_eq!(file.mime_type(), "application/octet-stream");
        assert_eq!(file.size_bytes(), 3);
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = std::env::temp_dir().join(format!("audio_client_types_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("take-1.wav");
        std::fs::write(&path, b"RIFF....WAVE").expect("write");

        let file = AudioFile::from_path(&path).await.expect("read");
        assert_eq!(file.filename, "take-1.wav");
        assert_eq!(file.bytes, b"RIFF....WAVE");

        std::fs::remove_dir_all(dir).expect("cleanup");
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let err = AudioFile::from_path("/definitely/not/here.wav")
            .await
            .expect_err("missing file");
        assert!(err.to_string().contains("failed to read audio file"));
    }
}
