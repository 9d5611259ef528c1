use anyhow::{Context, Result};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::error::TranslationError;

/// Largest input accepted from a file or stdin.
pub const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB

const BOM: char = '\u{feff}';

pub struct InputReader;

impl InputReader {
    /// Reads `file_path`, or stdin when no path is given.
    pub fn read(file_path: Option<&Path>) -> Result<String> {
        let raw = match file_path {
            Some(path) => Self::read_file(path)?,
            None => Self::read_stdin()?,
        };
        Ok(normalize(&raw))
    }

    /// Returns `true` when stdin is piped or redirected rather than a terminal.
    pub fn stdin_is_piped() -> bool {
        !io::stdin().is_terminal()
    }

    fn read_file(path: &Path) -> Result<String> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to access file: {}", path.display()))?;

        let size = metadata.len() as usize;
        if size > MAX_INPUT_SIZE {
            return Err(too_large(size, "Consider splitting the file into smaller parts.").into());
        }

        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        String::from_utf8(bytes).map_err(|_| {
            TranslationError::invalid_with_hint(
                format!("File is not valid UTF-8: {}", path.display()),
                "Convert the file to UTF-8 and try again.",
            )
            .into()
        })
    }

    #[allow(clippy::significant_drop_tightening)]
    fn read_stdin() -> Result<String> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];
        let mut stdin = io::stdin().lock();

        loop {
            let bytes_read = stdin
                .read(&mut chunk)
                .context("Failed to read from stdin")?;

            if bytes_read == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..bytes_read]);

            if buffer.len() > MAX_INPUT_SIZE {
                return Err(
                    too_large(buffer.len(), "Consider splitting the input into smaller parts.")
                        .into(),
                );
            }
        }

        String::from_utf8(buffer).map_err(|_| {
            TranslationError::invalid_with_hint(
                "Input is not valid UTF-8",
                "Convert the input to UTF-8 and try again.",
            )
            .into()
        })
    }
}

fn too_large(size: usize, hint: &str) -> TranslationError {
    TranslationError::invalid_with_hint(
        format!(
            "Input size ({:.1} MB) exceeds maximum allowed size (1 MB)",
            size as f64 / 1024.0 / 1024.0
        ),
        hint,
    )
}

/// Strips a leading byte-order mark and converts CRLF line endings.
fn normalize(raw: &str) -> String {
    let text = raw.strip_prefix(BOM).unwrap_or(raw);
    if text.contains("\r\n") {
        text.replace("\r\n", "\n")
    } else {
        text.to_string()
    }
}
