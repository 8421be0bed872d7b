//! Text source: a file path or stdin.

use crate::defaults::STDIO_PATH;
use crate::error::{ReadaloudError, Result};
use std::io::Read;
use std::path::Path;

/// Read the whole text source as UTF-8.
///
/// `-` reads stdin. A missing or unreadable file, invalid UTF-8 or an empty
/// stdin stream are all input errors.
pub fn read_input(src: &str) -> Result<String> {
    if src == STDIO_PATH {
        let mut buffer = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut buffer)
            .map_err(|e| ReadaloudError::Input {
                message: format!("Failed to read from stdin: {}", e),
            })?;
        if buffer.is_empty() {
            return Err(ReadaloudError::Input {
                message: "stdin is empty".to_string(),
            });
        }
        return Ok(buffer);
    }

    read_file(Path::new(src))
}

/// Read a text file, mapping I/O failures to [`ReadaloudError::Input`].
pub fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ReadaloudError::Input {
            message: format!("file not found: {}", path.display()),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ReadaloudError::Input {
        message: format!("Failed to read {}: {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_utf8_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("こんにちは。Hello.".as_bytes()).unwrap();

        let text = read_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(text, "こんにちは。Hello.");
    }

    #[test]
    fn missing_file_is_input_error() {
        let result = read_input("/tmp/readaloud_missing_input_98431.md");
        match result {
            Err(ReadaloudError::Input { message }) => {
                assert!(message.contains("file not found"), "got: {}", message);
            }
            other => panic!("Expected Input error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_utf8_is_input_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0xfd]).unwrap();

        let result = read_file(file.path());
        assert!(matches!(result, Err(ReadaloudError::Input { .. })));
    }

    #[test]
    fn empty_file_reads_as_empty_text() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(read_file(file.path()).unwrap(), "");
    }
}
