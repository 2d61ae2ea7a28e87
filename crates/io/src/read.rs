use std::io::Read;
use std::path::Path;

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_plain_utf8() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all("Name,Set\nLim-Dûl's Vault,ALL\n".as_bytes()).unwrap();
        let text = read_file_as_utf8(f.path()).unwrap();
        assert!(text.contains("Lim-Dûl's Vault"));
    }

    #[test]
    fn recovers_windows_1252() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        // "Dûl" in Windows-1252: 0xFB is û, invalid as UTF-8 here.
        f.write_all(b"Name\nD\xFBl\n").unwrap();
        let text = read_file_as_utf8(f.path()).unwrap();
        assert!(text.contains("Dûl"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_file_as_utf8(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(err.contains("cannot read"));
    }
}
