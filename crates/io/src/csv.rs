// Delimited text read/write shared by the CSV directory store and the report file.

use std::io::Read;
use std::path::Path;

use crate::error::StoreError;
use crate::store::Rows;

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

/// Fields on one line when split by `delimiter`, honouring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Pick the delimiter whose header width repeats most steadily over the
/// first lines. Scored as (lines matching the header width) x width, so wider
/// splits win ties; earlier candidates win exact ties. Comma when nothing
/// splits the first line.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
    let Some(first) = sample.first() else {
        return b',';
    };

    DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let width = field_count(first, delim);
            if width < 2 {
                return None;
            }
            let steady = sample.iter().filter(|line| field_count(line, delim) == width).count();
            Some((steady * width, delim))
        })
        .fold((0, b','), |best, cand| if cand.0 > best.0 { cand } else { best })
        .1
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback for Excel exports).
pub fn read_file_as_utf8(path: &Path) -> Result<String, StoreError> {
    let mut file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| StoreError::io(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::debug!(path = %path.display(), "not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text into raw rows. Ragged rows are kept as read.
pub fn parse_rows(content: &str, delimiter: u8) -> Result<Rows, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(rows)
}

/// Read a delimited file, sniffing its delimiter. Returns rows and the delimiter used.
pub fn read_rows(path: &Path) -> Result<(Rows, u8), StoreError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    let rows = parse_rows(&content, delimiter).map_err(|e| StoreError::csv(path, e))?;
    Ok((rows, delimiter))
}

/// Write rows through a sibling temp file renamed into place, so a failed
/// write never leaves a half-written tab behind.
pub fn write_rows(path: &Path, rows: &[Vec<String>], delimiter: u8) -> Result<(), StoreError> {
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(&tmp)
            .map_err(|e| StoreError::csv(&tmp, e))?;
        for row in rows {
            writer.write_record(row).map_err(|e| StoreError::csv(&tmp, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
    }
    std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Phone;City\nAcme;4035550134;Calgary\nGlow;7805550000;Edmonton\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Phone,City\nAcme,4035550134,Calgary\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("name\nAcme\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tPhone\tCity\nAcme\t4035550134\tCalgary\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Café" with 0xE9 as a single Windows-1252 byte
        fs::write(&path, b"name\nCaf\xe9 Luna\n").unwrap();
        let (rows, _) = read_rows(&path).unwrap();
        assert_eq!(rows[1][0], "Café Luna");
    }

    #[test]
    fn test_bom_is_stripped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}name,phone\nAcme,1\n").unwrap();
        let (rows, _) = read_rows(&path).unwrap();
        assert_eq!(rows[0][0], "name");
    }

    #[test]
    fn test_ragged_rows_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        let rows = vec![
            vec!["name".to_string(), "phone".to_string(), "notes".to_string()],
            vec!["Acme, Inc".to_string()],
            vec![" padded ".to_string(), "".to_string(), "say \"hi\"".to_string()],
        ];
        write_rows(&path, &rows, b';').unwrap();
        assert!(!path.with_extension("csv.tmp").exists());

        let (back, delim) = read_rows(&path).unwrap();
        assert_eq!(delim, b';');
        assert_eq!(back, rows);
    }
}
