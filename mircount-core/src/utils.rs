use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::MultiGzDecoder;

use crate::errors::{CountingError, CountingResult};

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    SAM,
    BAM,
    UNKNOWN,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sam" => Ok(FileType::SAM),
            "bam" => Ok(FileType::BAM),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

///
/// Work out the file type from the extension, looking through a trailing `.gz`.
///
pub fn get_file_info(path: &Path) -> FileInfo {
    let mut file_type = FileType::UNKNOWN;
    let mut is_gzipped = false;

    if let Some(filename) = path.file_name().and_then(OsStr::to_str) {
        let base = match filename.strip_suffix(".gz") {
            Some(base) => {
                is_gzipped = true;
                PathBuf::from(base)
            }
            None => PathBuf::from(filename),
        };
        if let Some(ext) = base.extension().and_then(OsStr::to_str) {
            file_type = FileType::from_str(ext).unwrap_or(FileType::UNKNOWN);
        }
    }

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> CountingResult<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|source| CountingError::FileReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read the next line into `buf` as raw bytes, with its `\n` / `\r\n` terminator
/// removed.
///
/// Returns `false` at end of input. Lines are not decoded, so a record with
/// invalid UTF-8 can be rejected on its own without ending the stream.
///
pub fn read_line_bytes<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(true)
}

///
/// Read a one-entry-per-line list file (reference names, sample names).
///
/// Surrounding whitespace is trimmed and blank lines are dropped.
///
pub fn read_list_file(path: &Path) -> CountingResult<Vec<String>> {
    let reader = get_dynamic_reader(path)?;

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if !entry.is_empty() {
            entries.push(entry.to_string());
        }
    }

    Ok(entries)
}

///
/// File name with every extension removed: `lib/sample_1.trimmed.sam.gz` -> `sample_1`.
///
pub fn remove_all_extensions(path: &Path) -> String {
    let mut name = match path.file_name() {
        Some(name) => PathBuf::from(name),
        None => return path.to_string_lossy().to_string(),
    };

    while name.extension().is_some() {
        name = name.with_extension("");
    }

    name.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    #[rstest]
    #[case("sample.sam", FileType::SAM, false)]
    #[case("sample.sam.gz", FileType::SAM, true)]
    #[case("sample.SAM", FileType::SAM, false)]
    #[case("sample.bam", FileType::BAM, false)]
    #[case("sample.fastq", FileType::UNKNOWN, false)]
    #[case("references.txt", FileType::UNKNOWN, false)]
    #[case("sample", FileType::UNKNOWN, false)]
    fn test_get_file_info(
        #[case] name: &str,
        #[case] file_type: FileType,
        #[case] is_gzipped: bool,
    ) {
        let info = get_file_info(Path::new(name));
        assert_eq!(
            info,
            FileInfo {
                file_type,
                is_gzipped
            }
        );
    }

    #[rstest]
    #[case("lib/sample_1.trimmed.sam.gz", "sample_1")]
    #[case("sample_2.sam", "sample_2")]
    #[case("sample_3", "sample_3")]
    fn test_remove_all_extensions(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(remove_all_extensions(Path::new(path)), expected);
    }

    #[rstest]
    fn test_read_list_file_gzipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.txt.gz");

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        write!(encoder, "sgA\n\n  sgB  \nsgC\n").unwrap();
        encoder.finish().unwrap();

        let names = read_list_file(&path).unwrap();
        assert_eq!(names, vec!["sgA", "sgB", "sgC"]);
    }

    #[rstest]
    fn test_read_line_bytes() {
        let mut reader = io::Cursor::new(b"a\tb\r\nr\xff1\n\nlast".to_vec());
        let mut buf = Vec::new();

        let mut lines = Vec::new();
        while read_line_bytes(&mut reader, &mut buf).unwrap() {
            lines.push(buf.clone());
        }

        assert_eq!(
            lines,
            vec![
                b"a\tb".to_vec(),
                b"r\xff1".to_vec(),
                b"".to_vec(),
                b"last".to_vec()
            ]
        );
    }

    #[rstest]
    fn test_missing_file_is_reported() {
        let res = get_dynamic_reader(Path::new("does/not/exist.sam"));
        assert!(matches!(res, Err(CountingError::FileReadError { .. })));
    }
}
