//! Row sources: tables as forward-only sequences of raw text rows.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("not a directory or zip archive: {0}")]
    UnsupportedPath(PathBuf),
}

impl SourceError {
    fn io(path: &Path, source: io::Error) -> Self {
        SourceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Row = Vec<String>;
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, SourceError>> + 'a>;

/// Hook applied to every physical line before it is split into columns.
pub type LinePreprocessor = Arc<dyn Fn(String) -> String + Send + Sync>;

/// One table of a feed. The first row is the header.
///
/// The returned iterator owns whatever handle backs the rows, so dropping it
/// (after exhaustion or after an error) releases the handle.
pub trait SourceFile {
    /// Table name without extension, e.g. `stop_times`.
    fn name(&self) -> &str;

    fn rows(&self) -> Result<RowIter<'_>, SourceError>;
}

const BOM: &str = "\u{feff}";

/// Line-oriented adapter that strips a leading BOM and runs the preprocessor
/// over each line before handing the bytes to the csv splitter.
struct PreprocessedReader<R> {
    inner: R,
    preprocessor: Option<LinePreprocessor>,
    pending: Vec<u8>,
    position: usize,
    first_line: bool,
}

impl<R: BufRead> PreprocessedReader<R> {
    fn new(inner: R, preprocessor: Option<LinePreprocessor>) -> Self {
        Self {
            inner,
            preprocessor,
            pending: Vec::new(),
            position: 0,
            first_line: true,
        }
    }

    fn fill(&mut self) -> io::Result<bool> {
        let mut raw = Vec::new();
        if self.inner.read_until(b'\n', &mut raw)? == 0 {
            return Ok(false);
        }
        let mut line = String::from_utf8_lossy(&raw).into_owned();
        if self.first_line {
            if let Some(rest) = line.strip_prefix(BOM) {
                line = rest.to_string();
            }
            self.first_line = false;
        }
        if let Some(preprocessor) = &self.preprocessor {
            let terminator_len = line.len() - line.trim_end_matches(['\r', '\n']).len();
            let terminator = line.split_off(line.len() - terminator_len);
            line = preprocessor(line);
            line.push_str(&terminator);
        }
        self.pending = line.into_bytes();
        self.position = 0;
        Ok(true)
    }
}

impl<R: BufRead> Read for PreprocessedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.position >= self.pending.len() {
            if !self.fill()? {
                return Ok(0);
            }
        }
        let available = &self.pending[self.position..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.position += count;
        Ok(count)
    }
}

/// Splits delimited text into rows. Row lengths may vary.
pub fn split_rows<'a, R: BufRead + 'a>(
    reader: R,
    preprocessor: Option<LinePreprocessor>,
) -> RowIter<'a> {
    let records = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(PreprocessedReader::new(reader, preprocessor))
        .into_records();
    Box::new(records.map(|record| {
        record
            .map(|record| record.iter().map(str::to_string).collect())
            .map_err(SourceError::from)
    }))
}

enum MemoryContent {
    Rows(Vec<Row>),
    Text(String),
}

/// Table held in memory, either as pre-split rows or as raw text.
pub struct MemorySource {
    name: String,
    content: MemoryContent,
    preprocessor: Option<LinePreprocessor>,
}

impl MemorySource {
    pub fn from_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            content: MemoryContent::Rows(rows),
            preprocessor: None,
        }
    }

    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: MemoryContent::Text(text.into()),
            preprocessor: None,
        }
    }

    /// Only applies to text content.
    pub fn with_preprocessor(mut self, preprocessor: LinePreprocessor) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }
}

impl SourceFile for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&self) -> Result<RowIter<'_>, SourceError> {
        match &self.content {
            MemoryContent::Rows(rows) => Ok(Box::new(rows.iter().cloned().map(Ok::<Row, SourceError>))),
            MemoryContent::Text(text) => Ok(split_rows(
                text.as_bytes(),
                self.preprocessor.clone(),
            )),
        }
    }
}

/// A single `.txt` table on disk.
pub struct FileSource {
    name: String,
    path: PathBuf,
    preprocessor: Option<LinePreprocessor>,
}

impl FileSource {
    /// Table name is the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            preprocessor: None,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: LinePreprocessor) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceFile for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&self) -> Result<RowIter<'_>, SourceError> {
        let file = File::open(&self.path).map_err(|err| SourceError::io(&self.path, err))?;
        Ok(split_rows(BufReader::new(file), self.preprocessor.clone()))
    }
}

/// Every `.txt` file directly inside `dir`, sorted by name.
pub fn directory_sources(dir: &Path) -> Result<Vec<Box<dyn SourceFile>>, SourceError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| SourceError::io(dir, err))? {
        let path = entry.map_err(|err| SourceError::io(dir, err))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths
        .into_iter()
        .map(|path| Box::new(FileSource::new(path)) as Box<dyn SourceFile>)
        .collect())
}

/// One `.txt` entry of a zip archive. The archive is opened per `rows()` call
/// and the entry is decompressed into memory.
pub struct ZipSource {
    name: String,
    archive: PathBuf,
    entry: String,
    preprocessor: Option<LinePreprocessor>,
}

impl ZipSource {
    pub fn new(archive: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        let entry = entry.into();
        let name = entry
            .rsplit('/')
            .next()
            .unwrap_or(&entry)
            .trim_end_matches(".txt")
            .to_string();
        Self {
            name,
            archive: archive.into(),
            entry,
            preprocessor: None,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: LinePreprocessor) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }
}

impl SourceFile for ZipSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&self) -> Result<RowIter<'_>, SourceError> {
        let file = File::open(&self.archive).map_err(|err| SourceError::io(&self.archive, err))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
        let mut entry = archive.by_name(&self.entry)?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|err| SourceError::io(&self.archive, err))?;
        Ok(split_rows(Cursor::new(data), self.preprocessor.clone()))
    }
}

/// Every `.txt` entry of a zip archive, sorted by entry name.
pub fn zip_sources(path: &Path) -> Result<Vec<Box<dyn SourceFile>>, SourceError> {
    let file = File::open(path).map_err(|err| SourceError::io(path, err))?;
    let archive = zip::ZipArchive::new(BufReader::new(file))?;
    let mut entries: Vec<String> = archive
        .file_names()
        .filter(|name| name.ends_with(".txt") && !name.starts_with("__MACOSX"))
        .map(str::to_string)
        .collect();
    entries.sort();
    Ok(entries
        .into_iter()
        .map(|entry| Box::new(ZipSource::new(path, entry)) as Box<dyn SourceFile>)
        .collect())
}

/// Directory or `.zip` archive, decided by what `path` points at.
pub fn open_sources(path: &Path) -> Result<Vec<Box<dyn SourceFile>>, SourceError> {
    if path.is_dir() {
        directory_sources(path)
    } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip")) {
        zip_sources(path)
    } else {
        Err(SourceError::UnsupportedPath(path.to_path_buf()))
    }
}
