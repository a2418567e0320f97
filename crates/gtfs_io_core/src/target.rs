//! Row targets: where the writer sends formatted tables.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::source::{MemorySource, Row, SourceFile};

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub trait TargetFile {
    fn name(&self) -> &str;

    /// Whether the target already holds content from an earlier write.
    fn exists(&self) -> bool;

    fn clear(&mut self) -> Result<(), TargetError>;

    fn write(&mut self, row: &[String]) -> Result<(), TargetError>;

    fn close(self: Box<Self>) -> Result<(), TargetError>;
}

pub trait TargetProvider {
    fn open<'a>(&'a mut self, name: &str) -> Result<Box<dyn TargetFile + 'a>, TargetError>;
}

/// Collects written tables in memory, keyed by table name.
#[derive(Debug, Default, Clone)]
pub struct MemoryTargets {
    tables: BTreeMap<String, Vec<Row>>,
}

impl MemoryTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[Row]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Turns the written tables back into readable sources. Cells are
    /// already CSV-formatted, so each table goes back through the csv
    /// splitter as text.
    pub fn into_sources(self) -> Vec<Box<dyn SourceFile>> {
        self.tables
            .into_iter()
            .map(|(name, rows)| {
                let mut text = String::new();
                for row in rows {
                    text.push_str(&row.join(","));
                    text.push('\n');
                }
                Box::new(MemorySource::from_text(name, text)) as Box<dyn SourceFile>
            })
            .collect()
    }
}

impl TargetProvider for MemoryTargets {
    fn open<'a>(&'a mut self, name: &str) -> Result<Box<dyn TargetFile + 'a>, TargetError> {
        Ok(Box::new(MemoryTarget {
            name: name.to_string(),
            tables: &mut self.tables,
        }))
    }
}

struct MemoryTarget<'a> {
    name: String,
    tables: &'a mut BTreeMap<String, Vec<Row>>,
}

impl TargetFile for MemoryTarget<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.tables.contains_key(&self.name)
    }

    fn clear(&mut self) -> Result<(), TargetError> {
        self.tables.insert(self.name.clone(), Vec::new());
        Ok(())
    }

    fn write(&mut self, row: &[String]) -> Result<(), TargetError> {
        self.tables
            .entry(self.name.clone())
            .or_default()
            .push(row.to_vec());
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), TargetError> {
        Ok(())
    }
}

/// Writes `<name>.txt` files into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTargets {
    root: PathBuf,
}

impl DirectoryTargets {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, TargetError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| TargetError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TargetProvider for DirectoryTargets {
    fn open<'a>(&'a mut self, name: &str) -> Result<Box<dyn TargetFile + 'a>, TargetError> {
        Ok(Box::new(DirectoryTarget {
            name: name.to_string(),
            path: self.root.join(format!("{}.txt", name)),
            writer: None,
        }))
    }
}

struct DirectoryTarget {
    name: String,
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl DirectoryTarget {
    fn io_error(&self, source: io::Error) -> TargetError {
        TargetError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_writer(file: File) -> csv::Writer<File> {
        // Cells arrive already quoted by the field formatters.
        csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file)
    }
}

impl TargetFile for DirectoryTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn clear(&mut self) -> Result<(), TargetError> {
        let file = File::create(&self.path).map_err(|err| self.io_error(err))?;
        self.writer = Some(Self::csv_writer(file));
        Ok(())
    }

    fn write(&mut self, row: &[String]) -> Result<(), TargetError> {
        if self.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|err| self.io_error(err))?;
            self.writer = Some(Self::csv_writer(file));
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_record(row)?;
        }
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<(), TargetError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|err| self.io_error(err))?;
        }
        Ok(())
    }
}
