/// Trait for handling progress events while reading a feed
pub trait ProgressHandler: Send + Sync {
    /// Called when starting to load a file
    fn on_start_file_load(&self, file: &str);

    /// Called when finished loading a file, with the number of data rows read
    fn on_finish_file_load(&self, file: &str, rows: usize);

    /// Set total number of files to load (optional usage)
    fn set_total_files(&self, count: usize) {
        let _ = count;
    }
}

/// A no-op progress handler
pub struct NoOpProgressHandler;

impl ProgressHandler for NoOpProgressHandler {
    fn on_start_file_load(&self, _file: &str) {}
    fn on_finish_file_load(&self, _file: &str, _rows: usize) {}
}
