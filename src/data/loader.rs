//! Dataset loading from triplet files.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Dataset, Listen};
use crate::error::{Result, SweepError};

/// Source of datasets addressed by name.
pub trait DatasetLoader {
    /// Load the dataset called `name`.
    ///
    /// # Errors
    ///
    /// Returns a data-load error when the dataset is missing or corrupt.
    fn load(&self, name: &str) -> Result<Dataset>;
}

/// Loads `user<TAB>item<TAB>plays` triplet files.
///
/// A name resolves to the first existing path among: the name itself,
/// `<data_dir>/<name>`, and `<data_dir>/<name>` with a `.txt`, `.tsv` or
/// `.csv` extension. `.csv` files are comma separated; everything else is
/// tab separated. The plays column may be omitted, in which case each row
/// counts as one play. Lines starting with `#` are ignored.
#[derive(Debug, Clone)]
pub struct TripletLoader {
    data_dir: PathBuf,
}

const EXTENSIONS: [&str; 3] = ["txt", "tsv", "csv"];

impl TripletLoader {
    /// Create a loader resolving names against `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory names are resolved against.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolve a dataset name to an existing file.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = PathBuf::from(name);
        if direct.is_file() {
            return Some(direct);
        }

        let base = self.data_dir.join(name);
        if base.is_file() {
            return Some(base);
        }

        EXTENSIONS
            .iter()
            .map(|ext| self.data_dir.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
    }

    /// Parse a triplet file into a dataset named `name`.
    ///
    /// # Errors
    ///
    /// Returns a data-load error on unreadable files, malformed rows or a
    /// file without any listen records.
    pub fn load_path(&self, name: &str, path: &Path) -> Result<Dataset> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => b',',
            _ => b'\t',
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                SweepError::data_load(name, format!("failed to open {}: {e}", path.display()))
            })?;

        let mut dataset = Dataset::new(name);
        for record in reader.records() {
            let record = record.map_err(|e| SweepError::data_load(name, e.to_string()))?;
            let line = record.position().map_or(0, csv::Position::line);
            dataset.add_listen(parse_record(name, line, &record)?);
        }

        if dataset.is_empty() {
            return Err(SweepError::data_load(
                name,
                format!("no listen records in {}", path.display()),
            ));
        }

        debug!(path = %path.display(), "parsed triplet file");
        Ok(dataset)
    }
}

fn required_field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
    what: &str,
) -> Result<&'r str> {
    record
        .get(idx)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SweepError::data_load(name, format!("line {line}: missing {what}")))
}

fn parse_record(name: &str, line: u64, record: &csv::StringRecord) -> Result<Listen> {
    let user = required_field(record, 0, name, line, "user")?;
    let item = required_field(record, 1, name, line, "item")?;
    let plays = match record.get(2).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            SweepError::data_load(name, format!("line {line}: invalid play count '{raw}'"))
        })?,
        None => 1,
    };

    if plays == 0 {
        return Err(SweepError::data_load(
            name,
            format!("line {line}: play count must be positive"),
        ));
    }

    Ok(Listen::new(user, item, plays))
}

impl DatasetLoader for TripletLoader {
    fn load(&self, name: &str) -> Result<Dataset> {
        let path = self.resolve(name).ok_or_else(|| {
            SweepError::data_load(
                name,
                format!("no dataset file found in {}", self.data_dir.display()),
            )
        })?;

        let dataset = self.load_path(name, &path)?;
        info!(
            dataset = name,
            users = dataset.n_users(),
            items = dataset.n_items(),
            listens = dataset.n_listens(),
            "loaded dataset"
        );
        Ok(dataset)
    }
}
