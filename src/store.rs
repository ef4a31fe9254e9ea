//! Flat CSV stores: one for raw articles as fetched, one for processed
//! (canonical + classified) articles.
//!
//! One row per article, UTF-8, header row always written. The directory is
//! created on first write. Files are written to a sibling `.tmp` and renamed
//! into place, so a failed write leaves the previous table readable. At most
//! one writer per store is assumed; callers serialize pipeline runs.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::article::CanonicalArticle;
use crate::error::StoreError;

/// Columns kept from raw payloads, in file order.
pub const RAW_COLUMNS: [&str; 6] = ["title", "description", "content", "publishedAt", "url", "source"];

#[derive(Debug, Clone)]
pub struct ArticleStore {
    raw_path: PathBuf,
    processed_path: PathBuf,
}

impl ArticleStore {
    pub fn new(raw_path: impl Into<PathBuf>, processed_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_path: raw_path.into(),
            processed_path: processed_path.into(),
        }
    }

    /// `raw_news.csv` and `processed_news.csv` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join("raw_news.csv"), dir.join("processed_news.csv"))
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }

    /// Writes raw payloads, flattening every value to text. Nested values
    /// (e.g. `source: {id, name}`) are stored as their JSON text; non-mapping
    /// items are skipped.
    pub fn save_raw(&self, raw: &[Value]) -> Result<usize, StoreError> {
        let path = &self.raw_path;
        let rows = replace_file(path, |w, tmp| {
            w.write_record(RAW_COLUMNS).map_err(|e| csv_err(tmp, e))?;
            let mut rows = 0usize;
            for obj in raw.iter().filter_map(Value::as_object) {
                let record: Vec<String> = RAW_COLUMNS
                    .iter()
                    .map(|col| flatten_cell(obj.get(*col)))
                    .collect();
                w.write_record(&record).map_err(|e| csv_err(tmp, e))?;
                rows += 1;
            }
            Ok(rows)
        })?;
        info!(target: "store", path = %path.display(), rows, "saved raw articles");
        Ok(rows)
    }

    /// Reads raw rows back as mappings ready for the normalizer. Empty cells
    /// come back as null, the same as a field the payload never had.
    pub fn load_raw(&self) -> Result<Vec<Value>, StoreError> {
        let path = &self.raw_path;
        let mut r = open_reader(path)?;
        let headers = r.headers().map_err(|e| csv_err(path, e))?.clone();

        let mut out = Vec::new();
        for rec in r.records() {
            let rec = rec.map_err(|e| csv_err(path, e))?;
            let obj: Map<String, Value> = headers
                .iter()
                .zip(rec.iter())
                .map(|(h, v)| (h.to_string(), unflatten_cell(v)))
                .collect();
            out.push(Value::Object(obj));
        }
        debug!(target: "store", path = %path.display(), rows = out.len(), "loaded raw articles");
        Ok(out)
    }

    pub fn save_processed(&self, articles: &[CanonicalArticle]) -> Result<usize, StoreError> {
        let path = &self.processed_path;
        let rows = replace_file(path, |w, tmp| {
            for a in articles {
                w.serialize(a).map_err(|e| csv_err(tmp, e))?;
            }
            Ok(articles.len())
        })?;
        info!(target: "store", path = %path.display(), rows, "saved processed articles");
        Ok(rows)
    }

    /// Loads the processed table. `StoreError::Missing` when nothing was saved yet.
    pub fn load_processed(&self) -> Result<Vec<CanonicalArticle>, StoreError> {
        let path = &self.processed_path;
        let mut r = open_reader(path)?;
        let mut out = Vec::new();
        for row in r.deserialize::<CanonicalArticle>() {
            out.push(row.map_err(|e| csv_err(path, e))?);
        }
        debug!(target: "store", path = %path.display(), rows = out.len(), "loaded processed articles");
        Ok(out)
    }
}

fn flatten_cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn unflatten_cell(cell: &str) -> Value {
    if cell.is_empty() {
        Value::Null
    } else {
        Value::String(cell.to_string())
    }
}

/// `<file name>.tmp` next to `path`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes through `fill` into a sibling temp file, then renames it over
/// `path`. The temp file is removed on any failure.
fn replace_file<F>(path: &Path, fill: F) -> Result<usize, StoreError>
where
    F: FnOnce(&mut csv::Writer<File>, &Path) -> Result<usize, StoreError>,
{
    let tmp = tmp_path(path);
    let written = open_writer(&tmp).and_then(|mut w| {
        let rows = fill(&mut w, &tmp)?;
        w.flush().map_err(|e| io_err(&tmp, e))?;
        Ok(rows)
    });
    let rows = match written {
        Ok(rows) => rows,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
    };
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(rows)
}

fn open_writer(path: &Path) -> Result<csv::Writer<File>, StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    csv::Writer::from_path(path).map_err(|e| csv_err(path, e))
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, StoreError> {
    match File::open(path) {
        Ok(f) => Ok(csv::Reader::from_reader(f)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StoreError::Missing(path.to_path_buf()))
        }
        Err(e) => Err(io_err(path, e)),
    }
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_is_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::in_dir(dir.path());
        assert!(matches!(store.load_processed(), Err(StoreError::Missing(_))));
        assert!(matches!(store.load_raw(), Err(StoreError::Missing(_))));
    }

    #[test]
    fn creates_directory_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::in_dir(dir.path().join("nested").join("assets"));
        store.save_processed(&[]).unwrap();
        assert!(store.processed_path().exists());
    }

    #[test]
    fn raw_source_mapping_is_kept_as_json_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::in_dir(dir.path());
        let raw = vec![
            json!({"title": "T", "source": {"id": null, "name": "CNBC"}, "content": null}),
            json!("not a mapping"),
        ];
        assert_eq!(store.save_raw(&raw).unwrap(), 1);

        let back = store.load_raw().unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0]["title"], "T");
        assert_eq!(back[0]["content"], Value::Null);
        assert_eq!(back[0]["url"], Value::Null);
        assert_eq!(back[0]["source"], r#"{"id":null,"name":"CNBC"}"#);
    }

    fn article(title: &str) -> CanonicalArticle {
        CanonicalArticle {
            title: title.into(),
            content: "Stocks moved.".into(),
            description: String::new(),
            text: "Stocks moved.".into(),
            published_at: String::new(),
            source: "CNBC".into(),
            url: String::new(),
            sentiment_label: "neutral".into(),
            sentiment_score: 0.5,
        }
    }

    #[test]
    fn failed_save_keeps_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::in_dir(dir.path());
        let first = vec![article("Old one"), article("Old two")];
        store.save_processed(&first).unwrap();

        // a directory squatting on the temp path makes the next write fail
        fs::create_dir(tmp_path(store.processed_path())).unwrap();
        assert!(store.save_processed(&[article("New")]).is_err());

        assert_eq!(store.load_processed().unwrap(), first);
    }

    #[test]
    fn successful_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::in_dir(dir.path());
        store.save_processed(&[article("A")]).unwrap();
        store.save_processed(&[article("B")]).unwrap();

        assert!(!tmp_path(store.processed_path()).exists());
        let back = store.load_processed().unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].title, "B");
    }
}
