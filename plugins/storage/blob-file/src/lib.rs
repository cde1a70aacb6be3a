use std::io::Write;
use std::path::{Path, PathBuf};

use events_api::{Blob, BlobSink, SinkError, SinkFuture, today};

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

/// Раскладка blob'ов по директориям.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartitionBy {
    /// `{data_dir}/{YYYY-MM-DD}/{name}`
    #[default]
    Date,
    /// `{data_dir}/{name}`
    Flat,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct FileBlobConfig {
    pub data_dir: String,
    #[serde(default)]
    pub partition_by: PartitionBy,
}

// ════════════════════════════════════════════════════════════════
//  FileBlobSink
// ════════════════════════════════════════════════════════════════

/// Файловый blob store: один файл на blob.
///
/// Структура на диске:
/// ```text
/// {data_dir}/{YYYY-MM-DD}/{id}.json
/// ```
/// Запись идёт во временный файл и затем rename, так что читатель
/// никогда не видит половину blob'а.
#[derive(Clone)]
pub struct FileBlobSink {
    name: String,
    data_dir: PathBuf,
    partition_by: PartitionBy,
}

impl FileBlobSink {
    pub fn new(name: impl Into<String>, config: &FileBlobConfig) -> Self {
        Self {
            name: name.into(),
            data_dir: PathBuf::from(&config.data_dir),
            partition_by: config.partition_by,
        }
    }

    pub fn init(&self) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| SinkError::config(format!("mkdir {}: {e}", self.data_dir.display())))
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        match self.partition_by {
            PartitionBy::Date => self.data_dir.join(today()).join(name),
            PartitionBy::Flat => self.data_dir.join(name),
        }
    }

    fn do_put(&self, blob: &Blob) -> Result<PathBuf, SinkError> {
        if blob.name.is_empty() || blob.name.contains(['/', '\\']) || blob.name.starts_with('.') {
            return Err(SinkError::rejected(format!("invalid blob name '{}'", blob.name)));
        }

        let path = self.blob_path(&blob.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::io(format!("mkdir blob: {e}")))?;
        }

        let tmp = path.with_extension("tmp");
        let mut f = std::fs::File::create(&tmp)
            .map_err(|e| SinkError::io(format!("create {}: {e}", tmp.display())))?;
        f.write_all(blob.body.as_bytes())
            .map_err(|e| SinkError::io(format!("write blob: {e}")))?;
        f.sync_all().map_err(|e| SinkError::io(format!("sync blob: {e}")))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| SinkError::io(format!("rename {}: {e}", path.display())))?;
        Ok(path)
    }

    /// Все blob'ы в хранилище, отсортированные по пути.
    pub fn list(&self) -> Result<Vec<PathBuf>, SinkError> {
        let mut entries = Vec::new();
        collect_blobs(&self.data_dir, &mut entries)?;
        entries.sort();
        Ok(entries)
    }
}

fn collect_blobs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SinkError> {
    let read = match std::fs::read_dir(dir) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(SinkError::io(format!("read dir {}: {e}", dir.display()))),
    };

    for entry in read {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_blobs(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

impl BlobSink for FileBlobSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, blob: Blob) -> SinkFuture<'_> {
        Box::pin(async move {
            let path = self.do_put(&blob)?;
            tracing::trace!(sink = %self.name, path = %path.display(), "blob written");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events_api::{ErrorKind, EventAttributes, EventType};

    fn blob(name: &str, body: &str) -> Blob {
        Blob {
            name: name.into(),
            body: body.into(),
            attrs: EventAttributes { event_type: EventType::SaleEvent, priority_shipping: false },
        }
    }

    fn sink(dir: &Path, partition_by: PartitionBy) -> FileBlobSink {
        FileBlobSink::new(
            "blob",
            &FileBlobConfig { data_dir: dir.to_string_lossy().into_owned(), partition_by },
        )
    }

    #[tokio::test]
    async fn writes_one_file_per_blob_under_date() {
        let dir = tempfile::tempdir().unwrap();
        let s = sink(dir.path(), PartitionBy::Date);
        s.init().unwrap();

        s.put(blob("a.json", r#"{"id":"a"}"#)).await.unwrap();
        s.put(blob("b.json", r#"{"id":"b"}"#)).await.unwrap();

        let files = s.list().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], dir.path().join(today()).join("a.json"));
        let body = std::fs::read_to_string(&files[1]).unwrap();
        assert_eq!(body, r#"{"id":"b"}"#);
    }

    #[tokio::test]
    async fn flat_layout_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let s = sink(dir.path(), PartitionBy::Flat);

        s.put(blob("x.json", "1")).await.unwrap();
        s.put(blob("x.json", "2")).await.unwrap();

        let files = s.list().unwrap();
        assert_eq!(files, vec![dir.path().join("x.json")]);
        assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), "2");
    }

    #[tokio::test]
    async fn path_like_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let s = sink(dir.path(), PartitionBy::Flat);
        let err = s.put(blob("../escape.json", "{}")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert!(s.list().unwrap().is_empty());
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let s = sink(&dir.path().join("nope"), PartitionBy::Date);
        assert!(s.list().unwrap().is_empty());
    }

    #[test]
    fn partition_defaults_to_date() {
        let cfg: FileBlobConfig = serde_json::from_str(r#"{"data_dir":"/tmp/x"}"#).unwrap();
        assert_eq!(cfg.partition_by, PartitionBy::Date);
    }
}
