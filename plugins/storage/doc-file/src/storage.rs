use std::io::{BufRead, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use events_api::{Document, DocumentSink, SinkError, SinkFuture};

use super::config::{FileDocumentConfig, StoredDocument, WriteMode};

// ════════════════════════════════════════════════════════════════
//  FileDocumentSink
// ════════════════════════════════════════════════════════════════

/// Document store поверх JSON-lines файла.
///
/// ```text
/// {data_dir}/{collection}.jsonl
/// ```
/// Каждая строка это [`StoredDocument`]. В режиме `upsert` документ
/// с уже существующим `id` перезаписывает старую строку.
///
/// Нечитаемые строки (оборванная запись) пропускаются с warn и не
/// блокируют новые insert'ы; upsert-перезапись их отбрасывает.
pub struct FileDocumentSink {
    name: String,
    path: PathBuf,
    write_mode: WriteMode,
    // Concurrent batches share one collection file.
    write_lock: Mutex<()>,
}

impl FileDocumentSink {
    pub fn new(name: impl Into<String>, config: &FileDocumentConfig) -> Self {
        Self {
            name: name.into(),
            path: Path::new(&config.data_dir).join(format!("{}.jsonl", config.collection)),
            write_mode: config.write_mode,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn init(&self) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SinkError::config(format!("mkdir {}: {e}", parent.display())))?;
        }
        Ok(())
    }

    fn do_insert(&self, doc: Document) -> Result<(), SinkError> {
        let stored = StoredDocument {
            id: doc.id,
            event_type: doc.attrs.event_type,
            priority_shipping: doc.attrs.priority_shipping,
            body: doc.body,
        };
        let line = serde_json::to_string(&stored)
            .map_err(|e| SinkError::format_err(format!("json serialize: {e}")))?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SinkError::rejected("collection lock poisoned"))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::io(format!("mkdir: {e}")))?;
        }

        match self.write_mode {
            WriteMode::Append => self.append_line(&line),
            WriteMode::Upsert => self.upsert_line(&stored.id, &line),
        }
    }

    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::io(format!("open {}: {e}", self.path.display())))?;

        // Оборванная последняя строка не должна склеиться с новой.
        let torn = ends_without_newline(&mut f).map_err(|e| SinkError::io(format!("read tail: {e}")))?;
        let prefix = if torn { "\n" } else { "" };
        writeln!(f, "{prefix}{line}").map_err(|e| SinkError::io(format!("write: {e}")))
    }

    fn upsert_line(&self, id: &str, new_line: &str) -> Result<(), SinkError> {
        let mut docs = self.read_all()?;
        let Some(pos) = docs.iter().position(|d| d.id == id) else {
            return self.append_line(new_line);
        };

        docs[pos] = serde_json::from_str(new_line)?;
        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut f = std::io::BufWriter::new(
                std::fs::File::create(&tmp)
                    .map_err(|e| SinkError::io(format!("create {}: {e}", tmp.display())))?,
            );
            for d in &docs {
                serde_json::to_writer(&mut f, d)?;
                f.write_all(b"\n").map_err(|e| SinkError::io(format!("write: {e}")))?;
            }
            f.flush().map_err(|e| SinkError::io(format!("flush: {e}")))?;
        }
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| SinkError::io(format!("rename {}: {e}", self.path.display())))
    }

    fn read_all(&self) -> Result<Vec<StoredDocument>, SinkError> {
        let f = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SinkError::io(format!("open {}: {e}", self.path.display()))),
        };

        let mut docs = Vec::new();
        for (n, line) in std::io::BufReader::new(f).lines().enumerate() {
            let line = line.map_err(|e| SinkError::io(format!("read line: {e}")))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredDocument>(&line) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = n + 1,
                    error = %e,
                    "skipping unreadable document line"
                ),
            }
        }
        Ok(docs)
    }

    /// Прочитать всю коллекцию.
    pub fn load(&self) -> Result<Vec<StoredDocument>, SinkError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SinkError::rejected("collection lock poisoned"))?;
        self.read_all()
    }
}

fn ends_without_newline(f: &mut std::fs::File) -> std::io::Result<bool> {
    if f.metadata()?.len() == 0 {
        return Ok(false);
    }
    f.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    f.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl DocumentSink for FileDocumentSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, doc: Document) -> SinkFuture<'_> {
        Box::pin(async move {
            let id = doc.id.clone();
            self.do_insert(doc)?;
            tracing::trace!(sink = %self.name, id = %id, "document stored");
            Ok(())
        })
    }
}
