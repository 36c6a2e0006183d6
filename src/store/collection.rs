//! # store::collection
//!
//! One folder of trade files, keyed by filename.
//!
//! There is no cache and no locking: every call goes to the file system, and
//! two writers to the same file race with last-write-wins.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::store::codec::TradeFile;
use crate::store::naming::{check_filename, EXTENSION};
use crate::store::StoreError;

pub struct Collection<R> {
    dir: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: TradeFile> Collection<R> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _record: PhantomData,
        }
    }

    /// Resolves a client-supplied filename inside this folder.
    pub fn path_of(&self, filename: &str) -> Result<PathBuf, StoreError> {
        check_filename(filename)?;
        Ok(self.dir.join(filename))
    }

    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        if fs::metadata(&self.dir).await.is_err() {
            fs::create_dir_all(&self.dir)
                .await
                .map_err(|e| StoreError::io(&self.dir, e))?;
            info!(kind = R::KIND, dir = %self.dir.display(), "Created trade folder");
        }
        Ok(())
    }

    // ─── Reads ────────────────────────────────────────────────────────────────

    /// Every decodable `.txt` record, in directory order.
    ///
    /// Files are read concurrently. A file that cannot be read or decoded is
    /// logged and skipped; only a failure to enumerate the folder fails the
    /// listing.
    pub async fn list(&self) -> Result<Vec<R>, StoreError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            match entry.file_name().into_string() {
                Ok(name) if name.ends_with(EXTENSION) => names.push(name),
                Ok(_) => {}
                Err(raw) => debug!(kind = R::KIND, name = ?raw, "Ignoring non UTF-8 filename"),
            }
        }

        let reads = names.into_iter().map(|name| async move {
            let result = fs::read_to_string(self.dir.join(&name)).await;
            (name, result)
        });

        let mut records = Vec::new();
        for (name, result) in join_all(reads).await {
            match result {
                Ok(text) => match R::decode(&text) {
                    Some(mut record) => {
                        record.set_filename(name);
                        records.push(record);
                    }
                    None => warn!(kind = R::KIND, filename = %name, "Skipping undecodable trade file"),
                },
                Err(e) => warn!(kind = R::KIND, filename = %name, error = %e, "Skipping unreadable trade file"),
            }
        }

        Ok(records)
    }

    /// Raw file content. `NotFound` when the file is absent.
    pub async fn read_raw(&self, filename: &str) -> Result<String, StoreError> {
        let path = self.path_of(filename)?;
        fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::from_file_io(filename, &path, e))
    }

    pub async fn contains(&self, filename: &str) -> Result<bool, StoreError> {
        let path = self.path_of(filename)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    // ─── Writes ───────────────────────────────────────────────────────────────

    /// Writes a brand-new file; refuses to clobber an existing one.
    pub async fn insert(&self, filename: &str, record: &R) -> Result<(), StoreError> {
        let path = self.path_of(filename)?;
        write_synced(&path, &record.encode(), true)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }

    /// Overwrites an existing file with the full encoding of `record`.
    pub async fn replace(&self, filename: &str, record: &R) -> Result<(), StoreError> {
        if !self.contains(filename).await? {
            return Err(StoreError::NotFound(filename.to_string()));
        }
        self.write_text(filename, &record.encode()).await
    }

    /// Creates or truncates the file and waits until the bytes are on disk.
    pub async fn write_text(&self, filename: &str, text: &str) -> Result<(), StoreError> {
        let path = self.path_of(filename)?;
        write_synced(&path, text, false)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }

    pub async fn remove(&self, filename: &str) -> Result<(), StoreError> {
        let path = self.path_of(filename)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| StoreError::from_file_io(filename, &path, e))
    }
}

async fn write_synced(path: &Path, text: &str, create_new: bool) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .create_new(create_new)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.sync_all().await
}
