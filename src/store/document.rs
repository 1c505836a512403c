//! Document-backed issue store.
//!
//! Documents live in a `DashMap` keyed by id. When a data path is configured
//! the whole collection is loaded at open and rewritten on every mutation.
//! A mutation writes the would-be collection first and only touches the map
//! once the file is in place, so a failed write leaves memory and disk in
//! agreement. The file itself is replaced by temp file + rename.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::store::filter::IssueFilter;
use crate::store::types::{Issue, IssueDocument, IssueId, IssueUpdate, NewIssue};
use crate::store::{IssueStore, StoreError, StoreResult};

/// A pending change to the collection.
enum Change<'a> {
    Upsert(&'a IssueDocument),
    Remove(IssueId),
}

impl Change<'_> {
    fn id(&self) -> IssueId {
        match self {
            Change::Upsert(doc) => doc.issue.id,
            Change::Remove(id) => *id,
        }
    }
}

/// Issue collection with optional JSON file persistence.
#[derive(Clone, Default)]
pub struct DocumentStore {
    docs: Arc<DashMap<IssueId, IssueDocument>>,
    data_path: Option<PathBuf>,
    /// Held across persist + commit so file and map change in the same order.
    write_lock: Arc<Mutex<()>>,
    next_seq: Arc<AtomicU64>,
}

impl DocumentStore {
    /// A purely in-memory store.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store described by `config`, loading the data file if present.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        match &config.data_path {
            Some(path) => Self::load_from_file(Path::new(path)),
            None => {
                tracing::info!("Using in-memory issue store");
                Ok(Self::in_memory())
            }
        }
    }

    /// Load a store persisted at `path`. A missing file is an empty store.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let store = Self {
            data_path: Some(path.to_path_buf()),
            ..Self::default()
        };

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let mut docs: Vec<IssueDocument> = serde_json::from_reader(reader)?;
            // Files written without a sequence fall back to creation time.
            docs.sort_by(|a, b| {
                (a.seq, a.issue.created_on, a.issue.id).cmp(&(b.seq, b.issue.created_on, b.issue.id))
            });
            for (seq, mut doc) in (0u64..).zip(docs) {
                doc.seq = seq;
                store.docs.insert(doc.issue.id, doc);
            }
            store.next_seq.store(store.docs.len() as u64, Ordering::Relaxed);
        }

        metrics::record_issue_count(store.docs.len());
        tracing::info!(
            path = %path.display(),
            issues = store.docs.len(),
            "Opened document store"
        );
        Ok(store)
    }

    /// Number of stored issues across all projects.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Rewrite the data file from the current collection.
    pub fn flush(&self) -> StoreResult<()> {
        let Some(path) = &self.data_path else {
            return Ok(());
        };
        let _guard = self.lock_writes();
        let docs = self.docs.iter().map(|r| r.value().clone()).collect();
        write_file(path, docs)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write the collection as it will look once `change` is committed.
    ///
    /// Callers hold the write lock and commit to the map only on `Ok`.
    fn persist(&self, op: &'static str, change: Change<'_>) -> StoreResult<()> {
        let Some(path) = &self.data_path else {
            return Ok(());
        };

        let target = change.id();
        let mut docs: Vec<IssueDocument> = self
            .docs
            .iter()
            .filter(|r| *r.key() != target)
            .map(|r| r.value().clone())
            .collect();
        if let Change::Upsert(doc) = change {
            docs.push(doc.clone());
        }

        write_file(path, docs).inspect_err(|e| {
            tracing::error!(op, id = %target, error = %e, "Failed to persist issue store; change discarded");
        })
    }

    fn committed(&self) {
        metrics::record_issue_count(self.docs.len());
    }

    fn parse_id(id: &str) -> StoreResult<IssueId> {
        id.parse().map_err(|_| StoreError::NotFound(id.to_string()))
    }
}

fn write_file(path: &Path, mut docs: Vec<IssueDocument>) -> StoreResult<()> {
    docs.sort_by_key(|doc| doc.seq);

    let tmp = path.with_extension("tmp");
    let written = File::create(&tmp).map_err(StoreError::from).and_then(|file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &docs)?;
        writer.flush()?;
        Ok(())
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path).map_err(StoreError::from)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    tracing::debug!(path = %path.display(), issues = docs.len(), "Flushed document store");
    Ok(())
}

impl IssueStore for DocumentStore {
    fn create(&self, project: &str, issue: NewIssue) -> StoreResult<Issue> {
        let _guard = self.lock_writes();

        let mut doc = issue.into_document(project);
        doc.seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.persist("create", Change::Upsert(&doc))?;

        let created = doc.issue.clone();
        self.docs.insert(created.id, doc);
        self.committed();
        Ok(created)
    }

    fn find_by_project(&self, project: &str, filter: &IssueFilter) -> StoreResult<Vec<Issue>> {
        let mut hits: Vec<(u64, Issue)> = self
            .docs
            .iter()
            .filter(|r| r.value().project == project && filter.matches(&r.value().issue))
            .map(|r| (r.value().seq, r.value().issue.clone()))
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        Ok(hits.into_iter().map(|(_, issue)| issue).collect())
    }

    fn update_by_id(&self, id: &str, update: IssueUpdate) -> StoreResult<Issue> {
        let key = Self::parse_id(id)?;
        let _guard = self.lock_writes();

        let mut doc = self
            .docs
            .get(&key)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.issue.apply(update);
        self.persist("update", Change::Upsert(&doc))?;

        let updated = doc.issue.clone();
        self.docs.insert(key, doc);
        self.committed();
        Ok(updated)
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<Issue> {
        let key = Self::parse_id(id)?;
        let _guard = self.lock_writes();

        if !self.docs.contains_key(&key) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist("delete", Change::Remove(key))?;

        let (_, doc) = self
            .docs
            .remove(&key)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.committed();
        Ok(doc.issue)
    }

    fn close(&self) -> StoreResult<()> {
        self.flush()?;
        tracing::info!(issues = self.docs.len(), "Document store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_issue(title: &str, created_by: &str) -> NewIssue {
        NewIssue {
            issue_title: title.into(),
            issue_text: "text".into(),
            created_by: created_by.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_find_scoped_by_project() {
        let store = DocumentStore::in_memory();
        let a = store.create("alpha", new_issue("one", "Test 1")).unwrap();
        store.create("alpha", new_issue("two", "Test 2")).unwrap();
        store.create("beta", new_issue("three", "Test 1")).unwrap();

        let all = store.find_by_project("alpha", &IssueFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let filter = IssueFilter::from_pairs([("created_by", "Test 1")]);
        let found = store.find_by_project("alpha", &filter).unwrap();
        assert_eq!(found, vec![a]);

        let none = store.find_by_project("gamma", &IssueFilter::default()).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_update_by_id() {
        let store = DocumentStore::in_memory();
        let created = store.create("alpha", new_issue("one", "Test 1")).unwrap();

        let updated = store
            .update_by_id(
                &created.id.to_string(),
                IssueUpdate {
                    issue_title: Some("changed".into()),
                    open: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.issue_title, "changed");
        assert!(!updated.open);
        assert_eq!(updated.created_on, created.created_on);
        assert!(updated.updated_on > created.updated_on);

        let listed = store.find_by_project("alpha", &IssueFilter::default()).unwrap();
        assert_eq!(listed, vec![updated]);
    }

    #[test]
    fn test_unknown_and_malformed_ids_are_not_found() {
        let store = DocumentStore::in_memory();
        let missing = IssueId::generate().to_string();

        assert!(matches!(
            store.update_by_id("invalid", IssueUpdate::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_by_id(&missing, IssueUpdate::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete_by_id("invalid"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_by_id(&missing), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete_twice() {
        let store = DocumentStore::in_memory();
        let created = store.create("alpha", new_issue("one", "Test 1")).unwrap();
        let id = created.id.to_string();

        let removed = store.delete_by_id(&id).unwrap();
        assert_eq!(removed, created);
        assert!(store.is_empty());
        assert!(matches!(store.delete_by_id(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.json");

        let store = DocumentStore::load_from_file(&path).unwrap();
        assert!(store.is_empty());
        let kept = store.create("alpha", new_issue("kept", "Test 1")).unwrap();
        let dropped = store.create("alpha", new_issue("dropped", "Test 2")).unwrap();
        store.delete_by_id(&dropped.id.to_string()).unwrap();
        store.close().unwrap();

        let reopened = DocumentStore::load_from_file(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        let listed = reopened.find_by_project("alpha", &IssueFilter::default()).unwrap();
        assert_eq!(listed, vec![kept]);
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            DocumentStore::load_from_file(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_failed_create_is_not_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("issues.json");
        let store = DocumentStore::load_from_file(&path).unwrap();

        let result = store.create("alpha", new_issue("lost", "Test 1"));
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(store.is_empty());
        assert!(store.find_by_project("alpha", &IssueFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_collection_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        fs::create_dir(&data_dir).unwrap();
        let store = DocumentStore::load_from_file(&data_dir.join("issues.json")).unwrap();
        let kept = store.create("alpha", new_issue("kept", "Test 1")).unwrap();
        let id = kept.id.to_string();

        fs::remove_dir_all(&data_dir).unwrap();

        let update = IssueUpdate {
            issue_title: Some("changed".into()),
            ..Default::default()
        };
        assert!(matches!(store.update_by_id(&id, update), Err(StoreError::Io(_))));
        assert!(matches!(store.delete_by_id(&id), Err(StoreError::Io(_))));
        assert!(matches!(
            store.create("alpha", new_issue("lost", "Test 2")),
            Err(StoreError::Io(_))
        ));

        let listed = store.find_by_project("alpha", &IssueFilter::default()).unwrap();
        assert_eq!(listed, vec![kept.clone()]);

        // Once the directory is back, the next write lands normally.
        fs::create_dir(&data_dir).unwrap();
        store.delete_by_id(&id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_find_returns_insertion_order() {
        let store = DocumentStore::in_memory();
        let titles: Vec<String> = (0..64).map(|i| format!("issue {i}")).collect();
        for title in &titles {
            store.create("alpha", new_issue(title, "Test 1")).unwrap();
        }

        let listed: Vec<String> = store
            .find_by_project("alpha", &IssueFilter::default())
            .unwrap()
            .into_iter()
            .map(|issue| issue.issue_title)
            .collect();
        assert_eq!(listed, titles);
    }

    #[test]
    fn test_reload_keeps_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.json");

        let store = DocumentStore::load_from_file(&path).unwrap();
        let created: Vec<Issue> = (0..16)
            .map(|i| store.create("alpha", new_issue(&format!("issue {i}"), "Test 1")).unwrap())
            .collect();
        store.close().unwrap();

        let reopened = DocumentStore::load_from_file(&path).unwrap();
        let listed = reopened.find_by_project("alpha", &IssueFilter::default()).unwrap();
        assert_eq!(listed, created);

        let next = reopened.create("alpha", new_issue("after reload", "Test 1")).unwrap();
        let listed = reopened.find_by_project("alpha", &IssueFilter::default()).unwrap();
        assert_eq!(listed.last(), Some(&next));
    }
}
