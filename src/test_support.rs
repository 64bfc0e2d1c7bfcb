// src/test_support.rs

//! In-memory stand-ins for the remote services, shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Repository;
use crate::services::{
    CommitEntry, CommitQuery, FileContent, HostingApi, Message, Notifier, Release, RepoList,
    RepoMetadata, WebFetch,
};
use crate::storage::{LocalStorage, SnapshotStore};

/// Canned lookup: a value or an HTTP status.
type Canned<T> = std::result::Result<T, u16>;

fn resolve<T: Clone>(table: &HashMap<String, Canned<T>>, key: &str, url: &str) -> Result<T> {
    match table.get(key) {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(status)) => Err(AppError::api(*status, url, "Server Error")),
        None => Err(AppError::api(404, url, "Not Found")),
    }
}

/// Scripted [`HostingApi`].
#[derive(Default)]
pub struct FakeHosting {
    pages: Mutex<Vec<Vec<Repository>>>,
    list_status: Option<u16>,
    metadata: HashMap<String, Canned<RepoMetadata>>,
    commits: HashMap<String, Canned<Vec<CommitEntry>>>,
    releases: HashMap<String, Canned<Vec<Release>>>,
    counts: HashMap<String, Canned<usize>>,
    files: HashMap<String, Canned<FileContent>>,
    list_calls: AtomicU32,
    commit_calls: AtomicU32,
}

impl FakeHosting {
    /// Org listing split into pages of `per_page`.
    pub fn with_repos(repos: Vec<Repository>, per_page: usize) -> Self {
        let fake = Self::default();
        fake.set_repos(repos, per_page);
        fake
    }

    /// Replace the org listing between runs.
    pub fn set_repos(&self, repos: Vec<Repository>, per_page: usize) {
        let pages = repos.chunks(per_page.max(1)).map(<[Repository]>::to_vec).collect();
        *self.pages.lock().unwrap() = pages;
    }

    pub fn failing_listing(mut self, status: u16) -> Self {
        self.list_status = Some(status);
        self
    }

    pub fn metadata(mut self, full_name: &str, value: Canned<RepoMetadata>) -> Self {
        self.metadata.insert(full_name.to_string(), value);
        self
    }

    pub fn commits(mut self, full_name: &str, value: Canned<Vec<CommitEntry>>) -> Self {
        self.commits.insert(full_name.to_string(), value);
        self
    }

    pub fn releases(mut self, full_name: &str, value: Canned<Vec<Release>>) -> Self {
        self.releases.insert(full_name.to_string(), value);
        self
    }

    pub fn count(mut self, full_name: &str, list: RepoList, value: Canned<usize>) -> Self {
        self.counts.insert(format!("{full_name}#{list:?}"), value);
        self
    }

    pub fn file(mut self, full_name: &str, value: Canned<FileContent>) -> Self {
        self.files.insert(full_name.to_string(), value);
        self
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn commit_calls(&self) -> u32 {
        self.commit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostingApi for FakeHosting {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<Repository>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let url = format!("https://api.test/orgs/{org}/repos?page={page}");
        if let Some(status) = self.list_status {
            return Err(AppError::api(status, url, "Server Error"));
        }
        let pages = self.pages.lock().unwrap();
        Ok(pages.get(page as usize - 1).cloned().unwrap_or_default())
    }

    async fn repo_metadata(&self, full_name: &str) -> Result<RepoMetadata> {
        resolve(&self.metadata, full_name, &format!("https://api.test/repos/{full_name}"))
    }

    async fn commits(&self, full_name: &str, _query: &CommitQuery) -> Result<Vec<CommitEntry>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        resolve(
            &self.commits,
            full_name,
            &format!("https://api.test/repos/{full_name}/commits"),
        )
    }

    async fn releases(&self, full_name: &str) -> Result<Vec<Release>> {
        resolve(
            &self.releases,
            full_name,
            &format!("https://api.test/repos/{full_name}/releases"),
        )
    }

    async fn count_list(
        &self,
        full_name: &str,
        list: RepoList,
        _per_page: Option<u32>,
    ) -> Result<usize> {
        resolve(
            &self.counts,
            &format!("{full_name}#{list:?}"),
            &format!("https://api.test/repos/{full_name}/{list:?}"),
        )
    }

    async fn file_content(&self, full_name: &str, path: &str) -> Result<FileContent> {
        resolve(
            &self.files,
            full_name,
            &format!("https://api.test/repos/{full_name}/contents/{path}"),
        )
    }
}

/// Scripted [`WebFetch`]. Unknown pages are 404; unknown HEADs are 200.
#[derive(Default)]
pub struct FakeWeb {
    pages: HashMap<String, String>,
    heads: HashMap<String, std::result::Result<u16, String>>,
    head_calls: AtomicU32,
}

impl FakeWeb {
    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn head(mut self, url: &str, status: Result<u16>) -> Self {
        self.heads
            .insert(url.to_string(), status.map_err(|e| e.to_string()));
        self
    }

    pub fn head_calls(&self) -> u32 {
        self.head_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebFetch for FakeWeb {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::api(404, url, "Not Found"))
    }

    async fn head_status(&self, url: &str) -> Result<u16> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        match self.heads.get(url) {
            Some(Ok(status)) => Ok(*status),
            Some(Err(message)) => Err(AppError::validation(message.clone())),
            None => Ok(200),
        }
    }
}

/// [`Notifier`] that records what it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Message>>,
    fail_status: Option<u16>,
}

impl RecordingNotifier {
    pub fn failing(status: u16) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_status: Some(status),
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &Message) -> Result<()> {
        if let Some(status) = self.fail_status {
            return Err(AppError::api(status, "https://hooks.test/webhook", "invalid_token"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// [`LocalStorage`] that counts snapshot writes.
pub struct CountingStore {
    inner: LocalStorage,
    writes: AtomicU32,
}

impl CountingStore {
    pub fn new(inner: LocalStorage) -> Self {
        Self {
            inner,
            writes: AtomicU32::new(0),
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for CountingStore {
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.read_bytes(key).await
    }

    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_bytes(key, bytes).await
    }

    fn location(&self, key: &str) -> String {
        self.inner.location(key)
    }
}
