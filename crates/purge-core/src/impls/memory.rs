//! In-memory implementations of every port.
//!
//! Development and test doubles. Each one keeps the state of the external
//! system it stands in for, records every call in order, and can be told to
//! fail specific calls.
//!
//! Builder methods (`with_*`) are used before the value is shared; the async
//! methods inspect or script it afterwards.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use crate::ports::{
    CatalogLocation, CatalogRecord, CatalogStore, ClientError, ContainerRegistry, DeleteStatus,
    ImageIndex, IndexKind, ObjectStore, PackageRepository, RepositoryComponent,
};

// ---------------------------------------------------------------------------
// Catalog store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCatalogStore {
    records: Mutex<HashMap<CatalogLocation, CatalogRecord>>,
    read_error: Mutex<Option<ClientError>>,
    write_error: Mutex<Option<ClientError>>,
    writes: Mutex<usize>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, location: &CatalogLocation, record: CatalogRecord) {
        self.records.lock().await.insert(location.clone(), record);
    }

    pub async fn get(&self, location: &CatalogLocation) -> Option<CatalogRecord> {
        self.records.lock().await.get(location).cloned()
    }

    pub async fn fail_reads_with(&self, error: ClientError) {
        *self.read_error.lock().await = Some(error);
    }

    pub async fn fail_writes_with(&self, error: ClientError) {
        *self.write_error.lock().await = Some(error);
    }

    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn read(&self, location: &CatalogLocation) -> Result<CatalogRecord, ClientError> {
        if let Some(err) = self.read_error.lock().await.clone() {
            return Err(err);
        }
        self.records
            .lock()
            .await
            .get(location)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("catalog {location}")))
    }

    async fn write(
        &self,
        location: &CatalogLocation,
        record: &CatalogRecord,
    ) -> Result<(), ClientError> {
        if let Some(err) = self.write_error.lock().await.clone() {
            return Err(err);
        }
        *self.writes.lock().await += 1;
        self.records
            .lock()
            .await
            .insert(location.clone(), record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared bookkeeping for the delete-style fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Ledger {
    present: HashSet<String>,
    failures: HashMap<String, ClientError>,
    calls: Vec<String>,
}

impl Ledger {
    fn with_present(present: impl IntoIterator<Item = String>) -> Self {
        Self {
            present: present.into_iter().collect(),
            ..Self::default()
        }
    }

    fn delete(&mut self, label: String) -> Result<DeleteStatus, ClientError> {
        self.calls.push(label.clone());
        if let Some(err) = self.failures.get(&label) {
            return Err(err.clone());
        }
        if self.present.remove(&label) {
            Ok(DeleteStatus::Deleted)
        } else {
            Ok(DeleteStatus::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Container registry
// ---------------------------------------------------------------------------

/// Registry holding `name:tag` labels.
#[derive(Default)]
pub struct InMemoryRegistry {
    ledger: Mutex<Ledger>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images<'a>(images: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            ledger: Mutex::new(Ledger::with_present(
                images.into_iter().map(|(n, t)| format!("{n}:{t}")),
            )),
        }
    }

    /// Make deletes of `name:tag` fail with `error`.
    pub async fn fail_on(&self, label: &str, error: ClientError) {
        self.ledger
            .lock()
            .await
            .failures
            .insert(label.to_string(), error);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.ledger.lock().await.calls.clone()
    }

    pub async fn contains(&self, name: &str, tag: &str) -> bool {
        self.ledger
            .lock()
            .await
            .present
            .contains(&format!("{name}:{tag}"))
    }
}

#[async_trait]
impl ContainerRegistry for InMemoryRegistry {
    async fn delete_image(&self, name: &str, tag: &str) -> Result<DeleteStatus, ClientError> {
        self.ledger.lock().await.delete(format!("{name}:{tag}"))
    }
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

/// Object store holding `bucket:key` labels.
#[derive(Default)]
pub struct InMemoryObjectStore {
    ledger: Mutex<Ledger>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects<'a>(objects: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            ledger: Mutex::new(Ledger::with_present(
                objects.into_iter().map(|(b, k)| format!("{b}:{k}")),
            )),
        }
    }

    /// Make deletes of `bucket:key` fail with `error`.
    pub async fn fail_on(&self, label: &str, error: ClientError) {
        self.ledger
            .lock()
            .await
            .failures
            .insert(label.to_string(), error);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.ledger.lock().await.calls.clone()
    }

    pub async fn contains(&self, bucket: &str, key: &str) -> bool {
        self.ledger
            .lock()
            .await
            .present
            .contains(&format!("{bucket}:{key}"))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<DeleteStatus, ClientError> {
        self.ledger.lock().await.delete(format!("{bucket}:{key}"))
    }
}

// ---------------------------------------------------------------------------
// Package repository
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PackageState {
    components: Vec<(String, RepositoryComponent)>,
    repositories: HashSet<String>,
    gone: HashSet<String>,
    listing_error: Option<ClientError>,
    failures: HashMap<String, ClientError>,
    list_calls: usize,
    deleted_components: Vec<String>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryPackageRepository {
    state: Mutex<PackageState>,
}

impl InMemoryPackageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, repository: &str, id: &str, name: &str, version: &str) -> Self {
        self.state.get_mut().components.push((
            repository.to_string(),
            RepositoryComponent {
                id: id.to_string(),
                name: name.to_string(),
                version: version.to_string(),
            },
        ));
        self
    }

    pub fn with_repository(mut self, name: &str) -> Self {
        self.state.get_mut().repositories.insert(name.to_string());
        self
    }

    /// Keep the component in listings but answer its delete with not-found,
    /// as if someone removed it after the listing was taken.
    pub async fn forget_component(&self, id: &str) {
        self.state.lock().await.gone.insert(id.to_string());
    }

    pub async fn fail_listing_with(&self, error: ClientError) {
        self.state.lock().await.listing_error = Some(error);
    }

    /// Make deletes of the component or repository named `target` fail.
    pub async fn fail_on(&self, target: &str, error: ClientError) {
        self.state
            .lock()
            .await
            .failures
            .insert(target.to_string(), error);
    }

    pub async fn list_calls(&self) -> usize {
        self.state.lock().await.list_calls
    }

    pub async fn deleted_components(&self) -> Vec<String> {
        self.state.lock().await.deleted_components.clone()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn has_repository(&self, name: &str) -> bool {
        self.state.lock().await.repositories.contains(name)
    }
}

#[async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn list_components(
        &self,
        repository: &str,
    ) -> Result<Vec<RepositoryComponent>, ClientError> {
        let mut state = self.state.lock().await;
        state.list_calls += 1;
        state.calls.push(format!("list {repository}"));
        if let Some(err) = state.listing_error.clone() {
            return Err(err);
        }
        Ok(state
            .components
            .iter()
            .filter(|(repo, _)| repo == repository)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn delete_component(&self, id: &str) -> Result<DeleteStatus, ClientError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("delete-component {id}"));
        if let Some(err) = state.failures.get(id) {
            return Err(err.clone());
        }
        if state.gone.contains(id) {
            return Ok(DeleteStatus::NotFound);
        }
        let before = state.components.len();
        state.components.retain(|(_, c)| c.id != id);
        if state.components.len() < before {
            state.deleted_components.push(id.to_string());
            state.gone.insert(id.to_string());
            Ok(DeleteStatus::Deleted)
        } else {
            Ok(DeleteStatus::NotFound)
        }
    }

    async fn delete_repository(&self, name: &str) -> Result<DeleteStatus, ClientError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("delete-repository {name}"));
        if let Some(err) = state.failures.get(name) {
            return Err(err.clone());
        }
        if state.repositories.remove(name) {
            Ok(DeleteStatus::Deleted)
        } else {
            Ok(DeleteStatus::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Image index
// ---------------------------------------------------------------------------

#[derive(Default)]
struct IndexState {
    /// What a storage listing returns for an id.
    listing: HashMap<(IndexKind, String), Vec<String>>,
    entries: HashSet<(IndexKind, String)>,
    objects: HashSet<(IndexKind, String)>,
    failures: HashMap<String, ClientError>,
    calls: Vec<String>,
}

impl IndexState {
    fn call(&mut self, label: String) -> Result<(), ClientError> {
        self.calls.push(label.clone());
        match self.failures.get(&label) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Index of boot images and recipes plus the storage they point at.
///
/// Calls are recorded as `find <kind> <id>`, `delete-object <kind> <key>`
/// and `delete-entry <kind> <id>`.
#[derive(Default)]
pub struct InMemoryImageIndex {
    state: Mutex<IndexState>,
}

impl InMemoryImageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<'a>(
        mut self,
        kind: IndexKind,
        id: &str,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let state = self.state.get_mut();
        let keys: Vec<String> = keys.into_iter().map(str::to_string).collect();
        for key in &keys {
            state.objects.insert((kind, key.clone()));
        }
        state.entries.insert((kind, id.to_string()));
        state.listing.insert((kind, id.to_string()), keys);
        self
    }

    /// Storage listing still shows `keys` for `id`, but neither the objects
    /// nor the entry exist any more.
    pub fn with_dangling_keys<'a>(
        mut self,
        kind: IndexKind,
        id: &str,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.state.get_mut().listing.insert(
            (kind, id.to_string()),
            keys.into_iter().map(str::to_string).collect(),
        );
        self
    }

    /// Make the call recorded as `label` fail with `error`.
    pub async fn fail_on(&self, label: &str, error: ClientError) {
        self.state
            .lock()
            .await
            .failures
            .insert(label.to_string(), error);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn has_entry(&self, kind: IndexKind, id: &str) -> bool {
        self.state
            .lock()
            .await
            .entries
            .contains(&(kind, id.to_string()))
    }
}

#[async_trait]
impl ImageIndex for InMemoryImageIndex {
    async fn find_storage_keys(
        &self,
        kind: IndexKind,
        id: &str,
    ) -> Result<Vec<String>, ClientError> {
        let mut state = self.state.lock().await;
        state.call(format!("find {kind} {id}"))?;
        Ok(state
            .listing
            .get(&(kind, id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_storage_object(
        &self,
        kind: IndexKind,
        key: &str,
    ) -> Result<DeleteStatus, ClientError> {
        let mut state = self.state.lock().await;
        state.call(format!("delete-object {kind} {key}"))?;
        if state.objects.remove(&(kind, key.to_string())) {
            Ok(DeleteStatus::Deleted)
        } else {
            Ok(DeleteStatus::NotFound)
        }
    }

    async fn delete_index_entry(
        &self,
        kind: IndexKind,
        id: &str,
    ) -> Result<DeleteStatus, ClientError> {
        let mut state = self.state.lock().await;
        state.call(format!("delete-entry {kind} {id}"))?;
        if state.entries.remove(&(kind, id.to_string())) {
            state.listing.remove(&(kind, id.to_string()));
            Ok(DeleteStatus::Deleted)
        } else {
            Ok(DeleteStatus::NotFound)
        }
    }
}
