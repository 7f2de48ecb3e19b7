use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;
use std::cell::Cell;
use taskboard_core::{
    AllowAll, DashboardError, DashboardService, Document, DocumentStore, KeyValueStore,
    LocalBackend, ManualClock, MemoryDocumentStore, MemoryKeyValueStore, NewTask, RemoteBackend,
    RepoError, RepoResult,
};

/// Key-value store whose reads, writes or removals can be switched off.
#[derive(Default)]
struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    fail_removes: Cell<bool>,
}

impl FlakyKeyValueStore {
    fn check(flag: &Cell<bool>) -> RepoResult<()> {
        if flag.get() {
            return Err(RepoError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Self::check(&self.fail_reads)?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        Self::check(&self.fail_writes)?;
        Self::check(&self.fail_removes)?;
        self.inner.remove(key)
    }

    fn atomic(&self, apply: &mut dyn FnMut() -> RepoResult<()>) -> RepoResult<()> {
        self.inner.atomic(apply)
    }
}

/// Document store that rejects every write once `offline` is set.
///
/// `deletes_left` lets that many deletes through before failing the rest.
#[derive(Default)]
struct FlakyDocumentStore {
    inner: MemoryDocumentStore,
    offline: Cell<bool>,
    deletes_left: Cell<Option<usize>>,
}

impl FlakyDocumentStore {
    fn check(&self) -> RepoResult<()> {
        if self.offline.get() {
            return Err(RepoError::Unavailable("network unreachable".to_string()));
        }
        Ok(())
    }

    fn take_delete(&self) -> RepoResult<()> {
        match self.deletes_left.get() {
            Some(0) => Err(RepoError::Unavailable("connection dropped".to_string())),
            Some(left) => {
                self.deletes_left.set(Some(left - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl DocumentStore for FlakyDocumentStore {
    fn list(&self, collection: &str) -> RepoResult<Vec<Document>> {
        self.inner.list(collection)
    }

    fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Document>> {
        self.inner.get(collection, id)
    }

    fn set(&self, collection: &str, id: &str, body: &Value) -> RepoResult<()> {
        self.check()?;
        self.inner.set(collection, id, body)
    }

    fn delete(&self, collection: &str, id: &str) -> RepoResult<()> {
        self.check()?;
        self.take_delete()?;
        self.inner.delete(collection, id)
    }

    fn atomic(&self, apply: &mut dyn FnMut() -> RepoResult<()>) -> RepoResult<()> {
        self.inner.atomic(apply)
    }
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap())
}

fn new_task(name: &str) -> NewTask {
    NewTask {
        name: name.to_string(),
        due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        ..NewTask::default()
    }
}

fn is_unavailable(result: Result<impl std::fmt::Debug, DashboardError>) -> bool {
    matches!(
        result,
        Err(DashboardError::Persistence(RepoError::Unavailable(_)))
    )
}

#[test]
fn failed_local_writes_leave_memory_untouched() {
    let store = FlakyKeyValueStore::default();
    let clock = clock();
    let mut service = DashboardService::open(LocalBackend::new(&store), AllowAll, &clock).unwrap();
    let alice = service.add_person("Alice").unwrap();
    let report = service.add_task(&new_task("Report")).unwrap();
    let people_before = service.people().to_vec();
    let tasks_before = service.tasks().to_vec();

    store.fail_writes.set(true);
    assert!(is_unavailable(service.add_person("Bob")));
    assert!(is_unavailable(service.rename_person(alice, "Alicia")));
    assert!(is_unavailable(service.add_task(&new_task("Essay"))));
    assert!(is_unavailable(service.complete_task(report)));
    assert!(is_unavailable(service.toggle_description(report)));
    assert!(is_unavailable(service.remove_task(report)));
    assert!(is_unavailable(service.remove_person(alice)));

    assert_eq!(service.people(), people_before.as_slice());
    assert_eq!(service.tasks(), tasks_before.as_slice());
    assert_eq!(service.selected_person().map(|person| person.id), Some(alice));
    assert!(!service.task(report).unwrap().completed);

    store.fail_writes.set(false);
    service.complete_task(report).unwrap();
    assert!(service.task(report).unwrap().late);
}

#[test]
fn failed_fallback_read_keeps_person() {
    let store = FlakyKeyValueStore::default();
    let clock = clock();
    let mut service = DashboardService::open(LocalBackend::new(&store), AllowAll, &clock).unwrap();
    service.add_person("Alice").unwrap();
    let bob = service.add_person("Bob").unwrap();

    store.fail_reads.set(true);
    assert!(is_unavailable(service.remove_person(bob)));
    store.fail_reads.set(false);

    assert_eq!(service.people().len(), 2);
    assert_eq!(service.selected_person().map(|person| person.id), Some(bob));
    assert!(store.inner.get("people").unwrap().unwrap().contains("Bob"));
}

#[test]
fn failed_select_keeps_previous_selection() {
    let store = FlakyKeyValueStore::default();
    let clock = clock();
    let mut service = DashboardService::open(LocalBackend::new(&store), AllowAll, &clock).unwrap();
    let alice = service.add_person("Alice").unwrap();
    service.add_task(&new_task("Report")).unwrap();
    let bob = service.add_person("Bob").unwrap();
    service.select_person(alice).unwrap();

    store.fail_reads.set(true);
    assert!(is_unavailable(service.select_person(bob)));
    assert_eq!(service.selected_person().map(|person| person.id), Some(alice));
    assert_eq!(service.tasks().len(), 1);
}

#[test]
fn failed_remote_writes_leave_memory_untouched() {
    let store = FlakyDocumentStore::default();
    let clock = clock();
    let mut service = DashboardService::open(RemoteBackend::new(&store), AllowAll, &clock).unwrap();
    let dana = service.add_person("Dana").unwrap();
    let audit = service.add_task(&new_task("Audit")).unwrap();

    store.offline.set(true);
    assert!(is_unavailable(service.set_person_emails(dana, &["dana@corp.io"])));
    assert!(is_unavailable(service.complete_task(audit)));
    assert!(is_unavailable(service.remove_person(dana)));

    assert!(service.person(dana).unwrap().emails.is_empty());
    assert!(!service.task(audit).unwrap().completed);
    assert_eq!(service.people().len(), 1);
    assert_eq!(service.tasks().len(), 1);

    store.offline.set(false);
    service.reload().unwrap();
    assert_eq!(service.people().len(), 1);
    assert_eq!(service.tasks().len(), 1);
}

#[test]
fn failed_task_cleanup_keeps_person_stored() {
    let store = FlakyKeyValueStore::default();
    let clock = clock();
    let mut service = DashboardService::open(LocalBackend::new(&store), AllowAll, &clock).unwrap();
    service.add_person("Alice").unwrap();
    let bob = service.add_person("Bob").unwrap();
    service.add_task(&new_task("Report")).unwrap();

    store.fail_removes.set(true);
    assert!(is_unavailable(service.remove_person(bob)));
    store.fail_removes.set(false);

    assert_eq!(service.people().len(), 2);
    assert_eq!(service.selected_person().map(|person| person.id), Some(bob));
    assert!(store.inner.get("people").unwrap().unwrap().contains("Bob"));
    assert!(store
        .inner
        .get(&format!("tasks_{bob}"))
        .unwrap()
        .unwrap()
        .contains("Report"));

    service.reload().unwrap();
    assert_eq!(service.people().len(), 2);
    assert_eq!(service.tasks().len(), 1);
}

#[test]
fn interrupted_remote_cascade_keeps_every_task() {
    let store = FlakyDocumentStore::default();
    let clock = clock();
    let mut service = DashboardService::open(RemoteBackend::new(&store), AllowAll, &clock).unwrap();
    let dana = service.add_person("Dana").unwrap();
    service.add_task(&new_task("Audit")).unwrap();
    service.add_task(&new_task("Budget")).unwrap();

    store.deletes_left.set(Some(1));
    assert!(is_unavailable(service.remove_person(dana)));
    store.deletes_left.set(None);

    assert_eq!(service.people().len(), 1);
    assert_eq!(service.tasks().len(), 2);
    let collection = format!("employees/{dana}/tasks");
    assert_eq!(store.inner.list(&collection).unwrap().len(), 2);
    assert!(store.inner.get("employees", &dana.to_string()).unwrap().is_some());

    service.remove_person(dana).unwrap();
    assert!(service.people().is_empty());
    assert!(store.inner.collection_paths().is_empty());
}
