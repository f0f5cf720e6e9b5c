//! Task list use-case service.
//!
//! # Responsibility
//! - Open the store from an explicit `StoreConfig`.
//! - Validate task input, then queue inserts/deletes on the write worker.
//! - Publish the full task snapshot to subscribers after every change.
//! - Hold the user's selected sort method for list rendering.
//!
//! # Invariants
//! - Empty names and unknown projects are rejected before a write is queued.
//! - Writes are serialized in submission order on one worker thread.
//! - A snapshot is published only after a write changed the task set, and
//!   while the connection lock is still held, so a subscriber never sees an
//!   older task set after a newer one.
//! - A committed write whose snapshot cannot be read resolves to
//!   `ServiceError::SnapshotPublish`, never to plain success.
//! - The initial sort method is `SortMethod::None`.

use crate::db::{open_store, DbError, StoreConfig};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{RepoError, SqliteTaskRepository, TaskRepository};
use crate::service::subscription::{SnapshotHub, Subscription};
use crate::service::task_list::{build_task_list, TaskListItem};
use crate::service::write_worker::{PendingWrite, WorkerStopped, WriteWorker};
use crate::sort::SortMethod;
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

const WRITE_WORKER_THREAD: &str = "todoc-writer";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for task list use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Task input failed validation.
    Validation(TaskValidationError),
    /// Project id is not part of the catalog.
    UnknownProject(ProjectId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// The write worker could not be started.
    WorkerSpawn(std::io::Error),
    /// The write worker is no longer running.
    WorkerStopped,
    /// A previous holder of the connection lock panicked.
    LockPoisoned,
    /// The write committed but the follow-up snapshot read failed, so
    /// subscribers did not receive the new task set.
    SnapshotPublish(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownProject(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::WorkerSpawn(err) => write!(f, "failed to start write worker: {err}"),
            Self::WorkerStopped => write!(f, "write worker stopped"),
            Self::LockPoisoned => write!(f, "database connection lock poisoned"),
            Self::SnapshotPublish(err) => {
                write!(f, "write committed but snapshot was not published: {err}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::WorkerSpawn(err) => Some(err),
            Self::SnapshotPublish(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::UnknownProject(id) => Self::UnknownProject(id),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<WorkerStopped> for ServiceError {
    fn from(_: WorkerStopped) -> Self {
        Self::WorkerStopped
    }
}

type TaskSnapshot = Vec<Task>;

/// Entry point used by front ends: store access, write queue and the
/// selected sort method.
pub struct TaskService {
    conn: Arc<Mutex<Connection>>,
    hub: SnapshotHub<TaskSnapshot>,
    worker: WriteWorker,
    sort_method: SortMethod,
}

impl TaskService {
    /// Opens the store described by `config` and starts the write worker.
    pub fn open(config: &StoreConfig) -> ServiceResult<Self> {
        let conn = open_store(config)?;
        Self::from_connection(conn)
    }

    /// Wraps an already opened and migrated connection.
    ///
    /// The connection must have `foreign_keys=ON`; otherwise this returns
    /// `RepoError::ForeignKeysDisabled`.
    pub fn from_connection(conn: Connection) -> ServiceResult<Self> {
        SqliteTaskRepository::try_new(&conn)?;
        let worker = WriteWorker::spawn(WRITE_WORKER_THREAD).map_err(ServiceError::WorkerSpawn)?;
        info!("event=service_open module=service status=ok");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: SnapshotHub::new(),
            worker,
            sort_method: SortMethod::default(),
        })
    }

    /// Projects as seeded in the store.
    pub fn projects(&self) -> ServiceResult<Vec<Project>> {
        let conn = lock_conn(&self.conn)?;
        Ok(SqliteProjectRepository::new(&conn).list_projects()?)
    }

    /// One-shot snapshot of every task in storage order.
    pub fn tasks(&self) -> ServiceResult<Vec<Task>> {
        let conn = lock_conn(&self.conn)?;
        Ok(SqliteTaskRepository::new(&conn).list_tasks()?)
    }

    /// Subscribes to task snapshots.
    ///
    /// The current snapshot is delivered first, then one snapshot per
    /// write that changed the task set.
    pub fn subscribe(&self) -> ServiceResult<Subscription<TaskSnapshot>> {
        let conn = lock_conn(&self.conn)?;
        let initial = SqliteTaskRepository::new(&conn).list_tasks()?;
        Ok(self.hub.subscribe(initial))
    }

    /// Creates a task in `project_id` stamped with the current time.
    pub fn create_task(
        &self,
        project_id: ProjectId,
        name: impl Into<String>,
    ) -> ServiceResult<PendingWrite<ServiceResult<TaskId>>> {
        self.submit_insert(Task::new(project_id, name))
    }

    /// Creates a task with a caller-provided creation time.
    pub fn create_task_at(
        &self,
        project_id: ProjectId,
        name: impl Into<String>,
        creation_timestamp: i64,
    ) -> ServiceResult<PendingWrite<ServiceResult<TaskId>>> {
        self.submit_insert(Task::with_timestamp(project_id, name, creation_timestamp))
    }

    /// Queues deletion of `task`. Resolves to whether a row was removed.
    pub fn delete_task(&self, task: &Task) -> ServiceResult<PendingWrite<ServiceResult<bool>>> {
        let task = task.clone();
        let conn = Arc::clone(&self.conn);
        let hub = self.hub.clone();
        let pending = self.worker.submit(move || -> ServiceResult<bool> {
            let conn = lock_conn(&conn)?;
            let repo = SqliteTaskRepository::new(&conn);
            let removed = repo.delete_task(&task)?;
            if removed {
                publish_snapshot(&repo, &hub)?;
            }
            Ok(removed)
        })?;
        Ok(pending)
    }

    /// Blocks until every write queued so far has run.
    pub fn flush(&self) -> ServiceResult<()> {
        self.worker.submit(|| ())?.wait()?;
        Ok(())
    }

    pub fn sort_method(&self) -> SortMethod {
        self.sort_method
    }

    pub fn set_sort_method(&mut self, method: SortMethod) {
        debug!("event=sort_select module=service status=ok method={method}");
        self.sort_method = method;
    }

    /// Current snapshot sorted by the selected method, ready for display.
    pub fn task_list(&self) -> ServiceResult<Vec<TaskListItem>> {
        self.task_list_sorted(self.sort_method)
    }

    /// Current snapshot sorted by `method`, ready for display.
    pub fn task_list_sorted(&self, method: SortMethod) -> ServiceResult<Vec<TaskListItem>> {
        Ok(build_task_list(self.tasks()?, method))
    }

    fn submit_insert(&self, task: Task) -> ServiceResult<PendingWrite<ServiceResult<TaskId>>> {
        task.validate()?;
        if Project::by_id(task.project_id).is_none() {
            return Err(ServiceError::UnknownProject(task.project_id));
        }

        let conn = Arc::clone(&self.conn);
        let hub = self.hub.clone();
        let pending = self.worker.submit(move || -> ServiceResult<TaskId> {
            let conn = lock_conn(&conn)?;
            let repo = SqliteTaskRepository::new(&conn);
            let id = repo.insert_task(&task)?;
            publish_snapshot(&repo, &hub)?;
            Ok(id)
        })?;
        Ok(pending)
    }
}

fn publish_snapshot(
    repo: &SqliteTaskRepository<'_>,
    hub: &SnapshotHub<TaskSnapshot>,
) -> ServiceResult<()> {
    let snapshot = repo.list_tasks().map_err(|err| {
        error!(
            "event=snapshot_publish module=service status=error error_code=snapshot_read_failed error={err}"
        );
        ServiceError::SnapshotPublish(err)
    })?;
    let size = snapshot.len();
    let reached = hub.publish(snapshot);
    debug!("event=snapshot_publish module=service status=ok tasks={size} subscribers={reached}");
    Ok(())
}

fn lock_conn(conn: &Mutex<Connection>) -> ServiceResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| ServiceError::LockPoisoned)
}
