//! Shared world state for task workflow BDD scenarios.

use std::sync::Arc;

use atelier::config::WorkflowConfig;
use atelier::task::{
    adapters::memory::{InMemoryDirectory, InMemoryTaskBackend},
    domain::{Actor, PermissionLevel, Task, TaskId, TaskStatus, TaskType, UserId},
    services::{TaskLifecycleService, TaskWorkflowError},
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;

/// Clock pinned to 2024-05-20 09:00 UTC.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioClock;

impl ScenarioClock {
    /// Returns the pinned calendar day.
    pub fn today() -> NaiveDate {
        Self.utc().date_naive()
    }
}

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskBackend, InMemoryDirectory, ScenarioClock>;

/// Scenario world for task workflow behaviour tests.
pub struct TaskWorkflowWorld {
    pub service: TestTaskService,
    pub assignee: Option<Actor>,
    pub current_task: Option<Task>,
    pub posting_task: Option<Task>,
    pub bulk_tasks: Vec<(TaskId, TaskStatus)>,
    pub last_result: Option<Result<Task, TaskWorkflowError>>,
}

impl TaskWorkflowWorld {
    /// Creates a world with an empty session.
    #[must_use]
    pub fn new() -> Self {
        let poppy = UserId::new("poppy").expect("valid user id");
        let posting = TaskType::new("Posting").expect("valid task type");
        let directory = InMemoryDirectory::new().with_default_task_types(poppy, [posting]);
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskBackend::new()),
            Arc::new(directory),
            Arc::new(ScenarioClock),
            WorkflowConfig::default(),
        );

        Self {
            service,
            assignee: None,
            current_task: None,
            posting_task: None,
            bulk_tasks: Vec::new(),
            last_result: None,
        }
    }

    /// Returns the task the scenario is working on.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.current_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))
    }

    /// Returns the assignee acting in the scenario.
    pub fn assignee(&self) -> Result<&Actor, eyre::Report> {
        self.assignee
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing assignee in scenario world"))
    }
}

impl Default for TaskWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a reviewer actor.
pub fn reviewer(name: &str) -> Result<Actor, eyre::Report> {
    Ok(Actor::new(UserId::new(name)?, PermissionLevel::Editor))
}

/// Builds an actor without review rights.
pub fn member(name: &str) -> Result<Actor, eyre::Report> {
    Ok(Actor::new(UserId::new(name)?, PermissionLevel::Viewer))
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
