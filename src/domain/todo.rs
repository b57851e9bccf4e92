use crate::domain;
use crate::domain::todo::driven_ports::{TaskReader, TaskWriter};
use crate::domain::todo::driving_ports::TaskError;
use crate::domain::user::driven_ports::UserReader;
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;

/// Label of the task every new user starts out with
pub const STARTER_TASK_LABEL: &str = "sample task";

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoTask {
    pub id: i64,
    pub owner_user_id: i64,
    pub label: String,
    pub done: bool,
}

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct NewTask {
    pub label: String,
    pub done: bool,
}

impl NewTask {
    /// The task written alongside every newly created user
    pub fn starter() -> Self {
        NewTask {
            label: STARTER_TASK_LABEL.to_owned(),
            done: false,
        }
    }
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        async fn tasks_for_user(
            &self,
            user_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoTask>, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn create_task_for_user(
            &self,
            user_id: i64,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, anyhow::Error>;

        /// Removes every task the user owns, returning how many were removed
        async fn delete_tasks_for_user(
            &self,
            user_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use tracing::info;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("The specified user did not exist.")]
        UserDoesNotExist,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<domain::user::UserExistsErr> for TaskError {
        fn from(value: domain::user::UserExistsErr) -> Self {
            match value {
                domain::user::UserExistsErr::UserDoesNotExist(username) => {
                    info!("User {username} didn't exist when working with their tasks.");
                    TaskError::UserDoesNotExist
                }
                domain::user::UserExistsErr::PortError(err) => {
                    TaskError::from(err.context("Looking up task owner"))
                }
            }
        }
    }


    pub trait TaskPort {
        async fn tasks_for_user(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl UserReader,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<TodoTask>, TaskError>;
        /// Swaps the user's whole task list for `tasks` in one transaction and returns
        /// how many tasks were saved
        async fn replace_tasks_for_user(
            &self,
            username: &str,
            tasks: &[NewTask],
            ext_cxn: &impl Transactable,
            u_reader: &impl UserReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<usize, TaskError>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn tasks_for_user(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl UserReader,
        task_read: &impl TaskReader,
    ) -> Result<Vec<TodoTask>, TaskError> {
        let owner = domain::user::find_user_by_name(username, &mut *ext_cxn, u_reader).await?;
        let tasks_result = task_read.tasks_for_user(owner.id, &mut *ext_cxn).await?;

        Ok(tasks_result)
    }

    async fn replace_tasks_for_user(
        &self,
        username: &str,
        tasks: &[NewTask],
        ext_cxn: &impl Transactable,
        u_reader: &impl UserReader,
        task_write: &impl TaskWriter,
    ) -> Result<usize, TaskError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("Starting task replacement")?;

        let owner = domain::user::find_user_by_name(username, &mut txn, u_reader).await?;
        task_write
            .delete_tasks_for_user(owner.id, &mut txn)
            .await
            .context("Clearing out old tasks")?;
        for task in tasks {
            task_write
                .create_task_for_user(owner.id, task, &mut txn)
                .await
                .context("Saving a replacement task")?;
        }

        txn.commit().await.context("Saving replaced tasks")?;

        Ok(tasks.len())
    }
}
