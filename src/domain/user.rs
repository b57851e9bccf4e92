use crate::domain::DrivenPortError;
use crate::domain::todo;
use crate::domain::todo::driven_ports::TaskWriter;
use crate::domain::user::driving_ports::CreateUserError;
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use thiserror::Error;
use tracing::error;

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoUser {
    pub id: i64,
    pub username: String,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn get_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoUser>, anyhow::Error>;
        async fn get_by_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoUser>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Inserts a user and returns its new ID. Reports [DrivenPortError::Conflict] when the
        /// username is already taken.
        async fn create_user(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, DrivenPortError>;
    }

    pub trait DetectUser {
        async fn user_with_name_exists(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        #[error("The provided user already exists.")]
        UserAlreadyExists,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<DrivenPortError> for CreateUserError {
        fn from(value: DrivenPortError) -> Self {
            match value {
                DrivenPortError::Conflict => CreateUserError::UserAlreadyExists,
                DrivenPortError::CommsFailure(err) => {
                    CreateUserError::PortError(err.context("Trying to create user at service level"))
                }
            }
        }
    }


    pub trait UserPort {
        async fn get_usernames(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Vec<String>, anyhow::Error>;
        /// Creates a user along with its starter task. Either both are saved or neither is.
        async fn create_user(
            &self,
            username: &str,
            ext_cxn: &impl Transactable,
            u_detect: &impl driven_ports::DetectUser,
            u_writer: &impl driven_ports::UserWriter,
            task_write: &impl TaskWriter,
        ) -> Result<i64, CreateUserError>;
    }
}

pub struct UserService {}

#[derive(Debug, Error)]
pub(super) enum UserExistsErr {
    #[error("user \"{0}\" does not exist")]
    UserDoesNotExist(String),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

/// Looks a user up by name, treating a missing user as an error
pub(super) async fn find_user_by_name(
    username: &str,
    external_cxn: &mut impl ExternalConnectivity,
    user_read: &impl driven_ports::UserReader,
) -> Result<TodoUser, UserExistsErr> {
    let found_user = user_read.get_by_username(username, external_cxn).await?;

    found_user.ok_or_else(|| UserExistsErr::UserDoesNotExist(username.to_owned()))
}

impl driving_ports::UserPort for UserService {
    async fn get_usernames(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Vec<String>, anyhow::Error> {
        let all_users_result = u_reader.get_all(ext_cxn).await;
        if let Err(ref port_err) = all_users_result {
            error!("User fetch failure: {port_err}");
        }

        let usernames = all_users_result
            .context("Failed fetching users")?
            .into_iter()
            .map(|user| user.username)
            .collect();

        Ok(usernames)
    }

    async fn create_user(
        &self,
        username: &str,
        ext_cxn: &impl Transactable,
        u_detect: &impl driven_ports::DetectUser,
        u_writer: &impl driven_ports::UserWriter,
        task_write: &impl TaskWriter,
    ) -> Result<i64, CreateUserError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("Starting user creation")?;

        let user_exists = u_detect
            .user_with_name_exists(username, &mut txn)
            .await
            .context("Looking up user during creation")?;
        if user_exists {
            return Err(CreateUserError::UserAlreadyExists);
        }

        let new_user_id = u_writer.create_user(username, &mut txn).await?;
        task_write
            .create_task_for_user(new_user_id, &todo::NewTask::starter(), &mut txn)
            .await
            .context("Creating the starter task for a new user")?;

        txn.commit().await.context("Saving the new user")?;

        Ok(new_user_id)
    }
}

#[cfg(test)]
mod find_user_by_name_tests {
    use super::*;
    use crate::domain::test_util::Connectivity;
    use crate::external_connections;
    use speculoos::prelude::*;
    use std::sync::RwLock;

    #[tokio::test]
    async fn finds_user() {
        let user_persist = test_util::InMemoryUserPersistence::new_with_users(&["evan", "jane"]);
        let locked_persist = RwLock::new(user_persist);
        let mut db_cxn = external_connections::test_util::FakeExternalConnectivity::new();

        let found_user = find_user_by_name("jane", &mut db_cxn, &locked_persist).await;
        assert_that!(found_user).is_ok().is_equal_to(TodoUser {
            id: 2,
            username: "jane".to_owned(),
        });
    }

    #[tokio::test]
    async fn errors_when_user_doesnt_exist() {
        let user_persist = test_util::InMemoryUserPersistence::new_locked();
        let mut db_cxn = external_connections::test_util::FakeExternalConnectivity::new();

        let found_user = find_user_by_name("nobody", &mut db_cxn, &user_persist).await;
        assert_that!(found_user).is_err().matches(|inner_err| {
            matches!(inner_err, UserExistsErr::UserDoesNotExist(name) if name == "nobody")
        });
    }

    #[tokio::test]
    async fn propagates_port_error() {
        let mut user_persistence = test_util::InMemoryUserPersistence::new();
        user_persistence.connectivity = Connectivity::Disconnected;
        let user_persist = RwLock::new(user_persistence);
        let mut db_cxn = external_connections::test_util::FakeExternalConnectivity::new();

        let found_user = find_user_by_name("evan", &mut db_cxn, &user_persist).await;
        assert_that!(found_user)
            .is_err()
            .matches(|inner_err| matches!(inner_err, UserExistsErr::PortError(_)));
    }
}
