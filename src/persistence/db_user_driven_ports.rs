use super::NewId;
use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::user::TodoUser;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error, anyhow};
use sqlx::{FromRow, query_as};

pub struct DbDetectUser;

/// Utility DTO for consuming the output of `count()`
#[derive(FromRow)]
struct Count {
    count: i64,
}

impl domain::user::driven_ports::DetectUser for DbDetectUser {
    async fn user_with_name_exists(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut connection = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user_with_name_count = query_as::<_, Count>(
            "SELECT count(*) AS count FROM todo_user tu WHERE tu.username = $1",
        )
        .bind(username)
        .fetch_one(connection.borrow_connection())
        .await
        .context("Detecting user via name")?;

        Ok(user_with_name_count.count > 0)
    }
}

pub struct DbReadUsers;

#[derive(FromRow)]
struct TodoUserRow {
    id: i64,
    username: String,
}

impl From<TodoUserRow> for TodoUser {
    fn from(value: TodoUserRow) -> Self {
        TodoUser {
            id: value.id,
            username: value.username,
        }
    }
}

impl domain::user::driven_ports::UserReader for DbReadUsers {
    async fn get_all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<TodoUser>, Error> {
        let mut connection = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let users: Vec<TodoUser> =
            query_as::<_, TodoUserRow>("SELECT tu.id, tu.username FROM todo_user tu ORDER BY tu.id")
                .fetch_all(connection.borrow_connection())
                .await
                .context("Fetching all users")?
                .into_iter()
                .map(TodoUser::from)
                .collect();

        Ok(users)
    }

    async fn get_by_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoUser>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user = query_as::<_, TodoUserRow>(
            "SELECT tu.id, tu.username FROM todo_user tu WHERE tu.username = $1",
        )
        .bind(username)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by username")?;

        Ok(user.map(TodoUser::from))
    }
}

pub struct DbWriteUsers;

impl domain::user::driven_ports::UserWriter for DbWriteUsers {
    async fn create_user(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i64, DrivenPortError> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let insert_result = query_as::<_, NewId>(
            "INSERT INTO todo_user(username) VALUES ($1) RETURNING id",
        )
        .bind(username)
        .fetch_one(cxn_handle.borrow_connection())
        .await;

        match insert_result {
            Ok(new_user) => Ok(new_user.id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DrivenPortError::Conflict)
            }
            Err(other) => Err(DrivenPortError::CommsFailure(
                anyhow!(other).context("Inserting new user"),
            )),
        }
    }
}
