use crate::domain;
use crate::domain::todo::{NewTask, TodoTask};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query, query_as};

pub struct DbTaskReader;

#[derive(FromRow)]
struct TodoItemRow {
    id: i64,
    user_id: i64,
    label: String,
    done: i64,
}

impl From<TodoItemRow> for domain::todo::TodoTask {
    fn from(value: TodoItemRow) -> Self {
        TodoTask {
            id: value.id,
            owner_user_id: value.user_id,
            label: value.label,
            done: value.done != 0,
        }
    }
}

impl domain::todo::driven_ports::TaskReader for DbTaskReader {
    async fn tasks_for_user(
        &self,
        user_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoTask>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        // sqlite hands booleans back as integers, so both backends read `done` as one
        let todo_items: Vec<TodoTask> = query_as::<_, TodoItemRow>(
            "SELECT ti.id, ti.user_id, ti.label, CAST(ti.done AS INTEGER) AS done
            FROM todo_item ti WHERE ti.user_id = $1 ORDER BY ti.id",
        )
        .bind(user_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch todo items for a user")?
        .into_iter()
        .map(domain::todo::TodoTask::from)
        .collect();

        Ok(todo_items)
    }
}

pub struct DbTaskWriter;

impl domain::todo::driven_ports::TaskWriter for DbTaskWriter {
    async fn create_task_for_user(
        &self,
        user_id: i64,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i64, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO todo_item(user_id, label, done) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(new_task.label.as_str())
        .bind(new_task.done)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new task into the database")?;

        Ok(new_id.id)
    }

    async fn delete_tasks_for_user(
        &self,
        user_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let delete_result = query("DELETE FROM todo_item WHERE user_id = $1")
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a user's tasks from the database")?;

        Ok(delete_result.rows_affected())
    }
}
