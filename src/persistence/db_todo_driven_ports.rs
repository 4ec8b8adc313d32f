use crate::domain;
use crate::domain::todo::{NewTodo, TodoFilter, TodoItem, UpdateTodo};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, Postgres, QueryBuilder, query, query_as};

pub struct DbTodoReader;

#[derive(FromRow)]
struct TodoItemRow {
    id: i32,
    description: String,
    completed: bool,
}

impl From<TodoItemRow> for TodoItem {
    fn from(value: TodoItemRow) -> Self {
        TodoItem {
            id: value.id,
            description: value.description,
            completed: value.completed,
        }
    }
}

/// Escapes LIKE metacharacters so a search fragment matches literally
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for character in fragment.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn find_all(
        &self,
        filter: &TodoFilter,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT ti.id, ti.description, ti.completed FROM todo_item ti",
        );
        if filter.completed.is_some() || filter.description_contains.is_some() {
            select.push(" WHERE ");
            let mut predicates = select.separated(" AND ");
            if let Some(completed) = filter.completed {
                predicates
                    .push("ti.completed = ")
                    .push_bind_unseparated(completed);
            }
            if let Some(ref fragment) = filter.description_contains {
                predicates
                    .push("ti.description ILIKE ")
                    .push_bind_unseparated(format!("%{}%", escape_like(fragment)))
                    .push_unseparated(" ESCAPE '\\'");
            }
        }
        select.push(" ORDER BY ti.id");

        let todo_items: Vec<TodoItem> = select
            .build_query_as::<TodoItemRow>()
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch matching todo items")?
            .into_iter()
            .map(TodoItem::from)
            .collect();

        Ok(todo_items)
    }

    async fn find_by_id(
        &self,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let todo_item = query_as::<_, TodoItemRow>(
            "SELECT ti.id, ti.description, ti.completed FROM todo_item ti WHERE ti.id = $1",
        )
        .bind(todo_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo item by ID")?
        .map(TodoItem::from);

        Ok(todo_item)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<TodoItem, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let created_row = query_as::<_, TodoItemRow>(
            "INSERT INTO todo_item(description, completed) VALUES ($1, $2) \
             RETURNING todo_item.id, todo_item.description, todo_item.completed",
        )
        .bind(&new_todo.description)
        .bind(new_todo.completed)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo item into the database")?;

        Ok(created_row.into())
    }

    async fn update(
        &self,
        todo_id: i32,
        update: &UpdateTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<TodoItem, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        // Callers verify the record exists and that the update isn't empty
        let mut update_query = QueryBuilder::<Postgres>::new("UPDATE todo_item SET ");
        {
            let mut assignments = update_query.separated(", ");
            if let Some(ref new_description) = update.description {
                assignments
                    .push("description = ")
                    .push_bind_unseparated(new_description.clone());
            }
            if let Some(new_completed) = update.completed {
                assignments
                    .push("completed = ")
                    .push_bind_unseparated(new_completed);
            }
        }
        update_query
            .push(" WHERE id = ")
            .push_bind(todo_id)
            .push(" RETURNING todo_item.id, todo_item.description, todo_item.completed");

        let updated_row = update_query
            .build_query_as::<TodoItemRow>()
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to update a todo item in the database")?;

        Ok(updated_row.into())
    }

    async fn delete(
        &self,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let delete_result = query("DELETE FROM todo_item WHERE id = $1")
            .bind(todo_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo item from the database")?;

        Ok(delete_result.rows_affected())
    }
}
