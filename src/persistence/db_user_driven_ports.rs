use super::Count;
use crate::domain;
use crate::domain::user::UserCredentials;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query_as};

pub struct DbDetectUser {}

impl domain::user::driven_ports::DetectUser for DbDetectUser {
    async fn user_with_email_exists(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut connection = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user_with_email_count =
            query_as::<_, Count>("SELECT count(*) FROM todo_user tu WHERE tu.email = $1")
                .bind(email)
                .fetch_one(connection.borrow_connection())
                .await
                .context("Detecting user via email")?;

        Ok(user_with_email_count.count() > 0)
    }
}

pub struct DbReadUsers {}

#[derive(FromRow)]
struct UserCredentialsRow {
    id: i32,
    email: String,
    password_hash: String,
}

impl From<UserCredentialsRow> for UserCredentials {
    fn from(value: UserCredentialsRow) -> Self {
        UserCredentials {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
        }
    }
}

impl domain::user::driven_ports::UserReader for DbReadUsers {
    async fn get_by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<UserCredentials>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user = query_as::<_, UserCredentialsRow>(
            "SELECT tu.id, tu.email, tu.password_hash FROM todo_user tu WHERE tu.email = $1",
        )
        .bind(email)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by email")?;

        Ok(user.map(UserCredentials::from))
    }
}

pub struct DbWriteUsers {}

impl domain::user::driven_ports::UserWriter for DbWriteUsers {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let created_user = query_as::<_, super::NewId>(
            "INSERT INTO todo_user(email, password_hash) VALUES ($1, $2) RETURNING todo_user.id",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .context("Inserting new user")?;

        Ok(created_user.id)
    }
}
