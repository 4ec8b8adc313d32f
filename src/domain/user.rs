use crate::domain::auth;
use crate::domain::user::driven_ports::{DetectUser, UserReader, UserWriter};
use crate::domain::user::driving_ports::{AuthenticateError, CreateUserError};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;

/// The public projection of a user account. This is the only user shape that
/// ever leaves the domain, so password material cannot leak into a response
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoUser {
    pub id: i32,
    pub email: String,
}

/// Data required to register a new user. The password is plaintext here and
/// is hashed before it reaches a driven port
#[cfg_attr(test, derive(Clone, Debug))]
pub struct CreateUser {
    pub email: String,
    pub password: String,
}

/// A stored user's credential record, read back for login verification only
#[cfg_attr(test, derive(Clone, Debug))]
pub struct UserCredentials {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    pub trait UserReader: Sync {
        async fn get_by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<UserCredentials>, anyhow::Error>;
    }

    pub trait UserWriter: Sync {
        async fn create_user(
            &self,
            email: &str,
            password_hash: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;
    }

    pub trait DetectUser: Sync {
        async fn user_with_email_exists(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::external_connections::{ExternalConnectivity, Transactable};
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        #[error("A user with that email already exists.")]
        EmailInUse,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum AuthenticateError {
        #[error("The provided credentials did not match.")]
        BadCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        async fn create_user(
            &self,
            new_user: &CreateUser,
            ext_cxn: &mut (impl ExternalConnectivity + Transactable),
            u_detect: &impl driven_ports::DetectUser,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<TodoUser, CreateUserError>;

        async fn authenticate(
            &self,
            email: &str,
            password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<TodoUser, AuthenticateError>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn create_user(
        &self,
        new_user: &CreateUser,
        ext_cxn: &mut (impl ExternalConnectivity + Transactable),
        u_detect: &impl DetectUser,
        u_writer: &impl UserWriter,
    ) -> Result<TodoUser, CreateUserError> {
        // Hash before opening the transaction so the connection isn't held
        // across the expensive part
        let password_hash = auth::hash_password(&new_user.password)
            .await
            .context("hashing a new user's password")?;

        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting user creation transaction")?;

        let email_taken = u_detect
            .user_with_email_exists(&new_user.email, &mut txn)
            .await
            .context("looking up email during user creation")?;
        if email_taken {
            // Dropping the transaction rolls it back
            return Err(CreateUserError::EmailInUse);
        }

        let created_id = u_writer
            .create_user(&new_user.email, &password_hash, &mut txn)
            .await
            .context("persisting a new user")?;
        txn.commit()
            .await
            .context("committing user creation transaction")?;

        Ok(TodoUser {
            id: created_id,
            email: new_user.email.clone(),
        })
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl UserReader,
    ) -> Result<TodoUser, AuthenticateError> {
        let stored_credentials = u_reader
            .get_by_email(email, &mut *ext_cxn)
            .await
            .context("looking up user during login")?;

        // Unknown email and wrong password produce the same generic failure so
        // a caller can't probe which field was wrong
        let Some(stored_credentials) = stored_credentials else {
            return Err(AuthenticateError::BadCredentials);
        };

        let password_matches = auth::verify_password(password, &stored_credentials.password_hash)
            .await
            .context("verifying a login password")?;
        if !password_matches {
            return Err(AuthenticateError::BadCredentials);
        }

        Ok(TodoUser {
            id: stored_credentials.id,
            email: stored_credentials.email,
        })
    }
}
