use sqlx::PgConnection;

/// A handle to an active database connection which can be borrowed to run queries
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Provides access to external systems the application depends on. Driven adapters
/// accept an implementation of this trait so business logic stays agnostic of where
/// the data actually lives
pub trait ExternalConnectivity: Sync {
    type Handle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::Handle<'_>, anyhow::Error>;
}

/// Implemented by connectivity providers which can open a database transaction
pub trait Transactable: Sync {
    type Handle: ExternalConnectivity + TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// A set of connections where the database connection has an active transaction.
/// Dropping the handle without calling [commit](TransactionHandle::commit) rolls
/// the transaction back
pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}
