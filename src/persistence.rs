pub mod db_todo_driven_ports;
pub mod db_user_driven_ports;

use crate::db::Backend;
use crate::external_connections;
use crate::external_connections::ConnectionHandle;
use anyhow::{Context, anyhow};
use sqlx::pool::PoolConnection;
use sqlx::{Acquire, Any, AnyConnection, AnyPool, Transaction};
use std::fmt::{Debug, Display};

/// Data structure which owns clients for connecting to external systems.
/// Allows business logic to be agnostic of the external systems it communicates with
/// so driven adapters can easily be swapped out for other implementations
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: AnyPool,
    backend: Backend,
}

impl ExternalConnectivity {
    /// Accepts the database pool and the backend it talks to, and constructs an instance of
    /// ExternalConnectivity owning it
    pub fn new(db: AnyPool, backend: Backend) -> Self {
        ExternalConnectivity { db, backend }
    }
}

/// A handle from ExternalConnectivity which can connect to a database
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Any>,
}

impl ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut AnyConnection {
        &mut self.active_connection
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow> = PoolConnectionHandle;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error> {
        let handle = PoolConnectionHandle {
            active_connection: self
                .db
                .acquire()
                .await
                .context("acquiring connection from db pool")?,
        };

        Ok(handle)
    }
}

impl external_connections::Transactable for ExternalConnectivity {
    type Handle = ExternalConnectionsInTransaction;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error> {
        // Transactions here always write, so sqlite takes its write lock at BEGIN and
        // concurrent writers queue on the busy timeout
        let transaction = match self.backend {
            Backend::Sqlite => self.db.begin_with("BEGIN IMMEDIATE").await,
            Backend::Postgres => self.db.begin().await,
        }
        .context("Starting transaction from db pool")?;

        Ok(ExternalConnectionsInTransaction { txn: transaction })
    }
}

/// A variant of ExternalConnectivity where the database client has an active database transaction
/// which can later be committed. Dropping it without committing rolls the transaction back.
pub struct ExternalConnectionsInTransaction {
    txn: Transaction<'static, Any>,
}

/// A handle from ExternalConnectionsInTransaction which can connect to a database
pub struct TransactionHandle<'tx> {
    active_transaction: &'tx mut AnyConnection,
}

impl external_connections::ExternalConnectivity for ExternalConnectionsInTransaction {
    type DbHandle<'tx_borrow>
        = TransactionHandle<'tx_borrow>
    where
        Self: 'tx_borrow;

    async fn database_cxn(&mut self) -> Result<TransactionHandle<'_>, anyhow::Error> {
        let handle = self
            .txn
            .acquire()
            .await
            .context("acquiring connection from database transaction")?;

        Ok(TransactionHandle {
            active_transaction: handle,
        })
    }
}

impl ConnectionHandle for TransactionHandle<'_> {
    fn borrow_connection(&mut self) -> &mut AnyConnection {
        &mut *self.active_transaction
    }
}

impl external_connections::TransactionHandle for ExternalConnectionsInTransaction {
    async fn commit(self) -> Result<(), anyhow::Error> {
        self.txn
            .commit()
            .await
            .context("Committing database transaction")?;

        Ok(())
    }
}

/// Utility DTO for retrieving the ID of a newly inserted record
#[derive(sqlx::FromRow)]
struct NewId {
    id: i64,
}

/// Converts anything implementing Debug and Display into an [anyhow::Error]
fn anyhowify<T: Debug + Display>(errorish: T) -> anyhow::Error {
    anyhow!(format!("{}", errorish))
}
