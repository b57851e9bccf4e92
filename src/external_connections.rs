use sqlx::AnyConnection;

/// Something that can hand out a live database connection
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut AnyConnection;
}

/// Abstracts the systems the service talks to so driven adapters can be swapped out
/// for fakes in tests
pub trait ExternalConnectivity: Send {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// An [ExternalConnectivity] which can open a transaction. Everything done through the
/// returned handle is discarded unless [TransactionHandle::commit] is called.
pub trait Transactable: ExternalConnectivity {
    type Handle: ExternalConnectivity + TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}
