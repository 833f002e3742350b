//! Explicit all-or-nothing scope shared by several repository writes.
//!
//! Operations that accept `Option<&UnitOfWork>` run every write through the
//! transaction when one is given and on the pooled connection otherwise.
//! Only the caller that began the unit decides commit or rollback; dropping
//! an uncommitted unit rolls it back.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;

use crate::infrastructure::persistence::error::DbError;

pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Begin a new unit on the given connection
    pub async fn begin(conn: &DatabaseConnection) -> Result<Self, DbError> {
        let txn = conn.begin().await?;
        Ok(Self { txn })
    }

    /// Transaction the participating writes go through
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub async fn commit(self) -> Result<(), DbError> {
        self.txn.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.txn.rollback().await?;
        Ok(())
    }

    /// Roll back after a failed flow; the flow's own error is the one reported
    pub async fn abandon(self) {
        if let Err(e) = self.rollback().await {
            warn!("Rollback failed: {}", e);
        }
    }
}

/// Runs `$body` with `$c` bound to the unit's transaction if one is given,
/// else to `$conn`.
macro_rules! with_scope {
    ($conn:expr, $scope:expr, |$c:ident| $body:expr) => {
        match $scope {
            Some(unit) => {
                let $c = unit.transaction();
                $body
            }
            None => {
                let $c = $conn;
                $body
            }
        }
    };
}

pub(crate) use with_scope;
