use sqlx::SqlitePool;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot,
    },
    task::JoinHandle,
};

use crate::db::{transactions, transactions::Transaction, StoreError};

pub const QUEUE_CAPACITY: usize = 1024;

enum AuditCommand {
    Write(Transaction),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct AuditWriter {
    queue: mpsc::Sender<AuditCommand>,
}

impl AuditWriter {
    pub fn spawn(pool: SqlitePool) -> (Self, JoinHandle<()>) {
        let (queue, commands) = mpsc::channel(QUEUE_CAPACITY);
        let task = tokio::spawn(run(pool, commands));
        (Self { queue }, task)
    }

    pub fn submit(&self, transaction: Transaction) {
        let service = transaction.service;
        match self.queue.try_send(AuditCommand::Write(transaction)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::error!(
                    %service,
                    capacity = QUEUE_CAPACITY,
                    "audit queue full, transaction record dropped"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!(%service, "audit writer stopped, transaction record dropped");
            }
        }
    }

    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.queue.send(AuditCommand::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

async fn run(pool: SqlitePool, mut commands: mpsc::Receiver<AuditCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            AuditCommand::Write(transaction) => {
                if let Err(err) = write(&pool, &transaction).await {
                    tracing::warn!(
                        service = %transaction.service,
                        transaction_id = %transaction.id,
                        error = %err,
                        "problem in transaction table committing"
                    );
                }
            }
            AuditCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("audit writer drained");
}

async fn write(pool: &SqlitePool, transaction: &Transaction) -> Result<(), StoreError> {
    let mut conn = pool.acquire().await?;
    transactions::insert(transaction, &mut conn).await
}
