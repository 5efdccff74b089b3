#[cfg(test)]
use sea_query::Order;
use sea_query::{Asterisk, Expr, Iden, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::{SqliteConnection, SqlitePool};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use super::StoreError;
use crate::{
    ebs_fields::{EbsService, GenericEbsResponseFields},
    masking,
};

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub service: EbsService,
    pub fields: GenericEbsResponseFields,
    pub created_at: OffsetDateTime,
}

impl Transaction {
    pub fn record(service: EbsService, response: &GenericEbsResponseFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            service,
            fields: masking::masked(response),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[allow(dead_code)]
#[cfg(test)]
#[derive(sqlx::FromRow, Debug)]
pub struct TransactionRow {
    pub id: String,
    pub service_name: String,
    pub response_code: i32,
    pub response_message: String,
    pub response_status: String,
    pub reference_number: String,
    pub approval_code: String,
    pub terminal_id: String,
    pub system_trace_audit_number: i64,
    pub client_id: String,
    pub pan: String,
    pub tran_amount: Option<String>,
    pub tran_currency_code: String,
    pub tran_date_time: String,
    pub payload: String,
    pub created_at: String,
}

pub async fn insert(tx: &Transaction, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let fields = &tx.fields;
    let (query, values) = Query::insert()
        .into_table(Transactions::Table)
        .columns([
            Transactions::Id,
            Transactions::ServiceName,
            Transactions::ResponseCode,
            Transactions::ResponseMessage,
            Transactions::ResponseStatus,
            Transactions::ReferenceNumber,
            Transactions::ApprovalCode,
            Transactions::TerminalId,
            Transactions::SystemTraceAuditNumber,
            Transactions::ClientId,
            Transactions::Pan,
            Transactions::TranAmount,
            Transactions::TranCurrencyCode,
            Transactions::TranDateTime,
            Transactions::Payload,
            Transactions::CreatedAt,
        ])
        .values([
            tx.id.to_string().into(),
            tx.service.transaction_name().into(),
            fields.response_code.into(),
            fields.response_message.clone().into(),
            fields.response_status.clone().into(),
            fields.reference_number.clone().into(),
            fields.approval_code.clone().into(),
            fields.terminal_id.clone().into(),
            fields.system_trace_audit_number.into(),
            fields.client_id.clone().into(),
            fields.pan.clone().into(),
            fields.tran_amount.map(|amount| amount.to_string()).into(),
            fields.tran_currency_code.clone().into(),
            fields.tran_date_time.clone().into(),
            serde_json::to_string(fields)?.into(),
            tx.created_at.format(&Rfc3339)?.into(),
        ])?
        .build_sqlx(SqliteQueryBuilder);

    sqlx::query_with(&query, values).execute(&mut *conn).await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, StoreError> {
    let (query, values) = Query::select()
        .expr(Expr::col(Asterisk).count())
        .from(Transactions::Table)
        .build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_scalar_with::<_, i64, _>(&query, values)
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
pub async fn count_by_service(pool: &SqlitePool, service: EbsService) -> Result<i64, StoreError> {
    let (query, values) = Query::select()
        .expr(Expr::col(Asterisk).count())
        .from(Transactions::Table)
        .and_where(Expr::col(Transactions::ServiceName).eq(service.transaction_name()))
        .build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_scalar_with::<_, i64, _>(&query, values)
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
pub async fn recent(pool: &SqlitePool, limit: u64) -> Result<Vec<TransactionRow>, StoreError> {
    let (query, values) = Query::select()
        .column(Asterisk)
        .from(Transactions::Table)
        .order_by(Transactions::CreatedAt, Order::Desc)
        .limit(limit)
        .build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, TransactionRow, _>(&query, values)
        .fetch_all(pool)
        .await?)
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ServiceName,
    ResponseCode,
    ResponseMessage,
    ResponseStatus,
    ReferenceNumber,
    ApprovalCode,
    TerminalId,
    SystemTraceAuditNumber,
    ClientId,
    Pan,
    TranAmount,
    TranCurrencyCode,
    TranDateTime,
    Payload,
    CreatedAt,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory_pool;

    fn purchase_reply() -> GenericEbsResponseFields {
        GenericEbsResponseFields {
            response_message: "Approval".into(),
            response_status: "Successful".into(),
            terminal_id: "18000377".into(),
            system_trace_audit_number: 12,
            client_id: "noebs".into(),
            pan: "9222081700176714465".into(),
            tran_amount: Some(Decimal::new(1050, 1)),
            tran_currency_code: "SDG".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn inserted_rows_are_masked_and_counted_per_service() {
        let pool = memory_pool().await;
        let reply = purchase_reply();

        let mut conn = pool.acquire().await.unwrap();
        insert(&Transaction::record(EbsService::Purchase, &reply), &mut conn)
            .await
            .unwrap();
        insert(&Transaction::record(EbsService::IsAlive, &Default::default()), &mut conn)
            .await
            .unwrap();
        drop(conn);

        assert_eq!(count(&pool).await.unwrap(), 2);
        assert_eq!(count_by_service(&pool, EbsService::Purchase).await.unwrap(), 1);
        assert_eq!(count_by_service(&pool, EbsService::CashIn).await.unwrap(), 0);

        let rows = recent(&pool, 10).await.unwrap();
        let row = rows
            .iter()
            .find(|row| row.service_name == "PurchaseTransaction")
            .unwrap();
        assert_eq!(row.pan, "922208*********4465");
        assert_eq!(row.tran_amount.as_deref(), Some("105.0"));
        assert!(!row.payload.contains("9222081700176714465"));
        assert!(row.payload.contains("922208*********4465"));
    }

    #[test]
    fn record_never_keeps_the_clear_pan() {
        let reply = purchase_reply();
        let tx = Transaction::record(EbsService::Purchase, &reply);
        assert_eq!(tx.fields.pan, "922208*********4465");
        assert_eq!(reply.pan, "9222081700176714465");
    }
}
