//! SQLite document store implementation.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use uuid::Uuid;

use crate::{
    ChangeFeed, ChangeKind, Collection, Condition, Document, DocumentStore, DocumentStoreError,
    Fields, Filter, StoreResult, Subscription,
};

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";

const COURSE_INDEX_SQL: &str = "CREATE INDEX IF NOT EXISTS documents_course_id
    ON documents (collection, json_extract(body, '$.courseId'))";

/// Document store persisted in a single SQLite table.
///
/// Bodies are stored as JSON text. Filter conditions are translated to
/// `json_extract` predicates, and the returned rows are checked against the
/// filter again, so results match [`crate::MemoryDocumentStore`] exactly.
#[derive(Debug)]
pub struct SqliteDocumentStore {
    pool: Pool<Sqlite>,
    feed: ChangeFeed,
}

impl SqliteDocumentStore {
    /// Connects to a SQLite database URL and creates the schema.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        // Every connection to `sqlite::memory:` is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: Pool<Sqlite>) -> StoreResult<Self> {
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;
        sqlx::query(COURSE_INDEX_SQL).execute(&pool).await?;
        tracing::debug!("Document schema ready");
        Ok(Self {
            pool,
            feed: ChangeFeed::new(),
        })
    }
}

/// A bound parameter of a `find` query.
enum SqlArg {
    Text(String),
    Int(i64),
    Real(f64),
}

impl SqlArg {
    /// Converts a scalar JSON value; null, arrays and objects have no SQL form.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Real)),
            // json_extract yields 1 and 0 for booleans
            Value::Bool(b) => Some(Self::Int(i64::from(*b))),
            _ => None,
        }
    }
}

/// Only plain field names are inlined into a JSON path.
fn is_plain_field(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Builds the `find` query. Conditions that cannot be expressed in SQL are
/// left out and only evaluated in Rust.
fn find_query(filter: &Filter) -> (String, Vec<SqlArg>) {
    let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
    let mut args = Vec::new();

    for condition in filter.conditions() {
        let (field, op, value) = match condition {
            Condition::Eq(field, value) => (field, "=", Some(value)),
            Condition::Gte(field, value) => (field, ">=", Some(value)),
            Condition::Lt(field, value) => (field, "<", Some(value)),
            Condition::Lte(field, value) => (field, "<=", Some(value)),
            Condition::Missing(field) => (field, "IS NULL", None),
        };
        if !is_plain_field(field) {
            continue;
        }
        let path = format!("json_extract(body, '$.{}')", field);
        match value {
            None => sql.push_str(&format!(" AND {} {}", path, op)),
            Some(value) => {
                let Some(arg) = SqlArg::from_json(value) else {
                    continue;
                };
                sql.push_str(&format!(" AND {} {} ?", path, op));
                args.push(arg);
            }
        }
    }

    sql.push_str(" ORDER BY id");
    (sql, args)
}

fn parse_body(id: &str, body: &str) -> StoreResult<Document> {
    match serde_json::from_str(body)? {
        Value::Object(fields) => Ok(Document::new(id, fields)),
        _ => Err(DocumentStoreError::InvalidDocument(format!(
            "body of {} is not an object",
            id
        ))),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        let (sql, args) = find_query(filter);
        let mut query = sqlx::query_as::<_, (String, String)>(&sql).bind(collection.as_str());
        for arg in args {
            query = match arg {
                SqlArg::Text(s) => query.bind(s),
                SqlArg::Int(i) => query.bind(i),
                SqlArg::Real(f) => query.bind(f),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut docs = Vec::new();
        for (id, body) in rows {
            let doc = parse_body(&id, &body)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        body.map(|body| parse_body(id, &body)).transpose()
    }

    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        self.insert(collection, &id, fields).await?;
        Ok(id)
    }

    async fn insert(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        let doc = Document::new(id, fields);
        let body = serde_json::to_string(&doc.fields)?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection.as_str())
            .bind(id)
            .bind(&body)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DocumentStoreError::already_exists(collection, id)
                } else {
                    DocumentStoreError::Database(e)
                }
            })?;

        self.feed.publish(ChangeKind::Created, collection, doc);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let mut doc = match body {
            Some(body) => parse_body(id, &body)?,
            None => return Err(DocumentStoreError::not_found(collection, id)),
        };
        for (key, value) in fields {
            if key != "id" {
                doc.fields.insert(key, value);
            }
        }

        sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(serde_json::to_string(&doc.fields)?)
            .bind(collection.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.feed.publish(ChangeKind::Updated, collection, doc);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let body: Option<String> =
            sqlx::query_scalar("DELETE FROM documents WHERE collection = ? AND id = ? RETURNING body")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(body) = body else {
            return Err(DocumentStoreError::not_found(collection, id));
        };

        self.feed
            .publish(ChangeKind::Deleted, collection, parse_body(id, &body)?);
        Ok(())
    }

    fn subscribe(&self, collection: Collection, filter: Filter) -> Subscription {
        self.feed.subscribe(collection, filter)
    }
}
