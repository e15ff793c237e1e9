use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{
    models::{Todo, TodoId},
    repository::{StoreResult, TodoStore},
};

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id SERIAL PRIMARY KEY,
    text TEXT NOT NULL,
    completed BOOLEAN DEFAULT FALSE
)";

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}
impl Db {
    /// Opens the pool and checks that the server answers before returning.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let db = Self { pool };
        if let Err(err) = db.ping().await {
            db.close().await;
            return Err(err);
        }
        Ok(db)
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl TodoStore for Db {
    async fn list(&self) -> StoreResult<Vec<Todo>> {
        let todos =
            sqlx::query_as::<_, Todo>("SELECT id, text, completed FROM todos ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(todos)
    }

    async fn get(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>("SELECT id, text, completed FROM todos WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn create(&self, text: &str) -> StoreResult<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (text, completed) VALUES ($1, $2) RETURNING id, text, completed",
        )
        .bind(text)
        .bind(false)
        .fetch_one(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update_text(&self, id: TodoId, text: &str) -> StoreResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET text = $1 WHERE id = $2 RETURNING id, text, completed",
        )
        .bind(text)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn toggle(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET completed = NOT completed WHERE id = $1 RETURNING id, text, completed",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Required Debug implementation for `Db`
impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

// Tests against a real server; run with
// `DATABASE_URL=postgres://... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    async fn setup() -> Result<Db> {
        let url = std::env::var("DATABASE_URL")?;
        let db = Db::connect(&url, 2).await?;
        db.ensure_schema().await?;
        Ok(db)
    }

    fn id(todo: &Todo) -> TodoId {
        todo.id.to_string().parse().unwrap()
    }

    #[tokio::test]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn test_ensure_schema_is_idempotent() -> Result<()> {
        let db = setup().await?;
        db.ensure_schema().await?;
        db.close().await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn test_create_and_get() -> Result<()> {
        let db = setup().await?;
        let created = db.create("buy milk").await?;
        assert_eq!(created.text, "buy milk");
        assert!(!created.completed);

        let fetched = db.get(id(&created)).await?;
        assert_eq!(fetched, Some(created.clone()));
        db.delete(id(&created)).await?;
        db.close().await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn test_ids_increase() -> Result<()> {
        let db = setup().await?;
        let first = db.create("first").await?;
        let second = db.create("second").await?;
        assert!(second.id > first.id);

        let listed = db.list().await?;
        let ids: Vec<i32> = listed.iter().map(|todo| todo.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);

        db.delete(id(&first)).await?;
        db.delete(id(&second)).await?;
        db.close().await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn test_update_text_keeps_completed() -> Result<()> {
        let db = setup().await?;
        let created = db.create("draft").await?;
        db.toggle(id(&created)).await?;
        let updated = db.update_text(id(&created), "final").await?.unwrap();
        assert_eq!(updated.text, "final");
        assert!(updated.completed);
        db.delete(id(&created)).await?;
        db.close().await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn test_concurrent_toggles() -> Result<()> {
        let db = setup().await?;
        let created = db.create("flip").await?;
        let todo_id = id(&created);

        let handles: Vec<_> = (0..7)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.toggle(todo_id).await })
            })
            .collect();
        for handle in handles {
            handle.await??;
        }

        let after = db.get(todo_id).await?.unwrap();
        assert!(after.completed);
        db.delete(todo_id).await?;
        db.close().await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn test_delete_twice() -> Result<()> {
        let db = setup().await?;
        let created = db.create("gone").await?;
        assert!(db.delete(id(&created)).await?);
        assert!(!db.delete(id(&created)).await?);
        assert!(db.get(id(&created)).await?.is_none());
        assert!(db.toggle(id(&created)).await?.is_none());
        db.close().await;
        Ok(())
    }
}
