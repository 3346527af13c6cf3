use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use tracker_core::model::{Topic, TopicPatch, TopicPosition};

use super::SqliteRepository;
use super::mapping::{conn, map_topic_row, position_to_i64, topic_to_document};
use crate::repository::{ProgressRepository, StorageError};

async fn insert_topics(
    tx: &mut Transaction<'_, Sqlite>,
    topics: &[Topic],
) -> Result<(), StorageError> {
    for topic in topics {
        sqlx::query(
            r"
            INSERT INTO topics (position, document)
            VALUES (?1, ?2)
            ",
        )
        .bind(position_to_i64(topic.position()))
        .bind(topic_to_document(topic)?)
        .execute(&mut **tx)
        .await
        .map_err(conn)?;
    }
    Ok(())
}

async fn select_all<'e, E>(executor: E) -> Result<Vec<Topic>, StorageError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r"
        SELECT position, document
        FROM topics
        ORDER BY position ASC
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(conn)?;

    let mut topics = Vec::with_capacity(rows.len());
    for row in rows {
        topics.push(map_topic_row(&row)?);
    }
    Ok(topics)
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        select_all(&self.pool).await
    }

    async fn seed_if_empty(&self, seed: &[Topic]) -> Result<Vec<Topic>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let existing = select_all(&mut *tx).await?;
        if !existing.is_empty() {
            tx.commit().await.map_err(conn)?;
            return Ok(existing);
        }

        insert_topics(&mut tx, seed).await?;
        let seeded = select_all(&mut *tx).await?;
        tx.commit().await.map_err(conn)?;
        tracing::info!(topics = seeded.len(), "seeded empty progress store");
        Ok(seeded)
    }

    async fn patch_topic(
        &self,
        position: TopicPosition,
        patch: &TopicPatch,
    ) -> Result<Topic, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let row = sqlx::query(
            r"
            SELECT position, document
            FROM topics WHERE position = ?1
            ",
        )
        .bind(position_to_i64(position))
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Err(StorageError::NotFound);
        };
        let current = map_topic_row(&row)?;
        let updated = current
            .apply_patch(patch)
            .map_err(|_| StorageError::NotFound)?;

        sqlx::query(
            r"
            UPDATE topics SET document = ?2
            WHERE position = ?1
            ",
        )
        .bind(position_to_i64(position))
        .bind(topic_to_document(&updated)?)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(updated)
    }

    async fn replace_all(&self, topics: &[Topic]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM topics")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        insert_topics(&mut tx, topics).await?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM topics")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
