use std::marker::PhantomData;

use sea_orm::{DbConn, DbErr, EntityTrait, PrimaryKeyTrait};

use quill_core::error::RepoError;

/// Generic SQL repository handle; the entity repositories are type
/// aliases over this.
pub struct SqlRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> SqlRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

impl<E> SqlRepository<E>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i64>,
{
    /// Look up a row by id and convert it into the domain type.
    pub(crate) async fn fetch<T>(&self, id: i64) -> Result<Option<T>, RepoError>
    where
        T: From<E::Model>,
    {
        let result = E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

/// Classify a write failure. Unique-index violations become
/// `Constraint`; a foreign-key violation means the referenced row is
/// gone and becomes `NotFound`. The string matching covers both the
/// SQLite and PostgreSQL wordings.
pub(crate) fn map_write_err(e: DbErr) -> RepoError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();

    if lower.contains("unique") || lower.contains("duplicate") {
        RepoError::Constraint(msg)
    } else if lower.contains("foreign key") {
        RepoError::NotFound
    } else {
        RepoError::Query(msg)
    }
}
