use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::is_unique_violation;
use crate::db::models::{Item, Store, Tag};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("store not found")]
    StoreNotFound,

    #[error("item not found")]
    ItemNotFound,

    #[error("tag not found")]
    TagNotFound,

    #[error("a store with that name already exists")]
    StoreNameTaken,

    #[error("a tag with that name already exists in that store")]
    TagNameTaken,

    #[error("item and tag belong to different stores")]
    StoreMismatch,

    #[error("tag is still linked to one or more items")]
    TagInUse,

    #[error("name must not be empty")]
    EmptyName,

    #[error("price must not be negative")]
    NegativePrice,

    #[error("store_id is required when creating an item")]
    MissingStoreId,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store with its owned collections, as returned by the store endpoints.
#[derive(Debug, Serialize)]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    pub items: Vec<Item>,
    pub tags: Vec<Tag>,
}

/// Item together with its linked tags.
#[derive(Debug, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub tags: Vec<Tag>,
}

/// Tag together with the items currently linked to it.
#[derive(Debug, Serialize)]
pub struct TagDetail {
    #[serde(flatten)]
    pub tag: Tag,
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub store_id: i64,
}

/// Fields accepted by the upsert-by-client-key item write. `store_id` is
/// only consulted on the create arm.
#[derive(Debug, Deserialize)]
pub struct ItemUpsert {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub store_id: Option<i64>,
}

/// Catalog operations on stores, items and tags. Cross-entity invariants
/// (same-store linking, delete guards, scoped uniqueness) live here; plain
/// uniqueness is delegated to the schema's constraints.
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ----- stores -----

    pub async fn create_store(&self, name: &str) -> Result<Store, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let result = sqlx::query_as::<_, Store>(
            "INSERT INTO stores (name) VALUES (?1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(store) => Ok(store),
            Err(e) if is_unique_violation(&e) => Err(CatalogError::StoreNameTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_store(&self, store_id: i64) -> Result<StoreDetail, CatalogError> {
        let store = self
            .store_row(store_id)
            .await?
            .ok_or(CatalogError::StoreNotFound)?;
        self.store_detail(store).await
    }

    pub async fn list_stores(&self) -> Result<Vec<StoreDetail>, CatalogError> {
        let stores =
            sqlx::query_as::<_, Store>("SELECT id, name FROM stores ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let mut details = Vec::with_capacity(stores.len());
        for store in stores {
            details.push(self.store_detail(store).await?);
        }
        Ok(details)
    }

    /// Deletes a store with its items and tags. The cascade is symmetric
    /// and enforced by the schema's foreign keys.
    pub async fn delete_store(&self, store_id: i64) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = ?1")
            .bind(store_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::StoreNotFound);
        }
        Ok(())
    }

    // ----- items -----

    pub async fn create_item(&self, new: NewItem) -> Result<Item, CatalogError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        let price = round_price(new.price)?;

        let item = sqlx::query_as::<_, Item>(
            "INSERT INTO items (name, description, price, store_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, description, price, store_id",
        )
        .bind(name)
        .bind(&new.description)
        .bind(price)
        .bind(new.store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn get_item(&self, item_id: i64) -> Result<ItemDetail, CatalogError> {
        let item = self
            .item_row(item_id)
            .await?
            .ok_or(CatalogError::ItemNotFound)?;
        let tags = self.tags_of_item(item.id).await?;
        Ok(ItemDetail { item, tags })
    }

    pub async fn list_items(&self) -> Result<Vec<ItemDetail>, CatalogError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, price, store_id FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(items.len());
        for item in items {
            let tags = self.tags_of_item(item.id).await?;
            details.push(ItemDetail { item, tags });
        }
        Ok(details)
    }

    /// Upsert by client-supplied key: update name and price in place when
    /// the item exists, otherwise create it under the given id. A create
    /// that loses a race against a concurrent upsert of the same id falls
    /// back to the update arm instead of surfacing the id collision.
    pub async fn upsert_item(
        &self,
        item_id: i64,
        fields: ItemUpsert,
    ) -> Result<Item, CatalogError> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        let price = round_price(fields.price)?;

        if let Some(item) = self.try_update_item(item_id, name, price).await? {
            return Ok(item);
        }

        let store_id = fields.store_id.ok_or(CatalogError::MissingStoreId)?;
        let result = sqlx::query_as::<_, Item>(
            "INSERT INTO items (id, name, description, price, store_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, description, price, store_id",
        )
        .bind(item_id)
        .bind(name)
        .bind(&fields.description)
        .bind(price)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(item) => Ok(item),
            Err(e) if is_unique_violation(&e) => self
                .try_update_item(item_id, name, price)
                .await?
                .ok_or(CatalogError::ItemNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn try_update_item(
        &self,
        item_id: i64,
        name: &str,
        price: f64,
    ) -> Result<Option<Item>, CatalogError> {
        let item = sqlx::query_as::<_, Item>(
            "UPDATE items SET name = ?1, price = ?2 WHERE id = ?3
             RETURNING id, name, description, price, store_id",
        )
        .bind(name)
        .bind(price)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::ItemNotFound);
        }
        Ok(())
    }

    // ----- tags -----

    pub async fn create_tag(&self, store_id: i64, name: &str) -> Result<Tag, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.store_row(store_id).await?.is_none() {
            return Err(CatalogError::StoreNotFound);
        }

        let result = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, store_id) VALUES (?1, ?2)
             RETURNING id, name, store_id",
        )
        .bind(name)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(tag) => Ok(tag),
            Err(e) if is_unique_violation(&e) => Err(CatalogError::TagNameTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_tags(&self, store_id: i64) -> Result<Vec<Tag>, CatalogError> {
        if self.store_row(store_id).await?.is_none() {
            return Err(CatalogError::StoreNotFound);
        }
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE store_id = ?1 ORDER BY id",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    pub async fn get_tag(&self, tag_id: i64) -> Result<TagDetail, CatalogError> {
        let tag = self
            .tag_row(tag_id)
            .await?
            .ok_or(CatalogError::TagNotFound)?;
        let items = self.items_of_tag(tag.id).await?;
        Ok(TagDetail { tag, items })
    }

    /// Deletes a tag unless an item still references it. The existence
    /// check, link count and delete run in one transaction so a concurrent
    /// link cannot slip between them.
    pub async fn delete_tag(&self, tag_id: i64) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await?;

        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE id = ?1",
        )
        .bind(tag_id)
        .fetch_optional(&mut *tx)
        .await?;
        if tag.is_none() {
            return Err(CatalogError::TagNotFound);
        }

        let linked: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM items_tags WHERE tag_id = ?1")
                .bind(tag_id)
                .fetch_one(&mut *tx)
                .await?;
        if linked > 0 {
            return Err(CatalogError::TagInUse);
        }

        sqlx::query("DELETE FROM tags WHERE id = ?1")
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Link an item and a tag from the same store. Re-linking an already
    /// linked pair is a no-op success.
    pub async fn link_tag(&self, item_id: i64, tag_id: i64) -> Result<Tag, CatalogError> {
        let (_, tag) = self.load_pair(item_id, tag_id).await?;

        sqlx::query("INSERT OR IGNORE INTO items_tags (item_id, tag_id) VALUES (?1, ?2)")
            .bind(item_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok(tag)
    }

    /// Remove the association between an item and a tag. Unlinking a pair
    /// that is not linked is a no-op success, mirroring `link_tag`.
    pub async fn unlink_tag(
        &self,
        item_id: i64,
        tag_id: i64,
    ) -> Result<(Item, Tag), CatalogError> {
        let (item, tag) = self.load_pair(item_id, tag_id).await?;

        sqlx::query("DELETE FROM items_tags WHERE item_id = ?1 AND tag_id = ?2")
            .bind(item_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok((item, tag))
    }

    // ----- row helpers -----

    async fn load_pair(
        &self,
        item_id: i64,
        tag_id: i64,
    ) -> Result<(Item, Tag), CatalogError> {
        let item = self
            .item_row(item_id)
            .await?
            .ok_or(CatalogError::ItemNotFound)?;
        let tag = self
            .tag_row(tag_id)
            .await?
            .ok_or(CatalogError::TagNotFound)?;
        if item.store_id != tag.store_id {
            return Err(CatalogError::StoreMismatch);
        }
        Ok((item, tag))
    }

    async fn store_detail(&self, store: Store) -> Result<StoreDetail, CatalogError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, price, store_id
             FROM items WHERE store_id = ?1 ORDER BY id",
        )
        .bind(store.id)
        .fetch_all(&self.pool)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE store_id = ?1 ORDER BY id",
        )
        .bind(store.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(StoreDetail { store, items, tags })
    }

    async fn store_row(&self, store_id: i64) -> Result<Option<Store>, CatalogError> {
        let store = sqlx::query_as::<_, Store>("SELECT id, name FROM stores WHERE id = ?1")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn item_row(&self, item_id: i64) -> Result<Option<Item>, CatalogError> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, price, store_id FROM items WHERE id = ?1",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn tag_row(&self, tag_id: i64) -> Result<Option<Tag>, CatalogError> {
        let tag =
            sqlx::query_as::<_, Tag>("SELECT id, name, store_id FROM tags WHERE id = ?1")
                .bind(tag_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(tag)
    }

    async fn tags_of_item(&self, item_id: i64) -> Result<Vec<Tag>, CatalogError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name, t.store_id FROM tags t
             JOIN items_tags it ON it.tag_id = t.id
             WHERE it.item_id = ?1 ORDER BY t.id",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn items_of_tag(&self, tag_id: i64) -> Result<Vec<Item>, CatalogError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT i.id, i.name, i.description, i.price, i.store_id FROM items i
             JOIN items_tags it ON it.item_id = i.id
             WHERE it.tag_id = ?1 ORDER BY i.id",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

/// Prices carry 2-decimal precision semantics; anything finer is rounded
/// at the boundary.
fn round_price(price: f64) -> Result<f64, CatalogError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::NegativePrice);
    }
    Ok((price * 100.0).round() / 100.0)
}
