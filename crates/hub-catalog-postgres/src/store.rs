//! Postgres implementations of the hub-catalog-core port traits.
//!
//! All SQL is runtime-checked (sqlx::query, not sqlx::query!) to avoid a
//! compile-time DB requirement. Relationship sets are loaded with one
//! follow-up batch query per join table, so every entity leaves this module
//! with complete `categories` and `bundles`.

use std::collections::{BTreeSet, HashMap};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, Row};
use tracing::{debug, warn};

use hub_catalog_core::filter::BundleGroupQuery;
use hub_catalog_core::paging::Page;
use hub_catalog_core::ports::{BundleGroupStore, CategoryDirectory};
use hub_catalog_core::types::{
    AssociationLinks, BundleGroupEntity, BundleGroupId, BundleId, Category, CategoryId,
    OrganisationId, OrganisationRef, Status,
};

const BUNDLE_GROUP_COLUMNS: &str = r#"
    bg.id, bg.name, bg.description, bg.description_image,
    bg.documentation_url, bg.status, bg.organisation_id
"#;

const FILTER_PREDICATE: &str = r#"
    ($1::bigint IS NULL OR bg.organisation_id = $1)
    AND bg.status = ANY($2)
    AND EXISTS (
        SELECT 1 FROM bundle_group_categories bgc
        WHERE bgc.bundle_group_id = bg.id
          AND bgc.category_id = ANY($3)
    )
"#;

const EXPECTED_TABLES: [&str; 6] = [
    "organisation",
    "category",
    "bundle",
    "bundle_group",
    "bundle_group_categories",
    "bundle_bundle_groups",
];

#[derive(Debug, FromRow)]
struct PgBundleGroupRow {
    id: i64,
    name: String,
    description: String,
    description_image: String,
    documentation_url: String,
    status: String,
    organisation_id: Option<i64>,
}

impl TryFrom<PgBundleGroupRow> for BundleGroupEntity {
    type Error = String;

    fn try_from(row: PgBundleGroupRow) -> std::result::Result<Self, Self::Error> {
        let status = Status::parse(&row.status)
            .map_err(|_| format!("bundle group {} has unknown status '{}'", row.id, row.status))?;
        Ok(BundleGroupEntity {
            id: Some(BundleGroupId(row.id)),
            name: row.name,
            description: row.description,
            description_image: row.description_image,
            documentation_url: row.documentation_url,
            status,
            organisation: row
                .organisation_id
                .map(|id| OrganisationRef::new(OrganisationId(id))),
            categories: BTreeSet::new(),
            bundles: BTreeSet::new(),
        })
    }
}

/// Postgres-backed bundle group store and category directory.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check that every catalog table is present in the current schema.
    pub async fn verify_schema(&self) -> Result<()> {
        let found: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = current_schema()
              AND table_name = ANY($1)
            "#,
        )
        .bind(EXPECTED_TABLES.to_vec())
        .fetch_all(&self.pool)
        .await
        .context("Failed to inspect catalog schema")?;

        let missing: Vec<_> = EXPECTED_TABLES
            .iter()
            .filter(|t| !found.iter().any(|f| f == *t))
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("catalog tables missing: {:?}", missing));
        }
        Ok(())
    }

    /// Attach category and bundle sets to freshly-read rows.
    async fn hydrate(&self, rows: Vec<PgBundleGroupRow>) -> Result<Vec<BundleGroupEntity>> {
        let mut entities = rows
            .into_iter()
            .map(|r| BundleGroupEntity::try_from(r).map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;
        if entities.is_empty() {
            return Ok(entities);
        }

        let ids: Vec<i64> = entities.iter().filter_map(|e| e.id).map(|id| id.0).collect();

        let category_links: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT bundle_group_id, category_id
            FROM bundle_group_categories
            WHERE bundle_group_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load bundle group categories")?;

        let bundle_links: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT bundle_group_id, bundle_id
            FROM bundle_bundle_groups
            WHERE bundle_group_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load bundle group children")?;

        let mut categories: HashMap<i64, BTreeSet<CategoryId>> = HashMap::new();
        for (group, category) in category_links {
            categories.entry(group).or_default().insert(CategoryId(category));
        }
        let mut bundles: HashMap<i64, BTreeSet<BundleId>> = HashMap::new();
        for (group, bundle) in bundle_links {
            bundles.entry(group).or_default().insert(BundleId(bundle));
        }

        for entity in &mut entities {
            if let Some(id) = entity.id {
                entity.categories = categories.remove(&id.0).unwrap_or_default();
                entity.bundles = bundles.remove(&id.0).unwrap_or_default();
            }
        }
        Ok(entities)
    }
}

#[async_trait]
impl BundleGroupStore for PgCatalogStore {
    async fn find_all(
        &self,
        organisation_id: Option<OrganisationId>,
    ) -> Result<Vec<BundleGroupEntity>> {
        let query = format!(
            r#"
            SELECT {BUNDLE_GROUP_COLUMNS}
            FROM bundle_group bg
            WHERE ($1::bigint IS NULL OR bg.organisation_id = $1)
            ORDER BY bg.name, bg.id
            "#
        );
        let rows = sqlx::query_as::<_, PgBundleGroupRow>(&query)
            .bind(organisation_id.map(|id| id.0))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list bundle groups")?;
        self.hydrate(rows).await
    }

    async fn find_page(&self, query: &BundleGroupQuery) -> Result<Page<BundleGroupEntity>> {
        let filter = &query.filter;
        let organisation = filter.organisation_id.map(|id| id.0);
        let statuses: Vec<String> = filter.statuses.iter().map(|s| s.to_string()).collect();
        let categories: Vec<i64> = filter.category_ids.iter().map(|c| c.0).collect();

        let count_sql = format!(
            "SELECT COUNT(*) FROM bundle_group bg WHERE {FILTER_PREDICATE}"
        );
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(organisation)
            .bind(&statuses)
            .bind(&categories)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count bundle groups")?;

        let page_sql = format!(
            r#"
            SELECT {BUNDLE_GROUP_COLUMNS}
            FROM bundle_group bg
            WHERE {FILTER_PREDICATE}
            ORDER BY bg.name, bg.id
            LIMIT $4 OFFSET $5
            "#
        );
        let offset = i64::try_from(query.offset()).context("page offset out of range")?;
        let rows = sqlx::query_as::<_, PgBundleGroupRow>(&page_sql)
            .bind(organisation)
            .bind(&statuses)
            .bind(&categories)
            .bind(i64::from(query.page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to page bundle groups")?;

        debug!(total, rows = rows.len(), offset, "bundle group page fetched");

        Ok(Page {
            items: self.hydrate(rows).await?,
            page_index: query.page_index,
            page_size: query.page_size,
            total_elements: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn find_by_id(&self, id: BundleGroupId) -> Result<Option<BundleGroupEntity>> {
        let query = format!(
            "SELECT {BUNDLE_GROUP_COLUMNS} FROM bundle_group bg WHERE bg.id = $1"
        );
        let row = sqlx::query_as::<_, PgBundleGroupRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get bundle group by ID")?;
        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn exists(&self, id: BundleGroupId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM bundle_group WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check bundle group existence")
    }

    async fn save(
        &self,
        entity: &BundleGroupEntity,
        links: &AssociationLinks,
    ) -> Result<BundleGroupEntity> {
        let organisation = entity.organisation.map(|org| org.id.0);
        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        let id: i64 = match entity.id {
            None => sqlx::query_scalar(
                r#"
                INSERT INTO bundle_group (
                    name, description, description_image,
                    documentation_url, status, organisation_id
                ) VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(&entity.name)
            .bind(&entity.description)
            .bind(&entity.description_image)
            .bind(&entity.documentation_url)
            .bind(entity.status.as_ref())
            .bind(organisation)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to create bundle group")?,
            Some(id) => {
                let (id, inserted): (i64, bool) = sqlx::query_as(
                    r#"
                    INSERT INTO bundle_group (
                        id, name, description, description_image,
                        documentation_url, status, organisation_id
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        description = EXCLUDED.description,
                        description_image = EXCLUDED.description_image,
                        documentation_url = EXCLUDED.documentation_url,
                        status = EXCLUDED.status,
                        organisation_id = EXCLUDED.organisation_id
                    RETURNING id, (xmax = 0) AS inserted
                    "#,
                )
                .bind(id.0)
                .bind(&entity.name)
                .bind(&entity.description)
                .bind(&entity.description_image)
                .bind(&entity.documentation_url)
                .bind(entity.status.as_ref())
                .bind(organisation)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("Failed to update bundle group {id}"))?;
                if inserted {
                    // Row deleted after the existence check and recreated
                    // under its old id; the identity sequence must stay ahead.
                    warn!(id, "bundle group recreated by update");
                    advance_id_sequence(&mut tx, id).await?;
                }
                id
            }
        };

        write_links(&mut tx, id, links).await?;
        tx.commit().await.context("Failed to commit bundle group")?;

        self.find_by_id(BundleGroupId(id))
            .await?
            .ok_or_else(|| anyhow!("bundle group {id} missing right after save"))
    }
}

/// Replace the association records named in `links`; `None` lists are skipped.
async fn write_links(conn: &mut PgConnection, id: i64, links: &AssociationLinks) -> Result<()> {
    if let Some(categories) = &links.categories {
        let categories: Vec<i64> = categories.iter().map(|c| c.0).collect();
        sqlx::query("DELETE FROM bundle_group_categories WHERE bundle_group_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to clear bundle group categories")?;
        sqlx::query(
            r#"
            INSERT INTO bundle_group_categories (bundle_group_id, category_id)
            SELECT $1, UNNEST($2::bigint[])
            "#,
        )
        .bind(id)
        .bind(&categories)
        .execute(&mut *conn)
        .await
        .context("Failed to link bundle group categories")?;
    }

    if let Some(bundles) = &links.bundles {
        let bundles: Vec<i64> = bundles.iter().map(|b| b.0).collect();
        sqlx::query("DELETE FROM bundle_bundle_groups WHERE bundle_group_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to clear bundle group children")?;
        sqlx::query(
            r#"
            INSERT INTO bundle_bundle_groups (bundle_group_id, bundle_id)
            SELECT $1, UNNEST($2::bigint[])
            "#,
        )
        .bind(id)
        .bind(&bundles)
        .execute(&mut *conn)
        .await
        .context("Failed to link bundle group children")?;
    }
    Ok(())
}

/// Move the `bundle_group.id` identity sequence past `id` if it is behind.
async fn advance_id_sequence(conn: &mut PgConnection, id: i64) -> Result<()> {
    sqlx::query(
        r#"
        SELECT setval(
            pg_get_serial_sequence('bundle_group', 'id'),
            GREATEST($1, nextval(pg_get_serial_sequence('bundle_group', 'id')) - 1, 1)
        )
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await
    .context("Failed to advance bundle group id sequence")?;
    Ok(())
}

#[async_trait]
impl CategoryDirectory for PgCatalogStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, description FROM category ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;
        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: CategoryId(row.get("id")),
                name: row.get("name"),
                description: row.get("description"),
            })
            .collect())
    }
}
