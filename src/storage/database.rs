use super::traits::Storage;
use crate::db::DatabaseManager;
use crate::domain::*;
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::Connection;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Relational storage implementation backed by Turso/libSQL. Associations
/// live in the `locality_assistance` and `attraction_assistance` join
/// tables; the delete cascades from the migration script are carried out
/// explicitly here as well so the policy never depends on engine defaults.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub async fn new() -> Result<Self> {
        let db_manager = DatabaseManager::new().await?;
        db_manager.run_migrations().await?;

        Ok(Self {
            db: Arc::new(db_manager),
        })
    }

    async fn conn(&self) -> Result<Connection> {
        self.db.get_connection().await
    }
}

fn db_err(context: &str, e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Database {
        message: format!("{context}: {e}"),
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| db_err("Invalid UUID in row", e))
}

// A saturated offset can exceed i64; clamp instead of wrapping negative.
fn sql_offset(request: &PageRequest) -> i64 {
    i64::try_from(request.offset()).unwrap_or(i64::MAX)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| db_err("Invalid timestamp in row", e))
}

// ORDER BY columns go through a whitelist; anything else falls back to the
// entity default.
fn locality_order(sort: &str) -> &'static str {
    match sort {
        "region" => "region",
        _ => "name",
    }
}

fn assistance_order(sort: &str) -> &'static str {
    match sort {
        "executor" => "executor",
        _ => "type",
    }
}

fn attraction_order(sort: &str) -> &'static str {
    match sort {
        "creationDate" => "creation_date",
        "type" => "type",
        _ => "name",
    }
}

fn row_to_locality(row: &libsql::Row) -> Result<Locality> {
    let id: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
    let name: String = row.get(1).map_err(|e| db_err("Failed to get name", e))?;
    let region: String = row.get(2).map_err(|e| db_err("Failed to get region", e))?;
    let latitude: Option<f64> = row.get(3).ok();
    let longitude: Option<f64> = row.get(4).ok();
    let short_description: Option<String> = row.get(5).ok();

    Ok(Locality {
        id: Some(parse_id(&id)?),
        name,
        region,
        latitude,
        longitude,
        short_description,
        assistance_ids: Vec::new(),
    })
}

fn row_to_assistance(row: &libsql::Row) -> Result<Assistance> {
    let id: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
    let type_raw: String = row.get(1).map_err(|e| db_err("Failed to get type", e))?;
    let short_description: Option<String> = row.get(2).ok();
    let executor: Option<String> = row.get(3).ok();

    let assistance_type = AssistanceType::from_str(&type_raw)
        .map_err(|_| db_err("Unknown assistance type in row", &type_raw))?;

    Ok(Assistance {
        id: Some(parse_id(&id)?),
        assistance_type,
        short_description,
        executor,
    })
}

fn row_to_attraction(row: &libsql::Row) -> Result<Attraction> {
    let id: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
    let name: String = row.get(1).map_err(|e| db_err("Failed to get name", e))?;
    let creation_raw: String = row
        .get(2)
        .map_err(|e| db_err("Failed to get creation_date", e))?;
    let short_description: Option<String> = row.get(3).ok();
    let type_raw: String = row.get(4).map_err(|e| db_err("Failed to get type", e))?;
    let locality_raw: String = row
        .get(5)
        .map_err(|e| db_err("Failed to get locality_id", e))?;

    let attraction_type = AttractionType::from_str(&type_raw)
        .map_err(|_| db_err("Unknown attraction type in row", &type_raw))?;

    Ok(Attraction {
        id: Some(parse_id(&id)?),
        name,
        creation_date: parse_timestamp(&creation_raw)?,
        short_description,
        attraction_type,
        locality_id: parse_id(&locality_raw)?,
        assistance_ids: Vec::new(),
    })
}

impl DatabaseStorage {
    async fn count(&self, sql: &str, params: impl libsql::params::IntoParams) -> Result<usize> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| db_err("Failed to count rows", e))?;

        let row = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read count row", e))?
            .ok_or_else(|| db_err("Failed to read count row", "no row returned"))?;

        let total: i64 = row.get(0).map_err(|e| db_err("Failed to get count", e))?;
        Ok(total as usize)
    }

    async fn assistance_ids_for(&self, table: &str, owner_column: &str, owner_id: Uuid) -> Result<Vec<Uuid>> {
        let conn = self.conn().await?;
        let sql =
            format!("SELECT assistance_id FROM {table} WHERE {owner_column} = ? ORDER BY assistance_id");
        let mut rows = conn
            .query(&sql, libsql::params![owner_id.to_string()])
            .await
            .map_err(|e| db_err("Failed to query association rows", e))?;

        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read association row", e))?
        {
            let raw: String = row
                .get(0)
                .map_err(|e| db_err("Failed to get assistance_id", e))?;
            ids.push(parse_id(&raw)?);
        }
        Ok(ids)
    }

    async fn replace_associations(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: Uuid,
        assistance_ids: &[Uuid],
    ) -> Result<()> {
        let conn = self.conn().await?;
        let delete_sql = format!("DELETE FROM {table} WHERE {owner_column} = ?");
        conn.execute(&delete_sql, libsql::params![owner_id.to_string()])
            .await
            .map_err(|e| db_err("Failed to clear association rows", e))?;

        let insert_sql = format!("INSERT INTO {table} ({owner_column}, assistance_id) VALUES (?, ?)");
        for assistance_id in assistance_ids {
            conn.execute(
                &insert_sql,
                libsql::params![owner_id.to_string(), assistance_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to insert association row", e))?;
        }
        Ok(())
    }

    async fn attraction_page(
        &self,
        where_clause: &str,
        filter_param: Option<String>,
        request: &PageRequest,
    ) -> Result<Page<Attraction>> {
        let count_sql = format!("SELECT COUNT(*) FROM attractions {where_clause}");
        let total = match &filter_param {
            Some(p) => self.count(&count_sql, libsql::params![p.clone()]).await?,
            None => self.count(&count_sql, libsql::params![]).await?,
        };

        let select_sql = format!(
            "SELECT id, name, creation_date, short_description, type, locality_id \
             FROM attractions {where_clause} ORDER BY {} LIMIT ? OFFSET ?",
            attraction_order(&request.sort)
        );

        let conn = self.conn().await?;
        let mut rows = match &filter_param {
            Some(p) => conn
                .query(
                    &select_sql,
                    libsql::params![p.clone(), request.size as i64, sql_offset(request)],
                )
                .await
                .map_err(|e| db_err("Failed to query attractions", e))?,
            None => conn
                .query(
                    &select_sql,
                    libsql::params![request.size as i64, sql_offset(request)],
                )
                .await
                .map_err(|e| db_err("Failed to query attractions", e))?,
        };

        let mut content = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read attraction row", e))?
        {
            let mut attraction = row_to_attraction(&row)?;
            if let Some(id) = attraction.id {
                attraction.assistance_ids = self
                    .assistance_ids_for("attraction_assistance", "attraction_id", id)
                    .await?;
            }
            content.push(attraction);
        }

        Ok(Page::new(content, request, total))
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn create_locality(&self, locality: &mut Locality) -> Result<()> {
        let id = Uuid::new_v4();
        locality.id = Some(id);

        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO localities (id, name, region, latitude, longitude, short_description) \
             VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.to_string(),
                locality.name.as_str(),
                locality.region.as_str(),
                locality.latitude,
                locality.longitude,
                locality.short_description.as_deref()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert locality", e))?;

        self.replace_associations("locality_assistance", "locality_id", id, &locality.assistance_ids)
            .await?;

        info!("Inserted locality: {} with id {}", locality.name, id);
        Ok(())
    }

    async fn get_locality_by_id(&self, id: Uuid) -> Result<Option<Locality>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, region, latitude, longitude, short_description \
                 FROM localities WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query locality", e))?;

        match rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read locality row", e))?
        {
            Some(row) => {
                let mut locality = row_to_locality(&row)?;
                locality.assistance_ids = self
                    .assistance_ids_for("locality_assistance", "locality_id", id)
                    .await?;
                Ok(Some(locality))
            }
            None => Ok(None),
        }
    }

    async fn list_localities(&self, request: &PageRequest) -> Result<Page<Locality>> {
        let total = self.count("SELECT COUNT(*) FROM localities", libsql::params![]).await?;

        let sql = format!(
            "SELECT id, name, region, latitude, longitude, short_description \
             FROM localities ORDER BY {} LIMIT ? OFFSET ?",
            locality_order(&request.sort)
        );

        let conn = self.conn().await?;
        let mut rows = conn
            .query(&sql, libsql::params![request.size as i64, sql_offset(request)])
            .await
            .map_err(|e| db_err("Failed to query localities", e))?;

        let mut content = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read locality row", e))?
        {
            let mut locality = row_to_locality(&row)?;
            if let Some(id) = locality.id {
                locality.assistance_ids = self
                    .assistance_ids_for("locality_assistance", "locality_id", id)
                    .await?;
            }
            content.push(locality);
        }

        Ok(Page::new(content, request, total))
    }

    async fn update_locality(&self, locality: &Locality) -> Result<()> {
        let id = locality.id.ok_or_else(|| CatalogError::Database {
            message: "Cannot update locality without ID".to_string(),
        })?;

        let conn = self.conn().await?;
        conn.execute(
            "UPDATE localities SET name = ?, region = ?, latitude = ?, longitude = ?, \
             short_description = ? WHERE id = ?",
            libsql::params![
                locality.name.as_str(),
                locality.region.as_str(),
                locality.latitude,
                locality.longitude,
                locality.short_description.as_deref(),
                id.to_string()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to update locality", e))?;

        self.replace_associations("locality_assistance", "locality_id", id, &locality.assistance_ids)
            .await
    }

    async fn delete_locality(&self, id: Uuid) -> Result<()> {
        let conn = self.conn().await?;
        let id_param = id.to_string();

        // Cascade: attractions require an existing locality
        conn.execute(
            "DELETE FROM attraction_assistance WHERE attraction_id IN \
             (SELECT id FROM attractions WHERE locality_id = ?)",
            libsql::params![id_param.clone()],
        )
        .await
        .map_err(|e| db_err("Failed to delete attraction associations", e))?;

        conn.execute(
            "DELETE FROM attractions WHERE locality_id = ?",
            libsql::params![id_param.clone()],
        )
        .await
        .map_err(|e| db_err("Failed to delete attractions of locality", e))?;

        conn.execute(
            "DELETE FROM locality_assistance WHERE locality_id = ?",
            libsql::params![id_param.clone()],
        )
        .await
        .map_err(|e| db_err("Failed to delete locality associations", e))?;

        conn.execute(
            "DELETE FROM localities WHERE id = ?",
            libsql::params![id_param],
        )
        .await
        .map_err(|e| db_err("Failed to delete locality", e))?;

        info!("Deleted locality with id {}", id);
        Ok(())
    }

    async fn create_assistance(&self, assistance: &mut Assistance) -> Result<()> {
        let id = Uuid::new_v4();
        assistance.id = Some(id);

        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO assistances (id, type, short_description, executor) VALUES (?, ?, ?, ?)",
            libsql::params![
                id.to_string(),
                assistance.assistance_type.as_str(),
                assistance.short_description.as_deref(),
                assistance.executor.as_deref()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert assistance", e))?;

        info!("Inserted assistance: {} with id {}", assistance.assistance_type, id);
        Ok(())
    }

    async fn get_assistance_by_id(&self, id: Uuid) -> Result<Option<Assistance>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, type, short_description, executor FROM assistances WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query assistance", e))?;

        match rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read assistance row", e))?
        {
            Some(row) => Ok(Some(row_to_assistance(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_assistances_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Assistance>> {
        let mut found = Vec::new();
        for id in ids {
            if let Some(assistance) = self.get_assistance_by_id(*id).await? {
                found.push(assistance);
            }
        }
        Ok(found)
    }

    async fn list_assistances(&self, request: &PageRequest) -> Result<Page<Assistance>> {
        let total = self.count("SELECT COUNT(*) FROM assistances", libsql::params![]).await?;

        let sql = format!(
            "SELECT id, type, short_description, executor FROM assistances \
             ORDER BY {} LIMIT ? OFFSET ?",
            assistance_order(&request.sort)
        );

        let conn = self.conn().await?;
        let mut rows = conn
            .query(&sql, libsql::params![request.size as i64, sql_offset(request)])
            .await
            .map_err(|e| db_err("Failed to query assistances", e))?;

        let mut content = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read assistance row", e))?
        {
            content.push(row_to_assistance(&row)?);
        }

        Ok(Page::new(content, request, total))
    }

    async fn update_assistance(&self, assistance: &Assistance) -> Result<()> {
        let id = assistance.id.ok_or_else(|| CatalogError::Database {
            message: "Cannot update assistance without ID".to_string(),
        })?;

        let conn = self.conn().await?;
        conn.execute(
            "UPDATE assistances SET type = ?, short_description = ?, executor = ? WHERE id = ?",
            libsql::params![
                assistance.assistance_type.as_str(),
                assistance.short_description.as_deref(),
                assistance.executor.as_deref(),
                id.to_string()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to update assistance", e))?;

        Ok(())
    }

    async fn delete_assistance(&self, id: Uuid) -> Result<()> {
        let conn = self.conn().await?;
        let id_param = id.to_string();

        // Detach from association sets on both sides
        conn.execute(
            "DELETE FROM locality_assistance WHERE assistance_id = ?",
            libsql::params![id_param.clone()],
        )
        .await
        .map_err(|e| db_err("Failed to detach assistance from localities", e))?;

        conn.execute(
            "DELETE FROM attraction_assistance WHERE assistance_id = ?",
            libsql::params![id_param.clone()],
        )
        .await
        .map_err(|e| db_err("Failed to detach assistance from attractions", e))?;

        conn.execute(
            "DELETE FROM assistances WHERE id = ?",
            libsql::params![id_param],
        )
        .await
        .map_err(|e| db_err("Failed to delete assistance", e))?;

        info!("Deleted assistance with id {}", id);
        Ok(())
    }

    async fn create_attraction(&self, attraction: &mut Attraction) -> Result<()> {
        let id = Uuid::new_v4();
        attraction.id = Some(id);

        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO attractions (id, name, creation_date, short_description, type, locality_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.to_string(),
                attraction.name.as_str(),
                attraction.creation_date.to_rfc3339(),
                attraction.short_description.as_deref(),
                attraction.attraction_type.as_str(),
                attraction.locality_id.to_string()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert attraction", e))?;

        self.replace_associations(
            "attraction_assistance",
            "attraction_id",
            id,
            &attraction.assistance_ids,
        )
        .await?;

        info!("Inserted attraction: {} with id {}", attraction.name, id);
        Ok(())
    }

    async fn get_attraction_by_id(&self, id: Uuid) -> Result<Option<Attraction>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, creation_date, short_description, type, locality_id \
                 FROM attractions WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query attraction", e))?;

        match rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read attraction row", e))?
        {
            Some(row) => {
                let mut attraction = row_to_attraction(&row)?;
                attraction.assistance_ids = self
                    .assistance_ids_for("attraction_assistance", "attraction_id", id)
                    .await?;
                Ok(Some(attraction))
            }
            None => Ok(None),
        }
    }

    async fn list_attractions(
        &self,
        type_filter: Option<AttractionType>,
        request: &PageRequest,
    ) -> Result<Page<Attraction>> {
        match type_filter {
            Some(t) => {
                self.attraction_page("WHERE type = ?", Some(t.as_str().to_string()), request)
                    .await
            }
            None => self.attraction_page("", None, request).await,
        }
    }

    async fn list_attractions_by_locality(
        &self,
        locality_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<Attraction>> {
        self.attraction_page(
            "WHERE locality_id = ?",
            Some(locality_id.to_string()),
            request,
        )
        .await
    }

    async fn update_attraction(&self, attraction: &Attraction) -> Result<()> {
        let id = attraction.id.ok_or_else(|| CatalogError::Database {
            message: "Cannot update attraction without ID".to_string(),
        })?;

        let conn = self.conn().await?;
        conn.execute(
            "UPDATE attractions SET name = ?, short_description = ?, type = ?, locality_id = ? \
             WHERE id = ?",
            libsql::params![
                attraction.name.as_str(),
                attraction.short_description.as_deref(),
                attraction.attraction_type.as_str(),
                attraction.locality_id.to_string(),
                id.to_string()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to update attraction", e))?;

        self.replace_associations(
            "attraction_assistance",
            "attraction_id",
            id,
            &attraction.assistance_ids,
        )
        .await
    }

    async fn delete_attraction(&self, id: Uuid) -> Result<()> {
        let conn = self.conn().await?;
        let id_param = id.to_string();

        conn.execute(
            "DELETE FROM attraction_assistance WHERE attraction_id = ?",
            libsql::params![id_param.clone()],
        )
        .await
        .map_err(|e| db_err("Failed to delete attraction associations", e))?;

        conn.execute(
            "DELETE FROM attractions WHERE id = ?",
            libsql::params![id_param],
        )
        .await
        .map_err(|e| db_err("Failed to delete attraction", e))?;

        info!("Deleted attraction with id {}", id);
        Ok(())
    }

    async fn get_attraction_ids_by_locality(&self, locality_id: Uuid) -> Result<Vec<Uuid>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id FROM attractions WHERE locality_id = ? ORDER BY id",
                libsql::params![locality_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query attraction ids", e))?;

        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read attraction id row", e))?
        {
            let raw: String = row.get(0).map_err(|e| db_err("Failed to get id", e))?;
            ids.push(parse_id(&raw)?);
        }
        Ok(ids)
    }

    async fn get_attraction_ids_by_assistance(&self, assistance_id: Uuid) -> Result<Vec<Uuid>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT attraction_id FROM attraction_assistance WHERE assistance_id = ? \
                 ORDER BY attraction_id",
                libsql::params![assistance_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to query attraction ids", e))?;

        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read attraction id row", e))?
        {
            let raw: String = row
                .get(0)
                .map_err(|e| db_err("Failed to get attraction_id", e))?;
            ids.push(parse_id(&raw)?);
        }
        Ok(ids)
    }
}
