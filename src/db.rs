use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{BenchError, Result};
use crate::menu::{Analysis, AnalysisSummary, ReferenceItem};

/// Safely convert a Unix millisecond timestamp to DateTime<Utc>, falling back to current time if invalid
fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Make user input literal inside a LIKE pattern, escaping with a backslash
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Brands compare case-insensitively, including non-ASCII letters ("Ñandú" = "ñandú")
fn brand_key(brand: &str) -> String {
    brand.trim().to_lowercase()
}

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Whether an upsert created a new dish or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

const DISH_COLUMNS: &str =
    "brand, id, category, name, description, image, full_price, promo_price, discount";

fn row_to_dish(row: &Row<'_>) -> rusqlite::Result<ReferenceItem> {
    Ok(ReferenceItem {
        brand: row.get(0)?,
        id: row.get(1)?,
        category: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        image: row.get(5)?,
        full_price: row.get(6)?,
        promo_price: row.get(7)?,
        discount: row.get(8)?,
    })
}

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database
    pub fn open() -> Result<Self> {
        let db_path = Config::db_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(&db_path)?;

        // Run migrations
        embedded::migrations::runner().run(&mut conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        embedded::migrations::runner().run(&mut conn)?;
        Ok(Self { conn })
    }

    // ========== Dish operations ==========

    /// Insert a dish, or replace the one with the same brand and id
    pub fn upsert_dish(&self, dish: &ReferenceItem) -> Result<Upsert> {
        let existed = self.dish_exists(&dish.brand, &dish.id)?;

        self.conn.execute(
            "INSERT INTO dishes (brand, id, category, name, description, image, full_price, promo_price, discount, brand_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (brand_key, id) DO UPDATE SET
                category = excluded.category,
                name = excluded.name,
                description = excluded.description,
                image = excluded.image,
                full_price = excluded.full_price,
                promo_price = excluded.promo_price,
                discount = excluded.discount",
            params![
                dish.brand,
                dish.id,
                dish.category,
                dish.name,
                dish.description,
                dish.image,
                dish.full_price,
                dish.promo_price,
                dish.discount,
                brand_key(&dish.brand),
            ],
        )?;

        Ok(if existed { Upsert::Updated } else { Upsert::Created })
    }

    /// Upsert many dishes in one transaction, returning (created, updated)
    pub fn bulk_upsert(&self, dishes: &[ReferenceItem]) -> Result<(usize, usize)> {
        let tx = self.conn.unchecked_transaction()?;
        let mut created = 0;
        let mut updated = 0;

        for dish in dishes {
            match self.upsert_dish(dish)? {
                Upsert::Created => created += 1,
                Upsert::Updated => updated += 1,
            }
        }

        tx.commit()?;
        Ok((created, updated))
    }

    fn dish_exists(&self, brand: &str, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM dishes WHERE brand_key = ?1 AND id = ?2",
            params![brand_key(brand), id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a dish by brand and id
    pub fn get_dish(&self, brand: &str, id: &str) -> Result<Option<ReferenceItem>> {
        let dish = self
            .conn
            .query_row(
                &format!("SELECT {} FROM dishes WHERE brand_key = ?1 AND id = ?2", DISH_COLUMNS),
                params![brand_key(brand), id],
                row_to_dish,
            )
            .optional()?;
        Ok(dish)
    }

    /// Find dishes with this id across all brands
    pub fn find_dishes_by_id(&self, id: &str) -> Result<Vec<ReferenceItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM dishes WHERE id = ?1 ORDER BY rowid",
            DISH_COLUMNS
        ))?;
        let dishes = stmt
            .query_map(params![id], row_to_dish)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(dishes)
    }

    /// List dishes in insertion order, optionally for one brand (case-insensitive)
    pub fn list_dishes(&self, brand: Option<&str>) -> Result<Vec<ReferenceItem>> {
        let dishes = match brand {
            Some(brand) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM dishes WHERE brand_key = ?1 ORDER BY rowid",
                    DISH_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![brand_key(brand)], row_to_dish)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {} FROM dishes ORDER BY rowid", DISH_COLUMNS))?;
                let rows = stmt
                    .query_map([], row_to_dish)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(dishes)
    }

    /// Number of dishes in the catalog
    pub fn count_dishes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dishes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Replace an existing dish
    pub fn update_dish(&self, dish: &ReferenceItem) -> Result<()> {
        if !self.dish_exists(&dish.brand, &dish.id)? {
            return Err(BenchError::DishNotFound(format!("{}/{}", dish.brand, dish.id)));
        }
        self.upsert_dish(dish)?;
        Ok(())
    }

    /// Delete a dish
    pub fn delete_dish(&self, brand: &str, id: &str) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM dishes WHERE brand_key = ?1 AND id = ?2",
            params![brand_key(brand), id],
        )?;
        if deleted == 0 {
            return Err(BenchError::DishNotFound(format!("{}/{}", brand, id)));
        }
        Ok(())
    }

    // ========== Analysis history ==========

    /// Store a benchmark run
    pub fn insert_analysis(&self, analysis: &Analysis) -> Result<()> {
        self.conn.execute(
            "INSERT INTO analyses (id, created_at, brand, url, title, results)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                analysis.id.to_string(),
                analysis.created_at.timestamp_millis(),
                analysis.brand,
                analysis.url,
                analysis.title,
                serde_json::to_string(&analysis.results)?,
            ],
        )?;
        Ok(())
    }

    /// Keep only the newest `keep` analyses, returning how many were removed
    pub fn trim_history(&self, keep: usize) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM analyses WHERE id NOT IN (
                SELECT id FROM analyses ORDER BY created_at DESC, rowid DESC LIMIT ?1
             )",
            params![keep as i64],
        )?;
        Ok(removed)
    }

    /// History summaries, newest first
    pub fn list_analyses(&self) -> Result<Vec<AnalysisSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, brand, url, json_array_length(results)
             FROM analyses ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (id, created_at, brand, url, total) = row?;
            result.push(AnalysisSummary {
                id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::nil()),
                created_at: millis_to_datetime(created_at),
                brand,
                url,
                total_results: total.max(0) as usize,
            });
        }
        Ok(result)
    }

    /// Get an analysis by full id or unique-enough prefix (newest match wins)
    pub fn get_analysis(&self, id_or_prefix: &str) -> Result<Option<Analysis>> {
        let id = id_or_prefix.trim();
        if id.is_empty() {
            return Ok(None);
        }
        let pattern = format!("{}%", escape_like(id));

        let row = self
            .conn
            .query_row(
                "SELECT id, created_at, brand, url, title, results
                 FROM analyses WHERE id = ?1 OR id LIKE ?2 ESCAPE '\\'
                 ORDER BY (id = ?1) DESC, created_at DESC LIMIT 1",
                params![id, pattern],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, created_at, brand, url, title, results)) => Ok(Some(Analysis {
                id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::nil()),
                created_at: millis_to_datetime(created_at),
                brand,
                url,
                title,
                results: serde_json::from_str(&results)?,
            })),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{CandidateItem, MatchResult, MatchStatus};

    fn dish(brand: &str, id: &str, name: &str) -> ReferenceItem {
        ReferenceItem {
            full_price: Some(6.5),
            ..ReferenceItem::new(brand, id, name)
        }
    }

    #[test]
    fn test_dish_crud() {
        let db = Database::open_in_memory().unwrap();

        let outcome = db.upsert_dish(&dish("Atomic", "B1", "Hamburguesa Doble")).unwrap();
        assert_eq!(outcome, Upsert::Created);

        let loaded = db.get_dish("Atomic", "B1").unwrap().unwrap();
        assert_eq!(loaded.name, "Hamburguesa Doble");
        assert_eq!(loaded.full_price, Some(6.5));
        assert_eq!(loaded.promo_price, None);

        let mut changed = loaded.clone();
        changed.name = "Hamburguesa Triple".to_string();
        db.update_dish(&changed).unwrap();
        assert_eq!(db.get_dish("Atomic", "B1").unwrap().unwrap().name, "Hamburguesa Triple");

        db.delete_dish("Atomic", "B1").unwrap();
        assert!(db.get_dish("Atomic", "B1").unwrap().is_none());
        assert!(matches!(db.delete_dish("Atomic", "B1"), Err(BenchError::DishNotFound(_))));
    }

    #[test]
    fn test_update_missing_dish() {
        let db = Database::open_in_memory().unwrap();
        let result = db.update_dish(&dish("Atomic", "nope", "Pizza"));
        assert!(matches!(result, Err(BenchError::DishNotFound(_))));
    }

    #[test]
    fn test_brand_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_dish(&dish("Atomic", "B1", "Burger")).unwrap();
        assert_eq!(db.upsert_dish(&dish("ATOMIC", "B1", "Burger 2")).unwrap(), Upsert::Updated);
        db.upsert_dish(&dish("Other", "B1", "Pizza")).unwrap();

        let atomic = db.list_dishes(Some("atomic")).unwrap();
        assert_eq!(atomic.len(), 1);
        assert_eq!(atomic[0].name, "Burger 2");
        assert_eq!(db.list_dishes(None).unwrap().len(), 2);
        assert_eq!(db.find_dishes_by_id("B1").unwrap().len(), 2);
    }

    #[test]
    fn test_brand_case_folds_non_ascii() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_dish(&dish("Ñandú", "N1", "Empanada")).unwrap();
        assert_eq!(db.upsert_dish(&dish("ñandú", "N1", "Empanada salteña")).unwrap(), Upsert::Updated);

        let dishes = db.list_dishes(Some("ÑANDÚ")).unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].brand, "Ñandú");
        assert_eq!(dishes[0].name, "Empanada salteña");
        assert!(db.get_dish("ñandú", "N1").unwrap().is_some());
        db.delete_dish("ÑANDÚ", "N1").unwrap();
        assert_eq!(db.count_dishes().unwrap(), 0);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        for id in ["z", "a", "m"] {
            db.upsert_dish(&dish("Atomic", id, "Dish")).unwrap();
        }
        // Updating keeps the first insert position
        db.upsert_dish(&dish("Atomic", "z", "Dish again")).unwrap();
        let ids: Vec<_> = db.list_dishes(Some("Atomic")).unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_bulk_upsert_counts() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_dish(&dish("Atomic", "B1", "Burger")).unwrap();
        let (created, updated) = db
            .bulk_upsert(&[dish("Atomic", "B1", "Burger"), dish("Atomic", "B2", "Papas")])
            .unwrap();
        assert_eq!((created, updated), (1, 1));
        assert_eq!(db.count_dishes().unwrap(), 2);
    }

    fn analysis(url: &str, offset_ms: i64) -> Analysis {
        let mut a = Analysis::new(
            "Atomic".into(),
            url.into(),
            Some("Menu".into()),
            vec![MatchResult {
                candidate: CandidateItem {
                    name: "Burger".into(),
                    ..CandidateItem::default()
                },
                best_reference: Some(dish("Atomic", "B1", "Burger")),
                score: 88.4,
                status: MatchStatus::Match,
            }],
        );
        a.created_at = millis_to_datetime(1_700_000_000_000 + offset_ms);
        a
    }

    #[test]
    fn test_analysis_history() {
        let db = Database::open_in_memory().unwrap();
        let first = analysis("https://a.example", 0);
        let second = analysis("https://b.example", 1000);
        db.insert_analysis(&first).unwrap();
        db.insert_analysis(&second).unwrap();

        let summaries = db.list_analyses().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].url, "https://b.example");
        assert_eq!(summaries[0].total_results, 1);

        let loaded = db.get_analysis(&first.id.to_string()).unwrap().unwrap();
        assert_eq!(loaded.url, "https://a.example");
        assert_eq!(loaded.results, first.results);
        assert_eq!(loaded.created_at, first.created_at);

        let prefix = &second.id.to_string()[..8];
        assert_eq!(db.get_analysis(prefix).unwrap().unwrap().id, second.id);
        assert!(db.get_analysis("does-not-exist").unwrap().is_none());
    }

    #[test]
    fn test_get_analysis_treats_input_literally() {
        let db = Database::open_in_memory().unwrap();
        db.insert_analysis(&analysis("https://a.example", 0)).unwrap();

        assert!(db.get_analysis("").unwrap().is_none());
        assert!(db.get_analysis("   ").unwrap().is_none());
        assert!(db.get_analysis("%").unwrap().is_none());
        assert!(db.get_analysis("_").unwrap().is_none());
        assert!(db.get_analysis("________").unwrap().is_none());
        assert_eq!(escape_like(r"50%_a\b"), r"50\%\_a\\b");
    }

    #[test]
    fn test_trim_history() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..5 {
            db.insert_analysis(&analysis(&format!("https://{}.example", i), i * 1000)).unwrap();
        }
        assert_eq!(db.trim_history(3).unwrap(), 2);
        let urls: Vec<_> = db.list_analyses().unwrap().into_iter().map(|s| s.url).collect();
        assert_eq!(urls, vec!["https://4.example", "https://3.example", "https://2.example"]);
    }
}
