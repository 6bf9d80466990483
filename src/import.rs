use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::menu::ReferenceItem;

/// One CSV row as written by catalog exports
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DishRow {
    brand: Option<String>,
    id: Option<String>,
    category: Option<String>,
    name: Option<String>,
    description: Option<String>,
    image: Option<String>,
    #[serde(alias = "full_price")]
    full_price: Option<String>,
    #[serde(alias = "promo_price")]
    promo_price: Option<String>,
    discount: Option<String>,
}

impl DishRow {
    fn is_blank(&self) -> bool {
        [
            &self.brand,
            &self.id,
            &self.category,
            &self.name,
            &self.description,
            &self.image,
            &self.full_price,
            &self.promo_price,
            &self.discount,
        ]
        .iter()
        .all(|f| f.as_deref().map_or(true, str::is_empty))
    }

    fn into_dish(self, line: u64) -> ReferenceItem {
        ReferenceItem {
            brand: self.brand.unwrap_or_default(),
            id: self.id.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            full_price: parse_number(self.full_price.as_deref(), "fullPrice", line),
            promo_price: parse_number(self.promo_price.as_deref(), "promoPrice", line),
            discount: parse_number(self.discount.as_deref(), "discount", line),
        }
    }
}

/// Accepts "5.50", "$5.50" and "5,50"
fn parse_number(value: Option<&str>, column: &str, line: u64) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    let cleaned = raw.trim_start_matches('$').trim().replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            warn!(line, column, value = raw, "unparseable number, stored as empty");
            None
        }
    }
}

/// Dishes read from a CSV source
#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub dishes: Vec<ReferenceItem>,
    /// Rows with content but no usable id or brand
    pub skipped: usize,
}

/// Outcome of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Catalog size after the import
    pub total: usize,
}

/// Parse catalog rows from any CSV reader
pub fn read_catalog<R: io::Read>(reader: R) -> Result<ParsedCatalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedCatalog::default();

    for (index, record) in csv_reader.deserialize::<DishRow>().enumerate() {
        let row = record?;
        // Header is line 1
        let line = index as u64 + 2;

        if row.is_blank() {
            continue;
        }

        match row.into_dish(line).sanitized() {
            Ok(dish) => parsed.dishes.push(dish),
            Err(e) => {
                warn!(line, error = %e, "skipping CSV row");
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

/// Upsert every valid row of a CSV reader into the catalog
pub fn import_reader<R: io::Read>(db: &Database, reader: R) -> Result<ImportSummary> {
    let parsed = read_catalog(reader)?;
    let (created, updated) = db.bulk_upsert(&parsed.dishes)?;
    let summary = ImportSummary {
        created,
        updated,
        skipped: parsed.skipped,
        total: db.count_dishes()?,
    };
    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "catalog import finished"
    );
    Ok(summary)
}

/// Import a CSV file into the catalog
pub fn import_csv(db: &Database, path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)?;
    import_reader(db, io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "brand,id,category,name,description,image,fullPrice,promoPrice,discount\n";

    #[test]
    fn test_read_catalog_rows() {
        let csv = format!(
            "{}{}{}",
            HEADER,
            "Atomic,B1,Burgers,Hamburguesa Doble,\"Doble carne, queso\",,6.50,5.90,10\n",
            " Atomic , B2 ,Sides,Papas fritas,,,$2.50,,\n"
        );
        let parsed = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.dishes.len(), 2);

        let burger = &parsed.dishes[0];
        assert_eq!(burger.description, "Doble carne, queso");
        assert_eq!(burger.full_price, Some(6.5));
        assert_eq!(burger.promo_price, Some(5.9));
        assert_eq!(burger.discount, Some(10.0));

        let fries = &parsed.dishes[1];
        assert_eq!(fries.brand, "Atomic");
        assert_eq!(fries.id, "B2");
        assert_eq!(fries.full_price, Some(2.5));
        assert_eq!(fries.promo_price, None);
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let csv = format!(
            "{}{}{}{}",
            HEADER, "Atomic,,Burgers,No id,,,,,\n", ",,,,,,,,\n", "Atomic,B3,,Wrap,,,4,,\n"
        );
        let parsed = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.dishes.len(), 1);
        assert_eq!(parsed.dishes[0].id, "B3");
    }

    #[test]
    fn test_bad_numbers_become_empty() {
        let csv = format!("{}{}", HEADER, "Atomic,B1,,Pizza,,,abc,\"5,5\",\n");
        let parsed = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(parsed.dishes[0].full_price, None);
        assert_eq!(parsed.dishes[0].promo_price, Some(5.5));
    }

    #[test]
    fn test_short_rows_and_column_order() {
        let csv = "name,id,brand\nEmpanada,E1,Atomic\n";
        let parsed = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(parsed.dishes[0].name, "Empanada");
        assert_eq!(parsed.dishes[0].brand, "Atomic");
        assert_eq!(parsed.dishes[0].full_price, None);
    }

    #[test]
    fn test_import_csv_file() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_dish(&ReferenceItem::new("Atomic", "B1", "Old name")).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}{}{}{}",
            HEADER,
            "Atomic,B1,Burgers,Hamburguesa Doble,,,6.5,,\n",
            "Atomic,B2,Sides,Papas,,,2.5,,\n",
            ",,,Sin id,,,,,\n"
        )
        .unwrap();

        let summary = import_csv(&db, file.path()).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                created: 1,
                updated: 1,
                skipped: 1,
                total: 2
            }
        );
        assert_eq!(db.get_dish("Atomic", "B1").unwrap().unwrap().name, "Hamburguesa Doble");
    }
}
