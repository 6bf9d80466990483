//! Catalog commands: dish CRUD and CSV import

use std::path::Path;

use colored::Colorize;
use inquire::Confirm;

use menubench::cli::DishFields;
use menubench::db::{Database, Upsert};
use menubench::error::{BenchError, Result};
use menubench::import;
use menubench::ReferenceItem;

use crate::utils::{format_prices, truncate_str, use_color};

/// Copy the flags that were given onto a dish
fn apply_fields(dish: &mut ReferenceItem, fields: DishFields) {
    if let Some(name) = fields.name {
        dish.name = name;
    }
    if let Some(category) = fields.category {
        dish.category = category;
    }
    if let Some(description) = fields.description {
        dish.description = description;
    }
    if let Some(image) = fields.image {
        dish.image = image;
    }
    if fields.full_price.is_some() {
        dish.full_price = fields.full_price;
    }
    if fields.promo_price.is_some() {
        dish.promo_price = fields.promo_price;
    }
    if fields.discount.is_some() {
        dish.discount = fields.discount;
    }
}

/// Find a dish by id, using the brand to disambiguate
fn resolve_dish(db: &Database, id: &str, brand: Option<&str>) -> Result<ReferenceItem> {
    let id = id.trim();
    if let Some(brand) = brand {
        return db
            .get_dish(brand.trim(), id)?
            .ok_or_else(|| BenchError::DishNotFound(format!("{}/{}", brand.trim(), id)));
    }

    let mut matches = db.find_dishes_by_id(id)?;
    match matches.len() {
        0 => Err(BenchError::DishNotFound(id.to_string())),
        1 => Ok(matches.remove(0)),
        _ => {
            let brands: Vec<_> = matches.iter().map(|d| d.brand.as_str()).collect();
            Err(BenchError::InvalidDish(format!(
                "id '{}' exists for several brands ({}); pass --brand",
                id,
                brands.join(", ")
            )))
        }
    }
}

pub fn cmd_dish_add(brand: String, id: String, fields: DishFields) -> Result<()> {
    let db = Database::open()?;

    let mut dish = ReferenceItem::new(brand, id, "");
    apply_fields(&mut dish, fields);
    let dish = dish.sanitized()?;

    match db.upsert_dish(&dish)? {
        Upsert::Created => println!("Added dish: {} ({}/{})", dish.name, dish.brand, dish.id),
        Upsert::Updated => println!("Replaced dish: {} ({}/{})", dish.name, dish.brand, dish.id),
    }
    Ok(())
}

pub fn cmd_dish_list(brand: Option<String>, json: bool) -> Result<()> {
    let db = Database::open()?;
    let dishes = db.list_dishes(brand.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dishes)?);
        return Ok(());
    }

    if dishes.is_empty() {
        match brand {
            Some(brand) => println!("No dishes for brand '{}'.", brand),
            None => println!("Catalog is empty. Run `mbench import <csv>` or `mbench dish add`."),
        }
        return Ok(());
    }

    let color = use_color();
    println!("\nDishes:\n");
    for dish in &dishes {
        let id = format!("{}/{}", dish.brand, dish.id);
        let id = if color { id.dimmed().to_string() } else { id };
        println!(
            "  {:<40} {:<18} {}",
            truncate_str(&dish.name, 40),
            format_prices(dish.full_price, dish.promo_price),
            id
        );
    }
    println!("\n{} dish(es)", dishes.len());
    Ok(())
}

pub fn cmd_dish_show(id: &str, brand: Option<String>, json: bool) -> Result<()> {
    let db = Database::open()?;
    let dish = resolve_dish(&db, id, brand.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dish)?);
        return Ok(());
    }

    println!("{}", dish.name.bold());
    println!("  Brand:       {}", dish.brand);
    println!("  ID:          {}", dish.id);
    if !dish.category.is_empty() {
        println!("  Category:    {}", dish.category);
    }
    if !dish.description.is_empty() {
        println!("  Description: {}", dish.description);
    }
    println!("  Price:       {}", format_prices(dish.full_price, dish.promo_price));
    if let Some(discount) = dish.discount {
        println!("  Discount:    {}%", discount);
    }
    if !dish.image.is_empty() {
        println!("  Image:       {}", dish.image);
    }
    Ok(())
}

pub fn cmd_dish_edit(id: &str, brand: Option<String>, fields: DishFields, no_promo: bool) -> Result<()> {
    let db = Database::open()?;
    let mut dish = resolve_dish(&db, id, brand.as_deref())?;

    apply_fields(&mut dish, fields);
    if no_promo {
        dish.promo_price = None;
    }
    let dish = dish.sanitized()?;

    db.update_dish(&dish)?;
    println!("Updated dish: {} ({}/{})", dish.name, dish.brand, dish.id);
    Ok(())
}

pub fn cmd_dish_delete(id: &str, brand: Option<String>, skip_confirm: bool) -> Result<()> {
    let db = Database::open()?;
    let dish = resolve_dish(&db, id, brand.as_deref())?;

    if !skip_confirm {
        let confirm = Confirm::new(&format!("Delete dish '{}' ({})?", dish.name, dish.brand))
            .with_default(false)
            .prompt()
            .map_err(|e| BenchError::ConfigError(e.to_string()))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.delete_dish(&dish.brand, &dish.id)?;
    println!("Deleted dish: {}", dish.name);
    Ok(())
}

pub fn cmd_import(path: &Path, json: bool) -> Result<()> {
    let db = Database::open()?;
    let summary = import::import_csv(&db, path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Created {}, updated {}, skipped {}. Catalog now has {} dish(es).",
        summary.created, summary.updated, summary.skipped, summary.total
    );
    if summary.skipped > 0 {
        println!("Rows without an id or brand were skipped (run with --verbose for details).");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_fields_only_touches_given_flags() {
        let mut dish = ReferenceItem::new("Atomic", "B1", "Burger");
        dish.full_price = Some(6.5);
        dish.description = "Doble carne".into();

        apply_fields(
            &mut dish,
            DishFields {
                promo_price: Some(5.9),
                name: Some("Burger Doble".into()),
                ..DishFields::default()
            },
        );

        assert_eq!(dish.name, "Burger Doble");
        assert_eq!(dish.full_price, Some(6.5));
        assert_eq!(dish.promo_price, Some(5.9));
        assert_eq!(dish.description, "Doble carne");
    }
}
