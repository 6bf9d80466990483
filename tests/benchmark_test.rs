//! End-to-end tests: competitor page in, banded matches out

use menubench::config::{ExtractionLimits, ScoringPolicy};
use menubench::{compare, compare_with, extract, extract_with, score};
use menubench::{CandidateItem, MatchStatus, ReferenceItem};

// ============================================================================
// Fixtures
// ============================================================================

const COMPETITOR_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Burger Town | Menú</title>
    <script type="application/ld+json">
    {
        "@context": "https://schema.org",
        "@type": "Menu",
        "hasMenuItem": [
            {"@type": "MenuItem", "name": "Pizza Napolitana Grande",
             "description": "Tomate fresco y albahaca",
             "offers": {"@type": "Offer", "price": "9.90", "priceCurrency": "USD"}}
        ]
    }
    </script>
    <style>.price { color: red; }</style>
</head>
<body>
    <nav><a href="/">Inicio</a></nav>
    <ul class="menu">
        <li class="menu-item">
            <img src="/img/doble.jpg">
            <h3>Doble Cheese Burger</h3>
            <p>Doble carne y queso</p>
            <span class="price">$6.20</span>
        </li>
        <li class="menu-item">
            <h3>Fries grandes</h3>
            <p>Porción para compartir</p>
            <span class="price">$2.80</span>
        </li>
        <li class="menu-item">
            <h3>Helado de chocolate</h3>
            <p>Dos bochas</p>
            <span class="price">$3.00</span>
        </li>
    </ul>
</body>
</html>
"#;

fn catalog() -> Vec<ReferenceItem> {
    let dish = |id: &str, name: &str, category: &str, description: &str, price: f64| ReferenceItem {
        category: category.to_string(),
        description: description.to_string(),
        full_price: Some(price),
        ..ReferenceItem::new("Atomic", id, name)
    };
    vec![
        dish("B1", "Hamburguesa Doble", "Hamburguesas", "Doble carne, queso cheddar y panceta", 6.5),
        dish("S1", "Papas fritas", "Acompañamientos", "Porción grande", 2.5),
        dish("P1", "Pizza Napolitana", "Pizzas", "Tomate, muzzarella y albahaca", 9.0),
    ]
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn test_page_items_in_document_order() {
    let items = extract(COMPETITOR_PAGE);
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Pizza Napolitana Grande", "Doble Cheese Burger", "Fries grandes", "Helado de chocolate"]
    );

    assert_eq!(items[0].full_price, Some(9.9));
    assert_eq!(items[1].full_price, Some(6.2));
    assert_eq!(items[1].image, "/img/doble.jpg");
    assert_eq!(items[2].description, "Porción para compartir $2.80");
}

#[test]
fn test_extraction_respects_limits() {
    let limits = ExtractionLimits {
        max_candidates: 2,
        max_blocks: 900,
    };
    assert_eq!(extract_with(COMPETITOR_PAGE, &limits).len(), 2);
}

#[test]
fn test_page_without_menu() {
    let html = "<html><head><title>Hola</title></head><body><p>Próximamente</p></body></html>";
    assert!(extract(html).is_empty());
    assert!(compare(&catalog(), &extract(html)).is_empty());
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_benchmark_bands_each_item() {
    let results = compare(&catalog(), &extract(COMPETITOR_PAGE));
    assert_eq!(results.len(), 4);

    let best: Vec<_> = results
        .iter()
        .map(|r| r.best_reference.as_ref().map(|d| d.id.as_str()))
        .collect();
    assert_eq!(best, vec![Some("P1"), Some("B1"), Some("S1"), Some("S1")]);

    let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            MatchStatus::Match,
            MatchStatus::Match,
            MatchStatus::PartialMatch,
            MatchStatus::NoMatch
        ]
    );

    for r in &results {
        assert!((0.0..=100.0).contains(&r.score));
        // One decimal place
        assert!(((r.score * 10.0).round() - r.score * 10.0).abs() < 1e-9);
    }
    assert!(results[0].score > 60.0 && results[0].score < 70.0);
    assert!(results[3].score < 10.0);
}

#[test]
fn test_empty_catalog_reports_no_match() {
    let results = compare(&[], &extract(COMPETITOR_PAGE));
    assert_eq!(results.len(), 4);
    assert!(results
        .iter()
        .all(|r| r.best_reference.is_none() && r.status == MatchStatus::NoMatch && r.score == 0.0));
}

#[test]
fn test_double_burger_scenario() {
    let reference = ReferenceItem {
        description: "carne doble con queso".into(),
        full_price: Some(6.5),
        ..ReferenceItem::new("Atomic", "B2", "Hamburguesa Doble")
    };
    let candidate = CandidateItem {
        name: "Hamburguesa Doble Clásica".into(),
        description: "doble carne y queso".into(),
        full_price: Some(6.0),
        ..CandidateItem::default()
    };

    assert!(score(&reference, &candidate) >= 0.5);
    let results = compare(&[reference], &[candidate]);
    assert_eq!(results[0].status, MatchStatus::Match);
}

#[test]
fn test_stricter_policy_changes_bands() {
    let policy = ScoringPolicy {
        match_threshold: 0.7,
        partial_threshold: 0.5,
        ..ScoringPolicy::default()
    };
    let results = compare_with(&catalog(), &extract(COMPETITOR_PAGE), &policy);
    assert_eq!(results[0].status, MatchStatus::PartialMatch);
    assert_eq!(results[2].status, MatchStatus::NoMatch);
}
