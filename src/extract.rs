use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::config::ExtractionLimits;
use crate::menu::CandidateItem;
use crate::normalize::dedup_key;

/// JSON-LD script elements, body captured
static JSONLD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*type=["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("Invalid JSON-LD regex")
});

/// Opening tag of a container that may hold one menu item.
/// Matched against ASCII-lowercased HTML.
static BLOCK_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(article|li|div|section)\b").expect("Invalid block regex")
});

static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>").expect("Invalid script/style regex")
});

/// Inline formatting tags do not break a line of text
static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(a|abbr|b|em|font|i|mark|small|strong|sub|sup|u)\b[^>]*>")
        .expect("Invalid inline tag regex")
});

/// Precompiled regex for stripping HTML tags
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").expect("Invalid HTML tag regex")
});

static LINE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\n\s*|\s{2,}").expect("Invalid line split regex")
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

/// Dollar-prefixed amount, e.g. "$5.00", "$ 12", "$7,50"
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s?(\d+[.,]?\d*)").expect("Invalid price regex")
});

static IMG_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("Invalid img regex")
});

/// Keys that enumerate menu entries on a JSON-LD node, in priority order
const MENU_KEYS: [&str; 3] = ["hasMenuSection", "hasMenuItem", "itemListElement"];

/// Shortest and longest (exclusive) line accepted as an item name
const NAME_MIN_CHARS: usize = 5;
const NAME_MAX_CHARS: usize = 90;

/// Lines after the name folded into the description
const DESCRIPTION_LINES: usize = 3;

/// Extract menu items from a page with default limits
pub fn extract(html: &str) -> Vec<CandidateItem> {
    extract_with(html, &ExtractionLimits::default())
}

/// Extract menu items from a page.
///
/// Structured data (JSON-LD) is read first, then repeated container
/// elements are mined for name/description/price lines. Items are
/// deduplicated on their normalized name and description, and the output is
/// capped at `limits.max_candidates`. A page with nothing recognisable yields
/// an empty list.
pub fn extract_with(html: &str, limits: &ExtractionLimits) -> Vec<CandidateItem> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for item in extract_jsonld_items(html) {
        if items.len() >= limits.max_candidates {
            break;
        }
        if seen.insert(dedup_key(&item.name, &item.description)) {
            items.push(item);
        }
    }
    let structured = items.len();

    let mut rejected = 0usize;
    let mut duplicates = 0usize;
    for block in find_blocks(html, limits.max_blocks) {
        if items.len() >= limits.max_candidates {
            break;
        }
        match mine_block(block) {
            Some(item) => {
                if seen.insert(dedup_key(&item.name, &item.description)) {
                    items.push(item);
                } else {
                    duplicates += 1;
                }
            }
            None => rejected += 1,
        }
    }

    debug!(
        structured,
        heuristic = items.len() - structured,
        rejected,
        duplicates,
        "extraction finished"
    );

    items
}

// ---------------------------------------------------------------------------
// Stage 1: JSON-LD menus
// ---------------------------------------------------------------------------

/// Read menu items from every JSON-LD block. Malformed blocks are skipped.
fn extract_jsonld_items(html: &str) -> Vec<CandidateItem> {
    let mut items = Vec::new();

    for caps in JSONLD_RE.captures_iter(html) {
        let text = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let parsed: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        let nodes: Vec<&Value> = match &parsed {
            Value::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };

        for node in nodes {
            let entries = MENU_KEYS
                .iter()
                .find_map(|key| node.get(key).filter(|v| is_truthy(v)));
            let entries: Vec<&Value> = match entries {
                Some(Value::Array(arr)) => arr.iter().collect(),
                Some(single) => vec![single],
                None => continue,
            };

            items.extend(entries.into_iter().filter_map(jsonld_entry_to_item));
        }
    }

    items
}

fn jsonld_entry_to_item(entry: &Value) -> Option<CandidateItem> {
    // ListItem wraps the actual thing in "item"
    let item = entry.get("item").filter(|v| is_truthy(v)).unwrap_or(entry);

    let name = value_text(item.get("name"));
    if name.is_empty() {
        return None;
    }

    let offer = match item.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };
    let price = [offer.and_then(|o| o.get("price")), item.get("price")]
        .into_iter()
        .flatten()
        .find(|v| is_truthy(v))
        .and_then(price_value);

    Some(CandidateItem {
        name,
        description: value_text(item.get("description")),
        full_price: price,
        promo_price: None,
        image: image_url(item.get("image")),
    })
}

/// JavaScript-style truthiness, as JSON-LD producers rely on it
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn price_value(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price > 0.0).then_some(price)
}

/// `image` may be a URL, a list of URLs, or an ImageObject
fn image_url(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(arr)) => image_url(arr.first()),
        Some(obj @ Value::Object(_)) => value_text(obj.get("url")),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Stage 2: heuristic block mining
// ---------------------------------------------------------------------------

/// Split the page into container blocks.
///
/// Each opening `<article|li|div|section>` is paired with the first closing
/// tag of the same name after it. Blocks do not overlap; scanning resumes
/// after the close. Nesting is not tracked.
fn find_blocks(html: &str, max_blocks: usize) -> Vec<&str> {
    // ASCII lowercasing keeps byte offsets valid for `html`
    let lower = html.to_ascii_lowercase();
    let mut blocks = Vec::new();
    let mut pos = 0;
    // Per tag, an offset past which no closing tag exists
    let mut unclosed_from: HashMap<&str, usize> = HashMap::new();

    while blocks.len() < max_blocks {
        let Some(caps) = BLOCK_OPEN_RE.captures_at(&lower, pos) else {
            break;
        };
        let (Some(open), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        pos = open.end();

        if unclosed_from.get(tag.as_str()).is_some_and(|&from| open.end() >= from) {
            continue;
        }

        let closing = format!("</{}>", tag.as_str());
        match lower[open.end()..].find(&closing) {
            Some(offset) => {
                let end = open.end() + offset + closing.len();
                blocks.push(&html[open.start()..end]);
                pos = end;
            }
            None => {
                unclosed_from.insert(tag.as_str(), open.end());
            }
        }
    }

    blocks
}

/// Turn one block into an item, or reject it for lack of signal
fn mine_block(block: &str) -> Option<CandidateItem> {
    let lines = block_lines(block);
    let name_idx = lines.iter().position(|l| looks_like_title(l))?;

    let text = lines.join(" ");
    let prices = find_prices(&text);
    if prices.is_empty() && lines.len() < 2 {
        return None;
    }

    let description = lines
        .iter()
        .skip(name_idx + 1)
        .take(DESCRIPTION_LINES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    let image = IMG_SRC_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()))
        .unwrap_or_default();

    Some(CandidateItem {
        name: lines[name_idx].clone(),
        description,
        full_price: prices.first().copied(),
        promo_price: prices.get(1).copied(),
        image,
    })
}

/// Plain-text lines of a block. Tag boundaries and runs of whitespace
/// separate lines.
fn block_lines(block: &str) -> Vec<String> {
    let text = SCRIPT_STYLE_RE.replace_all(block, "\n");
    let text = strip_inline_tags(&text);
    let text = HTML_TAG_RE.replace_all(&text, "\n");
    let text = decode_entities(&text);

    LINE_SPLIT_RE
        .split(&text)
        .map(|line| WHITESPACE_RE.replace_all(line.trim(), " ").to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Remove inline tags, keeping words on either side apart with one space.
/// No space is added next to existing whitespace, so runs of two or more
/// spaces still mean a line break.
fn strip_inline_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for tag in INLINE_TAG_RE.find_iter(text) {
        out.push_str(&text[last..tag.start()]);
        last = tag.end();

        let before = out.chars().next_back();
        let after = text[tag.end()..].chars().next();
        let joins_words = matches!((before, after), (Some(b), Some(a)) if !b.is_whitespace() && !a.is_whitespace());
        if joins_words {
            out.push(' ');
        }
    }
    out.push_str(&text[last..]);
    out
}

fn looks_like_title(line: &str) -> bool {
    let len = line.chars().count();
    line.chars().any(|c| c.is_ascii_alphabetic()) && (NAME_MIN_CHARS..NAME_MAX_CHARS).contains(&len)
}

/// Every positive dollar amount in the text, in order
fn find_prices(text: &str) -> Vec<f64> {
    PRICE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().replacen(',', ".", 1).parse::<f64>().ok())
        .filter(|p| *p > 0.0)
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Get the page title from HTML
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;
    document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(""))
        .map(|t| WHITESPACE_RE.replace_all(t.trim(), " ").to_string())
        .filter(|t| !t.is_empty())
}
