//! Shared output helpers for the CLI

use colored::Colorize;

use menubench::MatchStatus;

/// Whether stdout is a terminal that can show colors
pub fn use_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Truncate a string to max_len characters (not bytes), adding "..." if truncated.
/// Safe for non-ASCII content (accents, emoji, etc).
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        chars[..max_len].iter().collect()
    } else {
        format!("{}...", chars[..max_len - 3].iter().collect::<String>())
    }
}

/// "$6.50", or "-" when unknown
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => "-".to_string(),
    }
}

/// Regular price with the promo price after it when there is one
pub fn format_prices(full: Option<f64>, promo: Option<f64>) -> String {
    match promo {
        Some(_) => format!("{} (promo {})", format_price(full), format_price(promo)),
        None => format_price(full),
    }
}

/// Status label, colored on terminals
pub fn status_badge(status: MatchStatus, color: bool) -> String {
    let label = status.to_string();
    if !color {
        return format!("[{}]", label);
    }
    match status {
        MatchStatus::Match => label.green().bold().to_string(),
        MatchStatus::PartialMatch => label.yellow().to_string(),
        MatchStatus::NoMatch => label.red().to_string(),
    }
}
