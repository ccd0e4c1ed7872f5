//! Display formatting in the dashboard's Italian locale style:
//! `.` groups thousands and `,` separates decimals.

/// `€1.234,56`
pub fn currency(value: f64) -> String {
    format!("€{}", localize(finite(value), 2, 2))
}

/// Grouped number with up to three decimals, trailing zeros dropped: `1.234,5`.
pub fn number(value: f64) -> String {
    localize(finite(value), 0, 3)
}

/// Fraction as a percentage with `decimals` places: `0.1234` → `12,34%`.
pub fn percentage(fraction: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", finite(fraction) * 100.0).replacen('.', ",", 1)
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn localize(value: f64, min_decimals: usize, max_decimals: usize) -> String {
    let fixed = format!("{:.max_decimals$}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_decimals {
        frac.push('0');
    }

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let negative = value < 0.0 && (int_part.chars().any(|c| c != '0') || !frac.chars().all(|c| c == '0'));
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{frac}")
    }
}
