//! ISO-8601 duration strings ("PT1H30M") to human-readable phrases.

/// Convert an ISO-8601 duration to a phrase like "1 hour and 30 minutes".
///
/// Absent, zero, or unparseable durations come back as `""` so callers can
/// store the result directly in a display field.
pub fn duration_to_text(duration: Option<&str>) -> String {
    let Some(raw) = duration else {
        return String::new();
    };
    let Some((hours, minutes, seconds)) = parse_iso8601(raw.trim()) else {
        return String::new();
    };

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(unit_phrase(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(unit_phrase(minutes, "minute"));
    }
    if seconds > 0 {
        parts.push(unit_phrase(seconds, "second"));
    }

    join_long_form(&parts)
}

fn unit_phrase(amount: u64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

/// Long-form conjunction join: commas between items, "and" before the last.
fn join_long_form(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

/// Parse `PnDTnHnMnS` into (hours, minutes, seconds). Days fold into hours.
fn parse_iso8601(raw: &str) -> Option<(u64, u64, u64)> {
    let rest = raw.strip_prefix('P').or_else(|| raw.strip_prefix('p'))?;

    let mut hours = 0u64;
    let mut minutes = 0u64;
    let mut seconds = 0u64;
    let mut in_time = false;
    let mut digits = String::new();

    for ch in rest.chars() {
        match ch {
            'T' | 't' => in_time = true,
            '0'..='9' => digits.push(ch),
            '.' | ',' => digits.push('.'),
            unit => {
                if digits.is_empty() {
                    return None;
                }
                // Fractional components are truncated to whole units
                let value = digits.parse::<f64>().ok()? as u64;
                digits.clear();
                match (unit.to_ascii_uppercase(), in_time) {
                    ('D', false) => hours += value * 24,
                    ('H', true) => hours += value,
                    ('M', true) => minutes += value,
                    ('S', true) => seconds += value,
                    // Year/month/week designators have no place in a recipe
                    _ => return None,
                }
            }
        }
    }

    if !digits.is_empty() {
        return None;
    }
    Some((hours, minutes, seconds))
}
