use std::str::FromStr;
use std::time::Duration;

/// A duration written like `30s`, `2m`, or `1m30s`; a bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut digits = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let multiplier = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            if digits.is_empty() {
                return Err(format!("Missing number before '{}'", c));
            }
            let value = parse_count(&digits)?;
            total_seconds = value
                .checked_mul(multiplier)
                .and_then(|seconds| total_seconds.checked_add(seconds))
                .ok_or_else(too_large)?;
            digits.clear();
            seen_number = true;
        }

        if !digits.is_empty() {
            total_seconds = total_seconds
                .checked_add(parse_count(&digits)?)
                .ok_or_else(too_large)?;
            seen_number = true;
        }

        if !seen_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

fn parse_count(digits: &str) -> Result<u64, String> {
    digits.parse().map_err(|_| too_large())
}

fn too_large() -> String {
    "Duration is too large".to_string()
}
