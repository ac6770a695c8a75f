//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Parse a fraction from the environment and clamp it to `[0.0, 1.0]`.
///
/// Out-of-range values are clamped with a warning rather than rejected.
pub fn env_fraction_with_default(var: &str, default: f64) -> f64 {
    let raw = env_parse_with_default(var, default);
    let clamped = if raw.is_nan() { default } else { raw.clamp(0.0, 1.0) };
    if (clamped - raw).abs() > f64::EPSILON || raw.is_nan() {
        tracing::warn!(var, value = raw, clamped, "fraction clamped to [0.0, 1.0]");
    }
    clamped
}

/// Read a string variable, treating empty values as unset.
#[must_use]
pub fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
