// ABOUTME: Environment-provided configuration values.
// ABOUTME: Reads the blue/green target group identifiers, treating blank values as unset.

/// Environment variable holding the blue (currently live) target group.
pub const BLUE_TARGET_GROUP_ENV: &str = "BLUE_TARGET_GROUP_ARN";
/// Environment variable holding the green (newly deployed) target group.
pub const GREEN_TARGET_GROUP_ENV: &str = "GREEN_TARGET_GROUP_ARN";

/// Read a variable, mapping unset, blank, and non-UTF-8 values to `None`.
pub fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Prefer an explicit value, falling back to the environment.
pub fn explicit_or_env(explicit: Option<String>, var: &str) -> Option<String> {
    explicit
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| non_empty_var(var))
}
