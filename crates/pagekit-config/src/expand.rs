//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// A `$` not followed by `{` is kept as-is, so query strings such as
/// `?sig=$abc` survive. `field` names the configuration key for error
/// reporting.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let escaped = escape_bare_dollars(value);
    shellexpand::env_with_context(&escaped, |var| std::env::var(var).map(Some))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Double every `$` outside a `${...}` reference; shellexpand reads `$$`
/// as `$`.
fn escape_bare_dollars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    let mut in_reference = false;
    while let Some(c) = chars.next() {
        out.push(c);
        if in_reference {
            in_reference = c != '}';
        } else if c == '$' {
            if chars.peek() == Some(&'{') {
                in_reference = true;
            } else {
                out.push('$');
            }
        }
    }
    out
}
