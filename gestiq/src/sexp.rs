//! S-expression helpers: plist access for config files and event
//! formatting for stdout consumers (e.g. an Emacs process filter).

use lexpr::Value;

/// Find the value following `:key` in a plist.
///
/// Handles both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
pub fn plist_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        // A dangling key has no value cell
        let Value::Cons(next) = pair.cdr() else {
            return None;
        };
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return Some(next.car());
        }
        // Step over the whole key/value pair
        current = next.cdr();
    }
    None
}

/// Render an atom as a bare string: keywords lose their colon, `nil`/`t`
/// map from booleans and the empty list.
pub fn atom_string(value: &Value) -> Option<String> {
    match value {
        Value::Keyword(v) => Some(v.to_string()),
        Value::Symbol(v) => {
            let s = v.to_string();
            Some(s.strip_prefix(':').unwrap_or(&s).to_string())
        }
        Value::String(v) => Some(v.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "t" } else { "nil" }.to_string()),
        Value::Null | Value::Nil => Some("nil".to_string()),
        _ => None,
    }
}

/// Extract a keyword value from a plist as a string.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    plist_get(value, key).and_then(atom_string)
}

/// Extract a string value from a plist.
pub fn get_string(value: &Value, key: &str) -> Option<String> {
    get_keyword(value, key)
}

/// Extract a boolean value from a plist.
/// Treats "nil" as false and anything else as true.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

/// Extract a floating-point value from a plist.
pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    match plist_get(value, key)? {
        Value::Number(n) => n.as_f64(),
        other => atom_string(other).and_then(|s| s.parse().ok()),
    }
}

/// Extract a non-negative integer value from a plist.
pub fn get_uint(value: &Value, key: &str) -> Option<u64> {
    match plist_get(value, key)? {
        Value::Number(n) => n.as_u64(),
        other => atom_string(other).and_then(|s| s.parse().ok()),
    }
}

/// Elements of a proper list, or an empty vec for `nil`/`()` and non-lists.
pub fn list_items(value: &Value) -> Vec<&Value> {
    let mut items = Vec::new();
    let mut current = value;
    while let Value::Cons(pair) = current {
        items.push(pair.car());
        current = pair.cdr();
    }
    items
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string for s-expression output.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// Format an event s-expression.  Field values are inserted verbatim.
pub fn format_event(event_type: &str, fields: &[(&str, String)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}
