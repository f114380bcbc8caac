//! Request classification and payload scrubbing for the operation log.
//!
//! The HTTP middleware hands every `/api` request to these functions to
//! decide what kind of operation it was, which admin module it touched and
//! how the captured payloads should be stored. Everything here is pure so
//! the classification table can be tested without a server.

// ---------------------------------------------------------------------------
// Operation type constants
// ---------------------------------------------------------------------------

/// Operation types stored in `operation_logs.operation_type`.
pub mod operation_types {
    pub const QUERY: &str = "QUERY";
    pub const CREATE: &str = "CREATE";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE: &str = "DELETE";
    pub const EXPORT: &str = "EXPORT";
    pub const PROCESS: &str = "PROCESS";
    pub const IGNORE: &str = "IGNORE";
    pub const LOGIN: &str = "LOGIN";
    pub const LOGOUT: &str = "LOGOUT";

    pub const ALL: &[&str] = &[
        QUERY, CREATE, UPDATE, DELETE, EXPORT, PROCESS, IGNORE, LOGIN, LOGOUT,
    ];
}

/// Outcome stored in `operation_logs.status`.
pub mod operation_status {
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAIL: &str = "FAIL";
}

/// Username recorded when no authenticated user can be determined.
pub const ANONYMOUS: &str = "anonymous";

/// Client attribute recorded when the request does not carry it.
pub const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Module labels keyed by URL prefix. First match wins.
const MODULES: &[(&str, &str)] = &[
    ("/api/user", "User Management"),
    ("/api/role", "Role Management"),
    ("/api/permission", "Permission Management"),
    ("/api/equipment", "Equipment Management"),
    ("/api/field", "Field Management"),
    ("/api/activity", "Activity Management"),
    ("/api/alert", "Alert Management"),
    ("/api/log", "Log Management"),
    ("/api/auth", "Authentication"),
    ("/api/menu", "Menu"),
];

/// Label for paths outside every known module.
pub const OTHER_MODULE: &str = "Other";

/// Derive the operation type from the HTTP method and request path.
///
/// Path markers (login, logout, export, alert handling) take precedence
/// over the method so that e.g. `POST /api/log/export` is an export, not a
/// create.
pub fn classify_operation(method: &str, path: &str) -> &'static str {
    if path.contains("/login") {
        return operation_types::LOGIN;
    }
    if path.contains("/logout") {
        return operation_types::LOGOUT;
    }
    if path.contains("/export") {
        return operation_types::EXPORT;
    }
    if path.contains("/alert/process") {
        return operation_types::PROCESS;
    }
    if path.contains("/alert/ignore") {
        return operation_types::IGNORE;
    }
    match method.to_ascii_uppercase().as_str() {
        "POST" => operation_types::CREATE,
        "PUT" | "PATCH" => operation_types::UPDATE,
        "DELETE" => operation_types::DELETE,
        _ => operation_types::QUERY,
    }
}

/// Map a request path to the admin module it belongs to.
pub fn module_for_path(path: &str) -> &'static str {
    MODULES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, label)| *label)
        .unwrap_or(OTHER_MODULE)
}

/// Human-readable description, e.g. `"Create Field Management"`.
///
/// The verb follows the HTTP method, so `POST /api/log/export` reads
/// `"Create Log Management"` while its operation type is `EXPORT`.
pub fn describe(method: &str, module: &str) -> String {
    let verb = match method.to_ascii_uppercase().as_str() {
        "GET" => "Query",
        "POST" => "Create",
        "PUT" | "PATCH" => "Update",
        "DELETE" => "Delete",
        _ => "Operate",
    };
    format!("{verb} {module}")
}

/// Outcome for an HTTP status code: only 2xx counts as success.
pub fn status_for(http_status: u16) -> &'static str {
    if (200..300).contains(&http_status) {
        operation_status::SUCCESS
    } else {
        operation_status::FAIL
    }
}

// ---------------------------------------------------------------------------
// Client information
// ---------------------------------------------------------------------------

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    forwarded_for
        .and_then(|v| v.split(',').next())
        .or(real_ip)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Browser family from a `User-Agent` string.
///
/// Order matters: Edge and Opera both also advertise Chrome, and Chrome
/// also advertises Safari.
pub fn browser_name(user_agent: Option<&str>) -> String {
    let Some(ua) = user_agent else {
        return UNKNOWN.to_string();
    };
    let family = if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else if ua.trim().is_empty() {
        UNKNOWN
    } else {
        "Other"
    };
    family.to_string()
}

/// Operating system from `Sec-CH-UA-Platform`, falling back to the `User-Agent`.
pub fn os_name(platform: Option<&str>, user_agent: Option<&str>) -> String {
    if let Some(p) = platform.map(|p| p.trim().trim_matches('"')).filter(|p| !p.is_empty()) {
        return p.to_string();
    }
    let Some(ua) = user_agent else {
        return UNKNOWN.to_string();
    };
    let os = if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Mac OS X") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    };
    os.to_string()
}

// ---------------------------------------------------------------------------
// Payload capture
// ---------------------------------------------------------------------------

/// Keys whose values never reach the operation log.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "credential",
];

/// Redact sensitive fields from a JSON value, recursing into nested objects
/// and arrays. Key matching is case-insensitive substring matching, so
/// `newPassword` and `accessToken` are covered.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

/// Turn a captured body into the text stored in the log.
///
/// JSON bodies are redacted; anything else is kept verbatim. Empty bodies
/// yield `None`. The result is cut to `max_chars` characters.
pub fn capture_payload(raw: &[u8], max_chars: usize) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let text = match serde_json::from_slice::<serde_json::Value>(raw) {
        Ok(json) => redact_sensitive_fields(&json).to_string(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    };
    Some(truncate_chars(&text, max_chars))
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- classify_operation ---------------------------------------------------

    #[test]
    fn methods_map_to_crud_operations() {
        assert_eq!(classify_operation("GET", "/api/field/list"), operation_types::QUERY);
        assert_eq!(classify_operation("POST", "/api/field/create"), operation_types::CREATE);
        assert_eq!(classify_operation("PUT", "/api/field/update"), operation_types::UPDATE);
        assert_eq!(classify_operation("PATCH", "/api/user/1"), operation_types::UPDATE);
        assert_eq!(classify_operation("DELETE", "/api/field/delete/3"), operation_types::DELETE);
        assert_eq!(classify_operation("OPTIONS", "/api/field/list"), operation_types::QUERY);
    }

    #[test]
    fn auth_paths_win_over_method() {
        assert_eq!(classify_operation("POST", "/api/auth/login"), operation_types::LOGIN);
        assert_eq!(classify_operation("POST", "/api/auth/logout"), operation_types::LOGOUT);
    }

    #[test]
    fn export_and_alert_actions_are_recognised() {
        assert_eq!(classify_operation("POST", "/api/log/export"), operation_types::EXPORT);
        assert_eq!(classify_operation("GET", "/api/activity/export"), operation_types::EXPORT);
        assert_eq!(classify_operation("POST", "/api/alert/process"), operation_types::PROCESS);
        assert_eq!(classify_operation("POST", "/api/alert/ignore"), operation_types::IGNORE);
        assert_eq!(classify_operation("POST", "/api/alert/assign"), operation_types::CREATE);
    }

    // -- module_for_path ------------------------------------------------------

    #[test]
    fn known_prefixes_map_to_modules() {
        assert_eq!(module_for_path("/api/user/list"), "User Management");
        assert_eq!(module_for_path("/api/field/section/list"), "Field Management");
        assert_eq!(module_for_path("/api/equipment/7"), "Equipment Management");
        assert_eq!(module_for_path("/api/log/clear"), "Log Management");
    }

    #[test]
    fn unknown_prefix_is_other() {
        assert_eq!(module_for_path("/api/weather/today"), OTHER_MODULE);
        assert_eq!(module_for_path("/health"), OTHER_MODULE);
    }

    #[test]
    fn description_combines_verb_and_module() {
        assert_eq!(describe("GET", "Field Management"), "Query Field Management");
        assert_eq!(describe("put", "Role Management"), "Update Role Management");
        assert_eq!(describe("POST", "Log Management"), "Create Log Management");
        assert_eq!(describe("OPTIONS", "Other"), "Operate Other");
    }

    #[test]
    fn only_2xx_is_success() {
        assert_eq!(status_for(200), operation_status::SUCCESS);
        assert_eq!(status_for(201), operation_status::SUCCESS);
        assert_eq!(status_for(404), operation_status::FAIL);
        assert_eq!(status_for(500), operation_status::FAIL);
    }

    // -- client info ----------------------------------------------------------

    #[test]
    fn forwarded_for_first_hop_wins() {
        assert_eq!(client_ip(Some("10.0.0.1, 172.16.0.1"), Some("192.168.1.1")), "10.0.0.1");
        assert_eq!(client_ip(None, Some("192.168.1.1")), "192.168.1.1");
        assert_eq!(client_ip(None, None), UNKNOWN);
    }

    #[test]
    fn browser_detection_prefers_most_specific_family() {
        let edge = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 Chrome/120.0 Safari/537.36 Edg/120.0";
        let chrome = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
        let safari = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 Version/17.0 Safari/605.1.15";
        assert_eq!(browser_name(Some(edge)), "Edge");
        assert_eq!(browser_name(Some(chrome)), "Chrome");
        assert_eq!(browser_name(Some(safari)), "Safari");
        assert_eq!(browser_name(None), UNKNOWN);
    }

    #[test]
    fn os_prefers_client_hint() {
        assert_eq!(os_name(Some("\"Windows\""), Some("Linux")), "Windows");
        assert_eq!(os_name(None, Some("Mozilla/5.0 (X11; Linux x86_64)")), "Linux");
        assert_eq!(os_name(None, None), UNKNOWN);
    }

    // -- payload capture ------------------------------------------------------

    #[test]
    fn redacts_nested_sensitive_keys() {
        let input = serde_json::json!({
            "username": "alice",
            "password": "hunter2",
            "data": {"accessToken": "abc", "items": [{"newPassword": "x", "name": "ok"}]}
        });
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["username"], "alice");
        assert_eq!(result["password"], "[REDACTED]");
        assert_eq!(result["data"]["accessToken"], "[REDACTED]");
        assert_eq!(result["data"]["items"][0]["newPassword"], "[REDACTED]");
        assert_eq!(result["data"]["items"][0]["name"], "ok");
    }

    #[test]
    fn capture_redacts_json_and_keeps_text() {
        let json = capture_payload(br#"{"password":"p","name":"n"}"#, 1000).unwrap();
        assert!(json.contains("[REDACTED]"));
        assert!(!json.contains("\"p\""));
        assert_eq!(capture_payload(b"page=1", 1000).as_deref(), Some("page=1"));
        assert_eq!(capture_payload(b"", 1000), None);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("亩亩亩亩", 2), "亩亩...");
    }
}
