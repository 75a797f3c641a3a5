//! Route pattern extraction utilities.

/// Collapse a request path to its route pattern for metric labels.
///
/// Task ids are replaced with `:id` so each task does not get its own
/// time series. Query strings are dropped.
pub fn route_pattern(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    if !path.starts_with('/') {
        return "/unknown".to_string();
    }

    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        ["", "api", "todos", _id] => "/api/todos/:id".to_string(),
        [""] => "/".to_string(),
        _ => segments.join("/"),
    }
}
