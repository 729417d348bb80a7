//! Introspection endpoints: landing page, build info, environment, headers.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use sretarget_core::SreError;

use crate::app_state::AppState;
use crate::error::HttpError;

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub commit: String,
    pub commit_short: String,
    pub build_time: String,
}

pub async fn index(State(state): State<AppState>) -> Result<Response, HttpError> {
    let html = state
        .pages()
        .render_index(state.cfg())
        .map_err(|e| SreError::Internal(format!("render index: {e}")))?;
    Ok(Html(html).into_response())
}

pub async fn version(State(state): State<AppState>) -> Json<VersionInfo> {
    let cfg = state.cfg();
    Json(VersionInfo {
        version: cfg.version.clone(),
        commit: cfg.commit.clone(),
        commit_short: cfg.commit_short.clone(),
        build_time: cfg.build_date.clone(),
    })
}

/// Full process environment, unfiltered.
///
/// This is a debugging aid and will leak secrets passed through env vars.
/// Do not expose the service publicly when that matters.
pub async fn env() -> Json<BTreeMap<String, String>> {
    let vars = std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect();
    Json(vars)
}

/// Request headers; repeated headers are joined with `,`.
pub async fn headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(collect_headers(&headers))
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            (name.as_str().to_owned(), joined)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn multi_valued_headers_are_joined() {
        let mut h = HeaderMap::new();
        h.append("x-multi", HeaderValue::from_static("a"));
        h.append("x-multi", HeaderValue::from_static("b"));
        h.insert("accept", HeaderValue::from_static("*/*"));

        let out = collect_headers(&h);
        assert_eq!(out["x-multi"], "a,b");
        assert_eq!(out["accept"], "*/*");
        assert_eq!(out.len(), 2);
    }
}
