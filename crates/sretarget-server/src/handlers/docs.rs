//! Self-description: OpenAPI 3.0.3 document and the Swagger UI page.

use axum::{extract::State, response::Html, Json};
use serde_json::{json, Map, Value};

use crate::app_state::AppState;
use crate::config::ServiceConfig;
use crate::pages::SWAGGER_HTML;

pub const OPENAPI_VERSION: &str = "3.0.3";

pub async fn openapi(State(state): State<AppState>) -> Json<Value> {
    Json(openapi_document(state.cfg()))
}

pub async fn swagger() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

fn or_dev(v: &str) -> &str {
    if v.is_empty() {
        "dev"
    } else {
        v
    }
}

fn simple_get(summary: &str, description: &str) -> Value {
    json!({
        "get": {
            "summary": summary,
            "responses": { "200": { "description": description } }
        }
    })
}

fn simple_put(summary: &str, description: &str) -> Value {
    json!({
        "put": {
            "summary": summary,
            "responses": { "200": { "description": description } }
        }
    })
}

/// Document describing every route the router serves.
pub fn openapi_document(cfg: &ServiceConfig) -> Value {
    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "SRE Control Plane Backend",
            "version": or_dev(&cfg.version),
            "description": "Reference service exposing health probes, chaos endpoints, and metrics.",
            "x-commit": or_dev(&cfg.commit),
            "x-commit-short": cfg.commit_short,
            "x-build-date": cfg.build_date
        },
        "servers": [{ "url": format!("http://localhost:{}", cfg.listen_port) }],
        "paths": Value::Object(paths())
    })
}

// Built entry by entry; one giant json! literal trips the macro recursion limit.
fn paths() -> Map<String, Value> {
    let mut p = Map::new();
    let mut add = |path: &str, item: Value| {
        p.insert(path.to_owned(), item);
    };

    add(
        "/",
        json!({
            "get": {
                "summary": "HTML landing page",
                "description": "Returns a static HTML page describing the service.",
                "responses": { "200": { "description": "Rendered HTML" } }
            }
        }),
    );
    add("/healthz", simple_get("Health check", "Service is healthy"));
    add(
        "/readyz",
        json!({
            "get": {
                "summary": "Readiness probe",
                "responses": {
                    "200": { "description": "Service ready" },
                    "503": { "description": "Service not ready" }
                }
            }
        }),
    );
    add("/readyz/enable", simple_put("Enable readiness", "Readiness enabled"));
    add("/readyz/disable", simple_put("Disable readiness", "Readiness disabled"));
    add(
        "/livez",
        json!({
            "get": {
                "summary": "Liveness probe",
                "responses": {
                    "200": { "description": "Service live" },
                    "503": { "description": "Service not live" }
                }
            }
        }),
    );
    add("/livez/enable", simple_put("Enable liveness", "Liveness enabled"));
    add("/livez/disable", simple_put("Disable liveness", "Liveness disabled"));
    add("/version", simple_get("Service version", "Version info"));
    add(
        "/env",
        json!({
            "get": {
                "summary": "Environment variables",
                "description": "Unfiltered process environment. Sensitive; debugging aid only.",
                "responses": { "200": { "description": "Environment map" } }
            }
        }),
    );
    add("/headers", simple_get("Echo request headers", "Headers"));
    add(
        "/echo",
        json!({
            "post": {
                "summary": "Echo request body",
                "requestBody": {
                    "description": "Arbitrary payload (up to 1 MiB) that will be echoed back",
                    "required": false
                },
                "responses": {
                    "200": { "description": "Payload echoed" },
                    "204": { "description": "Empty payload" },
                    "413": { "description": "Payload over 1 MiB" }
                }
            }
        }),
    );
    add(
        "/status/{code}",
        json!({
            "get": {
                "summary": "Return arbitrary HTTP status",
                "parameters": [{
                    "name": "code",
                    "in": "path",
                    "required": true,
                    "schema": { "type": "integer", "minimum": 100, "maximum": 599 }
                }],
                "responses": {
                    "default": { "description": "Requested status returned" },
                    "400": { "description": "Code outside [100, 599]" }
                }
            }
        }),
    );
    add(
        "/delay/{seconds}",
        json!({
            "get": {
                "summary": "Delay response by N seconds",
                "parameters": [{
                    "name": "seconds",
                    "in": "path",
                    "required": true,
                    "schema": { "type": "number", "minimum": 0 }
                }],
                "responses": {
                    "200": { "description": "Delay acknowledged" },
                    "400": { "description": "Invalid delay" }
                }
            }
        }),
    );
    add(
        "/panic",
        simple_get(
            "Terminate process with exit code 255",
            "Process termination initiated",
        ),
    );
    add("/metrics", simple_get("Prometheus metrics", "Prometheus text exposition"));
    add("/openapi", simple_get("OpenAPI specification", "OpenAPI document"));
    add("/swagger", simple_get("Swagger UI", "Swagger UI HTML"));

    p
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn info_fields_follow_config() {
        let cfg = ServiceConfig {
            version: String::new(),
            commit: String::new(),
            commit_short: "deadbee".into(),
            ..ServiceConfig::default()
        };
        let doc = openapi_document(&cfg);
        assert_eq!(doc["openapi"], "3.0.3");
        assert_eq!(doc["info"]["version"], "dev");
        assert_eq!(doc["info"]["x-commit"], "dev");
        assert_eq!(doc["info"]["x-commit-short"], "deadbee");
    }

    #[test]
    fn documents_every_route() {
        let doc = openapi_document(&ServiceConfig::default());
        let paths = doc["paths"].as_object().map(|p| p.len()).unwrap_or(0);
        assert_eq!(paths, 18);
        assert!(doc["paths"]["/status/{code}"]["get"].is_object());
        assert!(doc["paths"]["/readyz/disable"]["put"].is_object());
    }
}
