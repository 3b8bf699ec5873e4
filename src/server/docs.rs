//! Interactive API documentation: a generated OpenAPI document plus the
//! Swagger UI and ReDoc pages that render it.

use axum::response::Html;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::config::Route;
use crate::server::types::schema;

pub const TITLE: &str = "Student Performance Prediction API";
pub const DESCRIPTION: &str = "Predicts student performance based on various factors.";
pub const VERSION: &str = "1.0.0";

fn output_key(route: Route) -> &'static str {
    match route {
        Route::PerformanceIndex => "Performance Index",
        Route::AclRisk => "ACL Risk Score",
        Route::LoadBalance => "Load Balance Score",
    }
}

fn summary(route: Route) -> &'static str {
    match route {
        Route::PerformanceIndex => "Predicts a student's performance index, rounded to 2 decimals",
        Route::AclRisk => "Predicts an ACL risk score from a fatigue score",
        Route::LoadBalance => "Predicts a training load balance score",
    }
}

fn request_schema(route: Route) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in schema(route) {
        let mut prop = json!({ "type": "number" });
        if let Some((min, max)) = field.bounds {
            prop["minimum"] = json!(min);
            prop["maximum"] = json!(max);
        }
        properties.insert(field.name.to_string(), prop);
        required.push(field.name);
    }
    json!({ "type": "object", "properties": properties, "required": required })
}

fn operation(route: Route) -> Value {
    let key = output_key(route);
    json!({
        "post": {
            "tags": ["Prediction"],
            "summary": summary(route),
            "requestBody": {
                "required": true,
                "content": { "application/json": { "schema": request_schema(route) } }
            },
            "responses": {
                "200": {
                    "description": "Successful prediction",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": { key: { "type": "number" } },
                        "required": [key]
                    } } }
                },
                "422": { "description": "Validation error" },
                "500": { "description": "Inference error" }
            }
        }
    })
}

pub fn openapi_document() -> Value {
    let mut paths = Map::new();
    paths.insert(
        "/".to_string(),
        json!({
            "get": {
                "tags": ["Docs"],
                "summary": "Root endpoint pointing at the API documentation",
                "responses": { "200": { "description": "Welcome message with documentation links" } }
            }
        }),
    );
    for route in Route::ALL {
        paths.insert(route.http_path().to_string(), operation(route));
    }

    json!({
        "openapi": "3.0.3",
        "info": { "title": TITLE, "description": DESCRIPTION, "version": VERSION },
        "paths": paths
    })
}

pub async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

pub async fn swagger_ui() -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
<title>{TITLE} - Swagger UI</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>SwaggerUIBundle({{ url: "/openapi.json", dom_id: "#swagger-ui" }});</script>
</body>
</html>"##
    ))
}

pub async fn redoc() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>{TITLE} - ReDoc</title>
</head>
<body>
<redoc spec-url="/openapi.json"></redoc>
<script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = openapi_document();
        assert_eq!(doc["info"]["title"], TITLE);
        assert_eq!(doc["info"]["version"], VERSION);
        for route in Route::ALL {
            assert!(doc["paths"][route.http_path()]["post"].is_object());
        }
        assert!(doc["paths"]["/"]["get"].is_object());
    }

    #[test]
    fn test_ranges_exported() {
        let doc = openapi_document();
        let fatigue = &doc["paths"]["/predict-ars"]["post"]["requestBody"]["content"]
            ["application/json"]["schema"]["properties"]["fatigue_score"];
        assert_eq!(fatigue["minimum"], 0.0);
        assert_eq!(fatigue["maximum"], 10.0);

        let hours = &doc["paths"]["/predict"]["post"]["requestBody"]["content"]
            ["application/json"]["schema"]["properties"]["hours_studied"];
        assert!(hours.get("minimum").is_none());
    }

    #[test]
    fn test_required_fields_in_column_order() {
        let doc = openapi_document();
        let required = &doc["paths"]["/predict-load-balance-score"]["post"]["requestBody"]
            ["content"]["application/json"]["schema"]["required"];
        assert_eq!(
            required,
            &json!([
                "training_hours_per_week",
                "recovery_days_per_week",
                "acl_risk_score"
            ])
        );
    }
}
