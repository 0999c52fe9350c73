//! OpenAPI document assembly for registered operations.
//!
//! Operations are added as they are registered; the document types come
//! from `utoipa`.

use routekit_core::{HttpMethod, OperationRecord, SecurityRequirement, BEARER_AUTH};
use utoipa::openapi::extensions::ExtensionsBuilder;
use utoipa::openapi::path::{Operation, OperationBuilder, PathItem};
use utoipa::openapi::security::{self, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::{Components, Info, InfoBuilder, OpenApi, Paths};

/// Title, version and description of the generated document.
#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl ApiInfo {
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }
}

impl From<ApiInfo> for Info {
    fn from(info: ApiInfo) -> Self {
        InfoBuilder::new()
            .title(info.title)
            .version(info.version)
            .description(info.description)
            .build()
    }
}

/// Creates an empty document with the given info.
#[must_use]
pub fn empty_document(info: ApiInfo) -> OpenApi {
    OpenApi::new(info.into(), Paths::new())
}

/// The HTTP bearer (JWT) security scheme registered as `bearerAuth`.
#[must_use]
pub fn bearer_scheme() -> SecurityScheme {
    SecurityScheme::Http(
        HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .build(),
    )
}

/// Adds `record` to `doc`.
///
/// Returns `false` for `CONNECT`, which has no slot in an OpenAPI path item.
pub fn add_operation(doc: &mut OpenApi, record: &OperationRecord) -> bool {
    if record.method == HttpMethod::Connect {
        return false;
    }

    if record.security.iter().any(|alt| alt.contains_key(BEARER_AUTH)) {
        doc.components
            .get_or_insert_with(Components::default)
            .add_security_scheme(BEARER_AUTH, bearer_scheme());
    }

    let item = doc.paths.paths.entry(record.path.clone()).or_default();
    if let Some(slot) = operation_slot(item, record.method) {
        *slot = Some(to_operation(record));
    }
    true
}

fn operation_slot(item: &mut PathItem, method: HttpMethod) -> Option<&mut Option<Operation>> {
    match method {
        HttpMethod::Get => Some(&mut item.get),
        HttpMethod::Post => Some(&mut item.post),
        HttpMethod::Put => Some(&mut item.put),
        HttpMethod::Patch => Some(&mut item.patch),
        HttpMethod::Delete => Some(&mut item.delete),
        HttpMethod::Head => Some(&mut item.head),
        HttpMethod::Options => Some(&mut item.options),
        HttpMethod::Trace => Some(&mut item.trace),
        HttpMethod::Connect => None,
    }
}

/// Maps a record onto a `utoipa` operation.
#[must_use]
pub fn to_operation(record: &OperationRecord) -> Operation {
    let extensions = (!record.extensions.is_empty()).then(|| {
        record
            .extensions
            .iter()
            .fold(ExtensionsBuilder::new(), |builder, (key, value)| {
                builder.add(key.clone(), value.clone())
            })
            .build()
    });

    OperationBuilder::new()
        .operation_id(Some(record.operation_id.clone()))
        .summary(non_empty(&record.summary))
        .description(non_empty(&record.description))
        .tags((!record.tags.is_empty()).then(|| record.tags.clone()))
        .securities(Some(record.security.iter().map(to_requirement)))
        .extensions(extensions)
        .build()
}

fn to_requirement(alternative: &SecurityRequirement) -> security::SecurityRequirement {
    alternative
        .iter()
        .fold(security::SecurityRequirement::default(), |req, (name, scopes)| {
            req.add(name.clone(), scopes.clone())
        })
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use routekit_core::Operation as Descriptor;
    use serde_json::{json, Value};

    use super::*;

    fn doc_json(doc: &OpenApi) -> Value {
        serde_json::to_value(doc).unwrap()
    }

    #[test]
    fn authenticated_operation_registers_scheme_and_requirement() {
        let mut doc = empty_document(ApiInfo::new("test", "1.0"));
        let record = Descriptor {
            summary: "Get user".to_string(),
            tags: vec!["users".to_string()],
            requires_auth: true,
            ..Descriptor::default()
        }
        .into_record(HttpMethod::Get, "/users/{id}");

        assert!(add_operation(&mut doc, &record));

        let json = doc_json(&doc);
        let op = &json["paths"]["/users/{id}"]["get"];
        assert_eq!(op["operationId"], "get-/users/{id}");
        assert_eq!(op["summary"], "Get user");
        assert_eq!(op["tags"], json!(["users"]));
        assert_eq!(op["security"], json!([{ "bearerAuth": [] }]));
        assert_eq!(
            json["components"]["securitySchemes"]["bearerAuth"]["scheme"],
            "bearer"
        );
    }

    #[test]
    fn public_operation_keeps_empty_requirement() {
        let mut doc = empty_document(ApiInfo::new("test", "1.0"));
        let record = Descriptor::default().into_record(HttpMethod::Put, "/tenants/{id}");

        add_operation(&mut doc, &record);

        let json = doc_json(&doc);
        assert_eq!(json["paths"]["/tenants/{id}"]["put"]["security"], json!([{}]));
        assert!(json["components"].get("securitySchemes").is_none());
        assert!(json["paths"]["/tenants/{id}"]["put"].get("summary").is_none());
    }

    #[test]
    fn methods_on_one_path_share_the_item() {
        let mut doc = empty_document(ApiInfo::new("test", "1.0"));
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete] {
            let record = Descriptor::default().into_record(method, "/jobs");
            add_operation(&mut doc, &record);
        }
        let json = doc_json(&doc);
        let item = &json["paths"]["/jobs"];
        assert_eq!(item["get"]["operationId"], "get-/jobs");
        assert_eq!(item["post"]["operationId"], "post-/jobs");
        assert_eq!(item["delete"]["operationId"], "delete-/jobs");
    }

    #[test]
    fn extensions_are_passed_through() {
        let record = Descriptor {
            extensions: BTreeMap::from([("x-internal".to_string(), json!(true))]),
            ..Descriptor::default()
        }
        .into_record(HttpMethod::Get, "/metrics");

        let json = serde_json::to_value(to_operation(&record)).unwrap();
        assert_eq!(json["x-internal"], json!(true));
    }

    #[test]
    fn document_extension_keys_match_the_record() {
        let record = Descriptor {
            extensions: BTreeMap::from([
                ("internal".to_string(), json!(1)),
                ("x-a".to_string(), json!(2)),
            ]),
            ..Descriptor::default()
        }
        .into_record(HttpMethod::Get, "/e");

        let json = serde_json::to_value(to_operation(&record)).unwrap();
        for (key, value) in &record.extensions {
            assert_eq!(&json[key.as_str()], value);
        }
        assert!(json.get("internal").is_none());
    }

    #[test]
    fn connect_is_not_documented() {
        let mut doc = empty_document(ApiInfo::new("test", "1.0"));
        let record = Descriptor::default().into_record(HttpMethod::Connect, "/tunnel");
        assert!(!add_operation(&mut doc, &record));
        assert!(doc.paths.paths.is_empty());
    }
}
