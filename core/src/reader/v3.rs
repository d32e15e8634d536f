#![deny(missing_docs)]

//! # OpenAPI 3.x Reader
//!
//! Maps 3.0 and 3.1 nodes onto the object model. Objects that 2.0 shares
//! (info, tags, security requirements) are read here and reused by the
//! 2.0 reader.

use super::node::{
    as_bool, as_opt_bool, as_string, child_array, child_map, extensions, string_list, string_map,
    try_get_property, ParsingContext,
};
use super::schema::read_schema;
use crate::document::{ExternalDocs, Info, OpenApiDocument, Server};
use crate::models::{
    ApiKeyLocation, Callback, Components, Encoding, Example, Header, Link, MediaType, OAuthFlow,
    OAuthFlows, Operation, OperationType, Parameter, ParameterLocation, ParameterStyle, PathItem,
    RequestBody, Response, SecurityRequirement, SecurityScheme, SecuritySchemeType, Tag,
};
use crate::reference::pointer::child_pointer;
use crate::reference::{RefOr, ReferenceType};
use crate::version::SpecVersion;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Reads a 3.x document root into `doc`.
pub(crate) fn read_v3(ctx: &mut ParsingContext, root: &Map<String, Value>, doc: &mut OpenApiDocument) {
    read_common(ctx, root, doc);
    doc.servers = read_servers(ctx, root, "#");
    doc.paths = ctx.ref_or_map(root, "paths", ReferenceType::PathItem, "#", read_path_item);
    if ctx.version == SpecVersion::OpenApi3_1 {
        doc.webhooks = ctx.ref_or_map(root, "webhooks", ReferenceType::PathItem, "#", read_path_item);
    } else if root.contains_key("webhooks") {
        ctx.report("#/webhooks", "webhooks require OpenAPI 3.1");
    }
    if let Some(components) = child_map(ctx, root, "components", "#") {
        doc.components = read_components(ctx, components, "#/components");
    }
}

/// Reads the root fields every version shares.
pub(crate) fn read_common(ctx: &mut ParsingContext, root: &Map<String, Value>, doc: &mut OpenApiDocument) {
    match child_map(ctx, root, "info", "#") {
        Some(info) => doc.info = read_info(ctx, info, "#/info"),
        None => ctx.report("#", "info is required"),
    }
    doc.security = read_security_requirements(ctx, root, "#");
    if let Some(tags) = child_array(ctx, root, "tags", "#") {
        doc.tags = tags
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| {
                let pointer = child_pointer("#/tags", &idx.to_string());
                match node.as_object() {
                    Some(tag) => Some(read_tag(ctx, tag, &pointer)),
                    None => {
                        ctx.report(&pointer, "expected an object");
                        None
                    }
                }
            })
            .collect();
    }
    doc.external_docs = read_external_docs(ctx, root, "#");
    doc.extensions = extensions(root);
}

fn read_info(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Info {
    let title = as_string(map, "title").unwrap_or_else(|| {
        ctx.report(pointer, "info.title is required");
        String::new()
    });
    let version = as_string(map, "version").unwrap_or_else(|| {
        ctx.report(pointer, "info.version is required");
        String::new()
    });
    Info {
        title,
        version,
        description: as_string(map, "description"),
        terms_of_service: as_string(map, "termsOfService"),
        extensions: extensions(map),
    }
}

fn read_tag(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Tag {
    let name = as_string(map, "name").unwrap_or_else(|| {
        ctx.report(pointer, "tag name is required");
        String::new()
    });
    Tag {
        name,
        description: as_string(map, "description"),
        external_docs: read_external_docs(ctx, map, pointer),
        extensions: extensions(map),
    }
}

/// Reads the optional `externalDocs` property of `map`.
pub(crate) fn read_external_docs(
    ctx: &mut ParsingContext,
    map: &Map<String, Value>,
    pointer: &str,
) -> Option<ExternalDocs> {
    let docs = child_map(ctx, map, "externalDocs", pointer)?;
    Some(ExternalDocs {
        url: as_string(docs, "url").unwrap_or_default(),
        description: as_string(docs, "description"),
        extensions: extensions(docs),
    })
}

fn read_server(map: &Map<String, Value>) -> Server {
    Server {
        url: as_string(map, "url").unwrap_or_default(),
        description: as_string(map, "description"),
        extensions: extensions(map),
    }
}

fn read_servers(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Vec<Server> {
    child_array(ctx, map, "servers", pointer)
        .map(|servers| servers.iter().filter_map(Value::as_object).map(read_server).collect())
        .unwrap_or_default()
}

/// Reads the optional `security` array of `map`. An empty array is kept.
pub(crate) fn read_security_requirements(
    ctx: &mut ParsingContext,
    map: &Map<String, Value>,
    pointer: &str,
) -> Option<Vec<SecurityRequirement>> {
    let entries = child_array(ctx, map, "security", pointer)?;
    let section = child_pointer(pointer, "security");
    let mut requirements = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        let entry_pointer = child_pointer(&section, &idx.to_string());
        let Some(schemes) = entry.as_object() else {
            ctx.report(&entry_pointer, "expected an object");
            continue;
        };
        let mut requirement = SecurityRequirement::new();
        for (name, scopes) in schemes {
            let scopes: Vec<String> = scopes
                .as_array()
                .map(|s| s.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            if let Some(scheme) = ctx.reference(name, ReferenceType::SecurityScheme, &entry_pointer) {
                requirement.insert(scheme, scopes);
            }
        }
        requirements.push(requirement);
    }
    Some(requirements)
}

/// Reads the `tags` name list of an operation as tag references.
pub(crate) fn read_operation_tags(
    ctx: &mut ParsingContext,
    map: &Map<String, Value>,
    pointer: &str,
    operation: &mut Operation,
) {
    let tag_pointer = child_pointer(pointer, "tags");
    for name in string_list(ctx, map, "tags", pointer) {
        if let Some(tag) = ctx.reference(&name, ReferenceType::Tag, &tag_pointer) {
            operation.tags.push(tag);
        }
    }
}

fn read_components(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Components {
    let mut components = Components {
        responses: ctx.ref_or_map(map, "responses", ReferenceType::Response, pointer, read_response),
        parameters: ctx.ref_or_map(map, "parameters", ReferenceType::Parameter, pointer, read_parameter),
        examples: ctx.ref_or_map(map, "examples", ReferenceType::Example, pointer, read_example),
        request_bodies: ctx.ref_or_map(map, "requestBodies", ReferenceType::RequestBody, pointer, read_request_body),
        headers: ctx.ref_or_map(map, "headers", ReferenceType::Header, pointer, read_header),
        security_schemes: ctx.ref_or_map(
            map,
            "securitySchemes",
            ReferenceType::SecurityScheme,
            pointer,
            read_security_scheme,
        ),
        links: ctx.ref_or_map(map, "links", ReferenceType::Link, pointer, read_link),
        callbacks: ctx.ref_or_map(map, "callbacks", ReferenceType::Callback, pointer, read_callback),
        extensions: extensions(map),
        ..Components::default()
    };
    if let Some(schemas) = child_map(ctx, map, "schemas", pointer) {
        let section = child_pointer(pointer, "schemas");
        for (name, node) in schemas {
            let schema = read_schema(ctx, node, &child_pointer(&section, name));
            components.schemas.insert(name.clone(), schema);
        }
    }
    if ctx.version == SpecVersion::OpenApi3_1 {
        components.path_items = ctx.ref_or_map(map, "pathItems", ReferenceType::PathItem, pointer, read_path_item);
    }
    components
}

fn read_path_item(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> PathItem {
    let mut item = PathItem {
        summary: as_string(map, "summary"),
        description: as_string(map, "description"),
        servers: read_servers(ctx, map, pointer),
        parameters: read_parameter_list(ctx, map, pointer),
        extensions: extensions(map),
        ..PathItem::default()
    };
    for method in OperationType::ALL {
        if let Some(node) = child_map(ctx, map, method.as_str(), pointer) {
            let operation = read_operation(ctx, node, &child_pointer(pointer, method.as_str()));
            item.operations.insert(method, operation);
        }
    }
    item
}

fn read_operation(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Operation {
    let mut operation = Operation {
        summary: as_string(map, "summary"),
        description: as_string(map, "description"),
        external_docs: read_external_docs(ctx, map, pointer),
        operation_id: as_string(map, "operationId"),
        parameters: read_parameter_list(ctx, map, pointer),
        responses: ctx.ref_or_map(map, "responses", ReferenceType::Response, pointer, read_response),
        callbacks: ctx.ref_or_map(map, "callbacks", ReferenceType::Callback, pointer, read_callback),
        deprecated: as_bool(map, "deprecated"),
        security: read_security_requirements(ctx, map, pointer),
        servers: read_servers(ctx, map, pointer),
        extensions: extensions(map),
        ..Operation::default()
    };
    read_operation_tags(ctx, map, pointer, &mut operation);
    if let Some(body) = try_get_property(map, "requestBody") {
        let body_pointer = child_pointer(pointer, "requestBody");
        operation.request_body = ctx.ref_or(body, ReferenceType::RequestBody, &body_pointer, read_request_body);
    }
    operation
}

fn read_parameter_list(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Vec<RefOr<Parameter>> {
    let Some(items) = child_array(ctx, map, "parameters", pointer) else {
        return Vec::new();
    };
    let section = child_pointer(pointer, "parameters");
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| {
            let item_pointer = child_pointer(&section, &idx.to_string());
            ctx.ref_or(node, ReferenceType::Parameter, &item_pointer, read_parameter)
        })
        .collect()
}

/// Reads the location of a parameter (`in`), reporting unknown values.
pub(crate) fn read_location(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Option<ParameterLocation> {
    let raw = as_string(map, "in");
    let location = raw.as_deref().and_then(ParameterLocation::parse);
    if location.is_none() {
        ctx.report(pointer, format!("unsupported parameter location {:?}", raw));
    }
    location
}

fn read_parameter(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Parameter {
    let name = as_string(map, "name").unwrap_or_default();
    let location = read_location(ctx, map, pointer).unwrap_or(ParameterLocation::Query);
    let mut parameter = Parameter::new(name, location);
    parameter.description = as_string(map, "description");
    if let Some(required) = as_opt_bool(map, "required") {
        parameter.required = required;
    }
    parameter.deprecated = as_bool(map, "deprecated");
    parameter.allow_empty_value = as_bool(map, "allowEmptyValue");
    parameter.style = as_string(map, "style").and_then(|raw| {
        let style = ParameterStyle::parse(&raw);
        if style.is_none() {
            ctx.report(&child_pointer(pointer, "style"), format!("unknown style '{}'", raw));
        }
        style
    });
    parameter.explode = as_opt_bool(map, "explode");
    parameter.allow_reserved = as_bool(map, "allowReserved");
    if let Some(schema) = try_get_property(map, "schema") {
        parameter.schema = Some(read_schema(ctx, schema, &child_pointer(pointer, "schema")));
    }
    parameter.example = try_get_property(map, "example").cloned();
    parameter.examples = ctx.ref_or_map(map, "examples", ReferenceType::Example, pointer, read_example);
    parameter.content = read_content(ctx, map, pointer);
    parameter.extensions = extensions(map);
    parameter
}

fn read_header(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Header {
    Header {
        description: as_string(map, "description"),
        required: as_bool(map, "required"),
        deprecated: as_bool(map, "deprecated"),
        explode: as_opt_bool(map, "explode"),
        schema: try_get_property(map, "schema")
            .map(|schema| read_schema(ctx, schema, &child_pointer(pointer, "schema"))),
        example: try_get_property(map, "example").cloned(),
        examples: ctx.ref_or_map(map, "examples", ReferenceType::Example, pointer, read_example),
        content: read_content(ctx, map, pointer),
        extensions: extensions(map),
    }
}

/// Reads an Example object.
pub(crate) fn read_example(_ctx: &mut ParsingContext, map: &Map<String, Value>, _pointer: &str) -> Example {
    Example {
        summary: as_string(map, "summary"),
        description: as_string(map, "description"),
        value: try_get_property(map, "value").cloned(),
        external_value: as_string(map, "externalValue"),
        extensions: extensions(map),
    }
}

fn read_content(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> IndexMap<String, MediaType> {
    let Some(entries) = child_map(ctx, map, "content", pointer) else {
        return IndexMap::new();
    };
    let section = child_pointer(pointer, "content");
    let mut content = IndexMap::new();
    for (content_type, node) in entries {
        let entry_pointer = child_pointer(&section, content_type);
        match node.as_object() {
            Some(media) => {
                content.insert(content_type.clone(), read_media_type(ctx, media, &entry_pointer));
            }
            None => ctx.report(&entry_pointer, "expected an object"),
        }
    }
    content
}

fn read_media_type(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> MediaType {
    let mut media = MediaType {
        schema: try_get_property(map, "schema")
            .map(|schema| read_schema(ctx, schema, &child_pointer(pointer, "schema"))),
        example: try_get_property(map, "example").cloned(),
        examples: ctx.ref_or_map(map, "examples", ReferenceType::Example, pointer, read_example),
        extensions: extensions(map),
        ..MediaType::default()
    };
    if let Some(encodings) = child_map(ctx, map, "encoding", pointer) {
        let section = child_pointer(pointer, "encoding");
        for (property, node) in encodings {
            let Some(encoding) = node.as_object() else {
                continue;
            };
            let encoding_pointer = child_pointer(&section, property);
            media.encoding.insert(property.clone(), read_encoding(ctx, encoding, &encoding_pointer));
        }
    }
    media
}

fn read_encoding(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Encoding {
    Encoding {
        content_type: as_string(map, "contentType"),
        headers: ctx.ref_or_map(map, "headers", ReferenceType::Header, pointer, read_header),
        style: as_string(map, "style"),
        explode: as_opt_bool(map, "explode"),
        allow_reserved: as_bool(map, "allowReserved"),
        extensions: extensions(map),
    }
}

fn read_request_body(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> RequestBody {
    RequestBody {
        description: as_string(map, "description"),
        content: read_content(ctx, map, pointer),
        required: as_bool(map, "required"),
        extensions: extensions(map),
    }
}

fn read_response(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Response {
    let description = as_string(map, "description").unwrap_or_else(|| {
        ctx.report(pointer, "response description is required");
        String::new()
    });
    Response {
        description,
        headers: ctx.ref_or_map(map, "headers", ReferenceType::Header, pointer, read_header),
        content: read_content(ctx, map, pointer),
        links: ctx.ref_or_map(map, "links", ReferenceType::Link, pointer, read_link),
        extensions: extensions(map),
    }
}

fn read_link(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Link {
    Link {
        operation_ref: as_string(map, "operationRef"),
        operation_id: as_string(map, "operationId"),
        parameters: child_map(ctx, map, "parameters", pointer)
            .map(|p| p.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
        request_body: try_get_property(map, "requestBody").cloned(),
        description: as_string(map, "description"),
        server: child_map(ctx, map, "server", pointer).map(read_server),
        extensions: extensions(map),
    }
}

fn read_callback(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Callback {
    let mut callback = Callback {
        extensions: extensions(map),
        ..Callback::default()
    };
    for (expression, node) in map.iter().filter(|(key, _)| !key.starts_with("x-")) {
        let entry_pointer = child_pointer(pointer, expression);
        if let Some(item) = ctx.ref_or(node, ReferenceType::PathItem, &entry_pointer, read_path_item) {
            callback.expressions.insert(expression.clone(), item);
        }
    }
    callback
}

fn read_security_scheme(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> SecurityScheme {
    let raw_type = as_string(map, "type");
    let scheme_type = raw_type
        .as_deref()
        .and_then(SecuritySchemeType::parse)
        .unwrap_or_else(|| {
            ctx.report(pointer, format!("unknown security scheme type {:?}", raw_type));
            SecuritySchemeType::default()
        });
    SecurityScheme {
        scheme_type,
        description: as_string(map, "description"),
        name: as_string(map, "name"),
        location: as_string(map, "in").and_then(|raw| ApiKeyLocation::parse(&raw)),
        scheme: as_string(map, "scheme"),
        bearer_format: as_string(map, "bearerFormat"),
        flows: child_map(ctx, map, "flows", pointer)
            .map(|flows| read_oauth_flows(ctx, flows, &child_pointer(pointer, "flows"))),
        open_id_connect_url: as_string(map, "openIdConnectUrl"),
        extensions: extensions(map),
    }
}

fn read_oauth_flows(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> OAuthFlows {
    let mut flow = |key: &str| {
        child_map(ctx, map, key, pointer).map(|node| read_oauth_flow(ctx, node, &child_pointer(pointer, key)))
    };
    OAuthFlows {
        implicit: flow("implicit"),
        password: flow("password"),
        client_credentials: flow("clientCredentials"),
        authorization_code: flow("authorizationCode"),
        extensions: extensions(map),
    }
}

/// Reads an OAuth flow; 2.0 security definitions carry the same fields inline.
pub(crate) fn read_oauth_flow(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> OAuthFlow {
    OAuthFlow {
        authorization_url: as_string(map, "authorizationUrl"),
        token_url: as_string(map, "tokenUrl"),
        refresh_url: as_string(map, "refreshUrl"),
        scopes: string_map(ctx, map, "scopes", pointer),
        extensions: extensions(map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchemaType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn read(node: Value) -> (OpenApiDocument, ParsingContext) {
        let mut doc = OpenApiDocument::new("", "");
        let mut ctx = ParsingContext::new(SpecVersion::OpenApi3_0, doc.id());
        read_v3(&mut ctx, node.as_object().unwrap(), &mut doc);
        (doc, ctx)
    }

    #[test]
    fn test_reads_operation_tree() {
        let (doc, ctx) = read(json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": {
                "/pets/{id}": {
                    "parameters": [{"$ref": "#/components/parameters/Id"}],
                    "get": {
                        "tags": ["pets"],
                        "operationId": "getPet",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                            }
                        },
                        "security": []
                    }
                }
            },
            "components": {
                "parameters": {"Id": {"name": "id", "in": "path", "schema": {"type": "string"}}},
                "schemas": {"Pet": {"type": "object"}}
            }
        }));
        assert!(ctx.diagnostics.is_empty(), "{:?}", ctx.diagnostics);
        assert_eq!(doc.info.title, "Pets");

        let item = doc.paths["/pets/{id}"].as_item().unwrap();
        assert_eq!(item.parameters[0].as_reference().unwrap().id(), Some("Id"));
        let operation = &item.operations[&OperationType::Get];
        assert_eq!(operation.tags[0].id(), Some("pets"));
        assert_eq!(operation.security, Some(Vec::new()));

        let parameter = doc.components.parameters["Id"].as_item().unwrap();
        assert!(parameter.required);
        let resolver = doc.resolver();
        let schema = operation.responses["200"].effective(&resolver).unwrap().content["application/json"]
            .schema
            .as_ref()
            .unwrap()
            .effective(&resolver)
            .unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::OBJECT));
    }

    #[test]
    fn test_reads_security_schemes() {
        let (doc, _) = read(json!({
            "openapi": "3.0.0",
            "info": {"title": "Auth", "version": "1.0"},
            "paths": {},
            "security": [{"petstore_auth": ["read:pets"]}],
            "components": {
                "securitySchemes": {
                    "petstore_auth": {
                        "type": "oauth2",
                        "flows": {"implicit": {"authorizationUrl": "https://auth.example.com", "scopes": {"read:pets": "read"}}}
                    }
                }
            }
        }));
        let scheme = doc.components.security_schemes["petstore_auth"].as_item().unwrap();
        assert_eq!(scheme.scheme_type, SecuritySchemeType::OAuth2);
        let flows = scheme.flows.as_ref().unwrap();
        assert_eq!(flows.implicit.as_ref().unwrap().scopes["read:pets"], "read");

        let security = doc.security.as_ref().unwrap();
        let (reference, scopes) = security[0].iter().next().unwrap();
        assert_eq!(reference.id(), Some("petstore_auth"));
        assert_eq!(scopes, ["read:pets".to_string()]);
    }

    #[test]
    fn test_missing_info_reported() {
        let (_, ctx) = read(json!({"openapi": "3.0.0", "paths": {}}));
        assert_eq!(ctx.diagnostics[0].message, "info is required");
    }
}
