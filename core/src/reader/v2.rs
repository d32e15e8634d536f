#![deny(missing_docs)]

//! # Swagger 2.0 Reader
//!
//! Upgrades 2.0 documents into the 3.x-shaped model while reading:
//!
//! - `host`, `basePath` and `schemes` become `servers`;
//! - `in: body` parameters become request bodies (the parameter name is kept
//!   as `x-bodyName`), `in: formData` parameters become a form request body;
//! - a response `schema` becomes `content` for every `produces` type;
//! - `definitions`, `parameters`, `responses` and `securityDefinitions` become
//!   components.

use super::node::{
    as_bool, as_opt_bool, as_string, child_array, child_map, extensions, string_list,
    try_get_property, ParsingContext,
};
use super::schema::{read_primitive_keywords, read_schema};
use super::v3::{read_common, read_external_docs, read_location, read_oauth_flow, read_operation_tags, read_security_requirements};
use crate::document::{OpenApiDocument, Server};
use crate::extensions::Extensions;
use crate::models::request_body::{BODY_NAME_EXTENSION, FORM_CONTENT_TYPES};
use crate::models::{
    ApiKeyLocation, Header, MediaType, OAuthFlows, Operation, OperationType, Parameter,
    ParameterLocation, ParameterStyle, PathItem, RequestBody, Response, Schema, SchemaType,
    SecurityScheme, SecuritySchemeType,
};
use crate::reference::pointer::{child_pointer, decode_pointer_segment};
use crate::reference::{RefOr, ReferenceType};
use serde_json::{Map, Value};
use tracing::debug;

const DEFAULT_CONTENT_TYPE: &str = "application/json";
const DEFAULT_SCHEME: &str = "https";

/// Root-level defaults every operation inherits.
struct Scope<'r> {
    root_parameters: Option<&'r Map<String, Value>>,
    consumes: Vec<String>,
    produces: Vec<String>,
}

/// Parameters of a path item or operation, sorted by what they become.
#[derive(Default)]
struct SplitParameters<'r> {
    parameters: Vec<RefOr<Parameter>>,
    body: Option<RefOr<RequestBody>>,
    form: Vec<FormField<'r>>,
}

struct FormField<'r> {
    name: String,
    pointer: String,
    node: &'r Map<String, Value>,
}

/// Reads a 2.0 document root into `doc`.
pub(crate) fn read_v2(ctx: &mut ParsingContext, root: &Map<String, Value>, doc: &mut OpenApiDocument) {
    read_common(ctx, root, doc);
    doc.servers = read_servers(ctx, root);

    let scope = Scope {
        root_parameters: child_map(ctx, root, "parameters", "#"),
        consumes: string_list(ctx, root, "consumes", "#"),
        produces: string_list(ctx, root, "produces", "#"),
    };

    if let Some(definitions) = child_map(ctx, root, "definitions", "#") {
        for (name, node) in definitions {
            let schema = read_schema(ctx, node, &child_pointer("#/definitions", name));
            doc.components.schemas.insert(name.clone(), schema);
        }
    }
    read_parameter_components(ctx, &scope, doc);
    doc.components.responses = ctx.ref_or_map(root, "responses", ReferenceType::Response, "#", |ctx, map, pointer| {
        read_response(ctx, map, pointer, &scope.produces)
    });
    doc.components.security_schemes = ctx.ref_or_map(
        root,
        "securityDefinitions",
        ReferenceType::SecurityScheme,
        "#",
        read_security_scheme,
    );

    if let Some(paths) = child_map(ctx, root, "paths", "#") {
        for (path, node) in paths.iter().filter(|(key, _)| !key.starts_with("x-")) {
            let pointer = child_pointer("#/paths", path);
            let item = ctx.ref_or(node, ReferenceType::PathItem, &pointer, |ctx, map, pointer| {
                read_path_item(ctx, map, pointer, &scope)
            });
            if let Some(item) = item {
                doc.paths.insert(path.clone(), item);
            }
        }
    } else {
        ctx.report("#", "paths is required");
    }
}

/// Derives one server per scheme from `host` and `basePath`.
fn read_servers(ctx: &mut ParsingContext, root: &Map<String, Value>) -> Vec<Server> {
    let base_path = as_string(root, "basePath").unwrap_or_default();
    let Some(host) = as_string(root, "host") else {
        if base_path.is_empty() {
            return Vec::new();
        }
        return vec![Server::new(base_path)];
    };
    let mut schemes = string_list(ctx, root, "schemes", "#");
    if schemes.is_empty() {
        schemes.push(DEFAULT_SCHEME.to_string());
    }
    schemes
        .into_iter()
        .map(|scheme| Server::new(format!("{}://{}{}", scheme, host.trim_end_matches('/'), base_path)))
        .collect()
}

fn read_parameter_components(ctx: &mut ParsingContext, scope: &Scope<'_>, doc: &mut OpenApiDocument) {
    let Some(parameters) = scope.root_parameters else {
        return;
    };
    for (name, node) in parameters {
        let pointer = child_pointer("#/parameters", name);
        let Some(map) = node.as_object() else {
            ctx.report(&pointer, "expected an object");
            continue;
        };
        if let Some(raw) = as_string(map, "$ref") {
            if let Some(reference) = ctx.reference(&raw, ReferenceType::Parameter, &pointer) {
                doc.components.parameters.insert(name.clone(), RefOr::Ref(reference));
            }
            continue;
        }
        match as_string(map, "in").as_deref() {
            Some("body") => {
                let body = read_body_parameter(ctx, map, &pointer, &scope.consumes);
                doc.components.request_bodies.insert(name.clone(), RefOr::Item(body));
            }
            Some("formData") => {
                debug!(parameter = %name, "form parameter component folded into operations that use it");
            }
            _ => {
                if let Some(location) = read_location(ctx, map, &pointer) {
                    let parameter = read_parameter(ctx, map, &pointer, location);
                    doc.components.parameters.insert(name.clone(), RefOr::Item(parameter));
                }
            }
        }
    }
}

fn read_path_item(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str, scope: &Scope<'_>) -> PathItem {
    let inherited = split_parameters(ctx, map, pointer, scope, &scope.consumes);
    let mut item = PathItem {
        extensions: extensions(map),
        ..PathItem::default()
    };
    for method in OperationType::ALL {
        if let Some(node) = child_map(ctx, map, method.as_str(), pointer) {
            let operation_pointer = child_pointer(pointer, method.as_str());
            let operation = read_operation(ctx, node, &operation_pointer, scope, &inherited);
            item.operations.insert(method, operation);
        }
    }
    item.parameters = inherited.parameters;
    item
}

fn read_operation<'r>(
    ctx: &mut ParsingContext,
    map: &'r Map<String, Value>,
    pointer: &str,
    scope: &Scope<'r>,
    inherited: &SplitParameters<'r>,
) -> Operation {
    let consumes = match try_get_property(map, "consumes") {
        Some(_) => string_list(ctx, map, "consumes", pointer),
        None => scope.consumes.clone(),
    };
    let produces = match try_get_property(map, "produces") {
        Some(_) => string_list(ctx, map, "produces", pointer),
        None => scope.produces.clone(),
    };

    let mut own = split_parameters(ctx, map, pointer, scope, &consumes);
    for field in &inherited.form {
        if !own.form.iter().any(|f| f.name == field.name) {
            own.form.push(FormField {
                name: field.name.clone(),
                pointer: field.pointer.clone(),
                node: field.node,
            });
        }
    }
    let body = own.body.or_else(|| inherited.body.clone());
    let request_body = match (body, own.form.is_empty()) {
        (Some(body), true) => Some(body),
        (Some(body), false) => {
            ctx.report(pointer, "body and formData parameters cannot be combined; formData ignored");
            Some(body)
        }
        (None, false) => Some(RefOr::Item(read_form_body(ctx, &own.form, &consumes))),
        (None, true) => None,
    };

    let mut operation = Operation {
        summary: as_string(map, "summary"),
        description: as_string(map, "description"),
        external_docs: read_external_docs(ctx, map, pointer),
        operation_id: as_string(map, "operationId"),
        parameters: own.parameters,
        request_body,
        responses: ctx.ref_or_map(map, "responses", ReferenceType::Response, pointer, |ctx, map, pointer| {
            read_response(ctx, map, pointer, &produces)
        }),
        deprecated: as_bool(map, "deprecated"),
        security: read_security_requirements(ctx, map, pointer),
        extensions: extensions(map),
        ..Operation::default()
    };
    read_operation_tags(ctx, map, pointer, &mut operation);
    operation
}

fn split_parameters<'r>(
    ctx: &mut ParsingContext,
    map: &'r Map<String, Value>,
    pointer: &str,
    scope: &Scope<'r>,
    consumes: &[String],
) -> SplitParameters<'r> {
    let mut split = SplitParameters::default();
    let Some(items) = child_array(ctx, map, "parameters", pointer) else {
        return split;
    };
    let section = child_pointer(pointer, "parameters");
    for (idx, node) in items.iter().enumerate() {
        let item_pointer = child_pointer(&section, &idx.to_string());
        let Some(parameter) = node.as_object() else {
            ctx.report(&item_pointer, "expected an object");
            continue;
        };

        if let Some(raw) = as_string(parameter, "$ref") {
            let (target_name, target) = match raw.strip_prefix("#/parameters/") {
                Some(name) => {
                    let name = decode_pointer_segment(name);
                    let target = scope
                        .root_parameters
                        .and_then(|p| p.get(&name))
                        .and_then(Value::as_object);
                    (name, target)
                }
                None => (String::new(), None),
            };
            match target.and_then(|t| as_string(t, "in")).as_deref() {
                Some("body") => {
                    split.body = ctx
                        .reference(&raw, ReferenceType::RequestBody, &item_pointer)
                        .map(RefOr::Ref);
                }
                Some("formData") => {
                    if let Some(node) = target {
                        split.form.push(FormField {
                            name: as_string(node, "name").unwrap_or_default(),
                            pointer: child_pointer("#/parameters", &target_name),
                            node,
                        });
                    }
                }
                _ => {
                    if let Some(reference) = ctx.reference(&raw, ReferenceType::Parameter, &item_pointer) {
                        split.parameters.push(RefOr::Ref(reference));
                    }
                }
            }
            continue;
        }

        match as_string(parameter, "in").as_deref() {
            Some("body") => {
                let body = read_body_parameter(ctx, parameter, &item_pointer, consumes);
                split.body = Some(RefOr::Item(body));
            }
            Some("formData") => split.form.push(FormField {
                name: as_string(parameter, "name").unwrap_or_default(),
                pointer: item_pointer,
                node: parameter,
            }),
            _ => {
                if let Some(location) = read_location(ctx, parameter, &item_pointer) {
                    let parameter = read_parameter(ctx, parameter, &item_pointer, location);
                    split.parameters.push(RefOr::Item(parameter));
                }
            }
        }
    }
    split
}

/// Builds a request body from an `in: body` parameter.
fn read_body_parameter(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str, consumes: &[String]) -> RequestBody {
    let schema = match try_get_property(map, "schema") {
        Some(node) => read_schema(ctx, node, &child_pointer(pointer, "schema")),
        None => {
            ctx.report(pointer, "body parameter requires a schema");
            RefOr::Item(Schema::default())
        }
    };
    let mut content_types: Vec<&str> = consumes
        .iter()
        .map(String::as_str)
        .filter(|c| !is_form_content_type(c))
        .collect();
    if content_types.is_empty() {
        content_types.push(DEFAULT_CONTENT_TYPE);
    }

    let mut body = RequestBody {
        description: as_string(map, "description"),
        required: as_bool(map, "required"),
        extensions: extensions(map),
        ..RequestBody::default()
    };
    for content_type in content_types {
        body.content
            .insert(content_type.to_string(), MediaType::with_schema(schema.clone()));
    }
    if let Some(name) = as_string(map, "name") {
        if let Err(err) = body.extensions.insert(BODY_NAME_EXTENSION, Value::String(name)) {
            ctx.report(pointer, err.to_string());
        }
    }
    body
}

/// Builds a form request body whose object schema has one property per field.
fn read_form_body(ctx: &mut ParsingContext, fields: &[FormField<'_>], consumes: &[String]) -> RequestBody {
    let mut schema = Schema::of_type(SchemaType::OBJECT);
    let mut has_file = false;
    for field in fields {
        has_file |= as_string(field.node, "type").as_deref() == Some("file");
        let mut property = read_primitive_keywords(ctx, field.node, &field.pointer);
        property.description = as_string(field.node, "description");
        if as_bool(field.node, "required") {
            schema.required.insert(field.name.clone());
        }
        schema.properties.insert(field.name.clone(), RefOr::Item(property));
    }

    let mut content_types: Vec<String> = consumes
        .iter()
        .filter(|c| is_form_content_type(c))
        .cloned()
        .collect();
    if content_types.is_empty() {
        let index = if has_file { 1 } else { 0 };
        content_types.push(FORM_CONTENT_TYPES[index].to_string());
    }

    let mut body = RequestBody {
        required: !schema.required.is_empty(),
        ..RequestBody::default()
    };
    for content_type in content_types {
        body.content
            .insert(content_type, MediaType::with_schema(schema.clone()));
    }
    body
}

fn is_form_content_type(content_type: &str) -> bool {
    FORM_CONTENT_TYPES
        .iter()
        .any(|form| form.eq_ignore_ascii_case(content_type))
}

/// Reads a non-body parameter, mapping `collectionFormat` onto style and explode.
fn read_parameter(
    ctx: &mut ParsingContext,
    map: &Map<String, Value>,
    pointer: &str,
    location: ParameterLocation,
) -> Parameter {
    let mut parameter = Parameter::new(as_string(map, "name").unwrap_or_default(), location);
    parameter.description = as_string(map, "description");
    if let Some(required) = as_opt_bool(map, "required") {
        parameter.required = required;
    }
    parameter.allow_empty_value = as_bool(map, "allowEmptyValue");
    if try_get_property(map, "type").is_some() {
        let schema = read_primitive_keywords(ctx, map, pointer);
        let is_array = schema
            .schema_type
            .is_some_and(|t| t.contains(SchemaType::ARRAY));
        parameter.schema = Some(RefOr::Item(schema));

        let collection_format = as_string(map, "collectionFormat")
            .or_else(|| is_array.then(|| "csv".to_string()));
        if let Some(format) = collection_format {
            apply_collection_format(ctx, &mut parameter, &format, pointer);
        }
    } else {
        ctx.report(pointer, "non-body parameter requires a type");
    }
    parameter.extensions = primitive_extensions(map);
    parameter
}

fn apply_collection_format(ctx: &mut ParsingContext, parameter: &mut Parameter, format: &str, pointer: &str) {
    let (style, explode) = match format {
        "csv" if parameter.location == ParameterLocation::Query => (ParameterStyle::Form, false),
        "csv" => (ParameterStyle::Simple, false),
        "ssv" => (ParameterStyle::SpaceDelimited, false),
        "pipes" => (ParameterStyle::PipeDelimited, false),
        "multi" => (ParameterStyle::Form, true),
        other => {
            ctx.report(
                &child_pointer(pointer, "collectionFormat"),
                format!("collectionFormat '{}' has no 3.x style", other),
            );
            return;
        }
    };
    parameter.style = (style != parameter.location.default_style()).then_some(style);
    parameter.explode = (explode != (style == ParameterStyle::Form)).then_some(explode);
}

/// Extensions of a parameter or header, minus the ones folded into its schema.
fn primitive_extensions(map: &Map<String, Value>) -> Extensions {
    let mut extensions = extensions(map);
    extensions.remove("x-nullable");
    extensions
}

fn read_header(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Header {
    Header {
        description: as_string(map, "description"),
        schema: try_get_property(map, "type")
            .map(|_| RefOr::Item(read_primitive_keywords(ctx, map, pointer))),
        extensions: primitive_extensions(map),
        ..Header::default()
    }
}

fn read_response(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str, produces: &[String]) -> Response {
    let description = as_string(map, "description").unwrap_or_else(|| {
        ctx.report(pointer, "response description is required");
        String::new()
    });
    let mut response = Response::new(description);
    response.headers = ctx.ref_or_map(map, "headers", ReferenceType::Header, pointer, read_header);
    response.extensions = extensions(map);

    let schema = try_get_property(map, "schema")
        .map(|node| read_schema(ctx, node, &child_pointer(pointer, "schema")));
    if let Some(schema) = &schema {
        if produces.is_empty() {
            response
                .content
                .insert(DEFAULT_CONTENT_TYPE.to_string(), MediaType::with_schema(schema.clone()));
        }
        for content_type in produces {
            response
                .content
                .insert(content_type.clone(), MediaType::with_schema(schema.clone()));
        }
    }
    if let Some(examples) = child_map(ctx, map, "examples", pointer) {
        for (content_type, example) in examples {
            let media = response
                .content
                .entry(content_type.clone())
                .or_insert_with(|| MediaType {
                    schema: schema.clone(),
                    ..MediaType::default()
                });
            media.example = Some(example.clone());
        }
    }
    response
}

fn read_security_scheme(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> SecurityScheme {
    let mut scheme = match as_string(map, "type").as_deref() {
        Some("basic") => SecurityScheme::http("basic"),
        Some("apiKey") => {
            let location = as_string(map, "in")
                .and_then(|raw| ApiKeyLocation::parse(&raw))
                .unwrap_or_else(|| {
                    ctx.report(pointer, "apiKey scheme requires in: query or header");
                    ApiKeyLocation::Header
                });
            SecurityScheme::api_key(as_string(map, "name").unwrap_or_default(), location)
        }
        Some("oauth2") => {
            let flow = read_oauth_flow(ctx, map, pointer);
            let mut flows = OAuthFlows::default();
            match as_string(map, "flow").as_deref() {
                Some("implicit") => flows.implicit = Some(flow),
                Some("password") => flows.password = Some(flow),
                Some("application") => flows.client_credentials = Some(flow),
                Some("accessCode") => flows.authorization_code = Some(flow),
                other => ctx.report(pointer, format!("unknown oauth2 flow {:?}", other)),
            }
            SecurityScheme {
                scheme_type: SecuritySchemeType::OAuth2,
                flows: Some(flows),
                ..SecurityScheme::default()
            }
        }
        other => {
            ctx.report(pointer, format!("unknown security scheme type {:?}", other));
            SecurityScheme::default()
        }
    };
    scheme.description = as_string(map, "description");
    scheme.extensions = extensions(map);
    scheme
}
