use oas_model::{read_document, OpenApiDocument, ReaderSettings, SpecVersion, WriterSettings};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_log::test;

fn read(text: &str) -> OpenApiDocument {
    let result = read_document(text, &ReaderSettings::default()).unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    result.document
}

fn write(doc: &OpenApiDocument, version: SpecVersion) -> Value {
    doc.to_value(version, WriterSettings::default()).unwrap()
}

fn rewrite(doc: &OpenApiDocument, via: SpecVersion) -> OpenApiDocument {
    let text = doc.to_json_string(via, WriterSettings::default()).unwrap();
    read(&text)
}

fn with_schemas(version: &str, schemas: Value) -> String {
    json!({
        "openapi": version,
        "info": {"title": "Schemas", "version": "1.0"},
        "paths": {},
        "components": {"schemas": schemas}
    })
    .to_string()
}

#[test]
fn test_nullable_survives_3_1_to_3_0_and_back() {
    let doc = read(&with_schemas(
        "3.1.0",
        json!({"Name": {"type": ["string", "null"], "maxLength": 10}}),
    ));

    let v30 = write(&doc, SpecVersion::OpenApi3_0);
    assert_eq!(
        v30["components"]["schemas"]["Name"],
        json!({"type": "string", "nullable": true, "maxLength": 10})
    );

    let back = rewrite(&doc, SpecVersion::OpenApi3_0);
    assert_eq!(
        write(&back, SpecVersion::OpenApi3_1)["components"]["schemas"]["Name"],
        json!({"type": ["string", "null"], "maxLength": 10})
    );
}

#[test]
fn test_exclusive_minimum_survives_3_1_to_3_0_and_back() {
    let doc = read(&with_schemas(
        "3.1.0",
        json!({"Age": {"type": "integer", "exclusiveMinimum": 10}}),
    ));

    assert_eq!(
        write(&doc, SpecVersion::OpenApi3_0)["components"]["schemas"]["Age"],
        json!({"type": "integer", "minimum": 10, "exclusiveMinimum": true})
    );
    assert_eq!(
        write(&doc, SpecVersion::OpenApi2_0)["definitions"]["Age"],
        json!({"type": "integer", "minimum": 10, "exclusiveMinimum": true})
    );

    let back = rewrite(&doc, SpecVersion::OpenApi3_0);
    assert_eq!(
        write(&back, SpecVersion::OpenApi3_1)["components"]["schemas"]["Age"],
        json!({"type": "integer", "exclusiveMinimum": 10})
    );
}

#[test]
fn test_const_becomes_single_enum_below_3_1() {
    let doc = read(&with_schemas("3.1.0", json!({"Kind": {"const": "pet"}})));
    assert_eq!(
        write(&doc, SpecVersion::OpenApi3_0)["components"]["schemas"]["Kind"],
        json!({"enum": ["pet"]})
    );
    assert_eq!(
        write(&doc, SpecVersion::OpenApi3_1)["components"]["schemas"]["Kind"],
        json!({"const": "pet"})
    );
}

#[test]
fn test_v2_required_properties_lose_read_only() {
    let doc = read(&with_schemas(
        "3.0.3",
        json!({
            "Pet": {
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": {"type": "integer", "readOnly": true},
                    "name": {"type": "string", "readOnly": true}
                }
            }
        }),
    ));
    let pet = &write(&doc, SpecVersion::OpenApi2_0)["definitions"]["Pet"];
    assert_eq!(pet["required"], json!(["id"]));
    assert_eq!(pet["properties"]["id"], json!({"type": "integer"}));
    assert_eq!(pet["properties"]["name"], json!({"type": "string", "readOnly": true}));
}

#[test]
fn test_v2_discriminator_is_property_name() {
    let doc = read(&with_schemas(
        "3.0.3",
        json!({
            "Pet": {
                "type": "object",
                "discriminator": {"propertyName": "petType", "mapping": {"dog": "#/components/schemas/Dog"}},
                "properties": {"petType": {"type": "string"}}
            },
            "Dog": {"allOf": [{"$ref": "#/components/schemas/Pet"}]}
        }),
    ));
    let v2 = write(&doc, SpecVersion::OpenApi2_0);
    assert_eq!(v2["definitions"]["Pet"]["discriminator"], json!("petType"));
    assert_eq!(
        v2["definitions"]["Dog"],
        json!({"allOf": [{"$ref": "#/definitions/Pet"}]})
    );
}

#[test]
fn test_additional_properties_forms() {
    let doc = read(&with_schemas(
        "3.0.3",
        json!({
            "Closed": {"type": "object", "additionalProperties": false},
            "Labels": {"type": "object", "additionalProperties": {"type": "string"}},
            "Open": {"type": "object"}
        }),
    ));
    let v2 = write(&doc, SpecVersion::OpenApi2_0);
    assert_eq!(
        v2["definitions"]["Closed"],
        json!({"type": "object", "additionalProperties": false})
    );
    assert_eq!(
        v2["definitions"]["Labels"],
        json!({"type": "object", "additionalProperties": {"type": "string"}})
    );
    assert_eq!(v2["definitions"]["Open"], json!({"type": "object"}));
}

#[test]
fn test_v3_1_only_keywords_dropped_in_v2() {
    let doc = read(&with_schemas(
        "3.1.0",
        json!({
            "Id": {
                "oneOf": [{"type": "string"}, {"type": "integer"}],
                "deprecated": true,
                "examples": ["a1"],
                "x-internal": true
            }
        }),
    ));
    assert_eq!(
        write(&doc, SpecVersion::OpenApi2_0)["definitions"]["Id"],
        json!({"x-internal": true})
    );
}

const PET_STORE_V3: &str = r#"
openapi: 3.0.3
info:
  title: Pets
  version: "1.0"
servers:
  - url: https://petstore.example.com/v1
paths:
  /pets:
    post:
      operationId: addPet
      tags: [pets]
      requestBody:
        required: true
        x-bodyName: pet
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        '201':
          description: created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        '400':
          description: invalid
          content:
            Application/JSON:
              schema:
                $ref: '#/components/schemas/Error'
  /pets/{id}/photo:
    post:
      operationId: uploadPhoto
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
        - name: session
          in: cookie
          schema:
            type: string
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
              required: [file]
              properties:
                file:
                  type: string
                  format: binary
                caption:
                  type: string
                  description: Caption
      responses:
        '200':
          description: ok
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
    Error:
      type: object
  securitySchemes:
    api_key:
      type: apiKey
      name: X-API-Key
      in: header
    bearer:
      type: http
      scheme: bearer
tags:
  - name: pets
"#;

#[test]
fn test_v3_document_downgrades_to_v2() {
    let doc = read(PET_STORE_V3);
    let v2 = write(&doc, SpecVersion::OpenApi2_0);

    assert_eq!(v2["swagger"], json!("2.0"));
    assert_eq!(v2["host"], json!("petstore.example.com"));
    assert_eq!(v2["basePath"], json!("/v1"));
    assert_eq!(v2["schemes"], json!(["https"]));

    let add_pet = &v2["paths"]["/pets"]["post"];
    assert_eq!(add_pet["tags"], json!(["pets"]));
    assert_eq!(add_pet["consumes"], json!(["application/json"]));
    assert_eq!(add_pet["produces"], json!(["application/json"]));
    assert_eq!(
        add_pet["parameters"],
        json!([{
            "name": "pet",
            "in": "body",
            "required": true,
            "schema": {"$ref": "#/definitions/Pet"}
        }])
    );
    assert_eq!(
        add_pet["responses"]["201"],
        json!({"description": "created", "schema": {"$ref": "#/definitions/Pet"}})
    );

    let upload = &v2["paths"]["/pets/{id}/photo"]["post"];
    assert_eq!(upload["consumes"], json!(["multipart/form-data"]));
    assert_eq!(
        upload["parameters"],
        json!([
            {"name": "id", "in": "path", "required": true, "type": "string"},
            {"name": "file", "in": "formData", "required": true, "type": "file"},
            {"name": "caption", "in": "formData", "description": "Caption", "type": "string"}
        ])
    );

    assert_eq!(
        v2["securityDefinitions"],
        json!({"api_key": {"type": "apiKey", "name": "X-API-Key", "in": "header"}})
    );
    assert_eq!(v2["tags"], json!([{"name": "pets"}]));
}

#[test]
fn test_v2_document_upgrades_to_v3() {
    let swagger = json!({
        "swagger": "2.0",
        "info": {"title": "Pets", "version": "1.0"},
        "host": "petstore.example.com",
        "basePath": "/v1",
        "schemes": ["https"],
        "consumes": ["application/json"],
        "produces": ["application/json"],
        "paths": {
            "/pets": {
                "get": {
                    "parameters": [{
                        "name": "tags",
                        "in": "query",
                        "type": "array",
                        "items": {"type": "string"},
                        "collectionFormat": "csv"
                    }],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}
                        }
                    }
                },
                "post": {
                    "parameters": [{
                        "name": "pet",
                        "in": "body",
                        "required": true,
                        "schema": {"$ref": "#/definitions/Pet"}
                    }],
                    "responses": {"201": {"description": "created"}}
                }
            }
        },
        "definitions": {
            "Pet": {"type": "object", "properties": {"tag": {"type": "string", "x-nullable": true}}}
        }
    })
    .to_string();

    let doc = read(&swagger);
    let v3 = write(&doc, SpecVersion::OpenApi3_0);

    assert_eq!(v3["openapi"], json!("3.0.4"));
    assert_eq!(v3["servers"], json!([{"url": "https://petstore.example.com/v1"}]));
    assert_eq!(
        v3["paths"]["/pets"]["get"]["parameters"],
        json!([{
            "name": "tags",
            "in": "query",
            "explode": false,
            "schema": {"type": "array", "items": {"type": "string"}}
        }])
    );
    assert_eq!(
        v3["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}})
    );
    assert_eq!(
        v3["paths"]["/pets"]["post"]["requestBody"],
        json!({
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}},
            "required": true,
            "x-bodyName": "pet"
        })
    );
    assert_eq!(
        v3["components"]["schemas"]["Pet"]["properties"]["tag"],
        json!({"type": "string", "nullable": true})
    );

    let round_trip = write(&doc, SpecVersion::OpenApi2_0);
    assert_eq!(
        round_trip["paths"]["/pets"]["get"]["parameters"][0]["collectionFormat"],
        json!("csv")
    );
    assert_eq!(
        round_trip["paths"]["/pets"]["post"]["parameters"][0]["name"],
        json!("pet")
    );
}

#[test]
fn test_v2_drops_unrepresentable_components_behind_references() {
    let doc = read(
        &json!({
            "openapi": "3.0.3",
            "info": {"title": "Sessions", "version": "1.0"},
            "paths": {"/me": {
                "parameters": [{"name": "tracker", "in": "cookie", "schema": {"type": "string"}}],
                "get": {
                    "parameters": [{"$ref": "#/components/parameters/Session"}],
                    "security": [{"Auth": []}, {"api_key": []}],
                    "responses": {"200": {"description": "ok"}}
                },
                "put": {
                    "requestBody": {"$ref": "#/components/requestBodies/MeAlias"},
                    "security": [{"Auth": []}],
                    "responses": {"204": {"description": "saved"}}
                }
            }},
            "components": {
                "parameters": {
                    "Session": {"name": "session", "in": "cookie", "schema": {"type": "string"}},
                    "SessionAlias": {"$ref": "#/components/parameters/Session"}
                },
                "requestBodies": {
                    "Me": {"content": {"application/json": {"schema": {"type": "object"}}}},
                    "MeAlias": {"$ref": "#/components/requestBodies/Me"}
                },
                "securitySchemes": {
                    "api_key": {"type": "apiKey", "name": "X-API-Key", "in": "header"},
                    "bearer": {"type": "http", "scheme": "bearer"},
                    "Auth": {"$ref": "#/components/securitySchemes/bearer"}
                }
            }
        })
        .to_string(),
    );
    let v2 = write(&doc, SpecVersion::OpenApi2_0);

    assert_eq!(
        v2["securityDefinitions"],
        json!({"api_key": {"type": "apiKey", "name": "X-API-Key", "in": "header"}})
    );
    assert_eq!(
        v2["parameters"],
        json!({
            "Me": {"name": "body", "in": "body", "schema": {"type": "object"}},
            "MeAlias": {"$ref": "#/parameters/Me"}
        })
    );

    let me = &v2["paths"]["/me"];
    assert!(me.get("parameters").is_none());
    assert!(me["get"].get("parameters").is_none());
    assert_eq!(me["get"]["security"], json!([{"api_key": []}]));
    assert!(me["put"].get("security").is_none());
    assert_eq!(me["put"]["parameters"], json!([{"$ref": "#/parameters/MeAlias"}]));
    assert_eq!(me["put"]["consumes"], json!(["application/json"]));
}
