//! End-to-end conversion of fixture projects.

use serde_json::{Value, json};
use spring_mcp_codegen::{ArgumentBinding, Binding, Converter, SCHEMA_FILE, ScanOutput};
use spring_mcp_core::{ConverterConfig, HttpVerb, WarningKind};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn users_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/main/java/com/example/UsersApplication.java",
        r"
        package com.example;

        @SpringBootApplication
        public class UsersApplication {
            public static void main(String[] args) {}
        }
        ",
    );
    write(
        root,
        "src/main/java/com/example/web/UserController.java",
        r#"
        package com.example.web;

        import com.example.dto.CreateUserRequest;
        import com.example.dto.User;
        import org.springframework.http.ResponseEntity;
        import org.springframework.web.bind.annotation.*;

        @RestController
        @RequestMapping("/api/users")
        public class UserController {

            /**
             * Fetch one user.
             *
             * @param id user identifier
             */
            @GetMapping("/{id}")
            public ResponseEntity<User> getUser(@PathVariable Integer id) {
                return null;
            }

            /** Create a user. */
            @PostMapping
            public User create(@Valid @RequestBody CreateUserRequest request) {
                return null;
            }
        }
        "#,
    );
    write(
        root,
        "src/main/java/com/example/web/HealthController.java",
        r#"
        package com.example.web;

        @RestController
        public class HealthController {
            @GetMapping("/ping")
            public String ping() { return "pong"; }
        }
        "#,
    );
    write(
        root,
        "src/main/java/com/example/web/LegacyController.java",
        r#"
        package com.example.web;

        @RestController
        public class LegacyController {
            @GetMapping("/ping")
            public String ping() { return "pong"; }
        }
        "#,
    );
    write(
        root,
        "src/main/java/com/example/dto/CreateUserRequest.java",
        r"
        package com.example.dto;

        public class CreateUserRequest {
            private String name;
            private int age;
        }
        ",
    );
    write(
        root,
        "src/main/java/com/example/dto/User.java",
        r"
        package com.example.dto;

        import com.vendor.sdk.ExternalProfile;
        import java.util.List;

        /** A registered user. */
        public class User {
            private Long id;
            private String name;
            private User manager;
            private List<User> reports;
            private ExternalProfile profile;
        }
        ",
    );
    temp
}

fn scan(root: &Path) -> ScanOutput {
    Converter::new(ConverterConfig::default())
        .unwrap()
        .scan(root)
        .unwrap()
}

fn tool<'a>(output: &'a ScanOutput, name: &str) -> &'a spring_mcp_codegen::ToolSchema {
    output
        .document
        .tools
        .iter()
        .find(|t| t.name.as_str() == name)
        .unwrap_or_else(|| panic!("missing tool {name}"))
}

#[test]
fn test_path_variable_endpoint() {
    let temp = users_project();
    let output = scan(temp.path());

    let endpoint = output
        .endpoints
        .iter()
        .find(|e| e.path == "/api/users/{id}")
        .unwrap();
    assert_eq!(endpoint.verb, HttpVerb::Get);
    assert_eq!(endpoint.params.len(), 1);
    assert_eq!(endpoint.params[0].name, "id");
    assert!(endpoint.params[0].required);
    assert_eq!(
        endpoint.params[0].binding,
        Binding::Path {
            variable: "id".to_string()
        }
    );

    let schema = tool(&output, endpoint.tool.as_str());
    assert_eq!(schema.parameters["id"]["type"], "integer");
    assert_eq!(schema.parameters["id"]["description"], "user identifier");
    assert_eq!(schema.required, vec!["id"]);
    assert_eq!(schema.returns, json!({"$ref": "#/models/com.example.dto.User"}));
}

#[test]
fn test_request_body_is_flattened() {
    let temp = users_project();
    let output = scan(temp.path());

    let schema = tool(&output, "post_api_users");
    assert_eq!(schema.parameters["name"], json!({"type": "string"}));
    assert_eq!(schema.parameters["age"]["type"], "integer");
    assert_eq!(
        schema.required.iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([&"age".to_string(), &"name".to_string()])
    );

    let route = output
        .forwarding
        .routes
        .iter()
        .find(|r| r.tool.as_str() == "post_api_users")
        .unwrap();
    assert_eq!(route.method, HttpVerb::Post);
    for field in ["name", "age"] {
        assert!(route.bindings.contains(&ArgumentBinding::Body {
            argument: field.to_string(),
            field: Some(field.to_string()),
        }));
    }
}

#[test]
fn test_duplicate_routes_are_disambiguated() {
    let temp = users_project();
    let output = scan(temp.path());

    let names: Vec<&str> = output.document.tools.iter().map(|t| t.name.as_str()).collect();
    let unique: BTreeSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len());

    // HealthController.java sorts before LegacyController.java
    let pings: Vec<_> = output
        .endpoints
        .iter()
        .filter(|e| e.path == "/ping")
        .map(|e| (e.tool.as_str(), e.source.as_str()))
        .collect();
    assert_eq!(pings.len(), 2);
    assert_eq!(pings[0].0, "get_ping");
    assert!(pings[0].1.ends_with("HealthController.java"));
    assert_eq!(pings[1].0, "get_ping_2");
    assert_eq!(output.diagnostics.of_kind(WarningKind::NameCollision).count(), 1);
}

#[test]
fn test_self_referential_model_terminates() {
    let temp = users_project();
    let output = scan(temp.path());

    let user = &output.document.models["com.example.dto.User"];
    assert_eq!(user["description"], "A registered user.");
    assert_eq!(
        user["properties"]["manager"],
        json!({"$ref": "#/models/com.example.dto.User"})
    );
    assert_eq!(
        user["properties"]["reports"],
        json!({"type": "array", "items": {"$ref": "#/models/com.example.dto.User"}})
    );
}

#[test]
fn test_unknown_type_is_opaque() {
    let temp = users_project();
    let output = scan(temp.path());

    let user = &output.document.models["com.example.dto.User"];
    assert_eq!(user["properties"]["profile"], json!({}));
    assert!(
        output
            .diagnostics
            .of_kind(WarningKind::DegradedExtraction)
            .any(|w| w.message.contains("ExternalProfile"))
    );
}

#[test]
fn test_every_reference_has_a_model() {
    fn refs(value: &Value, out: &mut BTreeSet<String>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(target)) = map.get("$ref") {
                    out.insert(target.trim_start_matches("#/models/").to_string());
                }
                map.values().for_each(|v| refs(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| refs(v, out)),
            _ => {}
        }
    }

    let temp = users_project();
    let output = scan(temp.path());
    let document = serde_json::to_value(&output.document).unwrap();

    let mut targets = BTreeSet::new();
    refs(&document, &mut targets);
    assert!(!targets.is_empty());
    let defined: BTreeSet<String> = output.document.models.keys().cloned().collect();
    assert_eq!(targets, defined);
}

#[test]
fn test_base_package_is_reported() {
    let temp = users_project();
    let output = scan(temp.path());
    assert_eq!(output.base_package.as_deref(), Some("com.example"));
    assert_eq!(output.document.base_package.as_deref(), Some("com.example"));
}

#[test]
fn test_output_is_deterministic() {
    let temp = users_project();
    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();

    for (out, parallel) in [(&first_out, true), (&second_out, false)] {
        let mut config = ConverterConfig::default();
        config.scan.parallel = parallel;
        config.generator.output = out.path().to_path_buf();
        Converter::new(config).unwrap().convert(temp.path()).unwrap();
    }

    for file in ["mcp_schema.json", "forwarding.json", "server.ts", "package.json"] {
        let first = fs::read(first_out.path().join(file)).unwrap();
        let second = fs::read(second_out.path().join(file)).unwrap();
        assert_eq!(first, second, "{file} differs between runs");
    }
}

#[test]
fn test_convert_writes_generated_project() {
    let temp = users_project();
    let out = TempDir::new().unwrap();
    let mut config = ConverterConfig::default();
    config.generator.name = "Users".to_string();
    config.generator.output = out.path().join("mcp_server");

    let report = Converter::new(config).unwrap().convert(temp.path()).unwrap();
    assert_eq!(report.endpoint_count, 4);
    assert_eq!(report.files_scanned, 6);
    assert_eq!(report.summary.total(), report.warnings.len());

    let written: Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("mcp_server").join(SCHEMA_FILE)).unwrap())
            .unwrap();
    assert_eq!(written["name"], "Users");
    assert_eq!(written["basePackage"], "com.example");
    assert_eq!(written["tools"].as_array().unwrap().len(), 4);
    assert!(out.path().join("mcp_server").join("server.ts").exists());
}

fn catalog_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/main/java/com/shop/web/ItemController.java",
        r#"
        package com.shop.web;

        import com.shop.model.Filter;
        import com.shop.model.Item;
        import com.shop.model.Node;
        import java.util.List;

        @RestController
        @RequestMapping("/api/items")
        public class ItemController {

            /** Search the catalog. */
            @GetMapping("/search")
            @RequestMapping(value = "/find", method = RequestMethod.POST)
            public List<Item> search(@ModelAttribute Filter filter,
                                     @RequestParam(defaultValue = "10") int limit) {
                return null;
            }

            /** Category tree. */
            @GetMapping("/tree")
            public Node<String> tree() {
                return null;
            }
        }
        "#,
    );
    write(
        root,
        "src/main/java/com/shop/model/Filter.java",
        "package com.shop.model;\npublic class Filter { private String name; private int age; }\n",
    );
    write(
        root,
        "src/main/java/com/shop/model/Item.java",
        "package com.shop.model;\npublic class Item { private String title; }\n",
    );
    write(
        root,
        "src/main/java/com/shop/model/Node.java",
        r"
        package com.shop.model;

        import java.util.List;

        public class Node<T> {
            private T value;
            private Node<List<T>> deeper;
        }
        ",
    );
    temp
}

#[test]
fn test_shorthand_mapping_wins_when_stacked() {
    let temp = catalog_project();
    let output = scan(temp.path());

    let search = output
        .endpoints
        .iter()
        .find(|e| e.source.ends_with("ItemController.java") && e.path.ends_with("/search"))
        .unwrap();
    assert_eq!(search.verb, HttpVerb::Get);
    assert_eq!(search.path, "/api/items/search");
    assert!(output.endpoints.iter().all(|e| !e.path.ends_with("/find")));
    assert_eq!(output.endpoints.len(), 2);
}

#[test]
fn test_model_attribute_is_not_sent_as_body() {
    let temp = catalog_project();
    let output = scan(temp.path());

    let route = output
        .forwarding
        .routes
        .iter()
        .find(|r| r.path == "/api/items/search")
        .unwrap();
    assert_eq!(
        route.bindings,
        vec![ArgumentBinding::Query {
            argument: "limit".to_string(),
            name: "limit".to_string(),
        }]
    );
    assert!(
        output
            .diagnostics
            .of_kind(WarningKind::DegradedExtraction)
            .any(|w| w.message.contains("'filter' excluded"))
    );
    let schema = tool(&output, route.tool.as_str());
    assert!(schema.parameters.get("name").is_none());
    assert_eq!(schema.parameters["limit"]["default"], 10);
}

#[test]
fn test_growing_generic_model_terminates() {
    let temp = catalog_project();
    let output = scan(temp.path());

    let tree = tool(&output, "get_api_items_tree");
    assert_eq!(
        tree.returns,
        json!({"$ref": "#/models/com.shop.model.Node<string>"})
    );
    assert!(output.document.models.contains_key("com.shop.model.Node<string>"));
    assert!(output.document.models.contains_key("com.shop.model.Node"));
    assert!(output.document.models.len() < 20);
    assert_eq!(
        output
            .diagnostics
            .of_kind(WarningKind::StructuralInconsistency)
            .filter(|w| w.message.contains("com.shop.model.Node"))
            .count(),
        1
    );
}
