use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use relgen_core::{
    relgen_build_model,
    relgen_clear_model_cache,
    relgen_free_string,
    relgen_set_model_cache,
    relgen_table_relationships,
    relgen_validate_schema,
    relgen_version,
    RelgenResult,
};

const SHOP: &str = r#"{
    "tables": [
        {"name": "categories",
         "columns": [
            {"name": "id", "sql_type": "serial", "primary_key": true, "nullable": false},
            {"name": "name", "sql_type": "varchar(80)", "nullable": false}
         ]},
        {"name": "products",
         "columns": [
            {"name": "id", "sql_type": "serial", "primary_key": true, "nullable": false},
            {"name": "category_id", "sql_type": "int", "nullable": false},
            {"name": "name", "sql_type": "varchar(120)", "nullable": false},
            {"name": "created_at", "sql_type": "timestamp"}
         ]},
        {"name": "tags",
         "columns": [{"name": "id", "sql_type": "serial", "primary_key": true}]},
        {"name": "product_tags",
         "columns": [
            {"name": "product_id", "sql_type": "int"},
            {"name": "tag_id", "sql_type": "int"}
         ],
         "primary_key_columns": ["product_id", "tag_id"]}
    ],
    "foreign_keys": [
        {"table": "products", "column_name": "category_id", "referenced_table": "categories"},
        {"table": "product_tags", "column_name": "product_id", "referenced_table": "products", "on_delete": "Cascade"},
        {"table": "product_tags", "column_name": "tag_id", "referenced_table": "tags", "on_delete": "Cascade"}
    ]
}"#;

unsafe fn take_string(s: *mut c_char) -> String {
    let owned = CStr::from_ptr(s).to_str().unwrap().to_string();
    relgen_free_string(s);
    owned
}

#[test]
fn test_ffi_build_roundtrip() {
    let input = CString::new(SHOP).unwrap();
    let mut error: *mut c_char = ptr::null_mut();

    unsafe {
        let result = relgen_build_model(input.as_ptr(), &mut error);

        assert!(!result.is_null(), "Should build successfully");
        assert!(error.is_null(), "Should have no errors");

        let json: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();

        let entities = json["entities"].as_array().unwrap();
        let names: Vec<&str> = entities
            .iter()
            .map(|e| e["table_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["categories", "products", "tags"]);
        assert_eq!(json["junction_tables"][0], "product_tags");

        let product = &entities[1];
        assert_eq!(product["entity_name"], "Product");
        assert_eq!(product["business_columns"], serde_json::json!(["name"]));
        assert_eq!(product["extends_audit_base"], true);

        let m2m = &product["relationships"]["many_to_many"][0];
        assert_eq!(m2m["source_table"], "products");
        assert_eq!(m2m["target_table"], "tags");
        assert_eq!(m2m["junction"]["table"], "product_tags");
        assert_eq!(m2m["junction"]["source_column"], "product_id");
        assert_eq!(m2m["junction"]["target_column"], "tag_id");
    }
}

#[test]
fn test_ffi_validate() {
    let input = CString::new(SHOP).unwrap();
    let broken = CString::new(
        r#"{"tables": [{"name": "orders", "columns": [{"name": "id", "sql_type": "int"}]}],
            "foreign_keys": [{"table": "orders", "column_name": "customer_id", "referenced_table": "customers"}]}"#,
    )
    .unwrap();
    let mut out: *mut c_char = ptr::null_mut();

    unsafe {
        assert_eq!(relgen_validate_schema(input.as_ptr(), &mut out), RelgenResult::Ok);
        assert!(take_string(out).contains("\"valid\":true"));

        out = ptr::null_mut();
        assert_eq!(
            relgen_validate_schema(broken.as_ptr(), &mut out),
            RelgenResult::ValidationError
        );
        let json: serde_json::Value = serde_json::from_str(&take_string(out)).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["kind"], "UnknownColumn");
        assert_eq!(json["errors"][0]["table"], "orders");
    }
}

#[test]
fn test_ffi_model_cache() {
    let input = CString::new(SHOP).unwrap();
    let products = CString::new("products").unwrap();
    let missing = CString::new("invoices").unwrap();
    let mut error: *mut c_char = ptr::null_mut();

    unsafe {
        let status = take_string(relgen_set_model_cache(input.as_ptr()));
        assert!(status.contains("\"valid\":true"));

        let result = relgen_table_relationships(products.as_ptr(), &mut error);
        assert!(!result.is_null());
        let json: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();
        assert_eq!(json["outgoing"][0]["target_table"], "categories");
        assert_eq!(json["outgoing"][0]["relation_type"], "ManyToOne");
        assert_eq!(json["incoming"].as_array().unwrap().len(), 0);
        assert_eq!(json["many_to_many"].as_array().unwrap().len(), 1);

        let result = relgen_table_relationships(missing.as_ptr(), &mut error);
        assert!(result.is_null());
        assert!(take_string(error).contains("UnknownTable"));

        take_string(relgen_clear_model_cache());

        error = ptr::null_mut();
        let result = relgen_table_relationships(products.as_ptr(), &mut error);
        assert!(result.is_null());
        assert!(take_string(error).contains("No cached model"));
    }
}

#[test]
fn test_ffi_model_cache_rejects_broken_facts() {
    let broken = CString::new(
        r#"{"tables": [{"name": "orders",
            "columns": [{"name": "id", "sql_type": "int", "primary_key": true},
                        {"name": "customer_id", "sql_type": "int"}],
            "foreign_keys": [{"column_name": "customer_id", "referenced_table": "customers"}]}]}"#,
    )
    .unwrap();

    unsafe {
        let json: serde_json::Value =
            serde_json::from_str(&take_string(relgen_set_model_cache(broken.as_ptr()))).unwrap();

        assert_eq!(json["valid"], false);
        assert!(json["error"].is_object());
        assert_eq!(json["error"]["kind"], "UnresolvedReference");
        assert_eq!(json["error"]["data"]["table"], "orders");
        assert_eq!(json["error"]["data"]["referenced_table"], "customers");
    }
}

#[test]
fn test_version() {
    unsafe {
        let version = CStr::from_ptr(relgen_version());
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
