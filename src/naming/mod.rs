//! Converts between SQL identifiers and code-side naming conventions
//!
//! Table names: snake_case plural → PascalCase singular
//!   users        → User
//!   order_items  → OrderItem
//!   categories   → Category
//!
//! Column names: snake_case → camelCase
//!   created_at   → createdAt
//!   ID           → id
//!
//! Every function is total over `&str`: empty in, empty out. Optional
//! identifiers are threaded through with `Option::map`.

/// PascalCase singular entity name for a table
/// "order_items" → "OrderItem"
/// "categories"  → "Category"
/// "classes"     → "Class"
pub fn entity_name(table_name: &str) -> String {
    let mut segments: Vec<String> = split_segments(table_name)
        .into_iter()
        .map(normalize_segment)
        .collect();

    if let Some(last) = segments.last_mut() {
        *last = singularize(last);
    }

    segments.iter().map(|s| capitalize(s)).collect()
}

/// Package/folder segment: lowercase, underscores removed
/// "order_items" → "orderitems"
pub fn module_name(table_name: &str) -> String {
    table_name.replace('_', "").to_lowercase()
}

/// camelCase singular variable name for a table
/// "order_items" → "orderItem"
pub fn entity_variable_name(table_name: &str) -> String {
    decapitalize(&entity_name(table_name))
}

/// camelCase plural variable name for a table
/// "order_items" → "orderItems"
pub fn plural_variable_name(table_name: &str) -> String {
    pluralize(&entity_variable_name(table_name))
}

/// camelCase field name for a column, collapsing repeated underscores
/// "created_at"  → "createdAt"
/// "ID"          → "id"
/// "UPPER_CASE"  → "upperCase"
pub fn field_name(column_name: &str) -> String {
    let segments = split_segments(column_name);
    let mut result = String::with_capacity(column_name.len());

    for (i, segment) in segments.into_iter().enumerate() {
        let segment = normalize_segment(segment);
        if i == 0 {
            result.push_str(&decapitalize(&segment));
        } else {
            result.push_str(&capitalize(&segment));
        }
    }

    result
}

/// PascalCase without singularization
/// "order_items" → "OrderItems"
pub fn pascal_case(identifier: &str) -> String {
    split_segments(identifier)
        .into_iter()
        .map(|s| capitalize(&normalize_segment(s)))
        .collect()
}

/// Convert PascalCase/camelCase to snake_case, keeping acronyms together
/// "OrderItem"  → "order_item"
/// "HTTPServer" → "http_server"
/// "userId"     → "user_id"
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(ch.to_lowercase());
    }

    result
}

/// Table name for an entity: snake_case plural
/// "OrderItem" → "order_items"
/// "Category"  → "categories"
pub fn table_name(entity_name: &str) -> String {
    pluralize(&snake_case(entity_name))
}

/// SCREAMING_SNAKE_CASE constant name
/// "created_at" → "CREATED_AT"
/// "createdAt"  → "CREATED_AT"
pub fn constant_name(identifier: &str) -> String {
    snake_case(identifier).to_uppercase()
}

/// Singular form, suffix-stripping heuristic:
///   ies  → y        (categories → category)
///   sses → ss       (classes → class)
///   es after s, x, z, ch, sh → dropped (boxes → box)
///   s not after s   → dropped (products → product)
/// Anything else is returned unchanged.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let len = word.len();

    if lower.ends_with("ies") && len > 3 {
        return format!("{}y", &word[..len - 3]);
    }
    if lower.ends_with("sses") {
        return word[..len - 2].to_string();
    }
    if lower.ends_with("es") {
        let stem = &lower[..len - 2];
        if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| stem.ends_with(suffix)) {
            return word[..len - 2].to_string();
        }
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && len > 1 {
        return word[..len - 1].to_string();
    }

    word.to_string()
}

/// Plural form, the inverse of [`singularize`]
/// "category" → "categories"
/// "box"      → "boxes"
/// "day"      → "days"
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_ascii_lowercase();
    let len = word.len();

    if lower.ends_with('y') && len > 1 {
        let before = lower.as_bytes()[len - 2];
        if !is_vowel(before) {
            return format!("{}ies", &word[..len - 1]);
        }
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Split on underscores, dropping the empty pieces left by "__" or edges
fn split_segments(identifier: &str) -> Vec<&str> {
    identifier.split('_').filter(|s| !s.is_empty()).collect()
}

/// All-uppercase segments ("ID", "UPPER") are treated case-insensitively
fn normalize_segment(segment: &str) -> String {
    if segment.chars().any(|c| c.is_lowercase()) {
        segment.to_string()
    } else {
        segment.to_lowercase()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entity_name_simple() {
        assert_eq!(entity_name("products"), "Product");
        assert_eq!(entity_name("users"), "User");
        assert_eq!(entity_name("categories"), "Category");
        assert_eq!(entity_name("boxes"), "Box");
        assert_eq!(entity_name("classes"), "Class");
    }

    #[test]
    fn test_entity_name_compound() {
        assert_eq!(entity_name("order_items"), "OrderItem");
        assert_eq!(entity_name("user_roles"), "UserRole");
        assert_eq!(entity_name("product_categories"), "ProductCategory");
    }

    #[test]
    fn test_entity_name_uppercase_and_underscores() {
        assert_eq!(entity_name("ORDER_ITEMS"), "OrderItem");
        assert_eq!(entity_name("__audit__logs"), "AuditLog");
    }

    #[test]
    fn test_entity_name_edge_cases() {
        assert_eq!(entity_name(""), "");
        assert_eq!(entity_name("_"), "");
        assert_eq!(entity_name("address"), "Address");
        assert_eq!(entity_name("s"), "S");
    }

    #[test]
    fn test_singularize_rules() {
        assert_eq!(singularize("churches"), "church");
        assert_eq!(singularize("brushes"), "brush");
        assert_eq!(singularize("quizes"), "quiz");
        assert_eq!(singularize("glass"), "glass");
        assert_eq!(singularize("status"), "statu");
        assert_eq!(singularize("data"), "data");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("product"), "products");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("class"), "classes");
        assert_eq!(pluralize("church"), "churches");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("order_items"), "orderitems");
        assert_eq!(module_name("Users"), "users");
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(entity_variable_name("order_items"), "orderItem");
        assert_eq!(entity_variable_name("categories"), "category");
        assert_eq!(plural_variable_name("categories"), "categories");
        assert_eq!(plural_variable_name("order_items"), "orderItems");
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("created_at"), "createdAt");
        assert_eq!(field_name("ID"), "id");
        assert_eq!(field_name("UPPER_CASE"), "upperCase");
        assert_eq!(field_name("user__id"), "userId");
        assert_eq!(field_name("userId"), "userId");
        assert_eq!(field_name("_private"), "private");
    }

    #[test]
    fn test_pascal_case_keeps_plural() {
        assert_eq!(pascal_case("order_items"), "OrderItems");
        assert_eq!(pascal_case("ID"), "Id");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("OrderItem"), "order_item");
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("userId"), "user_id");
        assert_eq!(snake_case("created_at"), "created_at");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("User"), "users");
        assert_eq!(table_name("OrderItem"), "order_items");
        assert_eq!(table_name("Category"), "categories");
    }

    #[test]
    fn test_constant_name() {
        assert_eq!(constant_name("created_at"), "CREATED_AT");
        assert_eq!(constant_name("createdAt"), "CREATED_AT");
    }

    #[test]
    fn test_absent_names_propagate() {
        let missing: Option<&str> = None;
        assert_eq!(missing.map(entity_name), None);
        assert_eq!(missing.map(module_name), None);
        assert_eq!(missing.map(field_name), None);
        assert_eq!(Some("users").map(entity_name), Some("User".to_string()));
    }

    proptest! {
        #[test]
        fn prop_plural_round_trips(word in "[a-z]{0,6}[b-df-hj-np-tv-z]") {
            prop_assert_eq!(entity_name(&pluralize(&word)), pascal_case(&word));
        }

        #[test]
        fn prop_naming_is_total(input in "\\PC{0,24}") {
            let _ = entity_name(&input);
            let _ = entity_variable_name(&input);
            let _ = plural_variable_name(&input);
            let _ = module_name(&input);
            let _ = field_name(&input);
            let _ = snake_case(&input);
            let _ = table_name(&input);
            let _ = singularize(&input);
            let _ = pluralize(&input);
        }
    }
}
