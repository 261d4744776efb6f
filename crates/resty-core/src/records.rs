use serde_json::Value;

use crate::constants::DEFAULT_RECORD_KEY;

/// The last segment of a request path, e.g. `Account` for `/sobjects/Account`.
pub fn resource_name_from_path(path: &str) -> Option<&str> {
    path.split(['?', '#'])
        .next()?
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Pick the key holding the records of a response page.
///
/// An explicit `record_key` is used only if the page has it. Otherwise a key
/// equal to `resource_name` wins, then the first key of the page, then
/// `records`.
pub fn resolve_record_key<'a>(
    page: &'a Value,
    record_key: Option<&'a str>,
    resource_name: Option<&'a str>,
) -> Option<&'a str> {
    let object = page.as_object()?;
    if let Some(key) = record_key {
        return object.contains_key(key).then_some(key);
    }
    if let Some(name) = resource_name.filter(|name| object.contains_key(*name)) {
        return Some(name);
    }
    object
        .keys()
        .next()
        .map(String::as_str)
        .or_else(|| {
            object
                .contains_key(DEFAULT_RECORD_KEY)
                .then_some(DEFAULT_RECORD_KEY)
        })
}

/// Move the record array out of `page`. Anything other than an array yields no records.
pub fn take_records(page: &mut Value, key: &str) -> Vec<Value> {
    match page.get_mut(key).map(Value::take) {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_name_from_sobject_path() {
        assert_eq!(
            resource_name_from_path("/services/data/v60.0/sobjects/Account"),
            Some("Account")
        );
        assert_eq!(
            resource_name_from_path("/services/data/v60.0/sobjects/Account/"),
            Some("Account")
        );
        assert_eq!(
            resource_name_from_path("/services/data/v60.0/query?q=SELECT+Name+FROM+Account"),
            Some("query")
        );
        assert_eq!(resource_name_from_path(""), None);
    }

    #[test]
    fn explicit_key_present() {
        let page = json!({ "Account": [], "items": [{ "Name": "A" }] });

        assert_eq!(
            resolve_record_key(&page, Some("items"), Some("Account")),
            Some("items")
        );
    }

    #[test]
    fn explicit_key_absent() {
        let page = json!({ "Account": [{ "Name": "A" }] });

        assert_eq!(resolve_record_key(&page, Some("items"), Some("Account")), None);
    }

    #[test]
    fn resource_name_beats_first_key() {
        let page = json!({ "objectDescribe": {}, "Account": [{ "Name": "A" }] });

        assert_eq!(
            resolve_record_key(&page, None, Some("Account")),
            Some("Account")
        );
    }

    #[test]
    fn first_key_in_document_order() {
        let page = json!({ "zebra": [1], "alpha": [2] });

        assert_eq!(resolve_record_key(&page, None, Some("Account")), Some("zebra"));
    }

    #[test]
    fn empty_or_non_object_page() {
        assert_eq!(resolve_record_key(&json!({}), None, None), None);
        assert_eq!(resolve_record_key(&json!([1, 2]), None, None), None);
    }

    #[test]
    fn take_records_array() {
        let mut page = json!({ "records": [{ "Name": "B" }] });

        let records = take_records(&mut page, "records");

        assert_eq!(records, vec![json!({ "Name": "B" })]);
    }

    #[test]
    fn take_records_non_array() {
        let mut page = json!({ "objectDescribe": { "name": "Account" } });

        assert!(take_records(&mut page, "objectDescribe").is_empty());
        assert!(take_records(&mut page, "missing").is_empty());
    }
}
