//! Golden interchange vectors.
//!
//! The reference document below is the historical `data.json` shape: records
//! keyed by `expression`/`meaning` without an `is_checked` column, and events
//! pointing at records by id. Any loader must accept it and produce exactly
//! the listing and histories returned by [`golden_items`] and
//! [`golden_histories`].

use boost_core::{parse_timestamp, Dataset, EventType, Item, Timestamp};

const DOCUMENT: &str = r#"{
    "records": [
        {
            "id": 1,
            "created_on": "2022-04-16 12:54:24.671922",
            "updated_on": "2022-04-16 12:54:24.671928",
            "expression": "foo_expression",
            "meaning": "foo_meaning"
        },
        {
            "id": 2,
            "created_on": "2022-04-16 12:54:24.672691",
            "updated_on": "2022-04-16 12:54:24.672695",
            "expression": "bar_expression",
            "meaning": "bar_meaning"
        },
        {
            "id": 3,
            "created_on": "2022-04-16 12:54:24.673138",
            "updated_on": "2022-04-16 12:54:24.673141",
            "expression": "baz_expression",
            "meaning": "bar_meaning"
        }
    ],
    "events": [
        {
            "id": 1,
            "created_on": "2022-04-16 12:54:24.676669",
            "updated_on": "2022-04-16 12:54:24.676672",
            "event_type": "SUCCESS",
            "record_id": 1
        },
        {
            "id": 2,
            "created_on": "2022-04-16 12:54:24.677945",
            "updated_on": "2022-04-16 12:54:24.677948",
            "event_type": "SUCCESS",
            "record_id": 1
        },
        {
            "id": 3,
            "created_on": "2022-04-16 12:54:24.678942",
            "updated_on": "2022-04-16 12:54:24.678945",
            "event_type": "SUCCESS",
            "record_id": 2
        },
        {
            "id": 4,
            "created_on": "2022-04-16 12:54:24.679934",
            "updated_on": "2022-04-16 12:54:24.679938",
            "event_type": "FAILURE",
            "record_id": 2
        },
        {
            "id": 5,
            "created_on": "2022-04-16 12:54:24.680927",
            "updated_on": "2022-04-16 12:54:24.680930",
            "event_type": "HINT",
            "record_id": 2
        },
        {
            "id": 6,
            "created_on": "2022-04-16 12:54:24.681943",
            "updated_on": "2022-04-16 12:54:24.681946",
            "event_type": "HINT",
            "record_id": 3
        },
        {
            "id": 7,
            "created_on": "2022-04-16 12:54:24.682933",
            "updated_on": "2022-04-16 12:54:24.682936",
            "event_type": "HINT",
            "record_id": 3
        }
    ]
}"#;

/// The reference interchange document.
pub fn golden_document() -> &'static str {
    DOCUMENT
}

/// The reference document, parsed.
pub fn golden_dataset() -> Dataset {
    serde_json::from_str(DOCUMENT).expect("golden document must parse")
}

/// Listing the reference document loads into.
pub fn golden_items() -> Vec<Item> {
    vec![
        Item::new("foo_expression", "foo_meaning", true),
        Item::new("bar_expression", "bar_meaning", true),
        Item::new("baz_expression", "bar_meaning", true),
    ]
}

/// Event history per key, oldest first.
pub fn golden_histories() -> Vec<(&'static str, Vec<EventType>)> {
    use EventType::*;
    vec![
        ("foo_expression", vec![Success, Success]),
        ("bar_expression", vec![Success, Failure, Hint]),
        ("baz_expression", vec![Hint, Hint]),
    ]
}

/// Creation time of the first reference record.
pub fn golden_first_created_at() -> Timestamp {
    parse_timestamp("2022-04-16 12:54:24.671922").expect("golden timestamp must parse")
}
