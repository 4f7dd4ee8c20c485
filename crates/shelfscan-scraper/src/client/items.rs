//! Locating the item list inside a JSON search response.

use serde_json::Value;

/// JSON pointers to the item list, documented location first.
///
/// `mods.listItems` is what the search endpoint returns today; the others are
/// shapes it has used, or that category endpoints use.
pub(crate) const ITEM_LIST_POINTERS: &[&str] =
    &["/mods/listItems", "/results", "/listItems", "/data/products"];

/// Returns the first array found at one of [`ITEM_LIST_POINTERS`], with the
/// pointer that matched.
///
/// An empty array at an earlier location still wins: the endpoint answered in
/// a known shape and had nothing for this page.
pub(crate) fn locate_item_list(body: &Value) -> Option<(&'static str, &[Value])> {
    ITEM_LIST_POINTERS.iter().find_map(|pointer| {
        body.pointer(pointer)
            .and_then(Value::as_array)
            .map(|items| (*pointer, items.as_slice()))
    })
}
