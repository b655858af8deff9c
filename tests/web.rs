// Browser-side checks for values that cross the JS boundary
#![cfg(target_arch = "wasm32")]

use tab_sorter::parser::parse_groups;
use tab_sorter::status::{RunState, icon_state};
use tab_sorter::tab_data::TabSnapshot;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn icon_update_uses_camel_case_keys() {
    let update = icon_state(RunState::Success, Some("Done"));
    let value = serde_wasm_bindgen::to_value(&update).unwrap();

    let badge = js_sys::Reflect::get(&value, &JsValue::from_str("badgeText")).unwrap();
    let reset = js_sys::Reflect::get(&value, &JsValue::from_str("resetAfterMs")).unwrap();
    assert_eq!(badge.as_string().as_deref(), Some("✓"));
    assert_eq!(reset.as_f64(), Some(3000.0));
}

#[wasm_bindgen_test]
fn tab_without_group_reads_as_ungrouped() {
    let tab = js_sys::Object::new();
    js_sys::Reflect::set(&tab, &"id".into(), &JsValue::from(7)).unwrap();
    js_sys::Reflect::set(&tab, &"title".into(), &"Docs".into()).unwrap();
    js_sys::Reflect::set(&tab, &"url".into(), &"https://docs.rs".into()).unwrap();
    js_sys::Reflect::set(&tab, &"windowId".into(), &JsValue::from(1)).unwrap();

    let tab: TabSnapshot = serde_wasm_bindgen::from_value(tab.into()).unwrap();
    assert_eq!(tab.id, 7);
    assert!(tab.is_ungrouped());
}

#[wasm_bindgen_test]
fn parses_fenced_reply() {
    let raw = "```json\n{\"groups\":[{\"name\":\"Docs\",\"tabIds\":[7],\"color\":\"blue\"}]}\n```";
    let groups = parse_groups(raw).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].tab_ids, vec![7]);
}
