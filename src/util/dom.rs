//! Small selector-based DOM helpers used by the delegated table handlers.

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement};

/// Nearest ancestor-or-self of the event target matching `selector`.
pub(crate) fn closest_from_event(ev: &Event, selector: &str) -> Option<Element> {
    let el = ev.target()?.dyn_into::<Element>().ok()?;
    el.closest(selector).ok().flatten()
}

pub(crate) fn closest(el: &Element, selector: &str) -> Option<Element> {
    el.closest(selector).ok().flatten()
}

pub(crate) fn matches(el: &Element, selector: &str) -> bool {
    el.matches(selector).unwrap_or(false)
}

/// First previous sibling matching `selector` (jQuery `prevAll(sel).first()`).
pub(crate) fn prev_sibling_matching(el: &Element, selector: &str) -> Option<Element> {
    let mut cur = el.previous_element_sibling();
    while let Some(s) = cur {
        if matches(&s, selector) {
            return Some(s);
        }
        cur = s.previous_element_sibling();
    }
    None
}

/// First next sibling matching `selector` (jQuery `nextAll(sel).first()`).
pub(crate) fn next_sibling_matching(el: &Element, selector: &str) -> Option<Element> {
    let mut cur = el.next_element_sibling();
    while let Some(s) = cur {
        if matches(&s, selector) {
            return Some(s);
        }
        cur = s.next_element_sibling();
    }
    None
}

pub(crate) fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub(crate) fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return vec![];
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn attr(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(name).filter(|v| !v.trim().is_empty())
}

pub(crate) fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

/// Visibility as rendered, so stylesheet rules count too.
pub(crate) fn is_shown(el: &Element) -> bool {
    web_sys::window()
        .and_then(|w| w.get_computed_style(el).ok().flatten())
        .and_then(|style| style.get_property_value("display").ok())
        .map(|d| d != "none")
        .unwrap_or(true)
}

/// `display` value that shows `el` when a stylesheet hides it.
fn shown_display(el: &Element) -> &'static str {
    match el.tag_name().to_ascii_lowercase().as_str() {
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "tbody" | "thead" | "tfoot" => "table-row-group",
        "table" => "table",
        "li" => "list-item",
        "a" | "span" | "input" | "button" | "label" | "select" | "textarea" => "inline",
        _ => "block",
    }
}

pub(crate) fn set_shown(el: &Element, shown: bool) {
    let Some(h) = el.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = h.style();
    if !shown {
        let _ = style.set_property("display", "none");
        return;
    }
    let _ = style.remove_property("display");
    if !is_shown(el) {
        let _ = style.set_property("display", shown_display(el));
    }
}

/// Drop any inline `display`, handing visibility back to the stylesheet.
pub(crate) fn clear_display(el: &Element) {
    if let Some(h) = el.dyn_ref::<HtmlElement>() {
        let _ = h.style().remove_property("display");
    }
}

pub(crate) fn toggle_shown(el: &Element) {
    set_shown(el, !is_shown(el));
}

pub(crate) fn set_body_class(class: &str, on: bool) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        return;
    };
    let list = body.class_list();
    let _ = if on { list.add_1(class) } else { list.remove_1(class) };
}

/// Current value of an `<input>` or `<textarea>`.
pub(crate) fn field_value(el: &Element) -> Option<String> {
    if let Some(i) = el.dyn_ref::<web_sys::HtmlInputElement>() {
        return Some(i.value());
    }
    el.dyn_ref::<web_sys::HtmlTextAreaElement>()
        .map(|t| t.value())
}

pub(crate) fn set_field_value(el: &Element, value: &str) {
    if let Some(i) = el.dyn_ref::<web_sys::HtmlInputElement>() {
        i.set_value(value);
    } else if let Some(t) = el.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        t.set_value(value);
    }
}

/// Blocking browser confirmation prompt.
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Blocking browser alert.
pub(crate) fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}
