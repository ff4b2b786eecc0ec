pub(crate) mod dom;

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Current page URL without its fragment; the target of "post to self" calls.
pub(crate) fn page_url() -> String {
    web_sys::window()
        .and_then(|w| w.location().href().ok())
        .map(|href| strip_fragment(&href).to_string())
        .unwrap_or_default()
}

pub(crate) fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map(|(u, _)| u).unwrap_or(url)
}

/// Resolve a possibly relative URL against the current page.
pub(crate) fn resolve_url(url: &str) -> String {
    let base = page_url();
    if base.is_empty() {
        return url.to_string();
    }
    match web_sys::Url::new_with_base(url, &base) {
        Ok(u) => {
            u.set_hash("");
            strip_fragment(&u.href()).to_string()
        }
        Err(_) => url.to_string(),
    }
}
