mod api;
mod app;
mod components;
mod config;
mod markup;
mod models;
mod pages;
mod state;
mod tree;
mod util;

use crate::app::App;
use crate::config::EnvConfig;
use crate::markup::PageSource;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::util::dom;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fixture(html: &str) -> web_sys::Element {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .expect("document should exist");
        let root = doc.create_element("div").expect("should create div");
        root.set_inner_html(html);
        doc.body()
            .expect("body should exist")
            .append_child(&root)
            .expect("should attach fixture");
        root
    }

    #[wasm_bindgen_test]
    fn test_read_folders_follows_nesting() {
        let root = fixture(
            r##"<div id="tree-fixture"><ul>
                <li data-folder_id="1"><a href="#">My Links</a>
                    <ul>
                        <li data-folder_id="3"><a href="#">Cases</a></li>
                        <li data-folder_id="7"><a href="#">Drafts</a>
                            <ul><li data-folder_id="8"><a href="#">Old</a></li></ul>
                        </li>
                    </ul>
                </li>
            </ul></div>"##,
        );

        let folders = markup::read_folders(&root);
        let found: Vec<(&str, Option<&str>, &str)> = folders
            .iter()
            .map(|f| (f.id.as_str(), f.parent_id.as_deref(), f.name.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("1", None, "My Links"),
                ("3", Some("1"), "Cases"),
                ("7", Some("1"), "Drafts"),
                ("8", Some("7"), "Old"),
            ]
        );
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_sibling_helpers_find_status_elements() {
        let root = fixture(
            r##"<table><tbody>
                <tr class="link-row" link_id="ABCD-1234"><td class="linky-abbr-title">
                    <input value="Title"><span class="other"></span><span class="title-save-status"></span>
                </td></tr>
                <tr class="link-details"><td>
                    <span class="notes-save-status"></span><span></span><textarea>notes</textarea>
                </td></tr>
            </tbody></table>"##,
        );

        let input = dom::query(&root, ".linky-abbr-title input").expect("input");
        let status = dom::next_sibling_matching(
            &input,
            &format!(".{}", models::FieldKind::Title.status_class()),
        );
        assert!(status.is_some());
        assert_eq!(dom::field_value(&input).as_deref(), Some("Title"));

        let textarea = dom::query(&root, "textarea").expect("textarea");
        assert!(dom::prev_sibling_matching(
            &textarea,
            &format!(".{}", models::FieldKind::Notes.status_class()),
        )
        .is_some());
        let row = dom::closest(&textarea, "tr").expect("details row");
        let link_row = row.previous_element_sibling().expect("link row");
        assert_eq!(dom::attr(&link_row, "link_id").as_deref(), Some("ABCD-1234"));
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_toggle_shown() {
        let root = fixture(r#"<div class="link-details">x</div>"#);
        let el = dom::query(&root, ".link-details").expect("details");
        assert!(dom::is_shown(&el));
        dom::toggle_shown(&el);
        assert!(!dom::is_shown(&el));
        dom::toggle_shown(&el);
        assert!(dom::is_shown(&el));
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_toggle_shown_reveals_row_hidden_by_stylesheet() {
        let root = fixture(
            r#"<style>.link-details.collapsed { display: none; }</style>
            <table><tbody>
                <tr class="link-row"><td>link</td></tr>
                <tr class="link-details collapsed"><td>details</td></tr>
            </tbody></table>"#,
        );
        let row = dom::query(&root, ".link-details").expect("details row");
        assert!(!dom::is_shown(&row));

        dom::toggle_shown(&row);
        assert!(dom::is_shown(&row));
        let display = web_sys::window()
            .and_then(|w| w.get_computed_style(&row).ok().flatten())
            .and_then(|s| s.get_property_value("display").ok());
        assert_eq!(display.as_deref(), Some("table-row"));

        dom::toggle_shown(&row);
        assert!(!dom::is_shown(&row));
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_config_reads_window_env() {
        let window = web_sys::window().expect("window");
        let env = js_sys::Object::new();
        js_sys::Reflect::set(
            &env,
            &"FOLDER_CONTENTS_URL".into(),
            &"/manage/links/FOLDER_ID/contents".into(),
        )
        .expect("set url");
        js_sys::Reflect::set(&env, &"SAVE_BUFFER_SECONDS".into(), &JsValue::from_f64(1.5))
            .expect("set seconds");
        js_sys::Reflect::set(&window, &"ENV".into(), &env).expect("set ENV");

        let config = EnvConfig::from_window();
        assert_eq!(config.folder_contents_url, "/manage/links/FOLDER_ID/contents");
        assert_eq!(config.save_window_ms(), 1500);
        assert_eq!(config.mount_id, config::DEFAULT_MOUNT_ID);

        js_sys::Reflect::delete_property(&window, &"ENV".into()).expect("clear ENV");
    }
}

fn mount_target(mount_id: &str) -> Option<web_sys::HtmlElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(mount_id)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = EnvConfig::from_window();
    let source = web_sys::window()
        .and_then(|w| w.document())
        .map(|doc| PageSource::take_from(&doc))
        .unwrap_or_default();

    match mount_target(&config.mount_id) {
        Some(el) => {
            leptos::mount::mount_to(el, move || view! { <App config=config source=source /> })
                .forget();
        }
        None => {
            leptos::logging::warn!("#{} not found; mounting into <body>", config.mount_id);
            mount_to_body(move || view! { <App config=config source=source /> });
        }
    }
}
