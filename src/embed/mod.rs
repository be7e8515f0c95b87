//! Embedded static resources.
//!
//! ```ignore
//! use embed::serve::{HOTRELOAD_JS, HotreloadVars};
//!
//! let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the dev server answers with the live-reload client.
    pub const HOTRELOAD_URL: &str = "/__kiln/hotreload.js";

    /// Variables for hotreload.js template.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn placeholders(&self) -> Vec<(&'static str, String)> {
            vec![("WS_PORT", self.ws_port.to_string())]
        }
    }

    /// Live-reload client with WebSocket port injection.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));

    /// `<script>` tag loading the client.
    pub fn script_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_URL}" defer></script>"#)
    }
}
