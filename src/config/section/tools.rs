//! `[tools]` section configuration.
//!
//! Command arrays for transforms that delegate to an external program.
//! `$INPUT` and `$OUTPUT` are substituted per invocation.
//!
//! # Example
//!
//! ```toml
//! [tools]
//! sass = ["npx", "sass", "--no-source-map", "--style=expanded", "$INPUT", "$OUTPUT"]
//! image_optimizer = ["oxipng", "-o", "2", "--out", "$OUTPUT", "$INPUT"]
//! ```

use serde::{Deserialize, Serialize};

/// Font conversion through a FontForge script; the target format follows
/// the output file extension.
fn fontforge() -> Vec<String> {
    [
        "fontforge",
        "-lang=ff",
        "-c",
        "Open($1); Generate($2)",
        "$INPUT",
        "$OUTPUT",
    ]
    .map(String::from)
    .to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Production stylesheet compile (expanded, no source map).
    pub sass: Vec<String>,
    /// Development stylesheet compile (embedded source map).
    pub sass_dev: Vec<String>,
    /// TTF to WOFF converter.
    pub woff: Vec<String>,
    /// TTF to WOFF2 converter.
    pub woff2: Vec<String>,
    /// OTF to TTF converter (`kiln ttf`).
    pub otf2ttf: Vec<String>,
    /// Optional raster/vector optimizer; empty means plain copy.
    pub image_optimizer: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let sass = |flag: &str| {
            ["sass", flag, "--style=expanded", "$INPUT", "$OUTPUT"]
                .map(String::from)
                .to_vec()
        };
        Self {
            sass: sass("--no-source-map"),
            sass_dev: sass("--embed-source-map"),
            woff: fontforge(),
            woff2: fontforge(),
            otf2ttf: fontforge(),
            image_optimizer: Vec::new(),
        }
    }
}

impl ToolsConfig {
    /// Names of configured commands that are empty (and therefore unusable).
    pub fn empty_required(&self) -> Vec<&'static str> {
        [
            ("tools.sass", &self.sass),
            ("tools.sass_dev", &self.sass_dev),
            ("tools.woff", &self.woff),
            ("tools.woff2", &self.woff2),
            ("tools.otf2ttf", &self.otf2ttf),
        ]
        .into_iter()
        .filter(|(_, cmd)| cmd.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
