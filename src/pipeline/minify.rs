//! In-process minification and prefixing.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::rules::{CssRule, CssRuleList, media::MediaRule};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify a classic (non-module) script.
///
/// Parsed in script mode, so top-level declarations are neither dropped nor
/// renamed: globals referenced from markup (`onclick="openMenu()"`) survive.
pub fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Group media queries, add vendor prefixes for `browsers` and print,
/// optionally minified.
pub fn process_css(source: &str, browsers: Browsers, minify: bool) -> Result<String, String> {
    let mut stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
    group_media_queries(&mut stylesheet.rules);
    stylesheet
        .minify(MinifyOptions {
            targets: Targets::from(browsers),
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets: Targets::from(browsers),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}

/// Merge top-level `@media` blocks sharing a query into one block.
///
/// Grouped blocks follow every other rule, in order of first appearance.
fn group_media_queries(rules: &mut CssRuleList<'_>) {
    let mut plain = Vec::with_capacity(rules.0.len());
    let mut media: Vec<MediaRule<'_>> = Vec::new();

    for rule in rules.0.drain(..) {
        match rule {
            CssRule::Media(mut block) => match media.iter_mut().find(|m| m.query == block.query) {
                Some(group) => group.rules.0.append(&mut block.rules.0),
                None => media.push(block),
            },
            other => plain.push(other),
        }
    }

    plain.extend(media.into_iter().map(CssRule::Media));
    rules.0 = plain;
}
