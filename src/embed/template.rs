//! Embedded text assets with typed placeholder substitution.
//!
//! Placeholders are spelled `__KILN_<NAME>__` inside the asset.

use std::marker::PhantomData;

/// A set of values substituted into one embedded asset.
pub trait TemplateVars {
    /// `(NAME, value)` pairs; `NAME` is the part between `__KILN_` and `__`.
    fn placeholders(&self) -> Vec<(&'static str, String)>;
}

/// An embedded asset that can only be rendered with its own variable set.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _vars: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _vars: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.placeholders()
            .into_iter()
            .fold(self.content.to_owned(), |text, (name, value)| {
                text.replace(&format!("__KILN_{name}__"), &value)
            })
    }
}
