//! Visible-text extraction
//!
//! Text inside `<script>`, `<style>`, `<noscript>` and `<template>` is
//! dropped, and runs of whitespace collapse to a single space.

use scraper::{Html, Node};

/// Turns a response body into the text that gets stored
pub trait TextExtractor: Send + Sync {
    fn extract(&self, body: &[u8]) -> String;
}

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// [`TextExtractor`] for HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextExtractor;

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, body: &[u8]) -> String {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let mut text = String::new();
        for node in document.root_element().descendants() {
            let Node::Text(chunk) = node.value() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if hidden {
                continue;
            }

            text.push_str(chunk);
            text.push(' ');
        }

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
