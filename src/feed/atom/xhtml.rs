use quick_xml::escape::partial_escape;

use crate::feed::chardata::Chardata;
use crate::feed::dispatcher::{Handler, HandlerResult, Signal};
use crate::feed::error::ParseError;
use crate::feed::format::Fragment;
use crate::feed::token::{Attributes, QName};

/// HTML elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Re-serializes the XHTML children of `<content type="xhtml">` as an HTML
/// string.
///
/// Namespaces are dropped from element and attribute names. The handler
/// finishes when the element that opened its scope closes, so the wrapping
/// `<div>` required by Atom is part of the output.
#[derive(Debug, Default)]
pub struct XhtmlHandler {
    output: String,
    text: Chardata,
    nesting: usize,
}

impl XhtmlHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_text(&mut self, text: &str) {
        self.output.push_str(&partial_escape(text));
    }

    fn write_attributes(&mut self, attributes: &Attributes) {
        for (name, value) in attributes.iter() {
            if name.is_unqualified("xmlns") {
                continue;
            }
            let value = partial_escape(value).replace('"', "&quot;");
            self.output.push(' ');
            self.output.push_str(&name.local);
            self.output.push_str("=\"");
            self.output.push_str(&value);
            self.output.push('"');
        }
    }
}

impl Handler<Fragment> for XhtmlHandler {
    fn element_start(&mut self, name: &QName, attributes: &Attributes) -> HandlerResult<Fragment> {
        if let Some(text) = self.text.flush().filter(|t| !t.is_empty()) {
            self.write_text(&text);
        }

        self.output.push('<');
        self.output.push_str(&name.local);
        self.write_attributes(attributes);
        self.output.push('>');

        self.nesting += 1;
        Ok(Signal::Continue)
    }

    fn element_end(&mut self, name: &QName) -> HandlerResult<Fragment> {
        if !VOID_ELEMENTS.contains(&name.local.as_str()) {
            if let Some(text) = self.text.flush() {
                self.write_text(&text);
            }
            self.output.push_str("</");
            self.output.push_str(&name.local);
            self.output.push('>');
        }

        self.nesting = self.nesting.checked_sub(1).ok_or_else(|| {
            ParseError::InternalConsistency(format!("unbalanced end tag in xhtml content: {name}"))
        })?;
        if self.nesting == 0 {
            return Ok(Signal::Finished(Fragment::Html(std::mem::take(&mut self.output))));
        }
        Ok(Signal::Continue)
    }

    fn text(&mut self, chunk: &str) -> HandlerResult<Fragment> {
        self.text.push(chunk);
        Ok(Signal::Continue)
    }
}
