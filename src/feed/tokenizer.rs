//! Adapter from `quick-xml`'s namespace-aware reader to [`Token`]s.

use std::borrow::Cow;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{LocalName, ResolveResult};
use quick_xml::NsReader;

use super::error::ParseError;
use super::token::{Attributes, QName, Token};

/// Pulls [`Token`]s out of a complete in-memory XML document.
///
/// Element and attribute names are resolved against the namespace
/// declarations in scope; the declarations themselves are not reported as
/// attributes. Self-closing elements produce a start and an end token.
/// Comments, processing instructions, the XML declaration, the DOCTYPE and
/// whitespace outside the root element are skipped.
///
/// The iterator ends after the first error.
pub struct Tokenizer<'a> {
    reader: NsReader<&'a [u8]>,
    input: &'a [u8],
    depth: usize,
    seen_root: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut reader = NsReader::from_reader(input);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            input,
            depth: 0,
            seen_root: false,
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => return Err(self.error_at(self.reader.error_position(), e.to_string())),
            };

            match event {
                Event::Start(start) => {
                    if self.depth == 0 && self.seen_root {
                        return Err(self.error_here("document has more than one root element"));
                    }
                    self.seen_root = true;
                    self.depth += 1;
                    let (name, attributes) = self.resolve_start(&start)?;
                    return Ok(Some(Token::ElementStart { name, attributes }));
                }
                Event::End(end) => {
                    self.depth = self.depth.saturating_sub(1);
                    let (ns, local) = self.reader.resolve_element(end.name());
                    let name = self.qname(ns, local)?;
                    return Ok(Some(Token::ElementEnd { name }));
                }
                Event::Text(text) => {
                    let raw = normalize_newlines(self.utf8(&text)?);
                    let text = match unescape(&raw) {
                        Ok(text) => text,
                        Err(e) => return Err(self.error_here(e.to_string())),
                    };
                    if self.depth == 0 {
                        if text.trim().is_empty() {
                            continue;
                        }
                        return Err(self.error_here("text outside the root element"));
                    }
                    return Ok(Some(Token::Text(text.into_owned())));
                }
                Event::CData(cdata) => {
                    if self.depth == 0 {
                        return Err(self.error_here("CDATA outside the root element"));
                    }
                    let text = normalize_newlines(self.utf8(&cdata)?);
                    return Ok(Some(Token::Text(text.into_owned())));
                }
                Event::Eof => {
                    if !self.seen_root {
                        return Err(self.error_here("document has no root element"));
                    }
                    if self.depth > 0 {
                        return Err(self.error_here(format!(
                            "document ended with {} unclosed element(s)",
                            self.depth
                        )));
                    }
                    return Ok(None);
                }
                Event::Empty(_)
                | Event::Comment(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => continue,
            }
        }
    }

    fn resolve_start(&self, start: &BytesStart<'_>) -> Result<(QName, Attributes), ParseError> {
        let (ns, local) = self.reader.resolve_element(start.name());
        let name = self.qname(ns, local)?;

        let mut attributes = Attributes::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.error_here(e.to_string()))?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (ns, local) = self.reader.resolve_attribute(attr.key);
            let key = self.qname(ns, local)?;
            let raw = normalize_newlines(self.utf8(&attr.value)?);
            let value = unescape(&raw).map_err(|e| self.error_here(e.to_string()))?;
            attributes.push(key, value);
        }
        Ok((name, attributes))
    }

    fn qname(&self, ns: ResolveResult<'_>, local: LocalName<'_>) -> Result<QName, ParseError> {
        let local = self.utf8(local.as_ref())?.to_owned();
        match ns {
            ResolveResult::Bound(ns) => Ok(QName::qualified(self.utf8(ns.as_ref())?, local)),
            ResolveResult::Unbound => Ok(QName::local(local)),
            ResolveResult::Unknown(prefix) => Err(self.error_here(format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ))),
        }
    }

    fn utf8<'b>(&self, bytes: &'b [u8]) -> Result<&'b str, ParseError> {
        std::str::from_utf8(bytes).map_err(|e| self.error_here(format!("invalid UTF-8: {e}")))
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.reader.buffer_position(), message)
    }

    fn error_at(&self, offset: u64, message: impl Into<String>) -> ParseError {
        let (line, column) = line_and_column(self.input, offset);
        ParseError::Tokenizer {
            message: message.into(),
            line,
            column,
            offset,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// 1-based line and column (in bytes) of `offset` within `input`.
fn line_and_column(input: &[u8], offset: u64) -> (u64, u64) {
    let end = usize::try_from(offset).unwrap_or(usize::MAX).min(input.len());
    let before = &input[..end];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    (line as u64, (end - line_start) as u64 + 1)
}

/// End-of-line handling of XML 1.0 section 2.11: `\r\n` and a lone `\r`
/// become `\n`. Runs before entity expansion, so `&#13;` survives.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Decodes a whole document into tokens, stopping at the first error.
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(input).collect()
}
