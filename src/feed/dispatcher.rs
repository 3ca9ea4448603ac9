//! Event dispatch over an explicit stack of handlers.
//!
//! Each handler owns one nesting scope of the document. A handler that sees
//! the start of a nested structure returns [`Signal::Delegate`] with a new
//! handler for it; the new handler receives every following event until it
//! returns [`Signal::Finished`], at which point it is popped and its result
//! is handed to the handler below (if that handler is a
//! [`ResultReceiver`]). Nesting depth is limited by memory, not by the call
//! stack.

use super::error::ParseError;
use super::token::{Attributes, QName, Token};

/// What the dispatcher should do after a handler processed one event.
pub enum Signal<R> {
    Continue,
    /// Push the handler. The current event counts as consumed by the
    /// delegating handler and is not forwarded.
    Delegate(Box<dyn Handler<R>>),
    /// Pop the current handler and surface its result.
    Finished(R),
}

pub type HandlerResult<R> = Result<Signal<R>, ParseError>;

/// One scope's worth of parsing logic.
pub trait Handler<R> {
    fn element_start(&mut self, name: &QName, attributes: &Attributes) -> HandlerResult<R>;

    fn element_end(&mut self, name: &QName) -> HandlerResult<R>;

    fn text(&mut self, chunk: &str) -> HandlerResult<R>;

    /// Capability query for [`ResultReceiver`]. Handlers that want the
    /// results of the handlers they delegate to return `Some(self)`.
    fn as_receiver(&mut self) -> Option<&mut dyn ResultReceiver<R>> {
        None
    }
}

/// Accepts the result of the handler popped from directly above.
pub trait ResultReceiver<R> {
    fn receive_result(&mut self, result: R) -> Result<(), ParseError>;
}

/// A root handler the dispatcher may pick when it sees the first element.
pub struct Candidate<R> {
    pub name: &'static str,
    pub can_handle_start: fn(&QName, &Attributes) -> bool,
    pub build: fn() -> Box<dyn Handler<R>>,
}

/// Routes tokens to the top of the handler stack.
pub struct Dispatcher<R> {
    stack: Vec<Box<dyn Handler<R>>>,
    result: Option<R>,
    candidates: Vec<Candidate<R>>,
    started: bool,
}

impl<R: 'static> Dispatcher<R> {
    /// Creates a dispatcher that auto-detects its root handler from
    /// `candidates`, tried in order.
    pub fn new(candidates: Vec<Candidate<R>>) -> Self {
        Self {
            stack: Vec::new(),
            result: None,
            candidates,
            started: false,
        }
    }

    pub fn push_handler(&mut self, handler: Box<dyn Handler<R>>) {
        self.started = true;
        self.stack.push(handler);
    }

    pub fn handle_event(&mut self, token: Token) -> Result<(), ParseError> {
        if !self.started {
            if let Token::ElementStart { name, attributes } = &token {
                let root = self.auto_detect(name, attributes)?;
                self.push_handler(root);
            }
        }

        let handler = self
            .stack
            .last_mut()
            .ok_or(ParseError::HandlerStackDesync)?;

        let signal = match &token {
            Token::ElementStart { name, attributes } => handler.element_start(name, attributes)?,
            Token::ElementEnd { name } => handler.element_end(name)?,
            Token::Text(chunk) => handler.text(chunk)?,
        };

        match signal {
            Signal::Continue => Ok(()),
            Signal::Delegate(next) => {
                self.stack.push(next);
                tracing::trace!(depth = self.stack.len(), "Delegated to nested handler");
                Ok(())
            }
            Signal::Finished(result) => self.finish(result),
        }
    }

    fn finish(&mut self, result: R) -> Result<(), ParseError> {
        self.stack.pop();
        tracing::trace!(depth = self.stack.len(), "Handler finished");

        // results handed to a receiver are not kept
        match self.stack.last_mut().and_then(|top| top.as_receiver()) {
            Some(receiver) => receiver.receive_result(result),
            None => {
                self.result = Some(result);
                Ok(())
            }
        }
    }

    fn auto_detect(
        &self,
        name: &QName,
        attributes: &Attributes,
    ) -> Result<Box<dyn Handler<R>>, ParseError> {
        let candidate = self
            .candidates
            .iter()
            .find(|c| (c.can_handle_start)(name, attributes))
            .ok_or_else(|| ParseError::UnrecognizedRootElement(name.to_string()))?;

        tracing::debug!(format = candidate.name, root = %name, "Detected feed format");
        Ok((candidate.build)())
    }

    /// The last result that no handler consumed. Only meaningful once the
    /// root handler has finished.
    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<R> {
        self.result
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True once a root handler was installed and has since been popped.
    pub fn is_finished(&self) -> bool {
        self.started && self.stack.is_empty()
    }
}
