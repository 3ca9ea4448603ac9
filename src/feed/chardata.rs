/// Text buffer shared by every handler: collects consecutive text chunks
/// into one string per element scope.
///
/// An untouched buffer is *absent* (`None`), which is distinct from an
/// element that produced an empty string.
#[derive(Debug, Default)]
pub struct Chardata {
    buf: Option<String>,
}

impl Chardata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) {
        match &mut self.buf {
            Some(buf) => buf.push_str(chunk),
            None => self.buf = Some(chunk.to_owned()),
        }
    }

    /// Returns the buffered text and resets the buffer to absent.
    pub fn flush(&mut self) -> Option<String> {
        self.buf.take()
    }

    /// Overwrites the buffer, as if `text` had been the only chunk seen.
    pub fn replace(&mut self, text: String) {
        self.buf = Some(text);
    }
}
