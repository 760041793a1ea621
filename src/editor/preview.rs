/// Receives the freshly serialized document after every structural edit.
pub trait PreviewSink {
    fn publish(&mut self, text: &str);
}

/// Keeps the latest published text in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewBuffer {
    text: String,
    publications: usize,
}

impl PreviewBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn publications(&self) -> usize {
        self.publications
    }
}

impl PreviewSink for PreviewBuffer {
    fn publish(&mut self, text: &str) {
        self.text = text.to_string();
        self.publications += 1;
    }
}
