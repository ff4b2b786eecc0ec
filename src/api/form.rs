/// Fields of an `application/x-www-form-urlencoded` request.
///
/// Array values are kept Django-style as repeated keys (`links=1&links=2`),
/// never with bracket or index notation. Field order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FormPayload {
    pairs: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(action: &str) -> Self {
        Self::new().field("action", action)
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// An empty list contributes no pairs at all.
    pub fn list<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            self.pairs.push((key.to_string(), v.into()));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Pairs in insertion order, ready for `RequestBuilder::form`.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
