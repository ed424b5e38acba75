/// A key/value pair stored in a bucket. The key is fixed at insertion.
#[derive(Clone, Debug)]
pub(crate) struct Entry<V> {
    key: String,
    value: V,
}

impl<V> Entry<V> {
    pub(crate) fn new(key: String, value: V) -> Self {
        Self { key, value }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }
}
