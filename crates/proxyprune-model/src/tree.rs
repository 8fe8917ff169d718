use proxyprune_types::BundlePath;
use std::collections::BTreeMap;

/// Abstract file tree extracted from a bundle archive: relative path -> bytes.
///
/// Keys are canonical [`BundlePath`]s, so iteration is lexicographic and the
/// same tree always serializes to the same archive entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileTree {
    entries: BTreeMap<BundlePath, Vec<u8>>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: BundlePath, bytes: Vec<u8>) {
        self.entries.insert(path, bytes);
    }

    pub fn get(&self, path: &BundlePath) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &BundlePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn remove(&mut self, path: &BundlePath) -> Option<Vec<u8>> {
        self.entries.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BundlePath, &[u8])> {
        self.entries.iter().map(|(p, b)| (p, b.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &BundlePath> {
        self.entries.keys()
    }

    /// Paths directly under `prefix` or anywhere below it, in tree order.
    pub fn paths_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a BundlePath> {
        self.entries.keys().filter(move |p| p.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of a single entry, zero when absent.
    pub fn byte_len(&self, path: &BundlePath) -> u64 {
        self.get(path).map(|b| b.len() as u64).unwrap_or(0)
    }
}

impl FromIterator<(BundlePath, Vec<u8>)> for FileTree {
    fn from_iter<T: IntoIterator<Item = (BundlePath, Vec<u8>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
