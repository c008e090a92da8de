use fxhash::FxBuildHasher;
use indexmap::IndexMap;

type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Prefix of compiler-generated labels that are allowed to stay undefined.
///
/// A taken branch to an undefined label with this prefix ends the program.
pub const EXIT_LABEL_PREFIX: &str = ".L";

/// Symbol table of label -> command index.
///
/// Filled by the parser in a single pass before execution, so forward references resolve.
/// The index may equal the number of commands, meaning the label marks the end of the program.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    table: FxMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        LabelTable {
            table: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Record `name -> index`. Returns `false` and leaves the table untouched if `name` exists.
    pub fn insert(&mut self, name: &str, index: usize) -> bool {
        if self.table.contains_key(name) {
            return false;
        }
        self.table.insert(name.to_owned(), index);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.table.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Labels in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.table.iter().map(|(name, idx)| (name.as_str(), *idx))
    }
}

/// Whether an unresolved branch target is the synthetic end-of-program marker.
pub fn is_exit_label(name: &str) -> bool {
    name.starts_with(EXIT_LABEL_PREFIX)
}
