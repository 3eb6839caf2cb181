//! Result assembly.
//!
//! Enriched hits are mapped to [`BookRecord`]s and collected into a
//! [`ResultTree`], then flattened back into catalog order.

use bookadvisor_shared::{BookRecord, RawHit};

/// Name of the group that holds one search's results.
pub const RESULTS_GROUP: &str = "results";

/// Ordered n-ary tree of records: leaves hold one record, groups hold
/// children in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultTree {
    Leaf(BookRecord),
    Group {
        name: String,
        children: Vec<ResultTree>,
    },
}

impl ResultTree {
    /// An empty named group.
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn leaf(record: BookRecord) -> Self {
        Self::Leaf(record)
    }

    /// Group name; `None` for a leaf.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Leaf(_) => None,
            Self::Group { name, .. } => Some(name),
        }
    }

    /// Append `child` to this group.
    ///
    /// # Panics
    ///
    /// Panics when called on a leaf. Leaves are terminal.
    pub fn add(&mut self, child: ResultTree) {
        match self {
            Self::Group { children, .. } => children.push(child),
            Self::Leaf(record) => panic!("cannot add a child to leaf '{}'", record.title()),
        }
    }

    /// Remove and return the child at `index`, or `None` if out of range.
    ///
    /// # Panics
    ///
    /// Panics when called on a leaf.
    pub fn remove(&mut self, index: usize) -> Option<ResultTree> {
        match self {
            Self::Group { children, .. } => {
                (index < children.len()).then(|| children.remove(index))
            }
            Self::Leaf(record) => panic!("cannot remove a child from leaf '{}'", record.title()),
        }
    }

    /// Pre-order, left-to-right list of every leaf's record. No de-duplication.
    pub fn flatten(&self) -> Vec<BookRecord> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<BookRecord>) {
        match self {
            Self::Leaf(record) => out.push(record.clone()),
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_into(out);
                }
            }
        }
    }

    /// Number of leaves below (or at) this node.
    pub fn len(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => children.iter().map(ResultTree::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map an enriched hit to its canonical record.
pub fn to_record(hit: &RawHit, description: String, cover_url_template: &str) -> BookRecord {
    BookRecord::builder()
        .title(hit.title.clone())
        .author(hit.author())
        .cover_url(hit.cover_url(cover_url_template))
        .publish_date(hit.publish_date())
        .key(hit.key.clone())
        .description(description)
        .build()
}

/// Collect `records` into a one-level group named `name`.
pub fn assemble(name: &str, records: impl IntoIterator<Item = BookRecord>) -> ResultTree {
    let mut group = ResultTree::group(name);
    for record in records {
        group.add(ResultTree::leaf(record));
    }
    group
}
