use std::collections::HashSet;

use ark_types::Fingerprint;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw file content.
    Blob,
    /// Directory listing: ordered entries naming blobs and subtrees.
    Tree,
    /// Snapshot pointer with parent link and description.
    Commit,
}

impl ObjectKind {
    /// The literal tag written on the first line of an object record and at
    /// the start of every tree line.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "comm",
        }
    }

    /// Parse a persisted tag. Anything but the three literals is rejected.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "comm" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag + serialized content.
///
/// `StoredObject` is the unit of storage. Its fingerprint is the hash of
/// `data` alone; the kind travels beside it in the record header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Compute the content-addressed fingerprint for this object.
    pub fn compute_id(&self) -> Fingerprint {
        Fingerprint::of(&self.data)
    }

    /// Encode as an on-disk record: `<tag>\n<data>`.
    pub fn encode(&self) -> Vec<u8> {
        let tag = self.kind.tag().as_bytes();
        let mut out = Vec::with_capacity(tag.len() + 1 + self.data.len());
        out.extend_from_slice(tag);
        out.push(b'\n');
        out.extend_from_slice(&self.data);
        out
    }

    /// Decode an on-disk record stored under `id`.
    pub fn decode(id: Fingerprint, record: &[u8]) -> StoreResult<Self> {
        let split = record
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| StoreError::corrupt(id, "missing kind tag line"))?;
        let tag = std::str::from_utf8(&record[..split])
            .ok()
            .and_then(ObjectKind::from_tag)
            .ok_or_else(|| {
                StoreError::corrupt(
                    id,
                    format!(
                        "unknown kind tag {:?}",
                        String::from_utf8_lossy(&record[..split])
                    ),
                )
            })?;
        Ok(Self::new(tag, record[split + 1..].to_vec()))
    }

    fn expect_kind(&self, expected: ObjectKind) -> StoreResult<()> {
        if self.kind != expected {
            return Err(StoreError::corrupt(
                self.compute_id(),
                format!("expected {expected}, got {}", self.kind),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content of exactly one file. No permissions, no timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Fingerprint of the raw bytes.
    pub fn id(&self) -> Fingerprint {
        Fingerprint::of(&self.data)
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self { data: obj.data })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Check that `name` can stand as one tree entry.
///
/// Names are single path segments: not empty, not `.` or `..`, and free of
/// `/`, NUL and newlines (a newline would split the tree line). A backslash
/// is an ordinary character on Unix; it is only refused on Windows, where
/// it separates paths.
pub fn validate_entry_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty entry name".into());
    }
    if name == "." || name == ".." {
        return Err(format!("reserved entry name {name:?}"));
    }
    let forbidden = |c: &char| matches!(*c, '/' | '\n' | '\0') || (cfg!(windows) && *c == '\\');
    if let Some(c) = name.chars().find(forbidden) {
        return Err(format!("entry name {name:?} contains {c:?}"));
    }
    Ok(())
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// `Blob` or `Tree`; commits never appear inside trees.
    pub kind: ObjectKind,
    /// Entry name (file name or directory name).
    pub name: String,
    /// Fingerprint of the referenced object.
    pub fingerprint: Fingerprint,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(kind: ObjectKind, name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            kind,
            name: name.into(),
            fingerprint,
        }
    }

    /// Create an entry that points at a blob.
    pub fn blob(name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self::new(ObjectKind::Blob, name, fingerprint)
    }

    /// Create an entry that points at a subtree.
    pub fn tree(name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self::new(ObjectKind::Tree, name, fingerprint)
    }
}

/// Directory snapshot: entries in the order they were assigned.
///
/// The order is part of the tree's identity. Builders decide it; decoding
/// preserves it exactly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree with the given entries, in the given order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Serialize as newline-joined `<kind> <fingerprint> <name>` lines with no
    /// trailing newline.
    pub fn serialize(&self) -> Vec<u8> {
        self.entries
            .iter()
            .map(|e| format!("{} {} {}", e.kind.tag(), e.fingerprint, e.name))
            .collect::<Vec<_>>()
            .join("\n")
            .into_bytes()
    }

    /// Fingerprint of the serialized entry list.
    pub fn id(&self) -> Fingerprint {
        Fingerprint::of(&self.serialize())
    }

    /// Parse a serialized tree stored under `id`.
    pub fn decode(id: Fingerprint, data: &[u8]) -> StoreResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| StoreError::corrupt(id, format!("tree is not UTF-8: {e}")))?;
        if text.is_empty() {
            return Ok(Self::empty());
        }

        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for (idx, line) in text.split('\n').enumerate() {
            let bad = |reason: String| {
                StoreError::corrupt(id, format!("line {}: {reason}", idx + 1))
            };

            let (tag, rest) = line
                .split_once(' ')
                .ok_or_else(|| bad(format!("missing separator in {line:?}")))?;
            let kind = match ObjectKind::from_tag(tag) {
                Some(kind @ (ObjectKind::Blob | ObjectKind::Tree)) => kind,
                _ => return Err(bad(format!("unknown entry kind {tag:?}"))),
            };
            let (hex, name) = rest
                .split_once(' ')
                .ok_or_else(|| bad(format!("missing separator in {line:?}")))?;
            let fingerprint = Fingerprint::from_hex(hex).map_err(|e| bad(e.to_string()))?;
            validate_entry_name(name).map_err(bad)?;
            if !seen.insert(name) {
                return Err(bad(format!("duplicate entry name {name:?}")));
            }
            entries.push(TreeEntry::new(kind, name, fingerprint));
        }
        Ok(Self { entries })
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Tree, self.serialize())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        Self::decode(obj.compute_id(), &obj.data)
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// One link of the history chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: Fingerprint,
    /// Previous commit, or `None` for the first commit.
    pub parent: Option<Fingerprint>,
    /// Free-form text, stored verbatim.
    pub description: String,
}

impl Commit {
    pub fn new(
        tree: Fingerprint,
        parent: Option<Fingerprint>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            description: description.into(),
        }
    }

    /// Serialize as `parent:<fp>\ntree:<fp>\n\n<description>`.
    ///
    /// A root commit writes an empty parent.
    pub fn serialize(&self) -> Vec<u8> {
        let parent = self.parent.map(|p| p.to_hex()).unwrap_or_default();
        format!("parent:{parent}\ntree:{}\n\n{}", self.tree, self.description).into_bytes()
    }

    /// Fingerprint of the serialized commit.
    pub fn id(&self) -> Fingerprint {
        Fingerprint::of(&self.serialize())
    }

    /// Parse a serialized commit stored under `id`.
    pub fn decode(id: Fingerprint, data: &[u8]) -> StoreResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| StoreError::corrupt(id, format!("commit is not UTF-8: {e}")))?;
        let (header, description) = text
            .split_once("\n\n")
            .ok_or_else(|| StoreError::corrupt(id, "missing blank line after commit header"))?;

        let mut lines = header.split('\n');
        let parent = lines
            .next()
            .and_then(|l| l.strip_prefix("parent:"))
            .ok_or_else(|| StoreError::corrupt(id, "missing parent: header"))?;
        let tree = lines
            .next()
            .and_then(|l| l.strip_prefix("tree:"))
            .ok_or_else(|| StoreError::corrupt(id, "missing tree: header"))?;
        if let Some(extra) = lines.next() {
            return Err(StoreError::corrupt(
                id,
                format!("unexpected header line {extra:?}"),
            ));
        }

        let parent = if parent.is_empty() {
            None
        } else {
            Some(
                Fingerprint::from_hex(parent)
                    .map_err(|e| StoreError::corrupt(id, format!("bad parent: {e}")))?,
            )
        };
        let tree = Fingerprint::from_hex(tree)
            .map_err(|e| StoreError::corrupt(id, format!("bad tree: {e}")))?;

        Ok(Self::new(tree, parent, description))
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Commit, self.serialize())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        Self::decode(obj.compute_id(), &obj.data)
    }

    /// Returns `true` for the first commit of a history.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fp(seed: &[u8]) -> Fingerprint {
        Fingerprint::of(seed)
    }

    #[test]
    fn blob_serialization_is_identity() {
        let blob = Blob::new(b"hello".to_vec());
        let stored = blob.to_stored_object();
        assert_eq!(stored.data, b"hello");
        assert_eq!(stored.compute_id(), Fingerprint::of(b"hello"));
        assert_eq!(blob.id(), stored.compute_id());
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, Vec::new());
        let err = Blob::from_stored_object(stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn record_encoding_layout() {
        let stored = StoredObject::new(ObjectKind::Commit, b"body\nmore".to_vec());
        assert_eq!(stored.encode(), b"comm\nbody\nmore");
        let decoded = StoredObject::decode(stored.compute_id(), &stored.encode()).unwrap();
        assert_eq!(decoded, stored);
    }

    #[test]
    fn record_with_unknown_tag_is_corrupt() {
        let err = StoredObject::decode(fp(b"x"), b"blb\ncontent").unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn record_without_tag_line_is_corrupt() {
        let err = StoredObject::decode(fp(b"x"), b"blob").unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn record_with_empty_body() {
        let decoded = StoredObject::decode(fp(b""), b"blob\n").unwrap();
        assert_eq!(decoded.kind, ObjectKind::Blob);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn tree_serialization_format() {
        let a = fp(b"a");
        let sub = fp(b"sub");
        let tree = Tree::new(vec![TreeEntry::blob("a.txt", a), TreeEntry::tree("src", sub)]);
        let text = String::from_utf8(tree.serialize()).unwrap();
        assert_eq!(text, format!("blob {a} a.txt\ntree {sub} src"));
    }

    #[test]
    fn tree_keeps_assigned_order() {
        let tree = Tree::new(vec![
            TreeEntry::blob("zebra.txt", fp(b"z")),
            TreeEntry::blob("alpha.txt", fp(b"a")),
        ]);
        let decoded = Tree::decode(tree.id(), &tree.serialize()).unwrap();
        assert_eq!(decoded.entries[0].name, "zebra.txt");
        assert_eq!(decoded, tree);
    }

    #[test]
    fn empty_tree_has_fingerprint_of_nothing() {
        let tree = Tree::empty();
        assert!(tree.serialize().is_empty());
        assert_eq!(tree.id(), Fingerprint::of(b""));
        assert_eq!(Tree::decode(tree.id(), b"").unwrap(), tree);
    }

    #[test]
    fn tree_names_may_contain_spaces() {
        let tree = Tree::new(vec![TreeEntry::blob("my notes.txt", fp(b"n"))]);
        let decoded = Tree::decode(tree.id(), &tree.serialize()).unwrap();
        assert_eq!(decoded.entries[0].name, "my notes.txt");
    }

    #[test]
    fn tree_line_without_separator_is_corrupt() {
        let err = Tree::decode(fp(b"t"), b"blobonly").unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_line_with_commit_kind_is_corrupt() {
        let line = format!("comm {} x", fp(b"c"));
        let err = Tree::decode(fp(b"t"), line.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_line_with_bad_fingerprint_is_corrupt() {
        let err = Tree::decode(fp(b"t"), b"blob nothex a.txt").unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_with_traversal_name_is_corrupt() {
        for name in ["..", ".", "a/b", ""] {
            let line = format!("blob {} {name}", fp(b"a"));
            let err = Tree::decode(fp(b"t"), line.as_bytes()).unwrap_err();
            assert!(matches!(err, StoreError::CorruptObject { .. }), "{name:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn backslash_is_an_ordinary_name_character() {
        assert!(validate_entry_name("a\\b.txt").is_ok());
        let tree = Tree::new(vec![TreeEntry::blob("a\\b.txt", fp(b"a"))]);
        let decoded = Tree::decode(tree.id(), &tree.serialize()).unwrap();
        assert_eq!(decoded.entries[0].name, "a\\b.txt");
    }

    #[test]
    fn tree_with_duplicate_names_is_corrupt() {
        let text = format!("blob {} a\ntree {} a", fp(b"1"), fp(b"2"));
        let err = Tree::decode(fp(b"t"), text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_get_entry() {
        let tree = Tree::new(vec![
            TreeEntry::blob("a.txt", fp(b"a")),
            TreeEntry::blob("b.txt", fp(b"b")),
        ]);
        assert!(tree.get("a.txt").is_some());
        assert!(tree.get("missing").is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn commit_serialization_format() {
        let tree = fp(b"tree");
        let parent = fp(b"parent");
        let commit = Commit::new(tree, Some(parent), "second");
        let text = String::from_utf8(commit.serialize()).unwrap();
        assert_eq!(text, format!("parent:{parent}\ntree:{tree}\n\nsecond"));
    }

    #[test]
    fn root_commit_has_empty_parent() {
        let tree = fp(b"tree");
        let commit = Commit::new(tree, None, "first");
        let text = String::from_utf8(commit.serialize()).unwrap();
        assert!(text.starts_with("parent:\ntree:"));
        let decoded = Commit::decode(commit.id(), text.as_bytes()).unwrap();
        assert!(decoded.is_root());
        assert_eq!(decoded, commit);
    }

    #[test]
    fn commit_description_keeps_blank_lines() {
        let commit = Commit::new(fp(b"t"), Some(fp(b"p")), "\nsubject\n\nbody\n\n");
        let decoded = Commit::decode(commit.id(), &commit.serialize()).unwrap();
        assert_eq!(decoded.description, "\nsubject\n\nbody\n\n");
    }

    #[test]
    fn commit_missing_blank_line_is_corrupt() {
        let text = format!("parent:\ntree:{}", fp(b"t"));
        let err = Commit::decode(fp(b"c"), text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn commit_missing_prefix_is_corrupt() {
        let text = format!("parent:\ntrunk:{}\n\ndesc", fp(b"t"));
        let err = Commit::decode(fp(b"c"), text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));

        let text = format!("tree:{}\n\ndesc", fp(b"t"));
        let err = Commit::decode(fp(b"c"), text.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn commit_read_as_tree_is_corrupt() {
        let stored = Commit::new(fp(b"t"), None, "x").to_stored_object();
        let err = Tree::from_stored_object(&stored).unwrap_err();
        match err {
            StoreError::CorruptObject { reason, .. } => {
                assert_eq!(reason, "expected tree, got commit")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tags_are_the_persisted_literals() {
        assert_eq!(ObjectKind::Blob.tag(), "blob");
        assert_eq!(ObjectKind::Tree.tag(), "tree");
        assert_eq!(ObjectKind::Commit.tag(), "comm");
        assert_eq!(ObjectKind::from_tag("commit"), None);
    }

    fn entry_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_. -]{1,24}".prop_filter("reserved", |s| s != "." && s != "..")
    }

    proptest! {
        #[test]
        fn tree_decode_inverts_serialize(
            names in proptest::collection::hash_set(entry_name(), 0..12),
            dirs in proptest::collection::vec(any::<bool>(), 12),
        ) {
            let entries: Vec<TreeEntry> = names
                .into_iter()
                .zip(dirs)
                .map(|(name, dir)| {
                    let id = Fingerprint::of(name.as_bytes());
                    if dir { TreeEntry::tree(name, id) } else { TreeEntry::blob(name, id) }
                })
                .collect();
            let tree = Tree::new(entries);
            prop_assert_eq!(Tree::decode(tree.id(), &tree.serialize()).unwrap(), tree);
        }

        #[test]
        fn commit_decode_inverts_serialize(
            description in "(?s).{0,200}",
            has_parent in any::<bool>(),
        ) {
            let parent = has_parent.then(|| Fingerprint::of(b"parent"));
            let commit = Commit::new(Fingerprint::of(b"tree"), parent, description);
            prop_assert_eq!(Commit::decode(commit.id(), &commit.serialize()).unwrap(), commit);
        }
    }
}
