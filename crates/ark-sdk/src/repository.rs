use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ark_history::checkout_commit;
use ark_refs::{FileHeadStore, HeadStore};
use ark_store::{Commit, FsObjectStore, InMemoryObjectStore, ObjectKind, ObjectStore};
use ark_types::Fingerprint;
use ark_worktree::{TreeBuilder, WorktreeOptions};
use serde::Serialize;
use tracing::info;

use crate::config::RepoConfig;
use crate::error::{SdkError, SdkResult};

/// Name of the storage directory inside the working root.
pub const STORAGE_DIR: &str = ".ark";
const OBJECTS_DIR: &str = "objects";
const HEAD_FILE: &str = "HEAD";
const CONFIG_FILE: &str = "config.toml";

/// Shortest fingerprint prefix accepted by [`Repository::resolve`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Working tree compared to the HEAD snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Status {
    pub head: Option<Fingerprint>,
    /// Root tree the working directory would produce if committed now.
    pub working_tree: Fingerprint,
    /// `true` when the working tree matches the HEAD commit's tree (or,
    /// before the first commit, when there is nothing to commit).
    pub clean: bool,
}

/// Handle on one repository: a working root plus its `.ark` storage.
pub struct Repository {
    working_root: PathBuf,
    storage_root: PathBuf,
    store: FsObjectStore,
    head_store: FileHeadStore,
    head: Option<Fingerprint>,
    config: RepoConfig,
    options: WorktreeOptions,
}

impl Repository {
    /// Create `.ark/` (with `objects/`, an empty HEAD and a default config)
    /// under `working_root`.
    pub fn initialize(working_root: impl Into<PathBuf>) -> SdkResult<Self> {
        let working_root = working_root.into();
        let storage_root = working_root.join(STORAGE_DIR);
        fs::create_dir(&storage_root).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                SdkError::AlreadyInitialized(working_root.clone())
            } else {
                e.into()
            }
        })?;
        fs::create_dir(storage_root.join(OBJECTS_DIR))?;
        fs::write(storage_root.join(HEAD_FILE), "")?;
        RepoConfig::default().save(&storage_root.join(CONFIG_FILE))?;

        info!(root = %working_root.display(), "initialized repository");
        Self::open(working_root)
    }

    /// Open the repository whose working root is `working_root`.
    pub fn open(working_root: impl Into<PathBuf>) -> SdkResult<Self> {
        let working_root = working_root.into();
        let storage_root = working_root.join(STORAGE_DIR);
        if !storage_root.is_dir() {
            return Err(SdkError::NotInitialized(working_root));
        }

        let config = RepoConfig::load(&storage_root.join(CONFIG_FILE))?;
        let store = FsObjectStore::open(storage_root.join(OBJECTS_DIR))?
            .with_verify_on_read(config.verify_on_read);
        let head_store = FileHeadStore::new(storage_root.join(HEAD_FILE));
        let head = head_store.read_head()?;
        let options =
            WorktreeOptions::new(STORAGE_DIR).with_ignored(config.ignore.iter().cloned());

        Ok(Self {
            working_root,
            storage_root,
            store,
            head_store,
            head,
            config,
            options,
        })
    }

    /// Find the nearest repository at or above `start`.
    pub fn discover(start: &Path) -> SdkResult<Self> {
        start
            .ancestors()
            .find(|dir| dir.join(STORAGE_DIR).is_dir())
            .ok_or_else(|| SdkError::NotInitialized(start.to_path_buf()))
            .and_then(Self::open)
    }

    /// Like [`discover`](Self::discover), but a missing repository is `None`.
    pub fn discover_or_none(start: &Path) -> SdkResult<Option<Self>> {
        match Self::discover(start) {
            Ok(repo) => Ok(Some(repo)),
            Err(SdkError::NotInitialized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Discover from the current directory.
    pub fn open_or_none() -> SdkResult<Option<Self>> {
        Self::discover_or_none(&std::env::current_dir()?)
    }

    // ---- Accessors ----

    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ObjectStore {
        &self.store
    }

    /// Current commit, `None` before the first commit.
    pub fn head(&self) -> Option<Fingerprint> {
        self.head
    }

    // ---- History operations ----

    /// Snapshot the whole working directory and move HEAD to the new commit.
    pub fn commit(&mut self, description: &str) -> SdkResult<Fingerprint> {
        let id = ark_history::commit(
            &self.store,
            &self.working_root,
            self.head,
            description,
            &self.options,
        )?;
        self.set_head(id)?;
        info!(commit = %id.short_hex(), "committed");
        Ok(id)
    }

    /// Commits reachable from HEAD, most recent first.
    pub fn log(&self) -> impl Iterator<Item = SdkResult<(Fingerprint, Commit)>> + '_ {
        ark_history::log(&self.store, self.head).map(|entry| entry.map_err(SdkError::from))
    }

    /// Replace the working directory with the snapshot in `id` and move
    /// HEAD there. Any commit may be targeted, not just ancestors of HEAD.
    pub fn checkout(&mut self, id: &Fingerprint) -> SdkResult<Commit> {
        let commit = checkout_commit(&self.store, id, &self.working_root, &self.options)?;
        self.set_head(*id)?;
        info!(commit = %id.short_hex(), "checked out");
        Ok(commit)
    }

    /// Compare the working directory with HEAD without writing anything.
    pub fn status(&self) -> SdkResult<Status> {
        let scratch = InMemoryObjectStore::new();
        let working_tree = TreeBuilder::new(&scratch, &self.options)
            .build(&self.working_root)?
            .root_id();
        let clean = match self.head {
            Some(head) => self.store.read_commit(&head)?.tree == working_tree,
            None => working_tree == Fingerprint::of(b""),
        };
        Ok(Status {
            head: self.head,
            working_tree,
            clean,
        })
    }

    /// Turn user input into a commit fingerprint.
    ///
    /// Full 64-character hex is taken as is; whether it names a commit is
    /// left to the caller. Shorter input of at least [`MIN_PREFIX_LEN`] hex
    /// characters must match exactly one stored commit. Blobs and trees
    /// sharing the prefix are not considered.
    pub fn resolve(&self, input: &str) -> SdkResult<Fingerprint> {
        let input = input.trim();
        let invalid = |reason: &str| SdkError::InvalidFingerprint {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if let Ok(id) = Fingerprint::from_hex(input) {
            return Ok(id);
        }
        if input.len() < MIN_PREFIX_LEN || !input.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(
                "expected a hex fingerprint or a prefix of at least 4 characters",
            ));
        }

        let prefix = input.to_ascii_lowercase();
        let mut found = None;
        for id in self.store.all_ids()? {
            if !id.to_hex().starts_with(&prefix) {
                continue;
            }
            let is_commit = self
                .store
                .read(&id)?
                .is_some_and(|obj| obj.kind == ObjectKind::Commit);
            if !is_commit {
                continue;
            }
            if found.replace(id).is_some() {
                return Err(invalid("prefix matches more than one commit"));
            }
        }
        found.ok_or_else(|| invalid("no commit matches this prefix"))
    }

    fn set_head(&mut self, id: Fingerprint) -> SdkResult<()> {
        self.head_store.write_head(&id)?;
        self.head = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_store::Blob;

    fn init() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::initialize(dir.path()).unwrap();
        (dir, repo)
    }

    fn history(repo: &Repository) -> Vec<(Fingerprint, Commit)> {
        repo.log().collect::<SdkResult<Vec<_>>>().unwrap()
    }

    #[test]
    fn initialize_creates_layout() {
        let (dir, repo) = init();
        let storage = dir.path().join(".ark");
        assert!(storage.join("objects").is_dir());
        assert_eq!(fs::read_to_string(storage.join("HEAD")).unwrap(), "");
        assert!(storage.join("config.toml").is_file());
        assert_eq!(repo.head(), None);
        assert_eq!(repo.storage_root(), storage);
        assert_eq!(repo.config(), &RepoConfig::default());
        assert_eq!(repo.log().count(), 0);
    }

    #[test]
    fn initialize_twice_fails() {
        let (dir, _repo) = init();
        let err = Repository::initialize(dir.path()).err().unwrap();
        assert!(matches!(err, SdkError::AlreadyInitialized(_)));
    }

    #[test]
    fn discover_walks_up_from_subdirectory() {
        let (dir, _repo) = init();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        let repo = Repository::discover(&nested).unwrap();
        assert_eq!(repo.working_root(), dir.path());
    }

    #[test]
    fn discover_without_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = Repository::discover(dir.path()).err().unwrap();
        assert!(matches!(err, SdkError::NotInitialized(_)));
        assert!(Repository::discover_or_none(dir.path()).unwrap().is_none());
    }

    #[test]
    fn first_commit_scenario() {
        let (dir, mut repo) = init();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let id = repo.commit("first").unwrap();

        assert_eq!(repo.head(), Some(id));
        assert_eq!(
            fs::read_to_string(dir.path().join(".ark/HEAD")).unwrap(),
            id.to_hex()
        );
        let objects: Vec<_> = fs::read_dir(dir.path().join(".ark/objects"))
            .unwrap()
            .collect();
        assert_eq!(objects.len(), 3);

        let log = history(&repo);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, id);
        assert_eq!(log[0].1.description, "first");
        assert!(log[0].1.is_root());

        let reopened = Repository::discover(dir.path()).unwrap();
        assert_eq!(reopened.head(), Some(id));
    }

    #[test]
    fn checkout_earlier_commit_removes_later_files() {
        let (dir, mut repo) = init();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        let first = repo.commit("one").unwrap();
        fs::write(dir.path().join("b.txt"), "two").unwrap();
        let second = repo.commit("two").unwrap();

        let commit = repo.checkout(&first).unwrap();

        assert_eq!(commit.description, "one");
        assert!(dir.path().join("a.txt").exists());
        assert!(!dir.path().join("b.txt").exists());
        assert!(dir.path().join(".ark/objects").is_dir());
        assert_eq!(repo.head(), Some(first));
        assert_eq!(history(&repo).len(), 1);

        repo.checkout(&second).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "two");
        assert_eq!(history(&repo).len(), 2);
    }

    #[test]
    fn checkout_unknown_commit_keeps_head() {
        let (dir, mut repo) = init();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        let first = repo.commit("one").unwrap();

        let err = repo.checkout(&Fingerprint::of(b"missing")).unwrap_err();

        assert!(matches!(err, SdkError::ObjectNotFound(_)));
        assert_eq!(repo.head(), Some(first));
        assert!(dir.path().join("a.txt").exists());
    }

    #[test]
    fn status_tracks_changes() {
        let (dir, mut repo) = init();
        assert!(repo.status().unwrap().clean);

        fs::write(dir.path().join("a.txt"), "one").unwrap();
        assert!(!repo.status().unwrap().clean);

        let id = repo.commit("one").unwrap();
        let status = repo.status().unwrap();
        assert_eq!(status.head, Some(id));
        assert!(status.clean);

        fs::write(dir.path().join("a.txt"), "changed").unwrap();
        assert!(!repo.status().unwrap().clean);
    }

    #[test]
    fn status_writes_nothing() {
        let (dir, repo) = init();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        repo.status().unwrap();
        assert_eq!(fs::read_dir(dir.path().join(".ark/objects")).unwrap().count(), 0);
    }

    #[test]
    fn configured_names_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        Repository::initialize(dir.path()).unwrap();
        RepoConfig {
            ignore: vec![".git".into(), "target".into()],
            verify_on_read: true,
        }
        .save(&dir.path().join(".ark/config.toml"))
        .unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/out.bin"), "build").unwrap();
        fs::write(dir.path().join("src.txt"), "src").unwrap();

        let mut repo = Repository::open(dir.path()).unwrap();
        let id = repo.commit("c").unwrap();
        let tree = repo
            .store()
            .read_tree(&repo.store().read_commit(&id).unwrap().tree)
            .unwrap();

        assert!(tree.get("target").is_none());
        assert!(tree.get("src.txt").is_some());

        repo.checkout(&id).unwrap();
        assert!(dir.path().join("target/out.bin").exists());
    }

    #[test]
    fn checkout_of_commit_with_newly_ignored_name_keeps_working_directory() {
        let (dir, mut repo) = init();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/t"), "t").unwrap();
        fs::write(dir.path().join("keep.txt"), "keep").unwrap();
        let id = repo.commit("with target").unwrap();
        fs::write(dir.path().join("keep.txt"), "edited").unwrap();
        RepoConfig {
            ignore: vec![".git".into(), "target".into()],
            verify_on_read: true,
        }
        .save(&dir.path().join(".ark/config.toml"))
        .unwrap();

        let mut repo = Repository::open(dir.path()).unwrap();
        let err = repo.checkout(&id).unwrap_err();

        assert!(matches!(err, SdkError::DestinationConflict(p) if p.ends_with("target")));
        assert_eq!(fs::read_to_string(dir.path().join("keep.txt")).unwrap(), "edited");
        assert!(dir.path().join("target/t").exists());
    }

    #[test]
    fn resolve_full_and_prefix() {
        let (dir, mut repo) = init();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        let id = repo.commit("one").unwrap();
        let hex = id.to_hex();

        assert_eq!(repo.resolve(&hex).unwrap(), id);
        assert_eq!(repo.resolve(&hex[..12]).unwrap(), id);
        assert_eq!(repo.resolve(&hex[..12].to_uppercase()).unwrap(), id);
        assert!(matches!(
            repo.resolve("ab"),
            Err(SdkError::InvalidFingerprint { .. })
        ));
        assert!(matches!(
            repo.resolve("not-hex!"),
            Err(SdkError::InvalidFingerprint { .. })
        ));
    }

    #[test]
    fn resolve_prefix_only_considers_commits() {
        let (dir, mut repo) = init();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        let id = repo.commit("one").unwrap();
        let hex = id.to_hex();

        // A blob sharing the commit's shortest accepted prefix.
        let shared = (0u32..)
            .map(|i| i.to_le_bytes())
            .find(|data| Fingerprint::of(data).to_hex().starts_with(&hex[..MIN_PREFIX_LEN]))
            .unwrap();
        repo.store()
            .write(&Blob::new(shared.to_vec()).to_stored_object())
            .unwrap();
        assert_eq!(repo.resolve(&hex[..MIN_PREFIX_LEN]).unwrap(), id);

        let blob_hex = Fingerprint::of(b"one").to_hex();
        assert!(matches!(
            repo.resolve(&blob_hex[..16]),
            Err(SdkError::InvalidFingerprint { .. })
        ));
    }

    #[test]
    fn corrupted_head_is_reported() {
        let (dir, _repo) = init();
        fs::write(dir.path().join(".ark/HEAD"), "garbage").unwrap();
        let err = Repository::open(dir.path()).err().unwrap();
        assert!(matches!(err, SdkError::Ref(_)));
    }

    #[test]
    fn tampered_object_is_corrupt() {
        let (dir, mut repo) = init();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        let id = repo.commit("one").unwrap();
        let path = dir.path().join(".ark/objects").join(id.to_hex());
        fs::write(&path, "comm\nparent:\ntree:00\n\nforged").unwrap();

        let err = repo.log().next().unwrap().unwrap_err();
        assert!(matches!(err, SdkError::CorruptObject { .. }));
    }
}
