use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::{debug, error, info, warn};

use models::{parse_owner_id, Kit, OwnerId};

use crate::errors::KitStoreError;
use crate::storage::kit_codec::{decode_owner_file, encode_owner_file};

/// Per-owner kit collections mirrored to one YAML file per owner.
///
/// Every owner file under the directory is loaded when the store opens.
/// Writes update memory first and then rewrite the owner's whole file; a
/// failed write is logged and returned, but the in-memory change stays.
#[derive(Clone)]
pub struct KitStore {
    inner: Arc<RwLock<HashMap<OwnerId, Vec<Kit>>>>,
    dir: PathBuf,
    extension: String,
}

impl KitStore {
    /// Open the store at `dir`, creating the directory when missing.
    ///
    /// Never fails: an unusable directory gives an empty store and the
    /// problem resurfaces as a persistence error on the first write.
    pub async fn open<P: Into<PathBuf>>(dir: P, extension: &str) -> Arc<Self> {
        let dir = dir.into();
        let extension = extension.trim_start_matches('.').to_string();
        if let Err(e) = fs::create_dir_all(&dir).await {
            warn!(dir = %dir.display(), error = %e, "cannot create kits directory");
        }

        let map = load_all(&dir, &extension).await;
        info!(
            event = "kits_loaded",
            dir = %dir.display(),
            owners = map.len(),
            kits = map.values().map(Vec::len).sum::<usize>(),
            "kit store opened"
        );
        Arc::new(Self { inner: Arc::new(RwLock::new(map)), dir, extension })
    }

    /// Open the store at the kits directory named by the storage config.
    pub async fn from_config(cfg: &configs::StorageConfig) -> Arc<Self> {
        Self::open(cfg.kits_path(), &cfg.extension).await
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Path of the file backing `owner`'s collection.
    pub fn owner_file(&self, owner: &OwnerId) -> PathBuf {
        self.dir.join(format!("{owner}.{}", self.extension))
    }

    /// Snapshot of the owner's kits in insertion order; empty when unknown.
    pub async fn get_owner_kits(&self, owner: &OwnerId) -> Vec<Kit> {
        let map = self.inner.read().await;
        map.get(owner).cloned().unwrap_or_default()
    }

    /// First kit named exactly `name`.
    pub async fn get_kit(&self, owner: &OwnerId, name: &str) -> Option<Kit> {
        let map = self.inner.read().await;
        map.get(owner)?.iter().find(|k| k.name == name).cloned()
    }

    pub async fn has_kit(&self, owner: &OwnerId, name: &str) -> bool {
        let map = self.inner.read().await;
        map.get(owner).is_some_and(|kits| kits.iter().any(|k| k.name == name))
    }

    /// Owners known to the store, sorted. Includes owners whose last kit was deleted.
    pub async fn owners(&self) -> Vec<OwnerId> {
        let map = self.inner.read().await;
        let mut owners: Vec<OwnerId> = map.keys().copied().collect();
        owners.sort();
        owners
    }

    pub async fn kit_count(&self, owner: &OwnerId) -> usize {
        let map = self.inner.read().await;
        map.get(owner).map_or(0, Vec::len)
    }

    /// Insert or replace a kit by name; the kit becomes the owner's latest entry.
    pub async fn save_kit(&self, owner: OwnerId, kit: Kit) -> Result<(), KitStoreError> {
        let mut map = self.inner.write().await;
        let kits = map.entry(owner).or_default();
        let replaced = kits.len();
        kits.retain(|k| k.name != kit.name);
        let replaced = replaced != kits.len();
        debug!(%owner, kit = %kit.name, replaced, "saving kit");
        kits.push(kit);
        self.persist(&owner, Some(kits.as_slice())).await
    }

    /// Remove every kit named `name`; returns whether any was removed.
    ///
    /// No file I/O happens when nothing matched. An `Err` always means a
    /// kit was removed from memory but the file could not be updated.
    pub async fn delete_kit(&self, owner: &OwnerId, name: &str) -> Result<bool, KitStoreError> {
        let mut map = self.inner.write().await;
        let Some(kits) = map.get_mut(owner) else { return Ok(false) };
        let before = kits.len();
        kits.retain(|k| k.name != name);
        if kits.len() == before {
            return Ok(false);
        }
        debug!(%owner, kit = %name, remaining = kits.len(), "deleted kit");
        self.persist(owner, Some(kits.as_slice())).await?;
        Ok(true)
    }

    /// Rewrite the owner's file from memory, deleting it when the collection is empty.
    pub async fn save_player_kits(&self, owner: &OwnerId) -> Result<(), KitStoreError> {
        let map = self.inner.write().await;
        self.persist(owner, map.get(owner).map(Vec::as_slice)).await
    }

    /// Called with the write lock held so file rewrites for an owner never interleave.
    async fn persist(&self, owner: &OwnerId, kits: Option<&[Kit]>) -> Result<(), KitStoreError> {
        let path = self.owner_file(owner);
        let res = match kits {
            Some(kits) if !kits.is_empty() => self.write_file(owner, &path, kits).await,
            _ => remove_if_exists(&path)
                .await
                .map_err(|source| KitStoreError::Persistence { owner: *owner, source }),
        };
        if let Err(e) = &res {
            error!(%owner, path = %path.display(), error = %e, "failed to save kits");
        }
        res
    }

    async fn write_file(&self, owner: &OwnerId, path: &Path, kits: &[Kit]) -> Result<(), KitStoreError> {
        let text = encode_owner_file(kits)?;
        let tmp = self.dir.join(format!(".{owner}.{}.tmp", self.extension));
        let io = async {
            fs::create_dir_all(&self.dir).await?;
            fs::write(&tmp, text.as_bytes()).await?;
            fs::rename(&tmp, path).await?;
            Ok::<_, std::io::Error>(())
        };
        if let Err(source) = io.await {
            let _ = fs::remove_file(&tmp).await;
            return Err(KitStoreError::Persistence { owner: *owner, source });
        }
        debug!(%owner, kits = kits.len(), "kits written");
        Ok(())
    }
}

async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Scan `dir` for `<owner-uuid>.<extension>` files and decode each one.
async fn load_all(dir: &Path, extension: &str) -> HashMap<OwnerId, Vec<Kit>> {
    let mut map = HashMap::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read kits directory; starting empty");
            return map;
        }
    };

    let suffix = format!(".{extension}");
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "kits directory scan aborted");
                break;
            }
        };
        let path = entry.path();
        let file_name = entry.file_name();
        let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(&suffix)) else { continue };
        if !fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            continue;
        }

        let owner = match parse_owner_id(stem) {
            Ok(owner) => owner,
            Err(e) => {
                let err = KitStoreError::malformed_file(&path, e);
                warn!(error = %err, "invalid kit file");
                continue;
            }
        };

        if let Some(kits) = load_owner(&path, owner).await {
            map.insert(owner, kits);
        }
    }
    map
}

async fn load_owner(path: &Path, owner: OwnerId) -> Option<Vec<Kit>> {
    let decoded = fs::read_to_string(path)
        .await
        .map_err(|e| KitStoreError::malformed_file(path, e))
        .and_then(|text| decode_owner_file(&text).map_err(|e| KitStoreError::malformed_file(path, e)));
    let decoded = match decoded {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!(%owner, error = %err, "failed to load kit file");
            return None;
        }
    };

    for (kit, reason) in decoded.skipped {
        let err = KitStoreError::MalformedKitRecord { owner, kit, reason };
        warn!(%owner, error = %err, "failed to load kit");
    }
    for kit in &decoded.repaired {
        debug!(%owner, %kit, "normalized kit slot lists");
    }
    Some(decoded.kits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{ItemStack, ARMOR_SLOTS, CONTENTS_SLOTS};
    use uuid::Uuid;

    fn kit_with(name: &str, material: &str) -> Kit {
        let mut kit = Kit::empty(name);
        kit.contents_mut()[0] = Some(ItemStack::new(material, 1));
        kit
    }

    #[tokio::test]
    async fn kit_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let store = KitStore::open(tmp.path(), "yml").await;
        let owner = Uuid::new_v4();

        // initially empty
        assert!(store.get_owner_kits(&owner).await.is_empty());
        assert!(!store.has_kit(&owner, "pvp").await);

        store.save_kit(owner, kit_with("pvp", "DIAMOND_SWORD")).await?;
        store.save_kit(owner, kit_with("archer", "BOW")).await?;
        assert!(store.owner_file(&owner).is_file());
        assert_eq!(store.kit_count(&owner).await, 2);

        // replace moves the kit to the end
        store.save_kit(owner, kit_with("pvp", "NETHERITE_SWORD")).await?;
        let names: Vec<String> = store.get_owner_kits(&owner).await.into_iter().map(|k| k.name).collect();
        assert_eq!(names, vec!["archer", "pvp"]);

        // reload from disk
        let reloaded = KitStore::open(tmp.path(), "yml").await;
        assert_eq!(reloaded.get_owner_kits(&owner).await, store.get_owner_kits(&owner).await);
        let pvp = reloaded.get_kit(&owner, "pvp").await.ok_or_else(|| anyhow::anyhow!("missing pvp"))?;
        assert_eq!(pvp.contents()[0], Some(ItemStack::new("NETHERITE_SWORD", 1)));
        Ok(())
    }

    #[tokio::test]
    async fn returned_collections_are_snapshots() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let store = KitStore::open(tmp.path(), "yml").await;
        let owner = Uuid::new_v4();
        store.save_kit(owner, Kit::empty("pvp")).await?;

        let mut snapshot = store.get_owner_kits(&owner).await;
        snapshot.clear();
        let mut kit = store.get_kit(&owner, "pvp").await.ok_or_else(|| anyhow::anyhow!("missing"))?;
        kit.display_name = "changed".into();

        let stored = store.get_kit(&owner, "pvp").await.ok_or_else(|| anyhow::anyhow!("missing"))?;
        assert_eq!(stored.display_name, "pvp");
        assert_eq!(store.kit_count(&owner).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_last_kit_removes_file_but_keeps_owner() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let store = KitStore::open(tmp.path(), "yml").await;
        let owner = Uuid::new_v4();
        store.save_kit(owner, Kit::empty("a")).await?;
        store.save_kit(owner, Kit::empty("b")).await?;

        assert!(store.delete_kit(&owner, "a").await?);
        assert!(store.owner_file(&owner).is_file());
        assert!(store.delete_kit(&owner, "b").await?);
        assert!(!store.owner_file(&owner).exists());

        assert_eq!(store.owners().await, vec![owner]);
        assert!(store.get_owner_kits(&owner).await.is_empty());
        assert!(!store.delete_kit(&owner, "b").await?);
        assert!(!store.delete_kit(&Uuid::new_v4(), "b").await?);
        Ok(())
    }

    #[tokio::test]
    async fn save_player_kits_for_unknown_owner_removes_stray_file() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let store = KitStore::open(tmp.path(), "yml").await;
        let owner = Uuid::new_v4();
        std::fs::write(store.owner_file(&owner), "pvp: {}\n")?;

        store.save_player_kits(&owner).await?;
        assert!(!store.owner_file(&owner).exists());
        // nothing to delete is not an error
        store.save_player_kits(&owner).await?;
        Ok(())
    }

    #[tokio::test]
    async fn scan_skips_foreign_and_malformed_files() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let good = Uuid::new_v4();
        let corrupt = Uuid::new_v4();
        std::fs::write(tmp.path().join(format!("{good}.yml")), "pvp:\n  contents:\n    - { type: STONE }\n")?;
        std::fs::write(tmp.path().join(format!("{corrupt}.yml")), "pvp: [unclosed\n")?;
        std::fs::write(tmp.path().join("config.yml"), "pvp: {}\n")?;
        std::fs::write(tmp.path().join(format!("{}.txt", Uuid::new_v4())), "pvp: {}\n")?;
        std::fs::create_dir(tmp.path().join(format!("{}.yml", Uuid::new_v4())))?;

        let store = KitStore::open(tmp.path(), ".yml").await;
        assert_eq!(store.owners().await, vec![good]);
        let pvp = store.get_kit(&good, "pvp").await.ok_or_else(|| anyhow::anyhow!("missing pvp"))?;
        assert_eq!(pvp.contents().len(), CONTENTS_SLOTS);
        assert_eq!(pvp.armor().len(), ARMOR_SLOTS);
        assert!(store.get_owner_kits(&corrupt).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn open_creates_missing_directory() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("plugin").join("kits");
        let store = KitStore::open(&dir, "yml").await;
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
        assert!(store.owners().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn write_failure_is_reported_and_memory_kept() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        // a regular file where the directory should be makes every write fail
        let dir = tmp.path().join("kits");
        std::fs::write(&dir, "")?;
        let store = KitStore::open(&dir, "yml").await;
        let owner = Uuid::new_v4();

        let err = match store.save_kit(owner, Kit::empty("pvp")).await {
            Err(e) => e,
            Ok(()) => anyhow::bail!("save into a file path should fail"),
        };
        assert!(err.is_persistence());
        assert!(store.has_kit(&owner, "pvp").await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_delete_rewrite_keeps_memory_removal() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let store = KitStore::open(tmp.path(), "yml").await;
        let owner = Uuid::new_v4();
        store.save_kit(owner, Kit::empty("a")).await?;
        store.save_kit(owner, Kit::empty("b")).await?;

        // a directory in place of the owner file makes the rename fail
        let file = store.owner_file(&owner);
        std::fs::remove_file(&file)?;
        std::fs::create_dir(&file)?;

        let err = match store.delete_kit(&owner, "a").await {
            Err(e) => e,
            Ok(removed) => anyhow::bail!("rewrite over a directory should fail, got Ok({removed})"),
        };
        assert!(err.is_persistence());
        assert!(!store.has_kit(&owner, "a").await);
        assert!(store.has_kit(&owner, "b").await);
        assert!(!tmp.path().join(format!(".{owner}.yml.tmp")).exists());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_for_one_owner_are_not_lost() -> Result<(), anyhow::Error> {
        const WRITERS: usize = 32;
        let tmp = tempfile::tempdir()?;
        let store = KitStore::open(tmp.path(), "yml").await;
        let owner = Uuid::new_v4();

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save_kit(owner, kit_with(&format!("kit-{i}"), "STONE")).await })
            })
            .collect();
        for handle in handles {
            handle.await??;
        }
        assert_eq!(store.kit_count(&owner).await, WRITERS);

        let reloaded = KitStore::open(tmp.path(), "yml").await;
        assert_eq!(reloaded.kit_count(&owner).await, WRITERS);
        for i in 0..WRITERS {
            assert!(reloaded.has_kit(&owner, &format!("kit-{i}")).await, "kit-{i} lost");
        }

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())?
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
        Ok(())
    }
}
