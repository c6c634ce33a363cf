//! Preset persistence: one JSON document under the state dir, seeded with
//! the built-in set on first run, plus the single-line active-preset record.

use super::{
    Preset, PresetDocument, builtin_document, is_builtin, parse_document, validate,
    validate_document,
};
use crate::error::{Error, Result};
use crate::region::atomic_write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PresetStore {
    document: PresetDocument,
    presets_file: PathBuf,
    active_file: PathBuf,
}

/// One row of `list` output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PresetSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub gpu_profile: String,
    pub builtin: bool,
}

impl PresetStore {
    /// Load the document, seeding the built-ins if the file does not exist.
    /// A document that fails validation is rejected as a whole.
    pub fn open(presets_file: PathBuf, active_file: PathBuf) -> Result<Self> {
        let document = match std::fs::read_to_string(&presets_file) {
            Ok(json) => {
                let doc = parse_document(&json).map_err(|e| match e {
                    Error::State(msg) => Error::State(format!(
                        "malformed preset document {}: {}",
                        presets_file.display(),
                        msg
                    )),
                    other => other,
                })?;
                validate_document(&doc)?;
                doc
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = builtin_document();
                write_document(&presets_file, &doc)?;
                doc
            }
            Err(e) => return Err(Error::io(&presets_file, e)),
        };
        Ok(Self {
            document,
            presets_file,
            active_file,
        })
    }

    pub fn get(&self, id: &str) -> Result<&Preset> {
        self.document
            .presets
            .get(id)
            .or_else(|| self.document.application_presets.get(id))
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn contains(&self, id: &str) -> bool {
        self.document.presets.contains_key(id)
            || self.document.application_presets.contains_key(id)
    }

    /// Ordered listing: grouped by category, built-ins before user presets,
    /// alphabetical within each group.
    pub fn list(&self) -> Vec<PresetSummary> {
        let mut all: Vec<&Preset> = self
            .document
            .presets
            .values()
            .chain(self.document.application_presets.values())
            .collect();
        all.sort_by_key(|p| {
            let category_rank = super::ALL_CATEGORIES
                .iter()
                .position(|c| *c == p.category)
                .unwrap_or(usize::MAX);
            (category_rank, !is_builtin(&p.id), p.id.clone())
        });
        all.into_iter()
            .map(|p| PresetSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                category: p.category.id().to_string(),
                gpu_profile: p.gpu_profile.id().to_string(),
                builtin: is_builtin(&p.id),
            })
            .collect()
    }

    /// Admit a new preset. Duplicate ids are a conflict unless `overwrite`;
    /// overwriting backs up the previous document first.
    pub fn create(&mut self, preset: Preset, overwrite: bool) -> Result<()> {
        validate(&preset)?;
        if self.contains(&preset.id) && !overwrite {
            return Err(Error::Conflict(preset.id));
        }
        if self.contains(&preset.id) {
            self.backup_document()?;
        }
        // a user overwrite of an application preset moves it to the general map
        self.document.application_presets.remove(&preset.id);
        self.document.presets.insert(preset.id.clone(), preset);
        validate_document(&self.document)?;
        write_document(&self.presets_file, &self.document)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        if is_builtin(id) {
            return Err(Error::Builtin(id.to_string()));
        }
        self.document.presets.remove(id);
        self.document.application_presets.remove(id);
        write_document(&self.presets_file, &self.document)?;
        if self.active()?.as_deref() == Some(id) {
            self.clear_active()?;
        }
        Ok(())
    }

    /// The active-preset record, if any.
    pub fn active(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.active_file) {
            Ok(s) => {
                let id = s.trim().to_string();
                Ok(if id.is_empty() { None } else { Some(id) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.active_file, e)),
        }
    }

    pub fn set_active(&self, id: &str) -> Result<()> {
        atomic_write(&self.active_file, &format!("{}\n", id))
    }

    pub fn clear_active(&self) -> Result<()> {
        match std::fs::remove_file(&self.active_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.active_file, e)),
        }
    }

    fn backup_document(&self) -> Result<()> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let backup = self
            .presets_file
            .with_file_name(format!("presets.json.backup.{}", stamp));
        std::fs::copy(&self.presets_file, &backup)
            .map(|_| ())
            .map_err(|e| Error::io(backup, e))
    }
}

fn write_document(path: &Path, doc: &PresetDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(doc)
        .map_err(|e| Error::State(format!("failed to serialize presets: {}", e)))?;
    atomic_write(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{BUILTIN_IDS, Category, Priority};
    use crate::profile::Profile;
    use crate::settings::SettingsPatch;
    use tempfile::TempDir;

    fn open_store(tmp: &TempDir) -> PresetStore {
        PresetStore::open(
            tmp.path().join("presets.json"),
            tmp.path().join("active_preset"),
        )
        .unwrap()
    }

    fn user_preset(id: &str) -> Preset {
        Preset {
            id: id.to_string(),
            name: "User".to_string(),
            description: "user preset".to_string(),
            category: Category::Custom,
            priority: Priority::Custom,
            settings: SettingsPatch::default(),
            gpu_profile: Profile::Balanced,
            applications: Vec::new(),
            device_specific: None,
        }
    }

    #[test]
    fn test_first_run_seeds_builtins() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);
        for id in BUILTIN_IDS {
            assert!(store.get(id).is_ok(), "missing {}", id);
        }
        assert!(tmp.path().join("presets.json").is_file());
    }

    #[test]
    fn test_reopen_round_trips() {
        let tmp = TempDir::new().unwrap();
        {
            let mut store = open_store(&tmp);
            store.create(user_preset("mine"), false).unwrap();
        }
        let store = open_store(&tmp);
        assert_eq!(store.get("mine").unwrap().id, "mine");
    }

    #[test]
    fn test_create_duplicate_conflicts_without_overwrite() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        let err = store.create(user_preset("gaming-competitive"), false).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        // store unchanged
        assert_eq!(
            store.get("gaming-competitive").unwrap().gpu_profile,
            Profile::Performance
        );
    }

    #[test]
    fn test_overwrite_backs_up_document() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        store.create(user_preset("gaming-competitive"), true).unwrap();
        assert_eq!(
            store.get("gaming-competitive").unwrap().gpu_profile,
            Profile::Balanced
        );
        let backup_present = std::fs::read_dir(tmp.path())
            .unwrap()
            .any(|e| {
                e.unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with("presets.json.backup.")
            });
        assert!(backup_present);
    }

    #[test]
    fn test_delete_builtin_refused() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        assert!(matches!(store.delete("obs"), Err(Error::Builtin(_))));
        assert!(matches!(store.delete("ghost"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_user_preset_clears_active() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        store.create(user_preset("mine"), false).unwrap();
        store.set_active("mine").unwrap();
        store.delete("mine").unwrap();
        assert!(matches!(store.get("mine"), Err(Error::NotFound(_))));
        assert_eq!(store.active().unwrap(), None);
    }

    #[test]
    fn test_active_record_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);
        assert_eq!(store.active().unwrap(), None);
        store.set_active("streaming").unwrap();
        assert_eq!(store.active().unwrap().as_deref(), Some("streaming"));
        store.clear_active().unwrap();
        assert_eq!(store.active().unwrap(), None);
    }

    #[test]
    fn test_malformed_document_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("presets.json"), "{not json").unwrap();
        let err = PresetStore::open(
            tmp.path().join("presets.json"),
            tmp.path().join("active_preset"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::State(_)));
    }

    #[test]
    fn test_invalid_document_rejected_whole() {
        let tmp = TempDir::new().unwrap();
        let mut doc = builtin_document();
        let mut bad = user_preset("bad");
        bad.settings.misc.vrr = Some(7);
        doc.presets.insert("bad".to_string(), bad);
        std::fs::write(
            tmp.path().join("presets.json"),
            serde_json::to_string(&doc).unwrap(),
        )
        .unwrap();
        let err = PresetStore::open(
            tmp.path().join("presets.json"),
            tmp.path().join("active_preset"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }

    #[test]
    fn test_unknown_gpu_profile_is_invalid_field() {
        let tmp = TempDir::new().unwrap();
        let json = r#"{"presets":{"mine":{
            "id":"mine","name":"Mine","description":"",
            "category":"custom","priority":"custom","gpu_profile":"quantum"}}}"#;
        std::fs::write(tmp.path().join("presets.json"), json).unwrap();
        let err = PresetStore::open(
            tmp.path().join("presets.json"),
            tmp.path().join("active_preset"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField { ref id, ref path, .. } if id == "mine" && path == "gpu_profile"
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_mistyped_settings_value_is_invalid_field() {
        let tmp = TempDir::new().unwrap();
        let json = r#"{"presets":{"mine":{
            "id":"mine","name":"Mine","description":"",
            "category":"custom","priority":"custom","gpu_profile":"balanced",
            "settings":{"decoration":{"blur_size":"big"}}}}}"#;
        std::fs::write(tmp.path().join("presets.json"), json).unwrap();
        let err = PresetStore::open(
            tmp.path().join("presets.json"),
            tmp.path().join("active_preset"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField { ref path, .. } if path == "settings.decoration"
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_list_groups_categories_builtins_first() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);
        store.create(user_preset("aaa-user"), false).unwrap();
        let rows = store.list();
        assert_eq!(rows.len(), BUILTIN_IDS.len() + 1);

        // gaming built-ins lead the listing
        assert_eq!(rows[0].category, "gaming");
        assert!(rows[0].builtin);
        // the custom-category user preset comes last
        let last = rows.last().unwrap();
        assert_eq!(last.id, "aaa-user");
        assert!(!last.builtin);
    }
}
