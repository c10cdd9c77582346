//! Client-side plan state and page hand-off slots.
//!
//! `PlanContext` holds the last generated plan together with the form values
//! that produced it. It is an ordinary value: views receive it as a
//! parameter, and it persists itself through a `StateStorage` under a single
//! key. `Handoff` carries one-shot payloads between result pages.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{FarmPlanInput, FarmPlanResult};

/// Storage key of the persisted plan.
pub const PLAN_STORAGE_KEY: &str = "kisansaathi_farm_plan";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("state storage error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

// ============================================================================
// Storage Backends
// ============================================================================

/// String key-value storage with browser-storage semantics.
pub trait StateStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// One file per key under a directory, created on first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn io_error(key: &str, source: io::Error) -> SessionError {
        SessionError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        fs::write(self.path(key), value).map_err(|e| Self::io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(Self::io_error(key, e)),
            _ => Ok(()),
        }
    }
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries().remove(key);
        Ok(())
    }
}

// ============================================================================
// Plan Context
// ============================================================================

/// Persisted form of the plan state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedPlan {
    pub result: Option<FarmPlanResult>,
    #[serde(rename = "formData")]
    pub form_data: Option<FarmPlanInput>,
}

/// Last generated plan and the input that produced it.
#[derive(Debug)]
pub struct PlanContext<S: StateStorage> {
    storage: S,
    plan: PersistedPlan,
}

impl<S: StateStorage> PlanContext<S> {
    /// Load from storage. A missing or undecodable entry starts empty.
    pub fn hydrate(storage: S) -> Self {
        let plan = match storage.get(PLAN_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable stored plan: {}", e);
                PersistedPlan::default()
            }),
            Ok(None) => PersistedPlan::default(),
            Err(e) => {
                tracing::warn!("Could not read stored plan: {}", e);
                PersistedPlan::default()
            }
        };
        Self { storage, plan }
    }

    pub fn result(&self) -> Option<&FarmPlanResult> {
        self.plan.result.as_ref()
    }

    pub fn form_data(&self) -> Option<&FarmPlanInput> {
        self.plan.form_data.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace both fields and persist. Persistence failures are logged;
    /// the in-memory state is updated regardless.
    pub fn set_farm_plan(&mut self, result: FarmPlanResult, form_data: FarmPlanInput) {
        self.plan = PersistedPlan {
            result: Some(result),
            form_data: Some(form_data),
        };
        if let Err(e) = self.persist() {
            tracing::warn!("Could not persist farm plan: {}", e);
        }
    }

    /// Reset to empty and drop the persisted copy.
    pub fn clear_farm_plan(&mut self) {
        self.plan = PersistedPlan::default();
        if let Err(e) = self.storage.remove(PLAN_STORAGE_KEY) {
            tracing::warn!("Could not remove stored farm plan: {}", e);
        }
    }

    fn persist(&self) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&self.plan)?;
        self.storage.set(PLAN_STORAGE_KEY, &raw)
    }
}

// ============================================================================
// Hand-off Slots
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffSlot {
    /// Recommended crop name
    CropResult,
    /// Full plan result for the risk page
    RiskResult,
    /// Yield prediction
    YieldResult,
    /// Conditions + crop + acres from the crop predictor
    CropPrefillForYield,
    /// Prefill consumed by the yield predictor
    YieldPrefill,
}

impl HandoffSlot {
    pub fn key(self) -> &'static str {
        match self {
            HandoffSlot::CropResult => "cropResult",
            HandoffSlot::RiskResult => "riskResult",
            HandoffSlot::YieldResult => "yieldResult",
            HandoffSlot::CropPrefillForYield => "cropPrefillForYield",
            HandoffSlot::YieldPrefill => "yieldPrefill",
        }
    }
}

/// Typed access to the hand-off slots.
#[derive(Debug)]
pub struct Handoff<S: StateStorage> {
    storage: S,
}

impl<S: StateStorage> Handoff<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn write<T: Serialize + ?Sized>(&self, slot: HandoffSlot, payload: &T) -> Result<(), SessionError> {
        let raw = serde_json::to_string(payload)?;
        self.storage.set(slot.key(), &raw)
    }

    /// Missing, unreadable and undecodable slots all read as absent.
    pub fn read<T: DeserializeOwned>(&self, slot: HandoffSlot) -> Option<T> {
        let raw = match self.storage.get(slot.key()) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", slot.key(), e);
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| tracing::debug!("Ignoring undecodable {}: {}", slot.key(), e))
            .ok()
    }

    /// Copy a slot's raw payload. Returns whether anything was copied.
    pub fn copy(&self, from: HandoffSlot, to: HandoffSlot) -> Result<bool, SessionError> {
        match self.storage.get(from.key())? {
            Some(raw) => {
                self.storage.set(to.key(), &raw)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&self, slot: HandoffSlot) -> Result<(), SessionError> {
        self.storage.remove(slot.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::yield_prefill;
    use crate::model::{CropAllocation, YieldRequest};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("farm_planner_session_{}", Uuid::new_v4()))
    }

    fn sample_result() -> FarmPlanResult {
        FarmPlanResult {
            predicted_crop: "Maize".to_string(),
            farm_plan: vec![CropAllocation {
                crop: "Maize".to_string(),
                acres: 10.0,
                risk_level: "Low".to_string(),
                ..Default::default()
            }],
            sustainability_score: 80.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let ctx = PlanContext::hydrate(MemoryStorage::new());
        assert!(ctx.result().is_none());
        assert!(ctx.form_data().is_none());
    }

    #[test]
    fn test_set_persists_and_rehydrates() {
        let dir = temp_dir();
        let mut ctx = PlanContext::hydrate(FileStorage::new(&dir));
        ctx.set_farm_plan(sample_result(), FarmPlanInput::default());
        assert_eq!(ctx.result().unwrap().predicted_crop, "Maize");

        let reloaded = PlanContext::hydrate(FileStorage::new(&dir));
        assert_eq!(reloaded.result(), Some(&sample_result()));
        assert_eq!(reloaded.form_data(), Some(&FarmPlanInput::default()));

        let raw = fs::read_to_string(dir.join("kisansaathi_farm_plan.json")).unwrap();
        assert!(raw.contains("\"formData\""));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clear_removes_persisted_copy() {
        let storage = MemoryStorage::new();
        let mut ctx = PlanContext::hydrate(storage);
        ctx.set_farm_plan(sample_result(), FarmPlanInput::default());
        ctx.clear_farm_plan();

        assert!(ctx.result().is_none());
        assert_eq!(ctx.storage().get(PLAN_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_hydrates_empty() {
        let storage = MemoryStorage::new();
        storage.set(PLAN_STORAGE_KEY, "{not json").unwrap();
        let ctx = PlanContext::hydrate(storage);
        assert!(ctx.result().is_none());
    }

    #[test]
    fn test_handoff_roundtrip_and_missing() {
        let handoff = Handoff::new(MemoryStorage::new());
        assert_eq!(handoff.read::<String>(HandoffSlot::CropResult), None);

        handoff.write(HandoffSlot::CropResult, "Rice").unwrap();
        assert_eq!(handoff.read::<String>(HandoffSlot::CropResult).as_deref(), Some("Rice"));

        // wrong shape reads as absent
        assert!(handoff.read::<YieldRequest>(HandoffSlot::CropResult).is_none());
    }

    #[test]
    fn test_prefill_copy() {
        let dir = temp_dir();
        let handoff = Handoff::new(FileStorage::new(&dir));
        assert!(!handoff.copy(HandoffSlot::CropPrefillForYield, HandoffSlot::YieldPrefill).unwrap());

        let prefill = yield_prefill(&Default::default(), "Wheat");
        handoff.write(HandoffSlot::CropPrefillForYield, &prefill).unwrap();
        assert!(handoff.copy(HandoffSlot::CropPrefillForYield, HandoffSlot::YieldPrefill).unwrap());

        let copied: YieldRequest = handoff.read(HandoffSlot::YieldPrefill).unwrap();
        assert_eq!(copied.crop_name, "Wheat");
        assert_eq!(copied.acres, 10.0);

        handoff.clear(HandoffSlot::YieldPrefill).unwrap();
        handoff.clear(HandoffSlot::YieldPrefill).unwrap();
        assert!(handoff.read::<YieldRequest>(HandoffSlot::YieldPrefill).is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
