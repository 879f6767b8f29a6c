//! Automatable parameter model.
//!
//! Parameters are the host-owned controls a plugin exposes for automation.
//! Script code inside the web UI reads and writes them through the binding
//! layer, which resolves parameters by name on every access — ordering in
//! the set is not part of the contract, names are.
//!
//! Two write paths exist and stay distinct:
//! - [`FloatParameter::set`] writes silently. Host-driven changes
//!   (preset load, state restore) use this so the host's automation and
//!   undo systems are not re-notified about their own edits.
//! - [`ParameterSet::set_notifying_host`] writes and then reports the edit
//!   through the registered [`AutomationHost`], so script-driven changes
//!   are observed by automation recording and undo.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

/// Receiver for edits that the host's automation system must observe.
///
/// Implemented by the plugin-format wrapper (an external collaborator);
/// the binding layer only ever talks to this trait.
pub trait AutomationHost: Send + Sync {
    /// A parameter was edited on behalf of the user (e.g. from script).
    ///
    /// `value` is the value actually stored, after range clamping.
    fn parameter_edited(&self, name: &str, value: f64);
}

/// A continuous, range-bounded, automatable parameter.
///
/// Storage is a single atomic word holding the `f64` bit pattern, so reads
/// and writes are lock-free and safe from the audio, UI, and script threads
/// concurrently.
pub struct FloatParameter {
    name: &'static str,
    range: RangeInclusive<f64>,
    value: AtomicU64,
}

impl FloatParameter {
    /// Create a parameter with the given default value.
    ///
    /// The default is clamped into `range`.
    pub fn new(name: &'static str, default: f64, range: RangeInclusive<f64>) -> Self {
        let clamped = default.clamp(*range.start(), *range.end());
        Self {
            name,
            range,
            value: AtomicU64::new(clamped.to_bits()),
        }
    }

    /// Parameter name. Names identify parameters across the bridge.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The valid value range.
    pub fn range(&self) -> &RangeInclusive<f64> {
        &self.range
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Set the value without notifying anyone.
    ///
    /// This is the host-driven path (preset load, state restore). Values
    /// are clamped into the parameter's range. Non-finite input is ignored.
    pub fn set(&self, value: f64) {
        if !value.is_finite() {
            log::warn!("ignoring non-finite value {value} for parameter '{}'", self.name);
            return;
        }
        let clamped = value.clamp(*self.range.start(), *self.range.end());
        self.value.store(clamped.to_bits(), Ordering::Relaxed);
    }
}

impl std::fmt::Debug for FloatParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloatParameter")
            .field("name", &self.name)
            .field("value", &self.value())
            .field("range", &self.range)
            .finish()
    }
}

/// Point-in-time view of one parameter, for seeding a freshly loaded page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSnapshot {
    /// Parameter name.
    pub name: &'static str,
    /// Current value.
    pub value: f64,
    /// Range start.
    pub min: f64,
    /// Range end.
    pub max: f64,
}

/// The host's enumerable parameter collection.
///
/// The set is fixed at construction; only values change afterwards. Lookup
/// is a linear scan by exact name — fine at plugin-sized parameter counts,
/// and it keeps name-based identity authoritative. Names must be unique;
/// with duplicates, the first match wins.
pub struct ParameterSet {
    parameters: Vec<FloatParameter>,
    automation: RwLock<Option<Arc<dyn AutomationHost>>>,
}

impl ParameterSet {
    /// Create the set. The parameter list never changes after this.
    pub fn new(parameters: Vec<FloatParameter>) -> Self {
        Self {
            parameters,
            automation: RwLock::new(None),
        }
    }

    /// Register the automation receiver for notifying edits.
    pub fn set_automation_host(&self, host: Arc<dyn AutomationHost>) {
        let mut slot = self
            .automation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(host);
    }

    /// Drop the automation receiver. Subsequent notifying writes still
    /// update values, they just go unreported.
    pub fn clear_automation_host(&self) {
        let mut slot = self
            .automation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterate over all parameters.
    pub fn iter(&self) -> impl Iterator<Item = &FloatParameter> {
        self.parameters.iter()
    }

    /// Resolve a parameter by exact name.
    pub fn by_name(&self, name: &str) -> Option<&FloatParameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Set a parameter and notify the automation host.
    ///
    /// This is the script-driven path. Returns `true` if a parameter with
    /// that name exists; the notification fires exactly once per matching
    /// call, carrying the clamped stored value.
    pub fn set_notifying_host(&self, name: &str, value: f64) -> bool {
        let Some(parameter) = self.by_name(name) else {
            return false;
        };
        parameter.set(value);

        let slot = self
            .automation
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(host) = slot.as_ref() {
            host.parameter_edited(parameter.name(), parameter.value());
        }
        true
    }

    /// Snapshot every parameter's name, value, and range.
    pub fn snapshot(&self) -> Vec<ParameterSnapshot> {
        self.parameters
            .iter()
            .map(|p| ParameterSnapshot {
                name: p.name(),
                value: p.value(),
                min: *p.range().start(),
                max: *p.range().end(),
            })
            .collect()
    }

    /// Snapshot as a JSON array, for the page-load init dump.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|e| {
            log::error!("failed to serialize parameter snapshot: {e}");
            "[]".into()
        })
    }
}

impl std::fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSet")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingHost {
        edits: AtomicUsize,
        last: RwLock<Option<(String, f64)>>,
    }

    impl CountingHost {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                edits: AtomicUsize::new(0),
                last: RwLock::new(None),
            })
        }
    }

    impl AutomationHost for CountingHost {
        fn parameter_edited(&self, name: &str, value: f64) {
            self.edits.fetch_add(1, Ordering::SeqCst);
            *self.last.write().unwrap() = Some((name.to_string(), value));
        }
    }

    fn gain_set() -> ParameterSet {
        ParameterSet::new(vec![
            FloatParameter::new("freq", 20.0, 20.0..=20_000.0),
            FloatParameter::new("gain", 0.5, 0.0..=1.0),
            FloatParameter::new("q", 1.0, 1.0..=10.0),
        ])
    }

    #[test]
    fn test_default_clamped_into_range() {
        let p = FloatParameter::new("gain", 4.0, 0.0..=1.0);
        assert_eq!(p.value(), 1.0);
    }

    #[test]
    fn test_silent_set_clamps() {
        let p = FloatParameter::new("gain", 0.5, 0.0..=1.0);
        p.set(-3.0);
        assert_eq!(p.value(), 0.0);
        p.set(0.25);
        assert_eq!(p.value(), 0.25);
    }

    #[test]
    fn test_non_finite_set_ignored() {
        let p = FloatParameter::new("gain", 0.5, 0.0..=1.0);
        p.set(f64::NAN);
        assert_eq!(p.value(), 0.5);
        p.set(f64::INFINITY);
        assert_eq!(p.value(), 0.5);
    }

    #[test]
    fn test_by_name_exact_match() {
        let set = gain_set();
        assert!(set.by_name("gain").is_some());
        assert!(set.by_name("Gain").is_none());
        assert!(set.by_name("gai").is_none());
        assert!(set.by_name("").is_none());
    }

    #[test]
    fn test_silent_set_does_not_notify() {
        let set = gain_set();
        let host = CountingHost::new();
        set.set_automation_host(host.clone());

        set.by_name("gain").unwrap().set(0.75);
        assert_eq!(host.edits.load(Ordering::SeqCst), 0);
        assert_eq!(set.by_name("gain").unwrap().value(), 0.75);
    }

    #[test]
    fn test_notifying_set_fires_exactly_once() {
        let set = gain_set();
        let host = CountingHost::new();
        set.set_automation_host(host.clone());

        assert!(set.set_notifying_host("gain", 0.25));
        assert_eq!(host.edits.load(Ordering::SeqCst), 1);
        assert_eq!(
            host.last.read().unwrap().clone(),
            Some(("gain".to_string(), 0.25))
        );
    }

    #[test]
    fn test_notifying_set_reports_clamped_value() {
        let set = gain_set();
        let host = CountingHost::new();
        set.set_automation_host(host.clone());

        assert!(set.set_notifying_host("q", 99.0));
        assert_eq!(host.last.read().unwrap().clone(), Some(("q".to_string(), 10.0)));
    }

    #[test]
    fn test_notifying_set_unknown_name_is_untouched() {
        let set = gain_set();
        let host = CountingHost::new();
        set.set_automation_host(host.clone());

        assert!(!set.set_notifying_host("volume", 0.9));
        assert_eq!(host.edits.load(Ordering::SeqCst), 0);
        assert_eq!(set.by_name("gain").unwrap().value(), 0.5);
    }

    #[test]
    fn test_notifying_set_without_host_still_writes() {
        let set = gain_set();
        assert!(set.set_notifying_host("gain", 0.1));
        assert_eq!(set.by_name("gain").unwrap().value(), 0.1);
    }

    #[test]
    fn test_snapshot_shape() {
        let set = gain_set();
        let snapshot = set.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot[1],
            ParameterSnapshot {
                name: "gain",
                value: 0.5,
                min: 0.0,
                max: 1.0,
            }
        );

        let json: serde_json::Value = serde_json::from_str(&set.snapshot_json()).unwrap();
        assert_eq!(json[0]["name"], "freq");
        assert_eq!(json[2]["max"], 10.0);
    }
}
