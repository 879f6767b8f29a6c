//! Script-side parameter bindings.
//!
//! When the engine creates a scripting context, the bindings install one
//! named object into the global scope and intercept property reads and
//! writes on it. A read returns the parameter's current value; a write
//! goes through the host's notify-automation path so automation recording
//! and undo observe it. Unknown names are passed back to the engine's
//! default resolution, never raised.

use std::sync::{Arc, Mutex, PoisonError};

use vitrine_core::ParameterSet;

use crate::engine::{
    ScriptContextHandler, ScriptException, ScriptGlobal, ScriptInterceptor, ScriptValue,
};

/// Name of the global object the bindings install.
pub const PARAMETERS_OBJECT: &str = "parameters";

/// Binding lifetime over one scripting context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    /// No scripting context has been seen yet.
    Uninitialized,
    /// Installed into a live context; interception is active.
    Bound,
    /// The context went away; interception passes everything through.
    TornDown,
}

struct BindingsInner {
    parameters: Arc<ParameterSet>,
    state: Mutex<BindingState>,
}

impl BindingsInner {
    fn state(&self) -> BindingState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: BindingState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl ScriptInterceptor for BindingsInner {
    fn get(&self, name: &str) -> Option<ScriptValue> {
        if self.state() != BindingState::Bound {
            return None;
        }
        let parameter = self.parameters.by_name(name)?;
        Some(ScriptValue::from(parameter.value()))
    }

    fn set(&self, name: &str, value: &ScriptValue) -> Result<bool, ScriptException> {
        if self.state() != BindingState::Bound {
            return Ok(false);
        }
        if self.parameters.by_name(name).is_none() {
            return Ok(false);
        }
        let Some(number) = value.as_f64() else {
            return Err(ScriptException::new(format!(
                "parameter '{name}' expects a number, got {value}"
            )));
        };
        self.parameters.set_notifying_host(name, number);
        Ok(true)
    }
}

/// Installs and serves the `parameters` object for one browser.
///
/// State machine: `Uninitialized → Bound → TornDown`, advanced by the
/// engine's context notifications. Outside `Bound`, every access passes
/// through silently; the UI must stay responsive before and after the
/// browser exists.
pub struct ParameterBindings {
    inner: Arc<BindingsInner>,
    object_name: String,
}

impl ParameterBindings {
    /// Create bindings over the host's parameter set, installing under
    /// [`PARAMETERS_OBJECT`].
    pub fn new(parameters: Arc<ParameterSet>) -> Self {
        Self::with_object_name(parameters, PARAMETERS_OBJECT)
    }

    /// Create bindings installing under a custom global object name.
    pub fn with_object_name(parameters: Arc<ParameterSet>, object_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(BindingsInner {
                parameters,
                state: Mutex::new(BindingState::Uninitialized),
            }),
            object_name: object_name.into(),
        }
    }

    /// The interceptor half, for direct installation by an engine adapter.
    pub fn interceptor(&self) -> Arc<dyn ScriptInterceptor> {
        self.inner.clone()
    }
}

impl ScriptContextHandler for ParameterBindings {
    fn context_created(&self, global: &mut dyn ScriptGlobal) {
        if self.inner.state() == BindingState::Bound {
            log::warn!("script context created while already bound; rebinding");
        }
        global.install(&self.object_name, self.inner.clone());
        self.inner.set_state(BindingState::Bound);
        log::debug!("parameter bindings installed as '{}'", self.object_name);
    }

    fn context_released(&self) {
        self.inner.set_state(BindingState::TornDown);
        log::debug!("parameter bindings torn down");
    }
}
