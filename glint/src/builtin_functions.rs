use std::time::{SystemTime, UNIX_EPOCH};

use glint_value::{BuiltinVars, Value};

/// Returns the default [`BuiltinVars`] that should be used.
pub fn default_builtin_vars() -> BuiltinVars {
    let mut builtin_vars = BuiltinVars::new();
    builtin_vars.add_native_fn("clock", clock, 0);
    builtin_vars
}

/// Seconds since the Unix epoch.
pub fn clock(_args: &[Value]) -> Value {
    let since_the_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Value::Number(since_the_epoch.as_secs_f64())
}
