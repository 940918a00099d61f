//! Canonical logging macros
//!
//! Field keys follow `driftwatch_core_types::schema`.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use driftwatch_core::log_op_start;
/// log_op_start!("drift_scan");
/// log_op_start!("drift_scan", scan_id = "0190-abc", declared_len = 12);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::driftwatch_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::driftwatch_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use driftwatch_core::log_op_end;
/// log_op_end!("drift_scan", duration_ms = 42);
/// log_op_end!("drift_scan", duration_ms = 42, change_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::driftwatch_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::driftwatch_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into [`DwError`](crate::errors::DwError).
///
/// # Example
///
/// ```
/// # use driftwatch_core::{log_op_error, errors::DriftwatchError};
/// let err = DriftwatchError::RegistryNotSealed { registry: "schema".to_string() };
/// log_op_error!("drift_scan", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let dw_err: $crate::errors::DwError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::driftwatch_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?dw_err.kind(),
            err.code = dw_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let dw_err: $crate::errors::DwError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::driftwatch_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?dw_err.kind(),
            err.code = dw_err.code(),
            $($field)*
        );
    }};
}
