//! Progress notification port
//!
//! Defines the interface for reporting progress during a multi-model fan-out.

use nutri_domain::{Model, TaskType};

/// Callback for progress updates during fan-out
///
/// Implementations live in the CLI layer and can display
/// progress in various ways (console, logs, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when the fan-out starts
    fn on_fan_out_start(&self, task: TaskType, models: &[Model]);

    /// Called when one model call finishes
    fn on_model_complete(&self, task: TaskType, model: &Model, success: bool);

    /// Called when every model call has finished
    fn on_fan_out_complete(&self, task: TaskType, succeeded: usize, total: usize);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_fan_out_start(&self, _task: TaskType, _models: &[Model]) {}
    fn on_model_complete(&self, _task: TaskType, _model: &Model, _success: bool) {}
    fn on_fan_out_complete(&self, _task: TaskType, _succeeded: usize, _total: usize) {}
}
