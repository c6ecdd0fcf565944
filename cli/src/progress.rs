//! Console progress reporting for model fan-outs

use colored::Colorize;
use nutri_application::ProgressNotifier;
use nutri_domain::{Model, TaskType};

/// Simple text-based progress on stderr, so stdout stays parseable
pub struct ConsoleProgress;

impl ProgressNotifier for ConsoleProgress {
    fn on_fan_out_start(&self, task: TaskType, models: &[Model]) {
        eprintln!(
            "{} {} ({} models)",
            "->".cyan(),
            task.as_str().bold(),
            models.len()
        );
    }

    fn on_model_complete(&self, _task: TaskType, model: &Model, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), model);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_fan_out_complete(&self, _task: TaskType, succeeded: usize, total: usize) {
        let line = format!("{}/{} models answered", succeeded, total);
        if succeeded == total {
            eprintln!("{}", line.dimmed());
        } else {
            eprintln!("{}", line.yellow());
        }
    }
}
