//! Application task builds and the controller that starts and follows them.

mod app_task;
mod controller;

pub use app_task::{AppTask, TaskState};
pub use controller::{TaskController, TickResult, WaitOptions};
