/*!

This library is a client for the Kuberlab and Dealer machine learning platform REST API.

A [`Client`] owns an authenticated transport and one manager per resource kind (workspaces,
projects, applications, charts, ...). Managers return [`Resource`] snapshots that keep every field
the server sent. Application tasks are started and followed with a [`TaskController`].

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use query::CatalogQuery;
pub use resource::{find, FromPayload, Resource};
pub use task::{AppTask, TaskController, TaskState, WaitOptions};
pub use variant::{ApiVariant, StatusShape};

mod client;
pub mod clients;
pub mod constants;
mod error;
pub mod managers;
mod query;
mod resource;
pub mod task;
mod variant;
