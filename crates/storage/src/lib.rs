// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! vibecheck-storage: on-disk persistence for session ids and scheduled
//! tasks under `~/.vibecheck`. Deliberately much smaller than a
//! write-ahead-logged event store — there is no replay, just two small
//! JSON files written atomically.

pub mod fs;
pub mod paths;
pub mod schedule_store;
pub mod session_store;

pub use paths::{schedule_file_path, session_file_path, state_dir, work_dir_key, StorageError};
pub use schedule_store::{load_tasks, save_tasks};
pub use session_store::{load_session_id, save_session_id, SessionRecord};
