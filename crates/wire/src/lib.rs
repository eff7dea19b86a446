// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! vibecheck-wire: the tagged-union JSON protocol spoken between the agent
//! and the relay server.

pub mod agent_to_server;
pub mod image;
pub mod server_to_agent;

pub use agent_to_server::{AgentMessage, ToolStatusKind};
pub use image::ImageData;
pub use server_to_agent::{decode_inbound, ServerMessage, SessionInfoSource};
