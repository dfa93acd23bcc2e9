//! Integration test common infrastructure.
//!
//! Provides a recording chat client, guild fixtures, and a harness that
//! wires both into a framework.

pub mod client;
pub mod harness;

#[allow(unused_imports)]
pub use client::MockClient;
#[allow(unused_imports)]
pub use harness::{ADMIN, BOT, GUILD, MEMBER, OWNER, TestBot, eventually};
