//! Line-oriented command interpreter over the store engine.
//!
//! Each line of a script maps to exactly one [`StoreService`] operation.
//! Parsing is purely syntactic; every rule is enforced by the engine.
//!
//! [`StoreService`]: smartstore_engine::StoreService

pub mod command;
pub mod processor;
pub mod tokenizer;

pub use command::{Command, CommandError, Output};
pub use processor::{CommandProcessor, ScriptSummary};
pub use tokenizer::tokenize;
