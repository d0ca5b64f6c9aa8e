//! Router agent - deterministic intent routing and orchestration
//!
//! This crate is the decision-making core of the helpdesk. Given a free-text
//! support request it:
//! - Classifies the request into one intent with fixed keyword rules
//! - Extracts the customer id and new email, falling back to per-intent defaults
//! - Selects an ordered plan of collaborator calls
//! - Runs the plan step by step, threading earlier results into later steps
//! - Shapes the results into one response envelope with a decision trace
//!
//! # Architecture
//!
//! 1. **Classification** (`classifier`) - text to `Intent`
//! 2. **Extraction** (`extraction`) - text and arguments to `Entities`
//! 3. **Planning** (`plan`) - `Intent` and `Entities` to `Plan`
//! 4. **Execution** (`runtime`) - `Plan` against a `Collaborator`
//! 5. **Response** (`envelope`) - results to `RouteOutcome`
//!
//! The record store and the reply drafter sit behind the `Collaborator` port
//! (see `tools`). This crate never talks to them directly.

pub mod classifier;
pub mod envelope;
pub mod extraction;
pub mod plan;
pub mod runtime;
pub mod tools;

pub use classifier::{classify, Intent, CLASSIFICATION_RULES};
pub use envelope::{FinalAnswer, RouteOutcome, Scenario};
pub use runtime::{CallReply, Message, RouteError, RouterAgent, ToolCall};
pub use tools::{Collaborator, CollaboratorError, CollaboratorTool, CreatedTicket, SupportReply};
