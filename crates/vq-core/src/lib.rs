// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-core
//!
//! Core data model for the Virtuoso CLI: platform identifiers, the step
//! payload wire shapes, selector strategies, and the structured operation
//! results every command produces.
//!
//! Everything here is pure data — no I/O, no transport. The wire types
//! serialise bit-exactly to what the platform's `/teststeps` endpoint
//! expects, and round-trip losslessly through JSON.

pub mod ids;
pub mod payload;
pub mod result;
pub mod selector;

pub use ids::{
    CheckpointId, DataTableId, EnvironmentId, ExecutionId, GoalId, JourneyId,
    LibraryCheckpointId, ProjectId, SnapshotId, StepId,
};
pub use payload::{
    ActionCode, CookieOp, DismissKind, KeyModifier, MouseAction, Offset, ParsedStep, PickStrategy,
    ScrollDirection, ScrollTarget, StepMeta, StepPayload, StoreSource, SwitchTarget, WaitKind,
};
pub use result::{CreatedResource, OperationResult, ResourceKind, Warning};
pub use selector::{Selector, SelectorKind, Target};
