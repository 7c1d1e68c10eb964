// SPDX-License-Identifier: MIT OR Apache-2.0
//! Platform-assigned identifiers.
//!
//! Every resource in the platform hierarchy is keyed by a 32-bit unsigned
//! integer the platform assigns. The CLI treats them as opaque: the only
//! operations are parsing, display, and equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! platform_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw numeric value.
            #[must_use]
            pub fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u32>().map(Self)
            }
        }
    };
}

platform_id!(
    /// A project, the root container.
    ProjectId
);
platform_id!(
    /// A goal under a project.
    GoalId
);
platform_id!(
    /// An immutable version token pinned to a goal.
    SnapshotId
);
platform_id!(
    /// A journey (platform name: testsuite) under a goal.
    JourneyId
);
platform_id!(
    /// A checkpoint (platform name: testcase) within a journey.
    CheckpointId
);
platform_id!(
    /// A single step within a checkpoint.
    StepId
);
platform_id!(
    /// A checkpoint promoted to the shared library.
    LibraryCheckpointId
);
platform_id!(
    /// A server-side execution of a goal snapshot.
    ExecutionId
);
platform_id!(
    /// A test-data table.
    DataTableId
);
platform_id!(
    /// An execution environment.
    EnvironmentId
);
