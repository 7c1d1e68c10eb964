// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step-command argument handling.
//!
//! Two conventions from the platform CLI surface live here: the
//! `create-step-<primitive>` alias family, and the trailing-integer rule
//! that lets a step command carry an explicit position and checkpoint id
//! after the primitive's own arguments.

use vq_catalog::StepSpec;
use vq_core::CheckpointId;

/// Rewrite `api-cli create-step-<primitive> …` into
/// `api-cli create-step <primitive> …`.
pub fn rewrite_step_alias(mut argv: Vec<String>) -> Vec<String> {
    if let Some(command) = argv.get(1) {
        if let Some(primitive) = command.strip_prefix("create-step-") {
            let primitive = primitive.to_string();
            argv[1] = "create-step".to_string();
            argv.insert(2, primitive);
        }
    }
    argv
}

/// Split the raw positional arguments of a step command.
///
/// Arguments beyond the primitive's declared arity must be integers: the
/// first extra is the position, the second the checkpoint id. One extra
/// integer is a position (the checkpoint comes from `--checkpoint` or the
/// session).
pub fn split_step_args(
    spec: &StepSpec,
    raw: &[String],
) -> (Vec<String>, Option<u32>, Option<CheckpointId>) {
    let mut args: Vec<String> = raw.to_vec();
    let mut extras: Vec<u32> = Vec::new();

    while args.len() > spec.max_arity() && extras.len() < 2 {
        match args.last().and_then(|s| s.parse::<u32>().ok()) {
            Some(n) => {
                args.pop();
                extras.insert(0, n);
            }
            None => break,
        }
    }

    match extras.as_slice() {
        [] => (args, None, None),
        [position] => (args, Some(*position), None),
        [position, checkpoint] => (args, Some(*position), Some(CheckpointId(*checkpoint))),
        _ => unreachable!("at most two extras are popped"),
    }
}
