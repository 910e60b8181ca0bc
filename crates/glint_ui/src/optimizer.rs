//! Command list batching.
//!
//! The emitter produces one command per primitive. Consecutive batches that
//! share clip, topology, texture and size are drawn with identical pipeline
//! state, so they are merged by concatenating their vertices. Native callbacks
//! are barriers: nothing merges across them.

use crate::command::{CommandKind, CommandList};

/// Merges compatible consecutive batches in place. Order is preserved.
pub fn optimize(commands: &mut CommandList) {
    let before = commands.len();
    let mut merged = CommandList::with_capacity(before);

    for command in commands.drain(..) {
        if let (Some(last), CommandKind::Batch(next)) = (merged.last_mut(), &command.kind) {
            if last.clip == command.clip {
                if let CommandKind::Batch(current) = &mut last.kind {
                    if current.is_compatible(next) {
                        current.vertices.extend_from_slice(&next.vertices);
                        continue;
                    }
                }
            }
        }
        merged.push(command);
    }

    tracing::trace!(before, after = merged.len(), "command list optimized");
    *commands = merged;
}
