//! Some helpers for tracing execution.

use std::fmt::{Formatter, Result};

use crate::scheduler::{FrameId, Scheduler, Task};
use crate::sequence::Sequence;

impl<'a, S: Sequence> Scheduler<'a, S> {
    pub(crate) fn trace(&self, task: &Task) {
        eprintln!("{}", Traced { scheduler: self, task });
    }

    fn fmt_frame(&self, f: &mut Formatter, id: FrameId) -> Result {
        let frame = self.frame(id);
        let description = self
            .grammar()
            .description(frame.node)
            .unwrap_or("<unresolved>");

        write!(f, "{:<6} @{:<5} {}", format!("{id:?}"), frame.position, description)
    }
}

struct Traced<'s, 'a, S: Sequence> {
    scheduler: &'s Scheduler<'a, S>,
    task: &'s Task,
}

impl<S: Sequence> std::fmt::Display for Traced<'_, '_, S> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self.task {
            Task::Start(frame) => {
                write!(f, "{:>8} ", "start")?;
                self.scheduler.fmt_frame(f, *frame)
            }
            Task::Resume { frame, with, .. } => {
                write!(f, "{:>8} ", "resume")?;
                self.scheduler.fmt_frame(f, *frame)?;
                write!(f, " <- {with}")
            }
        }
    }
}
