//! The scheduler which drives matching.
//!
//! Matchers never call each other. When a matcher needs to know how a child
//! matches, it returns a [`Step::Call`] with a continuation saying what to do
//! with the child's result. The scheduler keeps the work to be done in a
//! queue, so the native stack stays the same depth no matter how deep the
//! grammar or how long the input is.
//!
//! Each `(node, position)` pair gets a [`Frame`]. Everything that calls the
//! same node at the same position waits on the same frame, and once it has a
//! result it's reused (unless memoization is turned off). This is what makes
//! it a packrat parser.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use common::Index;

use crate::engine::EngineOptions;
use crate::graph::{Grammar, NodeId};
use crate::matching::Match;
use crate::sequence::Sequence;
use crate::span::Span;

/// Matches a resolved node against the input at a position.
pub type Matcher<S> = Rc<dyn Fn(&S, usize) -> Step>;

/// What to do with the result of a [`Step::Call`].
pub type Continuation = Box<dyn FnOnce(Match) -> Step>;

/// One step of matching.
pub enum Step {
    /// The node is finished matching.
    Done(Match),

    /// Match `node` at `position`, and then carry on with `then`.
    Call {
        node: NodeId,
        position: usize,
        then: Continuation,
    },
}

impl Step {
    pub fn call(node: NodeId, position: usize, then: impl FnOnce(Match) -> Step + 'static) -> Step {
        Step::Call {
            node,
            position,
            then: Box::new(then),
        }
    }
}

impl From<Match> for Step {
    fn from(m: Match) -> Step {
        Step::Done(m)
    }
}

/// Wrap a function up as a [`Matcher`].
pub fn matcher<S, F>(f: F) -> Matcher<S>
where
    S: Sequence,
    F: Fn(&S, usize) -> Step + 'static,
{
    Rc::new(f)
}

/// The work of matching one node at one position.
pub(crate) struct Frame {
    pub(crate) node: NodeId,
    pub(crate) position: usize,
    result: Option<Match>,
    /// Who's waiting on the result, and what they'll do with it.
    waiters: Vec<(FrameId, Continuation)>,
}

pub(crate) type FrameId = Index<Frame>;

pub(crate) enum Task {
    /// Run a frame's matcher.
    Start(FrameId),
    /// Give a frame's continuation the result it was waiting for.
    Resume {
        frame: FrameId,
        then: Continuation,
        with: Match,
    },
}

/// Reasons the scheduler gives up early.
#[derive(Debug)]
enum Halt {
    StepLimit,
    Overflow,
    Stalled,
}

pub(crate) struct Scheduler<'a, S: Sequence> {
    grammar: &'a Grammar<S>,
    input: &'a S,
    frames: Vec<Frame>,
    /// The frame for each `(node, position)` which is running or, when
    /// memoizing, finished.
    table: HashMap<(NodeId, usize), FrameId>,
    queue: VecDeque<Task>,
    memoize: bool,
    step_limit: Option<usize>,
    steps: usize,
}

impl<'a, S: Sequence> Scheduler<'a, S> {
    pub(crate) fn new(grammar: &'a Grammar<S>, input: &'a S, options: &EngineOptions) -> Self {
        Scheduler {
            grammar,
            input,
            frames: Vec::new(),
            table: HashMap::new(),
            queue: VecDeque::new(),
            memoize: options.memoize,
            step_limit: options.step_limit,
            steps: 0,
        }
    }

    /// Match `root` at `position`, running until it has a result.
    pub(crate) fn run(mut self, root: NodeId, position: usize) -> Match {
        match self.drive(root, position) {
            Ok(m) => m,
            Err(Halt::StepLimit) => Match::failure("step limit exceeded", Span::at(position)),
            Err(Halt::Overflow) => Match::failure("too many pending matches", Span::at(position)),
            Err(Halt::Stalled) => Match::failure("parser stalled", Span::at(position)),
        }
    }

    fn drive(&mut self, root: NodeId, position: usize) -> Result<Match, Halt> {
        let root = self.grammar.follow(root);
        let frame = self.open(root, position)?;
        self.queue.push_back(Task::Start(frame));

        loop {
            while let Some(task) = self.queue.pop_front() {
                self.steps += 1;
                if matches!(self.step_limit, Some(limit) if self.steps > limit) {
                    return Err(Halt::StepLimit);
                }
                self.step(task)?;
            }

            if let Some(result) = &self.frames[frame.as_usize()].result {
                return Ok(result.clone());
            }

            // Nothing left to do but the root isn't finished, so some frames
            // are waiting on each other. They're all at the same position, so
            // this is left recursion. Failing the newest one lets the rest
            // carry on.
            let stuck = self
                .frames
                .iter()
                .rposition(|f| f.result.is_none())
                .and_then(FrameId::for_len)
                .ok_or(Halt::Stalled)?;

            let at = self.frames[stuck.as_usize()].position;
            self.complete(stuck, Match::failure("left recursion", Span::at(at)));
        }
    }

    fn step(&mut self, task: Task) -> Result<(), Halt> {
        #[cfg(feature = "trace")]
        self.trace(&task);

        match task {
            Task::Start(frame) => {
                let Frame { node, position, .. } = &self.frames[frame.as_usize()];
                let (node, position) = (*node, *position);
                let step = match self.grammar.matcher(node) {
                    Some(matcher) => matcher(self.input, position),
                    None => Match::failure("unresolved parser", Span::at(position)).into(),
                };
                self.process(frame, step)
            }
            Task::Resume { frame, then, with } => self.process(frame, then(with)),
        }
    }

    /// Deal with the step taken by `frame`.
    fn process(&mut self, frame: FrameId, step: Step) -> Result<(), Halt> {
        match step {
            Step::Done(m) => {
                self.complete(frame, m);
                Ok(())
            }

            Step::Call { node, position, then } => {
                let node = self.grammar.follow(node);

                match self.table.get(&(node, position)).copied() {
                    Some(callee) => match &self.frames[callee.as_usize()].result {
                        Some(result) => {
                            let with = result.clone();
                            self.queue.push_back(Task::Resume { frame, then, with });
                        }
                        None => self.frames[callee.as_usize()].waiters.push((frame, then)),
                    },
                    None => {
                        let callee = self.open(node, position)?;
                        self.frames[callee.as_usize()].waiters.push((frame, then));
                        self.queue.push_back(Task::Start(callee));
                    }
                }

                Ok(())
            }
        }
    }

    fn open(&mut self, node: NodeId, position: usize) -> Result<FrameId, Halt> {
        let id = FrameId::for_len(self.frames.len()).ok_or(Halt::Overflow)?;

        self.frames.push(Frame {
            node,
            position,
            result: None,
            waiters: Vec::new(),
        });
        self.table.insert((node, position), id);

        Ok(id)
    }

    /// Give `frame` its result, and wake up everything waiting on it.
    ///
    /// A frame which was failed to break a cycle can still finish on its own
    /// later. The first result is the one which sticks.
    fn complete(&mut self, frame: FrameId, m: Match) {
        let f = &mut self.frames[frame.as_usize()];
        if f.result.is_some() {
            return;
        }

        let waiters = std::mem::take(&mut f.waiters);
        let key = (f.node, f.position);
        f.result = Some(m.clone());

        if !self.memoize {
            self.table.remove(&key);
        }

        for (waiter, then) in waiters {
            self.queue.push_back(Task::Resume {
                frame: waiter,
                then,
                with: m.clone(),
            });
        }
    }

    #[cfg(feature = "trace")]
    pub(crate) fn grammar(&self) -> &Grammar<S> {
        self.grammar
    }

    #[cfg(feature = "trace")]
    pub(crate) fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.as_usize()]
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::graph::{Lazy, Node};
    use crate::matching::erase;
    use crate::sequence::Text;

    /// A leaf matching one `x`, counting how many times it's run.
    fn counted(count: Rc<Cell<usize>>) -> Node<Text> {
        Node::new("x", vec![], move |_| {
            let count = count.clone();
            matcher(move |input: &Text, position| {
                count.set(count.get() + 1);
                let m = match input.at(position) {
                    Some('x') => Match::success(Span::new(position, position + 1), erase('x')),
                    _ => Match::failure("expected x", Span::at(position)),
                };
                m.into()
            })
        })
    }

    /// Calls its child twice at the same position and keeps the second result.
    fn twice(child: Lazy<Text>) -> Node<Text> {
        Node::new("twice", vec![child], |children| {
            let child = children[0].id;
            matcher(move |_: &Text, position| {
                Step::call(child, position, move |_| Step::call(child, position, Step::Done))
            })
        })
    }

    fn run(grammar: &Grammar<Text>, root: NodeId, input: &str, options: &EngineOptions) -> Match {
        let input = Text::new(input);
        Scheduler::new(grammar, &input, options).run(root, 0)
    }

    #[test]
    fn memoized_calls_run_once() {
        let count = Rc::new(Cell::new(0));
        let mut grammar = Grammar::new();
        let root = grammar
            .resolve(&Lazy::node(twice(Lazy::node(counted(count.clone())))))
            .unwrap();

        let m = run(&grammar, root, "x", &EngineOptions::default());
        assert_eq!(m.span(), Span::new(0, 1));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unmemoized_calls_run_each_time() {
        let count = Rc::new(Cell::new(0));
        let mut grammar = Grammar::new();
        let root = grammar
            .resolve(&Lazy::node(twice(Lazy::node(counted(count.clone())))))
            .unwrap();

        let options = EngineOptions::default().with_memoize(false);
        assert!(run(&grammar, root, "x", &options).is_success());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn step_limit() {
        let count = Rc::new(Cell::new(0));
        let mut grammar = Grammar::new();
        let root = grammar
            .resolve(&Lazy::node(twice(Lazy::node(counted(count)))))
            .unwrap();

        let options = EngineOptions::default().with_step_limit(2);
        let m = run(&grammar, root, "x", &options);
        assert_eq!(m.message(), Some("step limit exceeded"));
    }

    #[test]
    fn deep_chains_stay_off_the_stack() {
        // A node which calls itself one position further along, 100k deep.
        fn walk() -> Lazy<Text> {
            Lazy::node(Node::new("walk", vec![Lazy::Thunk(crate::graph::Thunk::new(walk))], |children| {
                let me = children[0].id;
                matcher(move |input: &Text, position| {
                    if input.is_end(position) {
                        return Match::success(Span::at(position), erase(())).into();
                    }
                    Step::call(me, position + 1, move |m| {
                        m.and_then(|span, value| Match::success(Span::new(position, span.end()), value))
                            .into()
                    })
                })
            }))
        }

        let mut grammar = Grammar::new();
        let root = grammar.resolve(&walk()).unwrap();
        let input = "x".repeat(100_000);

        let m = run(&grammar, root, &input, &EngineOptions::default());
        assert_eq!(m.span(), Span::new(0, 100_000));
    }
}
