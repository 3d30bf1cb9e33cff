//! Repetition.
//!
//! Repeating parsers are greedy, and never give back a match once they've
//! made it. A repetition which matches without consuming anything stops
//! there, since it would otherwise match the same nothing forever.

use std::ops::{Bound, RangeBounds};
use std::rc::Rc;

use crate::combinator::Parser;
use crate::graph::{Describe, Lazy, Node, NodeId};
use crate::matching::{collect, Match, Value};
use crate::scheduler::{matcher, Step};
use crate::sequence::Sequence;
use crate::span::Span;

/// How many times something can be repeated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bounds {
    min: usize,
    max: Option<usize>,
}

impl Bounds {
    fn new(range: impl RangeBounds<usize>) -> Bounds {
        let min = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.saturating_add(1),
            Bound::Unbounded => 0,
        };

        let max = match range.end_bound() {
            Bound::Included(&n) => Some(n),
            Bound::Excluded(&n) => Some(n.saturating_sub(1)),
            Bound::Unbounded => None,
        };

        Bounds { min, max }
    }

    /// Can no more be matched after `count`?
    fn full(self, count: usize) -> bool {
        self.max.map_or(false, |max| count >= max)
    }

    fn allows(self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Written the way they would be in a regular expression.
    fn suffix(self) -> String {
        match (self.min, self.max) {
            (0, None) => String::from("*"),
            (1, None) => String::from("+"),
            (min, None) => format!("{{{},}}", min),
            (min, Some(max)) if min == max => format!("{{{}}}", min),
            (min, Some(max)) => format!("{{{},{}}}", min, max),
        }
    }

    fn expected(self) -> String {
        match (self.min, self.max) {
            (min, None) => format!("at least {}", min),
            (min, Some(max)) if min == max => format!("exactly {}", min),
            (min, Some(max)) => format!("between {} and {}", min, max),
        }
    }
}

/// What a repetition does when it's done trying to match more.
#[derive(Clone)]
struct Finish {
    bounds: Bounds,
    collect: fn(&[Value]) -> Value,
    /// What's being repeated, for messages.
    description: Rc<str>,
}

impl Finish {
    /// Finish with `values`, matched over `span`. If the last attempt to match
    /// failed, `failure` is where.
    fn finish(&self, values: Vec<Value>, span: Span, failure: Option<Span>) -> Step {
        let m = if self.bounds.allows(values.len()) {
            Match::success(span, (self.collect)(&values))
        } else {
            let reached = failure.map_or(span.end(), |f| f.end().max(span.end()));
            let message = format!(
                "expected {} of {}, found {}",
                self.bounds.expected(),
                self.description,
                values.len()
            );
            Match::failure(message, Span::at(reached))
        };

        m.into()
    }
}

fn repeat_node<S: Sequence>(child: Lazy<S>, bounds: Bounds, collect: fn(&[Value]) -> Value) -> Node<S> {
    let name = format!("repeat{}", bounds.suffix());

    Node::new(name, vec![child], move |children| {
        let child = children[0].id;
        let finish = Finish {
            bounds,
            collect,
            description: children[0].description.clone(),
        };

        matcher(move |_: &S, position| iterate(child, finish.clone(), Vec::new(), Span::at(position)))
    })
    .cacheable(true)
    .describe(Describe::Postfix(bounds.suffix()))
}

fn iterate(child: NodeId, finish: Finish, values: Vec<Value>, span: Span) -> Step {
    if finish.bounds.full(values.len()) {
        return finish.finish(values, span, None);
    }

    Step::call(child, span.end(), move |m| match m {
        Match::Success { span: next, value } => {
            let mut values = values;
            values.push(value);

            if next.is_empty() {
                finish.finish(values, span.join(next), None)
            } else {
                iterate(child, finish, values, span.join(next))
            }
        }
        Match::Failure { span: failed, .. } => finish.finish(values, span, Some(failed)),
    })
}

fn separated_node<S: Sequence>(
    item: Lazy<S>,
    separator: Lazy<S>,
    bounds: Bounds,
    collect: fn(&[Value]) -> Value,
) -> Node<S> {
    let name = format!("separated{}", bounds.suffix());

    Node::new(name, vec![item, separator], move |children| {
        let (item, separator) = (children[0].id, children[1].id);
        let finish = Finish {
            bounds,
            collect,
            description: children[0].description.clone(),
        };

        matcher(move |_: &S, position| {
            let finish = finish.clone();

            if finish.bounds.full(0) {
                return finish.finish(Vec::new(), Span::at(position), None);
            }

            Step::call(item, position, move |m| match m {
                Match::Success { span, value } => {
                    separate(item, separator, finish, vec![value], span)
                }
                Match::Failure { span: failed, .. } => {
                    finish.finish(Vec::new(), Span::at(position), Some(failed))
                }
            })
        })
    })
    .cacheable(true)
}

/// Having matched `values` over `span`, try to match a separator and then
/// another item.
///
/// A separator which isn't followed by an item isn't part of the match.
fn separate(item: NodeId, separator: NodeId, finish: Finish, values: Vec<Value>, span: Span) -> Step {
    if finish.bounds.full(values.len()) {
        return finish.finish(values, span, None);
    }

    Step::call(separator, span.end(), move |m| {
        let between = match m {
            Match::Success { span, .. } => span,
            Match::Failure { .. } => return finish.finish(values, span, None),
        };

        Step::call(item, between.end(), move |m| match m {
            Match::Success { span: next, value } => {
                let mut values = values;
                values.push(value);

                if between.is_empty() && next.is_empty() {
                    finish.finish(values, span.join(next), None)
                } else {
                    separate(item, separator, finish, values, span.join(next))
                }
            }
            Match::Failure { span: failed, .. } => finish.finish(values, span, Some(failed)),
        })
    })
}

/// Match `parser` as many times as `range` allows, producing the values in
/// order.
pub fn repeat<S, O>(parser: Parser<S, O>, range: impl RangeBounds<usize>) -> Parser<S, Vec<O>>
where
    S: Sequence,
    O: Clone + 'static,
{
    let node = repeat_node(parser.into_lazy(), Bounds::new(range), collect::<O>);
    Parser::from_node(node)
}

/// Match `parser` as many times as `range` allows with `separator` between
/// each, producing the values of `parser` in order.
pub fn separated<S, O, P>(
    parser: Parser<S, O>,
    separator: Parser<S, P>,
    range: impl RangeBounds<usize>,
) -> Parser<S, Vec<O>>
where
    S: Sequence,
    O: Clone + 'static,
{
    let node = separated_node(
        parser.into_lazy(),
        separator.into_lazy(),
        Bounds::new(range),
        collect::<O>,
    );
    Parser::from_node(node)
}

impl<S: Sequence, O: Clone + 'static> Parser<S, O> {
    /// See [`repeat`].
    pub fn repeat(self, range: impl RangeBounds<usize>) -> Parser<S, Vec<O>> {
        repeat(self, range)
    }

    /// Match this zero or more times.
    pub fn many(self) -> Parser<S, Vec<O>> {
        repeat(self, ..)
    }

    /// Match this one or more times.
    pub fn many1(self) -> Parser<S, Vec<O>> {
        repeat(self, 1..)
    }

    /// See [`separated`].
    pub fn separated_by<P>(self, separator: Parser<S, P>, range: impl RangeBounds<usize>) -> Parser<S, Vec<O>> {
        separated(self, separator, range)
    }
}
