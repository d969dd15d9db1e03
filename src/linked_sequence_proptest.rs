#![cfg(test)]

// Property tests for LinkedSequence against a `VecDeque` model. Positions
// of erased nodes are kept around to check that they never resolve again.

use crate::error::ContainerError;
use crate::linked_sequence::{LinkedSequence, Position};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum Op {
    Append(i32),
    Prepend(i32),
    Insert(usize, i32),
    PopFirst,
    PopLast,
    Erase(usize),
    EraseRange(usize, usize),
    Bump(usize),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::Append),
        2 => any::<i32>().prop_map(Op::Prepend),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
        2 => any::<usize>().prop_map(Op::Erase),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::EraseRange(a, b)),
        1 => any::<usize>().prop_map(Op::Bump),
        1 => Just(Op::Clear),
    ]
}

fn nth(seq: &LinkedSequence<i32>, i: usize) -> Position {
    seq.begin()
        .offset(seq, i as isize)
        .expect("offset within [begin, end]")
}

// Property: State-machine equivalence against VecDeque.
// Invariants exercised across random operation sequences:
// - Contents match the model in both directions after every operation.
// - Empty pops fail with `Empty`; erasing `end()` fails with `OutOfBounds`.
// - Positions of erased nodes are reported as foreign from then on.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: LinkedSequence<i32> = LinkedSequence::new();
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut stale: Vec<Position> = Vec::new();

        for op in ops {
            match op {
                Op::Append(v) => {
                    sut.append(v);
                    model.push_back(v);
                }
                Op::Prepend(v) => {
                    sut.prepend(v);
                    model.push_front(v);
                }
                Op::Insert(i, v) => {
                    let i = i % (model.len() + 1);
                    let at = nth(&sut, i);
                    let p = sut.insert(at, v).expect("insert before a live position or end");
                    prop_assert_eq!(p.value(&sut), Ok(&v));
                    model.insert(i, v);
                }
                Op::PopFirst => {
                    let got = sut.pop_first();
                    match model.pop_front() {
                        Some(v) => prop_assert_eq!(got, Ok(v)),
                        None => prop_assert_eq!(got, Err(ContainerError::Empty)),
                    }
                }
                Op::PopLast => {
                    let got = sut.pop_last();
                    match model.pop_back() {
                        Some(v) => prop_assert_eq!(got, Ok(v)),
                        None => prop_assert_eq!(got, Err(ContainerError::Empty)),
                    }
                }
                Op::Erase(i) => {
                    if model.is_empty() {
                        let e = sut.end();
                        prop_assert_eq!(sut.erase(e), Err(ContainerError::Empty));
                    } else {
                        let e = sut.end();
                        prop_assert_eq!(sut.erase(e), Err(ContainerError::OutOfBounds));
                        let i = i % model.len();
                        let p = nth(&sut, i);
                        sut.erase(p).expect("erase live node");
                        model.remove(i);
                        stale.push(p);
                    }
                }
                Op::EraseRange(a, b) => {
                    let a = a % (model.len() + 1);
                    let b = b % (model.len() + 1);
                    let (lo, hi) = (a.min(b), a.max(b));
                    let first = nth(&sut, lo);
                    let last = nth(&sut, hi);
                    if lo < hi {
                        prop_assert_eq!(sut.erase_range(last, first), Err(ContainerError::OutOfBounds));
                    }
                    sut.erase_range(first, last).expect("ordered range");
                    model.drain(lo..hi);
                    if lo < hi {
                        stale.push(first);
                    }
                }
                Op::Bump(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let p = nth(&sut, i);
                        let v = p.value_mut(&mut sut).expect("live node");
                        *v = v.wrapping_add(1);
                        model[i] = model[i].wrapping_add(1);
                    }
                }
                Op::Clear => {
                    if !model.is_empty() {
                        stale.push(sut.begin());
                    }
                    sut.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.iter().eq(model.iter()));
            prop_assert!(sut.iter().rev().eq(model.iter().rev()));
            prop_assert_eq!(sut.first(), model.front());
            prop_assert_eq!(sut.last(), model.back());
            for p in &stale {
                prop_assert_eq!(p.value(&sut), Err(ContainerError::ForeignPosition));
            }
        }
    }
}

// Property: moving a sequence out transfers every node and leaves an
// empty, reusable source.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_take_transfers_all(values in proptest::collection::vec(any::<i32>(), 0..40)) {
        let mut src: LinkedSequence<i32> = values.iter().copied().collect();
        let moved = src.take();
        prop_assert!(src.is_empty());
        prop_assert_eq!(src.begin(), src.end());
        prop_assert!(moved.iter().eq(values.iter()));
        src.append(1);
        prop_assert_eq!(src.len(), 1);
        prop_assert_eq!(moved.len(), values.len());
    }
}
