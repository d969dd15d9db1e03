#![cfg(test)]

// Property tests for DynamicArray against a `Vec` model, kept inside the
// crate so capacity bookkeeping can be checked alongside the contents.

use crate::dynamic_array::{DynamicArray, FIRST_ALLOCATION};
use crate::error::ContainerError;
use proptest::prelude::*;

// Index arguments are reduced modulo the live length (or length + 1 for
// insertion points) so they shrink toward the front of the array.
#[derive(Clone, Debug)]
enum Op {
    Append(i32),
    Prepend(i32),
    Insert(usize, i32),
    PopFirst,
    PopLast,
    Erase(usize),
    EraseRange(usize, usize),
    Set(usize, i32),
    Clear,
    Take,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::Append),
        1 => any::<i32>().prop_map(Op::Prepend),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
        1 => any::<usize>().prop_map(Op::Erase),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::EraseRange(a, b)),
        1 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        1 => Just(Op::Clear),
        1 => Just(Op::Take),
    ]
}

fn expected_growth(cap: usize) -> usize {
    if cap == 0 {
        FIRST_ALLOCATION
    } else {
        cap * 2
    }
}

// Property: State-machine equivalence against Vec.
// Invariants exercised across random operation sequences:
// - Contents and order match the model after every operation.
// - `len <= capacity`; capacity only changes by the growth policy when a
//   push finds the block full (or drops to zero on take).
// - Pops and erasures on an empty array fail with `Empty` and change nothing.
// - Forward and backward cursor walks agree with the model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: DynamicArray<i32> = DynamicArray::new();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            let cap_before = sut.capacity();
            let full = sut.len() == cap_before;
            match op {
                Op::Append(v) => {
                    sut.append(v);
                    model.push(v);
                    let want = if full { expected_growth(cap_before) } else { cap_before };
                    prop_assert_eq!(sut.capacity(), want);
                }
                Op::Prepend(v) => {
                    sut.prepend(v);
                    model.insert(0, v);
                    let want = if full { expected_growth(cap_before) } else { cap_before };
                    prop_assert_eq!(sut.capacity(), want);
                }
                Op::Insert(i, v) => {
                    let i = i % (model.len() + 1);
                    let at = sut.begin().offset(&sut, i as isize).expect("index within [begin, end]");
                    let p = sut.insert(at, v).expect("insert at a valid position");
                    prop_assert_eq!(p.index(), i);
                    model.insert(i, v);
                }
                Op::PopFirst => {
                    if model.is_empty() {
                        prop_assert_eq!(sut.pop_first(), Err(ContainerError::Empty));
                    } else {
                        prop_assert_eq!(sut.pop_first(), Ok(model.remove(0)));
                    }
                }
                Op::PopLast => {
                    let got = sut.pop_last();
                    match model.pop() {
                        Some(v) => prop_assert_eq!(got, Ok(v)),
                        None => prop_assert_eq!(got, Err(ContainerError::Empty)),
                    }
                }
                Op::Erase(i) => {
                    if model.is_empty() {
                        let b = sut.begin();
                        prop_assert_eq!(sut.erase(b), Err(ContainerError::Empty));
                    } else {
                        let i = i % model.len();
                        let p = sut.begin().offset(&sut, i as isize).expect("live index");
                        sut.erase(p).expect("erase live position");
                        model.remove(i);
                    }
                }
                Op::EraseRange(a, b) => {
                    let a = a % (model.len() + 1);
                    let b = b % (model.len() + 1);
                    let (lo, hi) = (a.min(b), a.max(b));
                    let first = sut.begin().offset(&sut, lo as isize).expect("range start");
                    let last = sut.begin().offset(&sut, hi as isize).expect("range end");
                    if lo < hi {
                        prop_assert_eq!(sut.erase_range(last, first), Err(ContainerError::OutOfBounds));
                    }
                    sut.erase_range(first, last).expect("ordered range");
                    model.drain(lo..hi);
                }
                Op::Set(i, v) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        *sut.begin().offset(&sut, i as isize).unwrap().value_mut(&mut sut).unwrap() = v;
                        model[i] = v;
                    }
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
                Op::Take => {
                    let moved = sut.take();
                    prop_assert_eq!(moved.as_slice(), model.as_slice());
                    prop_assert_eq!(sut.capacity(), 0);
                    model.clear();
                }
            }

            prop_assert!(sut.len() <= sut.capacity());
            prop_assert_eq!(sut.as_slice(), model.as_slice());
            prop_assert_eq!(sut.is_empty(), model.is_empty());

            let mut back = Vec::with_capacity(model.len());
            let mut c = sut.cend();
            while c.move_prev().is_ok() {
                back.push(*c.get().unwrap());
            }
            back.reverse();
            prop_assert_eq!(&back, &model);
        }
    }
}

// Property: a clone compares equal, is independent of its source and
// rejects the source's positions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_clone_is_deep(values in proptest::collection::vec(any::<i16>(), 0..40), extra in any::<i16>()) {
        let src: DynamicArray<i16> = values.iter().copied().collect();
        let mut copy = src.clone();
        prop_assert_eq!(&copy, &src);
        prop_assert_eq!(copy.capacity(), src.len());
        copy.append(extra);
        prop_assert_eq!(src.as_slice(), values.as_slice());
        prop_assert_eq!(copy.erase(src.begin()), Err(ContainerError::ForeignPosition));
    }
}
