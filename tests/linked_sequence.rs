// LinkedSequence integration suite.
//
// The core invariants exercised:
// - Ring order: forward and backward traversal mirror each other.
// - Splicing: insert/erase are O(1) relinks that keep unrelated positions
//   valid.
// - Stale detection: positions of removed nodes never resolve again.
// - Value semantics: clone is deep, take is an O(1) transfer.
use chained_collections::{ContainerError, LinkedSequence};

fn items<T: Clone>(s: &LinkedSequence<T>) -> Vec<T> {
    s.iter().cloned().collect()
}

// Test: concrete erase/pop scenario.
// Verifies: {1,2,3} erase begin -> {2,3}; pop_last returns 3 leaving {2}.
#[test]
fn erase_begin_and_pop_last() {
    let mut s = LinkedSequence::from([1, 2, 3]);
    let b = s.begin();
    s.erase(b).unwrap();
    assert_eq!(items(&s), vec![2, 3]);
    assert_eq!(s.pop_last(), Ok(3));
    assert_eq!(items(&s), vec![2]);
    assert_eq!(s.first(), s.last());
}

// Test: positions of untouched nodes survive splicing elsewhere.
// Assumes: list positions denote nodes, not indices.
#[test]
fn positions_survive_unrelated_splices() {
    let mut s = LinkedSequence::from(['b', 'd']);
    let d = s.begin().next(&s).unwrap();
    s.prepend('a');
    s.insert(d, 'c').unwrap();
    s.append('e');
    let b = s.begin().next(&s).unwrap();
    s.erase(b).unwrap();
    assert_eq!(d.value(&s), Ok(&'d'));
    assert_eq!(items(&s), vec!['a', 'c', 'd', 'e']);
    assert_eq!(b.value(&s), Err(ContainerError::ForeignPosition));
}

// Test: boundaries.
// Verifies: end() has no value; stepping past end or before begin fails;
// offsets walk node by node.
#[test]
fn cursor_and_position_boundaries() {
    let s = LinkedSequence::from([10, 20, 30]);
    assert_eq!(s.end().value(&s), Err(ContainerError::OutOfBounds));
    assert_eq!(s.end().next(&s), Err(ContainerError::OutOfBounds));
    assert_eq!(s.begin().prev(&s), Err(ContainerError::OutOfBounds));
    assert_eq!(s.begin().offset(&s, 4), Err(ContainerError::OutOfBounds));
    assert_eq!(s.end().offset(&s, -2).unwrap().value(&s), Ok(&20));

    let mut c = s.cend();
    let mut back = vec![];
    while c.move_prev().is_ok() {
        back.push(*c.get().unwrap());
    }
    assert_eq!(back, vec![30, 20, 10]);
}

// Test: the mutable cursor edits and splices in place.
#[test]
fn cursor_mut_splicing() {
    let mut s = LinkedSequence::from([1, 3]);
    {
        let mut c = s.begin_mut();
        c.move_next().unwrap();
        c.insert_before(2);
        assert_eq!(c.get(), Ok(&3));
        *c.get_mut().unwrap() = 4;
    }
    assert_eq!(items(&s), vec![1, 2, 4]);
    for v in &mut s {
        *v += 1;
    }
    assert_eq!(items(&s), vec![2, 3, 5]);
}

// Test: value semantics.
#[test]
fn clone_take_and_equality() {
    let mut s: LinkedSequence<String> = ["p", "q"].iter().map(|x| x.to_string()).collect();
    let c = s.clone();
    assert_eq!(s, c);
    s.first_mut().unwrap().push('!');
    assert_ne!(s, c);

    let moved = s.take();
    assert!(s.is_empty());
    assert_eq!(s.pop_first(), Err(ContainerError::Empty));
    assert_eq!(items(&moved), vec!["p!".to_string(), "q".to_string()]);
    assert_eq!(format!("{:?}", c), r#"["p", "q"]"#);
}

// Test: erase_range over the whole sequence and an empty range.
#[test]
fn erase_ranges() {
    let mut s: LinkedSequence<u32> = (0..8).collect();
    let (b, e) = (s.begin(), s.end());
    s.erase_range(e, e).unwrap();
    assert_eq!(s.erase_range(e, b), Err(ContainerError::OutOfBounds));
    assert_eq!(s.len(), 8);
    let mid = b.offset(&s, 5).unwrap();
    s.erase_range(b, mid).unwrap();
    assert_eq!(items(&s), vec![5, 6, 7]);
    let b = s.begin();
    s.erase_range(b, e).unwrap();
    assert!(s.is_empty());
    assert_eq!(s.begin(), s.end());
}
