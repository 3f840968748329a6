#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rangelist::{ApplyOutcome, RangeList, RangeListConfig};

#[derive(Arbitrary, Debug)]
enum Op {
    Push(u8),
    Insert(u8, u8),
    RemoveAt(u8),
    Set(u8, u8),
    Move(u8, u8),
    Clear,
    InsertRange(u8, Vec<u8>),
    RemoveRange(Vec<u8>),
    RemoveRangeAt(u8, u8),
    RemoveAllIn(u8, u8, u8),
    ReplaceRangeAt(u8, u8, Vec<u8>),
    Deferred(Vec<u8>),
}

#[derive(Arbitrary, Debug)]
struct Input {
    allow_duplicates: bool,
    initial: Vec<u8>,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let config = RangeListConfig::new().with_allow_duplicates(input.allow_duplicates);
    let list = RangeList::from_vec_with_config(input.initial, config);

    let mirror = Rc::new(RefCell::new(list.to_vec()));
    let m = Rc::clone(&mirror);
    let source = list.clone();
    let _sub = list.subscribe(move |change| {
        let outcome = change.apply_to(&mut m.borrow_mut());
        match outcome {
            ApplyOutcome::Applied => {}
            ApplyOutcome::NeedsReset => *m.borrow_mut() = source.to_vec(),
            ApplyOutcome::Mismatch => panic!("record does not fit mirror: {change:?}"),
        }
    });

    for op in input.ops.into_iter().take(64) {
        let at = |i: u8| usize::from(i);
        let _ = match op {
            Op::Push(v) => list.push(v).map(drop),
            Op::Insert(i, v) => list.insert(at(i), v).map(drop),
            Op::RemoveAt(i) => list.remove_at(at(i)).map(drop),
            Op::Set(i, v) => list.set(at(i), v).map(drop),
            Op::Move(a, b) => list.move_item(at(a), at(b)),
            Op::Clear => list.clear(),
            Op::InsertRange(i, v) => list.insert_range(at(i), v).map(drop),
            Op::RemoveRange(v) => list.remove_range(&v).map(drop),
            Op::RemoveRangeAt(i, n) => list.remove_range_at(at(i), at(n)).map(drop),
            Op::RemoveAllIn(i, n, m) => list
                .remove_all_in(at(i), at(n), |x| *x % m.max(1) == 0)
                .map(drop),
            Op::ReplaceRangeAt(i, n, v) => list.replace_range_at(at(i), at(n), v),
            Op::Deferred(v) => {
                let _batch = list.defer_events();
                list.add_range(v).map(drop)
            }
        };
        assert_eq!(*mirror.borrow(), list.to_vec());
        if !input.allow_duplicates {
            let items = list.to_vec();
            for (i, a) in items.iter().enumerate() {
                assert!(!items[i + 1..].contains(a));
            }
        }
    }
});
