use quickcheck::QuickCheck;

use super::replay::rebuild;
use crate::{Unbounded, Value, ValueParser, classify};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: replaying a value through the parser and decoding the events
/// yields the same value, and leaves both stacks empty.
#[test]
fn replay_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        let mut parser = ValueParser::new(&value);
        let rebuilt = rebuild(&mut parser);
        rebuilt.as_ref() == Ok(&value) && parser.is_finished()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: hiding the length of the outermost composite changes the calling
/// pattern but not the decoded value.
#[test]
fn unbounded_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        let unbounded = Unbounded(value.clone());
        let mut parser = ValueParser::new(&unbounded);
        rebuild(&mut parser) == Ok(value) && parser.is_finished()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: classification agrees with the tag of the dynamic value.
#[quickcheck_macros::quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn classification_matches_kind(value: Value) -> bool {
    classify(&value, 0) == Ok(value.kind())
}
