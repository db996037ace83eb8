#![no_main]
use std::time::{Duration, SystemTime};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use objconv::{ErrorValue, Map, Parser, ParserOptions, Step, Type, Unbounded, Value, ValueParser};

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(u32),
    Duration(u64),
    Error(String),
    Array(Vec<FuzzValue>),
    Map(Vec<(FuzzValue, FuzzValue)>),
}

/// Nesting beyond this is flattened to nil, keeping well-formed traversals
/// inside the default depth limit.
const MAX_NESTING: usize = 64;

fn to_value(value: FuzzValue, depth: usize) -> Value {
    match value {
        FuzzValue::Nil => Value::Nil,
        FuzzValue::Bool(v) => Value::Bool(v),
        FuzzValue::Int(v) => Value::Int(v),
        FuzzValue::Uint(v) => Value::Uint(v),
        FuzzValue::Float(v) => Value::Float(v),
        FuzzValue::String(v) => Value::String(v),
        FuzzValue::Bytes(v) => Value::Bytes(v.into()),
        FuzzValue::Timestamp(secs) => {
            Value::Timestamp(SystemTime::UNIX_EPOCH + Duration::from_secs(secs.into()))
        }
        FuzzValue::Duration(nanos) => Value::Duration(Duration::from_nanos(nanos)),
        FuzzValue::Error(msg) => Value::Error(ErrorValue::new(msg)),
        FuzzValue::Array(_) | FuzzValue::Map(_) if depth >= MAX_NESTING => Value::Nil,
        FuzzValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| to_value(item, depth + 1))
                .collect(),
        ),
        FuzzValue::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (to_value(k, depth + 1), to_value(v, depth + 1)))
                .collect::<Map>(),
        ),
    }
}

/// One protocol call, issued regardless of whether it fits the grammar.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum Op {
    Type,
    Scalar,
    ArrayBegin,
    ArrayNext,
    ArrayEnd,
    MapBegin,
    MapValue,
    MapNext,
    MapEnd,
}

#[derive(Arbitrary, Debug)]
struct Input {
    value: FuzzValue,
    unbounded: bool,
    max_depth: u8,
    ops: Vec<Op>,
}

fn scalar(parser: &mut ValueParser<'_>) -> bool {
    let Ok(ty) = parser.parse_type() else {
        return false;
    };
    match ty {
        Type::Nil => parser.parse_nil().is_ok(),
        Type::Bool => parser.parse_bool().is_ok(),
        Type::Int => parser.parse_int().is_ok(),
        Type::Uint => parser.parse_uint().is_ok(),
        Type::Float => parser.parse_float().is_ok(),
        Type::String => parser.parse_string().is_ok(),
        Type::Bytes => parser.parse_bytes().is_ok(),
        Type::Timestamp => parser.parse_time().is_ok(),
        Type::Duration => parser.parse_duration().is_ok(),
        Type::Error => parser.parse_error().is_ok(),
        Type::Array | Type::Map => false,
    }
}

/// Consumes the current value following the grammar; returns the number of
/// composites opened.
fn drain(parser: &mut ValueParser<'_>) -> usize {
    match parser.parse_type().unwrap() {
        Type::Array => {
            let mut opened = 1;
            match parser.parse_array_begin().unwrap() {
                Some(n) => {
                    for i in 0..n {
                        if i != 0 {
                            assert_eq!(parser.parse_array_next().unwrap(), Step::Advanced);
                        }
                        opened += drain(parser);
                    }
                }
                None => {
                    while parser.parse_array_next().unwrap() == Step::Advanced {
                        opened += drain(parser);
                    }
                }
            }
            parser.parse_array_end().unwrap();
            opened
        }
        Type::Map => {
            let mut opened = 1;
            match parser.parse_map_begin().unwrap() {
                Some(n) => {
                    for i in 0..n {
                        if i != 0 {
                            assert_eq!(parser.parse_map_next().unwrap(), Step::Advanced);
                        }
                        opened += drain(parser);
                        parser.parse_map_value().unwrap();
                        opened += drain(parser);
                    }
                }
                None => {
                    while parser.parse_map_next().unwrap() == Step::Advanced {
                        opened += drain(parser);
                        parser.parse_map_value().unwrap();
                        opened += drain(parser);
                    }
                }
            }
            parser.parse_map_end().unwrap();
            opened
        }
        _ => {
            assert!(scalar(parser));
            0
        }
    }
}

fuzz_target!(|input: Input| {
    let value = to_value(input.value, 0);
    let wrapped = Unbounded(value.clone());
    let root: &dyn objconv::Reflect = if input.unbounded { &wrapped } else { &value };

    // Well-formed traversal always balances.
    let mut parser = ValueParser::new(root);
    drain(&mut parser);
    assert!(parser.is_finished());

    // Arbitrary call sequences may fail, but a failed call never changes the
    // nesting depth and never panics.
    let options = ParserOptions {
        max_depth: usize::from(input.max_depth),
        ..ParserOptions::default()
    };
    let mut parser = ValueParser::with_options(root, options);
    for op in input.ops {
        let depth = parser.depth();
        let ok = match op {
            Op::Type => parser.parse_type().is_ok(),
            Op::Scalar => scalar(&mut parser),
            Op::ArrayBegin => parser.parse_array_begin().is_ok(),
            Op::ArrayNext => parser.parse_array_next().is_ok(),
            Op::ArrayEnd => parser.parse_array_end().is_ok(),
            Op::MapBegin => parser.parse_map_begin().is_ok(),
            Op::MapValue => parser.parse_map_value().is_ok(),
            Op::MapNext => parser.parse_map_next().is_ok(),
            Op::MapEnd => parser.parse_map_end().is_ok(),
        };
        if !ok {
            assert_eq!(parser.depth(), depth, "{op:?} failed but changed the depth");
        }
        assert!(parser.depth() <= options.max_depth);
    }
});
