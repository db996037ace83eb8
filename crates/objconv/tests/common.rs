#![allow(missing_docs)]
#![allow(dead_code)]

use core::fmt::{self, Write};
use std::time::SystemTime;

use bstr::BStr;
use objconv::{Error, Parser, Reflect, Type, ValueParser};

/// Replays `root` and renders every protocol call as one line, indented by
/// the number of composites open around the value it reads.
pub fn trace(root: &dyn Reflect) -> Result<String, Error> {
    let mut parser = ValueParser::new(root);
    let mut out = String::new();
    replay(&mut parser, &mut out, 0)?;
    assert!(parser.is_finished(), "traversal left the parser unbalanced");
    Ok(out)
}

fn line(out: &mut String, depth: usize, text: fmt::Arguments<'_>) {
    writeln!(out, "{:width$}{text}", "", width = depth * 2).unwrap();
}

pub fn replay<P: Parser>(parser: &mut P, out: &mut String, depth: usize) -> Result<(), P::Error> {
    match parser.parse_type()? {
        Type::Nil => {
            parser.parse_nil()?;
            line(out, depth, format_args!("nil"));
        }
        Type::Bool => {
            let v = parser.parse_bool()?;
            line(out, depth, format_args!("bool {v}"));
        }
        Type::Int => {
            let v = parser.parse_int()?;
            line(out, depth, format_args!("int {v}"));
        }
        Type::Uint => {
            let v = parser.parse_uint()?;
            line(out, depth, format_args!("uint {v}"));
        }
        Type::Float => {
            let v = parser.parse_float()?;
            line(out, depth, format_args!("float {v}"));
        }
        Type::String => {
            let v = BStr::new(parser.parse_string()?);
            line(out, depth, format_args!("string {v:?}"));
        }
        Type::Bytes => {
            let v = BStr::new(parser.parse_bytes()?);
            line(out, depth, format_args!("bytes {v:?}"));
        }
        Type::Timestamp => {
            let v = parser.parse_time()?;
            let since = v.duration_since(SystemTime::UNIX_EPOCH).unwrap();
            line(out, depth, format_args!("time +{since:?}"));
        }
        Type::Duration => {
            let v = parser.parse_duration()?;
            line(out, depth, format_args!("duration {v:?}"));
        }
        Type::Error => {
            let v = parser.parse_error()?.to_string();
            line(out, depth, format_args!("error {v:?}"));
        }
        Type::Array => {
            let length = parser.parse_array_begin()?;
            line(out, depth, format_args!("array begin {length:?}"));
            let mut index = 0;
            loop {
                match length {
                    Some(n) if index >= n => break,
                    Some(_) if index == 0 => {}
                    _ => {
                        let step = parser.parse_array_next()?;
                        line(out, depth, format_args!("array next {step:?}"));
                        if step.is_end() {
                            break;
                        }
                    }
                }
                replay(parser, out, depth + 1)?;
                index += 1;
            }
            parser.parse_array_end()?;
            line(out, depth, format_args!("array end"));
        }
        Type::Map => {
            let length = parser.parse_map_begin()?;
            line(out, depth, format_args!("map begin {length:?}"));
            let mut index = 0;
            loop {
                match length {
                    Some(n) if index >= n => break,
                    Some(_) if index == 0 => {}
                    _ => {
                        let step = parser.parse_map_next()?;
                        line(out, depth, format_args!("map next {step:?}"));
                        if step.is_end() {
                            break;
                        }
                    }
                }
                replay(parser, out, depth + 1)?;
                parser.parse_map_value()?;
                line(out, depth, format_args!("map value"));
                replay(parser, out, depth + 1)?;
                index += 1;
            }
            parser.parse_map_end()?;
            line(out, depth, format_args!("map end"));
        }
    }
    Ok(())
}
