// File: src/builtins.rs
//
// Built-in functions available in every yy program.
//
// Builtins are resolved by name only after the environment chain misses, so
// a user binding named `len` shadows the builtin. Output builtins write
// through the interpreter's sink; `yahtzee` draws from one process-wide RNG
// so interleaved programs don't correlate.

use crate::errors::{ErrorKind, YyError};
use crate::interpreter::value::Value;
use crate::interpreter::{expect_whole, index_out_of_bounds, normalize_index, Interpreter};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

static RNG: Lazy<Mutex<StdRng>> = Lazy::new(|| Mutex::new(StdRng::from_entropy()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Print arguments joined with spaces, followed by a newline
    Yap,
    /// Print arguments joined with spaces, no newline
    Yelp,
    /// Random draw from a number, range, array or string
    Yahtzee,
    Len,
    Chr,
    Ord,
    Num,
    /// Remove and return an array element, the last by default
    Yoink,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        let builtin = match name {
            "yap" => Builtin::Yap,
            "yelp" => Builtin::Yelp,
            "yahtzee" => Builtin::Yahtzee,
            "len" => Builtin::Len,
            "chr" => Builtin::Chr,
            "ord" => Builtin::Ord,
            "num" => Builtin::Num,
            "yoink" => Builtin::Yoink,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Yap => "yap",
            Builtin::Yelp => "yelp",
            Builtin::Yahtzee => "yahtzee",
            Builtin::Len => "len",
            Builtin::Chr => "chr",
            Builtin::Ord => "ord",
            Builtin::Num => "num",
            Builtin::Yoink => "yoink",
        }
    }

    pub fn all() -> &'static [Builtin] {
        &[
            Builtin::Yap,
            Builtin::Yelp,
            Builtin::Yahtzee,
            Builtin::Len,
            Builtin::Chr,
            Builtin::Ord,
            Builtin::Num,
            Builtin::Yoink,
        ]
    }
}

pub fn call(
    builtin: Builtin,
    args: Vec<Value>,
    interpreter: &mut Interpreter,
) -> Result<Value, YyError> {
    match builtin {
        Builtin::Yap => {
            let line = join_rendered(&args);
            interpreter.emit(&format!("{}\n", line));
            Ok(Value::Null)
        }
        Builtin::Yelp => {
            interpreter.emit(&join_rendered(&args));
            Ok(Value::Null)
        }
        Builtin::Yahtzee => yahtzee(one_arg(builtin, args)?),
        Builtin::Len => len(&one_arg(builtin, args)?),
        Builtin::Chr => chr(&one_arg(builtin, args)?),
        Builtin::Ord => ord(&one_arg(builtin, args)?),
        Builtin::Num => num(&one_arg(builtin, args)?),
        Builtin::Yoink => yoink(args),
    }
}

fn join_rendered(args: &[Value]) -> String {
    args.iter().map(|v| v.render()).collect::<Vec<_>>().join(" ")
}

fn one_arg(builtin: Builtin, mut args: Vec<Value>) -> Result<Value, YyError> {
    if args.len() != 1 {
        return Err(YyError::runtime(
            ErrorKind::ArityError,
            format!("{} takes 1 argument, got {}", builtin.name(), args.len()),
        ));
    }
    Ok(args.remove(0))
}

fn random_int(lo: i64, hi: i64) -> i64 {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let mut rng = RNG.lock().unwrap_or_else(|e| e.into_inner());
    rng.gen_range(lo..=hi)
}

/// `yahtzee(n)` draws uniformly from 0..n inclusive, `yahtzee(a..b)` from
/// the range's members, `yahtzee(arr)` and `yahtzee(str)` pick a random
/// element or character. Empty collections draw Null.
fn yahtzee(arg: Value) -> Result<Value, YyError> {
    match arg {
        Value::Number(_) => {
            let n = expect_whole(&arg, "yahtzee bound")?;
            Ok(Value::Number(random_int(0, n) as f64))
        }
        Value::Range(start, end) => Ok(Value::Number(random_int(start, end) as f64)),
        Value::Array(items) => {
            let items = items.borrow();
            if items.is_empty() {
                return Ok(Value::Null);
            }
            let i = random_int(0, items.len() as i64 - 1) as usize;
            Ok(items[i].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            if chars.is_empty() {
                return Ok(Value::Null);
            }
            let i = random_int(0, chars.len() as i64 - 1) as usize;
            Ok(Value::str(chars[i].to_string()))
        }
        other => Err(YyError::type_error(format!(
            "yahtzee wants a Number, Range, Array or Str, got {}",
            other.type_name()
        ))),
    }
}

fn len(arg: &Value) -> Result<Value, YyError> {
    let length = match arg {
        Value::Str(s) => s.chars().count() as f64,
        Value::Array(items) => items.borrow().len() as f64,
        Value::Map(map) => map.borrow().len() as f64,
        Value::Range(start, end) => ((start - end).abs() + 1) as f64,
        other => {
            return Err(YyError::type_error(format!(
                "len does not apply to a {}",
                other.type_name()
            )));
        }
    };
    Ok(Value::Number(length))
}

fn chr(arg: &Value) -> Result<Value, YyError> {
    let code = expect_whole(arg, "chr argument")?;
    let c = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| YyError::type_error(format!("chr: {} is not a valid code point", code)))?;
    Ok(Value::str(c.to_string()))
}

fn ord(arg: &Value) -> Result<Value, YyError> {
    match arg {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Number(c as u32 as f64)),
                _ => Err(YyError::type_error("ord wants a single character".to_string())),
            }
        }
        other => Err(YyError::type_error(format!(
            "ord wants a Str, got {}",
            other.type_name()
        ))),
    }
}

fn num(arg: &Value) -> Result<Value, YyError> {
    match arg {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| YyError::type_error(format!("cannot convert {:?} to a number", s.as_str()))),
        other => Err(YyError::type_error(format!(
            "cannot convert a {} to a number",
            other.type_name()
        ))),
    }
}

/// `yoink(arr)` removes and returns the last element; `yoink(arr, i)`
/// removes the element at `i`, counting from the end when negative
fn yoink(args: Vec<Value>) -> Result<Value, YyError> {
    if args.is_empty() || args.len() > 2 {
        return Err(YyError::runtime(
            ErrorKind::ArityError,
            format!("yoink takes 1 or 2 arguments, got {}", args.len()),
        ));
    }

    let items = match &args[0] {
        Value::Array(items) => items,
        other => {
            return Err(YyError::type_error(format!(
                "yoink wants an Array, got {}",
                other.type_name()
            )));
        }
    };

    let mut items = items.borrow_mut();
    let len = items.len();
    let raw = match args.get(1) {
        Some(index) => expect_whole(index, "yoink index")?,
        None => len as i64 - 1,
    };
    let i = normalize_index(raw, len).ok_or_else(|| index_out_of_bounds(raw, len))?;
    Ok(items.remove(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_chars_not_bytes() {
        let v = len(&Value::str("héllo"));
        assert_eq!(v.ok(), Some(Value::Number(5.0)));
    }

    #[test]
    fn len_of_descending_range() {
        let v = len(&Value::Range(5, 1));
        assert_eq!(v.ok(), Some(Value::Number(5.0)));
    }

    #[test]
    fn chr_and_ord_are_inverses() {
        assert_eq!(chr(&Value::Number(97.0)).ok(), Some(Value::str("a")));
        assert_eq!(ord(&Value::str("a")).ok(), Some(Value::Number(97.0)));
    }

    #[test]
    fn num_parses_and_rejects() {
        assert_eq!(num(&Value::str(" 42 ")).ok(), Some(Value::Number(42.0)));
        assert_eq!(num(&Value::Bool(true)).ok(), Some(Value::Number(1.0)));
        assert!(num(&Value::str("forty-two")).is_err());
        assert!(num(&Value::Null).is_err());
    }

    #[test]
    fn yoink_removes_by_index() {
        let arr = Value::array(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]);
        let taken = yoink(vec![arr.clone(), Value::Number(-3.0)]);
        assert_eq!(taken.ok(), Some(Value::Number(1.0)));
        assert_eq!(arr.render(), "[2, 3]");
    }

    #[test]
    fn yoink_empty_array_is_index_error() {
        let arr = Value::array(vec![]);
        let err = yoink(vec![arr]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexError);
    }

    #[test]
    fn yahtzee_stays_in_bounds() {
        for _ in 0..100 {
            let v = yahtzee(Value::Number(3.0)).ok();
            match v {
                Some(Value::Number(n)) => assert!((0.0..=3.0).contains(&n)),
                other => panic!("unexpected draw: {:?}", other),
            }
        }
    }
}
