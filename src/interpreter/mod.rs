// File: src/interpreter/mod.rs
//
// Tree-walking evaluator for the yy language.
//
// The interpreter walks the AST directly, threading a lexical environment
// chain through every evaluation. Each step yields a `Flow`: either an
// ordinary value or a `yeet` travelling up to the nearest function call.
// Faults travel separately in the `Err` channel and abort the whole run.
//
// Every block statement and loop iteration burns one unit of fuel; when the
// budget runs out evaluation stops with ResourceExceeded. This keeps
// unconditioned `yoyo` loops from hanging the host.

pub mod environment;
pub mod value;

use crate::ast::{BinaryOp, Expr, StrSegment, UnaryOp};
use crate::builtins::{self, Builtin};
use crate::errors::{find_closest_match, ErrorKind, YyError};
use crate::parser;
use environment::{EnvRef, Environment};
use std::rc::Rc;
use value::{FunctionDef, MapValue, Value};

/// Default evaluation budget, in statements and loop iterations
pub const DEFAULT_FUEL: u64 = 1_000_000;

/// Deepest allowed chain of active function calls. Kept well below the
/// native stack limit so runaway recursion surfaces as ResourceExceeded
/// instead of crashing the host.
pub const MAX_CALL_DEPTH: u32 = 256;

/// Binder declared by `yall` loops that don't name one
pub const IMPLICIT_BINDER: &str = "yt";

/// How an expression completed: an ordinary value, or a `yeet` unwinding
/// toward the nearest function call boundary
#[derive(Debug)]
pub enum Flow {
    Value(Value),
    Yeet(Value),
}

impl Flow {
    /// Function calls and the top level absorb a travelling yeet
    pub fn collapse(self) -> Value {
        match self {
            Flow::Value(v) | Flow::Yeet(v) => v,
        }
    }
}

type EvalResult = Result<Flow, YyError>;

/// Unwraps an ordinary value, re-raising a travelling yeet to the caller
macro_rules! flow_try {
    ($e:expr) => {
        match $e? {
            Flow::Value(v) => v,
            yeet @ Flow::Yeet(_) => return Ok(yeet),
        }
    };
}

/// Parses and evaluates a whole program, delivering output through `sink`.
///
/// `yap` sends each line with its trailing newline; `yelp` sends raw
/// fragments. Errors come back annotated with the offending source line.
pub fn execute(source: &str, sink: impl FnMut(&str)) -> Result<(), YyError> {
    let program = parser::parse_source(source).map_err(|e| e.with_source_text(source))?;
    let mut interpreter = Interpreter::new(sink);
    match interpreter.run(&program) {
        Ok(_) => Ok(()),
        Err(e) => Err(e.with_source_text(source)),
    }
}

pub struct Interpreter<'a> {
    globals: EnvRef,
    sink: Box<dyn FnMut(&str) + 'a>,
    yolo_depth: u32,
    call_depth: u32,
    fuel: u64,
}

impl<'a> Interpreter<'a> {
    pub fn new(sink: impl FnMut(&str) + 'a) -> Self {
        Self::with_fuel(sink, DEFAULT_FUEL)
    }

    pub fn with_fuel(sink: impl FnMut(&str) + 'a, fuel: u64) -> Self {
        Interpreter {
            globals: Environment::root(),
            sink: Box::new(sink),
            yolo_depth: 0,
            call_depth: 0,
            fuel,
        }
    }

    /// Evaluates a program against the interpreter's global environment.
    /// Returns the value of the last expression; a top-level `yeet` ends the
    /// program early with its value.
    pub fn run(&mut self, program: &[Expr]) -> Result<Value, YyError> {
        let env = Rc::clone(&self.globals);
        Ok(self.eval_block(program, &env)?.collapse())
    }

    /// Sends a fragment of program output to the host
    pub fn emit(&mut self, text: &str) {
        (self.sink)(text);
    }

    /// Tops the evaluation budget back up, used between REPL inputs
    pub fn refuel(&mut self, fuel: u64) {
        self.fuel = fuel;
    }

    fn in_yolo(&self) -> bool {
        self.yolo_depth > 0
    }

    /// Runs `body` with yolo coercions enabled, restoring the previous mode
    /// on every exit path, faults included
    fn with_yolo(&mut self, body: impl FnOnce(&mut Self) -> EvalResult) -> EvalResult {
        self.yolo_depth += 1;
        let result = body(self);
        self.yolo_depth -= 1;
        result
    }

    /// Runs one function activation, restoring the depth counter on every
    /// exit path. Fails once the chain of active calls gets deep enough to
    /// threaten the native stack.
    fn with_call_frame(&mut self, body: impl FnOnce(&mut Self) -> EvalResult) -> EvalResult {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(YyError::runtime(
                ErrorKind::ResourceExceeded,
                format!("call depth limit of {} reached", MAX_CALL_DEPTH),
            ));
        }
        self.call_depth += 1;
        let result = body(self);
        self.call_depth -= 1;
        result
    }

    fn charge_fuel(&mut self) -> Result<(), YyError> {
        if self.fuel == 0 {
            return Err(YyError::runtime(
                ErrorKind::ResourceExceeded,
                "evaluation budget exhausted",
            ));
        }
        self.fuel -= 1;
        Ok(())
    }

    fn eval(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult {
        match expr {
            Expr::Number(n) => Ok(Flow::Value(Value::Number(*n))),
            Expr::Str(s) => Ok(Flow::Value(Value::str(s.clone()))),
            Expr::Bool(b) => Ok(Flow::Value(Value::Bool(*b))),
            Expr::Null => Ok(Flow::Value(Value::Null)),
            Expr::TemplateStr(segments) => self.eval_template(segments, env),
            Expr::Identifier(name) => match Environment::lookup(env, name) {
                Some(value) => Ok(Flow::Value(value)),
                None => match Builtin::lookup(name) {
                    Some(builtin) => Ok(Flow::Value(Value::Native(builtin))),
                    None => Err(self.unknown_identifier(name, env)),
                },
            },
            Expr::Range { start, end } => {
                let start = flow_try!(self.eval(start, env));
                let end = flow_try!(self.eval(end, env));
                let start = expect_whole(&start, "range bound")?;
                let end = expect_whole(&end, "range bound")?;
                Ok(Flow::Value(Value::Range(start, end)))
            }
            Expr::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(flow_try!(self.eval(element, env)));
                }
                Ok(Flow::Value(Value::array(values)))
            }
            Expr::Map(pairs) => {
                let mut map = MapValue::new();
                for (key, value) in pairs {
                    let key = flow_try!(self.eval(key, env)).render();
                    let value = flow_try!(self.eval(value, env));
                    map.insert(key, value);
                }
                Ok(Flow::Value(Value::map(map)))
            }
            Expr::Unary { op, operand } => {
                let operand = flow_try!(self.eval(operand, env));
                Ok(Flow::Value(self.apply_unary(*op, operand)?))
            }
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right, env),
            Expr::Assign { declare, op, target, value } => {
                self.eval_assign(*declare, *op, target, value, env)
            }
            Expr::Index { object, index } => {
                let object = flow_try!(self.eval(object, env));
                let index = flow_try!(self.eval(index, env));
                Ok(Flow::Value(self.index_value(&object, &index)?))
            }
            Expr::Slice { object, start, end } => {
                let object = flow_try!(self.eval(object, env));
                let start = flow_try!(self.eval(start, env));
                let end = flow_try!(self.eval(end, env));
                let start = expect_whole(&start, "slice bound")?;
                let end = expect_whole(&end, "slice bound")?;
                Ok(Flow::Value(self.slice_value(&object, start, end)?))
            }
            Expr::Call { callee, args } => {
                let callee = flow_try!(self.eval(callee, env));
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(flow_try!(self.eval(arg, env)));
                }
                self.call_value(callee, values)
            }
            Expr::Function { params, body } => {
                Ok(Flow::Value(Value::Function(Rc::new(FunctionDef {
                    params: params.clone(),
                    body: Rc::clone(body),
                    env: Rc::clone(env),
                }))))
            }
            Expr::Block(body) => self.eval_scoped(body, env),
            Expr::Yif { arms, yels } => {
                for (guard, body) in arms {
                    let guard = flow_try!(self.eval(guard, env));
                    if guard.is_truthy() {
                        return self.eval_scoped(body, env);
                    }
                }
                match yels {
                    Some(body) => self.eval_scoped(body, env),
                    None => Ok(Flow::Value(Value::Null)),
                }
            }
            Expr::Yall { binder, iterable, body } => {
                let iterable = flow_try!(self.eval(iterable, env));
                let binder = binder.as_deref().unwrap_or(IMPLICIT_BINDER);
                self.eval_yall(binder, iterable, body, env)
            }
            Expr::Yoyo { condition, body } => self.eval_yoyo(condition.as_deref(), body, env),
            Expr::Yeet(value) => {
                let value = match value {
                    Some(expr) => flow_try!(self.eval(expr, env)),
                    None => Value::Null,
                };
                Ok(Flow::Yeet(value))
            }
            Expr::Yikes(args) => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(flow_try!(self.eval(arg, env)).render());
                }
                let message = if parts.is_empty() { "yikes!".to_string() } else { parts.join(" ") };
                Err(YyError::runtime(ErrorKind::UserAbort, message))
            }
            Expr::Yolo(body) => self.with_yolo(|interp| interp.eval_scoped(body, env)),
        }
    }

    /// Evaluates expressions in order within `env`; the block's value is the
    /// last expression's value, Null when empty
    fn eval_block(&mut self, body: &[Expr], env: &EnvRef) -> EvalResult {
        let mut result = Value::Null;
        for expr in body {
            self.charge_fuel()?;
            result = flow_try!(self.eval(expr, env));
        }
        Ok(Flow::Value(result))
    }

    /// Evaluates a block in a fresh child frame
    fn eval_scoped(&mut self, body: &[Expr], env: &EnvRef) -> EvalResult {
        let frame = Environment::child(env);
        self.eval_block(body, &frame)
    }

    fn eval_template(&mut self, segments: &[StrSegment], env: &EnvRef) -> EvalResult {
        let mut out = String::new();
        for segment in segments {
            match segment {
                StrSegment::Text(text) => out.push_str(text),
                StrSegment::Expr(expr) => {
                    let value = flow_try!(self.eval(expr, env));
                    out.push_str(&value.render());
                }
            }
        }
        Ok(Flow::Value(Value::str(out)))
    }

    fn eval_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr, env: &EnvRef) -> EvalResult {
        match op {
            // Short-circuit operators yield the deciding operand, not a Bool
            BinaryOp::And => {
                let left = flow_try!(self.eval(left, env));
                if !left.is_truthy() {
                    return Ok(Flow::Value(left));
                }
                self.eval(right, env)
            }
            BinaryOp::Or => {
                let left = flow_try!(self.eval(left, env));
                if left.is_truthy() {
                    return Ok(Flow::Value(left));
                }
                self.eval(right, env)
            }
            BinaryOp::Append => {
                let target = flow_try!(self.eval(left, env));
                let value = flow_try!(self.eval(right, env));
                match &target {
                    Value::Array(items) => {
                        items.borrow_mut().push(value);
                        Ok(Flow::Value(target.clone()))
                    }
                    other => Err(YyError::type_error(format!(
                        "can only append to an Array, got {}",
                        other.type_name()
                    ))),
                }
            }
            _ => {
                let left = flow_try!(self.eval(left, env));
                let right = flow_try!(self.eval(right, env));
                Ok(Flow::Value(self.apply_binary(op, left, right)?))
            }
        }
    }

    /// `op` carries the combining operator of a compound assignment, so an
    /// Index target's object and subscript are evaluated exactly once for
    /// both the read and the write
    fn eval_assign(
        &mut self,
        declare: bool,
        op: Option<BinaryOp>,
        target: &Expr,
        value: &Expr,
        env: &EnvRef,
    ) -> EvalResult {
        let value = flow_try!(self.eval(value, env));

        match target {
            Expr::Identifier(name) if declare => {
                Environment::declare(env, name, value.clone());
                Ok(Flow::Value(value))
            }
            Expr::Identifier(name) => {
                let value = match op {
                    Some(op) => {
                        let current = match Environment::lookup(env, name) {
                            Some(current) => current,
                            None if self.in_yolo() => Value::Null,
                            None => return Err(self.unknown_identifier(name, env)),
                        };
                        self.apply_binary(op, current, value)?
                    }
                    None => value,
                };
                if Environment::assign(env, name, value.clone()) {
                    Ok(Flow::Value(value))
                } else if self.in_yolo() {
                    // yolo mode promotes assignment to an unbound name into
                    // a declaration in the current frame
                    Environment::declare(env, name, value.clone());
                    Ok(Flow::Value(value))
                } else {
                    Err(self.unknown_identifier(name, env))
                }
            }
            Expr::Index { object, index } => {
                let object = flow_try!(self.eval(object, env));
                let index = flow_try!(self.eval(index, env));
                let value = match op {
                    Some(op) => {
                        let current = self.index_value(&object, &index)?;
                        self.apply_binary(op, current, value)?
                    }
                    None => value,
                };
                self.assign_index(&object, &index, value.clone())?;
                Ok(Flow::Value(value))
            }
            other => Err(YyError::type_error(format!("cannot assign to {:?}", other))),
        }
    }

    fn assign_index(&self, object: &Value, index: &Value, value: Value) -> Result<(), YyError> {
        match object {
            Value::Array(items) => {
                let raw = expect_whole(index, "index")?;
                let mut items = items.borrow_mut();
                let len = items.len();
                let i = normalize_index(raw, len).ok_or_else(|| index_out_of_bounds(raw, len))?;
                items[i] = value;
                Ok(())
            }
            Value::Map(map) => {
                map.borrow_mut().insert(index.render(), value);
                Ok(())
            }
            other => Err(YyError::type_error(format!(
                "cannot assign into a {}",
                other.type_name()
            ))),
        }
    }

    fn apply_unary(&mut self, op: UnaryOp, operand: Value) -> Result<Value, YyError> {
        match op {
            UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
            UnaryOp::Neg => match operand {
                Value::Number(n) => Ok(Value::Number(-n)),
                other if self.in_yolo() => self.yolo_negate(other),
                other => Err(YyError::type_error(format!(
                    "cannot negate a {}",
                    other.type_name()
                ))),
            },
        }
    }

    /// In yolo mode negation bends to the operand: strings reverse, bools
    /// toggle, ranges swap direction, arrays negate elementwise
    fn yolo_negate(&mut self, operand: Value) -> Result<Value, YyError> {
        match operand {
            Value::Str(s) => Ok(Value::str(s.chars().rev().collect::<String>())),
            Value::Bool(b) => Ok(Value::Bool(!b)),
            Value::Range(start, end) => Ok(Value::Range(end, start)),
            Value::Array(items) => {
                let snapshot = items.borrow().clone();
                let mut negated = Vec::with_capacity(snapshot.len());
                for item in snapshot {
                    negated.push(self.apply_unary(UnaryOp::Neg, item)?);
                }
                Ok(Value::array(negated))
            }
            other => Err(YyError::type_error(format!(
                "cannot negate a {}",
                other.type_name()
            ))),
        }
    }

    fn apply_binary(&mut self, op: BinaryOp, left: Value, right: Value) -> Result<Value, YyError> {
        match op {
            BinaryOp::Eq => return Ok(Value::Bool(left == right)),
            BinaryOp::NotEq => return Ok(Value::Bool(left != right)),
            _ => {}
        }

        if let (Value::Number(a), Value::Number(b)) = (&left, &right) {
            return numeric_binary(op, *a, *b);
        }

        match (op, &left, &right) {
            (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
                return Ok(Value::str(format!("{}{}", a, b)));
            }
            (BinaryOp::Add, Value::Array(a), Value::Array(b)) => {
                let mut merged = a.borrow().clone();
                merged.extend(b.borrow().iter().cloned());
                return Ok(Value::array(merged));
            }
            _ => {}
        }

        if self.in_yolo() {
            return self.yolo_binary(op, left, right);
        }

        Err(YyError::type_error(format!(
            "unsupported operands for '{}': {} and {}",
            op,
            left.type_name(),
            right.type_name()
        )))
    }

    /// Coercion rules applied inside `yolo` blocks when the strict operator
    /// table has no entry. Adding a function bakes the other operand into it.
    fn yolo_binary(&mut self, op: BinaryOp, left: Value, right: Value) -> Result<Value, YyError> {
        if op == BinaryOp::Add {
            if let Value::Function(f) = &left {
                return Ok(bake(f, right));
            }
            if let Value::Function(f) = &right {
                return Ok(bake(f, left));
            }
        }

        // Numeric reinterpretation comes first, so "2" * 5 is 10 while
        // "ab" * 3 falls through to repetition
        if let (Some(a), Some(b)) = (coerce_number(&left), coerce_number(&right)) {
            return numeric_binary(op, a, b);
        }

        if op == BinaryOp::Mul {
            match (&left, &right) {
                (Value::Str(s), other) | (other, Value::Str(s)) => {
                    if let Some(n) = coerce_number(other) {
                        return Ok(Value::str(s.repeat(clamp_count(n))));
                    }
                }
                (Value::Array(items), other) | (other, Value::Array(items)) => {
                    if let Some(n) = coerce_number(other) {
                        let snapshot = items.borrow().clone();
                        let mut repeated = Vec::new();
                        for _ in 0..clamp_count(n) {
                            repeated.extend(snapshot.iter().cloned());
                        }
                        return Ok(Value::array(repeated));
                    }
                }
                _ => {}
            }
        }

        if op == BinaryOp::Add {
            return Ok(Value::str(format!("{}{}", left.render(), right.render())));
        }

        Err(YyError::type_error(format!(
            "unsupported operands for '{}': {} and {}",
            op,
            left.type_name(),
            right.type_name()
        )))
    }

    pub(crate) fn call_value(&mut self, callee: Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Native(builtin) => Ok(Flow::Value(builtins::call(builtin, args, self)?)),
            Value::Function(f) => {
                if args.len() != f.params.len() {
                    return Err(YyError::runtime(
                        ErrorKind::ArityError,
                        format!(
                            "wrong number of arguments: expected {}, got {}",
                            f.params.len(),
                            args.len()
                        ),
                    ));
                }
                let frame = Environment::child(&f.env);
                for (param, arg) in f.params.iter().zip(args) {
                    Environment::declare(&frame, param, arg);
                }
                // A yeet inside the body stops here
                let result = self
                    .with_call_frame(|interp| interp.eval_block(&f.body, &frame))?
                    .collapse();
                Ok(Flow::Value(result))
            }
            other => Err(YyError::type_error(format!(
                "{} is not callable",
                other.type_name()
            ))),
        }
    }

    fn eval_yall(
        &mut self,
        binder: &str,
        iterable: Value,
        body: &[Expr],
        env: &EnvRef,
    ) -> EvalResult {
        match iterable {
            // Ranges iterate lazily; everything else is snapshotted up front
            // so body mutations don't disturb the walk
            Value::Range(start, end) => {
                let mut result = Value::Null;
                let step = if start <= end { 1 } else { -1 };
                let mut i = start;
                loop {
                    result = flow_try!(self.yall_iteration(
                        binder,
                        Value::Number(i as f64),
                        body,
                        env
                    ));
                    if i == end {
                        break;
                    }
                    i += step;
                }
                Ok(Flow::Value(result))
            }
            Value::Number(n) => {
                let end = expect_whole(&Value::Number(n), "loop count")?;
                self.eval_yall(binder, Value::Range(0, end), body, env)
            }
            Value::Array(items) => {
                let snapshot = items.borrow().clone();
                self.yall_over(binder, snapshot, body, env)
            }
            Value::Map(map) => {
                let keys: Vec<Value> = map.borrow().keys().map(Value::str).collect();
                self.yall_over(binder, keys, body, env)
            }
            Value::Str(s) => {
                let chars: Vec<Value> = s.chars().map(|c| Value::str(c.to_string())).collect();
                self.yall_over(binder, chars, body, env)
            }
            other => Err(YyError::type_error(format!(
                "cannot iterate over a {}",
                other.type_name()
            ))),
        }
    }

    fn yall_over(
        &mut self,
        binder: &str,
        items: Vec<Value>,
        body: &[Expr],
        env: &EnvRef,
    ) -> EvalResult {
        let mut result = Value::Null;
        for item in items {
            result = flow_try!(self.yall_iteration(binder, item, body, env));
        }
        Ok(Flow::Value(result))
    }

    fn yall_iteration(
        &mut self,
        binder: &str,
        item: Value,
        body: &[Expr],
        env: &EnvRef,
    ) -> EvalResult {
        self.charge_fuel()?;
        let frame = Environment::child(env);
        Environment::declare(&frame, binder, item);
        self.eval_block(body, &frame)
    }

    fn eval_yoyo(&mut self, condition: Option<&Expr>, body: &[Expr], env: &EnvRef) -> EvalResult {
        let mut result = Value::Null;
        loop {
            self.charge_fuel()?;
            if let Some(cond) = condition {
                let cond = flow_try!(self.eval(cond, env));
                if !cond.is_truthy() {
                    break;
                }
            }
            let frame = Environment::child(env);
            result = flow_try!(self.eval_block(body, &frame));
        }
        Ok(Flow::Value(result))
    }

    fn index_value(&self, object: &Value, index: &Value) -> Result<Value, YyError> {
        match object {
            Value::Array(items) => {
                let items = items.borrow();
                let raw = expect_whole(index, "index")?;
                let i = normalize_index(raw, items.len())
                    .ok_or_else(|| index_out_of_bounds(raw, items.len()))?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let raw = expect_whole(index, "index")?;
                let i = normalize_index(raw, chars.len())
                    .ok_or_else(|| index_out_of_bounds(raw, chars.len()))?;
                Ok(Value::str(chars[i].to_string()))
            }
            // A missing map key reads as Null rather than a fault
            Value::Map(map) => Ok(map.borrow().get(&index.render()).unwrap_or(Value::Null)),
            other => Err(YyError::type_error(format!(
                "cannot index into a {}",
                other.type_name()
            ))),
        }
    }

    /// `x[a..b]` always yields a fresh value and never faults on bounds.
    /// A negative start counts from the end; a negative end is inclusive
    /// from the end while a non-negative end is exclusive, so `arr[0..-1]`
    /// copies the whole array and `arr[0..mid]` plus `arr[mid..len]`
    /// partition it.
    fn slice_value(&self, object: &Value, start: i64, end: i64) -> Result<Value, YyError> {
        match object {
            Value::Array(items) => {
                let items = items.borrow();
                let (lo, hi) = slice_bounds(start, end, items.len());
                Ok(Value::array(items[lo..hi].to_vec()))
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (lo, hi) = slice_bounds(start, end, chars.len());
                Ok(Value::str(chars[lo..hi].iter().collect::<String>()))
            }
            other => Err(YyError::type_error(format!(
                "cannot slice a {}",
                other.type_name()
            ))),
        }
    }

    fn unknown_identifier(&self, name: &str, env: &EnvRef) -> YyError {
        let mut candidates = Environment::visible_names(env);
        candidates.extend(Builtin::all().iter().map(|b| b.name().to_string()));

        let error = YyError::reference(name);
        match find_closest_match(name, candidates.iter().map(|s| s.as_str())) {
            Some(suggestion) => error.with_suggestion(suggestion),
            None => error,
        }
    }
}

/// Binds one argument into a function without calling it, producing a new
/// function with the bound parameters removed. An array binds leading
/// parameters positionally, a map binds by parameter name, a scalar binds
/// the first parameter. Null and functions leave the operand unchanged.
fn bake(func: &Rc<FunctionDef>, arg: Value) -> Value {
    let bound = Environment::child(&func.env);
    let mut remaining = func.params.clone();

    match arg {
        Value::Null | Value::Function(_) | Value::Native(_) => {
            return Value::Function(Rc::clone(func));
        }
        Value::Array(items) => {
            let items = items.borrow();
            let n = items.len().min(remaining.len());
            for (param, item) in remaining.drain(..n).zip(items.iter()) {
                Environment::declare(&bound, &param, item.clone());
            }
        }
        Value::Map(map) => {
            let map = map.borrow();
            remaining.retain(|param| match map.get(param) {
                Some(value) => {
                    Environment::declare(&bound, param, value);
                    false
                }
                None => true,
            });
        }
        scalar => {
            if remaining.is_empty() {
                return Value::Function(Rc::clone(func));
            }
            let param = remaining.remove(0);
            Environment::declare(&bound, &param, scalar);
        }
    }

    Value::Function(Rc::new(FunctionDef {
        params: remaining,
        body: Rc::clone(&func.body),
        env: bound,
    }))
}

fn numeric_binary(op: BinaryOp, a: f64, b: f64) -> Result<Value, YyError> {
    let value = match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(divide_by_zero());
            }
            Value::Number(a / b)
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(divide_by_zero());
            }
            Value::Number(a % b)
        }
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        other => {
            return Err(YyError::type_error(format!(
                "unsupported numeric operator '{}'",
                other
            )));
        }
    };
    Ok(value)
}

fn divide_by_zero() -> YyError {
    YyError::runtime(ErrorKind::DivideByZero, "division by zero")
}

/// Numeric reinterpretation used in yolo mode: bools count as 0 and 1,
/// null as 0, strings parse when they look like numbers
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn clamp_count(n: f64) -> usize {
    if n <= 0.0 {
        0
    } else {
        n as usize
    }
}

pub(crate) fn expect_whole(value: &Value, role: &str) -> Result<i64, YyError> {
    match value {
        Value::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        other => Err(YyError::type_error(format!(
            "{} must be a whole number, got {}",
            role,
            other.type_name()
        ))),
    }
}

/// Maps a possibly negative index onto `0..len`; None when out of bounds
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { len + index } else { index };
    if i >= 0 && i < len {
        Some(i as usize)
    } else {
        None
    }
}

pub(crate) fn index_out_of_bounds(index: i64, len: usize) -> YyError {
    YyError::runtime(
        ErrorKind::IndexError,
        format!("index {} out of bounds for length {}", index, len),
    )
}

fn slice_bounds(start: i64, end: i64, len: usize) -> (usize, usize) {
    let len = len as i64;
    let lo = (if start < 0 { len + start } else { start }).clamp(0, len);
    let hi = (if end < 0 { len + end + 1 } else { end }).clamp(lo, len);
    (lo as usize, hi as usize)
}
