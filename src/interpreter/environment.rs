// File: src/interpreter/environment.rs
//
// Lexical environments for variable storage and scoping.
//
// Environments form a parent chain: each block, loop iteration and function
// call gets a child frame whose lookups fall through to the enclosing frame.
// Frames are shared behind Rc<RefCell<..>> because closures keep their
// defining frame alive and may outlive the block that created it.

use crate::interpreter::value::Value;
use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    vars: AHashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// A root frame with no parent
    pub fn root() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A child frame whose lookups fall through to `parent`
    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            vars: AHashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// `:=` binds in the current frame, shadowing any outer binding with the
    /// same name
    pub fn declare(env: &EnvRef, name: &str, value: Value) {
        env.borrow_mut().vars.insert(name.to_string(), value);
    }

    /// `=` rebinds the nearest existing binding. Returns false when the name
    /// is unbound in every frame of the chain.
    pub fn assign(env: &EnvRef, name: &str, value: Value) -> bool {
        let mut current = Rc::clone(env);
        loop {
            if let Some(slot) = current.borrow_mut().vars.get_mut(name) {
                *slot = value;
                return true;
            }
            let parent = match &current.borrow().parent {
                Some(parent) => Rc::clone(parent),
                None => return false,
            };
            current = parent;
        }
    }

    pub fn lookup(env: &EnvRef, name: &str) -> Option<Value> {
        let mut current = Rc::clone(env);
        loop {
            if let Some(value) = current.borrow().vars.get(name) {
                return Some(value.clone());
            }
            let parent = match &current.borrow().parent {
                Some(parent) => Rc::clone(parent),
                None => return None,
            };
            current = parent;
        }
    }

    /// Every name bound anywhere in the chain, for "did you mean?"
    /// suggestions on failed lookups
    pub fn visible_names(env: &EnvRef) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Rc::clone(env);
        loop {
            for name in current.borrow().vars.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            let parent = match &current.borrow().parent {
                Some(parent) => Rc::clone(parent),
                None => return names,
            };
            current = parent;
        }
    }
}
