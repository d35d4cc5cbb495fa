//! Interpreter core: fetch-decode-execute loop, call protocol, and the attempt/abort
//! recovery mechanism.
//!
//! Guest frames live on an explicit activation stack, so guest call depth never consumes
//! host stack; `max_call_depth` bounds that stack and turns runaway recursion into a trap.
//! An abort that the current frame cannot land pops it and is offered to its caller, until
//! a frame owning the top handler is found or the stack is exhausted.

use std::cmp::Ordering;
use std::io;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::VmConfig;
use crate::error::Trap;
use crate::host::{ConsoleNatives, NativeDispatch};
use crate::model::{ConstantKind, Module, PoolIndex};
use crate::vm::frames::{CallFrame, FrameId};
use crate::vm::instructions::Opcode;
use crate::vm::value::{compare, Value};

/// Body run for a Constructor constant without an emitted body.
const DEFAULT_CTOR_CODE: &[u8] = &[Opcode::Ret as u8];
const DEFAULT_CTOR_SLOTS: u16 = 1;

/// How an invocation finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// RET, or running off the end of the code.
    Normal(Value),
    /// ABORT not handled inside the invocation; carries the aborted value.
    Unwinding(Value),
}

/// What stopped a frame's instruction loop.
enum Flow {
    Call {
        pool_index: PoolIndex,
        args: Vec<Value>,
        /// False for CALL_CTOR: the constructor's return value is discarded.
        keep_result: bool,
    },
    Return(Value),
    Abort(Value),
}

/// A suspended or running frame on the activation stack.
struct Activation<'m> {
    frame: CallFrame<'m>,
    keep_result: bool,
}

/// Entry pushed by ENTER_ATTEMPT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttemptHandler {
    frame: FrameId,
    handler_ip: u16,
}

pub struct Interpreter<N> {
    module: Arc<Module>,
    /// LOAD_CONST values, one per pool entry, so string literals are shared not reallocated.
    literals: Vec<Value>,
    natives: N,
    config: VmConfig,
    handlers: Vec<AttemptHandler>,
    next_frame: u64,
}

impl Interpreter<ConsoleNatives<io::StdinLock<'static>, io::Stdout>> {
    /// Interpreter whose natives talk to the process's stdin/stdout.
    pub fn with_stdio(module: impl Into<Arc<Module>>, config: VmConfig) -> Self {
        Self::with_config(module, ConsoleNatives::stdio(), config)
    }
}

impl<N: NativeDispatch> Interpreter<N> {
    pub fn new(module: impl Into<Arc<Module>>, natives: N) -> Self {
        Self::with_config(module, natives, VmConfig::default())
    }

    pub fn with_config(module: impl Into<Arc<Module>>, natives: N, config: VmConfig) -> Self {
        let module = module.into();
        let literals = module
            .constants
            .iter()
            .map(|c| match (c.kind, c.numeric_value) {
                (ConstantKind::Number, Some(n)) => Value::Number(n),
                _ => Value::string(c.name.as_str()),
            })
            .collect();
        Self {
            module,
            literals,
            natives,
            config,
            handlers: Vec::new(),
            next_frame: 0,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn natives(&self) -> &N {
        &self.natives
    }

    pub fn natives_mut(&mut self) -> &mut N {
        &mut self.natives
    }

    pub fn into_natives(self) -> N {
        self.natives
    }

    /// Number of attempt handlers currently registered.
    pub fn handler_depth(&self) -> usize {
        self.handlers.len()
    }

    /// Run the entry method with no arguments and return its result.
    /// An abort that escapes every handler fails with `Trap::UnhandledAbort`.
    pub fn run(&mut self) -> Result<Value, Trap> {
        let module = Arc::clone(&self.module);
        let suffix = &self.config.entry_suffix;
        let entry = module
            .find_method_by_suffix(suffix)
            .ok_or_else(|| Trap::MissingEntryPoint { suffix: suffix.clone() })?;
        debug!(entry = %entry.name, pool_index = entry.index, "entry method resolved");
        match self.invoke(entry.index, &[])? {
            Completion::Normal(v) => Ok(v),
            Completion::Unwinding(v) => Err(Trap::UnhandledAbort { value: v.to_string() }),
        }
    }

    /// Invoke the callable at `pool_index` with `args` bound to its first local slots.
    /// Handler state from a previous failed invocation is discarded first.
    pub fn invoke(&mut self, pool_index: PoolIndex, args: &[Value]) -> Result<Completion, Trap> {
        self.handlers.clear();
        let module = Arc::clone(&self.module);
        self.execute(&module, pool_index, args.to_vec())
    }

    /// Drive the activation stack until the entry frame returns or an abort escapes it.
    fn execute(&mut self, module: &Module, entry: PoolIndex, args: Vec<Value>) -> Result<Completion, Trap> {
        let mut current = self.activate(module, entry, args, true, 0)?;
        let mut callers: Vec<Activation<'_>> = Vec::new();

        loop {
            match self.run_frame(&mut current.frame)? {
                Flow::Call { pool_index, args, keep_result } => {
                    let depth = callers.len() + 1;
                    let callee = self.activate(module, pool_index, args, keep_result, depth)?;
                    callers.push(std::mem::replace(&mut current, callee));
                }
                Flow::Return(v) => {
                    let Some(caller) = callers.pop() else {
                        return Ok(Completion::Normal(v));
                    };
                    let done = std::mem::replace(&mut current, caller);
                    trace!(frame = done.frame.id.0, depth = callers.len() + 1, "return");
                    if done.keep_result {
                        current.frame.push(v);
                    }
                }
                Flow::Abort(mut v) => loop {
                    match self.land(&mut current.frame, v) {
                        Ok(()) => break,
                        Err(unwinding) => match callers.pop() {
                            Some(caller) => {
                                current = caller;
                                v = unwinding;
                            }
                            None => return Ok(Completion::Unwinding(unwinding)),
                        },
                    }
                },
            }
        }
    }

    /// Build the frame for a call made while `depth` frames are active.
    fn activate<'m>(
        &mut self,
        module: &'m Module,
        pool_index: PoolIndex,
        args: Vec<Value>,
        keep_result: bool,
        depth: usize,
    ) -> Result<Activation<'m>, Trap> {
        if depth >= self.config.max_call_depth {
            return Err(Trap::CallDepthExceeded { limit: self.config.max_call_depth });
        }
        let (code, slots) = resolve_body(module, pool_index)?;
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        trace!(pool_index, frame = id.0, argc = args.len(), depth, "call");
        let frame = CallFrame::new(id, code, slots as usize, args)?;
        Ok(Activation { frame, keep_result })
    }

    /// Execute `frame` until it calls, returns or aborts.
    fn run_frame(&mut self, frame: &mut CallFrame<'_>) -> Result<Flow, Trap> {
        loop {
            let Some(op) = frame.fetch()? else {
                return Ok(Flow::Return(Value::NULL));
            };
            match op {
                Opcode::Nop | Opcode::EnterDebrief | Opcode::LeaveDebrief => {}
                Opcode::Pop => {
                    frame.stack.pop();
                }
                Opcode::Dup => {
                    let top = frame.peek(op)?.clone();
                    frame.push(top);
                }

                Opcode::LoadNull => frame.push(Value::NULL),
                Opcode::LoadTrue => frame.push(Value::TRUE),
                Opcode::LoadFalse => frame.push(Value::FALSE),
                Opcode::LoadConst => {
                    let index = frame.read_operand(op)?;
                    let v = self.literals.get(index as usize).cloned().ok_or(
                        Trap::ConstantOutOfRange { index, len: self.literals.len() },
                    )?;
                    frame.push(v);
                }
                Opcode::LoadLocal => {
                    let index = frame.read_operand(op)?;
                    let v = frame.local(index)?.clone();
                    frame.push(v);
                }
                Opcode::StoreLocal => {
                    let index = frame.read_operand(op)?;
                    let v = frame.pop(op)?;
                    frame.set_local(index, v)?;
                }

                Opcode::Add => {
                    let b = frame.pop(op)?;
                    let a = frame.pop(op)?;
                    frame.push(add(&a, &b)?);
                }
                Opcode::Sub => arith(frame, op, |a, b| a - b)?,
                Opcode::Mul => arith(frame, op, |a, b| a * b)?,
                Opcode::Div => arith(frame, op, |a, b| a / b)?,
                Opcode::Mod => arith(frame, op, |a, b| a % b)?,
                Opcode::Neg => {
                    let a = frame.pop(op)?.as_number(op.mnemonic())?;
                    frame.push(Value::Number(-a));
                }
                Opcode::Not => {
                    let v = frame.pop(op)?;
                    frame.push(Value::from_bool(!v.as_boolean()));
                }

                Opcode::Ceq | Opcode::Cne => {
                    let b = frame.pop(op)?;
                    let a = frame.pop(op)?;
                    frame.push(Value::from_bool((a == b) == (op == Opcode::Ceq)));
                }
                Opcode::Clt => relational(frame, op, Ordering::is_lt)?,
                Opcode::Cle => relational(frame, op, Ordering::is_le)?,
                Opcode::Cgt => relational(frame, op, Ordering::is_gt)?,
                Opcode::Cge => relational(frame, op, Ordering::is_ge)?,

                Opcode::Jmp => {
                    let target = frame.read_operand(op)?;
                    frame.jump(target);
                }
                Opcode::JmpTrue | Opcode::JmpFalse => {
                    let target = frame.read_operand(op)?;
                    let cond = frame.pop(op)?.as_boolean();
                    if cond == (op == Opcode::JmpTrue) {
                        frame.jump(target);
                    }
                }

                Opcode::NewObj => {
                    let type_index = frame.read_operand(op)?;
                    frame.push(Value::new_object(type_index));
                }
                Opcode::LoadMember => {
                    let field = frame.read_operand(op)?;
                    let target = frame.pop(op)?;
                    let v = target.as_object(op.mnemonic())?.borrow().get_field(field);
                    frame.push(v);
                }
                Opcode::StoreMember => {
                    let field = frame.read_operand(op)?;
                    let target = frame.pop(op)?;
                    let v = frame.pop(op)?;
                    target
                        .as_object(op.mnemonic())?
                        .borrow_mut()
                        .set_field(field, v.clone());
                    frame.push(v);
                }

                Opcode::Call => {
                    let pool_index = frame.read_operand(op)?;
                    let argc = frame.read_operand(op)?;
                    let args = frame.pop_args(op, argc)?;
                    return Ok(Flow::Call { pool_index, args, keep_result: true });
                }
                Opcode::CallCtor => {
                    let pool_index = frame.read_operand(op)?;
                    let argc = frame.read_operand(op)?;
                    let args = frame.pop_args(op, argc)?;
                    // A receiver left beneath the arguments (NEW_OBJ; DUP; ...) stays there and
                    // is bound to slot 0. Without one, as when a derived constructor chains to
                    // its base, the arguments bind as popped.
                    let args = match frame.stack.peek() {
                        Some(receiver @ Value::Object(_)) => bind_receiver(receiver.clone(), args),
                        _ => args,
                    };
                    return Ok(Flow::Call { pool_index, args, keep_result: false });
                }
                Opcode::CallNative => {
                    let id = frame.read_operand(op)?;
                    let argc = frame.read_operand(op)?;
                    let args = frame.pop_args(op, argc)?;
                    let v = self.natives.invoke(id, &args)?;
                    frame.push(v);
                }
                Opcode::Ret => {
                    return Ok(Flow::Return(frame.stack.pop().unwrap_or(Value::NULL)));
                }

                Opcode::Abort => {
                    let v = frame.pop(op)?;
                    trace!(frame = frame.id.0, value = %v, "abort");
                    return Ok(Flow::Abort(v));
                }
                Opcode::EnterAttempt => {
                    let handler_ip = frame.read_operand(op)?;
                    self.handlers.push(AttemptHandler { frame: frame.id, handler_ip });
                }
                Opcode::LeaveAttempt => {
                    self.handlers
                        .pop()
                        .ok_or(Trap::HandlerStackEmpty { offset: frame.op_offset() })?;
                }
            }
        }
    }

    /// Land an abort in `frame` if the innermost handler belongs to it: the handler is
    /// consumed, the value pushed, and execution resumes at the handler offset.
    /// Otherwise the value is handed back for propagation.
    fn land(&mut self, frame: &mut CallFrame<'_>, value: Value) -> Result<(), Value> {
        match self.handlers.last().copied() {
            Some(h) if h.frame == frame.id => {
                self.handlers.pop();
                trace!(frame = frame.id.0, handler_ip = h.handler_ip, "abort landed");
                frame.push(value);
                frame.jump(h.handler_ip);
                Ok(())
            }
            _ => Err(value),
        }
    }
}

/// Code and local-slot hint for a callable. A Constructor without a body gets a no-op
/// default; anything else unresolved is fatal.
fn resolve_body(module: &Module, pool_index: PoolIndex) -> Result<(&[u8], u16), Trap> {
    if let Some(body) = module.body_for(pool_index) {
        return Ok((&body.bytecode, body.local_slot_count));
    }
    match module.constant(pool_index) {
        Some(c) if c.kind == ConstantKind::Constructor => {
            debug!(pool_index, ctor = %c.name, "synthesizing default constructor");
            Ok((DEFAULT_CTOR_CODE, DEFAULT_CTOR_SLOTS))
        }
        _ => Err(Trap::MissingMethodBody { pool_index }),
    }
}

/// Constructor frames receive the receiver in slot 0, then the popped arguments.
/// Call sites that DUP the receiver into the argument list pass that same reference
/// first; it is bound once.
fn bind_receiver(receiver: Value, args: Vec<Value>) -> Vec<Value> {
    let mut rest = args.into_iter().peekable();
    if rest.peek() == Some(&receiver) {
        rest.next();
    }
    let mut bound = Vec::with_capacity(rest.size_hint().0 + 1);
    bound.push(receiver);
    bound.extend(rest);
    bound
}

fn add(a: &Value, b: &Value) -> Result<Value, Trap> {
    if a.is_string() || b.is_string() {
        return Ok(Value::string(format!("{a}{b}")));
    }
    Ok(Value::Number(a.as_number("ADD")? + b.as_number("ADD")?))
}

fn arith<F>(frame: &mut CallFrame<'_>, op: Opcode, f: F) -> Result<(), Trap>
where
    F: Fn(f64, f64) -> f64,
{
    let b = frame.pop(op)?.as_number(op.mnemonic())?;
    let a = frame.pop(op)?.as_number(op.mnemonic())?;
    frame.push(Value::Number(f(a, b)));
    Ok(())
}

fn relational(frame: &mut CallFrame<'_>, op: Opcode, pred: fn(Ordering) -> bool) -> Result<(), Trap> {
    let b = frame.pop(op)?;
    let a = frame.pop(op)?;
    let ord = compare(&a, &b, op.mnemonic())?;
    frame.push(Value::from_bool(ord.is_some_and(pred)));
    Ok(())
}
