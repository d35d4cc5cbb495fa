//! Shared helpers: a VBC image encoder and a small bytecode assembler.
#![allow(dead_code)]

use vectra_vm::host::ConsoleNatives;
use vectra_vm::vm::Opcode;
use vectra_vm::{ConstantKind, Interpreter, Module, Trap, Value, VmConfig};

pub const ENTRY: &str = "Program::Main()";

enum Literal {
    Name(ConstantKind, String),
    Number(f64),
}

/// Builds a VBC image section by section.
#[derive(Default)]
pub struct Vbc {
    imports: Vec<String>,
    constants: Vec<Literal>,
    types: Vec<(u16, Vec<(u16, u16)>)>,
    bodies: Vec<(u16, u16, Vec<u8>)>,
}

impl Vbc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(&mut self, name: &str) {
        self.imports.push(name.to_string());
    }

    pub fn constant(&mut self, kind: ConstantKind, name: &str) -> u16 {
        self.constants.push(Literal::Name(kind, name.to_string()));
        (self.constants.len() - 1) as u16
    }

    pub fn string(&mut self, s: &str) -> u16 {
        self.constant(ConstantKind::String, s)
    }

    pub fn number(&mut self, n: f64) -> u16 {
        self.constants.push(Literal::Number(n));
        (self.constants.len() - 1) as u16
    }

    pub fn method(&mut self, name: &str) -> u16 {
        self.constant(ConstantKind::Method, name)
    }

    pub fn type_def(&mut self, pool_index: u16, methods: &[(u16, u16)]) {
        self.types.push((pool_index, methods.to_vec()));
    }

    pub fn body(&mut self, pool_index: u16, slots: u16, code: Vec<u8>) {
        self.bodies.push((pool_index, slots, code));
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = b"VBC".to_vec();
        out.extend_from_slice(&[1, 0]);

        put_u16(&mut out, self.imports.len());
        for name in &self.imports {
            put_str(&mut out, name);
        }

        put_u16(&mut out, self.constants.len());
        for c in &self.constants {
            match c {
                Literal::Name(kind, name) => {
                    out.push(*kind as u8);
                    put_str(&mut out, name);
                }
                Literal::Number(n) => {
                    out.push(ConstantKind::Number as u8);
                    out.extend_from_slice(&n.to_le_bytes());
                }
            }
        }

        put_u16(&mut out, self.types.len());
        for (pool_index, methods) in &self.types {
            out.extend_from_slice(&pool_index.to_le_bytes());
            put_u16(&mut out, methods.len());
            for (m, params) in methods {
                out.extend_from_slice(&m.to_le_bytes());
                out.extend_from_slice(&params.to_le_bytes());
            }
        }

        put_u16(&mut out, self.bodies.len());
        for (pool_index, slots, code) in &self.bodies {
            out.extend_from_slice(&pool_index.to_le_bytes());
            out.extend_from_slice(&slots.to_le_bytes());
            put_u16(&mut out, code.len());
            out.extend_from_slice(code);
        }
        out
    }

    pub fn module(&self) -> Module {
        vectra_vm::load(&self.encode()).expect("test image loads")
    }
}

fn put_u16(out: &mut Vec<u8>, n: usize) {
    out.extend_from_slice(&(n as u16).to_le_bytes());
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    put_u16(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

/// Bytecode assembler with forward-jump patching.
#[derive(Default)]
pub struct Asm {
    code: Vec<u8>,
}

impl Asm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(&mut self, op: Opcode) -> &mut Self {
        self.code.push(op as u8);
        self
    }

    pub fn op1(&mut self, op: Opcode, a: u16) -> &mut Self {
        self.code.push(op as u8);
        self.code.extend_from_slice(&a.to_le_bytes());
        self
    }

    pub fn op2(&mut self, op: Opcode, a: u16, b: u16) -> &mut Self {
        self.op1(op, a);
        self.code.extend_from_slice(&b.to_le_bytes());
        self
    }

    pub fn raw(&mut self, byte: u8) -> &mut Self {
        self.code.push(byte);
        self
    }

    pub fn here(&self) -> u16 {
        self.code.len() as u16
    }

    /// Emit a one-operand jump-like instruction with a placeholder target; returns the
    /// position of the operand for `patch`.
    pub fn forward(&mut self, op: Opcode) -> usize {
        self.op1(op, 0xFFFF);
        self.code.len() - 2
    }

    pub fn patch(&mut self, at: usize, target: u16) {
        self.code[at..at + 2].copy_from_slice(&target.to_le_bytes());
    }

    pub fn build(&self) -> Vec<u8> {
        self.code.clone()
    }
}

pub type TestConsole = ConsoleNatives<&'static [u8], Vec<u8>>;

pub fn interpreter(image: &Vbc, input: &'static str, config: VmConfig) -> Interpreter<TestConsole> {
    Interpreter::with_config(image.module(), ConsoleNatives::new(input.as_bytes(), Vec::new()), config)
}

/// Run the entry method; returns the result and everything written to the console.
pub fn run_with_input(image: &Vbc, input: &'static str) -> (Result<Value, Trap>, String) {
    let mut vm = interpreter(image, input, VmConfig::default());
    let result = vm.run();
    let (_, out) = vm.into_natives().into_parts();
    (result, String::from_utf8(out).expect("console output is UTF-8"))
}

pub fn run(image: &Vbc) -> Result<Value, Trap> {
    run_with_input(image, "").0
}

/// Image with a single entry method whose body is `code`.
pub fn main_only(code: Vec<u8>) -> Vbc {
    let mut image = Vbc::new();
    let main = image.method(ENTRY);
    image.body(main, 0, code);
    image
}
