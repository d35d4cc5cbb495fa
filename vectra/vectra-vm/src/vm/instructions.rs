//! Opcode table: the closed instruction set with each opcode's immediate operand count.
//! Both the frame's local-slot pre-scan and the interpreter decode through this table.

use std::fmt;

/// Width in bytes of one immediate operand (little-endian u16).
pub const OPERAND_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0x00,
    Pop = 0x01,
    Dup = 0x02,

    LoadLocal = 0x10,
    StoreLocal = 0x11,

    LoadConst = 0x20,
    LoadNull = 0x21,
    LoadTrue = 0x22,
    LoadFalse = 0x23,

    NewObj = 0x30,
    LoadMember = 0x31,
    StoreMember = 0x32,

    Call = 0x40,
    CallCtor = 0x41,
    Ret = 0x42,
    CallNative = 0x43,

    Add = 0x50,
    Sub = 0x51,
    Mul = 0x52,
    Div = 0x53,
    Mod = 0x54,
    Neg = 0x55,
    Not = 0x56,

    Ceq = 0x60,
    Cne = 0x61,
    Clt = 0x62,
    Cle = 0x63,
    Cgt = 0x64,
    Cge = 0x65,

    Jmp = 0x70,
    JmpTrue = 0x71,
    JmpFalse = 0x72,
    Abort = 0x73,
    EnterAttempt = 0x74,
    LeaveAttempt = 0x75,
    EnterDebrief = 0x76,
    LeaveDebrief = 0x77,
}

impl Opcode {
    /// Decode one opcode byte. `None` for bytes outside the table.
    pub fn from_byte(b: u8) -> Option<Self> {
        use Opcode::*;
        Some(match b {
            0x00 => Nop,
            0x01 => Pop,
            0x02 => Dup,
            0x10 => LoadLocal,
            0x11 => StoreLocal,
            0x20 => LoadConst,
            0x21 => LoadNull,
            0x22 => LoadTrue,
            0x23 => LoadFalse,
            0x30 => NewObj,
            0x31 => LoadMember,
            0x32 => StoreMember,
            0x40 => Call,
            0x41 => CallCtor,
            0x42 => Ret,
            0x43 => CallNative,
            0x50 => Add,
            0x51 => Sub,
            0x52 => Mul,
            0x53 => Div,
            0x54 => Mod,
            0x55 => Neg,
            0x56 => Not,
            0x60 => Ceq,
            0x61 => Cne,
            0x62 => Clt,
            0x63 => Cle,
            0x64 => Cgt,
            0x65 => Cge,
            0x70 => Jmp,
            0x71 => JmpTrue,
            0x72 => JmpFalse,
            0x73 => Abort,
            0x74 => EnterAttempt,
            0x75 => LeaveAttempt,
            0x76 => EnterDebrief,
            0x77 => LeaveDebrief,
            _ => return None,
        })
    }

    /// Number of u16 immediates following the opcode byte.
    pub fn operand_count(self) -> usize {
        use Opcode::*;
        match self {
            LoadLocal | StoreLocal | LoadConst | NewObj | LoadMember | StoreMember | Jmp
            | JmpTrue | JmpFalse | EnterAttempt => 1,
            Call | CallCtor | CallNative => 2,
            _ => 0,
        }
    }

    /// Total encoded length in bytes, opcode included.
    pub fn encoded_len(self) -> usize {
        1 + self.operand_count() * OPERAND_WIDTH
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "NOP",
            Pop => "POP",
            Dup => "DUP",
            LoadLocal => "LOAD_LOCAL",
            StoreLocal => "STORE_LOCAL",
            LoadConst => "LOAD_CONST",
            LoadNull => "LOAD_NULL",
            LoadTrue => "LOAD_TRUE",
            LoadFalse => "LOAD_FALSE",
            NewObj => "NEW_OBJ",
            LoadMember => "LOAD_MEMBER",
            StoreMember => "STORE_MEMBER",
            Call => "CALL",
            CallCtor => "CALL_CTOR",
            Ret => "RET",
            CallNative => "CALL_NATIVE",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Mod => "MOD",
            Neg => "NEG",
            Not => "NOT",
            Ceq => "CEQ",
            Cne => "CNE",
            Clt => "CLT",
            Cle => "CLE",
            Cgt => "CGT",
            Cge => "CGE",
            Jmp => "JMP",
            JmpTrue => "JMP_TRUE",
            JmpFalse => "JMP_FALSE",
            Abort => "ABORT",
            EnterAttempt => "ENTER_ATTEMPT",
            LeaveAttempt => "LEAVE_ATTEMPT",
            EnterDebrief => "ENTER_DEBRIEF",
            LeaveDebrief => "LEAVE_DEBRIEF",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
