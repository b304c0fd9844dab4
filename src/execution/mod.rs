//! # Execution Context
//!
//! The per-call mutable state of one evaluation: a dense `i64` slot per
//! symbol, indexed by symbol id, plus the recorded return value.
//!
//! On construction, parameter slots are filled from the call arguments,
//! constant slots are seeded from their declared values and variable slots
//! start at zero. Contexts are cheap and never shared; every call builds a
//! fresh one against the immutable compiled program.

use crate::analysis::symbol_table::{SymbolId, SymbolTable};

pub struct ExecutionContext {
    slots: Vec<i64>,
    result: Option<i64>,
}

impl ExecutionContext {
    /// Build a context for one call.
    ///
    /// Passing the wrong number of arguments is a programming error on the
    /// caller's side, not a runtime failure of the program.
    pub fn new(symbols: &SymbolTable, parameters: &[i64]) -> Self {
        assert_eq!(
            parameters.len(),
            symbols.number_of_parameters(),
            "argument count must match the declared parameter count"
        );

        let mut slots = vec![0; symbols.size()];
        slots[..parameters.len()].copy_from_slice(parameters);
        for constant in symbols.constants() {
            debug_assert!(constant.initialized);
            if let Some(value) = constant.constant_value {
                slots[constant.id] = value;
            }
        }

        Self {
            slots,
            result: None,
        }
    }

    pub fn value(&self, id: SymbolId) -> i64 {
        self.slots[id]
    }

    pub fn set_value(&mut self, id: SymbolId, value: i64) {
        self.slots[id] = value;
    }

    /// The value recorded by the most recent `RETURN`, if any.
    pub fn result(&self) -> Option<i64> {
        self.result
    }

    pub fn set_result(&mut self, result: i64) {
        self.result = Some(result);
    }
}
