use std::thread;

use pljit::error::ErrorKind;
use pljit::Pljit;

#[test]
fn single_thread() {
    let jit = Pljit::new();

    let handle = jit.register_function("PARAM a, b;BEGIN RETURN a + b END.");
    assert_eq!(handle.call(&[1, 2]), Some(3));
    assert_eq!(handle.call(&[3, 5]), Some(8));
    assert_eq!(handle.compile_invocations(), 1);
}

#[test]
fn full_program() {
    let jit = Pljit::new();

    let handle = jit.register_function(
        "PARAM w, h, d;\n\
         VAR volume, some;\n\
         CONST density = 2400;\n\
         BEGIN\n\
         volume := w * h * d;\n\
         some := volume + w * 10 + h;\n\
         RETURN density * volume\n\
         END.",
    );
    assert_eq!(handle.call(&[10, 10, 10]), Some(2_400_000));
    assert_eq!(handle.call(&[1, 2, 3]), Some(14_400));
}

#[test]
fn invalid_programs() {
    let jit = Pljit::new();

    // Failure in the lexer.
    let handle = jit.register_function("PAR?AM a, b;BEGIN; RETURN a + b END.");
    assert_eq!(handle.call(&[10, 10]), None);
    assert_eq!(handle.compile_error().map(|e| e.kind), Some(ErrorKind::InvalidCharacter));

    // Failure in the parser.
    let handle = jit.register_function("PARAM a, b;BEGIN; RETURN a + b END.");
    assert_eq!(handle.call(&[10, 10]), None);
    assert_eq!(handle.compile_error().map(|e| e.kind), Some(ErrorKind::UnexpectedToken));

    // Failure in the semantic analyzer.
    let handle = jit.register_function("PARAM a;BEGIN RETURN a + b END.");
    assert_eq!(handle.call(&[10]), None);
    assert_eq!(
        handle.compile_error().map(|e| e.kind),
        Some(ErrorKind::UndeclaredIdentifier)
    );
}

#[test]
fn compilation_failure_is_cached() {
    let jit = Pljit::new();

    let handle = jit.register_function("VAR x; BEGIN x := 1 END.");
    assert_eq!(handle.call(&[]), None);
    assert_eq!(handle.call(&[]), None);
    assert_eq!(handle.call(&[]), None);
    // The pipeline ran once; the failure is served from the cache.
    assert_eq!(handle.compile_invocations(), 1);
    assert_eq!(handle.compile_error().map(|e| e.kind), Some(ErrorKind::MissingReturn));
}

#[test]
fn semantic_failures() {
    let jit = Pljit::new();

    let uninitialized = jit.register_function("VAR density; BEGIN RETURN density END.");
    assert_eq!(uninitialized.call(&[]), None);

    let constant = jit.register_function("CONST d = 1; BEGIN d := 10; RETURN d END.");
    assert_eq!(constant.call(&[]), None);

    let redeclared = jit.register_function("PARAM d, d; BEGIN RETURN 0 END.");
    assert_eq!(redeclared.call(&[1, 1]), None);
}

#[test]
fn trailing_input_fails() {
    let jit = Pljit::new();

    let handle = jit.register_function("BEGIN RETURN 1 END. BEGIN RETURN 2 END.");
    assert_eq!(handle.call(&[]), None);
    assert_eq!(handle.compile_error().map(|e| e.kind), Some(ErrorKind::TrailingInput));
}

#[test]
fn runtime_division_by_zero() {
    let jit = Pljit::new();

    // Constant propagation must not fold the division away; the failure
    // belongs to run time.
    let constant = jit.register_function("CONST a = 0; BEGIN RETURN 1000/a END.");
    assert_eq!(constant.call(&[]), None);

    let variable = jit.register_function("VAR a; BEGIN a := 10; RETURN 1000/(a-10) END.");
    assert_eq!(variable.call(&[]), None);
}

#[test]
fn runtime_failure_does_not_poison_the_function() {
    let jit = Pljit::new();

    let handle = jit.register_function("PARAM a; BEGIN RETURN 10 / a END.");
    assert_eq!(handle.call(&[0]), None);
    // A later call with good arguments runs normally.
    assert_eq!(handle.call(&[2]), Some(5));
    assert_eq!(handle.call(&[0]), None);
    assert_eq!(handle.compile_invocations(), 1);
}

#[test]
fn unreachable_statements_are_harmless() {
    let jit = Pljit::new();

    // The statement after RETURN would trap, but dead-code elimination
    // removes it and execution halts at the return anyway.
    let handle = jit.register_function(
        "VAR x;\n\
         BEGIN\n\
         x := 1;\n\
         RETURN x;\n\
         x := x / 0\n\
         END.",
    );
    assert_eq!(handle.call(&[]), Some(1));
}

#[test]
fn registry_lookup_by_id() {
    let jit = Pljit::new();

    let first = jit.register_function("BEGIN RETURN 1 END.");
    jit.register_function("BEGIN RETURN 2 END.");

    assert_eq!(first.call(&[]), Some(1));
    assert_eq!(jit.get(0).call(&[]), Some(1));
    assert_eq!(jit.get(1).call(&[]), Some(2));
    // Handles from `get` share the one-shot compilation.
    assert_eq!(jit.get(0).compile_invocations(), 1);
}

#[test]
fn multithreaded_compilation() {
    let jit = Pljit::new();
    let handle = jit.register_function("BEGIN RETURN 10 END.");

    let threads: Vec<_> = (0..1024)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || {
                assert_eq!(handle.call(&[]), Some(10));
            })
        })
        .collect();
    for thread in threads {
        thread.join().expect("worker thread panicked");
    }

    // Every call saw the same result and the pipeline ran exactly once.
    assert_eq!(handle.compile_invocations(), 1);
}
