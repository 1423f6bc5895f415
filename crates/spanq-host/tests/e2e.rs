//! Scripts run through the whole pipeline: check, generate, install,
//! evaluate.

use spanq_gen::{GeneratorConfig, Method, QueryError};
use spanq_host::{prepare, EvalError, Outcome, Prepared};

fn prepared(source: &str) -> Prepared {
    let prepared = prepare(source, &GeneratorConfig::default());
    assert!(
        prepared.program.is_valid(),
        "{:?}",
        prepared.program.errors()
    );
    prepared
}

fn run(source: &str) -> Outcome {
    prepared(source)
        .program
        .evaluate()
        .unwrap_or_else(|err| panic!("{}", err))
}

fn result_of(source: &str) -> String {
    run(source)
        .binding("r")
        .map(|v| v.to_string())
        .unwrap_or_default()
}

#[test]
fn filter_then_count_over_a_read_only_view() {
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3, 4, 5, 6];
         let r = xs.Where(|x| x % 2 == 0).Count();",
    );
    assert_eq!(r, "3");
}

#[test]
fn projection_chain_materializes() {
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3, 4];
         let r = xs.Select(|x| x * x).Where(|x| x > 4).ToList();",
    );
    assert_eq!(r, "[9, 16]");
}

#[test]
fn each_in_place_slice_waits_a_round() {
    let source = "let xs: Span<Int> = [1, 2, 3, 4];
                  let r = xs.Skip(1).Take(2).Select(|x| x + 100).ToArray();";
    let p = prepared(source);
    let generated = p.generated.as_ref().expect("synthesis needed");
    assert_eq!(generated.stats.rounds, 3);
    assert_eq!(generated.stats.pending, 0);
    let outcome = p.program.evaluate().unwrap();
    assert_eq!(outcome.binding("r").unwrap().to_string(), "[102, 103]");
}

#[test]
fn scenarios_over_one_to_five() {
    let cases = [
        (".Where(|x| x % 2 == 1).Select(|x| x * x).ToList()", "[1, 9, 25]"),
        (".Skip(2).Take(10).ToList()", "[3, 4, 5]"),
        (".Reverse().Last()", "1"),
        (".Where(|x| x > 9).All(|x| x < 0)", "true"),
    ];
    for (chain, expected) in cases {
        let source = format!("let xs: ReadOnlySpan<Int> = [1, 2, 3, 4, 5];\nlet r = xs{};", chain);
        assert_eq!(result_of(&source), expected, "{}", chain);
    }
    let r = result_of("let xs: ReadOnlySpan<Int> = [];\nlet r = xs.FirstOrDefault();");
    assert_eq!(r, "0");
}

#[test]
fn negative_counts() {
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let r = xs.Skip(-2).Take(5).ToList();",
    );
    assert_eq!(r, "[1, 2, 3]");
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let r = xs.Take(-1).Count();",
    );
    assert_eq!(r, "0");
}

#[test]
fn negative_counts_after_a_filter() {
    let out = run("let xs: ReadOnlySpan<Int> = [1, 2, 3, 4];
         let a = xs.Where(|x| x > 1).Skip(-2).ToList();
         let b = xs.Where(|x| x > 1).Take(-1).Count();
         let c = xs.Where(|x| x > 0).Take(-9223372036854775807 - 1).ToList();
         let d = xs.Where(|x| x > 0).Take(2).ToList();");
    let shown = |name: &str| out.binding(name).map(|v| v.to_string());
    assert_eq!(shown("a").as_deref(), Some("[2, 3, 4]"));
    assert_eq!(shown("b").as_deref(), Some("0"));
    assert_eq!(shown("c").as_deref(), Some("[]"));
    assert_eq!(shown("d").as_deref(), Some("[1, 2]"));
}

#[test]
fn stalled_calls_keep_the_synthesized_unit() {
    let p = prepare(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let n = xs.Where(|x| x > 1).Count();
         let d = [1, 2].ToDictionary(|x| x);
         let r = d.Where(|x| x);",
        &GeneratorConfig::default(),
    );
    let generated = p.generated.as_ref().expect("view chain synthesized");
    assert_eq!(generated.stats.pending, 1);
    assert_eq!(generated.stats.synthesized, 2);
    assert!(generated.text.contains("struct WhereSpan<"), "{}", generated.text);
    assert_eq!(p.program.errors().len(), 1);
}

#[test]
fn defaults_when_nothing_matches() {
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let r = xs.Where(|x| x > 10).FirstOrDefault();",
    );
    assert_eq!(r, "0");
    let r = result_of(
        "let xs: Span<Bool> = [true];
         let r = xs.LastOrDefault(|b| !b);",
    );
    assert_eq!(r, "false");
}

#[test]
fn first_on_an_empty_view_fails_at_the_call() {
    let source = "let xs: Span<Int> = [];\nlet r = xs.First();";
    let err = prepared(source).program.evaluate().unwrap_err();
    assert_eq!(err.error, EvalError::Query(QueryError::NoElements));
    assert_eq!(&source[err.range], "xs.First()");
}

#[test]
fn single_reports_a_second_match() {
    let source = "let xs: ReadOnlySpan<Int> = [1, 2, 3];\nlet r = xs.Single(|x| x > 1);";
    let err = prepared(source).program.evaluate().unwrap_err();
    assert_eq!(err.error, EvalError::Query(QueryError::MoreThanOneElement));
}

#[test]
fn dictionaries_with_a_key_comparer() {
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let r = xs.ToDictionary(|x| x % 3, |a, b| a == b);",
    );
    assert_eq!(r, "{1: 1, 2: 2, 0: 3}");

    let source = "let xs: ReadOnlySpan<Int> = [1, 4];\nlet r = xs.ToDictionary(|x| x % 3);";
    let err = prepared(source).program.evaluate().unwrap_err();
    assert_eq!(err.error, EvalError::Query(QueryError::DuplicateKey));
}

#[test]
fn contains_with_and_without_a_comparer() {
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let r = xs.Select(|x| x * 2).Contains(4);",
    );
    assert_eq!(r, "true");
    let r = result_of(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let r = xs.Contains(7, |a, b| a % 3 == b % 3);",
    );
    assert_eq!(r, "true");
}

#[test]
fn builtin_only_scripts_need_no_unit() {
    let p = prepared("let xs = [3, 1, 2]; let r = xs.Reverse().ToList();");
    assert!(p.generated.is_none());
    assert_eq!(
        p.program.evaluate().unwrap().binding("r").unwrap().to_string(),
        "[2, 1, 3]"
    );
}

#[test]
fn generation_is_idempotent() {
    let config = GeneratorConfig::default();
    let p = prepared(
        "let xs: Span<Int> = [1, 2];
         let r = xs.Reverse().First();",
    );
    assert!(p.generated.is_some());
    assert!(spanq_gen::run(&p.program, &config).is_none());
}

#[test]
fn shared_operators_are_synthesized_once() {
    let p = prepared(
        "let xs: ReadOnlySpan<Int> = [1, 2, 3];
         let a = xs.Where(|x| x > 1).Count();
         let b = xs.Where(|x| x < 3).Count();",
    );
    let unit = &p.generated.as_ref().unwrap().unit;
    let wheres = unit
        .extensions()
        .filter(|ext| ext.receiver == "ReadOnlySpan" && ext.method == Method::Where)
        .count();
    assert_eq!(wheres, 1);
    let outcome = p.program.evaluate().unwrap();
    assert_eq!(outcome.binding("a").unwrap().to_string(), "2");
    assert_eq!(outcome.binding("b").unwrap().to_string(), "2");
}

#[test]
fn generated_text_carries_the_header() {
    let p = prepared("let xs: ReadOnlySpan<Int> = [1]; let r = xs.Any();");
    let text = &p.generated.as_ref().unwrap().text;
    assert!(text.starts_with("// Generated by spanq. Do not edit.\n"), "{}", text);
    assert!(text.contains("unit SpanLinq {"), "{}", text);
    assert!(text.contains("ext fn Any"), "{}", text);
}

#[test]
fn unresolvable_receivers_stay_errors() {
    let p = prepare(
        "let d = [1, 2].ToDictionary(|x| x); let r = d.Where(|x| x);",
        &GeneratorConfig::default(),
    );
    assert!(p.generated.is_none());
    assert_eq!(p.program.errors().len(), 1);
}
