//! Round-loop behavior against a scripted host.
//!
//! The mock host models programs as method chains over a root expression of
//! a named type. A call resolves when its receiver type is `List` (every
//! operator is builtin there) or when the installed unit has a matching
//! extension; its static type is the head of the overload's return type.

use rowan::TextRange;
use spanq_common::ty::Ty;
use spanq_gen::{
    run, ArgShape, CallSite, GeneratorConfig, Method, ProgramImage, Symbol, SyntheticUnit,
};

#[derive(Clone)]
struct Chain {
    root: &'static str,
    calls: Vec<(&'static str, Vec<ArgShape>)>,
}

#[derive(Clone)]
struct MockImage {
    chains: Vec<Chain>,
    unit: Option<SyntheticUnit>,
}

fn chain(root: &'static str, calls: &[(&'static str, &[ArgShape])]) -> Chain {
    Chain {
        root,
        calls: calls
            .iter()
            .map(|(name, args)| (*name, args.to_vec()))
            .collect(),
    }
}

fn program(chains: Vec<Chain>) -> MockImage {
    MockImage {
        chains,
        unit: None,
    }
}

const STRIDE: u32 = 1000;

fn root_range(chain: usize) -> TextRange {
    let base = chain as u32 * STRIDE;
    TextRange::new(base.into(), (base + 1).into())
}

fn call_range(chain: usize, index: usize) -> TextRange {
    let base = chain as u32 * STRIDE;
    TextRange::new(base.into(), (base + 2 + index as u32).into())
}

impl MockImage {
    fn locate(&self, range: TextRange) -> Option<(usize, Option<usize>)> {
        let chain = (u32::from(range.start()) / STRIDE) as usize;
        if chain >= self.chains.len() {
            return None;
        }
        if range == root_range(chain) {
            return Some((chain, None));
        }
        let index = (u32::from(range.end()) - chain as u32 * STRIDE - 2) as usize;
        (index < self.chains[chain].calls.len()).then_some((chain, Some(index)))
    }

    /// Head of the type of the expression at `(chain, call)`.
    fn type_head(&self, chain: usize, call: Option<usize>) -> Option<String> {
        let Some(index) = call else {
            return Some(self.chains[chain].root.to_string());
        };
        self.bind(chain, index).map(|(_, head)| head)
    }

    fn bind(&self, chain: usize, index: usize) -> Option<(Symbol, String)> {
        let receiver = if index == 0 { None } else { Some(index - 1) };
        let receiver_head = self.type_head(chain, receiver)?;
        let (name, args) = &self.chains[chain].calls[index];
        if receiver_head == "List" {
            let method = Method::from_name(name)?;
            let head = if method.produces_sequence() { "List" } else { "Int" };
            let symbol = Symbol::Builtin {
                owner: "List".into(),
                name: name.to_string(),
            };
            return Some((symbol, head.to_string()));
        }
        let ext = self
            .unit
            .as_ref()?
            .find_extension(&receiver_head, name, args)?;
        let head = ext.ret.head().unwrap_or("T").to_string();
        let symbol = Symbol::Extension {
            receiver: receiver_head,
            name: name.to_string(),
        };
        Some((symbol, head))
    }
}

impl ProgramImage for MockImage {
    fn call_sites(&self) -> Vec<CallSite> {
        let mut sites = Vec::new();
        for (c, chain) in self.chains.iter().enumerate() {
            for (i, (name, _)) in chain.calls.iter().enumerate().rev() {
                let receiver = if i == 0 {
                    root_range(c)
                } else {
                    call_range(c, i - 1)
                };
                sites.push(CallSite {
                    range: call_range(c, i),
                    name: name.to_string(),
                    name_range: call_range(c, i),
                    receiver,
                });
            }
        }
        sites
    }

    fn resolve(&self, call: TextRange) -> Option<Symbol> {
        let (chain, index) = self.locate(call)?;
        self.bind(chain, index?).map(|(symbol, _)| symbol)
    }

    fn static_type_of(&self, expr: TextRange) -> Option<Ty> {
        let (chain, index) = self.locate(expr)?;
        self.type_head(chain, index).map(|head| Ty::app(head, vec![]))
    }

    fn with_unit(&self, unit: &SyntheticUnit) -> Self {
        MockImage {
            chains: self.chains.clone(),
            unit: Some(unit.clone()),
        }
    }
}

const PRED: &[ArgShape] = &[ArgShape::Closure(1)];
const VALUE: &[ArgShape] = &[ArgShape::Value];
const NONE: &[ArgShape] = &[];

fn all_resolve(image: &MockImage) -> bool {
    image
        .call_sites()
        .iter()
        .all(|site| image.resolve(site.range).is_some())
}

#[test]
fn wrapper_chain_completes_in_one_round() {
    let image = program(vec![chain(
        "ReadOnlySpan",
        &[("Where", PRED), ("Select", PRED), ("Count", NONE)],
    )]);
    let generated = run(&image, &GeneratorConfig::default()).unwrap();
    assert_eq!(generated.stats.rounds, 1);
    assert_eq!(generated.stats.scanned, 3);
    assert_eq!(generated.stats.pending, 0);
    assert_eq!(generated.stats.synthesized, 3);
    assert!(generated.unit.find_struct("WhereSpan").is_some());
    assert!(generated.unit.find_struct("SelectWhereSpan").is_some());
    assert!(all_resolve(&image.with_unit(&generated.unit)));
}

#[test]
fn calls_on_slices_of_mutable_views_wait_one_round() {
    let image = program(vec![chain("Span", &[("Take", VALUE), ("Count", NONE)])]);
    let generated = run(&image, &GeneratorConfig::default()).unwrap();
    assert_eq!(generated.stats.rounds, 2);
    assert_eq!(generated.stats.pending, 0);
    // Span/Take, Span/Count and the read-only Count it forwards to.
    assert_eq!(generated.stats.synthesized, 3);
    assert!(generated
        .unit
        .find_extension("ReadOnlySpan", "Count", &[])
        .is_some());
    assert!(all_resolve(&image.with_unit(&generated.unit)));
}

#[test]
fn round_limit_stops_early() {
    let image = program(vec![chain("Span", &[("Take", VALUE), ("Count", NONE)])]);
    let config = GeneratorConfig {
        max_rounds: Some(1),
        ..GeneratorConfig::default()
    };
    let generated = run(&image, &config).unwrap();
    assert_eq!(generated.stats.rounds, 1);
    assert_eq!(generated.stats.pending, 1);
    assert!(generated.unit.find_extension("Span", "Count", &[]).is_none());
}

#[test]
fn builtin_receivers_need_nothing() {
    let image = program(vec![chain("List", &[("Where", PRED), ("Count", NONE)])]);
    assert!(run(&image, &GeneratorConfig::default()).is_none());
}

#[test]
fn unknown_receivers_are_left_alone() {
    let image = program(vec![chain("Int", &[("Count", NONE)])]);
    assert!(run(&image, &GeneratorConfig::default()).is_none());
}

#[test]
fn shared_pairs_are_synthesized_once() {
    let image = program(vec![
        chain("ReadOnlySpan", &[("Where", PRED), ("Count", NONE)]),
        chain("ReadOnlySpan", &[("Where", PRED), ("First", NONE)]),
        chain("Span", &[("Where", PRED)]),
    ]);
    let generated = run(&image, &GeneratorConfig::default()).unwrap();
    let wheres = generated
        .unit
        .extensions()
        .filter(|ext| ext.method == Method::Where)
        .count();
    assert_eq!(wheres, 2);
    assert_eq!(
        generated
            .unit
            .structs()
            .filter(|s| s.name == "WhereSpan")
            .count(),
        1
    );
    assert!(all_resolve(&image.with_unit(&generated.unit)));
}

#[test]
fn rerunning_with_the_unit_installed_is_a_no_op() {
    let image = program(vec![chain(
        "Span",
        &[("Skip", VALUE), ("Where", PRED), ("ToList", NONE)],
    )]);
    let generated = run(&image, &GeneratorConfig::default()).unwrap();
    let completed = image.with_unit(&generated.unit);
    assert!(run(&completed, &GeneratorConfig::default()).is_none());
}

#[test]
fn unit_name_and_text_follow_config() {
    let image = program(vec![chain("ReadOnlySpan", &[("Any", NONE)])]);
    let config = GeneratorConfig {
        unit_name: "Queries".into(),
        ..GeneratorConfig::default()
    };
    let generated = run(&image, &config).unwrap();
    assert_eq!(generated.unit.name(), "Queries");
    assert!(generated.text.starts_with("// Generated by spanq. Do not edit.\nunit Queries {\n"));
    assert!(generated.text.ends_with("}\n"));
    assert!(generated.text.lines().all(|l| l == l.trim_end()));
}

#[test]
fn stalled_candidates_still_emit_what_was_synthesized() {
    let image = program(vec![
        chain("ReadOnlySpan", &[("Where", PRED), ("Count", NONE)]),
        chain("Dictionary", &[("Where", PRED)]),
    ]);
    let generated = run(&image, &GeneratorConfig::default()).unwrap();
    assert_eq!(generated.stats.rounds, 2);
    assert_eq!(generated.stats.scanned, 3);
    assert_eq!(generated.stats.pending, 1);
    assert_eq!(generated.stats.synthesized, 2);
    assert!(generated.unit.find_struct("WhereSpan").is_some());
    assert!(generated.text.contains("WhereSpan"));
}
