//! The round loop.
//!
//! Each round probes every pending candidate against the current program
//! image, synthesizes what can be synthesized, then rebuilds the image from
//! the original program plus the grown unit. The loop ends when a round
//! leaves the pending count unchanged or nothing is pending.
//!
//! A call whose receiver is itself an unresolved call is handled in the
//! same round when the inner result is a generated wrapper: its shape is
//! known without asking the host. When the inner result is a builtin view
//! (in-place slicing), the outer call waits one round for the host to see
//! the inner call resolve.

use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use crate::config::GeneratorConfig;
use crate::host::ProgramImage;
use crate::request::SynthesisRequest;
use crate::scan::{self, Candidate};
use crate::shape::Shape;
use crate::synth;
use crate::unit::{Assembly, GeneratedUnit, RunStats};

/// What the host said about a candidate at the start of a round.
#[derive(Debug, Clone, PartialEq)]
struct Probe {
    resolved: bool,
    receiver_shape: Option<Shape>,
}

/// What became of a candidate within a round.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    /// The host already binds the call.
    Resolved,
    /// Declarations exist now; carries the produced shape, if any.
    Synthesized(Option<Shape>),
    /// The receiver is an in-place slice synthesized this round.
    Deferred,
    /// The receiver's shape is unknown.
    Unknown,
}

impl Outcome {
    fn is_done(&self) -> bool {
        matches!(self, Outcome::Resolved | Outcome::Synthesized(_))
    }
}

/// Drives synthesis for one program.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Synthesize every operator `original` is missing.
    ///
    /// Returns `None` when nothing needed synthesis.
    pub fn run<I: ProgramImage>(&self, original: &I) -> Option<GeneratedUnit> {
        let candidates = scan::scan(original);
        let mut pending: Vec<usize> = candidates.iter().map(|c| c.id).collect();
        let mut registry = Registry::new();
        let mut assembly = Assembly::new();
        let mut current: Option<I> = None;
        let mut rounds = 0;

        debug!(target: "spanq::driver", candidates = candidates.len(), "scanned");

        while !pending.is_empty() {
            if self.config.max_rounds.is_some_and(|max| rounds >= max) {
                debug!(target: "spanq::driver", rounds, "round limit reached");
                break;
            }
            rounds += 1;

            let image = current.as_ref().unwrap_or(original);
            let probes = probe(image, &candidates, &pending, &registry);
            let mut round = Round {
                candidates: &candidates,
                probes: &probes,
                registry: &mut registry,
                assembly: &mut assembly,
                outcomes: FxHashMap::default(),
            };
            let remaining: Vec<usize> = pending
                .iter()
                .copied()
                .filter(|&id| !round.outcome(id).is_done())
                .collect();

            debug!(
                target: "spanq::driver",
                round = rounds,
                before = pending.len(),
                after = remaining.len(),
                decls = assembly.decls().len(),
                "round finished"
            );

            let progressed = remaining.len() != pending.len();
            pending = remaining;
            if pending.is_empty() || !progressed {
                break;
            }
            current = Some(original.with_unit(&assembly.snapshot(&self.config.unit_name)));
        }

        let stats = RunStats {
            rounds,
            scanned: candidates.len(),
            pending: pending.len(),
            synthesized: assembly.pair_count(),
        };
        info!(
            target: "spanq::driver",
            rounds = stats.rounds,
            synthesized = stats.synthesized,
            pending = stats.pending,
            "generation finished"
        );

        if assembly.is_empty() {
            return None;
        }
        let unit = assembly.snapshot(&self.config.unit_name);
        let text = unit.render(&self.config.emit);
        Some(GeneratedUnit { unit, text, stats })
    }
}

/// Run a [`Generator`] with `config` over `image`.
pub fn run<I: ProgramImage>(image: &I, config: &GeneratorConfig) -> Option<GeneratedUnit> {
    Generator::new(config.clone()).run(image)
}

/// Shapes the host may report as static types: the two builtin views and
/// every generated wrapper.
#[derive(Debug)]
struct Registry {
    shapes: FxHashMap<String, Shape>,
}

impl Registry {
    fn new() -> Self {
        let mut shapes = FxHashMap::default();
        for shape in [Shape::span(), Shape::read_only_span()] {
            shapes.insert(shape.name.clone(), shape);
        }
        Self { shapes }
    }

    fn get(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    fn register(&mut self, shape: &Shape) {
        if !shape.is_view() {
            self.shapes
                .entry(shape.name.clone())
                .or_insert_with(|| shape.clone());
        }
    }
}

/// Probe every pending candidate and every candidate in their receiver
/// chains.
fn probe<I: ProgramImage>(
    image: &I,
    candidates: &[Candidate],
    pending: &[usize],
    registry: &Registry,
) -> FxHashMap<usize, Probe> {
    let mut probes = FxHashMap::default();
    for &start in pending {
        let mut next = Some(start);
        while let Some(id) = next {
            if probes.contains_key(&id) {
                break;
            }
            let candidate = &candidates[id];
            let receiver_shape = image
                .static_type_of(candidate.call.receiver)
                .and_then(|ty| ty.head().and_then(|name| registry.get(name)).cloned());
            probes.insert(
                id,
                Probe {
                    resolved: image.resolve(candidate.call.range).is_some(),
                    receiver_shape,
                },
            );
            next = candidate.receiver_call;
        }
    }
    probes
}

struct Round<'a> {
    candidates: &'a [Candidate],
    probes: &'a FxHashMap<usize, Probe>,
    registry: &'a mut Registry,
    assembly: &'a mut Assembly,
    outcomes: FxHashMap<usize, Outcome>,
}

impl Round<'_> {
    fn outcome(&mut self, id: usize) -> Outcome {
        if let Some(outcome) = self.outcomes.get(&id) {
            return outcome.clone();
        }
        let outcome = self.decide(id);
        trace!(
            target: "spanq::driver",
            id,
            method = %self.candidates[id].method,
            ?outcome,
            "candidate"
        );
        self.outcomes.insert(id, outcome.clone());
        outcome
    }

    fn decide(&mut self, id: usize) -> Outcome {
        let probes = self.probes;
        let Some(probe) = probes.get(&id) else {
            return Outcome::Unknown;
        };
        if probe.resolved {
            return Outcome::Resolved;
        }
        if let Some(shape) = probe.receiver_shape.clone() {
            return self.synthesize(id, shape);
        }
        let Some(inner) = self.candidates[id].receiver_call else {
            return Outcome::Unknown;
        };
        match self.outcome(inner) {
            Outcome::Synthesized(Some(shape)) if shape.is_view() => Outcome::Deferred,
            Outcome::Synthesized(Some(shape)) => self.synthesize(id, shape),
            _ => Outcome::Unknown,
        }
    }

    fn synthesize(&mut self, id: usize, receiver: Shape) -> Outcome {
        let request = SynthesisRequest::new(receiver, self.candidates[id].method);
        synth::generate(self.assembly, &request);
        let result = request.result_shape().cloned();
        if let Some(shape) = &result {
            self.registry.register(shape);
        }
        Outcome::Synthesized(result)
    }
}
