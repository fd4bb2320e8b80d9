//! Loop guard instrumentation.
//!
//! Every loop statement is rewritten so each iteration compares the elapsed
//! wall-clock time since loop entry against a fixed budget:
//!
//! ```text
//! while (cond) body
//!   ↓
//! {let __loopGuard0 = Date.now();while (cond) {if (Date.now() - __loopGuard0 > 100) { throw ... } body}}
//! ```
//!
//! The check is cooperative: a runaway loop is aborted at the start of the
//! first iteration that begins after the budget expired.
//!
//! Guards are registered once per budget in a process-wide registry, so
//! constructing many transformers never stacks instrumentation.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use oxc::ast::ast::{
    DoWhileStatement, ForInStatement, ForOfStatement, ForStatement, LabeledStatement, Program,
    Statement, WhileStatement,
};
use oxc::ast_visit::{Visit, walk};
use oxc::span::{GetSpan, Span};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Prefix of the per-loop start-time binding.
const GUARD_BINDING: &str = "__loopGuard";

static REGISTRY: LazyLock<Mutex<FxHashMap<u128, Arc<LoopGuard>>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

/// Wall-clock budget applied to every instrumented loop.
#[derive(Debug, PartialEq, Eq)]
pub struct LoopGuard {
    budget: Duration,
}

impl LoopGuard {
    /// Register (or reuse) the guard for `budget`.
    ///
    /// Idempotent: the same budget always yields the same shared guard.
    pub fn register(budget: Duration) -> Arc<Self> {
        let mut registry = REGISTRY.lock();
        let guard = registry.entry(budget.as_millis()).or_insert_with(|| {
            crate::debug!("transform"; "registered loop guard ({}ms)", budget.as_millis());
            Arc::new(Self { budget })
        });
        Arc::clone(guard)
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Return `source` with every loop in `program` instrumented.
    ///
    /// `program` must be the parse of `source`: spans are byte offsets into it.
    pub fn instrument(&self, source: &str, program: &Program<'_>) -> String {
        let mut collector = LoopCollector {
            source,
            budget_ms: self.budget.as_millis(),
            labels: FxHashMap::default(),
            insertions: Vec::new(),
            next_seq: 0,
        };
        collector.visit_program(program);

        if collector.insertions.is_empty() {
            return source.to_string();
        }
        splice(source, collector.insertions)
    }
}

/// 1-based line of a byte offset.
pub(crate) fn line_of(source: &str, offset: u32) -> usize {
    let end = (offset as usize).min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

// ============================================================================
// Insertion plan
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    /// Closing braces come before openings at the same offset.
    Close,
    Open,
}

#[derive(Debug)]
struct Insertion {
    offset: u32,
    edge: Edge,
    /// Preorder index of the owning loop.
    seq: i64,
    /// Wrapper (0) vs body (1) for openings, body (0) vs wrapper (1) for closings.
    part: u8,
    text: String,
}

impl Insertion {
    /// Ordering at a shared offset: inner closings first, outer openings first.
    fn sort_key(&self) -> (u32, Edge, i64, u8) {
        let seq = match self.edge {
            Edge::Close => -self.seq,
            Edge::Open => self.seq,
        };
        (self.offset, self.edge, seq, self.part)
    }
}

fn splice(source: &str, mut insertions: Vec<Insertion>) -> String {
    insertions.sort_by_key(Insertion::sort_key);

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0usize;
    for insertion in insertions {
        let offset = insertion.offset as usize;
        out.push_str(&source[cursor..offset]);
        out.push_str(&insertion.text);
        cursor = offset;
    }
    out.push_str(&source[cursor..]);
    out
}

// ============================================================================
// Collector
// ============================================================================

struct LoopCollector<'s> {
    source: &'s str,
    budget_ms: u128,
    /// Label body start → label start, to wrap labels together with their loop.
    labels: FxHashMap<u32, u32>,
    insertions: Vec<Insertion>,
    next_seq: i64,
}

impl LoopCollector<'_> {
    fn record(&mut self, span: Span, body: &Statement<'_>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let mut start = span.start;
        while let Some(&label_start) = self.labels.get(&start) {
            start = label_start;
        }

        let binding = format!("{GUARD_BINDING}{seq}");
        let line = line_of(self.source, span.start);
        let check = format!(
            "if (Date.now() - {binding} > {}) {{ throw new Error(\"Infinite loop detected on line {line}\"); }}",
            self.budget_ms
        );

        self.push(start, Edge::Open, seq, 0, format!("{{let {binding} = Date.now();"));
        self.push(span.end, Edge::Close, seq, 1, "}".to_string());

        match body {
            Statement::BlockStatement(block) => {
                self.push(block.span.start + 1, Edge::Open, seq, 1, check);
            }
            other => {
                let body_span = other.span();
                self.push(body_span.start, Edge::Open, seq, 1, format!("{{{check}"));
                self.push(body_span.end, Edge::Close, seq, 0, "}".to_string());
            }
        }
    }

    fn push(&mut self, offset: u32, edge: Edge, seq: i64, part: u8, text: String) {
        self.insertions.push(Insertion {
            offset,
            edge,
            seq,
            part,
            text,
        });
    }
}

impl<'a> Visit<'a> for LoopCollector<'_> {
    fn visit_labeled_statement(&mut self, it: &LabeledStatement<'a>) {
        self.labels.insert(it.body.span().start, it.span.start);
        walk::walk_labeled_statement(self, it);
    }

    fn visit_while_statement(&mut self, it: &WhileStatement<'a>) {
        self.record(it.span, &it.body);
        walk::walk_while_statement(self, it);
    }

    fn visit_do_while_statement(&mut self, it: &DoWhileStatement<'a>) {
        self.record(it.span, &it.body);
        walk::walk_do_while_statement(self, it);
    }

    fn visit_for_statement(&mut self, it: &ForStatement<'a>) {
        self.record(it.span, &it.body);
        walk::walk_for_statement(self, it);
    }

    fn visit_for_in_statement(&mut self, it: &ForInStatement<'a>) {
        self.record(it.span, &it.body);
        walk::walk_for_in_statement(self, it);
    }

    fn visit_for_of_statement(&mut self, it: &ForOfStatement<'a>) {
        self.record(it.span, &it.body);
        walk::walk_for_of_statement(self, it);
    }
}
