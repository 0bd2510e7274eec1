// src/progress.rs

//! Client-side progress tracking.
//!
//! On the first successful run of a problem:
//! - the id is added to the solved set
//! - today's entry in the solve log is incremented
//! - a toast is shown and the sidebar is re-annotated
//!
//! The histogram is gated by solved-set membership, not by day: a problem
//! contributes to the log exactly once, on the day it was first solved.
//!
//! Also provides the dashboard numbers (streaks and per-section progress)
//! derived from the same stored data.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::cell::RefCell;

use crate::engine::effects::UiEffect;
use crate::engine::sink::EffectSink;
use crate::store::{KeyValueStore, PreferenceStore, SolveLog, SolvedSet};

pub const SOLVED_MARKER: &str = "✅";
pub const SOLVED_TOAST: &str = "🏆 Problem Solved! Progress Saved.";

/* ---------------- sidebar model ---------------- */

/// A problem link in the sidebar, e.g. `{href: "/problem/two_sum", text: "Two Sum"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarLink {
    pub href: String,
    pub text: String,
}

impl SidebarLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }

    /// Problem id: last path segment of the href.
    pub fn problem_id(&self) -> &str {
        self.href.rsplit('/').next().unwrap_or("")
    }

    pub fn is_marked(&self) -> bool {
        self.text.contains(SOLVED_MARKER)
    }
}

/// A titled group of problem links ("Day 1", "Day 2", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarSection {
    pub title: String,
    pub links: Vec<SidebarLink>,
}

/// Prefix the solved marker onto every solved link not already marked.
///
/// Safe to call repeatedly: a link is never marked twice.
pub fn annotate_links(sections: &mut [SidebarSection], solved: &SolvedSet) {
    for link in sections.iter_mut().flat_map(|s| s.links.iter_mut()) {
        if solved.contains(link.problem_id()) && !link.is_marked() {
            link.text = format!("{} {}", SOLVED_MARKER, link.text);
        }
    }
}

/* ---------------- tracker ---------------- */

pub struct ProgressTracker<S> {
    prefs: PreferenceStore<S>,
    sidebar: RefCell<Vec<SidebarSection>>,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub fn new(prefs: PreferenceStore<S>, sidebar: Vec<SidebarSection>) -> Self {
        Self {
            prefs,
            sidebar: RefCell::new(sidebar),
        }
    }

    /// Record a first-time solve dated today (UTC).
    ///
    /// Returns `false` when the problem was already solved.
    pub fn mark_solved(&self, problem_id: &str, sink: &dyn EffectSink) -> Result<bool> {
        self.mark_solved_on(problem_id, Utc::now().date_naive(), sink)
    }

    pub fn mark_solved_on(
        &self,
        problem_id: &str,
        date: NaiveDate,
        sink: &dyn EffectSink,
    ) -> Result<bool> {
        let mut solved = self.prefs.solved();
        if !solved.insert(problem_id) {
            tracing::debug!(problem_id, "Already solved");
            return Ok(false);
        }

        // The solve is committed only once both the log and the solved set
        // are written; a failed second write rolls the log back.
        let previous_log = self.prefs.solve_log();
        let mut log = previous_log.clone();
        *log.entry(date_key(date)).or_insert(0) += 1;
        self.prefs.save_solve_log(&log)?;

        if let Err(e) = self.prefs.save_solved(&solved) {
            if let Err(undo) = self.prefs.save_solve_log(&previous_log) {
                tracing::warn!(problem_id, error = %undo, "Failed to roll back solve log");
            }
            return Err(e);
        }

        tracing::info!(problem_id, date = %date, solved = solved.len(), "Problem solved");

        sink.emit(UiEffect::Toast(SOLVED_TOAST.to_string()));
        self.annotate_sidebar(sink);

        Ok(true)
    }

    /// Re-derive sidebar markers from the stored solved set and emit the
    /// resulting sidebar.
    pub fn annotate_sidebar(&self, sink: &dyn EffectSink) {
        let solved = self.prefs.solved();
        let sections = {
            let mut sidebar = self.sidebar.borrow_mut();
            annotate_links(&mut sidebar, &solved);
            sidebar.clone()
        };
        sink.emit(UiEffect::Sidebar(sections));
    }

    pub fn prefs(&self) -> &PreferenceStore<S> {
        &self.prefs
    }

    pub fn sidebar(&self) -> Vec<SidebarSection> {
        self.sidebar.borrow().clone()
    }

    pub fn report(&self) -> ProgressReport {
        let solved = self.prefs.solved();
        let log = self.prefs.solve_log();
        ProgressReport::build(&self.sidebar.borrow(), &solved, &log)
    }
}

/// ISO date key used by the solve log.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/* ---------------- statistics ---------------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    /// Consecutive days ending at the latest logged day.
    pub current: u32,
    pub best: u32,
}

/// Compute streaks over the days present in the log.
///
/// Keys that are not valid dates are ignored.
pub fn streaks(log: &SolveLog) -> Streaks {
    let mut days: Vec<NaiveDate> = log
        .keys()
        .filter_map(|k| NaiveDate::parse_from_str(k, "%Y-%m-%d").ok())
        .collect();
    days.sort();

    let mut result = Streaks::default();
    let mut prev: Option<NaiveDate> = None;

    for day in days {
        result.current = match prev {
            Some(p) if (day - p).num_days() == 1 => result.current + 1,
            _ => 1,
        };
        result.best = result.best.max(result.current);
        prev = Some(day);
    }

    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStats {
    pub title: String,
    pub solved: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub sections: Vec<SectionStats>,
    /// Problems listed in the sidebar.
    pub total: usize,
    /// Problems in the solved set (including ones not listed).
    pub solved: usize,
    pub overall_percent: u32,
    pub streaks: Streaks,
}

impl ProgressReport {
    pub fn build(sections: &[SidebarSection], solved: &SolvedSet, log: &SolveLog) -> Self {
        let mut total = 0;
        let stats = sections
            .iter()
            .map(|section| {
                let section_total = section.links.len();
                let section_solved = section
                    .links
                    .iter()
                    .filter(|l| solved.contains(l.problem_id()))
                    .count();
                total += section_total;

                SectionStats {
                    title: section.title.clone(),
                    solved: section_solved,
                    total: section_total,
                    percent: percent(section_solved, section_total),
                }
            })
            .collect();

        Self {
            sections: stats,
            total,
            solved: solved.len(),
            overall_percent: percent(solved.len(), total),
            streaks: streaks(log),
        }
    }
}

/// Whole-number percentage, truncated and capped at 100; 0 when there is
/// nothing to count.
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 100) / whole).min(100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::collecting::CollectingSink;
    use crate::store::{keys, MemoryStore};
    use std::cell::Cell;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sidebar() -> Vec<SidebarSection> {
        vec![
            SidebarSection {
                title: "Day 1".into(),
                links: vec![
                    SidebarLink::new("/problem/two_sum", "Two Sum"),
                    SidebarLink::new("/problem/fizzbuzz", "FizzBuzz"),
                ],
            },
            SidebarSection {
                title: "Day 2".into(),
                links: vec![SidebarLink::new("/problem/reverse", "Reverse")],
            },
        ]
    }

    fn tracker(store: &MemoryStore) -> ProgressTracker<MemoryStore> {
        ProgressTracker::new(PreferenceStore::new(store.clone()), sidebar())
    }

    #[test]
    fn mark_solved_is_idempotent() {
        let store = MemoryStore::new();
        let tracker = tracker(&store);
        let sink = CollectingSink::new();
        let prefs = PreferenceStore::new(store.clone());

        assert!(tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).unwrap());
        assert!(!tracker.mark_solved_on("two_sum", day("2024-03-02"), &sink).unwrap());

        assert_eq!(prefs.solved().len(), 1);
        let log = prefs.solve_log();
        assert_eq!(log.values().sum::<u32>(), 1);
        assert_eq!(log.get("2024-03-01"), Some(&1));

        let toasts = sink
            .effects()
            .into_iter()
            .filter(|e| matches!(e, UiEffect::Toast(_)))
            .count();
        assert_eq!(toasts, 1);
    }

    #[test]
    fn same_day_solves_accumulate() {
        let store = MemoryStore::new();
        let tracker = tracker(&store);
        let sink = CollectingSink::new();

        tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).unwrap();
        tracker.mark_solved_on("reverse", day("2024-03-01"), &sink).unwrap();

        let log = PreferenceStore::new(store).solve_log();
        assert_eq!(log.get("2024-03-01"), Some(&2));
    }

    #[test]
    fn annotation_never_doubles_marker() {
        let store = MemoryStore::new();
        let tracker = tracker(&store);
        let sink = CollectingSink::new();

        tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).unwrap();
        tracker.annotate_sidebar(&sink);
        tracker.annotate_sidebar(&sink);

        let sidebar = tracker.sidebar();
        assert_eq!(sidebar[0].links[0].text, "✅ Two Sum");
        assert_eq!(sidebar[0].links[1].text, "FizzBuzz");
        assert_eq!(sidebar[1].links[0].text, "Reverse");

        match sink.effects().last() {
            Some(UiEffect::Sidebar(sections)) => assert_eq!(sections, &sidebar),
            other => panic!("expected sidebar effect, got {:?}", other),
        }
    }

    /// Memory store whose writes to one key can be made to fail.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: std::rc::Rc<Cell<Option<&'static str>>>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.failing.get() == Some(key) {
                anyhow::bail!("disk full");
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_log_write_leaves_problem_unsolved() {
        let store = FlakyStore::default();
        let prefs = PreferenceStore::new(store.clone());
        let tracker = ProgressTracker::new(prefs.clone(), sidebar());
        let sink = CollectingSink::new();

        store.failing.set(Some(keys::SOLVE_LOG));
        assert!(tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).is_err());
        assert!(prefs.solved().is_empty());
        assert!(sink.effects().is_empty());

        store.failing.set(None);
        assert!(tracker.mark_solved_on("two_sum", day("2024-03-02"), &sink).unwrap());
        assert_eq!(prefs.solve_log().get("2024-03-02"), Some(&1));
    }

    #[test]
    fn failed_solved_write_rolls_back_log() {
        let store = FlakyStore::default();
        let prefs = PreferenceStore::new(store.clone());
        let tracker = ProgressTracker::new(prefs.clone(), sidebar());
        let sink = CollectingSink::new();

        store.failing.set(Some(keys::SOLVED_PROBLEMS));
        assert!(tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).is_err());
        assert!(prefs.solve_log().is_empty());

        // Retrying credits the histogram exactly once.
        store.failing.set(None);
        assert!(tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).unwrap());
        assert_eq!(prefs.solve_log().values().sum::<u32>(), 1);
        assert!(prefs.solved().contains("two_sum"));
    }

    /// Sink that reads the tracker back while handling each effect.
    struct ReadBackSink<'a> {
        tracker: &'a ProgressTracker<MemoryStore>,
        seen: std::cell::RefCell<Vec<Vec<SidebarSection>>>,
    }

    impl EffectSink for ReadBackSink<'_> {
        fn emit(&self, effect: UiEffect) {
            if let UiEffect::Sidebar(_) = effect {
                self.seen.borrow_mut().push(self.tracker.sidebar());
            }
        }
    }

    #[test]
    fn sink_may_read_sidebar_while_handling_effect() {
        let store = MemoryStore::new();
        let tracker = tracker(&store);
        let sink = ReadBackSink {
            tracker: &tracker,
            seen: Default::default(),
        };

        tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).unwrap();

        let seen = sink.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].links[0].text, "✅ Two Sum");
    }

    #[test]
    fn link_problem_id_is_last_segment() {
        assert_eq!(SidebarLink::new("/problem/abc", "x").problem_id(), "abc");
        assert_eq!(SidebarLink::new("abc", "x").problem_id(), "abc");
    }

    #[test]
    fn streaks_follow_consecutive_days() {
        let mut log = SolveLog::new();
        for d in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10", "2024-01-11"] {
            log.insert(d.to_string(), 1);
        }

        assert_eq!(streaks(&log), Streaks { current: 2, best: 3 });
        assert_eq!(streaks(&SolveLog::new()), Streaks::default());
    }

    #[test]
    fn streaks_cross_month_boundaries() {
        let mut log = SolveLog::new();
        log.insert("2024-02-28".into(), 1);
        log.insert("2024-02-29".into(), 3);
        log.insert("2024-03-01".into(), 1);
        log.insert("garbage".into(), 1);

        assert_eq!(streaks(&log), Streaks { current: 3, best: 3 });
    }

    #[test]
    fn report_counts_sections() {
        let store = MemoryStore::new();
        let tracker = tracker(&store);
        let sink = CollectingSink::new();
        tracker.mark_solved_on("two_sum", day("2024-03-01"), &sink).unwrap();

        let report = tracker.report();
        assert_eq!(report.total, 3);
        assert_eq!(report.solved, 1);
        assert_eq!(report.overall_percent, 33);
        assert_eq!(report.sections[0].percent, 50);
        assert_eq!(report.sections[1].percent, 0);
        assert_eq!(report.streaks.current, 1);
    }

    #[test]
    fn date_key_is_iso() {
        assert_eq!(date_key(day("2024-03-05")), "2024-03-05");
    }
}
