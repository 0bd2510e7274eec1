//! Run orchestration.
//!
//! `run` drives one submission through a fixed sequence of UI effects:
//! 1. expand the output panel
//! 2. enter `Submitting`
//! 3. disable the run control ("Running...")
//! 4. show the running placeholder
//! 5. format the editor text (best-effort); a changed text is saved as
//!    the draft, like any other edit
//! 6. read the code
//! 7. emit advisories for discouraged idioms (never blocking)
//! 8. POST the request
//!
//! Settlement renders either the verdict or a system error, records
//! progress on a pass, and then the run guard restores `Idle`.
//!
//! A call made while a run is in flight is skipped outright. There is no
//! cancellation and no timeout: a stalled request keeps the control
//! disabled until the server answers or the transport gives up.

use std::cell::{Cell, RefCell};

use crate::client::ExecutionClient;
use crate::editor::Editor;
use crate::engine::advisory::CodeAdvisor;
use crate::engine::effects::{RunControl, UiEffect};
use crate::engine::guard::RunGuard;
use crate::engine::sink::EffectSink;
use crate::engine::{RunId, RunOutcome, RunState};
use crate::layout::LayoutController;
use crate::progress::ProgressTracker;
use crate::render::{render_verdict, OutputView};
use crate::store::KeyValueStore;
use crate::verdict::RunRequest;

pub struct RunOrchestrator<C, S> {
    problem_id: String,
    state: Cell<RunState>,
    client: C,
    progress: ProgressTracker<S>,
    advisor: CodeAdvisor,
}

impl<C: ExecutionClient, S: KeyValueStore> RunOrchestrator<C, S> {
    pub fn new(
        problem_id: impl Into<String>,
        client: C,
        progress: ProgressTracker<S>,
        advisor: CodeAdvisor,
    ) -> Self {
        Self {
            problem_id: problem_id.into(),
            state: Cell::new(RunState::Idle),
            client,
            progress,
            advisor,
        }
    }

    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn progress(&self) -> &ProgressTracker<S> {
        &self.progress
    }

    #[tracing::instrument(skip_all, fields(problem_id = %self.problem_id))]
    pub async fn run<E: Editor>(
        &self,
        editor: &E,
        layout: &RefCell<LayoutController>,
        sink: &dyn EffectSink,
    ) -> RunOutcome {
        if self.state.get() != RunState::Idle {
            tracing::debug!("Run already in flight; ignoring");
            return RunOutcome::Skipped;
        }

        let expand = layout.borrow_mut().expand_output();
        for effect in expand {
            sink.emit(UiEffect::Layout(effect));
        }

        let Some(_guard) = RunGuard::acquire(&self.state, sink) else {
            return RunOutcome::Skipped;
        };

        sink.emit(UiEffect::RunControl(RunControl::running()));
        sink.emit(UiEffect::Output(OutputView::running()));

        let before = editor.text();
        if let Err(e) = editor.request_format() {
            tracing::debug!(error = %e, "Format action failed; submitting code as-is");
        }

        let code = editor.text();
        if code != before {
            if let Err(e) = self.progress.prefs().save_draft(&self.problem_id, &code) {
                tracing::warn!(error = %e, "Failed to save formatted draft");
            }
        }

        for message in self.advisor.check(&code) {
            sink.emit(UiEffect::Advisory(message));
        }

        let run_id = RunId::new();
        let request = RunRequest {
            code,
            problem_id: self.problem_id.clone(),
        };

        tracing::info!(run_id = %run_id, code_size = request.code.len(), "Submitting code");

        match self.client.execute(&request).await {
            Ok(verdict) => {
                tracing::info!(
                    run_id = %run_id,
                    passed = verdict.passed,
                    cases = verdict.details.len(),
                    "Verdict received"
                );

                sink.emit(UiEffect::Output(render_verdict(&verdict)));

                if verdict.passed {
                    if let Err(e) = self.progress.mark_solved(&self.problem_id, sink) {
                        tracing::warn!(run_id = %run_id, error = %e, "Failed to record progress");
                    }
                    RunOutcome::Passed
                } else {
                    RunOutcome::Failed
                }
            }

            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "Run failed");
                let message = e.to_string();
                sink.emit(UiEffect::Output(OutputView::system_error(message.clone())));
                RunOutcome::SystemError(message)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::{ClientError, TrackSwitch};
    use crate::editor::{BufferEditor, EditorSettings};
    use crate::layout::LayoutEffect;
    use crate::progress::SidebarSection;
    use crate::render::OutputClass;
    use crate::sinks::collecting::CollectingSink;
    use crate::store::{MemoryStore, PreferenceStore};
    use crate::verdict::Verdict;
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    /// Scripted server. Optionally holds the first `execute` open until a
    /// signal arrives.
    #[derive(Default)]
    pub(crate) struct FakeClient {
        pub responses: RefCell<VecDeque<Result<Verdict, ClientError>>>,
        pub tracks: RefCell<VecDeque<Result<TrackSwitch, ClientError>>>,
        pub gate: RefCell<Option<oneshot::Receiver<()>>>,
        pub requests: RefCell<Vec<RunRequest>>,
    }

    impl FakeClient {
        pub fn answering(verdicts: Vec<Result<Verdict, ClientError>>) -> Self {
            Self {
                responses: RefCell::new(verdicts.into()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl ExecutionClient for FakeClient {
        async fn execute(&self, request: &RunRequest) -> Result<Verdict, ClientError> {
            self.requests.borrow_mut().push(request.clone());

            let gate = self.gate.borrow_mut().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }

            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Setup("no scripted response".into())))
        }

        async fn switch_track(&self, _track_id: &str) -> Result<TrackSwitch, ClientError> {
            self.tracks
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Setup("no scripted response".into())))
        }
    }

    pub(crate) fn verdict(v: serde_json::Value) -> Verdict {
        serde_json::from_value(v).unwrap()
    }

    pub(crate) fn passing() -> Verdict {
        verdict(json!({"passed": true, "details": [{"index": 1, "status": "passed"}]}))
    }

    pub(crate) fn failing() -> Verdict {
        verdict(json!({
            "passed": false,
            "details": [{"index": 2, "status": "failed", "input": [1, 2], "expected": "3", "got": "4"}]
        }))
    }

    pub(crate) fn rejected() -> ClientError {
        ClientError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        }
    }

    struct Harness {
        store: MemoryStore,
        orchestrator: RunOrchestrator<FakeClient, MemoryStore>,
        editor: BufferEditor,
        layout: RefCell<LayoutController>,
        sink: CollectingSink,
    }

    fn harness(client: FakeClient) -> Harness {
        let store = MemoryStore::new();
        let prefs = PreferenceStore::new(store.clone());
        let sidebar = vec![SidebarSection {
            title: "Day 1".into(),
            links: vec![crate::progress::SidebarLink::new("/problem/p1", "Sum")],
        }];
        let progress = ProgressTracker::new(prefs.clone(), sidebar);
        let orchestrator = RunOrchestrator::new("p1", client, progress, CodeAdvisor::default());

        let editor = BufferEditor::new(EditorSettings::default());
        editor.set_text("def solve(a, b):\n    return a + b\n");

        let mut layout = LayoutController::new();
        layout.restore(&prefs);

        Harness {
            store,
            orchestrator,
            editor,
            layout: RefCell::new(layout),
            sink: CollectingSink::new(),
        }
    }

    impl Harness {
        async fn run(&self) -> RunOutcome {
            self.orchestrator
                .run(&self.editor, &self.layout, &self.sink)
                .await
        }

        fn draft(&self) -> Option<String> {
            PreferenceStore::new(self.store.clone()).draft("p1")
        }

        fn solved(&self) -> usize {
            PreferenceStore::new(self.store.clone()).solved().len()
        }

        fn finalizers(&self) -> usize {
            self.sink
                .effects()
                .iter()
                .filter(|e| **e == UiEffect::RunControl(RunControl::ready()))
                .count()
        }
    }

    #[tokio::test]
    async fn passing_run_emits_effects_in_order() {
        let h = harness(FakeClient::answering(vec![Ok(passing())]));

        assert_eq!(h.run().await, RunOutcome::Passed);

        let effects = h.sink.effects();
        assert_eq!(effects[0], UiEffect::Layout(LayoutEffect::OutputCollapsed(false)));
        assert_eq!(effects[1], UiEffect::RunControl(RunControl::running()));
        assert_eq!(effects[2], UiEffect::Output(OutputView::running()));
        match &effects[3] {
            UiEffect::Output(view) => {
                assert_eq!(view.class(), Some(OutputClass::Success));
                assert_eq!(view.rows().len(), 1);
            }
            other => panic!("expected results, got {:?}", other),
        }
        assert!(matches!(effects[4], UiEffect::Toast(_)));
        assert!(matches!(effects[5], UiEffect::Sidebar(_)));
        assert_eq!(effects[6], UiEffect::RunControl(RunControl::ready()));
        assert_eq!(effects.len(), 7);

        assert_eq!(h.solved(), 1);
        assert_eq!(h.orchestrator.state(), RunState::Idle);
        assert_eq!(
            h.orchestrator.client().requests.borrow()[0],
            RunRequest {
                code: "def solve(a, b):\n    return a + b\n".into(),
                problem_id: "p1".into(),
            }
        );
    }

    #[tokio::test]
    async fn failing_verdict_leaves_progress_alone() {
        let h = harness(FakeClient::answering(vec![Ok(failing())]));

        assert_eq!(h.run().await, RunOutcome::Failed);
        assert_eq!(h.solved(), 0);
        assert_eq!(h.finalizers(), 1);

        let results = h
            .sink
            .effects()
            .into_iter()
            .find_map(|e| match e {
                UiEffect::Output(view @ OutputView::Results { .. }) => Some(view),
                _ => None,
            })
            .unwrap();
        assert_eq!(results.class(), Some(OutputClass::Failure));
        assert_eq!(results.rows()[0].lines[1].text, "[1,2]");
    }

    #[tokio::test]
    async fn network_rejection_renders_system_error() {
        let h = harness(FakeClient::answering(vec![Err(rejected())]));

        let outcome = h.run().await;
        assert_eq!(
            outcome,
            RunOutcome::SystemError("server responded 502: Bad Gateway".into())
        );

        let effects = h.sink.effects();
        let last_output = effects
            .iter()
            .rev()
            .find_map(|e| match e {
                UiEffect::Output(view) => Some(view.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_output.class(), Some(OutputClass::Error));
        assert_eq!(effects.last(), Some(&UiEffect::RunControl(RunControl::ready())));
        assert_eq!(h.finalizers(), 1);
        assert_eq!(h.orchestrator.state(), RunState::Idle);
        assert_eq!(h.solved(), 0);
    }

    #[tokio::test]
    async fn runs_during_submission_are_not_dispatched() {
        let (tx, rx) = oneshot::channel();
        let client = FakeClient::answering(vec![Ok(passing()), Ok(passing())]);
        *client.gate.borrow_mut() = Some(rx);
        let h = harness(client);

        let (first, (second, third)) = tokio::join!(h.run(), async {
            assert_eq!(h.orchestrator.state(), RunState::Submitting);
            let second = h.run().await;
            let third = h.run().await;
            let _ = tx.send(());
            (second, third)
        });

        assert_eq!(first, RunOutcome::Passed);
        assert_eq!(second, RunOutcome::Skipped);
        assert_eq!(third, RunOutcome::Skipped);
        assert_eq!(h.orchestrator.client().calls(), 1);
        assert_eq!(h.finalizers(), 1);

        // Settled: the next run goes through.
        assert_eq!(h.run().await, RunOutcome::Passed);
        assert_eq!(h.orchestrator.client().calls(), 2);
        assert_eq!(h.finalizers(), 2);
    }

    #[tokio::test]
    async fn advisory_does_not_block_submission() {
        let h = harness(FakeClient::answering(vec![Ok(failing())]));
        h.editor.set_text("def solve(a, b):\n    print(a + b)\n");

        h.run().await;

        let advisories: Vec<_> = h
            .sink
            .effects()
            .into_iter()
            .filter(|e| matches!(e, UiEffect::Advisory(_)))
            .collect();
        assert_eq!(advisories.len(), 1);
        assert_eq!(h.orchestrator.client().calls(), 1);
    }

    struct BrokenFormatter(BufferEditor);

    impl Editor for BrokenFormatter {
        fn text(&self) -> String {
            self.0.text()
        }
        fn set_text(&self, text: &str) {
            self.0.set_text(text)
        }
        fn request_format(&self) -> anyhow::Result<()> {
            anyhow::bail!("format action unavailable")
        }
        fn relayout(&self) {}
    }

    #[tokio::test]
    async fn format_failure_is_ignored() {
        let h = harness(FakeClient::answering(vec![Ok(passing())]));
        let editor = BrokenFormatter(BufferEditor::default());
        editor.set_text("def solve():\n\treturn 1   ");

        let outcome = h.orchestrator.run(&editor, &h.layout, &h.sink).await;

        assert_eq!(outcome, RunOutcome::Passed);
        assert_eq!(
            h.orchestrator.client().requests.borrow()[0].code,
            "def solve():\n\treturn 1   "
        );
        assert_eq!(h.draft(), None);
    }

    #[tokio::test]
    async fn editor_text_is_formatted_before_submit() {
        let h = harness(FakeClient::answering(vec![Ok(passing())]));
        h.editor.set_text("def solve():\n\treturn 1   ");

        h.run().await;

        assert_eq!(
            h.orchestrator.client().requests.borrow()[0].code,
            "def solve():\n    return 1"
        );
        assert_eq!(h.draft().as_deref(), Some("def solve():\n    return 1"));
    }

    #[tokio::test]
    async fn unchanged_text_is_not_resaved() {
        let h = harness(FakeClient::answering(vec![Ok(passing())]));

        h.run().await;

        assert_eq!(h.draft(), None);
    }

    #[tokio::test]
    async fn dropped_run_still_finalizes_once() {
        let (_tx, rx) = oneshot::channel::<()>();
        let client = FakeClient::answering(vec![Ok(passing())]);
        *client.gate.borrow_mut() = Some(rx);
        let h = harness(client);

        {
            let run = h.run();
            tokio::pin!(run);
            tokio::select! {
                biased;
                _ = &mut run => panic!("run settled while the server was held"),
                _ = std::future::ready(()) => {}
            }
            assert_eq!(h.orchestrator.state(), RunState::Submitting);
            assert_eq!(h.finalizers(), 0);
        }

        assert_eq!(h.orchestrator.state(), RunState::Idle);
        assert_eq!(h.finalizers(), 1);
        assert_eq!(
            h.sink.effects().last(),
            Some(&UiEffect::RunControl(RunControl::ready()))
        );

        // The handle is usable again.
        assert_eq!(h.run().await, RunOutcome::Passed);
        assert_eq!(h.finalizers(), 2);
    }

    #[tokio::test]
    async fn repeated_passes_count_once() {
        let h = harness(FakeClient::answering(vec![Ok(passing()), Ok(passing())]));

        h.run().await;
        h.run().await;

        assert_eq!(h.solved(), 1);
        let log = PreferenceStore::new(h.store.clone()).solve_log();
        assert_eq!(log.values().sum::<u32>(), 1);

        let toasts = h
            .sink
            .effects()
            .into_iter()
            .filter(|e| matches!(e, UiEffect::Toast(_)))
            .count();
        assert_eq!(toasts, 1);
    }

    #[tokio::test]
    async fn expanded_output_is_not_re_expanded() {
        let h = harness(FakeClient::answering(vec![Ok(failing())]));
        h.layout.borrow_mut().expand_output();

        h.run().await;

        assert!(!h
            .sink
            .effects()
            .iter()
            .any(|e| matches!(e, UiEffect::Layout(_))));
    }
}
