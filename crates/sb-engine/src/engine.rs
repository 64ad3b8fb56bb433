use chrono::Utc;

use sb_expr::Value;
use sb_graph::{Choice, ChoiceId, NodeId, SceneNode, StoryGraph, StoryNode};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::event::{EventBus, EventKind, StoryEvent, StoryEventKind, SubscriptionId};
use crate::state::{CharacterState, HistoryEntry, RuntimeState};
use crate::typewriter::Typewriter;

/// Where playback currently stands.
///
/// Not to be confused with node variants: this is the state of the overall
/// playback machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before `start()` or after `destroy()`.
    Idle,
    /// A dialogue line is revealing.
    Dialogue,
    /// The current line is fully revealed; waiting for `advance()`.
    AwaitingInput,
    /// Choices are presented; waiting for `select_choice()`.
    Choices,
    /// An end node was reached.
    Ended,
    /// A content error stopped traversal; see the returned error.
    Halted,
}

/// The story interpreter.
///
/// Owns the (immutable) graph and the (mutable) runtime state, resolves
/// edges through the condition evaluator, drives the typewriter/auto-play/
/// skip scheduling, and emits [`StoryEvent`]s. All scheduling runs on a
/// virtual clock: the host calls [`update`](StoryEngine::update) with
/// elapsed seconds, and the engine's timers are plain data — cancellable
/// synchronously and testable without wall-clock waits.
///
/// Single-threaded and cooperative by design. External collaborators never
/// hold a live reference to the runtime state; they get deep copies via
/// [`snapshot`](StoryEngine::snapshot).
pub struct StoryEngine {
    graph: StoryGraph,
    config: EngineConfig,
    state: RuntimeState,
    phase: Phase,
    typewriter: Option<Typewriter>,
    /// Seconds until auto-play advances; `None` when disarmed.
    auto_play_remaining: Option<f64>,
    /// Choice ids presented to the player, frozen at show time so that
    /// selection indexes stay stable even if variables change in between.
    presented_choices: Vec<ChoiceId>,
    bus: EventBus,
}

impl std::fmt::Debug for StoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryEngine")
            .field("phase", &self.phase)
            .field("current_node", &self.state.current_node)
            .field("dialogue_index", &self.state.dialogue_index)
            .finish()
    }
}

impl StoryEngine {
    /// Create an engine for a loaded graph with default configuration.
    pub fn new(graph: StoryGraph) -> Self {
        Self::with_config(graph, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(graph: StoryGraph, config: EngineConfig) -> Self {
        Self {
            graph,
            config,
            state: RuntimeState {
                text_speed: 0.5,
                ..RuntimeState::default()
            },
            phase: Phase::Idle,
            typewriter: None,
            auto_play_remaining: None,
            presented_choices: Vec::new(),
            bus: EventBus::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe to one event kind.
    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&StoryEvent) + 'static,
    ) -> SubscriptionId {
        self.bus.on(kind, listener)
    }

    /// Subscribe to every event kind.
    pub fn on_any(&mut self, listener: impl FnMut(&StoryEvent) + 'static) -> SubscriptionId {
        self.bus.on_any(listener)
    }

    /// Remove a subscription.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    // -----------------------------------------------------------------------
    // Playback control
    // -----------------------------------------------------------------------

    /// Begin a fresh playthrough from the start node.
    ///
    /// Resets the runtime state (player settings survive), begins playtime
    /// tracking, and immediately advances past the start node — start nodes
    /// are never displayed.
    pub fn start(&mut self) -> EngineResult<()> {
        self.cancel_all();
        self.state = self.state.fresh();
        self.phase = Phase::Idle;
        let start = self.graph.start().clone();
        self.state.current_node = Some(start.clone());
        self.resolve_flow(&start)
    }

    /// Player input (or auto-advance): complete the current reveal, or move
    /// to the next line/choices/node.
    ///
    /// Reentrant-safe and idempotent in "nothing to advance" states: while
    /// paused, idle, presenting choices, ended, or halted this is a no-op,
    /// not an error.
    pub fn advance(&mut self) -> EngineResult<()> {
        if self.state.is_paused {
            return Ok(());
        }
        match self.phase {
            Phase::Idle | Phase::Choices | Phase::Ended | Phase::Halted => Ok(()),
            Phase::Dialogue => {
                // Skip the reveal before skipping the line.
                self.cancel_auto_play();
                self.finish_line();
                Ok(())
            }
            Phase::AwaitingInput => {
                self.cancel_auto_play();
                self.advance_cursor()
            }
        }
    }

    /// Select a choice by index into the presented (condition-filtered)
    /// list. Out-of-range indices are a strict no-op.
    pub fn select_choice(&mut self, index: usize) -> EngineResult<()> {
        if self.state.is_paused || self.phase != Phase::Choices {
            return Ok(());
        }
        let Some(choice_id) = self.presented_choices.get(index).cloned() else {
            return Ok(());
        };
        let Some(node) = self.state.current_node.clone() else {
            return Ok(());
        };
        let Some(choice) = self
            .current_scene()
            .and_then(|scene| scene.choices.iter().find(|c| c.id == choice_id))
            .cloned()
        else {
            return Ok(());
        };

        self.cancel_auto_play();
        self.state.record_choice(node.clone(), choice_id.clone());
        self.emit(StoryEventKind::ChoiceSelected {
            node: node.clone(),
            choice: choice_id.clone(),
            text: choice.text.clone(),
        });

        let target = choice.target.clone().or_else(|| {
            self.graph
                .choice_edge_for(&node, &choice_id)
                .map(|edge| edge.to.clone())
        });
        match target {
            Some(target) => {
                self.presented_choices.clear();
                self.enter_node(target)?;
                // Skip stays active across the choice: carry on to the next
                // stop rather than demanding one advance per line.
                if self.state.skip_mode {
                    self.run_skip()?;
                }
                Ok(())
            }
            None => {
                tracing::error!(%node, %choice_id, "choice has no resolvable target; halting");
                self.phase = Phase::Halted;
                Err(EngineError::ChoiceTargetUnresolved {
                    node,
                    choice: choice_id,
                })
            }
        }
    }

    /// Advance the virtual clock by `dt` seconds.
    ///
    /// Drives playtime accumulation, the typewriter reveal, and the
    /// auto-play countdown. Time does not pass while paused, idle, ended,
    /// or halted.
    pub fn update(&mut self, dt: f64) -> EngineResult<()> {
        if self.state.is_paused
            || matches!(self.phase, Phase::Idle | Phase::Ended | Phase::Halted)
        {
            return Ok(());
        }
        self.state.playtime_seconds += dt;

        // Auto-play first: a timer armed by a completion later in this same
        // update must wait a full delay, not fire immediately. When the
        // timer fires mid-update, only the portion of `dt` past the
        // deadline belongs to the line it starts.
        let mut reveal_dt = dt;
        if let Some(remaining) = &mut self.auto_play_remaining {
            *remaining -= dt;
            if *remaining <= 0.0 {
                reveal_dt = -*remaining;
                self.auto_play_remaining = None;
                self.advance()?;
            }
        }

        if self.phase == Phase::Dialogue {
            let newly_complete = match &mut self.typewriter {
                Some(tw) => tw.tick(reveal_dt),
                None => false,
            };
            if newly_complete {
                self.finish_line();
            }
        }
        Ok(())
    }

    /// Pause playback: suspends advancement, timers, and playtime.
    pub fn pause(&mut self) {
        if !self.state.is_paused {
            self.state.is_paused = true;
            self.emit(StoryEventKind::Paused);
        }
    }

    /// Resume paused playback. No effect after the story has ended.
    pub fn resume(&mut self) {
        if self.state.is_paused && self.phase != Phase::Ended {
            self.state.is_paused = false;
            self.emit(StoryEventKind::Resumed);
        }
    }

    /// Tear the engine down: cancels all timers and drops all
    /// subscriptions. The engine returns to `Idle` and can be restarted.
    pub fn destroy(&mut self) {
        self.cancel_all();
        self.bus = EventBus::new();
        self.phase = Phase::Idle;
        self.state.is_paused = false;
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Set a story variable. Setting `Value::Undefined` removes the key,
    /// so the store never persists absent values.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        match value.into() {
            Value::Undefined => {
                self.state.variables.remove(&name);
            }
            value => {
                self.state.variables.insert(name, value);
            }
        }
    }

    /// Read a story variable; unset variables are `Value::Undefined`.
    pub fn get_variable(&self, name: &str) -> Value {
        self.state
            .variables
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Set the text reveal speed in `[0, 1]` (clamped). At exactly 1.0 the
    /// current and future lines reveal instantly.
    pub fn set_text_speed(&mut self, speed: f64) {
        self.state.text_speed = speed.clamp(0.0, 1.0);
        if self.state.text_speed >= 1.0 && self.phase == Phase::Dialogue {
            self.finish_line();
        }
    }

    /// Toggle auto-play. Turning it off cancels any pending auto-advance
    /// synchronously; turning it on while a completed line is waiting arms
    /// the timer.
    pub fn set_auto_play(&mut self, on: bool) {
        self.state.auto_play = on;
        if !on {
            self.cancel_auto_play();
        } else if self.phase == Phase::AwaitingInput && !self.choices_pending() {
            self.auto_play_remaining = Some(self.config.auto_play_delay);
        }
    }

    /// Toggle skip mode. Enabling it drives a bounded advance loop until
    /// choices are presented, an end node is reached, or the iteration cap
    /// is hit (the cap guarantees termination on cyclic graphs).
    pub fn set_skip_mode(&mut self, on: bool) -> EngineResult<()> {
        self.state.skip_mode = on;
        if on { self.run_skip() } else { Ok(()) }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// The playback phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The loaded graph.
    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// A deep copy of the runtime state for external readers.
    pub fn snapshot(&self) -> RuntimeState {
        self.state.clone()
    }

    /// The revealed prefix of the current line.
    pub fn displayed_text(&self) -> &str {
        self.typewriter
            .as_ref()
            .map(Typewriter::displayed_text)
            .unwrap_or_default()
    }

    /// The full authored text of the current line.
    pub fn target_text(&self) -> &str {
        self.typewriter
            .as_ref()
            .map(Typewriter::target_text)
            .unwrap_or_default()
    }

    /// True once the displayed text equals the authored text.
    pub fn is_text_complete(&self) -> bool {
        self.typewriter.as_ref().is_none_or(Typewriter::is_complete)
    }

    /// The choices currently presented to the player (condition-filtered,
    /// authored order). Empty outside the choice phase.
    pub fn current_choices(&self) -> Vec<Choice> {
        if self.phase != Phase::Choices {
            return Vec::new();
        }
        let Some(scene) = self.current_scene() else {
            return Vec::new();
        };
        self.presented_choices
            .iter()
            .filter_map(|id| scene.choices.iter().find(|c| &c.id == id))
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Save / restore seam
    // -----------------------------------------------------------------------

    /// Produce a plain, serializable snapshot for the persistence layer.
    pub fn create_save_snapshot(&mut self) -> RuntimeState {
        let snapshot = self.state.clone();
        self.emit(StoryEventKind::StateSaved);
        snapshot
    }

    /// Resume exactly where a snapshot was taken.
    ///
    /// The playback phase is re-derived from graph + state: a mid-dialogue
    /// snapshot restarts the current line's reveal (without re-appending it
    /// to the history backlog), a post-dialogue snapshot re-presents the
    /// choices.
    pub fn restore_state(&mut self, snapshot: RuntimeState) -> EngineResult<()> {
        if let Some(node) = &snapshot.current_node
            && self.graph.node(node).is_none()
        {
            return Err(EngineError::NodeNotFound(node.clone()));
        }

        self.cancel_all();
        self.state = snapshot;
        self.emit(StoryEventKind::StateRestored);

        let Some(node) = self.state.current_node.clone() else {
            self.phase = Phase::Idle;
            return Ok(());
        };
        // Endpoint checked above.
        let Some(story_node) = self.graph.node(&node).cloned() else {
            return Err(EngineError::NodeNotFound(node));
        };
        match story_node {
            StoryNode::End(_) => {
                self.phase = Phase::Ended;
            }
            StoryNode::Start => {
                self.phase = Phase::AwaitingInput;
            }
            StoryNode::Scene(scene) => {
                if self.state.dialogue_index < scene.dialogues.len() {
                    self.begin_line(false);
                } else if self.visible_choices().is_empty() {
                    self.phase = Phase::AwaitingInput;
                } else {
                    self.present_choices();
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Traversal internals
    // -----------------------------------------------------------------------

    fn current_scene(&self) -> Option<&SceneNode> {
        let node = self.state.current_node.as_ref()?;
        self.graph.node(node)?.as_scene()
    }

    fn emit(&mut self, kind: StoryEventKind) {
        let event = StoryEvent::new(kind);
        self.bus.emit(&event);
    }

    fn cancel_auto_play(&mut self) {
        self.auto_play_remaining = None;
    }

    fn cancel_all(&mut self) {
        self.typewriter = None;
        self.auto_play_remaining = None;
        self.presented_choices.clear();
    }

    fn evaluate_condition(&self, condition: Option<&str>) -> bool {
        let Some(condition) = condition else {
            return true;
        };
        match sb_expr::try_evaluate(condition, &self.state.variables) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                // Fail closed: a malformed condition never passes.
                tracing::warn!(condition, %err, "condition failed to evaluate");
                false
            }
        }
    }

    fn visible_choices(&self) -> Vec<Choice> {
        let Some(scene) = self.current_scene() else {
            return Vec::new();
        };
        scene
            .choices
            .iter()
            .filter(|c| self.evaluate_condition(c.condition.as_deref()))
            .cloned()
            .collect()
    }

    /// True when the current line is the scene's last and visible choices
    /// would follow it — the case where auto-play must not arm.
    fn choices_pending(&self) -> bool {
        let Some(scene) = self.current_scene() else {
            return false;
        };
        self.state.dialogue_index + 1 >= scene.dialogues.len()
            && !self.visible_choices().is_empty()
    }

    /// Resolve the outgoing flow edge of `from`: first edge (in resolution
    /// order) whose condition passes wins. No passing edge is a content
    /// error — the engine halts rather than guessing a target.
    fn resolve_flow(&mut self, from: &NodeId) -> EngineResult<()> {
        let target = self
            .graph
            .flow_edges_from(from)
            .into_iter()
            .find(|edge| self.evaluate_condition(edge.condition.as_deref()))
            .map(|edge| edge.to.clone());
        match target {
            Some(target) => self.enter_node(target),
            None => {
                tracing::error!(node = %from, "no valid flow edge; halting");
                self.phase = Phase::Halted;
                Err(EngineError::NoValidEdge(from.clone()))
            }
        }
    }

    fn enter_node(&mut self, id: NodeId) -> EngineResult<()> {
        // Exit event for the scene being left.
        if let Some(prev) = self.state.current_node.clone()
            && prev != id
            && self.graph.node(&prev).and_then(StoryNode::as_scene).is_some()
        {
            self.emit(StoryEventKind::SceneExit { node: prev.clone() });
            self.emit(StoryEventKind::TransitionStart {
                from: prev,
                to: id.clone(),
            });
        }

        let Some(node) = self.graph.node(&id).cloned() else {
            self.phase = Phase::Halted;
            return Err(EngineError::NodeNotFound(id));
        };
        self.state.current_node = Some(id.clone());

        match node {
            StoryNode::Start => self.resolve_flow(&id),
            StoryNode::End(end) => {
                self.reach_ending(id, end.ending_type);
                Ok(())
            }
            StoryNode::Scene(scene) => {
                self.enter_scene(&id, &scene);
                if !scene.dialogues.is_empty() {
                    self.state.dialogue_index = 0;
                    self.begin_line(true);
                    Ok(())
                } else if !self.visible_choices().is_empty() {
                    self.state.dialogue_index = 0;
                    self.present_choices();
                    Ok(())
                } else {
                    // Nothing to show: auto-advance with no player-visible
                    // pause.
                    self.state.dialogue_index = 0;
                    self.resolve_flow(&id)
                }
            }
        }
    }

    /// Stage setup on scene entry: character diff (all exits before all
    /// enters, then expression changes), background, music, and verbatim
    /// effect forwarding.
    fn enter_scene(&mut self, id: &NodeId, scene: &SceneNode) {
        self.emit(StoryEventKind::SceneEnter { node: id.clone() });

        let previous = std::mem::take(&mut self.state.visible_characters);

        for old in &previous {
            if !scene.characters.iter().any(|p| p.id == old.id) {
                self.emit(StoryEventKind::CharacterExit { id: old.id.clone() });
            }
        }
        for placement in &scene.characters {
            match previous.iter().find(|old| old.id == placement.id) {
                None => self.emit(StoryEventKind::CharacterEnter {
                    id: placement.id.clone(),
                    position: placement.position,
                    expression: placement.expression.clone(),
                }),
                Some(old) if old.expression != placement.expression => {
                    self.emit(StoryEventKind::CharacterExpression {
                        id: placement.id.clone(),
                        expression: placement.expression.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        self.state.visible_characters = scene
            .characters
            .iter()
            .map(|placement| {
                let retained = previous.iter().find(|old| old.id == placement.id);
                CharacterState {
                    id: placement.id.clone(),
                    position: placement.position,
                    expression: placement.expression.clone(),
                    scale: retained.map_or(1.0, |old| old.scale),
                    alpha: retained.map_or(1.0, |old| old.alpha),
                }
            })
            .collect();

        if let Some(location) = &scene.location
            && self.state.current_background.as_ref() != Some(location)
        {
            self.state.current_background = Some(location.clone());
            self.emit(StoryEventKind::BackgroundChange {
                location: location.clone(),
            });
        }

        if let Some(track) = &scene.bgm
            && self.state.current_bgm.as_ref() != Some(track)
        {
            self.state.current_bgm = Some(track.clone());
            self.emit(StoryEventKind::BgmPlay {
                track: track.clone(),
            });
        }

        for effect in &scene.effects {
            self.emit(StoryEventKind::EffectTriggered {
                kind: effect.kind.clone(),
                payload: effect.payload.clone(),
            });
        }
    }

    fn reach_ending(&mut self, node: NodeId, ending_type: Option<String>) {
        self.cancel_all();
        self.state.is_paused = true;
        self.phase = Phase::Ended;
        if self.state.current_bgm.take().is_some() {
            self.emit(StoryEventKind::BgmStop);
        }
        let playtime_seconds = self.state.playtime_seconds;
        self.emit(StoryEventKind::EndingReached {
            node,
            ending_type,
            playtime_seconds,
        });
    }

    /// Begin revealing the line at the current cursor.
    ///
    /// `record_history` is false only on restore, so a restored line is not
    /// appended to the backlog twice.
    fn begin_line(&mut self, record_history: bool) {
        let Some(node) = self.state.current_node.clone() else {
            return;
        };
        let Some(line) = self
            .current_scene()
            .and_then(|scene| scene.dialogues.get(self.state.dialogue_index))
            .cloned()
        else {
            return;
        };

        self.cancel_auto_play();
        let instant = self.state.skip_mode || self.state.text_speed >= 1.0;
        self.typewriter = Some(if instant {
            Typewriter::instant(&line.text)
        } else {
            Typewriter::new(&line.text, self.config.cps_for_speed(self.state.text_speed))
        });
        self.phase = Phase::Dialogue;

        if record_history {
            self.state.push_history(
                HistoryEntry {
                    speaker: line.speaker.clone(),
                    text: line.text.clone(),
                    timestamp: Utc::now(),
                },
                self.config.history_limit,
            );
        }
        self.emit(StoryEventKind::DialogueStart {
            node,
            dialogue: line.id.clone(),
            speaker: line.speaker.clone(),
            text: line.text.clone(),
        });

        if self.typewriter.as_ref().is_some_and(Typewriter::is_complete) {
            self.finish_line();
        }
    }

    /// Complete the current line: emits `DialogueComplete` exactly once per
    /// line (this is the only transition out of the dialogue phase) and
    /// arms auto-play when applicable.
    fn finish_line(&mut self) {
        if self.phase != Phase::Dialogue {
            return;
        }
        if let Some(tw) = &mut self.typewriter {
            tw.complete();
        }
        self.phase = Phase::AwaitingInput;

        let node = self.state.current_node.clone();
        let dialogue = self
            .current_scene()
            .and_then(|scene| scene.dialogues.get(self.state.dialogue_index))
            .map(|line| line.id.clone());
        if let (Some(node), Some(dialogue)) = (node, dialogue) {
            self.emit(StoryEventKind::DialogueComplete { node, dialogue });
        }

        // Any timer pending for the previous line is superseded.
        self.cancel_auto_play();
        if self.state.auto_play && !self.choices_pending() {
            self.auto_play_remaining = Some(self.config.auto_play_delay);
        }
    }

    /// Move past the completed line: next line, choices, or flow edge.
    fn advance_cursor(&mut self) -> EngineResult<()> {
        let Some(node) = self.state.current_node.clone() else {
            return Ok(());
        };
        let line_count = self.current_scene().map_or(0, |s| s.dialogues.len());

        if self.state.dialogue_index + 1 < line_count {
            self.state.dialogue_index += 1;
            self.begin_line(true);
            return Ok(());
        }
        if !self.visible_choices().is_empty() {
            self.present_choices();
            return Ok(());
        }
        self.resolve_flow(&node)
    }

    fn present_choices(&mut self) {
        let Some(node) = self.state.current_node.clone() else {
            return;
        };
        let visible = self.visible_choices();
        self.presented_choices = visible.iter().map(|c| c.id.clone()).collect();
        // The cursor moves past the last line: a snapshot taken now is
        // distinguishable from one taken while that line was still showing.
        self.state.dialogue_index = self.current_scene().map_or(0, |s| s.dialogues.len());
        self.cancel_auto_play();
        self.typewriter = None;
        self.phase = Phase::Choices;
        self.emit(StoryEventKind::ChoicesShown {
            node,
            choices: visible,
        });
    }

    /// The bounded skip loop: advance until input is required, the story
    /// ends, or the iteration cap is reached.
    fn run_skip(&mut self) -> EngineResult<()> {
        for _ in 0..self.config.skip_iteration_cap {
            if self.state.is_paused
                || !matches!(self.phase, Phase::Dialogue | Phase::AwaitingInput)
            {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }
}
