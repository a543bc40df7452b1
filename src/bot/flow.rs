//! Conversation state machine.
//!
//! A user is in exactly one [`Flow`] at a time. [`advance`] is a pure function from the
//! current flow and an [`Event`] to a [`Step`]: the next flow plus the [`Effect`]s the
//! server must carry out (replies, profile commits, feedback submission, broadcast).
//! Staged text lives inside the confirm variants, so a confirm state always has text and
//! no other state can hold any.
//!
//! ```text
//! Idle --/register--> RegisterName --name--> RegisterAge --age--> Idle
//! Idle --/feedback--> FeedbackText --text--> FeedbackConfirm{text} --yes/no--> Idle
//! Idle --/broadcast-> BroadcastText --text-> BroadcastConfirm{text} --yes/no--> Idle
//! Idle --util_echo--> UtilityEcho --text--> Idle (text echoed)
//! ```
//!
//! `/cancel` returns every flow to `Idle`. Registration commits each step as it is
//! accepted, so cancelling at the age step keeps the new name.

use crate::transport::Reply;
use crate::validation::{non_empty_text, parse_age, validate_name, ValidationError};

use super::keyboard::{yes_no, Choice, ConfirmKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Idle,
    RegisterName,
    RegisterAge,
    FeedbackText,
    FeedbackConfirm { staged: String },
    BroadcastText,
    BroadcastConfirm { staged: String },
    /// The next free text is echoed back once.
    UtilityEcho,
}

impl Flow {
    pub fn is_idle(&self) -> bool {
        matches!(self, Flow::Idle)
    }

    /// Text waiting for confirmation, if any.
    pub fn staged(&self) -> Option<&str> {
        match self {
            Flow::FeedbackConfirm { staged } | Flow::BroadcastConfirm { staged } => Some(staged),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Flow::Idle => "idle",
            Flow::RegisterName => "registering-name",
            Flow::RegisterAge => "registering-age",
            Flow::FeedbackText => "feedback-await-text",
            Flow::FeedbackConfirm { .. } => "feedback-await-confirm",
            Flow::BroadcastText => "broadcast-await-text",
            Flow::BroadcastConfirm { .. } => "broadcast-await-confirm",
            Flow::UtilityEcho => "utility-await-input",
        }
    }
}

/// Flows that can be started by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Register,
    Feedback,
    Broadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    Begin(FlowKind),
    Text(&'a str),
    Decide(ConfirmKind, Choice),
    Cancel,
    /// `util_echo` pressed.
    EchoMode,
    /// Utility menu opened or left; drops a pending echo.
    LeaveUtilities,
}

/// What the state machine knows about the user driving it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actor<'a> {
    pub is_admin: bool,
    pub name: Option<&'a str>,
}

/// Side effects requested by a transition, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reply(Reply),
    SaveName(String),
    SaveAge(u8),
    /// Reply with "Registration completed:" and the profile summary.
    ShowSummary,
    /// Append to the feedback log, notify admins and thank the user.
    SubmitFeedback(String),
    /// Fan the text out to the directory and report the counts.
    Broadcast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: Flow,
    pub effects: Vec<Effect>,
}

impl Step {
    fn to(next: Flow, effects: Vec<Effect>) -> Self {
        Step { next, effects }
    }

    fn reply(next: Flow, text: impl Into<String>) -> Self {
        Step::to(next, vec![Effect::Reply(Reply::text(text))])
    }

    fn reject(stay: Flow, err: ValidationError) -> Self {
        Step::reply(stay, err.to_string())
    }
}

pub const UNRECOGNIZED_TEXT: &str = "I do not understand. Use /help or /start.";
pub const BROADCAST_DENIED: &str = "You are not authorized to broadcast.";
const FEEDBACK_QUESTION: &str = "Do you want to send this feedback?";
const BROADCAST_QUESTION: &str = "Send this message to all known users?";
const USE_BUTTONS: &str = "Please answer with the buttons below, or /cancel.";

/// Compute the transition for `event` in `flow`.
pub fn advance(flow: Flow, event: Event<'_>, actor: Actor<'_>) -> Step {
    match event {
        Event::Begin(kind) => begin(flow, kind, actor),
        Event::Cancel => cancel(flow),
        Event::Text(text) => on_text(flow, text),
        Event::Decide(kind, choice) => decide(flow, kind, choice, actor),
        Event::EchoMode => Step::reply(Flow::UtilityEcho, "Send text and I will echo it."),
        Event::LeaveUtilities => {
            let next = if flow == Flow::UtilityEcho { Flow::Idle } else { flow };
            Step::to(next, Vec::new())
        }
    }
}

fn begin(flow: Flow, kind: FlowKind, actor: Actor<'_>) -> Step {
    match kind {
        FlowKind::Register => {
            let prompt = match actor.name {
                Some(name) => format!("Your current name is: {}\nSend a new name or /cancel.", name),
                None => "Send your name.".to_string(),
            };
            Step::reply(Flow::RegisterName, prompt)
        }
        FlowKind::Feedback => Step::reply(Flow::FeedbackText, "Send your feedback text or /cancel."),
        FlowKind::Broadcast if !actor.is_admin => Step::reply(flow, BROADCAST_DENIED),
        FlowKind::Broadcast => {
            Step::reply(Flow::BroadcastText, "Send the broadcast message text or /cancel.")
        }
    }
}

fn cancel(flow: Flow) -> Step {
    let text = match flow {
        Flow::Idle => "Nothing to cancel.",
        Flow::RegisterName | Flow::RegisterAge => "Registration cancelled.",
        Flow::FeedbackText | Flow::FeedbackConfirm { .. } => "Feedback cancelled.",
        Flow::BroadcastText | Flow::BroadcastConfirm { .. } => "Broadcast cancelled.",
        Flow::UtilityEcho => "Echo cancelled.",
    };
    Step::reply(Flow::Idle, text)
}

fn on_text(flow: Flow, text: &str) -> Step {
    match flow {
        Flow::Idle => Step::reply(Flow::Idle, UNRECOGNIZED_TEXT),
        Flow::UtilityEcho => Step::reply(Flow::Idle, text),
        Flow::RegisterName => match validate_name(text) {
            Ok(name) => Step::to(
                Flow::RegisterAge,
                vec![
                    Effect::SaveName(name),
                    Effect::Reply(Reply::text("Now send your age as a number.")),
                ],
            ),
            Err(e) => Step::reject(Flow::RegisterName, e),
        },
        Flow::RegisterAge => match parse_age(text) {
            Ok(age) => Step::to(Flow::Idle, vec![Effect::SaveAge(age), Effect::ShowSummary]),
            Err(e) => Step::reject(Flow::RegisterAge, e),
        },
        Flow::FeedbackText => match non_empty_text(text, ValidationError::EmptyFeedback) {
            Ok(staged) => Step::to(
                Flow::FeedbackConfirm { staged },
                vec![Effect::Reply(Reply::with_keyboard(
                    FEEDBACK_QUESTION,
                    yes_no(ConfirmKind::Feedback),
                ))],
            ),
            Err(e) => Step::reject(Flow::FeedbackText, e),
        },
        Flow::BroadcastText => match non_empty_text(text, ValidationError::EmptyBroadcast) {
            Ok(staged) => Step::to(
                Flow::BroadcastConfirm { staged },
                vec![Effect::Reply(Reply::with_keyboard(
                    BROADCAST_QUESTION,
                    yes_no(ConfirmKind::Broadcast),
                ))],
            ),
            Err(e) => Step::reject(Flow::BroadcastText, e),
        },
        Flow::FeedbackConfirm { staged } => Step::to(
            Flow::FeedbackConfirm { staged },
            vec![Effect::Reply(Reply::with_keyboard(
                USE_BUTTONS,
                yes_no(ConfirmKind::Feedback),
            ))],
        ),
        Flow::BroadcastConfirm { staged } => Step::to(
            Flow::BroadcastConfirm { staged },
            vec![Effect::Reply(Reply::with_keyboard(
                USE_BUTTONS,
                yes_no(ConfirmKind::Broadcast),
            ))],
        ),
    }
}

fn decide(flow: Flow, kind: ConfirmKind, choice: Choice, actor: Actor<'_>) -> Step {
    match (flow, kind) {
        (Flow::FeedbackConfirm { staged }, ConfirmKind::Feedback) => match choice {
            Choice::Yes => Step::to(Flow::Idle, vec![Effect::SubmitFeedback(staged)]),
            Choice::No => Step::reply(Flow::Idle, "Feedback discarded."),
        },
        (Flow::BroadcastConfirm { .. }, ConfirmKind::Broadcast) if !actor.is_admin => {
            Step::reply(Flow::Idle, "Not authorized.")
        }
        (Flow::BroadcastConfirm { staged }, ConfirmKind::Broadcast) => match choice {
            Choice::Yes => Step::to(Flow::Idle, vec![Effect::Broadcast(staged)]),
            Choice::No => Step::reply(Flow::Idle, "Broadcast cancelled."),
        },
        (other, ConfirmKind::Feedback) => Step::reply(other, "No feedback to send."),
        (other, ConfirmKind::Broadcast) => Step::reply(other, "No broadcast pending."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: Actor<'static> = Actor { is_admin: false, name: None };
    const ADMIN: Actor<'static> = Actor { is_admin: true, name: None };

    /// Feed `events` from `Idle`, returning the final flow and every effect produced.
    fn run(actor: Actor<'_>, events: &[Event<'_>]) -> (Flow, Vec<Effect>) {
        let mut flow = Flow::Idle;
        let mut effects = Vec::new();
        for ev in events {
            let step = advance(flow, *ev, actor);
            flow = step.next;
            effects.extend(step.effects);
        }
        (flow, effects)
    }

    fn reply_texts(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Reply(r) => Some(r.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn registration_happy_path() {
        let (flow, effects) = run(
            USER,
            &[Event::Begin(FlowKind::Register), Event::Text(" Alice "), Event::Text("35")],
        );
        assert_eq!(flow, Flow::Idle);
        assert!(effects.contains(&Effect::SaveName("Alice".into())));
        assert!(effects.contains(&Effect::SaveAge(35)));
        assert_eq!(effects.last(), Some(&Effect::ShowSummary));
    }

    #[test]
    fn register_prompt_mentions_current_name() {
        let actor = Actor { is_admin: false, name: Some("Bob") };
        let step = advance(Flow::Idle, Event::Begin(FlowKind::Register), actor);
        assert!(reply_texts(&step.effects)[0].contains("Your current name is: Bob"));
    }

    #[test]
    fn empty_name_reprompts() {
        let step = advance(Flow::RegisterName, Event::Text("   "), USER);
        assert_eq!(step.next, Flow::RegisterName);
        assert_eq!(reply_texts(&step.effects), vec!["Name cannot be empty. Send your name."]);
    }

    #[test]
    fn bad_ages_stay_put_without_saving() {
        for raw in ["0", "121", "-3", "abc", "", "1e2"] {
            let step = advance(Flow::RegisterAge, Event::Text(raw), USER);
            assert_eq!(step.next, Flow::RegisterAge, "input {raw:?}");
            assert!(
                !step.effects.iter().any(|e| matches!(e, Effect::SaveAge(_))),
                "age saved for {raw:?}"
            );
        }
    }

    #[test]
    fn cancel_after_name_keeps_commit() {
        let (flow, effects) = run(
            USER,
            &[Event::Begin(FlowKind::Register), Event::Text("Alice"), Event::Cancel],
        );
        assert_eq!(flow, Flow::Idle);
        assert!(effects.contains(&Effect::SaveName("Alice".into())));
        assert_eq!(reply_texts(&effects).last(), Some(&"Registration cancelled."));
    }

    #[test]
    fn feedback_confirm_yes_submits_staged_text() {
        let (flow, effects) = run(
            USER,
            &[
                Event::Begin(FlowKind::Feedback),
                Event::Text("  love it  "),
                Event::Decide(ConfirmKind::Feedback, Choice::Yes),
            ],
        );
        assert_eq!(flow, Flow::Idle);
        assert_eq!(effects.last(), Some(&Effect::SubmitFeedback("love it".into())));
    }

    #[test]
    fn confirm_state_always_carries_text() {
        let step = advance(Flow::FeedbackText, Event::Text("hello"), USER);
        assert_eq!(step.next.staged(), Some("hello"));
        let keyboard = match &step.effects[0] {
            Effect::Reply(r) => r.keyboard.clone().unwrap(),
            other => panic!("unexpected effect {:?}", other),
        };
        assert!(keyboard.callbacks().any(|c| c == "feedback_confirm:yes"));

        let step = advance(Flow::FeedbackText, Event::Text(""), USER);
        assert_eq!(step.next, Flow::FeedbackText);
        assert_eq!(step.next.staged(), None);
    }

    #[test]
    fn no_always_discards() {
        for staged in ["a", "long text with\nlines", "x"] {
            let f = advance(
                Flow::FeedbackConfirm { staged: staged.into() },
                Event::Decide(ConfirmKind::Feedback, Choice::No),
                USER,
            );
            assert_eq!(f.next, Flow::Idle);
            assert_eq!(reply_texts(&f.effects), vec!["Feedback discarded."]);

            let b = advance(
                Flow::BroadcastConfirm { staged: staged.into() },
                Event::Decide(ConfirmKind::Broadcast, Choice::No),
                ADMIN,
            );
            assert_eq!(b.next, Flow::Idle);
            assert_eq!(reply_texts(&b.effects), vec!["Broadcast cancelled."]);
        }
    }

    #[test]
    fn broadcast_requires_admin_to_begin() {
        let step = advance(Flow::Idle, Event::Begin(FlowKind::Broadcast), USER);
        assert_eq!(step.next, Flow::Idle);
        assert_eq!(reply_texts(&step.effects), vec![BROADCAST_DENIED]);

        // a refused broadcast leaves another flow alone
        let step = advance(Flow::FeedbackText, Event::Begin(FlowKind::Broadcast), USER);
        assert_eq!(step.next, Flow::FeedbackText);
    }

    #[test]
    fn broadcast_confirm_rechecks_admin() {
        let staged = Flow::BroadcastConfirm { staged: "hi".into() };
        let step = advance(staged.clone(), Event::Decide(ConfirmKind::Broadcast, Choice::Yes), USER);
        assert_eq!(step.next, Flow::Idle);
        assert_eq!(reply_texts(&step.effects), vec!["Not authorized."]);

        let step = advance(staged, Event::Decide(ConfirmKind::Broadcast, Choice::Yes), ADMIN);
        assert_eq!(step.effects, vec![Effect::Broadcast("hi".into())]);
    }

    #[test]
    fn entering_a_flow_overwrites_the_previous_one() {
        let mid_feedback = Flow::FeedbackConfirm { staged: "pending".into() };
        let step = advance(mid_feedback, Event::Begin(FlowKind::Register), USER);
        assert_eq!(step.next, Flow::RegisterName);
        assert_eq!(step.next.staged(), None);

        let step = advance(Flow::RegisterAge, Event::EchoMode, USER);
        assert_eq!(step.next, Flow::UtilityEcho);
    }

    #[test]
    fn echo_is_single_shot() {
        let (flow, effects) = run(USER, &[Event::EchoMode, Event::Text("ping"), Event::Text("pong")]);
        assert_eq!(flow, Flow::Idle);
        assert_eq!(
            reply_texts(&effects),
            vec!["Send text and I will echo it.", "ping", UNRECOGNIZED_TEXT]
        );
    }

    #[test]
    fn echo_keeps_text_verbatim() {
        let step = advance(Flow::UtilityEcho, Event::Text("  spaced\n out "), USER);
        assert_eq!(reply_texts(&step.effects), vec!["  spaced\n out "]);
    }

    #[test]
    fn leaving_utilities_only_clears_echo() {
        assert_eq!(advance(Flow::UtilityEcho, Event::LeaveUtilities, USER).next, Flow::Idle);
        assert_eq!(
            advance(Flow::RegisterAge, Event::LeaveUtilities, USER).next,
            Flow::RegisterAge
        );
    }

    #[test]
    fn text_in_confirm_state_reprompts() {
        let flow = Flow::BroadcastConfirm { staged: "hello".into() };
        let step = advance(flow.clone(), Event::Text("what?"), ADMIN);
        assert_eq!(step.next, flow);
        assert_eq!(reply_texts(&step.effects), vec![USE_BUTTONS]);
    }

    #[test]
    fn mismatched_decision_is_reported() {
        let step = advance(Flow::Idle, Event::Decide(ConfirmKind::Feedback, Choice::Yes), USER);
        assert_eq!(step.next, Flow::Idle);
        assert_eq!(reply_texts(&step.effects), vec!["No feedback to send."]);

        let step = advance(Flow::RegisterAge, Event::Decide(ConfirmKind::Broadcast, Choice::Yes), ADMIN);
        assert_eq!(step.next, Flow::RegisterAge);
        assert_eq!(reply_texts(&step.effects), vec!["No broadcast pending."]);
    }

    #[test]
    fn cancel_from_every_state_goes_idle() {
        let states = [
            Flow::Idle,
            Flow::RegisterName,
            Flow::RegisterAge,
            Flow::FeedbackText,
            Flow::FeedbackConfirm { staged: "x".into() },
            Flow::BroadcastText,
            Flow::BroadcastConfirm { staged: "y".into() },
            Flow::UtilityEcho,
        ];
        for state in states {
            let label = state.label();
            let step = advance(state, Event::Cancel, ADMIN);
            assert_eq!(step.next, Flow::Idle, "cancel from {label}");
            assert_eq!(step.effects.len(), 1);
        }
    }

    #[test]
    fn idle_text_gets_guidance() {
        let step = advance(Flow::Idle, Event::Text("hello?"), USER);
        assert_eq!(reply_texts(&step.effects), vec![UNRECOGNIZED_TEXT]);
    }
}
