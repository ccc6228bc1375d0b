use crate::game::{AnswerOutcome, Choice, GameResult, Question, Session, Settled, StealState};
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Load a trivia game and start a new session for it
    CreateSession {
        trivia_id: TriviaId,
        /// Overrides the server default
        #[serde(default)]
        steal_mode: Option<StealMode>,
        #[serde(default)]
        exhausted_steal: Option<ExhaustedSteal>,
    },
    SetPlayerCount {
        session_id: SessionId,
        count: usize,
    },
    SetPlayerName {
        session_id: SessionId,
        index: PlayerIndex,
        name: String,
    },
    StartGame {
        session_id: SessionId,
    },
    OpenQuestion {
        session_id: SessionId,
        category: String,
        index: usize,
    },
    SubmitAnswer {
        session_id: SessionId,
        category: String,
        index: usize,
        label: char,
    },
    /// "I Give Up"
    GiveUp {
        session_id: SessionId,
        category: String,
        index: usize,
    },
    PickStealer {
        session_id: SessionId,
        player_id: PlayerId,
    },
    /// Settle the outcome on display without waiting for the reveal delay
    Continue {
        session_id: SessionId,
    },
    /// Close the open question ("Cancel")
    AbandonQuestion {
        session_id: SessionId,
    },
    GetState {
        session_id: SessionId,
    },
    EndSession {
        session_id: SessionId,
    },
}

impl ClientMessage {
    /// The session this message targets, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            ClientMessage::CreateSession { .. } => None,
            ClientMessage::SetPlayerCount { session_id, .. }
            | ClientMessage::SetPlayerName { session_id, .. }
            | ClientMessage::StartGame { session_id }
            | ClientMessage::OpenQuestion { session_id, .. }
            | ClientMessage::SubmitAnswer { session_id, .. }
            | ClientMessage::GiveUp { session_id, .. }
            | ClientMessage::PickStealer { session_id, .. }
            | ClientMessage::Continue { session_id }
            | ClientMessage::AbandonQuestion { session_id }
            | ClientMessage::GetState { session_id }
            | ClientMessage::EndSession { session_id } => Some(session_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionCreated {
        session_id: SessionId,
        view: SessionView,
    },
    State {
        view: SessionView,
    },
    QuestionOpened {
        category: String,
        index: usize,
        question: QuestionView,
        view: SessionView,
    },
    AnswerResult {
        outcome: AnswerOutcome,
        message: String,
        /// Follow-up instruction, e.g. who may steal next
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        view: SessionView,
    },
    Settled {
        settled: Settled,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        view: SessionView,
    },
    GameOver {
        result: GameResult,
        view: SessionView,
    },
    SessionEnded {
        session_id: SessionId,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }

    pub fn answer_result(outcome: AnswerOutcome, view: SessionView) -> Self {
        let prompt = match &outcome {
            AnswerOutcome::Incorrect {
                next_stealer: None,
                steal_eligible,
                ..
            } if !steal_eligible.is_empty() => {
                Some("Choose a player to attempt stealing.".to_string())
            }
            _ => None,
        };
        ServerMessage::AnswerResult {
            message: outcome.message().to_string(),
            outcome,
            prompt,
            view,
        }
    }

    pub fn settled(settled: Settled, view: SessionView) -> Self {
        let message = match settled {
            Settled::StealerUp { stealer } => {
                Some(format!("{} can now try to steal!", view.player_name(stealer)))
            }
            Settled::QuestionClosed { .. } => None,
        };
        ServerMessage::Settled {
            settled,
            message,
            view,
        }
    }
}

/// A question as players see it: no correct label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub text: String,
    pub points: u32,
    pub choices: Vec<Choice>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            text: q.text.clone(),
            points: q.points,
            choices: q.choices.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Open,
    Resolved,
    /// Every steal failed and the cell was locked without a score
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub index: usize,
    pub points: u32,
    pub status: CellStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub name: String,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuestionView {
    pub category: String,
    pub index: usize,
    pub question: QuestionView,
    pub answered: bool,
    pub awaiting_settle: bool,
}

/// Everything the presentation layer needs to redraw a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub settings: SessionSettings,
    pub players: Vec<Player>,
    pub current_player: Option<PlayerIndex>,
    pub board: Vec<CategoryView>,
    pub active: Option<ActiveQuestionView>,
    pub steal: StealState,
    pub current_stealer: Option<PlayerIndex>,
    /// Manual mode: players the steal chooser offers
    pub steal_eligible: Vec<PlayerId>,
    pub result: Option<GameResult>,
}

impl SessionView {
    pub fn build(session_id: &str, session: &Session) -> Self {
        let board_state = session.board();
        let board = session
            .content()
            .categories()
            .iter()
            .map(|category| CategoryView {
                name: category.name.clone(),
                cells: category
                    .questions
                    .iter()
                    .enumerate()
                    .map(|(index, q)| {
                        let status = if board_state.is_resolved(&category.name, index) {
                            CellStatus::Resolved
                        } else if board_state.is_closed(&category.name, index) {
                            CellStatus::Closed
                        } else {
                            CellStatus::Open
                        };
                        CellView {
                            index,
                            points: q.points,
                            status,
                        }
                    })
                    .collect(),
            })
            .collect();

        let active = session.active_question().and_then(|active| {
            let question = session
                .content()
                .question(&active.cell.category, active.cell.index)?;
            Some(ActiveQuestionView {
                category: active.cell.category.clone(),
                index: active.cell.index,
                question: question.into(),
                answered: active.answered,
                awaiting_settle: active.pending.is_some(),
            })
        });

        let players = session.players();
        let steal_eligible = session
            .steal()
            .eligible()
            .iter()
            .filter_map(|i| players.get(*i).map(|p| p.id))
            .collect();

        Self {
            session_id: session_id.to_string(),
            phase: session.phase(),
            settings: session.settings(),
            players: players.to_vec(),
            current_player: session.current_player(),
            board,
            active,
            steal: session.steal().state().clone(),
            current_stealer: session.current_stealer(),
            steal_eligible,
            result: session.result().cloned(),
        }
    }

    pub fn player_name(&self, index: PlayerIndex) -> String {
        self.players
            .get(index)
            .map(Player::display_name)
            .unwrap_or_else(|| format!("Player {}", index + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"t": "submit_answer", "session_id": "ABCDE", "category": "Movies", "index": 1, "label": "B"}"#,
        )
        .unwrap();
        match &msg {
            ClientMessage::SubmitAnswer { label, index, .. } => {
                assert_eq!(*label, 'B');
                assert_eq!(*index, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(msg.session_id().map(String::as_str), Some("ABCDE"));

        let create: ClientMessage =
            serde_json::from_str(r#"{"t": "create_session", "trivia_id": "quiz"}"#).unwrap();
        assert!(matches!(
            create,
            ClientMessage::CreateSession {
                steal_mode: None,
                exhausted_steal: None,
                ..
            }
        ));
        assert!(create.session_id().is_none());
    }

    #[test]
    fn test_error_wire_format() {
        let json = serde_json::to_value(ServerMessage::error("ALREADY_ANSWERED", "nope")).unwrap();
        assert_eq!(json["t"], "error");
        assert_eq!(json["code"], "ALREADY_ANSWERED");
    }

    #[test]
    fn test_question_view_hides_answer() {
        let question = Question {
            text: "H2O is?".to_string(),
            choices: vec![
                Choice {
                    label: 'A',
                    text: "Water".to_string(),
                },
                Choice {
                    label: 'B',
                    text: "Salt".to_string(),
                },
            ],
            correct_label: 'A',
            points: 100,
        };
        let json = serde_json::to_value(QuestionView::from(&question)).unwrap();
        assert!(json.get("correct_label").is_none());
        assert_eq!(json["choices"][1]["text"], "Salt");
    }
}
