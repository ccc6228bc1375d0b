use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use triviashare::config::ServerConfig;
use triviashare::game::content::StoredQuestion;
use triviashare::game::{AnswerOutcome, Settled, TriviaContent};
use triviashare::protocol::{CellStatus, ClientMessage, ServerMessage, SessionView};
use triviashare::state::AppState;
use triviashare::store::{MemoryStore, TriviaRecord};
use triviashare::types::{ExhaustedSteal, SessionPhase, StealMode};
use triviashare::ws::handlers::handle_message;

fn question(text: &str, points: i64) -> StoredQuestion {
    let choices: BTreeMap<String, String> = [("A", "Right"), ("B", "Wrong"), ("C", "Also wrong")]
        .into_iter()
        .map(|(l, t)| (l.to_string(), t.to_string()))
        .collect();
    StoredQuestion {
        question: text.to_string(),
        choices,
        answer: "A".to_string(),
        points,
    }
}

/// Animals: 100, 200. Movies: 100, 300. "A" is always right.
fn quiz_content() -> TriviaContent {
    let mut content = TriviaContent::new();
    content.insert(
        "Animals".to_string(),
        vec![question("Largest mammal?", 200), question("Fastest bird?", 100)],
    );
    content.insert(
        "Movies".to_string(),
        vec![question("First Pixar feature?", 100), question("Longest runtime?", 300)],
    );
    content
}

fn test_state(reveal_delay: Duration) -> Arc<AppState> {
    let mut record = TriviaRecord::new("Quiz night");
    record.id = "quiz".to_string();
    record.content = quiz_content();

    let config = ServerConfig {
        reveal_delay,
        ..ServerConfig::default()
    };
    Arc::new(AppState::new(
        Arc::new(MemoryStore::with_records([record])),
        config,
    ))
}

async fn create(state: &Arc<AppState>, steal_mode: StealMode, exhausted: ExhaustedSteal) -> String {
    let result = handle_message(
        ClientMessage::CreateSession {
            trivia_id: "quiz".to_string(),
            steal_mode: Some(steal_mode),
            exhausted_steal: Some(exhausted),
        },
        state,
    )
    .await;

    match result {
        Some(ServerMessage::SessionCreated { session_id, view }) => {
            assert_eq!(view.phase, SessionPhase::Setup);
            session_id
        }
        other => panic!("Expected SessionCreated, got {:?}", other),
    }
}

/// Setup -> Naming, with every name filled in
async fn seat(state: &Arc<AppState>, session_id: &str, names: &[&str]) {
    let result = handle_message(
        ClientMessage::SetPlayerCount {
            session_id: session_id.to_string(),
            count: names.len(),
        },
        state,
    )
    .await;
    assert!(matches!(result, Some(ServerMessage::State { .. })));

    for (index, name) in names.iter().enumerate() {
        let result = handle_message(
            ClientMessage::SetPlayerName {
                session_id: session_id.to_string(),
                index,
                name: name.to_string(),
            },
            state,
        )
        .await;
        assert!(matches!(result, Some(ServerMessage::State { .. })));
    }
}

async fn start_with(state: &Arc<AppState>, session_id: &str, names: &[&str]) {
    seat(state, session_id, names).await;

    match handle_message(
        ClientMessage::StartGame {
            session_id: session_id.to_string(),
        },
        state,
    )
    .await
    {
        Some(ServerMessage::State { view }) => {
            assert_eq!(view.phase, SessionPhase::Playing);
            assert_eq!(view.current_player, Some(0));
        }
        other => panic!("Expected State, got {:?}", other),
    }
}

async fn open(state: &Arc<AppState>, session_id: &str, category: &str, index: usize) -> Option<ServerMessage> {
    handle_message(
        ClientMessage::OpenQuestion {
            session_id: session_id.to_string(),
            category: category.to_string(),
            index,
        },
        state,
    )
    .await
}

async fn answer(
    state: &Arc<AppState>,
    session_id: &str,
    category: &str,
    index: usize,
    label: char,
) -> Option<ServerMessage> {
    handle_message(
        ClientMessage::SubmitAnswer {
            session_id: session_id.to_string(),
            category: category.to_string(),
            index,
            label,
        },
        state,
    )
    .await
}

async fn continue_play(state: &Arc<AppState>, session_id: &str) -> Option<ServerMessage> {
    handle_message(
        ClientMessage::Continue {
            session_id: session_id.to_string(),
        },
        state,
    )
    .await
}

fn expect_outcome(msg: Option<ServerMessage>) -> (AnswerOutcome, String, Option<String>, SessionView) {
    match msg {
        Some(ServerMessage::AnswerResult {
            outcome,
            message,
            prompt,
            view,
        }) => (outcome, message, prompt, view),
        other => panic!("Expected AnswerResult, got {:?}", other),
    }
}

fn expect_settled(msg: Option<ServerMessage>) -> (Settled, Option<String>, SessionView) {
    match msg {
        Some(ServerMessage::Settled {
            settled,
            message,
            view,
        }) => (settled, message, view),
        other => panic!("Expected Settled, got {:?}", other),
    }
}

fn expect_error(msg: Option<ServerMessage>, expected: &str) -> String {
    match msg {
        Some(ServerMessage::Error { code, msg }) => {
            assert_eq!(code, expected, "unexpected error: {}", msg);
            msg
        }
        other => panic!("Expected {} error, got {:?}", expected, other),
    }
}

fn scores(view: &SessionView) -> Vec<u32> {
    view.players.iter().map(|p| p.score).collect()
}

fn cell_status(view: &SessionView, category: &str, index: usize) -> CellStatus {
    view.board
        .iter()
        .find(|c| c.name == category)
        .and_then(|c| c.cells.get(index))
        .map(|cell| cell.status)
        .expect("cell should exist")
}

/// End-to-end game with manual steals, played until the board runs out
#[tokio::test]
async fn test_full_game_manual_steal() {
    let state = test_state(Duration::ZERO);
    let id = create(&state, StealMode::Manual, ExhaustedSteal::Close).await;

    // Names are required before the game starts
    seat(&state, &id, &["Ada", "Grace", "  "]).await;
    let msg = expect_error(
        handle_message(
            ClientMessage::StartGame {
                session_id: id.clone(),
            },
            &state,
        )
        .await,
        "VALIDATION_FAILED",
    );
    assert_eq!(msg, "Please enter a name for each player!");

    handle_message(
        ClientMessage::SetPlayerName {
            session_id: id.clone(),
            index: 2,
            name: "Linus".to_string(),
        },
        &state,
    )
    .await;
    match handle_message(
        ClientMessage::StartGame {
            session_id: id.clone(),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::State { view }) => assert_eq!(view.phase, SessionPhase::Playing),
        other => panic!("Expected State, got {:?}", other),
    }

    // 1. Ada takes Animals for 100 and gets it right
    match open(&state, &id, "Animals", 0).await {
        Some(ServerMessage::QuestionOpened { question, view, .. }) => {
            assert_eq!(question.points, 100);
            assert_eq!(question.text, "Fastest bird?");
            assert_eq!(question.choices.len(), 3);
            assert!(view.active.is_some());
        }
        other => panic!("Expected QuestionOpened, got {:?}", other),
    }

    let (outcome, message, prompt, view) = expect_outcome(answer(&state, &id, "Animals", 0, 'A').await);
    assert_eq!(outcome, AnswerOutcome::Correct { player: 0, points: 100 });
    assert_eq!(message, "Correct! Points awarded.");
    assert!(prompt.is_none());
    assert_eq!(scores(&view), vec![100, 0, 0]);

    // A second click while the outcome is on display changes nothing
    expect_error(answer(&state, &id, "Animals", 0, 'A').await, "ALREADY_ANSWERED");

    let (settled, _, view) = expect_settled(continue_play(&state, &id).await);
    assert_eq!(settled, Settled::QuestionClosed { next_turn: 1 });
    assert!(view.active.is_none());
    assert_eq!(cell_status(&view, "Animals", 0), CellStatus::Resolved);
    assert_eq!(scores(&view), vec![100, 0, 0]);

    // 2. Grace gives up on Animals 200; Linus steals it
    open(&state, &id, "Animals", 1).await;
    let (outcome, message, prompt, view) = expect_outcome(
        handle_message(
            ClientMessage::GiveUp {
                session_id: id.clone(),
                category: "Animals".to_string(),
                index: 1,
            },
            &state,
        )
        .await,
    );
    assert_eq!(
        outcome,
        AnswerOutcome::Incorrect {
            player: 1,
            forfeited: true,
            steal_eligible: vec![0, 2],
            next_stealer: None,
        }
    );
    assert_eq!(message, "Incorrect. No points awarded.");
    assert_eq!(prompt.as_deref(), Some("Choose a player to attempt stealing."));
    assert_eq!(view.steal_eligible, vec![1, 3]);

    // Nothing to settle until a stealer is chosen
    expect_error(continue_play(&state, &id).await, "PRECONDITION_FAILED");

    // The original player can't steal their own question
    expect_error(
        handle_message(
            ClientMessage::PickStealer {
                session_id: id.clone(),
                player_id: 2,
            },
            &state,
        )
        .await,
        "PRECONDITION_FAILED",
    );

    let (settled, message, _) = expect_settled(
        handle_message(
            ClientMessage::PickStealer {
                session_id: id.clone(),
                player_id: 3,
            },
            &state,
        )
        .await,
    );
    assert_eq!(settled, Settled::StealerUp { stealer: 2 });
    assert_eq!(message.as_deref(), Some("Linus can now try to steal!"));

    let (outcome, message, _, view) = expect_outcome(answer(&state, &id, "Animals", 1, 'a').await);
    assert_eq!(
        outcome,
        AnswerOutcome::StealCorrect {
            stealer: 2,
            points: 200,
            next_turn: 2,
        }
    );
    assert_eq!(message, "Correct steal! Points awarded.");
    assert_eq!(scores(&view), vec![100, 0, 200]);

    let (settled, _, _) = expect_settled(continue_play(&state, &id).await);
    assert_eq!(settled, Settled::QuestionClosed { next_turn: 2 });

    // 3. Linus misses Movies 100, Ada misses the steal, the cell closes
    open(&state, &id, "Movies", 0).await;
    let (outcome, _, _, _) = expect_outcome(answer(&state, &id, "Movies", 0, 'B').await);
    assert!(matches!(outcome, AnswerOutcome::Incorrect { player: 2, .. }));

    handle_message(
        ClientMessage::PickStealer {
            session_id: id.clone(),
            player_id: 1,
        },
        &state,
    )
    .await;
    let (outcome, _, _, view) = expect_outcome(answer(&state, &id, "Movies", 0, 'C').await);
    assert_eq!(
        outcome,
        AnswerOutcome::StealExhausted {
            stealer: 0,
            next_turn: 0,
            closed: true,
        }
    );
    assert_eq!(scores(&view), vec![100, 0, 200]);

    let (_, _, view) = expect_settled(continue_play(&state, &id).await);
    assert_eq!(view.current_player, Some(0));
    assert_eq!(cell_status(&view, "Movies", 0), CellStatus::Closed);

    expect_error(open(&state, &id, "Movies", 0).await, "PRECONDITION_FAILED");

    // 4. Ada clears the board with Movies 300
    let mut rx = state.subscribe(&id).await.expect("session should exist");
    open(&state, &id, "Movies", 1).await;
    let (outcome, _, _, view) = expect_outcome(answer(&state, &id, "Movies", 1, 'A').await);
    assert_eq!(outcome, AnswerOutcome::Correct { player: 0, points: 300 });
    assert_eq!(view.phase, SessionPhase::Ended);
    assert_eq!(scores(&view), vec![400, 0, 200]);

    let result = view.result.expect("result once the board is done");
    assert_eq!(result.highest_score, 400);
    assert_eq!(result.winners.len(), 1);
    assert_eq!(result.winners[0].name, "Ada");

    // Watching screens get the outcome and then the standings
    assert!(matches!(rx.recv().await, Ok(ServerMessage::QuestionOpened { .. })));
    assert!(matches!(rx.recv().await, Ok(ServerMessage::AnswerResult { .. })));
    match rx.recv().await {
        Ok(ServerMessage::GameOver { result, .. }) => assert_eq!(result.highest_score, 400),
        other => panic!("Expected GameOver broadcast, got {:?}", other),
    }

    // Nothing is playable after the end
    expect_error(open(&state, &id, "Animals", 0).await, "PRECONDITION_FAILED");
}

#[tokio::test]
async fn test_auto_steal_walks_the_queue() {
    let state = test_state(Duration::ZERO);
    let id = create(&state, StealMode::Auto, ExhaustedSteal::LeaveOpen).await;
    start_with(&state, &id, &["Ada", "Grace", "Linus"]).await;

    open(&state, &id, "Animals", 0).await;
    let (outcome, _, prompt, view) = expect_outcome(answer(&state, &id, "Animals", 0, 'B').await);
    assert_eq!(
        outcome,
        AnswerOutcome::Incorrect {
            player: 0,
            forfeited: false,
            steal_eligible: vec![1, 2],
            next_stealer: Some(1),
        }
    );
    assert!(prompt.is_none(), "no chooser in auto mode");
    assert!(view.active.expect("still open").awaiting_settle);

    let (settled, message, _) = expect_settled(continue_play(&state, &id).await);
    assert_eq!(settled, Settled::StealerUp { stealer: 1 });
    assert_eq!(message.as_deref(), Some("Grace can now try to steal!"));

    let (outcome, message, _, _) = expect_outcome(answer(&state, &id, "Animals", 0, 'C').await);
    assert_eq!(
        outcome,
        AnswerOutcome::StealMissed {
            stealer: 1,
            next_stealer: 2,
        }
    );
    assert_eq!(message, "Incorrect steal. Moving onto the next player ...");

    let (settled, _, _) = expect_settled(continue_play(&state, &id).await);
    assert_eq!(settled, Settled::StealerUp { stealer: 2 });

    let (outcome, _, _, _) = expect_outcome(answer(&state, &id, "Animals", 0, 'B').await);
    assert_eq!(
        outcome,
        AnswerOutcome::StealExhausted {
            stealer: 2,
            next_turn: 1,
            closed: false,
        }
    );

    let (settled, _, view) = expect_settled(continue_play(&state, &id).await);
    assert_eq!(settled, Settled::QuestionClosed { next_turn: 1 });
    assert_eq!(cell_status(&view, "Animals", 0), CellStatus::Open);
    assert_eq!(scores(&view), vec![0, 0, 0]);

    // Left open, so Grace can take it on her own turn
    let (outcome, _, _, _) = {
        open(&state, &id, "Animals", 0).await;
        expect_outcome(answer(&state, &id, "Animals", 0, 'A').await)
    };
    assert_eq!(outcome, AnswerOutcome::Correct { player: 1, points: 100 });
}

#[tokio::test]
async fn test_reveal_timer_settles_outcome() {
    let state = test_state(Duration::from_millis(20));
    let id = create(&state, StealMode::Auto, ExhaustedSteal::Close).await;
    start_with(&state, &id, &["Ada", "Grace"]).await;

    let mut rx = state.subscribe(&id).await.expect("session should exist");
    open(&state, &id, "Movies", 0).await;
    answer(&state, &id, "Movies", 0, 'C').await;

    let settled = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(ServerMessage::Settled { settled, .. }) => return settled,
                Ok(_) => continue,
                Err(e) => panic!("channel closed: {}", e),
            }
        }
    })
    .await
    .expect("reveal timer should settle the outcome");
    assert_eq!(settled, Settled::StealerUp { stealer: 1 });

    // Already settled by the timer
    expect_error(continue_play(&state, &id).await, "PRECONDITION_FAILED");
}

#[tokio::test]
async fn test_abandon_question() {
    let state = test_state(Duration::ZERO);
    let id = create(&state, StealMode::Manual, ExhaustedSteal::LeaveOpen).await;
    start_with(&state, &id, &["Ada", "Grace"]).await;

    open(&state, &id, "Animals", 1).await;
    expect_error(open(&state, &id, "Movies", 0).await, "PRECONDITION_FAILED");

    match handle_message(
        ClientMessage::AbandonQuestion {
            session_id: id.clone(),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::State { view }) => {
            assert!(view.active.is_none());
            assert_eq!(view.current_player, Some(0), "cancel keeps the turn");
            assert_eq!(cell_status(&view, "Animals", 1), CellStatus::Open);
        }
        other => panic!("Expected State, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_codes() {
    let state = test_state(Duration::ZERO);

    let result = handle_message(
        ClientMessage::CreateSession {
            trivia_id: "missing".to_string(),
            steal_mode: None,
            exhausted_steal: None,
        },
        &state,
    )
    .await;
    expect_error(result, "TRIVIA_NOT_FOUND");

    let result = handle_message(
        ClientMessage::GetState {
            session_id: "NOPE2".to_string(),
        },
        &state,
    )
    .await;
    expect_error(result, "SESSION_NOT_FOUND");

    let id = create(&state, StealMode::Manual, ExhaustedSteal::Close).await;

    // Too early to open anything
    expect_error(open(&state, &id, "Animals", 0).await, "PRECONDITION_FAILED");

    let result = handle_message(
        ClientMessage::SetPlayerCount {
            session_id: id.clone(),
            count: 1,
        },
        &state,
    )
    .await;
    expect_error(result, "VALIDATION_FAILED");

    start_with(&state, &id, &["Ada", "Grace"]).await;
    open(&state, &id, "Animals", 0).await;
    expect_error(answer(&state, &id, "Animals", 0, 'Z').await, "PRECONDITION_FAILED");
    expect_error(answer(&state, &id, "Movies", 0, 'A').await, "PRECONDITION_FAILED");
    expect_error(open(&state, &id, "Sports", 0).await, "PRECONDITION_FAILED");
}

#[tokio::test]
async fn test_end_session() {
    let state = test_state(Duration::ZERO);
    let id = create(&state, StealMode::Manual, ExhaustedSteal::Close).await;
    let mut rx = state.subscribe(&id).await.expect("session should exist");

    match handle_message(
        ClientMessage::EndSession {
            session_id: id.clone(),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::SessionEnded { session_id }) => assert_eq!(session_id, id),
        other => panic!("Expected SessionEnded, got {:?}", other),
    }
    assert!(matches!(rx.recv().await, Ok(ServerMessage::SessionEnded { .. })));

    let result = handle_message(ClientMessage::GetState { session_id: id }, &state).await;
    expect_error(result, "SESSION_NOT_FOUND");
    assert_eq!(state.session_count().await, 0);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let state = test_state(Duration::ZERO);
    let first = create(&state, StealMode::Manual, ExhaustedSteal::Close).await;
    let second = create(&state, StealMode::Auto, ExhaustedSteal::Close).await;
    assert_ne!(first, second);

    start_with(&state, &first, &["Ada", "Grace"]).await;
    open(&state, &first, "Animals", 0).await;
    answer(&state, &first, "Animals", 0, 'A').await;

    match handle_message(ClientMessage::GetState { session_id: second }, &state).await {
        Some(ServerMessage::State { view }) => {
            assert_eq!(view.phase, SessionPhase::Setup);
            assert!(view.players.is_empty());
            assert_eq!(cell_status(&view, "Animals", 0), CellStatus::Open);
        }
        other => panic!("Expected State, got {:?}", other),
    }
}

#[tokio::test]
async fn test_watching_sender_gets_reply_and_broadcast() {
    let state = test_state(Duration::ZERO);
    let id = create(&state, StealMode::Manual, ExhaustedSteal::Close).await;
    let mut rx = state.subscribe(&id).await.expect("session should exist");

    let reply = handle_message(
        ClientMessage::SetPlayerCount {
            session_id: id.clone(),
            count: 2,
        },
        &state,
    )
    .await;

    let reply_view = match reply {
        Some(ServerMessage::State { view }) => view,
        other => panic!("Expected State, got {:?}", other),
    };
    match rx.recv().await {
        Ok(ServerMessage::State { view }) => assert_eq!(view, reply_view),
        other => panic!("Expected State broadcast, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sweeper_drops_finished_game() {
    let mut record = TriviaRecord::new("Tiny");
    record.id = "tiny".to_string();
    record
        .content
        .insert("Movies".to_string(), vec![question("First Pixar feature?", 100)]);
    let config = ServerConfig {
        reveal_delay: Duration::ZERO,
        ended_grace: Duration::ZERO,
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::new(
        Arc::new(MemoryStore::with_records([record])),
        config,
    ));

    let id = match handle_message(
        ClientMessage::CreateSession {
            trivia_id: "tiny".to_string(),
            steal_mode: None,
            exhausted_steal: None,
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::SessionCreated { session_id, .. }) => session_id,
        other => panic!("Expected SessionCreated, got {:?}", other),
    };
    start_with(&state, &id, &["Ada", "Grace"]).await;
    open(&state, &id, "Movies", 0).await;
    let (_, _, _, view) = expect_outcome(answer(&state, &id, "Movies", 0, 'A').await);
    assert_eq!(view.phase, SessionPhase::Ended);

    let mut rx = state.subscribe(&id).await.expect("session should exist");
    triviashare::sweeper::spawn_session_sweeper(state.clone());

    let ended = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("sweeper should run");
    assert!(matches!(ended, Ok(ServerMessage::SessionEnded { .. })));
    assert_eq!(state.session_count().await, 0);
}
