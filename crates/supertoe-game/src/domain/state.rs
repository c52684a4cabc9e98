//! The game state machine.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::board::{GRID_SIZE, GridIndex, Mark, SubBoardResult, has_line};
use super::rejection::{InvalidMoveReason, MoveRejection};

/// Complete state of one game. This is the value persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// `cells[board][cell]`; `None` is an empty cell.
    pub(crate) cells: [[Option<Mark>; GRID_SIZE]; GRID_SIZE],
    pub(crate) sub_board_results: [SubBoardResult; GRID_SIZE],
    /// Sub-board the next move must target; `None` means any undecided one.
    pub(crate) active_board: Option<GridIndex>,
    pub(crate) global_winner: Option<Mark>,
    pub(crate) game_over: bool,
    /// Moves strictly before this instant are rejected.
    pub(crate) next_move_deadline: DateTime<Utc>,
    pub(crate) move_cooldown_seconds: u32,
}

impl GameState {
    /// Creates a fresh game that is playable at `now`. Also used for resets.
    #[must_use]
    pub fn new(now: DateTime<Utc>, move_cooldown_seconds: u32) -> Self {
        Self {
            cells: [[None; GRID_SIZE]; GRID_SIZE],
            sub_board_results: [SubBoardResult::Undecided; GRID_SIZE],
            active_board: None,
            global_winner: None,
            game_over: false,
            next_move_deadline: now,
            move_cooldown_seconds,
        }
    }

    /// The mark at `(board, cell)`, if any.
    #[must_use]
    pub fn cell(&self, board: GridIndex, cell: GridIndex) -> Option<Mark> {
        self.cells[board.get()][cell.get()]
    }

    /// Outcome of each sub-board.
    #[must_use]
    pub fn sub_board_results(&self) -> &[SubBoardResult; GRID_SIZE] {
        &self.sub_board_results
    }

    /// The sub-board the next move must target, or `None` for free choice.
    #[must_use]
    pub fn active_board(&self) -> Option<GridIndex> {
        self.active_board
    }

    /// The global winner, once decided.
    #[must_use]
    pub fn global_winner(&self) -> Option<Mark> {
        self.global_winner
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Earliest instant at which the next move is accepted.
    #[must_use]
    pub fn next_move_deadline(&self) -> DateTime<Utc> {
        self.next_move_deadline
    }

    /// Configured pause between successful moves, in seconds.
    #[must_use]
    pub fn move_cooldown_seconds(&self) -> u32 {
        self.move_cooldown_seconds
    }

    /// Time left until the next move is accepted, clamped at zero.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.next_move_deadline - now).max(TimeDelta::zero())
    }

    /// Checks the board rules for a move at `(board, cell)`, ignoring the timer.
    ///
    /// # Errors
    ///
    /// Returns the first rule the move breaks.
    pub fn validate_move(&self, board: GridIndex, cell: GridIndex) -> Result<(), InvalidMoveReason> {
        if self.game_over {
            return Err(InvalidMoveReason::GameOver);
        }
        if !self.sub_board_results[board.get()].is_undecided() {
            return Err(InvalidMoveReason::BoardDecided { board });
        }
        if self.cell(board, cell).is_some() {
            return Err(InvalidMoveReason::CellOccupied { board, cell });
        }
        match self.active_board {
            Some(required) if required != board => Err(InvalidMoveReason::WrongBoard { required }),
            _ => Ok(()),
        }
    }

    /// Returns `true` if the board rules allow a move at `(board, cell)`.
    #[must_use]
    pub fn is_valid_move(&self, board: GridIndex, cell: GridIndex) -> bool {
        self.validate_move(board, cell).is_ok()
    }

    /// Applies a move and returns the resulting state. `self` is never
    /// modified, so a rejected move leaves no trace.
    ///
    /// Either mark may be placed by anyone once the cooldown has elapsed;
    /// marks do not alternate.
    ///
    /// # Errors
    ///
    /// Returns `MoveRejection::InvalidMove(GameOver)` once the game has ended,
    /// `MoveRejection::TooSoon` if `now` is before the deadline, and
    /// `MoveRejection::InvalidMove` for any other board rule violation.
    pub fn apply_move(
        &self,
        mark: Mark,
        board: GridIndex,
        cell: GridIndex,
        now: DateTime<Utc>,
    ) -> Result<Self, MoveRejection> {
        // A finished game stays finished whatever the timer says.
        if self.game_over {
            return Err(MoveRejection::InvalidMove(InvalidMoveReason::GameOver));
        }
        if now < self.next_move_deadline {
            return Err(MoveRejection::TooSoon {
                next_move_at: self.next_move_deadline,
            });
        }
        self.validate_move(board, cell)
            .map_err(MoveRejection::InvalidMove)?;

        let mut next = self.clone();
        let (b, c) = (board.get(), cell.get());
        next.cells[b][c] = Some(mark);

        if has_line(&next.cells[b], &Some(mark)) {
            next.sub_board_results[b] = SubBoardResult::Won(mark);
            if has_line(&next.sub_board_results, &SubBoardResult::Won(mark)) {
                next.global_winner = Some(mark);
                next.game_over = true;
            }
        } else if next.cells[b].iter().all(Option::is_some) {
            next.sub_board_results[b] = SubBoardResult::Draw;
        }

        next.active_board = next.sub_board_results[c].is_undecided().then_some(cell);
        next.next_move_deadline = now + TimeDelta::seconds(i64::from(self.move_cooldown_seconds));

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn idx(i: i64) -> GridIndex {
        GridIndex::try_from(i).unwrap()
    }

    /// Plays a move at `now`, advancing time past the cooldown first.
    fn play(state: &GameState, mark: Mark, board: i64, cell: i64) -> GameState {
        let now = state.next_move_deadline;
        state.apply_move(mark, idx(board), idx(cell), now).unwrap()
    }

    #[test]
    fn test_new_game_is_empty_and_playable_immediately() {
        let state = GameState::new(t0(), 2);

        assert!(state.cells.iter().flatten().all(Option::is_none));
        assert!(state.sub_board_results.iter().all(|r| r.is_undecided()));
        assert_eq!(state.active_board(), None);
        assert_eq!(state.global_winner(), None);
        assert!(!state.is_game_over());
        assert_eq!(state.next_move_deadline(), t0());
        assert!(state.apply_move(Mark::X, idx(0), idx(4), t0()).is_ok());
    }

    #[test]
    fn test_move_before_deadline_is_too_soon_and_changes_nothing() {
        let mut state = GameState::new(t0(), 2);
        state.next_move_deadline = t0() + TimeDelta::seconds(30);
        let before = state.clone();

        let result = state.apply_move(Mark::X, idx(0), idx(4), t0());

        assert_eq!(
            result,
            Err(MoveRejection::TooSoon {
                next_move_at: t0() + TimeDelta::seconds(30)
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_move_exactly_at_deadline_is_accepted() {
        let mut state = GameState::new(t0(), 2);
        state.next_move_deadline = t0() + TimeDelta::seconds(5);

        let next = state
            .apply_move(Mark::O, idx(3), idx(3), t0() + TimeDelta::seconds(5))
            .unwrap();

        assert_eq!(next.cell(idx(3), idx(3)), Some(Mark::O));
    }

    #[test]
    fn test_successful_move_places_mark_and_advances_deadline() {
        let state = GameState::new(t0(), 2);
        let now = t0() + TimeDelta::seconds(1);

        let next = state.apply_move(Mark::X, idx(0), idx(4), now).unwrap();

        assert_eq!(next.cell(idx(0), idx(4)), Some(Mark::X));
        assert_eq!(next.active_board(), Some(idx(4)));
        assert_eq!(next.next_move_deadline(), now + TimeDelta::seconds(2));
        assert_eq!(next.time_remaining(now), TimeDelta::seconds(2));
        assert_eq!(next.time_remaining(now + TimeDelta::seconds(10)), TimeDelta::zero());
    }

    #[test]
    fn test_marks_do_not_alternate() {
        let state = GameState::new(t0(), 0);

        let state = play(&state, Mark::X, 0, 1);
        let state = play(&state, Mark::X, 1, 0);

        assert_eq!(state.cell(idx(0), idx(1)), Some(Mark::X));
        assert_eq!(state.cell(idx(1), idx(0)), Some(Mark::X));
    }

    #[test]
    fn test_occupied_cell_is_invalid_and_timer_untouched() {
        let state = GameState::new(t0(), 2);
        let state = play(&state, Mark::X, 4, 4);
        let deadline = state.next_move_deadline();

        let result = state.apply_move(Mark::O, idx(4), idx(4), deadline);

        assert_eq!(
            result,
            Err(MoveRejection::InvalidMove(InvalidMoveReason::CellOccupied {
                board: idx(4),
                cell: idx(4),
            }))
        );
        assert_eq!(state.next_move_deadline(), deadline);
    }

    #[test]
    fn test_move_outside_active_board_is_invalid() {
        let state = play(&GameState::new(t0(), 0), Mark::X, 0, 7);

        assert_eq!(
            state.validate_move(idx(3), idx(0)),
            Err(InvalidMoveReason::WrongBoard { required: idx(7) })
        );
        assert!(!state.is_valid_move(idx(3), idx(0)));
        assert!(state.is_valid_move(idx(7), idx(0)));
    }

    #[test]
    fn test_decided_sub_board_is_invalid_target() {
        let mut state = GameState::new(t0(), 0);
        state.sub_board_results[5] = SubBoardResult::Draw;

        assert_eq!(
            state.validate_move(idx(5), idx(0)),
            Err(InvalidMoveReason::BoardDecided { board: idx(5) })
        );
    }

    #[test]
    fn test_top_row_wins_sub_board_and_sends_to_cell_board() {
        // X cannot play (0,0), (0,1), (0,2) back to back: each move sends the
        // next one to the board named by its cell. O's move on board 1 routes
        // play back to board 0.
        let state = GameState::new(t0(), 0);
        let state = play(&state, Mark::X, 0, 0);
        let state = play(&state, Mark::X, 0, 1);
        let state = play(&state, Mark::O, 1, 0);
        let state = play(&state, Mark::X, 0, 2);

        assert_eq!(state.sub_board_results()[0], SubBoardResult::Won(Mark::X));
        assert_eq!(state.active_board(), Some(idx(2)));
        assert_eq!(state.global_winner(), None);
    }

    #[test]
    fn test_win_sending_play_to_a_won_board_frees_next_choice() {
        let mut state = GameState::new(t0(), 0);
        for (mark, board, cell) in [
            (Mark::O, 2, 0),
            (Mark::X, 0, 5),
            (Mark::O, 5, 2),
            (Mark::O, 2, 4),
            (Mark::X, 4, 0),
            (Mark::X, 0, 8),
            (Mark::O, 8, 2),
            (Mark::O, 2, 8),
            (Mark::X, 8, 0),
        ] {
            state = play(&state, mark, board, cell);
        }
        assert_eq!(state.sub_board_results()[2], SubBoardResult::Won(Mark::O));
        assert_eq!(state.active_board(), Some(idx(0)));

        let state = play(&state, Mark::X, 0, 2);

        assert_eq!(state.sub_board_results()[0], SubBoardResult::Won(Mark::X));
        assert_eq!(state.active_board(), None);
        assert_eq!(state.global_winner(), None);
    }

    #[test]
    fn test_move_into_decided_board_frees_next_choice() {
        let mut state = GameState::new(t0(), 0);
        state.cells[0][0] = Some(Mark::X);
        state.cells[0][1] = Some(Mark::X);
        state.cells[2][0] = Some(Mark::O);
        state.cells[2][4] = Some(Mark::O);
        state.cells[2][8] = Some(Mark::O);
        state.sub_board_results[2] = SubBoardResult::Won(Mark::O);

        let state = play(&state, Mark::X, 0, 2);

        assert_eq!(state.sub_board_results()[0], SubBoardResult::Won(Mark::X));
        assert_eq!(state.active_board(), None);
    }

    #[test]
    fn test_move_sending_to_own_board_once_won_frees_choice() {
        let mut state = GameState::new(t0(), 0);
        state.cells[4][3] = Some(Mark::O);
        state.cells[4][5] = Some(Mark::O);

        // Completing the middle row of board 4 at cell 4 would send play to
        // board 4 itself, which is now decided.
        let state = play(&state, Mark::O, 4, 4);

        assert_eq!(state.sub_board_results()[4], SubBoardResult::Won(Mark::O));
        assert_eq!(state.active_board(), None);
    }

    #[test]
    fn test_full_sub_board_without_line_is_draw() {
        use Mark::{O, X};
        let mut state = GameState::new(t0(), 0);
        let layout = [X, O, X, X, O, O, O, X];
        for (i, mark) in layout.into_iter().enumerate() {
            state.cells[3][i] = Some(mark);
        }

        let state = play(&state, X, 3, 8);

        assert_eq!(state.sub_board_results()[3], SubBoardResult::Draw);
        assert_eq!(state.global_winner(), None);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_last_cell_completing_a_line_wins_rather_than_draws() {
        use Mark::{O, X};
        let mut state = GameState::new(t0(), 0);
        let layout = [X, O, X, O, X, O, O, X];
        for (i, mark) in layout.into_iter().enumerate() {
            state.cells[6][i] = Some(mark);
        }

        let state = play(&state, X, 6, 8);

        assert_eq!(state.sub_board_results()[6], SubBoardResult::Won(X));
    }

    #[test]
    fn test_global_line_ends_game_and_blocks_further_moves() {
        let mut state = GameState::new(t0(), 5);
        state.sub_board_results[0] = SubBoardResult::Won(Mark::X);
        state.sub_board_results[4] = SubBoardResult::Won(Mark::X);
        state.cells[8][0] = Some(Mark::X);
        state.cells[8][1] = Some(Mark::X);

        let state = play(&state, Mark::X, 8, 2);

        assert_eq!(state.sub_board_results()[8], SubBoardResult::Won(Mark::X));
        assert_eq!(state.global_winner(), Some(Mark::X));
        assert!(state.is_game_over());

        let game_over = Err(MoveRejection::InvalidMove(InvalidMoveReason::GameOver));
        // Before the deadline and after it.
        assert_eq!(state.apply_move(Mark::O, idx(2), idx(0), t0()), game_over);
        assert_eq!(
            state.apply_move(Mark::O, idx(2), idx(0), state.next_move_deadline()),
            game_over
        );
    }

    #[test]
    fn test_global_column_win() {
        let mut state = GameState::new(t0(), 0);
        state.sub_board_results[1] = SubBoardResult::Won(Mark::O);
        state.sub_board_results[4] = SubBoardResult::Won(Mark::O);
        state.cells[7][2] = Some(Mark::O);
        state.cells[7][6] = Some(Mark::O);

        let state = play(&state, Mark::O, 7, 4);

        assert_eq!(state.global_winner(), Some(Mark::O));
    }

    #[test]
    fn test_mixed_global_results_do_not_win() {
        let mut state = GameState::new(t0(), 0);
        state.sub_board_results[0] = SubBoardResult::Won(Mark::X);
        state.sub_board_results[1] = SubBoardResult::Draw;
        state.cells[2][0] = Some(Mark::X);
        state.cells[2][1] = Some(Mark::X);

        let state = play(&state, Mark::X, 2, 2);

        assert_eq!(state.global_winner(), None);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_fresh_games_differ_only_in_deadline() {
        let first = GameState::new(t0() + TimeDelta::seconds(10), 3);
        let mut second = GameState::new(t0() + TimeDelta::seconds(20), 3);

        assert_eq!(first.next_move_deadline(), t0() + TimeDelta::seconds(10));
        assert_eq!(second.next_move_deadline(), t0() + TimeDelta::seconds(20));
        second.next_move_deadline = first.next_move_deadline;
        assert_eq!(first, second);
        assert_eq!(first.move_cooldown_seconds(), 3);
    }

    /// Deterministic walk over many legal moves, checking invariants after each.
    #[test]
    fn test_invariants_hold_across_a_long_game() {
        let mut state = GameState::new(t0(), 1);
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut marks = [Mark::X, Mark::O].into_iter().cycle();

        for _ in 0..200 {
            if state.is_game_over() {
                break;
            }
            let legal: Vec<(GridIndex, GridIndex)> = GridIndex::all()
                .flat_map(|b| GridIndex::all().map(move |c| (b, c)))
                .filter(|&(b, c)| state.is_valid_move(b, c))
                .collect();
            if legal.is_empty() {
                break;
            }
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            #[allow(clippy::cast_possible_truncation)]
            let (board, cell) = legal[(seed % legal.len() as u64) as usize];
            let now = state.next_move_deadline();
            let next = state
                .apply_move(marks.next().unwrap(), board, cell, now)
                .unwrap();

            for b in GridIndex::all() {
                for c in GridIndex::all() {
                    if let Some(mark) = state.cell(b, c) {
                        assert_eq!(next.cell(b, c), Some(mark));
                    }
                }
                let before = state.sub_board_results()[b.get()];
                if !before.is_undecided() {
                    assert_eq!(next.sub_board_results()[b.get()], before);
                }
            }
            if let Some(active) = next.active_board() {
                assert!(next.sub_board_results()[active.get()].is_undecided());
            }
            assert!(next.next_move_deadline() >= state.next_move_deadline());
            assert_eq!(next.is_game_over(), next.global_winner().is_some());
            state = next;
        }
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = play(&GameState::new(t0(), 2), Mark::O, 5, 1);

        let json = serde_json::to_value(&state).unwrap();
        let restored: GameState = serde_json::from_value(json).unwrap();

        assert_eq!(restored, state);
    }

    #[test]
    fn test_corrupt_active_board_is_rejected_on_decode() {
        let mut json = serde_json::to_value(GameState::new(t0(), 2)).unwrap();
        json["active_board"] = serde_json::json!(12);

        assert!(serde_json::from_value::<GameState>(json).is_err());
    }
}
