//! Round Engine
//!
//! Vote collection, tallying, and round progression for one room. Free
//! functions over `&mut Room`, called by the service while it holds the
//! room's lock.
//!
//! Finalization never waits for full participation: non-voters are excluded
//! from the tally and score nothing that round, so an inactive member can
//! never deadlock a game.

use crate::core::id::PlayerId;
use crate::game::config::GameConfig;
use crate::game::error::GameError;
use crate::game::room::{Choice, Room, RoomStatus};
use crate::ROUND_COUNT;

/// Acknowledgment returned for an accepted vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VoteAck {
    /// Whether every current member has now voted this round.
    pub all_voted: bool,
    /// Votes recorded for the current round.
    pub vote_count: usize,
    /// Current member count.
    pub member_count: usize,
}

/// Vote counts and the winning branch of one finalized round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tally {
    /// Winning branch. Ties favor A.
    pub winner: Choice,
    /// Votes for branch A.
    pub count_a: u32,
    /// Votes for branch B.
    pub count_b: u32,
}

/// What a finalized round led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The game moved on to the next round.
    Advanced {
        /// Tally of the finalized round.
        tally: Tally,
        /// The new current round.
        next_round: u8,
        /// Path including the finalized round's winner.
        path: Vec<Choice>,
    },
    /// Round 5 was finalized; the room is now `Finished` and the caller
    /// must distribute rewards.
    Finished {
        /// Tally of the final round.
        tally: Tally,
        /// The complete decision path.
        path: Vec<Choice>,
    },
}

/// Record a member's vote for the current round.
///
/// A later vote from the same member in the same round overwrites the
/// earlier one. Stale or future round numbers are rejected outright with
/// [`GameError::WrongRound`]; nothing is buffered.
pub fn submit_vote(
    room: &mut Room,
    voter: &PlayerId,
    round_num: u8,
    choice: Choice,
) -> Result<VoteAck, GameError> {
    if room.status != RoomStatus::Playing {
        return Err(GameError::GameNotInProgress);
    }
    if !room.is_member(voter) {
        return Err(GameError::NotMember);
    }
    if round_num != room.round {
        return Err(GameError::WrongRound);
    }

    room.current_votes_mut().insert(*voter, choice);

    let vote_count = room.current_votes().len();
    let member_count = room.member_count();
    Ok(VoteAck {
        all_voted: vote_count == member_count,
        vote_count,
        member_count,
    })
}

/// Finalize the current round: tally, award the win bonus, and advance.
///
/// Callable no matter how many members voted. Every voter aligned with the
/// winner gains `config.win_bonus` cumulative score; minority voters and
/// non-voters gain nothing. On round 5 the room becomes `Finished` and the
/// caller is expected to run reward distribution.
pub fn finalize_round(room: &mut Room, config: &GameConfig) -> Result<RoundOutcome, GameError> {
    if room.status != RoomStatus::Playing {
        return Err(GameError::GameNotInProgress);
    }

    let tally = tally_votes(room.current_votes().values());

    room.path.push(tally.winner);
    let aligned: Vec<PlayerId> = room
        .current_votes()
        .iter()
        .filter(|(_, choice)| **choice == tally.winner)
        .map(|(id, _)| *id)
        .collect();
    for id in &aligned {
        room.add_score(id, config.win_bonus);
    }

    debug_assert_eq!(room.path.len(), room.round as usize);

    if room.round >= ROUND_COUNT {
        room.status = RoomStatus::Finished;
        Ok(RoundOutcome::Finished {
            tally,
            path: room.path.clone(),
        })
    } else {
        room.round += 1;
        debug_assert!(room.current_votes().is_empty());
        Ok(RoundOutcome::Advanced {
            tally,
            next_round: room.round,
            path: room.path.clone(),
        })
    }
}

/// Count votes and pick the winning branch. Ties favor A.
fn tally_votes<'a>(votes: impl Iterator<Item = &'a Choice>) -> Tally {
    let mut count_a = 0u32;
    let mut count_b = 0u32;
    for choice in votes {
        match choice {
            Choice::A => count_a += 1,
            Choice::B => count_b += 1,
        }
    }
    let winner = if count_a >= count_b { Choice::A } else { Choice::B };
    Tally {
        winner,
        count_a,
        count_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing_room(n: u8) -> (Room, Vec<PlayerId>) {
        let players: Vec<PlayerId> = (1..=n).map(|i| PlayerId::new([i; 16])).collect();
        let mut room = Room::new(1, "theme", players[0], "p1", 10);
        for (i, p) in players.iter().enumerate().skip(1) {
            room.add_member(*p, format!("p{}", i + 1));
        }
        room.start(&players[0]).unwrap();
        (room, players)
    }

    #[test]
    fn test_vote_ack_counts() {
        let (mut room, players) = playing_room(3);

        let ack = submit_vote(&mut room, &players[0], 1, Choice::A).unwrap();
        assert!(!ack.all_voted);
        assert_eq!(ack.vote_count, 1);
        assert_eq!(ack.member_count, 3);

        submit_vote(&mut room, &players[1], 1, Choice::B).unwrap();
        let ack = submit_vote(&mut room, &players[2], 1, Choice::B).unwrap();
        assert!(ack.all_voted);
        assert_eq!(ack.vote_count, 3);
    }

    #[test]
    fn test_vote_overwrites_previous() {
        let (mut room, players) = playing_room(2);

        submit_vote(&mut room, &players[0], 1, Choice::A).unwrap();
        let ack = submit_vote(&mut room, &players[0], 1, Choice::B).unwrap();
        assert_eq!(ack.vote_count, 1);
        assert_eq!(room.current_votes()[&players[0]], Choice::B);
    }

    #[test]
    fn test_vote_wrong_round() {
        let (mut room, players) = playing_room(2);

        // Stale and future submissions are both rejected.
        assert_eq!(
            submit_vote(&mut room, &players[0], 0, Choice::A),
            Err(GameError::WrongRound)
        );
        assert_eq!(
            submit_vote(&mut room, &players[0], 2, Choice::A),
            Err(GameError::WrongRound)
        );
    }

    #[test]
    fn test_vote_before_start() {
        let host = PlayerId::new([1; 16]);
        let mut room = Room::new(1, "theme", host, "p1", 10);
        assert_eq!(
            submit_vote(&mut room, &host, 1, Choice::A),
            Err(GameError::GameNotInProgress)
        );
    }

    #[test]
    fn test_vote_from_stranger() {
        let (mut room, _) = playing_room(2);
        let stranger = PlayerId::new([99; 16]);
        assert_eq!(
            submit_vote(&mut room, &stranger, 1, Choice::A),
            Err(GameError::NotMember)
        );
    }

    #[test]
    fn test_finalize_majority_wins() {
        let (mut room, players) = playing_room(3);
        let config = GameConfig::default();

        submit_vote(&mut room, &players[0], 1, Choice::B).unwrap();
        submit_vote(&mut room, &players[1], 1, Choice::B).unwrap();
        submit_vote(&mut room, &players[2], 1, Choice::A).unwrap();

        let outcome = finalize_round(&mut room, &config).unwrap();
        match outcome {
            RoundOutcome::Advanced {
                tally, next_round, path,
            } => {
                assert_eq!(tally.winner, Choice::B);
                assert_eq!(tally.count_a, 1);
                assert_eq!(tally.count_b, 2);
                assert_eq!(next_round, 2);
                assert_eq!(path, vec![Choice::B]);
            }
            other => panic!("expected Advanced, got {:?}", other),
        }

        assert_eq!(room.score(&players[0]), config.win_bonus);
        assert_eq!(room.score(&players[1]), config.win_bonus);
        assert_eq!(room.score(&players[2]), 0);
    }

    #[test]
    fn test_finalize_tie_favors_a() {
        let (mut room, players) = playing_room(2);
        let config = GameConfig::default();

        submit_vote(&mut room, &players[0], 1, Choice::A).unwrap();
        submit_vote(&mut room, &players[1], 1, Choice::B).unwrap();

        match finalize_round(&mut room, &config).unwrap() {
            RoundOutcome::Advanced { tally, .. } => {
                assert_eq!(tally.winner, Choice::A);
                assert_eq!(tally.count_a, 1);
                assert_eq!(tally.count_b, 1);
            }
            other => panic!("expected Advanced, got {:?}", other),
        }
    }

    #[test]
    fn test_finalize_without_any_votes() {
        // No quorum requirement: an empty tally resolves to A.
        let (mut room, players) = playing_room(2);
        let config = GameConfig::default();

        match finalize_round(&mut room, &config).unwrap() {
            RoundOutcome::Advanced { tally, .. } => {
                assert_eq!(tally.winner, Choice::A);
                assert_eq!((tally.count_a, tally.count_b), (0, 0));
            }
            other => panic!("expected Advanced, got {:?}", other),
        }
        assert_eq!(room.score(&players[0]), 0);
        assert_eq!(room.score(&players[1]), 0);
    }

    #[test]
    fn test_finalize_not_playing() {
        let host = PlayerId::new([1; 16]);
        let mut room = Room::new(1, "theme", host, "p1", 10);
        let config = GameConfig::default();
        assert_eq!(
            finalize_round(&mut room, &config),
            Err(GameError::GameNotInProgress)
        );
    }

    #[test]
    fn test_path_grows_one_per_round() {
        let (mut room, players) = playing_room(2);
        let config = GameConfig::default();

        for round in 1..ROUND_COUNT {
            submit_vote(&mut room, &players[0], round, Choice::A).unwrap();
            let outcome = finalize_round(&mut room, &config).unwrap();
            assert!(matches!(outcome, RoundOutcome::Advanced { .. }));
            assert_eq!(room.path.len(), round as usize);
            assert_eq!(room.round, round + 1);
        }
    }

    #[test]
    fn test_fifth_finalize_finishes() {
        let (mut room, players) = playing_room(2);
        let config = GameConfig::default();

        for round in 1..=ROUND_COUNT {
            submit_vote(&mut room, &players[0], round, Choice::A).unwrap();
            submit_vote(&mut room, &players[1], round, Choice::B).unwrap();
            let outcome = finalize_round(&mut room, &config).unwrap();
            if round < ROUND_COUNT {
                assert!(matches!(outcome, RoundOutcome::Advanced { .. }));
            } else {
                match outcome {
                    RoundOutcome::Finished { tally, path } => {
                        assert_eq!(tally.winner, Choice::A);
                        assert_eq!(path.len(), ROUND_COUNT as usize);
                    }
                    other => panic!("expected Finished, got {:?}", other),
                }
            }
        }

        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.round, ROUND_COUNT);
        assert_eq!(room.score(&players[0]), 5 * config.win_bonus);
        assert_eq!(room.score(&players[1]), 0);

        // Terminal: no further votes or finalizes.
        assert_eq!(
            submit_vote(&mut room, &players[0], 5, Choice::A),
            Err(GameError::GameNotInProgress)
        );
        assert_eq!(
            finalize_round(&mut room, &config),
            Err(GameError::GameNotInProgress)
        );
    }

    proptest! {
        #[test]
        fn prop_tie_or_majority_a_always_wins_ties(votes in proptest::collection::vec(prop::bool::ANY, 0..32)) {
            let choices: Vec<Choice> = votes
                .iter()
                .map(|b| if *b { Choice::A } else { Choice::B })
                .collect();
            let tally = tally_votes(choices.iter());

            let a = choices.iter().filter(|c| **c == Choice::A).count() as u32;
            let b = choices.len() as u32 - a;
            prop_assert_eq!(tally.count_a, a);
            prop_assert_eq!(tally.count_b, b);
            if a >= b {
                prop_assert_eq!(tally.winner, Choice::A);
            } else {
                prop_assert_eq!(tally.winner, Choice::B);
            }
        }
    }
}
