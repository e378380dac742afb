//! Protocol Messages
//!
//! Request/response types for the thin transport in front of the engine.
//! Every operation is one call carrying a caller identity authenticated
//! upstream; every reply is a success payload or one tagged error kind.
//! Messages serialize as JSON with snake_case tags.

use serde::{Deserialize, Serialize};

use crate::core::id::PlayerId;
use crate::game::error::GameError;
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::player::PlayerProfile;
use crate::game::room::{Choice, RoomId, RoomSummary, RoomView};
use crate::game::round::VoteAck;
use crate::service::{FinalizeReply, GameService};

// =============================================================================
// CLIENT -> ENGINE REQUESTS
// =============================================================================

/// Requests a transport can issue on behalf of an authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Register or re-register the caller.
    Register {
        /// Display name.
        name: String,
        /// Avatar reference.
        avatar: String,
    },

    /// Query a balance; defaults to the caller.
    GetBalance {
        /// Identity to query, caller when absent.
        player: Option<PlayerId>,
    },

    /// Query lifetime statistics; defaults to the caller.
    GetStats {
        /// Identity to query, caller when absent.
        player: Option<PlayerId>,
    },

    /// Create a room. The fee defaults to the configured entry fee.
    CreateRoom {
        /// Story theme.
        theme: String,
        /// Entry fee override.
        entry_fee: Option<u64>,
    },

    /// Join a waiting room.
    JoinRoom {
        /// Target room.
        room_id: RoomId,
    },

    /// Leave a waiting room for a full refund.
    LeaveRoom {
        /// Target room.
        room_id: RoomId,
    },

    /// List all waiting rooms.
    ListRooms,

    /// Fetch a room's full state (for frontend sync).
    GetRoom {
        /// Target room.
        room_id: RoomId,
    },

    /// Start the game (host only).
    StartGame {
        /// Target room.
        room_id: RoomId,
    },

    /// Vote on the current round. `choice` is wire text, `"A"` or `"B"`.
    SubmitVote {
        /// Target room.
        room_id: RoomId,
        /// Round the vote is for; must equal the room's current round.
        round: u8,
        /// Chosen branch as wire text.
        choice: String,
    },

    /// Finalize the current round (any caller, e.g. a scheduler).
    FinalizeRound {
        /// Target room.
        room_id: RoomId,
    },

    /// Fetch the top of the leaderboard.
    GetLeaderboard {
        /// Maximum entries to return.
        limit: usize,
    },

    /// Lifetime room/game counters.
    GetTotals,
}

// =============================================================================
// ENGINE -> CLIENT RESPONSES
// =============================================================================

/// Replies to [`Request`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Registration result.
    Registered {
        /// The stored profile.
        profile: PlayerProfile,
        /// Balance after any starting grant.
        balance: u64,
    },

    /// Balance query result.
    Balance {
        /// Queried identity.
        player: PlayerId,
        /// Current balance.
        balance: u64,
    },

    /// Statistics query result.
    Stats {
        /// Queried identity.
        player: PlayerId,
        /// Lifetime games completed.
        games: u64,
        /// Lifetime wins.
        wins: u64,
        /// Lifetime rewards.
        total_rewards: u64,
    },

    /// Room state after create/join/start/get.
    Room(RoomView),

    /// Refund confirmation after a leave.
    Left {
        /// Balance after the refund.
        balance: u64,
    },

    /// Waiting-room listing.
    RoomList {
        /// Summaries of all waiting rooms, ascending by id.
        rooms: Vec<RoomSummary>,
    },

    /// Vote acknowledgment.
    Vote(VoteAck),

    /// Finalize result: next round or end-of-game breakdown.
    Finalized(FinalizeReply),

    /// Leaderboard slice, highest score first.
    Leaderboard {
        /// Retained entries, highest score first.
        entries: Vec<LeaderboardEntry>,
    },

    /// Lifetime counters.
    Totals {
        /// Rooms ever created.
        rooms_created: u64,
        /// Games ever finished.
        games_finished: u64,
    },

    /// Operation failed with a recoverable error.
    Error {
        /// The failure kind.
        error: GameError,
    },
}

impl Response {
    fn err(error: GameError) -> Self {
        Response::Error { error }
    }
}

/// Execute one request against the service on behalf of `caller`.
///
/// This is the whole transport adapter: parse, call, wrap. Raw wire text
/// becomes typed input here; an unrecognized vote choice turns into
/// [`GameError::InvalidChoice`] without touching the room.
pub async fn dispatch(service: &GameService, caller: PlayerId, request: Request) -> Response {
    match request {
        Request::Register { name, avatar } => {
            let (profile, balance) = service.register(caller, &name, &avatar).await;
            Response::Registered { profile, balance }
        }
        Request::GetBalance { player } => {
            let player = player.unwrap_or(caller);
            Response::Balance {
                player,
                balance: service.balance(&player).await,
            }
        }
        Request::GetStats { player } => {
            let player = player.unwrap_or(caller);
            let (games, wins, total_rewards) = service.stats(&player).await;
            Response::Stats {
                player,
                games,
                wins,
                total_rewards,
            }
        }
        Request::CreateRoom { theme, entry_fee } => {
            match service.create_room(caller, &theme, entry_fee).await {
                Ok(view) => Response::Room(view),
                Err(e) => Response::err(e),
            }
        }
        Request::JoinRoom { room_id } => match service.join_room(room_id, caller).await {
            Ok(view) => Response::Room(view),
            Err(e) => Response::err(e),
        },
        Request::LeaveRoom { room_id } => match service.leave_room(room_id, caller).await {
            Ok(balance) => Response::Left { balance },
            Err(e) => Response::err(e),
        },
        Request::ListRooms => Response::RoomList {
            rooms: service.list_waiting_rooms().await,
        },
        Request::GetRoom { room_id } => match service.get_room(room_id).await {
            Ok(view) => Response::Room(view),
            Err(e) => Response::err(e),
        },
        Request::StartGame { room_id } => match service.start_game(room_id, caller).await {
            Ok(view) => Response::Room(view),
            Err(e) => Response::err(e),
        },
        Request::SubmitVote {
            room_id,
            round,
            choice,
        } => {
            let choice = match Choice::parse(&choice) {
                Ok(choice) => choice,
                Err(e) => return Response::err(e),
            };
            match service.submit_vote(room_id, caller, round, choice).await {
                Ok(ack) => Response::Vote(ack),
                Err(e) => Response::err(e),
            }
        }
        Request::FinalizeRound { room_id } => match service.finalize_round(room_id).await {
            Ok(reply) => Response::Finalized(reply),
            Err(e) => Response::err(e),
        },
        Request::GetLeaderboard { limit } => Response::Leaderboard {
            entries: service.leaderboard(limit).await,
        },
        Request::GetTotals => {
            let (rooms_created, games_finished) = service.totals();
            Response::Totals {
                rooms_created,
                games_finished,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;
    use crate::game::room::RoomStatus;

    #[tokio::test]
    async fn test_dispatch_register_and_create() {
        let service = GameService::new(GameConfig::default());
        let caller = PlayerId::new([1; 16]);

        let response = dispatch(
            &service,
            caller,
            Request::Register {
                name: "alice".to_string(),
                avatar: "cat.png".to_string(),
            },
        )
        .await;
        match response {
            Response::Registered { profile, balance } => {
                assert_eq!(profile.name, "alice");
                assert_eq!(balance, 100);
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let response = dispatch(
            &service,
            caller,
            Request::CreateRoom {
                theme: "theme".to_string(),
                entry_fee: None,
            },
        )
        .await;
        match response {
            Response::Room(view) => {
                assert_eq!(view.status, RoomStatus::Waiting);
                assert_eq!(view.host, caller);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_invalid_choice() {
        let service = GameService::new(GameConfig::default());
        let caller = PlayerId::new([1; 16]);

        let response = dispatch(
            &service,
            caller,
            Request::SubmitVote {
                room_id: 1,
                round: 1,
                choice: "Z".to_string(),
            },
        )
        .await;
        assert!(matches!(
            response,
            Response::Error {
                error: GameError::InvalidChoice
            }
        ));
    }

    #[tokio::test]
    async fn test_dispatch_error_wrapping() {
        let service = GameService::new(GameConfig::default());
        let caller = PlayerId::new([1; 16]);

        let response = dispatch(&service, caller, Request::JoinRoom { room_id: 7 }).await;
        assert!(matches!(
            response,
            Response::Error {
                error: GameError::RoomNotFound
            }
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request = Request::SubmitVote {
            room_id: 3,
            round: 2,
            choice: "A".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"type":"submit_vote","room_id":3,"round":2,"choice":"A"}"#
        );

        let back: Request = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Request::SubmitVote { room_id: 3, .. }));
    }

    #[test]
    fn test_response_error_wire_format() {
        let response = Response::err(GameError::RoomFull);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("room_full"));
    }
}
