/// Game rules applied to each player action.
pub mod game_service;
/// Ordered fallback across question sources.
pub mod question_resolver;
