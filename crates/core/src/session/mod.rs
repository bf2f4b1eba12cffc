pub mod detection_session;
pub mod fetch_gate;
pub mod session_state;
pub mod track_fetcher;
